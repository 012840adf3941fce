//! neuralsearch-pipeline
//!
//! The batch pipeline in its two modes: `generate` embeds a document file into a
//! vector file, `index` pairs a document file with a vector file and uploads the
//! entries through an `IndexClient`. Both share the `Batcher`; output order
//! always follows input order.

#![deny(warnings)]
#![deny(dead_code)]
#![deny(unused_variables)]
#![deny(unused_imports)]

pub mod align;
pub mod batch;
pub mod generate;
pub mod index;
mod progress;
pub mod summary;

pub use align::{Aligned, AlignmentWarning, Side};
pub use generate::{generate_vectors, generate_vectors_file, GenerateOptions};
pub use index::{index_documents, index_files, IndexOptions};
pub use summary::{GenerateSummary, IndexSummary, RecordError};
