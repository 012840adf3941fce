//! neuralsearch-core
//!
//! Shared error taxonomy, domain types, the `Embedder` / `IndexClient` seams,
//! configuration, the vector line codec and line-oriented document readers.

#![deny(warnings)]
#![deny(dead_code)]
#![deny(unused_variables)]
#![deny(unused_imports)]

pub mod codec;
pub mod config;
pub mod documents;
pub mod error;
pub mod traits;
pub mod types;

pub use error::{Error, Result};
