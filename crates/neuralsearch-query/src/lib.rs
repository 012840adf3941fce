//! neuralsearch-query
//!
//! Turns free-text queries into Solr neural search requests. `QueryBuilder`
//! lowers a `QuerySpec` (plain KNN, filtered KNN, hybrid, rerank) to a JSON
//! Request API payload; `NeuralSearcher` embeds the text, dispatches the
//! payload through an `IndexClient` and parses the ranked result list.

#![deny(warnings)]
#![deny(dead_code)]
#![deny(unused_variables)]
#![deny(unused_imports)]

pub mod builder;
pub mod health;
pub mod response;
pub mod searcher;
pub mod suite;

pub use builder::{QueryBuilder, QuerySpec};
pub use health::{health_check, HealthReport};
pub use response::parse_response;
pub use searcher::{NeuralSearcher, QueryMode, QueryOutcome, QueryRequest};
pub use suite::{run_suite, SuiteCase, SuiteSummary};
