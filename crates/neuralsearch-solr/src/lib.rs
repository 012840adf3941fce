//! neuralsearch-solr
//!
//! `IndexClient` over the Solr HTTP API: JSON document updates, explicit
//! commits, JSON Request API queries against `/select` and `/admin/ping`.
//! Transport failures map to `BackendUnavailable`, non-2xx responses to
//! `Backend { status, body }`.

#![deny(warnings)]
#![deny(dead_code)]
#![deny(unused_variables)]
#![deny(unused_imports)]

pub mod client;

pub use client::SolrClient;
