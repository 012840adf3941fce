use serde_json::json;

use neuralsearch_core::traits::IndexClient;
use neuralsearch_core::Result;

use crate::response::parse_response;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthReport {
    /// Status string reported by the ping handler.
    pub status: String,
    pub num_docs: u64,
}

impl HealthReport {
    pub fn is_ok(&self) -> bool { self.status.eq_ignore_ascii_case("OK") }
}

/// Pings the backend, then counts the indexed documents.
pub fn health_check(client: &dyn IndexClient) -> Result<HealthReport> {
    let status = client.ping()?;
    let body = client.query(&json!({ "query": "*:*", "limit": 0 }))?;
    let num_docs = parse_response(&body)?.num_found;
    tracing::info!(%status, num_docs, "backend health");
    Ok(HealthReport { status, num_docs })
}
