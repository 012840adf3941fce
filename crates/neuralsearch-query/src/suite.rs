use std::fmt;

use neuralsearch_core::config::QueryConfig;
use neuralsearch_core::traits::IndexClient;
use neuralsearch_core::{Error, Result};

use crate::health::{health_check, HealthReport};
use crate::searcher::{NeuralSearcher, QueryMode, QueryRequest};

/// One query/mode combination of a suite run.
#[derive(Debug, Clone, PartialEq)]
pub struct SuiteCase {
    pub query: String,
    pub mode: QueryMode,
    pub num_found: u64,
    pub top_ids: Vec<String>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SuiteSummary {
    pub health: HealthReport,
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub cases: Vec<SuiteCase>,
}

impl SuiteSummary {
    /// Percentage of successful cases; 0 for an empty suite.
    pub fn success_rate(&self) -> f64 {
        if self.total == 0 { 0.0 } else { self.succeeded as f64 * 100.0 / self.total as f64 }
    }
}

impl fmt::Display for SuiteSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} queries succeeded ({:.1}%), {} failed",
            self.succeeded,
            self.total,
            self.success_rate(),
            self.failed
        )
    }
}

/// Runs every configured query in all four modes with default parameters.
///
/// Stops before any query when the health check fails or reports a status
/// other than `OK`. Individual query failures are counted, not returned.
pub fn run_suite<C: IndexClient>(searcher: &NeuralSearcher<C>, cfg: &QueryConfig) -> Result<SuiteSummary> {
    let health = health_check(searcher.client())?;
    if !health.is_ok() {
        return Err(Error::BackendUnavailable(format!("health check reported status '{}'", health.status)));
    }

    let mut cases = Vec::with_capacity(cfg.suite_queries.len() * QueryMode::ALL.len());
    for query in &cfg.suite_queries {
        for mode in QueryMode::ALL {
            let case = match searcher.search(QueryRequest::with_defaults(mode, query, cfg)) {
                Ok(outcome) => SuiteCase {
                    query: query.clone(),
                    mode,
                    num_found: outcome.response.num_found,
                    top_ids: outcome.response.docs.iter().map(|d| d.id.clone()).collect(),
                    error: outcome.error.map(|e| e.to_string()),
                },
                Err(e) => {
                    tracing::warn!(%mode, query = %query, error = %e, "suite query failed");
                    SuiteCase { query: query.clone(), mode, num_found: 0, top_ids: Vec::new(), error: Some(e.to_string()) }
                }
            };
            cases.push(case);
        }
    }

    let succeeded = cases.iter().filter(|c| c.error.is_none()).count();
    let summary = SuiteSummary { health, total: cases.len(), succeeded, failed: cases.len() - succeeded, cases };
    tracing::info!(total = summary.total, succeeded = summary.succeeded, "query suite finished");
    Ok(summary)
}
