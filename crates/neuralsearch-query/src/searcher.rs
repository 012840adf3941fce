use std::fmt;
use std::str::FromStr;

use neuralsearch_core::config::QueryConfig;
use neuralsearch_core::traits::{Embedder, IndexClient};
use neuralsearch_core::types::{SearchResponse, Vector};
use neuralsearch_core::{Error, Result};

use crate::builder::{QueryBuilder, QuerySpec};
use crate::response::parse_response;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryMode {
    Knn,
    Filter,
    Hybrid,
    Rerank,
}

impl QueryMode {
    pub const ALL: [QueryMode; 4] = [QueryMode::Knn, QueryMode::Filter, QueryMode::Hybrid, QueryMode::Rerank];

    pub fn as_str(&self) -> &'static str {
        match self {
            QueryMode::Knn => "knn",
            QueryMode::Filter => "filter",
            QueryMode::Hybrid => "hybrid",
            QueryMode::Rerank => "rerank",
        }
    }
}

impl fmt::Display for QueryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.pad(self.as_str()) }
}

impl FromStr for QueryMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        QueryMode::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::InvalidConfig(format!("unknown query mode '{s}' (expected knn, filter, hybrid or rerank)")))
    }
}

/// A text query in one of the four modes. `text` is what gets embedded.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryRequest {
    Knn { text: String, top_k: usize },
    Filtered { text: String, top_k: usize, ids: Vec<String> },
    Hybrid { text: String, top_k: usize, lexical_field: String, lexical_text: String },
    Rerank { text: String, base_query: String, rerank_docs: usize, rerank_weight: f32 },
}

impl QueryRequest {
    /// Builds a request for `mode` with every parameter taken from `cfg`.
    pub fn with_defaults(mode: QueryMode, text: &str, cfg: &QueryConfig) -> Self {
        let text = text.to_string();
        match mode {
            QueryMode::Knn => QueryRequest::Knn { text, top_k: cfg.top_k },
            QueryMode::Filter => QueryRequest::Filtered { text, top_k: cfg.top_k, ids: cfg.filter_ids.clone() },
            QueryMode::Hybrid => QueryRequest::Hybrid {
                text,
                top_k: cfg.top_k,
                lexical_field: cfg.lexical_field.clone(),
                lexical_text: cfg.lexical_text.clone(),
            },
            QueryMode::Rerank => QueryRequest::Rerank {
                text,
                base_query: cfg.rerank_base.clone(),
                rerank_docs: cfg.rerank_docs,
                rerank_weight: cfg.rerank_weight,
            },
        }
    }

    pub fn mode(&self) -> QueryMode {
        match self {
            QueryRequest::Knn { .. } => QueryMode::Knn,
            QueryRequest::Filtered { .. } => QueryMode::Filter,
            QueryRequest::Hybrid { .. } => QueryMode::Hybrid,
            QueryRequest::Rerank { .. } => QueryMode::Rerank,
        }
    }

    pub fn text(&self) -> &str {
        match self {
            QueryRequest::Knn { text, .. }
            | QueryRequest::Filtered { text, .. }
            | QueryRequest::Hybrid { text, .. }
            | QueryRequest::Rerank { text, .. } => text,
        }
    }

    fn into_spec(self, vector: Vector) -> QuerySpec {
        match self {
            QueryRequest::Knn { top_k, .. } => QuerySpec::Plain { vector, top_k },
            QueryRequest::Filtered { top_k, ids, .. } => QuerySpec::Filtered { vector, top_k, ids },
            QueryRequest::Hybrid { top_k, lexical_field, lexical_text, .. } => {
                QuerySpec::Hybrid { vector, top_k, lexical_field, lexical_text }
            }
            QueryRequest::Rerank { base_query, rerank_docs, rerank_weight, .. } => {
                QuerySpec::Rerank { base_query, vector, rerank_docs, rerank_weight }
            }
        }
    }
}

/// Result of one executed query. A response the backend returned but that
/// could not be read degrades to an empty result with `error` set.
#[derive(Debug)]
pub struct QueryOutcome {
    pub response: SearchResponse,
    pub error: Option<Error>,
}

impl QueryOutcome {
    pub fn is_ok(&self) -> bool { self.error.is_none() }
}

pub struct NeuralSearcher<C> {
    embedder: Box<dyn Embedder>,
    client: C,
    builder: QueryBuilder,
}

impl<C: IndexClient> NeuralSearcher<C> {
    pub fn new(embedder: Box<dyn Embedder>, client: C, cfg: &QueryConfig) -> Self {
        Self { embedder, client, builder: QueryBuilder::from(cfg) }
    }

    pub fn client(&self) -> &C { &self.client }

    /// Embeds a single query text.
    pub fn vectorize(&self, text: &str) -> Result<Vector> {
        let mut vectors = self
            .embedder
            .embed_batch(&[text.to_string()])
            .map_err(|e| Error::Embedding(format!("{e:#}")))?;
        if vectors.len() != 1 {
            return Err(Error::Embedding(format!("expected one vector for the query, got {}", vectors.len())));
        }
        Ok(vectors.swap_remove(0))
    }

    /// Embeds the query text, builds the payload and runs it.
    ///
    /// Embedding, transport and HTTP failures are returned as `Err`; a reply
    /// that is not JSON or whose shape cannot be read is reported inside the
    /// `QueryOutcome`.
    pub fn search(&self, request: QueryRequest) -> Result<QueryOutcome> {
        let mode = request.mode();
        let vector = self.vectorize(request.text())?;
        let payload = self.builder.build(&request.into_spec(vector))?;
        let parsed = match self.client.query(&payload) {
            Ok(body) => parse_response(&body),
            Err(e @ Error::MalformedResponse(_)) => Err(e),
            Err(e) => return Err(e),
        };
        match parsed {
            Ok(response) => {
                tracing::info!(%mode, num_found = response.num_found, returned = response.docs.len(), "query finished");
                Ok(QueryOutcome { response, error: None })
            }
            Err(e) => {
                tracing::warn!(%mode, error = %e, "unreadable query response");
                Ok(QueryOutcome { response: SearchResponse::empty(), error: Some(e) })
            }
        }
    }
}
