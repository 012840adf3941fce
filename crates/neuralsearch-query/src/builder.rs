//! Lowering of `QuerySpec` to Solr JSON Request API payloads.
//!
//! Dense retrieval uses the `{!knn}` query parser with the vector written as a
//! literal, e.g. `{!knn f=vector topK=3}[0.1, 0.2]`. Every builder is pure: a
//! given `QuerySpec` always lowers to the same payload.

use serde_json::{json, Value};

use neuralsearch_core::config::QueryConfig;
use neuralsearch_core::types::Vector;
use neuralsearch_core::{Error, Result};

#[derive(Debug, Clone, PartialEq)]
pub enum QuerySpec {
    Plain { vector: Vector, top_k: usize },
    /// KNN restricted to an explicit id set, in the given order.
    Filtered { vector: Vector, top_k: usize, ids: Vec<String> },
    /// Lexical and KNN clauses OR-ed together; neither is required to match.
    Hybrid { vector: Vector, top_k: usize, lexical_field: String, lexical_text: String },
    /// `base_query` selects the candidates; the KNN clause only reorders its top `rerank_docs`.
    Rerank { base_query: String, vector: Vector, rerank_docs: usize, rerank_weight: f32 },
}

#[derive(Debug, Clone)]
pub struct QueryBuilder {
    vector_field: String,
    id_field: String,
}

impl Default for QueryBuilder {
    fn default() -> Self { Self::new("vector", "id") }
}

impl From<&QueryConfig> for QueryBuilder {
    fn from(cfg: &QueryConfig) -> Self { Self::new(&cfg.vector_field, &cfg.id_field) }
}

impl QueryBuilder {
    pub fn new(vector_field: &str, id_field: &str) -> Self {
        Self { vector_field: vector_field.to_string(), id_field: id_field.to_string() }
    }

    pub fn build(&self, spec: &QuerySpec) -> Result<Value> {
        match spec {
            QuerySpec::Plain { vector, top_k } => Ok(self.build_knn(vector, *top_k)),
            QuerySpec::Filtered { vector, top_k, ids } => self.build_filtered_knn(vector, *top_k, ids),
            QuerySpec::Hybrid { vector, top_k, lexical_field, lexical_text } => {
                self.build_hybrid(vector, *top_k, lexical_field, lexical_text)
            }
            QuerySpec::Rerank { base_query, vector, rerank_docs, rerank_weight } => {
                Ok(self.build_rerank(base_query, vector, *rerank_docs, *rerank_weight))
            }
        }
    }

    pub fn knn_clause(&self, vector: &[f32], top_k: usize) -> String {
        format!("{{!knn f={} topK={}}}{}", self.vector_field, top_k, vector_literal(vector))
    }

    pub fn build_knn(&self, vector: &[f32], top_k: usize) -> Value {
        json!({ "query": self.knn_clause(vector, top_k) })
    }

    /// An empty id set is rejected: `id:()` is not valid query syntax. Ids are
    /// escaped, so `a b` matches the single id `a b`.
    pub fn build_filtered_knn<S: AsRef<str>>(&self, vector: &[f32], top_k: usize, ids: &[S]) -> Result<Value> {
        if ids.is_empty() {
            return Err(Error::InvalidConfig("filtered KNN needs at least one id".into()));
        }
        let joined = ids.iter().map(|s| escape_term(s.as_ref())).collect::<Vec<String>>().join(" ");
        Ok(json!({
            "query": self.knn_clause(vector, top_k),
            "filter": format!("{}:({})", self.id_field, joined),
        }))
    }

    pub fn build_hybrid(&self, vector: &[f32], top_k: usize, lexical_field: &str, lexical_text: &str) -> Result<Value> {
        check_field_name("lexical field", lexical_field)?;
        let lexical = format!("{{!type=edismax qf={} v='{}'}}", lexical_field, escape_local_param(lexical_text));
        Ok(json!({
            "query": {
                "bool": {
                    "should": [lexical, self.knn_clause(vector, top_k)]
                }
            }
        }))
    }

    pub fn build_rerank(&self, base_query: &str, vector: &[f32], rerank_docs: usize, rerank_weight: f32) -> Value {
        json!({
            "query": base_query,
            "params": {
                "rq": format!("{{!rerank reRankQuery=$rqq reRankDocs={rerank_docs} reRankWeight={rerank_weight}}}"),
                "rqq": self.knn_clause(vector, rerank_docs),
            }
        })
    }
}

/// `[0.1, 0.2, ...]`
fn vector_literal(vector: &[f32]) -> String {
    let parts: Vec<String> = vector.iter().map(f32::to_string).collect();
    format!("[{}]", parts.join(", "))
}

/// Backslash-escapes Lucene query syntax characters and whitespace in a term.
fn escape_term(term: &str) -> String {
    let mut out = String::with_capacity(term.len());
    for c in term.chars() {
        if c.is_whitespace() || "+-!(){}[]^\"~*?:\\/&|".contains(c) { out.push('\\'); }
        out.push(c);
    }
    out
}

fn check_field_name(what: &str, name: &str) -> Result<()> {
    if name.is_empty() || name.chars().any(|c| c.is_whitespace() || "{}'\"=".contains(c)) {
        return Err(Error::InvalidConfig(format!("{what} '{name}' is not a valid field name")));
    }
    Ok(())
}

/// Escapes a value for a single-quoted local parameter.
fn escape_local_param(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if c == '\\' || c == '\'' { out.push('\\'); }
        out.push(c);
    }
    out
}
