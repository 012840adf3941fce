//! Domain types shared by the pipeline, the Solr adapter and the query layer.

use serde::{Deserialize, Serialize};

/// A dense embedding. Every vector within one run has the same length.
pub type Vector = Vec<f32>;

/// One logical record of the document file.
///
/// - `ordinal`: 0-based line position, stable for the whole run; doubles as
///   the primary key of the index entry
/// - `text`: the line with surrounding whitespace trimmed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub ordinal: usize,
    pub text: String,
}

impl Document {
    pub fn new(ordinal: usize, raw: &str) -> Self {
        Self { ordinal, text: raw.trim().to_string() }
    }

    pub fn id(&self) -> String {
        self.ordinal.to_string()
    }
}

/// The unit uploaded to the search backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexEntry {
    pub id: String,
    pub text: String,
    pub vector: Vector,
}

impl IndexEntry {
    pub fn from_document(doc: Document, vector: Vector) -> Self {
        Self { id: doc.id(), text: doc.text, vector }
    }
}

/// How the index pipeline reacts when the document and vector streams differ in length.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlignmentPolicy {
    /// Pair up to the shorter stream and report the unmatched remainder as a warning.
    #[default]
    Truncate,
    /// Treat any length difference as a fatal error.
    Strict,
}

/// A single ranked hit. `score` is backend-specific; higher is better.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchDoc {
    pub id: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub score: f32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub num_found: u64,
    pub docs: Vec<SearchDoc>,
}

impl SearchResponse {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn ids(&self) -> Vec<&str> {
        self.docs.iter().map(|d| d.id.as_str()).collect()
    }
}
