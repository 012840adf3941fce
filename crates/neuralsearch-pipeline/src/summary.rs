use std::fmt;

use crate::align::AlignmentWarning;

/// A record rejected during indexing. The run continues without it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordError {
    pub ordinal: usize,
    pub message: String,
}

impl fmt::Display for RecordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "record {}: {}", self.ordinal, self.message)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexSummary {
    /// Document/vector pairs read from the inputs.
    pub read: usize,
    pub indexed: usize,
    pub skipped: usize,
    pub batches: usize,
    pub committed: bool,
    pub failures: Vec<RecordError>,
    pub alignment: Option<AlignmentWarning>,
}

impl IndexSummary {
    /// True when the run finished without indexing anything.
    pub fn is_empty(&self) -> bool { self.indexed == 0 }
}

impl fmt::Display for IndexSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "read {}, indexed {}, skipped {} in {} batch(es)",
            self.read, self.indexed, self.skipped, self.batches
        )?;
        if let Some(w) = &self.alignment {
            write!(f, "; {w}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerateSummary {
    pub documents: usize,
    pub batches: usize,
    pub dim: usize,
}

impl fmt::Display for GenerateSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "wrote {} vector(s) of dimension {} in {} batch(es)", self.documents, self.dim, self.batches)
    }
}
