use serde_json::Value;

use crate::error::Result;
use crate::types::IndexEntry;

/// Text → vector model. Output is 1:1 and order-preserving with the input.
pub trait Embedder: Send + Sync {
    fn dim(&self) -> usize;
    fn max_len(&self) -> usize;
    fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>>;
}

/// The search backend as seen by the pipeline and the query layer.
pub trait IndexClient: Send + Sync {
    fn add(&self, entries: &[IndexEntry]) -> Result<()>;
    fn commit(&self) -> Result<()>;
    /// Executes a JSON request payload and returns the raw response body.
    fn query(&self, payload: &Value) -> Result<Value>;
    /// Returns the backend's status string (e.g. `"OK"`).
    fn ping(&self) -> Result<String>;
}
