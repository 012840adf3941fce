use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// A vector line contained a token that is not a finite float.
    #[error("Malformed vector: component {position} ({token:?}) is not a finite number")]
    MalformedVector { position: usize, token: String },

    #[error("Vector dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Raised only under `AlignmentPolicy::Strict`.
    #[error("Document/vector count mismatch: {documents} documents vs {vectors} vectors")]
    Alignment { documents: usize, vectors: usize },

    #[error("Search backend unavailable: {0}")]
    BackendUnavailable(String),

    #[error("Search backend returned HTTP {status}: {body}")]
    Backend { status: u16, body: String },

    /// A batch flush failed; ids identify the first and last entry of the lost batch.
    #[error("Indexing failed on batch {batch} (ids {first_id}..={last_id}): {source}")]
    Indexing {
        batch: usize,
        first_id: String,
        last_id: String,
        #[source]
        source: Box<Error>,
    },

    #[error("Embedding failed: {0}")]
    Embedding(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether retrying the same call later may succeed.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Error::BackendUnavailable(_) => true,
            Error::Backend { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
