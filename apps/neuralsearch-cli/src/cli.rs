//! Command-line arguments for the `neuralsearch` binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use neuralsearch_query::QueryMode;

#[derive(Parser, Debug)]
#[command(name = "neuralsearch", author, version, about = "Vectorize, index and query documents with Solr neural search")]
pub struct CliArgs {
    /// Path to the configuration file (defaults to ./config.toml).
    #[arg(short, long, env = "NEURALSEARCH_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug logging.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only log warnings and errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Embed every line of a document file into a vector file.
    Generate {
        docs: PathBuf,
        vectors: PathBuf,
        #[arg(long)]
        batch_size: Option<usize>,
    },

    /// Upload documents with their precomputed vectors.
    Index {
        docs: PathBuf,
        vectors: PathBuf,
        #[arg(long)]
        batch_size: Option<usize>,
        /// Fail when the files have different line counts.
        #[arg(long)]
        strict: bool,
        /// Issue an explicit commit after the last batch.
        #[arg(long)]
        commit: bool,
    },

    /// Run a single neural query.
    Query(QueryArgs),

    /// Ping the backend and report the document count.
    Health,

    /// Run the configured query suite in all four modes.
    All,

    /// Print the embedding of a query text.
    Vectorize {
        text: String,
        /// Print `{query, vector, dimension}` as JSON instead of CSV.
        #[arg(long)]
        json: bool,
    },

    /// Write the built-in sample corpus to `<dir>/sample_documents.tsv`.
    SampleData {
        #[arg(default_value = "data")]
        dir: PathBuf,
    },
}

#[derive(clap::Args, Debug)]
pub struct QueryArgs {
    /// knn, filter, hybrid or rerank.
    pub mode: QueryMode,

    pub text: String,

    #[arg(long)]
    pub top_k: Option<usize>,

    /// Comma-separated ids for `filter`.
    #[arg(long, value_delimiter = ',')]
    pub ids: Option<Vec<String>>,

    /// Lexical field for `hybrid`.
    #[arg(long)]
    pub field: Option<String>,

    /// Keyword text for `hybrid`.
    #[arg(long)]
    pub lexical: Option<String>,

    /// First-stage query for `rerank`.
    #[arg(long)]
    pub base: Option<String>,

    #[arg(long)]
    pub rerank_docs: Option<usize>,

    #[arg(long)]
    pub rerank_weight: Option<f32>,

    /// Print the parsed response as JSON.
    #[arg(long)]
    pub json: bool,
}
