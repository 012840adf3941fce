//! Configuration loader, typed settings and path helpers.
//!
//! Uses Figment to merge built-in defaults, `config.toml`, `config.<env>.toml`
//! and `APP_*` env vars (`__` separates nesting, e.g. `APP_SOLR__URL`). The
//! legacy `SOLR_URL` and `MODEL_DIR` variables are honoured as well.

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::types::AlignmentPolicy;

pub struct Config {
    figment: Figment,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(None)
    }

    /// Like `load`, but reads the base file from `path` instead of `config.toml`.
    pub fn load_from(path: Option<&Path>) -> anyhow::Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());

        let base = path.unwrap_or_else(|| Path::new("config.toml"));
        let mut figment = Figment::from(Serialized::defaults(Settings::default())).merge(Toml::file(base));
        match env_name.as_str() {
            "dev" | "development" => figment = figment.merge(Toml::file("config.dev.toml")),
            "prod" | "production" => figment = figment.merge(Toml::file("config.prod.toml")),
            "test" | "testing" => figment = figment.merge(Toml::file("config.test.toml")),
            _ => {}
        }
        figment = figment
            .merge(Env::prefixed("APP_").split("__"))
            .merge(Env::raw().only(&["SOLR_URL"]).map(|_| "solr.url".into()))
            .merge(Env::raw().only(&["MODEL_DIR", "APP_MODEL_DIR"]).map(|_| "embedder.model_dir".into()));

        let config = Self { figment };
        config.validate_for_env(&env_name)?;
        Ok(config)
    }

    pub fn from_figment(figment: Figment) -> Self {
        Self { figment }
    }

    pub fn get<T>(&self, key: &str) -> anyhow::Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        self.figment
            .extract_inner(key)
            .map_err(|e| anyhow::anyhow!("Failed to get '{}': {}", key, e))
    }

    pub fn settings(&self) -> anyhow::Result<Settings> {
        let settings: Settings = self
            .figment
            .extract()
            .map_err(|e| anyhow::anyhow!("Failed to extract settings: {}", e))?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate_for_env(&self, env: &str) -> anyhow::Result<()> {
        let settings = self.settings()?;
        if matches!(env, "prod" | "production") && settings.embedder.use_fake {
            tracing::warn!("embedder.use_fake is enabled in a production environment");
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub solr: SolrConfig,
    pub pipeline: PipelineConfig,
    pub embedder: EmbedderConfig,
    pub query: QueryConfig,
}

impl Settings {
    pub fn validate(&self) -> Result<()> {
        if !(self.solr.url.starts_with("http://") || self.solr.url.starts_with("https://")) {
            return Err(Error::InvalidConfig(format!("solr.url must be an http(s) URL, got '{}'", self.solr.url)));
        }
        if self.pipeline.batch_size == 0 {
            return Err(Error::InvalidConfig("pipeline.batch_size must be at least 1".into()));
        }
        if self.pipeline.expected_dim == Some(0) {
            return Err(Error::InvalidConfig("pipeline.expected_dim must be positive".into()));
        }
        if self.query.top_k == 0 || self.query.rerank_docs == 0 {
            return Err(Error::InvalidConfig("query.top_k and query.rerank_docs must be at least 1".into()));
        }
        if self.query.vector_field.trim().is_empty() || self.query.id_field.trim().is_empty() {
            return Err(Error::InvalidConfig("query field names must not be empty".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolrConfig {
    /// Core/collection URL, e.g. `http://localhost:8983/solr/ms-marco`.
    pub url: String,
    pub timeout_secs: u64,
    /// Total attempts per request, including the first.
    pub max_retries: usize,
    /// Base delay, doubled per retry.
    pub retry_backoff_ms: u64,
    /// Append `commit=true` to every update request.
    pub always_commit: bool,
    pub return_fields: String,
}

impl Default for SolrConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:8983/solr/ms-marco".to_string(),
            timeout_secs: 10,
            max_retries: 3,
            retry_backoff_ms: 500,
            always_commit: true,
            return_fields: "id,text,score".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub batch_size: usize,
    pub alignment: AlignmentPolicy,
    /// When unset, the dimension of the first valid vector is used.
    pub expected_dim: Option<usize>,
    pub commit_on_finish: bool,
    pub progress: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            batch_size: 100,
            alignment: AlignmentPolicy::Truncate,
            expected_dim: None,
            commit_on_finish: false,
            progress: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbedderConfig {
    pub model: String,
    pub model_dir: Option<String>,
    pub max_len: usize,
    pub use_fake: bool,
    pub fake_dim: usize,
}

impl EmbedderConfig {
    pub fn resolved_model_dir(&self) -> Option<PathBuf> {
        self.model_dir.as_deref().map(expand_path)
    }
}

impl Default for EmbedderConfig {
    fn default() -> Self {
        Self {
            model: "all-MiniLM-L6-v2".to_string(),
            model_dir: None,
            max_len: 256,
            use_fake: false,
            fake_dim: 384,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    pub vector_field: String,
    pub id_field: String,
    pub top_k: usize,
    pub lexical_field: String,
    pub rerank_docs: usize,
    pub rerank_weight: f32,
    /// Default id set for filtered KNN.
    pub filter_ids: Vec<String>,
    /// Default keyword text for the lexical half of hybrid queries.
    pub lexical_text: String,
    /// Default first-stage query for rerank.
    pub rerank_base: String,
    pub suite_queries: Vec<String>,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            vector_field: "vector".to_string(),
            id_field: "id".to_string(),
            top_k: 3,
            lexical_field: "text".to_string(),
            rerank_docs: 4,
            rerank_weight: 1.0,
            filter_ids: (0..5).map(|i| i.to_string()).collect(),
            lexical_text: "bank".to_string(),
            rerank_base: "id:(0 1 2 3 4)".to_string(),
            suite_queries: vec![
                "what is a bank transit number".to_string(),
                "financial institution information".to_string(),
                "federal tax identification".to_string(),
            ],
        }
    }
}

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}
