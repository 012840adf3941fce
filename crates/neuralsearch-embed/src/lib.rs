//! neuralsearch-embed
//!
//! Sentence embedders behind the `neuralsearch_core::traits::Embedder` seam:
//! a BERT-family encoder run with candle (mean pooled, L2-normalized, e.g.
//! `all-MiniLM-L6-v2`) and a deterministic hashing embedder for tests.

use anyhow::{anyhow, Context, Result};
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};
use std::time::Instant;

use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::bert::{BertModel, Config as BertConfig};
use tokenizers::Tokenizer;
use twox_hash::XxHash64;

use neuralsearch_core::config::EmbedderConfig;
use neuralsearch_core::traits::Embedder;

pub mod device;
pub mod pool;
pub mod tokenize;

pub use pool::masked_mean_l2;

/// Inputs per forward pass; larger pipeline batches are split.
const ENCODE_CHUNK: usize = 32;

pub struct SentenceEmbedder {
    model: BertModel,
    tokenizer: Tokenizer,
    device: Device,
    dim: usize,
    max_len: usize,
}

impl SentenceEmbedder {
    /// Loads `config.json`, `tokenizer.json` and `model.safetensors`
    /// (or `pytorch_model.bin`) from `model_dir`.
    pub fn load(model_dir: &Path, max_len: usize) -> Result<Self> {
        let device = device::select_device();
        tracing::info!(dir = %model_dir.display(), "loading sentence embedding model");

        let config_path = model_dir.join("config.json");
        let raw_config = std::fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read {}", config_path.display()))?;
        let config: BertConfig = serde_json::from_str(&raw_config)?;
        let raw: serde_json::Value = serde_json::from_str(&raw_config)?;
        let dim = config_usize(&raw, "hidden_size").ok_or_else(|| anyhow!("config.json has no hidden_size"))?;
        let max_len = config_usize(&raw, "max_position_embeddings").map_or(max_len, |p| p.min(max_len));

        let tokenizer = tokenize::load_tokenizer(&model_dir.join("tokenizer.json"), max_len)?;
        let weights = load_weights(model_dir, &device)?;
        let vb = VarBuilder::from_tensors(weights, DType::F32, &device);
        let model = BertModel::load(vb, &config)?;
        tracing::info!(dim, max_len, "sentence embedding model loaded");
        Ok(Self { model, tokenizer, device, dim, max_len })
    }

    fn embed_chunk(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let (input_ids, attention_mask) = tokenize::tokenize_batch_on_device(&self.tokenizer, texts, &self.device)?;
        let token_type_ids = input_ids.zeros_like()?;
        let hidden = self.model.forward(&input_ids, &token_type_ids, Some(&attention_mask))?;
        let pooled = masked_mean_l2(&hidden, &attention_mask)?;
        Ok(pooled.to_device(&Device::Cpu)?.to_vec2::<f32>()?)
    }
}

impl Embedder for SentenceEmbedder {
    fn dim(&self) -> usize { self.dim }
    fn max_len(&self) -> usize { self.max_len }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let start = Instant::now();
        let mut out = Vec::with_capacity(texts.len());
        for chunk in texts.chunks(ENCODE_CHUNK) {
            out.extend(self.embed_chunk(chunk)?);
        }
        tracing::debug!(count = texts.len(), elapsed_ms = start.elapsed().as_millis() as u64, "embedded batch");
        Ok(out)
    }
}

fn config_usize(raw: &serde_json::Value, key: &str) -> Option<usize> {
    raw.get(key)?.as_u64().and_then(|v| usize::try_from(v).ok())
}

fn load_weights(model_dir: &Path, device: &Device) -> Result<HashMap<String, Tensor>> {
    let safetensors = model_dir.join("model.safetensors");
    if safetensors.exists() {
        return Ok(candle_core::safetensors::load(&safetensors, device)?);
    }
    let pickle = model_dir.join("pytorch_model.bin");
    if pickle.exists() {
        let tensors = candle_core::pickle::read_all(&pickle)?;
        return tensors
            .into_iter()
            .map(|(name, t)| -> Result<(String, Tensor)> { Ok((name, t.to_device(device)?)) })
            .collect();
    }
    Err(anyhow!("No model.safetensors or pytorch_model.bin in {}", model_dir.display()))
}

/// Hashed bag-of-words embedder: deterministic, L2-normalized, no model files.
pub struct FakeEmbedder { dim: usize }

impl FakeEmbedder {
    pub fn new(dim: usize) -> Self { Self { dim: dim.max(1) } }

    fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut v = vec![0f32; self.dim];
        for (i, token) in text.split_whitespace().enumerate() {
            let mut hasher = XxHash64::with_seed(0);
            token.to_lowercase().hash(&mut hasher);
            let h = hasher.finish();
            let idx = (h % self.dim as u64) as usize;
            let val = ((h >> 32) as u32) as f32 / u32::MAX as f32;
            v[idx] += val + (i % 3) as f32 * 0.01;
        }
        let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt().max(1e-6);
        for x in &mut v { *x /= norm; }
        v
    }
}

impl Embedder for FakeEmbedder {
    fn dim(&self) -> usize { self.dim }
    fn max_len(&self) -> usize { usize::MAX }
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.embed_text(t)).collect())
    }
}

fn fake_requested_by_env() -> bool {
    std::env::var("APP_USE_FAKE_EMBEDDINGS")
        .ok()
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

/// Builds the configured embedder; `APP_USE_FAKE_EMBEDDINGS=1` forces the fake one.
pub fn get_default_embedder(config: &EmbedderConfig) -> Result<Box<dyn Embedder>> {
    if config.use_fake || fake_requested_by_env() {
        tracing::info!(dim = config.fake_dim, "using FakeEmbedder");
        return Ok(Box::new(FakeEmbedder::new(config.fake_dim)));
    }
    let dir = resolve_model_dir(config)?;
    Ok(Box::new(SentenceEmbedder::load(&dir, config.max_len)?))
}

fn resolve_model_dir(config: &EmbedderConfig) -> Result<PathBuf> {
    if let Some(dir) = config.resolved_model_dir() {
        if dir.exists() { return Ok(dir); }
        return Err(anyhow!("Configured model directory {} does not exist", dir.display()));
    }
    for candidate in [Path::new("models").join(&config.model), Path::new("../models").join(&config.model)] {
        if candidate.exists() {
            tracing::info!(dir = %candidate.display(), "using model dir");
            return Ok(candidate);
        }
    }
    Err(anyhow!("Could not locate model directory for '{}'; set embedder.model_dir or MODEL_DIR", config.model))
}
