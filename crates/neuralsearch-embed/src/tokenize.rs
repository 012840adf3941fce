use anyhow::{anyhow, Result};
use candle_core::{Device, Tensor};
use std::path::Path;
use tokenizers::{PaddingParams, PaddingStrategy, Tokenizer, TruncationParams};

/// Loads `tokenizer.json` configured to pad to the longest input and truncate at `max_len`.
pub fn load_tokenizer(path: &Path, max_len: usize) -> Result<Tokenizer> {
    let mut tokenizer = Tokenizer::from_file(path)
        .map_err(|e| anyhow!("Failed to load tokenizer from {}: {}", path.display(), e))?;
    tokenizer.with_padding(Some(PaddingParams { strategy: PaddingStrategy::BatchLongest, ..Default::default() }));
    tokenizer
        .with_truncation(Some(TruncationParams { max_length: max_len, ..Default::default() }))
        .map_err(|e| anyhow!("Failed to configure truncation: {}", e))?;
    Ok(tokenizer)
}

/// Returns `(input_ids, attention_mask)`, both `[B, T]`.
pub fn tokenize_batch_on_device(tokenizer: &Tokenizer, texts: &[String], device: &Device) -> Result<(Tensor, Tensor)> {
    let encodings = tokenizer.encode_batch(texts.to_vec(), true).map_err(|e| anyhow!("Tokenization failed: {}", e))?;
    let ids = encodings.iter().map(|e| Tensor::new(e.get_ids(), device)).collect::<candle_core::Result<Vec<_>>>()?;
    let mask = encodings.iter().map(|e| Tensor::new(e.get_attention_mask(), device)).collect::<candle_core::Result<Vec<_>>>()?;
    Ok((Tensor::stack(&ids, 0)?, Tensor::stack(&mask, 0)?))
}
