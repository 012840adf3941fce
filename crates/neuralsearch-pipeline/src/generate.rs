//! Generate mode: documents in, one encoded vector line per document out.

use std::fs::{self, File};
use std::io::{BufRead, BufWriter, Write};
use std::path::Path;
use std::time::Instant;

use neuralsearch_core::codec;
use neuralsearch_core::config::PipelineConfig;
use neuralsearch_core::documents::{open_file, DocumentReader};
use neuralsearch_core::traits::Embedder;
use neuralsearch_core::types::Document;
use neuralsearch_core::{Error, Result};

use crate::batch::Batcher;
use crate::progress::spinner;
use crate::summary::GenerateSummary;

#[derive(Debug, Clone)]
pub struct GenerateOptions {
    pub batch_size: usize,
    pub progress: bool,
}

impl Default for GenerateOptions {
    fn default() -> Self { Self { batch_size: 100, progress: false } }
}

impl From<&PipelineConfig> for GenerateOptions {
    fn from(cfg: &PipelineConfig) -> Self {
        Self { batch_size: cfg.batch_size, progress: cfg.progress }
    }
}

/// Embeds every document of `docs` and writes the vectors to `out` in input order.
///
/// The embedder is called once per batch. A result with the wrong number of
/// vectors, or a vector of the wrong dimension, aborts the run since the output
/// would no longer line up with the document file.
pub fn generate_vectors<R, W>(docs: R, out: &mut W, embedder: &dyn Embedder, opts: &GenerateOptions) -> Result<GenerateSummary>
where
    R: BufRead,
    W: Write,
{
    let start = Instant::now();
    let pb = spinner(opts.progress, "documents");
    let mut batcher = Batcher::new(opts.batch_size);
    let mut summary = GenerateSummary { dim: embedder.dim(), ..Default::default() };

    for doc in DocumentReader::new(docs) {
        if let Some(batch) = batcher.push(doc?) {
            write_batch(&batch, out, embedder, &mut summary)?;
            pb.set_position(summary.documents as u64);
        }
    }
    if let Some(batch) = batcher.finish() {
        write_batch(&batch, out, embedder, &mut summary)?;
        pb.set_position(summary.documents as u64);
    }
    out.flush()?;
    pb.finish_and_clear();

    tracing::info!(
        documents = summary.documents,
        batches = summary.batches,
        dim = summary.dim,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "vector generation finished"
    );
    Ok(summary)
}

fn write_batch<W: Write>(batch: &[Document], out: &mut W, embedder: &dyn Embedder, summary: &mut GenerateSummary) -> Result<()> {
    let texts: Vec<String> = batch.iter().map(|d| d.text.clone()).collect();
    let vectors = embedder.embed_batch(&texts).map_err(|e| Error::Embedding(format!("{e:#}")))?;
    if vectors.len() != texts.len() {
        return Err(Error::Embedding(format!(
            "embedder returned {} vectors for {} documents",
            vectors.len(),
            texts.len()
        )));
    }
    for vector in &vectors {
        if vector.len() != summary.dim {
            return Err(Error::DimensionMismatch { expected: summary.dim, actual: vector.len() });
        }
        codec::write_vector(out, vector)?;
    }
    summary.documents += vectors.len();
    summary.batches += 1;
    tracing::info!(batch = summary.batches, size = batch.len(), total = summary.documents, "embedded batch");
    Ok(())
}

/// File wrapper around [`generate_vectors`]; creates the output's parent directory.
pub fn generate_vectors_file(input: &Path, output: &Path, embedder: &dyn Embedder, opts: &GenerateOptions) -> Result<GenerateSummary> {
    let docs = open_file(input)?;
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let mut out = BufWriter::new(File::create(output)?);
    tracing::info!(input = %input.display(), output = %output.display(), "generating vectors");
    generate_vectors(docs, &mut out, embedder, opts)
}
