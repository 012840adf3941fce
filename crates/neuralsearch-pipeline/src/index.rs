//! Index mode: pair documents with precomputed vector lines and upload them in batches.

use std::io::BufRead;
use std::path::Path;
use std::time::Instant;

use neuralsearch_core::codec;
use neuralsearch_core::config::PipelineConfig;
use neuralsearch_core::documents::{open_file, DocumentReader, LossyLines};
use neuralsearch_core::traits::IndexClient;
use neuralsearch_core::types::{AlignmentPolicy, Document, IndexEntry};
use neuralsearch_core::{Error, Result};

use crate::align::Aligned;
use crate::batch::Batcher;
use crate::progress::spinner;
use crate::summary::{IndexSummary, RecordError};

#[derive(Debug, Clone)]
pub struct IndexOptions {
    pub batch_size: usize,
    pub alignment: AlignmentPolicy,
    /// Required vector length; inferred from the first valid vector when `None`.
    pub expected_dim: Option<usize>,
    pub commit_on_finish: bool,
    pub progress: bool,
}

impl Default for IndexOptions {
    fn default() -> Self {
        Self {
            batch_size: 100,
            alignment: AlignmentPolicy::Truncate,
            expected_dim: None,
            commit_on_finish: false,
            progress: false,
        }
    }
}

impl From<&PipelineConfig> for IndexOptions {
    fn from(cfg: &PipelineConfig) -> Self {
        Self {
            batch_size: cfg.batch_size,
            alignment: cfg.alignment,
            expected_dim: cfg.expected_dim,
            commit_on_finish: cfg.commit_on_finish,
            progress: cfg.progress,
        }
    }
}

/// Uploads `(document, vector)` pairs read in lockstep from `docs` and `vectors`.
///
/// Records whose vector line does not decode (or has the wrong dimension) are
/// logged, recorded in the summary and skipped. A failed `add` aborts the run
/// with [`Error::Indexing`] naming the lost batch; batches flushed before it
/// stay in the index.
pub fn index_documents<D, V>(docs: D, vectors: V, client: &dyn IndexClient, opts: &IndexOptions) -> Result<IndexSummary>
where
    D: BufRead,
    V: BufRead,
{
    let start = Instant::now();
    let pb = spinner(opts.progress, "records");
    let vector_lines = LossyLines::new(vectors).map(|line| line.map_err(Error::from));
    let mut pairs = Aligned::new(DocumentReader::new(docs), vector_lines, opts.alignment);
    let mut batcher = Batcher::new(opts.batch_size);
    let mut dim = opts.expected_dim;
    let mut summary = IndexSummary::default();

    for pair in pairs.by_ref() {
        let (doc, line) = pair?;
        summary.read += 1;
        pb.set_position(summary.read as u64);
        match to_entry(doc, &line, &mut dim) {
            Ok(entry) => {
                if let Some(batch) = batcher.push(entry) {
                    flush(client, batch, &mut summary)?;
                }
            }
            Err(failure) => {
                tracing::warn!(ordinal = failure.ordinal, error = %failure.message, "skipping record");
                summary.skipped += 1;
                summary.failures.push(failure);
            }
        }
    }
    if let Some(batch) = batcher.finish() {
        flush(client, batch, &mut summary)?;
    }
    pb.finish_and_clear();

    summary.alignment = pairs.warning();
    if let Some(w) = &summary.alignment {
        tracing::warn!(side = %w.side, unmatched = w.unmatched, "document and vector counts differ; unmatched records ignored");
    }
    if opts.commit_on_finish && summary.batches > 0 {
        client.commit()?;
        summary.committed = true;
    }

    tracing::info!(
        read = summary.read,
        indexed = summary.indexed,
        skipped = summary.skipped,
        batches = summary.batches,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "indexing finished"
    );
    Ok(summary)
}

/// File wrapper around [`index_documents`].
///
/// Under `AlignmentPolicy::Strict` both files are counted first so a length
/// mismatch fails before anything is uploaded.
pub fn index_files(docs_path: &Path, vectors_path: &Path, client: &dyn IndexClient, opts: &IndexOptions) -> Result<IndexSummary> {
    if opts.alignment == AlignmentPolicy::Strict {
        let documents = count_lines(docs_path)?;
        let vectors = count_lines(vectors_path)?;
        if documents != vectors {
            return Err(Error::Alignment { documents, vectors });
        }
    }
    tracing::info!(docs = %docs_path.display(), vectors = %vectors_path.display(), "indexing documents");
    index_documents(open_file(docs_path)?, open_file(vectors_path)?, client, opts)
}

fn count_lines(path: &Path) -> Result<usize> {
    let mut count = 0;
    for line in LossyLines::new(open_file(path)?) {
        line?;
        count += 1;
    }
    Ok(count)
}

fn to_entry(doc: Document, line: &str, dim: &mut Option<usize>) -> std::result::Result<IndexEntry, RecordError> {
    let decoded = match *dim {
        Some(expected) => codec::decode_with_dim(line, expected),
        None => codec::decode(line),
    };
    match decoded {
        Ok(vector) => {
            dim.get_or_insert(vector.len());
            Ok(IndexEntry::from_document(doc, vector))
        }
        Err(e) => Err(RecordError { ordinal: doc.ordinal, message: e.to_string() }),
    }
}

fn flush(client: &dyn IndexClient, batch: Vec<IndexEntry>, summary: &mut IndexSummary) -> Result<()> {
    let number = summary.batches + 1;
    if let Err(source) = client.add(&batch) {
        return Err(Error::Indexing {
            batch: number,
            first_id: batch.first().map(|e| e.id.clone()).unwrap_or_default(),
            last_id: batch.last().map(|e| e.id.clone()).unwrap_or_default(),
            source: Box::new(source),
        });
    }
    summary.batches = number;
    summary.indexed += batch.len();
    tracing::info!(batch = number, size = batch.len(), total = summary.indexed, "flushed batch");
    Ok(())
}
