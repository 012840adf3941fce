use std::fs;
use std::io::Cursor;
use std::sync::Mutex;

use serde_json::{json, Value};

use neuralsearch_core::codec;
use neuralsearch_core::traits::{Embedder, IndexClient};
use neuralsearch_core::types::{AlignmentPolicy, IndexEntry};
use neuralsearch_core::{Error, Result};
use neuralsearch_embed::FakeEmbedder;
use neuralsearch_pipeline::{
    generate_vectors, generate_vectors_file, index_documents, index_files, GenerateOptions, IndexOptions, Side,
};

#[derive(Default)]
struct RecordingClient {
    batches: Mutex<Vec<Vec<IndexEntry>>>,
    commits: Mutex<usize>,
}

impl RecordingClient {
    fn batches(&self) -> Vec<Vec<IndexEntry>> { self.batches.lock().unwrap().clone() }
    fn ids(&self) -> Vec<String> { self.batches().into_iter().flatten().map(|e| e.id).collect() }
}

impl IndexClient for RecordingClient {
    fn add(&self, entries: &[IndexEntry]) -> Result<()> {
        self.batches.lock().unwrap().push(entries.to_vec());
        Ok(())
    }
    fn commit(&self) -> Result<()> {
        *self.commits.lock().unwrap() += 1;
        Ok(())
    }
    fn query(&self, _payload: &Value) -> Result<Value> { Ok(json!({})) }
    fn ping(&self) -> Result<String> { Ok("OK".into()) }
}

/// Accepts `ok_batches` adds, then fails every call with a 503.
struct FailingClient {
    ok_batches: usize,
    calls: Mutex<usize>,
}

impl IndexClient for FailingClient {
    fn add(&self, _entries: &[IndexEntry]) -> Result<()> {
        let mut calls = self.calls.lock().unwrap();
        *calls += 1;
        if *calls > self.ok_batches {
            return Err(Error::Backend { status: 503, body: "unavailable".into() });
        }
        Ok(())
    }
    fn commit(&self) -> Result<()> { Ok(()) }
    fn query(&self, _payload: &Value) -> Result<Value> { Ok(json!({})) }
    fn ping(&self) -> Result<String> { Ok("OK".into()) }
}

fn opts(batch_size: usize) -> IndexOptions {
    IndexOptions { batch_size, ..Default::default() }
}

fn lines(items: &[&str]) -> Cursor<String> {
    let mut s = items.join("\n");
    if !items.is_empty() { s.push('\n'); }
    Cursor::new(s)
}

fn docs(n: usize) -> Cursor<String> {
    let items: Vec<String> = (0..n).map(|i| format!("document {i}")).collect();
    let refs: Vec<&str> = items.iter().map(String::as_str).collect();
    lines(&refs)
}

fn vectors(n: usize) -> Cursor<String> {
    let mut buf = Vec::new();
    for i in 0..n { codec::write_vector(&mut buf, &[i as f32, 0.5]).unwrap(); }
    Cursor::new(String::from_utf8(buf).unwrap())
}

#[test]
fn equal_counts_are_indexed_in_bounded_batches() {
    let client = RecordingClient::default();
    let summary = index_documents(docs(7), vectors(7), &client, &opts(3)).unwrap();

    let sizes: Vec<usize> = client.batches().iter().map(Vec::len).collect();
    assert_eq!(sizes, vec![3, 3, 1]);
    assert_eq!(client.ids(), vec!["0", "1", "2", "3", "4", "5", "6"]);
    assert_eq!(summary.indexed, 7);
    assert_eq!(summary.batches, 3);
    assert_eq!(summary.skipped, 0);
    assert!(summary.alignment.is_none());
}

#[test]
fn malformed_vector_is_skipped_and_counted() {
    let client = RecordingClient::default();
    let summary = index_documents(
        lines(&["a", "b", "c"]),
        lines(&["1.0,2.0", "x,2.0", "3.0,4.0"]),
        &client,
        &opts(100),
    )
    .unwrap();

    assert_eq!(client.ids(), vec!["0", "2"]);
    assert_eq!(summary.indexed, 2);
    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.failures.len(), 1);
    assert_eq!(summary.failures[0].ordinal, 1);
    assert_eq!(client.batches()[0][1].vector, vec![3.0, 4.0]);
}

#[test]
fn wrong_dimension_is_skipped() {
    let client = RecordingClient::default();
    let options = IndexOptions { expected_dim: Some(2), ..opts(10) };
    let summary = index_documents(lines(&["a", "b"]), lines(&["1,2,3", "4,5"]), &client, &options).unwrap();
    assert_eq!(client.ids(), vec!["1"]);
    assert_eq!(summary.skipped, 1);
    assert!(summary.failures[0].message.contains("dimension"));
}

#[test]
fn extra_documents_are_truncated_with_warning() {
    let client = RecordingClient::default();
    let summary = index_documents(docs(5), vectors(3), &client, &opts(2)).unwrap();

    assert_eq!(client.ids(), vec!["0", "1", "2"]);
    let warning = summary.alignment.expect("alignment warning");
    assert_eq!(warning.side, Side::Documents);
    assert_eq!(warning.unmatched, 2);
}

#[test]
fn strict_alignment_fails_on_mismatch() {
    let client = RecordingClient::default();
    let options = IndexOptions { alignment: AlignmentPolicy::Strict, ..opts(10) };
    let err = index_documents(docs(2), vectors(3), &client, &options).unwrap_err();
    assert!(matches!(err, Error::Alignment { documents: 2, vectors: 3 }));
    assert!(client.batches().is_empty());
}

#[test]
fn strict_file_mismatch_uploads_nothing() {
    let tmp = tempfile::tempdir().unwrap();
    let d = tmp.path().join("docs.tsv");
    let v = tmp.path().join("vectors.tsv");
    fs::write(&d, docs(4).into_inner()).unwrap();
    fs::write(&v, vectors(3).into_inner()).unwrap();

    let client = RecordingClient::default();
    let options = IndexOptions { alignment: AlignmentPolicy::Strict, ..opts(1) };
    let err = index_files(&d, &v, &client, &options).unwrap_err();
    assert!(matches!(err, Error::Alignment { documents: 4, vectors: 3 }));
    assert!(client.batches().is_empty());
}

#[test]
fn empty_input_never_calls_add() {
    let client = RecordingClient::default();
    let options = IndexOptions { commit_on_finish: true, ..opts(10) };
    let summary = index_documents(docs(0), vectors(0), &client, &options).unwrap();
    assert!(client.batches().is_empty());
    assert!(summary.is_empty());
    assert_eq!(*client.commits.lock().unwrap(), 0);
}

#[test]
fn commit_on_finish_commits_once() {
    let client = RecordingClient::default();
    let options = IndexOptions { commit_on_finish: true, ..opts(2) };
    let summary = index_documents(docs(5), vectors(5), &client, &options).unwrap();
    assert!(summary.committed);
    assert_eq!(*client.commits.lock().unwrap(), 1);
}

#[test]
fn flush_failure_reports_batch_context() {
    let client = FailingClient { ok_batches: 1, calls: Mutex::new(0) };
    let err = index_documents(docs(6), vectors(6), &client, &opts(2)).unwrap_err();
    match err {
        Error::Indexing { batch, first_id, last_id, source } => {
            assert_eq!(batch, 2);
            assert_eq!(first_id, "2");
            assert_eq!(last_id, "3");
            assert!(source.is_recoverable());
        }
        other => panic!("expected Indexing error, got {other:?}"),
    }
}

#[test]
fn missing_vector_file_is_not_found() {
    let tmp = tempfile::tempdir().unwrap();
    let d = tmp.path().join("docs.tsv");
    fs::write(&d, "a\n").unwrap();
    let err = index_files(&d, &tmp.path().join("missing.tsv"), &RecordingClient::default(), &opts(1)).unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}

#[test]
fn generated_vectors_follow_document_order() {
    let embedder = FakeEmbedder::new(16);
    let mut out = Vec::new();
    let options = GenerateOptions { batch_size: 2, progress: false };
    let summary = generate_vectors(lines(&["a", "b", "c"]), &mut out, &embedder, &options).unwrap();

    assert_eq!(summary.documents, 3);
    assert_eq!(summary.batches, 2);
    assert_eq!(summary.dim, 16);

    let text = String::from_utf8(out).unwrap();
    let written: Vec<Vec<f32>> = text.lines().map(|l| codec::decode(l).unwrap()).collect();
    let expected = embedder.embed_batch(&["a".to_string(), "b".to_string(), "c".to_string()]).unwrap();
    assert_eq!(written.len(), 3);
    for (w, e) in written.iter().zip(&expected) {
        for (x, y) in w.iter().zip(e) {
            assert!((x - y).abs() <= 1e-6);
        }
    }
}

#[test]
fn generate_then_index_round_trip() {
    let tmp = tempfile::tempdir().unwrap();
    let d = tmp.path().join("docs.tsv");
    let v = tmp.path().join("out/nested/vectors.tsv");
    fs::write(&d, "bank routing\nfederal tax id\nneural search\n").unwrap();

    let embedder = FakeEmbedder::new(8);
    generate_vectors_file(&d, &v, &embedder, &GenerateOptions::default()).unwrap();
    assert!(v.exists());

    let client = RecordingClient::default();
    let summary = index_files(&d, &v, &client, &opts(100)).unwrap();
    assert_eq!(summary.indexed, 3);
    let entries = &client.batches()[0];
    assert_eq!(entries[1].text, "federal tax id");
    assert_eq!(entries[1].vector.len(), 8);
}

#[test]
fn missing_document_file_fails_generate() {
    let tmp = tempfile::tempdir().unwrap();
    let err = generate_vectors_file(
        &tmp.path().join("nope.tsv"),
        &tmp.path().join("vectors.tsv"),
        &FakeEmbedder::new(4),
        &GenerateOptions::default(),
    )
    .unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}

struct ShortEmbedder;

impl Embedder for ShortEmbedder {
    fn dim(&self) -> usize { 2 }
    fn max_len(&self) -> usize { 16 }
    fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>> {
        Ok(texts.iter().skip(1).map(|_| vec![0.0, 1.0]).collect())
    }
}

#[test]
fn embedder_count_mismatch_is_an_embedding_error() {
    let mut out = Vec::new();
    let err = generate_vectors(lines(&["a", "b"]), &mut out, &ShortEmbedder, &GenerateOptions::default()).unwrap_err();
    assert!(matches!(err, Error::Embedding(_)));
    assert!(out.is_empty());
}
