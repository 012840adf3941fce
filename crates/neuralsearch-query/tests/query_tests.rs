use std::sync::Mutex;

use serde_json::{json, Value};

use neuralsearch_core::config::QueryConfig;
use neuralsearch_core::traits::{Embedder, IndexClient};
use neuralsearch_core::types::IndexEntry;
use neuralsearch_core::{Error, Result};
use neuralsearch_embed::FakeEmbedder;
use neuralsearch_query::{
    health_check, run_suite, NeuralSearcher, QueryBuilder, QueryMode, QueryRequest, QuerySpec,
};

/// Records every payload and answers with a canned body.
struct FakeSolr {
    reply: Value,
    status: String,
    fail_rerank: bool,
    not_json: bool,
    payloads: Mutex<Vec<Value>>,
}

impl FakeSolr {
    fn new(reply: Value) -> Self {
        Self { reply, status: "OK".into(), fail_rerank: false, not_json: false, payloads: Mutex::new(Vec::new()) }
    }
    fn payloads(&self) -> Vec<Value> { self.payloads.lock().unwrap().clone() }
}

impl IndexClient for FakeSolr {
    fn add(&self, _entries: &[IndexEntry]) -> Result<()> { Ok(()) }
    fn commit(&self) -> Result<()> { Ok(()) }
    fn query(&self, payload: &Value) -> Result<Value> {
        self.payloads.lock().unwrap().push(payload.clone());
        if payload.get("limit") == Some(&json!(0)) {
            return Ok(json!({"response": {"numFound": 20, "docs": []}}));
        }
        if self.fail_rerank && payload.get("params").is_some() {
            return Err(Error::Backend { status: 500, body: "rerank parser not configured".into() });
        }
        if self.not_json {
            return Err(Error::MalformedResponse("query: response is not JSON: expected value".into()));
        }
        Ok(self.reply.clone())
    }
    fn ping(&self) -> Result<String> { Ok(self.status.clone()) }
}

fn hits() -> Value {
    json!({"response": {"numFound": 2, "docs": [
        {"id": "3", "text": "Bank transit numbers are used for electronic transfers", "score": 0.82},
        {"id": "4", "text": "A routing number", "score": 0.61}
    ]}})
}

fn searcher(client: FakeSolr) -> NeuralSearcher<FakeSolr> {
    NeuralSearcher::new(Box::new(FakeEmbedder::new(8)), client, &QueryConfig::default())
}

#[test]
fn filtered_knn_payload() {
    let payload = QueryBuilder::default().build_filtered_knn(&[0.1, 0.2], 3, &["0", "1"]).unwrap();
    assert_eq!(payload["filter"], "id:(0 1)");
    assert_eq!(payload["query"], "{!knn f=vector topK=3}[0.1, 0.2]");
}

#[test]
fn filter_keeps_input_order() {
    let payload = QueryBuilder::default().build_filtered_knn(&[1.0], 3, &["9", "2", "5"]).unwrap();
    assert_eq!(payload["filter"], "id:(9 2 5)");
}

#[test]
fn plain_knn_payload_is_a_single_clause() {
    let payload = QueryBuilder::default().build(&QuerySpec::Plain { vector: vec![0.5, -1.0], top_k: 3 }).unwrap();
    assert_eq!(payload, json!({"query": "{!knn f=vector topK=3}[0.5, -1]"}));
}

#[test]
fn hybrid_payload_ors_lexical_and_knn() {
    let spec = QuerySpec::Hybrid {
        vector: vec![0.1, 0.2],
        top_k: 3,
        lexical_field: "text".into(),
        lexical_text: "bank".into(),
    };
    let payload = QueryBuilder::default().build(&spec).unwrap();
    let bool_query = &payload["query"]["bool"];
    assert!(bool_query.get("must").is_none());
    assert!(bool_query.get("filter").is_none());

    let should = bool_query["should"].as_array().unwrap();
    assert_eq!(should.len(), 2);
    assert_eq!(should[0], "{!type=edismax qf=text v='bank'}");
    assert_eq!(should[1], "{!knn f=vector topK=3}[0.1, 0.2]");
}

#[test]
fn rerank_only_reorders_the_base_query() {
    let spec = QuerySpec::Rerank {
        base_query: "id:(0 1 2 3 4)".into(),
        vector: vec![0.1, 0.2],
        rerank_docs: 4,
        rerank_weight: 1.0,
    };
    let payload = QueryBuilder::default().build(&spec).unwrap();
    assert_eq!(payload["query"], "id:(0 1 2 3 4)");
    assert_eq!(payload["params"]["rq"], "{!rerank reRankQuery=$rqq reRankDocs=4 reRankWeight=1}");
    assert_eq!(payload["params"]["rqq"], "{!knn f=vector topK=4}[0.1, 0.2]");
    assert!(!payload["query"].as_str().unwrap().contains("knn"));
}

#[test]
fn search_parses_ranked_docs() {
    let s = searcher(FakeSolr::new(hits()));
    let outcome = s.search(QueryRequest::Knn { text: "what is a bank transit number".into(), top_k: 3 }).unwrap();
    assert!(outcome.is_ok());
    assert_eq!(outcome.response.num_found, 2);
    assert_eq!(outcome.response.ids(), vec!["3", "4"]);

    let sent = s.client().payloads();
    assert_eq!(sent.len(), 1);
    let expected = QueryBuilder::default().knn_clause(&s.vectorize("what is a bank transit number").unwrap(), 3);
    assert_eq!(sent[0]["query"], expected.as_str());
}

#[test]
fn each_search_embeds_independently() {
    let s = searcher(FakeSolr::new(hits()));
    s.search(QueryRequest::Knn { text: "bank".into(), top_k: 3 }).unwrap();
    s.search(QueryRequest::Knn { text: "tax".into(), top_k: 3 }).unwrap();
    let sent = s.client().payloads();
    assert_ne!(sent[0]["query"], sent[1]["query"]);
}

#[test]
fn malformed_response_degrades_to_empty() {
    let s = searcher(FakeSolr::new(json!({"responseHeader": {"status": 0}})));
    let outcome = s.search(QueryRequest::Knn { text: "bank".into(), top_k: 3 }).unwrap();
    assert!(outcome.response.docs.is_empty());
    assert_eq!(outcome.response.num_found, 0);
    assert!(matches!(outcome.error, Some(Error::MalformedResponse(_))));
}

#[test]
fn non_json_reply_degrades_to_empty() {
    let s = searcher(FakeSolr { not_json: true, ..FakeSolr::new(hits()) });
    let outcome = s.search(QueryRequest::Knn { text: "bank".into(), top_k: 3 }).unwrap();
    assert!(!outcome.is_ok());
    assert!(outcome.response.docs.is_empty());
    assert!(matches!(outcome.error, Some(Error::MalformedResponse(_))));
}

#[test]
fn backend_errors_are_returned() {
    let client = FakeSolr { fail_rerank: true, ..FakeSolr::new(hits()) };
    let s = searcher(client);
    let req = QueryRequest::with_defaults(QueryMode::Rerank, "bank", &QueryConfig::default());
    let err = s.search(req).unwrap_err();
    assert!(err.is_recoverable());
}

#[test]
fn empty_filter_ids_are_rejected_before_dispatch() {
    let s = searcher(FakeSolr::new(hits()));
    let err = s.search(QueryRequest::Filtered { text: "bank".into(), top_k: 3, ids: vec![] }).unwrap_err();
    assert!(matches!(err, Error::InvalidConfig(_)));
    assert!(s.client().payloads().is_empty());
}

#[test]
fn health_reports_status_and_count() {
    let client = FakeSolr::new(hits());
    let report = health_check(&client).unwrap();
    assert!(report.is_ok());
    assert_eq!(report.num_docs, 20);
    assert_eq!(client.payloads()[0], json!({"query": "*:*", "limit": 0}));
}

#[test]
fn suite_runs_every_mode_for_every_query() {
    let s = searcher(FakeSolr::new(hits()));
    let cfg = QueryConfig::default();
    let summary = run_suite(&s, &cfg).unwrap();
    assert_eq!(summary.total, 12);
    assert_eq!(summary.succeeded, 12);
    assert_eq!(summary.success_rate(), 100.0);
    // health count query plus one request per case
    assert_eq!(s.client().payloads().len(), 13);
}

#[test]
fn suite_counts_failures_without_stopping() {
    let client = FakeSolr { fail_rerank: true, ..FakeSolr::new(hits()) };
    let s = searcher(client);
    let summary = run_suite(&s, &QueryConfig::default()).unwrap();
    assert_eq!(summary.total, 12);
    assert_eq!(summary.failed, 3);
    assert!(summary.cases.iter().filter(|c| c.error.is_some()).all(|c| c.mode == QueryMode::Rerank));
    assert_eq!(summary.success_rate(), 75.0);
}

#[test]
fn unhealthy_backend_stops_the_suite() {
    let client = FakeSolr { status: "DOWN".into(), ..FakeSolr::new(hits()) };
    let s = searcher(client);
    assert!(run_suite(&s, &QueryConfig::default()).is_err());
    assert_eq!(s.client().payloads().len(), 1);
}

struct SilentEmbedder;

impl Embedder for SilentEmbedder {
    fn dim(&self) -> usize { 4 }
    fn max_len(&self) -> usize { 8 }
    fn embed_batch(&self, _texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>> { Ok(Vec::new()) }
}

#[test]
fn missing_query_vector_is_an_embedding_error() {
    let s = NeuralSearcher::new(Box::new(SilentEmbedder), FakeSolr::new(hits()), &QueryConfig::default());
    assert!(matches!(s.vectorize("bank"), Err(Error::Embedding(_))));
}
