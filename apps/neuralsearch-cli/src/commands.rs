use std::path::Path;

use anyhow::{bail, Context, Result};
use serde_json::json;

use neuralsearch_core::codec;
use neuralsearch_core::config::Settings;
use neuralsearch_core::documents::{sample_documents, write_documents};
use neuralsearch_core::traits::IndexClient;
use neuralsearch_core::types::{AlignmentPolicy, SearchResponse};
use neuralsearch_embed::get_default_embedder;
use neuralsearch_pipeline::{generate_vectors_file, index_files, GenerateOptions, IndexOptions};
use neuralsearch_query::{health_check, run_suite, NeuralSearcher, QueryMode, QueryRequest};
use neuralsearch_solr::SolrClient;

use crate::cli::QueryArgs;

pub fn generate(settings: &Settings, docs: &Path, vectors: &Path, batch_size: Option<usize>) -> Result<()> {
    let embedder = get_default_embedder(&settings.embedder)?;
    let mut opts = GenerateOptions::from(&settings.pipeline);
    if let Some(size) = batch_size { opts.batch_size = size; }

    let summary = generate_vectors_file(docs, vectors, embedder.as_ref(), &opts)
        .with_context(|| format!("Failed to generate vectors for {}", docs.display()))?;
    println!("✅ {summary}");
    println!("📄 Vectors written to {}", vectors.display());
    Ok(())
}

pub fn index(settings: &Settings, docs: &Path, vectors: &Path, batch_size: Option<usize>, strict: bool, commit: bool) -> Result<()> {
    let client = SolrClient::new(&settings.solr)?;
    println!("Indexing {} + {} into {}", docs.display(), vectors.display(), client.base_url());
    index_into(settings, &client, docs, vectors, batch_size, strict, commit)
}

/// Pings the backend before any input is read; a failed or non-`OK` ping stops the run.
fn ensure_reachable(client: &dyn IndexClient) -> Result<()> {
    let status = client.ping().context("Solr is not reachable; start it before indexing")?;
    if status != "OK" {
        bail!("Solr ping returned status '{status}'");
    }
    tracing::info!(%status, "Solr reachable");
    Ok(())
}

fn index_into(
    settings: &Settings,
    client: &dyn IndexClient,
    docs: &Path,
    vectors: &Path,
    batch_size: Option<usize>,
    strict: bool,
    commit: bool,
) -> Result<()> {
    ensure_reachable(client)?;
    let mut opts = IndexOptions::from(&settings.pipeline);
    if let Some(size) = batch_size { opts.batch_size = size; }
    if strict { opts.alignment = AlignmentPolicy::Strict; }
    if commit { opts.commit_on_finish = true; }

    let summary = index_files(docs, vectors, client, &opts)?;
    for failure in &summary.failures {
        println!("⚠️  skipped {failure}");
    }
    if summary.is_empty() {
        println!("No records were indexed ({summary})");
    } else {
        println!("✅ {summary}");
    }
    Ok(())
}

pub fn query(settings: &Settings, args: QueryArgs) -> Result<()> {
    let cfg = &settings.query;
    let mut request = QueryRequest::with_defaults(args.mode, &args.text, cfg);
    match &mut request {
        QueryRequest::Knn { top_k, .. } => {
            if let Some(k) = args.top_k { *top_k = k; }
        }
        QueryRequest::Filtered { top_k, ids, .. } => {
            if let Some(k) = args.top_k { *top_k = k; }
            if let Some(v) = args.ids { *ids = v; }
        }
        QueryRequest::Hybrid { top_k, lexical_field, lexical_text, .. } => {
            if let Some(k) = args.top_k { *top_k = k; }
            if let Some(f) = args.field { *lexical_field = f; }
            if let Some(t) = args.lexical { *lexical_text = t; }
        }
        QueryRequest::Rerank { base_query, rerank_docs, rerank_weight, .. } => {
            if let Some(b) = args.base { *base_query = b; }
            if let Some(d) = args.rerank_docs { *rerank_docs = d; }
            if let Some(w) = args.rerank_weight { *rerank_weight = w; }
        }
    }

    let searcher = NeuralSearcher::new(get_default_embedder(&settings.embedder)?, SolrClient::new(&settings.solr)?, cfg);
    let outcome = searcher.search(request)?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcome.response)?);
    } else {
        print_response(args.mode, &args.text, &outcome.response);
    }
    if let Some(err) = outcome.error {
        println!("⚠️  {err}");
    }
    Ok(())
}

fn print_response(mode: QueryMode, text: &str, response: &SearchResponse) {
    println!("\n=== {mode} query: '{text}' ===");
    println!("Found {} documents", response.num_found);
    for (i, doc) in response.docs.iter().enumerate() {
        let preview: String = doc.text.chars().take(100).collect();
        println!("{}. ID: {} (Score: {:.4})", i + 1, doc.id, doc.score);
        println!("   Text: {preview}...");
    }
}

pub fn health(settings: &Settings) -> Result<()> {
    let client = SolrClient::new(&settings.solr)?;
    let report = health_check(&client).with_context(|| format!("Solr at {} is not healthy", client.base_url()))?;
    if !report.is_ok() {
        bail!("Solr ping returned status '{}'", report.status);
    }
    println!("✓ Solr ping successful: {}", report.status);
    println!("✓ Collection has {} documents", report.num_docs);
    Ok(())
}

pub fn all(settings: &Settings) -> Result<()> {
    let searcher = NeuralSearcher::new(get_default_embedder(&settings.embedder)?, SolrClient::new(&settings.solr)?, &settings.query);
    let summary = run_suite(&searcher, &settings.query)?;
    println!("✓ Solr healthy, {} documents", summary.health.num_docs);
    for case in &summary.cases {
        match &case.error {
            None => println!("  [{:<6}] '{}' -> {} found, top {:?}", case.mode, case.query, case.num_found, case.top_ids),
            Some(err) => println!("  [{:<6}] '{}' -> ✗ {}", case.mode, case.query, err),
        }
    }
    println!("\n📊 {summary}");
    Ok(())
}

pub fn vectorize(settings: &Settings, text: &str, as_json: bool) -> Result<()> {
    let embedder = get_default_embedder(&settings.embedder)?;
    let mut vectors = embedder.embed_batch(&[text.to_string()])?;
    let vector = vectors.pop().context("Embedder returned no vector")?;
    if as_json {
        let out = json!({ "query": text, "vector": vector, "dimension": vector.len() });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!("{}", codec::encode(&vector));
    }
    Ok(())
}

pub fn sample_data(dir: &Path) -> Result<()> {
    let path = dir.join("sample_documents.tsv");
    let count = write_documents(&path, sample_documents())?;
    println!("✅ Wrote {count} sample documents to {}", path.display());
    Ok(())
}
