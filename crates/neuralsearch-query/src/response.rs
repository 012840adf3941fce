use serde_json::Value;

use neuralsearch_core::types::{SearchDoc, SearchResponse};
use neuralsearch_core::{Error, Result};

/// Reads `response.numFound` and `response.docs[{id, text, score}]` from a Solr reply.
///
/// `text` may be a multi-valued field, in which case the values are joined
/// with a space. Missing `text` or `score` default to empty / zero; a missing
/// `id`, `numFound` or `docs` is a `MalformedResponse`.
pub fn parse_response(body: &Value) -> Result<SearchResponse> {
    let response = body
        .get("response")
        .ok_or_else(|| malformed(body, "missing 'response'"))?;
    let num_found = response
        .get("numFound")
        .and_then(Value::as_u64)
        .ok_or_else(|| malformed(body, "missing or invalid 'response.numFound'"))?;
    let docs = response
        .get("docs")
        .and_then(Value::as_array)
        .ok_or_else(|| malformed(body, "missing or invalid 'response.docs'"))?;

    let docs = docs
        .iter()
        .enumerate()
        .map(|(i, doc)| parse_doc(doc).ok_or_else(|| malformed(body, &format!("document {i} has no usable id"))))
        .collect::<Result<Vec<_>>>()?;
    Ok(SearchResponse { num_found, docs })
}

fn parse_doc(doc: &Value) -> Option<SearchDoc> {
    let id = match doc.get("id")? {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    let text = match doc.get("text") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Array(values)) => values.iter().filter_map(Value::as_str).collect::<Vec<_>>().join(" "),
        _ => String::new(),
    };
    let score = doc.get("score").and_then(Value::as_f64).unwrap_or(0.0) as f32;
    Some(SearchDoc { id, text, score })
}

fn malformed(body: &Value, what: &str) -> Error {
    // Solr error bodies carry the useful part under `error.msg`.
    match body.pointer("/error/msg").and_then(Value::as_str) {
        Some(msg) => Error::MalformedResponse(format!("{what} (backend said: {msg})")),
        None => Error::MalformedResponse(what.to_string()),
    }
}
