use std::thread;
use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::StatusCode;
use serde_json::{json, Value};

use neuralsearch_core::config::SolrConfig;
use neuralsearch_core::traits::IndexClient;
use neuralsearch_core::types::IndexEntry;
use neuralsearch_core::{Error, Result};

/// Blocking client for one Solr core or collection.
#[derive(Clone)]
pub struct SolrClient {
    client: Client,
    base_url: String,
    max_retries: usize,
    backoff: Duration,
    always_commit: bool,
    return_fields: String,
}

impl SolrClient {
    pub fn new(config: &SolrConfig) -> Result<Self> {
        let url = config.url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(Error::InvalidConfig(format!("Solr URL must be an http(s) URL, got '{url}'")));
        }
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .default_headers(headers)
            .build()
            .map_err(|e| Error::InvalidConfig(format!("failed to build Solr HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: url.trim_end_matches('/').to_string(),
            max_retries: config.max_retries.max(1),
            backoff: Duration::from_millis(config.retry_backoff_ms),
            always_commit: config.always_commit,
            return_fields: config.return_fields.clone(),
        })
    }

    pub fn base_url(&self) -> &str { &self.base_url }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// Sends the request built by `build`, retrying 429/5xx and transport failures.
    fn send(&self, op: &str, build: impl Fn() -> RequestBuilder) -> Result<Response> {
        let mut attempt = 0usize;
        loop {
            match build().send() {
                Ok(resp) => {
                    let status = resp.status();
                    if status.is_success() {
                        return Ok(resp);
                    }
                    let body = resp.text().unwrap_or_else(|_| "<body unavailable>".to_string());
                    if should_retry(status) && attempt + 1 < self.max_retries {
                        attempt += 1;
                        tracing::warn!(op, %status, attempt, "Solr request failed; retrying");
                        thread::sleep(self.retry_backoff(attempt));
                        continue;
                    }
                    return Err(Error::Backend { status: status.as_u16(), body });
                }
                Err(err) => {
                    if is_retryable_error(&err) && attempt + 1 < self.max_retries {
                        attempt += 1;
                        tracing::warn!(op, error = %err, attempt, "Solr unreachable; retrying");
                        thread::sleep(self.retry_backoff(attempt));
                        continue;
                    }
                    return Err(Error::BackendUnavailable(format!("{op}: {err}")));
                }
            }
        }
    }

    fn retry_backoff(&self, attempt: usize) -> Duration {
        let capped = attempt.min(5) as u32;
        self.backoff * (1 << capped)
    }
}

fn should_retry(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

fn is_retryable_error(err: &reqwest::Error) -> bool {
    err.is_timeout() || err.is_connect() || err.is_body() || err.is_request()
}

fn read_json(op: &str, resp: Response) -> Result<Value> {
    resp.json::<Value>()
        .map_err(|e| Error::MalformedResponse(format!("{op}: response is not JSON: {e}")))
}

impl IndexClient for SolrClient {
    fn add(&self, entries: &[IndexEntry]) -> Result<()> {
        if entries.is_empty() {
            return Ok(());
        }
        let url = if self.always_commit { self.endpoint("update?commit=true") } else { self.endpoint("update") };
        self.send("add", || self.client.post(&url).json(entries))?;
        tracing::debug!(count = entries.len(), "Solr accepted documents");
        Ok(())
    }

    fn commit(&self) -> Result<()> {
        let url = self.endpoint("update");
        self.send("commit", || self.client.post(&url).json(&json!({ "commit": {} })))?;
        tracing::debug!("Solr commit acknowledged");
        Ok(())
    }

    fn query(&self, payload: &Value) -> Result<Value> {
        let url = self.endpoint(&format!("select?fl={}", self.return_fields));
        tracing::debug!(%payload, "Solr query");
        let resp = self.send("query", || self.client.post(&url).json(payload))?;
        read_json("query", resp)
    }

    fn ping(&self) -> Result<String> {
        let url = self.endpoint("admin/ping");
        let body = read_json("ping", self.send("ping", || self.client.get(&url))?)?;
        body.get("status")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| Error::MalformedResponse("ping: response has no status".into()))
    }
}
