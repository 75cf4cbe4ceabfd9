// Upstream client - forwards translated requests to the backend origin

use axum::http::{HeaderMap, Method};
use reqwest::{Client, Response};
use serde_json::Value;
use tokio::time::Duration;

use crate::error::ProxyError;

/// Request body after the inbound translation step.
#[derive(Debug)]
pub enum ForwardBody {
    /// Parsed and re-serialized JSON.
    Json(Value),
    /// Raw text, forwarded as-is.
    Text(String),
}

pub struct UpstreamClient {
    http_client: Client,
    base_url: String,
}

impl UpstreamClient {
    pub fn new(base_url: String, timeout_secs: u64) -> Result<Self, ProxyError> {
        url::Url::parse(&base_url)
            .map_err(|e| ProxyError::Config(format!("invalid backend URL {}: {}", base_url, e)))?;

        let http_client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Shared client, reused for the token-exchange call so both
    /// outbound requests carry the same timeout.
    pub fn http_client(&self) -> Client {
        self.http_client.clone()
    }

    /// Build the backend URL: `<origin>/api/<path>`, query appended
    /// verbatim when non-empty.
    fn build_url(&self, path: &str, query: Option<&str>) -> String {
        let path = path.trim_start_matches('/');
        match query {
            Some(q) if !q.is_empty() => format!("{}/api/{}?{}", self.base_url, path, q),
            _ => format!("{}/api/{}", self.base_url, path),
        }
    }

    /// Single forwarding attempt, no retry.
    pub async fn forward(
        &self,
        method: Method,
        path: &str,
        query: Option<&str>,
        headers: HeaderMap,
        body: Option<ForwardBody>,
    ) -> Result<Response, ProxyError> {
        let url = self.build_url(path, query);
        tracing::debug!("Forwarding {} {}", method, url);

        let mut request = self.http_client.request(method, &url).headers(headers);

        match body {
            Some(ForwardBody::Json(value)) => {
                request = request.json(&value);
            }
            Some(ForwardBody::Text(text)) => {
                request = request.body(text);
            }
            None => {}
        }

        let response = request.send().await?;
        Ok(response)
    }
}
