//! Upstream HTTP page source

use async_trait::async_trait;
use serde_json::Value;
use tracing::error;

use super::errors::SourceError;

/// A paginated source of raw player pages.
///
/// The fetch loop is generic over this seam so it can be driven without a
/// network in tests; `UpstreamClient` is the production implementation.
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Fetch one page of raw items with identifiers greater than `floor`
    async fn fetch_page(&self, floor: u64, limit: usize) -> Result<Vec<Value>, SourceError>;
}

/// reqwest-backed client for the upstream player API
pub struct UpstreamClient {
    client: reqwest::Client,
    url: String,
    token: String,
}

impl UpstreamClient {
    /// Build a client against `endpoint` (base URL, no trailing slash
    /// required). The underlying `reqwest::Client` is reused across all
    /// fetches for connection pooling.
    pub fn new(endpoint: &str, token: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: format!("{}/v2/player", endpoint.trim_end_matches('/')),
            token: token.to_string(),
        }
    }
}

#[async_trait]
impl PageSource for UpstreamClient {
    async fn fetch_page(&self, floor: u64, limit: usize) -> Result<Vec<Value>, SourceError> {
        let response = self
            .client
            .get(&self.url)
            .query(&[
                ("limit", limit.to_string()),
                ("player_id", floor.to_string()),
                ("greater_than", "1".to_string()),
            ])
            .header("token", &self.token)
            .send()
            .await
            .map_err(|e| SourceError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(
                status = status.as_u16(),
                url = %self.url,
                floor,
                limit,
                body = %body,
                "upstream fetch failed"
            );
            return Err(SourceError::HttpStatus {
                status: status.as_u16(),
                url: self.url.clone(),
                floor,
                limit,
                body,
            });
        }

        response
            .json::<Vec<Value>>()
            .await
            .map_err(|e| SourceError::PageParse(e.to_string()))
    }
}
