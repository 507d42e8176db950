use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use super::{Quote, QuoteError, QuoteSource};

const USER_AGENT: &str = concat!("QuoteNarrator/", env!("CARGO_PKG_VERSION"));

/// 公開名言API（`[{"q": ..., "a": ...}]` 形式）へのHTTPクライアント
pub struct HttpQuoteSource {
    client: reqwest::Client,
    endpoint: String,
}

#[derive(Deserialize)]
struct QuoteEntry {
    #[serde(rename = "q")]
    quote: Option<String>,
    #[serde(rename = "a")]
    author: Option<String>,
}

impl HttpQuoteSource {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, QuoteError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| QuoteError::Network(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

/// レスポンス本文をパースして先頭の名言を取り出す。
pub fn parse_quote_body(body: &str) -> Result<Quote, QuoteError> {
    let entries: Vec<QuoteEntry> = serde_json::from_str(body.trim()).map_err(|e| {
        let raw: String = body.chars().take(200).collect();
        QuoteError::Malformed(format!("{e}. Raw: {raw}"))
    })?;

    let first = entries.into_iter().next().ok_or(QuoteError::Empty)?;

    let text = first
        .quote
        .map(|q| q.trim().to_string())
        .filter(|q| !q.is_empty())
        .ok_or_else(|| QuoteError::Malformed("quote text is missing".to_string()))?;

    let author = first
        .author
        .map(|a| a.trim().to_string())
        .filter(|a| !a.is_empty());

    Ok(Quote { text, author })
}

#[async_trait]
impl QuoteSource for HttpQuoteSource {
    async fn fetch(&self) -> Result<Quote, QuoteError> {
        log::debug!("GET {}", self.endpoint);

        let response = self.client.get(&self.endpoint).send().await.map_err(|e| {
            if e.is_timeout() {
                QuoteError::Timeout
            } else {
                QuoteError::Network(format!("HTTP request failed: {e}"))
            }
        })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(QuoteError::Status { status, body });
        }

        let body = response
            .text()
            .await
            .map_err(|e| QuoteError::Network(format!("Failed to read response body: {e}")))?;

        parse_quote_body(&body)
    }

    fn name(&self) -> &str {
        "http"
    }
}
