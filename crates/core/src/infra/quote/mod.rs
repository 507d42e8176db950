pub mod http;

pub use http::HttpQuoteSource;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// 取得した名言
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    pub text: String,
    pub author: Option<String>,
}

/// 名言取得エラー（すべて NetworkFailure 扱い）
#[derive(Debug, thiserror::Error)]
pub enum QuoteError {
    #[error("Quote request failed: {0}")]
    Network(String),
    #[error("Quote request timeout")]
    Timeout,
    #[error("Quote API error: {status} - {body}")]
    Status { status: u16, body: String },
    #[error("Malformed quote response: {0}")]
    Malformed(String),
    #[error("Quote response contained no quotes")]
    Empty,
}

/// 名言ソース trait（HTTP実装・テスト用フェイクが実装する）
#[async_trait]
pub trait QuoteSource: Send + Sync {
    async fn fetch(&self) -> Result<Quote, QuoteError>;

    fn name(&self) -> &str;
}
