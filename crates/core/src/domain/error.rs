use serde::Serialize;

/// アプリケーション共通エラーコード
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorCode {
    /// 名言APIの取得失敗・レスポンス不正
    #[serde(rename = "E_NETWORK")]
    NetworkFailure,
    /// 読み上げエンジンが利用不可/失敗
    #[serde(rename = "E_NARRATION")]
    NarrationUnavailable,
    #[serde(rename = "E_INVALID_STATE")]
    InvalidState,
    #[serde(rename = "E_CONFIG")]
    Config,
    #[serde(rename = "E_INTERNAL")]
    Internal,
}

/// アプリケーションエラー（ログ・UI表示兼用）
#[derive(Debug, Clone, Serialize)]
pub struct AppError {
    pub code: ErrorCode,
    pub message: String,
    pub recoverable: bool,
}

impl AppError {
    pub fn network(msg: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::NetworkFailure,
            message: msg.into(),
            recoverable: true,
        }
    }

    pub fn narration(msg: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::NarrationUnavailable,
            message: msg.into(),
            recoverable: true,
        }
    }

    pub fn invalid_state(msg: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::InvalidState,
            message: msg.into(),
            recoverable: true,
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::Config,
            message: msg.into(),
            recoverable: false,
        }
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::Internal,
            message: msg.into(),
            recoverable: false,
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for AppError {}

impl From<crate::infra::quote::QuoteError> for AppError {
    fn from(e: crate::infra::quote::QuoteError) -> Self {
        Self::network(e.to_string())
    }
}

impl From<crate::infra::speech::SpeechError> for AppError {
    fn from(e: crate::infra::speech::SpeechError) -> Self {
        Self::narration(e.to_string())
    }
}
