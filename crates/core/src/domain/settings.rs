use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::error::AppError;

/// アプリケーション設定
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// 表示コンテンツ（静的おすすめ / 名言ポーリング）
    pub content_mode: ContentMode,
    /// ポーリング間隔（秒）
    pub poll_interval_secs: u64,
    /// 名言APIのエンドポイント
    pub quote_endpoint: String,
    /// HTTPタイムアウト（秒）
    pub request_timeout_secs: u64,
    /// 読み上げバックエンド
    pub speech_backend: SpeechBackend,
    /// 読み上げコマンド（command バックエンド用）
    pub speech_binary: String,
    /// 読み上げ速度（0.5 が標準）
    pub speech_rate: f32,
    /// 読み上げピッチ（1.0 が標準）
    pub speech_pitch: f32,
    /// 文ごとの読み上げ間隔（ミリ秒）
    pub chunk_offset_ms: u64,
    /// 文の区切り文字列
    pub sentence_delimiter: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentMode {
    /// 静的おすすめ一覧（無効化で一覧を破棄、切替時にアラート）
    Recommendations,
    /// 名言APIのポーリング（一覧は無効化後も保持）
    Quotes,
}

impl std::str::FromStr for ContentMode {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "recommendations" => Ok(Self::Recommendations),
            "quotes" => Ok(Self::Quotes),
            other => Err(AppError::config(format!("Unknown content mode: {other}"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpeechBackend {
    /// 外部TTSコマンド（espeak-ng / say）
    Command,
    /// ログ出力のみ
    Log,
}

impl std::str::FromStr for SpeechBackend {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "command" => Ok(Self::Command),
            "log" => Ok(Self::Log),
            other => Err(AppError::config(format!("Unknown speech backend: {other}"))),
        }
    }
}

pub const DEFAULT_QUOTE_ENDPOINT: &str = "https://zenquotes.io/api/random";

#[cfg(target_os = "macos")]
pub const DEFAULT_SPEECH_BINARY: &str = "say";
#[cfg(not(target_os = "macos"))]
pub const DEFAULT_SPEECH_BINARY: &str = "espeak-ng";

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            content_mode: ContentMode::Quotes,
            poll_interval_secs: 10,
            quote_endpoint: DEFAULT_QUOTE_ENDPOINT.to_string(),
            request_timeout_secs: 10,
            speech_backend: SpeechBackend::Command,
            speech_binary: DEFAULT_SPEECH_BINARY.to_string(),
            speech_rate: 0.5,
            speech_pitch: 1.0,
            chunk_offset_ms: 3000,
            sentence_delimiter: ". ".to_string(),
        }
    }
}

impl AppSettings {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn chunk_offset(&self) -> Duration {
        Duration::from_millis(self.chunk_offset_ms)
    }

    /// 値域チェック
    pub fn validate(&self) -> Result<(), AppError> {
        if self.poll_interval_secs == 0 {
            return Err(AppError::config("poll_interval_secs must be greater than 0"));
        }
        if self.request_timeout_secs == 0 {
            return Err(AppError::config("request_timeout_secs must be greater than 0"));
        }
        if self.chunk_offset_ms == 0 {
            return Err(AppError::config("chunk_offset_ms must be greater than 0"));
        }
        if self.sentence_delimiter.is_empty() {
            return Err(AppError::config("sentence_delimiter must not be empty"));
        }
        if self.quote_endpoint.trim().is_empty() {
            return Err(AppError::config("quote_endpoint must not be empty"));
        }
        if !(self.speech_rate > 0.0 && self.speech_rate <= 2.0) {
            return Err(AppError::config(format!(
                "speech_rate out of range (0, 2]: {}",
                self.speech_rate
            )));
        }
        if !(self.speech_pitch > 0.0 && self.speech_pitch <= 2.0) {
            return Err(AppError::config(format!(
                "speech_pitch out of range (0, 2]: {}",
                self.speech_pitch
            )));
        }
        Ok(())
    }
}
