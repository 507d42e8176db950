pub mod command;
mod log_only;

pub use command::CommandSpeechEngine;
pub use log_only::LogSpeechEngine;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::settings::{AppSettings, SpeechBackend};

/// 読み上げパラメータ（セッション開始時に一度だけ適用）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpeechParams {
    /// 速度（0.5 が標準）
    pub rate: f32,
    /// ピッチ（1.0 が標準）
    pub pitch: f32,
}

impl Default for SpeechParams {
    fn default() -> Self {
        Self {
            rate: 0.5,
            pitch: 1.0,
        }
    }
}

impl SpeechParams {
    pub fn from_settings(settings: &AppSettings) -> Self {
        Self {
            rate: settings.speech_rate,
            pitch: settings.speech_pitch,
        }
    }
}

/// 読み上げエラー（すべて NarrationUnavailable 扱い）
#[derive(Debug, thiserror::Error)]
pub enum SpeechError {
    #[error("Speech engine not available: {0}")]
    Unavailable(String),
    #[error("Speech failed: {0}")]
    Failed(String),
}

/// 読み上げエンジン trait。
///
/// `speak` は発話の開始を依頼するだけで、発話完了は待たない。
#[async_trait]
pub trait SpeechEngine: Send + Sync {
    /// パラメータを適用する。同じ値での再呼び出しは何もしない。
    fn configure(&self, params: SpeechParams) -> Result<(), SpeechError>;

    async fn speak(&self, text: &str) -> Result<(), SpeechError>;

    fn name(&self) -> &str;
}

/// 設定に従って読み上げエンジンを構築する
pub fn create_speech_engine(settings: &AppSettings) -> Arc<dyn SpeechEngine> {
    match settings.speech_backend {
        SpeechBackend::Command => {
            let engine = CommandSpeechEngine::new(settings.speech_binary.clone());
            if engine.validate().is_ok() {
                log::info!("Speech engine selected: {}", settings.speech_binary);
                return Arc::new(engine);
            }
            log::warn!(
                "Speech binary '{}' not found, falling back to log-only narration",
                settings.speech_binary
            );
            Arc::new(LogSpeechEngine::new())
        }
        SpeechBackend::Log => {
            log::info!("Using log-only speech engine");
            Arc::new(LogSpeechEngine::new())
        }
    }
}
