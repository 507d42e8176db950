use async_trait::async_trait;

use super::{SpeechEngine, SpeechError, SpeechParams};

/// LogSpeechEngine: 発話内容をログに出すだけの実装。
/// TTSコマンドが無い環境用。
pub struct LogSpeechEngine {
    params: parking_lot::RwLock<SpeechParams>,
}

impl LogSpeechEngine {
    pub fn new() -> Self {
        Self {
            params: parking_lot::RwLock::new(SpeechParams::default()),
        }
    }
}

impl Default for LogSpeechEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SpeechEngine for LogSpeechEngine {
    fn configure(&self, params: SpeechParams) -> Result<(), SpeechError> {
        *self.params.write() = params;
        Ok(())
    }

    async fn speak(&self, text: &str) -> Result<(), SpeechError> {
        let params = *self.params.read();
        log::info!("🔊 [rate={} pitch={}] {text}", params.rate, params.pitch);
        Ok(())
    }

    fn name(&self) -> &str {
        "log"
    }
}
