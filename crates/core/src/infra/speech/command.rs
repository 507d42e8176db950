use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;

use super::{SpeechEngine, SpeechError, SpeechParams};

/// espeak-ng / say の標準速度（語/分）
const BASE_WORDS_PER_MINUTE: f32 = 175.0;

/// 読み上げコマンドの引数形式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Dialect {
    /// espeak / espeak-ng: `-s <wpm> -p <0-99>`
    Espeak,
    /// macOS say: `-r <wpm>`（ピッチ指定なし）
    Say,
}

/// 外部TTSコマンドを発話ごとに起動する読み上げエンジン
pub struct CommandSpeechEngine {
    binary_path: PathBuf,
    params: parking_lot::RwLock<SpeechParams>,
}

impl CommandSpeechEngine {
    pub fn new(binary_path: impl Into<PathBuf>) -> Self {
        Self {
            binary_path: binary_path.into(),
            params: parking_lot::RwLock::new(SpeechParams::default()),
        }
    }

    /// 現在のパラメータ
    pub fn params(&self) -> SpeechParams {
        *self.params.read()
    }

    /// バイナリの存在を検証する。
    pub fn validate(&self) -> Result<(), SpeechError> {
        if which_binary(&self.binary_path).is_none() {
            return Err(SpeechError::Unavailable(format!(
                "Speech binary not found: {:?}",
                self.binary_path
            )));
        }
        Ok(())
    }

    fn dialect(&self) -> Dialect {
        match self.binary_path.file_name().and_then(|n| n.to_str()) {
            Some("say") => Dialect::Say,
            _ => Dialect::Espeak,
        }
    }

    /// コマンドライン引数を構築する。
    fn build_args(dialect: Dialect, params: &SpeechParams, text: &str) -> Vec<String> {
        // rate 0.5 を標準速度に合わせる
        let wpm = (params.rate * 2.0 * BASE_WORDS_PER_MINUTE).round() as u32;
        let mut args = match dialect {
            Dialect::Espeak => {
                let pitch = (params.pitch * 50.0).round().clamp(0.0, 99.0) as u32;
                vec![
                    "-s".to_string(),
                    wpm.to_string(),
                    "-p".to_string(),
                    pitch.to_string(),
                    // "-" で始まる文をオプション扱いさせない
                    "--".to_string(),
                ]
            }
            Dialect::Say => vec!["-r".to_string(), wpm.to_string()],
        };
        args.push(text.to_string());
        args
    }
}

#[async_trait]
impl SpeechEngine for CommandSpeechEngine {
    fn configure(&self, params: SpeechParams) -> Result<(), SpeechError> {
        let mut current = self.params.write();
        if *current != params {
            log::debug!("Speech params: rate={} pitch={}", params.rate, params.pitch);
            *current = params;
        }
        Ok(())
    }

    /// 発話が終わるまで待つ。future が drop されたらプロセスを kill する。
    async fn speak(&self, text: &str) -> Result<(), SpeechError> {
        let args = Self::build_args(self.dialect(), &self.params(), text);

        let child = Command::new(&self.binary_path)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    SpeechError::Unavailable(format!(
                        "Speech binary not found: {:?}",
                        self.binary_path
                    ))
                } else {
                    SpeechError::Failed(format!("Failed to spawn speech process: {e}"))
                }
            })?;

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| SpeechError::Failed(format!("Speech process error: {e}")))?;

        if !output.status.success() {
            return Err(SpeechError::Failed(format!(
                "{:?} exited with status {}: {}",
                self.binary_path,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "command"
    }
}

/// PATH 上でバイナリを検索する簡易ヘルパー。
fn which_binary(name: &Path) -> Option<PathBuf> {
    let name_str = name.to_string_lossy();
    if name_str.contains('/') || name_str.contains('\\') {
        return if name.exists() { Some(name.to_path_buf()) } else { None };
    }
    let path_var = std::env::var_os("PATH")?;
    std::env::split_paths(&path_var)
        .map(|dir| dir.join(name))
        .find(|full_path| full_path.exists())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_args_espeak_defaults() {
        let args = CommandSpeechEngine::build_args(
            Dialect::Espeak,
            &SpeechParams::default(),
            "Be yourself",
        );
        assert_eq!(args, vec!["-s", "175", "-p", "50", "--", "Be yourself"]);
    }

    #[test]
    fn build_args_say() {
        let params = SpeechParams {
            rate: 1.0,
            pitch: 1.0,
        };
        let args = CommandSpeechEngine::build_args(Dialect::Say, &params, "hello");
        assert_eq!(args, vec!["-r", "350", "hello"]);
    }

    #[test]
    fn build_args_pitch_is_clamped() {
        let params = SpeechParams {
            rate: 0.5,
            pitch: 2.0,
        };
        let args = CommandSpeechEngine::build_args(Dialect::Espeak, &params, "x");
        assert_eq!(args[3], "99");
    }

    #[test]
    fn dialect_from_binary_name() {
        assert_eq!(CommandSpeechEngine::new("say").dialect(), Dialect::Say);
        assert_eq!(
            CommandSpeechEngine::new("/usr/bin/espeak-ng").dialect(),
            Dialect::Espeak
        );
    }

    #[test]
    fn configure_is_idempotent() {
        let engine = CommandSpeechEngine::new("espeak-ng");
        let params = SpeechParams {
            rate: 0.7,
            pitch: 1.2,
        };
        engine.configure(params).unwrap();
        engine.configure(params).unwrap();
        assert_eq!(engine.params(), params);
    }

    #[test]
    fn validate_missing_binary() {
        let engine = CommandSpeechEngine::new("/nonexistent/espeak-ng");
        assert!(matches!(engine.validate(), Err(SpeechError::Unavailable(_))));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn speak_waits_for_exit_status() {
        // true / false は引数を無視して終了コードだけ返す
        assert!(CommandSpeechEngine::new("true").speak("hello").await.is_ok());
        let err = CommandSpeechEngine::new("false")
            .speak("hello")
            .await
            .unwrap_err();
        assert!(matches!(err, SpeechError::Failed(_)));
    }

    #[tokio::test]
    async fn speak_missing_binary_is_unavailable() {
        let engine = CommandSpeechEngine::new("/nonexistent/espeak-ng");
        let err = engine.speak("hello").await.unwrap_err();
        assert!(matches!(err, SpeechError::Unavailable(_)));
    }
}
