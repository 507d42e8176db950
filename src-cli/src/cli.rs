//! コマンドライン引数。
//!
//! ```bash
//! quote-narrator --mode recommendations
//! quote-narrator --poll-interval 30 --speech-backend log
//! quote-narrator --config ./settings.json --log-level debug
//! ```

use std::path::PathBuf;

use clap::Parser;

use qn_core::domain::error::AppError;
use qn_core::domain::settings::AppSettings;

/// 有効化すると名言を定期取得して読み上げるターミナルアプリ
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "quote-narrator")]
#[command(version)]
#[command(about = "Quote feed with spoken narration", long_about = None)]
pub struct Args {
    /// 設定ファイル（未指定時は QN_CONFIG、次に標準の設定ディレクトリ）
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// ログレベル: error, warn, info, debug, trace
    #[arg(long, default_value = "info", value_name = "LEVEL")]
    pub log_level: String,

    /// 表示モード: quotes | recommendations
    #[arg(short, long, value_name = "MODE")]
    pub mode: Option<String>,

    /// 名言の取得間隔（秒）
    #[arg(long, value_name = "SECS")]
    pub poll_interval: Option<u64>,

    /// 読み上げバックエンド: command | log
    #[arg(long, value_name = "BACKEND")]
    pub speech_backend: Option<String>,

    /// 名言 API のエンドポイント
    #[arg(long, value_name = "URL")]
    pub endpoint: Option<String>,

    /// 画面を JSON で出力する
    #[arg(long)]
    pub json: bool,
}

impl Args {
    /// env_logger 用のフィルタ文字列
    pub fn log_filter(&self) -> &str {
        match self.log_level.to_lowercase().as_str() {
            "error" => "error",
            "warn" | "warning" => "warn",
            "debug" => "debug",
            "trace" => "trace",
            _ => "info",
        }
    }

    /// 設定ファイル・環境変数の値をフラグで上書きする
    pub fn apply(&self, mut settings: AppSettings) -> Result<AppSettings, AppError> {
        if let Some(mode) = &self.mode {
            settings.content_mode = mode.parse()?;
        }
        if let Some(secs) = self.poll_interval {
            settings.poll_interval_secs = secs;
        }
        if let Some(backend) = &self.speech_backend {
            settings.speech_backend = backend.parse()?;
        }
        if let Some(endpoint) = &self.endpoint {
            settings.quote_endpoint = endpoint.clone();
        }
        Ok(settings)
    }
}
