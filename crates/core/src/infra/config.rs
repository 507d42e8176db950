use std::path::{Path, PathBuf};

use crate::domain::error::AppError;
use crate::domain::settings::AppSettings;

pub const CONFIG_ENV: &str = "QN_CONFIG";
const APP_DIR: &str = "quote-narrator";
const SETTINGS_FILE: &str = "settings.json";

/// 設定ファイルのパスを決める（引数 > QN_CONFIG > 標準の設定ディレクトリ）
pub fn resolve_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    if let Some(path) = std::env::var_os(CONFIG_ENV) {
        return Some(PathBuf::from(path));
    }
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join(SETTINGS_FILE))
}

/// 設定ファイルを読む。ファイルが無ければデフォルト。
pub fn load_settings_file(path: &Path) -> Result<AppSettings, AppError> {
    if !path.exists() {
        log::info!("No settings file at {}. Using defaults.", path.display());
        return Ok(AppSettings::default());
    }

    let data = std::fs::read_to_string(path).map_err(|e| {
        AppError::config(format!("Failed to read {}: {e}", path.display()))
    })?;
    let settings: AppSettings = serde_json::from_str(&data).map_err(|e| {
        AppError::config(format!("Failed to parse {}: {e}", path.display()))
    })?;

    log::info!("Settings loaded from {}", path.display());
    Ok(settings)
}

/// 環境変数による上書き
pub fn apply_env_overrides(
    mut settings: AppSettings,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<AppSettings, AppError> {
    if let Some(v) = lookup("QN_POLL_INTERVAL_SECS") {
        settings.poll_interval_secs = v
            .trim()
            .parse()
            .map_err(|e| AppError::config(format!("QN_POLL_INTERVAL_SECS: {e}")))?;
    }
    if let Some(v) = lookup("QN_QUOTE_ENDPOINT") {
        settings.quote_endpoint = v.trim().to_string();
    }
    if let Some(v) = lookup("QN_SPEECH_BACKEND") {
        settings.speech_backend = v.parse()?;
    }
    if let Some(v) = lookup("QN_CONTENT_MODE") {
        settings.content_mode = v.parse()?;
    }
    Ok(settings)
}

/// 設定ファイル + 環境変数から設定を組み立てる（検証はまだしない）
pub fn load_settings(explicit: Option<&Path>) -> Result<AppSettings, AppError> {
    let settings = match resolve_config_path(explicit) {
        Some(path) => load_settings_file(&path)?,
        None => {
            log::warn!("Cannot determine config directory. Using defaults.");
            AppSettings::default()
        }
    };
    apply_env_overrides(settings, |key| std::env::var(key).ok())
}
