//! 設定ファイルの読み込み関数

use std::path::Path;

use super::{
    ConfigError,
    DataSettings,
};

/// ワークスペース直下の設定ファイル名
pub const CONFIG_FILE: &str = "country-data.json";

/// ワークスペースから設定を読み込む
///
/// `country-data.json` ファイルを探して読み込む
///
/// # Returns
/// - `Ok(Some(settings))`: 設定ファイルが見つかり、読み込みに成功
/// - `Ok(None)`: 設定ファイルが見つからない
///
/// # Errors
/// - ファイル読み込みエラー
/// - JSON パースエラー
pub(super) fn load_from_workspace(
    workspace_root: &Path,
) -> Result<Option<DataSettings>, ConfigError> {
    let config_path = workspace_root.join(CONFIG_FILE);

    if !config_path.exists() {
        tracing::debug!(path = %config_path.display(), "Configuration file not found");
        return Ok(None);
    }

    tracing::debug!(path = %config_path.display(), "Loading configuration");

    let content = std::fs::read_to_string(&config_path)?;
    let settings: DataSettings = serde_json::from_str(&content)?;

    Ok(Some(settings))
}
