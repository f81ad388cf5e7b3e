//! 設定管理を行うモジュール

use std::path::PathBuf;

use super::{
    ConfigError,
    DataSettings,
    loader,
};
use crate::cache::CountryCache;
use crate::input::DataFiles;

/// 設定管理を行う
#[derive(Default, Debug, Clone)]
pub struct ConfigManager {
    /// 現在の設定
    current_settings: DataSettings,

    /// ワークスペースのルートパス
    workspace_root: Option<PathBuf>,
}

impl ConfigManager {
    /// 新しい設定マネージャーを作成
    #[must_use]
    pub fn new() -> Self {
        Self { current_settings: DataSettings::default(), workspace_root: None }
    }

    /// 設定を読み込む
    ///
    /// # Arguments
    /// * `workspace_root` - ワークスペースのルートパス
    ///
    /// # Errors
    /// - ファイル読み込みエラー
    /// - JSON パースエラー
    /// - バリデーションエラー
    pub fn load_settings(&mut self, workspace_root: Option<PathBuf>) -> Result<(), ConfigError> {
        tracing::debug!(?workspace_root, "Loading settings");

        let settings = if let Some(root) = &workspace_root {
            loader::load_from_workspace(root)?.map_or_else(DataSettings::default, |ws| {
                tracing::debug!(settings = ?ws, "Loaded workspace settings");
                ws
            })
        } else {
            DataSettings::default()
        };

        settings.validate().map_err(ConfigError::ValidationErrors)?;

        self.current_settings = settings;
        self.workspace_root = workspace_root;
        tracing::debug!(settings = ?self.current_settings, "Settings loaded successfully");

        Ok(())
    }

    /// 設定を差し替える
    ///
    /// 既に作成済みのキャッシュには反映されない。`locales` の変更は
    /// [`Self::apply_locales`] で、ディレクトリの変更は [`Self::build_cache`] で作り直して反映する。
    ///
    /// # Errors
    /// - バリデーションエラー（現在の設定は変更されない）
    pub fn update_settings(&mut self, new_settings: DataSettings) -> Result<(), ConfigError> {
        tracing::debug!("Updating settings...");

        new_settings.validate().map_err(ConfigError::ValidationErrors)?;

        self.current_settings = new_settings;
        tracing::debug!("Settings updated successfully");

        Ok(())
    }

    /// 現在の設定を取得
    #[must_use]
    pub const fn get_settings(&self) -> &DataSettings {
        &self.current_settings
    }

    /// ワークスペースルートを取得
    #[must_use]
    pub const fn workspace_root(&self) -> Option<&PathBuf> {
        self.workspace_root.as_ref()
    }

    /// ワークスペースルート基準で解決したデータファイルの場所
    #[must_use]
    pub fn data_files(&self) -> DataFiles {
        self.current_settings.data_files(self.workspace_root.as_deref())
    }

    /// 現在の設定でキャッシュを作成する（まだ何も読み込まない）
    #[must_use]
    pub fn build_cache(&self) -> CountryCache {
        CountryCache::new(self.data_files(), self.current_settings.locales.iter().map(String::as_str))
    }

    /// 現在の `locales` を既存キャッシュの要求ロケールとして設定する（反映は次の同期時）
    pub fn apply_locales(&self, cache: &CountryCache) {
        tracing::debug!(locales = ?self.current_settings.locales, "Applying configured locales");
        cache.set_requested_locales(self.current_settings.locales.iter().map(String::as_str));
    }
}
