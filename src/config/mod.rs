//! ワークスペース設定（`country-data.json`）
mod loader;
mod manager;
mod types;

pub use loader::CONFIG_FILE;
pub use manager::ConfigManager;
pub use types::{
    ConfigError,
    DataSettings,
    ValidationError,
};
