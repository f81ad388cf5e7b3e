//! データファイル読み込みのエラー定義

use std::path::PathBuf;

use thiserror::Error;

/// データファイルの読み込み・解釈中に発生するエラー
///
/// ファイルが存在しないことはエラーではない（呼び出し側で空マップ / `None` として扱う）。
/// ここに現れるのは、存在するのに読めない・壊れているファイルのみ。
#[derive(Error, Debug)]
pub enum DataError {
    /// Error when a present file cannot be read
    #[error("Failed to read data file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error when a JSON data file fails to parse
    #[error("Malformed JSON in {}: {source}", path.display())]
    MalformedJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Error when a YAML data file fails to parse
    #[error("Malformed YAML in {}: {source}", path.display())]
    MalformedYaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// Error when a file parses but has an unexpected shape
    #[error("Invalid data in {}: {message}", path.display())]
    InvalidTable { path: PathBuf, message: String },

    /// Error when a locale code cannot be used as a file name
    #[error("Invalid locale code '{code}': expected letters, digits, '-' or '_'")]
    InvalidLocale { code: String },
}

impl DataError {
    pub(crate) fn invalid_table(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::InvalidTable { path: path.into(), message: message.into() }
    }
}

pub type Result<T> = std::result::Result<T, DataError>;
