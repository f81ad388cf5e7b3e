use std::path::{
    Path,
    PathBuf,
};

use serde::{
    Deserialize,
    Serialize,
};
use thiserror::Error;

use crate::input::DataFiles;
use crate::types::LocaleCode;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Configuration error in '{field_path}': {message}")]
pub struct ValidationError {
    /// JSON path to the field (e.g., "locales[0]")
    pub field_path: String,
    pub message: String,
}

impl ValidationError {
    #[must_use]
    pub fn new(field_path: impl Into<String>, message: impl Into<String>) -> Self {
        Self { field_path: field_path.into(), message: message.into() }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration validation failed:\n{}", format_validation_errors(.0))]
    ValidationErrors(Vec<ValidationError>),

    #[error("Failed to load configuration file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] serde_json::Error),
}

fn format_validation_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .enumerate()
        .map(|(i, err)| format!("  {}. {} - {}", i + 1, err.field_path, err.message))
        .collect::<Vec<_>>()
        .join("\n")
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DataSettings {
    /// Directory holding `countries.json` and `locales/<locale>.json`.
    pub cache_directory: PathBuf,

    /// Directory holding `locale/<code>.yaml` and `subdivisions/<alpha2>.yaml`.
    pub data_directory: PathBuf,

    /// Locales whose translations are loaded into the cache.
    pub locales: Vec<String>,
}

impl DataSettings {
    /// # Errors
    /// - Directory path is empty
    /// - Locale code is empty or not a plain code (see [`LocaleCode::is_plain`])
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if self.cache_directory.as_os_str().is_empty() {
            errors.push(ValidationError::new(
                "cacheDirectory",
                "The directory cannot be empty. Example: \"cache\"",
            ));
        }

        if self.data_directory.as_os_str().is_empty() {
            errors.push(ValidationError::new(
                "dataDirectory",
                "The directory cannot be empty. Example: \"data\"",
            ));
        }

        for (index, locale) in self.locales.iter().enumerate() {
            let trimmed = locale.trim();
            if trimmed.is_empty() {
                errors.push(ValidationError::new(
                    format!("locales[{index}]"),
                    "The locale cannot be empty. Example: \"en\"",
                ));
            } else if !LocaleCode::new(trimmed).is_plain() {
                errors.push(ValidationError::new(
                    format!("locales[{index}]"),
                    format!("Invalid locale '{locale}': must be a plain code such as \"fr\" or \"pt-br\""),
                ));
            }
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }

    /// Build a loader, resolving relative directories against `root`.
    #[must_use]
    pub fn data_files(&self, root: Option<&Path>) -> DataFiles {
        let resolve = |dir: &PathBuf| match root {
            Some(root) if dir.is_relative() => root.join(dir),
            _ => dir.clone(),
        };
        DataFiles::new(resolve(&self.cache_directory), resolve(&self.data_directory))
    }
}

impl Default for DataSettings {
    fn default() -> Self {
        Self {
            cache_directory: PathBuf::from("cache"),
            data_directory: PathBuf::from("data"),
            locales: vec!["en".to_string()],
        }
    }
}
