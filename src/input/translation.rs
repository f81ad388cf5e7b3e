//! Translation table input definitions
//!
//! `locales/<locale>.json` is a flat object mapping country codes to the
//! translated country name for that locale.

use std::collections::HashMap;
use std::path::Path;

use serde_json::{
    Map,
    Value,
};

use super::datafile::{
    DataFiles,
    TRANSLATIONS_DIR,
    json_kind,
};
use crate::error::{
    DataError,
    Result,
};
use crate::types::{
    CountryCode,
    LocaleCode,
};

/// Country code -> translated name, for one locale.
pub type TranslationTable = HashMap<CountryCode, String>;

/// Load the translation table for `locale`.
///
/// A missing file yields an empty table.
///
/// # Errors
/// Returns error if the file is unreadable, is not JSON, or holds a
/// non-string translation.
pub fn load_translation_table(files: &DataFiles, locale: &LocaleCode) -> Result<TranslationTable> {
    let file_name = format!("{locale}.json");
    let map = files.load_json(&[TRANSLATIONS_DIR, &file_name])?;
    parse_translation_table(&files.datafile_path(&[TRANSLATIONS_DIR, &file_name]), map)
}

/// Convert a raw JSON object into a [`TranslationTable`].
///
/// `null` entries are skipped. Keys are normalized to uppercase.
///
/// # Errors
/// Returns [`DataError::InvalidTable`] when a value is neither a string nor `null`.
pub fn parse_translation_table(path: &Path, map: Map<String, Value>) -> Result<TranslationTable> {
    let mut table = TranslationTable::with_capacity(map.len());
    for (code, value) in map {
        match value {
            Value::String(name) => {
                table.insert(CountryCode::new(&code), name);
            }
            Value::Null => {}
            other => {
                return Err(DataError::invalid_table(
                    path,
                    format!("translation for '{code}' must be a string, found {}", json_kind(&other)),
                ));
            }
        }
    }
    Ok(table)
}
