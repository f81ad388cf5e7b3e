//! Base country dataset input definitions

use std::collections::BTreeMap;

use serde_json::{
    Map,
    Value,
};

use super::datafile::{
    COUNTRIES_FILE,
    DataFiles,
    json_kind,
};
use crate::error::{
    DataError,
    Result,
};
use crate::types::CountryCode;

/// Country code -> raw attribute object, as bundled in `countries.json`.
pub type CountryDataset = BTreeMap<CountryCode, Map<String, Value>>;

/// Load the bundled base dataset.
///
/// A missing `countries.json` yields an empty dataset.
///
/// # Errors
/// Returns error if the file is unreadable, is not JSON, or an entry is not an object.
pub fn load_countries(files: &DataFiles) -> Result<CountryDataset> {
    let map = files.load_json(&[COUNTRIES_FILE])?;

    let mut dataset = CountryDataset::new();
    for (code, value) in map {
        match value {
            Value::Object(attributes) => {
                dataset.insert(CountryCode::new(&code), attributes);
            }
            other => {
                return Err(DataError::invalid_table(
                    files.datafile_path(&[COUNTRIES_FILE]),
                    format!("entry '{code}' must be an object, found {}", json_kind(&other)),
                ));
            }
        }
    }

    tracing::debug!(count = dataset.len(), "Loaded base country dataset");
    Ok(dataset)
}
