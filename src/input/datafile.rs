//! バンドル済みデータファイルの読み込み
//!
//! `cache_directory` 配下に `countries.json` と `locales/<locale>.json`、
//! `data_directory` 配下に `locale/<code>.yaml` と `subdivisions/<alpha2>.yaml` を置く。
//!
//! 読み込み結果はキャッシュしない。毎回ストレージから読み直すので、
//! 結果を保持したい場合は呼び出し側で保持すること。

use std::io::ErrorKind;
use std::path::{
    Path,
    PathBuf,
};

use globset::Glob;
use ignore::WalkBuilder;
use serde_json::{
    Map,
    Value,
};

use crate::error::{
    DataError,
    Result,
};
use crate::types::LocaleCode;

/// ベースデータセットのファイル名
pub const COUNTRIES_FILE: &str = "countries.json";
/// 翻訳テーブルのディレクトリ名（`cache_directory` 配下）
pub const TRANSLATIONS_DIR: &str = "locales";
/// ロケール定義のディレクトリ名（`data_directory` 配下）
pub const LOCALE_DEFINITIONS_DIR: &str = "locale";
/// 行政区画データのディレクトリ名（`data_directory` 配下）
pub const SUBDIVISIONS_DIR: &str = "subdivisions";

/// データファイルローダー
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataFiles {
    /// JSON データセットのルート
    cache_dir: PathBuf,
    /// YAML データのルート
    data_dir: PathBuf,
}

impl DataFiles {
    #[must_use]
    pub fn new(cache_dir: impl Into<PathBuf>, data_dir: impl Into<PathBuf>) -> Self {
        Self { cache_dir: cache_dir.into(), data_dir: data_dir.into() }
    }

    #[must_use]
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    #[must_use]
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// `cache_directory` からの相対パスを組み立てる
    #[must_use]
    pub fn datafile_path(&self, parts: &[&str]) -> PathBuf {
        parts.iter().fold(self.cache_dir.clone(), |path, part| path.join(part))
    }

    /// `locale/<code>.yaml` のパス
    #[must_use]
    pub fn locale_path(&self, code: &str) -> PathBuf {
        self.data_dir.join(LOCALE_DEFINITIONS_DIR).join(format!("{code}.yaml"))
    }

    /// `subdivisions/<alpha2>.yaml` のパス
    #[must_use]
    pub fn subdivision_path(&self, alpha2: &str) -> PathBuf {
        self.data_dir.join(SUBDIVISIONS_DIR).join(format!("{alpha2}.yaml"))
    }

    /// `cache_directory` 配下の JSON オブジェクトを読み込む
    ///
    /// # Returns
    /// - ファイルが存在しない場合は空のマップ
    /// - ファイルが存在する場合はトップレベルのオブジェクト
    ///
    /// # Errors
    /// - 読み込みエラー
    /// - JSON パースエラー
    /// - トップレベルがオブジェクトでない
    pub fn load_json(&self, parts: &[&str]) -> Result<Map<String, Value>> {
        let path = self.datafile_path(parts);
        let Some(content) = read_if_exists(&path)? else {
            tracing::debug!("Data file not found, treating as empty: {:?}", path);
            return Ok(Map::new());
        };

        let value: Value = serde_json::from_str(&content)
            .map_err(|source| DataError::MalformedJson { path: path.clone(), source })?;

        match value {
            Value::Object(map) => Ok(map),
            other => Err(DataError::invalid_table(
                path,
                format!("expected a JSON object at top level, found {}", json_kind(&other)),
            )),
        }
    }

    /// YAML ファイルを読み込む
    ///
    /// # Returns
    /// - `Ok(None)`: ファイルが存在しない
    /// - `Ok(Some(value))`: 読み込み成功
    ///
    /// # Errors
    /// - 読み込みエラー
    /// - YAML パースエラー
    pub fn load_yaml(&self, path: &Path) -> Result<Option<Value>> {
        let Some(content) = read_if_exists(path)? else {
            return Ok(None);
        };

        let value: Value = serde_yaml::from_str(&content)
            .map_err(|source| DataError::MalformedYaml { path: path.to_path_buf(), source })?;

        Ok(Some(value))
    }

    /// ロケール定義（`locale/<code>.yaml`）を読み込む
    ///
    /// # Errors
    /// YAML パースエラー
    pub fn load_locale_definition(&self, code: &str) -> Result<Option<Value>> {
        self.load_yaml(&self.locale_path(code))
    }

    /// 行政区画データ（`subdivisions/<alpha2>.yaml`）を読み込む
    ///
    /// # Errors
    /// YAML パースエラー
    pub fn load_subdivisions(&self, alpha2: &str) -> Result<Option<Value>> {
        self.load_yaml(&self.subdivision_path(alpha2))
    }

    /// ディスク上に存在するロケール定義ファイルを列挙する
    ///
    /// `locale/*.yaml` のファイル名（拡張子なし）をソートして返す。
    /// ディレクトリが存在しない場合は空。
    #[must_use]
    pub fn discover_locales(&self) -> Vec<LocaleCode> {
        let locale_dir = self.data_dir.join(LOCALE_DEFINITIONS_DIR);
        let matcher = match Glob::new("*.yaml") {
            Ok(glob) => glob.compile_matcher(),
            Err(e) => {
                tracing::warn!("Failed to compile locale file pattern: {e}");
                return Vec::new();
            }
        };

        let mut locales = Vec::new();
        for result in WalkBuilder::new(&locale_dir).standard_filters(false).max_depth(Some(1)).build()
        {
            let entry = match result {
                Ok(entry) => entry,
                Err(err) => {
                    tracing::debug!(?err, "Failed to read locale directory entry");
                    continue;
                }
            };

            if !entry.file_type().is_some_and(|ft| ft.is_file()) {
                continue;
            }

            let path = entry.path();
            let Some(file_name) = path.file_name() else {
                continue;
            };
            if !matcher.is_match(file_name) {
                continue;
            }

            if let Some(stem) = path.file_stem() {
                locales.push(LocaleCode::new(&stem.to_string_lossy()));
            }
        }

        locales.sort();
        locales.dedup();
        tracing::debug!(count = locales.len(), dir = %locale_dir.display(), "Discovered locales");
        locales
    }
}

/// ファイルを読む。存在しなければ `None`。
fn read_if_exists(path: &Path) -> Result<Option<String>> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(source) => Err(DataError::Io { path: path.to_path_buf(), source }),
    }
}

pub(crate) const fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use std::fs;

    use googletest::prelude::*;
    use rstest::*;
    use tempfile::TempDir;

    use super::*;

    #[fixture]
    fn dirs() -> (TempDir, DataFiles) {
        let temp_dir = TempDir::new().unwrap();
        let files = DataFiles::new(temp_dir.path().join("cache"), temp_dir.path().join("data"));
        fs::create_dir_all(files.cache_dir().join(TRANSLATIONS_DIR)).unwrap();
        fs::create_dir_all(files.data_dir().join(LOCALE_DEFINITIONS_DIR)).unwrap();
        fs::create_dir_all(files.data_dir().join(SUBDIVISIONS_DIR)).unwrap();
        (temp_dir, files)
    }

    #[rstest]
    fn datafile_path_joins_under_cache_dir() {
        let files = DataFiles::new("/srv/cache", "/srv/data");

        assert_that!(
            files.datafile_path(&[TRANSLATIONS_DIR, "fr.json"]),
            eq(&PathBuf::from("/srv/cache/locales/fr.json"))
        );
        assert_that!(files.locale_path("en-US"), eq(&PathBuf::from("/srv/data/locale/en-US.yaml")));
    }

    #[rstest]
    fn load_json_reads_object(dirs: (TempDir, DataFiles)) {
        let (_temp, files) = dirs;
        fs::write(files.datafile_path(&[COUNTRIES_FILE]), r#"{"US": {"name": "United States"}}"#)
            .unwrap();

        let map = files.load_json(&[COUNTRIES_FILE]).unwrap();

        assert_that!(map.len(), eq(1));
        assert_that!(map["US"]["name"].as_str(), some(eq("United States")));
    }

    #[rstest]
    fn load_json_missing_file_is_empty(dirs: (TempDir, DataFiles)) {
        let (_temp, files) = dirs;

        let map = files.load_json(&[TRANSLATIONS_DIR, "xx.json"]).unwrap();

        assert_that!(map.is_empty(), eq(true));
    }

    #[rstest]
    fn load_json_malformed_is_error(dirs: (TempDir, DataFiles)) {
        let (_temp, files) = dirs;
        fs::write(files.datafile_path(&[COUNTRIES_FILE]), "{not json").unwrap();

        let result = files.load_json(&[COUNTRIES_FILE]);

        assert!(matches!(result, Err(DataError::MalformedJson { .. })));
    }

    #[rstest]
    fn load_json_rejects_non_object(dirs: (TempDir, DataFiles)) {
        let (_temp, files) = dirs;
        fs::write(files.datafile_path(&[COUNTRIES_FILE]), "[1, 2]").unwrap();

        let result = files.load_json(&[COUNTRIES_FILE]);

        assert_that!(
            result.unwrap_err().to_string(),
            contains_substring("expected a JSON object at top level, found array")
        );
    }

    #[rstest]
    fn load_yaml_missing_is_none(dirs: (TempDir, DataFiles)) {
        let (_temp, files) = dirs;

        assert_that!(files.load_locale_definition("zz").unwrap(), none());
    }

    #[rstest]
    fn load_yaml_parses_mapping(dirs: (TempDir, DataFiles)) {
        let (_temp, files) = dirs;
        fs::write(files.subdivision_path("US"), "CA:\n  name: California\nNY:\n  name: New York\n")
            .unwrap();

        let value = files.load_subdivisions("US").unwrap().unwrap();

        assert_that!(value["CA"]["name"].as_str(), some(eq("California")));
        assert_that!(value.as_object().map(Map::len), some(eq(2)));
    }

    #[rstest]
    fn load_yaml_malformed_is_error(dirs: (TempDir, DataFiles)) {
        let (_temp, files) = dirs;
        fs::write(files.locale_path("en"), "key: [unclosed").unwrap();

        let result = files.load_locale_definition("en");

        assert!(matches!(result, Err(DataError::MalformedYaml { .. })));
    }

    #[rstest]
    fn discover_locales_lists_yaml_stems(dirs: (TempDir, DataFiles)) {
        let (_temp, files) = dirs;
        let locale_dir = files.data_dir().join(LOCALE_DEFINITIONS_DIR);
        fs::write(locale_dir.join("fr.yaml"), "fr: {}").unwrap();
        fs::write(locale_dir.join("en.yaml"), "en: {}").unwrap();
        fs::write(locale_dir.join("README.md"), "ignored").unwrap();
        fs::create_dir_all(locale_dir.join("nested")).unwrap();
        fs::write(locale_dir.join("nested").join("de.yaml"), "de: {}").unwrap();

        let locales = files.discover_locales();

        assert_that!(
            locales,
            elements_are![eq(&LocaleCode::new("en")), eq(&LocaleCode::new("fr"))]
        );
    }

    #[rstest]
    fn discover_locales_without_directory_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let files = DataFiles::new(temp_dir.path(), temp_dir.path().join("missing"));

        assert_that!(files.discover_locales(), is_empty());
    }
}
