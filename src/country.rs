//! 国ごとの問い合わせ用ファサード
//!
//! キャッシュのエントリを 1 か国分ラップする。キャッシュは呼び出し側から明示的に渡す。

use std::fmt;
use std::sync::Arc;

use serde_json::{
    Map,
    Value,
};

use crate::cache::{
    CountryCache,
    CountryRecord,
    Translations,
};
use crate::error::Result;
use crate::types::CountryCode;

/// Default locale for [`Country::translation`].
pub const DEFAULT_LOCALE: &str = "en";

/// 1 か国分のビュー
#[derive(Debug, Clone)]
pub struct Country<'cache> {
    cache: &'cache CountryCache,
    data: Arc<CountryRecord>,
}

impl<'cache> Country<'cache> {
    /// コードから作成する。未知のコードなら `None`。
    ///
    /// # Errors
    /// データファイルが壊れている場合
    pub fn new(cache: &'cache CountryCache, code: &str) -> Result<Option<Self>> {
        Ok(cache.get(code)?.map(|data| Self { cache, data }))
    }

    /// 取得済みのレコードから作成する
    #[must_use]
    pub const fn from_record(cache: &'cache CountryCache, data: Arc<CountryRecord>) -> Self {
        Self { cache, data }
    }

    #[must_use]
    pub fn alpha2(&self) -> &CountryCode {
        self.data.alpha2()
    }

    #[must_use]
    pub fn data(&self) -> &CountryRecord {
        &self.data
    }

    /// 任意の属性を名前で取得する
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.data.get(field)
    }

    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.data.get_str("name")
    }

    #[must_use]
    pub fn alpha3(&self) -> Option<&str> {
        self.data.get_str("alpha3")
    }

    #[must_use]
    pub fn start_of_week(&self) -> Option<&str> {
        self.data.get_str("start_of_week")
    }

    /// EU 加盟国か（属性がなければ `false`）
    #[must_use]
    pub fn in_eu(&self) -> bool {
        self.flag("eu_member")
    }

    /// EEA 加盟国か（属性がなければ `false`）
    #[must_use]
    pub fn in_eea(&self) -> bool {
        self.flag("eea_member")
    }

    fn flag(&self, field: &str) -> bool {
        self.get(field).and_then(Value::as_bool).unwrap_or(false)
    }

    #[must_use]
    pub fn languages_official(&self) -> Vec<&str> {
        self.get("languages_official")
            .and_then(Value::as_array)
            .map(|languages| languages.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn translations(&self) -> &Translations {
        self.data.translations()
    }

    #[must_use]
    pub fn translated_names(&self) -> &[String] {
        self.data.translated_names()
    }

    /// 指定ロケールの国名（ロケールは小文字化して引く）
    #[must_use]
    pub fn translation(&self, locale: &str) -> Option<&str> {
        self.data.translation(locale)
    }

    #[must_use]
    pub fn default_translation(&self) -> Option<&str> {
        self.translation(DEFAULT_LOCALE)
    }

    /// 行政区画データがあるか（インライン属性またはファイル）
    #[must_use]
    pub fn has_subdivisions(&self) -> bool {
        self.get("subdivisions").is_some_and(|value| !value.is_null())
            || self.cache.files().subdivision_path(self.alpha2().as_str()).is_file()
    }

    /// 行政区画（コード → 属性）
    ///
    /// インラインの `subdivisions` 属性を優先し、なければ `subdivisions/<alpha2>.yaml` を読む。
    ///
    /// # Errors
    /// YAML が壊れている場合
    pub fn subdivisions(&self) -> Result<Map<String, Value>> {
        if let Some(Value::Object(inline)) = self.get("subdivisions") {
            return Ok(inline.clone());
        }
        let loaded = self.cache.files().load_subdivisions(self.alpha2().as_str())?;
        Ok(into_object(loaded))
    }

    /// 公用語ごとのロケール定義をまとめて返す
    ///
    /// `<lang>-<ALPHA2>` を優先し、なければ `<lang>` を使う。
    ///
    /// # Errors
    /// YAML が壊れている場合
    pub fn locales(&self) -> Result<Map<String, Value>> {
        let mut languages: Vec<String> =
            self.languages_official().iter().map(|lang| lang.to_lowercase()).collect();
        languages.sort();
        languages.dedup();

        let mut merged = Map::new();
        for lang in languages {
            let regional = format!("{lang}-{}", self.alpha2());
            let definition = match self.cache.locale(&regional)? {
                Some(definition) => Some(definition),
                None => self.cache.locale(&lang)?,
            };
            merged.extend(into_object(definition));
        }
        Ok(merged)
    }

    /// ロケール定義を 1 つ取得する（`<locale>` または `<locale>-<ALPHA2>`）
    ///
    /// # Errors
    /// YAML が壊れている場合
    pub fn locale_hash(&self, locale: &str) -> Result<Option<Value>> {
        let mut locales = self.locales()?;
        let locale = locale.to_lowercase();
        let regional = format!("{locale}-{}", self.alpha2());
        Ok(locales.remove(&locale).or_else(|| locales.remove(&regional)))
    }

    /// 公用語での国名
    ///
    /// 公用語をキャッシュの要求ロケールに追加し、読み込み直してから返す。
    ///
    /// # Errors
    /// データファイルが壊れている場合
    pub fn local_names(&mut self) -> Result<Vec<String>> {
        let languages: Vec<String> =
            self.languages_official().iter().map(|lang| lang.to_lowercase()).collect();
        for lang in &languages {
            self.cache.request_locale(lang);
        }
        self.reload()?;

        Ok(languages.iter().filter_map(|lang| self.translation(lang)).map(str::to_string).collect())
    }

    /// 最初の公用語での国名
    ///
    /// # Errors
    /// データファイルが壊れている場合
    pub fn local_name(&mut self) -> Result<Option<String>> {
        Ok(self.local_names()?.into_iter().next())
    }

    /// キャッシュから読み直す
    ///
    /// コードがキャッシュから消えていた場合は手元のスナップショットを保持し、`false` を返す。
    ///
    /// # Errors
    /// データファイルが壊れている場合
    pub fn reload(&mut self) -> Result<bool> {
        let code = self.alpha2().clone();
        match self.cache.get(code.as_str())? {
            Some(data) => {
                self.data = data;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

fn into_object(value: Option<Value>) -> Map<String, Value> {
    match value {
        Some(Value::Object(map)) => map,
        _ => Map::new(),
    }
}

impl PartialEq for Country<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.alpha2() == other.alpha2()
    }
}

impl Eq for Country<'_> {}

impl fmt::Display for Country<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name().unwrap_or_else(|| self.alpha2().as_str()))
    }
}
