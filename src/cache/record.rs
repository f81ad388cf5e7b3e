//! キャッシュに格納される国レコード

use std::collections::BTreeMap;

use serde::{
    Deserialize,
    Serialize,
};
use serde_json::{
    Map,
    Value,
};

use crate::types::{
    CountryCode,
    LocaleCode,
};

/// Locale code -> translated country name.
pub type Translations = BTreeMap<LocaleCode, String>;

/// Attribute key holding inline translations in a raw record.
const TRANSLATIONS_KEY: &str = "translations";
/// Attribute key of the derived list of translated names.
const TRANSLATED_NAMES_KEY: &str = "translated_names";

/// 1 か国分のマージ済みレコード
///
/// `translated_names` は `translations` の値から導出されるビューで、
/// `translations` を変更するメソッドの中で必ず再計算される。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CountryRecord {
    #[serde(skip)]
    alpha2: CountryCode,
    /// 国の静的属性（name, alpha3, currency_code, eu_member, geo, ...）
    #[serde(flatten)]
    attributes: Map<String, Value>,
    translations: Translations,
    translated_names: Vec<String>,
}

impl CountryRecord {
    /// 生の属性マップからレコードを作成する
    ///
    /// 属性に `translations` オブジェクトが含まれていれば、文字列の値だけを翻訳として取り込む。
    #[must_use]
    pub fn from_attributes(alpha2: CountryCode, mut attributes: Map<String, Value>) -> Self {
        let inline = match attributes.remove(TRANSLATIONS_KEY) {
            Some(Value::Object(map)) => map
                .into_iter()
                .filter_map(|(locale, name)| match name {
                    Value::String(name) => Some((LocaleCode::new(&locale), name)),
                    _ => None,
                })
                .collect(),
            _ => Translations::new(),
        };
        Self::with_translations(alpha2, attributes, inline)
    }

    #[must_use]
    pub fn with_translations(
        alpha2: CountryCode,
        mut attributes: Map<String, Value>,
        translations: Translations,
    ) -> Self {
        attributes.remove(TRANSLATED_NAMES_KEY);
        attributes.insert("alpha2".to_string(), Value::String(alpha2.to_string()));

        let mut record =
            Self { alpha2, attributes, translations, translated_names: Vec::new() };
        record.refresh_translated_names();
        record
    }

    #[must_use]
    pub const fn alpha2(&self) -> &CountryCode {
        &self.alpha2
    }

    /// 属性を名前で取得する
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.attributes.get(field)
    }

    /// 文字列属性を取得する
    #[must_use]
    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.get(field).and_then(Value::as_str)
    }

    #[must_use]
    pub const fn attributes(&self) -> &Map<String, Value> {
        &self.attributes
    }

    #[must_use]
    pub const fn translations(&self) -> &Translations {
        &self.translations
    }

    #[must_use]
    pub fn translation(&self, locale: &str) -> Option<&str> {
        self.translations.get(LocaleCode::new(locale).as_str()).map(String::as_str)
    }

    /// `translations` の値（ロケール順）
    #[must_use]
    pub fn translated_names(&self) -> &[String] {
        &self.translated_names
    }

    pub(crate) fn insert_translation(&mut self, locale: LocaleCode, name: String) {
        self.translations.insert(locale, name);
        self.refresh_translated_names();
    }

    pub(crate) fn remove_translation(&mut self, locale: &str) -> Option<String> {
        let removed = self.translations.remove(locale);
        if removed.is_some() {
            self.refresh_translated_names();
        }
        removed
    }

    fn refresh_translated_names(&mut self) {
        self.translated_names = self.translations.values().cloned().collect();
    }
}

/// 実行時に登録される上書きレコード
///
/// 同じコードのバンドル済みレコードより優先される。
/// JSON からも作成できる: `{"alpha2": "ZZ", "name": "Testland", "translations": {"en": "Testland"}}`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RegisteredOverride {
    pub alpha2: CountryCode,
    #[serde(default)]
    pub translations: Translations,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl RegisteredOverride {
    #[must_use]
    pub fn new(alpha2: &str) -> Self {
        Self {
            alpha2: CountryCode::new(alpha2),
            translations: Translations::new(),
            attributes: Map::new(),
        }
    }

    #[must_use]
    pub fn with_attribute(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.attributes.insert(field.to_string(), value.into());
        self
    }

    #[must_use]
    pub fn with_translation(mut self, locale: &str, name: &str) -> Self {
        self.translations.insert(LocaleCode::new(locale), name.to_string());
        self
    }

    #[must_use]
    pub fn into_record(self) -> CountryRecord {
        CountryRecord::with_translations(self.alpha2, self.attributes, self.translations)
    }
}
