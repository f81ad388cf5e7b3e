//! ロケールレジストリ
//!
//! 設定で要求されたロケール（`requested`）と、キャッシュに実際に読み込まれている
//! ロケール（`loaded`）を追跡し、その差分を計算する。
//!
//! - `requested` は呼び出し側がいつでも変更できる（順序付き集合）
//! - `loaded` は同期処理だけが変更する
//! - 利用可能なロケールの一覧はディスクから一度だけ列挙し、プロセス中は固定

use std::collections::HashSet;
use std::sync::OnceLock;

use crate::input::datafile::DataFiles;
use crate::types::LocaleCode;

/// 要求ロケールと読み込み済みロケールの管理
#[derive(Debug, Default)]
pub struct LocaleRegistry {
    /// 要求されたロケール（挿入順を保持、重複なし）
    requested: Vec<LocaleCode>,
    /// 現在キャッシュに反映されているロケール
    loaded: HashSet<LocaleCode>,
    /// `locale/*.yaml` から列挙した利用可能ロケール
    available: OnceLock<Vec<LocaleCode>>,
}

impl LocaleRegistry {
    /// 要求ロケールを指定して作成（`loaded` は空）
    #[must_use]
    pub fn new<I>(requested: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<LocaleCode>,
    {
        let mut registry = Self::default();
        registry.set_requested(requested);
        registry
    }

    /// 要求ロケール（要求された順）
    #[must_use]
    pub fn requested(&self) -> &[LocaleCode] {
        &self.requested
    }

    /// 読み込み済みロケール（ソート済み）
    #[must_use]
    pub fn loaded(&self) -> Vec<LocaleCode> {
        let mut loaded: Vec<_> = self.loaded.iter().cloned().collect();
        loaded.sort();
        loaded
    }

    #[must_use]
    pub fn is_loaded(&self, locale: &str) -> bool {
        self.loaded.contains(locale)
    }

    /// ロケールを要求に追加する
    ///
    /// 新たに追加された場合は `true`、既に要求済みか、ファイル名として使えない
    /// コード（[`LocaleCode::is_plain`]）なら `false`。
    pub fn request(&mut self, locale: impl Into<LocaleCode>) -> bool {
        let locale = locale.into();
        if !locale.is_plain() {
            tracing::warn!(locale = %locale, "Ignoring locale code that is not a plain code");
            return false;
        }
        if self.requested.contains(&locale) {
            return false;
        }
        self.requested.push(locale);
        true
    }

    /// 要求ロケールを丸ごと置き換える（重複は最初の出現のみ残し、不正なコードは捨てる）
    pub fn set_requested<I>(&mut self, locales: I)
    where
        I: IntoIterator,
        I::Item: Into<LocaleCode>,
    {
        self.requested.clear();
        for locale in locales {
            self.request(locale);
        }
    }

    /// ロケールを要求から外す
    pub fn withdraw(&mut self, locale: &str) -> bool {
        let before = self.requested.len();
        self.requested.retain(|requested| requested.as_str() != locale);
        before != self.requested.len()
    }

    /// `requested − loaded`（要求順）
    #[must_use]
    pub fn to_load(&self) -> Vec<LocaleCode> {
        self.requested.iter().filter(|locale| !self.loaded.contains(*locale)).cloned().collect()
    }

    /// `loaded − requested`（ソート済み）
    #[must_use]
    pub fn to_unload(&self) -> Vec<LocaleCode> {
        let mut unload: Vec<_> =
            self.loaded.iter().filter(|locale| !self.requested.contains(locale)).cloned().collect();
        unload.sort();
        unload
    }

    /// 差分があるか
    #[must_use]
    pub fn needs_sync(&self) -> bool {
        self.requested.iter().any(|locale| !self.loaded.contains(locale))
            || self.loaded.iter().any(|locale| !self.requested.contains(locale))
    }

    pub fn mark_loaded(&mut self, locale: LocaleCode) {
        self.loaded.insert(locale);
    }

    pub fn mark_unloaded(&mut self, locale: &str) {
        self.loaded.remove(locale);
    }

    /// `loaded` を空にする（`requested` はそのまま）
    pub fn clear_loaded(&mut self) {
        self.loaded.clear();
    }

    /// 利用可能なロケールを返す
    ///
    /// 初回呼び出し時にディスクを列挙し、以降は同じ結果を返す。
    pub fn available_locales(&self, files: &DataFiles) -> &[LocaleCode] {
        self.available.get_or_init(|| files.discover_locales())
    }
}
