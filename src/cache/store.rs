//! 国データのインメモリキャッシュ
//!
//! 初回アクセス時にベースデータセットを読み込み、要求ロケールとの差分だけ
//! 翻訳テーブルを読み込み / 破棄する。既に正しいデータは読み直さない。
//!
//! # ロック
//!
//! 状態は 1 つの `RwLock` で保護する。
//! - `get` / `list` はまず読み取りロックで同期不要かを確認し、そのまま返す
//! - 同期が必要な場合と、`sync` / `register` / `unregister` / `reset` /
//!   ロケール要求の変更は書き込みロックで直列化する

use std::collections::{
    BTreeMap,
    BTreeSet,
};
use std::sync::{
    Arc,
    PoisonError,
    RwLock,
    RwLockReadGuard,
    RwLockWriteGuard,
};

use serde_json::Value;

use super::record::{
    CountryRecord,
    RegisteredOverride,
};
use crate::error::{
    DataError,
    Result,
};
use crate::input::{
    DataFiles,
    load_countries,
    load_translation_table,
};
use crate::locale::LocaleRegistry;
use crate::types::{
    CountryCode,
    LocaleCode,
};

/// ロックで保護されるキャッシュ状態
#[derive(Debug, Default)]
struct CacheState {
    /// 公開中のレコード（国コード → レコード）
    records: BTreeMap<CountryCode, Arc<CountryRecord>>,
    /// 実行時に登録された上書きレコード
    overrides: BTreeMap<CountryCode, Arc<CountryRecord>>,
    /// 上書きで隠れているバンドル済みレコード（登録解除時に戻す）
    shadowed: BTreeMap<CountryCode, Arc<CountryRecord>>,
    /// `countries.json` に含まれていたコード
    bundled_codes: BTreeSet<CountryCode>,
    /// ベースデータセットを読み込み済みか
    dataset_loaded: bool,
    /// 要求 / 読み込み済みロケール
    locales: LocaleRegistry,
}

impl CacheState {
    fn new(requested: Vec<LocaleCode>) -> Self {
        Self { locales: LocaleRegistry::new(requested), ..Self::default() }
    }

    const fn load_required(&self) -> bool {
        !self.dataset_loaded
    }

    /// 読み取りロックのまま応答できるか
    fn is_fresh(&self) -> bool {
        !self.load_required() && !self.locales.needs_sync()
    }

    fn ensure_loaded(&mut self, files: &DataFiles) -> Result<()> {
        if !self.load_required() {
            return Ok(());
        }

        let dataset = load_countries(files)?;
        self.bundled_codes = dataset.keys().cloned().collect();
        self.records = dataset
            .into_iter()
            .map(|(code, attributes)| {
                let record = CountryRecord::from_attributes(code.clone(), attributes);
                (code, Arc::new(record))
            })
            .collect();
        self.dataset_loaded = true;
        let available = self.locales.available_locales(files).len();

        let overrides: Vec<_> =
            self.overrides.iter().map(|(code, record)| (code.clone(), Arc::clone(record))).collect();
        for (code, record) in overrides {
            self.install_override(code, record);
        }

        tracing::debug!(
            countries = self.records.len(),
            overrides = self.overrides.len(),
            available_locales = available,
            "Country cache loaded"
        );
        Ok(())
    }

    /// 翻訳の同期対象となるコード（バンドル済みで、上書きされていないもの）
    fn internal_codes(&self) -> Vec<CountryCode> {
        self.bundled_codes.iter().filter(|code| !self.overrides.contains_key(*code)).cloned().collect()
    }

    /// 公開中のレコードを可変で取得する（共有中なら複製してから書き換える）
    fn internal_record_mut(&mut self, code: &CountryCode) -> Option<&mut CountryRecord> {
        self.records.get_mut(code).map(Arc::make_mut)
    }

    fn sync(&mut self, files: &DataFiles) -> Result<()> {
        self.ensure_loaded(files)?;
        if !self.locales.needs_sync() {
            return Ok(());
        }

        let internal = self.internal_codes();

        for locale in self.locales.to_unload() {
            tracing::debug!(locale = %locale, "Unloading translations");
            for code in &internal {
                if let Some(record) = self.internal_record_mut(code) {
                    record.remove_translation(locale.as_str());
                }
            }
            for record in self.shadowed.values_mut() {
                Arc::make_mut(record).remove_translation(locale.as_str());
            }
            self.locales.mark_unloaded(locale.as_str());
        }

        for locale in self.locales.to_load() {
            let table = load_translation_table(files, &locale)?;
            tracing::debug!(locale = %locale, entries = table.len(), "Loading translations");
            for code in &internal {
                let Some(name) = table.get(code) else {
                    continue;
                };
                if let Some(record) = self.internal_record_mut(code) {
                    record.insert_translation(locale.clone(), name.clone());
                }
            }
            for (code, record) in &mut self.shadowed {
                if let Some(name) = table.get(code) {
                    Arc::make_mut(record).insert_translation(locale.clone(), name.clone());
                }
            }
            self.locales.mark_loaded(locale);
        }

        Ok(())
    }

    /// 上書きレコードを公開マップへ反映する
    fn install_override(&mut self, code: CountryCode, record: Arc<CountryRecord>) {
        let previous = self.records.insert(code.clone(), Arc::clone(&record));
        if let Some(previous) = previous
            && self.bundled_codes.contains(&code)
            && !self.shadowed.contains_key(&code)
            && !self.overrides.get(&code).is_some_and(|current| Arc::ptr_eq(current, &previous))
        {
            self.shadowed.insert(code.clone(), previous);
        }
        self.overrides.insert(code, record);
    }
}

/// 国データキャッシュ
///
/// プロセス内で 1 つ作成し、必要な箇所へ参照を渡して使う。
/// 返されるレコードは `Arc` のスナップショットで、後続の変更や `reset` の後も
/// 有効だが最新とは限らない。
#[derive(Debug)]
pub struct CountryCache {
    files: DataFiles,
    state: RwLock<CacheState>,
}

impl CountryCache {
    /// 新しいキャッシュを作成する（この時点ではファイルを読まない）
    #[must_use]
    pub fn new<I>(files: DataFiles, requested_locales: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<LocaleCode>,
    {
        let requested = requested_locales.into_iter().map(Into::into).collect();
        Self { files, state: RwLock::new(CacheState::new(requested)) }
    }

    #[must_use]
    pub const fn files(&self) -> &DataFiles {
        &self.files
    }

    fn read(&self) -> RwLockReadGuard<'_, CacheState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, CacheState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// 同期済みの状態に対して `f` を実行する
    fn with_synced<T>(&self, f: impl Fn(&CacheState) -> T) -> Result<T> {
        {
            let state = self.read();
            if state.is_fresh() {
                return Ok(f(&state));
            }
        }

        let mut state = self.write();
        state.sync(&self.files)?;
        Ok(f(&state))
    }

    /// ベースデータセットを読み込む（読み込み済みなら何もしない）
    ///
    /// # Errors
    /// `countries.json` が壊れている場合
    pub fn ensure_loaded(&self) -> Result<()> {
        self.write().ensure_loaded(&self.files)
    }

    /// 要求ロケールと読み込み済みロケールの差分を反映する
    ///
    /// # Errors
    /// データファイルが壊れている場合
    pub fn sync(&self) -> Result<()> {
        self.write().sync(&self.files)
    }

    /// 国コードでレコードを取得する（大文字小文字は区別しない）
    ///
    /// # Returns
    /// - `Ok(Some(record))`: 見つかった
    /// - `Ok(None)`: 未知のコード
    ///
    /// # Errors
    /// データファイルが壊れている場合
    pub fn get(&self, code: &str) -> Result<Option<Arc<CountryRecord>>> {
        let code = CountryCode::new(code);
        self.with_synced(|state| state.records.get(&code).cloned())
    }

    /// 読み込み済みの全コード（同期してから返す）
    ///
    /// # Errors
    /// データファイルが壊れている場合
    pub fn list(&self) -> Result<Vec<CountryCode>> {
        self.with_synced(|state| state.records.keys().cloned().collect())
    }

    /// 読み込み済みの全コード（翻訳の同期は行わない）
    ///
    /// # Errors
    /// `countries.json` が壊れている場合
    pub fn codes(&self) -> Result<Vec<CountryCode>> {
        let mut state = self.write();
        state.ensure_loaded(&self.files)?;
        Ok(state.records.keys().cloned().collect())
    }

    /// 上書きレコードを登録する
    ///
    /// 同じコードの既存エントリ（以前の上書き・バンドル済みレコード）より優先され、
    /// 直後の `get` から見える。
    ///
    /// # Errors
    /// ベースデータセットの読み込みに失敗した場合
    pub fn register(&self, registered: RegisteredOverride) -> Result<()> {
        let mut state = self.write();
        state.ensure_loaded(&self.files)?;

        let record = registered.into_record();
        let code = record.alpha2().clone();
        tracing::debug!(code = %code, "Registering country override");
        state.install_override(code, Arc::new(record));
        Ok(())
    }

    /// 登録を解除する
    ///
    /// 上書きで隠れていたバンドル済みレコードがあれば元に戻す。
    /// 何かが取り除かれた場合は `true`。
    pub fn unregister(&self, code: &str) -> bool {
        let code = CountryCode::new(code);
        let mut state = self.write();

        let removed_override = state.overrides.remove(&code).is_some();
        let removed_record = state.records.remove(&code).is_some();
        if let Some(bundled) = state.shadowed.remove(&code) {
            state.records.insert(code.clone(), bundled);
        }

        tracing::debug!(code = %code, removed_override, "Unregistered country");
        removed_override || removed_record
    }

    /// キャッシュと上書きを破棄し、読み込み済みロケールを空にする
    ///
    /// 要求ロケールは保持されるので、次のアクセスで再び読み込まれる。
    pub fn reset(&self) {
        let mut state = self.write();
        state.records.clear();
        state.overrides.clear();
        state.shadowed.clear();
        state.bundled_codes.clear();
        state.dataset_loaded = false;
        state.locales.clear_loaded();
        tracing::debug!("Country cache reset");
    }

    /// ロケールを要求に追加する（反映は次の同期時）
    pub fn request_locale(&self, locale: &str) -> bool {
        self.write().locales.request(locale)
    }

    /// ロケールを要求から外す（反映は次の同期時）
    pub fn withdraw_locale(&self, locale: &str) -> bool {
        self.write().locales.withdraw(&LocaleCode::new(locale).to_string())
    }

    /// 要求ロケールを置き換える（反映は次の同期時）
    pub fn set_requested_locales<I>(&self, locales: I)
    where
        I: IntoIterator,
        I::Item: Into<LocaleCode>,
    {
        self.write().locales.set_requested(locales);
    }

    #[must_use]
    pub fn requested_locales(&self) -> Vec<LocaleCode> {
        self.read().locales.requested().to_vec()
    }

    #[must_use]
    pub fn loaded_locales(&self) -> Vec<LocaleCode> {
        self.read().locales.loaded()
    }

    /// ディスク上で利用可能なロケール（初回のみ列挙）
    #[must_use]
    pub fn available_locales(&self) -> Vec<LocaleCode> {
        self.read().locales.available_locales(&self.files).to_vec()
    }

    /// ロケール定義（`locale/<code>.yaml`）を読み込む
    ///
    /// # Errors
    /// - コードがファイル名として使えない場合
    /// - YAML が壊れている場合
    pub fn locale(&self, code: &str) -> Result<Option<Value>> {
        if !LocaleCode::new(code).is_plain() {
            return Err(DataError::InvalidLocale { code: code.to_string() });
        }
        self.files.load_locale_definition(code.trim())
    }
}
