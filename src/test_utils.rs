//! テスト用ユーティリティ関数
//!
//! 複数のテストモジュールで使用される共通のヘルパー関数を提供します。
#![cfg(test)]
#![allow(clippy::unwrap_used)]

use std::fs;
use std::path::Path;

/// テスト用のデータセットをディスクに書き出す
///
/// # Arguments
/// * `root` - 書き出し先（`cache/` と `data/` が作成される）
/// * `countries` - `countries.json` の内容
/// * `locales` - `(ロケール, locales/<locale>.json の内容)` の一覧
pub(crate) fn write_dataset(root: &Path, countries: &str, locales: &[(&str, &str)]) {
    let cache_dir = root.join("cache");
    fs::create_dir_all(cache_dir.join("locales")).unwrap();
    fs::create_dir_all(root.join("data")).unwrap();

    fs::write(cache_dir.join("countries.json"), countries).unwrap();
    for (locale, content) in locales {
        fs::write(cache_dir.join("locales").join(format!("{locale}.json")), content).unwrap();
    }
}
