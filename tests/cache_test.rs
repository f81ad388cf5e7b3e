//! 公開 API を通したキャッシュの振る舞いのテスト

#![allow(clippy::unwrap_used)]
#![allow(clippy::panic)]
#![allow(clippy::indexing_slicing)]
#![allow(missing_docs)]

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use country_data::config::{
    CONFIG_FILE,
    ConfigManager,
};
use country_data::{
    Country,
    CountryCache,
    RegisteredOverride,
};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

const COUNTRIES: &str = r#"{
    "US": {"name": "United States", "alpha3": "USA", "languages_official": ["en"]},
    "FR": {"name": "France", "alpha3": "FRA", "eu_member": true, "languages_official": ["fr"]},
    "ZZ": {"name": "Bundled Z"}
}"#;

fn write_workspace(root: &Path, config: &str) {
    let locales = root.join("cache").join("locales");
    fs::create_dir_all(&locales).unwrap();
    fs::create_dir_all(root.join("data")).unwrap();

    fs::write(root.join(CONFIG_FILE), config).unwrap();
    fs::write(root.join("cache").join("countries.json"), COUNTRIES).unwrap();
    fs::write(locales.join("fr.json"), r#"{"US": "États-Unis", "FR": "France"}"#).unwrap();
    fs::write(locales.join("de.json"), r#"{"US": "Vereinigte Staaten", "FR": "Frankreich"}"#)
        .unwrap();
    fs::write(locales.join("en.json"), r#"{"US": "United States", "FR": "France"}"#).unwrap();
}

fn open_cache(config: &str) -> (TempDir, CountryCache) {
    let temp_dir = TempDir::new().unwrap();
    write_workspace(temp_dir.path(), config);

    let mut manager = ConfigManager::new();
    manager.load_settings(Some(temp_dir.path().to_path_buf())).unwrap();
    let cache = manager.build_cache();
    (temp_dir, cache)
}

fn translation_locales(cache: &CountryCache, code: &str) -> Vec<String> {
    cache.get(code).unwrap().unwrap().translations().keys().map(ToString::to_string).collect()
}

fn assert_derived_names_consistent(cache: &CountryCache) {
    for code in cache.list().unwrap() {
        let record = cache.get(code.as_str()).unwrap().unwrap();
        let mut derived = record.translated_names().to_vec();
        let mut values: Vec<String> = record.translations().values().cloned().collect();
        derived.sort();
        values.sort();
        assert_eq!(derived, values, "translated_names out of step for {code}");
    }
}

#[test]
fn path_like_locale_codes_are_ignored() {
    let (_dir, cache) = open_cache(r#"{"locales": ["fr"]}"#);

    assert!(!cache.request_locale("../countries"));

    let requested: Vec<String> = cache.requested_locales().iter().map(ToString::to_string).collect();
    assert_eq!(requested, vec!["fr"]);
    assert_eq!(cache.get("US").unwrap().unwrap().translation("fr"), Some("États-Unis"));
    assert!(cache.locale("../cache/countries").is_err());
}

#[test]
fn requested_then_withdrawn_locale_scenario() {
    let (_dir, cache) = open_cache(r#"{"locales": []}"#);

    cache.request_locale("fr");
    let us = cache.get("US").unwrap().unwrap();
    assert_eq!(us.translation("fr"), Some("États-Unis"));

    cache.set_requested_locales(Vec::<&str>::new());
    cache.sync().unwrap();
    let us = cache.get("US").unwrap().unwrap();
    assert_eq!(us.translation("fr"), None);
    assert!(cache.loaded_locales().is_empty());
}

fn assert_loaded_matches_requested(cache: &CountryCache) {
    let requested: BTreeSet<String> =
        cache.requested_locales().iter().map(ToString::to_string).collect();
    let loaded: BTreeSet<String> = cache.loaded_locales().iter().map(ToString::to_string).collect();
    assert_eq!(loaded, requested);
}

#[test]
fn loaded_converges_to_requested() {
    let (_dir, cache) = open_cache(r#"{"locales": ["en"]}"#);

    // (requested, withdrawn) per step
    let steps: Vec<(Vec<&str>, Vec<&str>)> = vec![
        (vec!["fr"], vec![]),
        (vec!["de"], vec!["en"]),
        (vec![], vec!["fr", "de"]),
        (vec!["en"], vec![]),
    ];
    for (requested, withdrawn) in steps {
        for locale in requested {
            cache.request_locale(locale);
        }
        for locale in withdrawn {
            cache.withdraw_locale(locale);
        }
        cache.sync().unwrap();

        assert_loaded_matches_requested(&cache);
        assert_derived_names_consistent(&cache);
    }

    assert_eq!(translation_locales(&cache, "FR"), vec!["en"]);
}

#[test]
fn locales_can_be_fully_withdrawn() {
    let (_dir, cache) = open_cache(r#"{"locales": ["en", "fr"]}"#);
    cache.sync().unwrap();

    cache.withdraw_locale("en");
    cache.withdraw_locale("FR");
    cache.sync().unwrap();

    assert!(cache.loaded_locales().is_empty());
    assert!(translation_locales(&cache, "US").is_empty());
    assert_derived_names_consistent(&cache);
}

#[test]
fn concurrent_readers_and_writers_leave_consistent_state() {
    let (_dir, cache) = open_cache(r#"{"locales": ["en"]}"#);
    let cache = &cache;

    std::thread::scope(|scope| {
        for _ in 0..4 {
            scope.spawn(move || {
                for _ in 0..100 {
                    let us = cache.get("US").unwrap().unwrap();
                    assert_eq!(us.translated_names().len(), us.translations().len());
                    assert!(cache.list().unwrap().len() >= 2);
                }
            });
        }
        scope.spawn(move || {
            for round in 0..100 {
                if round % 2 == 0 {
                    cache.request_locale("fr");
                } else {
                    cache.withdraw_locale("fr");
                }
                cache.request_locale("de");
            }
        });
        scope.spawn(move || {
            for _ in 0..100 {
                cache
                    .register(RegisteredOverride::new("ZZ").with_attribute("name", "Testland"))
                    .unwrap();
                cache.unregister("ZZ");
            }
        });
    });

    cache.sync().unwrap();
    assert_loaded_matches_requested(cache);
    assert_derived_names_consistent(cache);
    assert_eq!(translation_locales(cache, "US"), vec!["de", "en"]);
    assert_eq!(cache.get("ZZ").unwrap().unwrap().get_str("name"), Some("Bundled Z"));
}

#[test]
fn second_sync_is_a_no_op() {
    let (dir, cache) = open_cache(r#"{"locales": ["fr"]}"#);
    let before = cache.get("US").unwrap().unwrap();

    fs::write(dir.path().join("cache").join("locales").join("fr.json"), "{ broken").unwrap();
    cache.sync().unwrap();
    let after = cache.get("US").unwrap().unwrap();

    assert!(Arc::ptr_eq(&before, &after));
}

#[test]
fn override_wins_over_bundled_record_and_unregister_restores_it() {
    let (_dir, cache) = open_cache(r#"{"locales": ["fr"]}"#);

    cache
        .register(
            RegisteredOverride::new("zz")
                .with_attribute("name", "Testland")
                .with_translation("en", "Testland"),
        )
        .unwrap();
    assert_eq!(cache.get("ZZ").unwrap().unwrap().get_str("name"), Some("Testland"));

    // 上書きはロケールの同期対象外
    cache.request_locale("de");
    cache.sync().unwrap();
    assert_eq!(translation_locales(&cache, "ZZ"), vec!["en"]);

    assert!(cache.unregister("ZZ"));
    let restored = cache.get("ZZ").unwrap().unwrap();
    assert_eq!(restored.get_str("name"), Some("Bundled Z"));
    assert_derived_names_consistent(&cache);
}

#[test]
fn unregister_of_unbundled_override_leaves_nothing() {
    let (_dir, cache) = open_cache("{}");

    cache.register(RegisteredOverride::new("XK").with_attribute("name", "Kosovo")).unwrap();
    assert!(cache.get("XK").unwrap().is_some());

    assert!(cache.unregister("xk"));
    assert!(cache.get("XK").unwrap().is_none());
}

#[test]
fn reset_keeps_requested_locales() {
    let (_dir, cache) = open_cache(r#"{"locales": []}"#);

    cache.request_locale("fr");
    cache.sync().unwrap();
    cache.reset();
    assert!(cache.loaded_locales().is_empty());

    let france = cache.get("FR").unwrap().unwrap();
    assert_eq!(france.translation("fr"), Some("France"));
    assert_eq!(cache.loaded_locales().iter().map(ToString::to_string).collect::<Vec<_>>(), vec![
        "fr"
    ]);
}

#[test]
fn country_facade_reads_through_the_cache() {
    let (_dir, cache) = open_cache(r#"{"locales": ["en"]}"#);

    let mut france = Country::new(&cache, "fr").unwrap().unwrap();
    assert_eq!(france.alpha3(), Some("FRA"));
    assert!(france.in_eu());
    assert_eq!(france.to_string(), "France");

    assert_eq!(france.local_name().unwrap(), Some("France".to_string()));
    assert!(cache.requested_locales().iter().any(|locale| locale.as_str() == "fr"));
    assert!(Country::new(&cache, "QQ").unwrap().is_none());
}

#[test]
fn malformed_dataset_is_reported() {
    let (dir, cache) = open_cache("{}");
    fs::write(dir.path().join("cache").join("countries.json"), "[1, 2]").unwrap();

    let error = cache.get("US").unwrap_err();
    assert!(error.to_string().contains("countries.json"));
}
