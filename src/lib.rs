//! country-data
//!
//! ISO 3166 国データのストアと、ロケール単位で遅延同期されるインメモリキャッシュ

pub mod cache;
pub mod config;
pub mod country;
pub mod error;
pub mod input;
pub mod locale;
pub mod types;

#[cfg(test)]
mod test_utils;

pub use cache::{
    CountryCache,
    CountryRecord,
    RegisteredOverride,
};
pub use country::Country;
pub use error::{
    DataError,
    Result,
};
pub use types::{
    CountryCode,
    LocaleCode,
};
