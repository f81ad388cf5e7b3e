//! 国データキャッシュ
mod record;
mod store;

pub use record::{
    CountryRecord,
    RegisteredOverride,
    Translations,
};
pub use store::CountryCache;
