//! データファイル入力
pub mod countries;
pub mod datafile;
pub mod translation;

pub use countries::{
    CountryDataset,
    load_countries,
};
pub use datafile::DataFiles;
pub use translation::{
    TranslationTable,
    load_translation_table,
};
