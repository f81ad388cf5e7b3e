//! ロケール管理
mod registry;

pub use registry::LocaleRegistry;
