//! Internationalization module
//!
//! Indonesian is the default language; English is the secondary catalogue.
//! Every [`DashboardError`](crate::utils::errors::DashboardError) maps to a
//! catalogue key, so user-visible failures always come from here.

pub mod loader;

// Re-export commonly used i18n components
pub use loader::{I18n, TranslationParams, TranslationStats, LanguageStats};
