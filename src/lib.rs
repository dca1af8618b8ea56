//! PRSDN community dashboard
//!
//! Client core for a neighbourhood youth organisation: member roster and
//! registration review, finance ledger and monthly dues, calendar, token
//! attendance check-in, polls and payment tracking. State lives in Postgres;
//! each dashboard area is a store that mirrors its tables in memory and is
//! refreshed by the backend change feed.

pub mod config;
pub mod services;
pub mod models;
pub mod database;
pub mod state;
pub mod i18n;
pub mod utils;
pub mod middleware;

// Re-export commonly used types
pub use config::Settings;
pub use utils::errors::{DashboardError, Result};

// Re-export main components for easy access
pub use database::DatabaseService;
pub use services::Dashboard;
pub use state::{SessionCache, UiStore};
pub use i18n::I18n;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Get library information
pub fn info() -> String {
    format!("{} v{}", NAME, VERSION)
}
