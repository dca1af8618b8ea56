//! Utility modules
//!
//! Error handling, logging setup, date helpers and input validation shared by
//! every store.

pub mod errors;
pub mod logging;
pub mod helpers;
pub mod validation;

pub use errors::{DashboardError, Result};
