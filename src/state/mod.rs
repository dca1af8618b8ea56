//! State management module
//! 
//! This module holds the session cache and the UI state shared by the stores

pub mod session;
pub mod ui;

// Re-export commonly used state components
pub use session::SessionCache;
pub use ui::{UiStore, Toast, ToastKind, ConfirmOptions, ConfirmVariant};
