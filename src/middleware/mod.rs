//! Middleware module
//!
//! Route table and the navigation guard in front of it

pub mod auth;
pub mod routes;

// Re-export commonly used middleware
pub use auth::{guard, resolve, Access, Navigation, RouteGuard};
pub use routes::{find_route, Route, ROUTES};
