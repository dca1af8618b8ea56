//! Route guard
//!
//! Decides where a navigation ends up given who is logged in.

use tracing::debug;
use crate::services::AuthStore;
use super::routes::{find_route, Route, ADMIN_HOME_PATH, LOGIN_PATH, USER_HOME_PATH};

/// Redirect records are followed at most this many times
const MAX_REDIRECTS: usize = 4;

/// Who is navigating
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Access {
    pub authenticated: bool,
    pub admin: bool,
}

impl Access {
    pub const ANONYMOUS: Access = Access { authenticated: false, admin: false };
    pub const USER: Access = Access { authenticated: true, admin: false };
    pub const ADMIN: Access = Access { authenticated: true, admin: true };
}

/// Outcome of guarding one route
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Proceed(&'static Route),
    Redirect(&'static str),
    NotFound,
}

/// Guard a single navigation step
pub fn guard(path: &str, access: Access) -> Navigation {
    let Some(route) = find_route(path) else {
        return Navigation::NotFound;
    };

    if route.requires_auth && !access.authenticated {
        Navigation::Redirect(LOGIN_PATH)
    } else if route.requires_admin && !access.admin {
        Navigation::Redirect(USER_HOME_PATH)
    } else if route.path == LOGIN_PATH && access.authenticated {
        Navigation::Redirect(if access.admin { ADMIN_HOME_PATH } else { USER_HOME_PATH })
    } else if let Some(target) = route.redirect {
        Navigation::Redirect(target)
    } else {
        Navigation::Proceed(route)
    }
}

/// Follow guard redirects until a view is reached
pub fn resolve(path: &str, access: Access) -> Option<&'static Route> {
    let mut current = match guard(path, access) {
        Navigation::Proceed(route) => return Some(route),
        Navigation::Redirect(target) => target,
        Navigation::NotFound => return None,
    };

    for _ in 0..MAX_REDIRECTS {
        match guard(current, access) {
            Navigation::Proceed(route) => return Some(route),
            Navigation::Redirect(target) => current = target,
            Navigation::NotFound => return None,
        }
    }

    None
}

/// Route guard bound to the live auth store
#[derive(Clone)]
pub struct RouteGuard {
    auth: AuthStore,
}

impl RouteGuard {
    pub fn new(auth: AuthStore) -> Self {
        Self { auth }
    }

    pub async fn access(&self) -> Access {
        Access {
            authenticated: self.auth.is_authenticated().await,
            admin: self.auth.is_admin().await,
        }
    }

    pub async fn navigate(&self, path: &str) -> Option<&'static Route> {
        let access = self.access().await;
        let route = resolve(path, access);
        debug!(path = path, resolved = ?route.map(|r| r.path), "Navigation resolved");
        route
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guard_rules() {
        assert_eq!(guard("/admin/finance/kas", Access::ANONYMOUS), Navigation::Redirect(LOGIN_PATH));
        assert_eq!(guard("/admin/finance/kas", Access::USER), Navigation::Redirect(USER_HOME_PATH));
        assert_eq!(guard("/user/kas", Access::ANONYMOUS), Navigation::Redirect(LOGIN_PATH));
        assert_eq!(guard("/login", Access::ADMIN), Navigation::Redirect(ADMIN_HOME_PATH));
        assert_eq!(guard("/login", Access::USER), Navigation::Redirect(USER_HOME_PATH));
        assert_eq!(guard("/nowhere", Access::ADMIN), Navigation::NotFound);
        assert!(matches!(guard("/apply", Access::ANONYMOUS), Navigation::Proceed(r) if r.view == Some("Apply")));
    }

    #[test]
    fn test_resolve_follows_redirects() {
        let view = |path: &str, access| resolve(path, access).and_then(|r| r.view);
        assert_eq!(view("/", Access::ANONYMOUS), Some("Login"));
        assert_eq!(view("/", Access::ADMIN), Some("AdminDashboard"));
        assert_eq!(view("/admin", Access::USER), Some("UserHome"));
        assert_eq!(view("/user", Access::USER), Some("UserHome"));
        assert_eq!(view("/admin", Access::ANONYMOUS), Some("Login"));
        assert_eq!(view("/missing", Access::USER), None);
    }
}
