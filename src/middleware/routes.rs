//! Dashboard route table

/// One entry of the route table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Route {
    pub path: &'static str,
    /// View rendered for the path; `None` for redirect records
    pub view: Option<&'static str>,
    pub redirect: Option<&'static str>,
    pub requires_auth: bool,
    pub requires_admin: bool,
}

impl Route {
    const fn public(path: &'static str, view: &'static str) -> Self {
        Self { path, view: Some(view), redirect: None, requires_auth: false, requires_admin: false }
    }

    const fn member(path: &'static str, view: &'static str) -> Self {
        Self { path, view: Some(view), redirect: None, requires_auth: true, requires_admin: false }
    }

    const fn admin(path: &'static str, view: &'static str) -> Self {
        Self { path, view: Some(view), redirect: None, requires_auth: true, requires_admin: true }
    }

    const fn redirect(path: &'static str, to: &'static str, requires_auth: bool, requires_admin: bool) -> Self {
        Self { path, view: None, redirect: Some(to), requires_auth, requires_admin }
    }
}

pub const LOGIN_PATH: &str = "/login";
pub const ADMIN_HOME_PATH: &str = "/admin/dashboard";
pub const USER_HOME_PATH: &str = "/user/home";

pub static ROUTES: &[Route] = &[
    Route::redirect("/", LOGIN_PATH, false, false),
    Route::public(LOGIN_PATH, "Login"),
    Route::public("/apply", "Apply"),
    Route::public("/pending", "Pending"),
    Route::redirect("/admin", ADMIN_HOME_PATH, true, true),
    Route::admin(ADMIN_HOME_PATH, "AdminDashboard"),
    Route::admin("/admin/members/list", "MembersList"),
    Route::admin("/admin/members/applications", "MembersApplications"),
    Route::admin("/admin/finance/ledger", "FinanceLedger"),
    Route::admin("/admin/finance/kas", "FinanceKas"),
    Route::admin("/admin/attendance-events", "AttendanceEvents"),
    Route::redirect("/user", USER_HOME_PATH, true, false),
    Route::member(USER_HOME_PATH, "UserHome"),
    Route::member("/user/kas", "UserKas"),
    Route::member("/user/attendance", "UserAttendance"),
    Route::member("/user/attendance-checkin", "UserAttendanceCheckin"),
];

/// Exact-match lookup; a single trailing slash is ignored
pub fn find_route(path: &str) -> Option<&'static Route> {
    let path = match path.strip_suffix('/') {
        Some(trimmed) if !trimmed.is_empty() => trimmed,
        _ => path,
    };
    ROUTES.iter().find(|r| r.path == path)
}
