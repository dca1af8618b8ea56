//! Error handling for the PRSDN dashboard
//!
//! This module defines the main error type used throughout the client core.
//! Every variant maps to a translation key so that user-visible failures are
//! always rendered from the i18n catalogue.

use thiserror::Error;
use uuid::Uuid;

/// SQLSTATE reported by Postgres for a unique constraint violation
pub const UNIQUE_VIOLATION: &str = "23505";

/// Main error type for the dashboard
#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Database migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Configuration source error: {0}")]
    ConfigSource(#[from] config::ConfigError),

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: Uuid },

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Account is not active")]
    AccountInactive,

    #[error("Login failed: {0}")]
    LoginFailed(String),

    #[error("Registration data already in use")]
    DuplicateRegistration,

    #[error("Application submission failed: {0}")]
    SubmissionFailed(String),

    #[error("Invalid username: {0}")]
    InvalidUsername(#[from] UsernameError),

    #[error("Check-in rejected: {0}")]
    Checkin(#[from] CheckinRejection),

    #[error("Check-in failed: {0}")]
    CheckinFailed(String),

    #[error("Poll rejected: {0}")]
    Poll(#[from] PollRejection),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Username rule violations
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum UsernameError {
    #[error("username is empty")]
    Empty,
    #[error("username is shorter than 3 characters")]
    TooShort,
    #[error("username is longer than 20 characters")]
    TooLong,
    #[error("username may only contain lowercase letters and digits")]
    InvalidCharacters,
}

/// Reasons a token check-in is refused
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckinRejection {
    #[error("event not found")]
    EventNotFound,
    #[error("no active event")]
    NoActiveEvent,
    #[error("member already checked in")]
    AlreadyCheckedIn,
    #[error("token expired")]
    TokenExpired,
    #[error("token does not match")]
    TokenInvalid,
}

/// Reasons a poll mutation is refused
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollRejection {
    #[error("a title and at least two options are required")]
    TitleAndOptionsRequired,
    #[error("user already voted")]
    AlreadyVoted,
    #[error("no option selected")]
    NoOptionSelected,
    #[error("single-choice poll takes exactly one option")]
    SingleChoiceOnly,
    #[error("no user is logged in")]
    LoginRequired,
}

/// Result type alias for dashboard operations
pub type Result<T> = std::result::Result<T, DashboardError>;

/// Returns true when the backend refused a write because of a unique constraint
pub fn is_unique_violation(error: &sqlx::Error) -> bool {
    match error {
        sqlx::Error::Database(db) => db.code().as_deref() == Some(UNIQUE_VIOLATION),
        _ => false,
    }
}

impl DashboardError {
    /// Whether this wraps a backend unique constraint violation
    pub fn is_unique_violation(&self) -> bool {
        matches!(self, DashboardError::Database(e) if is_unique_violation(e))
    }

    /// Translation key of the message shown to the user
    pub fn message_key(&self) -> &'static str {
        match self {
            DashboardError::InvalidCredentials => "auth.invalid_credentials",
            DashboardError::AccountInactive => "auth.account_inactive",
            DashboardError::LoginFailed(_) => "auth.login_failed",
            DashboardError::DuplicateRegistration => "applications.duplicate",
            DashboardError::SubmissionFailed(_) => "applications.submit_failed",
            DashboardError::InvalidUsername(e) => match e {
                UsernameError::Empty => "validation.username_empty",
                UsernameError::TooShort => "validation.username_too_short",
                UsernameError::TooLong => "validation.username_too_long",
                UsernameError::InvalidCharacters => "validation.username_format",
            },
            DashboardError::Checkin(r) => match r {
                CheckinRejection::EventNotFound => "checkin.event_not_found",
                CheckinRejection::NoActiveEvent => "checkin.no_active_event",
                CheckinRejection::AlreadyCheckedIn => "checkin.already_checked_in",
                CheckinRejection::TokenExpired => "checkin.token_expired",
                CheckinRejection::TokenInvalid => "checkin.token_invalid",
            },
            DashboardError::CheckinFailed(_) => "checkin.failed",
            DashboardError::Poll(r) => match r {
                PollRejection::TitleAndOptionsRequired => "polls.title_and_options_required",
                PollRejection::AlreadyVoted => "polls.already_voted",
                PollRejection::NoOptionSelected => "polls.no_option_selected",
                PollRejection::SingleChoiceOnly => "polls.single_choice_only",
                PollRejection::LoginRequired => "polls.login_required",
            },
            DashboardError::NotFound { .. } => "errors.not_found",
            DashboardError::InvalidInput(_) => "errors.invalid_input",
            _ => "errors.generic",
        }
    }

    /// Check if the error is recoverable
    pub fn is_recoverable(&self) -> bool {
        match self {
            DashboardError::Database(_) => true,
            DashboardError::Migration(_) => false,
            DashboardError::Redis(_) => true,
            DashboardError::Serialization(_) => false,
            DashboardError::Io(_) => true,
            DashboardError::Config(_) => false,
            DashboardError::ConfigSource(_) => false,
            DashboardError::NotFound { .. } => false,
            DashboardError::InvalidCredentials => false,
            DashboardError::AccountInactive => false,
            DashboardError::LoginFailed(_) => true,
            DashboardError::DuplicateRegistration => false,
            DashboardError::SubmissionFailed(_) => true,
            DashboardError::InvalidUsername(_) => false,
            DashboardError::Checkin(_) => false,
            DashboardError::CheckinFailed(_) => true,
            DashboardError::Poll(_) => false,
            DashboardError::InvalidInput(_) => false,
        }
    }

    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            DashboardError::Migration(_) => ErrorSeverity::Critical,
            DashboardError::Config(_) => ErrorSeverity::Critical,
            DashboardError::ConfigSource(_) => ErrorSeverity::Critical,
            DashboardError::InvalidCredentials => ErrorSeverity::Warning,
            DashboardError::AccountInactive => ErrorSeverity::Warning,
            DashboardError::DuplicateRegistration => ErrorSeverity::Info,
            DashboardError::InvalidUsername(_) => ErrorSeverity::Info,
            DashboardError::Checkin(_) => ErrorSeverity::Info,
            DashboardError::Poll(_) => ErrorSeverity::Info,
            DashboardError::InvalidInput(_) => ErrorSeverity::Info,
            _ => ErrorSeverity::Error,
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "INFO"),
            ErrorSeverity::Warning => write!(f, "WARN"),
            ErrorSeverity::Error => write!(f, "ERROR"),
            ErrorSeverity::Critical => write!(f, "CRITICAL"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checkin_rejections_have_distinct_keys() {
        let keys: Vec<&str> = [
            CheckinRejection::EventNotFound,
            CheckinRejection::NoActiveEvent,
            CheckinRejection::AlreadyCheckedIn,
            CheckinRejection::TokenExpired,
            CheckinRejection::TokenInvalid,
        ]
        .into_iter()
        .map(|r| DashboardError::from(r).message_key())
        .collect();

        let mut deduped = keys.clone();
        deduped.sort();
        deduped.dedup();
        assert_eq!(deduped.len(), keys.len());
        assert!(keys.iter().all(|k| k.starts_with("checkin.")));
    }

    #[test]
    fn test_severity_and_recoverability() {
        assert_eq!(DashboardError::Config("x".into()).severity(), ErrorSeverity::Critical);
        assert!(!DashboardError::Config("x".into()).is_recoverable());
        assert_eq!(DashboardError::InvalidCredentials.severity(), ErrorSeverity::Warning);
        assert!(DashboardError::CheckinFailed("timeout".into()).is_recoverable());
        assert_eq!(ErrorSeverity::Critical.to_string(), "CRITICAL");
    }

    #[test]
    fn test_non_database_error_is_not_unique_violation() {
        assert!(!is_unique_violation(&sqlx::Error::RowNotFound));
        assert!(!DashboardError::Database(sqlx::Error::RowNotFound).is_unique_violation());
        assert!(!DashboardError::DuplicateRegistration.is_unique_violation());
    }

    #[test]
    fn test_username_error_keys() {
        let err: DashboardError = UsernameError::TooLong.into();
        assert_eq!(err.message_key(), "validation.username_too_long");
    }
}
