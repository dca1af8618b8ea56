//! Application settings management
//!
//! This module defines the configuration structure and provides methods
//! for loading settings from TOML files and environment variables.

use std::time::Duration;
use serde::{Deserialize, Serialize};

/// Main application configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    pub database: DatabaseConfig,
    pub session: SessionConfig,
    pub dues: DuesConfig,
    pub attendance: AttendanceConfig,
    pub realtime: RealtimeConfig,
    pub i18n: I18nConfig,
    pub logging: LoggingConfig,
}

/// Database configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_seconds: u64,
    pub run_migrations: bool,
}

/// Redis-backed session cache configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SessionConfig {
    pub redis_url: String,
    pub prefix: String,
    pub key: String,
    pub ttl_seconds: u64,
}

/// Monthly dues ("kas") configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DuesConfig {
    pub default_amount: i64,
    pub ledger_category: String,
}

/// Attendance token configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AttendanceConfig {
    pub token_length: usize,
    pub token_ttl_seconds: u64,
    pub rotate_active_token: bool,
}

/// Change feed configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RealtimeConfig {
    pub enabled: bool,
    pub channel: String,
}

/// Internationalization configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct I18nConfig {
    pub default_language: String,
    pub supported_languages: Vec<String>,
    pub translations_dir: String,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    pub directory: String,
    pub file_prefix: String,
    pub json: bool,
}

impl Settings {
    /// Load settings from defaults, an optional `config` file and `PRSDN__*` variables
    pub fn new() -> Result<Self, config::ConfigError> {
        let defaults = config::Config::try_from(&Settings::default())?;

        let settings = config::Config::builder()
            .add_source(defaults)
            .add_source(config::File::with_name("config").required(false))
            .add_source(
                config::Environment::with_prefix("PRSDN")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("i18n.supported_languages")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }

    /// Validate configuration settings
    pub fn validate(&self) -> Result<(), crate::utils::errors::DashboardError> {
        super::validation::validate_settings(self)
    }
}

impl DatabaseConfig {
    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_seconds)
    }
}

const ROTATIONS_PER_TTL: i64 = 3;

impl AttendanceConfig {
    /// Token lifetime in milliseconds
    pub fn token_ttl_ms(&self) -> i64 {
        (self.token_ttl_seconds as i64) * 1000
    }

    /// How often the active token is checked; a third of its lifetime
    pub fn rotation_period(&self) -> Duration {
        Duration::from_millis((self.token_ttl_ms() / ROTATIONS_PER_TTL).max(1) as u64)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                url: "postgresql://localhost/prsdn".to_string(),
                max_connections: 10,
                min_connections: 1,
                acquire_timeout_seconds: 30,
                run_migrations: true,
            },
            session: SessionConfig {
                redis_url: "redis://localhost:6379".to_string(),
                prefix: "prsdn:".to_string(),
                key: "prsdn_session".to_string(),
                ttl_seconds: 60 * 60 * 24 * 30,
            },
            dues: DuesConfig {
                default_amount: 5000,
                ledger_category: "kas".to_string(),
            },
            attendance: AttendanceConfig {
                token_length: 6,
                token_ttl_seconds: 30,
                rotate_active_token: true,
            },
            realtime: RealtimeConfig {
                enabled: true,
                channel: "prsdn_changes".to_string(),
            },
            i18n: I18nConfig {
                default_language: "id".to_string(),
                supported_languages: vec!["id".to_string(), "en".to_string()],
                translations_dir: "translations".to_string(),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                directory: "logs".to_string(),
                file_prefix: "prsdn-dashboard.log".to_string(),
                json: false,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_dashboard_constants() {
        let settings = Settings::default();
        assert_eq!(settings.dues.default_amount, 5000);
        assert_eq!(settings.dues.ledger_category, "kas");
        assert_eq!(settings.attendance.token_length, 6);
        assert_eq!(settings.attendance.token_ttl_ms(), 30_000);
        assert_eq!(settings.i18n.default_language, "id");
    }

    #[test]
    fn test_rotation_period_is_a_third_of_ttl() {
        let mut attendance = Settings::default().attendance;
        assert_eq!(attendance.rotation_period(), Duration::from_secs(10));
        attendance.token_ttl_seconds = 1;
        assert_eq!(attendance.rotation_period(), Duration::from_millis(333));
    }

    #[test]
    fn test_defaults_validate() {
        assert!(Settings::default().validate().is_ok());
    }
}
