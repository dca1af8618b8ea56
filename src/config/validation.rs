//! Configuration validation module
//!
//! This module provides validation functions for application configuration
//! to ensure all required settings are properly configured.

use crate::utils::errors::{DashboardError, Result};
use super::Settings;

/// Validate all configuration settings
pub fn validate_settings(settings: &Settings) -> Result<()> {
    validate_database_config(&settings.database)?;
    validate_session_config(&settings.session)?;
    validate_dues_config(&settings.dues)?;
    validate_attendance_config(&settings.attendance)?;
    validate_realtime_config(&settings.realtime)?;
    validate_i18n_config(&settings.i18n)?;
    validate_logging_config(&settings.logging)?;

    Ok(())
}

/// Validate database configuration
fn validate_database_config(config: &super::DatabaseConfig) -> Result<()> {
    if config.url.is_empty() {
        return Err(DashboardError::Config(
            "Database URL is required".to_string()
        ));
    }

    if config.max_connections == 0 {
        return Err(DashboardError::Config(
            "Max connections must be greater than 0".to_string()
        ));
    }

    if config.min_connections > config.max_connections {
        return Err(DashboardError::Config(
            "Min connections cannot be greater than max connections".to_string()
        ));
    }

    Ok(())
}

/// Validate session cache configuration
fn validate_session_config(config: &super::SessionConfig) -> Result<()> {
    if config.redis_url.is_empty() {
        return Err(DashboardError::Config(
            "Redis URL is required".to_string()
        ));
    }

    if config.key.is_empty() {
        return Err(DashboardError::Config(
            "Session key is required".to_string()
        ));
    }

    Ok(())
}

/// Validate dues configuration
fn validate_dues_config(config: &super::DuesConfig) -> Result<()> {
    if config.default_amount < 0 {
        return Err(DashboardError::Config(
            "Default dues amount cannot be negative".to_string()
        ));
    }

    if config.ledger_category.is_empty() {
        return Err(DashboardError::Config(
            "Dues ledger category is required".to_string()
        ));
    }

    Ok(())
}

/// Validate attendance token configuration
fn validate_attendance_config(config: &super::AttendanceConfig) -> Result<()> {
    if config.token_length == 0 {
        return Err(DashboardError::Config(
            "Attendance token length must be greater than 0".to_string()
        ));
    }

    if config.token_ttl_seconds == 0 {
        return Err(DashboardError::Config(
            "Attendance token TTL must be greater than 0".to_string()
        ));
    }

    Ok(())
}

/// Validate change feed configuration
fn validate_realtime_config(config: &super::RealtimeConfig) -> Result<()> {
    if config.enabled && config.channel.is_empty() {
        return Err(DashboardError::Config(
            "Change feed channel is required when realtime is enabled".to_string()
        ));
    }

    Ok(())
}

/// Validate internationalization configuration
fn validate_i18n_config(config: &super::I18nConfig) -> Result<()> {
    if config.default_language.is_empty() {
        return Err(DashboardError::Config(
            "Default language is required".to_string()
        ));
    }

    if config.supported_languages.is_empty() {
        return Err(DashboardError::Config(
            "At least one supported language is required".to_string()
        ));
    }

    if !config.supported_languages.contains(&config.default_language) {
        return Err(DashboardError::Config(
            "Default language must be in supported languages list".to_string()
        ));
    }

    Ok(())
}

/// Validate logging configuration
fn validate_logging_config(config: &super::LoggingConfig) -> Result<()> {
    if config.level.is_empty() {
        return Err(DashboardError::Config(
            "Log level is required".to_string()
        ));
    }

    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if !valid_levels.contains(&config.level.as_str()) {
        return Err(DashboardError::Config(
            format!("Invalid log level: {}. Valid levels: {:?}", config.level, valid_levels)
        ));
    }

    Ok(())
}
