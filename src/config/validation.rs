//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (periods within 1..=one day, addresses parse)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AppConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use crate::config::schema::AppConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Longest accepted period or timeout. Larger values overflow timer deadlines.
const MAX_PERIOD_SECS: u64 = 24 * 60 * 60;
const MAX_PERIOD_MS: u64 = MAX_PERIOD_SECS * 1000;

/// A single semantic problem found in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Validate a parsed configuration.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_addr(&mut errors, "server.bind_address", &config.server.bind_address);
    check_period(&mut errors, "server.request_timeout_secs", config.server.request_timeout_secs, MAX_PERIOD_SECS);

    for origin in &config.cors.allowed_origins {
        if origin != "*" && !origin.starts_with("http://") && !origin.starts_with("https://") {
            errors.push(ValidationError::new(
                "cors.allowed_origins",
                format!("'{origin}' is neither '*' nor an http(s) origin"),
            ));
        }
    }

    if config.simulation.vehicle_id.trim().is_empty() {
        errors.push(ValidationError::new("simulation.vehicle_id", "must not be empty"));
    }
    check_period(&mut errors, "simulation.tick_ms", config.simulation.tick_ms, MAX_PERIOD_MS);

    check_period(&mut errors, "broadcast.interval_ms", config.broadcast.interval_ms, MAX_PERIOD_MS);
    check_positive(&mut errors, "broadcast.channel_capacity", config.broadcast.channel_capacity as u64);

    check_positive(&mut errors, "storage.max_records", config.storage.max_records as u64);
    check_period(&mut errors, "storage.flush_interval_secs", config.storage.flush_interval_secs, MAX_PERIOD_SECS);

    if !LOG_LEVELS.contains(&config.observability.log_level.to_ascii_lowercase().as_str()) {
        errors.push(ValidationError::new(
            "observability.log_level",
            format!("unknown level '{}'", config.observability.log_level),
        ));
    }
    if config.observability.metrics_enabled {
        check_addr(&mut errors, "observability.metrics_address", &config.observability.metrics_address);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_addr(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    if let Err(e) = value.parse::<SocketAddr>() {
        errors.push(ValidationError::new(field, format!("'{value}' is not a socket address ({e})")));
    }
}

fn check_period(errors: &mut Vec<ValidationError>, field: &'static str, value: u64, max: u64) {
    if value > max {
        errors.push(ValidationError::new(field, format!("must be at most {max}")));
    } else {
        check_positive(errors, field, value);
    }
}

fn check_positive(errors: &mut Vec<ValidationError>, field: &'static str, value: u64) {
    if value == 0 {
        errors.push(ValidationError::new(field, "must be greater than zero"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(validate_config(&AppConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_every_error() {
        let mut config = AppConfig::default();
        config.server.bind_address = "not-an-address".into();
        config.simulation.tick_ms = 0;
        config.simulation.vehicle_id = " ".into();
        config.observability.log_level = "loud".into();
        config.cors.allowed_origins = vec!["ftp://example.com".into()];

        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
        assert_eq!(
            fields,
            vec![
                "server.bind_address",
                "cors.allowed_origins",
                "simulation.vehicle_id",
                "simulation.tick_ms",
                "observability.log_level",
            ]
        );
    }

    #[test]
    fn test_periods_have_upper_bound() {
        let mut config = AppConfig::default();
        config.server.request_timeout_secs = u64::MAX;
        config.simulation.tick_ms = MAX_PERIOD_MS + 1;
        config.broadcast.interval_ms = u64::MAX;
        config.storage.flush_interval_secs = 9_223_372_036_854_775_807;

        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
        assert_eq!(
            fields,
            vec![
                "server.request_timeout_secs",
                "simulation.tick_ms",
                "broadcast.interval_ms",
                "storage.flush_interval_secs",
            ]
        );
        assert_eq!(errors[1].message, format!("must be at most {MAX_PERIOD_MS}"));

        config.server.request_timeout_secs = MAX_PERIOD_SECS;
        config.simulation.tick_ms = MAX_PERIOD_MS;
        config.broadcast.interval_ms = MAX_PERIOD_MS;
        config.storage.flush_interval_secs = MAX_PERIOD_SECS;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_metrics_address_only_checked_when_enabled() {
        let mut config = AppConfig::default();
        config.observability.metrics_address = "nope".into();
        assert!(validate_config(&config).is_ok());

        config.observability.metrics_enabled = true;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors[0].field, "observability.metrics_address");
    }
}
