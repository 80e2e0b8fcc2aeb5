//! Environment-sourced configuration for the deadman server.

use std::time::Duration;
use thiserror::Error;
use tracing::info;

/// Configuration error types
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid duration in {var}: {reason}")]
    InvalidDuration { var: &'static str, reason: String },

    #[error("Invalid value in {var}: {reason}")]
    InvalidValue { var: &'static str, reason: String },

    #[error("Invalid configuration: {0}")]
    Validation(String),
}

/// Runtime configuration.
///
/// Sourced from environment variables; every field has a default so an
/// empty environment yields a working (if notifier-less) server.
#[derive(Debug, Clone)]
pub struct Config {
    /// Grace period before a non-refreshed alert is considered missing
    pub expire_duration: Duration,

    /// Expiry sweep polling interval
    pub check_interval: Duration,

    /// HTTP listen port
    pub port: u16,

    /// Verbose logging
    pub debug: bool,

    /// Slack API token; transport disabled when unset
    pub slack_token: Option<String>,

    /// Slack channel name for expiry notifications
    pub slack_channel: String,

    /// PagerDuty service key; transport disabled when unset
    pub pagerduty_token: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            expire_duration: Duration::from_secs(3600),
            check_interval: Duration::from_secs(60),
            port: 8080,
            debug: false,
            slack_token: None,
            slack_channel: "general".to_string(),
            pagerduty_token: None,
        }
    }
}

impl Config {
    /// Load configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// Lets tests feed variables without touching the process
    /// environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Config::default();

        if let Some(value) = lookup("EXPIRE_DURATION") {
            config.expire_duration = parse_duration("EXPIRE_DURATION", &value)?;
        }
        if let Some(value) = lookup("INTERNAL_CHK_INTERVAL") {
            config.check_interval = parse_duration("INTERNAL_CHK_INTERVAL", &value)?;
        }
        if let Some(value) = lookup("PORT") {
            config.port = value
                .trim()
                .parse()
                .map_err(|e: std::num::ParseIntError| ConfigError::InvalidValue {
                    var: "PORT",
                    reason: e.to_string(),
                })?;
        }
        if let Some(value) = lookup("DEBUG") {
            config.debug = parse_bool(&value);
        }

        config.slack_token = lookup("SLACK_TOKEN").filter(|token| !token.is_empty());
        if let Some(channel) = lookup("SLACK_CHANNEL").filter(|channel| !channel.is_empty()) {
            config.slack_channel = channel;
        }
        config.pagerduty_token = lookup("PD_TOKEN").filter(|token| !token.is_empty());

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        validate_expire_duration(self.expire_duration)?;
        validate_check_interval(self.check_interval)?;
        Ok(())
    }

    /// Log a summary of the effective configuration at startup.
    pub fn log_summary(&self) {
        info!(
            expire_duration = %humantime::format_duration(self.expire_duration),
            "Any missing alert is notified after this long without firing"
        );
        info!(
            check_interval = %humantime::format_duration(self.check_interval),
            "Internal expiry check interval"
        );
        info!(port = self.port, "Listening port");
        info!(
            slack = self.slack_token.is_some(),
            pagerduty = self.pagerduty_token.is_some(),
            "Notifier transports configured"
        );
    }
}

fn parse_duration(var: &'static str, value: &str) -> Result<Duration, ConfigError> {
    humantime::parse_duration(value.trim()).map_err(|e| ConfigError::InvalidDuration {
        var,
        reason: e.to_string(),
    })
}

fn parse_bool(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes"
    )
}

fn validate_expire_duration(duration: Duration) -> Result<(), ConfigError> {
    if duration.is_zero() {
        return Err(ConfigError::Validation(
            "EXPIRE_DURATION must be nonzero".to_string(),
        ));
    }
    Ok(())
}

fn validate_check_interval(interval: Duration) -> Result<(), ConfigError> {
    if interval < Duration::from_secs(1) || interval > Duration::from_secs(3600) {
        return Err(ConfigError::Validation(
            "INTERNAL_CHK_INTERVAL must be between 1s and 1h".to_string(),
        ));
    }
    Ok(())
}
