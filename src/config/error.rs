//! Configuration error types.

use thiserror::Error;

/// Errors that can occur during configuration loading and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Port value is outside valid range (1-65535).
    #[error("invalid port '{value}': must be between 1 and 65535")]
    InvalidPort { value: String },

    /// Port string could not be parsed as a number.
    #[error("failed to parse port '{value}': {source}")]
    PortParseError {
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },

    /// Bind address string could not be parsed.
    #[error("failed to parse bind address '{value}': {source}")]
    InvalidBindAddr {
        value: String,
        #[source]
        source: std::net::AddrParseError,
    },

    /// A collaborator URL is not absolute or not parseable.
    #[error("invalid URL in {name} '{value}': {message}")]
    InvalidUrl {
        name: &'static str,
        value: String,
        message: String,
    },

    /// Timeout must be a positive number of seconds.
    #[error("invalid timeout '{value}': must be a positive number of seconds")]
    InvalidTimeout { value: String },

    /// Pool size must be a positive integer.
    #[error("invalid database pool size '{value}': must be a positive integer")]
    InvalidPoolSize { value: String },

    /// Connection string (including its `sslmode`) is not understood by the driver.
    #[error("invalid database connection string: {message}")]
    InvalidDatabaseUrl { message: String },
}
