//! Environment-backed configuration.
//!
//! Every setting has a default. Override with `ANALYSIS_*` variables, the
//! collaborator URLs, and the `DB_*` connection parts shared with the storing service.

pub mod error;


pub use error::ConfigError;

use std::env;
use std::net::IpAddr;
use std::time::Duration;

use crate::constants::DEFAULT_HTTP_TIMEOUT;

/// Service configuration loaded from environment variables.
///
/// Use [`Config::from_env`] to read overrides on top of defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port. Default: `8082`.
    pub port: u16,

    /// IP address to bind to. Default: `0.0.0.0`.
    pub bind_addr: IpAddr,

    /// Base URL of the file storing service. Default: `http://file-storing-service:8081`.
    pub content_service_url: String,

    /// Word cloud rendering endpoint. Default: `https://quickchart.io/wordcloud`.
    pub word_cloud_url: String,

    /// PostgreSQL connection string (URL or `key=value` form).
    pub database_url: String,

    /// Bound applied to each outbound HTTP call. Default: 5s.
    pub http_timeout: Duration,

    /// Maximum number of pooled PostgreSQL connections. Default: `16`.
    pub db_pool_size: usize,
}

/// Default storing service address used when `FILE_STORING_SERVICE_URL` is not set.
pub const DEFAULT_CONTENT_SERVICE_URL: &str = "http://file-storing-service:8081";

/// Default word cloud endpoint used when `WORD_CLOUD_URL` is not set.
pub const DEFAULT_WORD_CLOUD_URL: &str = "https://quickchart.io/wordcloud";

/// Default PostgreSQL pool size used when `ANALYSIS_DB_POOL_SIZE` is not set.
pub const DEFAULT_DB_POOL_SIZE: usize = 16;

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8082,
            bind_addr: IpAddr::V4(std::net::Ipv4Addr::new(0, 0, 0, 0)),
            content_service_url: DEFAULT_CONTENT_SERVICE_URL.to_string(),
            word_cloud_url: DEFAULT_WORD_CLOUD_URL.to_string(),
            database_url: DbParts::default().conninfo(),
            http_timeout: DEFAULT_HTTP_TIMEOUT,
            db_pool_size: DEFAULT_DB_POOL_SIZE,
        }
    }
}

impl Config {
    const ENV_PORT: &'static str = "ANALYSIS_PORT";
    const ENV_BIND_ADDR: &'static str = "ANALYSIS_BIND_ADDR";
    const ENV_HTTP_TIMEOUT_SECS: &'static str = "ANALYSIS_HTTP_TIMEOUT_SECS";
    const ENV_CONTENT_SERVICE_URL: &'static str = "FILE_STORING_SERVICE_URL";
    const ENV_WORD_CLOUD_URL: &'static str = "WORD_CLOUD_URL";
    const ENV_DATABASE_URL: &'static str = "DATABASE_URL";
    const ENV_DB_POOL_SIZE: &'static str = "ANALYSIS_DB_POOL_SIZE";

    /// Loads configuration from environment variables (falling back to defaults).
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let port = Self::parse_port_from_env(defaults.port)?;
        let bind_addr = Self::parse_bind_addr_from_env(defaults.bind_addr)?;
        let content_service_url = Self::parse_url_from_env(
            Self::ENV_CONTENT_SERVICE_URL,
            defaults.content_service_url,
        );
        let word_cloud_url =
            Self::parse_url_from_env(Self::ENV_WORD_CLOUD_URL, defaults.word_cloud_url);
        let database_url = match Self::parse_optional_string_from_env(Self::ENV_DATABASE_URL) {
            Some(url) => url,
            None => DbParts::from_env().conninfo(),
        };
        let http_timeout = Self::parse_timeout_from_env(defaults.http_timeout)?;
        let db_pool_size = Self::parse_pool_size_from_env(defaults.db_pool_size)?;

        Ok(Self {
            port,
            bind_addr,
            content_service_url,
            word_cloud_url,
            database_url,
            http_timeout,
            db_pool_size,
        })
    }

    /// Validates URLs, the database connection string and basic invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            (Self::ENV_CONTENT_SERVICE_URL, &self.content_service_url),
            (Self::ENV_WORD_CLOUD_URL, &self.word_cloud_url),
        ] {
            reqwest::Url::parse(value).map_err(|e| ConfigError::InvalidUrl {
                name,
                value: value.clone(),
                message: e.to_string(),
            })?;
        }

        if self.http_timeout.is_zero() {
            return Err(ConfigError::InvalidTimeout {
                value: "0".to_string(),
            });
        }

        self.database_url
            .parse::<tokio_postgres::Config>()
            .map_err(|e| ConfigError::InvalidDatabaseUrl {
                message: e.to_string(),
            })?;

        Ok(())
    }

    /// Returns `"{bind_addr}:{port}"` (useful for logging/binding).
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }

    fn parse_port_from_env(default: u16) -> Result<u16, ConfigError> {
        match env::var(Self::ENV_PORT) {
            Ok(value) => {
                let port: u16 = value.parse().map_err(|e| ConfigError::PortParseError {
                    value: value.clone(),
                    source: e,
                })?;

                if port == 0 {
                    return Err(ConfigError::InvalidPort { value });
                }

                Ok(port)
            }
            Err(_) => Ok(default),
        }
    }

    fn parse_bind_addr_from_env(default: IpAddr) -> Result<IpAddr, ConfigError> {
        match env::var(Self::ENV_BIND_ADDR) {
            Ok(value) => value
                .parse()
                .map_err(|e| ConfigError::InvalidBindAddr { value, source: e }),
            Err(_) => Ok(default),
        }
    }

    fn parse_timeout_from_env(default: Duration) -> Result<Duration, ConfigError> {
        match env::var(Self::ENV_HTTP_TIMEOUT_SECS) {
            Ok(value) => match value.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
                _ => Err(ConfigError::InvalidTimeout { value }),
            },
            Err(_) => Ok(default),
        }
    }

    fn parse_pool_size_from_env(default: usize) -> Result<usize, ConfigError> {
        match env::var(Self::ENV_DB_POOL_SIZE) {
            Ok(value) => match value.trim().parse::<usize>() {
                Ok(size) if size > 0 => Ok(size),
                _ => Err(ConfigError::InvalidPoolSize { value }),
            },
            Err(_) => Ok(default),
        }
    }

    fn parse_url_from_env(var_name: &str, default: String) -> String {
        Self::parse_optional_string_from_env(var_name)
            .map(|v| v.trim_end_matches('/').to_string())
            .unwrap_or(default)
    }

    fn parse_optional_string_from_env(var_name: &str) -> Option<String> {
        env::var(var_name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }
}

/// PostgreSQL connection parts, read from the `DB_*` variables the storing
/// service uses as well.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbParts {
    pub host: String,
    pub port: String,
    pub user: String,
    pub password: String,
    pub dbname: String,
    pub sslmode: String,
}

impl Default for DbParts {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: "5432".to_string(),
            user: "postgres".to_string(),
            password: String::new(),
            dbname: "antiplagiat".to_string(),
            sslmode: "disable".to_string(),
        }
    }
}

impl DbParts {
    /// Reads `DB_HOST`, `DB_PORT`, `DB_USER`, `DB_PASSWORD`, `DB_NAME`, `DB_SSLMODE`.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let read = |name: &str, default: String| {
            env::var(name)
                .ok()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(default)
        };

        Self {
            host: read("DB_HOST", defaults.host),
            port: read("DB_PORT", defaults.port),
            user: read("DB_USER", defaults.user),
            password: read("DB_PASSWORD", defaults.password),
            dbname: read("DB_NAME", defaults.dbname),
            sslmode: read("DB_SSLMODE", defaults.sslmode),
        }
    }

    /// Renders a libpq-style `key=value` connection string.
    ///
    /// An empty password is left out.
    pub fn conninfo(&self) -> String {
        let mut pairs = vec![
            ("host", &self.host),
            ("port", &self.port),
            ("user", &self.user),
            ("dbname", &self.dbname),
            ("sslmode", &self.sslmode),
        ];
        if !self.password.is_empty() {
            pairs.push(("password", &self.password));
        }

        pairs
            .into_iter()
            .map(|(key, value)| format!("{}={}", key, quote_conninfo(value)))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn quote_conninfo(value: &str) -> String {
    if value.is_empty() || value.contains(|c: char| c.is_whitespace() || c == '\'' || c == '\\') {
        format!("'{}'", value.replace('\\', "\\\\").replace('\'', "\\'"))
    } else {
        value.to_string()
    }
}
