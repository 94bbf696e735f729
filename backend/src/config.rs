//! Server configuration.
//!
//! Values come from, in order of precedence: command-line flags, environment
//! variables (a `.env` file is loaded by the binary), then defaults.
//!
//! | Variable                      | Default      |
//! |-------------------------------|--------------|
//! | `EXCEL_SPLIT_HOST`            | `0.0.0.0`    |
//! | `EXCEL_SPLIT_PORT`            | `3000`       |
//! | `EXCEL_SPLIT_REQUIRE_AUTH`    | `true`       |
//! | `EXCEL_SPLIT_MAX_UPLOAD_MB`   | `10`         |
//! | `EXCEL_SPLIT_SESSION_HOURS`   | `24`         |
//! | `EXCEL_SPLIT_COLUMN`          | `Student`    |

use chrono::Duration;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::str::FromStr;

use crate::auth::DEFAULT_SESSION_HOURS;
use crate::error::ConfigError;
use crate::transform::pipeline::{ProcessOptions, DEFAULT_TARGET_COLUMN, OUTPUT_SHEET_NAME};

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_MAX_UPLOAD_MB: usize = 10;
/// Longest accepted session lifetime (one year).
pub const MAX_SESSION_HOURS: i64 = 24 * 365;

/// Runtime configuration of the HTTP server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: IpAddr,
    pub port: u16,
    /// Whether `/api/process-excel` needs a session.
    pub require_auth: bool,
    pub max_upload_bytes: usize,
    pub session_lifetime: Duration,
    /// Header of the column to split.
    pub target_column: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
            require_auth: true,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_MB * 1024 * 1024,
            session_lifetime: Duration::hours(DEFAULT_SESSION_HOURS),
            target_column: DEFAULT_TARGET_COLUMN.to_string(),
        }
    }
}

impl ServerConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through `lookup`, which maps a variable name to
    /// its value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(host) = parse_var::<IpAddr, _>(&lookup, "EXCEL_SPLIT_HOST")? {
            config.host = host;
        }
        if let Some(port) = parse_var::<u16, _>(&lookup, "EXCEL_SPLIT_PORT")? {
            config.port = port;
        }
        if let Some(raw) = lookup("EXCEL_SPLIT_REQUIRE_AUTH") {
            config.require_auth = parse_bool(&raw).ok_or_else(|| ConfigError::InvalidValue {
                key: "EXCEL_SPLIT_REQUIRE_AUTH".to_string(),
                value: raw.clone(),
            })?;
        }
        if let Some(mb) = parse_var::<usize, _>(&lookup, "EXCEL_SPLIT_MAX_UPLOAD_MB")? {
            config.max_upload_bytes = upload_limit("EXCEL_SPLIT_MAX_UPLOAD_MB", mb)?;
        }
        if let Some(hours) = parse_var::<i64, _>(&lookup, "EXCEL_SPLIT_SESSION_HOURS")? {
            config.session_lifetime = session_lifetime("EXCEL_SPLIT_SESSION_HOURS", hours)?;
        }
        if let Some(column) = lookup("EXCEL_SPLIT_COLUMN").filter(|c| !c.trim().is_empty()) {
            config.target_column = column;
        }

        Ok(config)
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Pipeline options derived from this configuration.
    pub fn process_options(&self) -> ProcessOptions {
        ProcessOptions {
            target_column: self.target_column.clone(),
            sheet_name: OUTPUT_SHEET_NAME.to_string(),
        }
    }
}

fn parse_var<T, F>(lookup: &F, key: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue {
                key: key.to_string(),
                value: raw,
            }),
    }
}

/// Upload limit in bytes for a size in megabytes; must be at least 1 MB.
pub fn upload_limit(key: &str, mb: usize) -> Result<usize, ConfigError> {
    mb.checked_mul(1024 * 1024)
        .filter(|bytes| *bytes > 0)
        .ok_or_else(|| ConfigError::InvalidValue {
            key: key.to_string(),
            value: mb.to_string(),
        })
}

/// Session lifetime between 1 hour and [`MAX_SESSION_HOURS`].
pub fn session_lifetime(key: &str, hours: i64) -> Result<Duration, ConfigError> {
    (1..=MAX_SESSION_HOURS)
        .contains(&hours)
        .then(|| Duration::try_hours(hours))
        .flatten()
        .ok_or_else(|| ConfigError::InvalidValue {
            key: key.to_string(),
            value: hours.to_string(),
        })
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
