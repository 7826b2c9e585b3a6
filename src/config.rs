// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! This module defines environment variable names and default values used
//! throughout the application. Configuration is loaded from the environment
//! at startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `DATA_DIR` | Root directory for the client database | `./data` |
//! | `HOST` | Server bind address (IP literal or hostname) | `127.0.0.1` |
//! | `PORT` | Server bind port | `8080` |
//! | `PLAID_CLIENT_ID` | Plaid API client id | Required |
//! | `PLAID_SECRET` | Plaid API secret for the selected environment | Required |
//! | `PLAID_ENV` | `sandbox` or `production` | `sandbox` |
//! | `PLAID_BASE_URL` | Overrides the Plaid API host | Derived from `PLAID_ENV` |
//! | `PLAID_REDIRECT_URI` | OAuth redirect URI sent for iOS link tokens | Optional |
//! | `PLAID_ANDROID_PACKAGE_NAME` | Package name sent for Android link tokens | Optional |
//! | `PLAID_CLIENT_NAME` | Name shown inside Plaid Link | `Plaid Tiny QuickStart` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::net::SocketAddr;
use std::path::PathBuf;

/// Environment variable name for the data directory path.
///
/// The client database (`clients.redb`) is created under this directory.
pub const DATA_DIR_ENV: &str = "DATA_DIR";

/// Default data directory, relative to the working directory.
pub const DEFAULT_DATA_DIR: &str = "./data";

pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8080;

/// Selects the log output format. Anything other than `json` is pretty.
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },
}

/// Process-level settings for the HTTP server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub data_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let host = env_or_default(HOST_ENV, DEFAULT_HOST);
        let port = match env_optional(PORT_ENV) {
            Some(raw) => raw.parse::<u16>().map_err(|_| ConfigError::InvalidValue {
                name: PORT_ENV,
                value: raw,
            })?,
            None => DEFAULT_PORT,
        };
        let data_dir = PathBuf::from(env_or_default(DATA_DIR_ENV, DEFAULT_DATA_DIR));

        Ok(Self {
            host,
            port,
            data_dir,
        })
    }

    /// Resolve `host:port`. Hostnames such as `localhost` go through the
    /// system resolver; the first address wins.
    pub async fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        let raw = format!("{}:{}", self.host, self.port);
        if let Ok(addr) = raw.parse::<SocketAddr>() {
            return Ok(addr);
        }

        let invalid = || ConfigError::InvalidValue {
            name: HOST_ENV,
            value: raw.clone(),
        };
        tokio::net::lookup_host((self.host.as_str(), self.port))
            .await
            .map_err(|_| invalid())?
            .next()
            .ok_or_else(invalid)
    }
}

/// Read an environment variable, treating blank values as unset.
pub(crate) fn env_optional(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub(crate) fn env_or_default(name: &str, default: &str) -> String {
    env_optional(name).unwrap_or_else(|| default.to_string())
}
