// ABOUTME: Server configuration assembled from environment variables
// ABOUTME: HTTP port, request timeout, deployment environment, database, and logging settings
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::{env_var_or, parse_env, DatabaseConfig};
use crate::constants::{defaults, ports};
use crate::errors::AppResult;
use crate::logging::LoggingConfig;

/// Deployment environment
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Local development
    #[default]
    Development,
    /// Production deployment
    Production,
    /// Automated tests
    Testing,
}

impl Environment {
    /// Parse from string with fallback
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "testing" | "test" => Self::Testing,
            _ => Self::Development,
        }
    }

    /// Check if this is a production environment
    #[must_use]
    pub const fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

impl Display for Environment {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
            Self::Testing => write!(f, "testing"),
        }
    }
}

/// Complete server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// HTTP API port
    pub http_port: u16,
    /// Per-request timeout applied by the HTTP layer, in seconds
    pub request_timeout_secs: u64,
    /// Deployment environment
    pub environment: Environment,
    /// Comma-separated CORS origins, or `*` for any
    pub cors_allowed_origins: String,
    /// Database configuration
    pub database: DatabaseConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_port: ports::DEFAULT_HTTP_PORT,
            request_timeout_secs: defaults::REQUEST_TIMEOUT_SECS,
            environment: Environment::Development,
            cors_allowed_origins: "*".to_owned(),
            database: DatabaseConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns `ConfigInvalid` naming the first variable that fails to parse
    pub fn from_env() -> AppResult<Self> {
        Ok(Self {
            http_port: parse_env("HTTP_PORT", ports::DEFAULT_HTTP_PORT)?,
            request_timeout_secs: parse_env(
                "REQUEST_TIMEOUT_SECS",
                defaults::REQUEST_TIMEOUT_SECS,
            )?,
            environment: Environment::from_str_or_default(&env_var_or(
                "ENVIRONMENT",
                "development",
            )),
            cors_allowed_origins: env_var_or("CORS_ALLOWED_ORIGINS", "*"),
            database: DatabaseConfig::from_env()?,
            logging: LoggingConfig::from_env(),
        })
    }

    /// Request timeout as a `Duration`
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// One-line configuration summary for the startup log
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "Commune marketplace: environment={}, http_port={}, database={}, max_connections={}, \
             busy_timeout={}s, auto_migrate={}, request_timeout={}s",
            self.environment,
            self.http_port,
            self.database.url,
            self.database.effective_max_connections(),
            self.database.busy_timeout_secs,
            self.database.auto_migrate,
            self.request_timeout_secs,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_parsing() {
        assert_eq!(Environment::from_str_or_default("PROD"), Environment::Production);
        assert_eq!(Environment::from_str_or_default("test"), Environment::Testing);
        assert_eq!(Environment::from_str_or_default("staging"), Environment::Development);
    }

    #[test]
    fn test_summary_mentions_port_and_database() {
        let config = ServerConfig {
            database: DatabaseConfig::in_memory(),
            ..ServerConfig::default()
        };
        let summary = config.summary();
        assert!(summary.contains("http_port=8081"));
        assert!(summary.contains("sqlite::memory:"));
        assert!(summary.contains("max_connections=1"));
    }
}
