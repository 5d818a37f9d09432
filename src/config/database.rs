// ABOUTME: Database configuration types for SQLite connections
// ABOUTME: Parses DATABASE_URL and pool settings into a type-safe configuration
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::{env_var_or, parse_env};
use crate::constants::defaults;
use crate::errors::{AppError, AppResult};

/// Type-safe database location
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DatabaseUrl {
    /// `SQLite` database with file path
    SQLite {
        /// Path to `SQLite` database file
        path: PathBuf,
    },
    /// In-memory `SQLite` (for testing)
    Memory,
}

impl DatabaseUrl {
    /// Parse from string with validation
    ///
    /// Accepts `sqlite::memory:`, `sqlite:<path>`, or a bare file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is empty or names an unsupported backend
    pub fn parse_url(s: &str) -> AppResult<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(AppError::config_invalid("DATABASE_URL", "must not be empty"));
        }
        if let Some(path_str) = s.strip_prefix("sqlite:") {
            let path_str = path_str.trim_start_matches("//");
            if path_str == ":memory:" || path_str.is_empty() {
                Ok(Self::Memory)
            } else {
                Ok(Self::SQLite {
                    path: PathBuf::from(path_str),
                })
            }
        } else if s.contains("://") {
            Err(AppError::config_invalid(
                "DATABASE_URL",
                format!("unsupported database scheme in '{s}'"),
            ))
        } else {
            // Fallback: treat as SQLite file path
            Ok(Self::SQLite {
                path: PathBuf::from(s),
            })
        }
    }

    /// Convert to connection string
    #[must_use]
    pub fn to_connection_string(&self) -> String {
        match self {
            Self::SQLite { path } => format!("sqlite:{}", path.display()),
            Self::Memory => "sqlite::memory:".into(),
        }
    }

    /// Check if this is an in-memory database
    #[must_use]
    pub const fn is_memory(&self) -> bool {
        matches!(self, Self::Memory)
    }
}

impl Default for DatabaseUrl {
    fn default() -> Self {
        Self::SQLite {
            path: PathBuf::from("./data/commune.db"),
        }
    }
}

impl Display for DatabaseUrl {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.to_connection_string())
    }
}

/// Database connection and management configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database location
    pub url: DatabaseUrl,
    /// Maximum pooled connections (always 1 for in-memory databases)
    pub max_connections: u32,
    /// How long a connection waits on a locked database, in seconds
    pub busy_timeout_secs: u64,
    /// Create the schema on startup
    pub auto_migrate: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: DatabaseUrl::default(),
            max_connections: defaults::DATABASE_MAX_CONNECTIONS,
            busy_timeout_secs: defaults::DATABASE_BUSY_TIMEOUT_SECS,
            auto_migrate: true,
        }
    }
}

impl DatabaseConfig {
    /// In-memory configuration used by tests and local experiments
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            url: DatabaseUrl::Memory,
            max_connections: 1,
            ..Self::default()
        }
    }

    /// Load database configuration from environment
    ///
    /// # Errors
    ///
    /// Returns an error if database environment variables are invalid
    pub fn from_env() -> AppResult<Self> {
        let url = DatabaseUrl::parse_url(&env_var_or("DATABASE_URL", defaults::DATABASE_URL))?;
        let max_connections = parse_env(
            "DATABASE_MAX_CONNECTIONS",
            defaults::DATABASE_MAX_CONNECTIONS,
        )?;
        if max_connections == 0 {
            return Err(AppError::config_invalid(
                "DATABASE_MAX_CONNECTIONS",
                "must be at least 1",
            ));
        }

        Ok(Self {
            max_connections: if url.is_memory() { 1 } else { max_connections },
            url,
            busy_timeout_secs: parse_env(
                "DATABASE_BUSY_TIMEOUT_SECS",
                defaults::DATABASE_BUSY_TIMEOUT_SECS,
            )?,
            auto_migrate: parse_env("AUTO_MIGRATE", true)?,
        })
    }

    /// Pool size actually used when connecting
    ///
    /// Each connection to `sqlite::memory:` opens a separate empty database,
    /// so in-memory pools are pinned to one connection.
    #[must_use]
    pub const fn effective_max_connections(&self) -> u32 {
        if self.url.is_memory() {
            1
        } else {
            self.max_connections
        }
    }
}
