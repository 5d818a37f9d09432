// ABOUTME: Configuration management module for centralized server settings
// ABOUTME: Environment-only configuration for the HTTP server, database, and logging
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Configuration module for the Commune marketplace server
//!
//! All settings come from environment variables; there are no config files.
//!
//! - **Environment**: `ServerConfig` and the deployment `Environment`
//! - **Database**: `DatabaseConfig` and the type-safe `DatabaseUrl`

use std::env;
use std::fmt::Display;
use std::str::FromStr;

use crate::errors::{AppError, AppResult};

/// Database connection configuration
pub mod database;
/// Environment and server configuration
pub mod environment;

pub use database::{DatabaseConfig, DatabaseUrl};
pub use environment::{Environment, ServerConfig};

/// Read an environment variable with a fallback
pub(crate) fn env_var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_owned())
}

/// Parse an environment variable, using `default` when it is unset
///
/// # Errors
///
/// Returns `ConfigInvalid` naming the variable when the value does not parse
pub(crate) fn parse_env<T>(key: &str, default: T) -> AppResult<T>
where
    T: FromStr,
    T::Err: Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| AppError::config_invalid(key, format!("'{raw}': {e}"))),
        Err(_) => Ok(default),
    }
}
