// ABOUTME: Tests for environment-driven server, database, and logging configuration
// ABOUTME: Serialized because every case mutates process environment variables
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use std::env;
use std::path::PathBuf;

use commune_marketplace::{
    config::{DatabaseConfig, DatabaseUrl, Environment, ServerConfig},
    errors::ErrorCode,
    logging::{LogFormat, LoggingConfig},
};
use serial_test::serial;

const VARS: [&str; 10] = [
    "HTTP_PORT",
    "REQUEST_TIMEOUT_SECS",
    "ENVIRONMENT",
    "CORS_ALLOWED_ORIGINS",
    "DATABASE_URL",
    "DATABASE_MAX_CONNECTIONS",
    "DATABASE_BUSY_TIMEOUT_SECS",
    "AUTO_MIGRATE",
    "LOG_FORMAT",
    "RUST_LOG",
];

fn clear_env() {
    for var in VARS {
        env::remove_var(var);
    }
}

#[test]
#[serial]
fn test_defaults_without_environment() {
    clear_env();
    let config = ServerConfig::from_env().unwrap();

    assert_eq!(config.http_port, 8081);
    assert_eq!(config.request_timeout_secs, 30);
    assert_eq!(config.environment, Environment::Development);
    assert_eq!(config.cors_allowed_origins, "*");
    assert_eq!(
        config.database.url,
        DatabaseUrl::SQLite {
            path: PathBuf::from("./data/commune.db")
        }
    );
    assert_eq!(config.database.max_connections, 5);
    assert!(config.database.auto_migrate);
}

#[test]
#[serial]
fn test_environment_overrides() {
    clear_env();
    env::set_var("HTTP_PORT", "9090");
    env::set_var("REQUEST_TIMEOUT_SECS", "5");
    env::set_var("ENVIRONMENT", "production");
    env::set_var("CORS_ALLOWED_ORIGINS", "https://a.example, https://b.example");
    env::set_var("DATABASE_URL", "sqlite:/tmp/commune-config-test.db");
    env::set_var("DATABASE_MAX_CONNECTIONS", "8");
    env::set_var("AUTO_MIGRATE", "false");

    let config = ServerConfig::from_env().unwrap();
    clear_env();

    assert_eq!(config.http_port, 9090);
    assert_eq!(config.request_timeout().as_secs(), 5);
    assert!(config.environment.is_production());
    assert_eq!(
        config.cors_allowed_origins,
        "https://a.example, https://b.example"
    );
    assert_eq!(config.database.max_connections, 8);
    assert!(!config.database.auto_migrate);
    assert!(!config.database.url.is_memory());
}

#[test]
#[serial]
fn test_invalid_port_is_config_error() {
    clear_env();
    env::set_var("HTTP_PORT", "not-a-port");
    let err = ServerConfig::from_env().unwrap_err();
    clear_env();

    assert_eq!(err.code, ErrorCode::ConfigInvalid);
    assert!(err.message.contains("HTTP_PORT"));
}

#[test]
#[serial]
fn test_zero_connections_rejected() {
    clear_env();
    env::set_var("DATABASE_MAX_CONNECTIONS", "0");
    let err = DatabaseConfig::from_env().unwrap_err();
    clear_env();

    assert_eq!(err.code, ErrorCode::ConfigInvalid);
}

#[test]
#[serial]
fn test_memory_database_forces_single_connection() {
    clear_env();
    env::set_var("DATABASE_URL", "sqlite::memory:");
    env::set_var("DATABASE_MAX_CONNECTIONS", "10");
    let config = DatabaseConfig::from_env().unwrap();
    clear_env();

    assert!(config.url.is_memory());
    assert_eq!(config.max_connections, 1);
    assert_eq!(config.effective_max_connections(), 1);
}

#[test]
#[serial]
fn test_unsupported_database_scheme() {
    clear_env();
    env::set_var("DATABASE_URL", "postgres://localhost/commune");
    let result = DatabaseConfig::from_env();
    clear_env();

    assert!(result.is_err());
}

#[test]
#[serial]
fn test_logging_config_from_environment() {
    clear_env();
    env::set_var("LOG_FORMAT", "json");
    env::set_var("RUST_LOG", "debug");
    env::set_var("ENVIRONMENT", "production");
    let logging = LoggingConfig::from_env();
    clear_env();

    assert_eq!(logging.format, LogFormat::Json);
    assert_eq!(logging.level, "debug");
    assert!(logging.include_location);
    assert!(logging.include_spans);
}
