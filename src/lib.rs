// ABOUTME: Main library entry point for the Commune service marketplace
// ABOUTME: Service requests, competing offers, and transactional offer acceptance
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Commune Marketplace
//!
//! Community members post service requests; providers answer with offers; the
//! requester accepts exactly one offer, which starts the work and rejects the
//! remaining pending offers in the same transaction.
//!
//! ## Architecture
//!
//! - **Models**: requests, offers, identifiers, and the acting user (`commune-core`)
//! - **Database**: `SQLite` entity store with conditional status writes
//! - **Services**: lifecycle operations, the status guard, and the acceptance coordinator
//! - **Routes**: axum REST API with tower-http tracing, request ids, and timeouts
//! - **Config**: environment-driven server, database, and logging settings
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use commune_marketplace::config::ServerConfig;
//! use commune_marketplace::errors::AppResult;
//!
//! fn main() -> AppResult<()> {
//!     let config = ServerConfig::from_env()?;
//!     println!("Commune marketplace configured with port: HTTP={}", config.http_port);
//!     Ok(())
//! }
//! ```

/// Environment-driven configuration
pub mod config;
/// Application constants
pub mod constants;
/// `SQLite` entity store
pub mod database;
/// Unified error types
pub mod errors;
/// Structured logging setup
pub mod logging;
/// HTTP middleware
pub mod middleware;
/// Domain models
pub mod models;
/// Cursor pagination
pub mod pagination;
/// Shared handler resources
pub mod resources;
/// HTTP routes
pub mod routes;
/// Business operations
pub mod services;
