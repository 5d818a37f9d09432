// ABOUTME: SQLite entity store for service requests, offers, and their collaborators
// ABOUTME: Owns the connection pool, schema migration, and the per-entity query modules
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Entity Store
//!
//! Durable storage for the marketplace. Single-row mutations are atomic
//! statements; multi-row mutations run inside a [`TransactionGuard`].
//! Soft-deleted rows are excluded from every read path.

mod communities;
/// Row decoding helpers
pub mod mappers;
mod service_offers;
mod service_requests;
/// RAII transaction guard
pub mod transactions;
mod users;

use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use tracing::info;

pub use service_offers::{
    accept_pending_offer, reject_pending_siblings, OfferFilter,
};
pub use service_requests::{claim_open_request, fetch_request_status, RequestFilter};
pub use transactions::TransactionGuard;

use crate::config::DatabaseConfig;
use crate::errors::{AppError, AppResult};

/// Database manager for marketplace storage
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Connect using the given configuration, migrating when configured to
    ///
    /// # Errors
    ///
    /// Returns an error if the connection options are invalid, the pool cannot
    /// connect, or the migration fails
    pub async fn connect(config: &DatabaseConfig) -> AppResult<Self> {
        let options = SqliteConnectOptions::from_str(&config.url.to_connection_string())
            .map_err(|e| AppError::config(format!("Invalid database URL {}: {e}", config.url)))?
            .create_if_missing(true)
            .foreign_keys(true)
            .busy_timeout(Duration::from_secs(config.busy_timeout_secs));
        let options = if config.url.is_memory() {
            options
        } else {
            options.journal_mode(SqliteJournalMode::Wal)
        };

        let mut pool_options =
            SqlitePoolOptions::new().max_connections(config.effective_max_connections());
        if config.url.is_memory() {
            // The database lives only as long as its single connection
            pool_options = pool_options.idle_timeout(None).max_lifetime(None);
        }

        let pool = pool_options
            .connect_with(options)
            .await
            .map_err(|e| AppError::database(format!("Failed to connect to {}: {e}", config.url)))?;

        let db = Self { pool };
        if config.auto_migrate {
            db.migrate().await?;
        }
        info!(database = %config.url, "Database ready");
        Ok(db)
    }

    /// Connect to a fresh migrated in-memory database
    ///
    /// # Errors
    ///
    /// Returns an error if the connection or migration fails
    pub async fn in_memory() -> AppResult<Self> {
        Self::connect(&DatabaseConfig::in_memory()).await
    }

    /// Get a reference to the database pool for advanced operations
    #[must_use]
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Begin a guarded transaction
    ///
    /// # Errors
    ///
    /// Returns an error if `BEGIN` fails
    pub async fn begin(&self, operation: &'static str) -> AppResult<TransactionGuard<'static>> {
        TransactionGuard::begin(&self.pool, operation).await
    }

    /// Verify the database answers queries
    ///
    /// # Errors
    ///
    /// Returns an error if the probe query fails
    pub async fn health_check(&self) -> AppResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Database health check failed: {e}")))?;
        Ok(())
    }

    /// Create the schema if it does not exist
    ///
    /// # Errors
    ///
    /// Returns an error if any DDL statement fails
    pub async fn migrate(&self) -> AppResult<()> {
        self.migrate_users().await?;
        self.migrate_communities().await?;
        self.migrate_service_requests().await?;
        self.migrate_service_offers().await?;
        Ok(())
    }

    async fn execute_ddl(&self, statements: &[&str]) -> AppResult<()> {
        for statement in statements {
            sqlx::query(*statement)
                .execute(&self.pool)
                .await
                .map_err(|e| AppError::database(format!("Migration failed: {e}")))?;
        }
        Ok(())
    }
}
