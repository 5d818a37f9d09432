// ABOUTME: RAII transaction guard for multi-row marketplace mutations
// ABOUTME: Rolls back automatically when dropped uncommitted, including on future cancellation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Transaction management with an RAII guard
//!
//! Every multi-row mutation (offer acceptance, cascading soft delete) runs
//! inside a `TransactionGuard`. If the owning future is dropped before
//! `commit()`, for example because the HTTP timeout fired or the client went
//! away, the wrapped `sqlx` transaction is dropped with it and `SQLite` rolls
//! the writes back.
//!
//! While a guard is alive, all queries for that operation must go through
//! [`TransactionGuard::executor`]. In-memory pools hold exactly one
//! connection, so reaching for the pool instead would wait forever.
//!
//! ```text
//! let mut guard = TransactionGuard::begin(db.pool(), "delete_request").await?;
//! sqlx::query("UPDATE service_requests ...").execute(guard.executor()?).await?;
//! sqlx::query("UPDATE service_offers ...").execute(guard.executor()?).await?;
//! guard.commit().await?;
//! ```

use sqlx::{Sqlite, SqliteConnection, SqlitePool, Transaction};
use tracing::{debug, warn};

use crate::errors::{AppError, AppResult};

/// RAII guard for a `SQLite` transaction
pub struct TransactionGuard<'c> {
    transaction: Option<Transaction<'c, Sqlite>>,
    operation: &'static str,
}

impl TransactionGuard<'static> {
    /// Begin a transaction on the pool
    ///
    /// `operation` names the guarded operation in log output.
    ///
    /// # Errors
    ///
    /// Returns an error if no connection can be acquired or `BEGIN` fails
    pub async fn begin(pool: &SqlitePool, operation: &'static str) -> AppResult<Self> {
        let transaction = pool.begin().await.map_err(|e| {
            AppError::database(format!("Failed to begin {operation} transaction: {e}"))
        })?;
        Ok(Self::new(transaction, operation))
    }
}

impl<'c> TransactionGuard<'c> {
    /// Wrap an already started transaction
    #[must_use]
    pub fn new(transaction: Transaction<'c, Sqlite>, operation: &'static str) -> Self {
        debug!(operation, "Transaction started");
        Self {
            transaction: Some(transaction),
            operation,
        }
    }

    /// Commit the transaction and consume the guard
    ///
    /// # Errors
    ///
    /// Returns an error if the guard was already consumed or `COMMIT` fails
    pub async fn commit(mut self) -> AppResult<()> {
        let transaction = self.transaction.take().ok_or_else(|| {
            AppError::internal("Transaction already consumed - cannot commit")
        })?;
        transaction.commit().await.map_err(|e| {
            AppError::database(format!("{} transaction commit failed: {e}", self.operation))
        })?;
        debug!(operation = self.operation, "Transaction committed");
        Ok(())
    }

    /// Roll back explicitly and consume the guard
    ///
    /// Used when a lost race is detected mid-transaction, so the rollback is
    /// confirmed before the caller reports the conflict.
    ///
    /// # Errors
    ///
    /// Returns an error if the guard was already consumed or `ROLLBACK` fails
    pub async fn rollback(mut self) -> AppResult<()> {
        let transaction = self.transaction.take().ok_or_else(|| {
            AppError::internal("Transaction already consumed - cannot rollback")
        })?;
        transaction.rollback().await.map_err(|e| {
            AppError::database(format!("{} transaction rollback failed: {e}", self.operation))
        })?;
        debug!(operation = self.operation, "Transaction rolled back");
        Ok(())
    }

    /// Connection to run the guarded queries on
    ///
    /// # Errors
    ///
    /// Returns an error if the guard was already committed or rolled back
    pub fn executor(&mut self) -> AppResult<&mut SqliteConnection> {
        self.transaction.as_deref_mut().ok_or_else(|| {
            AppError::internal("Transaction already consumed - guard used after commit/rollback")
        })
    }
}

impl Drop for TransactionGuard<'_> {
    fn drop(&mut self) {
        if self.transaction.is_some() {
            warn!(
                operation = self.operation,
                "Transaction dropped without commit - rolling back"
            );
        }
    }
}
