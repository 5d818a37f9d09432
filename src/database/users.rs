// ABOUTME: Minimal user storage used for relationship loading
// ABOUTME: Creates users for seeding and loads display summaries for requesters and providers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::collections::HashMap;

use sqlx::{QueryBuilder, Sqlite};

use super::mappers::{format_timestamp, now, row_to_user_summary};
use super::Database;
use crate::errors::{AppError, AppResult};
use crate::models::{ActorRole, UserId, UserSummary};

impl Database {
    pub(super) async fn migrate_users(&self) -> AppResult<()> {
        self.execute_ddl(&[r"
            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                display_name TEXT NOT NULL,
                email TEXT UNIQUE,
                role TEXT NOT NULL DEFAULT 'user',
                created_at TEXT NOT NULL
            )
        "])
        .await
    }

    /// Insert a user row
    ///
    /// # Errors
    ///
    /// Returns `ResourceAlreadyExists` if the email is taken, or a database error
    pub async fn create_user(
        &self,
        display_name: &str,
        email: Option<&str>,
        role: ActorRole,
    ) -> AppResult<UserSummary> {
        let user = UserSummary {
            id: UserId::new(),
            display_name: display_name.to_owned(),
        };
        sqlx::query(
            "INSERT INTO users (id, display_name, email, role, created_at) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(user.id.to_string())
        .bind(&user.display_name)
        .bind(email)
        .bind(role.as_str())
        .bind(format_timestamp(now()))
        .execute(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(user)
    }

    /// Load public summaries for a set of users, keyed by id
    ///
    /// Ids with no user row are absent from the map.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn get_user_summaries(
        &self,
        ids: &[UserId],
    ) -> AppResult<HashMap<UserId, UserSummary>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let mut builder =
            QueryBuilder::<Sqlite>::new("SELECT id, display_name FROM users WHERE id IN (");
        let mut separated = builder.separated(", ");
        for id in ids {
            separated.push_bind(id.to_string());
        }
        separated.push_unseparated(")");

        builder
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to get users: {e}")))?
            .iter()
            .map(|row| row_to_user_summary(row).map(|user| (user.id, user)))
            .collect()
    }
}
