// ABOUTME: Minimal community storage used for relationship loading
// ABOUTME: Creates communities for seeding and loads their summaries for request views
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::collections::HashMap;

use sqlx::{QueryBuilder, Sqlite};

use super::mappers::{format_timestamp, now, row_to_community_summary};
use super::Database;
use crate::errors::{AppError, AppResult};
use crate::models::{CommunityId, CommunitySummary};

impl Database {
    pub(super) async fn migrate_communities(&self) -> AppResult<()> {
        self.execute_ddl(&[r"
            CREATE TABLE IF NOT EXISTS communities (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                slug TEXT NOT NULL UNIQUE,
                created_at TEXT NOT NULL
            )
        "])
        .await
    }

    /// Insert a community row
    ///
    /// # Errors
    ///
    /// Returns `ResourceAlreadyExists` if the slug is taken, or a database error
    pub async fn create_community(&self, name: &str, slug: &str) -> AppResult<CommunitySummary> {
        let community = CommunitySummary {
            id: CommunityId::new(),
            name: name.to_owned(),
            slug: slug.to_owned(),
        };
        sqlx::query("INSERT INTO communities (id, name, slug, created_at) VALUES ($1, $2, $3, $4)")
            .bind(community.id.to_string())
            .bind(&community.name)
            .bind(&community.slug)
            .bind(format_timestamp(now()))
            .execute(&self.pool)
            .await
            .map_err(AppError::from)?;
        Ok(community)
    }

    /// Load summaries for a set of communities, keyed by id
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn get_community_summaries(
        &self,
        ids: &[CommunityId],
    ) -> AppResult<HashMap<CommunityId, CommunitySummary>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let mut builder =
            QueryBuilder::<Sqlite>::new("SELECT id, name, slug FROM communities WHERE id IN (");
        let mut separated = builder.separated(", ");
        for id in ids {
            separated.push_bind(id.to_string());
        }
        separated.push_unseparated(")");

        builder
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to get communities: {e}")))?
            .iter()
            .map(|row| row_to_community_summary(row).map(|community| (community.id, community)))
            .collect()
    }
}
