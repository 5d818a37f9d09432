// ABOUTME: Service request storage with filtered keyset listing and conditional status writes
// ABOUTME: Every status change is a compare-and-swap on the status read during validation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use sqlx::{QueryBuilder, Sqlite, SqliteConnection};

use super::mappers::{format_timestamp, now, row_to_service_request};
use super::Database;
use crate::errors::{AppError, AppResult};
use crate::models::{
    CommunityId, OfferId, RequestId, RequestStatus, ServiceRequest, ServiceRequestDetail, UserId,
};
use crate::pagination::{Cursor, CursorPage, PaginationParams};

const REQUEST_COLUMNS: &str = "id, title, description, category, requester_id, community_id, \
     status, budget, accepted_offer_id, completed_at, created_at, updated_at, deleted_at";

/// Conjunctive filters for request listings
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestFilter {
    /// Only requests in this community
    pub community_id: Option<CommunityId>,
    /// Only requests with this status
    pub status: Option<RequestStatus>,
    /// Only requests with exactly this category tag
    pub category: Option<String>,
    /// Case-insensitive substring of title or description
    pub search: Option<String>,
}

impl RequestFilter {
    fn push_conditions<'a>(&'a self, builder: &mut QueryBuilder<'a, Sqlite>) {
        if let Some(community_id) = self.community_id {
            builder
                .push(" AND community_id = ")
                .push_bind(community_id.to_string());
        }
        if let Some(status) = self.status {
            builder.push(" AND status = ").push_bind(status.as_str());
        }
        if let Some(category) = self.category.as_deref() {
            builder.push(" AND category = ").push_bind(category);
        }
        if let Some(search) = self.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            // SQLite lower() folds ASCII only, so search_text is lowercased in Rust
            let pattern = format!("%{}%", escape_like(&search.to_lowercase()));
            builder
                .push(" AND search_text LIKE ")
                .push_bind(pattern)
                .push(" ESCAPE '\\'");
        }
    }
}

/// Lowercased title and description, matched by search filters
fn search_text(request: &ServiceRequest) -> String {
    format!("{}\n{}", request.title, request.description).to_lowercase()
}

/// Escape `LIKE` wildcards so user input matches literally
fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

impl Database {
    pub(super) async fn migrate_service_requests(&self) -> AppResult<()> {
        self.execute_ddl(&[
            r"
            CREATE TABLE IF NOT EXISTS service_requests (
                id TEXT PRIMARY KEY,
                title TEXT NOT NULL CHECK (length(trim(title)) > 0),
                description TEXT NOT NULL CHECK (length(trim(description)) > 0),
                category TEXT,
                requester_id TEXT NOT NULL,
                community_id TEXT NOT NULL,
                status TEXT NOT NULL DEFAULT 'open'
                    CHECK (status IN ('open', 'in_progress', 'completed', 'cancelled')),
                budget REAL CHECK (budget IS NULL OR budget >= 0),
                accepted_offer_id TEXT,
                completed_at TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                deleted_at TEXT,
                search_text TEXT NOT NULL DEFAULT '',
                CHECK ((accepted_offer_id IS NOT NULL) = (status IN ('in_progress', 'completed')))
            )
            ",
            "CREATE INDEX IF NOT EXISTS idx_service_requests_community_status ON service_requests(community_id, status)",
            "CREATE INDEX IF NOT EXISTS idx_service_requests_created_at ON service_requests(created_at)",
            "CREATE INDEX IF NOT EXISTS idx_service_requests_requester ON service_requests(requester_id)",
        ])
        .await
    }

    /// Insert a new request row
    ///
    /// # Errors
    ///
    /// Returns an error if a constraint fails or the insert fails
    pub async fn create_service_request(&self, request: &ServiceRequest) -> AppResult<()> {
        sqlx::query(
            r"
            INSERT INTO service_requests (
                id, title, description, category, requester_id, community_id,
                status, budget, accepted_offer_id, completed_at, created_at, updated_at,
                search_text
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            ",
        )
        .bind(request.id.to_string())
        .bind(&request.title)
        .bind(&request.description)
        .bind(request.category.as_deref())
        .bind(request.requester_id.to_string())
        .bind(request.community_id.to_string())
        .bind(request.status.as_str())
        .bind(request.budget)
        .bind(request.accepted_offer_id.map(|id| id.to_string()))
        .bind(request.completed_at.map(format_timestamp))
        .bind(format_timestamp(request.created_at))
        .bind(format_timestamp(request.updated_at))
        .bind(search_text(request))
        .execute(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(())
    }

    /// Load a non-deleted request
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or the row is malformed
    pub async fn get_service_request(&self, id: RequestId) -> AppResult<Option<ServiceRequest>> {
        let query = format!(
            "SELECT {REQUEST_COLUMNS} FROM service_requests WHERE id = $1 AND deleted_at IS NULL"
        );
        sqlx::query(&query)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to get service request: {e}")))?
            .as_ref()
            .map(row_to_service_request)
            .transpose()
    }

    /// List non-deleted requests newest first, one keyset page at a time
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for a malformed cursor, or a database error
    pub async fn list_service_requests(
        &self,
        filter: &RequestFilter,
        params: &PaginationParams,
    ) -> AppResult<CursorPage<ServiceRequest>> {
        let position = params
            .cursor
            .as_ref()
            .map(Cursor::decode_or_invalid)
            .transpose()?;

        let mut builder = QueryBuilder::<Sqlite>::new(format!(
            "SELECT {REQUEST_COLUMNS} FROM service_requests WHERE deleted_at IS NULL"
        ));
        filter.push_conditions(&mut builder);
        if let Some((created_at, id)) = position {
            let created_at = format_timestamp(created_at);
            builder
                .push(" AND (created_at < ")
                .push_bind(created_at.clone())
                .push(" OR (created_at = ")
                .push_bind(created_at)
                .push(" AND rowid < (SELECT rowid FROM service_requests WHERE id = ")
                .push_bind(id)
                .push(")))");
        }
        builder
            .push(" ORDER BY created_at DESC, rowid DESC LIMIT ")
            .push_bind(i64::try_from(params.limit + 1).unwrap_or(i64::MAX));

        let requests = builder
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to list service requests: {e}")))?
            .iter()
            .map(row_to_service_request)
            .collect::<AppResult<Vec<_>>>()?;

        Ok(CursorPage::from_overfetch(requests, params.limit, |r| {
            Cursor::new(r.created_at, &r.id.to_string())
        }))
    }

    /// Write every mutable column, provided the status is still `expected_status`
    ///
    /// Returns `false` when the row was deleted or its status changed since it
    /// was read.
    ///
    /// # Errors
    ///
    /// Returns an error if a constraint fails or the update fails
    pub async fn update_service_request(
        &self,
        updated: &ServiceRequest,
        expected_status: RequestStatus,
    ) -> AppResult<bool> {
        let result = sqlx::query(
            r"
            UPDATE service_requests
            SET title = $1, description = $2, category = $3, budget = $4, status = $5,
                accepted_offer_id = $6, completed_at = $7, updated_at = $8, search_text = $9
            WHERE id = $10 AND status = $11 AND deleted_at IS NULL
            ",
        )
        .bind(&updated.title)
        .bind(&updated.description)
        .bind(updated.category.as_deref())
        .bind(updated.budget)
        .bind(updated.status.as_str())
        .bind(updated.accepted_offer_id.map(|id| id.to_string()))
        .bind(updated.completed_at.map(format_timestamp))
        .bind(format_timestamp(updated.updated_at))
        .bind(search_text(updated))
        .bind(updated.id.to_string())
        .bind(expected_status.as_str())
        .execute(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(result.rows_affected() == 1)
    }

    /// Soft-delete a request and all of its offers in one transaction
    ///
    /// Returns the number of offers deleted with it, or `None` if the request
    /// was missing or already deleted.
    ///
    /// # Errors
    ///
    /// Returns an error if any statement or the commit fails
    pub async fn soft_delete_service_request(&self, id: RequestId) -> AppResult<Option<u64>> {
        let mut guard = self.begin("delete_service_request").await?;
        let deleted_at = format_timestamp(now());

        let deleted = sqlx::query(
            "UPDATE service_requests SET deleted_at = $1, updated_at = $2 WHERE id = $3 AND deleted_at IS NULL",
        )
        .bind(&deleted_at)
        .bind(&deleted_at)
        .bind(id.to_string())
        .execute(guard.executor()?)
        .await
        .map_err(|e| AppError::database(format!("Failed to delete service request: {e}")))?
        .rows_affected();

        if deleted == 0 {
            guard.rollback().await?;
            return Ok(None);
        }

        let offers = sqlx::query(
            "UPDATE service_offers SET deleted_at = $1, updated_at = $2 WHERE service_request_id = $3 AND deleted_at IS NULL",
        )
        .bind(&deleted_at)
        .bind(&deleted_at)
        .bind(id.to_string())
        .execute(guard.executor()?)
        .await
        .map_err(|e| AppError::database(format!("Failed to delete service offers: {e}")))?
        .rows_affected();

        guard.commit().await?;
        Ok(Some(offers))
    }

    /// Load requester, community, and offers (with providers) for a page of requests
    ///
    /// Runs one query per relationship regardless of how many requests are
    /// given, and keeps the input order.
    ///
    /// # Errors
    ///
    /// Returns an error if any relationship query fails
    pub async fn load_request_details(
        &self,
        requests: Vec<ServiceRequest>,
    ) -> AppResult<Vec<ServiceRequestDetail>> {
        let user_ids: Vec<UserId> = requests.iter().map(|r| r.requester_id).collect();
        let community_ids: Vec<CommunityId> = requests.iter().map(|r| r.community_id).collect();
        let request_ids: Vec<RequestId> = requests.iter().map(|r| r.id).collect();

        let users = self.get_user_summaries(&dedup(user_ids)).await?;
        let communities = self.get_community_summaries(&dedup(community_ids)).await?;
        let mut offers = self.list_offers_for_requests(&request_ids).await?;

        Ok(requests
            .into_iter()
            .map(|request| ServiceRequestDetail {
                requester: users.get(&request.requester_id).cloned(),
                community: communities.get(&request.community_id).cloned(),
                offers: offers.remove(&request.id).unwrap_or_default(),
                request,
            })
            .collect())
    }
}

fn dedup<T: Ord>(mut ids: Vec<T>) -> Vec<T> {
    ids.sort_unstable();
    ids.dedup();
    ids
}

/// Move an `open` request to `in_progress` pointing at `offer_id`
///
/// The first write of the acceptance transaction. `SQLite` takes the database
/// write lock here, so a concurrent acceptance either waits for this one to
/// finish or already finished; either way its own claim then matches no row.
/// Returns `false` when the request is no longer `open`.
///
/// # Errors
///
/// Returns an error if the update fails
pub async fn claim_open_request(
    conn: &mut SqliteConnection,
    request_id: RequestId,
    offer_id: OfferId,
) -> AppResult<bool> {
    let updated_at = format_timestamp(now());
    let result = sqlx::query(
        r"
        UPDATE service_requests
        SET status = $1, accepted_offer_id = $2, updated_at = $3
        WHERE id = $4 AND status = $5 AND deleted_at IS NULL
        ",
    )
    .bind(RequestStatus::InProgress.as_str())
    .bind(offer_id.to_string())
    .bind(updated_at)
    .bind(request_id.to_string())
    .bind(RequestStatus::Open.as_str())
    .execute(conn)
    .await
    .map_err(|e| AppError::database(format!("Failed to claim service request: {e}")))?;
    Ok(result.rows_affected() == 1)
}

/// Read the current status of a non-deleted request on a given connection
///
/// # Errors
///
/// Returns an error if the query fails or the stored status is unknown
pub async fn fetch_request_status(
    conn: &mut SqliteConnection,
    request_id: RequestId,
) -> AppResult<Option<RequestStatus>> {
    let status: Option<String> = sqlx::query_scalar(
        "SELECT status FROM service_requests WHERE id = $1 AND deleted_at IS NULL",
    )
    .bind(request_id.to_string())
    .fetch_optional(conn)
    .await
    .map_err(|e| AppError::database(format!("Failed to read service request status: {e}")))?;
    status
        .map(|s| s.parse().map_err(|e: AppError| AppError::database(e.message)))
        .transpose()
}
