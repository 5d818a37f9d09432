// ABOUTME: Service offer storage with provider joins and conditional status writes
// ABOUTME: Offer inserts and status changes only match rows still in the expected state
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::collections::HashMap;

use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection};

use super::mappers::{format_timestamp, joined_provider, now, row_to_service_offer};
use super::Database;
use crate::errors::{AppError, AppResult};
use crate::models::{
    OfferId, OfferStatus, OfferWithProvider, RequestId, RequestStatus, ServiceOffer, UserId,
};

const OFFER_WITH_PROVIDER_SELECT: &str = "SELECT o.id, o.service_request_id, o.provider_id, \
     o.description, o.proposed_price, o.estimated_duration, o.status, o.created_at, \
     o.updated_at, o.deleted_at, u.display_name AS provider_display_name \
     FROM service_offers o LEFT JOIN users u ON u.id = o.provider_id \
     WHERE o.deleted_at IS NULL";

/// Conjunctive filters for offer listings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OfferFilter {
    /// Only offers on this request
    pub service_request_id: Option<RequestId>,
    /// Only offers from this provider
    pub provider_id: Option<UserId>,
}

fn row_to_offer_with_provider(row: &SqliteRow) -> AppResult<OfferWithProvider> {
    Ok(OfferWithProvider {
        offer: row_to_service_offer(row)?,
        provider: joined_provider(row)?,
    })
}

impl Database {
    pub(super) async fn migrate_service_offers(&self) -> AppResult<()> {
        self.execute_ddl(&[
            r"
            CREATE TABLE IF NOT EXISTS service_offers (
                id TEXT PRIMARY KEY,
                service_request_id TEXT NOT NULL REFERENCES service_requests(id),
                provider_id TEXT NOT NULL,
                description TEXT NOT NULL CHECK (length(trim(description)) > 0),
                proposed_price REAL CHECK (proposed_price IS NULL OR proposed_price >= 0),
                estimated_duration TEXT,
                status TEXT NOT NULL DEFAULT 'pending'
                    CHECK (status IN ('pending', 'accepted', 'rejected', 'withdrawn')),
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                deleted_at TEXT
            )
            ",
            "CREATE INDEX IF NOT EXISTS idx_service_offers_request ON service_offers(service_request_id, status)",
            "CREATE INDEX IF NOT EXISTS idx_service_offers_provider ON service_offers(provider_id)",
            // At most one accepted offer per request
            "CREATE UNIQUE INDEX IF NOT EXISTS idx_service_offers_one_accepted ON service_offers(service_request_id) WHERE status = 'accepted'",
        ])
        .await
    }

    /// Insert a `pending` offer, but only while its request is still `open`
    ///
    /// Returns `false` if the request was deleted or left `open` after the
    /// caller checked it.
    ///
    /// # Errors
    ///
    /// Returns an error if a constraint fails or the insert fails
    pub async fn create_offer_if_request_open(&self, offer: &ServiceOffer) -> AppResult<bool> {
        let result = sqlx::query(
            r"
            INSERT INTO service_offers (
                id, service_request_id, provider_id, description, proposed_price,
                estimated_duration, status, created_at, updated_at
            )
            SELECT $1, $2, $3, $4, $5, $6, $7, $8, $9
            WHERE EXISTS (
                SELECT 1 FROM service_requests
                WHERE id = $10 AND status = $11 AND deleted_at IS NULL
            )
            ",
        )
        .bind(offer.id.to_string())
        .bind(offer.service_request_id.to_string())
        .bind(offer.provider_id.to_string())
        .bind(&offer.description)
        .bind(offer.proposed_price)
        .bind(offer.estimated_duration.as_deref())
        .bind(offer.status.as_str())
        .bind(format_timestamp(offer.created_at))
        .bind(format_timestamp(offer.updated_at))
        .bind(offer.service_request_id.to_string())
        .bind(RequestStatus::Open.as_str())
        .execute(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(result.rows_affected() == 1)
    }

    /// Load a non-deleted offer with its provider
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or the row is malformed
    pub async fn get_service_offer(&self, id: OfferId) -> AppResult<Option<OfferWithProvider>> {
        let query = format!("{OFFER_WITH_PROVIDER_SELECT} AND o.id = $1");
        sqlx::query(&query)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to get service offer: {e}")))?
            .as_ref()
            .map(row_to_offer_with_provider)
            .transpose()
    }

    /// List non-deleted offers in insertion order
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a row is malformed
    pub async fn list_service_offers(
        &self,
        filter: &OfferFilter,
    ) -> AppResult<Vec<OfferWithProvider>> {
        let mut builder = QueryBuilder::<Sqlite>::new(OFFER_WITH_PROVIDER_SELECT);
        if let Some(request_id) = filter.service_request_id {
            builder
                .push(" AND o.service_request_id = ")
                .push_bind(request_id.to_string());
        }
        if let Some(provider_id) = filter.provider_id {
            builder
                .push(" AND o.provider_id = ")
                .push_bind(provider_id.to_string());
        }
        builder.push(" ORDER BY o.created_at ASC, o.rowid ASC");

        builder
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to list service offers: {e}")))?
            .iter()
            .map(row_to_offer_with_provider)
            .collect()
    }

    /// Load the non-deleted offers of several requests in one query
    ///
    /// Each request's offers keep insertion order. Requests without offers
    /// have no entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a row is malformed
    pub async fn list_offers_for_requests(
        &self,
        request_ids: &[RequestId],
    ) -> AppResult<HashMap<RequestId, Vec<OfferWithProvider>>> {
        let mut grouped: HashMap<RequestId, Vec<OfferWithProvider>> = HashMap::new();
        if request_ids.is_empty() {
            return Ok(grouped);
        }
        let mut builder = QueryBuilder::<Sqlite>::new(OFFER_WITH_PROVIDER_SELECT);
        builder.push(" AND o.service_request_id IN (");
        let mut separated = builder.separated(", ");
        for id in request_ids {
            separated.push_bind(id.to_string());
        }
        separated.push_unseparated(")");
        builder.push(" ORDER BY o.created_at ASC, o.rowid ASC");

        let rows = builder
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to list service offers: {e}")))?;
        for row in &rows {
            let offer = row_to_offer_with_provider(row)?;
            grouped
                .entry(offer.offer.service_request_id)
                .or_default()
                .push(offer);
        }
        Ok(grouped)
    }

    /// Rewrite the editable columns of a still-`pending` offer
    ///
    /// # Errors
    ///
    /// Returns an error if a constraint fails or the update fails
    pub async fn update_pending_offer(&self, offer: &ServiceOffer) -> AppResult<bool> {
        let result = sqlx::query(
            r"
            UPDATE service_offers
            SET description = $1, proposed_price = $2, estimated_duration = $3, updated_at = $4
            WHERE id = $5 AND status = $6 AND deleted_at IS NULL
            ",
        )
        .bind(&offer.description)
        .bind(offer.proposed_price)
        .bind(offer.estimated_duration.as_deref())
        .bind(format_timestamp(offer.updated_at))
        .bind(offer.id.to_string())
        .bind(OfferStatus::Pending.as_str())
        .execute(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(result.rows_affected() == 1)
    }

    /// Move a `pending` offer to `withdrawn`
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails
    pub async fn withdraw_pending_offer(&self, id: OfferId) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE service_offers SET status = $1, updated_at = $2 WHERE id = $3 AND status = $4 AND deleted_at IS NULL",
        )
        .bind(OfferStatus::Withdrawn.as_str())
        .bind(format_timestamp(now()))
        .bind(id.to_string())
        .bind(OfferStatus::Pending.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to withdraw service offer: {e}")))?;
        Ok(result.rows_affected() == 1)
    }

    /// Soft-delete an offer unless it is the accepted one
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails
    pub async fn soft_delete_unaccepted_offer(&self, id: OfferId) -> AppResult<bool> {
        let deleted_at = format_timestamp(now());
        let result = sqlx::query(
            "UPDATE service_offers SET deleted_at = $1, updated_at = $2 WHERE id = $3 AND status != $4 AND deleted_at IS NULL",
        )
        .bind(&deleted_at)
        .bind(&deleted_at)
        .bind(id.to_string())
        .bind(OfferStatus::Accepted.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to delete service offer: {e}")))?;
        Ok(result.rows_affected() == 1)
    }
}

/// Move the target offer from `pending` to `accepted` inside the acceptance transaction
///
/// Matches only when the offer belongs to `request_id`, is not deleted, and is
/// still `pending`.
///
/// # Errors
///
/// Returns an error if the update fails, including the one-accepted-offer index
pub async fn accept_pending_offer(
    conn: &mut SqliteConnection,
    offer_id: OfferId,
    request_id: RequestId,
) -> AppResult<bool> {
    let result = sqlx::query(
        r"
        UPDATE service_offers SET status = $1, updated_at = $2
        WHERE id = $3 AND service_request_id = $4 AND status = $5 AND deleted_at IS NULL
        ",
    )
    .bind(OfferStatus::Accepted.as_str())
    .bind(format_timestamp(now()))
    .bind(offer_id.to_string())
    .bind(request_id.to_string())
    .bind(OfferStatus::Pending.as_str())
    .execute(conn)
    .await
    .map_err(AppError::from)?;
    Ok(result.rows_affected() == 1)
}

/// Reject every other `pending` offer on the request
///
/// Withdrawn, rejected, and deleted offers are left untouched. Returns the
/// number of offers rejected.
///
/// # Errors
///
/// Returns an error if the update fails
pub async fn reject_pending_siblings(
    conn: &mut SqliteConnection,
    request_id: RequestId,
    accepted_offer_id: OfferId,
) -> AppResult<u64> {
    let result = sqlx::query(
        r"
        UPDATE service_offers SET status = $1, updated_at = $2
        WHERE service_request_id = $3 AND id != $4 AND status = $5 AND deleted_at IS NULL
        ",
    )
    .bind(OfferStatus::Rejected.as_str())
    .bind(format_timestamp(now()))
    .bind(request_id.to_string())
    .bind(accepted_offer_id.to_string())
    .bind(OfferStatus::Pending.as_str())
    .execute(conn)
    .await
    .map_err(|e| AppError::database(format!("Failed to reject sibling offers: {e}")))?;
    Ok(result.rows_affected())
}
