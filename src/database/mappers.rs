// ABOUTME: Row to model conversion helpers for the SQLite entity store
// ABOUTME: Column decoding for UUID ids, RFC 3339 timestamps, and status enums
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Column decoding shared by the store modules
//!
//! Timestamps are stored as RFC 3339 text with microsecond precision and a
//! `Z` suffix, so lexical order on the column equals chronological order.

use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;

use crate::errors::{AppError, AppResult};
use crate::models::{
    CommunityId, CommunitySummary, OfferId, RequestId, ServiceOffer, ServiceRequest, UserId,
    UserSummary,
};

/// Render a timestamp in the stored text format
#[must_use]
pub fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Current time truncated to the stored precision
#[must_use]
pub fn now() -> DateTime<Utc> {
    let now = Utc::now();
    DateTime::from_timestamp_micros(now.timestamp_micros()).unwrap_or(now)
}

fn column<T>(row: &SqliteRow, name: &str) -> AppResult<T>
where
    T: for<'r> sqlx::Decode<'r, sqlx::Sqlite> + sqlx::Type<sqlx::Sqlite>,
{
    row.try_get(name)
        .map_err(|e| AppError::database(format!("Failed to get column '{name}': {e}")))
}

fn parse_uuid(value: &str) -> AppResult<Uuid> {
    Uuid::parse_str(value).map_err(|e| AppError::database(format!("Invalid UUID: {e}")))
}

fn parse_timestamp(value: &str) -> AppResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| AppError::database(format!("Invalid date: {e}")))
}

fn parse_status<S>(value: &str) -> AppResult<S>
where
    S: FromStr<Err = AppError>,
{
    value
        .parse()
        .map_err(|e: AppError| AppError::database(e.message))
}

fn uuid_column(row: &SqliteRow, name: &str) -> AppResult<Uuid> {
    parse_uuid(&column::<String>(row, name)?)
}

fn optional_uuid_column(row: &SqliteRow, name: &str) -> AppResult<Option<Uuid>> {
    column::<Option<String>>(row, name)?
        .as_deref()
        .map(parse_uuid)
        .transpose()
}

fn timestamp_column(row: &SqliteRow, name: &str) -> AppResult<DateTime<Utc>> {
    parse_timestamp(&column::<String>(row, name)?)
}

fn optional_timestamp_column(row: &SqliteRow, name: &str) -> AppResult<Option<DateTime<Utc>>> {
    column::<Option<String>>(row, name)?
        .as_deref()
        .map(parse_timestamp)
        .transpose()
}

/// Decode a `service_requests` row
///
/// # Errors
///
/// Returns a database error if a column is missing or malformed
pub fn row_to_service_request(row: &SqliteRow) -> AppResult<ServiceRequest> {
    Ok(ServiceRequest {
        id: RequestId(uuid_column(row, "id")?),
        title: column(row, "title")?,
        description: column(row, "description")?,
        category: column(row, "category")?,
        requester_id: UserId(uuid_column(row, "requester_id")?),
        community_id: CommunityId(uuid_column(row, "community_id")?),
        status: parse_status(&column::<String>(row, "status")?)?,
        budget: column(row, "budget")?,
        accepted_offer_id: optional_uuid_column(row, "accepted_offer_id")?.map(OfferId),
        completed_at: optional_timestamp_column(row, "completed_at")?,
        created_at: timestamp_column(row, "created_at")?,
        updated_at: timestamp_column(row, "updated_at")?,
        deleted_at: optional_timestamp_column(row, "deleted_at")?,
    })
}

/// Decode a `service_offers` row
///
/// # Errors
///
/// Returns a database error if a column is missing or malformed
pub fn row_to_service_offer(row: &SqliteRow) -> AppResult<ServiceOffer> {
    Ok(ServiceOffer {
        id: OfferId(uuid_column(row, "id")?),
        service_request_id: RequestId(uuid_column(row, "service_request_id")?),
        provider_id: UserId(uuid_column(row, "provider_id")?),
        description: column(row, "description")?,
        proposed_price: column(row, "proposed_price")?,
        estimated_duration: column(row, "estimated_duration")?,
        status: parse_status(&column::<String>(row, "status")?)?,
        created_at: timestamp_column(row, "created_at")?,
        updated_at: timestamp_column(row, "updated_at")?,
        deleted_at: optional_timestamp_column(row, "deleted_at")?,
    })
}

/// Decode the provider columns joined onto an offer row
///
/// Returns `None` when the `LEFT JOIN` found no user.
///
/// # Errors
///
/// Returns a database error if a column is missing or malformed
pub fn joined_provider(row: &SqliteRow) -> AppResult<Option<UserSummary>> {
    let Some(display_name) = column::<Option<String>>(row, "provider_display_name")? else {
        return Ok(None);
    };
    Ok(Some(UserSummary {
        id: UserId(uuid_column(row, "provider_id")?),
        display_name,
    }))
}

/// Decode a `users` row
///
/// # Errors
///
/// Returns a database error if a column is missing or malformed
pub fn row_to_user_summary(row: &SqliteRow) -> AppResult<UserSummary> {
    Ok(UserSummary {
        id: UserId(uuid_column(row, "id")?),
        display_name: column(row, "display_name")?,
    })
}

/// Decode a `communities` row
///
/// # Errors
///
/// Returns a database error if a column is missing or malformed
pub fn row_to_community_summary(row: &SqliteRow) -> AppResult<CommunitySummary> {
    Ok(CommunitySummary {
        id: CommunityId(uuid_column(row, "id")?),
        name: column(row, "name")?,
        slug: column(row, "slug")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_text_sorts_chronologically() {
        let earlier = DateTime::from_timestamp_micros(1_700_000_000_000_001).unwrap();
        let later = DateTime::from_timestamp_micros(1_700_000_000_000_010).unwrap();
        assert!(format_timestamp(earlier) < format_timestamp(later));
        assert!(format_timestamp(earlier).ends_with('Z'));
    }

    #[test]
    fn test_timestamp_round_trips_at_stored_precision() {
        let ts = now();
        assert_eq!(parse_timestamp(&format_timestamp(ts)).unwrap(), ts);
    }
}
