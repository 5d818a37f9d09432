// ABOUTME: Cursor-based pagination for marketplace listings
// ABOUTME: Opaque keyset cursors over (created_at, id) plus page envelopes and limits
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::fmt::{self, Display, Formatter};

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::limits::{DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT};
use crate::errors::{AppError, AppResult};

/// Opaque pagination cursor containing encoded position information
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct Cursor(String);

impl Cursor {
    /// Create a new cursor from timestamp and ID
    ///
    /// Microsecond precision matches the stored timestamp precision so that
    /// keyset comparisons never skip rows created within the same millisecond.
    #[must_use]
    pub fn new(timestamp: DateTime<Utc>, id: &str) -> Self {
        let cursor_data = format!("{}:{}", timestamp.timestamp_micros(), id);
        let encoded = base64::Engine::encode(&URL_SAFE_NO_PAD, cursor_data.as_bytes());
        Self(encoded)
    }

    /// Decode cursor into timestamp and ID components
    ///
    /// Returns `None` if cursor is invalid or malformed
    #[must_use]
    pub fn decode(&self) -> Option<(DateTime<Utc>, String)> {
        let decoded = base64::Engine::decode(&URL_SAFE_NO_PAD, &self.0).ok()?;
        let decoded_str = String::from_utf8(decoded).ok()?;

        let (timestamp_str, id) = decoded_str.split_once(':')?;

        let timestamp_micros = timestamp_str.parse::<i64>().ok()?;
        let datetime = DateTime::from_timestamp_micros(timestamp_micros)?;

        Some((datetime, id.to_owned()))
    }

    /// Decode or fail with `InvalidInput`
    ///
    /// # Errors
    ///
    /// Returns an error if the cursor is malformed
    pub fn decode_or_invalid(&self) -> AppResult<(DateTime<Utc>, String)> {
        self.decode()
            .ok_or_else(|| AppError::invalid_input("Invalid pagination cursor"))
    }

    /// Get the raw cursor string
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Create cursor from raw string (for deserialization)
    #[must_use]
    pub const fn from_string(s: String) -> Self {
        Self(s)
    }
}

impl Display for Cursor {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Paginated response containing items and pagination metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CursorPage<T> {
    /// The items in this page
    pub items: Vec<T>,

    /// Cursor pointing to the next page (if available)
    pub next_cursor: Option<Cursor>,

    /// Whether there are more items after this page
    pub has_more: bool,

    /// Total number of items in this page
    pub count: usize,
}

impl<T> CursorPage<T> {
    /// Create a new cursor page
    #[must_use]
    pub fn new(items: Vec<T>, next_cursor: Option<Cursor>, has_more: bool) -> Self {
        let count = items.len();
        Self {
            items,
            next_cursor,
            has_more,
            count,
        }
    }

    /// Build a page from `limit + 1` fetched rows
    ///
    /// The extra row only signals that another page exists and is dropped.
    #[must_use]
    pub fn from_overfetch(
        mut items: Vec<T>,
        limit: usize,
        cursor_of: impl Fn(&T) -> Cursor,
    ) -> Self {
        let has_more = items.len() > limit;
        items.truncate(limit);
        let next_cursor = if has_more {
            items.last().map(cursor_of)
        } else {
            None
        };
        Self::new(items, next_cursor, has_more)
    }

    /// Transform every item while keeping pagination metadata
    #[must_use]
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> CursorPage<U> {
        CursorPage {
            items: self.items.into_iter().map(f).collect(),
            next_cursor: self.next_cursor,
            has_more: self.has_more,
            count: self.count,
        }
    }
}

/// Pagination parameters for cursor-based queries
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PaginationParams {
    /// Cursor to start after (exclusive)
    pub cursor: Option<Cursor>,

    /// Maximum number of items to return
    pub limit: usize,
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            cursor: None,
            limit: DEFAULT_PAGE_LIMIT,
        }
    }
}

impl PaginationParams {
    /// Create parameters, clamping the limit into `1..=MAX_PAGE_LIMIT`
    #[must_use]
    pub fn new(cursor: Option<Cursor>, limit: Option<usize>) -> Self {
        let limit = limit
            .unwrap_or(DEFAULT_PAGE_LIMIT)
            .clamp(1, MAX_PAGE_LIMIT);
        Self { cursor, limit }
    }
}
