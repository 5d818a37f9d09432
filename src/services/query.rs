// ABOUTME: Read-side listing of service requests with filters, search, and keyset pages
// ABOUTME: Each listed request carries its requester, community, and offers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::database::{Database, RequestFilter};
use crate::errors::AppResult;
use crate::models::ServiceRequestDetail;
use crate::pagination::{CursorPage, PaginationParams};

/// List non-deleted requests newest first with relationships loaded
///
/// Filters combine with AND. The returned cursor resumes after the last item
/// of this page.
///
/// # Errors
///
/// Returns `InvalidInput` for a malformed cursor, or a database error
pub async fn list_requests(
    database: &Database,
    filter: &RequestFilter,
    params: &PaginationParams,
) -> AppResult<CursorPage<ServiceRequestDetail>> {
    let page = database.list_service_requests(filter, params).await?;
    let items = database.load_request_details(page.items).await?;
    Ok(CursorPage::new(items, page.next_cursor, page.has_more))
}
