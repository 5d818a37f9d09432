// ABOUTME: Status transition guard for the service request lifecycle state machine
// ABOUTME: Pure validation of open -> in_progress -> completed / cancelled transitions
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Request lifecycle:
//!
//! | From          | Allowed to                |
//! |---------------|---------------------------|
//! | `open`        | `in_progress`, `cancelled`|
//! | `in_progress` | `completed`, `cancelled`  |
//! | `completed`   | none                      |
//! | `cancelled`   | none                      |
//!
//! Setting a status to its current value is always allowed and changes nothing.

use serde_json::json;

use crate::errors::{AppError, AppResult, ErrorCode};
use crate::models::RequestStatus;

/// Statuses reachable from `from` in one step
#[must_use]
pub const fn allowed_targets(from: RequestStatus) -> &'static [RequestStatus] {
    match from {
        RequestStatus::Open => &[RequestStatus::InProgress, RequestStatus::Cancelled],
        RequestStatus::InProgress => &[RequestStatus::Completed, RequestStatus::Cancelled],
        RequestStatus::Completed | RequestStatus::Cancelled => &[],
    }
}

/// Whether `from -> to` is legal, counting same-status sets as legal
#[must_use]
pub fn is_allowed(from: RequestStatus, to: RequestStatus) -> bool {
    from == to || allowed_targets(from).contains(&to)
}

/// Validate a transition
///
/// # Errors
///
/// Returns `InvalidTransition` naming both statuses when the table forbids it
pub fn validate_transition(from: RequestStatus, to: RequestStatus) -> AppResult<()> {
    if is_allowed(from, to) {
        Ok(())
    } else {
        Err(AppError::invalid_transition(from, to))
    }
}

/// Validate a status change requested directly by a client edit
///
/// `in_progress` is entered only through offer acceptance, which also sets the
/// accepted offer, so an explicit `open -> in_progress` edit is refused.
///
/// # Errors
///
/// Returns `InvalidTransition` when the table forbids the change or the edit
/// tries to start work without accepting an offer
pub fn validate_explicit_edit(from: RequestStatus, to: RequestStatus) -> AppResult<()> {
    validate_transition(from, to)?;
    if from != to && to == RequestStatus::InProgress {
        return Err(AppError::new(
            ErrorCode::InvalidTransition,
            format!("Invalid status transition from {from} to {to}: requires accepting an offer"),
        )
        .with_details(json!({ "from": from.as_str(), "to": to.as_str() })));
    }
    Ok(())
}
