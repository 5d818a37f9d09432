// ABOUTME: Service request lifecycle operations: create, read, edit, and soft delete
// ABOUTME: Explicit status edits pass through the transition guard and a conditional write
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use tracing::{info, instrument, warn};

use super::status_guard;
use super::validation::{optional_category, require_text, require_title, validate_amount};
use crate::database::mappers::now;
use crate::database::Database;
use crate::errors::{AppError, AppResult};
use crate::models::{
    Actor, NewServiceRequest, RequestId, RequestStatus, ServiceRequest, ServiceRequestDetail,
    ServiceRequestPatch,
};

/// Load a non-deleted request or fail with `NotFound`
///
/// # Errors
///
/// Returns `ResourceNotFound` if the request is missing or deleted
pub async fn get_request(database: &Database, request_id: RequestId) -> AppResult<ServiceRequest> {
    database
        .get_service_request(request_id)
        .await?
        .ok_or_else(|| {
            AppError::not_found("Service request").with_resource_id(request_id.to_string())
        })
}

/// Load a request with requester, community, and offers
///
/// # Errors
///
/// Returns `ResourceNotFound` if the request is missing or deleted
pub async fn get_request_detail(
    database: &Database,
    request_id: RequestId,
) -> AppResult<ServiceRequestDetail> {
    let request = get_request(database, request_id).await?;
    database
        .load_request_details(vec![request])
        .await?
        .pop()
        .ok_or_else(|| {
            AppError::not_found("Service request").with_resource_id(request_id.to_string())
        })
}

/// Post a new `open` request on behalf of `actor`
///
/// # Errors
///
/// Returns a validation error if title, description, or community are
/// missing, or if the budget is negative
#[instrument(skip_all, fields(actor_id = %actor.id))]
pub async fn create_request(
    database: &Database,
    actor: &Actor,
    fields: NewServiceRequest,
) -> AppResult<ServiceRequest> {
    let title = require_title(&fields.title)?;
    let description = require_text("description", &fields.description)?;
    let community_id = fields
        .community_id
        .ok_or_else(|| AppError::missing_field("community_id"))?;
    let budget = validate_amount("budget", fields.budget)?;
    let category = optional_category(fields.category)?;

    let mut request = ServiceRequest::new(
        NewServiceRequest {
            title,
            description,
            category,
            community_id: Some(community_id),
            budget,
        },
        actor.id,
        community_id,
    );
    // Stored timestamps carry microseconds; keep the returned value identical
    request.created_at = now();
    request.updated_at = request.created_at;
    database.create_service_request(&request).await?;

    info!(
        request_id = %request.id,
        community_id = %community_id,
        "Service request created"
    );
    Ok(request)
}

/// Edit fields and/or status of a request
///
/// The requester and admin roles may edit. A status edit must be legal from
/// the status read here; the write only lands if that status is unchanged.
///
/// # Errors
///
/// Returns `NotFound`, `Forbidden`, a validation error, `InvalidTransition`,
/// or `InvalidState` when the status changed concurrently
#[instrument(skip_all, fields(actor_id = %actor.id, request_id = %request_id))]
pub async fn update_request(
    database: &Database,
    actor: &Actor,
    request_id: RequestId,
    patch: ServiceRequestPatch,
) -> AppResult<ServiceRequest> {
    let current = get_request(database, request_id).await?;
    if !actor.can_manage(current.requester_id) {
        return Err(AppError::forbidden(
            "Only the requester or an admin can edit this service request",
        )
        .with_user_id(actor.id.as_uuid()));
    }

    let mut updated = apply_field_patch(current.clone(), &patch)?;
    if let Some(target) = patch.status {
        status_guard::validate_explicit_edit(current.status, target)?;
        apply_status_change(&mut updated, target);
    }
    updated.updated_at = now();
    updated.check_accepted_offer_invariant()?;

    if !database.update_service_request(&updated, current.status).await? {
        let latest = get_request(database, request_id).await?;
        warn!(
            expected = %current.status,
            actual = %latest.status,
            "Service request changed during update"
        );
        return Err(AppError::invalid_state(format!(
            "Service request status changed from {} to {} during the update",
            current.status, latest.status
        )));
    }

    if updated.status == current.status {
        info!("Service request updated");
    } else {
        info!(from = %current.status, to = %updated.status, "Service request status changed");
    }
    Ok(updated)
}

fn apply_field_patch(
    mut request: ServiceRequest,
    patch: &ServiceRequestPatch,
) -> AppResult<ServiceRequest> {
    if let Some(title) = patch.title.as_deref() {
        request.title = require_title(title)?;
    }
    if let Some(description) = patch.description.as_deref() {
        request.description = require_text("description", description)?;
    }
    if patch.category.is_some() {
        request.category = optional_category(patch.category.clone())?;
    }
    if patch.budget.is_some() {
        request.budget = validate_amount("budget", patch.budget)?;
    }
    Ok(request)
}

/// Apply a guard-approved status change and its side fields
fn apply_status_change(request: &mut ServiceRequest, target: RequestStatus) {
    if request.status == target {
        return;
    }
    match target {
        RequestStatus::Completed => request.completed_at = Some(now()),
        // The accepted offer keeps its status; only the pointer goes
        RequestStatus::Cancelled => request.accepted_offer_id = None,
        RequestStatus::Open | RequestStatus::InProgress => {}
    }
    request.status = target;
}

/// Soft-delete a request together with its offers
///
/// # Errors
///
/// Returns `NotFound` if the request is missing or already deleted, and
/// `Forbidden` unless the actor is the requester or an admin
#[instrument(skip_all, fields(actor_id = %actor.id, request_id = %request_id))]
pub async fn delete_request(
    database: &Database,
    actor: &Actor,
    request_id: RequestId,
) -> AppResult<()> {
    let current = get_request(database, request_id).await?;
    if !actor.can_manage(current.requester_id) {
        return Err(AppError::forbidden(
            "Only the requester or an admin can delete this service request",
        )
        .with_user_id(actor.id.as_uuid()));
    }

    let offers_deleted = database
        .soft_delete_service_request(request_id)
        .await?
        .ok_or_else(|| {
            AppError::not_found("Service request").with_resource_id(request_id.to_string())
        })?;

    info!(offers_deleted, "Service request deleted");
    Ok(())
}
