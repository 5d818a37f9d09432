// ABOUTME: Offer submission service validating and creating offers against open requests
// ABOUTME: The insert is conditional on the request still being open at write time
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use tracing::{info, instrument, warn};

use super::requests::get_request;
use super::validation::{optional_text, require_text, validate_amount};
use crate::database::mappers::now;
use crate::database::Database;
use crate::errors::{AppError, AppResult};
use crate::models::{Actor, NewServiceOffer, RequestId, RequestStatus, ServiceOffer};

fn not_open(status: RequestStatus) -> AppError {
    AppError::invalid_state(format!(
        "Cannot submit an offer to a service request that is {status}"
    ))
}

/// Submit a `pending` offer from `actor` against an `open` request
///
/// A provider may submit several offers to the same request.
///
/// # Errors
///
/// Returns a validation error for an empty description or negative price,
/// `NotFound` if the request is missing or deleted, and `InvalidState` naming
/// the current status if the request is not `open`
#[instrument(skip_all, fields(actor_id = %actor.id, request_id = %request_id))]
pub async fn submit_offer(
    database: &Database,
    actor: &Actor,
    request_id: RequestId,
    fields: NewServiceOffer,
) -> AppResult<ServiceOffer> {
    let description = require_text("description", &fields.description)?;
    let proposed_price = validate_amount("proposed_price", fields.proposed_price)?;
    let estimated_duration = optional_text(fields.estimated_duration);

    let request = get_request(database, request_id).await?;
    if request.status != RequestStatus::Open {
        return Err(not_open(request.status));
    }

    let mut offer = ServiceOffer::new(
        request_id,
        actor.id,
        NewServiceOffer {
            description,
            proposed_price,
            estimated_duration,
        },
    );
    offer.created_at = now();
    offer.updated_at = offer.created_at;

    if !database.create_offer_if_request_open(&offer).await? {
        // The request changed between the read above and the insert
        let latest = get_request(database, request_id).await?;
        warn!(status = %latest.status, "Service request closed before offer was stored");
        return Err(not_open(latest.status));
    }

    info!(offer_id = %offer.id, "Service offer submitted");
    Ok(offer)
}
