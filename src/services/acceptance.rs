// ABOUTME: Acceptance coordinator: accepts one offer, rejects its pending rivals, starts work
// ABOUTME: One transaction whose first write is a compare-and-swap on the request status
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Acceptance Coordinator
//!
//! Preconditions are checked in a fixed order before anything is written:
//!
//! 1. the request exists and is not deleted (`NotFound`)
//! 2. the actor is the requester (`Forbidden`); admin roles do not qualify
//! 3. the offer exists and is not deleted (`NotFound`)
//! 4. the offer belongs to the request (`InvalidInput`)
//! 5. the guard allows `open -> in_progress` from the current status
//! 6. the offer is still `pending` (`InvalidState`)
//!
//! The transaction then claims the request with
//! `UPDATE ... WHERE status = 'open'`, accepts the offer with
//! `UPDATE ... WHERE status = 'pending'`, and rejects every other pending
//! offer. If either conditional update matches no row, a concurrent call got
//! there first: the transaction is rolled back and the caller receives a
//! conflict error describing the state it lost to.

use serde::Serialize;
use tracing::{info, instrument, warn};

use super::requests::get_request;
use super::status_guard;
use crate::database::{
    accept_pending_offer, claim_open_request, fetch_request_status, reject_pending_siblings,
    Database,
};
use crate::errors::{AppError, AppResult};
use crate::models::{
    Actor, OfferId, OfferStatus, RequestId, RequestStatus, ServiceOffer, ServiceRequest,
};

/// Result of a successful acceptance
#[derive(Debug, Clone, Serialize)]
pub struct AcceptanceOutcome {
    /// The request, now `in_progress`
    pub service_request: ServiceRequest,
    /// The accepted offer
    pub accepted_offer: ServiceOffer,
    /// How many sibling offers moved from `pending` to `rejected`
    pub rejected_offers: u64,
}

/// Accept `offer_id` for `request_id` on behalf of `actor`
///
/// # Errors
///
/// Returns the precondition failure listed in the module docs, `InvalidState`
/// or `InvalidTransition` when another acceptance won the race, or a database
/// error (after rollback) if a write fails
#[instrument(
    skip_all,
    fields(actor_id = %actor.id, request_id = %request_id, offer_id = %offer_id)
)]
pub async fn accept_offer(
    database: &Database,
    actor: &Actor,
    request_id: RequestId,
    offer_id: OfferId,
) -> AppResult<AcceptanceOutcome> {
    let request = get_request(database, request_id).await?;
    if request.requester_id != actor.id {
        return Err(
            AppError::forbidden("Only the requester can accept offers for this service request")
                .with_user_id(actor.id.as_uuid()),
        );
    }

    let offer = database
        .get_service_offer(offer_id)
        .await?
        .ok_or_else(|| AppError::not_found("Service offer").with_resource_id(offer_id.to_string()))?
        .offer;
    if offer.service_request_id != request_id {
        return Err(AppError::invalid_input(
            "Service offer does not belong to this service request",
        )
        .with_resource_id(offer_id.to_string()));
    }

    ensure_acceptable(request.status, offer.status)?;

    let mut guard = database.begin("accept_offer").await?;

    if !claim_open_request(guard.executor()?, request_id, offer_id).await? {
        let current = fetch_request_status(guard.executor()?, request_id).await?;
        guard.rollback().await?;
        warn!(status = ?current, "Lost acceptance race on service request");
        return Err(match current {
            Some(status) => lost_request_race(status),
            None => AppError::not_found("Service request").with_resource_id(request_id.to_string()),
        });
    }

    if !accept_pending_offer(guard.executor()?, offer_id, request_id).await? {
        guard.rollback().await?;
        warn!("Service offer left pending before it could be accepted");
        return Err(AppError::invalid_state(
            "Service offer is no longer pending and cannot be accepted",
        ));
    }

    let rejected_offers = reject_pending_siblings(guard.executor()?, request_id, offer_id).await?;
    guard.commit().await?;

    info!(rejected_offers, "Service offer accepted");

    let service_request = get_request(database, request_id).await?;
    service_request.check_accepted_offer_invariant()?;
    let accepted_offer = database
        .get_service_offer(offer_id)
        .await?
        .map(|o| o.offer)
        .ok_or_else(|| AppError::internal("Accepted offer disappeared after commit"))?;

    Ok(AcceptanceOutcome {
        service_request,
        accepted_offer,
        rejected_offers,
    })
}

/// Preconditions 5 and 6 over the statuses read before the transaction
fn ensure_acceptable(request_status: RequestStatus, offer_status: OfferStatus) -> AppResult<()> {
    if request_status != RequestStatus::Open {
        // Guard first so terminal requests report the illegal transition
        status_guard::validate_transition(request_status, RequestStatus::InProgress)?;
        return Err(lost_request_race(request_status));
    }
    if !offer_status.is_pending() {
        return Err(AppError::invalid_state(format!(
            "Service offer is {offer_status}; only pending offers can be accepted"
        )));
    }
    Ok(())
}

fn lost_request_race(status: RequestStatus) -> AppError {
    match status {
        RequestStatus::InProgress => {
            AppError::invalid_state("This service request already has an accepted offer")
        }
        other => match status_guard::validate_transition(other, RequestStatus::InProgress) {
            Err(e) => e,
            Ok(()) => AppError::invalid_state(format!(
                "Service request is {other} and cannot accept offers"
            )),
        },
    }
}
