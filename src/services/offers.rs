// ABOUTME: Service offer operations for providers: read, list, edit, withdraw, and delete
// ABOUTME: Edits and withdrawals only land while the offer is still pending
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use tracing::{info, instrument};

use super::validation::{optional_text, require_text, validate_amount};
use crate::database::mappers::now;
use crate::database::{Database, OfferFilter};
use crate::errors::{AppError, AppResult};
use crate::models::{
    Actor, OfferId, OfferStatus, OfferWithProvider, ServiceOffer, ServiceOfferDetail,
    ServiceOfferPatch,
};

async fn load_offer(database: &Database, offer_id: OfferId) -> AppResult<OfferWithProvider> {
    database
        .get_service_offer(offer_id)
        .await?
        .ok_or_else(|| AppError::not_found("Service offer").with_resource_id(offer_id.to_string()))
}

fn ensure_provider(actor: &Actor, offer: &ServiceOffer, action: &str) -> AppResult<()> {
    if offer.provider_id == actor.id {
        Ok(())
    } else {
        Err(
            AppError::forbidden(format!("Only the provider can {action} this service offer"))
                .with_user_id(actor.id.as_uuid()),
        )
    }
}

fn not_pending(status: OfferStatus, action: &str) -> AppError {
    AppError::invalid_state(format!(
        "Cannot {action} a service offer that is {status}"
    ))
}

/// Load an offer with its provider and parent request
///
/// # Errors
///
/// Returns `ResourceNotFound` if the offer is missing or deleted
pub async fn get_offer(database: &Database, offer_id: OfferId) -> AppResult<ServiceOfferDetail> {
    let OfferWithProvider { offer, provider } = load_offer(database, offer_id).await?;
    let service_request = database
        .get_service_request(offer.service_request_id)
        .await?;
    Ok(ServiceOfferDetail {
        offer,
        provider,
        service_request,
    })
}

/// List non-deleted offers matching `filter` in submission order
///
/// # Errors
///
/// Returns an error if the query fails
pub async fn list_offers(
    database: &Database,
    filter: &OfferFilter,
) -> AppResult<Vec<OfferWithProvider>> {
    database.list_service_offers(filter).await
}

/// Edit a pending offer; only its provider may do so
///
/// # Errors
///
/// Returns `NotFound`, `Forbidden`, a validation error, or `InvalidState`
/// when the offer is no longer pending
#[instrument(skip_all, fields(actor_id = %actor.id, offer_id = %offer_id))]
pub async fn update_offer(
    database: &Database,
    actor: &Actor,
    offer_id: OfferId,
    patch: ServiceOfferPatch,
) -> AppResult<ServiceOffer> {
    let mut offer = load_offer(database, offer_id).await?.offer;
    ensure_provider(actor, &offer, "edit")?;
    if !offer.status.is_pending() {
        return Err(not_pending(offer.status, "edit"));
    }

    if let Some(description) = patch.description.as_deref() {
        offer.description = require_text("description", description)?;
    }
    if patch.proposed_price.is_some() {
        offer.proposed_price = validate_amount("proposed_price", patch.proposed_price)?;
    }
    if patch.estimated_duration.is_some() {
        offer.estimated_duration = optional_text(patch.estimated_duration);
    }
    offer.updated_at = now();

    if !database.update_pending_offer(&offer).await? {
        let latest = load_offer(database, offer_id).await?.offer;
        return Err(not_pending(latest.status, "edit"));
    }

    info!("Service offer updated");
    Ok(offer)
}

/// Withdraw a pending offer; only its provider may do so
///
/// Withdrawing twice fails the second time because the offer is no longer
/// pending.
///
/// # Errors
///
/// Returns `NotFound`, `Forbidden`, or `InvalidState`
#[instrument(skip_all, fields(actor_id = %actor.id, offer_id = %offer_id))]
pub async fn withdraw_offer(
    database: &Database,
    actor: &Actor,
    offer_id: OfferId,
) -> AppResult<ServiceOffer> {
    let offer = load_offer(database, offer_id).await?.offer;
    ensure_provider(actor, &offer, "withdraw")?;
    if !offer.status.is_pending() {
        return Err(not_pending(offer.status, "withdraw"));
    }

    if !database.withdraw_pending_offer(offer_id).await? {
        let latest = load_offer(database, offer_id).await?.offer;
        return Err(not_pending(latest.status, "withdraw"));
    }

    info!("Service offer withdrawn");
    load_offer(database, offer_id).await.map(|o| o.offer)
}

/// Soft-delete an offer that is not the accepted one
///
/// # Errors
///
/// Returns `NotFound`, `Forbidden`, or `InvalidState` for an accepted offer
#[instrument(skip_all, fields(actor_id = %actor.id, offer_id = %offer_id))]
pub async fn delete_offer(database: &Database, actor: &Actor, offer_id: OfferId) -> AppResult<()> {
    let offer = load_offer(database, offer_id).await?.offer;
    ensure_provider(actor, &offer, "delete")?;
    if offer.status == OfferStatus::Accepted {
        return Err(AppError::invalid_state(
            "Cannot delete an accepted service offer",
        ));
    }

    if !database.soft_delete_unaccepted_offer(offer_id).await? {
        // Accepted or deleted after the read above
        return match database.get_service_offer(offer_id).await? {
            Some(_) => Err(AppError::invalid_state(
                "Cannot delete an accepted service offer",
            )),
            None => Err(
                AppError::not_found("Service offer").with_resource_id(offer_id.to_string())
            ),
        };
    }

    info!("Service offer deleted");
    Ok(())
}
