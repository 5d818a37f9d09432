// ABOUTME: Route handlers for the service offer REST API
// ABOUTME: Submit, list, detail, edit, withdraw, and delete offers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;

use super::{parse_id, parse_optional_id};
use crate::constants::endpoints;
use crate::database::OfferFilter;
use crate::errors::{AppError, AppResult};
use crate::middleware::{actor_from_headers, AuthenticatedActor};
use crate::models::{NewServiceOffer, OfferId, RequestId, ServiceOfferPatch};
use crate::resources::ServerResources;
use crate::services;

/// Body of `POST /api/service-offers`
#[derive(Debug, Deserialize)]
pub struct SubmitOfferBody {
    /// Request the offer targets
    pub service_request_id: RequestId,
    /// Offer fields
    #[serde(flatten)]
    pub offer: NewServiceOffer,
}

/// Query string for `GET /api/service-offers`
#[derive(Debug, Default, Deserialize)]
pub struct ListOffersQuery {
    /// Offers on this request
    pub service_request_id: Option<String>,
    /// Offers from this provider
    pub provider_id: Option<String>,
    /// `true` restricts to the caller's own offers
    pub mine: Option<String>,
}

impl ListOffersQuery {
    fn wants_mine(&self) -> AppResult<bool> {
        match self.mine.as_deref().map(str::trim) {
            None | Some("" | "false" | "0") => Ok(false),
            Some("true" | "1") => Ok(true),
            Some(other) => Err(AppError::invalid_input(format!(
                "Invalid mine flag: {other}"
            ))),
        }
    }
}

/// Service offer routes implementation
pub struct ServiceOfferRoutes;

impl ServiceOfferRoutes {
    /// Create all service offer routes
    #[must_use]
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        let item = format!("{}/:id", endpoints::SERVICE_OFFERS);
        let withdraw = format!("{}/:id/withdraw", endpoints::SERVICE_OFFERS);
        Router::new()
            .route(
                endpoints::SERVICE_OFFERS,
                get(Self::handle_list).post(Self::handle_submit),
            )
            .route(
                &item,
                get(Self::handle_get)
                    .put(Self::handle_update)
                    .delete(Self::handle_delete),
            )
            .route(&withdraw, post(Self::handle_withdraw))
            .with_state(resources)
    }

    /// Handle POST /api/service-offers
    async fn handle_submit(
        State(resources): State<Arc<ServerResources>>,
        AuthenticatedActor(actor): AuthenticatedActor,
        body: Result<Json<SubmitOfferBody>, JsonRejection>,
    ) -> Result<Response, AppError> {
        let Json(body) = body.map_err(super::json_rejection)?;
        let offer = services::submit_offer(
            &resources.database,
            &actor,
            body.service_request_id,
            body.offer,
        )
        .await?;
        Ok((StatusCode::CREATED, Json(offer)).into_response())
    }

    /// Handle GET /api/service-offers
    async fn handle_list(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Query(query): Query<ListOffersQuery>,
    ) -> Result<Response, AppError> {
        let mut filter = OfferFilter {
            service_request_id: parse_optional_id(
                query.service_request_id.as_deref(),
                "service_request_id",
            )?,
            provider_id: parse_optional_id(query.provider_id.as_deref(), "provider_id")?,
        };
        if query.wants_mine()? {
            filter.provider_id = Some(actor_from_headers(&headers)?.id);
        }

        let offers = services::list_offers(&resources.database, &filter).await?;
        Ok((StatusCode::OK, Json(offers)).into_response())
    }

    /// Handle GET /api/service-offers/:id
    async fn handle_get(
        State(resources): State<Arc<ServerResources>>,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let offer_id: OfferId = parse_id(&id, "service offer id")?;
        let detail = services::get_offer(&resources.database, offer_id).await?;
        Ok((StatusCode::OK, Json(detail)).into_response())
    }

    /// Handle PUT /api/service-offers/:id
    async fn handle_update(
        State(resources): State<Arc<ServerResources>>,
        AuthenticatedActor(actor): AuthenticatedActor,
        Path(id): Path<String>,
        body: Result<Json<ServiceOfferPatch>, JsonRejection>,
    ) -> Result<Response, AppError> {
        let offer_id: OfferId = parse_id(&id, "service offer id")?;
        let Json(patch) = body.map_err(super::json_rejection)?;
        let offer = services::update_offer(&resources.database, &actor, offer_id, patch).await?;
        Ok((StatusCode::OK, Json(offer)).into_response())
    }

    /// Handle DELETE /api/service-offers/:id
    async fn handle_delete(
        State(resources): State<Arc<ServerResources>>,
        AuthenticatedActor(actor): AuthenticatedActor,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let offer_id: OfferId = parse_id(&id, "service offer id")?;
        services::delete_offer(&resources.database, &actor, offer_id).await?;
        Ok(StatusCode::NO_CONTENT.into_response())
    }

    /// Handle POST /api/service-offers/:id/withdraw
    async fn handle_withdraw(
        State(resources): State<Arc<ServerResources>>,
        AuthenticatedActor(actor): AuthenticatedActor,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let offer_id: OfferId = parse_id(&id, "service offer id")?;
        let offer = services::withdraw_offer(&resources.database, &actor, offer_id).await?;
        Ok((StatusCode::OK, Json(offer)).into_response())
    }
}
