// ABOUTME: Route handlers for the service request REST API
// ABOUTME: Create, list, detail, edit, delete, and the accept-offer entry point
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Service request routes
//!
//! Handlers parse input, extract the actor, and delegate to the service
//! layer. Mutating endpoints require the identity headers.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use super::{parse_id, parse_optional_id};
use crate::constants::endpoints;
use crate::database::RequestFilter;
use crate::errors::{AppError, AppResult};
use crate::middleware::AuthenticatedActor;
use crate::models::{
    NewServiceRequest, OfferId, OfferWithProvider, RequestId, RequestStatus, ServiceRequestDetail,
    ServiceRequestPatch,
};
use crate::pagination::{Cursor, PaginationParams};
use crate::resources::ServerResources;
use crate::services;

/// Query string for `GET /api/service-requests`
///
/// Every field arrives as a string so malformed values become structured
/// validation errors instead of extractor rejections.
#[derive(Debug, Default, Deserialize)]
pub struct ListRequestsQuery {
    /// Community filter
    pub community_id: Option<String>,
    /// Status filter
    pub status: Option<String>,
    /// Exact category filter
    pub category: Option<String>,
    /// Substring search over title and description
    pub search: Option<String>,
    /// Page size
    pub limit: Option<String>,
    /// Opaque cursor from a previous page
    pub cursor: Option<String>,
}

impl ListRequestsQuery {
    fn into_filter_and_params(self) -> AppResult<(RequestFilter, PaginationParams)> {
        let status = self
            .status
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::parse::<RequestStatus>)
            .transpose()?;
        let limit = self
            .limit
            .as_deref()
            .map(|raw| {
                raw.trim()
                    .parse::<usize>()
                    .map_err(|_| AppError::invalid_input(format!("Invalid limit: {raw}")))
            })
            .transpose()?;

        let filter = RequestFilter {
            community_id: parse_optional_id(self.community_id.as_deref(), "community_id")?,
            status,
            category: self
                .category
                .as_deref()
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(str::to_owned),
            search: self.search,
        };
        let cursor = self
            .cursor
            .filter(|c| !c.is_empty())
            .map(Cursor::from_string);
        Ok((filter, PaginationParams::new(cursor, limit)))
    }
}

/// Body of `POST /api/service-requests/{id}/accept-offer`
#[derive(Debug, Deserialize)]
pub struct AcceptOfferBody {
    /// Offer to accept
    pub offer_id: OfferId,
}

/// Request detail with the accepted offer resolved
#[derive(Debug, Serialize)]
pub struct ServiceRequestDetailResponse {
    /// Request with requester, community, and offers
    #[serde(flatten)]
    pub detail: ServiceRequestDetail,
    /// The offer referenced by `accepted_offer_id`
    pub accepted_offer: Option<OfferWithProvider>,
}

impl From<ServiceRequestDetail> for ServiceRequestDetailResponse {
    fn from(detail: ServiceRequestDetail) -> Self {
        let accepted_offer = detail.accepted_offer().cloned();
        Self {
            detail,
            accepted_offer,
        }
    }
}

/// Service request routes implementation
pub struct ServiceRequestRoutes;

impl ServiceRequestRoutes {
    /// Create all service request routes
    #[must_use]
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        let item = format!("{}/:id", endpoints::SERVICE_REQUESTS);
        let accept = format!("{}/:id/accept-offer", endpoints::SERVICE_REQUESTS);
        Router::new()
            .route(
                endpoints::SERVICE_REQUESTS,
                get(Self::handle_list).post(Self::handle_create),
            )
            .route(
                &item,
                get(Self::handle_get)
                    .put(Self::handle_update)
                    .delete(Self::handle_delete),
            )
            .route(&accept, post(Self::handle_accept_offer))
            .with_state(resources)
    }

    /// Handle POST /api/service-requests
    async fn handle_create(
        State(resources): State<Arc<ServerResources>>,
        AuthenticatedActor(actor): AuthenticatedActor,
        body: Result<Json<NewServiceRequest>, JsonRejection>,
    ) -> Result<Response, AppError> {
        let Json(fields) = body.map_err(super::json_rejection)?;
        let request = services::create_request(&resources.database, &actor, fields).await?;
        Ok((StatusCode::CREATED, Json(request)).into_response())
    }

    /// Handle GET /api/service-requests
    async fn handle_list(
        State(resources): State<Arc<ServerResources>>,
        Query(query): Query<ListRequestsQuery>,
    ) -> Result<Response, AppError> {
        let (filter, params) = query.into_filter_and_params()?;
        let page = services::list_requests(&resources.database, &filter, &params).await?;
        Ok((
            StatusCode::OK,
            Json(page.map(ServiceRequestDetailResponse::from)),
        )
            .into_response())
    }

    /// Handle GET /api/service-requests/:id
    async fn handle_get(
        State(resources): State<Arc<ServerResources>>,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let request_id: RequestId = parse_id(&id, "service request id")?;
        let detail = services::get_request_detail(&resources.database, request_id).await?;
        Ok((
            StatusCode::OK,
            Json(ServiceRequestDetailResponse::from(detail)),
        )
            .into_response())
    }

    /// Handle PUT /api/service-requests/:id
    async fn handle_update(
        State(resources): State<Arc<ServerResources>>,
        AuthenticatedActor(actor): AuthenticatedActor,
        Path(id): Path<String>,
        body: Result<Json<ServiceRequestPatch>, JsonRejection>,
    ) -> Result<Response, AppError> {
        let request_id: RequestId = parse_id(&id, "service request id")?;
        let Json(patch) = body.map_err(super::json_rejection)?;
        let request =
            services::update_request(&resources.database, &actor, request_id, patch).await?;
        Ok((StatusCode::OK, Json(request)).into_response())
    }

    /// Handle DELETE /api/service-requests/:id
    async fn handle_delete(
        State(resources): State<Arc<ServerResources>>,
        AuthenticatedActor(actor): AuthenticatedActor,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let request_id: RequestId = parse_id(&id, "service request id")?;
        services::delete_request(&resources.database, &actor, request_id).await?;
        Ok(StatusCode::NO_CONTENT.into_response())
    }

    /// Handle POST /api/service-requests/:id/accept-offer
    async fn handle_accept_offer(
        State(resources): State<Arc<ServerResources>>,
        AuthenticatedActor(actor): AuthenticatedActor,
        Path(id): Path<String>,
        body: Result<Json<AcceptOfferBody>, JsonRejection>,
    ) -> Result<Response, AppError> {
        let request_id: RequestId = parse_id(&id, "service request id")?;
        let Json(body) = body.map_err(super::json_rejection)?;
        let outcome =
            services::accept_offer(&resources.database, &actor, request_id, body.offer_id).await?;
        Ok((StatusCode::OK, Json(outcome)).into_response())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorCode;

    #[test]
    fn test_query_parses_filters_and_clamps_limit() {
        let query = ListRequestsQuery {
            status: Some("open".into()),
            limit: Some("1000".into()),
            search: Some("fence".into()),
            ..ListRequestsQuery::default()
        };
        let (filter, params) = query.into_filter_and_params().unwrap();
        assert_eq!(filter.status, Some(RequestStatus::Open));
        assert_eq!(filter.search.as_deref(), Some("fence"));
        assert_eq!(params.limit, 200);
    }

    #[test]
    fn test_query_rejects_bad_values() {
        let bad_status = ListRequestsQuery {
            status: Some("archived".into()),
            ..ListRequestsQuery::default()
        };
        assert!(bad_status.into_filter_and_params().is_err());

        let bad_limit = ListRequestsQuery {
            limit: Some("ten".into()),
            ..ListRequestsQuery::default()
        };
        let err = bad_limit.into_filter_and_params().unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidInput);

        let bad_community = ListRequestsQuery {
            community_id: Some("nope".into()),
            ..ListRequestsQuery::default()
        };
        assert!(bad_community.into_filter_and_params().is_err());
    }
}
