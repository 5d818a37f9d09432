// ABOUTME: Route module organization for the marketplace HTTP endpoints
// ABOUTME: Assembles domain routers and the shared tower-http layer stack
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Route module for the Commune marketplace
//!
//! Each domain module contains only route definitions and thin handler
//! functions that delegate to the service layer.

/// Health check and readiness routes
pub mod health;
/// Service offer routes
pub mod service_offers;
/// Service request routes
pub mod service_requests;

use std::fmt::Display;
use std::str::FromStr;
use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::Router;
use tower::ServiceBuilder;
use tower_http::timeout::TimeoutLayer;

pub use health::HealthRoutes;
pub use service_offers::ServiceOfferRoutes;
pub use service_requests::ServiceRequestRoutes;

use crate::errors::{AppError, AppResult};
use crate::middleware::{request_id_layers, setup_cors, trace_layer};
use crate::resources::ServerResources;

/// Build the complete application router with middleware applied
///
/// Layer order from the outside in: request id assignment, the trace span,
/// request id propagation, CORS, and the per-request timeout.
#[must_use]
pub fn build_router(resources: Arc<ServerResources>) -> Router {
    let (set_request_id, propagate_request_id) = request_id_layers();
    let cors = setup_cors(&resources.config);
    let timeout = TimeoutLayer::new(resources.config.request_timeout());

    Router::new()
        .merge(HealthRoutes::routes(Arc::clone(&resources)))
        .merge(ServiceRequestRoutes::routes(Arc::clone(&resources)))
        .merge(ServiceOfferRoutes::routes(resources))
        .layer(
            ServiceBuilder::new()
                .layer(set_request_id)
                .layer(trace_layer())
                .layer(propagate_request_id)
                .layer(cors)
                .layer(timeout),
        )
}

/// Parse a path or query identifier
fn parse_id<T>(raw: &str, what: &str) -> AppResult<T>
where
    T: FromStr,
    T::Err: Display,
{
    raw.trim()
        .parse()
        .map_err(|e| AppError::invalid_input(format!("Invalid {what} '{raw}': {e}")))
}

/// Parse an optional identifier, treating an empty value as absent
fn parse_optional_id<T>(raw: Option<&str>, what: &str) -> AppResult<Option<T>>
where
    T: FromStr,
    T::Err: Display,
{
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| parse_id(s, what))
        .transpose()
}

/// Report a malformed JSON body as a structured validation error
fn json_rejection(rejection: JsonRejection) -> AppError {
    AppError::invalid_input(rejection.body_text())
}
