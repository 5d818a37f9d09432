// ABOUTME: Extracts the acting user from identity headers set by the upstream auth layer
// ABOUTME: Handlers receive an explicit Actor or the request fails with 401
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Identity is established upstream. This service trusts the `x-user-id` and
//! `x-user-role` headers and turns them into an [`Actor`]; it never reads a
//! "current user" from ambient state.

use std::str::FromStr;

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use tracing::Span;
use uuid::Uuid;

use crate::constants::headers;
use crate::errors::{AppError, AppResult, ErrorCode};
use crate::models::{Actor, ActorRole, UserId};

/// Build the actor for a request from its headers
///
/// A missing role header means a regular member.
///
/// # Errors
///
/// Returns `AuthRequired` when the user id header is missing or not a UUID,
/// or when the role header names an unknown role
pub fn actor_from_headers(header_map: &HeaderMap) -> AppResult<Actor> {
    let raw_id = header_map
        .get(headers::USER_ID)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(AppError::auth_required)?;
    let id = Uuid::parse_str(raw_id).map_err(|_| {
        AppError::new(
            ErrorCode::AuthRequired,
            format!("Invalid {} header", headers::USER_ID),
        )
    })?;

    let role = match header_map.get(headers::USER_ROLE) {
        None => ActorRole::default(),
        Some(value) => value
            .to_str()
            .ok()
            .and_then(|v| ActorRole::from_str(v).ok())
            .ok_or_else(|| {
                AppError::new(
                    ErrorCode::AuthRequired,
                    format!("Invalid {} header", headers::USER_ROLE),
                )
            })?,
    };

    Ok(Actor::new(UserId(id), role))
}

/// Axum extractor wrapping the acting user
#[derive(Debug, Clone, Copy)]
pub struct AuthenticatedActor(pub Actor);

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedActor
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let actor = actor_from_headers(&parts.headers)?;
        let span = Span::current();
        span.record("user_id", actor.id.to_string());
        span.record("role", actor.role.as_str());
        Ok(Self(actor))
    }
}
