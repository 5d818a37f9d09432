// ABOUTME: Marketplace service layer on top of the entity store
// ABOUTME: Every mutating operation takes the acting user explicitly
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Business operations for service requests and offers.
//!
//! Operations are free async functions over a [`Database`](crate::database::Database)
//! and an [`Actor`](crate::models::Actor). Authorization, validation, and the
//! status machine live here; storage only enforces conditional writes.

/// Offer acceptance coordinator
pub mod acceptance;
/// Offer submission against open requests
pub mod offer_submission;
/// Provider-side offer operations
pub mod offers;
/// Request listing
pub mod query;
/// Request lifecycle operations
pub mod requests;
/// Request status transition table
pub mod status_guard;
/// Shared input validation
pub mod validation;

pub use acceptance::{accept_offer, AcceptanceOutcome};
pub use offer_submission::submit_offer;
pub use offers::{delete_offer, get_offer, list_offers, update_offer, withdraw_offer};
pub use query::list_requests;
pub use requests::{
    create_request, delete_request, get_request, get_request_detail, update_request,
};
