// ABOUTME: Domain model re-exports for the service marketplace
// ABOUTME: Identifiers, actor identity, and request/offer records
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Authenticated caller identity
pub mod actor;
/// Typed UUID identifiers
pub mod ids;
/// Requests, offers, and relationship views
pub mod marketplace;

pub use actor::{Actor, ActorRole};
pub use ids::{CommunityId, OfferId, RequestId, UserId};
pub use marketplace::{
    CommunitySummary, NewServiceOffer, NewServiceRequest, OfferStatus, OfferWithProvider,
    RequestStatus, ServiceOffer, ServiceOfferDetail, ServiceOfferPatch, ServiceRequest,
    ServiceRequestDetail, ServiceRequestPatch, UserSummary,
};
