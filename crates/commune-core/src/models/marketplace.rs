// ABOUTME: Service marketplace domain models for requests, offers, and their lifecycles
// ABOUTME: RequestStatus and OfferStatus enums, entity records, and relationship views
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::{CommunityId, OfferId, RequestId, UserId};
use crate::errors::{AppError, AppResult};

// ============================================================================
// Enums
// ============================================================================

/// Lifecycle status of a service request
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    /// Accepting offers
    #[default]
    Open,
    /// An offer was accepted and work is underway
    InProgress,
    /// Work finished (terminal)
    Completed,
    /// Abandoned by the requester (terminal)
    Cancelled,
}

impl Display for RequestStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

impl FromStr for RequestStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "open" => Ok(Self::Open),
            "in_progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(AppError::invalid_input(format!(
                "Invalid service request status: {s}"
            ))),
        }
    }
}

impl RequestStatus {
    /// All statuses in lifecycle order
    pub const ALL: [Self; 4] = [
        Self::Open,
        Self::InProgress,
        Self::Completed,
        Self::Cancelled,
    ];

    /// Database string representation
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Whether a request in this status must reference an accepted offer
    #[must_use]
    pub const fn requires_accepted_offer(&self) -> bool {
        matches!(self, Self::InProgress | Self::Completed)
    }
}

/// Lifecycle status of a service offer
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum OfferStatus {
    /// Awaiting the requester's decision
    #[default]
    Pending,
    /// Chosen by the requester
    Accepted,
    /// Lost to a sibling offer
    Rejected,
    /// Pulled back by its provider
    Withdrawn,
}

impl Display for OfferStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

impl FromStr for OfferStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "accepted" => Ok(Self::Accepted),
            "rejected" => Ok(Self::Rejected),
            "withdrawn" => Ok(Self::Withdrawn),
            _ => Err(AppError::invalid_input(format!(
                "Invalid service offer status: {s}"
            ))),
        }
    }
}

impl OfferStatus {
    /// Database string representation
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
            Self::Withdrawn => "withdrawn",
        }
    }

    /// Whether the offer still awaits a decision
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }
}

// ============================================================================
// Entities
// ============================================================================

/// A posted need for a service within a community
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServiceRequest {
    /// Unique identifier
    pub id: RequestId,
    /// Short summary
    pub title: String,
    /// Full description of the need
    pub description: String,
    /// Free-text category tag
    pub category: Option<String>,
    /// User who posted the request
    pub requester_id: UserId,
    /// Community the request belongs to
    pub community_id: CommunityId,
    /// Lifecycle status
    pub status: RequestStatus,
    /// Optional budget
    pub budget: Option<f64>,
    /// Offer chosen through acceptance
    pub accepted_offer_id: Option<OfferId>,
    /// When the request reached `completed`
    pub completed_at: Option<DateTime<Utc>>,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Last modification time
    pub updated_at: DateTime<Utc>,
    /// Soft-delete marker
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl ServiceRequest {
    /// Build a fresh `open` request
    #[must_use]
    pub fn new(fields: NewServiceRequest, requester_id: UserId, community_id: CommunityId) -> Self {
        let now = Utc::now();
        Self {
            id: RequestId::new(),
            title: fields.title,
            description: fields.description,
            category: fields.category,
            requester_id,
            community_id,
            status: RequestStatus::Open,
            budget: fields.budget,
            accepted_offer_id: None,
            completed_at: None,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    /// Whether the request has been soft-deleted
    #[must_use]
    pub const fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Verify `accepted_offer_id` is set exactly when the status requires it
    ///
    /// # Errors
    ///
    /// Returns `InvalidState` when the pointer and the status disagree
    pub fn check_accepted_offer_invariant(&self) -> AppResult<()> {
        match (self.status.requires_accepted_offer(), self.accepted_offer_id) {
            (true, None) => Err(AppError::invalid_state(format!(
                "Service request {} is {} without an accepted offer",
                self.id, self.status
            ))),
            (false, Some(offer_id)) => Err(AppError::invalid_state(format!(
                "Service request {} is {} but references accepted offer {offer_id}",
                self.id, self.status
            ))),
            _ => Ok(()),
        }
    }
}

/// A provider's proposal against a request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServiceOffer {
    /// Unique identifier
    pub id: OfferId,
    /// Parent request
    pub service_request_id: RequestId,
    /// User who made the offer
    pub provider_id: UserId,
    /// What the provider proposes
    pub description: String,
    /// Proposed price
    pub proposed_price: Option<f64>,
    /// Free-text duration estimate
    pub estimated_duration: Option<String>,
    /// Lifecycle status
    pub status: OfferStatus,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Last modification time
    pub updated_at: DateTime<Utc>,
    /// Soft-delete marker
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl ServiceOffer {
    /// Build a fresh `pending` offer
    #[must_use]
    pub fn new(
        service_request_id: RequestId,
        provider_id: UserId,
        fields: NewServiceOffer,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: OfferId::new(),
            service_request_id,
            provider_id,
            description: fields.description,
            proposed_price: fields.proposed_price,
            estimated_duration: fields.estimated_duration,
            status: OfferStatus::Pending,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }
}

// ============================================================================
// Inputs
// ============================================================================

/// Fields supplied when posting a request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewServiceRequest {
    /// Short summary
    pub title: String,
    /// Full description
    pub description: String,
    /// Free-text category tag
    #[serde(default)]
    pub category: Option<String>,
    /// Community resolved by the caller
    #[serde(default)]
    pub community_id: Option<CommunityId>,
    /// Optional budget
    #[serde(default)]
    pub budget: Option<f64>,
}

/// Fields supplied when submitting an offer
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewServiceOffer {
    /// What the provider proposes
    pub description: String,
    /// Proposed price
    #[serde(default)]
    pub proposed_price: Option<f64>,
    /// Free-text duration estimate
    #[serde(default)]
    pub estimated_duration: Option<String>,
}

/// Partial edit of a request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceRequestPatch {
    /// New title
    #[serde(default)]
    pub title: Option<String>,
    /// New description
    #[serde(default)]
    pub description: Option<String>,
    /// New category
    #[serde(default)]
    pub category: Option<String>,
    /// New budget
    #[serde(default)]
    pub budget: Option<f64>,
    /// Requested status change
    #[serde(default)]
    pub status: Option<RequestStatus>,
}

/// Partial edit of an offer
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceOfferPatch {
    /// New description
    #[serde(default)]
    pub description: Option<String>,
    /// New proposed price
    #[serde(default)]
    pub proposed_price: Option<f64>,
    /// New duration estimate
    #[serde(default)]
    pub estimated_duration: Option<String>,
}

// ============================================================================
// Relationship views
// ============================================================================

/// Public projection of a user
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserSummary {
    /// User identifier
    pub id: UserId,
    /// Display name
    pub display_name: String,
}

/// Public projection of a community
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CommunitySummary {
    /// Community identifier
    pub id: CommunityId,
    /// Community name
    pub name: String,
    /// URL slug
    pub slug: String,
}

/// Offer with its provider loaded
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OfferWithProvider {
    /// The offer
    #[serde(flatten)]
    pub offer: ServiceOffer,
    /// Provider, if the user row exists
    pub provider: Option<UserSummary>,
}

/// Request with requester, community and offers loaded
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServiceRequestDetail {
    /// The request
    #[serde(flatten)]
    pub request: ServiceRequest,
    /// Requester, if the user row exists
    pub requester: Option<UserSummary>,
    /// Community, if the community row exists
    pub community: Option<CommunitySummary>,
    /// Non-deleted offers in insertion order
    pub offers: Vec<OfferWithProvider>,
}

impl ServiceRequestDetail {
    /// The offer referenced by `accepted_offer_id`
    #[must_use]
    pub fn accepted_offer(&self) -> Option<&OfferWithProvider> {
        let accepted = self.request.accepted_offer_id?;
        self.offers.iter().find(|o| o.offer.id == accepted)
    }
}

/// Offer with provider and parent request loaded
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServiceOfferDetail {
    /// The offer
    #[serde(flatten)]
    pub offer: ServiceOffer,
    /// Provider, if the user row exists
    pub provider: Option<UserSummary>,
    /// Parent request, if not deleted
    pub service_request: Option<ServiceRequest>,
}
