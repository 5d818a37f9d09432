// ABOUTME: Authenticated actor identity passed explicitly into every marketplace operation
// ABOUTME: Actor pairs a UserId with an ActorRole used for permission decisions
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::ids::UserId;
use crate::errors::AppError;

/// Platform role of a user
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum ActorRole {
    /// Full platform access
    SuperAdmin,
    /// Community administrator
    Admin,
    /// Content moderator
    Moderator,
    /// User offering services
    ServiceProvider,
    /// Regular member
    #[default]
    User,
}

impl ActorRole {
    /// Database and header string representation
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::SuperAdmin => "super_admin",
            Self::Admin => "admin",
            Self::Moderator => "moderator",
            Self::ServiceProvider => "service_provider",
            Self::User => "user",
        }
    }

    /// Whether this role may edit or delete requests it does not own
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        matches!(self, Self::SuperAdmin | Self::Admin)
    }
}

impl Display for ActorRole {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActorRole {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "super_admin" => Ok(Self::SuperAdmin),
            "admin" => Ok(Self::Admin),
            "moderator" => Ok(Self::Moderator),
            "service_provider" => Ok(Self::ServiceProvider),
            "user" => Ok(Self::User),
            _ => Err(AppError::invalid_input(format!("Invalid role: {s}"))),
        }
    }
}

/// The authenticated caller of an operation
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Actor {
    /// Caller's user id
    pub id: UserId,
    /// Caller's role
    pub role: ActorRole,
}

impl Actor {
    /// Create an actor with an explicit role
    #[must_use]
    pub const fn new(id: UserId, role: ActorRole) -> Self {
        Self { id, role }
    }

    /// Create a regular member
    #[must_use]
    pub const fn user(id: UserId) -> Self {
        Self::new(id, ActorRole::User)
    }

    /// Whether this actor may manage resources owned by `owner`
    #[must_use]
    pub fn can_manage(&self, owner: UserId) -> bool {
        self.id == owner || self.role.is_admin()
    }
}
