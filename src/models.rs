// ABOUTME: Re-exports marketplace domain models from commune-core
// ABOUTME: Requests, offers, identifiers, actor identity, and relationship views
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

pub use commune_core::models::*;
