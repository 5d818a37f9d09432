// ABOUTME: Core types and constants for the Commune service marketplace
// ABOUTME: Foundation crate with error handling, domain models, pagination, and constants
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Commune Core
//!
//! Foundation crate providing shared types for the Commune service marketplace.
//! It changes infrequently so the server crate recompiles without it.
//!
//! ## Modules
//!
//! - **errors**: Unified error handling with `AppError` and `ErrorCode`
//! - **models**: Identifiers, actor identity, requests, and offers
//! - **pagination**: Cursor-based pagination for request listings
//! - **constants**: Application-wide constants organized by domain

/// Unified error handling system with standard error codes and HTTP responses
pub mod errors;

/// Application constants organized by domain
pub mod constants;

/// Cursor-based pagination for efficient data traversal
pub mod pagination;

/// Core data models (`ServiceRequest`, `ServiceOffer`, `Actor`, ids)
pub mod models;
