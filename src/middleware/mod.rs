// ABOUTME: HTTP middleware for request tracing, actor extraction, and CORS
// ABOUTME: Provides request ID generation, per-request spans, and the acting user for handlers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Acting user extracted from identity headers
pub mod actor;
/// CORS configuration
pub mod cors;
/// Request IDs and HTTP spans
pub mod tracing;

pub use actor::{actor_from_headers, AuthenticatedActor};
pub use cors::setup_cors;
pub use self::tracing::{request_id_layers, trace_layer, RequestSpan};
