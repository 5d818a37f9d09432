// ABOUTME: Application constants organized by domain
// ABOUTME: Listing limits, field limits, HTTP header names, ports, and endpoint paths
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Pagination and field limits
pub mod limits {
    /// Page size when the caller does not pass `limit`
    pub const DEFAULT_PAGE_LIMIT: usize = 50;
    /// Largest page size a caller may request
    pub const MAX_PAGE_LIMIT: usize = 200;
    /// Maximum length of a request title in characters
    pub const MAX_TITLE_LENGTH: usize = 200;
    /// Maximum length of a category tag in characters
    pub const MAX_CATEGORY_LENGTH: usize = 100;
}

/// HTTP header names
pub mod headers {
    /// Authenticated user id supplied by the identity layer
    pub const USER_ID: &str = "x-user-id";
    /// Authenticated user role supplied by the identity layer
    pub const USER_ROLE: &str = "x-user-role";
    /// Correlation id propagated through logs and responses
    pub const REQUEST_ID: &str = "x-request-id";
}

/// Network ports
pub mod ports {
    /// Default HTTP port
    pub const DEFAULT_HTTP_PORT: u16 = 8081;
}

/// API endpoints
pub mod endpoints {
    /// Health check endpoint
    pub const HEALTH_CHECK: &str = "/health";
    /// Readiness endpoint
    pub const READY_CHECK: &str = "/ready";
    /// Service request collection
    pub const SERVICE_REQUESTS: &str = "/api/service-requests";
    /// Service offer collection
    pub const SERVICE_OFFERS: &str = "/api/service-offers";
}

/// Timeouts and database defaults
pub mod defaults {
    /// Default per-request timeout in seconds
    pub const REQUEST_TIMEOUT_SECS: u64 = 30;
    /// Default pool size for file-backed databases
    pub const DATABASE_MAX_CONNECTIONS: u32 = 5;
    /// Default `SQLite` busy timeout in seconds
    pub const DATABASE_BUSY_TIMEOUT_SECS: u64 = 5;
    /// Default database URL
    pub const DATABASE_URL: &str = "sqlite:./data/commune.db";
}
