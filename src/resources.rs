// ABOUTME: Shared server resources injected into every route handler
// ABOUTME: Holds the database handle and the loaded server configuration
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::sync::Arc;

use crate::config::ServerConfig;
use crate::database::Database;

/// Centralized resource container for dependency injection
#[derive(Clone)]
pub struct ServerResources {
    /// Entity store
    pub database: Arc<Database>,
    /// Loaded configuration
    pub config: Arc<ServerConfig>,
}

impl ServerResources {
    /// Bundle resources for the router
    #[must_use]
    pub fn new(database: Database, config: ServerConfig) -> Self {
        Self {
            database: Arc::new(database),
            config: Arc::new(config),
        }
    }
}
