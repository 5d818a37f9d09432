// ABOUTME: Shared test utilities and setup functions for integration tests
// ABOUTME: Provides database setup plus users, community, request, and offer fixtures
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
#![allow(
    dead_code,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate
)]
//! Shared test utilities for `commune_marketplace`

use std::env;
use std::path::Path;
use std::sync::{Arc, Once};

use anyhow::Result;
use commune_marketplace::{
    config::{DatabaseConfig, DatabaseUrl, ServerConfig},
    database::Database,
    models::{
        Actor, ActorRole, CommunitySummary, NewServiceOffer, NewServiceRequest, RequestId,
        ServiceOffer, ServiceRequest,
    },
    resources::ServerResources,
    routes::build_router,
    services,
};
use tracing::Level;

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let log_level = match env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => Level::TRACE,
            Ok("DEBUG") => Level::DEBUG,
            Ok("INFO") => Level::INFO,
            _ => Level::WARN,
        };

        // Another test harness may already own the global subscriber
        let _ = tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .try_init();
    });
}

/// Standard in-memory test database
pub async fn create_test_database() -> Result<Database> {
    init_test_logging();
    Ok(Database::in_memory().await?)
}

/// File-backed database with a real connection pool, for concurrency tests
pub async fn create_file_database(dir: &Path) -> Result<Database> {
    init_test_logging();
    let config = DatabaseConfig {
        url: DatabaseUrl::SQLite {
            path: dir.join("commune-test.db"),
        },
        max_connections: 4,
        ..DatabaseConfig::default()
    };
    Ok(Database::connect(&config).await?)
}

/// Router over a fresh in-memory database
pub async fn create_test_app() -> Result<(axum::Router, Database)> {
    let database = create_test_database().await?;
    let config = ServerConfig {
        database: DatabaseConfig::in_memory(),
        ..ServerConfig::default()
    };
    let resources = Arc::new(ServerResources::new(database.clone(), config));
    Ok((build_router(resources), database))
}

/// A community with a requester, two providers, and an admin
pub struct Marketplace {
    pub community: CommunitySummary,
    pub requester: Actor,
    pub provider: Actor,
    pub other_provider: Actor,
    pub admin: Actor,
}

/// Seed users and a community
pub async fn seed_marketplace(database: &Database) -> Result<Marketplace> {
    let community = database.create_community("Maple Street", "maple-street").await?;
    let requester = database
        .create_user("Rosa Requester", Some("rosa@example.com"), ActorRole::User)
        .await?;
    let provider = database
        .create_user("Pat Provider", Some("pat@example.com"), ActorRole::ServiceProvider)
        .await?;
    let other_provider = database
        .create_user("Sam Provider", Some("sam@example.com"), ActorRole::ServiceProvider)
        .await?;
    let admin = database
        .create_user("Ada Admin", Some("ada@example.com"), ActorRole::Admin)
        .await?;

    Ok(Marketplace {
        community,
        requester: Actor::user(requester.id),
        provider: Actor::new(provider.id, ActorRole::ServiceProvider),
        other_provider: Actor::new(other_provider.id, ActorRole::ServiceProvider),
        admin: Actor::new(admin.id, ActorRole::Admin),
    })
}

/// Fields for a valid request in the seeded community
pub fn request_fields(market: &Marketplace, title: &str) -> NewServiceRequest {
    NewServiceRequest {
        title: title.to_owned(),
        description: format!("{title} - details inside"),
        category: Some("Home".to_owned()),
        community_id: Some(market.community.id),
        budget: Some(120.0),
    }
}

/// Post an open request as the seeded requester
pub async fn create_open_request(
    database: &Database,
    market: &Marketplace,
    title: &str,
) -> Result<ServiceRequest> {
    Ok(services::create_request(database, &market.requester, request_fields(market, title)).await?)
}

/// Submit a pending offer from `provider`
pub async fn submit_offer(
    database: &Database,
    provider: &Actor,
    request_id: RequestId,
    price: f64,
) -> Result<ServiceOffer> {
    Ok(services::submit_offer(
        database,
        provider,
        request_id,
        NewServiceOffer {
            description: format!("I can do it for {price}"),
            proposed_price: Some(price),
            estimated_duration: Some("2 days".to_owned()),
        },
    )
    .await?)
}
