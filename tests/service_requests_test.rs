// ABOUTME: Integration tests for service request creation, editing, deletion, and listing
// ABOUTME: Exercises the status guard through edits plus filtered keyset pagination
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use std::collections::HashSet;

use anyhow::Result;
use commune_marketplace::{
    database::{OfferFilter, RequestFilter},
    errors::ErrorCode,
    models::{CommunityId, NewServiceRequest, RequestStatus, ServiceRequestPatch},
    pagination::{Cursor, PaginationParams},
    services,
};
use common::{
    create_open_request, create_test_database, request_fields, seed_marketplace, submit_offer,
};

fn status_patch(status: RequestStatus) -> ServiceRequestPatch {
    ServiceRequestPatch {
        status: Some(status),
        ..ServiceRequestPatch::default()
    }
}

#[tokio::test]
async fn test_create_request_validates_and_trims() -> Result<()> {
    let db = create_test_database().await?;
    let market = seed_marketplace(&db).await?;

    let mut fields = request_fields(&market, "  Hang shelves  ");
    fields.category = Some("   ".to_owned());
    let request = services::create_request(&db, &market.requester, fields).await?;
    assert_eq!(request.title, "Hang shelves");
    assert_eq!(request.category, None);
    assert_eq!(request.status, RequestStatus::Open);
    assert_eq!(request.requester_id, market.requester.id);

    let stored = services::get_request(&db, request.id).await?;
    assert_eq!(stored, request);

    let blank_title = NewServiceRequest {
        title: " ".to_owned(),
        ..request_fields(&market, "x")
    };
    let err = services::create_request(&db, &market.requester, blank_title)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::MissingRequiredField);

    let no_community = NewServiceRequest {
        community_id: None,
        ..request_fields(&market, "Orphan")
    };
    let err = services::create_request(&db, &market.requester, no_community)
        .await
        .unwrap_err();
    assert!(err.message.contains("community_id"));

    let negative_budget = NewServiceRequest {
        budget: Some(-10.0),
        ..request_fields(&market, "Cheap")
    };
    let err = services::create_request(&db, &market.requester, negative_budget)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ValueOutOfRange);
    Ok(())
}

#[tokio::test]
async fn test_explicit_edit_cannot_start_work() -> Result<()> {
    let db = create_test_database().await?;
    let market = seed_marketplace(&db).await?;
    let request = create_open_request(&db, &market, "Trim hedges").await?;

    let err = services::update_request(
        &db,
        &market.requester,
        request.id,
        status_patch(RequestStatus::InProgress),
    )
    .await
    .unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidTransition);
    assert!(err.message.contains("requires accepting an offer"));
    Ok(())
}

#[tokio::test]
async fn test_full_lifecycle_through_edits() -> Result<()> {
    let db = create_test_database().await?;
    let market = seed_marketplace(&db).await?;
    let request = create_open_request(&db, &market, "Repaint mailbox").await?;
    let offer = submit_offer(&db, &market.provider, request.id, 30.0).await?;
    services::accept_offer(&db, &market.requester, request.id, offer.id).await?;

    let completed = services::update_request(
        &db,
        &market.requester,
        request.id,
        status_patch(RequestStatus::Completed),
    )
    .await?;
    assert_eq!(completed.status, RequestStatus::Completed);
    assert!(completed.completed_at.is_some());
    assert_eq!(completed.accepted_offer_id, Some(offer.id));

    for target in [RequestStatus::Open, RequestStatus::Cancelled] {
        let err = services::update_request(&db, &market.requester, request.id, status_patch(target))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidTransition);
        assert_eq!(
            err.message,
            format!("Invalid status transition from completed to {target}")
        );
    }

    // Same-status edits are no-ops and other fields still apply
    let retitled = services::update_request(
        &db,
        &market.requester,
        request.id,
        ServiceRequestPatch {
            title: Some("Repainted mailbox".to_owned()),
            status: Some(RequestStatus::Completed),
            ..ServiceRequestPatch::default()
        },
    )
    .await?;
    assert_eq!(retitled.title, "Repainted mailbox");
    assert_eq!(retitled.status, RequestStatus::Completed);
    Ok(())
}

#[tokio::test]
async fn test_cancel_in_progress_clears_accepted_offer() -> Result<()> {
    let db = create_test_database().await?;
    let market = seed_marketplace(&db).await?;
    let request = create_open_request(&db, &market, "Fix faucet").await?;
    let offer = submit_offer(&db, &market.provider, request.id, 55.0).await?;
    services::accept_offer(&db, &market.requester, request.id, offer.id).await?;

    let cancelled = services::update_request(
        &db,
        &market.requester,
        request.id,
        status_patch(RequestStatus::Cancelled),
    )
    .await?;
    assert_eq!(cancelled.status, RequestStatus::Cancelled);
    assert!(cancelled.accepted_offer_id.is_none());

    let offer = services::get_offer(&db, offer.id).await?;
    assert_eq!(offer.offer.status.as_str(), "accepted");
    Ok(())
}

#[tokio::test]
async fn test_edit_permissions() -> Result<()> {
    let db = create_test_database().await?;
    let market = seed_marketplace(&db).await?;
    let request = create_open_request(&db, &market, "Sweep porch").await?;

    let patch = ServiceRequestPatch {
        budget: Some(35.0),
        ..ServiceRequestPatch::default()
    };
    let err = services::update_request(&db, &market.provider, request.id, patch.clone())
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::PermissionDenied);

    let edited = services::update_request(&db, &market.admin, request.id, patch).await?;
    assert_eq!(edited.budget, Some(35.0));
    Ok(())
}

#[tokio::test]
async fn test_delete_cascades_to_offers() -> Result<()> {
    let db = create_test_database().await?;
    let market = seed_marketplace(&db).await?;
    let request = create_open_request(&db, &market, "Wash windows").await?;
    let offer = submit_offer(&db, &market.provider, request.id, 20.0).await?;

    let err = services::delete_request(&db, &market.provider, request.id)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::PermissionDenied);

    services::delete_request(&db, &market.requester, request.id).await?;

    let err = services::get_request(&db, request.id).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::ResourceNotFound);
    let err = services::get_offer(&db, offer.id).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::ResourceNotFound);
    let remaining = services::list_offers(
        &db,
        &OfferFilter {
            service_request_id: None,
            provider_id: Some(market.provider.id),
        },
    )
    .await?;
    assert!(remaining.is_empty());

    let err = services::delete_request(&db, &market.requester, request.id)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ResourceNotFound);
    Ok(())
}

#[tokio::test]
async fn test_list_filters_combine() -> Result<()> {
    let db = create_test_database().await?;
    let market = seed_marketplace(&db).await?;
    let other_community = db.create_community("Oak Lane", "oak-lane").await?;

    let mut plumbing = request_fields(&market, "Leaky pipe under sink");
    plumbing.category = Some("Plumbing".to_owned());
    let plumbing = services::create_request(&db, &market.requester, plumbing).await?;
    let garden = create_open_request(&db, &market, "Mow the LAWN").await?;
    let mut drain = request_fields(&market, "Clogged drain");
    drain.category = Some("Plumbing".to_owned());
    let drain = services::create_request(&db, &market.requester, drain).await?;
    let mut faucet = request_fields(&market, "Old faucet");
    faucet.category = Some("Plumbing".to_owned());
    let faucet = services::create_request(&db, &market.requester, faucet).await?;
    services::update_request(
        &db,
        &market.requester,
        faucet.id,
        status_patch(RequestStatus::Cancelled),
    )
    .await?;
    let elsewhere = NewServiceRequest {
        community_id: Some(other_community.id),
        ..request_fields(&market, "Mow the lawn too")
    };
    let elsewhere = services::create_request(&db, &market.requester, elsewhere).await?;
    let deleted = create_open_request(&db, &market, "Deleted lawn job").await?;
    services::delete_request(&db, &market.requester, deleted.id).await?;

    let page = services::list_requests(
        &db,
        &RequestFilter {
            community_id: Some(market.community.id),
            search: Some("lawn".to_owned()),
            ..RequestFilter::default()
        },
        &PaginationParams::default(),
    )
    .await?;
    let ids: Vec<_> = page.items.iter().map(|d| d.request.id).collect();
    assert_eq!(ids, vec![garden.id]);

    let page = services::list_requests(
        &db,
        &RequestFilter {
            category: Some("Plumbing".to_owned()),
            status: Some(RequestStatus::Open),
            ..RequestFilter::default()
        },
        &PaginationParams::default(),
    )
    .await?;
    let ids: Vec<_> = page.items.iter().map(|d| d.request.id).collect();
    assert_eq!(ids, vec![drain.id, plumbing.id]);
    assert_eq!(
        page.items[0].requester.as_ref().map(|u| u.display_name.as_str()),
        Some("Rosa Requester")
    );
    assert_eq!(
        page.items[0].community.as_ref().map(|c| c.slug.as_str()),
        Some("maple-street")
    );

    let page = services::list_requests(
        &db,
        &RequestFilter {
            community_id: Some(other_community.id),
            ..RequestFilter::default()
        },
        &PaginationParams::default(),
    )
    .await?;
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].request.id, elsewhere.id);

    let page = services::list_requests(
        &db,
        &RequestFilter {
            community_id: Some(CommunityId::new()),
            ..RequestFilter::default()
        },
        &PaginationParams::default(),
    )
    .await?;
    assert!(page.items.is_empty());
    assert!(!page.has_more);
    Ok(())
}

#[tokio::test]
async fn test_listed_requests_carry_their_own_offers() -> Result<()> {
    let db = create_test_database().await?;
    let market = seed_marketplace(&db).await?;
    let neighbors = db.create_community("Oak Lane", "oak-lane").await?;

    let windows = create_open_request(&db, &market, "Wash windows").await?;
    let gutters = NewServiceRequest {
        community_id: Some(neighbors.id),
        ..request_fields(&market, "Clear gutters")
    };
    let gutters = services::create_request(&db, &market.provider, gutters).await?;
    let quiet = create_open_request(&db, &market, "Nobody offered").await?;

    let w1 = submit_offer(&db, &market.provider, windows.id, 40.0).await?;
    let g1 = submit_offer(&db, &market.other_provider, gutters.id, 55.0).await?;
    let w2 = submit_offer(&db, &market.other_provider, windows.id, 35.0).await?;
    services::accept_offer(&db, &market.requester, windows.id, w2.id).await?;

    let page =
        services::list_requests(&db, &RequestFilter::default(), &PaginationParams::default())
            .await?;
    let ids: Vec<_> = page.items.iter().map(|d| d.request.id).collect();
    assert_eq!(ids, vec![quiet.id, gutters.id, windows.id]);

    assert!(page.items[0].offers.is_empty());

    let gutter_offers: Vec<_> = page.items[1].offers.iter().map(|o| o.offer.id).collect();
    assert_eq!(gutter_offers, vec![g1.id]);
    assert_eq!(
        page.items[1].requester.as_ref().map(|u| u.display_name.as_str()),
        Some("Pat Provider")
    );
    assert_eq!(
        page.items[1].community.as_ref().map(|c| c.slug.as_str()),
        Some("oak-lane")
    );

    let window_offers: Vec<_> = page.items[2].offers.iter().map(|o| o.offer.id).collect();
    assert_eq!(window_offers, vec![w1.id, w2.id]);
    assert_eq!(
        page.items[2].accepted_offer().map(|o| o.offer.id),
        Some(w2.id)
    );
    assert_eq!(
        page.items[2].offers[1].provider.as_ref().map(|p| p.display_name.as_str()),
        Some("Sam Provider")
    );
    assert_eq!(
        page.items[2].community.as_ref().map(|c| c.slug.as_str()),
        Some("maple-street")
    );
    Ok(())
}

#[tokio::test]
async fn test_search_folds_non_ascii_case() -> Result<()> {
    let db = create_test_database().await?;
    let market = seed_marketplace(&db).await?;
    let school = create_open_request(&db, &market, "ÉCOLE cleaning").await?;
    let mut cafe = request_fields(&market, "Paint the walls");
    cafe.description = "Small CAFÉ near the square".to_owned();
    let cafe = services::create_request(&db, &market.requester, cafe).await?;
    create_open_request(&db, &market, "Ecole without accent").await?;

    let params = PaginationParams::default();
    let search = |term: &str| RequestFilter {
        search: Some(term.to_owned()),
        ..RequestFilter::default()
    };

    let page = services::list_requests(&db, &search("école"), &params).await?;
    let ids: Vec<_> = page.items.iter().map(|d| d.request.id).collect();
    assert_eq!(ids, vec![school.id]);

    let page = services::list_requests(&db, &search("café"), &params).await?;
    let ids: Vec<_> = page.items.iter().map(|d| d.request.id).collect();
    assert_eq!(ids, vec![cafe.id]);

    // Edits refresh what search matches
    services::update_request(
        &db,
        &market.requester,
        school.id,
        ServiceRequestPatch {
            title: Some("Gymnase floors".to_owned()),
            description: Some("Sweep and mop".to_owned()),
            ..ServiceRequestPatch::default()
        },
    )
    .await?;
    let page = services::list_requests(&db, &search("ÉCOLE"), &params).await?;
    assert!(page.items.is_empty());
    let page = services::list_requests(&db, &search("GYMNASE"), &params).await?;
    assert_eq!(page.items.len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_search_treats_wildcards_literally() -> Result<()> {
    let db = create_test_database().await?;
    let market = seed_marketplace(&db).await?;
    let discount = create_open_request(&db, &market, "Need 50% off paint").await?;
    create_open_request(&db, &market, "Need 500 bricks").await?;

    let page = services::list_requests(
        &db,
        &RequestFilter {
            search: Some("50%".to_owned()),
            ..RequestFilter::default()
        },
        &PaginationParams::default(),
    )
    .await?;
    let ids: Vec<_> = page.items.iter().map(|d| d.request.id).collect();
    assert_eq!(ids, vec![discount.id]);
    Ok(())
}

#[tokio::test]
async fn test_keyset_pagination_visits_every_request_once() -> Result<()> {
    let db = create_test_database().await?;
    let market = seed_marketplace(&db).await?;

    let mut created = Vec::new();
    for i in 0..7 {
        created.push(create_open_request(&db, &market, &format!("Job {i}")).await?.id);
    }

    let mut seen = Vec::new();
    let mut cursor: Option<Cursor> = None;
    loop {
        let page = services::list_requests(
            &db,
            &RequestFilter::default(),
            &PaginationParams::new(cursor.clone(), Some(3)),
        )
        .await?;
        assert!(page.items.len() <= 3);
        seen.extend(page.items.iter().map(|d| d.request.id));
        if !page.has_more {
            assert!(page.next_cursor.is_none());
            break;
        }
        cursor = page.next_cursor;
    }

    // Newest first
    created.reverse();
    assert_eq!(seen, created);
    assert_eq!(seen.iter().collect::<HashSet<_>>().len(), 7);
    Ok(())
}

#[tokio::test]
async fn test_malformed_cursor_is_rejected() -> Result<()> {
    let db = create_test_database().await?;
    let err = services::list_requests(
        &db,
        &RequestFilter::default(),
        &PaginationParams::new(Some(Cursor::from_string("not a cursor".to_owned())), None),
    )
    .await
    .unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidInput);
    Ok(())
}
