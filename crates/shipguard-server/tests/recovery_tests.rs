//! Batch-recovery protocol integration tests
//!
//! Covers session sizing, the paced offset walk to exhaustion, strict
//! two-sided date bounds, reconcile mode, and the HTTP surface.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::{TimeZone, Utc};
use serde_json::json;
use shipguard_common::types::ATTR_REMOTE_ORDER_ID;
use shipguard_server::api::app_router;
use shipguard_server::features::recovery::commands::{
    initiate, process_batch, InitiateRecoveryCommand, ProcessBatchCommand, RecoveryError,
};
use shipguard_server::store::{MemoryOrderStore, OrderStore};
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

mod common;
use common::{context, jan};

fn range_command() -> InitiateRecoveryCommand {
    InitiateRecoveryCommand {
        date_from: Some("2024-01-01".to_string()),
        date_to: Some("2024-01-31".to_string()),
    }
}

#[tokio::test]
async fn initiate_requires_a_range() {
    let store = MemoryOrderStore::new();
    let command = InitiateRecoveryCommand {
        date_from: None,
        date_to: Some("2024-01-31".to_string()),
    };
    assert!(matches!(
        initiate::handle(&store, command).await,
        Err(RecoveryError::Validation(_))
    ));
}

#[tokio::test]
async fn session_walks_1200_orders_to_exhaustion() {
    let server = MockServer::start().await;
    let store = Arc::new(MemoryOrderStore::new());

    // 1200 orders inside January, a few strays outside the range.
    for id in 1..=1200 {
        store.seed_order(id, jan((id % 28 + 1) as u32));
    }
    store.seed_order(9001, Utc.with_ymd_and_hms(2023, 12, 31, 23, 0, 0).single().unwrap());
    store.seed_order(9002, Utc.with_ymd_and_hms(2024, 2, 1, 0, 30, 0).single().unwrap());

    let ctx = context(&server, store.clone());

    let session = initiate::handle(ctx.store.as_ref(), range_command())
        .await
        .unwrap();
    assert_eq!(session.order_count, 1200);
    assert_eq!(session.batch_size, 50);
    assert_eq!(session.wait_time, 5);

    let mut offset = 0;
    let mut processed_total = 0;
    loop {
        let command = ProcessBatchCommand {
            date_from: Some("2024-01-01".to_string()),
            date_to: Some("2024-01-31".to_string()),
            batch_size: session.batch_size,
            offset,
            reconcile: false,
        };
        match process_batch::handle(&ctx, command).await {
            Ok(response) => {
                processed_total += response.processed;
                offset += session.batch_size;
            }
            Err(RecoveryError::NoMoreOrders) => break,
            Err(e) => panic!("unexpected error: {e}"),
        }
    }

    assert_eq!(processed_total, 1200);

    // Default mode re-saves exactly the in-range orders; the strays were
    // never selected (regression for the lower-bound-drop defect).
    let touched = store.touched_orders();
    assert_eq!(touched.len(), 1200);
    assert!(!touched.contains(&9001));
    assert!(!touched.contains(&9002));
}

#[tokio::test]
async fn small_ranges_use_the_largest_batch_size() {
    let server = MockServer::start().await;
    let store = Arc::new(MemoryOrderStore::new());
    for id in 1..=12 {
        store.seed_order(id, jan(id as u32));
    }

    let ctx = context(&server, store.clone());
    let session = initiate::handle(ctx.store.as_ref(), range_command())
        .await
        .unwrap();
    assert_eq!(session.order_count, 12);
    assert_eq!(session.batch_size, 100);
    assert_eq!(session.wait_time, 10);
}

#[tokio::test]
async fn reconcile_mode_copies_without_creating() {
    let server = MockServer::start().await;
    let store = Arc::new(MemoryOrderStore::new());
    store.seed_order(1, jan(5));
    store.seed_order(2, jan(6));
    store.seed_order(3, jan(7));
    // Order 1 is already linked and must be skipped silently.
    store
        .set_attributes(1, &[(ATTR_REMOTE_ORDER_ID, "R-1".to_string())])
        .await
        .unwrap();

    Mock::given(method("GET"))
        .and(path("/orders/1"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/orders/2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "R-2",
            "order_number": "#2",
            "insured_status": "insured_selected",
            "paid_to_insure": "4.00",
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/orders/3"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    // Reconcile mode never issues creates.
    Mock::given(method("POST"))
        .and(path("/orders"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let ctx = context(&server, store.clone());
    let command = ProcessBatchCommand {
        date_from: Some("2024-01-01".to_string()),
        date_to: Some("2024-01-31".to_string()),
        batch_size: 100,
        offset: 0,
        reconcile: true,
    };
    let response = process_batch::handle(&ctx, command).await.unwrap();

    assert_eq!(response.processed, 3);
    assert_eq!(
        store.get_attribute(2, ATTR_REMOTE_ORDER_ID).await.unwrap(),
        Some("R-2".to_string())
    );
    assert_eq!(store.get_attribute(3, ATTR_REMOTE_ORDER_ID).await.unwrap(), None);
    // Reconcile mode does not force-save orders.
    assert!(store.touched_orders().is_empty());
}

#[tokio::test]
async fn http_surface_round_trips() {
    let server = MockServer::start().await;
    let store = Arc::new(MemoryOrderStore::new());
    for id in 1..=3 {
        store.seed_order(id, jan(id as u32));
    }
    let ctx = Arc::new(context(&server, store.clone()));
    let app = app_router(ctx);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/v1/recovery")
                .method("POST")
                .header("content-type", "application/json")
                .body(Body::from(
                    json!({ "date_from": "2024-01-01", "date_to": "2024-01-31" }).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let parsed: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(parsed["order_count"], 3);
    assert_eq!(parsed["batch_size"], 100);

    // Missing range surfaces as a structured validation failure.
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/v1/recovery")
                .method("POST")
                .header("content-type", "application/json")
                .body(Body::from(json!({ "date_from": "2024-01-01" }).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // An offset past the range reports exhaustion.
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/recovery/batches")
                .method("POST")
                .header("content-type", "application/json")
                .body(Body::from(
                    json!({
                        "date_from": "2024-01-01",
                        "date_to": "2024-01-31",
                        "batch_size": 100,
                        "offset": 100,
                    })
                    .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
