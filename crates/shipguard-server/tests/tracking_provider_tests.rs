//! Tracking-provider update-path integration tests
//!
//! The provider-driven push reconciles current tracking data against what
//! was previously mirrored: superseded numbers are cancelled, new ones
//! created, untouched ones left alone.

use std::sync::Arc;

use shipguard_common::types::{
    ATTR_SHIPMENT_API_CALLED, ATTR_TRACKING_NUMBER, ATTR_TRACKING_PROVIDER, FLAG_SUCCESS,
    SETTING_ACTIVE_INTEGRATIONS,
};
use shipguard_server::store::{MemoryOrderStore, OrderStore};
use shipguard_server::tracking::{
    FulfillmentFieldsProvider, OrderNotesProvider, TrackingProvider,
};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

mod common;
use common::{context, jan};

fn note(tracking: &str, courier: &str) -> String {
    format!("Shipping Tracking Number: {tracking}<br/>Carrier Key: {courier}")
}

#[tokio::test]
async fn cancels_dropped_and_creates_new_numbers() {
    let server = MockServer::start().await;
    let store = Arc::new(MemoryOrderStore::new());
    store.seed_order(1, jan(3));
    store.put_setting(SETTING_ACTIVE_INTEGRATIONS, "order-notes");
    store
        .set_attributes(1, &[(ATTR_TRACKING_NUMBER, "A|B".to_string())])
        .await
        .unwrap();
    store.add_note(1, &note("B", "usps"));
    store.add_note(1, &note("C", "usps"));

    // C is new and must be created.
    Mock::given(method("GET"))
        .and(path("/shipments/C"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/shipments/C"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    // A fell out of the notes and must be cancelled.
    Mock::given(method("GET"))
        .and(path("/shipments/A"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/shipments/A/cancel"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    // B is untouched: already stored, so no lookup, create, or cancel.
    Mock::given(method("POST"))
        .and(path("/shipments/B"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/shipments/B/cancel"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let ctx = context(&server, store.clone());
    OrderNotesProvider.apply_update(&ctx, 1).await.unwrap();

    assert_eq!(
        store.get_attribute(1, ATTR_TRACKING_NUMBER).await.unwrap(),
        Some("B|C".to_string())
    );
}

#[tokio::test]
async fn vanished_notes_cancel_everything_stored() {
    let server = MockServer::start().await;
    let store = Arc::new(MemoryOrderStore::new());
    store.seed_order(2, jan(4));
    store.put_setting(SETTING_ACTIVE_INTEGRATIONS, "order-notes");
    store
        .set_attributes(2, &[(ATTR_TRACKING_NUMBER, "A|B".to_string())])
        .await
        .unwrap();

    for tracking in ["A", "B"] {
        Mock::given(method("GET"))
            .and(path(format!("/shipments/{tracking}")))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path(format!("/shipments/{tracking}/cancel")))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;
    }

    let ctx = context(&server, store.clone());
    OrderNotesProvider.apply_update(&ctx, 2).await.unwrap();
}

#[tokio::test]
async fn changed_field_tracking_cancels_previous_before_creating() {
    let server = MockServer::start().await;
    let store = Arc::new(MemoryOrderStore::new());
    store.seed_order(3, jan(5));
    store
        .set_attributes(
            3,
            &[
                ("tracking_code", "NEW-1".to_string()),
                ("carrier_name", "Canada Post".to_string()),
                (ATTR_TRACKING_NUMBER, "OLD-1".to_string()),
            ],
        )
        .await
        .unwrap();

    Mock::given(method("GET"))
        .and(path("/shipments/OLD-1"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/shipments/OLD-1/cancel"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/shipments/NEW-1"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/shipments/NEW-1"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let ctx = context(&server, store.clone());
    FulfillmentFieldsProvider.apply_update(&ctx, 3).await.unwrap();

    assert_eq!(
        store.get_attribute(3, ATTR_TRACKING_NUMBER).await.unwrap(),
        Some("NEW-1".to_string())
    );
    assert_eq!(
        store.get_attribute(3, ATTR_TRACKING_PROVIDER).await.unwrap(),
        Some("canada-post".to_string())
    );
    assert_eq!(
        store.get_attribute(3, ATTR_SHIPMENT_API_CALLED).await.unwrap(),
        Some(FLAG_SUCCESS.to_string())
    );
}

#[tokio::test]
async fn picked_up_order_reports_no_shipping_info() {
    let server = MockServer::start().await;
    let store = Arc::new(MemoryOrderStore::new());
    store.seed_order(4, jan(6));
    store
        .set_attributes(
            4,
            &[
                ("tracking_code", "T-1".to_string()),
                ("carrier_name", "UPS".to_string()),
                ("picked_up", "1".to_string()),
            ],
        )
        .await
        .unwrap();

    let ctx = context(&server, store.clone());
    let info = FulfillmentFieldsProvider
        .shipping_info(ctx.store.as_ref(), 4)
        .await
        .unwrap();
    assert!(info.is_empty());

    FulfillmentFieldsProvider.apply_update(&ctx, 4).await.unwrap();
    assert!(server.received_requests().await.unwrap().is_empty());
}
