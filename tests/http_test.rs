//! End-to-end tests of the HTTP transport against a local mock server.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use pharmacy_client::clients::{CrudResource, ItemClient, PharmacyClient, PurchaseOrderClient};
use pharmacy_client::config::ClientConfig;
use pharmacy_client::framework::{ApiError, ErrorHook, HttpActor, MultipartFile};
use pharmacy_client::lifecycle::PharmacySystem;
use pharmacy_client::model::{LocationCreate, RxQueueFilter, RxStatus};
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config(server: &MockServer) -> ClientConfig {
    ClientConfig::new(format!("{}/api/", server.uri())).with_token("s3cret")
}

fn start(server: &MockServer) -> pharmacy_client::framework::ApiClient {
    let (actor, api) = HttpActor::new(&config(server)).expect("valid config");
    tokio::spawn(actor.run());
    api
}

#[tokio::test]
async fn test_get_sends_auth_and_omits_empty_filters() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/pharmacy/rx-queue"))
        .and(header("authorization", "Bearer s3cret"))
        .and(query_param("location_id", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{"prescription_id": 41, "type": "OPD", "status": "PENDING", "patient_name": "Asha Rao"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = PharmacyClient::new(start(&server));
    let rows = client
        .rx_queue(&RxQueueFilter {
            location_id: Some(2),
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].id, 41);
    assert_eq!(rows[0].status, RxStatus::Pending);

    let received = server.received_requests().await.unwrap();
    assert_eq!(received[0].url.query(), Some("location_id=2"));
}

#[tokio::test]
async fn test_error_envelope_becomes_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/inventory/locations"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "detail": [{"loc": ["body", "code"], "msg": "code must not be blank"}]
        })))
        .mount(&server)
        .await;

    let hook_calls = Arc::new(AtomicUsize::new(0));
    let counter = hook_calls.clone();
    let hook: ErrorHook = Arc::new(move |_e: &ApiError| {
        counter.fetch_add(1, Ordering::SeqCst);
    });
    let system = PharmacySystem::connect_with(config(&server), hook).unwrap();

    let err = system
        .locations
        .create(&LocationCreate {
            code: " ".into(),
            name: "Ward".into(),
            description: None,
        })
        .await
        .unwrap_err();

    assert_eq!(
        err,
        ApiError::Server {
            status: 422,
            message: "code must not be blank".into()
        }
    );
    assert_eq!(hook_calls.load(Ordering::SeqCst), 1);
    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_multipart_upload() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/inventory/items/bulk-upload"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "created": 1, "updated": 0, "errors": ["row 3: unknown unit"]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let items = ItemClient::new(start(&server));
    let result = items
        .bulk_upload(MultipartFile::csv("items.csv", "code,name\nPCM650,Paracetamol 650\n"))
        .await
        .unwrap();
    assert_eq!(result.created, 1);
    assert_eq!(result.errors, vec!["row 3: unknown unit".to_string()]);

    let received = server.received_requests().await.unwrap();
    let content_type = received[0]
        .headers
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(content_type.starts_with("multipart/form-data"));
    let body = String::from_utf8_lossy(&received[0].body);
    assert!(body.contains("name=\"file\"; filename=\"items.csv\""));
    assert!(body.contains("PCM650,Paracetamol 650"));
}

#[tokio::test]
async fn test_download_keeps_type_and_file_name() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/inventory/purchase-orders/7/pdf"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-disposition", "attachment; filename=\"PO-0007.pdf\"")
                .set_body_raw(b"%PDF-1.7 test".to_vec(), "application/pdf"),
        )
        .mount(&server)
        .await;

    let orders = PurchaseOrderClient::new(start(&server));
    let blob = orders.pdf(7).await.unwrap();

    assert_eq!(blob.content_type, "application/pdf");
    assert_eq!(blob.file_name.as_deref(), Some("PO-0007.pdf"));
    assert_eq!(&blob.bytes[..], b"%PDF-1.7 test");

    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join(blob.file_name_or("po.pdf"));
    blob.save(&target).await.unwrap();
    assert_eq!(tokio::fs::read(&target).await.unwrap(), b"%PDF-1.7 test");
}

#[tokio::test]
async fn test_unreachable_server_is_a_transport_error() {
    let (actor, api) = HttpActor::new(&ClientConfig::new("http://127.0.0.1:9")).unwrap();
    tokio::spawn(actor.run());

    let err = PharmacyClient::new(api).get(41).await.unwrap_err();
    assert!(matches!(err, ApiError::Transport(_)));
    assert_eq!(
        err.user_message(),
        "Could not reach the server. Check the connection and try again."
    );
}

#[tokio::test]
async fn test_failed_cancel_action_reaches_user_and_hook() {
    let hook_calls = Arc::new(AtomicUsize::new(0));
    let counter = hook_calls.clone();
    let hook: ErrorHook = Arc::new(move |_e: &ApiError| {
        counter.fetch_add(1, Ordering::SeqCst);
    });
    let system = PharmacySystem::connect_with(ClientConfig::new("http://127.0.0.1:1/api"), hook).unwrap();

    // The URL ends in `/cancel`; that must not read as an aborted request.
    let err = system.pharmacy.cancel(41).await.unwrap_err();
    assert!(matches!(err, ApiError::Transport(_)));
    assert!(!err.is_cancelled());
    assert!(!err.user_message().is_empty());

    let view = system.rx_view(Default::default());
    let err = view.cancel(41).await.unwrap_err();
    assert!(matches!(err, ApiError::Transport(_)));
    assert_eq!(hook_calls.load(Ordering::SeqCst), 2);

    drop(view);
    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_shutdown_stops_transport() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/inventory/locations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let system = PharmacySystem::connect(config(&server)).unwrap();
    let view = system.inventory_view();
    view.locations.refresh().await;
    assert!(view.locations.last_error().is_none());

    let api = system.api.clone();
    drop(view);
    drop(api);
    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_invalid_config_is_refused() {
    let result = PharmacySystem::connect(ClientConfig::new("localhost:8000"));
    assert!(result.is_err());
}
