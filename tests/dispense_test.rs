use std::sync::Arc;

use pharmacy_client::clients::PharmacyClient;
use pharmacy_client::dispense::{BatchCache, DispenseError, DispenseQueue, DispenseSession, PatientCache};
use pharmacy_client::framework::mock::MockTransport;
use pharmacy_client::framework::{ApiError, KeyedCache};
use pharmacy_client::model::{RxQueueFilter, RxStatus, RxType};
use serde_json::{json, Value};

const RX_PATH: &str = "/pharmacy/prescriptions/41";
const PICK_PATH: &str = "/pharmacy/batches/pick";

fn prescription(status: &str, dispensed_qty: f64) -> Value {
    json!({
        "id": 41,
        "type": "OPD",
        "status": status,
        "patient_id": 9,
        "lines": [{
            "id": 1,
            "item_id": 5,
            "item_name": "Amoxicillin 500",
            "frequency": "1-0-1",
            "duration_days": 5,
            "requested_qty": 10,
            "dispensed_qty": dispensed_qty
        }]
    })
}

fn batch(batch_id: u64, available_qty: f64) -> Value {
    json!({
        "batch_id": batch_id,
        "batch_no": format!("B-{batch_id}"),
        "item_id": 5,
        "expiry_date": "2027-03-31",
        "available_qty": available_qty
    })
}

fn batch_cache() -> Arc<BatchCache> {
    Arc::new(KeyedCache::new("batches"))
}

async fn open(mock: &MockTransport, batches: Arc<BatchCache>) -> DispenseSession {
    DispenseSession::open(PharmacyClient::new(mock.client()), batches, 20, 41, 2)
        .await
        .expect("Failed to open dispense session")
}

fn count_method(mock: &MockTransport, method: &str) -> usize {
    mock.requests().iter().filter(|call| call.method() == method).count()
}

#[tokio::test]
async fn test_open_preselects_batch_and_suggests_quantity() {
    let mut mock = MockTransport::new();
    mock.expect_get(RX_PATH).return_json(prescription("PARTIAL", 4.0));
    mock.expect_get(PICK_PATH)
        .return_json(json!([batch(7, 2.0), batch(8, 40.0)]));

    let mut session = open(&mock, batch_cache()).await;

    let line = session.line(1).expect("line 1");
    assert_eq!(line.remaining, 6.0);
    assert_eq!(line.dispense_qty, 6.0);
    assert_eq!(line.batch_id, Some(8));
    assert_eq!(line.suggested_qty(), Some(10));

    assert_eq!(session.apply_suggestion(1).unwrap(), Some(10.0));
    assert_eq!(session.line(1).unwrap().dispense_qty, 10.0);

    let requests = mock.requests();
    let query = requests[1].query().expect("batch query");
    assert_eq!(query.get("location_id"), Some("2"));
    assert_eq!(query.get("item_id"), Some("5"));
    assert_eq!(query.get("limit"), Some("20"));
    mock.verify();
}

#[tokio::test]
async fn test_missing_batch_is_rejected_before_sending() {
    let mut mock = MockTransport::new();
    mock.expect_get(RX_PATH).return_json(prescription("PENDING", 0.0));
    mock.expect_get(PICK_PATH).return_json(json!([]));

    let mut session = open(&mock, batch_cache()).await;
    assert_eq!(session.line(1).unwrap().batch_id, None);

    let err = session.submit(true, RxType::Opd).await.unwrap_err();
    assert_eq!(
        err,
        DispenseError::MissingBatch {
            medicine: "Amoxicillin 500".into()
        }
    );
    assert_eq!(err.user_message(), "Select a batch for Amoxicillin 500");
    assert!(err.is_client_side());
    assert_eq!(count_method(&mock, "POST"), 0);
    mock.verify();
}

#[tokio::test]
async fn test_zero_quantities_leave_nothing_to_dispense() {
    let mut mock = MockTransport::new();
    mock.expect_get(RX_PATH).return_json(prescription("PENDING", 0.0));
    mock.expect_get(PICK_PATH).return_json(json!([batch(8, 40.0)]));

    let mut session = open(&mock, batch_cache()).await;
    session.set_quantity(1, 0.0).unwrap();

    let err = session.submit(false, RxType::Opd).await.unwrap_err();
    assert_eq!(err, DispenseError::NothingToDispense);
    assert_eq!(mock.requests().len(), 2);
}

#[tokio::test]
async fn test_invalid_edits_are_refused() {
    let mut mock = MockTransport::new();
    mock.expect_get(RX_PATH).return_json(prescription("PENDING", 0.0));
    mock.expect_get(PICK_PATH).return_json(json!([batch(8, 40.0)]));

    let mut session = open(&mock, batch_cache()).await;

    assert!(matches!(
        session.set_quantity(1, -1.0),
        Err(DispenseError::InvalidQuantity { .. })
    ));
    assert!(matches!(
        session.set_quantity(1, f64::NAN),
        Err(DispenseError::InvalidQuantity { .. })
    ));
    assert_eq!(
        session.select_batch(1, 999),
        Err(DispenseError::UnknownBatch {
            medicine: "Amoxicillin 500".into(),
            batch_id: 999
        })
    );
    assert_eq!(session.set_quantity(77, 1.0), Err(DispenseError::UnknownLine(77)));
    assert_eq!(session.line(1).unwrap().dispense_qty, 10.0);
}

#[tokio::test]
async fn test_vanished_batch_blocks_submit() {
    let mut mock = MockTransport::new();
    mock.expect_get(RX_PATH).return_json(prescription("PENDING", 0.0));
    mock.expect_get(PICK_PATH).return_json(json!([batch(8, 40.0)]));
    // Re-check before sending: batch 8 has been used up elsewhere.
    mock.expect_get(PICK_PATH).return_json(json!([batch(9, 15.0)]));

    let mut session = open(&mock, batch_cache()).await;
    let err = session.submit(true, RxType::Opd).await.unwrap_err();

    assert_eq!(
        err,
        DispenseError::BatchUnavailable {
            medicine: "Amoxicillin 500".into(),
            batch_no: "B-8".into()
        }
    );
    assert!(err.user_message().contains("Amoxicillin 500"));

    let line = session.line(1).unwrap();
    assert_eq!(line.batch_id, None);
    assert_eq!(line.batch_options.len(), 1);
    assert_eq!(line.batch_options[0].batch_id, 9);
    assert_eq!(count_method(&mock, "POST"), 0);
    mock.verify();
}

#[tokio::test]
async fn test_successful_dispense_posts_and_reloads() {
    let batches = batch_cache();
    let mut mock = MockTransport::new();
    mock.expect_get(RX_PATH).return_json(prescription("PARTIAL", 4.0));
    mock.expect_get(PICK_PATH).return_json(json!([batch(8, 40.0)]));
    mock.expect_get(PICK_PATH).return_json(json!([batch(8, 40.0)]));
    mock.expect_post(format!("{RX_PATH}/dispense"))
        .return_json(json!({"status": "DISPENSED", "sale_id": 501}));
    mock.expect_get(RX_PATH).return_json(prescription("DISPENSED", 10.0));

    let mut session = open(&mock, batches.clone()).await;
    assert!(batches.get(&(2, 5)).is_some());

    let outcome = session.submit(true, RxType::Opd).await.unwrap();
    assert_eq!(outcome.status, Some(RxStatus::Dispensed));
    assert_eq!(outcome.sale_id, Some(501));

    let requests = mock.requests();
    let post = requests
        .iter()
        .find(|call| call.method() == "POST")
        .expect("dispense request");
    assert_eq!(
        post.body(),
        Some(&json!({
            "lines": [{"line_id": 1, "dispense_qty": 6.0, "batch_id": 8}],
            "location_id": 2,
            "create_sale": true,
            "context_type": "OPD"
        }))
    );

    // Nothing is owed after the reload, so no batches are fetched and the stale entry is gone.
    assert_eq!(session.prescription().status, RxStatus::Dispensed);
    assert_eq!(session.line(1).unwrap().remaining, 0.0);
    assert!(batches.get(&(2, 5)).is_none());
    mock.verify();
}

#[tokio::test]
async fn test_server_rejection_surfaces_message() {
    let mut mock = MockTransport::new();
    mock.expect_get(RX_PATH).return_json(prescription("PENDING", 0.0));
    mock.expect_get(PICK_PATH).return_json(json!([batch(8, 40.0)]));
    mock.expect_get(PICK_PATH).return_json(json!([batch(8, 40.0)]));
    mock.expect_post(format!("{RX_PATH}/dispense"))
        .return_status(409, json!({"detail": "Insufficient stock in batch B-8"}));

    let mut session = open(&mock, batch_cache()).await;
    let err = session.submit(false, RxType::Opd).await.unwrap_err();

    assert!(!err.is_client_side());
    assert_eq!(err.user_message(), "Insufficient stock in batch B-8");
    assert!(matches!(err, DispenseError::Api(ApiError::Server { status: 409, .. })));
    mock.verify();
}

#[tokio::test]
async fn test_cancelled_prescription_is_not_dispensable() {
    let mut mock = MockTransport::new();
    mock.expect_get(RX_PATH).return_json(prescription("CANCELLED", 0.0));
    mock.expect_get(PICK_PATH).return_json(json!([batch(8, 40.0)]));

    let mut session = open(&mock, batch_cache()).await;
    let err = session.submit(true, RxType::Opd).await.unwrap_err();

    assert_eq!(err, DispenseError::NotDispensable(RxStatus::Cancelled));
    assert_eq!(mock.requests().len(), 2);
}

#[tokio::test]
async fn test_cached_batches_are_reused_between_sessions() {
    let batches = batch_cache();
    let mut mock = MockTransport::new();
    mock.expect_get(RX_PATH).return_json(prescription("PENDING", 0.0));
    mock.expect_get(PICK_PATH).return_json(json!([batch(8, 40.0)]));
    mock.expect_get(RX_PATH).return_json(prescription("PENDING", 0.0));

    let first = open(&mock, batches.clone()).await;
    let second = open(&mock, batches).await;

    assert_eq!(first.lines(), second.lines());
    assert_eq!(mock.requests().len(), 3);
    mock.verify();
}

// =============================================================================
// QUEUE
// =============================================================================

fn queue(mock: &MockTransport, patients: Arc<PatientCache>) -> DispenseQueue {
    DispenseQueue::new(
        PharmacyClient::new(mock.client()),
        patients,
        batch_cache(),
        20,
        RxQueueFilter {
            location_id: Some(2),
            ..Default::default()
        },
    )
}

#[tokio::test]
async fn test_queue_resolves_patient_labels() {
    let patients: Arc<PatientCache> = Arc::new(KeyedCache::new("patients"));
    let mut mock = MockTransport::new();
    mock.expect_get("/pharmacy/rx-queue").return_json(json!([
        {"id": 41, "type": "OPD", "status": "PENDING", "patient_id": 3, "patient_name": "Asha Rao"},
        {"id": 42, "type": "OPD", "status": "PENDING", "patient_id": 9},
        {"id": 43, "type": "COUNTER", "status": "PENDING"},
        {"id": 44, "type": "IPD", "status": "PARTIAL", "patient_id": 12},
        {"id": 45, "type": "OPD", "status": "PENDING", "patient_id": 9}
    ]));
    mock.expect_get("/patients/9")
        .return_json(json!({"id": 9, "first_name": "Meera", "last_name": "Iyer"}));
    mock.expect_get("/patients/12")
        .return_status(404, json!({"detail": "Patient not found"}));

    let queue = queue(&mock, patients.clone());
    let entries = queue.refresh().await.unwrap();

    let labels: Vec<_> = entries.iter().map(|e| e.patient_label.as_str()).collect();
    assert_eq!(
        labels,
        vec!["Asha Rao", "Meera Iyer", "Walk-in", "Patient #12", "Meera Iyer"]
    );
    assert_eq!(patients.get(&9).as_deref(), Some("Meera Iyer"));
    assert!(patients.get(&12).is_none());

    let query = mock.requests()[0].query().cloned().unwrap();
    assert_eq!(query.get("location_id"), Some("2"));
    assert!(!query.contains("status"));
    mock.verify();
}

#[tokio::test]
async fn test_queue_refresh_failure_keeps_rows() {
    let mut mock = MockTransport::new();
    mock.expect_get("/pharmacy/rx-queue").return_json(json!([
        {"id": 43, "type": "COUNTER", "status": "PENDING"}
    ]));
    mock.expect_get("/pharmacy/rx-queue")
        .return_status(500, json!({"error": "database unavailable"}));

    let queue = queue(&mock, Arc::new(KeyedCache::new("patients")));
    assert_eq!(queue.refresh().await.unwrap().len(), 1);

    let err = queue.refresh().await.unwrap_err();
    assert_eq!(err.user_message(), "database unavailable");
    assert_eq!(queue.rows().items().len(), 1);
    assert!(!queue.is_loading());
}

#[tokio::test]
async fn test_queue_dispense_reloads_rows() {
    let mut mock = MockTransport::new();
    mock.expect_get(RX_PATH).return_json(prescription("PENDING", 0.0));
    mock.expect_get(PICK_PATH).return_json(json!([batch(8, 40.0)]));
    mock.expect_get(PICK_PATH).return_json(json!([batch(8, 40.0)]));
    mock.expect_post(format!("{RX_PATH}/dispense")).return_json(json!({"status": "DISPENSED"}));
    mock.expect_get(RX_PATH).return_json(prescription("DISPENSED", 10.0));
    mock.expect_get("/pharmacy/rx-queue").return_json(json!([]));

    let queue = queue(&mock, Arc::new(KeyedCache::new("patients")));
    let mut session = queue.open(41, 2).await.unwrap();
    queue.dispense(&mut session, false, RxType::Opd).await.unwrap();

    assert!(queue.rows().items().is_empty());
    mock.verify();
}
