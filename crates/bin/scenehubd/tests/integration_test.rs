//! End-to-end smoke tests for the full scenehubd stack.
//!
//! Each test wires the real store, the virtual devices, the scheduler and the
//! axum router, and exercises the HTTP layer via `tower::ServiceExt::oneshot`
//! without binding a TCP port.

use std::path::Path;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use scenehub_adapter_http_axum::router;
use scenehub_adapter_http_axum::state::AppState;
use scenehub_adapter_storage_json::JsonFileStore;
use scenehub_adapter_storage_sqlite_sqlx::{Config, SqliteScenarioStore};
use scenehub_adapter_virtual::VirtualDeviceControl;
use scenehub_app::ports::SystemClock;
use scenehub_app::scheduler::Scheduler;
use scenehub_domain::command::CommandValue;
use serde_json::{Value, json};
use tower::ServiceExt;

/// Router backed by JSON files in `dir` and the given virtual devices.
fn json_app(dir: &Path, devices: Arc<VirtualDeviceControl>) -> axum::Router {
    let scheduler = Scheduler::new(JsonFileStore::new(dir), devices, SystemClock);
    router::build(AppState::new(Arc::new(scheduler)))
}

async fn send(app: &axum::Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => request
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };
    let resp = app.clone().oneshot(request).await.unwrap();
    let status = resp.status();
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

fn pump_scenario(device_id: &str) -> Value {
    json!({
        "name": "Water the garden",
        "description": "Morning watering",
        "intervalHours": 6,
        "durationMinutes": 15,
        "actions": [{
            "deviceId": device_id,
            "deviceName": "Garden pump",
            "commands": [
                {"code": "switch_1", "value": true},
                {"code": "countdown_1", "value": 900}
            ],
            "delayMinutes": 0
        }]
    })
}

// ---------------------------------------------------------------------------
// Health check
// ---------------------------------------------------------------------------

#[tokio::test]
async fn should_return_ok_when_health_check_called() {
    let dir = tempfile::tempdir().unwrap();
    let app = json_app(dir.path(), Arc::default());

    let resp = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
}

// ---------------------------------------------------------------------------
// Scenarios on the JSON store
// ---------------------------------------------------------------------------

#[tokio::test]
async fn should_persist_scenarios_across_restarts() {
    let dir = tempfile::tempdir().unwrap();

    let first = json_app(dir.path(), Arc::default());
    let (status, created) = send(&first, "POST", "/api/scenarios", Some(pump_scenario("virtual_pump"))).await;
    assert_eq!(status, StatusCode::CREATED);

    let raw = std::fs::read_to_string(dir.path().join("scenarios.json")).unwrap();
    let document: Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(document["version"], 1);
    assert_eq!(document["scenarios"][0]["name"], "Water the garden");

    let second = json_app(dir.path(), Arc::default());
    let uri = format!("/api/scenarios/{}", created["id"].as_str().unwrap());
    let (status, loaded) = send(&second, "GET", &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(loaded, created);
}

#[tokio::test]
async fn should_send_commands_to_virtual_device_when_triggered() {
    let dir = tempfile::tempdir().unwrap();
    let devices = Arc::new(VirtualDeviceControl::default());
    let app = json_app(dir.path(), Arc::clone(&devices));

    let (_, created) = send(&app, "POST", "/api/scenarios", Some(pump_scenario("virtual_pump"))).await;
    let uri = format!("/api/scenarios/{}", created["id"].as_str().unwrap());

    let (status, body) = send(&app, "PATCH", &uri, Some(json!({"action": "trigger"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"triggered": true}));

    assert_eq!(
        devices.value("virtual_pump", "switch_1"),
        Some(CommandValue::from(true))
    );
    assert_eq!(
        devices.value("virtual_pump", "countdown_1"),
        Some(CommandValue::from(900))
    );

    let (_, logs) = send(&app, "GET", "/api/scenarios/logs", None).await;
    assert_eq!(logs.as_array().unwrap().len(), 1);
    assert_eq!(logs[0]["scenarioName"], "Water the garden");
    assert_eq!(logs[0]["success"], true);
    assert_eq!(logs[0]["message"], "Success");
    assert!(
        logs[0]["action"]
            .as_str()
            .unwrap()
            .starts_with("Send commands to Garden pump: ")
    );

    let (_, scenario) = send(&app, "GET", &uri, None).await;
    assert!(scenario["lastRun"].is_string());
}

#[tokio::test]
async fn should_log_failure_for_unknown_device() {
    let dir = tempfile::tempdir().unwrap();
    let app = json_app(dir.path(), Arc::default());

    let (_, created) = send(&app, "POST", "/api/scenarios", Some(pump_scenario("nope"))).await;
    let uri = format!("/api/scenarios/{}", created["id"].as_str().unwrap());
    send(&app, "PATCH", &uri, Some(json!({"action": "trigger"}))).await;

    let (_, logs) = send(&app, "GET", "/api/scenarios/logs", None).await;
    assert_eq!(logs[0]["success"], false);
    assert_eq!(logs[0]["message"], "device not found: nope");
}

#[tokio::test]
async fn should_run_overdue_scenario_on_check() {
    let dir = tempfile::tempdir().unwrap();
    let devices = Arc::new(VirtualDeviceControl::default());
    let app = json_app(dir.path(), Arc::clone(&devices));

    let (_, created) = send(&app, "POST", "/api/scenarios", Some(pump_scenario("virtual_pump"))).await;
    let uri = format!("/api/scenarios/{}", created["id"].as_str().unwrap());
    send(
        &app,
        "PUT",
        &uri,
        Some(json!({"nextRun": "2020-01-01T00:00:00.000Z"})),
    )
    .await;

    let (status, body) = send(&app, "POST", "/api/scenarios/check", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["executed"], json!(["Water the garden"]));

    let (_, scenario) = send(&app, "GET", &uri, None).await;
    assert!(scenario["lastRun"].is_string());
    assert!(scenario["nextRun"].as_str().unwrap() > body["checkedAt"].as_str().unwrap());
    assert_eq!(
        devices.value("virtual_pump", "switch_1"),
        Some(CommandValue::from(true))
    );

    let (_, body) = send(&app, "POST", "/api/scenarios/check", None).await;
    assert_eq!(body["executed"], json!([]));
}

#[tokio::test]
async fn should_not_run_disabled_scenario_on_check() {
    let dir = tempfile::tempdir().unwrap();
    let app = json_app(dir.path(), Arc::default());

    let mut scenario = pump_scenario("virtual_pump");
    scenario["enabled"] = json!(false);
    let (_, created) = send(&app, "POST", "/api/scenarios", Some(scenario)).await;
    assert_eq!(created["enabled"], false);
    let uri = format!("/api/scenarios/{}", created["id"].as_str().unwrap());
    send(
        &app,
        "PUT",
        &uri,
        Some(json!({"nextRun": "2020-01-01T00:00:00.000Z"})),
    )
    .await;

    let (_, body) = send(&app, "POST", "/api/scenarios/check", None).await;
    assert_eq!(body["executed"], json!([]));

    let (_, logs) = send(&app, "GET", "/api/scenarios/logs", None).await;
    assert!(logs.as_array().unwrap().is_empty());
}

// ---------------------------------------------------------------------------
// Scenarios on the SQLite store
// ---------------------------------------------------------------------------

#[tokio::test]
async fn should_serve_scenarios_from_sqlite_store() {
    let db = Config {
        database_url: "sqlite::memory:".to_string(),
    }
    .build()
    .await
    .expect("in-memory database should initialise");
    let scheduler = Scheduler::new(
        SqliteScenarioStore::new(db.pool().clone()),
        VirtualDeviceControl::default(),
        SystemClock,
    );
    let app = router::build(AppState::new(Arc::new(scheduler)));

    let (status, created) = send(&app, "POST", "/api/scenarios", Some(pump_scenario("virtual_pump"))).await;
    assert_eq!(status, StatusCode::CREATED);
    let uri = format!("/api/scenarios/{}", created["id"].as_str().unwrap());
    send(&app, "PATCH", &uri, Some(json!({"action": "trigger"}))).await;

    let (status, overview) = send(&app, "GET", "/api/scenarios", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(overview["scenarios"].as_array().unwrap().len(), 1);
    assert_eq!(overview["logs"].as_array().unwrap().len(), 1);

    let (status, _) = send(&app, "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
