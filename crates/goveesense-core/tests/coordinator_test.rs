#![allow(clippy::unwrap_used)]
// Integration tests for the refresh coordinator and account registry,
// driven against a wiremock vendor API.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use goveesense_api::{CloudClient, TransportConfig};
use goveesense_core::{
    AccountConfig, AccountRegistry, Coordinator, CoreError, validate_api_key,
};

// ── Helpers ─────────────────────────────────────────────────────────

const LIST_PATH: &str = "/router/api/v1/user/devices";
const STATE_PATH: &str = "/router/api/v1/device/state";

fn config(server: &MockServer) -> AccountConfig {
    AccountConfig {
        base_url: server.uri().parse().unwrap(),
        ..AccountConfig::new("test-api-key".to_string().into())
    }
}

fn coordinator(server: &MockServer) -> Coordinator {
    let cfg = config(server);
    let client =
        CloudClient::from_api_key(cfg.base_url.as_str(), &cfg.api_key, &TransportConfig::default())
            .unwrap();
    Coordinator::new(client)
}

fn descriptor(id: &str, name: &str) -> serde_json::Value {
    json!({
        "device": id,
        "sku": "H5179",
        "deviceName": name,
        "capabilities": [
            { "type": "devices.capabilities.property", "instance": "sensorTemperature" },
            { "type": "devices.capabilities.property", "instance": "sensorHumidity" }
        ]
    })
}

fn device_list(devices: &[serde_json::Value]) -> serde_json::Value {
    json!({ "code": 200, "message": "success", "data": devices })
}

fn full_state(temperature: i64, humidity: i64, battery: i64) -> serde_json::Value {
    json!({
        "code": 200,
        "payload": {
            "capabilities": [
                { "instance": "sensorTemperature", "state": { "value": temperature } },
                { "instance": "sensorHumidity", "state": { "value": humidity } },
                { "instance": "battery", "state": { "value": battery } },
                { "instance": "online", "state": { "value": true } }
            ]
        }
    })
}

/// Mount a state response for one specific device id.
async fn mount_state(server: &MockServer, device: &str, body: serde_json::Value) {
    Mock::given(method("POST"))
        .and(path(STATE_PATH))
        .and(body_partial_json(json!({ "payload": { "device": device } })))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

// ── End-to-end registry flow ────────────────────────────────────────

#[tokio::test]
async fn test_register_produces_snapshot_and_unregister_discards() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(LIST_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(device_list(&[
            descriptor("dev1", "Office"),
            descriptor("dev2", "Cellar"),
        ])))
        .mount(&server)
        .await;
    mount_state(&server, "dev1", full_state(2345, 5510, 87)).await;
    mount_state(&server, "dev2", full_state(2050, 4060, 64)).await;

    let registry = AccountRegistry::new();
    let coordinator = registry.register("acct", &config(&server)).await.unwrap();

    // First refresh already completed — snapshot is immediately available.
    let snapshot = coordinator.latest_snapshot().unwrap();
    assert_eq!(snapshot.readings.len(), 2);

    // Order follows the list response.
    assert_eq!(snapshot.readings[0].device_id, "dev1");
    assert_eq!(snapshot.readings[1].device_id, "dev2");

    let office = snapshot.reading("dev1").unwrap();
    assert_eq!(office.name, "Office");
    assert_eq!(office.temperature_c, Some(23.5));
    assert_eq!(office.humidity_pct, Some(55.1));
    assert_eq!(office.battery_pct, Some(87));
    assert_eq!(office.online, Some(true));

    let cellar = snapshot.reading("dev2").unwrap();
    assert_eq!(cellar.temperature_c, Some(20.5));
    assert_eq!(cellar.humidity_pct, Some(40.6));

    assert!(registry.get("acct").is_some());
    assert!(coordinator.last_error().is_none());

    registry.unregister("acct");
    assert!(registry.get("acct").is_none());
    assert!(registry.is_empty());
}

#[tokio::test]
async fn test_unregister_stops_periodic_polling() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(LIST_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(device_list(&[])))
        .mount(&server)
        .await;

    let registry = AccountRegistry::new();
    let cfg = AccountConfig {
        poll_interval: Duration::from_millis(50),
        ..config(&server)
    };
    registry.register("acct", &cfg).await.unwrap();

    // Let a few periodic cycles run.
    tokio::time::sleep(Duration::from_millis(200)).await;
    let polled = server.received_requests().await.unwrap().len();
    assert!(polled >= 2, "expected periodic cycles, saw {polled} requests");

    registry.unregister("acct");
    tokio::time::sleep(Duration::from_millis(250)).await;

    let after = server.received_requests().await.unwrap().len();
    // Allow one cycle that was already in flight at cancellation.
    assert!(
        after <= polled + 1,
        "polling continued after unregister: {polled} -> {after}"
    );
}

#[tokio::test]
async fn test_register_rejects_bad_credential() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(LIST_PATH))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let registry = AccountRegistry::new();
    let result = registry.register("acct", &config(&server)).await;

    assert!(
        matches!(result, Err(CoreError::InvalidApiKey)),
        "expected InvalidApiKey, got: {result:?}"
    );
    assert!(registry.get("acct").is_none());
    assert!(registry.is_empty());
}

// ── Cycle semantics ─────────────────────────────────────────────────

#[tokio::test]
async fn test_soft_failure_degrades_single_device() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(LIST_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(device_list(&[
            descriptor("dev1", "One"),
            descriptor("dev2", "Two"),
            descriptor("dev3", "Three"),
        ])))
        .mount(&server)
        .await;
    mount_state(&server, "dev1", full_state(2100, 5000, 90)).await;
    mount_state(
        &server,
        "dev2",
        json!({ "code": 400, "message": "device offline" }),
    )
    .await;
    mount_state(&server, "dev3", full_state(1900, 6000, 70)).await;

    let coordinator = coordinator(&server);
    let snapshot = coordinator.refresh().await.unwrap();

    // The cycle still succeeds with exactly one reading per device.
    assert_eq!(snapshot.readings.len(), 3);
    assert!(coordinator.last_error().is_none());

    let degraded = snapshot.reading("dev2").unwrap();
    assert_eq!(degraded.name, "Two");
    assert_eq!(degraded.temperature_c, None);
    assert_eq!(degraded.humidity_pct, None);
    assert_eq!(degraded.battery_pct, None);
    assert_eq!(degraded.online, None);

    assert_eq!(snapshot.reading("dev1").unwrap().temperature_c, Some(21.0));
    assert_eq!(snapshot.reading("dev3").unwrap().temperature_c, Some(19.0));
}

#[tokio::test]
async fn test_hard_failure_keeps_stale_snapshot_then_success_replaces_it() {
    let server = MockServer::start().await;

    // First cycle succeeds.
    {
        let _list = Mock::given(method("GET"))
            .and(path(LIST_PATH))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(device_list(&[descriptor("dev1", "Office")])),
            )
            .mount_as_scoped(&server)
            .await;
        let _state = Mock::given(method("POST"))
            .and(path(STATE_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(full_state(2345, 5510, 87)))
            .mount_as_scoped(&server)
            .await;

        let coordinator = coordinator(&server);
        let first = coordinator.refresh().await.unwrap();
        assert_eq!(first.readings.len(), 1);

        // Second cycle: list call hard-fails.
        drop(_list);
        let _failing = Mock::given(method("GET"))
            .and(path(LIST_PATH))
            .respond_with(ResponseTemplate::new(500).set_body_string("internal error"))
            .mount_as_scoped(&server)
            .await;

        let err = coordinator.refresh().await.unwrap_err();
        assert!(matches!(err, CoreError::Api { .. }), "got: {err:?}");
        assert!(coordinator.last_error().is_some());

        // Stale snapshot is still the one from the first cycle.
        let stale = coordinator.latest_snapshot().unwrap();
        assert!(Arc::ptr_eq(&stale, &first));

        // Third cycle: success again — error cleared, snapshot wholesale
        // replaced with the new device set (no merge with the old one).
        drop(_failing);
        let _recovered = Mock::given(method("GET"))
            .and(path(LIST_PATH))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(device_list(&[descriptor("dev9", "Attic")])),
            )
            .mount_as_scoped(&server)
            .await;

        let replaced = coordinator.refresh().await.unwrap();
        assert!(coordinator.last_error().is_none());
        assert_eq!(replaced.readings.len(), 1);
        assert_eq!(replaced.readings[0].device_id, "dev9");
        assert!(replaced.reading("dev1").is_none());
        assert!(!Arc::ptr_eq(&replaced, &first));
    }
}

#[tokio::test]
async fn test_concurrent_refresh_coalesces_onto_one_cycle() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(LIST_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(device_list(&[]))
                .set_delay(Duration::from_millis(200)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let coordinator = coordinator(&server);
    let (a, b) = tokio::join!(coordinator.refresh(), coordinator.refresh());

    let a = a.unwrap();
    let b = b.unwrap();
    assert!(
        Arc::ptr_eq(&a, &b),
        "both callers must observe the same snapshot"
    );
    // expect(1) on the mock verifies only one list call was issued.
}

#[tokio::test]
async fn test_transport_failure_on_state_call_is_hard() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(LIST_PATH))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(device_list(&[descriptor("dev1", "One")])),
        )
        .mount(&server)
        .await;
    // No state mock mounted: wiremock answers 404, which the client does
    // not soften — only vendor envelope codes are soft.

    let coordinator = coordinator(&server);
    let err = coordinator.refresh().await.unwrap_err();

    assert!(matches!(err, CoreError::Api { .. }), "got: {err:?}");
    assert!(coordinator.latest_snapshot().is_none());
    assert!(coordinator.last_error().is_some());
}

// ── Credential validation ───────────────────────────────────────────

#[tokio::test]
async fn test_validate_api_key_returns_sensor_count() {
    let server = MockServer::start().await;

    let light = json!({
        "device": "CC:DD",
        "sku": "H6159",
        "deviceName": "Strip light",
        "capabilities": [{ "type": "devices.capabilities.color_setting", "instance": "colorRgb" }]
    });

    Mock::given(method("GET"))
        .and(path(LIST_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(device_list(&[
            descriptor("dev1", "Office"),
            light,
            descriptor("dev2", "Cellar"),
        ])))
        .mount(&server)
        .await;

    let count = validate_api_key(&config(&server)).await.unwrap();
    assert_eq!(count, 2);
}

#[tokio::test]
async fn test_validate_api_key_surfaces_auth_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(LIST_PATH))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let err = validate_api_key(&config(&server)).await.unwrap_err();
    assert!(err.is_auth(), "got: {err:?}");
}
