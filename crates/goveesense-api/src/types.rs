//! Wire types for the Govee Developer Cloud API.
//!
//! All types match the JSON responses from `/router/api/v1/` endpoints.
//! Field names use camelCase via `#[serde(rename_all = "camelCase")]`.
//! Capability values are polymorphic (numbers, booleans), so they are
//! kept as opaque `serde_json::Value` until normalization.

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ── Capability instance names ────────────────────────────────────────

pub const INSTANCE_TEMPERATURE: &str = "sensorTemperature";
pub const INSTANCE_HUMIDITY: &str = "sensorHumidity";
pub const INSTANCE_BATTERY: &str = "battery";
pub const INSTANCE_ONLINE: &str = "online";

/// Capability instances that mark a device as a sensor. Devices whose
/// capability set intersects neither are excluded from list results.
pub const SENSOR_INSTANCES: [&str; 2] = [INSTANCE_TEMPERATURE, INSTANCE_HUMIDITY];

// ── Device list ──────────────────────────────────────────────────────

/// Envelope for `GET /router/api/v1/user/devices`.
#[derive(Debug, Clone, Deserialize)]
pub struct DevicesResponse {
    pub code: i64,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Vec<DeviceEntry>,
}

/// One device from the inventory list.
///
/// `device` is the vendor's unique device id (unique within one list
/// response); `sku` is the hardware model (e.g. `H5179`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceEntry {
    pub device: String,
    pub sku: String,
    #[serde(default)]
    pub device_name: String,
    #[serde(default)]
    pub capabilities: Vec<Capability>,
}

impl DeviceEntry {
    /// Whether any capability instance marks this device as a sensor.
    pub fn is_sensor(&self) -> bool {
        self.capabilities.iter().any(|c| {
            c.instance
                .as_deref()
                .is_some_and(|i| SENSOR_INSTANCES.contains(&i))
        })
    }
}

/// Declared capability on a device descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Capability {
    /// Vendor capability type, e.g. `devices.capabilities.property`.
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub instance: Option<String>,
}

// ── Device state ─────────────────────────────────────────────────────

/// Request body for `POST /router/api/v1/device/state`.
///
/// `request_id` is a fresh random token per call so the vendor can
/// correlate logs — it is not an idempotency key.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StateRequest<'a> {
    pub request_id: String,
    pub payload: StateRequestPayload<'a>,
}

#[derive(Debug, Serialize)]
pub struct StateRequestPayload<'a> {
    pub sku: &'a str,
    pub device: &'a str,
}

/// Envelope for the state endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct StateResponse {
    pub code: i64,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub payload: Option<StatePayload>,
}

/// Raw per-device state: the vendor-shaped capability payload.
///
/// Transient — consumed immediately by the normalizer in the core crate.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct StatePayload {
    #[serde(default)]
    pub capabilities: Vec<CapabilityState>,
}

/// One capability entry inside a state payload.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CapabilityState {
    #[serde(default)]
    pub instance: Option<String>,
    #[serde(default)]
    pub state: CapabilityValue,
}

/// Polymorphic capability value — `Value::Null` when the vendor omits it.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CapabilityValue {
    #[serde(default)]
    pub value: Value,
}
