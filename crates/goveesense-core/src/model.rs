//! Domain model: typed readings and point-in-time snapshots.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Normalized sensor readings for one device.
///
/// `device_id`, `sku`, and `name` always come from the device descriptor.
/// Every measurement field is absent (not an error, not zero) when the
/// corresponding capability was missing, null, or the device's state call
/// soft-failed. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reading {
    pub device_id: String,
    pub sku: String,
    pub name: String,
    /// Degrees Celsius, one decimal.
    pub temperature_c: Option<f64>,
    /// Relative humidity percent, one decimal.
    pub humidity_pct: Option<f64>,
    /// Battery charge percent.
    pub battery_pct: Option<i64>,
    pub online: Option<bool>,
}

/// All readings produced by one successful refresh cycle.
///
/// Ordered as the vendor's device list ordered them, captured at a single
/// point in time. A new cycle produces a wholly new snapshot that replaces
/// the old one atomically — never a field-level merge.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub taken_at: DateTime<Utc>,
    pub readings: Vec<Reading>,
}

impl Snapshot {
    /// Look up a reading by device id.
    pub fn reading(&self, device_id: &str) -> Option<&Reading> {
        self.readings.iter().find(|r| r.device_id == device_id)
    }
}
