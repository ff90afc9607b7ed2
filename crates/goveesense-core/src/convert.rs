// ── Reading normalization ──
//
// Pure mapping from the vendor's nested capability payload into a typed
// `Reading`. Unrecognized instances are ignored; null or wrong-typed
// values leave the field absent. Never fails.

use serde_json::Value;

use goveesense_api::types::{
    DeviceEntry, INSTANCE_BATTERY, INSTANCE_HUMIDITY, INSTANCE_ONLINE, INSTANCE_TEMPERATURE,
    StatePayload,
};

use crate::model::Reading;

/// Build a [`Reading`] for one device from its descriptor and raw state.
///
/// Identity fields always come from the descriptor; measurement fields
/// come from whichever capability instances the payload carries. An empty
/// payload (soft-failed state call) yields a reading with every
/// measurement absent.
pub fn reading_from_state(descriptor: &DeviceEntry, state: &StatePayload) -> Reading {
    let mut reading = Reading {
        device_id: descriptor.device.clone(),
        sku: descriptor.sku.clone(),
        name: descriptor.device_name.clone(),
        temperature_c: None,
        humidity_pct: None,
        battery_pct: None,
        online: None,
    };

    for cap in &state.capabilities {
        let value = &cap.state.value;
        match cap.instance.as_deref() {
            // The vendor reports temperature in hundredths of a degree
            // and humidity in hundredths of a percent.
            Some(INSTANCE_TEMPERATURE) => reading.temperature_c = hundredths(value),
            Some(INSTANCE_HUMIDITY) => reading.humidity_pct = hundredths(value),
            Some(INSTANCE_BATTERY) => reading.battery_pct = value.as_i64(),
            Some(INSTANCE_ONLINE) => reading.online = value.as_bool(),
            _ => {}
        }
    }

    reading
}

/// Scale a raw hundredths value to one decimal place.
fn hundredths(value: &Value) -> Option<f64> {
    value.as_f64().map(|raw| (raw / 10.0).round() / 10.0)
}
