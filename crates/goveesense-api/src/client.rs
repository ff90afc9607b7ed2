// Hand-crafted async HTTP client for the Govee Developer Cloud API.
//
// Base URL: https://openapi.api.govee.com
// Auth: Govee-API-Key header

use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;
use uuid::Uuid;

use crate::Error;
use crate::transport::TransportConfig;
use crate::types::{
    DeviceEntry, DevicesResponse, StatePayload, StateRequest, StateRequestPayload, StateResponse,
};

/// Production endpoint of the official Govee Developer API.
pub const DEFAULT_BASE_URL: &str = "https://openapi.api.govee.com";

const DEVICES_PATH: &str = "router/api/v1/user/devices";
const DEVICE_STATE_PATH: &str = "router/api/v1/device/state";

/// Vendor application code that means success.
const CODE_OK: i64 = 200;

/// Async client for the Govee Developer Cloud API.
///
/// Stateless beyond the configured credential and base URL: no caching,
/// no session. One instance is owned by exactly one refresh coordinator.
pub struct CloudClient {
    http: reqwest::Client,
    base_url: Url,
}

impl CloudClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build from an API key and transport config.
    ///
    /// Injects `Govee-API-Key` as a sensitive default header on every
    /// request. `base_url` is [`DEFAULT_BASE_URL`] in production; tests
    /// point it at a mock server.
    pub fn from_api_key(
        base_url: &str,
        api_key: &secrecy::SecretString,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let mut headers = HeaderMap::new();
        let mut key_value =
            HeaderValue::from_str(api_key.expose_secret()).map_err(|_| Error::InvalidApiKey)?;
        key_value.set_sensitive(true);
        headers.insert("Govee-API-Key", key_value);

        let http = transport.build_client_with_headers(headers)?;
        let base_url = Self::normalize_base_url(base_url)?;

        Ok(Self { http, base_url })
    }

    /// Ensure the base URL ends with a slash so relative joins work.
    fn normalize_base_url(raw: &str) -> Result<Url, Error> {
        let mut url = Url::parse(raw)?;
        let path = url.path().trim_end_matches('/').to_owned();
        url.set_path(&format!("{path}/"));
        Ok(url)
    }

    fn url(&self, path: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(path)?)
    }

    // ── Public API ───────────────────────────────────────────────────

    /// List devices that expose at least one sensor capability.
    ///
    /// Non-sensor devices (lights, plugs, ...) are filtered out. Any
    /// failure here is hard: auth rejection, transport failure, or a
    /// non-success vendor code all abort the caller's refresh cycle.
    pub async fn list_devices(&self) -> Result<Vec<DeviceEntry>, Error> {
        let url = self.url(DEVICES_PATH)?;
        debug!("GET {url}");

        let resp = self.http.get(url).send().await?;
        let envelope: DevicesResponse = Self::handle_response(resp).await?;

        if envelope.code != CODE_OK {
            return Err(Error::Api {
                code: envelope.code,
                message: envelope
                    .message
                    .unwrap_or_else(|| format!("vendor code {}", envelope.code)),
            });
        }

        let total = envelope.data.len();
        let sensors: Vec<DeviceEntry> = envelope
            .data
            .into_iter()
            .filter(DeviceEntry::is_sensor)
            .collect();
        debug!(total, sensors = sensors.len(), "device list fetched");

        Ok(sensors)
    }

    /// Fetch the current capability state of one device.
    ///
    /// Each call carries a fresh random `requestId` for vendor-side log
    /// correlation; a new one is generated even when retrying.
    ///
    /// A non-success vendor code degrades to an empty payload (per-device
    /// soft failure, logged here); transport failures propagate.
    pub async fn get_device_state(&self, sku: &str, device: &str) -> Result<StatePayload, Error> {
        let url = self.url(DEVICE_STATE_PATH)?;
        let body = StateRequest {
            request_id: Uuid::new_v4().to_string(),
            payload: StateRequestPayload { sku, device },
        };
        debug!(%device, request_id = %body.request_id, "POST {url}");

        let resp = self.http.post(url).json(&body).send().await?;
        let envelope: StateResponse = Self::handle_response(resp).await?;

        if envelope.code != CODE_OK {
            warn!(
                %device,
                code = envelope.code,
                message = envelope.message.as_deref().unwrap_or(""),
                "device state fetch rejected by vendor; returning empty state"
            );
            return Ok(StatePayload::default());
        }

        Ok(envelope.payload.unwrap_or_default())
    }

    // ── Response handling ────────────────────────────────────────────

    async fn handle_response<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, Error> {
        let status = resp.status();
        if status.is_success() {
            let body = resp.text().await?;
            serde_json::from_str(&body).map_err(|e| {
                let preview: String = body.chars().take(200).collect();
                Error::Deserialization {
                    message: format!("{e} (body preview: {preview:?})"),
                    body,
                }
            })
        } else {
            Err(Self::parse_error(status, resp).await)
        }
    }

    async fn parse_error(status: reqwest::StatusCode, resp: reqwest::Response) -> Error {
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Error::InvalidApiKey;
        }

        let raw = resp.text().await.unwrap_or_default();
        Error::Api {
            code: i64::from(status.as_u16()),
            message: if raw.is_empty() {
                status.to_string()
            } else {
                raw
            },
        }
    }
}
