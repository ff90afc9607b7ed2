//! Async client for the official Govee Developer Cloud API.
//!
//! Two endpoints are covered, both under a fixed base URL
//! ([`DEFAULT_BASE_URL`]) and authenticated with a `Govee-API-Key` header:
//!
//! - `GET /router/api/v1/user/devices` — device inventory, filtered here to
//!   devices exposing at least one sensor capability.
//! - `POST /router/api/v1/device/state` — the current capability state of a
//!   single device.
//!
//! The vendor reports errors two ways: HTTP-level failures and an
//! application-level `code` field inside otherwise successful responses.
//! [`CloudClient`] folds both into the single [`Error`] taxonomy so callers
//! never have to inspect raw status codes or envelopes.

pub mod client;
pub mod error;
pub mod transport;
pub mod types;

pub use client::{CloudClient, DEFAULT_BASE_URL};
pub use error::Error;
pub use transport::TransportConfig;
