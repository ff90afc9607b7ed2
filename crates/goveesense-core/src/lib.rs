//! Polling coordination and snapshot store between `goveesense-api` and
//! host-platform consumers.
//!
//! This crate owns the refresh pipeline for Govee cloud sensors:
//!
//! - **[`Coordinator`]** — One per registered account. Runs the refresh
//!   cycle (device list, per-device state, normalization) and publishes an
//!   immutable [`Snapshot`] by atomic swap, so readers never observe a
//!   half-built result. Concurrent [`refresh()`](Coordinator::refresh)
//!   callers coalesce onto the in-flight cycle — at most one cycle runs
//!   per account at any time.
//!
//! - **[`AccountRegistry`]** — Process-wide map from account id to its
//!   coordinator. [`register()`](AccountRegistry::register) runs the first
//!   refresh to completion (so a bad credential is rejected at setup) and
//!   starts the periodic poll task; [`unregister()`](AccountRegistry::unregister)
//!   cancels it.
//!
//! - **Reading normalization** ([`convert`]) — Pure mapping from the
//!   vendor's nested capability payloads into typed [`Reading`]s. Missing,
//!   null, or malformed values become absent fields, never errors.
//!
//! - **[`CoreError`]** — User-facing error taxonomy. Hard failures (auth,
//!   transport, list-call application errors) abort a cycle and leave the
//!   last good snapshot visible; per-device vendor errors are already
//!   flattened to empty states at the API boundary and never surface here.

pub mod config;
pub mod convert;
pub mod coordinator;
pub mod error;
pub mod model;
pub mod registry;

pub use config::AccountConfig;
pub use coordinator::{Coordinator, RefreshState};
pub use error::CoreError;
pub use model::{Reading, Snapshot};
pub use registry::{AccountRegistry, validate_api_key};
