// ── Core error types ──
//
// User-facing errors from goveesense-core. Consumers never see raw HTTP
// status codes or JSON parse failures; the `From<goveesense_api::Error>`
// impl translates transport-layer errors into this taxonomy.
//
// `Clone` is required because the last hard failure is retained as
// coordinator state and the same cycle outcome is handed to every
// coalesced refresh caller.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Clone, Error)]
pub enum CoreError {
    /// The vendor rejected the credential. Surfaced at setup time as a
    /// validation failure, at runtime as a persistent failed state until
    /// the account is re-registered with a new key.
    #[error("Invalid API key")]
    InvalidApiKey,

    /// Network-level failure (connection, DNS, timeout). Always fatal to
    /// the current cycle; retried on the next tick.
    #[error("Transport error: {message}")]
    Transport { message: String },

    /// Vendor application error on a hard path (device list call).
    #[error("Govee API error: {message}")]
    Api { message: String },

    /// Invalid account configuration (e.g. malformed base URL).
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// The awaited in-flight cycle went away without publishing a result
    /// (coordinator torn down mid-cycle).
    #[error("Refresh cycle cancelled")]
    Cancelled,
}

impl CoreError {
    /// Returns `true` if the credential itself was rejected.
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::InvalidApiKey)
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<goveesense_api::Error> for CoreError {
    fn from(err: goveesense_api::Error) -> Self {
        match err {
            goveesense_api::Error::InvalidApiKey => CoreError::InvalidApiKey,
            goveesense_api::Error::Transport(e) => CoreError::Transport {
                message: e.to_string(),
            },
            goveesense_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            goveesense_api::Error::Api { code, message } => CoreError::Api {
                message: format!("{message} (code {code})"),
            },
            goveesense_api::Error::Deserialization { message, body: _ } => CoreError::Api {
                message: format!("Unexpected response: {message}"),
            },
        }
    }
}
