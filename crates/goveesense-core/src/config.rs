// ── Per-account runtime configuration ──
//
// Describes *how* to poll one Govee account. Carries the credential and
// tuning, but never touches disk — the host's setup layer constructs an
// `AccountConfig` and hands it in.

use std::time::Duration;

use secrecy::SecretString;
use url::Url;

use goveesense_api::DEFAULT_BASE_URL;

/// Default poll interval: 5 minutes.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(300);

/// Configuration for polling a single account.
#[derive(Debug, Clone)]
pub struct AccountConfig {
    /// Govee Developer API key. Immutable once the account is registered;
    /// replacing it requires re-registration.
    pub api_key: SecretString,
    /// API base URL. Only overridden in tests.
    pub base_url: Url,
    /// HTTP request timeout.
    pub timeout: Duration,
    /// How often to run a refresh cycle.
    pub poll_interval: Duration,
}

impl AccountConfig {
    /// Config with production defaults for the given API key.
    pub fn new(api_key: SecretString) -> Self {
        Self {
            api_key,
            ..Self::default()
        }
    }
}

impl Default for AccountConfig {
    fn default() -> Self {
        Self {
            api_key: SecretString::from(String::new()),
            base_url: Url::parse(DEFAULT_BASE_URL).expect("default base URL is valid"),
            timeout: Duration::from_secs(30),
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}
