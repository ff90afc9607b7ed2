// ── Account registry ──
//
// Process-wide mapping from account id to its refresh coordinator.
// Registration runs the first refresh to completion (bad credentials are
// rejected before anything is stored) and starts the per-account poll
// task; unregistration cancels it. Accounts share no mutable state, so a
// slow cycle on one account never blocks another.

use std::time::Duration;

use dashmap::DashMap;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use goveesense_api::{CloudClient, TransportConfig};

use crate::config::AccountConfig;
use crate::coordinator::Coordinator;
use crate::error::CoreError;

/// Registry of live polling accounts.
#[derive(Default)]
pub struct AccountRegistry {
    accounts: DashMap<String, AccountEntry>,
}

struct AccountEntry {
    coordinator: Coordinator,
    cancel: CancellationToken,
    // Kept so a dropped registry doesn't leave the task unreachable;
    // the cancel token is what actually stops it.
    #[allow(dead_code)]
    task: JoinHandle<()>,
}

impl AccountRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an account and start polling it.
    ///
    /// The first refresh runs to completion before this returns, so a
    /// hard failure (bad key, unreachable vendor) propagates and the
    /// account is not stored. Re-registering a live id tears down the
    /// previous entry first.
    pub async fn register(
        &self,
        account_id: impl Into<String>,
        config: &AccountConfig,
    ) -> Result<Coordinator, CoreError> {
        let account_id = account_id.into();

        let client = build_client(config)?;
        let coordinator = Coordinator::new(client);

        coordinator.refresh().await?;

        let cancel = CancellationToken::new();
        let task = tokio::spawn(refresh_task(
            coordinator.clone(),
            config.poll_interval,
            cancel.clone(),
        ));

        // Replace any previous registration for this id.
        self.unregister(&account_id);
        self.accounts.insert(
            account_id,
            AccountEntry {
                coordinator: coordinator.clone(),
                cancel,
                task,
            },
        );

        Ok(coordinator)
    }

    /// Stop polling an account and discard its coordinator.
    ///
    /// No-op when the id is not registered. An in-flight cycle may still
    /// complete; its result is simply discarded with the coordinator.
    pub fn unregister(&self, account_id: &str) {
        if let Some((_, entry)) = self.accounts.remove(account_id) {
            entry.cancel.cancel();
            debug!(account_id, "account unregistered");
        }
    }

    /// Look up the coordinator for a registered account.
    pub fn get(&self, account_id: &str) -> Option<Coordinator> {
        self.accounts.get(account_id).map(|e| e.coordinator.clone())
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}

impl Drop for AccountRegistry {
    fn drop(&mut self) {
        for entry in self.accounts.iter() {
            entry.cancel.cancel();
        }
    }
}

// ── Credential validation ────────────────────────────────────────────

/// Validate an API key by listing devices with a one-shot client.
///
/// Returns the number of sensor devices on success. The setup layer maps
/// [`CoreError::InvalidApiKey`] to "invalid credential" and every other
/// hard failure to "unknown error".
pub async fn validate_api_key(config: &AccountConfig) -> Result<usize, CoreError> {
    let client = build_client(config)?;
    let devices = client.list_devices().await?;
    Ok(devices.len())
}

// ── Internals ────────────────────────────────────────────────────────

fn build_client(config: &AccountConfig) -> Result<CloudClient, CoreError> {
    let transport = TransportConfig {
        timeout: config.timeout,
    };
    Ok(CloudClient::from_api_key(
        config.base_url.as_str(),
        &config.api_key,
        &transport,
    )?)
}

/// Periodic poll loop for one account.
///
/// The first cycle already ran at registration, so the immediate interval
/// tick is consumed. An overrunning cycle defers the next tick rather
/// than stacking a burst of catch-up cycles, which together with the
/// coordinator's gate keeps at most one cycle in flight. Failures are
/// logged and retried on the next tick, indefinitely.
async fn refresh_task(coordinator: Coordinator, period: Duration, cancel: CancellationToken) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval.tick().await; // consume the immediate first tick

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {
                if let Err(e) = coordinator.refresh().await {
                    warn!(error = %e, "periodic refresh failed");
                }
            }
        }
    }
}
