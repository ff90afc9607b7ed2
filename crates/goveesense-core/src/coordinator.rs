// ── Refresh coordination ──
//
// One coordinator per registered account. Owns the cloud client and the
// latest snapshot, runs the list-then-state refresh cycle, and publishes
// results atomically. At most one cycle is ever in flight per account:
// concurrent refresh requests coalesce onto the running cycle and all
// observe the same outcome.

use std::sync::Arc;

use arc_swap::ArcSwapOption;
use chrono::Utc;
use futures_util::future;
use tokio::sync::{Mutex, watch};
use tracing::{debug, warn};

use goveesense_api::CloudClient;

use crate::convert::reading_from_state;
use crate::error::CoreError;
use crate::model::Snapshot;

/// Outcome of one refresh cycle, shared by every coalesced caller.
pub type CycleResult = Result<Arc<Snapshot>, CoreError>;

// ── RefreshState ─────────────────────────────────────────────────────

/// Coordinator state observable by consumers.
///
/// `Failed` is not fatal: the next tick or manual refresh transitions
/// back through `Refreshing`, retrying indefinitely.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshState {
    Idle,
    Refreshing,
    Failed,
}

// ── Coordinator ──────────────────────────────────────────────────────

/// Refresh coordinator for a single account.
///
/// Cheaply cloneable via `Arc`. Readers take lock-free snapshots; the
/// snapshot reference is replaced in a single atomic swap per successful
/// cycle, so a reader never observes a mix of old and new readings.
#[derive(Clone)]
pub struct Coordinator {
    inner: Arc<CoordinatorInner>,
}

impl std::fmt::Debug for Coordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Coordinator").finish_non_exhaustive()
    }
}

struct CoordinatorInner {
    client: CloudClient,
    /// Latest fully-formed snapshot. Survives hard failures untouched
    /// (stale-but-available).
    snapshot: ArcSwapOption<Snapshot>,
    /// Hard failure from the most recent cycle, cleared on success.
    last_error: ArcSwapOption<CoreError>,
    state: watch::Sender<RefreshState>,
    /// Last completed cycle's outcome — what coalesced callers await.
    outcome: watch::Sender<Option<CycleResult>>,
    /// Held for the duration of a cycle; `try_lock` failure means a cycle
    /// is already in flight.
    gate: Mutex<()>,
}

impl Coordinator {
    /// Create a coordinator around an exclusively owned cloud client.
    ///
    /// No cycle runs yet — the registry drives the first refresh so setup
    /// can reject bad credentials.
    pub fn new(client: CloudClient) -> Self {
        let (state, _) = watch::channel(RefreshState::Idle);
        let (outcome, _) = watch::channel(None);

        Self {
            inner: Arc::new(CoordinatorInner {
                client,
                snapshot: ArcSwapOption::empty(),
                last_error: ArcSwapOption::empty(),
                state,
                outcome,
                gate: Mutex::new(()),
            }),
        }
    }

    // ── Consumer interface ───────────────────────────────────────────

    /// The latest fully-formed snapshot, if any cycle has succeeded yet.
    pub fn latest_snapshot(&self) -> Option<Arc<Snapshot>> {
        self.inner.snapshot.load_full()
    }

    /// The hard failure from the most recent cycle, if it failed.
    pub fn last_error(&self) -> Option<CoreError> {
        self.inner.last_error.load_full().map(|e| (*e).clone())
    }

    /// Subscribe to refresh-state transitions.
    pub fn state(&self) -> watch::Receiver<RefreshState> {
        self.inner.state.subscribe()
    }

    /// Run a refresh cycle, or await the one already in flight.
    ///
    /// Every caller that lands on the same cycle receives the same
    /// snapshot (or the same error). Callers blocking on first data use
    /// this to wait until a fully-formed snapshot exists.
    pub async fn refresh(&self) -> CycleResult {
        // Subscribe before probing the gate so an outcome published
        // between the probe and the await cannot be missed.
        let mut rx = self.inner.outcome.subscribe();

        match self.inner.gate.try_lock() {
            Ok(_guard) => {
                let result = self.run_cycle().await;
                self.inner.outcome.send_replace(Some(result.clone()));
                result
            }
            Err(_) => {
                let _ = rx.changed().await;
                match rx.borrow_and_update().clone() {
                    Some(result) => result,
                    // The in-flight cycle never published — coordinator
                    // torn down underneath us.
                    None => Err(CoreError::Cancelled),
                }
            }
        }
    }

    // ── Cycle ────────────────────────────────────────────────────────

    async fn run_cycle(&self) -> CycleResult {
        let _ = self.inner.state.send(RefreshState::Refreshing);

        match self.fetch_snapshot().await {
            Ok(snapshot) => {
                let snapshot = Arc::new(snapshot);
                self.inner.snapshot.store(Some(Arc::clone(&snapshot)));
                self.inner.last_error.store(None);
                let _ = self.inner.state.send(RefreshState::Idle);
                debug!(readings = snapshot.readings.len(), "refresh cycle complete");
                Ok(snapshot)
            }
            Err(e) => {
                // Last good snapshot is left in place.
                warn!(error = %e, "refresh cycle failed");
                self.inner.last_error.store(Some(Arc::new(e.clone())));
                let _ = self.inner.state.send(RefreshState::Failed);
                Err(e)
            }
        }
    }

    /// One list call plus N state calls, normalized into a snapshot.
    ///
    /// State calls run concurrently, but reading order always follows the
    /// device-list order. Per-device vendor errors were already flattened
    /// to empty payloads by the client; any error surfacing here is hard.
    async fn fetch_snapshot(&self) -> Result<Snapshot, CoreError> {
        let devices = self.inner.client.list_devices().await?;

        let states = future::try_join_all(
            devices
                .iter()
                .map(|d| self.inner.client.get_device_state(&d.sku, &d.device)),
        )
        .await?;

        let readings = devices
            .iter()
            .zip(&states)
            .map(|(descriptor, state)| reading_from_state(descriptor, state))
            .collect();

        Ok(Snapshot {
            taken_at: Utc::now(),
            readings,
        })
    }
}
