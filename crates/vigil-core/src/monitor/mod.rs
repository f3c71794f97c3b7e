use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::sync::Mutex;

use crate::models::{
    CanonicalStatus, MonitorError, MonitorErrorKind, MonitorSnapshot, MonitorState, OperationKind,
    RescueCredentials, ResourceId, TaskHandle,
};
use crate::normalize::classify_report;
use crate::persistence::{SessionStore, StorageKey};
use crate::progress::{baseline_percent, display_percent};
use crate::remote::{BuildStatusReport, ControlPlane, RemoteResult};
use crate::timeline::{self, now_unix_ms};

pub const FAST_POLL_INTERVAL: Duration = Duration::from_secs(2);
pub const SLOW_POLL_INTERVAL: Duration = Duration::from_secs(5);
pub const FAST_TICK_COUNT: u32 = 15;

const START_MESSAGE: &str = "Operation accepted; waiting for the control plane to pick it up";
const COMPLETE_MESSAGE: &str = "Operation completed successfully";
const FAILED_MESSAGE: &str = "The control plane reported the operation as failed";

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PollConfig {
    pub fast_interval: Duration,
    pub slow_interval: Duration,
    pub fast_tick_count: u32,
}

impl PollConfig {
    /// Interval to wait before the next tick, given how many ticks have
    /// already completed. The cadence downshift takes effect exactly on the
    /// tick after `fast_tick_count`, not by restarting the fast timer.
    pub fn interval_for_tick(&self, completed_ticks: u32) -> Duration {
        if completed_ticks < self.fast_tick_count {
            self.fast_interval
        } else {
            self.slow_interval
        }
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            fast_interval: FAST_POLL_INTERVAL,
            slow_interval: SLOW_POLL_INTERVAL,
            fast_tick_count: FAST_TICK_COUNT,
        }
    }
}

/// Client-side monitor for one long-running provisioning operation whose
/// true state lives on the remote control plane. Owns the poll chain, the
/// in-memory state and the session-store snapshots for one resource.
#[derive(Clone)]
pub struct TaskMonitor {
    inner: Arc<MonitorInner>,
}

struct MonitorInner {
    resource: ResourceId,
    key: StorageKey,
    control_plane: Arc<dyn ControlPlane>,
    store: Arc<dyn SessionStore>,
    config: PollConfig,
    state: Mutex<MonitorState>,
    staged_credentials: Mutex<Option<RescueCredentials>>,
    // Identifier of the only poll chain allowed to mutate state. Bumping it
    // orphans every earlier chain, including ticks already in flight.
    generation: AtomicU64,
}

impl TaskMonitor {
    /// Builds a monitor seeded from whatever the session store holds for
    /// this resource. A persisted active snapshot resumes in place; anything
    /// else starts idle. Call [`TaskMonitor::resume`] afterwards to
    /// reconcile resumed state against the remote source of truth.
    pub fn new(
        namespace: &str,
        resource: ResourceId,
        control_plane: Arc<dyn ControlPlane>,
        store: Arc<dyn SessionStore>,
        config: PollConfig,
    ) -> Self {
        let key = StorageKey::new(namespace, &resource);
        let initial = match store.load(&key) {
            Ok(Some(persisted)) if persisted.is_active => MonitorState::from_persisted(persisted),
            Ok(_) => MonitorState::idle(),
            Err(error) => {
                tracing::warn!(
                    key = %key,
                    kind = ?error.kind,
                    message = %error.message,
                    "failed to load persisted monitor state; starting idle"
                );
                MonitorState::idle()
            }
        };

        Self {
            inner: Arc::new(MonitorInner {
                resource,
                key,
                control_plane,
                store,
                config,
                state: Mutex::new(initial),
                staged_credentials: Mutex::new(None),
                generation: AtomicU64::new(0),
            }),
        }
    }

    pub fn resource(&self) -> &ResourceId {
        &self.inner.resource
    }

    pub fn config(&self) -> PollConfig {
        self.inner.config
    }

    pub async fn snapshot(&self) -> MonitorSnapshot {
        self.inner.state.lock().await.snapshot()
    }

    /// Begins tracking a freshly submitted operation. Any prior poll chain
    /// is orphaned first, the timeline is reset to a single `queued` entry,
    /// and the fast-cadence poll chain starts.
    pub async fn start(&self, task_id: Option<TaskHandle>) {
        let generation = self.inner.bump_generation();
        {
            let mut state = self.inner.state.lock().await;
            let mut fresh = MonitorState::idle();
            fresh.is_active = true;
            fresh.task_id = task_id;
            fresh.status = CanonicalStatus::Queued;
            fresh.percent = baseline_percent(CanonicalStatus::Queued);
            timeline::record(
                &mut fresh,
                CanonicalStatus::Queued,
                now_unix_ms(),
                Some(START_MESSAGE.to_string()),
            );
            *state = fresh;
            *self.inner.staged_credentials.lock().await = None;
            self.inner.persist(&state);
        }
        self.inner.clone().spawn_poll_chain(generation);
    }

    /// Stops polling, clears the persisted snapshot and returns the
    /// in-memory state to the idle default.
    pub async fn reset(&self) {
        self.inner.bump_generation();
        let mut state = self.inner.state.lock().await;
        *state = MonitorState::idle();
        *self.inner.staged_credentials.lock().await = None;
        self.inner.clear_persisted();
    }

    pub async fn clear_error(&self) {
        self.inner.state.lock().await.error = None;
    }

    /// Holds one-time credentials until the tracked operation completes
    /// successfully, at which point they surface on the snapshot. They never
    /// touch the session store.
    pub async fn stage_credentials(&self, credentials: Option<RescueCredentials>) {
        *self.inner.staged_credentials.lock().await = credentials;
    }

    /// One-time reconciliation against the remote source of truth, run on
    /// activation. Local persisted state is an optimistic cache; it is never
    /// trusted across a reload without this confirming round trip.
    pub async fn resume(&self) {
        {
            let state = self.inner.state.lock().await;
            if !state.is_active || state.status.is_terminal() {
                return;
            }
        }

        // Claim the chain before fetching so a concurrent start/reset
        // invalidates this reconciliation instead of racing it.
        let generation = self.inner.bump_generation();

        let report = match self.inner.fetch_status().await {
            Ok(report) => report,
            Err(error) => {
                tracing::warn!(
                    resource = %self.inner.resource,
                    kind = ?error.kind,
                    message = %error.message,
                    "reconciliation fetch failed; resuming with local state"
                );
                self.inner.clone().spawn_poll_chain(generation);
                return;
            }
        };

        if report.is_complete || report.is_error {
            // Task reached a terminal state while the local view was stale.
            self.inner.apply_report(generation, &report).await;
            return;
        }

        if report.is_vacant() {
            // Task finished and was cleaned up server-side, or the record is
            // orphaned. Local state is stale; force a full reset.
            let mut state = self.inner.state.lock().await;
            if self.inner.is_current(generation) {
                *state = MonitorState::idle();
                self.inner.clear_persisted();
            }
            return;
        }

        // Remote confirms the task is still running; resume normal ticking
        // over the persisted timeline.
        self.inner.clone().spawn_poll_chain(generation);
    }
}

impl MonitorInner {
    fn bump_generation(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    fn spawn_poll_chain(self: Arc<Self>, generation: u64) {
        tokio::spawn(async move {
            let mut completed_ticks: u32 = 0;
            loop {
                tokio::time::sleep(self.config.interval_for_tick(completed_ticks)).await;
                if !self.is_current(generation) {
                    return;
                }
                completed_ticks = completed_ticks.saturating_add(1);

                let report = match self.fetch_status().await {
                    Ok(report) => report,
                    Err(error) => {
                        // Transient transport failure: keep the canonical
                        // status and let the next scheduled tick retry.
                        tracing::warn!(
                            resource = %self.resource,
                            kind = ?error.kind,
                            message = %error.message,
                            "status fetch failed; retrying on next tick"
                        );
                        continue;
                    }
                };

                if !self.is_current(generation) {
                    return;
                }
                if self.apply_report(generation, &report).await {
                    return;
                }
            }
        });
    }

    async fn fetch_status(&self) -> RemoteResult<BuildStatusReport> {
        let control_plane = self.control_plane.clone();
        let resource = self.resource.clone();
        tokio::task::spawn_blocking(move || control_plane.build_status(&resource))
            .await
            .map_err(|join_error| MonitorError {
                resource: Some(self.resource.clone()),
                operation: Some(OperationKind::StatusPoll),
                kind: MonitorErrorKind::Internal,
                message: format!("status fetch join failure: {join_error}"),
            })?
            .map_err(|error| error.attributed(OperationKind::StatusPoll))
    }

    /// Folds one status report into the monitor state. Returns true when the
    /// poll chain must stop, either because a terminal status was reached or
    /// because this chain has been orphaned.
    async fn apply_report(&self, generation: u64, report: &BuildStatusReport) -> bool {
        let mut state = self.state.lock().await;
        // Re-checked under the lock: a reset/start that happened after the
        // fetch resolved must win over this in-flight tick.
        if !self.is_current(generation) {
            return true;
        }

        let status = classify_report(report);
        let entry_message = match status {
            CanonicalStatus::Complete => Some(
                report
                    .message
                    .clone()
                    .unwrap_or_else(|| COMPLETE_MESSAGE.to_string()),
            ),
            CanonicalStatus::Failed => Some(
                report
                    .message
                    .clone()
                    .unwrap_or_else(|| FAILED_MESSAGE.to_string()),
            ),
            _ => report.message.clone().or_else(|| report.phase.clone()),
        };

        state.status = status;
        state.percent = display_percent(state.percent, status, report.percent);
        timeline::record(&mut state, status, now_unix_ms(), entry_message.clone());

        match status {
            CanonicalStatus::Failed => {
                state.error = entry_message;
                state.credentials = None;
                // Terminal: persisted state goes away, in-memory state stays
                // active so the failure remains visible until reset.
                self.clear_persisted();
                true
            }
            CanonicalStatus::Complete => {
                state.credentials = self.staged_credentials.lock().await.take();
                self.clear_persisted();
                true
            }
            _ => {
                self.persist(&state);
                false
            }
        }
    }

    fn persist(&self, state: &MonitorState) {
        if let Err(error) = self.store.save(&self.key, &state.persisted()) {
            tracing::warn!(
                key = %self.key,
                kind = ?error.kind,
                message = %error.message,
                "failed to persist monitor state; continuing in memory only"
            );
        }
    }

    fn clear_persisted(&self) {
        if let Err(error) = self.store.clear(&self.key) {
            tracing::warn!(
                key = %self.key,
                kind = ?error.kind,
                message = %error.message,
                "failed to clear persisted monitor state"
            );
        }
    }
}
