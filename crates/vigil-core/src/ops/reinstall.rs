use std::sync::Arc;

use crate::models::{MonitorSnapshot, ResourceId, TaskHandle};
use crate::monitor::{PollConfig, TaskMonitor};
use crate::persistence::SessionStore;
use crate::remote::ControlPlane;

pub const REINSTALL_NAMESPACE: &str = "reinstall";

/// Monitors an OS reinstall submitted out-of-band: the caller triggers the
/// reinstall against the control plane, then hands the task handle here.
pub struct ReinstallMonitor {
    monitor: TaskMonitor,
}

impl ReinstallMonitor {
    pub fn new(
        resource: ResourceId,
        control_plane: Arc<dyn ControlPlane>,
        store: Arc<dyn SessionStore>,
        config: PollConfig,
    ) -> Self {
        Self {
            monitor: TaskMonitor::new(REINSTALL_NAMESPACE, resource, control_plane, store, config),
        }
    }

    /// Construct and immediately reconcile against the remote source of
    /// truth, resuming any persisted run.
    pub async fn attach(
        resource: ResourceId,
        control_plane: Arc<dyn ControlPlane>,
        store: Arc<dyn SessionStore>,
        config: PollConfig,
    ) -> Self {
        let monitor = Self::new(resource, control_plane, store, config);
        monitor.monitor.resume().await;
        monitor
    }

    pub async fn start(&self, task_id: Option<TaskHandle>) {
        self.monitor.start(task_id).await;
    }

    pub async fn reset(&self) {
        self.monitor.reset().await;
    }

    pub async fn snapshot(&self) -> MonitorSnapshot {
        self.monitor.snapshot().await
    }

    pub fn monitor(&self) -> &TaskMonitor {
        &self.monitor
    }
}
