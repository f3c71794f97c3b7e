use std::sync::Arc;

use crate::models::{MonitorResult, MonitorSnapshot, OperationKind, ResourceId};
use crate::models::{MonitorError, MonitorErrorKind};
use crate::monitor::{PollConfig, TaskMonitor};
use crate::persistence::SessionStore;
use crate::remote::{ControlPlane, RescueGrant};

pub const RESCUE_NAMESPACE: &str = "rescue";

/// Monitors rescue-mode toggles. Enabling may provision one-time login
/// credentials; they surface on the snapshot only once the toggle completes
/// and they never reach the session store.
pub struct RescueMonitor {
    monitor: TaskMonitor,
    control_plane: Arc<dyn ControlPlane>,
}

impl RescueMonitor {
    pub fn new(
        resource: ResourceId,
        control_plane: Arc<dyn ControlPlane>,
        store: Arc<dyn SessionStore>,
        config: PollConfig,
    ) -> Self {
        Self {
            monitor: TaskMonitor::new(
                RESCUE_NAMESPACE,
                resource,
                control_plane.clone(),
                store,
                config,
            ),
            control_plane,
        }
    }

    /// Construct and immediately reconcile against the remote source of
    /// truth, resuming any persisted toggle still in flight.
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

    /// Requests rescue mode from the control plane and starts monitoring the
    /// toggle. An immediate transport failure propagates to the caller;
    /// failures during the subsequent polling never do.
    pub async fn enable(&self) -> MonitorResult<()> {
        let grant: RescueGrant = self
            .call_remote(OperationKind::RescueEnable, |plane, resource| {
                plane.enable_rescue(resource)
            })
            .await?;

        self.monitor.start(None).await;
        self.monitor.stage_credentials(grant.credentials).await;
        Ok(())
    }

    /// Requests rescue mode off and monitors the toggle back. Clears any
    /// held credentials before monitoring begins.
    pub async fn disable(&self) -> MonitorResult<()> {
        self.call_remote(OperationKind::RescueDisable, |plane, resource| {
            plane.disable_rescue(resource)
        })
        .await?;

        self.monitor.start(None).await;
        Ok(())
    }

    pub async fn clear_error(&self) {
        self.monitor.clear_error().await;
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

    async fn call_remote<T, F>(&self, operation: OperationKind, call: F) -> MonitorResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&dyn ControlPlane, &ResourceId) -> MonitorResult<T> + Send + 'static,
    {
        let control_plane = self.control_plane.clone();
        let resource = self.monitor.resource().clone();
        let attributed_resource = resource.clone();

        tokio::task::spawn_blocking(move || call(control_plane.as_ref(), &resource))
            .await
            .map_err(|join_error| MonitorError {
                resource: Some(attributed_resource),
                operation: Some(operation),
                kind: MonitorErrorKind::Internal,
                message: format!("control plane call join failure: {join_error}"),
            })?
            .map_err(|error| error.attributed(operation))
    }
}
