use serde::{Deserialize, Serialize};

use crate::models::{MonitorError, RescueCredentials, ResourceId};

pub type RemoteResult<T> = Result<T, MonitorError>;

/// Raw build/task status as the control plane reports it. The phase text is
/// free-form vendor vocabulary; [`crate::normalize`] maps it onto the
/// canonical enumeration.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildStatusReport {
    #[serde(default)]
    pub is_building: bool,
    #[serde(default)]
    pub is_complete: bool,
    #[serde(default)]
    pub is_error: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percent: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl BuildStatusReport {
    /// True when the remote side reports no task at all: nothing running,
    /// nothing finished, nothing failed.
    pub fn is_vacant(&self) -> bool {
        !self.is_building && !self.is_complete && !self.is_error && self.phase.is_none()
    }
}

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RescueGrant {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credentials: Option<RescueCredentials>,
}

/// The remote source of truth for provisioning task state. Implementations
/// block; the scheduler bridges calls through `tokio::task::spawn_blocking`.
/// Every method may fail with a transport error, which the poll loop treats
/// as transient.
pub trait ControlPlane: Send + Sync {
    fn build_status(&self, resource: &ResourceId) -> RemoteResult<BuildStatusReport>;

    fn enable_rescue(&self, resource: &ResourceId) -> RemoteResult<RescueGrant>;

    fn disable_rescue(&self, resource: &ResourceId) -> RemoteResult<()>;
}
