use std::time::Duration;

use vigil_core::models::{MonitorError, ResourceId};
use vigil_core::remote::{BuildStatusReport, ControlPlane, RemoteResult, RescueGrant};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Blocking HTTP client for the provisioning control plane. The poll
/// scheduler runs these calls through `spawn_blocking`, so plain blocking
/// requests are exactly what it expects.
pub struct HttpControlPlane {
    base_url: String,
    agent: ureq::Agent,
}

impl HttpControlPlane {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            agent: ureq::AgentBuilder::new().timeout(REQUEST_TIMEOUT).build(),
        }
    }

    fn rescue_url(&self, resource: &ResourceId) -> String {
        format!("{}/v1/servers/{}/rescue", self.base_url, resource.as_str())
    }
}

impl ControlPlane for HttpControlPlane {
    fn build_status(&self, resource: &ResourceId) -> RemoteResult<BuildStatusReport> {
        let url = format!(
            "{}/v1/servers/{}/build-status",
            self.base_url,
            resource.as_str()
        );
        let response = self
            .agent
            .get(&url)
            .call()
            .map_err(|error| transport_error(resource, "build-status request failed", error))?;
        response
            .into_json::<BuildStatusReport>()
            .map_err(|error| transport_error(resource, "build-status response unreadable", error))
    }

    fn enable_rescue(&self, resource: &ResourceId) -> RemoteResult<RescueGrant> {
        let response = self
            .agent
            .post(&self.rescue_url(resource))
            .call()
            .map_err(|error| transport_error(resource, "rescue enable request failed", error))?;
        response
            .into_json::<RescueGrant>()
            .map_err(|error| transport_error(resource, "rescue enable response unreadable", error))
    }

    fn disable_rescue(&self, resource: &ResourceId) -> RemoteResult<()> {
        self.agent
            .delete(&self.rescue_url(resource))
            .call()
            .map_err(|error| transport_error(resource, "rescue disable request failed", error))?;
        Ok(())
    }
}

fn transport_error(
    resource: &ResourceId,
    context: &str,
    error: impl std::fmt::Display,
) -> MonitorError {
    MonitorError::transport(resource.clone(), format!("{context}: {error}"))
}
