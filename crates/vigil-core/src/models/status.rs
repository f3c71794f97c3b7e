use serde::{Deserialize, Serialize};

/// Canonical provisioning status, ordered by expected progression. `Failed`
/// is a sink reachable from any non-terminal status.
#[derive(
    Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum CanonicalStatus {
    Idle,
    Queued,
    Provisioning,
    Imaging,
    Installing,
    Configuring,
    Rebooting,
    Complete,
    Failed,
}

impl CanonicalStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, CanonicalStatus::Complete | CanonicalStatus::Failed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CanonicalStatus::Idle => "idle",
            CanonicalStatus::Queued => "queued",
            CanonicalStatus::Provisioning => "provisioning",
            CanonicalStatus::Imaging => "imaging",
            CanonicalStatus::Installing => "installing",
            CanonicalStatus::Configuring => "configuring",
            CanonicalStatus::Rebooting => "rebooting",
            CanonicalStatus::Complete => "complete",
            CanonicalStatus::Failed => "failed",
        }
    }
}
