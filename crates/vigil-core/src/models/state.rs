use serde::{Deserialize, Serialize};

use crate::models::{CanonicalStatus, TaskHandle};

/// One immutable row of the status timeline. Timestamps are unix
/// milliseconds and monotonically non-decreasing within a timeline.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct TimelineEntry {
    pub status: CanonicalStatus,
    pub timestamp: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// One-time-reveal login secrets returned when a rescue grant provisions
/// access. Held in memory only; never part of any persisted payload.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RescueCredentials {
    pub server_ip: String,
    pub username: String,
    pub password: String,
}

/// The subset of monitor state that survives a session-store round trip.
/// `credentials` and `error` are excluded by construction.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedMonitorState {
    pub is_active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_id: Option<TaskHandle>,
    pub status: CanonicalStatus,
    pub percent: u8,
    pub timeline: Vec<TimelineEntry>,
}

/// Full in-memory state of one monitored resource.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MonitorState {
    pub is_active: bool,
    pub task_id: Option<TaskHandle>,
    pub status: CanonicalStatus,
    pub percent: u8,
    pub error: Option<String>,
    pub timeline: Vec<TimelineEntry>,
    pub credentials: Option<RescueCredentials>,
    // Last status written to the timeline. Kept inside the state so the
    // dedup marker serializes and resets together with everything else.
    pub(crate) last_recorded: Option<CanonicalStatus>,
}

impl MonitorState {
    pub fn idle() -> Self {
        Self {
            is_active: false,
            task_id: None,
            status: CanonicalStatus::Idle,
            percent: 0,
            error: None,
            timeline: Vec::new(),
            credentials: None,
            last_recorded: None,
        }
    }

    pub fn from_persisted(persisted: PersistedMonitorState) -> Self {
        let last_recorded = persisted.timeline.last().map(|entry| entry.status);
        Self {
            is_active: persisted.is_active,
            task_id: persisted.task_id,
            status: persisted.status,
            percent: persisted.percent,
            error: None,
            timeline: persisted.timeline,
            credentials: None,
            last_recorded,
        }
    }

    pub fn persisted(&self) -> PersistedMonitorState {
        PersistedMonitorState {
            is_active: self.is_active,
            task_id: self.task_id.clone(),
            status: self.status,
            percent: self.percent,
            timeline: self.timeline.clone(),
        }
    }

    pub fn snapshot(&self) -> MonitorSnapshot {
        MonitorSnapshot {
            is_active: self.is_active,
            task_id: self.task_id.clone(),
            status: self.status,
            percent: self.percent,
            error: self.error.clone(),
            timeline: self.timeline.clone(),
            credentials: self.credentials.clone(),
        }
    }
}

impl Default for MonitorState {
    fn default() -> Self {
        Self::idle()
    }
}

/// What the presentation layer sees. Identical to [`MonitorState`] minus
/// the internal timeline dedup marker.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MonitorSnapshot {
    pub is_active: bool,
    pub task_id: Option<TaskHandle>,
    pub status: CanonicalStatus,
    pub percent: u8,
    pub error: Option<String>,
    pub timeline: Vec<TimelineEntry>,
    pub credentials: Option<RescueCredentials>,
}
