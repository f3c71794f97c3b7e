use std::time::{SystemTime, UNIX_EPOCH};

use crate::models::{CanonicalStatus, MonitorState, TimelineEntry};

pub fn now_unix_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or(0)
}

/// Appends a timeline entry when the status actually changed. Returns false
/// without touching the timeline when the new status equals the last
/// recorded one, so a remote side that reports the same phase on every tick
/// never produces duplicate rows. Timestamps are clamped against the
/// previous entry to keep the timeline monotone.
pub fn record(
    state: &mut MonitorState,
    status: CanonicalStatus,
    timestamp: u64,
    message: Option<String>,
) -> bool {
    if state.last_recorded == Some(status) {
        return false;
    }

    let timestamp = state
        .timeline
        .last()
        .map_or(timestamp, |last| timestamp.max(last.timestamp));

    state.timeline.push(TimelineEntry {
        status,
        timestamp,
        message,
    });
    state.last_recorded = Some(status);
    true
}
