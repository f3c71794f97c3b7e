use vigil_core::models::{CanonicalStatus, MonitorState};
use vigil_core::timeline::record;

#[test]
fn repeated_statuses_append_exactly_once() {
    let mut state = MonitorState::idle();

    assert!(record(&mut state, CanonicalStatus::Queued, 1_000, None));
    assert!(!record(&mut state, CanonicalStatus::Queued, 2_000, None));
    assert!(!record(&mut state, CanonicalStatus::Queued, 3_000, None));
    assert!(record(&mut state, CanonicalStatus::Installing, 4_000, None));

    let statuses: Vec<_> = state.timeline.iter().map(|entry| entry.status).collect();
    assert_eq!(
        statuses,
        vec![CanonicalStatus::Queued, CanonicalStatus::Installing]
    );
}

#[test]
fn no_two_consecutive_entries_share_a_status() {
    let mut state = MonitorState::idle();
    let script = [
        CanonicalStatus::Queued,
        CanonicalStatus::Queued,
        CanonicalStatus::Provisioning,
        CanonicalStatus::Provisioning,
        CanonicalStatus::Installing,
        CanonicalStatus::Provisioning,
        CanonicalStatus::Installing,
        CanonicalStatus::Installing,
    ];

    for (index, status) in script.into_iter().enumerate() {
        record(&mut state, status, index as u64 * 100, None);
    }

    for window in state.timeline.windows(2) {
        assert_ne!(window[0].status, window[1].status);
    }
}

#[test]
fn timestamps_are_clamped_to_stay_monotone() {
    let mut state = MonitorState::idle();

    record(&mut state, CanonicalStatus::Queued, 5_000, None);
    // Clock went backwards between ticks.
    record(&mut state, CanonicalStatus::Provisioning, 4_000, None);
    record(&mut state, CanonicalStatus::Installing, 9_000, None);

    let stamps: Vec<_> = state
        .timeline
        .iter()
        .map(|entry| entry.timestamp)
        .collect();
    assert_eq!(stamps, vec![5_000, 5_000, 9_000]);
}

#[test]
fn messages_ride_along_with_their_entry() {
    let mut state = MonitorState::idle();

    record(
        &mut state,
        CanonicalStatus::Queued,
        1_000,
        Some("submitted".to_string()),
    );
    record(&mut state, CanonicalStatus::Installing, 2_000, None);

    assert_eq!(state.timeline[0].message.as_deref(), Some("submitted"));
    assert_eq!(state.timeline[1].message, None);
}

#[test]
fn resume_from_persisted_state_keeps_deduplicating() {
    let mut state = MonitorState::idle();
    record(&mut state, CanonicalStatus::Installing, 1_000, None);

    let resumed = MonitorState::from_persisted(state.persisted());
    let mut resumed = resumed;
    // Same status after a reload must not duplicate the last entry.
    assert!(!record(
        &mut resumed,
        CanonicalStatus::Installing,
        2_000,
        None
    ));
    assert_eq!(resumed.timeline.len(), 1);
}
