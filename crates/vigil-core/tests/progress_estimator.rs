use vigil_core::models::CanonicalStatus;
use vigil_core::progress::{baseline_percent, display_percent};

#[test]
fn baselines_follow_the_expected_progression() {
    let expected = [
        (CanonicalStatus::Idle, 0),
        (CanonicalStatus::Queued, 5),
        (CanonicalStatus::Provisioning, 20),
        (CanonicalStatus::Imaging, 40),
        (CanonicalStatus::Installing, 65),
        (CanonicalStatus::Configuring, 85),
        (CanonicalStatus::Rebooting, 95),
        (CanonicalStatus::Complete, 100),
        (CanonicalStatus::Failed, 0),
    ];

    for (status, percent) in expected {
        assert_eq!(baseline_percent(status), percent, "status {status:?}");
    }
}

#[test]
fn remote_percent_overrides_baseline() {
    assert_eq!(
        display_percent(0, CanonicalStatus::Installing, Some(72)),
        72
    );
    assert_eq!(display_percent(0, CanonicalStatus::Installing, None), 65);
}

#[test]
fn display_never_decreases_while_non_terminal() {
    // Remote reports a lower explicit percent than what is already shown.
    assert_eq!(
        display_percent(80, CanonicalStatus::Installing, Some(50)),
        80
    );
    // Status regressed in the remote vocabulary; baseline is below previous.
    assert_eq!(display_percent(70, CanonicalStatus::Imaging, None), 70);
}

#[test]
fn monotone_across_a_scripted_run() {
    let ticks = [
        (CanonicalStatus::Queued, None),
        (CanonicalStatus::Provisioning, Some(10)),
        (CanonicalStatus::Provisioning, Some(30)),
        (CanonicalStatus::Imaging, None),
        (CanonicalStatus::Installing, Some(60)),
        (CanonicalStatus::Installing, Some(55)),
        (CanonicalStatus::Configuring, None),
        (CanonicalStatus::Rebooting, None),
    ];

    let mut percent = 0u8;
    for (status, remote) in ticks {
        let next = display_percent(percent, status, remote);
        assert!(next >= percent, "{status:?}: {next} < {percent}");
        percent = next;
    }
}

#[test]
fn terminal_statuses_pin_their_display_value() {
    assert_eq!(display_percent(40, CanonicalStatus::Complete, Some(97)), 100);
    assert_eq!(display_percent(40, CanonicalStatus::Complete, None), 100);
    assert_eq!(display_percent(40, CanonicalStatus::Failed, None), 0);
}

#[test]
fn out_of_range_remote_percent_is_capped() {
    assert_eq!(
        display_percent(0, CanonicalStatus::Installing, Some(250)),
        100
    );
}
