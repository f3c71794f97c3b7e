use vigil_core::models::CanonicalStatus;
use vigil_core::normalize::{classify_report, normalize_phase};
use vigil_core::remote::BuildStatusReport;

#[test]
fn failure_flag_wins_over_any_phase_text() {
    assert_eq!(
        normalize_phase(Some("installing packages"), true),
        CanonicalStatus::Failed
    );
    assert_eq!(normalize_phase(None, true), CanonicalStatus::Failed);
    assert_eq!(
        normalize_phase(Some("complete"), true),
        CanonicalStatus::Failed
    );
}

#[test]
fn absent_or_blank_phase_maps_to_idle() {
    assert_eq!(normalize_phase(None, false), CanonicalStatus::Idle);
    assert_eq!(normalize_phase(Some(""), false), CanonicalStatus::Idle);
    assert_eq!(normalize_phase(Some("   "), false), CanonicalStatus::Idle);
}

#[test]
fn keyword_cascade_is_case_insensitive_and_substring_based() {
    assert_eq!(
        normalize_phase(Some("Queued for build"), false),
        CanonicalStatus::Queued
    );
    assert_eq!(
        normalize_phase(Some("PROVISIONING storage"), false),
        CanonicalStatus::Provisioning
    );
    assert_eq!(
        normalize_phase(Some("Downloading image (3/5)"), false),
        CanonicalStatus::Imaging
    );
    assert_eq!(
        normalize_phase(Some("imaging disk"), false),
        CanonicalStatus::Imaging
    );
    assert_eq!(
        normalize_phase(Some("Installing base system"), false),
        CanonicalStatus::Installing
    );
    assert_eq!(
        normalize_phase(Some("configuring network"), false),
        CanonicalStatus::Configuring
    );
    assert_eq!(
        normalize_phase(Some("Rebooting into new OS"), false),
        CanonicalStatus::Rebooting
    );
    assert_eq!(
        normalize_phase(Some("first boot"), false),
        CanonicalStatus::Rebooting
    );
    assert_eq!(
        normalize_phase(Some("build complete"), false),
        CanonicalStatus::Complete
    );
    assert_eq!(
        normalize_phase(Some("all done"), false),
        CanonicalStatus::Complete
    );
    assert_eq!(
        normalize_phase(Some("finished"), false),
        CanonicalStatus::Complete
    );
    assert_eq!(
        normalize_phase(Some("build failed"), false),
        CanonicalStatus::Failed
    );
    assert_eq!(
        normalize_phase(Some("internal error"), false),
        CanonicalStatus::Failed
    );
}

#[test]
fn earlier_rules_take_priority_over_later_ones() {
    // "queued install" matches both "queue" and "install"; "queue" is first.
    assert_eq!(
        normalize_phase(Some("queued install"), false),
        CanonicalStatus::Queued
    );
    // "provision" outranks "config" and "error".
    assert_eq!(
        normalize_phase(Some("provisioning config, retrying after error"), false),
        CanonicalStatus::Provisioning
    );
    // "imag" outranks "install".
    assert_eq!(
        normalize_phase(Some("imaging installer media"), false),
        CanonicalStatus::Imaging
    );
}

#[test]
fn phases_containing_install_without_higher_priority_keywords_classify_installing() {
    for phase in [
        "install",
        "Installing",
        "post-install scripts",
        "installing kernel modules",
        "INSTALL step 4 of 9",
    ] {
        assert_eq!(
            normalize_phase(Some(phase), false),
            CanonicalStatus::Installing,
            "phase {phase:?}"
        );
    }
}

#[test]
fn unrecognized_phases_fall_back_to_installing_never_idle() {
    for phase in [
        "warming up hamsters",
        "phase-17",
        "zfs scrub",
        "applying vendor blob",
    ] {
        assert_eq!(
            normalize_phase(Some(phase), false),
            CanonicalStatus::Installing,
            "phase {phase:?}"
        );
    }
}

#[test]
fn report_flags_outrank_phase_text() {
    let complete = BuildStatusReport {
        is_complete: true,
        phase: Some("installing".to_string()),
        ..BuildStatusReport::default()
    };
    assert_eq!(classify_report(&complete), CanonicalStatus::Complete);

    let errored = BuildStatusReport {
        is_error: true,
        is_complete: true,
        phase: Some("configuring".to_string()),
        ..BuildStatusReport::default()
    };
    assert_eq!(classify_report(&errored), CanonicalStatus::Failed);

    let running = BuildStatusReport {
        is_building: true,
        phase: Some("configuring dns".to_string()),
        ..BuildStatusReport::default()
    };
    assert_eq!(classify_report(&running), CanonicalStatus::Configuring);
}
