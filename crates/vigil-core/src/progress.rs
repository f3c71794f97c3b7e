use crate::models::CanonicalStatus;

/// Fixed baseline percent for each canonical status. The baseline is the
/// floor used whenever the remote side does not supply an explicit value.
pub fn baseline_percent(status: CanonicalStatus) -> u8 {
    match status {
        CanonicalStatus::Idle => 0,
        CanonicalStatus::Queued => 5,
        CanonicalStatus::Provisioning => 20,
        CanonicalStatus::Imaging => 40,
        CanonicalStatus::Installing => 65,
        CanonicalStatus::Configuring => 85,
        CanonicalStatus::Rebooting => 95,
        CanonicalStatus::Complete => 100,
        CanonicalStatus::Failed => 0,
    }
}

/// Computes the percent to display for one tick. A remote-supplied value
/// overrides the baseline; while the status is non-terminal the result is
/// clamped against the previous value so an active run never displays a
/// decreasing bar.
pub fn display_percent(
    previous: u8,
    status: CanonicalStatus,
    remote_percent: Option<u8>,
) -> u8 {
    let computed = remote_percent
        .unwrap_or_else(|| baseline_percent(status))
        .min(100);

    match status {
        CanonicalStatus::Complete => 100,
        CanonicalStatus::Failed => computed,
        _ => computed.max(previous),
    }
}
