use crate::models::CanonicalStatus;
use crate::remote::BuildStatusReport;

// Ordered first-match-wins cascade. Each row is tested as a case-insensitive
// substring of the remote phase text, so partial vendor strings like
// "Downloading image (3/5)" still classify.
const PHASE_RULES: &[(&[&str], CanonicalStatus)] = &[
    (&["queue"], CanonicalStatus::Queued),
    (&["provision"], CanonicalStatus::Provisioning),
    (&["imag", "download"], CanonicalStatus::Imaging),
    (&["install"], CanonicalStatus::Installing),
    (&["config"], CanonicalStatus::Configuring),
    (&["reboot", "boot"], CanonicalStatus::Rebooting),
    (&["complete", "done", "finish"], CanonicalStatus::Complete),
    (&["fail", "error"], CanonicalStatus::Failed),
];

/// Maps a free-form remote phase string and the remote failure flag onto the
/// canonical enumeration. Unrecognized non-empty phases fall back to
/// `Installing`: an unexpected vendor phase means the operation is underway,
/// not that monitoring should abort.
pub fn normalize_phase(phase: Option<&str>, operation_failed: bool) -> CanonicalStatus {
    if operation_failed {
        return CanonicalStatus::Failed;
    }

    let phase = match phase {
        Some(text) if !text.trim().is_empty() => text.to_ascii_lowercase(),
        _ => return CanonicalStatus::Idle,
    };

    for (keywords, status) in PHASE_RULES {
        if keywords.iter().any(|keyword| phase.contains(keyword)) {
            return *status;
        }
    }

    CanonicalStatus::Installing
}

/// Classifies one full status report: explicit completion and error flags
/// take precedence over whatever the phase text says.
pub fn classify_report(report: &BuildStatusReport) -> CanonicalStatus {
    if report.is_error {
        return CanonicalStatus::Failed;
    }
    if report.is_complete {
        return CanonicalStatus::Complete;
    }
    normalize_phase(report.phase.as_deref(), false)
}
