//! Shared helpers for command implementations

use archpro_engine::{EnsureReport, StepOutcome};
use archpro_utils::error::ArchProError;
use archpro_utils::types::Phase;

/// Parse a phase slug, long name or label.
///
/// # Errors
///
/// Returns `ArchProError::UnknownPhase` for anything else.
pub fn parse_phase(name: &str) -> Result<Phase, ArchProError> {
    name.trim().parse().map_err(|_| ArchProError::UnknownPhase {
        name: name.to_string(),
    })
}

/// Parse phases, keeping the given order.
///
/// # Errors
///
/// Returns `ArchProError::UnknownPhase` for the first unknown name.
pub fn parse_phases(names: &[String]) -> Result<Vec<Phase>, ArchProError> {
    names.iter().map(|name| parse_phase(name)).collect()
}

/// One warning line per failed step of `report`.
#[must_use]
pub fn report_notes(phase: Phase, report: &EnsureReport) -> Vec<String> {
    [
        ("section", &report.section),
        ("diagram", &report.diagram),
        ("cover", &report.cover),
    ]
    .into_iter()
    .filter_map(|(step, outcome)| match outcome {
        StepOutcome::Failed { reason } => Some(format!(
            "⚠ {step} for {} unavailable: {reason}",
            phase.label()
        )),
        _ => None,
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_phases_keeps_order() {
        let phases =
            parse_phases(&["deep-dives".to_string(), "Requirements".to_string()]).unwrap();
        assert_eq!(phases, vec![Phase::DeepDivesScaling, Phase::Requirements]);
    }

    #[test]
    fn test_unknown_phase() {
        let err = parse_phase("capacity").unwrap_err();
        assert!(matches!(err, ArchProError::UnknownPhase { ref name } if name == "capacity"));
    }

    #[test]
    fn test_report_notes_only_failures() {
        let report = EnsureReport {
            section: StepOutcome::Failed {
                reason: "quota".to_string(),
            },
            diagram: StepOutcome::NotRequested,
            cover: StepOutcome::Populated,
        };
        let notes = report_notes(Phase::HighLevelDesign, &report);
        assert_eq!(notes, vec!["⚠ section for High Level Design unavailable: quota"]);
    }
}
