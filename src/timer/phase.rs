use serde::{Deserialize, Serialize};

/// Nominal second at which Q&A begins (8 minutes).
pub const QA_START_SECS: u64 = 480;
/// Nominal second at which peer assessment begins (12 minutes).
pub const ASSESSMENT_START_SECS: u64 = 720;
/// Nominal second at which the session is over (14 minutes).
pub const FINISH_SECS: u64 = 840;

pub const SINGLE_WARNING_SECS: u64 = 300;
pub const DOUBLE_WARNING_SECS: u64 = 420;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum Phase {
    Presentation,
    QAndA,
    Assessment,
    Finished,
}

/// Phase is never stored; it is always derived from nominal seconds.
pub fn phase(nominal_seconds: u64) -> Phase {
    if nominal_seconds < QA_START_SECS {
        Phase::Presentation
    } else if nominal_seconds < ASSESSMENT_START_SECS {
        Phase::QAndA
    } else if nominal_seconds < FINISH_SECS {
        Phase::Assessment
    } else {
        Phase::Finished
    }
}

/// Display metadata for a phase.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PhaseInfo {
    pub label: &'static str,
    pub message: &'static str,
    pub duration_secs: u64,
}

impl Phase {
    pub fn info(&self) -> PhaseInfo {
        match self {
            Phase::Presentation => PhaseInfo {
                label: "Oral Presentation",
                message: "Presenting Topic (Beeps at 5m & 7m)",
                duration_secs: QA_START_SECS,
            },
            Phase::QAndA => PhaseInfo {
                label: "Q&A Session",
                message: "Questions & Answers",
                duration_secs: ASSESSMENT_START_SECS - QA_START_SECS,
            },
            Phase::Assessment => PhaseInfo {
                label: "Peer Assessment",
                message: "Fill out Google Form",
                duration_secs: FINISH_SECS - ASSESSMENT_START_SECS,
            },
            Phase::Finished => PhaseInfo {
                label: "Time Up",
                message: "Group Completed",
                duration_secs: 0,
            },
        }
    }

    /// Nominal second at which this phase ends.
    pub fn end_secs(&self) -> u64 {
        match self {
            Phase::Presentation => QA_START_SECS,
            Phase::QAndA => ASSESSMENT_START_SECS,
            Phase::Assessment | Phase::Finished => FINISH_SECS,
        }
    }

    /// The assessment link is only surfaced from the assessment phase on.
    pub fn shows_assessment_link(&self) -> bool {
        matches!(self, Phase::Assessment | Phase::Finished)
    }
}

/// Audio cue requested from the tone generator.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum ToneKind {
    SingleWarning,
    DoubleWarning,
    PhaseBoundary,
    Completion,
}

impl ToneKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ToneKind::SingleWarning => "single-warning",
            ToneKind::DoubleWarning => "double-warning",
            ToneKind::PhaseBoundary => "phase-boundary",
            ToneKind::Completion => "completion",
        }
    }
}

/// Cue fired when the nominal clock lands exactly on `nominal_seconds`.
pub fn cue_at(nominal_seconds: u64) -> Option<ToneKind> {
    match nominal_seconds {
        SINGLE_WARNING_SECS => Some(ToneKind::SingleWarning),
        DOUBLE_WARNING_SECS => Some(ToneKind::DoubleWarning),
        QA_START_SECS | ASSESSMENT_START_SECS => Some(ToneKind::PhaseBoundary),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundaries_are_half_open() {
        assert_eq!(phase(0), Phase::Presentation);
        assert_eq!(phase(479), Phase::Presentation);
        assert_eq!(phase(480), Phase::QAndA);
        assert_eq!(phase(719), Phase::QAndA);
        assert_eq!(phase(720), Phase::Assessment);
        assert_eq!(phase(839), Phase::Assessment);
        assert_eq!(phase(840), Phase::Finished);
        assert_eq!(phase(10_000), Phase::Finished);
    }

    #[test]
    fn phase_durations_cover_the_session() {
        let total: u64 = [Phase::Presentation, Phase::QAndA, Phase::Assessment]
            .iter()
            .map(|p| p.info().duration_secs)
            .sum();
        assert_eq!(total, FINISH_SECS);
    }

    #[test]
    fn cues_only_on_exact_boundaries() {
        assert_eq!(cue_at(299), None);
        assert_eq!(cue_at(300), Some(ToneKind::SingleWarning));
        assert_eq!(cue_at(301), None);
        assert_eq!(cue_at(420), Some(ToneKind::DoubleWarning));
        assert_eq!(cue_at(480), Some(ToneKind::PhaseBoundary));
        assert_eq!(cue_at(720), Some(ToneKind::PhaseBoundary));
        assert_eq!(cue_at(840), None);
    }

    #[test]
    fn assessment_link_visibility() {
        assert!(!Phase::Presentation.shows_assessment_link());
        assert!(!Phase::QAndA.shows_assessment_link());
        assert!(Phase::Assessment.shows_assessment_link());
        assert!(Phase::Finished.shows_assessment_link());
    }
}
