use serde::{Deserialize, Serialize};

use super::phase::{cue_at, phase, Phase, ToneKind, ASSESSMENT_START_SECS, FINISH_SECS, QA_START_SECS};

/// Clock state bound to the active group.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TimerSession {
    /// Drives phase computation; may jump forward on a phase skip.
    pub nominal_seconds: u64,
    /// Real ticks delivered while running. Phase skips never touch it.
    pub actual_elapsed_seconds: u64,
    pub running: bool,
}

/// What a timer operation produced: cues to play and whether the session ended.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimerOutcome {
    pub tones: Vec<ToneKind>,
    pub completed: bool,
}

impl TimerOutcome {
    fn cue(tone: ToneKind) -> Self {
        Self {
            tones: vec![tone],
            completed: false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.tones.is_empty() && !self.completed
    }
}

#[derive(Debug, Clone)]
pub struct PhaseTimer {
    session_id: String,
    session: TimerSession,
    finished: bool,
}

impl PhaseTimer {
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            session: TimerSession::default(),
            finished: false,
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn session(&self) -> &TimerSession {
        &self.session
    }

    pub fn phase(&self) -> Phase {
        phase(self.session.nominal_seconds)
    }

    pub fn is_running(&self) -> bool {
        self.session.running
    }

    /// Returns false when the call changed nothing.
    pub fn start(&mut self) -> bool {
        if self.finished || self.session.running {
            return false;
        }
        self.session.running = true;
        true
    }

    pub fn pause(&mut self) -> bool {
        let was_running = self.session.running;
        self.session.running = false;
        was_running
    }

    pub fn tick(&mut self) -> TimerOutcome {
        if !self.session.running || self.finished {
            return TimerOutcome::default();
        }

        self.session.nominal_seconds += 1;
        self.session.actual_elapsed_seconds += 1;

        if self.session.nominal_seconds >= FINISH_SECS {
            return self.finish();
        }

        cue_at(self.session.nominal_seconds)
            .map(TimerOutcome::cue)
            .unwrap_or_default()
    }

    pub fn reset(&mut self) -> bool {
        if self.finished {
            return false;
        }
        self.session = TimerSession::default();
        true
    }

    pub fn skip_to_next_phase(&mut self) -> TimerOutcome {
        if self.finished {
            return TimerOutcome::default();
        }

        match self.phase() {
            Phase::Presentation => {
                self.session.nominal_seconds = QA_START_SECS;
                TimerOutcome::cue(ToneKind::PhaseBoundary)
            }
            Phase::QAndA => {
                self.session.nominal_seconds = ASSESSMENT_START_SECS;
                TimerOutcome::cue(ToneKind::PhaseBoundary)
            }
            Phase::Assessment => self.finish(),
            Phase::Finished => TimerOutcome::default(),
        }
    }

    fn finish(&mut self) -> TimerOutcome {
        self.session.nominal_seconds = FINISH_SECS;
        self.session.running = false;
        self.finished = true;
        TimerOutcome {
            tones: vec![ToneKind::Completion],
            completed: true,
        }
    }
}
