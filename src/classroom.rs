//! The synchronous core: one registry, at most one bound phase timer.
//!
//! Every command here runs to completion before the next tick is handled;
//! the async controller guarantees that by holding one lock around it.

use chrono::Utc;
use log::{debug, info};
use rand::Rng;
use uuid::Uuid;

use crate::models::{BatchSeed, Group};
use crate::refusal::Refusal;
use crate::registry::{Direction, Selection, SessionRegistry};
use crate::timer::{phase, Phase, PhaseTimer, TimerOutcome, ToneKind, FINISH_SECS};

/// Side effects the caller must carry out after a command or tick.
#[derive(Debug, Clone, Default)]
pub struct Effects {
    pub tones: Vec<ToneKind>,
    pub completed: Option<Group>,
}

impl Effects {
    pub fn is_empty(&self) -> bool {
        self.tones.is_empty() && self.completed.is_none()
    }
}

#[derive(Debug, Clone)]
pub struct Classroom {
    registry: SessionRegistry,
    timer: Option<PhaseTimer>,
    review: Option<String>,
}

impl Classroom {
    pub fn new(seeds: Vec<BatchSeed>) -> Self {
        Self {
            registry: SessionRegistry::new(seeds),
            timer: None,
            review: None,
        }
    }

    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    pub fn timer(&self) -> Option<&PhaseTimer> {
        self.timer.as_ref()
    }

    pub fn review_group(&self) -> Option<&Group> {
        self.review.as_deref().and_then(|id| self.registry.find(id))
    }

    /// The group shown on the big timer: the active one, or one under review.
    pub fn displayed_group(&self) -> Option<&Group> {
        self.registry
            .active_group()
            .or_else(|| self.review_group())
    }

    pub fn is_running(&self) -> bool {
        self.timer.as_ref().is_some_and(PhaseTimer::is_running)
    }

    pub fn nominal_seconds(&self) -> u64 {
        match (&self.timer, &self.review) {
            (Some(timer), _) => timer.session().nominal_seconds,
            (None, Some(_)) => FINISH_SECS,
            (None, None) => 0,
        }
    }

    pub fn actual_elapsed_seconds(&self) -> u64 {
        self.timer
            .as_ref()
            .map(|t| t.session().actual_elapsed_seconds)
            .unwrap_or(0)
    }

    pub fn phase(&self) -> Phase {
        phase(self.nominal_seconds())
    }

    pub fn select_group(&mut self, id: &str) -> Result<Selection, Refusal> {
        let selection = self.registry.select_group(id)?;
        match &selection {
            Selection::Review { .. } => {
                self.timer = None;
                self.review = Some(id.to_string());
            }
            Selection::Activated { .. } => {
                let timer = PhaseTimer::new(Uuid::new_v4().to_string());
                debug!("Session {} bound to group {}", timer.session_id(), id);
                self.timer = Some(timer);
                self.review = None;
            }
        }
        Ok(selection)
    }

    pub fn start(&mut self) -> Result<(), Refusal> {
        if self.review.is_some() {
            return Err(Refusal::GroupCompleted);
        }
        let timer = self.timer.as_mut().ok_or(Refusal::NoActiveGroup)?;
        if timer.start() {
            info!("Session {} running", timer.session_id());
            Ok(())
        } else {
            Err(Refusal::AlreadyRunning)
        }
    }

    pub fn pause(&mut self) -> Result<(), Refusal> {
        let timer = self.timer.as_mut().ok_or(Refusal::NoActiveGroup)?;
        if timer.pause() {
            info!("Session {} paused", timer.session_id());
        }
        Ok(())
    }

    /// Start/pause button. With nothing displayed, prepares the first
    /// pending group instead of starting anything.
    pub fn toggle(&mut self) -> Result<(), Refusal> {
        if self.timer.is_none() && self.review.is_none() {
            let id = self
                .registry
                .first_pending()
                .map(|g| g.id.clone())
                .ok_or(Refusal::NoPendingGroup)?;
            return self.select_group(&id).map(|_| ());
        }

        if self.is_running() {
            self.pause()
        } else {
            self.start()
        }
    }

    pub fn tick(&mut self) -> Effects {
        let outcome = match self.timer.as_mut() {
            Some(timer) => timer.tick(),
            None => TimerOutcome::default(),
        };
        self.apply(outcome)
    }

    pub fn reset(&mut self) -> Result<(), Refusal> {
        if self.review.is_some() {
            return Err(Refusal::GroupCompleted);
        }
        let timer = self.timer.as_mut().ok_or(Refusal::NoActiveGroup)?;
        if timer.reset() {
            Ok(())
        } else {
            Err(Refusal::GroupCompleted)
        }
    }

    pub fn skip_to_next_phase(&mut self) -> Result<Effects, Refusal> {
        if self.review.is_some() {
            return Err(Refusal::GroupCompleted);
        }
        let timer = self.timer.as_mut().ok_or(Refusal::NoActiveGroup)?;
        let outcome = timer.skip_to_next_phase();
        Ok(self.apply(outcome))
    }

    pub fn reorder(&mut self, index: usize, direction: Direction) -> Result<(), Refusal> {
        let running = self.is_running();
        self.registry.reorder(index, direction, running)
    }

    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<(), Refusal> {
        self.registry.shuffle(rng)
    }

    pub fn rename(&mut self, id: &str, new_name: &str) -> Result<(), Refusal> {
        self.registry.rename(id, new_name)
    }

    pub fn switch_batch(&mut self, index: usize) -> Result<(), Refusal> {
        self.registry.switch_batch(index)?;
        self.timer = None;
        self.review = None;
        Ok(())
    }

    fn apply(&mut self, outcome: TimerOutcome) -> Effects {
        let completed = if outcome.completed {
            self.complete_active()
        } else {
            None
        };
        Effects {
            tones: outcome.tones,
            completed,
        }
    }

    fn complete_active(&mut self) -> Option<Group> {
        let timer = self.timer.take()?;
        let actual = timer.session().actual_elapsed_seconds;
        match self.registry.mark_active_completed(actual, Utc::now()) {
            Ok(group) => {
                self.review = Some(group.id.clone());
                Some(group)
            }
            Err(refusal) => {
                debug!("Completion ignored: {}", refusal);
                None
            }
        }
    }
}
