mod batch;

pub use batch::{Batch, Direction};

use chrono::{DateTime, Utc};
use log::{debug, info};
use rand::{seq::SliceRandom, Rng};

use crate::models::{BatchSeed, Group, GroupStatus};
use crate::refusal::Refusal;

/// Result of a successful `select_group`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// A completed group is displayed read-only.
    Review { abandoned: Option<String> },
    /// The group became active with a fresh, stopped clock.
    Activated { abandoned: Option<String> },
}

/// Groups per batch and their activation lifecycle.
///
/// Only the selected batch can hold an active group: switching batches
/// abandons it first.
#[derive(Debug, Clone)]
pub struct SessionRegistry {
    batches: Vec<Batch>,
    selected: usize,
}

impl SessionRegistry {
    pub fn new(seeds: Vec<BatchSeed>) -> Self {
        Self {
            batches: seeds.into_iter().map(Batch::from).collect(),
            selected: 0,
        }
    }

    pub fn batches(&self) -> &[Batch] {
        &self.batches
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    pub fn current_batch(&self) -> Option<&Batch> {
        self.batches.get(self.selected)
    }

    fn current_batch_mut(&mut self) -> Result<&mut Batch, Refusal> {
        self.batches
            .get_mut(self.selected)
            .ok_or(Refusal::OutOfRange)
    }

    pub fn groups(&self) -> &[Group] {
        self.current_batch().map(Batch::groups).unwrap_or(&[])
    }

    pub fn find(&self, id: &str) -> Option<&Group> {
        self.groups().iter().find(|g| g.id == id)
    }

    pub fn active_group(&self) -> Option<&Group> {
        self.groups().iter().find(|g| g.is_active())
    }

    pub fn first_pending(&self) -> Option<&Group> {
        self.current_batch().and_then(Batch::first_pending)
    }

    pub fn select_group(&mut self, id: &str) -> Result<Selection, Refusal> {
        let batch = self.current_batch_mut()?;
        let index = batch
            .position(id)
            .ok_or_else(|| Refusal::UnknownGroup(id.to_string()))?;

        if batch.groups[index].is_active() {
            return Err(Refusal::AlreadyActive);
        }

        let abandoned = batch.abandon_active();
        if let Some(previous) = &abandoned {
            info!("Group {} abandoned; progress discarded", previous);
        }

        let target = &mut batch.groups[index];
        if target.is_completed() {
            debug!("Reviewing completed group {}", target.id);
            return Ok(Selection::Review { abandoned });
        }

        target.status = GroupStatus::Active;
        info!("Group {} is now active", target.id);
        Ok(Selection::Activated { abandoned })
    }

    /// The only path that writes `recorded_duration`.
    pub fn mark_active_completed(
        &mut self,
        actual_elapsed_seconds: u64,
        completed_at: DateTime<Utc>,
    ) -> Result<Group, Refusal> {
        let batch = self.current_batch_mut()?;
        let index = batch.active_position().ok_or(Refusal::NoActiveGroup)?;

        let group = &mut batch.groups[index];
        group.status = GroupStatus::Completed;
        group.recorded_duration = Some(actual_elapsed_seconds);
        group.completed_at = Some(completed_at);

        info!(
            "Group {} completed after {}s of presenting",
            group.id, actual_elapsed_seconds
        );
        Ok(group.clone())
    }

    /// Swaps the group at `index` with its neighbour.
    pub fn reorder(
        &mut self,
        index: usize,
        direction: Direction,
        active_running: bool,
    ) -> Result<(), Refusal> {
        let batch = self.current_batch_mut()?;
        let len = batch.groups.len();
        if index >= len {
            return Err(Refusal::OutOfRange);
        }

        let target = match direction {
            Direction::Up => index.checked_sub(1),
            Direction::Down => Some(index + 1).filter(|&t| t < len),
        }
        .ok_or(Refusal::OutOfRange)?;

        let moving = &batch.groups[index];
        if moving.is_active() && active_running {
            return Err(Refusal::ActiveGroupRunning);
        }
        if moving.is_completed() || batch.groups[target].is_completed() {
            return Err(Refusal::GroupCompleted);
        }

        batch.groups.swap(index, target);
        Ok(())
    }

    /// Randomly permutes the groups that are not completed; completed groups
    /// keep their positions.
    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<(), Refusal> {
        let batch = self.current_batch_mut()?;
        if batch.has_active() {
            return Err(Refusal::SessionActive);
        }

        let slots: Vec<usize> = batch
            .groups
            .iter()
            .enumerate()
            .filter(|(_, g)| !g.is_completed())
            .map(|(i, _)| i)
            .collect();

        let mut movable: Vec<Group> = slots.iter().map(|&i| batch.groups[i].clone()).collect();
        movable.shuffle(rng);

        for (slot, group) in slots.into_iter().zip(movable) {
            batch.groups[slot] = group;
        }
        Ok(())
    }

    pub fn rename(&mut self, id: &str, new_name: &str) -> Result<(), Refusal> {
        let batch = self.current_batch_mut()?;
        let index = batch
            .position(id)
            .ok_or_else(|| Refusal::UnknownGroup(id.to_string()))?;

        let group = &mut batch.groups[index];
        if group.is_completed() {
            return Err(Refusal::GroupCompleted);
        }
        group.name = new_name.to_string();
        Ok(())
    }

    /// Returns the id of the group abandoned by the switch, if one was active.
    pub fn switch_batch(&mut self, index: usize) -> Result<Option<String>, Refusal> {
        if index >= self.batches.len() {
            return Err(Refusal::OutOfRange);
        }
        if index == self.selected {
            return Err(Refusal::AlreadySelected);
        }

        let abandoned = self.current_batch_mut()?.abandon_active();
        self.selected = index;
        info!("Switched to batch {}", self.batches[index].label());
        Ok(abandoned)
    }
}
