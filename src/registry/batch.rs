use serde::{Deserialize, Serialize};

use crate::models::{BatchSeed, Group, GroupStatus};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum Direction {
    Up,
    Down,
}

/// An ordered list of groups presenting on the same day.
#[derive(Debug, Clone)]
pub struct Batch {
    label: String,
    pub(crate) groups: Vec<Group>,
}

impl From<BatchSeed> for Batch {
    fn from(seed: BatchSeed) -> Self {
        Self {
            label: seed.label,
            groups: seed.groups.into_iter().map(Group::from).collect(),
        }
    }
}

impl Batch {
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.groups.iter().position(|g| g.id == id)
    }

    pub fn active_position(&self) -> Option<usize> {
        self.groups.iter().position(Group::is_active)
    }

    pub fn has_active(&self) -> bool {
        self.active_position().is_some()
    }

    pub fn first_pending(&self) -> Option<&Group> {
        self.groups.iter().find(|g| g.status == GroupStatus::Pending)
    }

    /// Reverts the active group, if any, to Pending and returns its id.
    pub(crate) fn abandon_active(&mut self) -> Option<String> {
        let index = self.active_position()?;
        let group = &mut self.groups[index];
        group.status = GroupStatus::Pending;
        Some(group.id.clone())
    }
}
