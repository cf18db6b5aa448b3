use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum GroupStatus {
    Pending,
    Active,
    Completed,
}

impl GroupStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            GroupStatus::Pending => "pending",
            GroupStatus::Active => "active",
            GroupStatus::Completed => "completed",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub id: String,
    pub name: String,
    pub status: GroupStatus,
    /// Genuine presenting time in seconds. Written once, on completion.
    pub recorded_duration: Option<u64>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Group {
    pub fn pending(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            status: GroupStatus::Pending,
            recorded_duration: None,
            completed_at: None,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == GroupStatus::Completed
    }

    pub fn is_active(&self) -> bool {
        self.status == GroupStatus::Active
    }
}

impl From<GroupSeed> for Group {
    fn from(seed: GroupSeed) -> Self {
        Group::pending(seed.id, seed.name)
    }
}

/// Startup data for one group.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupSeed {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchSeed {
    pub label: String,
    pub groups: Vec<GroupSeed>,
}
