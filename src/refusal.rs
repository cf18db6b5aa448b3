use thiserror::Error;

/// Why a command was ignored. Refusals leave state untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Refusal {
    #[error("no active group")]
    NoActiveGroup,
    #[error("unknown group {0}")]
    UnknownGroup(String),
    #[error("group is already active")]
    AlreadyActive,
    #[error("timer is already running")]
    AlreadyRunning,
    #[error("group is completed")]
    GroupCompleted,
    #[error("active group is presenting")]
    ActiveGroupRunning,
    #[error("a group is active")]
    SessionActive,
    #[error("position out of range")]
    OutOfRange,
    #[error("batch already selected")]
    AlreadySelected,
    #[error("no pending group left")]
    NoPendingGroup,
}
