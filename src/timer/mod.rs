pub mod commands;
pub mod controller;
pub mod phase;
pub mod state;

pub use controller::{ClassroomEvent, GroupCompletedEvent, TimerController};
pub use phase::{phase, Phase, PhaseInfo, ToneKind, FINISH_SECS};
pub use state::{PhaseTimer, TimerOutcome, TimerSession};
