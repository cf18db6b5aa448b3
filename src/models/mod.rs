pub mod group;
pub mod seeds;

pub use group::{BatchSeed, Group, GroupSeed, GroupStatus};
pub use seeds::default_batches;
