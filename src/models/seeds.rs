use super::{BatchSeed, GroupSeed};

const GROUPS_PER_BATCH: usize = 10;

/// Two weeks of ten groups each; week 2 continues the numbering.
pub fn default_batches() -> Vec<BatchSeed> {
    (0..2)
        .map(|batch| {
            let first = batch * GROUPS_PER_BATCH + 1;
            let last = first + GROUPS_PER_BATCH - 1;
            BatchSeed {
                label: format!("Week {} (Gr {}-{})", batch + 1, first, last),
                groups: (0..GROUPS_PER_BATCH)
                    .map(|i| GroupSeed {
                        id: format!("b{}-g{}", batch + 1, i + 1),
                        name: format!("Group {}", first + i),
                    })
                    .collect(),
            }
        })
        .collect()
}
