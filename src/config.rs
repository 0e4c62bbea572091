//! Construction options for a [`PieceTable`](crate::PieceTable).

use rand::SeedableRng;
use rand::rngs::SmallRng;

/// How many edits are kept on each history stack unless told otherwise.
pub const DEFAULT_MAX_HISTORY: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Depth limit shared by the undo and redo stacks.
    pub max_history: usize,
    /// Seed for node priorities. `None` seeds from the OS.
    pub seed: Option<u64>,
}

impl Config {
    pub fn new() -> Config {
        return Config {
            max_history: DEFAULT_MAX_HISTORY,
            seed: None,
        };
    }

    pub fn max_history(mut self, max_history: usize) -> Config {
        self.max_history = max_history;
        return self;
    }

    /// Fix the priority sequence, for reproducible tree shapes.
    pub fn seed(mut self, seed: u64) -> Config {
        self.seed = Some(seed);
        return self;
    }

    pub(crate) fn rng(&self) -> SmallRng {
        return match self.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
