// src/jitter/seed.rs
use serde::Serialize;

/// The two seeds a [`SeededJitter`](super::SeededJitter) is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SeedPair {
    pub seed1: u64,
    pub seed2: u64,
}

impl SeedPair {
    pub fn new(seed1: u64, seed2: u64) -> Self {
        Self { seed1, seed2 }
    }

    /// Use the configured seeds where present and draw the missing ones from `source`.
    pub fn resolve(seed1: Option<u64>, seed2: Option<u64>, source: &mut impl SeedSource) -> Self {
        let seed1 = seed1.unwrap_or_else(|| source.next_seed());
        let seed2 = seed2.unwrap_or_else(|| source.next_seed());
        Self { seed1, seed2 }
    }
}

/// Supplies default seeds when none are configured.
pub trait SeedSource {
    fn next_seed(&mut self) -> u64;
}

/// Per-run random seeds from the thread-local OS-seeded generator.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsSeedSource;

impl SeedSource for OsSeedSource {
    fn next_seed(&mut self) -> u64 {
        rand::random()
    }
}

/// Hands out a fixed list of seeds, cycling when exhausted.
#[derive(Debug, Clone)]
pub struct FixedSeedSource {
    seeds: Vec<u64>,
    next: usize,
}

impl FixedSeedSource {
    pub fn new(seeds: impl Into<Vec<u64>>) -> Self {
        Self {
            seeds: seeds.into(),
            next: 0,
        }
    }
}

impl SeedSource for FixedSeedSource {
    fn next_seed(&mut self) -> u64 {
        if self.seeds.is_empty() {
            return 0;
        }
        let seed = self.seeds[self.next % self.seeds.len()];
        self.next += 1;
        seed
    }
}
