mod generator;
mod seed;

pub use generator::{JitterSource, SeededJitter};
pub use seed::{FixedSeedSource, OsSeedSource, SeedPair, SeedSource};
