mod resolver;

pub use resolver::{jittered, resolve, EffectiveSettings, MIN_JITTER_BASE};
