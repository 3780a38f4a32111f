use std::{
    fmt,
    str::FromStr,
    sync::atomic::{AtomicUsize, Ordering},
};

use crate::{
    error::ConfigError,
    replacement::{Clock, Lru, ReplacementPolicy},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReplacementAlgorithm {
    #[default]
    Lru,
    Clock,
}

impl ReplacementAlgorithm {
    pub fn build(self, frame_count: usize, seed: Option<u64>) -> Box<dyn ReplacementPolicy> {
        match self {
            ReplacementAlgorithm::Lru => Box::new(Lru::new(frame_count)),
            ReplacementAlgorithm::Clock => Box::new(Clock::new(seed)),
        }
    }
}

impl FromStr for ReplacementAlgorithm {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "lru" => Ok(ReplacementAlgorithm::Lru),
            "clock" => Ok(ReplacementAlgorithm::Clock),
            _ => Err(ConfigError::UnknownAlgorithm(s.to_string())),
        }
    }
}

impl fmt::Display for ReplacementAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReplacementAlgorithm::Lru => write!(f, "lru"),
            ReplacementAlgorithm::Clock => write!(f, "clock"),
        }
    }
}

/// Everything fixed for the lifetime of one simulation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimConfig {
    /// Physical frames in the pool.
    pub frame_count: usize,
    /// Pages the swap image can hold.
    pub swap_slots: usize,
    pub algorithm: ReplacementAlgorithm,
    /// Seed for the clock policy's sampling. `None` draws from the OS.
    pub seed: Option<u64>,
    /// Names the swap image file of this run. Each default config gets a
    /// name no other config in the process has.
    pub swap_name: String,
}

static NEXT_SWAP_IMAGE: AtomicUsize = AtomicUsize::new(0);

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            frame_count: 16,
            swap_slots: 4096,
            algorithm: ReplacementAlgorithm::default(),
            seed: None,
            swap_name: format!(
                "vmsim_{}_{}",
                std::process::id(),
                NEXT_SWAP_IMAGE.fetch_add(1, Ordering::Relaxed)
            ),
        }
    }
}

impl SimConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.frame_count == 0 {
            return Err(ConfigError::NoFrames);
        }
        if self.swap_slots == 0 {
            return Err(ConfigError::NoSwap);
        }
        Ok(())
    }
}
