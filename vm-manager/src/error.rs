use memory::MemoryError;
use swap_manager::SwapError;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("the frame pool needs at least one frame")]
    NoFrames,
    #[error("the swap area needs at least one slot")]
    NoSwap,
    #[error("unknown replacement algorithm `{0}` (expected lru or clock)")]
    UnknownAlgorithm(String),
    #[error("{policy} replacement tracks {capacity} frames but the pool has {frames}")]
    PolicyTooSmall {
        policy: &'static str,
        capacity: usize,
        frames: usize,
    },
}

#[derive(Debug, Error)]
pub enum SimulatorError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    /// Swap failures are fatal: there is no meaningful way to continue a run
    /// once a dirty page cannot be written out.
    #[error("swap failure: {0}")]
    Swap(#[from] SwapError),
    #[error(transparent)]
    Memory(#[from] MemoryError),
    #[error("replacement policy `{0}` found no frame to evict")]
    NoEvictableFrame(&'static str),
}
