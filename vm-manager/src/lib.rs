//! Demand-paged virtual memory for a single simulated process.
//!
//! A [`Simulator`] owns a two-level [`PageTable`], a fixed pool of physical
//! frames, a swap area and a [`ReplacementPolicy`]. Each call to
//! [`Simulator::find_physpage`] is one memory reference: it faults the page
//! in if needed, evicting a victim when the pool is full, and keeps the
//! hit/miss/eviction [`Counters`].

pub mod address;
pub mod config;
pub mod counters;
pub mod error;
pub mod frame_allocator;
pub mod page_table;
pub mod replacement;
pub mod simulator;

pub use address::{PageIndex, VirtAddr, PAGE_SIZE, SIM_PAGE_SIZE, VADDR_STAMP_OFFSET};
pub use config::{ReplacementAlgorithm, SimConfig};
pub use counters::Counters;
pub use error::{ConfigError, SimulatorError};
pub use page_table::{PageState, PageTable, PageTableEntry};
pub use replacement::{Clock, Lru, ReplacementPolicy};
pub use simulator::{AccessType, Simulator};
pub use swap_manager::{SwapError, SwapOffset};
