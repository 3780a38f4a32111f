mod clock;
mod lru;

pub use clock::Clock;
pub use lru::Lru;

use crate::{
    frame_allocator::FrameAllocator,
    page_table::{PageTable, PageTableEntry},
};

/// A page-replacement algorithm.
///
/// The simulator calls `on_reference` after every access, once the entry is
/// resident and referenced, and `select_victim` only when every frame is in
/// use.
pub trait ReplacementPolicy {
    /// Picks the frame whose occupant will be evicted. Returns `None` only
    /// if the policy has nothing it could evict.
    fn select_victim(&mut self, frames: &FrameAllocator, page_table: &mut PageTable)
        -> Option<usize>;

    fn on_reference(&mut self, entry: &mut PageTableEntry);

    /// Takes back a victim whose eviction failed; the frame is still
    /// occupied by the same page.
    fn restore(&mut self, _frame: usize) {}

    /// Most frames the policy can track, if it is bounded.
    fn capacity(&self) -> Option<usize> {
        None
    }

    fn name(&self) -> &'static str;
}
