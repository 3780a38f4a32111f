use log::trace;

use crate::address::PageIndex;

/// One slot of physical memory. `page` points back at the page-table entry
/// of the current occupant; the page table owns that entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Frame {
    pub in_use: bool,
    pub page: Option<PageIndex>,
}

/// The coremap: one descriptor per physical frame.
#[derive(Debug)]
pub struct FrameAllocator {
    frames: Vec<Frame>,
}

impl FrameAllocator {
    pub fn init(frame_count: usize) -> Self {
        Self {
            frames: vec![Frame::default(); frame_count],
        }
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Page currently held by `frame`, if any.
    pub fn occupant(&self, frame: usize) -> Option<PageIndex> {
        self.frames.get(frame)?.page
    }

    /// Lowest-numbered frame not in use.
    pub fn find_free(&self) -> Option<usize> {
        let free = self.frames.iter().position(|frame| !frame.in_use);
        if free.is_none() {
            trace!("No free frames");
        }
        free
    }

    /// Hands `frame` to `page`, replacing whatever occupied it.
    pub fn install(&mut self, frame: usize, page: PageIndex) {
        self.frames[frame] = Frame {
            in_use: true,
            page: Some(page),
        };
    }

    pub fn in_use(&self) -> usize {
        self.frames.iter().filter(|frame| frame.in_use).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(table: usize) -> PageIndex {
        PageIndex {
            directory: 0,
            table,
        }
    }

    #[test]
    fn test_find_free_scans_in_order() {
        let mut allocator = FrameAllocator::init(3);
        assert_eq!(allocator.find_free(), Some(0));
        allocator.install(0, page(10));
        assert_eq!(allocator.find_free(), Some(1));
        allocator.install(2, page(12));
        assert_eq!(allocator.find_free(), Some(1));
        allocator.install(1, page(11));
        assert_eq!(allocator.find_free(), None);
        assert_eq!(allocator.in_use(), 3);
    }

    #[test]
    fn test_install_replaces_occupant() {
        let mut allocator = FrameAllocator::init(1);
        allocator.install(0, page(1));
        assert_eq!(allocator.occupant(0), Some(page(1)));
        allocator.install(0, page(2));
        assert_eq!(allocator.occupant(0), Some(page(2)));
        assert_eq!(allocator.in_use(), 1);
        assert_eq!(allocator.occupant(5), None);
    }
}
