use log::trace;

use super::ReplacementPolicy;
use crate::{
    frame_allocator::FrameAllocator,
    page_table::{PageTable, PageTableEntry},
};

#[derive(Debug, Clone, Copy)]
struct Link {
    prev: Option<usize>,
    next: Option<usize>,
}

/// Exact least-recently-used replacement.
///
/// Frames form a doubly linked list ordered from least recently used (head)
/// to most recently used (tail). The links live in an arena indexed by frame
/// number, so both a reference and an eviction are O(1) and no node is ever
/// allocated after construction. A frame is untracked (`None`) until its
/// first reference and again right after it is evicted.
#[derive(Debug)]
pub struct Lru {
    links: Vec<Option<Link>>,
    head: Option<usize>,
    tail: Option<usize>,
    len: usize,
}

impl Lru {
    pub fn new(frame_count: usize) -> Self {
        Self {
            links: vec![None; frame_count],
            head: None,
            tail: None,
            len: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_tracked(&self, frame: usize) -> bool {
        matches!(self.links.get(frame), Some(Some(_)))
    }

    /// Tracked frames from least to most recently used.
    pub fn frames(&self) -> impl Iterator<Item = usize> + '_ {
        std::iter::successors(self.head, move |frame| {
            self.links[*frame].and_then(|link| link.next)
        })
    }

    fn push_back(&mut self, frame: usize) {
        self.links[frame] = Some(Link {
            prev: self.tail,
            next: None,
        });
        match self.tail {
            Some(tail) => {
                if let Some(link) = self.links[tail].as_mut() {
                    link.next = Some(frame);
                }
            }
            None => self.head = Some(frame),
        }
        self.tail = Some(frame);
        self.len += 1;
    }

    fn push_front(&mut self, frame: usize) {
        self.links[frame] = Some(Link {
            prev: None,
            next: self.head,
        });
        match self.head {
            Some(head) => {
                if let Some(link) = self.links[head].as_mut() {
                    link.prev = Some(frame);
                }
            }
            None => self.tail = Some(frame),
        }
        self.head = Some(frame);
        self.len += 1;
    }

    fn unlink(&mut self, frame: usize) -> Option<Link> {
        let link = self.links[frame].take()?;
        match link.prev {
            Some(prev) => {
                if let Some(prev) = self.links[prev].as_mut() {
                    prev.next = link.next;
                }
            }
            None => self.head = link.next,
        }
        match link.next {
            Some(next) => {
                if let Some(next) = self.links[next].as_mut() {
                    next.prev = link.prev;
                }
            }
            None => self.tail = link.prev,
        }
        self.len -= 1;
        Some(link)
    }

    /// Moves `frame` to the most recently used end, tracking it if needed.
    pub fn touch(&mut self, frame: usize) {
        if self.tail == Some(frame) {
            return;
        }
        self.unlink(frame);
        self.push_back(frame);
    }

    /// Removes and returns the least recently used frame.
    pub fn pop_front(&mut self) -> Option<usize> {
        let frame = self.head?;
        self.unlink(frame);
        Some(frame)
    }
}

impl ReplacementPolicy for Lru {
    fn select_victim(
        &mut self,
        _frames: &FrameAllocator,
        _page_table: &mut PageTable,
    ) -> Option<usize> {
        let victim = self.pop_front()?;
        trace!("LRU victim is frame {}", victim);
        Some(victim)
    }

    fn on_reference(&mut self, entry: &mut PageTableEntry) {
        if let Some(frame) = entry.frame_number() {
            self.touch(frame);
        }
    }

    /// The victim came off the head, so it goes back there.
    fn restore(&mut self, frame: usize) {
        if frame < self.links.len() && !self.is_tracked(frame) {
            self.push_front(frame);
        }
    }

    fn capacity(&self) -> Option<usize> {
        Some(self.links.len())
    }

    fn name(&self) -> &'static str {
        "lru"
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use rand::{rngs::StdRng, Rng, SeedableRng};

    use super::*;

    fn resident(frame: usize) -> PageTableEntry {
        let mut entry = PageTableEntry::default();
        entry.map_to_frame(frame);
        entry
    }

    fn order(lru: &Lru) -> Vec<usize> {
        lru.frames().collect()
    }

    #[test]
    fn test_first_reference_appends_at_tail() {
        let mut lru = Lru::new(4);
        assert!(lru.is_empty());
        for frame in [2, 0, 3] {
            lru.on_reference(&mut resident(frame));
        }
        assert_eq!(order(&lru), vec![2, 0, 3]);
        assert_eq!(lru.len(), 3);
        assert!(!lru.is_tracked(1));
    }

    #[test]
    fn test_reference_to_tail_is_noop() {
        let mut lru = Lru::new(3);
        lru.touch(0);
        lru.touch(1);
        lru.touch(1);
        assert_eq!(order(&lru), vec![0, 1]);
        assert_eq!(lru.len(), 2);
    }

    #[test]
    fn test_reference_to_head_moves_it_to_tail() {
        let mut lru = Lru::new(3);
        lru.touch(0);
        lru.touch(1);
        lru.touch(2);
        lru.touch(0);
        assert_eq!(order(&lru), vec![1, 2, 0]);
    }

    #[test]
    fn test_reference_to_interior_moves_it_to_tail() {
        let mut lru = Lru::new(4);
        for frame in 0..4 {
            lru.touch(frame);
        }
        lru.touch(2);
        assert_eq!(order(&lru), vec![0, 1, 3, 2]);
        lru.touch(1);
        assert_eq!(order(&lru), vec![0, 3, 2, 1]);
    }

    #[test]
    fn test_single_node_list() {
        let mut lru = Lru::new(1);
        lru.touch(0);
        lru.touch(0);
        assert_eq!(order(&lru), vec![0]);
        assert_eq!(lru.pop_front(), Some(0));
        assert!(lru.is_empty());
        assert_eq!(lru.pop_front(), None);
    }

    #[test]
    fn test_eviction_takes_head_and_untracks_frame() {
        let mut lru = Lru::new(3);
        let frames = FrameAllocator::init(3);
        let mut table = PageTable::init();
        for frame in [1, 0, 2] {
            lru.touch(frame);
        }
        assert_eq!(lru.select_victim(&frames, &mut table), Some(1));
        assert!(!lru.is_tracked(1));
        assert_eq!(order(&lru), vec![0, 2]);

        // The evicted frame comes back as a brand new node at the tail.
        lru.touch(1);
        assert_eq!(order(&lru), vec![0, 2, 1]);
        assert_eq!(lru.select_victim(&frames, &mut table), Some(0));
        assert_eq!(lru.select_victim(&frames, &mut table), Some(2));
        assert_eq!(lru.select_victim(&frames, &mut table), Some(1));
        assert_eq!(lru.select_victim(&frames, &mut table), None);
    }

    #[test]
    fn test_restore_returns_victim_to_head() {
        let mut lru = Lru::new(3);
        let frames = FrameAllocator::init(3);
        let mut table = PageTable::init();
        for frame in [2, 0, 1] {
            lru.touch(frame);
        }
        let victim = lru.select_victim(&frames, &mut table).unwrap();
        assert_eq!(victim, 2);
        lru.restore(victim);
        assert_eq!(order(&lru), vec![2, 0, 1]);
        assert_eq!(lru.len(), 3);

        // Restoring a frame that is already tracked changes nothing.
        lru.restore(0);
        assert_eq!(order(&lru), vec![2, 0, 1]);
        assert_eq!(lru.select_victim(&frames, &mut table), Some(2));
    }

    #[test]
    fn test_restore_into_empty_list() {
        let mut lru = Lru::new(2);
        lru.restore(1);
        assert_eq!(order(&lru), vec![1]);
        lru.touch(0);
        assert_eq!(order(&lru), vec![1, 0]);
        assert_eq!(lru.capacity(), Some(2));
    }

    #[test]
    fn test_order_matches_last_reference_time() {
        const FRAMES: usize = 16;
        let mut rng = StdRng::seed_from_u64(369);
        let mut lru = Lru::new(FRAMES);
        let mut last_used: HashMap<usize, usize> = HashMap::new();

        for time in 0..2_000 {
            if rng.gen_bool(0.1) {
                if let Some(victim) = lru.pop_front() {
                    let oldest = last_used.values().min().copied();
                    assert_eq!(last_used.remove(&victim), oldest);
                }
                continue;
            }
            let frame = rng.gen_range(0..FRAMES);
            lru.touch(frame);
            last_used.insert(frame, time);

            let times: Vec<usize> = lru.frames().map(|frame| last_used[&frame]).collect();
            assert!(times.windows(2).all(|pair| pair[0] <= pair[1]));
            assert_eq!(times.len(), last_used.len());
            assert_eq!(lru.len(), last_used.len());
        }
    }
}
