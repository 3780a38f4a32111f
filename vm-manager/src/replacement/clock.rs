use log::trace;
use rand::{rngs::StdRng, Rng, SeedableRng};

use super::ReplacementPolicy;
use crate::{
    frame_allocator::FrameAllocator,
    page_table::{PageTable, PageTableEntry},
};

/// Second-chance replacement driven by the referenced bit of each resident
/// page. Candidates are drawn uniformly at random rather than by a sweeping
/// hand: a referenced candidate loses its bit and another is drawn, and the
/// first candidate found unreferenced is the victim.
#[derive(Debug)]
pub struct Clock {
    rng: StdRng,
}

impl Clock {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { rng }
    }
}

impl ReplacementPolicy for Clock {
    fn select_victim(
        &mut self,
        frames: &FrameAllocator,
        page_table: &mut PageTable,
    ) -> Option<usize> {
        if frames.is_empty() {
            return None;
        }
        let mut draws = 0usize;
        loop {
            let candidate = self.rng.gen_range(0..frames.len());
            draws += 1;
            let entry = page_table.entry_at_mut(frames.occupant(candidate)?)?;
            if entry.is_referenced() {
                entry.clear_referenced();
            } else {
                trace!("Clock victim is frame {} after {} draws", candidate, draws);
                return Some(candidate);
            }
        }
    }

    fn on_reference(&mut self, entry: &mut PageTableEntry) {
        entry.set_referenced();
    }

    fn name(&self) -> &'static str {
        "clock"
    }
}
