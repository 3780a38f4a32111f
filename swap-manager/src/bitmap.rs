/// One bit per swap slot, set while the slot holds a page.
#[derive(Debug)]
pub struct Bitmap {
    bitmap: Vec<u8>,
    slots: usize,
}

impl Bitmap {
    /// Bytes needed to track `slots` slots.
    pub fn size(slots: usize) -> usize {
        slots / 8 + if slots % 8 == 0 { 0 } else { 1 }
    }

    pub fn new(slots: usize) -> Bitmap {
        Bitmap {
            bitmap: vec![0; Self::size(slots)],
            slots,
        }
    }

    pub fn slots(&self) -> usize {
        self.slots
    }

    /// Claims the lowest free slot.
    pub fn allocate(&mut self) -> Option<usize> {
        for i in 0..self.bitmap.len() {
            if self.bitmap[i] == 0xff {
                continue;
            }
            for j in 0..8 {
                let slot = i * 8 + j;
                if slot >= self.slots {
                    return None;
                }
                if self.bitmap[i] & (1 << j) == 0 {
                    self.bitmap[i] |= 1 << j;
                    return Some(slot);
                }
            }
        }
        None
    }

    pub fn is_allocated(&self, slot: usize) -> bool {
        slot < self.slots && self.bitmap[slot / 8] & (1 << (slot % 8)) != 0
    }

    pub fn allocated(&self) -> usize {
        self.bitmap.iter().map(|b| b.count_ones() as usize).sum()
    }
}
