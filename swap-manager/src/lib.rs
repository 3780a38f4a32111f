pub mod bitmap;

use std::fmt;

use disk::{Disk, DiskError};
use log::{debug, warn};
use thiserror::Error;

use self::bitmap::Bitmap;

/// Byte offset of a page inside the swap image. Always a multiple of the
/// page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SwapOffset(pub u64);

impl fmt::Display for SwapOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Error)]
pub enum SwapError {
    #[error("swap space is full")]
    Full,
    #[error("swap offset {0} is not a page boundary")]
    Misaligned(SwapOffset),
    #[error("swap slot at offset {0} was never written")]
    Unallocated(SwapOffset),
    #[error(transparent)]
    Disk(#[from] DiskError),
    #[error("cannot create swap image: {0}")]
    Io(#[from] std::io::Error),
}

/// Backing store for evicted pages. Slots are handed out lowest first and a
/// page keeps its slot for the lifetime of the manager, so writing the same
/// page out again reuses the offset it was given the first time.
#[derive(Debug)]
pub struct SwapManager<const PAGE_SIZE: usize> {
    bitmap: Bitmap,
    disk: Disk<PAGE_SIZE>,
}

impl<const PAGE_SIZE: usize> SwapManager<PAGE_SIZE> {
    pub fn init(name: &str, slots: usize) -> Result<Self, SwapError> {
        let disk = Disk::create(name, slots)?;
        debug!(
            "Swap image {} ready with {} slots",
            disk.path().display(),
            slots
        );
        Ok(SwapManager {
            bitmap: Bitmap::new(slots),
            disk,
        })
    }

    pub fn slots_in_use(&self) -> usize {
        self.bitmap.allocated()
    }

    fn slot_of(offset: SwapOffset) -> Result<usize, SwapError> {
        if offset.0 % PAGE_SIZE as u64 != 0 {
            return Err(SwapError::Misaligned(offset));
        }
        Ok((offset.0 / PAGE_SIZE as u64) as usize)
    }

    /// Writes `frame` to swap. A page that already owns a slot passes its
    /// offset and gets it back; otherwise a fresh slot is claimed.
    pub fn pageout(
        &mut self,
        frame: &[u8],
        offset: Option<SwapOffset>,
    ) -> Result<SwapOffset, SwapError> {
        let slot = match offset {
            Some(offset) => {
                let slot = Self::slot_of(offset)?;
                if !self.bitmap.is_allocated(slot) {
                    return Err(SwapError::Unallocated(offset));
                }
                slot
            }
            None => match self.bitmap.allocate() {
                Some(slot) => {
                    debug!("Allocated swap slot {}", slot);
                    slot
                }
                None => {
                    warn!("No free swap slots left of {}", self.bitmap.slots());
                    return Err(SwapError::Full);
                }
            },
        };
        self.disk.write_block(slot, frame)?;
        Ok(SwapOffset((slot * PAGE_SIZE) as u64))
    }

    /// Reads the page stored at `offset` into `frame`.
    pub fn pagein(&mut self, offset: SwapOffset, frame: &mut [u8]) -> Result<(), SwapError> {
        let slot = Self::slot_of(offset)?;
        if !self.bitmap.is_allocated(slot) {
            return Err(SwapError::Unallocated(offset));
        }
        self.disk.read_block(slot, frame)?;
        Ok(())
    }
}

impl<const PAGE_SIZE: usize> Drop for SwapManager<PAGE_SIZE> {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(self.disk.path()) {
            warn!(
                "Could not remove swap image {}: {}",
                self.disk.path().display(),
                e
            );
        }
    }
}
