
use std::{fmt, io};

use log::{debug, trace, warn};
use memory::PhysicalMemory;
use swap_manager::SwapManager;

use crate::{
    address::{PageIndex, VirtAddr, SIM_PAGE_SIZE, VADDR_STAMP_OFFSET},
    config::SimConfig,
    counters::Counters,
    error::{ConfigError, SimulatorError},
    frame_allocator::FrameAllocator,
    page_table::{PageTable, PageTableEntry},
    replacement::ReplacementPolicy,
};

/// Kind of memory reference, as recorded in a trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessType {
    Instruction,
    Load,
    Store,
    Modify,
}

impl AccessType {
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'I' => Some(AccessType::Instruction),
            'L' => Some(AccessType::Load),
            'S' => Some(AccessType::Store),
            'M' => Some(AccessType::Modify),
            _ => None,
        }
    }

    /// Stores and modifies dirty the page; instruction fetches and loads don't.
    pub fn is_write(self) -> bool {
        matches!(self, AccessType::Store | AccessType::Modify)
    }
}

impl fmt::Display for AccessType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = match self {
            AccessType::Instruction => 'I',
            AccessType::Load => 'L',
            AccessType::Store => 'S',
            AccessType::Modify => 'M',
        };
        write!(f, "{}", c)
    }
}

/// One simulated process: its page table, the physical frames and swap
/// space backing it, the replacement policy, and the event counters.
pub struct Simulator {
    config: SimConfig,
    page_table: PageTable,
    frames: FrameAllocator,
    memory: PhysicalMemory<SIM_PAGE_SIZE>,
    swap: SwapManager<SIM_PAGE_SIZE>,
    policy: Box<dyn ReplacementPolicy>,
    counters: Counters,
}

impl fmt::Debug for Simulator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Simulator")
            .field("config", &self.config)
            .field("policy", &self.policy.name())
            .field("counters", &self.counters)
            .finish()
    }
}

impl Simulator {
    /// Starts a run with the policy named in `config`.
    pub fn init(config: SimConfig) -> Result<Self, SimulatorError> {
        let policy = config.algorithm.build(config.frame_count, config.seed);
        Self::with_policy(config, policy)
    }

    /// Starts a run with a caller-supplied policy; `config.algorithm` is
    /// ignored.
    pub fn with_policy(
        config: SimConfig,
        policy: Box<dyn ReplacementPolicy>,
    ) -> Result<Self, SimulatorError> {
        config.validate()?;
        if let Some(capacity) = policy.capacity() {
            if capacity < config.frame_count {
                return Err(ConfigError::PolicyTooSmall {
                    policy: policy.name(),
                    capacity,
                    frames: config.frame_count,
                }
                .into());
            }
        }
        let swap = SwapManager::init(&config.swap_name, config.swap_slots)?;
        debug!(
            "Simulating {} frames, {} swap slots, {} replacement",
            config.frame_count,
            config.swap_slots,
            policy.name()
        );
        Ok(Simulator {
            page_table: PageTable::init(),
            frames: FrameAllocator::init(config.frame_count),
            memory: PhysicalMemory::create(config.frame_count),
            swap,
            policy,
            counters: Counters::default(),
            config,
        })
    }

    pub fn counters(&self) -> &Counters {
        &self.counters
    }

    pub fn policy_name(&self) -> &'static str {
        self.policy.name()
    }

    pub fn page_table(&self) -> &PageTable {
        &self.page_table
    }

    pub fn frames(&self) -> &FrameAllocator {
        &self.frames
    }

    pub fn swap_slots_in_use(&self) -> usize {
        self.swap.slots_in_use()
    }

    /// Current entry for `vaddr`, without allocating a leaf table.
    pub fn entry(&self, vaddr: VirtAddr) -> Option<&PageTableEntry> {
        self.page_table.entry(vaddr)
    }

    pub fn dump_page_directory<W: io::Write>(&self, out: &mut W) -> io::Result<()> {
        self.page_table.dump(out)
    }

    /// Ends the run, removing the swap image, and returns the final counts.
    pub fn teardown(self) -> Counters {
        self.counters
    }

    /// Finds a frame for `page`: the lowest free frame, or else one freed by
    /// evicting the policy's victim. A dirty victim is written to swap
    /// first. The frame is recorded as belonging to `page`; the caller fills
    /// it and updates the entry of `page`.
    ///
    /// If the victim cannot be written out it stays resident and is handed
    /// back to the policy, so the simulator is left as it was.
    pub fn allocate_frame(&mut self, page: PageIndex) -> Result<usize, SimulatorError> {
        let frame = match self.frames.find_free() {
            Some(frame) => frame,
            None => {
                let victim = self
                    .policy
                    .select_victim(&self.frames, &mut self.page_table)
                    .ok_or_else(|| SimulatorError::NoEvictableFrame(self.policy.name()))?;
                if let Err(e) = self.evict(victim) {
                    self.policy.restore(victim);
                    return Err(e);
                }
                victim
            }
        };
        self.frames.install(frame, page);
        Ok(frame)
    }

    fn evict(&mut self, victim: usize) -> Result<(), SimulatorError> {
        let Some(page) = self.frames.occupant(victim) else {
            warn!("Victim frame {} has no occupant", victim);
            return Ok(());
        };
        let Some(entry) = self.page_table.entry_at_mut(page) else {
            warn!("Victim frame {} points at an unallocated entry", victim);
            return Ok(());
        };
        if entry.is_dirty() {
            let offset = self
                .swap
                .pageout(self.memory.frame(victim), entry.swap_offset())?;
            entry.swapped_out(offset);
            self.counters.evict_dirty_count += 1;
            debug!(
                "Evicted dirty page {} from frame {} to swap offset {}",
                page.base(),
                victim,
                offset
            );
        } else {
            entry.evicted_clean();
            self.counters.evict_clean_count += 1;
            debug!("Evicted clean page {} from frame {}", page.base(), victim);
        }
        Ok(())
    }

    /// Zero-fills a frame for a page seen for the first time and stamps the
    /// page's virtual address into it.
    fn init_frame(&mut self, frame: usize, vaddr: VirtAddr) -> Result<(), SimulatorError> {
        self.memory.zero_frame(frame);
        let stamp = PhysicalMemory::<SIM_PAGE_SIZE>::frame_address(frame)
            + VADDR_STAMP_OFFSET as u64;
        self.memory.write_u64(stamp, vaddr.page_base().0)?;
        Ok(())
    }

    /// Handles one memory reference and returns the frame now holding the
    /// page of `vaddr`.
    ///
    /// A page that is not resident is brought in: zero-filled and marked
    /// dirty on its first touch, read back from swap otherwise. Either way
    /// the page ends up resident and referenced, and dirty if `access`
    /// writes. The only errors are swap failures, which end the run. A failed
    /// write-back leaves every page where it was and the counters unchanged;
    /// after a failed read-in the simulator should be discarded.
    pub fn find_physpage(
        &mut self,
        vaddr: VirtAddr,
        access: AccessType,
    ) -> Result<&mut [u8], SimulatorError> {
        let entry = *self.page_table.translate(vaddr);

        let frame = match entry.frame_number() {
            Some(frame) => {
                self.counters.hit_count += 1;
                frame
            }
            None => {
                let frame = self.allocate_frame(vaddr.page())?;
                match entry.swap_offset().filter(|_| entry.is_on_swap()) {
                    Some(offset) => {
                        self.swap.pagein(offset, self.memory.frame_mut(frame))?;
                        debug!(
                            "Miss on {}: swapped in from offset {} to frame {}",
                            vaddr, offset, frame
                        );
                    }
                    None => {
                        self.init_frame(frame, vaddr)?;
                        self.page_table.translate(vaddr).set_dirty();
                        debug!("Miss on {}: first touch in frame {}", vaddr, frame);
                    }
                }
                self.counters.miss_count += 1;
                frame
            }
        };

        let entry = self.page_table.translate(vaddr);
        entry.map_to_frame(frame);
        if access.is_write() {
            entry.set_dirty();
        }
        entry.set_referenced();
        self.policy.on_reference(entry);
        self.counters.ref_count += 1;
        trace!("{} {} -> frame {}", access, vaddr, frame);

        Ok(self.memory.frame_mut(frame))
    }
}
