use std::fmt;

pub const PAGE_SHIFT: u32 = 12;
pub const PAGE_SIZE: u64 = 1 << PAGE_SHIFT;
pub const PAGE_MASK: u64 = !(PAGE_SIZE - 1);

pub const PGDIR_SHIFT: u32 = 24;
pub const PTRS_PER_PGDIR: usize = 4096;
pub const PTRS_PER_PGTBL: usize = 4096;

/// Bytes of content actually simulated per frame. Also the swap block size.
pub const SIM_PAGE_SIZE: usize = 16;

/// Where the page-aligned virtual address is stamped inside a fresh frame.
pub const VADDR_STAMP_OFFSET: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VirtAddr(pub u64);

impl VirtAddr {
    pub fn directory_index(self) -> usize {
        ((self.0 >> PGDIR_SHIFT) as usize) & (PTRS_PER_PGDIR - 1)
    }

    pub fn table_index(self) -> usize {
        ((self.0 >> PAGE_SHIFT) as usize) & (PTRS_PER_PGTBL - 1)
    }

    pub fn page_base(self) -> VirtAddr {
        VirtAddr(self.0 & PAGE_MASK)
    }

    pub fn page(self) -> PageIndex {
        PageIndex {
            directory: self.directory_index(),
            table: self.table_index(),
        }
    }
}

impl fmt::Display for VirtAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// Position of a page-table entry: which leaf table, and which slot in it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PageIndex {
    pub directory: usize,
    pub table: usize,
}

impl PageIndex {
    /// The lowest virtual address inside this page.
    pub fn base(self) -> VirtAddr {
        VirtAddr(
            ((self.directory as u64) << PGDIR_SHIFT) | ((self.table as u64) << PAGE_SHIFT),
        )
    }
}
