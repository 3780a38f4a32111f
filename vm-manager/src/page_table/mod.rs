mod iter;
mod page_table_entry;

use std::io::{self, Write};

use log::debug;

pub use page_table_entry::{PageState, PageTableEntry};

pub use self::iter::MappedEntries;
use crate::address::{PageIndex, VirtAddr, PTRS_PER_PGDIR, PTRS_PER_PGTBL};

type LeafTable = Box<[PageTableEntry]>;

/// Two-level page table. The directory is fixed size; a leaf table is
/// allocated the first time an address in its range is translated and then
/// lives until the table is dropped.
pub struct PageTable {
    directory: Vec<Option<LeafTable>>,
}

impl Default for PageTable {
    fn default() -> Self {
        Self::init()
    }
}

impl PageTable {
    pub fn init() -> Self {
        let mut directory = Vec::with_capacity(PTRS_PER_PGDIR);
        directory.resize_with(PTRS_PER_PGDIR, || None);
        Self { directory }
    }

    fn init_second_level() -> LeafTable {
        vec![PageTableEntry::default(); PTRS_PER_PGTBL].into_boxed_slice()
    }

    /// Returns the entry for `vaddr`, allocating its leaf table if needed.
    pub fn translate(&mut self, vaddr: VirtAddr) -> &mut PageTableEntry {
        let page = vaddr.page();
        let table = self.directory[page.directory].get_or_insert_with(|| {
            debug!("Allocating leaf table for directory[{}]", page.directory);
            Self::init_second_level()
        });
        &mut table[page.table]
    }

    /// Looks `vaddr` up without allocating anything.
    pub fn entry(&self, vaddr: VirtAddr) -> Option<&PageTableEntry> {
        self.entry_at(vaddr.page())
    }

    pub fn entry_at(&self, page: PageIndex) -> Option<&PageTableEntry> {
        self.directory.get(page.directory)?.as_ref()?.get(page.table)
    }

    pub fn entry_at_mut(&mut self, page: PageIndex) -> Option<&mut PageTableEntry> {
        self.directory
            .get_mut(page.directory)?
            .as_mut()?
            .get_mut(page.table)
    }

    pub fn leaf_tables(&self) -> usize {
        self.directory.iter().filter(|table| table.is_some()).count()
    }

    /// Every entry that is resident or on swap, in address order.
    pub fn iter(&self) -> MappedEntries<'_> {
        MappedEntries::new(&self.directory)
    }

    /// Writes the directory and every allocated leaf table to `out`.
    /// Runs of invalid entries are collapsed into a single line.
    pub fn dump<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let mut invalid_run: Option<(usize, usize)> = None;
        for (i, table) in self.directory.iter().enumerate() {
            match table {
                None => {
                    invalid_run = Some(match invalid_run {
                        Some((first, _)) => (first, i),
                        None => (i, i),
                    });
                }
                Some(table) => {
                    if let Some((first, last)) = invalid_run.take() {
                        writeln!(out, "[{}]: INVALID\n  to\n[{}]: INVALID", first, last)?;
                    }
                    writeln!(out, "[{}]: {:p}", i, table.as_ptr())?;
                    Self::dump_table(table, out)?;
                }
            }
        }
        Ok(())
    }

    fn dump_table<W: Write>(table: &[PageTableEntry], out: &mut W) -> io::Result<()> {
        let mut invalid_run: Option<(usize, usize)> = None;
        for (i, entry) in table.iter().enumerate() {
            let frame = match entry.state() {
                PageState::Unmapped => {
                    invalid_run = Some(match invalid_run {
                        Some((first, _)) => (first, i),
                        None => (i, i),
                    });
                    continue;
                }
                PageState::Resident(frame) => Some(frame),
                PageState::OnSwap => None,
            };
            if let Some((first, last)) = invalid_run.take() {
                writeln!(out, "\t[{}] - [{}]: INVALID", first, last)?;
            }
            write!(out, "\t[{}]: ", i)?;
            match frame {
                Some(frame) => {
                    write!(out, "VALID, ")?;
                    if entry.is_dirty() {
                        write!(out, "DIRTY, ")?;
                    }
                    writeln!(out, "in frame {}", frame)?;
                }
                None => {
                    let offset = entry.swap_offset().map_or(-1, |offset| offset.0 as i64);
                    writeln!(out, "ONSWAP, at offset {}", offset)?;
                }
            }
        }
        if let Some((first, last)) = invalid_run {
            writeln!(out, "\t[{}] - [{}]: INVALID", first, last)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use swap_manager::SwapOffset;

    use super::*;

    #[test]
    fn test_translate_allocates_lazily() {
        let mut table = PageTable::init();
        assert_eq!(table.leaf_tables(), 0);
        assert!(table.entry(VirtAddr(0x1000)).is_none());

        let entry = table.translate(VirtAddr(0x1000));
        assert_eq!(*entry, PageTableEntry::default());
        assert_eq!(table.leaf_tables(), 1);

        // Same directory index, different leaf slot.
        table.translate(VirtAddr(0x2000));
        assert_eq!(table.leaf_tables(), 1);

        table.translate(VirtAddr(0x3_000_000));
        assert_eq!(table.leaf_tables(), 2);
    }

    #[test]
    fn test_translate_returns_the_same_entry() {
        let mut table = PageTable::init();
        table.translate(VirtAddr(0x5_123)).map_to_frame(7);
        let entry = table.entry(VirtAddr(0x5_fff)).unwrap();
        assert_eq!(entry.frame_number(), Some(7));
        assert!(!table.entry(VirtAddr(0x6_000)).unwrap().is_valid());
    }

    #[test]
    fn test_entry_at_follows_page_index() {
        let mut table = PageTable::init();
        let vaddr = VirtAddr(0x4_5_6_000);
        table.translate(vaddr).map_to_frame(2);
        table.entry_at_mut(vaddr.page()).unwrap().set_dirty();
        assert!(table.translate(vaddr).is_dirty());
        assert!(table.entry_at(VirtAddr(0xfff_000_000).page()).is_none());
    }

    #[test]
    fn test_iter_skips_unmapped_entries() {
        let mut table = PageTable::init();
        table.translate(VirtAddr(0x1000)).map_to_frame(0);
        table.translate(VirtAddr(0x2000));
        table.translate(VirtAddr(0x5_000_000)).swapped_out(SwapOffset(16));

        let mapped: Vec<_> = table.iter().map(|(page, _)| page.base()).collect();
        assert_eq!(mapped, vec![VirtAddr(0x1000), VirtAddr(0x5_000_000)]);
    }

    #[test]
    fn test_dump_collapses_invalid_runs() {
        let mut table = PageTable::init();
        let entry = table.translate(VirtAddr(0x1_002_000));
        entry.map_to_frame(4);
        entry.set_dirty();
        table.translate(VirtAddr(0x1_003_000)).swapped_out(SwapOffset(32));

        let mut out = Vec::new();
        table.dump(&mut out).unwrap();
        let out = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "[0]: INVALID");
        assert_eq!(lines[1], "  to");
        assert_eq!(lines[2], "[0]: INVALID");
        assert!(lines[3].starts_with("[1]: 0x"));
        assert_eq!(lines[4], "\t[0] - [1]: INVALID");
        assert_eq!(lines[5], "\t[2]: VALID, DIRTY, in frame 4");
        assert_eq!(lines[6], "\t[3]: ONSWAP, at offset 32");
        assert_eq!(lines[7], "\t[4] - [4095]: INVALID");
        assert_eq!(lines.len(), 8);
    }
}
