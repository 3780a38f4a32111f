use super::{LeafTable, PageState, PageTableEntry};
use crate::address::PageIndex;

/// Walks the allocated leaf tables and yields entries that hold data,
/// either in a frame or on swap.
pub struct MappedEntries<'a> {
    directory: &'a [Option<LeafTable>],
    current: PageIndex,
}

impl<'a> MappedEntries<'a> {
    pub(super) fn new(directory: &'a [Option<LeafTable>]) -> Self {
        Self {
            directory,
            current: PageIndex {
                directory: 0,
                table: 0,
            },
        }
    }
}

impl<'a> Iterator for MappedEntries<'a> {
    type Item = (PageIndex, &'a PageTableEntry);

    fn next(&mut self) -> Option<Self::Item> {
        let directory = self.directory;
        while self.current.directory < directory.len() {
            let Some(table) = &directory[self.current.directory] else {
                self.current.directory += 1;
                self.current.table = 0;
                continue;
            };
            while self.current.table < table.len() {
                let page = self.current;
                self.current.table += 1;
                let entry = &table[page.table];
                if entry.state() != PageState::Unmapped {
                    return Some((page, entry));
                }
            }
            self.current.directory += 1;
            self.current.table = 0;
        }
        None
    }
}
