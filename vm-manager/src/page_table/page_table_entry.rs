use swap_manager::SwapOffset;

/// Where the contents of a virtual page currently live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PageState {
    /// Never touched, or evicted clean without a swap copy.
    #[default]
    Unmapped,
    /// Held in the given physical frame.
    Resident(usize),
    /// Only the copy at `swap_offset` is current.
    OnSwap,
}

/// Status of one virtual page.
///
/// Residency and being on swap are one enum, so a page can never be both.
/// `swap_offset` survives a swap-in: the slot stays reserved for the page
/// and is rewritten in place on its next dirty eviction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PageTableEntry {
    state: PageState,
    dirty: bool,
    referenced: bool,
    swap_offset: Option<SwapOffset>,
}

impl PageTableEntry {
    pub fn state(&self) -> PageState {
        self.state
    }

    pub fn is_valid(&self) -> bool {
        matches!(self.state, PageState::Resident(_))
    }

    pub fn is_on_swap(&self) -> bool {
        self.state == PageState::OnSwap
    }

    pub fn frame_number(&self) -> Option<usize> {
        match self.state {
            PageState::Resident(frame) => Some(frame),
            _ => None,
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn is_referenced(&self) -> bool {
        self.referenced
    }

    pub fn swap_offset(&self) -> Option<SwapOffset> {
        self.swap_offset
    }

    pub(crate) fn map_to_frame(&mut self, frame: usize) {
        self.state = PageState::Resident(frame);
    }

    pub(crate) fn set_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn clear_dirty(&mut self) {
        self.dirty = false;
    }

    pub(crate) fn set_referenced(&mut self) {
        self.referenced = true;
    }

    pub(crate) fn clear_referenced(&mut self) {
        self.referenced = false;
    }

    /// Records where the page was written out and marks swap as its home.
    pub(crate) fn swapped_out(&mut self, offset: SwapOffset) {
        self.swap_offset = Some(offset);
        self.state = PageState::OnSwap;
        self.dirty = false;
    }

    /// Drops residency without a write-back. A page that still owns a swap
    /// slot falls back to it; the slot holds its contents because the frame
    /// was never written after the last load.
    pub(crate) fn evicted_clean(&mut self) {
        self.state = match self.swap_offset {
            Some(_) => PageState::OnSwap,
            None => PageState::Unmapped,
        };
        self.dirty = false;
    }
}
