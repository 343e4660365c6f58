//! Pagination controller.
//!
//! Three modes share one page model:
//! - `All`: the server pages; next/prev follow its cursors and arbitrary
//!   jumps are offset requests.
//! - `Range`: a fixed identifier range loaded in full and sliced locally.
//! - `Filtered`: the filter engine's output over whichever base is loaded,
//!   sliced locally.
//!
//! Transitions return a [`PageCommand`] telling the caller whether a fetch is
//! needed. Switching modes always lands on page 1.

use serde::{Deserialize, Serialize};

use crate::region::Region;
use crate::state::{ListPage, RecordSummary};

pub const PAGE_SIZE: u32 = 20;

/// How the adapter should address a server page.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageRequest {
    Offset { offset: u32, limit: u32 },
    /// A continuation locator handed out by the server, used verbatim.
    Cursor(String),
}

impl PageRequest {
    pub fn for_page(page: u32, page_size: u32) -> Self {
        PageRequest::Offset {
            offset: page.saturating_sub(1).saturating_mul(page_size),
            limit: page_size,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageState {
    pub page_number: u32,
    pub page_size: u32,
    pub total_count: u32,
    pub next_cursor: Option<String>,
    pub prev_cursor: Option<String>,
}

impl PageState {
    fn first(total_count: u32) -> Self {
        Self {
            page_number: 1,
            page_size: PAGE_SIZE,
            total_count,
            next_cursor: None,
            prev_cursor: None,
        }
    }

    pub fn total_pages(&self) -> u32 {
        if self.page_size == 0 {
            return 0;
        }
        self.total_count.div_ceil(self.page_size)
    }
}

impl Default for PageState {
    fn default() -> Self {
        Self::first(0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageMode {
    All,
    Range,
    Filtered,
}

/// The collection a filtered view is computed over.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BaseSource {
    All,
    Range(Region),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageCommand {
    /// Nothing moved.
    Stay,
    /// The page moved and its records are already local.
    Slice,
    /// The page moved and must be fetched from the server.
    Fetch(PageRequest),
}

impl PageCommand {
    pub fn moved(&self) -> bool {
        !matches!(self, PageCommand::Stay)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paginator {
    mode: PageMode,
    base: BaseSource,
    page: PageState,
    /// Current server page in `All`, the full range in `Range`.
    loaded: Vec<RecordSummary>,
    filtered: Vec<RecordSummary>,
    /// Base page state saved while a filtered view is shown.
    parked: Option<PageState>,
}

impl Default for Paginator {
    fn default() -> Self {
        Self {
            mode: PageMode::All,
            base: BaseSource::All,
            page: PageState::default(),
            loaded: Vec::new(),
            filtered: Vec::new(),
            parked: None,
        }
    }
}

impl Paginator {
    pub fn mode(&self) -> PageMode {
        self.mode
    }

    pub fn base(&self) -> BaseSource {
        self.base
    }

    pub fn page_state(&self) -> &PageState {
        &self.page
    }

    pub fn page_number(&self) -> u32 {
        self.page.page_number
    }

    pub fn total_pages(&self) -> u32 {
        self.page.total_pages()
    }

    /// The records the filter engine works from.
    pub fn base_records(&self) -> &[RecordSummary] {
        &self.loaded
    }

    pub fn has_base(&self) -> bool {
        !self.loaded.is_empty()
    }

    /// Records on the current page.
    pub fn visible(&self) -> &[RecordSummary] {
        match self.mode {
            PageMode::All => &self.loaded,
            PageMode::Range => self.slice(&self.loaded),
            PageMode::Filtered => self.slice(&self.filtered),
        }
    }

    pub fn can_next(&self) -> bool {
        match self.mode {
            PageMode::All => self.page.next_cursor.is_some(),
            PageMode::Range | PageMode::Filtered => {
                self.page.page_number < self.page.total_pages()
            }
        }
    }

    pub fn can_prev(&self) -> bool {
        match self.mode {
            PageMode::All => self.page.prev_cursor.is_some(),
            PageMode::Range | PageMode::Filtered => self.page.page_number > 1,
        }
    }

    pub fn next_page(&mut self) -> PageCommand {
        if !self.can_next() {
            return PageCommand::Stay;
        }
        self.page.page_number += 1;
        match (self.mode, self.page.next_cursor.clone()) {
            (PageMode::All, Some(cursor)) => self.fetch(PageRequest::Cursor(cursor)),
            _ => PageCommand::Slice,
        }
    }

    pub fn prev_page(&mut self) -> PageCommand {
        if !self.can_prev() {
            return PageCommand::Stay;
        }
        self.page.page_number -= 1;
        match (self.mode, self.page.prev_cursor.clone()) {
            (PageMode::All, Some(cursor)) => self.fetch(PageRequest::Cursor(cursor)),
            _ => PageCommand::Slice,
        }
    }

    /// Jump to page `n`. The current page and anything outside
    /// `1..=total_pages` are no-ops.
    pub fn goto_page(&mut self, n: u32) -> PageCommand {
        if n == self.page.page_number || n < 1 || n > self.page.total_pages() {
            return PageCommand::Stay;
        }
        self.page.page_number = n;
        match self.mode {
            PageMode::All => self.fetch(PageRequest::for_page(n, self.page.page_size)),
            PageMode::Range | PageMode::Filtered => PageCommand::Slice,
        }
    }

    pub fn last_page(&mut self) -> PageCommand {
        let last = self.page.total_pages();
        self.goto_page(last)
    }

    /// Go to page `n` from an address, where the total may not be known yet.
    /// In `All` mode this fetches unless the page is already on screen;
    /// otherwise `n` is clamped to the known pages.
    pub fn seek(&mut self, n: u32) -> PageCommand {
        let n = n.max(1);
        match self.mode {
            PageMode::All => {
                if n == self.page.page_number && self.has_base() {
                    return PageCommand::Stay;
                }
                self.page.page_number = n;
                self.fetch(PageRequest::for_page(n, self.page.page_size))
            }
            PageMode::Range | PageMode::Filtered => {
                let last = self.page.total_pages().max(1);
                self.goto_page(n.min(last))
            }
        }
    }

    /// Fetch the current server page again. Only meaningful in `All` mode.
    pub fn reload(&mut self) -> PageCommand {
        match self.mode {
            PageMode::All => {
                let request = PageRequest::for_page(self.page.page_number, self.page.page_size);
                self.fetch(request)
            }
            PageMode::Range | PageMode::Filtered => PageCommand::Stay,
        }
    }

    pub fn enter_all(&mut self) -> PageCommand {
        self.mode = PageMode::All;
        self.base = BaseSource::All;
        self.reset_base(0);
        PageCommand::Fetch(PageRequest::for_page(1, self.page.page_size))
    }

    /// Switch to a fixed range. The caller loads the range and hands it to
    /// [`Paginator::range_loaded`].
    pub fn enter_range(&mut self, region: Region) {
        self.mode = PageMode::Range;
        self.base = BaseSource::Range(region);
        self.reset_base(region.range().len() as u32);
    }

    pub fn range_loaded(&mut self, records: Vec<RecordSummary>) {
        let total = records.len() as u32;
        self.loaded = records;
        if self.mode == PageMode::Range {
            self.page = PageState::first(total);
        }
    }

    /// Apply a server page. Returns a redirect when the requested page lies
    /// beyond the reported total.
    pub fn page_loaded(&mut self, page: ListPage) -> Option<PageCommand> {
        self.loaded = page.records;
        match self.mode {
            PageMode::All => {
                absorb_server_page(&mut self.page, page.total_count, page.next, page.previous);
                let last = self.page.total_pages();
                if last >= 1 && self.page.page_number > last {
                    self.page.page_number = last;
                    return Some(self.fetch(PageRequest::for_page(last, self.page.page_size)));
                }
                None
            }
            // A server page that lands under a filtered view belongs to the
            // parked base, which is what leave_filtered restores.
            PageMode::Filtered if self.base == BaseSource::All => {
                if let Some(parked) = self.parked.as_mut() {
                    absorb_server_page(parked, page.total_count, page.next, page.previous);
                    let last = parked.total_pages();
                    if last >= 1 && parked.page_number > last {
                        parked.page_number = last;
                        parked.next_cursor = None;
                        parked.prev_cursor = None;
                        self.loaded.clear();
                    }
                }
                None
            }
            PageMode::Range | PageMode::Filtered => None,
        }
    }

    /// Drop the base after a failed load. Totals are kept so the user can
    /// still jump to a page and retry.
    pub fn base_failed(&mut self) {
        self.loaded.clear();
        self.page.next_cursor = None;
        self.page.prev_cursor = None;
    }

    /// Show a filtered view, starting on page 1.
    pub fn enter_filtered(&mut self, view: Vec<RecordSummary>) {
        if self.mode != PageMode::Filtered {
            self.parked = Some(self.page.clone());
        }
        self.mode = PageMode::Filtered;
        self.page = PageState::first(view.len() as u32);
        self.filtered = view;
    }

    /// Replace the filtered view in place, keeping the page where possible.
    pub fn refresh_filtered(&mut self, view: Vec<RecordSummary>) {
        if self.mode != PageMode::Filtered {
            self.enter_filtered(view);
            return;
        }
        let page_number = self.page.page_number;
        self.page = PageState::first(view.len() as u32);
        self.page.page_number = page_number.clamp(1, self.page.total_pages().max(1));
        self.filtered = view;
    }

    /// Return to the base mode on page 1.
    pub fn leave_filtered(&mut self) -> PageCommand {
        if self.mode != PageMode::Filtered {
            return PageCommand::Stay;
        }
        self.filtered.clear();
        let parked = self.parked.take();
        match self.base {
            BaseSource::All => {
                self.mode = PageMode::All;
                match parked {
                    Some(parked) if parked.page_number == 1 && self.has_base() => {
                        self.page = parked;
                        PageCommand::Slice
                    }
                    _ => {
                        self.page = PageState::first(self.page_total_hint(parked));
                        self.loaded.clear();
                        PageCommand::Fetch(PageRequest::for_page(1, self.page.page_size))
                    }
                }
            }
            BaseSource::Range(_) => {
                self.mode = PageMode::Range;
                self.page = PageState::first(self.loaded.len() as u32);
                PageCommand::Slice
            }
        }
    }

    // Cursors belong to the page on screen and go stale once another is
    // requested.
    fn fetch(&mut self, request: PageRequest) -> PageCommand {
        self.page.next_cursor = None;
        self.page.prev_cursor = None;
        PageCommand::Fetch(request)
    }

    fn page_total_hint(&self, parked: Option<PageState>) -> u32 {
        parked.map(|page| page.total_count).unwrap_or(0)
    }

    fn reset_base(&mut self, total_count: u32) {
        self.loaded.clear();
        self.filtered.clear();
        self.parked = None;
        self.page = PageState::first(total_count);
    }

    fn slice<'a>(&self, records: &'a [RecordSummary]) -> &'a [RecordSummary] {
        let size = self.page.page_size as usize;
        let start = (self.page.page_number.saturating_sub(1) as usize).saturating_mul(size);
        if start >= records.len() {
            return &[];
        }
        let end = (start + size).min(records.len());
        &records[start..end]
    }
}

fn absorb_server_page(
    page: &mut PageState,
    total_count: u32,
    next: Option<String>,
    previous: Option<String>,
) {
    page.total_count = total_count;
    page.next_cursor = next;
    page.prev_cursor = previous;
}

/// Which page buttons to show around the current page.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PageWindow {
    pub pages: Vec<u32>,
    pub first: Option<u32>,
    pub leading_gap: bool,
    pub last: Option<u32>,
    pub trailing_gap: bool,
}

const WINDOW: i64 = 5;

/// Up to five pages centred on `current`, plus shortcuts to the first and
/// last page with gaps where pages are skipped.
pub fn page_window(current: u32, total: u32) -> PageWindow {
    let (cur, total_i) = (i64::from(current), i64::from(total));
    let mut start = (cur - WINDOW / 2).max(1);
    let end = (start + WINDOW - 1).min(total_i);
    if end - start + 1 < WINDOW {
        start = (end - WINDOW + 1).max(1);
    }
    let pages: Vec<u32> = (start..=end).map(|page| page as u32).collect();

    let mut window = PageWindow {
        pages,
        ..Default::default()
    };
    if cur > 2 && !window.pages.contains(&1) {
        window.first = Some(1);
        window.leading_gap = cur > 3;
    }
    if cur < total_i - 1 && !window.pages.contains(&total) {
        window.last = Some(total);
        window.trailing_gap = cur < total_i - 2;
    }
    window
}
