use serde::{Deserialize, Serialize};

use crate::error::DexError;
use crate::filter::SortKey;
use crate::region::Region;
use crate::request::RequestToken;
use crate::state::{ComparePair, DetailView, ListPage, RecordDetail, RecordFacts, RecordSummary};

#[derive(tui_dispatch::Action, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[action(infer_categories)]
pub enum Action {
    Init,
    /// Retry whatever the current view failed to load.
    Reload,

    PageDidLoad { token: RequestToken, page: ListPage },
    PageDidError { token: RequestToken, error: DexError },
    PageNext,
    PagePrev,
    PageGoto(u32),
    PageFirst,
    PageLast,

    RegionSelect(Option<Region>),
    RegionNext,
    RegionPrev,
    RangeDidLoad { token: RequestToken, records: Vec<RecordDetail> },
    RangeDidError { token: RequestToken, error: DexError },

    FilterToggleType(String),
    FilterGeneration(Option<Region>),
    FilterSortNext,
    FilterSortSet(SortKey),
    FilterClear,
    FilterCursorMove(i16),
    FilterCursorSet(usize),
    FilterActivate,
    FactsDidLoad {
        token: RequestToken,
        requested: Vec<u32>,
        facts: Vec<RecordFacts>,
    },
    FactsDidError {
        token: RequestToken,
        requested: Vec<u32>,
        error: DexError,
    },

    SelectionMove(i16),
    ListSelect(usize),
    RecordOpen,

    DetailOpen(String),
    DetailDidLoad { token: RequestToken, view: Box<DetailView> },
    DetailDidError { token: RequestToken, error: DexError },
    DetailClose,
    DetailScroll(i16),

    CompareSelect(RecordSummary),
    ComparisonDidLoad { token: RequestToken, pair: Box<ComparePair> },
    ComparisonDidError { token: RequestToken, error: DexError },
    CompareClose,

    LocationEditStart,
    LocationInput(char),
    LocationBackspace,
    LocationCancel,
    LocationSubmit,
    LocationChanged(String),

    FocusNext,
    UiTerminalResize(u16, u16),
    Quit,
}
