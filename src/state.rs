use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tui_dispatch::DataResource;
use tui_dispatch_debug::debug::{ron_string, DebugSection, DebugState};

use crate::compare::CompareSelection;
use crate::error::DexError;
use crate::filter::{FilterSpec, SortKey, TYPE_NAMES};
use crate::pagination::{PageMode, Paginator};
use crate::region::Region;
use crate::request::RequestLedger;
use crate::route::Route;

/// Minimal record reference as the list endpoint returns it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordSummary {
    pub name: String,
    pub url: String,
}

impl RecordSummary {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }

    pub fn id(&self) -> Option<u32> {
        parse_identifier(&self.url)
    }

    /// Key used to request the full record: the identifier when the locator
    /// carries one, otherwise the name.
    pub fn lookup_key(&self) -> String {
        match self.id() {
            Some(id) => id.to_string(),
            None => self.name.to_lowercase(),
        }
    }
}

/// Trailing numeric path segment of a resource locator.
pub fn parse_identifier(url: &str) -> Option<u32> {
    url.trim_end_matches('/')
        .rsplit('/')
        .next()
        .and_then(|segment| segment.parse::<u32>().ok())
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordStat {
    pub name: String,
    pub value: u16,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRef {
    pub name: String,
    pub url: String,
    pub level_learned_at: u16,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordDetail {
    pub id: u32,
    pub name: String,
    pub url: String,
    /// Decimetres.
    pub height: u16,
    /// Hectograms.
    pub weight: u16,
    pub base_experience: Option<u16>,
    pub types: Vec<String>,
    pub abilities: Vec<String>,
    pub stats: Vec<RecordStat>,
    pub moves: Vec<MoveRef>,
    pub species_url: Option<String>,
}

impl RecordDetail {
    pub fn summary(&self) -> RecordSummary {
        RecordSummary::new(self.name.clone(), self.url.clone())
    }

    pub fn facts(&self) -> RecordFacts {
        RecordFacts {
            id: self.id,
            types: self.types.clone(),
            height: self.height,
            weight: self.weight,
            base_experience: self.base_experience,
        }
    }

    pub fn stat(&self, name: &str) -> Option<u16> {
        self.stats
            .iter()
            .find(|stat| stat.name == name)
            .map(|stat| stat.value)
    }

    pub fn height_m(&self) -> f32 {
        f32::from(self.height) / 10.0
    }

    pub fn weight_kg(&self) -> f32 {
        f32::from(self.weight) / 10.0
    }
}

/// The handful of attributes the filter engine needs per record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordFacts {
    pub id: u32,
    pub types: Vec<String>,
    pub height: u16,
    pub weight: u16,
    pub base_experience: Option<u16>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeciesInfo {
    pub name: String,
    pub genus: Option<String>,
    pub flavor_text: Option<String>,
    pub color: Option<String>,
    pub egg_groups: Vec<String>,
    /// Eighths female; -1 for genderless.
    pub gender_rate: i8,
    pub evolution_chain_url: Option<String>,
}

impl SpeciesInfo {
    /// (female %, male %) or None when genderless.
    pub fn gender_split(&self) -> Option<(f32, f32)> {
        if !(0..=8).contains(&self.gender_rate) {
            return None;
        }
        let female = f32::from(self.gender_rate) * 12.5;
        Some((female, 100.0 - female))
    }
}

/// One stage of a linear evolution chain. `trigger` describes how this stage
/// is reached from the previous one.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvolutionNode {
    pub id: u32,
    pub name: String,
    pub trigger: Option<String>,
    pub next: Option<Box<EvolutionNode>>,
}

impl EvolutionNode {
    pub fn stages(&self) -> Vec<&EvolutionNode> {
        let mut stages = vec![self];
        let mut current = self;
        while let Some(next) = current.next.as_deref() {
            stages.push(next);
            current = next;
        }
        stages
    }

    pub fn stage_count(&self) -> usize {
        self.stages().len()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveInfo {
    pub name: String,
    pub move_type: Option<String>,
    pub power: Option<u16>,
    pub accuracy: Option<u16>,
    pub pp: Option<u16>,
    pub damage_class: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRow {
    pub level: u16,
    pub name: String,
    pub move_type: Option<String>,
    pub power: Option<u16>,
    pub accuracy: Option<u16>,
    pub pp: Option<u16>,
    pub damage_class: Option<String>,
}

/// Everything the detail view shows, assembled in one go.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DetailView {
    pub record: RecordDetail,
    pub species: SpeciesInfo,
    pub evolution: Option<EvolutionNode>,
    pub moves: Vec<MoveRow>,
}

impl DetailView {
    /// A chain of a single stage is not worth a section.
    pub fn renderable_chain(&self) -> Option<&EvolutionNode> {
        self.evolution.as_ref().filter(|chain| chain.stage_count() > 1)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ComparePair {
    pub left: RecordDetail,
    pub right: RecordDetail,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListPage {
    pub records: Vec<RecordSummary>,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub total_count: u32,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LocationEdit {
    pub active: bool,
    pub input: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FocusArea {
    List,
    Filters,
}

/// Rows of the filter sidebar, top to bottom.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FilterRow {
    Sort,
    Generation,
    Type(&'static str),
    Clear,
}

impl FilterRow {
    pub fn all() -> Vec<FilterRow> {
        let mut rows = vec![FilterRow::Sort, FilterRow::Generation];
        rows.extend(TYPE_NAMES.iter().map(|name| FilterRow::Type(name)));
        rows.push(FilterRow::Clear);
        rows
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AppState {
    pub terminal_size: (u16, u16),
    pub focus: FocusArea,
    /// Address-bar mirror of what is on screen.
    pub route: Route,
    pub location_edit: LocationEdit,

    pub paginator: Paginator,
    pub region: Option<Region>,
    pub selected_index: usize,
    pub list_loading: bool,
    pub list_error: Option<DexError>,

    pub filter: FilterSpec,
    pub filter_cursor: usize,
    pub facts: HashMap<u32, RecordFacts>,
    pub facts_failed: HashSet<u32>,
    pub facts_loading: bool,

    pub detail: DataResource<DetailView>,
    pub detail_scroll: u16,

    pub compare: CompareSelection,
    pub comparison: DataResource<ComparePair>,

    pub requests: RequestLedger,
    pub message: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            terminal_size: (80, 24),
            focus: FocusArea::List,
            route: Route::default(),
            location_edit: LocationEdit::default(),
            paginator: Paginator::default(),
            region: None,
            selected_index: 0,
            list_loading: false,
            list_error: None,
            filter: FilterSpec::default(),
            filter_cursor: 0,
            facts: HashMap::new(),
            facts_failed: HashSet::new(),
            facts_loading: false,
            detail: DataResource::Empty,
            detail_scroll: 0,
            compare: CompareSelection::Empty,
            comparison: DataResource::Empty,
            requests: RequestLedger::default(),
            message: None,
        }
    }
}

impl AppState {
    /// Start at the given address instead of the first page.
    pub fn at(route: Route) -> Self {
        Self {
            route,
            ..Self::default()
        }
    }

    pub fn visible_records(&self) -> &[RecordSummary] {
        self.paginator.visible()
    }

    pub fn selected_record(&self) -> Option<&RecordSummary> {
        self.visible_records().get(self.selected_index)
    }

    pub fn set_selected_index(&mut self, index: usize) -> bool {
        let len = self.visible_records().len();
        if len == 0 {
            self.selected_index = 0;
            return false;
        }
        let bounded = index.min(len - 1);
        if bounded != self.selected_index {
            self.selected_index = bounded;
            return true;
        }
        false
    }

    pub fn clamp_selection(&mut self) {
        let len = self.visible_records().len();
        if self.selected_index >= len {
            self.selected_index = len.saturating_sub(1);
        }
    }

    pub fn is_detail_open(&self) -> bool {
        matches!(self.route, Route::Detail { .. })
    }

    pub fn is_compare_open(&self) -> bool {
        self.compare.is_complete()
    }

    /// Point the address bar at the current page unless a detail is open.
    pub fn sync_route(&mut self) {
        if !self.is_detail_open() {
            self.route = Route::browse(self.paginator.page_number());
        }
    }

    pub fn location(&self) -> String {
        self.route.to_location()
    }

    pub fn filter_row(&self) -> Option<FilterRow> {
        FilterRow::all().get(self.filter_cursor).copied()
    }

    pub fn selected_generation(&self) -> Option<Region> {
        let range = self.filter.selected_range?;
        Region::ALL.into_iter().find(|region| region.range() == range)
    }

    pub fn sort_key(&self) -> SortKey {
        self.filter.sort_key
    }

    pub fn mode_label(&self) -> String {
        match (self.paginator.mode(), self.region) {
            (PageMode::Filtered, _) => "Filtered".to_string(),
            (_, Some(region)) => region.label(),
            (_, None) => "All".to_string(),
        }
    }

    pub fn focus_next(&mut self) {
        self.focus = match self.focus {
            FocusArea::List => FocusArea::Filters,
            FocusArea::Filters => FocusArea::List,
        };
    }
}

impl DebugState for AppState {
    fn debug_sections(&self) -> Vec<DebugSection> {
        let page = self.paginator.page_state();
        vec![
            DebugSection::new("Browse")
                .entry("location", ron_string(&self.location()))
                .entry("mode", ron_string(&self.paginator.mode()))
                .entry("region", ron_string(&self.region))
                .entry("page", ron_string(&page.page_number))
                .entry("total_pages", ron_string(&self.paginator.total_pages()))
                .entry("total_count", ron_string(&page.total_count))
                .entry("visible", ron_string(&self.visible_records().len()))
                .entry("selected", ron_string(&self.selected_index))
                .entry("focus", ron_string(&self.focus)),
            DebugSection::new("Filters")
                .entry("types", ron_string(&self.filter.selected_types))
                .entry("range", ron_string(&self.filter.selected_range))
                .entry("sort", ron_string(&self.filter.sort_key))
                .entry("facts", ron_string(&self.facts.len()))
                .entry("facts_failed", ron_string(&self.facts_failed.len())),
            DebugSection::new("Compare")
                .entry("selection", ron_string(&self.compare.names()))
                .entry("loading", ron_string(&self.comparison.is_loading())),
            DebugSection::new("Status")
                .entry("list_loading", ron_string(&self.list_loading))
                .entry("facts_loading", ron_string(&self.facts_loading))
                .entry("detail_loading", ron_string(&self.detail.is_loading()))
                .entry("requests", ron_string(&self.requests))
                .entry("message", ron_string(&self.message)),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifier_comes_from_trailing_segment() {
        assert_eq!(
            parse_identifier("https://pokeapi.co/api/v2/pokemon/25/"),
            Some(25)
        );
        assert_eq!(parse_identifier("https://pokeapi.co/api/v2/pokemon/132"), Some(132));
        assert_eq!(parse_identifier("https://pokeapi.co/api/v2/pokemon/ditto/"), None);
        assert_eq!(parse_identifier(""), None);
    }

    #[test]
    fn lookup_key_falls_back_to_name() {
        let by_id = RecordSummary::new("pikachu", "https://pokeapi.co/api/v2/pokemon/25/");
        let by_name = RecordSummary::new("Pikachu", "local://pikachu");
        assert_eq!(by_id.lookup_key(), "25");
        assert_eq!(by_name.lookup_key(), "pikachu");
    }

    #[test]
    fn gender_split_handles_genderless() {
        let mut species = SpeciesInfo {
            gender_rate: 1,
            ..Default::default()
        };
        assert_eq!(species.gender_split(), Some((12.5, 87.5)));
        species.gender_rate = -1;
        assert_eq!(species.gender_split(), None);
    }

    #[test]
    fn single_stage_chain_is_not_rendered() {
        let record = RecordDetail {
            id: 128,
            name: "tauros".into(),
            url: "https://pokeapi.co/api/v2/pokemon/128/".into(),
            height: 14,
            weight: 884,
            base_experience: Some(172),
            types: vec!["normal".into()],
            abilities: vec![],
            stats: vec![],
            moves: vec![],
            species_url: None,
        };
        let mut view = DetailView {
            record,
            species: SpeciesInfo::default(),
            evolution: Some(EvolutionNode {
                id: 128,
                name: "tauros".into(),
                trigger: None,
                next: None,
            }),
            moves: vec![],
        };
        assert!(view.renderable_chain().is_none());

        view.evolution = Some(EvolutionNode {
            id: 1,
            name: "bulbasaur".into(),
            trigger: None,
            next: Some(Box::new(EvolutionNode {
                id: 2,
                name: "ivysaur".into(),
                trigger: Some("Lv 16".into()),
                next: None,
            })),
        });
        assert_eq!(view.renderable_chain().map(EvolutionNode::stage_count), Some(2));
    }
}
