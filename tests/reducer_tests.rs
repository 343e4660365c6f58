//! Store-level flows driven through EffectStoreTestHarness.
//!
//! Loads are completed by hand with the token the reducer issued, the same
//! way the effect handler reports back at runtime.

use pretty_assertions::assert_eq;
use tui_dispatch::testing::*;
use tui_dispatch::{assert_emitted, assert_not_emitted, NumericComponentId};

use dexview::{
    action::Action,
    effect::Effect,
    error::DexError,
    filter::SortKey,
    pagination::{PageMode, PageRequest},
    reducer::reducer,
    region::Region,
    request::{Channel, RequestToken},
    route::Route,
    state::{
        AppState, ComparePair, DetailView, ListPage, RecordDetail, RecordFacts, RecordStat,
        RecordSummary, SpeciesInfo,
    },
    ui::{self, DexUi},
};

fn summary(id: u32) -> RecordSummary {
    RecordSummary::new(
        format!("mon-{id}"),
        format!("https://pokeapi.co/api/v2/pokemon/{id}/"),
    )
}

fn record(id: u32) -> RecordDetail {
    RecordDetail {
        id,
        name: format!("mon-{id}"),
        url: format!("https://pokeapi.co/api/v2/pokemon/{id}/"),
        height: 7,
        weight: 69,
        base_experience: Some(64),
        types: vec!["grass".into()],
        abilities: vec!["overgrow".into()],
        stats: vec![
            RecordStat {
                name: "hp".into(),
                value: 45,
            },
            RecordStat {
                name: "speed".into(),
                value: 45 + id as u16,
            },
        ],
        moves: Vec::new(),
        species_url: None,
    }
}

fn facts(id: u32, kind: &str) -> RecordFacts {
    RecordFacts {
        id,
        types: vec![kind.into()],
        height: 10,
        weight: 100,
        base_experience: Some(100),
    }
}

fn page_of(
    ids: std::ops::RangeInclusive<u32>,
    total: u32,
    next: Option<&str>,
    previous: Option<&str>,
) -> ListPage {
    ListPage {
        records: ids.map(summary).collect(),
        next: next.map(str::to_string),
        previous: previous.map(str::to_string),
        total_count: total,
    }
}

/// Token of the single load effect the last dispatch produced.
fn issued(effects: Vec<Effect>) -> RequestToken {
    effects
        .into_iter()
        .find_map(|effect| match effect {
            Effect::LoadPage { token, .. }
            | Effect::LoadRange { token, .. }
            | Effect::LoadFacts { token, .. }
            | Effect::LoadDetail { token, .. }
            | Effect::LoadComparison { token, .. } => Some(token),
            Effect::Cancel { .. } => None,
        })
        .expect("a load effect")
}

/// State with the first server page of a 40-record catalog on screen.
fn browsing_state() -> AppState {
    let mut state = AppState::default();
    let init = reducer(&mut state, Action::Init);
    let token = issued(init.effects);
    reducer(
        &mut state,
        Action::PageDidLoad {
            token,
            page: page_of(1..=20, 40, Some("cursor-2"), None),
        },
    );
    state
}

#[test]
fn two_page_catalog_navigates_by_number_and_back() {
    let mut harness = EffectStoreTestHarness::new(AppState::default(), reducer);

    harness.dispatch_collect(Action::Init);
    let effects = harness.drain_effects();
    effects.effects_count(1);
    effects.effects_first_matches(|e| {
        matches!(
            e,
            Effect::LoadPage {
                request: PageRequest::Offset { offset: 0, limit: 20 },
                ..
            }
        )
    });
    harness.assert_state(|s| s.list_loading);

    let token = issued(effects);
    harness.dispatch_collect(Action::PageDidLoad {
        token,
        page: page_of(1..=20, 40, Some("cursor-2"), None),
    });
    harness.assert_state(|s| s.paginator.total_pages() == 2);
    harness.assert_state(|s| s.visible_records().len() == 20);
    harness.assert_state(|s| s.paginator.can_next() && !s.paginator.can_prev());

    harness.dispatch_collect(Action::PageGoto(2));
    let effects = harness.drain_effects();
    effects.effects_first_matches(|e| {
        matches!(
            e,
            Effect::LoadPage {
                request: PageRequest::Offset { offset: 20, limit: 20 },
                ..
            }
        )
    });
    harness.assert_state(|s| s.location() == "/?page=2");

    harness.dispatch_collect(Action::PageDidLoad {
        token: issued(effects),
        page: page_of(21..=40, 40, None, Some("cursor-1")),
    });
    harness.assert_state(|s| s.visible_records()[0].name == "mon-21");
    harness.assert_state(|s| !s.paginator.can_next());

    harness.dispatch_collect(Action::PagePrev);
    let effects = harness.drain_effects();
    effects.effects_first_matches(
        |e| matches!(e, Effect::LoadPage { request: PageRequest::Cursor(c), .. } if c == "cursor-1"),
    );
    harness.assert_state(|s| s.location() == "/?page=1");
}

#[test]
fn out_of_range_goto_is_ignored() {
    let mut harness = EffectStoreTestHarness::new(browsing_state(), reducer);
    let changed = harness.dispatch_all([
        Action::PageGoto(0),
        Action::PageGoto(3),
        Action::PageGoto(1),
    ]);
    assert_eq!(changed, vec![false, false, false]);
    harness.drain_effects().effects_empty();
}

#[test]
fn kanto_range_pages_locally() {
    let mut harness = EffectStoreTestHarness::new(browsing_state(), reducer);

    harness.dispatch_collect(Action::RegionSelect(Some(Region::Kanto)));
    let effects = harness.drain_effects();
    effects.effects_first_matches(|e| {
        matches!(e, Effect::LoadRange { range, .. } if range.start == 1 && range.end == 151)
    });
    harness.assert_state(|s| s.paginator.mode() == PageMode::Range);

    harness.dispatch_collect(Action::RangeDidLoad {
        token: issued(effects),
        records: (1..=151).map(record).collect(),
    });
    harness.assert_state(|s| s.paginator.total_pages() == 8);
    harness.assert_state(|s| s.visible_records().len() == 20);
    harness.assert_state(|s| s.facts.len() == 151);

    harness.dispatch_collect(Action::PageLast);
    harness.drain_effects().effects_empty();
    harness.assert_state(|s| s.paginator.page_number() == 8);
    harness.assert_state(|s| s.visible_records().len() == 11);
    harness.assert_state(|s| s.visible_records()[10].name == "mon-151");
    harness.assert_state(|s| s.location() == "/?page=8");
}

#[test]
fn late_page_after_switching_region_is_dropped() {
    let mut harness = EffectStoreTestHarness::new(AppState::default(), reducer);
    harness.dispatch_collect(Action::Init);
    let stale = issued(harness.drain_effects());

    harness.dispatch_collect(Action::RegionSelect(Some(Region::Johto)));
    let fresh = issued(harness.drain_effects());
    assert_eq!(fresh.channel, Channel::List);

    let changed = harness.dispatch_all([Action::PageDidLoad {
        token: stale,
        page: page_of(1..=20, 1302, Some("cursor-2"), None),
    }]);
    assert_eq!(changed, vec![false]);
    harness.assert_state(|s| s.list_loading && s.visible_records().is_empty());
}

#[test]
fn type_filter_fetches_facts_and_clear_restores_page() {
    let mut harness = EffectStoreTestHarness::new(browsing_state(), reducer);

    harness.dispatch_collect(Action::FilterToggleType("fire".into()));
    let effects = harness.drain_effects();
    effects.effects_first_matches(|e| matches!(e, Effect::LoadFacts { records, .. } if records.len() == 20));
    harness.assert_state(|s| s.paginator.mode() == PageMode::Filtered);
    harness.assert_state(|s| s.facts_loading);

    let returned = (1..=20)
        .filter(|id| *id != 7)
        .map(|id| facts(id, if (4..=6).contains(&id) { "fire" } else { "water" }))
        .collect();
    harness.dispatch_collect(Action::FactsDidLoad {
        token: issued(effects),
        requested: (1..=20).collect(),
        facts: returned,
    });
    harness.drain_effects().effects_empty();
    harness.assert_state(|s| {
        s.visible_records()
            .iter()
            .map(|r| r.name.as_str())
            .collect::<Vec<_>>()
            == ["mon-4", "mon-5", "mon-6"]
    });
    harness.assert_state(|s| s.facts_failed.contains(&7) && !s.facts_loading);
    harness.assert_state(|s| s.paginator.total_pages() == 1);

    harness.dispatch_collect(Action::FilterClear);
    harness.drain_effects().effects_empty();
    harness.assert_state(|s| s.paginator.mode() == PageMode::All);
    harness.assert_state(|s| s.visible_records().len() == 20);
}

#[test]
fn filter_set_while_first_page_is_pending_keeps_server_paging() {
    let mut harness = EffectStoreTestHarness::new(AppState::default(), reducer);
    harness.dispatch_collect(Action::Init);
    let token = issued(harness.drain_effects());

    harness.dispatch_collect(Action::FilterSortSet(SortKey::Name));
    harness.drain_effects().effects_empty();
    harness.assert_state(|s| s.paginator.mode() == PageMode::Filtered);
    harness.assert_state(|s| s.list_loading);
    harness.assert_state(|s| s.location() == "/?page=1");

    harness.dispatch_collect(Action::PageDidLoad {
        token,
        page: page_of(1..=20, 40, Some("cursor-2"), None),
    });
    harness.assert_state(|s| s.paginator.mode() == PageMode::Filtered);
    harness.assert_state(|s| s.visible_records().len() == 20);
    harness.assert_state(|s| s.location() == "/?page=1");

    harness.dispatch_collect(Action::FilterClear);
    harness.drain_effects().effects_empty();
    harness.assert_state(|s| s.paginator.mode() == PageMode::All);
    harness.assert_state(|s| s.paginator.total_pages() == 2);
    harness.assert_state(|s| s.paginator.can_next() && !s.paginator.can_prev());
    harness.assert_state(|s| s.visible_records().len() == 20);
    harness.assert_state(|s| s.location() == "/?page=1");

    harness.dispatch_collect(Action::PageNext);
    harness.drain_effects().effects_first_matches(
        |e| matches!(e, Effect::LoadPage { request: PageRequest::Cursor(c), .. } if c == "cursor-2"),
    );
    harness.assert_state(|s| s.location() == "/?page=2");
}

#[test]
fn filter_round_trip_keeps_totals_and_cursors() {
    let mut harness = EffectStoreTestHarness::new(browsing_state(), reducer);

    harness.dispatch_collect(Action::FilterSortSet(SortKey::Name));
    harness.drain_effects().effects_empty();
    harness.assert_state(|s| s.paginator.mode() == PageMode::Filtered);
    harness.assert_state(|s| s.location() == "/?page=1");

    harness.dispatch_collect(Action::FilterClear);
    harness.drain_effects().effects_empty();
    harness.assert_state(|s| s.paginator.mode() == PageMode::All);
    harness.assert_state(|s| s.paginator.total_pages() == 2);
    harness.assert_state(|s| s.paginator.can_next());
    harness.assert_state(|s| s.location() == "/?page=1");

    let changed = harness.dispatch_all([Action::PageGoto(2)]);
    assert_eq!(changed, vec![true]);
    harness.drain_effects().effects_first_matches(|e| {
        matches!(
            e,
            Effect::LoadPage {
                request: PageRequest::Offset { offset: 20, limit: 20 },
                ..
            }
        )
    });
}

#[test]
fn sorting_by_weight_uses_known_facts() {
    let mut harness = EffectStoreTestHarness::new(browsing_state(), reducer);
    harness.dispatch_collect(Action::FilterSortSet(SortKey::Weight));
    let token = issued(harness.drain_effects());

    let returned = (1..=20)
        .map(|id| RecordFacts {
            weight: 1000 - id as u16,
            ..facts(id, "normal")
        })
        .collect();
    harness.dispatch_collect(Action::FactsDidLoad {
        token,
        requested: (1..=20).collect(),
        facts: returned,
    });
    harness.assert_state(|s| s.visible_records()[0].name == "mon-20");
    harness.assert_state(|s| s.visible_records()[19].name == "mon-1");
}

#[test]
fn compare_needs_two_distinct_records() {
    let mut harness = EffectStoreTestHarness::new(browsing_state(), reducer);

    harness.dispatch_collect(Action::CompareSelect(summary(1)));
    harness.drain_effects().effects_empty();
    harness.assert_state(|s| !s.is_compare_open());

    harness.dispatch_collect(Action::CompareSelect(summary(1)));
    harness.drain_effects().effects_empty();
    harness.assert_state(|s| {
        s.message.as_deref()
            == Some(DexError::DuplicateSelection("mon-1".into()).to_string().as_str())
    });

    harness.dispatch_collect(Action::CompareSelect(summary(4)));
    let effects = harness.drain_effects();
    effects.effects_first_matches(|e| {
        matches!(e, Effect::LoadComparison { left, right, .. } if left.name == "mon-1" && right.name == "mon-4")
    });
    harness.assert_state(|s| s.is_compare_open() && s.comparison.is_loading());

    harness.dispatch_collect(Action::ComparisonDidLoad {
        token: issued(effects),
        pair: Box::new(ComparePair {
            left: record(1),
            right: record(4),
        }),
    });
    harness.assert_state(|s| s.comparison.is_loaded());

    harness.dispatch_collect(Action::CompareClose);
    harness
        .drain_effects()
        .effects_first_matches(|e| matches!(e, Effect::Cancel { channel: Channel::Compare }));
    harness.assert_state(|s| s.compare.is_empty() && !s.is_compare_open());
}

#[test]
fn newer_detail_request_wins() {
    let mut harness = EffectStoreTestHarness::new(browsing_state(), reducer);

    harness.dispatch_collect(Action::DetailOpen("Pikachu".into()));
    let first = issued(harness.drain_effects());
    harness.dispatch_collect(Action::DetailOpen("eevee".into()));
    let second = issued(harness.drain_effects());
    harness.assert_state(|s| s.location() == "/pokemon/eevee");

    let view = |id| DetailView {
        record: record(id),
        species: SpeciesInfo::default(),
        evolution: None,
        moves: Vec::new(),
    };
    let changed = harness.dispatch_all([Action::DetailDidLoad {
        token: first,
        view: Box::new(view(25)),
    }]);
    assert_eq!(changed, vec![false]);
    harness.assert_state(|s| s.detail.is_loading());

    harness.dispatch_collect(Action::DetailDidLoad {
        token: second,
        view: Box::new(view(133)),
    });
    harness.assert_state(|s| s.detail.data().map(|v| v.record.id) == Some(133));

    harness.dispatch_collect(Action::DetailClose);
    harness.assert_state(|s| !s.is_detail_open() && s.location() == "/?page=1");
}

#[test]
fn failed_detail_keeps_route_for_retry() {
    let mut harness = EffectStoreTestHarness::new(
        AppState::at(Route::Detail {
            key: "missingno".into(),
        }),
        reducer,
    );
    harness.dispatch_collect(Action::Init);
    let token = issued(harness.drain_effects());
    harness.dispatch_collect(Action::DetailDidError {
        token,
        error: DexError::NotFound("missingno".into()),
    });
    harness.assert_state(|s| s.detail.is_failed() && s.is_detail_open());

    harness.dispatch_collect(Action::Reload);
    harness
        .drain_effects()
        .effects_first_matches(|e| matches!(e, Effect::LoadDetail { key, .. } if key == "missingno"));

    // Closing a detail that was opened directly loads the list behind it.
    harness.dispatch_collect(Action::DetailClose);
    let effects = harness.drain_effects();
    effects.effects_count(2);
    assert!(effects
        .iter()
        .any(|e| matches!(e, Effect::LoadPage { .. })));
}

#[test]
fn typed_location_drives_navigation() {
    let mut harness = EffectStoreTestHarness::new(browsing_state(), reducer);

    harness.dispatch_collect(Action::LocationEditStart);
    harness.assert_state(|s| s.location_edit.active && s.location_edit.input == "/?page=1");
    harness.dispatch_all([Action::LocationBackspace, Action::LocationInput('2')]);
    harness.dispatch_collect(Action::LocationSubmit);
    harness.drain_effects().effects_first_matches(|e| {
        matches!(
            e,
            Effect::LoadPage {
                request: PageRequest::Offset { offset: 20, .. },
                ..
            }
        )
    });
    harness.assert_state(|s| !s.location_edit.active && s.location() == "/?page=2");

    harness.dispatch_collect(Action::LocationChanged("/pokemon/Bulbasaur".into()));
    harness
        .drain_effects()
        .effects_first_matches(|e| matches!(e, Effect::LoadDetail { key, .. } if key == "bulbasaur"));

    harness.dispatch_collect(Action::LocationChanged("/nowhere".into()));
    harness.drain_effects().effects_empty();
    harness.assert_state(|s| s.message.as_deref() == Some("Unknown location: /nowhere"));
}

#[test]
fn list_keys_map_to_actions() {
    let mut harness = EffectStoreTestHarness::new(browsing_state(), reducer);
    let mut ui = DexUi::new();

    let actions = harness.send_keys::<NumericComponentId, _, _>("c", |state, event| {
        ui.handle_list_event(&event.kind, state).actions
    });
    actions.assert_count(1);
    actions.assert_first(Action::CompareSelect(summary(1)));

    let actions = harness.send_keys::<NumericComponentId, _, _>("n", |state, event| {
        ui.handle_list_event(&event.kind, state).actions
    });
    actions.assert_first(Action::PageNext);
}

#[test]
fn digit_keys_toggle_a_generation_filter() {
    let mut harness = EffectStoreTestHarness::new(browsing_state(), reducer);
    let mut ui = DexUi::new();

    let actions = harness.send_keys::<NumericComponentId, _, _>("2 0", |state, event| {
        ui.handle_filter_event(&event.kind, state).actions
    });
    actions.assert_count(2);
    assert_emitted!(actions, Action::FilterGeneration(Some(Region::Johto)));
    assert_emitted!(actions, Action::FilterGeneration(None));

    harness.dispatch_collect(Action::FilterGeneration(Some(Region::Kanto)));
    harness.assert_state(|s| s.selected_generation() == Some(Region::Kanto));
    harness.assert_state(|s| s.paginator.mode() == PageMode::Filtered);
    harness.assert_state(|s| s.visible_records().len() == 20);

    harness.dispatch_collect(Action::FilterGeneration(Some(Region::Kanto)));
    harness.assert_state(|s| s.selected_generation().is_none());
    harness.assert_state(|s| s.paginator.mode() == PageMode::All);
    harness.assert_state(|s| s.location() == "/?page=1");
}

#[test]
fn global_keys_stand_down_while_typing_a_location() {
    let mut harness = EffectStoreTestHarness::new(browsing_state(), reducer);

    let actions = harness.send_keys::<NumericComponentId, _, _>("r q", |state, event| {
        ui::handle_global_event(&event.kind, state).actions
    });
    assert_emitted!(actions, Action::RegionNext);
    assert_emitted!(actions, Action::Quit);

    harness.dispatch_collect(Action::LocationEditStart);
    let actions = harness.send_keys::<NumericComponentId, _, _>("r q", |state, event| {
        ui::handle_global_event(&event.kind, state).actions
    });
    assert_not_emitted!(actions, Action::RegionNext);
    assert_not_emitted!(actions, Action::Quit);

    let actions = harness.send_keys::<NumericComponentId, _, _>("q esc", |state, event| {
        ui::handle_location_event(&event.kind, state).actions
    });
    assert_emitted!(actions, Action::LocationInput('q'));
    assert_emitted!(actions, Action::LocationCancel);
}
