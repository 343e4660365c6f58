use tui_dispatch::{testing::*, DataResource};

use dexview::{
    action::Action,
    reducer::reducer,
    region::Region,
    request::Channel,
    state::{
        AppState, ComparePair, DetailView, EvolutionNode, MoveRow, RecordDetail, RecordStat,
        RecordSummary, SpeciesInfo,
    },
    ui,
};

fn record(id: u32, name: &str, speed: u16) -> RecordDetail {
    RecordDetail {
        id,
        name: name.into(),
        url: format!("https://pokeapi.co/api/v2/pokemon/{id}/"),
        height: 4,
        weight: 60,
        base_experience: Some(112),
        types: vec!["electric".into()],
        abilities: vec!["static".into(), "lightning-rod".into()],
        stats: vec![
            RecordStat {
                name: "hp".into(),
                value: 35,
            },
            RecordStat {
                name: "speed".into(),
                value: speed,
            },
        ],
        moves: Vec::new(),
        species_url: None,
    }
}

/// Kanto loaded locally, so every page is available without fetching.
fn kanto_state() -> AppState {
    let mut state = AppState::default();
    reducer(&mut state, Action::RegionSelect(Some(Region::Kanto)));
    let token = state.requests.issue(Channel::List);
    reducer(
        &mut state,
        Action::RangeDidLoad {
            token,
            records: (1..=151).map(|id| record(id, "mon", 10)).collect(),
        },
    );
    state
}

#[test]
fn pagination_bar_collapses_distant_pages() {
    let mut state = kanto_state();
    reducer(&mut state, Action::PageGoto(5));

    let mut render = RenderHarness::new(100, 3);
    let output = render.render_to_string_plain(|frame| {
        ui::render_pagination(frame, frame.area(), &state);
    });

    assert!(output.contains("Page 5 of 8"), "output:\n{output}");
    assert!(output.contains("[5]"), "output:\n{output}");
    assert!(output.contains("Prev") && output.contains("Next"));
}

#[test]
fn detail_view_shows_record_and_moves() {
    let mut state = AppState::default();
    reducer(&mut state, Action::DetailOpen("pikachu".into()));
    let mut pikachu = record(25, "pikachu", 90);
    pikachu.height = 4;
    state.detail = DataResource::Loaded(DetailView {
        record: pikachu,
        species: SpeciesInfo {
            name: "pikachu".into(),
            genus: Some("Mouse Pokémon".into()),
            gender_rate: 4,
            ..Default::default()
        },
        evolution: Some(EvolutionNode {
            id: 10,
            name: "pichu".into(),
            trigger: None,
            next: Some(Box::new(EvolutionNode {
                id: 10,
                name: "pikachu".into(),
                trigger: Some("High friendship".into()),
                next: None,
            })),
        }),
        moves: vec![MoveRow {
            level: 5,
            name: "thunder-shock".into(),
            move_type: Some("electric".into()),
            power: Some(40),
            accuracy: Some(100),
            pp: Some(30),
            damage_class: Some("special".into()),
        }],
    });

    let mut render = RenderHarness::new(90, 40);
    let output = render.render_to_string_plain(|frame| {
        ui::render_detail_view(frame, frame.area(), &state);
    });

    assert!(output.contains("#025 Pikachu"), "output:\n{output}");
    assert!(output.contains("Mouse Pokémon"));
    assert!(output.contains("0.4 m"));
    assert!(output.contains("Pichu"));
    assert!(output.contains("Thunder Shock"));
    assert!(output.contains("Class") && output.contains("special"));
    assert!(output.contains("50.0%"));
}

#[test]
fn failed_detail_offers_retry() {
    let mut state = AppState::default();
    reducer(&mut state, Action::DetailOpen("missingno".into()));
    state.detail = DataResource::Failed("not found: missingno".into());

    let mut render = RenderHarness::new(60, 10);
    let output = render.render_to_string_plain(|frame| {
        ui::render_detail_view(frame, frame.area(), &state);
    });
    assert!(output.contains("not found: missingno"), "output:\n{output}");
    assert!(output.contains("F5 to retry"));
}

#[test]
fn compare_modal_marks_totals() {
    let mut state = AppState::default();
    reducer(
        &mut state,
        Action::CompareSelect(RecordSummary::new(
            "pikachu",
            "https://pokeapi.co/api/v2/pokemon/25/",
        )),
    );
    reducer(
        &mut state,
        Action::CompareSelect(RecordSummary::new(
            "jolteon",
            "https://pokeapi.co/api/v2/pokemon/135/",
        )),
    );
    state.comparison = DataResource::Loaded(ComparePair {
        left: record(25, "pikachu", 90),
        right: record(135, "jolteon", 130),
    });

    let mut render = RenderHarness::new(70, 24);
    let output = render.render_to_string_plain(|frame| {
        ui::render_compare_modal(frame, frame.area(), &state);
    });

    assert!(output.contains("Pikachu") && output.contains("Jolteon"), "output:\n{output}");
    assert!(output.contains("SPD"));
    assert!(output.contains("Total"));
    assert!(output.contains("125") && output.contains("165"));
}
