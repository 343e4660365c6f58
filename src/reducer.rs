use tui_dispatch::{DataResource, DispatchResult};

use std::collections::HashSet;

use crate::action::Action;
use crate::compare::SelectOutcome;
use crate::effect::Effect;
use crate::filter::{self, FilterSpec};
use crate::pagination::{BaseSource, PageCommand, PageMode, Paginator};
use crate::region::Region;
use crate::request::Channel;
use crate::route::Route;
use crate::state::{AppState, FilterRow, RecordDetail, RecordSummary};

pub fn reducer(state: &mut AppState, action: Action) -> DispatchResult<Effect> {
    match action {
        Action::Init => {
            state.message = None;
            let route = state.route.clone();
            DispatchResult::changed_with_many(navigate(state, route))
        }

        Action::Reload => {
            state.message = None;
            DispatchResult::changed_with_many(reload(state))
        }

        Action::PageDidLoad { token, page } => {
            if !state.requests.settle(token) {
                tracing::debug!(seq = token.seq, "dropping superseded page");
                return DispatchResult::unchanged();
            }
            state.list_loading = false;
            state.list_error = None;
            let effects = match state.paginator.page_loaded(page) {
                Some(redirect) => {
                    tracing::info!(
                        page = state.paginator.page_number(),
                        "requested page past the end, redirecting"
                    );
                    page_effects(state, redirect)
                }
                None => base_changed(state),
            };
            DispatchResult::changed_with_many(effects)
        }

        Action::RangeDidLoad { token, records } => {
            if !state.requests.settle(token) {
                tracing::debug!(seq = token.seq, "dropping superseded range");
                return DispatchResult::unchanged();
            }
            state.list_loading = false;
            state.list_error = None;
            for record in &records {
                state.facts.insert(record.id, record.facts());
            }
            let summaries = records.iter().map(RecordDetail::summary).collect();
            state.paginator.range_loaded(summaries);
            DispatchResult::changed_with_many(base_changed(state))
        }

        Action::PageDidError { token, error } | Action::RangeDidError { token, error } => {
            if !state.requests.settle(token) {
                return DispatchResult::unchanged();
            }
            tracing::warn!(error = %error, "list load failed");
            state.list_loading = false;
            state.paginator.base_failed();
            state.selected_index = 0;
            state.message = Some(format!("Load failed: {error}"));
            state.list_error = Some(error);
            DispatchResult::changed()
        }

        Action::PageNext => move_page(state, Paginator::next_page),
        Action::PagePrev => move_page(state, Paginator::prev_page),
        Action::PageFirst => move_page(state, |paginator| paginator.goto_page(1)),
        Action::PageLast => move_page(state, Paginator::last_page),
        Action::PageGoto(page) => move_page(state, |paginator| paginator.goto_page(page)),

        Action::RegionSelect(region) => select_region(state, region),
        Action::RegionNext => {
            let next = Region::cycle(state.region, 1);
            select_region(state, next)
        }
        Action::RegionPrev => {
            let prev = Region::cycle(state.region, -1);
            select_region(state, prev)
        }

        Action::FilterToggleType(name) => update_filter(state, |spec| {
            spec.toggle_type(&name);
        }),
        Action::FilterGeneration(region) => {
            update_filter(state, |spec| toggle_generation(spec, region))
        }
        Action::FilterSortNext => update_filter(state, |spec| spec.sort_key = spec.sort_key.next()),
        Action::FilterSortSet(key) => update_filter(state, |spec| spec.sort_key = key),
        Action::FilterClear => update_filter(state, |spec| *spec = FilterSpec::default()),
        Action::FilterCursorMove(delta) => {
            let next = clamp_index(state.filter_cursor, FilterRow::all().len(), delta);
            if next == state.filter_cursor {
                return DispatchResult::unchanged();
            }
            state.filter_cursor = next;
            DispatchResult::changed()
        }
        Action::FilterCursorSet(index) => {
            if index >= FilterRow::all().len() || index == state.filter_cursor {
                return DispatchResult::unchanged();
            }
            state.filter_cursor = index;
            DispatchResult::changed()
        }
        Action::FilterActivate => match state.filter_row() {
            Some(FilterRow::Sort) => {
                update_filter(state, |spec| spec.sort_key = spec.sort_key.next())
            }
            Some(FilterRow::Generation) => {
                let next = Region::cycle(state.selected_generation(), 1);
                update_filter(state, |spec| spec.selected_range = next.map(Region::range))
            }
            Some(FilterRow::Type(name)) => update_filter(state, |spec| {
                spec.toggle_type(name);
            }),
            Some(FilterRow::Clear) => {
                update_filter(state, |spec| *spec = FilterSpec::default())
            }
            None => DispatchResult::unchanged(),
        },

        Action::FactsDidLoad {
            token,
            requested,
            facts,
        } => {
            if !state.requests.settle(token) {
                tracing::debug!(seq = token.seq, "dropping superseded facts");
                return DispatchResult::unchanged();
            }
            state.facts_loading = false;
            let returned: HashSet<u32> = facts.iter().map(|entry| entry.id).collect();
            state.facts_failed.extend(
                requested
                    .into_iter()
                    .filter(|id| !returned.contains(id)),
            );
            for entry in facts {
                state.facts.insert(entry.id, entry);
            }
            DispatchResult::changed_with_many(base_changed(state))
        }

        Action::FactsDidError {
            token,
            requested,
            error,
        } => {
            if !state.requests.settle(token) {
                return DispatchResult::unchanged();
            }
            tracing::warn!(error = %error, count = requested.len(), "facts load failed");
            state.facts_loading = false;
            state.facts_failed.extend(requested);
            state.message = Some(format!("Could not load filter data: {error}"));
            DispatchResult::changed_with_many(base_changed(state))
        }

        Action::SelectionMove(delta) => {
            let index = clamp_index(state.selected_index, state.visible_records().len(), delta);
            if !state.set_selected_index(index) {
                return DispatchResult::unchanged();
            }
            DispatchResult::changed()
        }

        Action::ListSelect(index) => {
            if !state.set_selected_index(index) {
                return DispatchResult::unchanged();
            }
            DispatchResult::changed()
        }

        Action::RecordOpen => {
            let Some(key) = state.selected_record().map(RecordSummary::lookup_key) else {
                return DispatchResult::unchanged();
            };
            DispatchResult::changed_with_many(open_detail(state, key))
        }

        Action::DetailOpen(key) => DispatchResult::changed_with_many(open_detail(state, key)),

        Action::DetailDidLoad { token, view } => {
            if !state.requests.settle(token) {
                tracing::debug!(seq = token.seq, "dropping superseded detail");
                return DispatchResult::unchanged();
            }
            state
                .facts
                .insert(view.record.id, view.record.facts());
            state.detail = DataResource::Loaded(*view);
            DispatchResult::changed()
        }

        Action::DetailDidError { token, error } => {
            if !state.requests.settle(token) {
                return DispatchResult::unchanged();
            }
            tracing::warn!(error = %error, "detail load failed");
            state.message = Some(format!("Detail error: {error}"));
            state.detail = DataResource::Failed(error.to_string());
            DispatchResult::changed()
        }

        Action::DetailClose => {
            if !state.is_detail_open() {
                return DispatchResult::unchanged();
            }
            let mut effects = close_detail(state);
            if !state.paginator.has_base()
                && !state.list_loading
                && state.paginator.mode() == PageMode::All
            {
                let command = state.paginator.reload();
                effects.extend(page_effects(state, command));
            }
            DispatchResult::changed_with_many(effects)
        }

        Action::DetailScroll(delta) => {
            if !state.detail.is_loaded() {
                return DispatchResult::unchanged();
            }
            let next = if delta < 0 {
                state.detail_scroll.saturating_sub(delta.unsigned_abs())
            } else {
                state.detail_scroll.saturating_add(delta as u16)
            };
            if next == state.detail_scroll {
                return DispatchResult::unchanged();
            }
            state.detail_scroll = next;
            DispatchResult::changed()
        }

        Action::CompareSelect(record) => {
            let name = record.name.clone();
            match state.compare.select(record) {
                Err(error) => {
                    state.message = Some(error.to_string());
                    DispatchResult::changed()
                }
                Ok(SelectOutcome::Started) => {
                    state.message = Some(format!("{name} selected, pick one more to compare"));
                    DispatchResult::changed()
                }
                Ok(SelectOutcome::Restarted) => {
                    state.requests.revoke(Channel::Compare);
                    state.comparison = DataResource::Empty;
                    state.message = Some(format!("{name} selected, pick one more to compare"));
                    DispatchResult::changed_with(Effect::Cancel {
                        channel: Channel::Compare,
                    })
                }
                Ok(SelectOutcome::Completed) => {
                    let Some((left, right)) = state
                        .compare
                        .pair()
                        .map(|(left, right)| (left.clone(), right.clone()))
                    else {
                        return DispatchResult::changed();
                    };
                    state.message = None;
                    state.comparison = DataResource::Loading;
                    let token = state.requests.issue(Channel::Compare);
                    DispatchResult::changed_with(Effect::LoadComparison { token, left, right })
                }
            }
        }

        Action::ComparisonDidLoad { token, pair } => {
            if !state.requests.settle(token) {
                tracing::debug!(seq = token.seq, "dropping superseded comparison");
                return DispatchResult::unchanged();
            }
            state.comparison = DataResource::Loaded(*pair);
            DispatchResult::changed()
        }

        Action::ComparisonDidError { token, error } => {
            if !state.requests.settle(token) {
                return DispatchResult::unchanged();
            }
            tracing::warn!(error = %error, "comparison load failed");
            state.comparison = DataResource::Failed(error.to_string());
            DispatchResult::changed()
        }

        Action::CompareClose => {
            if state.compare.is_empty() {
                return DispatchResult::unchanged();
            }
            state.compare.close();
            state.comparison = DataResource::Empty;
            state.requests.revoke(Channel::Compare);
            DispatchResult::changed_with(Effect::Cancel {
                channel: Channel::Compare,
            })
        }

        Action::LocationEditStart => {
            state.location_edit.active = true;
            state.location_edit.input = state.location();
            DispatchResult::changed()
        }

        Action::LocationInput(ch) => {
            if !state.location_edit.active {
                return DispatchResult::unchanged();
            }
            state.location_edit.input.push(ch);
            DispatchResult::changed()
        }

        Action::LocationBackspace => {
            if state.location_edit.input.pop().is_none() {
                return DispatchResult::unchanged();
            }
            DispatchResult::changed()
        }

        Action::LocationCancel => {
            if !state.location_edit.active {
                return DispatchResult::unchanged();
            }
            state.location_edit.active = false;
            state.location_edit.input.clear();
            DispatchResult::changed()
        }

        Action::LocationSubmit => {
            state.location_edit.active = false;
            let input = std::mem::take(&mut state.location_edit.input);
            go_to_location(state, &input)
        }

        Action::LocationChanged(location) => go_to_location(state, &location),

        Action::FocusNext => {
            state.focus_next();
            DispatchResult::changed()
        }

        Action::UiTerminalResize(width, height) => {
            if state.terminal_size != (width, height) {
                state.terminal_size = (width, height);
                DispatchResult::changed()
            } else {
                DispatchResult::unchanged()
            }
        }

        Action::Quit => DispatchResult::unchanged(),
    }
}

fn go_to_location(state: &mut AppState, location: &str) -> DispatchResult<Effect> {
    match Route::parse(location) {
        Some(route) => {
            state.message = None;
            DispatchResult::changed_with_many(navigate(state, route))
        }
        None => {
            state.message = Some(format!("Unknown location: {}", location.trim()));
            DispatchResult::changed()
        }
    }
}

fn navigate(state: &mut AppState, route: Route) -> Vec<Effect> {
    match route {
        Route::Detail { key } => open_detail(state, key),
        Route::Browse { page } => {
            let mut effects = Vec::new();
            if state.is_detail_open() {
                effects.extend(close_detail(state));
            }
            let command = state.paginator.seek(page);
            effects.extend(page_effects(state, command));
            effects
        }
    }
}

fn open_detail(state: &mut AppState, key: String) -> Vec<Effect> {
    let key = key.trim().to_lowercase();
    state.route = Route::Detail { key: key.clone() };
    state.detail = DataResource::Loading;
    state.detail_scroll = 0;
    let token = state.requests.issue(Channel::Detail);
    vec![Effect::LoadDetail { token, key }]
}

fn close_detail(state: &mut AppState) -> Vec<Effect> {
    state.requests.revoke(Channel::Detail);
    state.detail = DataResource::Empty;
    state.detail_scroll = 0;
    state.route = Route::browse(state.paginator.page_number());
    vec![Effect::Cancel {
        channel: Channel::Detail,
    }]
}

fn reload(state: &mut AppState) -> Vec<Effect> {
    if let Route::Detail { key } = state.route.clone() {
        return open_detail(state, key);
    }
    state.facts_failed.clear();
    match state.paginator.mode() {
        PageMode::All => {
            let command = state.paginator.reload();
            page_effects(state, command)
        }
        PageMode::Range => match state.paginator.base() {
            BaseSource::Range(region) => load_range(state, region),
            BaseSource::All => Vec::new(),
        },
        PageMode::Filtered => refilter(state, false),
    }
}

fn move_page(
    state: &mut AppState,
    step: impl FnOnce(&mut Paginator) -> PageCommand,
) -> DispatchResult<Effect> {
    if state.is_detail_open() {
        return DispatchResult::unchanged();
    }
    let command = step(&mut state.paginator);
    if !command.moved() {
        return DispatchResult::unchanged();
    }
    DispatchResult::changed_with_many(page_effects(state, command))
}

/// Carry out what a paginator transition asked for and mirror the new page.
fn page_effects(state: &mut AppState, command: PageCommand) -> Vec<Effect> {
    let effects = match command {
        PageCommand::Stay => Vec::new(),
        PageCommand::Slice => {
            state.selected_index = 0;
            Vec::new()
        }
        PageCommand::Fetch(request) => {
            state.selected_index = 0;
            state.list_loading = true;
            state.list_error = None;
            let token = state.requests.issue(Channel::List);
            vec![Effect::LoadPage { token, request }]
        }
    };
    state.sync_route();
    effects
}

fn select_region(state: &mut AppState, region: Option<Region>) -> DispatchResult<Effect> {
    if state.region == region && (state.paginator.has_base() || state.list_loading) {
        return DispatchResult::unchanged();
    }
    state.region = region;
    let effects = match region {
        None => {
            let command = state.paginator.enter_all();
            page_effects(state, command)
        }
        Some(region) => {
            state.paginator.enter_range(region);
            load_range(state, region)
        }
    };
    DispatchResult::changed_with_many(effects)
}

fn load_range(state: &mut AppState, region: Region) -> Vec<Effect> {
    state.selected_index = 0;
    state.list_loading = true;
    state.list_error = None;
    state.sync_route();
    let token = state.requests.issue(Channel::List);
    tracing::debug!(region = region.name(), "loading range");
    vec![Effect::LoadRange {
        token,
        range: region.range(),
    }]
}

fn toggle_generation(spec: &mut FilterSpec, region: Option<Region>) {
    let range = region.map(Region::range);
    spec.selected_range = if range.is_some() && spec.selected_range == range {
        None
    } else {
        range
    };
}

fn update_filter(
    state: &mut AppState,
    edit: impl FnOnce(&mut FilterSpec),
) -> DispatchResult<Effect> {
    let before = state.filter.clone();
    edit(&mut state.filter);
    if state.filter == before {
        return DispatchResult::unchanged();
    }
    DispatchResult::changed_with_many(refilter(state, true))
}

/// Recompute the filtered view after the base collection or the facts changed.
fn base_changed(state: &mut AppState) -> Vec<Effect> {
    let effects = if state.filter.is_active() {
        refilter(state, false)
    } else {
        Vec::new()
    };
    state.clamp_selection();
    state.sync_route();
    effects
}

/// Apply the filter spec to the loaded base. `restart` puts the view back on
/// page 1; otherwise the current page is kept where it still exists.
fn refilter(state: &mut AppState, restart: bool) -> Vec<Effect> {
    if !state.filter.is_active() {
        let command = state.paginator.leave_filtered();
        return page_effects(state, command);
    }

    let view = filter::apply(state.paginator.base_records(), &state.filter, &state.facts);
    if restart {
        state.paginator.enter_filtered(view);
        state.selected_index = 0;
    } else {
        state.paginator.refresh_filtered(view);
        state.clamp_selection();
    }
    state.sync_route();
    request_missing_facts(state)
}

fn request_missing_facts(state: &mut AppState) -> Vec<Effect> {
    let missing: Vec<RecordSummary> =
        filter::missing_facts(state.paginator.base_records(), &state.filter, &state.facts)
            .into_iter()
            .filter(|record| {
                record
                    .id()
                    .is_some_and(|id| !state.facts_failed.contains(&id))
            })
            .collect();
    if missing.is_empty() {
        return Vec::new();
    }
    tracing::debug!(count = missing.len(), "requesting filter facts");
    state.facts_loading = true;
    let token = state.requests.issue(Channel::Facts);
    vec![Effect::LoadFacts {
        token,
        records: missing,
    }]
}

fn clamp_index(current: usize, len: usize, delta: i16) -> usize {
    if len == 0 {
        return 0;
    }
    let next = current as i64 + i64::from(delta);
    next.clamp(0, len as i64 - 1) as usize
}
