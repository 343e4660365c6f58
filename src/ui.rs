use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};
use tui_dispatch::{
    Component, DataResource, EventContext, EventKind, EventRoutingState, HandlerResponse, RenderContext,
};
use tui_dispatch_components::style::BorderStyle;
use tui_dispatch_components::{
    centered_rect, BaseStyle, Padding, SelectList, SelectListBehavior, SelectListProps,
    SelectListStyle, SelectionStyle, StatusBar, StatusBarHint, StatusBarItem, StatusBarProps,
    StatusBarSection, StatusBarStyle,
};

use crossterm::event::{KeyCode, KeyModifiers};

use crate::action::Action;
use crate::compare::{self, Edge};
use crate::pagination::{page_window, PageMode};
use crate::region::Region;
use crate::state::{AppState, ComparePair, DetailView, FilterRow, FocusArea, RecordSummary};

const BG_BASE: Color = Color::Rgb(14, 16, 24);
const BG_PANEL: Color = Color::Rgb(24, 28, 40);
const BG_PANEL_ALT: Color = Color::Rgb(32, 38, 54);
const BG_HIGHLIGHT: Color = Color::Rgb(150, 36, 44);
const TEXT_MAIN: Color = Color::Rgb(236, 238, 242);
const TEXT_DIM: Color = Color::Rgb(150, 156, 172);
const ACCENT_RED: Color = Color::Rgb(232, 72, 72);
const ACCENT_GOLD: Color = Color::Rgb(240, 196, 80);
const ACCENT_GREEN: Color = Color::Rgb(104, 208, 128);

#[derive(tui_dispatch::ComponentId, Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum DexComponentId {
    List,
    Filters,
    Detail,
    Compare,
    Location,
}

#[derive(tui_dispatch::BindingContext, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DexContext {
    List,
    Filters,
    Detail,
    Compare,
    Location,
}

impl EventRoutingState<DexComponentId, DexContext> for AppState {
    fn focused(&self) -> Option<DexComponentId> {
        if let Some(modal) = self.modal() {
            return Some(modal);
        }
        if self.is_detail_open() {
            return Some(DexComponentId::Detail);
        }
        match self.focus {
            FocusArea::List => Some(DexComponentId::List),
            FocusArea::Filters => Some(DexComponentId::Filters),
        }
    }

    fn modal(&self) -> Option<DexComponentId> {
        if self.location_edit.active {
            Some(DexComponentId::Location)
        } else if self.is_compare_open() {
            Some(DexComponentId::Compare)
        } else {
            None
        }
    }

    fn binding_context(&self, id: DexComponentId) -> DexContext {
        match id {
            DexComponentId::List => DexContext::List,
            DexComponentId::Filters => DexContext::Filters,
            DexComponentId::Detail => DexContext::Detail,
            DexComponentId::Compare => DexContext::Compare,
            DexComponentId::Location => DexContext::Location,
        }
    }

    fn default_context(&self) -> DexContext {
        DexContext::List
    }
}

pub struct DexUi {
    record_list: SelectList,
    filter_list: SelectList,
    status_bar: StatusBar,
}

impl Default for DexUi {
    fn default() -> Self {
        Self::new()
    }
}

impl DexUi {
    pub fn new() -> Self {
        Self {
            record_list: SelectList::new(),
            filter_list: SelectList::new(),
            status_bar: StatusBar::new(),
        }
    }

    pub fn render(
        &mut self,
        frame: &mut Frame,
        area: Rect,
        state: &AppState,
        _render_ctx: RenderContext,
        event_ctx: &mut EventContext<DexComponentId>,
    ) {
        let base = Block::default().style(Style::default().bg(BG_BASE));
        frame.render_widget(base, area);
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4),
                Constraint::Min(8),
                Constraint::Length(3),
            ])
            .split(area);

        render_header(frame, layout[0], state);
        if state.location_edit.active {
            event_ctx.set_component_area(DexComponentId::Location, layout[0]);
        } else {
            event_ctx.component_areas.remove(&DexComponentId::Location);
        }

        if state.is_detail_open() {
            event_ctx.set_component_area(DexComponentId::Detail, layout[1]);
            event_ctx.component_areas.remove(&DexComponentId::List);
            event_ctx.component_areas.remove(&DexComponentId::Filters);
            render_detail_view(frame, layout[1], state);
        } else {
            event_ctx.component_areas.remove(&DexComponentId::Detail);
            self.render_browse(frame, layout[1], state, event_ctx);
        }

        render_footer(frame, layout[2], state, &mut self.status_bar);

        if state.is_compare_open() {
            let modal_area = compare_modal_area(area);
            event_ctx.set_component_area(DexComponentId::Compare, modal_area);
            render_compare_modal(frame, modal_area, state);
        } else {
            event_ctx.component_areas.remove(&DexComponentId::Compare);
        }
    }

    fn render_browse(
        &mut self,
        frame: &mut Frame,
        area: Rect,
        state: &AppState,
        event_ctx: &mut EventContext<DexComponentId>,
    ) {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(30), Constraint::Min(30)])
            .split(area);
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(5), Constraint::Length(3)])
            .split(columns[1]);

        event_ctx.set_component_area(DexComponentId::Filters, columns[0]);
        event_ctx.set_component_area(DexComponentId::List, rows[0]);

        let block = panel_block("Filters", state.focus == FocusArea::Filters);
        let inner = block.inner(columns[0]);
        frame.render_widget(block, columns[0]);
        let items = filter_items(state);
        let props = filter_list_props(&items, state, state.focus == FocusArea::Filters);
        self.filter_list.render(frame, inner, props);

        let title = format!("Catalog · {}", state.mode_label());
        let block = panel_block(&title, state.focus == FocusArea::List);
        let inner = block.inner(rows[0]);
        frame.render_widget(block, rows[0]);
        if state.visible_records().is_empty() {
            let notice = Paragraph::new(empty_list_text(state))
                .alignment(Alignment::Center)
                .style(Style::default().fg(TEXT_DIM));
            frame.render_widget(notice, inner);
        } else {
            let items = record_items(state);
            let props = record_list_props(&items, state, state.focus == FocusArea::List);
            self.record_list.render(frame, inner, props);
        }

        render_pagination(frame, rows[1], state);
    }

    pub fn handle_list_event(
        &mut self,
        event: &EventKind,
        state: &AppState,
    ) -> HandlerResponse<Action> {
        let actions = match event {
            EventKind::Key(key) => match key.code {
                KeyCode::Enter => vec![Action::RecordOpen],
                KeyCode::Char('c') => match state.selected_record() {
                    Some(record) => vec![Action::CompareSelect(record.clone())],
                    None => vec![],
                },
                KeyCode::Right | KeyCode::Char('n') => vec![Action::PageNext],
                KeyCode::Left | KeyCode::Char('p') => vec![Action::PagePrev],
                KeyCode::Home | KeyCode::Char('g') => vec![Action::PageFirst],
                KeyCode::End | KeyCode::Char('G') => vec![Action::PageLast],
                _ => {
                    let items = record_items(state);
                    let props = record_list_props(&items, state, true);
                    let actions: Vec<_> = self
                        .record_list
                        .handle_event(event, props)
                        .into_iter()
                        .collect();
                    return handler_response(actions);
                }
            },
            EventKind::Scroll { delta, .. } => vec![Action::SelectionMove((*delta * 3) as i16)],
            _ => vec![],
        };
        handler_response(actions)
    }

    pub fn handle_filter_event(
        &mut self,
        event: &EventKind,
        state: &AppState,
    ) -> HandlerResponse<Action> {
        let actions = match event {
            EventKind::Key(key) => match key.code {
                KeyCode::Enter | KeyCode::Char(' ') => vec![Action::FilterActivate],
                KeyCode::Char('s') => vec![Action::FilterSortNext],
                KeyCode::Char('x') => vec![Action::FilterClear],
                KeyCode::Char('0') => vec![Action::FilterGeneration(None)],
                KeyCode::Char(digit @ '1'..='8') => {
                    let generation = digit.to_digit(10).map(|n| n as u8).unwrap_or(0);
                    match Region::from_generation(generation) {
                        Some(region) => vec![Action::FilterGeneration(Some(region))],
                        None => vec![],
                    }
                }
                KeyCode::Up | KeyCode::Char('k') => vec![Action::FilterCursorMove(-1)],
                KeyCode::Down | KeyCode::Char('j') => vec![Action::FilterCursorMove(1)],
                _ => {
                    let items = filter_items(state);
                    let props = filter_list_props(&items, state, true);
                    let actions: Vec<_> = self
                        .filter_list
                        .handle_event(event, props)
                        .into_iter()
                        .collect();
                    return handler_response(actions);
                }
            },
            EventKind::Scroll { delta, .. } => vec![Action::FilterCursorMove(*delta as i16)],
            _ => vec![],
        };
        handler_response(actions)
    }
}

pub fn handle_detail_event(event: &EventKind, state: &AppState) -> HandlerResponse<Action> {
    let actions = match event {
        EventKind::Key(key) => match key.code {
            KeyCode::Esc | KeyCode::Backspace | KeyCode::Char('b') => vec![Action::DetailClose],
            KeyCode::Down | KeyCode::Char('j') => vec![Action::DetailScroll(1)],
            KeyCode::Up | KeyCode::Char('k') => vec![Action::DetailScroll(-1)],
            KeyCode::PageDown => vec![Action::DetailScroll(10)],
            KeyCode::PageUp => vec![Action::DetailScroll(-10)],
            KeyCode::Char('c') => match state.detail.data() {
                Some(view) => vec![Action::CompareSelect(view.record.summary())],
                None => vec![],
            },
            _ => vec![],
        },
        EventKind::Scroll { delta, .. } => vec![Action::DetailScroll((*delta * 3) as i16)],
        _ => vec![],
    };
    handler_response(actions)
}

pub fn handle_compare_event(event: &EventKind, _state: &AppState) -> HandlerResponse<Action> {
    let actions = match event {
        EventKind::Key(key) => match key.code {
            KeyCode::Esc | KeyCode::Enter | KeyCode::Char('c') | KeyCode::Char('x') => {
                vec![Action::CompareClose]
            }
            _ => vec![],
        },
        _ => vec![],
    };
    handler_response(actions)
}

pub fn handle_location_event(event: &EventKind, _state: &AppState) -> HandlerResponse<Action> {
    let actions = match event {
        EventKind::Key(key) => match key.code {
            KeyCode::Esc => vec![Action::LocationCancel],
            KeyCode::Enter => vec![Action::LocationSubmit],
            KeyCode::Backspace => vec![Action::LocationBackspace],
            KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                vec![Action::LocationInput(ch)]
            }
            _ => vec![],
        },
        _ => vec![],
    };
    handler_response(actions)
}

/// Keys that work everywhere outside the location editor.
pub fn handle_global_event(event: &EventKind, state: &AppState) -> HandlerResponse<Action> {
    match event {
        EventKind::Resize(width, height) => {
            HandlerResponse::action(Action::UiTerminalResize(*width, *height)).with_render()
        }
        EventKind::Key(key) if !state.location_edit.active => match key.code {
            KeyCode::Char('q') => HandlerResponse::action(Action::Quit),
            KeyCode::Tab | KeyCode::BackTab if !state.is_detail_open() => {
                HandlerResponse::action(Action::FocusNext)
            }
            KeyCode::Char(':') => HandlerResponse::action(Action::LocationEditStart),
            KeyCode::Char('r') if !state.is_detail_open() => {
                HandlerResponse::action(Action::RegionNext)
            }
            KeyCode::Char('R') if !state.is_detail_open() => {
                HandlerResponse::action(Action::RegionPrev)
            }
            KeyCode::F(5) => HandlerResponse::action(Action::Reload),
            _ => HandlerResponse::ignored(),
        },
        _ => HandlerResponse::ignored(),
    }
}

fn handler_response(actions: Vec<Action>) -> HandlerResponse<Action> {
    if actions.is_empty() {
        HandlerResponse::ignored()
    } else {
        HandlerResponse {
            actions,
            consumed: true,
            needs_render: false,
        }
    }
}

fn render_header(frame: &mut Frame, area: Rect, state: &AppState) {
    let location = if state.location_edit.active {
        Span::styled(
            format!("{}_", state.location_edit.input),
            Style::default().fg(ACCENT_GOLD).add_modifier(Modifier::BOLD),
        )
    } else {
        Span::styled(state.location(), Style::default().fg(TEXT_MAIN))
    };
    let compare = match state.compare.names().as_slice() {
        [] => "-".to_string(),
        names => names
            .iter()
            .map(|name| format_name(name))
            .collect::<Vec<_>>()
            .join(" vs "),
    };

    let text = Text::from(vec![
        Line::from(vec![
            Span::styled("Location ", Style::default().fg(TEXT_DIM)),
            location,
        ]),
        Line::from(vec![
            Span::styled("Mode ", Style::default().fg(TEXT_DIM)),
            Span::styled(state.mode_label(), Style::default().fg(ACCENT_GOLD)),
            Span::styled("  Filters ", Style::default().fg(TEXT_DIM)),
            Span::styled(filter_summary(state), Style::default().fg(ACCENT_GOLD)),
            Span::styled("  Compare ", Style::default().fg(TEXT_DIM)),
            Span::styled(compare, Style::default().fg(ACCENT_GREEN)),
        ]),
    ]);

    let block = Block::default()
        .borders(Borders::ALL)
        .title(Span::styled(
            " DEXVIEW ",
            Style::default().fg(ACCENT_RED).add_modifier(Modifier::BOLD),
        ))
        .style(Style::default().bg(BG_PANEL).fg(TEXT_MAIN))
        .border_style(if state.location_edit.active {
            Style::default().fg(ACCENT_GOLD)
        } else {
            Style::default().fg(TEXT_DIM)
        });
    frame.render_widget(Paragraph::new(text).block(block), area);
}

/// Prev/next controls plus the numbered page window.
pub fn render_pagination(frame: &mut Frame, area: Rect, state: &AppState) {
    let paginator = &state.paginator;
    let total = paginator.total_pages();
    let current = paginator.page_number();
    let enabled = Style::default().fg(TEXT_MAIN);
    let disabled = Style::default().fg(TEXT_DIM).add_modifier(Modifier::DIM);

    let mut spans = vec![Span::styled(
        "‹ Prev ",
        if paginator.can_prev() { enabled } else { disabled },
    )];
    let window = page_window(current, total);
    if let Some(first) = window.first {
        spans.push(page_span(first, current));
        if window.leading_gap {
            spans.push(Span::styled(" … ", Style::default().fg(TEXT_DIM)));
        }
    }
    for page in &window.pages {
        spans.push(page_span(*page, current));
    }
    if let Some(last) = window.last {
        if window.trailing_gap {
            spans.push(Span::styled(" … ", Style::default().fg(TEXT_DIM)));
        }
        spans.push(page_span(last, current));
    }
    spans.push(Span::styled(
        " Next ›",
        if paginator.can_next() { enabled } else { disabled },
    ));
    spans.push(Span::styled(
        format!("   Page {current} of {}", total.max(1)),
        Style::default().fg(TEXT_DIM),
    ));
    if paginator.mode() == PageMode::Filtered {
        spans.push(Span::styled(
            format!(" · {} matches", paginator.page_state().total_count),
            Style::default().fg(ACCENT_GOLD),
        ));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .style(Style::default().bg(BG_PANEL))
        .border_style(Style::default().fg(TEXT_DIM));
    let paragraph = Paragraph::new(Line::from(spans))
        .block(block)
        .alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}

fn page_span(page: u32, current: u32) -> Span<'static> {
    if page == current {
        Span::styled(
            format!("[{page}]"),
            Style::default()
                .fg(BG_BASE)
                .bg(ACCENT_GOLD)
                .add_modifier(Modifier::BOLD),
        )
    } else {
        Span::styled(format!(" {page} "), Style::default().fg(TEXT_MAIN))
    }
}

pub fn render_detail_view(frame: &mut Frame, area: Rect, state: &AppState) {
    let block = panel_block("Detail", true);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let text = match &state.detail {
        DataResource::Loaded(view) => detail_text(view),
        DataResource::Failed(error) => Text::from(vec![
            Line::styled("Could not load this record.", Style::default().fg(ACCENT_RED)),
            Line::styled(error.clone(), Style::default().fg(TEXT_DIM)),
            Line::raw(""),
            Line::styled("F5 to retry, Esc to go back", Style::default().fg(TEXT_DIM)),
        ]),
        DataResource::Loading | DataResource::Empty => {
            Text::styled("Loading...", Style::default().fg(TEXT_DIM))
        }
    };

    let paragraph = Paragraph::new(text)
        .wrap(Wrap { trim: false })
        .scroll((state.detail_scroll, 0))
        .style(Style::default().fg(TEXT_MAIN));
    frame.render_widget(paragraph, inner);
}

fn detail_text(view: &DetailView) -> Text<'static> {
    let record = &view.record;
    let species = &view.species;
    let heading = Style::default().fg(ACCENT_GOLD).add_modifier(Modifier::BOLD);
    let dim = Style::default().fg(TEXT_DIM);

    let mut lines = vec![
        Line::from(vec![
            Span::styled(format!("#{:03} ", record.id), dim),
            Span::styled(
                format_name(&record.name),
                Style::default().fg(TEXT_MAIN).add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                species
                    .genus
                    .as_ref()
                    .map(|genus| format!("  {genus}"))
                    .unwrap_or_default(),
                dim,
            ),
        ]),
        Line::from(type_spans(&record.types)),
        Line::raw(format!(
            "Height {:.1} m   Weight {:.1} kg   Base exp {}",
            record.height_m(),
            record.weight_kg(),
            optional(record.base_experience)
        )),
        Line::raw(format!(
            "Abilities: {}",
            record
                .abilities
                .iter()
                .map(|name| format_name(name))
                .collect::<Vec<_>>()
                .join(", ")
        )),
    ];

    let gender = match species.gender_split() {
        Some((female, male)) => format!("♀ {female:.1}% / ♂ {male:.1}%"),
        None => "Genderless".to_string(),
    };
    lines.push(Line::raw(format!(
        "Color: {}   Egg groups: {}   {gender}",
        species.color.as_deref().map(format_name).unwrap_or_else(|| "-".into()),
        if species.egg_groups.is_empty() {
            "-".to_string()
        } else {
            species
                .egg_groups
                .iter()
                .map(|name| format_name(name))
                .collect::<Vec<_>>()
                .join(", ")
        }
    )));
    if let Some(flavor) = &species.flavor_text {
        lines.push(Line::raw(""));
        lines.push(Line::styled(flavor.clone(), Style::default().fg(TEXT_DIM)));
    }

    lines.push(Line::raw(""));
    lines.push(Line::styled("Base stats", heading));
    for stat in &record.stats {
        lines.push(Line::raw(render_stat(&stat.name, stat.value)));
    }

    if let Some(chain) = view.renderable_chain() {
        lines.push(Line::raw(""));
        lines.push(Line::styled("Evolution", heading));
        let mut spans = Vec::new();
        for (index, stage) in chain.stages().into_iter().enumerate() {
            if index > 0 {
                let how = stage
                    .trigger
                    .as_ref()
                    .map(|trigger| format!(" ({trigger})"))
                    .unwrap_or_default();
                spans.push(Span::styled(format!(" →{how} "), dim));
            }
            let style = if stage.name == view.species.name {
                Style::default().fg(ACCENT_GOLD).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(TEXT_MAIN)
            };
            spans.push(Span::styled(format_name(&stage.name), style));
        }
        lines.push(Line::from(spans));
    }

    lines.push(Line::raw(""));
    lines.push(Line::styled("Level-up moves", heading));
    if view.moves.is_empty() {
        lines.push(Line::styled("None", dim));
    } else {
        lines.push(Line::styled(
            format!(
                "{:>4}  {:<18} {:<10} {:<9} {:>5} {:>5} {:>4}",
                "Lv", "Move", "Type", "Class", "Pow", "Acc", "PP"
            ),
            dim,
        ));
        for row in &view.moves {
            lines.push(Line::raw(format!(
                "{:>4}  {:<18} {:<10} {:<9} {:>5} {:>5} {:>4}",
                row.level,
                format_name(&row.name),
                row.move_type.as_deref().unwrap_or("-"),
                row.damage_class.as_deref().unwrap_or("-"),
                optional(row.power),
                optional(row.accuracy),
                optional(row.pp)
            )));
        }
    }

    Text::from(lines)
}

pub fn render_compare_modal(frame: &mut Frame, area: Rect, state: &AppState) {
    frame.render_widget(Clear, area);
    let block = Block::default()
        .borders(Borders::ALL)
        .title(Span::styled(
            " Compare ",
            Style::default().fg(ACCENT_GOLD).add_modifier(Modifier::BOLD),
        ))
        .style(Style::default().bg(BG_PANEL_ALT).fg(TEXT_MAIN))
        .border_style(Style::default().fg(ACCENT_GOLD));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let text = match &state.comparison {
        DataResource::Loaded(pair) => compare_text(pair),
        DataResource::Failed(error) => Text::from(vec![
            Line::styled("Comparison unavailable.", Style::default().fg(ACCENT_RED)),
            Line::styled(error.clone(), Style::default().fg(TEXT_DIM)),
        ]),
        DataResource::Loading | DataResource::Empty => {
            Text::styled("Loading both records...", Style::default().fg(TEXT_DIM))
        }
    };
    frame.render_widget(Paragraph::new(text).wrap(Wrap { trim: false }), inner);
}

fn compare_text(pair: &ComparePair) -> Text<'static> {
    let (left, right) = (&pair.left, &pair.right);
    let dim = Style::default().fg(TEXT_DIM);
    let bold = Style::default().fg(TEXT_MAIN).add_modifier(Modifier::BOLD);
    let row = |label: &str, l: String, r: String| {
        Line::from(vec![
            Span::styled(format!("{label:<10}"), dim),
            Span::raw(format!("{l:<20}")),
            Span::raw(r),
        ])
    };

    let mut lines = vec![
        Line::from(vec![
            Span::raw(format!("{:<10}", "")),
            Span::styled(format!("{:<20}", format_name(&left.name)), bold),
            Span::styled(format_name(&right.name), bold),
        ]),
        row("Number", format!("#{:03}", left.id), format!("#{:03}", right.id)),
        row("Height", format!("{:.1} m", left.height_m()), format!("{:.1} m", right.height_m())),
        row("Weight", format!("{:.1} kg", left.weight_kg()), format!("{:.1} kg", right.weight_kg())),
        row(
            "Base exp",
            optional(left.base_experience),
            optional(right.base_experience),
        ),
        row("Types", left.types.join("/"), right.types.join("/")),
        row(
            "Abilities",
            left.abilities.join(", "),
            right.abilities.join(", "),
        ),
        Line::raw(""),
    ];

    let stats = compare::stat_lines(pair);
    let win = Style::default().fg(ACCENT_GREEN).add_modifier(Modifier::BOLD);
    for stat in &stats {
        let (left_style, right_style) = match stat.edge {
            Edge::Left => (win, Style::default()),
            Edge::Right => (Style::default(), win),
            Edge::Tie => (Style::default(), Style::default()),
        };
        lines.push(Line::from(vec![
            Span::styled(format!("{:<10}", shorten_stat(&stat.name)), dim),
            Span::styled(format!("{:<20}", optional(stat.left)), left_style),
            Span::styled(optional(stat.right), right_style),
        ]));
    }
    lines.push(Line::from(vec![
        Span::styled(format!("{:<10}", "Total"), dim),
        Span::styled(format!("{:<20}", compare::stat_total(&stats, Edge::Left)), bold),
        Span::styled(compare::stat_total(&stats, Edge::Right).to_string(), bold),
    ]));
    lines.push(Line::raw(""));
    lines.push(Line::styled("Esc to close", dim));
    Text::from(lines)
}

fn render_footer(frame: &mut Frame, area: Rect, state: &AppState, status_bar: &mut StatusBar) {
    let status = state.message.clone().unwrap_or_else(|| {
        if state.list_loading {
            "Loading records...".to_string()
        } else if state.facts_loading {
            "Loading filter data...".to_string()
        } else if state.detail.is_loading() {
            "Loading detail...".to_string()
        } else if state.comparison.is_loading() {
            "Loading comparison...".to_string()
        } else {
            String::new()
        }
    });
    let (left_hints, center_hints) = status_hints(state);
    let status_span = Span::styled(status.as_str(), Style::default().fg(ACCENT_GOLD));
    let status_items = [StatusBarItem::span(status_span)];

    let style = StatusBarStyle {
        base: BaseStyle {
            border: Some(BorderStyle {
                borders: Borders::ALL,
                style: Style::default().fg(TEXT_DIM),
                focused_style: Some(Style::default().fg(ACCENT_RED)),
            }),
            padding: Padding::xy(1, 0),
            bg: Some(BG_PANEL),
            fg: Some(TEXT_MAIN),
        },
        text: Style::default().fg(TEXT_DIM),
        hint_key: Style::default().fg(ACCENT_RED).add_modifier(Modifier::BOLD),
        hint_label: Style::default().fg(TEXT_DIM),
        separator: Style::default().fg(TEXT_DIM),
    };

    let props = StatusBarProps {
        left: StatusBarSection::hints(&left_hints).with_separator("  "),
        center: StatusBarSection::hints(&center_hints).with_separator("  "),
        right: StatusBarSection::items(&status_items).with_separator("  "),
        style,
        is_focused: false,
    };
    Component::<Action>::render(status_bar, frame, area, props);
}

fn status_hints(state: &AppState) -> (Vec<StatusBarHint<'static>>, Vec<StatusBarHint<'static>>) {
    if state.location_edit.active {
        return (
            vec![
                StatusBarHint::new("Enter", "Go"),
                StatusBarHint::new("Esc", "Cancel"),
            ],
            vec![],
        );
    }
    if state.is_compare_open() {
        return (vec![StatusBarHint::new("Esc", "Close")], vec![]);
    }

    let left = if state.is_detail_open() {
        vec![
            StatusBarHint::new("Esc", "Back"),
            StatusBarHint::new("j/k", "Scroll"),
            StatusBarHint::new("c", "Compare"),
        ]
    } else {
        match state.focus {
            FocusArea::List => vec![
                StatusBarHint::new("Enter", "Open"),
                StatusBarHint::new("c", "Compare"),
                StatusBarHint::new("←/→", "Page"),
                StatusBarHint::new("g/G", "First/Last"),
            ],
            FocusArea::Filters => vec![
                StatusBarHint::new("Space", "Toggle"),
                StatusBarHint::new("s", "Sort"),
                StatusBarHint::new("1-8", "Gen"),
                StatusBarHint::new("x", "Clear"),
            ],
        }
    };
    let center = vec![
        StatusBarHint::new("Tab", "Focus"),
        StatusBarHint::new(":", "Go to"),
        StatusBarHint::new("r/R", "Region"),
        StatusBarHint::new("q", "Quit"),
    ];
    (left, center)
}

fn record_items(state: &AppState) -> Vec<Line<'static>> {
    state
        .visible_records()
        .iter()
        .map(|record| record_line(state, record))
        .collect()
}

fn record_line(state: &AppState, record: &RecordSummary) -> Line<'static> {
    let number = record
        .id()
        .map(|id| format!("#{id:03}"))
        .unwrap_or_else(|| "#---".to_string());
    let marker = if state.compare.contains(record) { "◆ " } else { "  " };
    let types = record
        .id()
        .and_then(|id| state.facts.get(&id))
        .map(|facts| facts.types.join("/"))
        .unwrap_or_default();
    Line::from(vec![
        Span::styled(marker.to_string(), Style::default().fg(ACCENT_GREEN)),
        Span::styled(format!("{number} "), Style::default().fg(TEXT_DIM)),
        Span::styled(format!("{:<16}", format_name(&record.name)), Style::default().fg(TEXT_MAIN)),
        Span::styled(types, Style::default().fg(TEXT_DIM)),
    ])
}

fn empty_list_text(state: &AppState) -> String {
    if state.list_loading {
        "Loading...".to_string()
    } else if let Some(error) = &state.list_error {
        format!("{error}\nF5 to retry")
    } else if state.paginator.mode() == PageMode::Filtered {
        if state.facts_loading {
            "Gathering filter data...".to_string()
        } else {
            "No records match these filters".to_string()
        }
    } else {
        "Nothing here".to_string()
    }
}

fn filter_items(state: &AppState) -> Vec<Line<'static>> {
    FilterRow::all()
        .into_iter()
        .map(|row| match row {
            FilterRow::Sort => Line::from(vec![
                Span::styled("Sort ", Style::default().fg(TEXT_DIM)),
                Span::styled(state.sort_key().label(), Style::default().fg(ACCENT_GOLD)),
            ]),
            FilterRow::Generation => Line::from(vec![
                Span::styled("Gen  ", Style::default().fg(TEXT_DIM)),
                Span::styled(
                    state
                        .selected_generation()
                        .map(|region| format!("{} {}", region.generation(), region.label()))
                        .unwrap_or_else(|| "Any".to_string()),
                    Style::default().fg(ACCENT_GOLD),
                ),
            ]),
            FilterRow::Type(name) => {
                let selected = state.filter.selected_types.contains(name);
                let mark = if selected { "[x] " } else { "[ ] " };
                let style = if selected {
                    Style::default().fg(ACCENT_GREEN)
                } else {
                    Style::default().fg(TEXT_MAIN)
                };
                Line::styled(format!("{mark}{}", format_name(name)), style)
            }
            FilterRow::Clear => Line::styled("Clear filters", Style::default().fg(ACCENT_RED)),
        })
        .collect()
}

fn filter_list_props<'a>(
    items: &'a [Line<'static>],
    state: &AppState,
    is_focused: bool,
) -> SelectListProps<'a, Line<'static>, Action> {
    SelectListProps {
        items,
        count: items.len(),
        selected: state.filter_cursor.min(items.len().saturating_sub(1)),
        is_focused,
        style: list_style(),
        behavior: SelectListBehavior {
            show_scrollbar: true,
            wrap_navigation: false,
        },
        on_select: Action::FilterCursorSet,
        render_item: &|item| item.clone(),
    }
}

fn record_list_props<'a>(
    items: &'a [Line<'static>],
    state: &AppState,
    is_focused: bool,
) -> SelectListProps<'a, Line<'static>, Action> {
    SelectListProps {
        items,
        count: items.len(),
        selected: state.selected_index.min(items.len().saturating_sub(1)),
        is_focused,
        style: list_style(),
        behavior: SelectListBehavior {
            show_scrollbar: true,
            wrap_navigation: false,
        },
        on_select: Action::ListSelect,
        render_item: &|item| item.clone(),
    }
}

fn list_style() -> SelectListStyle {
    SelectListStyle {
        base: BaseStyle {
            border: None,
            padding: Padding::xy(1, 0),
            bg: None,
            fg: Some(TEXT_MAIN),
        },
        selection: SelectionStyle {
            style: Some(
                Style::default()
                    .bg(BG_HIGHLIGHT)
                    .fg(TEXT_MAIN)
                    .add_modifier(Modifier::BOLD),
            ),
            marker: None,
            disabled: false,
        },
        ..SelectListStyle::default()
    }
}

fn panel_block(title: &str, is_focused: bool) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .title(format!(" {title} "))
        .style(Style::default().bg(BG_PANEL).fg(TEXT_MAIN))
        .border_style(if is_focused {
            Style::default().fg(ACCENT_RED).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(TEXT_DIM)
        })
}

fn compare_modal_area(area: Rect) -> Rect {
    centered_rect(60, 22, area)
}

fn filter_summary(state: &AppState) -> String {
    let mut parts: Vec<String> = state
        .filter
        .selected_types
        .iter()
        .map(|name| format_name(name))
        .collect();
    if let Some(region) = state.selected_generation() {
        parts.push(format!("Gen {}", region.generation()));
    }
    if state.sort_key() != crate::filter::SortKey::Id {
        parts.push(format!("by {}", state.sort_key().label()));
    }
    if parts.is_empty() {
        "-".to_string()
    } else {
        parts.join(", ")
    }
}

fn type_spans(types: &[String]) -> Vec<Span<'static>> {
    types
        .iter()
        .flat_map(|name| {
            [
                Span::styled(
                    format!(" {} ", name.to_ascii_uppercase()),
                    Style::default()
                        .fg(BG_BASE)
                        .bg(type_color(name))
                        .add_modifier(Modifier::BOLD),
                ),
                Span::raw(" "),
            ]
        })
        .collect()
}

fn type_color(name: &str) -> Color {
    match name {
        "fire" => Color::Rgb(240, 128, 48),
        "water" => Color::Rgb(104, 144, 240),
        "grass" => Color::Rgb(120, 200, 80),
        "electric" => Color::Rgb(248, 208, 48),
        "ice" => Color::Rgb(152, 216, 216),
        "fighting" => Color::Rgb(192, 48, 40),
        "poison" => Color::Rgb(160, 64, 160),
        "ground" => Color::Rgb(224, 192, 104),
        "flying" => Color::Rgb(168, 144, 240),
        "psychic" => Color::Rgb(248, 88, 136),
        "bug" => Color::Rgb(168, 184, 32),
        "rock" => Color::Rgb(184, 160, 56),
        "ghost" => Color::Rgb(112, 88, 152),
        "dragon" => Color::Rgb(112, 56, 248),
        "dark" => Color::Rgb(112, 88, 72),
        "steel" => Color::Rgb(184, 184, 208),
        "fairy" => Color::Rgb(238, 153, 172),
        _ => Color::Rgb(168, 168, 120),
    }
}

fn format_name(name: &str) -> String {
    name.split('-')
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => format!("{}{}", first.to_ascii_uppercase(), chars.as_str()),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn optional(value: Option<u16>) -> String {
    value
        .map(|value| value.to_string())
        .unwrap_or_else(|| "-".to_string())
}

fn render_stat(name: &str, value: u16) -> String {
    let bar_len = (value as usize / 10).clamp(1, 25);
    format!("{:>4} {value:>3} {}", shorten_stat(name), "█".repeat(bar_len))
}

fn shorten_stat(name: &str) -> String {
    match name {
        "hp" => "HP".to_string(),
        "attack" => "ATK".to_string(),
        "defense" => "DEF".to_string(),
        "special-attack" => "SATK".to_string(),
        "special-defense" => "SDEF".to_string(),
        "speed" => "SPD".to_string(),
        _ => name.to_ascii_uppercase(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_title_cased() {
        assert_eq!(format_name("mr-mime"), "Mr Mime");
        assert_eq!(format_name("pikachu"), "Pikachu");
    }

    #[test]
    fn stat_bar_has_a_floor() {
        assert_eq!(render_stat("hp", 5), "  HP   5 █");
        assert!(render_stat("speed", 250).ends_with(&"█".repeat(25)));
    }
}
