use std::cell::RefCell;
use std::io;
use std::rc::Rc;
use std::sync::{Arc, OnceLock};

use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tui_dispatch::{
    EffectContext, EffectStoreLike, EffectStoreWithMiddleware, EventBus, Keybindings, TaskKey,
};
use tui_dispatch_debug::debug::DebugLayer;
use tui_dispatch_debug::{
    DebugCliArgs, DebugRunOutput, DebugSession, DebugSessionError, ReplayItem,
};

use dexview::action::Action;
use dexview::api::{PokeApiClient, RecordSource};
use dexview::config::{AppArgs, Config};
use dexview::effect::{self, Effect};
use dexview::logging;
use dexview::reducer::reducer;
use dexview::state::AppState;
use dexview::ui::{self, DexComponentId, DexContext, DexUi};

#[derive(Parser, Debug)]
#[command(name = "dexview")]
#[command(about = "Browse, filter and compare catalog records in the terminal")]
struct Args {
    #[command(flatten)]
    app: AppArgs,

    #[command(flatten)]
    debug: DebugCliArgs,
}

static SOURCE: OnceLock<Arc<dyn RecordSource>> = OnceLock::new();

#[tokio::main]
async fn main() -> io::Result<()> {
    let args = Args::parse();
    let config = Config::from_args(&args.app).map_err(io::Error::other)?;
    logging::init_logging(&config.log)?;
    tracing::info!(
        location = %config.location,
        api_base = %config.api_base,
        cache = ?config.cache_dir,
        "starting dexview"
    );

    let client = PokeApiClient::new(config.api_base.clone(), config.cache_dir.clone());
    let _ = SOURCE.set(Arc::new(client));

    let debug = DebugSession::new(args.debug);
    let start = config.location.clone();
    let state = debug
        .load_state_or_else_async(|| async move { Ok::<AppState, io::Error>(AppState::at(start)) })
        .await
        .map_err(debug_error)?;
    let replay_actions = debug.load_replay_items().map_err(debug_error)?;
    let (middleware, recorder) = debug.middleware_with_recorder();
    let store = EffectStoreWithMiddleware::new(state, reducer, middleware);

    let use_alt_screen = debug.use_alt_screen();
    let mut stdout = io::stdout();
    if use_alt_screen {
        enable_raw_mode()?;
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    }
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &debug, store, replay_actions).await;

    if use_alt_screen {
        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        terminal.show_cursor()?;
    }

    let run_output = result?;
    run_output.write_render_output()?;
    debug.save_actions(recorder.as_ref()).map_err(debug_error)?;
    tracing::info!("dexview exited");
    Ok(())
}

fn debug_error(error: DebugSessionError) -> io::Error {
    io::Error::other(format!("debug session error: {error}"))
}

async fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    debug: &DebugSession,
    store: impl EffectStoreLike<AppState, Action, Effect>,
    replay_actions: Vec<ReplayItem<Action>>,
) -> io::Result<DebugRunOutput<AppState>> {
    let ui = Rc::new(RefCell::new(DexUi::new()));
    let mut bus: EventBus<AppState, Action, DexComponentId, DexContext> = EventBus::new();
    let keybindings: Keybindings<DexContext> = Keybindings::new();

    let ui_list = Rc::clone(&ui);
    bus.register(DexComponentId::List, move |event, state| {
        ui_list.borrow_mut().handle_list_event(&event.kind, state)
    });

    let ui_filters = Rc::clone(&ui);
    bus.register(DexComponentId::Filters, move |event, state| {
        ui_filters
            .borrow_mut()
            .handle_filter_event(&event.kind, state)
    });

    bus.register(DexComponentId::Detail, |event, state| {
        ui::handle_detail_event(&event.kind, state)
    });
    bus.register(DexComponentId::Compare, |event, state| {
        ui::handle_compare_event(&event.kind, state)
    });
    bus.register(DexComponentId::Location, |event, state| {
        ui::handle_location_event(&event.kind, state)
    });

    bus.register_global(|event, state| ui::handle_global_event(&event.kind, state));

    debug
        .run_effect_app_with_bus(
            terminal,
            store,
            DebugLayer::simple(),
            replay_actions,
            Some(Action::Init),
            Some(Action::Quit),
            |_runtime| {},
            &mut bus,
            &keybindings,
            |frame, area, state, render_ctx, event_ctx| {
                ui.borrow_mut()
                    .render(frame, area, state, render_ctx, event_ctx);
            },
            |action| matches!(action, Action::Quit),
            handle_effect,
        )
        .await
}

fn handle_effect(effect: Effect, ctx: &mut EffectContext<Action>) {
    let key = TaskKey::new(effect.channel().task_key());
    let Some(source) = SOURCE.get().cloned() else {
        tracing::error!(?effect, "record source missing, dropping effect");
        return;
    };
    match effect {
        Effect::LoadPage { token, request } => {
            tracing::debug!(?request, "loading page");
            ctx.tasks()
                .spawn(key, effect::load_page(source, token, request));
        }
        Effect::LoadRange { token, range } => {
            tracing::debug!(start = range.start, end = range.end, "loading range");
            ctx.tasks()
                .spawn(key, effect::load_range(source, token, range));
        }
        Effect::LoadFacts { token, records } => {
            tracing::debug!(count = records.len(), "loading facts");
            ctx.tasks()
                .spawn(key, effect::load_facts(source, token, records));
        }
        Effect::LoadDetail { token, key: record } => {
            tracing::debug!(%record, "loading detail");
            ctx.tasks()
                .spawn(key, effect::load_detail(source, token, record));
        }
        Effect::LoadComparison { token, left, right } => {
            tracing::debug!(left = %left.name, right = %right.name, "loading comparison");
            ctx.tasks()
                .spawn(key, effect::load_comparison(source, token, left, right));
        }
        Effect::Cancel { channel } => {
            tracing::debug!(?channel, "cancelling");
            ctx.tasks().cancel(&key);
        }
    }
}
