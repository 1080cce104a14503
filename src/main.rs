//! A foldable TUI browser for a pkg(8)-style package repository.
//!
//! Categories fold and unfold, installs and removals queue up as markers,
//! and one key commits the whole batch through the package manager.

mod app;
mod core;
mod ui;

use std::io;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    text::{Line, Span},
    widgets::Paragraph,
    Terminal,
};

use crate::app::{
    event::{spawn_event_reader, AppEvent},
    handler,
    state::{ActiveView, AppState, StatusLevel},
};
use crate::core::backend::{BackendError, PkgCli};
use crate::core::inventory::Inventory;
use crate::ui::{
    detail_panel::DetailPanelWidget,
    glyphs::GlyphSet,
    list_panel::ListPanelWidget,
    popup::{SearchPrompt, WarningPopup},
    spinner::CommitSpinner,
    theme::Theme,
};

const KEY_HINT: &str = "TAB mode  ENTER select  BKSP deselect  ^X commit  ESC quit";

// ───────────────────────────────────────── CLI ───────────────

#[derive(Parser, Debug)]
#[command(name = env!("CARGO_PKG_NAME"), about = "Foldable package repository browser")]
struct Cli {
    /// Use plain ASCII markers instead of Unicode glyphs.
    #[arg(long)]
    ascii: bool,
}

// ───────────────────────────────────────── main ─────────────

#[tokio::main]
async fn main() -> Result<()> {
    // Initialise tracing (only in debug builds / when RUST_LOG is set).
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr) // never pollute stdout
        .init();

    let cli = Cli::parse();
    let glyphs = if cli.ascii {
        GlyphSet::ascii()
    } else {
        GlyphSet::unicode()
    };

    // ── load the inventory before touching the terminal ───────
    let mut inventory = Inventory::new(Arc::new(PkgCli::new()));
    inventory
        .reload()
        .context("could not query the package repository")?;

    // ── terminal setup ────────────────────────────────────────
    enable_raw_mode()?;
    execute!(io::stdout(), EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)?;

    let size = terminal.size()?;
    let mut state = AppState::new(inventory, glyphs, size.width, size.height)
        .context("terminal too small")?;

    // ── async channels ────────────────────────────────────────
    let mut events = spawn_event_reader(Duration::from_millis(150));
    let (commit_tx, mut commit_rx) =
        tokio::sync::mpsc::unbounded_channel::<Result<(), BackendError>>();

    // ── event loop ────────────────────────────────────────────
    loop {
        terminal.draw(|frame| draw(frame, &state))?;

        // Spawn a requested commit after the frame that shows the spinner.
        if state.commit_requested {
            state.commit_requested = false;
            state.committing = true;
            state.spinner_tick = 0;

            let backend = state.inventory.backend();
            let (installs, removals) = state.inventory.pending();
            let tx = commit_tx.clone();
            tokio::spawn(async move {
                let result = match tokio::task::spawn_blocking(move || {
                    handler::run_commit(backend, installs, removals)
                })
                .await
                {
                    Ok(result) => result,
                    Err(err) => Err(BackendError::Spawn {
                        command: "commit task".to_string(),
                        source: io::Error::other(err),
                    }),
                };
                // Receiver only drops on shutdown.
                let _ = tx.send(result);
            });
        }

        tokio::select! {
            biased;

            Some(event) = events.recv() => {
                match event {
                    AppEvent::Input(command) => handler::handle_command(&mut state, command),
                    AppEvent::Resize(w, h) => handler::handle_resize(&mut state, w, h),
                    AppEvent::Tick => handler::handle_tick(&mut state),
                }
            }

            Some(result) = commit_rx.recv() => {
                handler::finish_commit(&mut state, result);
            }
        }

        if state.should_quit {
            break;
        }
    }

    // ── teardown ──────────────────────────────────────────────
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    Ok(())
}

fn draw(frame: &mut ratatui::Frame, state: &AppState) {
    let list_area: ratatui::layout::Rect = state.layout.list_area.into();
    let detail_area: ratatui::layout::Rect = state.layout.detail_area.into();
    let status_area: ratatui::layout::Rect = state.layout.status_area.into();

    frame.render_widget(ListPanelWidget::new(&state.list, &state.glyphs), list_area);
    frame.render_widget(
        DetailPanelWidget::new(&state.detail, &state.glyphs),
        detail_area,
    );

    // Status bar: mode tag, then either the commit spinner, a transient
    // message, or the key hint.
    let mode_tag = Span::styled(format!(" {} ", state.mode.label()), Theme::mode_style());
    if state.committing {
        frame.render_widget(
            CommitSpinner::new(state.spinner_tick, state.glyphs.ascii),
            status_area,
        );
    } else {
        let text = match (&state.status, &state.search_term) {
            (Some(message), _) => message.text.clone(),
            (None, Some(term)) => format!("search: {term}"),
            (None, None) => KEY_HINT.to_string(),
        };
        let line = Line::from(vec![mode_tag, Span::raw(" "), Span::raw(text)]);
        frame.render_widget(
            Paragraph::new(line).style(Theme::status_bar_style()),
            status_area,
        );
    }

    if state.active_view == ActiveView::SearchPrompt {
        frame.render_widget(SearchPrompt::new(&state.search_input), frame.area());
    }

    if let Some(message) = &state.status {
        if message.level == StatusLevel::Warning {
            frame.render_widget(WarningPopup::new(&message.text), frame.area());
        }
    }
}
