//! Command dispatch — turns classified input into state transitions.
//!
//! Inventory lookups that fail (a stale row pointing at a vanished origin)
//! are logged and abort only the current operation; the process stays alive.

use std::sync::Arc;
use std::time::Instant;

use crate::core::backend::{BackendError, PkgBackend};
use crate::core::inventory::{InventoryError, Status};
use crate::ui::layout::AppLayout;
use crate::ui::list_panel::RowItem;

use super::event::Command;
use super::state::{ActiveView, AppState, Mode};

/// Apply one command to the state. While a commit is running only quit and
/// redraw get through; everything else is dropped, not queued.
pub fn handle_command(state: &mut AppState, command: Command) {
    if state.committing && !matches!(command, Command::Quit | Command::Redraw) {
        return;
    }
    match state.active_view {
        ActiveView::Main => handle_main(state, command),
        ActiveView::SearchPrompt => handle_prompt(state, command),
    }
}

fn handle_main(state: &mut AppState, command: Command) {
    match command {
        Command::Quit => state.should_quit = true,

        Command::NavUp | Command::NavDown => {
            if state.inventory.is_empty() {
                return;
            }
            if command == Command::NavUp {
                state.list.viewport_mut().move_cursor_up();
            } else {
                state.list.viewport_mut().move_cursor_down();
            }
            state.rebuild_detail();
        }

        Command::PageUp => state.detail.page_up(),
        Command::PageDown => state.detail.page_down(),

        Command::Select => {
            if state.inventory.is_empty() {
                return;
            }
            match state.list.selected().cloned() {
                Some(RowItem::Category { name }) => {
                    state.folds.toggle(&name);
                    state.rebuild_list();
                }
                Some(RowItem::Leaf { origin }) => {
                    let result = state.inventory.register_install(&origin);
                    report_inventory_result(state, result);
                    state.rebuild_list();
                }
                None => {}
            }
        }

        Command::Deselect => {
            if state.inventory.is_empty() {
                return;
            }
            match state.list.selected().cloned() {
                Some(RowItem::Category { name }) => {
                    state.folds.toggle(&name);
                    state.rebuild_list();
                }
                Some(RowItem::Leaf { origin }) => {
                    let result = state.inventory.register_removal(&origin);
                    report_inventory_result(state, result);
                    state.rebuild_list();
                }
                None => {}
            }
        }

        Command::NextMode => next_mode(state),
        Command::Character(c) => handle_character(state, c),
        Command::Commit => request_commit(state),

        // The main loop redraws after every event; nothing to mutate.
        Command::Redraw => {}
    }
}

/// Cycle Browse→Search→Filter→Browse. Arriving back in browse drops the
/// active filter and search so the full inventory is visible again.
fn next_mode(state: &mut AppState) {
    state.mode = state.mode.next();
    if state.mode == Mode::Browse {
        state.filter_mask = Status::empty();
        state.search_term = None;
        state.inventory.reset_filter();
        state.rebuild_list();
    }
}

fn handle_character(state: &mut AppState, c: char) {
    match state.mode {
        Mode::Browse => {}
        Mode::Search => {
            // The first character both opens the prompt and seeds it.
            state.list.viewport_mut().reset_cursor();
            state.search_input.clear();
            state.search_input.push(c);
            state.active_view = ActiveView::SearchPrompt;
        }
        Mode::Filter => {
            state.list.viewport_mut().reset_cursor();
            toggle_filter_bit(state, c);
        }
    }
}

/// Filter-mode bindings: each character toggles one status bit of the mask;
/// `n` drops the whole filter.
fn toggle_filter_bit(state: &mut AppState, c: char) {
    let bit = match c {
        'n' => {
            state.filter_mask = Status::empty();
            state.inventory.reset_filter();
            state.set_status("filter: none");
            state.rebuild_list();
            return;
        }
        'i' | '+' => Status::INSTALLED,
        'a' | '-' => Status::AVAILABLE,
        'p' => Status::PENDING,
        'u' => Status::UPGRADABLE,
        _ => return,
    };
    state.filter_mask.toggle(bit);
    state.inventory.apply_filter(state.filter_mask);
    state.set_status(format!("filter: {:?}", state.filter_mask));
    state.rebuild_list();
}

/// Keys while the search prompt is open.
fn handle_prompt(state: &mut AppState, command: Command) {
    match command {
        Command::Character(c) => state.search_input.push(c),
        Command::Deselect => {
            state.search_input.pop();
        }
        Command::Select => {
            let term = std::mem::take(&mut state.search_input);
            state.active_view = ActiveView::Main;
            match state.inventory.search(&term) {
                Ok(()) => {
                    state.set_status(format!("search: {term}"));
                    state.search_term = Some(term);
                }
                Err(err) => {
                    tracing::error!(%err, "search failed");
                    state.set_warning(err.to_string());
                }
            }
            state.rebuild_list();
        }
        Command::Quit => {
            state.search_input.clear();
            state.active_view = ActiveView::Main;
        }
        _ => {}
    }
}

// ── commit ─────────────────────────────────────────────────────

/// Gate a commit request: refused without privileges (transient warning, no
/// side effects), skipped when nothing is queued, otherwise flagged for the
/// main loop to spawn.
fn request_commit(state: &mut AppState) {
    if !state.inventory.has_privileges() {
        tracing::warn!("commit refused, not running as root");
        state.set_warning("Insufficient privileges, please retry as root");
        return;
    }
    if !state.inventory.has_pending() {
        state.set_status("nothing to commit");
        return;
    }
    state.commit_requested = true;
}

/// The blocking half of a commit, run off the event loop.
pub fn run_commit(
    backend: Arc<dyn PkgBackend>,
    installs: Vec<String>,
    removals: Vec<String>,
) -> Result<(), BackendError> {
    tracing::info!(
        installs = installs.len(),
        removals = removals.len(),
        "committing pending changes"
    );
    // Removals go first so a queued removal cannot conflict with an install
    // that replaces it.
    backend.remove(&removals)?;
    backend.install(&installs)?;
    Ok(())
}

/// Completion of a commit: reload the inventory, close all folds, and put
/// the cursor back at the top.
pub fn finish_commit(state: &mut AppState, result: Result<(), BackendError>) {
    state.committing = false;
    let outcome = result
        .map_err(|err| err.to_string())
        .and_then(|()| {
            // Committed markers must not survive even if the reload fails.
            state.inventory.reset_pending();
            state.inventory.reload().map_err(|err| err.to_string())
        });
    match outcome {
        Ok(()) => {
            state.folds.clear();
            state.list.viewport_mut().reset_cursor();
            state.set_status("changes committed");
        }
        Err(err) => {
            tracing::error!(%err, "commit failed");
            state.set_warning(err.to_string());
        }
    }
    state.rebuild_list();
}

// ── housekeeping ───────────────────────────────────────────────

pub fn handle_resize(state: &mut AppState, width: u16, height: u16) {
    // A degenerate size keeps the previous layout; the next real resize
    // recovers.
    let Ok(layout) = AppLayout::from_screen(width, height) else {
        return;
    };
    state.layout = layout;
    state.list.set_height(layout.list_inner_height());
    state.detail.set_height(layout.detail_inner_height());
}

pub fn handle_tick(state: &mut AppState) {
    if state.committing {
        state.spinner_tick = state.spinner_tick.wrapping_add(1);
    }
    state.expire_status(Instant::now());
}

fn report_inventory_result(state: &mut AppState, result: Result<(), InventoryError>) {
    if let Err(err) = result {
        tracing::error!(%err, "inventory operation failed");
        state.set_warning(err.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::state::tests::test_state;
    use crate::app::state::StatusLevel;

    fn selected_origin(state: &AppState) -> Option<String> {
        match state.list.selected() {
            Some(RowItem::Leaf { origin }) => Some(origin.clone()),
            _ => None,
        }
    }

    #[test]
    fn select_on_category_unfolds_it() {
        let mut state = test_state();
        assert_eq!(state.list.len(), 2);

        handle_command(&mut state, Command::Select);
        // editors has 3 members; shells stays folded.
        assert_eq!(state.list.len(), 5);

        handle_command(&mut state, Command::Select);
        assert_eq!(state.list.len(), 2);
    }

    #[test]
    fn select_on_leaf_queues_install_and_deselect_cancels() {
        let mut state = test_state();
        handle_command(&mut state, Command::Select); // unfold editors
        handle_command(&mut state, Command::NavDown); // editors/emacs
        assert_eq!(selected_origin(&state).as_deref(), Some("editors/emacs"));

        handle_command(&mut state, Command::Select);
        assert!(state
            .inventory
            .get("editors/emacs")
            .unwrap()
            .status
            .contains(Status::PENDING_INSTALL));

        handle_command(&mut state, Command::Deselect);
        assert!(!state.inventory.get("editors/emacs").unwrap().has_pending());
    }

    #[test]
    fn navigation_refreshes_the_detail_pane() {
        let mut state = test_state();
        assert!(state.detail.viewport().is_empty()); // category selected

        handle_command(&mut state, Command::Select);
        handle_command(&mut state, Command::NavDown);
        assert_eq!(
            state.detail.viewport().cell(0, 0),
            Some("editors/emacs comment")
        );
    }

    #[test]
    fn returning_to_browse_resets_filter_and_search() {
        let mut state = test_state();
        handle_command(&mut state, Command::NextMode); // Search
        handle_command(&mut state, Command::NextMode); // Filter
        handle_command(&mut state, Command::Character('i'));
        assert_eq!(state.filter_mask, Status::INSTALLED);
        assert_eq!(state.inventory.members_of("editors").len(), 1);

        handle_command(&mut state, Command::NextMode); // Browse
        assert_eq!(state.filter_mask, Status::empty());
        assert_eq!(state.inventory.members_of("editors").len(), 3);
    }

    #[test]
    fn filter_characters_toggle_mask_bits() {
        let mut state = test_state();
        state.mode = Mode::Filter;

        handle_command(&mut state, Command::Character('i'));
        handle_command(&mut state, Command::Character('u'));
        assert_eq!(state.filter_mask, Status::INSTALLED | Status::UPGRADABLE);

        handle_command(&mut state, Command::Character('i'));
        assert_eq!(state.filter_mask, Status::UPGRADABLE);

        handle_command(&mut state, Command::Character('n'));
        assert_eq!(state.filter_mask, Status::empty());
    }

    #[test]
    fn search_prompt_collects_edits_and_applies_on_enter() {
        let mut state = test_state();
        state.mode = Mode::Search;

        handle_command(&mut state, Command::Character('v'));
        assert_eq!(state.active_view, ActiveView::SearchPrompt);
        handle_command(&mut state, Command::Character('i'));
        handle_command(&mut state, Command::Character('x'));
        handle_command(&mut state, Command::Deselect); // backspace
        handle_command(&mut state, Command::Character('m'));
        assert_eq!(state.search_input, "vim");

        handle_command(&mut state, Command::Select);
        assert_eq!(state.active_view, ActiveView::Main);
        assert_eq!(state.search_term.as_deref(), Some("vim"));
        assert_eq!(state.inventory.members_of("editors").len(), 1);
        assert!(state.inventory.members_of("shells").is_empty());
    }

    #[test]
    fn cancelled_prompt_leaves_the_view_untouched() {
        let mut state = test_state();
        state.mode = Mode::Search;
        handle_command(&mut state, Command::Character('v'));
        handle_command(&mut state, Command::Quit);
        assert_eq!(state.active_view, ActiveView::Main);
        assert!(state.search_input.is_empty());
        assert!(!state.should_quit);
        assert_eq!(state.inventory.members_of("editors").len(), 3);
    }

    #[test]
    fn commit_without_privileges_warns_and_queues_nothing() {
        use crate::core::backend::testing::{raw, MemoryBackend};
        use crate::core::inventory::Inventory;
        use crate::ui::glyphs::GlyphSet;

        let mut backend = MemoryBackend::new(vec![raw("editors/emacs", "29.4")], vec![]);
        backend.privileged = false;
        let mut inventory = Inventory::new(std::sync::Arc::new(backend));
        inventory.reload().unwrap();
        let mut state = AppState::new(inventory, GlyphSet::ascii(), 80, 24).unwrap();
        state.inventory.register_install("editors/emacs").unwrap();

        handle_command(&mut state, Command::Commit);
        assert!(!state.commit_requested);
        let status = state.status.as_ref().unwrap();
        assert_eq!(status.level, StatusLevel::Warning);
        assert!(status.text.contains("privileges"));
        // No side effects: the pending marker is untouched.
        assert!(state.inventory.has_pending());
    }

    #[test]
    fn commit_with_nothing_pending_is_a_status_note() {
        let mut state = test_state();
        handle_command(&mut state, Command::Commit);
        assert!(!state.commit_requested);
        assert_eq!(state.status.as_ref().unwrap().level, StatusLevel::Info);
    }

    #[test]
    fn commit_round_trip_clears_folds_and_pending() {
        let mut state = test_state();
        handle_command(&mut state, Command::Select); // unfold editors
        handle_command(&mut state, Command::NavDown);
        handle_command(&mut state, Command::Select); // queue emacs install
        state.inventory.register_removal("shells/zsh").unwrap();
        handle_command(&mut state, Command::Commit);
        assert!(state.commit_requested);

        // What the main loop does with the request.
        state.commit_requested = false;
        state.committing = true;
        let (installs, removals) = state.inventory.pending();
        let result = run_commit(state.inventory.backend(), installs, removals);
        finish_commit(&mut state, result);

        assert!(!state.committing);
        assert!(state.folds.is_empty());
        assert_eq!(state.list.viewport().cursor_row(), 0);
        assert_eq!(state.list.len(), 2); // everything folded again
        assert!(!state.inventory.has_pending());
    }

    #[test]
    fn commit_runs_removals_before_installs() {
        use crate::core::backend::testing::{raw, MemoryBackend};
        use crate::core::inventory::Inventory;

        let backend = Arc::new(MemoryBackend::new(
            vec![raw("editors/emacs", "29.4"), raw("shells/zsh", "5.9")],
            vec![raw("shells/zsh", "5.9")],
        ));
        let mut inventory = Inventory::new(Arc::clone(&backend) as Arc<dyn PkgBackend>);
        inventory.reload().unwrap();
        inventory.register_install("editors/emacs").unwrap();
        inventory.register_removal("shells/zsh").unwrap();

        let (installs, removals) = inventory.pending();
        run_commit(inventory.backend(), installs, removals).unwrap();

        let log = backend.committed.lock().unwrap();
        assert_eq!(*log, vec!["remove shells/zsh", "install editors/emacs"]);
    }

    #[test]
    fn only_quit_and_redraw_get_through_while_committing() {
        let mut state = test_state();
        state.committing = true;
        handle_command(&mut state, Command::Select);
        assert_eq!(state.list.len(), 2); // fold toggle dropped
        handle_command(&mut state, Command::Commit);
        assert!(!state.commit_requested);
        handle_command(&mut state, Command::Redraw);
        handle_command(&mut state, Command::Quit);
        assert!(state.should_quit);
    }

    #[test]
    fn spinner_only_advances_during_a_commit() {
        let mut state = test_state();
        handle_tick(&mut state);
        assert_eq!(state.spinner_tick, 0);
        state.committing = true;
        handle_tick(&mut state);
        handle_tick(&mut state);
        assert_eq!(state.spinner_tick, 2);
    }

    #[test]
    fn resize_updates_panel_heights() {
        let mut state = test_state();
        handle_resize(&mut state, 100, 40);
        assert_eq!(state.layout.list_area.width(), 100);
        assert_eq!(
            state.list.viewport().visible_height(),
            state.layout.list_inner_height()
        );
    }
}
