//! Application state: the inventory, the two panels, and the navigation
//! state machine (mode, fold set, pending commit). All of it lives in one
//! owned struct threaded through the handler — nothing global.

use std::time::{Duration, Instant};

use crate::core::geometry::GeometryError;
use crate::core::inventory::{Inventory, PkgRecord, Status};
use crate::ui::detail_panel::DetailPanel;
use crate::ui::glyphs::GlyphSet;
use crate::ui::layout::AppLayout;
use crate::ui::list_panel::{FoldSet, ListPanel, RowItem};

/// Transient status messages disappear after this long.
pub const STATUS_TTL: Duration = Duration::from_millis(1500);

/// Interaction modes, cycled in a fixed order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Browse,
    Search,
    Filter,
}

impl Mode {
    pub fn next(self) -> Self {
        match self {
            Mode::Browse => Mode::Search,
            Mode::Search => Mode::Filter,
            Mode::Filter => Mode::Browse,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Mode::Browse => "BROWSE",
            Mode::Search => "SEARCH",
            Mode::Filter => "FILTER",
        }
    }
}

/// Which surface currently receives key input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActiveView {
    Main,
    SearchPrompt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Warning,
}

#[derive(Debug, Clone)]
pub struct StatusMessage {
    pub text: String,
    pub level: StatusLevel,
    since: Instant,
}

impl StatusMessage {
    pub fn expired(&self, now: Instant) -> bool {
        now.duration_since(self.since) >= STATUS_TTL
    }
}

pub struct AppState {
    pub inventory: Inventory,
    pub list: ListPanel,
    pub detail: DetailPanel,
    pub folds: FoldSet,
    pub mode: Mode,
    pub active_view: ActiveView,
    /// Status-flag mask accumulated in filter mode; empty means unfiltered.
    pub filter_mask: Status,
    /// Text being edited in the search prompt.
    pub search_input: String,
    /// The term of the search currently narrowing the view.
    pub search_term: Option<String>,
    pub glyphs: GlyphSet,
    pub layout: AppLayout,
    pub status: Option<StatusMessage>,
    /// A commit was requested and should be spawned by the main loop.
    pub commit_requested: bool,
    /// A commit is running; input other than quit is ignored.
    pub committing: bool,
    pub spinner_tick: u64,
    pub should_quit: bool,
}

impl AppState {
    pub fn new(
        inventory: Inventory,
        glyphs: GlyphSet,
        width: u16,
        height: u16,
    ) -> Result<Self, GeometryError> {
        let layout = AppLayout::from_screen(width, height)?;
        let mut state = Self {
            inventory,
            list: ListPanel::new(),
            detail: DetailPanel::new(),
            folds: FoldSet::default(),
            mode: Mode::Browse,
            active_view: ActiveView::Main,
            filter_mask: Status::empty(),
            search_input: String::new(),
            search_term: None,
            glyphs,
            layout,
            status: None,
            commit_requested: false,
            committing: false,
            spinner_tick: 0,
            should_quit: false,
        };
        state.list.set_height(layout.list_inner_height());
        state.detail.set_height(layout.detail_inner_height());
        state.rebuild_list();
        Ok(state)
    }

    // ── projections ────────────────────────────────────────────

    /// Re-project the inventory into the list, then refresh the detail pane
    /// for whatever the (clamped) cursor now points at.
    pub fn rebuild_list(&mut self) {
        self.list.rebuild(&self.inventory, &self.folds, &self.glyphs);
        self.rebuild_detail();
    }

    pub fn rebuild_detail(&mut self) {
        let record = self.selected_record();
        // The borrow of `self.inventory` ends before the panel mutation.
        let record = record.cloned();
        self.detail.rebuild(record.as_ref());
    }

    /// The package under the cursor, if a leaf row is selected.
    pub fn selected_record(&self) -> Option<&PkgRecord> {
        match self.list.selected()? {
            RowItem::Leaf { origin } => self.inventory.get(origin).ok(),
            RowItem::Category { .. } => None,
        }
    }

    // ── status line ────────────────────────────────────────────

    pub fn set_status(&mut self, text: impl Into<String>) {
        self.push_status(text.into(), StatusLevel::Info);
    }

    pub fn set_warning(&mut self, text: impl Into<String>) {
        self.push_status(text.into(), StatusLevel::Warning);
    }

    fn push_status(&mut self, text: String, level: StatusLevel) {
        self.status = Some(StatusMessage {
            text,
            level,
            since: Instant::now(),
        });
    }

    pub fn expire_status(&mut self, now: Instant) {
        if self.status.as_ref().is_some_and(|s| s.expired(now)) {
            self.status = None;
        }
    }
}
