//! The package list panel — a foldable category/leaf projection.
//!
//! `rebuild` flattens the inventory (narrowed by any active filter or
//! search) into viewport rows and records, for each row, which logical item
//! produced it plus its visual attributes. The row→item mapping is only
//! valid immediately after a rebuild; every structural change (fold toggle,
//! filter, reload) rebuilds from scratch — rows are never patched in place.

use std::collections::HashMap;

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Widget},
};

use crate::core::inventory::{Inventory, PkgRecord};
use crate::core::viewport::Viewport;

use super::glyphs::GlyphSet;
use super::theme::Theme;

// ───────────────────────────────────────── fold state ────────

/// Per-category fold flags. Absent means folded — categories start closed.
#[derive(Debug, Default, Clone)]
pub struct FoldSet {
    unfolded: HashMap<String, bool>,
}

impl FoldSet {
    pub fn is_unfolded(&self, category: &str) -> bool {
        self.unfolded.get(category).copied().unwrap_or(false)
    }

    /// Idempotent flip: toggling twice restores the prior state.
    pub fn toggle(&mut self, category: &str) {
        let entry = self.unfolded.entry(category.to_string()).or_insert(false);
        *entry = !*entry;
    }

    /// "Close all folds" — drops every entry.
    pub fn clear(&mut self) {
        self.unfolded.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.unfolded.is_empty()
    }
}

// ───────────────────────────────────────── row model ─────────

/// The logical item behind one visible row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowItem {
    Category { name: String },
    Leaf { origin: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingKind {
    Install,
    Removal,
}

/// Visual attributes attached to a row at rebuild time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RowAttr {
    pub pending: Option<PendingKind>,
    pub upgradable: bool,
}

// ───────────────────────────────────────── panel ─────────────

/// Tabular columns of the list grid.
const COL_MARKER: usize = 0;
const COL_NAME: usize = 1;
/// Category size for category rows, local version for leaves.
const COL_DETAIL: usize = 2;
const COL_REMOTE: usize = 3;
const LIST_COLUMNS: usize = 4;

/// The foldable package list and its viewport.
pub struct ListPanel {
    viewport: Viewport,
    rows: Vec<RowItem>,
    attrs: Vec<RowAttr>,
}

impl ListPanel {
    pub fn new() -> Self {
        Self {
            viewport: Viewport::new(0, LIST_COLUMNS),
            rows: Vec::new(),
            attrs: Vec::new(),
        }
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn viewport_mut(&mut self) -> &mut Viewport {
        &mut self.viewport
    }

    /// Adopt a new content height (from the layout's inner list area).
    pub fn set_height(&mut self, height: usize) {
        self.viewport.set_visible_height(height);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn item_at(&self, row: usize) -> Option<&RowItem> {
        self.rows.get(row)
    }

    pub fn attr_at(&self, row: usize) -> RowAttr {
        self.attrs.get(row).copied().unwrap_or_default()
    }

    /// The item under the cursor.
    pub fn selected(&self) -> Option<&RowItem> {
        self.rows.get(self.viewport.cursor_row())
    }

    /// Flatten the inventory into viewport rows. Categories are always
    /// emitted (a filtered-out membership leaves the header in place, still
    /// showing its unfiltered size); leaves appear only under an unfolded
    /// category. Cursor and scroll are clamped afterwards, not reset.
    pub fn rebuild(&mut self, inventory: &Inventory, folds: &FoldSet, glyphs: &GlyphSet) {
        self.viewport.clear();
        self.rows.clear();
        self.attrs.clear();

        for category in inventory.categories() {
            let unfolded = folds.is_unfolded(category);
            let marker = format!("---{}", if unfolded { glyphs.unfolded } else { glyphs.folded });
            let count = format!("({})", inventory.category_size(category));
            self.viewport.print(&[&marker, category, &count, ""]);
            self.rows.push(RowItem::Category {
                name: category.to_string(),
            });
            self.attrs.push(RowAttr::default());

            if !unfolded {
                continue;
            }
            for &idx in inventory.members_of(category) {
                let record = inventory.record(idx);
                let marker = leaf_marker(record, glyphs);
                let local = record.local_version.as_deref().unwrap_or("");
                self.viewport
                    .print(&[&marker, &record.name, local, &record.remote_version]);
                self.rows.push(RowItem::Leaf {
                    origin: record.origin.clone(),
                });
                self.attrs.push(RowAttr {
                    pending: pending_kind(record),
                    upgradable: record.is_upgradable(),
                });
            }
        }

        self.viewport.clamp();
    }
}

impl Default for ListPanel {
    fn default() -> Self {
        Self::new()
    }
}

/// Status marker for a leaf row: installed flag plus any queued action,
/// e.g. `+[^]` for an installed package with a queued upgrade.
fn leaf_marker(record: &PkgRecord, glyphs: &GlyphSet) -> String {
    let mut marker = String::from(if record.is_installed() { "+" } else { "-" });
    if let Some(kind) = pending_kind(record) {
        marker.push_str(match kind {
            PendingKind::Install => "[+]",
            PendingKind::Removal => "[-]",
        });
    } else if record.is_upgradable() {
        marker.push('[');
        marker.push_str(glyphs.upgrade);
        marker.push(']');
    }
    marker
}

fn pending_kind(record: &PkgRecord) -> Option<PendingKind> {
    use crate::core::inventory::Status;
    if record.status.contains(Status::PENDING_INSTALL) {
        Some(PendingKind::Install)
    } else if record.status.contains(Status::PENDING_REMOVAL) {
        Some(PendingKind::Removal)
    } else {
        None
    }
}

// ───────────────────────────────────────── widget ────────────

/// Per-frame widget drawing the visible slice of a [`ListPanel`].
pub struct ListPanelWidget<'a> {
    panel: &'a ListPanel,
    glyphs: &'a GlyphSet,
    title: String,
}

impl<'a> ListPanelWidget<'a> {
    pub fn new(panel: &'a ListPanel, glyphs: &'a GlyphSet) -> Self {
        Self {
            panel,
            glyphs,
            title: " Packages ".to_string(),
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }
}

impl Widget for ListPanelWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title(self.title)
            .title_style(Theme::title_style())
            .borders(Borders::ALL)
            .border_style(Theme::border_style());
        let inner = block.inner(area);
        block.render(area, buf);
        if inner.height == 0 || inner.width < 4 {
            return;
        }

        let viewport = self.panel.viewport();
        let cursor = viewport.cursor_row();

        for (i, row) in viewport.visible_range().enumerate() {
            let y = inner.y + i as u16;
            let attr = self.panel.attr_at(row);
            let selected = row == cursor;

            let line = match self.panel.item_at(row) {
                Some(RowItem::Category { .. }) => category_line(viewport_cells(viewport, row)),
                Some(RowItem::Leaf { .. }) => leaf_line(viewport_cells(viewport, row), attr, inner.width),
                None => continue,
            };
            buf.set_line(inner.x, y, &line, inner.width);
            if selected {
                let row_area = Rect::new(inner.x, y, inner.width, 1);
                buf.set_style(row_area, Theme::selected_style());
            }
        }

        // Scrollbar indicators on the right border.
        let arrow_x = area.x + area.width.saturating_sub(1);
        if viewport.can_scroll_up() {
            buf.set_string(arrow_x, inner.y, self.glyphs.arrow_up, Theme::scroll_arrow_style());
        }
        if viewport.can_scroll_down() {
            let bottom = inner.y + inner.height.saturating_sub(1);
            buf.set_string(arrow_x, bottom, self.glyphs.arrow_down, Theme::scroll_arrow_style());
        }
    }
}

fn viewport_cells(viewport: &Viewport, row: usize) -> [&str; LIST_COLUMNS] {
    [
        viewport.cell(row, COL_MARKER).unwrap_or(""),
        viewport.cell(row, COL_NAME).unwrap_or(""),
        viewport.cell(row, COL_DETAIL).unwrap_or(""),
        viewport.cell(row, COL_REMOTE).unwrap_or(""),
    ]
}

fn category_line(cells: [&str; LIST_COLUMNS]) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{} ", cells[COL_MARKER]), Theme::category_style()),
        Span::styled(cells[COL_NAME].to_string(), Theme::category_style()),
        Span::styled(format!(" {}", cells[COL_DETAIL]), Theme::version_style()),
    ])
}

fn leaf_line(cells: [&str; LIST_COLUMNS], attr: RowAttr, width: u16) -> Line<'static> {
    let style = match attr.pending {
        Some(PendingKind::Install) => Theme::pending_install_style(),
        Some(PendingKind::Removal) => Theme::pending_removal_style(),
        None if attr.upgradable => Theme::upgradable_style(),
        None => Theme::package_style(),
    };

    let left = format!("  {:<6} {}", cells[COL_MARKER], cells[COL_NAME]);
    let versions = match (cells[COL_DETAIL], cells[COL_REMOTE]) {
        ("", remote) => remote.to_string(),
        (local, remote) if local == remote => local.to_string(),
        (local, remote) => format!("{local} > {remote}"),
    };

    // Right-align the versions when the row is wide enough.
    let pad = (width as usize)
        .saturating_sub(left.chars().count())
        .saturating_sub(versions.chars().count() + 1);
    Line::from(vec![
        Span::styled(left, style),
        Span::raw(" ".repeat(pad)),
        Span::styled(versions, Theme::version_style()),
    ])
}
