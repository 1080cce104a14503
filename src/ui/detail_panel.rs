//! Detail pane — one-line comment plus the full description of the package
//! under the cursor, scrollable by page when the text overflows.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    widgets::Widget,
};

use crate::core::inventory::PkgRecord;
use crate::core::viewport::Viewport;

use super::glyphs::GlyphSet;
use super::theme::Theme;

/// Scrollable description text for the selected package.
pub struct DetailPanel {
    viewport: Viewport,
    /// Description starts below the comment and a blank spacer.
    body_start: usize,
}

impl DetailPanel {
    pub fn new() -> Self {
        Self {
            viewport: Viewport::new(0, 1),
            body_start: 0,
        }
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn set_height(&mut self, height: usize) {
        self.viewport.set_visible_height(height);
    }

    /// Replace the content. `None` (a category row is selected) blanks the
    /// pane. Scroll position resets — the pane always opens at the top of a
    /// newly selected package.
    pub fn rebuild(&mut self, record: Option<&PkgRecord>) {
        self.viewport.clear();
        self.viewport.reset_cursor();
        self.body_start = 0;

        let Some(record) = record else {
            return;
        };

        self.viewport.print(&[&record.comment]);
        self.viewport.print(&[""]);
        self.body_start = 2;
        for line in record.description.lines() {
            self.viewport.print(&[line]);
        }
    }

    pub fn page_down(&mut self) {
        for _ in 0..self.viewport.visible_height().max(1) {
            self.viewport.scroll_down();
        }
    }

    pub fn page_up(&mut self) {
        for _ in 0..self.viewport.visible_height().max(1) {
            self.viewport.scroll_up();
        }
    }

    fn is_comment_row(&self, row: usize) -> bool {
        row < self.body_start.saturating_sub(1)
    }
}

impl Default for DetailPanel {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-frame widget for the detail pane. Borderless; scroll indicators sit
/// in the last column like the list pane's.
pub struct DetailPanelWidget<'a> {
    panel: &'a DetailPanel,
    glyphs: &'a GlyphSet,
}

impl<'a> DetailPanelWidget<'a> {
    pub fn new(panel: &'a DetailPanel, glyphs: &'a GlyphSet) -> Self {
        Self { panel, glyphs }
    }
}

impl Widget for DetailPanelWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height == 0 || area.width < 2 {
            return;
        }
        let viewport = self.panel.viewport();
        let text_width = usize::from(area.width.saturating_sub(1));

        for (i, row) in viewport.visible_range().enumerate() {
            let y = area.y + i as u16;
            let style = if self.panel.is_comment_row(row) {
                Theme::comment_style()
            } else {
                Theme::description_style()
            };
            let text = viewport.cell(row, 0).unwrap_or("");
            buf.set_stringn(area.x, y, text, text_width, style);
        }

        let arrow_x = area.x + area.width - 1;
        if viewport.can_scroll_up() {
            buf.set_string(arrow_x, area.y, self.glyphs.arrow_up, Theme::scroll_arrow_style());
        }
        if viewport.can_scroll_down() {
            let bottom = area.y + area.height - 1;
            buf.set_string(arrow_x, bottom, self.glyphs.arrow_down, Theme::scroll_arrow_style());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::inventory::Status;

    fn record(comment: &str, description: &str) -> PkgRecord {
        PkgRecord {
            origin: "editors/vim".into(),
            category: "editors".into(),
            name: "vim".into(),
            local_version: None,
            remote_version: "9.1".into(),
            comment: comment.into(),
            description: description.into(),
            status: Status::AVAILABLE,
        }
    }

    #[test]
    fn rebuild_lays_out_comment_blank_description() {
        let mut panel = DetailPanel::new();
        panel.set_height(10);
        panel.rebuild(Some(&record("Vi IMproved", "A text editor.\nHighly configurable.")));

        assert_eq!(panel.viewport().cell(0, 0), Some("Vi IMproved"));
        assert_eq!(panel.viewport().cell(1, 0), Some(""));
        assert_eq!(panel.viewport().cell(2, 0), Some("A text editor."));
        assert_eq!(panel.viewport().cell(3, 0), Some("Highly configurable."));
        assert!(panel.is_comment_row(0));
        assert!(!panel.is_comment_row(2));
    }

    #[test]
    fn no_selection_blanks_the_pane() {
        let mut panel = DetailPanel::new();
        panel.set_height(10);
        panel.rebuild(Some(&record("c", "d")));
        panel.rebuild(None);
        assert!(panel.viewport().is_empty());
    }

    #[test]
    fn paging_moves_by_visible_height_and_stops_at_the_ends() {
        let mut panel = DetailPanel::new();
        panel.set_height(3);
        let body: String = (0..12).map(|i| format!("line {i}\n")).collect();
        panel.rebuild(Some(&record("c", &body)));
        assert_eq!(panel.viewport().len(), 14);

        panel.page_down();
        assert_eq!(panel.viewport().scroll_offset(), 3);
        for _ in 0..10 {
            panel.page_down();
        }
        assert_eq!(panel.viewport().scroll_offset(), 11);
        assert!(!panel.viewport().can_scroll_down());

        for _ in 0..10 {
            panel.page_up();
        }
        assert_eq!(panel.viewport().scroll_offset(), 0);
    }

    #[test]
    fn reselect_resets_scroll() {
        let mut panel = DetailPanel::new();
        panel.set_height(2);
        let body: String = (0..8).map(|i| format!("line {i}\n")).collect();
        panel.rebuild(Some(&record("c", &body)));
        panel.page_down();
        assert!(panel.viewport().can_scroll_up());

        panel.rebuild(Some(&record("other", "short")));
        assert_eq!(panel.viewport().scroll_offset(), 0);
    }
}
