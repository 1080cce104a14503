//! Scroll-and-cursor window over a virtual canvas.
//!
//! The canvas (a [`Grid`] of string cells) can be much taller than the
//! visible region; the viewport owns the scroll offset, the cursor row and a
//! print cursor used while content is appended. Every navigation operation is
//! total: out-of-range requests clamp silently or become no-ops, never
//! errors.

use super::grid::Grid;

/// Bounded visible region over a growable virtual canvas.
#[derive(Debug, Clone)]
pub struct Viewport {
    visible_height: usize,
    /// Rows allocated in the canvas; doubles when the print cursor hits it.
    capacity: usize,
    scroll_offset: usize,
    cursor_row: usize,
    canvas: Grid<String>,
}

impl Viewport {
    /// `width` is the number of tabular columns per row, not terminal cells.
    pub fn new(visible_height: usize, width: usize) -> Self {
        let capacity = visible_height.max(1);
        let mut canvas = Grid::new(width);
        canvas.reserve_rows(capacity);
        Self {
            visible_height,
            capacity,
            scroll_offset: 0,
            cursor_row: 0,
            canvas,
        }
    }

    // ── content ────────────────────────────────────────────────

    /// Append one row at the print cursor. Cells beyond the grid width are
    /// dropped; missing cells stay at the default (empty string).
    pub fn print(&mut self, cells: &[&str]) {
        if self.len() == self.capacity {
            self.capacity *= 2;
            self.canvas.reserve_rows(self.capacity);
        }
        self.canvas.append_row();
        let row = self.canvas.height() - 1;
        for (col, cell) in cells.iter().enumerate().take(self.canvas.width()) {
            // In-bounds by construction; the row was just appended.
            let _ = self.canvas.set(row, col, (*cell).to_string());
        }
    }

    /// Reset the print cursor and drop all content. Cursor and scroll offset
    /// are left as-is; [`clamp`](Self::clamp) fixes them after the rebuild.
    pub fn clear(&mut self) {
        self.canvas.clear();
    }

    /// Number of rows printed so far (the virtual length).
    pub fn len(&self) -> usize {
        self.canvas.height()
    }

    pub fn is_empty(&self) -> bool {
        self.canvas.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&str> {
        self.canvas.get(row, col).ok().map(String::as_str)
    }

    pub fn column_count(&self) -> usize {
        self.canvas.width()
    }

    // ── geometry ───────────────────────────────────────────────

    pub fn visible_height(&self) -> usize {
        self.visible_height
    }

    /// Adjust to a new visible height (terminal resize); clamps afterwards.
    pub fn set_visible_height(&mut self, height: usize) {
        self.visible_height = height;
        self.clamp();
    }

    /// First..last+1 visible canvas rows.
    pub fn visible_range(&self) -> std::ops::Range<usize> {
        let end = (self.scroll_offset + self.visible_height).min(self.len());
        self.scroll_offset..end
    }

    // ── cursor ─────────────────────────────────────────────────

    pub fn cursor_row(&self) -> usize {
        self.cursor_row
    }

    pub fn scroll_offset(&self) -> usize {
        self.scroll_offset
    }

    /// Advance the cursor one row; scrolls by exactly one when the cursor
    /// would leave the visible window. No-op on the last row.
    pub fn move_cursor_down(&mut self) {
        if self.cursor_row + 1 >= self.len() {
            return;
        }
        self.cursor_row += 1;
        if self.cursor_row >= self.scroll_offset + self.visible_height {
            self.scroll_offset += 1;
        }
    }

    /// Mirror of [`move_cursor_down`](Self::move_cursor_down).
    pub fn move_cursor_up(&mut self) {
        if self.cursor_row == 0 {
            return;
        }
        self.cursor_row -= 1;
        if self.cursor_row < self.scroll_offset {
            self.scroll_offset -= 1;
        }
    }

    pub fn reset_cursor(&mut self) {
        self.cursor_row = 0;
        self.scroll_offset = 0;
    }

    // ── explicit scrolling ─────────────────────────────────────

    pub fn can_scroll_up(&self) -> bool {
        self.scroll_offset > 0
    }

    pub fn can_scroll_down(&self) -> bool {
        self.len() > self.scroll_offset + self.visible_height
    }

    pub fn scroll_up(&mut self) {
        if self.can_scroll_up() {
            self.scroll_offset -= 1;
        }
    }

    pub fn scroll_down(&mut self) {
        if self.can_scroll_down() {
            self.scroll_offset += 1;
        }
    }

    // ── invariant repair ───────────────────────────────────────

    /// Pull cursor and scroll offset back into range after the content
    /// length changed. Called at the end of every rebuild so navigation
    /// state survives reloads instead of being reset.
    pub fn clamp(&mut self) {
        if self.is_empty() {
            self.cursor_row = 0;
            self.scroll_offset = 0;
            return;
        }
        self.cursor_row = self.cursor_row.min(self.len() - 1);
        self.scroll_offset = self
            .scroll_offset
            .min(self.len().saturating_sub(self.visible_height));
        if self.visible_height == 0 {
            return;
        }
        // Keep the cursor inside the visible window.
        if self.cursor_row < self.scroll_offset {
            self.scroll_offset = self.cursor_row;
        } else if self.cursor_row >= self.scroll_offset + self.visible_height {
            self.scroll_offset = self.cursor_row - self.visible_height + 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled(visible: usize, rows: usize) -> Viewport {
        let mut vp = Viewport::new(visible, 1);
        for i in 0..rows {
            vp.print(&[&format!("row{i}")]);
        }
        vp
    }

    #[test]
    fn cursor_stays_in_bounds_for_any_move_sequence() {
        let mut vp = filled(4, 9);
        // Deterministic pseudo-random walk over both cursor directions.
        let mut seed: u32 = 0x2545f491;
        for _ in 0..500 {
            seed = seed.wrapping_mul(1664525).wrapping_add(1013904223);
            if seed & 1 == 0 {
                vp.move_cursor_down();
            } else {
                vp.move_cursor_up();
            }
            assert!(vp.cursor_row() < vp.len());
            assert!(vp.scroll_offset() <= vp.len() - vp.visible_height());
            let range = vp.visible_range();
            assert!(range.contains(&vp.cursor_row()));
        }
    }

    #[test]
    fn cursor_noop_at_boundaries() {
        let mut vp = filled(5, 3);
        vp.move_cursor_up();
        assert_eq!(vp.cursor_row(), 0);
        vp.move_cursor_down();
        vp.move_cursor_down();
        vp.move_cursor_down(); // already on the last row
        assert_eq!(vp.cursor_row(), 2);
        assert_eq!(vp.scroll_offset(), 0);
    }

    #[test]
    fn auto_scroll_is_single_step() {
        let mut vp = filled(3, 10);
        for expected_scroll in [0, 0, 0, 1, 2, 3] {
            assert_eq!(vp.scroll_offset(), expected_scroll);
            vp.move_cursor_down();
        }
    }

    #[test]
    fn scroll_gating_tracks_content_growth() {
        let mut vp = filled(5, 3);
        assert!(!vp.can_scroll_down());
        for i in 0..10 {
            vp.print(&[&format!("extra{i}")]);
        }
        assert!(vp.can_scroll_down());
        for _ in 0..50 {
            vp.scroll_down();
        }
        // 13 rows, 5 visible: the offset tops out at 8.
        assert_eq!(vp.scroll_offset(), vp.len() - vp.visible_height());
        assert!(!vp.can_scroll_down());
        assert!(vp.can_scroll_up());
    }

    #[test]
    fn capacity_doubles_at_print_cursor() {
        let mut vp = Viewport::new(4, 1);
        assert_eq!(vp.capacity(), 4);
        for _ in 0..4 {
            vp.print(&["x"]);
        }
        assert_eq!(vp.capacity(), 4);
        vp.print(&["x"]);
        assert_eq!(vp.capacity(), 8);
        for _ in 0..4 {
            vp.print(&["x"]);
        }
        assert_eq!(vp.capacity(), 16);
    }

    #[test]
    fn clamp_preserves_position_across_rebuild() {
        let mut vp = filled(3, 20);
        for _ in 0..10 {
            vp.move_cursor_down();
        }
        assert_eq!(vp.cursor_row(), 10);

        // Rebuild with less content: cursor is clamped, not reset.
        vp.clear();
        for i in 0..6 {
            vp.print(&[&format!("row{i}")]);
        }
        vp.clamp();
        assert_eq!(vp.cursor_row(), 5);
        assert!(vp.visible_range().contains(&vp.cursor_row()));

        // Rebuild empty.
        vp.clear();
        vp.clamp();
        assert_eq!(vp.cursor_row(), 0);
        assert_eq!(vp.scroll_offset(), 0);
    }

    #[test]
    fn print_fills_columns_in_order() {
        let mut vp = Viewport::new(2, 3);
        vp.print(&["a", "b"]);
        assert_eq!(vp.cell(0, 0), Some("a"));
        assert_eq!(vp.cell(0, 1), Some("b"));
        assert_eq!(vp.cell(0, 2), Some(""));
        assert_eq!(vp.cell(0, 3), None);
    }
}
