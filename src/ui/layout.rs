//! Layout — split the screen into the package list, the detail pane, and a
//! one-row status bar. Rectangles are rebuilt from scratch on every resize.

use crate::core::geometry::{GeometryError, Point, Rect, Size};

/// Terminals smaller than this cannot hold all three regions.
pub const MIN_WIDTH: u16 = 20;
pub const MIN_HEIGHT: u16 = 6;

/// Screen regions, top to bottom: list (~60%), detail, status.
#[derive(Debug, Clone, Copy)]
pub struct AppLayout {
    pub list_area: Rect,
    pub detail_area: Rect,
    pub status_area: Rect,
}

impl AppLayout {
    pub fn from_screen(width: u16, height: u16) -> Result<Self, GeometryError> {
        // A degenerate screen produces zero-sized rectangles, which Rect
        // construction rejects — callers keep the previous layout.
        let width = width.max(MIN_WIDTH);
        let height = height.max(MIN_HEIGHT);

        let list_height = (u32::from(height) * 6 / 10) as u16;
        let detail_height = height - list_height - 1;

        let list_area = Rect::new(Point::new(0, 0), Size::new(width, list_height))?;
        let detail_area = Rect::new(Point::new(0, list_height), Size::new(width, detail_height))?;
        let status_area = Rect::new(Point::new(0, height - 1), Size::new(width, 1))?;

        Ok(Self {
            list_area,
            detail_area,
            status_area,
        })
    }

    /// Rows available for list content (inside the list pane border).
    pub fn list_inner_height(&self) -> usize {
        usize::from(self.list_area.height().saturating_sub(2))
    }

    /// Rows available for detail content (the detail pane has no border).
    pub fn detail_inner_height(&self) -> usize {
        usize::from(self.detail_area.height())
    }
}
