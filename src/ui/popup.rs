//! Centered overlays: the search prompt and transient warnings.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Widget},
};

use super::theme::Theme;

/// Centered rect of the given size, clamped to the screen.
fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

/// Modal input line for the search term. Rendered over the main view while
/// the prompt is active; the cursor position is implied by the text length.
pub struct SearchPrompt<'a> {
    input: &'a str,
}

impl<'a> SearchPrompt<'a> {
    pub fn new(input: &'a str) -> Self {
        Self { input }
    }
}

impl Widget for SearchPrompt<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let width = (self.input.len() as u16 + 10).max(30).min(area.width);
        let popup = centered(area, width, 3);
        Clear.render(popup, buf);

        let block = Block::default()
            .title(" Search ")
            .title_style(Theme::title_style())
            .borders(Borders::ALL)
            .border_style(Theme::border_style());
        let inner = block.inner(popup);
        block.render(popup, buf);
        if inner.height == 0 {
            return;
        }

        let line = Line::from(vec![
            Span::styled("/ ", Theme::prompt_style()),
            Span::raw(self.input.to_string()),
            Span::styled("▏", Theme::prompt_style()),
        ]);
        buf.set_line(inner.x + 1, inner.y, &line, inner.width.saturating_sub(2));
    }
}

/// Transient warning box, e.g. for a privilege refusal. The caller decides
/// when it expires; this only draws the current message.
pub struct WarningPopup<'a> {
    message: &'a str,
}

impl<'a> WarningPopup<'a> {
    pub fn new(message: &'a str) -> Self {
        Self { message }
    }
}

impl Widget for WarningPopup<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let width = (self.message.len() as u16 + 6).max(20).min(area.width);
        let popup = centered(area, width, 3);
        Clear.render(popup, buf);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Theme::warning_style())
            .style(Theme::warning_style());
        let inner = block.inner(popup);
        block.render(popup, buf);
        if inner.height == 0 {
            return;
        }
        buf.set_stringn(
            inner.x + 1,
            inner.y,
            self.message,
            usize::from(inner.width.saturating_sub(2)),
            Theme::warning_style(),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centered_rect_is_clamped_and_centered() {
        let screen = Rect::new(0, 0, 80, 24);
        let popup = centered(screen, 30, 3);
        assert_eq!(popup, Rect::new(25, 10, 30, 3));

        let tiny = Rect::new(0, 0, 10, 2);
        let popup = centered(tiny, 30, 3);
        assert!(popup.width <= 10 && popup.height <= 2);
    }
}
