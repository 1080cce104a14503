//! Busy indicator shown while a commit runs. The animation is driven by the
//! app's tick counter, so a stalled event loop visibly freezes it.

use ratatui::{buffer::Buffer, layout::Rect, widgets::Widget};

use super::theme::Theme;

const FRAMES: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
const ASCII_FRAMES: [&str; 4] = ["|", "/", "-", "\\"];

/// One animation frame of the commit indicator, drawn into the status area.
pub struct CommitSpinner {
    tick: u64,
    ascii: bool,
}

impl CommitSpinner {
    pub fn new(tick: u64, ascii: bool) -> Self {
        Self { tick, ascii }
    }

    pub fn frame(&self) -> &'static str {
        if self.ascii {
            ASCII_FRAMES[(self.tick as usize) % ASCII_FRAMES.len()]
        } else {
            FRAMES[(self.tick as usize) % FRAMES.len()]
        }
    }
}

impl Widget for CommitSpinner {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width < 20 || area.height == 0 {
            return;
        }
        let text = format!("{} committing changes", self.frame());
        buf.set_stringn(
            area.x + 1,
            area.y,
            &text,
            usize::from(area.width.saturating_sub(2)),
            Theme::mode_style(),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frames_advance_and_wrap_with_the_tick() {
        let first = CommitSpinner::new(0, false).frame();
        let second = CommitSpinner::new(1, false).frame();
        assert_ne!(first, second);
        assert_eq!(CommitSpinner::new(FRAMES.len() as u64, false).frame(), first);
        assert_eq!(CommitSpinner::new(4, true).frame(), "|");
    }
}
