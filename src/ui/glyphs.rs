//! Glyph set — Unicode box/arrow characters with an ASCII fallback for
//! terminals (or fonts) that cannot render them. Selected once at startup
//! by the `--ascii` flag.

#[derive(Debug, Clone, Copy)]
pub struct GlyphSet {
    /// Marker on a folded category row.
    pub folded: &'static str,
    /// Marker on an unfolded category row.
    pub unfolded: &'static str,
    /// Scrollbar indicator: content above the visible range.
    pub arrow_up: &'static str,
    /// Scrollbar indicator: content below the visible range.
    pub arrow_down: &'static str,
    /// Marker on an upgradable leaf row.
    pub upgrade: &'static str,
    /// Whether this is the ASCII fallback set.
    pub ascii: bool,
}

impl GlyphSet {
    pub fn unicode() -> Self {
        Self {
            folded: "▶",
            unfolded: "▼",
            arrow_up: "↑",
            arrow_down: "↓",
            upgrade: "↗",
            ascii: false,
        }
    }

    pub fn ascii() -> Self {
        Self {
            folded: "-",
            unfolded: "\\",
            arrow_up: "^",
            arrow_down: "v",
            upgrade: "^",
            ascii: true,
        }
    }
}
