//! Terminal widgets and layout. Everything here is per-frame: widgets borrow
//! the app's panels and draw their visible slice, holding no state of their
//! own beyond the current frame.

pub mod detail_panel;
pub mod glyphs;
pub mod layout;
pub mod list_panel;
pub mod popup;
pub mod spinner;
pub mod theme;
