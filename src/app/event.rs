//! Terminal event abstraction.
//!
//! Raw crossterm events are classified into the small set of commands the
//! navigation layer understands, and a background task forwards them over a
//! channel so the main loop stays non-blocking.

use std::time::Duration;

use crossterm::event::{self, Event as CtEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tokio::sync::mpsc;

/// Commands the navigation layer acts on. Unbound keys classify to `None`
/// and are dropped before they reach the handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    NavUp,
    NavDown,
    PageUp,
    PageDown,
    Select,
    Deselect,
    NextMode,
    Commit,
    Character(char),
    Redraw,
    Quit,
}

/// Events consumed by the main loop.
#[derive(Debug)]
pub enum AppEvent {
    Input(Command),
    Resize(u16, u16),
    Tick,
}

/// Map a key press to a command. Release/repeat events are ignored so
/// terminals reporting both kinds do not double-fire.
pub fn classify(key: KeyEvent) -> Option<Command> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Char('c') if ctrl => Some(Command::Quit),
        KeyCode::Esc => Some(Command::Quit),
        KeyCode::Tab => Some(Command::NextMode),
        KeyCode::Char('x') if ctrl => Some(Command::Commit),
        KeyCode::Up => Some(Command::NavUp),
        KeyCode::Char('p') if ctrl => Some(Command::NavUp),
        KeyCode::Down => Some(Command::NavDown),
        KeyCode::Char('n') if ctrl => Some(Command::NavDown),
        KeyCode::PageUp => Some(Command::PageUp),
        KeyCode::PageDown => Some(Command::PageDown),
        KeyCode::Enter => Some(Command::Select),
        KeyCode::Delete | KeyCode::Backspace => Some(Command::Deselect),
        KeyCode::Char('d') if ctrl => Some(Command::Deselect),
        KeyCode::Char('l') if ctrl => Some(Command::Redraw),
        KeyCode::Char(c) if !ctrl => Some(Command::Character(c)),
        _ => None,
    }
}

/// Spawns a background task that polls the terminal for events and sends
/// them through the returned channel, emitting `Tick` when the terminal is
/// quiet for one tick interval.
pub fn spawn_event_reader(tick_rate: Duration) -> mpsc::UnboundedReceiver<AppEvent> {
    let (tx, rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        loop {
            let has_event = event::poll(tick_rate).unwrap_or(false);
            if has_event {
                if let Ok(ev) = event::read() {
                    let app_event = match ev {
                        CtEvent::Key(key) => match classify(key) {
                            Some(command) => AppEvent::Input(command),
                            None => continue,
                        },
                        CtEvent::Resize(w, h) => AppEvent::Resize(w, h),
                        _ => continue,
                    };
                    if tx.send(app_event).is_err() {
                        break; // receiver dropped
                    }
                }
            } else if tx.send(AppEvent::Tick).is_err() {
                break;
            }
        }
    });

    rx
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        let mut key = KeyEvent::new(code, modifiers);
        key.kind = KeyEventKind::Press;
        key
    }

    #[test]
    fn control_chords_map_to_commands() {
        assert_eq!(
            classify(press(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Some(Command::Quit)
        );
        assert_eq!(
            classify(press(KeyCode::Char('x'), KeyModifiers::CONTROL)),
            Some(Command::Commit)
        );
        assert_eq!(
            classify(press(KeyCode::Char('n'), KeyModifiers::CONTROL)),
            Some(Command::NavDown)
        );
        assert_eq!(
            classify(press(KeyCode::Char('p'), KeyModifiers::CONTROL)),
            Some(Command::NavUp)
        );
    }

    #[test]
    fn plain_characters_pass_through() {
        assert_eq!(
            classify(press(KeyCode::Char('a'), KeyModifiers::NONE)),
            Some(Command::Character('a'))
        );
        // A ctrl-chord without a binding is dropped, not a character.
        assert_eq!(classify(press(KeyCode::Char('z'), KeyModifiers::CONTROL)), None);
    }

    #[test]
    fn release_events_are_ignored() {
        let mut key = KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE);
        key.kind = KeyEventKind::Release;
        assert_eq!(classify(key), None);
    }

    #[test]
    fn erase_keys_all_classify_to_deselect() {
        for key in [
            press(KeyCode::Delete, KeyModifiers::NONE),
            press(KeyCode::Backspace, KeyModifiers::NONE),
            press(KeyCode::Char('d'), KeyModifiers::CONTROL),
        ] {
            assert_eq!(classify(key), Some(Command::Deselect));
        }
    }
}
