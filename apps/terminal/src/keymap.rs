//! Crossterm events to session keys.
//!
//! | Key           | Action             |
//! |---------------|--------------------|
//! | `c`           | select crate       |
//! | `b`           | select bottle      |
//! | `e`           | select empty       |
//! | `r`           | remove item        |
//! | `f`           | finish transaction |
//! | `x`           | cancel transaction |
//! | `l`           | reload catalog     |
//! | `q`, `Ctrl-C` | quit               |
//! | `Enter`       | confirm entry      |
//! | `Esc`         | cancel entry       |
//! | `Backspace`   | delete last char   |

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use depot_core::Key;

/// Command legend for the bottom bar.
pub const LEGEND: &[(&str, &str)] = &[
    ("c", "Crate"),
    ("b", "Bottle"),
    ("e", "Empty"),
    ("r", "Remove"),
    ("f", "Finish"),
    ("x", "Cancel"),
    ("l", "Reload"),
    ("q", "Quit"),
];

/// Maps a terminal event. Releases, repeats, resizes and mouse events
/// produce nothing.
pub fn map_event(event: &Event) -> Option<Key> {
    match event {
        Event::Key(key) if key.kind == KeyEventKind::Press => map_key(key),
        _ => None,
    }
}

pub fn map_key(key: &KeyEvent) -> Option<Key> {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') => Some(Key::Quit),
            _ => None,
        };
    }

    let mapped = match key.code {
        KeyCode::Char('c') => Key::SelectCrate,
        KeyCode::Char('b') => Key::SelectBottle,
        KeyCode::Char('e') => Key::SelectEmpty,
        KeyCode::Char('r') => Key::RemoveItem,
        KeyCode::Char('f') => Key::Finish,
        KeyCode::Char('x') => Key::CancelTransaction,
        KeyCode::Char('l') => Key::ReloadCatalog,
        KeyCode::Char('q') => Key::Quit,
        KeyCode::Char(ch) => Key::Char(ch),
        KeyCode::Enter => Key::Confirm,
        KeyCode::Esc => Key::Cancel,
        KeyCode::Backspace => Key::Backspace,
        _ => return None,
    };
    Some(mapped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventState;

    fn press(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[test]
    fn test_command_keys() {
        assert_eq!(map_event(&press(KeyCode::Char('c'))), Some(Key::SelectCrate));
        assert_eq!(map_event(&press(KeyCode::Char('e'))), Some(Key::SelectEmpty));
        assert_eq!(map_event(&press(KeyCode::Char('l'))), Some(Key::ReloadCatalog));
        assert_eq!(map_event(&press(KeyCode::Enter)), Some(Key::Confirm));
        assert_eq!(map_event(&press(KeyCode::Esc)), Some(Key::Cancel));
    }

    #[test]
    fn test_digits_and_other_chars_pass_through() {
        assert_eq!(map_event(&press(KeyCode::Char('7'))), Some(Key::Char('7')));
        assert_eq!(map_event(&press(KeyCode::Char('-'))), Some(Key::Char('-')));
        assert_eq!(map_event(&press(KeyCode::Char('C'))), Some(Key::Char('C')));
    }

    #[test]
    fn test_ctrl_c_quits() {
        let event = Event::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert_eq!(map_event(&event), Some(Key::Quit));

        let other = Event::Key(KeyEvent::new(KeyCode::Char('b'), KeyModifiers::CONTROL));
        assert_eq!(map_event(&other), None);
    }

    #[test]
    fn test_release_and_non_key_events_ignored() {
        let release = Event::Key(KeyEvent {
            code: KeyCode::Char('c'),
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
        });
        assert_eq!(map_event(&release), None);
        assert_eq!(map_event(&Event::Resize(80, 24)), None);
        assert_eq!(map_event(&press(KeyCode::Tab)), None);
    }
}
