use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// The game's view of a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Letter(char),
    Backspace,
    Other,
}

impl From<KeyEvent> for Key {
    fn from(ev: KeyEvent) -> Self {
        if ev.kind == KeyEventKind::Release {
            return Key::Other;
        }
        if ev
            .modifiers
            .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
        {
            return Key::Other;
        }
        match ev.code {
            KeyCode::Char(c) if c.is_alphabetic() => Key::Letter(c),
            KeyCode::Backspace => Key::Backspace,
            _ => Key::Other,
        }
    }
}

impl From<char> for Key {
    fn from(c: char) -> Self {
        if c.is_alphabetic() {
            Key::Letter(c)
        } else {
            Key::Other
        }
    }
}
