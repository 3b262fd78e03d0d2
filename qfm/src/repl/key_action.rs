//! Pure mapping from terminal key events to engine input events.
//!
//! Kept free of side effects so every binding can be tested without a terminal.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

const CTRL: KeyModifiers = KeyModifiers::CONTROL;
const ALT: KeyModifiers = KeyModifiers::ALT;

/// One classified keystroke.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    Char(char),
    /// The variable sigil `$`.
    Sigil,
    Backspace,
    Tab,
    Enter,
    HistoryUp,
    HistoryDown,
    /// Any other escape sequence (Left, Right, Esc, function keys).
    OtherEscape,
    /// Ctrl+C or Ctrl+D.
    Interrupt,
}

/// Classify a key event. Releases and repeats of non-press kinds are dropped.
pub fn classify_key(key: &KeyEvent) -> Option<InputEvent> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    let event = match (key.code, key.modifiers) {
        (KeyCode::Char('c'), CTRL) | (KeyCode::Char('d'), CTRL) => InputEvent::Interrupt,
        (KeyCode::Char(_), m) if m.contains(CTRL) || m.contains(ALT) => {
            InputEvent::OtherEscape
        }
        (KeyCode::Char('$'), _) => InputEvent::Sigil,
        (KeyCode::Char(ch), _) => InputEvent::Char(ch),
        (KeyCode::Backspace, _) => InputEvent::Backspace,
        (KeyCode::Tab, _) | (KeyCode::BackTab, _) => InputEvent::Tab,
        (KeyCode::Enter, _) => InputEvent::Enter,
        (KeyCode::Up, _) => InputEvent::HistoryUp,
        (KeyCode::Down, _) => InputEvent::HistoryDown,
        _ => InputEvent::OtherEscape,
    };
    Some(event)
}
