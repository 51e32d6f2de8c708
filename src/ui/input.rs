//! Key mapping for the TUI
//!
//! INPUT ROUTING (2-way, by lock state):
//! A) LOCKED: the unlock form has focus
//!    - Printable keys and Backspace edit the key field
//!    - Enter submits, Esc / Ctrl+C quits
//!
//! B) UNLOCKED: the draft editor has focus
//!    - Printable keys, Enter and Backspace edit the draft
//!    - Ctrl+E enhance, Ctrl+Y copy, Ctrl+R reset key
//!    - PageUp/PageDown scroll the result, Esc dismisses the toast
//!
//! EXIT HANDLING:
//! - Ctrl+C and Ctrl+Q exit from any state

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// One user intent derived from a key press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    None,
    Quit,
    Enhance,
    Copy,
    ResetKey,
    InsertChar(char),
    Newline,
    Backspace,
    SubmitKey,
    ScrollUp,
    ScrollDown,
    DismissNotification,
}

/// Map a key event to an action
pub fn map_key(key: KeyEvent, locked: bool) -> Action {
    if key.kind == KeyEventKind::Release {
        return Action::None;
    }

    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    if ctrl {
        return match key.code {
            KeyCode::Char('c') | KeyCode::Char('q') => Action::Quit,
            KeyCode::Char('e') if !locked => Action::Enhance,
            KeyCode::Char('y') if !locked => Action::Copy,
            KeyCode::Char('r') if !locked => Action::ResetKey,
            _ => Action::None,
        };
    }

    if locked {
        return match key.code {
            KeyCode::Char(c) => Action::InsertChar(c),
            KeyCode::Backspace => Action::Backspace,
            KeyCode::Enter => Action::SubmitKey,
            KeyCode::Esc => Action::Quit,
            _ => Action::None,
        };
    }

    match key.code {
        KeyCode::Char(c) => Action::InsertChar(c),
        KeyCode::Tab => Action::InsertChar('\t'),
        KeyCode::Enter => Action::Newline,
        KeyCode::Backspace => Action::Backspace,
        KeyCode::PageUp => Action::ScrollUp,
        KeyCode::PageDown => Action::ScrollDown,
        KeyCode::Esc => Action::DismissNotification,
        _ => Action::None,
    }
}

/// Key hints for the action bar
pub fn render_help(locked: bool) -> &'static str {
    if locked {
        "Enter unlock · Esc quit"
    } else {
        "^E enhance · ^Y copy · ^R reset key · PgUp/PgDn scroll · ^Q quit"
    }
}
