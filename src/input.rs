//! Key bindings: normal and vim-style.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Action from a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    CursorLeft,
    CursorRight,
    CursorUp,
    CursorDown,
    SwapLeft,
    SwapRight,
    SwapUp,
    SwapDown,
    NewGame,
    Quit,
    None,
}

/// Map key event to game action. Plain arrows (or hjkl) move the cursor;
/// Shift+arrows (or HJKL) swap the gem under the cursor in that direction.
pub fn key_to_action(key: KeyEvent) -> Action {
    let KeyEvent { code, modifiers, .. } = key;
    let shift = modifiers == KeyModifiers::SHIFT;
    let no_mod = modifiers.is_empty() || shift;
    if !no_mod {
        return Action::None;
    }
    match code {
        KeyCode::Char('q') | KeyCode::Esc => Action::Quit,
        KeyCode::Char('n') => Action::NewGame,
        KeyCode::Left if shift => Action::SwapLeft,
        KeyCode::Right if shift => Action::SwapRight,
        KeyCode::Up if shift => Action::SwapUp,
        KeyCode::Down if shift => Action::SwapDown,
        KeyCode::Left | KeyCode::Char('h') => Action::CursorLeft,
        KeyCode::Right | KeyCode::Char('l') => Action::CursorRight,
        KeyCode::Up | KeyCode::Char('k') => Action::CursorUp,
        KeyCode::Down | KeyCode::Char('j') => Action::CursorDown,
        KeyCode::Char('H') => Action::SwapLeft,
        KeyCode::Char('L') => Action::SwapRight,
        KeyCode::Char('K') => Action::SwapUp,
        KeyCode::Char('J') => Action::SwapDown,
        _ => Action::None,
    }
}
