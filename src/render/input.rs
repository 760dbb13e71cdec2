//! Keyboard and scroll-wheel input for the window.
//!
//! # Key mapping
//!
//! | Key(s)                  | Command                |
//! |-------------------------|------------------------|
//! | Tab, ↓                  | [`Command::FocusNext`] |
//! | Shift+Tab, ↑            | [`Command::FocusPrev`] |
//! | printable text          | [`Command::Insert`]    |
//! | Backspace               | [`Command::Backspace`] |
//! | Ctrl+T                  | [`Command::ToggleMode`]|
//! | Enter                   | [`Command::Execute`]   |
//! | Ctrl+S                  | [`Command::Export`]    |
//! | PageUp / PageDown       | [`Command::Scroll`]    |
//! | Home                    | [`Command::ScrollTop`] |
//! | Esc                     | [`Command::Close`]     |

use winit::{
    event::MouseScrollDelta,
    keyboard::{Key, ModifiersState, NamedKey},
};

/// Pixels scrolled per wheel notch.
pub const LINE_STEP: i32 = 40;
/// Pixels scrolled per PageUp/PageDown.
pub const PAGE_STEP: i32 = 400;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    FocusNext,
    FocusPrev,
    Insert(String),
    Backspace,
    ToggleMode,
    Execute,
    Export,
    /// Positive scrolls down (towards later blocks).
    Scroll(i32),
    ScrollTop,
    Close,
}

/// Map a pressed key to a command. `text` is the text the key produced, if any.
pub fn map_key(key: &Key, text: Option<&str>, mods: ModifiersState) -> Option<Command> {
    if mods.control_key() {
        return match key {
            Key::Character(c) if c.eq_ignore_ascii_case("t") => Some(Command::ToggleMode),
            Key::Character(c) if c.eq_ignore_ascii_case("s") => Some(Command::Export),
            _ => None,
        };
    }

    match key {
        Key::Named(NamedKey::Tab) if mods.shift_key() => Some(Command::FocusPrev),
        Key::Named(NamedKey::Tab) | Key::Named(NamedKey::ArrowDown) => Some(Command::FocusNext),
        Key::Named(NamedKey::ArrowUp) => Some(Command::FocusPrev),
        Key::Named(NamedKey::Backspace) => Some(Command::Backspace),
        Key::Named(NamedKey::Enter) => Some(Command::Execute),
        Key::Named(NamedKey::Escape) => Some(Command::Close),
        Key::Named(NamedKey::PageDown) => Some(Command::Scroll(PAGE_STEP)),
        Key::Named(NamedKey::PageUp) => Some(Command::Scroll(-PAGE_STEP)),
        Key::Named(NamedKey::Home) => Some(Command::ScrollTop),
        _ => text
            .filter(|t| !t.is_empty() && t.chars().all(|c| !c.is_control()))
            .map(|t| Command::Insert(t.to_string())),
    }
}

/// Map a wheel event to a scroll command. Wheel up scrolls towards the top.
pub fn map_scroll(delta: MouseScrollDelta) -> Option<Command> {
    let dy = match delta {
        MouseScrollDelta::LineDelta(_, y) => -(y * LINE_STEP as f32) as i32,
        MouseScrollDelta::PixelDelta(pos) => -pos.y as i32,
    };
    (dy != 0).then_some(Command::Scroll(dy))
}
