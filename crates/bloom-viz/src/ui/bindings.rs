//! Keyboard bindings and input handling.
//!
//! Centralizes all keyboard shortcuts and key mapping logic.

use nannou::prelude::*;

/// Actions that can be triggered by key presses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    ToggleHelp,
    ToggleStats,
    ToggleFullscreen,
    CloseHelp,
    ExitFullscreen,
}

/// Key / description pairs shown in the help overlay
pub const SHORTCUTS: &[(&str, &str)] = &[
    ("h", "Toggle this help"),
    ("s", "Toggle stats overlay"),
    ("f / F11", "Toggle fullscreen"),
    ("Esc", "Close help / leave fullscreen"),
    ("q", "Quit"),
    ("", ""),
    ("Drop file", "Load an audio track"),
];

/// Parse a key into an action. Escape closes the help overlay first and only
/// leaves fullscreen once nothing else is open.
pub fn parse_key(key: Key, help_visible: bool, fullscreen: bool) -> Option<Action> {
    match key {
        Key::Q => Some(Action::Quit),
        Key::H => Some(Action::ToggleHelp),
        Key::S => Some(Action::ToggleStats),
        Key::F | Key::F11 => Some(Action::ToggleFullscreen),
        Key::Escape if help_visible => Some(Action::CloseHelp),
        Key::Escape if fullscreen => Some(Action::ExitFullscreen),
        _ => None,
    }
}
