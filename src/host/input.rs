//! Terminal input events delivered to the UI thread.
//!
//! A deliberately small subset of crossterm's event model: enough for UI
//! callbacks that turn key presses and clicks into broadcasts.

use crossterm::event::{self, Event, KeyEventKind, MouseEventKind};

/// Key codes for keyboard input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    /// A printable character.
    Char(char),
    /// Function key (F1-F12).
    F(u8),
    /// Enter/Return key.
    Enter,
    /// Escape key.
    Esc,
    /// Backspace key.
    Backspace,
    /// Tab key.
    Tab,
    /// Left arrow.
    Left,
    /// Right arrow.
    Right,
    /// Up arrow.
    Up,
    /// Down arrow.
    Down,
}

/// Key modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct KeyModifiers {
    /// Shift key held.
    pub shift: bool,
    /// Control key held.
    pub control: bool,
    /// Alt/Option key held.
    pub alt: bool,
}

impl KeyModifiers {
    /// No modifiers.
    pub const NONE: Self = Self {
        shift: false,
        control: false,
        alt: false,
    };
}

/// Mouse button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// Left mouse button.
    Left,
    /// Right mouse button.
    Right,
    /// Middle mouse button.
    Middle,
}

/// Where and how the mouse was used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MouseEvent {
    /// Column.
    pub x: u16,
    /// Row.
    pub y: u16,
    /// Button involved; `None` for plain movement.
    pub button: Option<MouseButton>,
    /// Modifiers held.
    pub modifiers: KeyModifiers,
}

/// Events the terminal host hands to its input handler.
///
/// Mouse events only arrive when the host enables mouse capture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    /// A key was pressed.
    Key {
        /// The key code.
        code: KeyCode,
        /// Modifiers held during keypress.
        modifiers: KeyModifiers,
    },
    /// Terminal was resized.
    Resize {
        /// New width in columns.
        width: u16,
        /// New height in rows.
        height: u16,
    },
    /// Bracketed paste.
    Paste(String),
    /// Mouse button pressed.
    MouseDown(MouseEvent),
    /// Mouse button released.
    MouseUp(MouseEvent),
    /// Mouse moved, with the button held if dragging.
    MouseMove(MouseEvent),
    /// Wheel scrolled.
    MouseScroll {
        /// Column.
        x: u16,
        /// Row.
        y: u16,
        /// Positive is up, negative is down.
        delta: i16,
    },
}

impl InputEvent {
    /// Plain key press without modifiers.
    pub const fn key(code: KeyCode) -> Self {
        Self::Key {
            code,
            modifiers: KeyModifiers::NONE,
        }
    }

    /// Whether this is the conventional interrupt chord (Ctrl+C).
    pub fn is_interrupt(&self) -> bool {
        matches!(
            self,
            Self::Key {
                code: KeyCode::Char('c'),
                modifiers: KeyModifiers { control: true, .. },
            }
        )
    }

    /// Convert a crossterm event; events outside the subset yield `None`.
    pub fn from_crossterm(event: Event) -> Option<Self> {
        match event {
            Event::Key(key) => {
                // Key releases and repeats are not surfaced.
                if key.kind != KeyEventKind::Press {
                    return None;
                }
                Some(Self::Key {
                    code: convert_key_code(key.code)?,
                    modifiers: convert_modifiers(key.modifiers),
                })
            }
            Event::Resize(width, height) => Some(Self::Resize { width, height }),
            Event::Paste(text) => Some(Self::Paste(text)),
            Event::Mouse(mouse) => convert_mouse(mouse),
            _ => None,
        }
    }
}

fn convert_mouse(mouse: event::MouseEvent) -> Option<InputEvent> {
    let at = |button| MouseEvent {
        x: mouse.column,
        y: mouse.row,
        button,
        modifiers: convert_modifiers(mouse.modifiers),
    };
    let scroll = |delta| InputEvent::MouseScroll {
        x: mouse.column,
        y: mouse.row,
        delta,
    };

    Some(match mouse.kind {
        MouseEventKind::Down(button) => InputEvent::MouseDown(at(Some(convert_button(button)))),
        MouseEventKind::Up(button) => InputEvent::MouseUp(at(Some(convert_button(button)))),
        MouseEventKind::Drag(button) => InputEvent::MouseMove(at(Some(convert_button(button)))),
        MouseEventKind::Moved => InputEvent::MouseMove(at(None)),
        MouseEventKind::ScrollUp => scroll(1),
        MouseEventKind::ScrollDown => scroll(-1),
        _ => return None,
    })
}

const fn convert_button(button: event::MouseButton) -> MouseButton {
    match button {
        event::MouseButton::Left => MouseButton::Left,
        event::MouseButton::Right => MouseButton::Right,
        event::MouseButton::Middle => MouseButton::Middle,
    }
}

fn convert_key_code(code: event::KeyCode) -> Option<KeyCode> {
    Some(match code {
        event::KeyCode::Char(c) => KeyCode::Char(c),
        event::KeyCode::F(n) => KeyCode::F(n),
        event::KeyCode::Enter => KeyCode::Enter,
        event::KeyCode::Esc => KeyCode::Esc,
        event::KeyCode::Backspace => KeyCode::Backspace,
        event::KeyCode::Tab => KeyCode::Tab,
        event::KeyCode::Left => KeyCode::Left,
        event::KeyCode::Right => KeyCode::Right,
        event::KeyCode::Up => KeyCode::Up,
        event::KeyCode::Down => KeyCode::Down,
        _ => return None,
    })
}

fn convert_modifiers(mods: event::KeyModifiers) -> KeyModifiers {
    KeyModifiers {
        shift: mods.contains(event::KeyModifiers::SHIFT),
        control: mods.contains(event::KeyModifiers::CONTROL),
        alt: mods.contains(event::KeyModifiers::ALT),
    }
}
