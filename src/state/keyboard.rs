//! Keyboard Module - Key events as the navigation state machine sees them
//!
//! A [`KeyboardEvent`] mirrors a DOM `keydown`: a key name, the pressed
//! modifiers, the element that received it, and two flags a handler may set
//! (`prevent_default`, `stop_propagation`). The flags use interior
//! mutability so handlers can take `&KeyboardEvent`, like DOM listeners.
//!
//! # Example
//!
//! ```ignore
//! use spark_composite::state::keyboard::{KeyboardEvent, Modifiers, ARROW_DOWN};
//!
//! let event = KeyboardEvent::with_modifiers(ARROW_DOWN, Modifiers::SHIFT);
//! root.handle_key_down(&event);
//! if event.default_prevented() {
//!     // the composite consumed the key
//! }
//! ```

use std::cell::Cell;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::engine::ElementId;

// =============================================================================
// KEY NAMES
// =============================================================================

pub const ARROW_UP: &str = "ArrowUp";
pub const ARROW_DOWN: &str = "ArrowDown";
pub const ARROW_LEFT: &str = "ArrowLeft";
pub const ARROW_RIGHT: &str = "ArrowRight";
pub const HOME: &str = "Home";
pub const END: &str = "End";

/// The four arrow keys.
pub const ARROW_KEYS: [&str; 4] = [ARROW_UP, ARROW_DOWN, ARROW_LEFT, ARROW_RIGHT];

/// Is `key` one of the four arrow keys?
pub fn is_arrow_key(key: &str) -> bool {
    ARROW_KEYS.contains(&key)
}

// =============================================================================
// TYPES
// =============================================================================

bitflags::bitflags! {
    /// Modifier keys held during a key event.
    ///
    /// Also used as the allow-list of modifiers that do not cancel navigation.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct Modifiers: u8 {
        const SHIFT = 1 << 0;
        const CONTROL = 1 << 1;
        const ALT = 1 << 2;
        const META = 1 << 3;
    }
}

/// Allow-list of modifiers that may be held while navigating.
pub type ModifierKeys = Modifiers;

/// Key event state (press, repeat, release)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum KeyState {
    #[default]
    Press,
    Repeat,
    Release,
}

/// Keyboard event
#[derive(Clone, Debug, PartialEq)]
pub struct KeyboardEvent {
    /// The key that was pressed (e.g., "a", "Enter", "ArrowUp")
    pub key: String,
    /// Modifier keys state
    pub modifiers: Modifiers,
    /// Press/repeat/release state
    pub state: KeyState,
    /// Element the event was dispatched to
    pub target: Option<ElementId>,
    default_prevented: Cell<bool>,
    propagation_stopped: Cell<bool>,
}

impl KeyboardEvent {
    /// Create a simple key press event
    pub fn new(key: impl Into<String>) -> Self {
        Self::with_modifiers(key, Modifiers::empty())
    }

    /// Create a key press with modifiers
    pub fn with_modifiers(key: impl Into<String>, modifiers: Modifiers) -> Self {
        Self {
            key: key.into(),
            modifiers,
            state: KeyState::Press,
            target: None,
            default_prevented: Cell::new(false),
            propagation_stopped: Cell::new(false),
        }
    }

    /// Set the element the event is dispatched to.
    pub fn with_target(mut self, target: ElementId) -> Self {
        self.target = Some(target);
        self
    }

    /// Set press/repeat/release state.
    pub fn with_state(mut self, state: KeyState) -> Self {
        self.state = state;
        self
    }

    /// Press or auto-repeat: the events a `keydown` listener sees.
    pub fn is_key_down(&self) -> bool {
        self.state != KeyState::Release
    }

    pub fn shift_key(&self) -> bool {
        self.modifiers.contains(Modifiers::SHIFT)
    }

    /// Suppress the host's default action (page scroll, caret move).
    pub fn prevent_default(&self) {
        self.default_prevented.set(true);
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented.get()
    }

    /// Keep ancestors (e.g. an outer composite) from seeing this event.
    pub fn stop_propagation(&self) {
        self.propagation_stopped.set(true);
    }

    pub fn propagation_stopped(&self) -> bool {
        self.propagation_stopped.get()
    }

    /// Is a modifier held that is not in `allowed`?
    pub fn has_disallowed_modifier(&self, allowed: ModifierKeys) -> bool {
        !self.modifiers.difference(allowed).is_empty()
    }
}

// =============================================================================
// CROSSTERM INTEROP
// =============================================================================

fn key_name(code: KeyCode) -> String {
    match code {
        KeyCode::Up => ARROW_UP.to_string(),
        KeyCode::Down => ARROW_DOWN.to_string(),
        KeyCode::Left => ARROW_LEFT.to_string(),
        KeyCode::Right => ARROW_RIGHT.to_string(),
        KeyCode::Home => HOME.to_string(),
        KeyCode::End => END.to_string(),
        KeyCode::PageUp => "PageUp".to_string(),
        KeyCode::PageDown => "PageDown".to_string(),
        KeyCode::Enter => "Enter".to_string(),
        KeyCode::Esc => "Escape".to_string(),
        KeyCode::Tab | KeyCode::BackTab => "Tab".to_string(),
        KeyCode::Backspace => "Backspace".to_string(),
        KeyCode::Delete => "Delete".to_string(),
        KeyCode::Insert => "Insert".to_string(),
        KeyCode::F(n) => format!("F{n}"),
        KeyCode::Char(' ') => " ".to_string(),
        KeyCode::Char(c) => c.to_string(),
        _ => "Unidentified".to_string(),
    }
}

impl From<KeyEvent> for KeyboardEvent {
    fn from(event: KeyEvent) -> Self {
        let mut modifiers = Modifiers::empty();
        if event.modifiers.contains(KeyModifiers::SHIFT) || event.code == KeyCode::BackTab {
            modifiers |= Modifiers::SHIFT;
        }
        if event.modifiers.contains(KeyModifiers::CONTROL) {
            modifiers |= Modifiers::CONTROL;
        }
        if event.modifiers.contains(KeyModifiers::ALT) {
            modifiers |= Modifiers::ALT;
        }
        if event
            .modifiers
            .intersects(KeyModifiers::SUPER | KeyModifiers::META)
        {
            modifiers |= Modifiers::META;
        }

        let state = match event.kind {
            KeyEventKind::Press => KeyState::Press,
            KeyEventKind::Repeat => KeyState::Repeat,
            KeyEventKind::Release => KeyState::Release,
        };

        KeyboardEvent::with_modifiers(key_name(event.code), modifiers).with_state(state)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_start_clear() {
        let event = KeyboardEvent::new(ARROW_DOWN);
        assert!(!event.default_prevented());
        assert!(!event.propagation_stopped());

        event.prevent_default();
        event.stop_propagation();
        assert!(event.default_prevented());
        assert!(event.propagation_stopped());
    }

    #[test]
    fn test_disallowed_modifier() {
        let event = KeyboardEvent::with_modifiers(ARROW_DOWN, Modifiers::SHIFT);
        assert!(event.has_disallowed_modifier(Modifiers::empty()));
        assert!(!event.has_disallowed_modifier(Modifiers::SHIFT));
        assert!(event.has_disallowed_modifier(Modifiers::ALT));

        let plain = KeyboardEvent::new(ARROW_DOWN);
        assert!(!plain.has_disallowed_modifier(Modifiers::empty()));
    }

    #[test]
    fn test_release_is_not_key_down() {
        assert!(KeyboardEvent::new("a").is_key_down());
        assert!(KeyboardEvent::new("a").with_state(KeyState::Repeat).is_key_down());
        assert!(!KeyboardEvent::new("a").with_state(KeyState::Release).is_key_down());
    }

    #[test]
    fn test_from_crossterm() {
        let event: KeyboardEvent =
            KeyEvent::new(KeyCode::Down, KeyModifiers::SHIFT | KeyModifiers::CONTROL).into();
        assert_eq!(event.key, ARROW_DOWN);
        assert_eq!(event.modifiers, Modifiers::SHIFT | Modifiers::CONTROL);
        assert_eq!(event.state, KeyState::Press);

        let home: KeyboardEvent = KeyEvent::new(KeyCode::Home, KeyModifiers::NONE).into();
        assert_eq!(home.key, HOME);
        assert!(home.modifiers.is_empty());
    }
}
