//! Key events delivered by the platform input method.
//!
//! Key codes use the platform's integer numbering. Only the handful of keys
//! the edit session interprets itself get named constants; everything else is
//! passed through to the [`KeyTranslator`](crate::platform::KeyTranslator).

use std::fmt;

/// Platform key code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KeyCode(pub i32);

impl KeyCode {
    pub const DPAD_LEFT: KeyCode = KeyCode(21);
    pub const DPAD_RIGHT: KeyCode = KeyCode(22);
    pub const ENTER: KeyCode = KeyCode(66);
    /// Backspace.
    pub const DEL: KeyCode = KeyCode(67);
    pub const FORWARD_DEL: KeyCode = KeyCode(112);

    /// Keys the edit session applies to its own buffer or forwards as an
    /// enter signal, rather than handing to the key translator.
    pub fn is_editing_key(self) -> bool {
        matches!(
            self,
            KeyCode::ENTER
                | KeyCode::DPAD_LEFT
                | KeyCode::DPAD_RIGHT
                | KeyCode::DEL
                | KeyCode::FORWARD_DEL
        )
    }
}

impl fmt::Display for KeyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            KeyCode::DPAD_LEFT => f.write_str("DPAD_LEFT"),
            KeyCode::DPAD_RIGHT => f.write_str("DPAD_RIGHT"),
            KeyCode::ENTER => f.write_str("ENTER"),
            KeyCode::DEL => f.write_str("DEL"),
            KeyCode::FORWARD_DEL => f.write_str("FORWARD_DEL"),
            KeyCode(code) => write!(f, "KEYCODE_{code}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Down,
    Up,
}

/// Modifier keys state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
    };

    pub const SHIFT: Modifiers = Modifiers {
        shift: true,
        ..Modifiers::NONE
    };

    pub fn any(&self) -> bool {
        self.shift || self.ctrl || self.alt || self.meta
    }
}

/// A key press or release as reported by the input method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEvent {
    pub key_code: KeyCode,
    pub action: KeyAction,
    pub modifiers: Modifiers,
}

impl KeyEvent {
    pub fn new(key_code: KeyCode, action: KeyAction, modifiers: Modifiers) -> Self {
        Self {
            key_code,
            action,
            modifiers,
        }
    }

    pub fn key_down(key_code: KeyCode) -> Self {
        Self::new(key_code, KeyAction::Down, Modifiers::NONE)
    }

    pub fn key_up(key_code: KeyCode) -> Self {
        Self::new(key_code, KeyAction::Up, Modifiers::NONE)
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    pub fn is_down(&self) -> bool {
        self.action == KeyAction::Down
    }

    pub fn is_shift_pressed(&self) -> bool {
        self.modifiers.shift
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn editing_keys_are_recognised() {
        assert!(KeyCode::ENTER.is_editing_key());
        assert!(KeyCode::FORWARD_DEL.is_editing_key());
        assert!(!KeyCode(29).is_editing_key());
    }

    #[test]
    fn display_names_known_keys() {
        assert_eq!(KeyCode::DEL.to_string(), "DEL");
        assert_eq!(KeyCode(29).to_string(), "KEYCODE_29");
    }

    #[test]
    fn shift_modifier() {
        let event = KeyEvent::key_down(KeyCode::DPAD_LEFT).with_modifiers(Modifiers::SHIFT);
        assert!(event.is_shift_pressed());
        assert!(event.is_down());
        assert!(Modifiers::SHIFT.any());
        assert!(!Modifiers::NONE.any());
    }
}
