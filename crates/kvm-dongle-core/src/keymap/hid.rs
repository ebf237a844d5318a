//! USB HID Usage IDs (page 0x07, Keyboard/Keypad page).
//!
//! The dongle's keyboard command carries exactly one of these codes in its
//! `code` byte, plus a separate modifier bitfield.  Modifier keys also have
//! usage IDs of their own (0xE0–0xE7); the input dispatcher uses
//! [`classify`] to tell them apart from ordinary keys.
//!
//! Reference: USB HID Usage Tables 1.3, Section 10 (Keyboard/Keypad page 0x07).
//!
//! # What is a HID Usage ID? (for beginners)
//!
//! The **USB Human Interface Device (HID)** standard assigns a unique number to
//! every key on a keyboard.  These numbers are called *Usage IDs*.  For example:
//!
//! | Key          | HID Usage ID |
//! |--------------|-------------|
//! | Letter A     | 0x04        |
//! | Enter        | 0x28        |
//! | Left Ctrl    | 0xE0        |
//!
//! HID codes represent **physical key positions**, not characters, so the
//! target machine's own keyboard layout decides which character appears.

use crate::domain::modifiers::ModifierKind;

/// Protocol key code: a USB HID Usage ID on the keyboard/keypad page (0x07).
///
/// The numeric value of each variant is the byte written into the `code`
/// field of a keyboard packet.  [`HidKeyCode::Unknown`] (0x00) doubles as the
/// "no key" value of a modifiers-only or key-up packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum HidKeyCode {
    // Letters (HID 0x04–0x1D)
    KeyA = 0x04,
    KeyB = 0x05,
    KeyC = 0x06,
    KeyD = 0x07,
    KeyE = 0x08,
    KeyF = 0x09,
    KeyG = 0x0A,
    KeyH = 0x0B,
    KeyI = 0x0C,
    KeyJ = 0x0D,
    KeyK = 0x0E,
    KeyL = 0x0F,
    KeyM = 0x10,
    KeyN = 0x11,
    KeyO = 0x12,
    KeyP = 0x13,
    KeyQ = 0x14,
    KeyR = 0x15,
    KeyS = 0x16,
    KeyT = 0x17,
    KeyU = 0x18,
    KeyV = 0x19,
    KeyW = 0x1A,
    KeyX = 0x1B,
    KeyY = 0x1C,
    KeyZ = 0x1D,

    // Digits (HID 0x1E–0x27)
    Digit1 = 0x1E,
    Digit2 = 0x1F,
    Digit3 = 0x20,
    Digit4 = 0x21,
    Digit5 = 0x22,
    Digit6 = 0x23,
    Digit7 = 0x24,
    Digit8 = 0x25,
    Digit9 = 0x26,
    Digit0 = 0x27,

    // Control keys (HID 0x28–0x38)
    Enter = 0x28,
    Escape = 0x29,
    Backspace = 0x2A,
    Tab = 0x2B,
    Space = 0x2C,
    Minus = 0x2D,
    Equal = 0x2E,
    BracketLeft = 0x2F,
    BracketRight = 0x30,
    Backslash = 0x31,
    Semicolon = 0x33,
    Quote = 0x34,
    Backquote = 0x35,
    Comma = 0x36,
    Period = 0x37,
    Slash = 0x38,

    // Lock keys
    CapsLock = 0x39,

    // Function keys (HID 0x3A–0x45)
    F1 = 0x3A,
    F2 = 0x3B,
    F3 = 0x3C,
    F4 = 0x3D,
    F5 = 0x3E,
    F6 = 0x3F,
    F7 = 0x40,
    F8 = 0x41,
    F9 = 0x42,
    F10 = 0x43,
    F11 = 0x44,
    F12 = 0x45,

    // Navigation cluster (HID 0x46–0x52)
    PrintScreen = 0x46,
    ScrollLock = 0x47,
    Pause = 0x48,
    Insert = 0x49,
    Home = 0x4A,
    PageUp = 0x4B,
    Delete = 0x4C,
    End = 0x4D,
    PageDown = 0x4E,
    ArrowRight = 0x4F,
    ArrowLeft = 0x50,
    ArrowDown = 0x51,
    ArrowUp = 0x52,

    // Numpad (HID 0x53–0x63)
    NumLock = 0x53,
    NumpadDivide = 0x54,
    NumpadMultiply = 0x55,
    NumpadSubtract = 0x56,
    NumpadAdd = 0x57,
    NumpadEnter = 0x58,
    Numpad1 = 0x59,
    Numpad2 = 0x5A,
    Numpad3 = 0x5B,
    Numpad4 = 0x5C,
    Numpad5 = 0x5D,
    Numpad6 = 0x5E,
    Numpad7 = 0x5F,
    Numpad8 = 0x60,
    Numpad9 = 0x61,
    Numpad0 = 0x62,
    NumpadDecimal = 0x63,

    // Application key (HID 0x65)
    ContextMenu = 0x65,

    // Modifier keys (HID 0xE0–0xE7)
    ControlLeft = 0xE0,
    ShiftLeft = 0xE1,
    AltLeft = 0xE2,
    MetaLeft = 0xE3,
    ControlRight = 0xE4,
    ShiftRight = 0xE5,
    AltRight = 0xE6,
    MetaRight = 0xE7,

    /// Sentinel for keys with no HID mapping.
    Unknown = 0x00,
}

impl HidKeyCode {
    /// Converts a raw protocol byte to a [`HidKeyCode`].
    ///
    /// Returns [`HidKeyCode::Unknown`] if the value is not an assigned key.
    pub fn from_u8(value: u8) -> Self {
        match value {
            0x04 => HidKeyCode::KeyA,
            0x05 => HidKeyCode::KeyB,
            0x06 => HidKeyCode::KeyC,
            0x07 => HidKeyCode::KeyD,
            0x08 => HidKeyCode::KeyE,
            0x09 => HidKeyCode::KeyF,
            0x0A => HidKeyCode::KeyG,
            0x0B => HidKeyCode::KeyH,
            0x0C => HidKeyCode::KeyI,
            0x0D => HidKeyCode::KeyJ,
            0x0E => HidKeyCode::KeyK,
            0x0F => HidKeyCode::KeyL,
            0x10 => HidKeyCode::KeyM,
            0x11 => HidKeyCode::KeyN,
            0x12 => HidKeyCode::KeyO,
            0x13 => HidKeyCode::KeyP,
            0x14 => HidKeyCode::KeyQ,
            0x15 => HidKeyCode::KeyR,
            0x16 => HidKeyCode::KeyS,
            0x17 => HidKeyCode::KeyT,
            0x18 => HidKeyCode::KeyU,
            0x19 => HidKeyCode::KeyV,
            0x1A => HidKeyCode::KeyW,
            0x1B => HidKeyCode::KeyX,
            0x1C => HidKeyCode::KeyY,
            0x1D => HidKeyCode::KeyZ,
            0x1E => HidKeyCode::Digit1,
            0x1F => HidKeyCode::Digit2,
            0x20 => HidKeyCode::Digit3,
            0x21 => HidKeyCode::Digit4,
            0x22 => HidKeyCode::Digit5,
            0x23 => HidKeyCode::Digit6,
            0x24 => HidKeyCode::Digit7,
            0x25 => HidKeyCode::Digit8,
            0x26 => HidKeyCode::Digit9,
            0x27 => HidKeyCode::Digit0,
            0x28 => HidKeyCode::Enter,
            0x29 => HidKeyCode::Escape,
            0x2A => HidKeyCode::Backspace,
            0x2B => HidKeyCode::Tab,
            0x2C => HidKeyCode::Space,
            0x2D => HidKeyCode::Minus,
            0x2E => HidKeyCode::Equal,
            0x2F => HidKeyCode::BracketLeft,
            0x30 => HidKeyCode::BracketRight,
            0x31 => HidKeyCode::Backslash,
            0x33 => HidKeyCode::Semicolon,
            0x34 => HidKeyCode::Quote,
            0x35 => HidKeyCode::Backquote,
            0x36 => HidKeyCode::Comma,
            0x37 => HidKeyCode::Period,
            0x38 => HidKeyCode::Slash,
            0x39 => HidKeyCode::CapsLock,
            0x3A => HidKeyCode::F1,
            0x3B => HidKeyCode::F2,
            0x3C => HidKeyCode::F3,
            0x3D => HidKeyCode::F4,
            0x3E => HidKeyCode::F5,
            0x3F => HidKeyCode::F6,
            0x40 => HidKeyCode::F7,
            0x41 => HidKeyCode::F8,
            0x42 => HidKeyCode::F9,
            0x43 => HidKeyCode::F10,
            0x44 => HidKeyCode::F11,
            0x45 => HidKeyCode::F12,
            0x46 => HidKeyCode::PrintScreen,
            0x47 => HidKeyCode::ScrollLock,
            0x48 => HidKeyCode::Pause,
            0x49 => HidKeyCode::Insert,
            0x4A => HidKeyCode::Home,
            0x4B => HidKeyCode::PageUp,
            0x4C => HidKeyCode::Delete,
            0x4D => HidKeyCode::End,
            0x4E => HidKeyCode::PageDown,
            0x4F => HidKeyCode::ArrowRight,
            0x50 => HidKeyCode::ArrowLeft,
            0x51 => HidKeyCode::ArrowDown,
            0x52 => HidKeyCode::ArrowUp,
            0x53 => HidKeyCode::NumLock,
            0x54 => HidKeyCode::NumpadDivide,
            0x55 => HidKeyCode::NumpadMultiply,
            0x56 => HidKeyCode::NumpadSubtract,
            0x57 => HidKeyCode::NumpadAdd,
            0x58 => HidKeyCode::NumpadEnter,
            0x59 => HidKeyCode::Numpad1,
            0x5A => HidKeyCode::Numpad2,
            0x5B => HidKeyCode::Numpad3,
            0x5C => HidKeyCode::Numpad4,
            0x5D => HidKeyCode::Numpad5,
            0x5E => HidKeyCode::Numpad6,
            0x5F => HidKeyCode::Numpad7,
            0x60 => HidKeyCode::Numpad8,
            0x61 => HidKeyCode::Numpad9,
            0x62 => HidKeyCode::Numpad0,
            0x63 => HidKeyCode::NumpadDecimal,
            0x65 => HidKeyCode::ContextMenu,
            0xE0 => HidKeyCode::ControlLeft,
            0xE1 => HidKeyCode::ShiftLeft,
            0xE2 => HidKeyCode::AltLeft,
            0xE3 => HidKeyCode::MetaLeft,
            0xE4 => HidKeyCode::ControlRight,
            0xE5 => HidKeyCode::ShiftRight,
            0xE6 => HidKeyCode::AltRight,
            0xE7 => HidKeyCode::MetaRight,
            _ => HidKeyCode::Unknown,
        }
    }

    /// Returns the byte written on the wire for this key.
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Returns `true` if this is one of the eight modifier keys.
    pub fn is_modifier(self) -> bool {
        self.modifier_kind().is_some()
    }

    /// Returns the modifier this key stands for, if any.
    pub fn modifier_kind(self) -> Option<ModifierKind> {
        match self {
            HidKeyCode::ControlLeft => Some(ModifierKind::LeftCtrl),
            HidKeyCode::ShiftLeft => Some(ModifierKind::LeftShift),
            HidKeyCode::AltLeft => Some(ModifierKind::LeftAlt),
            HidKeyCode::MetaLeft => Some(ModifierKind::LeftWin),
            HidKeyCode::ControlRight => Some(ModifierKind::RightCtrl),
            HidKeyCode::ShiftRight => Some(ModifierKind::RightShift),
            HidKeyCode::AltRight => Some(ModifierKind::RightAlt),
            HidKeyCode::MetaRight => Some(ModifierKind::RightWin),
            _ => None,
        }
    }
}

/// How the input dispatcher must treat a resolved key code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyClass {
    /// A normal key: reported in the `code` byte, never touches modifier state.
    Ordinary,
    /// One of the eight modifier keys.
    Modifier(ModifierKind),
}

/// Classifies a protocol key code as ordinary or modifier.
pub fn classify(code: HidKeyCode) -> KeyClass {
    match code.modifier_kind() {
        Some(kind) => KeyClass::Modifier(kind),
        None => KeyClass::Ordinary,
    }
}

/// Classifies a raw protocol byte.  Unassigned bytes are [`KeyClass::Ordinary`].
pub fn classify_code(code: u8) -> KeyClass {
    classify(HidKeyCode::from_u8(code))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Representative keys with their expected wire bytes.
    const STANDARD_KEYS: &[(u8, HidKeyCode)] = &[
        (0x04, HidKeyCode::KeyA),
        (0x05, HidKeyCode::KeyB),
        (0x1E, HidKeyCode::Digit1),
        (0x27, HidKeyCode::Digit0),
        (0x28, HidKeyCode::Enter),
        (0x29, HidKeyCode::Escape),
        (0x2A, HidKeyCode::Backspace),
        (0x2B, HidKeyCode::Tab),
        (0x2C, HidKeyCode::Space),
        (0x2E, HidKeyCode::Equal),
        (0x39, HidKeyCode::CapsLock),
        (0x3A, HidKeyCode::F1),
        (0x45, HidKeyCode::F12),
        (0x49, HidKeyCode::Insert),
        (0x4C, HidKeyCode::Delete),
        (0x4F, HidKeyCode::ArrowRight),
        (0x52, HidKeyCode::ArrowUp),
        (0x53, HidKeyCode::NumLock),
        (0x58, HidKeyCode::NumpadEnter),
        (0x62, HidKeyCode::Numpad0),
        (0x65, HidKeyCode::ContextMenu),
        (0xE0, HidKeyCode::ControlLeft),
        (0xE3, HidKeyCode::MetaLeft),
        (0xE4, HidKeyCode::ControlRight),
        (0xE7, HidKeyCode::MetaRight),
    ];

    #[test]
    fn test_from_u8_produces_correct_key_codes_for_standard_keys() {
        for &(raw, expected) in STANDARD_KEYS {
            assert_eq!(
                HidKeyCode::from_u8(raw),
                expected,
                "from_u8(0x{raw:02X}) should produce {expected:?}"
            );
        }
    }

    #[test]
    fn test_as_u8_returns_wire_byte_for_standard_keys() {
        for &(expected_raw, code) in STANDARD_KEYS {
            assert_eq!(code.as_u8(), expected_raw, "{code:?}.as_u8()");
        }
    }

    #[test]
    fn test_unassigned_bytes_return_unknown() {
        for unassigned in [0x00, 0x01, 0x02, 0x03, 0x32, 0x64, 0xA0, 0xE8, 0xFF] {
            assert_eq!(
                HidKeyCode::from_u8(unassigned),
                HidKeyCode::Unknown,
                "0x{unassigned:02X} should map to Unknown"
            );
        }
    }

    #[test]
    fn test_unknown_is_zero_on_the_wire() {
        assert_eq!(HidKeyCode::Unknown.as_u8(), 0x00);
    }

    #[test]
    fn test_modifier_usages_map_to_matching_bit_positions() {
        // Arrange: HID 0xE0..=0xE7 line up with modifier bits 0..=7
        for raw in 0xE0u8..=0xE7 {
            // Act
            let kind = HidKeyCode::from_u8(raw).modifier_kind();

            // Assert
            let kind = kind.unwrap_or_else(|| panic!("0x{raw:02X} should be a modifier"));
            assert_eq!(kind.bit(), raw - 0xE0);
        }
    }

    #[test]
    fn test_classify_separates_modifiers_from_ordinary_keys() {
        assert_eq!(
            classify(HidKeyCode::ShiftRight),
            KeyClass::Modifier(ModifierKind::RightShift)
        );
        assert_eq!(classify(HidKeyCode::KeyA), KeyClass::Ordinary);
        assert_eq!(classify(HidKeyCode::CapsLock), KeyClass::Ordinary);
        assert_eq!(classify(HidKeyCode::Unknown), KeyClass::Ordinary);
    }

    #[test]
    fn test_classify_code_accepts_raw_bytes() {
        assert_eq!(classify_code(0xE2), KeyClass::Modifier(ModifierKind::LeftAlt));
        assert_eq!(classify_code(0x28), KeyClass::Ordinary);
        assert_eq!(classify_code(0xEF), KeyClass::Ordinary);
    }

    #[test]
    fn test_letter_keys_are_contiguous() {
        let letters = [
            HidKeyCode::KeyA, HidKeyCode::KeyB, HidKeyCode::KeyC, HidKeyCode::KeyD,
            HidKeyCode::KeyE, HidKeyCode::KeyF, HidKeyCode::KeyG, HidKeyCode::KeyH,
            HidKeyCode::KeyI, HidKeyCode::KeyJ, HidKeyCode::KeyK, HidKeyCode::KeyL,
            HidKeyCode::KeyM, HidKeyCode::KeyN, HidKeyCode::KeyO, HidKeyCode::KeyP,
            HidKeyCode::KeyQ, HidKeyCode::KeyR, HidKeyCode::KeyS, HidKeyCode::KeyT,
            HidKeyCode::KeyU, HidKeyCode::KeyV, HidKeyCode::KeyW, HidKeyCode::KeyX,
            HidKeyCode::KeyY, HidKeyCode::KeyZ,
        ];
        for (i, &letter) in letters.iter().enumerate() {
            assert_eq!(letter.as_u8(), 0x04 + i as u8, "{letter:?}");
        }
    }
}
