//! macOS virtual key code (`kVK_*`) to protocol key code table.
//!
//! `kVK_*` constants are defined in Carbon `Events.h` (HIToolbox framework) and
//! are what AppKit reports as a key event's native virtual key.  They identify
//! ANSI key *positions*, so `kVK_ANSI_A` is 0x00 and `kVK_ANSI_S` is 0x01.
//!
//! # How this table works
//!
//! [`MACOS_KEYMAP`] is the association list.  At compile time it is expanded
//! into a 256-entry array indexed by the native code (see
//! [`super::ScancodeTable::macos`]), so resolving a key event is a single
//! array index.  Codes missing from the list resolve to
//! [`HidKeyCode::Unknown`].

use super::hid::HidKeyCode;
use super::{build_table, NATIVE_KEY_SPACE};

/// `(kVK code, protocol key code)` pairs for a US-ANSI Mac keyboard.
pub const MACOS_KEYMAP: &[(u32, HidKeyCode)] = &[
    // ── Letters ──────────────────────────────────────────────────────────────
    (0x00, HidKeyCode::KeyA), // kVK_ANSI_A
    (0x0B, HidKeyCode::KeyB), // kVK_ANSI_B
    (0x08, HidKeyCode::KeyC), // kVK_ANSI_C
    (0x02, HidKeyCode::KeyD), // kVK_ANSI_D
    (0x0E, HidKeyCode::KeyE), // kVK_ANSI_E
    (0x03, HidKeyCode::KeyF), // kVK_ANSI_F
    (0x05, HidKeyCode::KeyG), // kVK_ANSI_G
    (0x04, HidKeyCode::KeyH), // kVK_ANSI_H
    (0x22, HidKeyCode::KeyI), // kVK_ANSI_I
    (0x26, HidKeyCode::KeyJ), // kVK_ANSI_J
    (0x28, HidKeyCode::KeyK), // kVK_ANSI_K
    (0x25, HidKeyCode::KeyL), // kVK_ANSI_L
    (0x2E, HidKeyCode::KeyM), // kVK_ANSI_M
    (0x2D, HidKeyCode::KeyN), // kVK_ANSI_N
    (0x1F, HidKeyCode::KeyO), // kVK_ANSI_O
    (0x23, HidKeyCode::KeyP), // kVK_ANSI_P
    (0x0C, HidKeyCode::KeyQ), // kVK_ANSI_Q
    (0x0F, HidKeyCode::KeyR), // kVK_ANSI_R
    (0x01, HidKeyCode::KeyS), // kVK_ANSI_S
    (0x11, HidKeyCode::KeyT), // kVK_ANSI_T
    (0x20, HidKeyCode::KeyU), // kVK_ANSI_U
    (0x09, HidKeyCode::KeyV), // kVK_ANSI_V
    (0x0D, HidKeyCode::KeyW), // kVK_ANSI_W
    (0x07, HidKeyCode::KeyX), // kVK_ANSI_X
    (0x10, HidKeyCode::KeyY), // kVK_ANSI_Y
    (0x06, HidKeyCode::KeyZ), // kVK_ANSI_Z
    // ── Digit row ────────────────────────────────────────────────────────────
    (0x12, HidKeyCode::Digit1), // kVK_ANSI_1
    (0x13, HidKeyCode::Digit2), // kVK_ANSI_2
    (0x14, HidKeyCode::Digit3), // kVK_ANSI_3
    (0x15, HidKeyCode::Digit4), // kVK_ANSI_4
    (0x17, HidKeyCode::Digit5), // kVK_ANSI_5
    (0x16, HidKeyCode::Digit6), // kVK_ANSI_6
    (0x1A, HidKeyCode::Digit7), // kVK_ANSI_7
    (0x1C, HidKeyCode::Digit8), // kVK_ANSI_8
    (0x19, HidKeyCode::Digit9), // kVK_ANSI_9
    (0x1D, HidKeyCode::Digit0), // kVK_ANSI_0
    // ── Control keys ─────────────────────────────────────────────────────────
    (0x24, HidKeyCode::Enter),     // kVK_Return
    (0x35, HidKeyCode::Escape),    // kVK_Escape
    (0x33, HidKeyCode::Backspace), // kVK_Delete
    (0x30, HidKeyCode::Tab),       // kVK_Tab
    (0x31, HidKeyCode::Space),     // kVK_Space
    (0x39, HidKeyCode::CapsLock),  // kVK_CapsLock
    // ── Punctuation ──────────────────────────────────────────────────────────
    (0x1B, HidKeyCode::Minus),        // kVK_ANSI_Minus
    (0x18, HidKeyCode::Equal),        // kVK_ANSI_Equal
    (0x21, HidKeyCode::BracketLeft),  // kVK_ANSI_LeftBracket
    (0x1E, HidKeyCode::BracketRight), // kVK_ANSI_RightBracket
    (0x2A, HidKeyCode::Backslash),    // kVK_ANSI_Backslash
    (0x29, HidKeyCode::Semicolon),    // kVK_ANSI_Semicolon
    (0x27, HidKeyCode::Quote),        // kVK_ANSI_Quote
    (0x32, HidKeyCode::Backquote),    // kVK_ANSI_Grave
    (0x2B, HidKeyCode::Comma),        // kVK_ANSI_Comma
    (0x2F, HidKeyCode::Period),       // kVK_ANSI_Period
    (0x2C, HidKeyCode::Slash),        // kVK_ANSI_Slash
    // ── Function keys ────────────────────────────────────────────────────────
    (0x7A, HidKeyCode::F1),  // kVK_F1
    (0x78, HidKeyCode::F2),  // kVK_F2
    (0x63, HidKeyCode::F3),  // kVK_F3
    (0x76, HidKeyCode::F4),  // kVK_F4
    (0x60, HidKeyCode::F5),  // kVK_F5
    (0x61, HidKeyCode::F6),  // kVK_F6
    (0x62, HidKeyCode::F7),  // kVK_F7
    (0x64, HidKeyCode::F8),  // kVK_F8
    (0x65, HidKeyCode::F9),  // kVK_F9
    (0x6D, HidKeyCode::F10), // kVK_F10
    (0x67, HidKeyCode::F11), // kVK_F11
    (0x6F, HidKeyCode::F12), // kVK_F12
    // ── Navigation cluster ───────────────────────────────────────────────────
    (0x72, HidKeyCode::Insert),     // kVK_Help (Insert position on PC keyboards)
    (0x73, HidKeyCode::Home),       // kVK_Home
    (0x74, HidKeyCode::PageUp),     // kVK_PageUp
    (0x75, HidKeyCode::Delete),     // kVK_ForwardDelete
    (0x77, HidKeyCode::End),        // kVK_End
    (0x79, HidKeyCode::PageDown),   // kVK_PageDown
    (0x7C, HidKeyCode::ArrowRight), // kVK_RightArrow
    (0x7B, HidKeyCode::ArrowLeft),  // kVK_LeftArrow
    (0x7D, HidKeyCode::ArrowDown),  // kVK_DownArrow
    (0x7E, HidKeyCode::ArrowUp),    // kVK_UpArrow
    // ── Keypad ───────────────────────────────────────────────────────────────
    (0x47, HidKeyCode::NumLock),        // kVK_ANSI_KeypadClear
    (0x4B, HidKeyCode::NumpadDivide),   // kVK_ANSI_KeypadDivide
    (0x43, HidKeyCode::NumpadMultiply), // kVK_ANSI_KeypadMultiply
    (0x4E, HidKeyCode::NumpadSubtract), // kVK_ANSI_KeypadMinus
    (0x45, HidKeyCode::NumpadAdd),      // kVK_ANSI_KeypadPlus
    (0x4C, HidKeyCode::NumpadEnter),    // kVK_ANSI_KeypadEnter
    (0x53, HidKeyCode::Numpad1),        // kVK_ANSI_Keypad1
    (0x54, HidKeyCode::Numpad2),        // kVK_ANSI_Keypad2
    (0x55, HidKeyCode::Numpad3),        // kVK_ANSI_Keypad3
    (0x56, HidKeyCode::Numpad4),        // kVK_ANSI_Keypad4
    (0x57, HidKeyCode::Numpad5),        // kVK_ANSI_Keypad5
    (0x58, HidKeyCode::Numpad6),        // kVK_ANSI_Keypad6
    (0x59, HidKeyCode::Numpad7),        // kVK_ANSI_Keypad7
    (0x5B, HidKeyCode::Numpad8),        // kVK_ANSI_Keypad8
    (0x5C, HidKeyCode::Numpad9),        // kVK_ANSI_Keypad9
    (0x52, HidKeyCode::Numpad0),        // kVK_ANSI_Keypad0
    (0x41, HidKeyCode::NumpadDecimal),  // kVK_ANSI_KeypadDecimal
    // ── Modifiers ────────────────────────────────────────────────────────────
    (0x3B, HidKeyCode::ControlLeft),  // kVK_Control
    (0x38, HidKeyCode::ShiftLeft),    // kVK_Shift
    (0x3A, HidKeyCode::AltLeft),      // kVK_Option
    (0x37, HidKeyCode::MetaLeft),     // kVK_Command
    (0x3E, HidKeyCode::ControlRight), // kVK_RightControl
    (0x3C, HidKeyCode::ShiftRight),   // kVK_RightShift
    (0x3D, HidKeyCode::AltRight),     // kVK_RightOption
    (0x36, HidKeyCode::MetaRight),    // kVK_RightCommand
];

/// [`MACOS_KEYMAP`] expanded into a direct-index table.
pub(crate) const MACOS_TABLE: [HidKeyCode; NATIVE_KEY_SPACE] = build_table(MACOS_KEYMAP);

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_keymap_has_no_duplicate_native_codes() {
        let mut seen = HashSet::new();
        for &(native, code) in MACOS_KEYMAP {
            assert!(seen.insert(native), "kVK 0x{native:02X} ({code:?}) listed twice");
        }
    }

    #[test]
    fn test_keymap_never_maps_to_unknown() {
        for &(native, code) in MACOS_KEYMAP {
            assert_ne!(code, HidKeyCode::Unknown, "kVK 0x{native:02X} maps to Unknown");
        }
    }

    #[test]
    fn test_table_agrees_with_association_list() {
        for &(native, code) in MACOS_KEYMAP {
            assert_eq!(MACOS_TABLE[native as usize], code);
        }
    }

    #[test]
    fn test_kvk_ansi_a_is_zero_and_maps_to_key_a() {
        // kVK_ANSI_A = 0x00 is a real key, not the unmapped sentinel
        assert_eq!(MACOS_TABLE[0x00], HidKeyCode::KeyA);
    }

    #[test]
    fn test_all_eight_modifiers_are_present() {
        let modifiers = MACOS_KEYMAP
            .iter()
            .filter(|(_, code)| code.is_modifier())
            .count();
        assert_eq!(modifiers, 8);
    }

    #[test]
    fn test_all_function_keys_are_present() {
        for fkey in [
            HidKeyCode::F1, HidKeyCode::F2, HidKeyCode::F3, HidKeyCode::F4,
            HidKeyCode::F5, HidKeyCode::F6, HidKeyCode::F7, HidKeyCode::F8,
            HidKeyCode::F9, HidKeyCode::F10, HidKeyCode::F11, HidKeyCode::F12,
        ] {
            assert!(
                MACOS_KEYMAP.iter().any(|&(_, code)| code == fkey),
                "{fkey:?} should have a kVK mapping"
            );
        }
    }

    #[test]
    fn test_delete_keys_follow_mac_labelling() {
        // The Mac "delete" key sits where Backspace is; fn+delete is forward delete.
        assert_eq!(MACOS_TABLE[0x33], HidKeyCode::Backspace);
        assert_eq!(MACOS_TABLE[0x75], HidKeyCode::Delete);
    }

    #[test]
    fn test_unlisted_codes_are_unknown() {
        // kVK_Function (0x3F) and kVK_F13 (0x69) have no entry
        assert_eq!(MACOS_TABLE[0x3F], HidKeyCode::Unknown);
        assert_eq!(MACOS_TABLE[0x69], HidKeyCode::Unknown);
        assert_eq!(MACOS_TABLE[0xFF], HidKeyCode::Unknown);
    }
}
