//! Native key code to protocol key code translation.
//!
//! The host's windowing layer reports each key event with a platform-native
//! key identifier.  The dongle expects a USB HID Usage ID.  [`ScancodeTable`]
//! is the bridge between the two: an immutable, direct-index table built once
//! at startup and shared (`Arc<ScancodeTable>`) with whoever dispatches input.
//!
//! The association itself is per host platform.  [`ScancodeTable::macos`] is
//! the built-in table; [`ScancodeTable::from_pairs`] builds any other.

pub mod hid;
pub mod macos_vk;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub use hid::{classify, classify_code, HidKeyCode, KeyClass};

/// Number of native key identifiers a table can hold (0x00–0xFF).
pub const NATIVE_KEY_SPACE: usize = 0x100;

/// Errors raised while building a custom [`ScancodeTable`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum KeymapError {
    /// A native identifier does not fit in the table.
    #[error("native key id 0x{0:X} is outside the table domain (0x00-0xFF)")]
    NativeIdOutOfRange(u32),

    /// The same native identifier was listed twice.
    #[error("native key id 0x{0:X} is mapped more than once")]
    DuplicateNativeId(u32),
}

/// Built-in native key tables, selectable from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeymapKind {
    /// macOS `kVK_*` virtual key codes.
    #[default]
    Macos,
}

impl KeymapKind {
    /// Builds the table this kind names.
    pub fn table(self) -> ScancodeTable {
        match self {
            KeymapKind::Macos => ScancodeTable::macos(),
        }
    }
}

/// Immutable native-key → protocol-key lookup.
///
/// `resolve` is total: every `u32` yields a byte, and 0 means "no mapping".
/// The table is plain data, so it is `Send + Sync` and can be read from any
/// number of event sources at once.
#[derive(Clone, PartialEq, Eq)]
pub struct ScancodeTable {
    codes: [HidKeyCode; NATIVE_KEY_SPACE],
}

impl ScancodeTable {
    /// The macOS table (see [`macos_vk::MACOS_KEYMAP`]).
    pub fn macos() -> Self {
        Self {
            codes: macos_vk::MACOS_TABLE,
        }
    }

    /// Builds a table from `(native id, key)` pairs.
    ///
    /// # Errors
    ///
    /// Returns [`KeymapError::NativeIdOutOfRange`] for ids ≥ 0x100 and
    /// [`KeymapError::DuplicateNativeId`] if an id appears twice.
    pub fn from_pairs(pairs: &[(u32, HidKeyCode)]) -> Result<Self, KeymapError> {
        let mut codes = [HidKeyCode::Unknown; NATIVE_KEY_SPACE];
        let mut assigned = [false; NATIVE_KEY_SPACE];

        for &(native, code) in pairs {
            let index = native as usize;
            if index >= NATIVE_KEY_SPACE {
                return Err(KeymapError::NativeIdOutOfRange(native));
            }
            if assigned[index] {
                return Err(KeymapError::DuplicateNativeId(native));
            }
            assigned[index] = true;
            codes[index] = code;
        }

        debug!(entries = pairs.len(), "built custom scancode table");
        Ok(Self { codes })
    }

    /// Resolves a native key id to the protocol byte; 0 when unmapped.
    pub fn resolve(&self, native_key_id: u32) -> u8 {
        self.lookup(native_key_id).as_u8()
    }

    /// Typed form of [`resolve`](Self::resolve).
    pub fn lookup(&self, native_key_id: u32) -> HidKeyCode {
        usize::try_from(native_key_id)
            .ok()
            .and_then(|index| self.codes.get(index))
            .copied()
            .unwrap_or(HidKeyCode::Unknown)
    }

    /// Number of native ids that resolve to a key.
    pub fn mapped_count(&self) -> usize {
        self.codes
            .iter()
            .filter(|&&code| code != HidKeyCode::Unknown)
            .count()
    }
}

impl std::fmt::Debug for ScancodeTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScancodeTable")
            .field("mapped", &self.mapped_count())
            .finish()
    }
}

/// Expands an association list into a direct-index table at compile time.
///
/// An id outside the table domain is a compile error for `const` callers.
pub(crate) const fn build_table(pairs: &[(u32, HidKeyCode)]) -> [HidKeyCode; NATIVE_KEY_SPACE] {
    let mut table = [HidKeyCode::Unknown; NATIVE_KEY_SPACE];
    let mut i = 0;
    while i < pairs.len() {
        let (native, code) = pairs[i];
        table[native as usize] = code;
        i += 1;
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_macos_table_resolves_letter_keys() {
        // Arrange
        let table = ScancodeTable::macos();

        // Act / Assert
        assert_eq!(table.resolve(0x00), 0x04); // kVK_ANSI_A -> KeyA
        assert_eq!(table.resolve(0x06), 0x1D); // kVK_ANSI_Z -> KeyZ
    }

    #[test]
    fn test_resolve_out_of_domain_returns_zero() {
        let table = ScancodeTable::macos();
        for native in [0x100, 0x1234, u32::MAX] {
            assert_eq!(table.resolve(native), 0, "0x{native:X} must resolve to 0");
        }
    }

    #[test]
    fn test_resolve_unassigned_in_domain_returns_zero() {
        let table = ScancodeTable::macos();
        assert_eq!(table.resolve(0xA0), 0);
        assert_eq!(table.lookup(0xA0), HidKeyCode::Unknown);
    }

    #[test]
    fn test_macos_table_maps_every_listed_key() {
        let table = ScancodeTable::macos();
        assert_eq!(table.mapped_count(), macos_vk::MACOS_KEYMAP.len());
    }

    #[test]
    fn test_from_pairs_builds_swappable_table() {
        // Arrange: a made-up platform where 0x41 is 'A' and 0x11 is Ctrl
        let pairs = [(0x41, HidKeyCode::KeyA), (0x11, HidKeyCode::ControlLeft)];

        // Act
        let table = ScancodeTable::from_pairs(&pairs).unwrap();

        // Assert
        assert_eq!(table.lookup(0x41), HidKeyCode::KeyA);
        assert_eq!(table.lookup(0x11), HidKeyCode::ControlLeft);
        assert_eq!(table.lookup(0x00), HidKeyCode::Unknown);
        assert_eq!(table.mapped_count(), 2);
    }

    #[test]
    fn test_from_pairs_rejects_out_of_range_id() {
        let result = ScancodeTable::from_pairs(&[(0x100, HidKeyCode::KeyA)]);
        assert_eq!(result.unwrap_err(), KeymapError::NativeIdOutOfRange(0x100));
    }

    #[test]
    fn test_from_pairs_rejects_duplicate_id() {
        let result =
            ScancodeTable::from_pairs(&[(0x05, HidKeyCode::KeyA), (0x05, HidKeyCode::KeyB)]);
        assert_eq!(result.unwrap_err(), KeymapError::DuplicateNativeId(0x05));
    }

    #[test]
    fn test_keymap_kind_defaults_to_macos() {
        assert_eq!(KeymapKind::default(), KeymapKind::Macos);
        assert_eq!(KeymapKind::Macos.table(), ScancodeTable::macos());
    }

    #[test]
    fn test_table_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ScancodeTable>();
    }
}
