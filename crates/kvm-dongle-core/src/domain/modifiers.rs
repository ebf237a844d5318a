//! Modifier key state.
//!
//! The dongle's keyboard packet carries one ordinary key plus a bitfield of
//! held modifiers.  [`ModifierState`] is the host-side record of that
//! bitfield: the dispatcher sets a flag when a modifier goes down, clears it
//! when it comes up, and reads the whole byte when building the packet for an
//! ordinary key.
//!
//! Bit layout (fixed by the chip):
//!
//! ```text
//! bit:   7     6     5      4      3     2     1      0
//!      rwin  ralt  rshift rctrl  lwin  lalt  lshift lctrl
//! ```

/// One of the eight modifier keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModifierKind {
    LeftCtrl,
    LeftShift,
    LeftAlt,
    /// Left Windows / Command / Super.
    LeftWin,
    RightCtrl,
    RightShift,
    RightAlt,
    /// Right Windows / Command / Super.
    RightWin,
}

impl ModifierKind {
    /// All eight modifiers in bit order.
    pub const ALL: [ModifierKind; 8] = [
        ModifierKind::LeftCtrl,
        ModifierKind::LeftShift,
        ModifierKind::LeftAlt,
        ModifierKind::LeftWin,
        ModifierKind::RightCtrl,
        ModifierKind::RightShift,
        ModifierKind::RightAlt,
        ModifierKind::RightWin,
    ];

    /// Bit position of this modifier in the wire bitfield.
    pub const fn bit(self) -> u8 {
        match self {
            ModifierKind::LeftCtrl => 0,
            ModifierKind::LeftShift => 1,
            ModifierKind::LeftAlt => 2,
            ModifierKind::LeftWin => 3,
            ModifierKind::RightCtrl => 4,
            ModifierKind::RightShift => 5,
            ModifierKind::RightAlt => 6,
            ModifierKind::RightWin => 7,
        }
    }

    /// Single-bit mask for this modifier.
    pub const fn mask(self) -> u8 {
        1 << self.bit()
    }
}

/// Which of the eight modifier keys are currently held.
///
/// Starts with everything released.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ModifierState {
    bits: u8,
}

impl ModifierState {
    /// Creates a state with every modifier released.
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `kind` as held or released.  Setting the same value twice is a no-op.
    pub fn set(&mut self, kind: ModifierKind, held: bool) {
        if held {
            self.bits |= kind.mask();
        } else {
            self.bits &= !kind.mask();
        }
    }

    /// Returns `true` if `kind` is currently held.
    pub fn is_held(&self, kind: ModifierKind) -> bool {
        self.bits & kind.mask() != 0
    }

    /// The wire bitfield for the current flags.
    pub fn as_bitfield(&self) -> u8 {
        self.bits
    }

    /// Releases every modifier.
    pub fn clear(&mut self) {
        self.bits = 0;
    }

    /// Iterates over the held modifiers in bit order.
    pub fn held(&self) -> impl Iterator<Item = ModifierKind> + '_ {
        ModifierKind::ALL.into_iter().filter(|&kind| self.is_held(kind))
    }
}
