//! # kvm-dongle-core
//!
//! Input encoding for serial HID-emulation KVM dongles (CH9329-style chips).
//!
//! A host computer shows the target machine's video and forwards its own
//! keyboard and mouse to the target.  It never speaks USB-HID itself: it
//! writes small fixed-size command packets to a serial port, and the chip on
//! the other end replays them as a real keyboard and mouse.
//!
//! This crate is the pure part of that pipeline.  It has no serial, OS, or UI
//! dependencies.
//!
//! # Architecture overview (for beginners)
//!
//! ```text
//! native key id ──► keymap ──► HID code ─┐
//!                                        ├─► protocol ──► packet bytes
//! modifier state (domain::modifiers) ────┘
//!
//! pixel click ──► domain::viewport ──► normalized point ──► protocol ──► packet bytes
//! ```
//!
//! - **`keymap`** – Translates the host platform's native key ids into the
//!   USB HID usage ids the chip expects.  One table per host platform.
//!
//! - **`domain`** – Modifier tracking and the letterbox-aware click mapper.
//!
//! - **`protocol`** – Byte-exact packet builders, the checksum, and a
//!   verifying decoder used for logging and tests.

pub mod domain;
pub mod keymap;
pub mod protocol;

// Re-export the most-used types at the crate root so callers can write
// `kvm_dongle_core::ScancodeTable` instead of the full module path.
pub use domain::modifiers::{ModifierKind, ModifierState};
pub use domain::viewport::{GeometryError, Letterbox, NormalizedPoint, ViewportGeometry};
pub use keymap::{
    classify, classify_code, HidKeyCode, KeyClass, KeymapError, KeymapKind, ScancodeTable,
};
pub use protocol::codec::{
    build_key_down, build_key_up, build_mouse_move, checksum, decode_packet, ProtocolError,
};
pub use protocol::messages::{CommandCode, KeyboardPacket, MousePacket, Packet};
