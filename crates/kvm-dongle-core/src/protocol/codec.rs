//! Builders and verifier for dongle packets.
//!
//! Building is pure and infallible: zero-fill a fixed array, write each field
//! at its offset, then compute the checksum over everything before the last
//! byte.  Nothing here allocates or performs I/O.
//!
//! [`decode_packet`] goes the other way.  The chip never talks back in this
//! protocol subset, so decoding is only used to check bytes before they are
//! logged or after they were captured in tests.

use thiserror::Error;

use crate::domain::viewport::NormalizedPoint;
use crate::protocol::messages::{
    CommandCode, KeyboardPacket, MousePacket, Packet, ADDRESS, HEADER_SIZE,
    KEYBOARD_PACKET_SIZE, KEYBOARD_PAYLOAD_LEN, MAGIC_0, MAGIC_1, MOUSE_ABS_MAX,
    MOUSE_ABS_PAYLOAD_LEN, MOUSE_ABS_RESOLUTION, MOUSE_MODE_ABSOLUTE, MOUSE_PACKET_SIZE,
    OFFSET_CMD, OFFSET_KB_CODE, OFFSET_KB_MODIFIER, OFFSET_LEN, OFFSET_MOUSE_MODE,
    OFFSET_MOUSE_X, OFFSET_MOUSE_Y,
};

/// Errors reported when verifying a byte buffer as a packet.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProtocolError {
    /// Fewer bytes than the header or the declared packet needs.
    #[error("insufficient data: need at least {needed} bytes, got {available}")]
    InsufficientData { needed: usize, available: usize },

    /// The first two bytes are not `57 AB`.
    #[error("bad magic bytes: {0:02X} {1:02X}")]
    BadMagic(u8, u8),

    /// The address byte is not 0.
    #[error("unexpected target address: 0x{0:02X}")]
    BadAddress(u8),

    /// The command byte is not a known command.
    #[error("unknown command: 0x{0:02X}")]
    UnknownCommand(u8),

    /// The command is known but not one this crate builds.
    #[error("unsupported command: {0:?}")]
    UnsupportedCommand(CommandCode),

    /// The length byte does not match the command.
    #[error("length mismatch for {command:?}: header says {declared}, expected {expected}")]
    LengthMismatch {
        command: CommandCode,
        declared: u8,
        expected: u8,
    },

    /// The trailing byte is not the sum of the preceding bytes.
    #[error("checksum mismatch: computed 0x{expected:02X}, packet has 0x{actual:02X}")]
    ChecksumMismatch { expected: u8, actual: u8 },

    /// More bytes follow the packet.
    #[error("{0} trailing bytes after packet")]
    TrailingBytes(usize),
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Mod-256 sum of `bytes`.
///
/// # Examples
///
/// ```rust
/// use kvm_dongle_core::protocol::checksum;
///
/// assert_eq!(checksum(&[0x57, 0xAB]), 0x02);
/// assert_eq!(checksum(&[]), 0);
/// ```
pub fn checksum(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0u8, |sum, &b| sum.wrapping_add(b))
}

/// Builds a keyboard report pressing `code` with `modifiers` held.
///
/// `code = 0` is a valid "modifiers only" report.
///
/// # Examples
///
/// ```rust
/// use kvm_dongle_core::protocol::build_key_down;
///
/// let pkt = build_key_down(0x04, 0x02); // Shift + A
/// assert_eq!(&pkt.as_bytes()[..5], &[0x57, 0xAB, 0x00, 0x02, 0x08]);
/// assert_eq!(pkt.code(), 0x04);
/// assert_eq!(pkt.modifier(), 0x02);
/// ```
pub fn build_key_down(code: u8, modifiers: u8) -> KeyboardPacket {
    let mut buf = [0u8; KEYBOARD_PACKET_SIZE];
    write_header(&mut buf, CommandCode::Keyboard, KEYBOARD_PAYLOAD_LEN);
    buf[OFFSET_KB_MODIFIER] = modifiers;
    buf[OFFSET_KB_CODE] = code;
    seal(&mut buf);
    KeyboardPacket(buf)
}

/// Builds the all-clear report: no key, no modifiers.
///
/// Identical to `build_key_down(0, 0)`.
pub fn build_key_up() -> KeyboardPacket {
    build_key_down(0, 0)
}

/// Builds an absolute mouse report positioned at `point`.
///
/// Each axis is scaled by 4096 and truncated.  An axis of exactly 1.0 would
/// scale to 4096, so it is saturated to 4095.
///
/// # Examples
///
/// ```rust
/// use kvm_dongle_core::domain::viewport::NormalizedPoint;
/// use kvm_dongle_core::protocol::build_mouse_move;
///
/// let pkt = build_mouse_move(NormalizedPoint::new(0.5, 0.25).unwrap());
/// assert_eq!((pkt.x(), pkt.y()), (2048, 1024));
/// ```
pub fn build_mouse_move(point: NormalizedPoint) -> MousePacket {
    let mut buf = [0u8; MOUSE_PACKET_SIZE];
    write_header(&mut buf, CommandCode::MouseAbs, MOUSE_ABS_PAYLOAD_LEN);
    buf[OFFSET_MOUSE_MODE] = MOUSE_MODE_ABSOLUTE;
    // button and scroll stay zero
    buf[OFFSET_MOUSE_X..OFFSET_MOUSE_X + 2].copy_from_slice(&scale_axis(point.x()).to_le_bytes());
    buf[OFFSET_MOUSE_Y..OFFSET_MOUSE_Y + 2].copy_from_slice(&scale_axis(point.y()).to_le_bytes());
    seal(&mut buf);
    MousePacket(buf)
}

/// Verifies `bytes` as exactly one packet.
///
/// # Errors
///
/// Returns [`ProtocolError`] describing the first check that failed.
pub fn decode_packet(bytes: &[u8]) -> Result<Packet, ProtocolError> {
    if bytes.len() < HEADER_SIZE {
        return Err(ProtocolError::InsufficientData {
            needed: HEADER_SIZE,
            available: bytes.len(),
        });
    }
    if bytes[0] != MAGIC_0 || bytes[1] != MAGIC_1 {
        return Err(ProtocolError::BadMagic(bytes[0], bytes[1]));
    }
    if bytes[2] != ADDRESS {
        return Err(ProtocolError::BadAddress(bytes[2]));
    }

    let raw_cmd = bytes[OFFSET_CMD];
    let command =
        CommandCode::try_from(raw_cmd).map_err(|_| ProtocolError::UnknownCommand(raw_cmd))?;
    let expected = command
        .payload_len()
        .ok_or(ProtocolError::UnsupportedCommand(command))?;
    let declared = bytes[OFFSET_LEN];
    if declared != expected {
        return Err(ProtocolError::LengthMismatch {
            command,
            declared,
            expected,
        });
    }

    let total = HEADER_SIZE + usize::from(expected) + 1;
    if bytes.len() < total {
        return Err(ProtocolError::InsufficientData {
            needed: total,
            available: bytes.len(),
        });
    }
    if bytes.len() > total {
        return Err(ProtocolError::TrailingBytes(bytes.len() - total));
    }

    let computed = checksum(&bytes[..total - 1]);
    let actual = bytes[total - 1];
    if computed != actual {
        return Err(ProtocolError::ChecksumMismatch {
            expected: computed,
            actual,
        });
    }

    match command {
        CommandCode::Keyboard => {
            let mut buf = [0u8; KEYBOARD_PACKET_SIZE];
            buf.copy_from_slice(bytes);
            Ok(Packet::Keyboard(KeyboardPacket(buf)))
        }
        CommandCode::MouseAbs => {
            let mut buf = [0u8; MOUSE_PACKET_SIZE];
            buf.copy_from_slice(bytes);
            Ok(Packet::Mouse(MousePacket(buf)))
        }
        other => Err(ProtocolError::UnsupportedCommand(other)),
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn write_header(buf: &mut [u8], command: CommandCode, payload_len: u8) {
    buf[0] = MAGIC_0;
    buf[1] = MAGIC_1;
    buf[2] = ADDRESS;
    buf[OFFSET_CMD] = command as u8;
    buf[OFFSET_LEN] = payload_len;
}

/// Writes the checksum into the last byte.  Must run after every other field.
fn seal(buf: &mut [u8]) {
    let last = buf.len() - 1;
    buf[last] = checksum(&buf[..last]);
}

fn scale_axis(value: f64) -> u16 {
    // `as` saturates for floats, and NormalizedPoint keeps value in [0, 1]
    ((value * MOUSE_ABS_RESOLUTION) as u16).min(MOUSE_ABS_MAX)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
