//! Packet types for the dongle's serial command protocol.
//!
//! Every command starts with the same 5-byte header, carries a fixed-size
//! payload, and ends with a one-byte checksum:
//!
//! ```text
//! Header:        [0x57][0xAB][addr=0x00][cmd][len]
//! Keyboard pkt:  Header(cmd=0x02,len=0x08) [modifier][0x00][code][0x00]*5 [checksum]   -- 14 bytes
//! Mouse pkt:     Header(cmd=0x04,len=0x07) [0x02][button=0x00][x_lo][x_hi][y_lo][y_hi][scroll=0x00][checksum] -- 13 bytes
//! ```
//!
//! Multi-byte fields are little-endian.  Packets are immutable newtypes over
//! fixed arrays: the only way to get one is through the builders in
//! [`super::codec`], which always write the checksum last.

use crate::keymap::hid::HidKeyCode;

/// First magic byte of every packet.
pub const MAGIC_0: u8 = 0x57;
/// Second magic byte of every packet.
pub const MAGIC_1: u8 = 0xAB;
/// Target address; the protocol drives a single chip.
pub const ADDRESS: u8 = 0x00;
/// Size of the shared header.
pub const HEADER_SIZE: usize = 5;

/// Payload length of a keyboard packet (excludes header and checksum).
pub const KEYBOARD_PAYLOAD_LEN: u8 = 8;
/// Payload length of an absolute mouse packet (excludes header and checksum).
pub const MOUSE_ABS_PAYLOAD_LEN: u8 = 7;

/// Total size of a keyboard packet on the wire.
pub const KEYBOARD_PACKET_SIZE: usize = HEADER_SIZE + KEYBOARD_PAYLOAD_LEN as usize + 1;
/// Total size of an absolute mouse packet on the wire.
pub const MOUSE_PACKET_SIZE: usize = HEADER_SIZE + MOUSE_ABS_PAYLOAD_LEN as usize + 1;

/// Sub-mode byte selecting absolute positioning inside a mouse packet.
pub const MOUSE_MODE_ABSOLUTE: u8 = 0x02;
/// Resolution of one absolute axis; positions are `fraction * 4096`.
pub const MOUSE_ABS_RESOLUTION: f64 = 4096.0;
/// Largest encodable absolute coordinate.
pub const MOUSE_ABS_MAX: u16 = 4095;

// Field offsets, shared by the builders and the decoder.
pub(crate) const OFFSET_CMD: usize = 3;
pub(crate) const OFFSET_LEN: usize = 4;
pub(crate) const OFFSET_KB_MODIFIER: usize = HEADER_SIZE;
pub(crate) const OFFSET_KB_CODE: usize = HEADER_SIZE + 2;
pub(crate) const OFFSET_MOUSE_MODE: usize = HEADER_SIZE;
pub(crate) const OFFSET_MOUSE_BUTTON: usize = HEADER_SIZE + 1;
pub(crate) const OFFSET_MOUSE_X: usize = HEADER_SIZE + 2;
pub(crate) const OFFSET_MOUSE_Y: usize = HEADER_SIZE + 4;
pub(crate) const OFFSET_MOUSE_SCROLL: usize = HEADER_SIZE + 6;

/// Command codes understood by the chip.
///
/// Only [`CommandCode::Keyboard`] and [`CommandCode::MouseAbs`] are produced
/// by this crate; the other two are named so the decoder can report them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum CommandCode {
    /// Single-key keyboard report.
    Keyboard = 0x02,
    /// Multimedia / multi-key keyboard report.
    KeyboardMulti = 0x03,
    /// Absolute mouse report.
    MouseAbs = 0x04,
    /// Relative mouse report.
    MouseRel = 0x05,
}

impl CommandCode {
    /// Payload length the chip expects for this command, if this crate knows it.
    pub fn payload_len(self) -> Option<u8> {
        match self {
            CommandCode::Keyboard => Some(KEYBOARD_PAYLOAD_LEN),
            CommandCode::MouseAbs => Some(MOUSE_ABS_PAYLOAD_LEN),
            CommandCode::KeyboardMulti | CommandCode::MouseRel => None,
        }
    }
}

impl TryFrom<u8> for CommandCode {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x02 => Ok(CommandCode::Keyboard),
            0x03 => Ok(CommandCode::KeyboardMulti),
            0x04 => Ok(CommandCode::MouseAbs),
            0x05 => Ok(CommandCode::MouseRel),
            _ => Err(()),
        }
    }
}

/// A 14-byte keyboard report with a valid checksum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyboardPacket(pub(crate) [u8; KEYBOARD_PACKET_SIZE]);

impl KeyboardPacket {
    /// The wire bytes.
    pub fn as_bytes(&self) -> &[u8; KEYBOARD_PACKET_SIZE] {
        &self.0
    }

    /// Modifier bitfield (see [`crate::domain::modifiers`]).
    pub fn modifier(&self) -> u8 {
        self.0[OFFSET_KB_MODIFIER]
    }

    /// Raw key code byte; 0 means no key.
    pub fn code(&self) -> u8 {
        self.0[OFFSET_KB_CODE]
    }

    /// Key code as a [`HidKeyCode`].
    pub fn key(&self) -> HidKeyCode {
        HidKeyCode::from_u8(self.code())
    }

    /// Trailing checksum byte.
    pub fn checksum(&self) -> u8 {
        self.0[KEYBOARD_PACKET_SIZE - 1]
    }

    /// Owned copy of the wire bytes.
    pub fn to_vec(&self) -> Vec<u8> {
        self.0.to_vec()
    }

    /// `true` for the all-clear report (no key, no modifiers).
    pub fn is_release(&self) -> bool {
        self.code() == 0 && self.modifier() == 0
    }
}

impl AsRef<[u8]> for KeyboardPacket {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// A 13-byte absolute mouse report with a valid checksum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MousePacket(pub(crate) [u8; MOUSE_PACKET_SIZE]);

impl MousePacket {
    /// The wire bytes.
    pub fn as_bytes(&self) -> &[u8; MOUSE_PACKET_SIZE] {
        &self.0
    }

    /// Absolute X in `0..=4095`.
    pub fn x(&self) -> u16 {
        u16::from_le_bytes([self.0[OFFSET_MOUSE_X], self.0[OFFSET_MOUSE_X + 1]])
    }

    /// Absolute Y in `0..=4095`.
    pub fn y(&self) -> u16 {
        u16::from_le_bytes([self.0[OFFSET_MOUSE_Y], self.0[OFFSET_MOUSE_Y + 1]])
    }

    /// Button byte; always 0 for packets built by this crate.
    pub fn button(&self) -> u8 {
        self.0[OFFSET_MOUSE_BUTTON]
    }

    /// Scroll byte; always 0 for packets built by this crate.
    pub fn scroll(&self) -> u8 {
        self.0[OFFSET_MOUSE_SCROLL]
    }

    /// Trailing checksum byte.
    pub fn checksum(&self) -> u8 {
        self.0[MOUSE_PACKET_SIZE - 1]
    }

    /// Owned copy of the wire bytes.
    pub fn to_vec(&self) -> Vec<u8> {
        self.0.to_vec()
    }
}

impl AsRef<[u8]> for MousePacket {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Any packet this crate can build or verify.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Packet {
    Keyboard(KeyboardPacket),
    Mouse(MousePacket),
}

impl Packet {
    /// The wire bytes.
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Packet::Keyboard(p) => p.as_ref(),
            Packet::Mouse(p) => p.as_ref(),
        }
    }

    /// Command code in the header.
    pub fn command(&self) -> CommandCode {
        match self {
            Packet::Keyboard(_) => CommandCode::Keyboard,
            Packet::Mouse(_) => CommandCode::MouseAbs,
        }
    }
}

impl From<KeyboardPacket> for Packet {
    fn from(p: KeyboardPacket) -> Self {
        Packet::Keyboard(p)
    }
}

impl From<MousePacket> for Packet {
    fn from(p: MousePacket) -> Self {
        Packet::Mouse(p)
    }
}
