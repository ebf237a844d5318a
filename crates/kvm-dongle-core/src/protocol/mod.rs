//! Protocol module containing packet types and the binary codec.

pub mod codec;
pub mod messages;

pub use codec::{
    build_key_down, build_key_up, build_mouse_move, checksum, decode_packet, ProtocolError,
};
pub use messages::*;
