//! Dry-run sink: verifies each packet and logs it instead of writing it.
//!
//! Useful for checking a key table or an event script without a dongle
//! attached.  Every packet is run through
//! [`decode_packet`](kvm_dongle_core::decode_packet), so a malformed buffer is
//! reported as an error exactly where the serial sink would have sent it.

use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};

use kvm_dongle_core::{decode_packet, Packet};
use tracing::info;

use crate::application::forward_input::{PacketSink, TransportError};

/// Logs packets at `info` level.
#[derive(Debug, Default)]
pub struct LoggingSink {
    sent: AtomicUsize,
}

impl LoggingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of packets accepted so far.
    pub fn sent(&self) -> usize {
        self.sent.load(Ordering::Relaxed)
    }
}

impl PacketSink for LoggingSink {
    fn send(&self, bytes: &[u8]) -> Result<(), TransportError> {
        let packet = decode_packet(bytes)
            .map_err(|e| TransportError::Io(io::Error::new(io::ErrorKind::InvalidData, e)))?;

        match packet {
            Packet::Keyboard(kb) => info!(
                modifiers = %format!("{:08b}", kb.modifier()),
                code = %format!("0x{:02X}", kb.code()),
                key = ?kb.key(),
                "dry-run keyboard packet"
            ),
            Packet::Mouse(m) => info!(x = m.x(), y = m.y(), "dry-run mouse packet"),
        }
        self.sent.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}
