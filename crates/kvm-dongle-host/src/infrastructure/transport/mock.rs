//! Recording packet sink for tests.
//!
//! `RecordingSink` keeps every packet it is handed in a `Mutex<Vec<...>>` so
//! tests can assert on exactly what was sent and in what order.
//!
//! # `should_fail` flag
//!
//! Set `should_fail = true` to make every `send` return
//! [`TransportError::Disconnected`].  Failed sends are not recorded but are
//! counted in `attempts`.

use std::sync::{Mutex, MutexGuard};

use crate::application::forward_input::{PacketSink, TransportError};

/// A sink that records packets instead of transmitting them.
#[derive(Debug, Default)]
pub struct RecordingSink {
    sent: Mutex<Vec<Vec<u8>>>,
    attempts: Mutex<usize>,
    /// When `true`, every `send` fails.
    pub should_fail: bool,
}

impl RecordingSink {
    /// Creates an empty sink with `should_fail = false`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a sink whose every `send` fails.
    pub fn failing() -> Self {
        Self {
            should_fail: true,
            ..Self::default()
        }
    }

    /// Snapshot of every successfully sent packet, oldest first.
    pub fn packets(&self) -> Vec<Vec<u8>> {
        lock(&self.sent).clone()
    }

    /// Number of `send` calls, successful or not.
    pub fn attempts(&self) -> usize {
        *lock(&self.attempts)
    }

    /// Forgets everything recorded so far.
    pub fn clear(&self) {
        lock(&self.sent).clear();
        *lock(&self.attempts) = 0;
    }
}

impl PacketSink for RecordingSink {
    fn send(&self, bytes: &[u8]) -> Result<(), TransportError> {
        *lock(&self.attempts) += 1;
        if self.should_fail {
            return Err(TransportError::Disconnected);
        }
        lock(&self.sent).push(bytes.to_vec());
        Ok(())
    }
}

// A panicking test thread must not hide what was recorded before it.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
