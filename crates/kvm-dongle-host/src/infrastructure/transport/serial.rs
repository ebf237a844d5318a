//! Serial link to the dongle.
//!
//! The chip listens at 9600 baud, 8 data bits, no parity, 1 stop bit, no flow
//! control.  Writes block for at most the configured timeout (400 ms by
//! default); a write that does not finish in time is reported as
//! [`TransportError::Timeout`] and is not retried.
//!
//! # Port discovery
//!
//! USB-serial adapters show up under names such as
//! `/dev/tty.usbserial-1420` (macOS) or `/dev/ttyUSB0` (Linux).  When no port
//! is configured, the first available port whose file name starts with the
//! configured prefix is used.

use std::io::{self, Write};
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

use serialport::{DataBits, FlowControl, Parity, SerialPort, StopBits};
use tracing::{debug, info};

use crate::application::forward_input::{PacketSink, TransportError};

/// Line settings for [`SerialTransport::open`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SerialSettings {
    pub baud_rate: u32,
    pub write_timeout: Duration,
}

impl Default for SerialSettings {
    fn default() -> Self {
        Self {
            baud_rate: 9600,
            write_timeout: Duration::from_millis(400),
        }
    }
}

/// An open serial port to the dongle.
pub struct SerialTransport {
    port_name: String,
    write_timeout: Duration,
    port: Mutex<Box<dyn SerialPort>>,
}

impl SerialTransport {
    /// Opens `port_name` with 8-N-1 framing and no flow control.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Open`] if the OS refuses the port.
    pub fn open(port_name: &str, settings: &SerialSettings) -> Result<Self, TransportError> {
        let port = serialport::new(port_name, settings.baud_rate)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .flow_control(FlowControl::None)
            .timeout(settings.write_timeout)
            .open()
            .map_err(|e| TransportError::Open {
                port: port_name.to_string(),
                reason: e.to_string(),
            })?;

        info!(
            port = port_name,
            baud = settings.baud_rate,
            "serial port open (8-N-1, no flow control)"
        );

        Ok(Self {
            port_name: port_name.to_string(),
            write_timeout: settings.write_timeout,
            port: Mutex::new(port),
        })
    }

    pub fn port_name(&self) -> &str {
        &self.port_name
    }

    fn map_write_error(&self, e: io::Error) -> TransportError {
        match e.kind() {
            io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => {
                TransportError::Timeout(self.write_timeout)
            }
            io::ErrorKind::BrokenPipe
            | io::ErrorKind::NotConnected
            | io::ErrorKind::UnexpectedEof => TransportError::Disconnected,
            _ => TransportError::Io(e),
        }
    }
}

impl PacketSink for SerialTransport {
    fn send(&self, bytes: &[u8]) -> Result<(), TransportError> {
        let mut port = self.port.lock().map_err(|_| TransportError::Disconnected)?;
        port.write_all(bytes).map_err(|e| self.map_write_error(e))?;
        port.flush().map_err(|e| self.map_write_error(e))?;
        debug!(port = %self.port_name, len = bytes.len(), "wrote packet");
        Ok(())
    }
}

impl std::fmt::Debug for SerialTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerialTransport")
            .field("port_name", &self.port_name)
            .field("write_timeout", &self.write_timeout)
            .finish()
    }
}

// ── Discovery ─────────────────────────────────────────────────────────────────

/// Names of every serial port the OS reports.
///
/// # Errors
///
/// Returns [`TransportError::Io`] if enumeration itself fails.
pub fn list_ports() -> Result<Vec<String>, TransportError> {
    let ports = serialport::available_ports()
        .map_err(|e| TransportError::Io(io::Error::new(io::ErrorKind::Other, e.to_string())))?;
    Ok(ports.into_iter().map(|p| p.port_name).collect())
}

/// Finds the first available port whose file name starts with `prefix`.
///
/// # Errors
///
/// Returns [`TransportError::NoPortFound`] when nothing matches.
pub fn discover_port(prefix: &str) -> Result<String, TransportError> {
    let ports = list_ports()?;
    debug!(count = ports.len(), prefix, "scanning serial ports");
    select_port(&ports, prefix)
        .map(str::to_string)
        .ok_or_else(|| TransportError::NoPortFound(prefix.to_string()))
}

/// First name in `ports` whose final path component starts with `prefix`.
fn select_port<'a>(ports: &'a [String], prefix: &str) -> Option<&'a str> {
    ports
        .iter()
        .map(String::as_str)
        .find(|name| {
            Path::new(name)
                .file_name()
                .and_then(|f| f.to_str())
                .is_some_and(|f| f.starts_with(prefix))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_default_settings_match_chip_defaults() {
        let settings = SerialSettings::default();
        assert_eq!(settings.baud_rate, 9600);
        assert_eq!(settings.write_timeout, Duration::from_millis(400));
    }

    #[test]
    fn test_select_port_matches_file_name_prefix() {
        // Arrange
        let ports = names(&[
            "/dev/tty.Bluetooth-Incoming-Port",
            "/dev/tty.usbserial-1420",
            "/dev/tty.usbserial-1430",
        ]);

        // Act
        let chosen = select_port(&ports, "tty.usbserial-");

        // Assert: first match wins
        assert_eq!(chosen, Some("/dev/tty.usbserial-1420"));
    }

    #[test]
    fn test_select_port_ignores_directory_components() {
        let ports = names(&["/dev/tty.usbserial-dir/ttyS0"]);
        assert_eq!(select_port(&ports, "tty.usbserial-"), None);
    }

    #[test]
    fn test_select_port_accepts_bare_names() {
        let ports = names(&["COM1", "COM3"]);
        assert_eq!(select_port(&ports, "COM3"), Some("COM3"));
    }

    #[test]
    fn test_select_port_returns_none_without_match() {
        let ports = names(&["/dev/ttyS0"]);
        assert_eq!(select_port(&ports, "ttyUSB"), None);
        assert_eq!(select_port(&[], "ttyUSB"), None);
    }

    #[test]
    fn test_open_missing_port_is_an_open_error() {
        let result = SerialTransport::open("/dev/kvm-dongle-test-no-such-port", &SerialSettings::default());
        assert!(matches!(result, Err(TransportError::Open { .. })));
    }
}
