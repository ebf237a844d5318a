//! kvm-dongle-host library entry point.
//!
//! Re-exports all public modules so that integration tests in `tests/`
//! and the binary entry point in `main.rs` share the same module tree.
//!
//! # What does kvm-dongle-host do? (for beginners)
//!
//! A KVM dongle is a small USB-serial device with a HID-emulation chip on
//! the far side.  The target machine sees the chip as a real keyboard and
//! mouse; the host sees a serial port.  This crate is the host half:
//!
//! 1. Receives input events: key transitions identified by the host's native
//!    key id, and clicks inside the window that shows the target's video.
//! 2. Translates keys to HID codes and tracks which modifiers are held.
//! 3. Maps clicks through the letterbox to absolute target coordinates.
//! 4. Writes the resulting packets to the serial port.
//!
//! Steps 2 and 3 are `kvm-dongle-core`; this crate wires them to real I/O.

/// Application layer: the input forwarding use case and the sink contract.
pub mod application;

/// Infrastructure layer: serial transport, input sources, configuration.
pub mod infrastructure;
