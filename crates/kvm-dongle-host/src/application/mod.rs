//! Application layer: use cases for the dongle host.
//!
//! Use cases here depend only on `kvm-dongle-core` and on the [`PacketSink`]
//! trait they declare.  The serial port, the dry-run logger, and the test
//! recorders live in `infrastructure` and are handed in as trait objects.
//!
//! [`PacketSink`]: forward_input::PacketSink

pub mod dispatcher;
pub mod forward_input;
