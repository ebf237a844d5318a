//! [`PacketSink`](crate::application::forward_input::PacketSink) implementations.
//!
//! - **`serial`** – the real link to the dongle, plus port discovery.
//! - **`dry_run`** – verifies and logs packets instead of sending them.
//! - **`mock`** – records packets in memory for tests.

pub mod dry_run;
pub mod mock;
pub mod serial;

pub use dry_run::LoggingSink;
pub use mock::RecordingSink;
pub use serial::{discover_port, list_ports, SerialSettings, SerialTransport};
