//! Infrastructure layer for the dongle host.
//!
//! Contains the adapters around the dispatcher: the serial port, the event
//! script reader, and the configuration file.
//!
//! **Dependency rule**: this layer may depend on `application` and
//! `kvm_dongle_core`, but MUST NOT be imported by the `application` layer.
//!
//! # Sub-modules
//!
//! - **`transport`** – `PacketSink` implementations: `SerialTransport` for the
//!   real dongle, `LoggingSink` for `--dry-run`, `RecordingSink` for tests.
//!   Also serial port discovery.
//!
//! - **`input_source`** – parses the text event script (`key`, `tap`,
//!   `click`) into `InputEvent`s.
//!
//! - **`storage`** – TOML configuration with platform-specific paths.

pub mod input_source;
pub mod storage;
pub mod transport;
