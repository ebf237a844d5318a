//! Input sources that feed the dispatcher.
//!
//! The window/event-loop side of the host is outside this crate; the
//! `script` source stands in for it by reading events as text, one per line,
//! from a file or standard input.

pub mod script;

pub use script::{forward_lines, parse_line, parse_script, spawn_script_reader, ScriptError};
