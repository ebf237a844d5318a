//! Domain entities for the dongle host.
//!
//! Pure logic with no I/O: which modifier keys are held, and where a click on
//! the video preview lands in the target's absolute coordinate space.
//!
//! # What is "domain" in Clean Architecture? (for beginners)
//!
//! The innermost layer holds the rules that make the system what it is.  It
//! has no imports from OS APIs, serial drivers or UI frameworks, so it can be
//! compiled and tested anywhere.  Outer layers (the dispatcher, the serial
//! transport) depend on it; it never depends on them.

/// Held-modifier tracking.
pub mod modifiers;

/// Letterbox-aware click mapping.
///
/// See [`viewport::ViewportGeometry`] for the main type.
pub mod viewport;
