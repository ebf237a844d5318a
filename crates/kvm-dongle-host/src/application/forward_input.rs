//! ForwardInputUseCase: turns host key presses and clicks into dongle packets.
//!
//! This use case sits at the application layer and delegates the actual byte
//! transmission to a [`PacketSink`] trait object.  The serial implementation
//! is in the infrastructure layer.
//!
//! # Key handling (for beginners)
//!
//! The chip only understands "this is the keyboard state right now" reports.
//! Every host key-down is therefore sent as a complete tap:
//!
//! 1. a report with the key and the modifiers that were held *before* it,
//! 2. an all-clear report.
//!
//! Only after both are sent is a modifier key recorded as held, so pressing
//! Shift and then A produces `Shift(down) clear A+Shift clear`.  A key-up
//! sends nothing; it only releases a modifier flag.
//!
//! # Threading
//!
//! The use case owns its [`ModifierState`] and takes `&mut self`, so it must be
//! driven from one place.  The binary runs it on a dedicated thread and feeds
//! it through a channel.

use std::sync::Arc;
use std::time::Duration;

use kvm_dongle_core::{
    build_key_down, build_key_up, build_mouse_move, classify_code, GeometryError, KeyClass,
    ModifierState, ScancodeTable, ViewportGeometry,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, trace, warn};

/// Error type for packet transmission.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The serial port could not be opened.
    #[error("failed to open serial port {port}: {reason}")]
    Open { port: String, reason: String },

    /// A write did not complete within the configured timeout.
    #[error("write timed out after {0:?}")]
    Timeout(Duration),

    /// Any other I/O failure while writing.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The port went away (device unplugged, handle closed).
    #[error("transport disconnected")]
    Disconnected,

    /// Discovery found no port with the configured name prefix.
    #[error("no serial port name starts with {0:?}")]
    NoPortFound(String),
}

/// Destination for encoded packets.
///
/// `send` must transmit the whole buffer or fail.  Implementations report
/// failures and never retry; the dispatcher decides what a failure means.
#[cfg_attr(test, mockall::automock)]
pub trait PacketSink: Send + Sync {
    /// Transmits one complete packet.
    fn send(&self, bytes: &[u8]) -> Result<(), TransportError>;
}

/// A click inside the video viewport, with the geometry it was made against.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClickEvent {
    /// Pixel position inside the viewport.
    pub x: f64,
    pub y: f64,
    /// Current viewport size in pixels.
    pub viewport_width: u32,
    pub viewport_height: u32,
    /// Native size of the video being shown.
    pub video_width: u32,
    pub video_height: u32,
}

/// One event from an input source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// A key identified by the host platform's native key id.
    Key { native: u32, pressed: bool },
    /// A mouse click inside the viewport.
    Click(ClickEvent),
    /// Forget every held modifier, e.g. when the input window loses focus.
    Reset,
}

/// What the key-up report that follows every key-down carries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyUpPolicy {
    /// All-zero report: no key, no modifiers.
    #[default]
    ClearAll,
    /// No key, but the same modifier bitfield as the key-down report.
    CarryModifiers,
}

/// Result of handling one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The native key id has no protocol code; nothing was sent.
    Unmapped,
    /// Modifier state was updated (key-up or reset); nothing was sent.
    Released,
    /// The click landed on a letterbox bar; nothing was sent.
    OutsideVideo,
    /// `packets` were handed to the sink and `failed` of them were rejected.
    Sent { packets: usize, failed: usize },
}

/// Error type for event dispatch.
#[derive(Debug, Error)]
pub enum ForwardError {
    #[error("invalid click geometry: {0}")]
    Geometry(#[from] GeometryError),
}

/// The Forward Input use case.
pub struct ForwardInputUseCase {
    keymap: Arc<ScancodeTable>,
    modifiers: ModifierState,
    key_up_policy: KeyUpPolicy,
    sink: Arc<dyn PacketSink>,
}

impl ForwardInputUseCase {
    /// Creates a use case with every modifier released and the default
    /// key-up policy.
    pub fn new(keymap: Arc<ScancodeTable>, sink: Arc<dyn PacketSink>) -> Self {
        Self {
            keymap,
            modifiers: ModifierState::new(),
            key_up_policy: KeyUpPolicy::default(),
            sink,
        }
    }

    /// Replaces the key-up policy.
    pub fn with_key_up_policy(mut self, policy: KeyUpPolicy) -> Self {
        self.key_up_policy = policy;
        self
    }

    /// Current modifier state.
    pub fn modifiers(&self) -> ModifierState {
        self.modifiers
    }

    /// Handles one key transition.
    ///
    /// On key-down two packets are always attempted, down then up, even if
    /// the first one fails.  The modifier flag for the key (if it is a
    /// modifier) is set only after both sends.
    pub fn handle_key(&mut self, native: u32, pressed: bool) -> DispatchOutcome {
        let code = self.keymap.resolve(native);
        if code == 0 {
            trace!(native, "no protocol code for native key");
            return DispatchOutcome::Unmapped;
        }
        let class = classify_code(code);

        if !pressed {
            if let KeyClass::Modifier(kind) = class {
                self.modifiers.set(kind, false);
                trace!(?kind, bits = self.modifiers.as_bitfield(), "modifier released");
            }
            return DispatchOutcome::Released;
        }

        let held = self.modifiers.as_bitfield();
        let down = build_key_down(code, held);
        let up = match self.key_up_policy {
            KeyUpPolicy::ClearAll => build_key_up(),
            KeyUpPolicy::CarryModifiers => build_key_down(0, held),
        };

        let mut failed = 0;
        for bytes in [down.as_bytes(), up.as_bytes()] {
            if !self.transmit(bytes, "keyboard") {
                failed += 1;
            }
        }

        if let KeyClass::Modifier(kind) = class {
            self.modifiers.set(kind, true);
            trace!(?kind, bits = self.modifiers.as_bitfield(), "modifier held");
        }

        DispatchOutcome::Sent { packets: 2, failed }
    }

    /// Handles a click: maps it through the letterbox and sends one absolute
    /// mouse packet if it landed on the video.
    ///
    /// # Errors
    ///
    /// Returns [`ForwardError::Geometry`] if any dimension in `click` is zero.
    pub fn handle_click(&mut self, click: &ClickEvent) -> Result<DispatchOutcome, ForwardError> {
        let geometry = ViewportGeometry::new(
            click.viewport_width,
            click.viewport_height,
            click.video_width,
            click.video_height,
        )?;

        let Some(point) = geometry.map_click(click.x, click.y) else {
            debug!(x = click.x, y = click.y, "click outside video content");
            return Ok(DispatchOutcome::OutsideVideo);
        };

        let packet = build_mouse_move(point);
        let failed = usize::from(!self.transmit(packet.as_bytes(), "mouse"));
        Ok(DispatchOutcome::Sent { packets: 1, failed })
    }

    /// Routes `event` to [`handle_key`](Self::handle_key),
    /// [`handle_click`](Self::handle_click) or [`reset`](Self::reset).
    ///
    /// # Errors
    ///
    /// Propagates [`ForwardError`] from click handling.
    pub fn handle(&mut self, event: &InputEvent) -> Result<DispatchOutcome, ForwardError> {
        match event {
            InputEvent::Key { native, pressed } => Ok(self.handle_key(*native, *pressed)),
            InputEvent::Click(click) => self.handle_click(click),
            InputEvent::Reset => {
                self.reset();
                Ok(DispatchOutcome::Released)
            }
        }
    }

    /// Releases every modifier without sending anything.
    pub fn reset(&mut self) {
        self.modifiers.clear();
    }

    /// Sends `bytes`, logging the result.  Returns `true` on success.
    fn transmit(&self, bytes: &[u8], kind: &'static str) -> bool {
        match self.sink.send(bytes) {
            Ok(()) => {
                debug!(kind, bytes = ?bytes, "packet sent");
                true
            }
            Err(e) => {
                warn!(kind, "packet not delivered: {e}");
                false
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
