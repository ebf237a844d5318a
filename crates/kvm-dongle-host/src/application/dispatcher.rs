//! Dedicated dispatcher thread.
//!
//! [`ForwardInputUseCase`] owns the modifier state and takes `&mut self`, so
//! exactly one thread may drive it.  Input sources never touch it directly:
//! they send [`InputEvent`]s into a bounded channel and this thread applies
//! them in arrival order.
//!
//! The thread exits when every sender has been dropped and the queue is
//! drained, and returns what it did as [`DispatchStats`].

use std::io;
use std::thread::{self, JoinHandle};

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::forward_input::{DispatchOutcome, ForwardInputUseCase, InputEvent};

/// Capacity of the event channel between input sources and the dispatcher.
pub const EVENT_QUEUE_DEPTH: usize = 64;

/// Counters accumulated by the dispatcher thread.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchStats {
    /// Events received.
    pub events: usize,
    /// Packets handed to the sink.
    pub packets: usize,
    /// Packets the sink rejected.
    pub failed: usize,
    /// Key events with no protocol code.
    pub unmapped: usize,
    /// Clicks on a letterbox bar.
    pub outside_video: usize,
    /// Events rejected before encoding (bad click geometry).
    pub rejected: usize,
}

impl DispatchStats {
    fn record(&mut self, outcome: DispatchOutcome) {
        match outcome {
            DispatchOutcome::Unmapped => self.unmapped += 1,
            DispatchOutcome::Released => {}
            DispatchOutcome::OutsideVideo => self.outside_video += 1,
            DispatchOutcome::Sent { packets, failed } => {
                self.packets += packets;
                self.failed += failed;
            }
        }
    }
}

/// Runs `use_case` on a new thread, fed by `events`.
///
/// # Errors
///
/// Returns the OS error if the thread cannot be spawned.
pub fn spawn_dispatcher(
    mut use_case: ForwardInputUseCase,
    mut events: mpsc::Receiver<InputEvent>,
) -> io::Result<JoinHandle<DispatchStats>> {
    thread::Builder::new()
        .name("kvm-dispatcher".to_string())
        .spawn(move || {
            let mut stats = DispatchStats::default();
            debug!("dispatcher started");

            while let Some(event) = events.blocking_recv() {
                stats.events += 1;
                match use_case.handle(&event) {
                    Ok(outcome) => stats.record(outcome),
                    Err(e) => {
                        stats.rejected += 1;
                        warn!(?event, "event dropped: {e}");
                    }
                }
            }

            info!(
                events = stats.events,
                packets = stats.packets,
                failed = stats.failed,
                "dispatcher finished"
            );
            stats
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::forward_input::{ClickEvent, PacketSink};
    use crate::infrastructure::transport::RecordingSink;
    use kvm_dongle_core::ScancodeTable;
    use std::sync::Arc;

    fn use_case(sink: &Arc<RecordingSink>) -> ForwardInputUseCase {
        ForwardInputUseCase::new(
            Arc::new(ScancodeTable::macos()),
            Arc::clone(sink) as Arc<dyn PacketSink>,
        )
    }

    #[test]
    fn test_dispatcher_applies_events_in_order_and_stops_when_senders_drop() {
        // Arrange
        let sink = Arc::new(RecordingSink::new());
        let (tx, rx) = mpsc::channel(EVENT_QUEUE_DEPTH);
        let handle = spawn_dispatcher(use_case(&sink), rx).unwrap();

        // Act: Shift down, A tap, Shift up
        for event in [
            InputEvent::Key { native: 0x38, pressed: true },
            InputEvent::Key { native: 0x00, pressed: true },
            InputEvent::Key { native: 0x00, pressed: false },
            InputEvent::Key { native: 0x38, pressed: false },
        ] {
            tx.blocking_send(event).unwrap();
        }
        drop(tx);
        let stats = handle.join().unwrap();

        // Assert
        assert_eq!(stats.events, 4);
        assert_eq!(stats.packets, 4);
        let sent = sink.packets();
        assert_eq!((sent[2][5], sent[2][7]), (0x02, 0x04));
    }

    #[test]
    fn test_dispatcher_counts_every_outcome_kind() {
        // Arrange
        let sink = Arc::new(RecordingSink::new());
        let (tx, rx) = mpsc::channel(EVENT_QUEUE_DEPTH);
        let handle = spawn_dispatcher(use_case(&sink), rx).unwrap();
        let click = ClickEvent {
            x: 10.0,
            y: 20.0,
            viewport_width: 640,
            viewport_height: 480,
            video_width: 1920,
            video_height: 1080,
        };
        let bad_click = ClickEvent {
            video_width: 0,
            ..click
        };

        // Act
        tx.blocking_send(InputEvent::Key { native: 0x3F, pressed: true }).unwrap();
        tx.blocking_send(InputEvent::Click(click)).unwrap();
        tx.blocking_send(InputEvent::Click(bad_click)).unwrap();
        drop(tx);
        let stats = handle.join().unwrap();

        // Assert
        assert_eq!(
            stats,
            DispatchStats {
                events: 3,
                packets: 0,
                failed: 0,
                unmapped: 1,
                outside_video: 1,
                rejected: 1,
            }
        );
        assert!(sink.packets().is_empty());
    }
}
