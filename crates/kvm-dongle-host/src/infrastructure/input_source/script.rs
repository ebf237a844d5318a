//! Line-oriented event script parser.
//!
//! # Format
//!
//! ```text
//! # comment; blank lines are ignored
//! key 0x38 down          # native key id, decimal or 0x-hex
//! tap 0                  # down followed by up
//! key 0x38 up
//! click 320 189 640 480 1920 1080   # x y viewport_w viewport_h video_w video_h
//! reset                  # release every held modifier
//! ```
//!
//! Native ids are the host platform's key codes (macOS `kVK_*` values for
//! the built-in table), not HID codes.
//!
//! [`spawn_script_reader`] streams a script (file or stdin) into the
//! dispatcher channel from its own thread.  Bad lines are logged and skipped
//! there; [`parse_script`] is the strict form that stops at the first one.

use std::io::{self, BufRead};
use std::thread;

use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

use crate::application::forward_input::{ClickEvent, InputEvent};

/// A malformed script line.  Line numbers start at 1.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScriptError {
    #[error("line {line}: unknown command {command:?}")]
    UnknownCommand { line: usize, command: String },

    #[error("line {line}: `{command}` takes {expected} arguments, got {got}")]
    WrongArity {
        line: usize,
        command: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("line {line}: invalid {what} {value:?}")]
    InvalidValue {
        line: usize,
        what: &'static str,
        value: String,
    },
}

impl ScriptError {
    /// The 1-based line the error was found on.
    pub fn line(&self) -> usize {
        match self {
            ScriptError::UnknownCommand { line, .. }
            | ScriptError::WrongArity { line, .. }
            | ScriptError::InvalidValue { line, .. } => *line,
        }
    }
}

/// Parses one line into zero or more events.
///
/// Comments and blank lines yield an empty vector; `tap` yields two events.
///
/// # Errors
///
/// Returns [`ScriptError`] tagged with `line_no`.
pub fn parse_line(line_no: usize, line: &str) -> Result<Vec<InputEvent>, ScriptError> {
    let content = line.split_once('#').map_or(line, |(before, _)| before);
    let mut words = content.split_whitespace();
    let Some(command) = words.next() else {
        return Ok(Vec::new());
    };
    let args: Vec<&str> = words.collect();

    match command {
        "key" => {
            expect_arity(line_no, "key", 2, &args)?;
            let native = parse_native(line_no, args[0])?;
            let pressed = match args[1] {
                "down" => true,
                "up" => false,
                other => {
                    return Err(ScriptError::InvalidValue {
                        line: line_no,
                        what: "key direction",
                        value: other.to_string(),
                    })
                }
            };
            Ok(vec![InputEvent::Key { native, pressed }])
        }
        "tap" => {
            expect_arity(line_no, "tap", 1, &args)?;
            let native = parse_native(line_no, args[0])?;
            Ok(vec![
                InputEvent::Key { native, pressed: true },
                InputEvent::Key { native, pressed: false },
            ])
        }
        "reset" => {
            expect_arity(line_no, "reset", 0, &args)?;
            Ok(vec![InputEvent::Reset])
        }
        "click" => {
            expect_arity(line_no, "click", 6, &args)?;
            Ok(vec![InputEvent::Click(ClickEvent {
                x: parse_coord(line_no, args[0])?,
                y: parse_coord(line_no, args[1])?,
                viewport_width: parse_dimension(line_no, args[2])?,
                viewport_height: parse_dimension(line_no, args[3])?,
                video_width: parse_dimension(line_no, args[4])?,
                video_height: parse_dimension(line_no, args[5])?,
            })])
        }
        other => Err(ScriptError::UnknownCommand {
            line: line_no,
            command: other.to_string(),
        }),
    }
}

/// Parses a whole script, stopping at the first bad line.
///
/// # Errors
///
/// Returns the first [`ScriptError`].
pub fn parse_script(text: &str) -> Result<Vec<InputEvent>, ScriptError> {
    let mut events = Vec::new();
    for (index, line) in text.lines().enumerate() {
        events.extend(parse_line(index + 1, line)?);
    }
    Ok(events)
}

/// Reads `reader` line by line and forwards every parsed event to `events`.
///
/// Blocking; run it off the async runtime.  `events` is a weak handle, so
/// the reader never keeps the channel open by itself: once the owner drops
/// the last strong sender, or the receiver goes away, the next line ends the
/// loop.  Malformed lines are logged with `warn!` and skipped.  Returns the
/// number of events forwarded.
///
/// # Errors
///
/// Returns the underlying I/O error if reading fails.
pub fn forward_lines<R: BufRead>(
    reader: R,
    events: &mpsc::WeakSender<InputEvent>,
) -> io::Result<usize> {
    let mut line_no = 0;
    let mut forwarded = 0;

    for line in reader.lines() {
        let line = line?;
        line_no += 1;
        let parsed = match parse_line(line_no, &line) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!("skipping script line: {e}");
                continue;
            }
        };
        let Some(sender) = events.upgrade() else {
            debug!(line = line_no, "event channel closed; stopping");
            return Ok(forwarded);
        };
        for event in parsed {
            if sender.blocking_send(event).is_err() {
                debug!(line = line_no, "event receiver closed; stopping");
                return Ok(forwarded);
            }
            forwarded += 1;
        }
    }

    debug!(lines = line_no, events = forwarded, "script finished");
    Ok(forwarded)
}

/// Runs [`forward_lines`] on a new `kvm-script-reader` thread.
///
/// The returned receiver resolves with the reader's result when input ends.
/// A reader blocked on a read that never completes (an idle terminal) is
/// simply left behind at shutdown; it holds no strong sender, so the
/// dispatcher still drains and exits.
///
/// # Errors
///
/// Returns the OS error if the thread cannot be spawned.
pub fn spawn_script_reader<R>(
    reader: R,
    events: mpsc::WeakSender<InputEvent>,
) -> io::Result<oneshot::Receiver<io::Result<usize>>>
where
    R: BufRead + Send + 'static,
{
    let (done_tx, done_rx) = oneshot::channel();
    thread::Builder::new()
        .name("kvm-script-reader".to_string())
        .spawn(move || {
            // main stops listening once Ctrl+C wins the race.
            let _ = done_tx.send(forward_lines(reader, &events));
        })?;
    Ok(done_rx)
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn expect_arity(
    line: usize,
    command: &'static str,
    expected: usize,
    args: &[&str],
) -> Result<(), ScriptError> {
    if args.len() == expected {
        Ok(())
    } else {
        Err(ScriptError::WrongArity {
            line,
            command,
            expected,
            got: args.len(),
        })
    }
}

fn parse_native(line: usize, word: &str) -> Result<u32, ScriptError> {
    let parsed = match word.strip_prefix("0x").or_else(|| word.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => word.parse(),
    };
    parsed.map_err(|_| ScriptError::InvalidValue {
        line,
        what: "native key id",
        value: word.to_string(),
    })
}

fn parse_coord(line: usize, word: &str) -> Result<f64, ScriptError> {
    word.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| ScriptError::InvalidValue {
            line,
            what: "coordinate",
            value: word.to_string(),
        })
}

fn parse_dimension(line: usize, word: &str) -> Result<u32, ScriptError> {
    word.parse().map_err(|_| ScriptError::InvalidValue {
        line,
        what: "dimension",
        value: word.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufReader, Read};
    use std::sync::mpsc as std_mpsc;

    #[test]
    fn test_key_line_parses_decimal_and_hex() {
        assert_eq!(
            parse_line(1, "key 56 down").unwrap(),
            vec![InputEvent::Key { native: 56, pressed: true }]
        );
        assert_eq!(
            parse_line(1, "key 0x38 up").unwrap(),
            vec![InputEvent::Key { native: 0x38, pressed: false }]
        );
    }

    #[test]
    fn test_tap_expands_to_down_then_up() {
        let events = parse_line(3, "tap 0x00").unwrap();
        assert_eq!(
            events,
            vec![
                InputEvent::Key { native: 0, pressed: true },
                InputEvent::Key { native: 0, pressed: false },
            ]
        );
    }

    #[test]
    fn test_click_line_parses_geometry() {
        // Act
        let events = parse_line(1, "click 320 189.5 640 480 1920 1080").unwrap();

        // Assert
        assert_eq!(
            events,
            vec![InputEvent::Click(ClickEvent {
                x: 320.0,
                y: 189.5,
                viewport_width: 640,
                viewport_height: 480,
                video_width: 1920,
                video_height: 1080,
            })]
        );
    }

    #[test]
    fn test_comments_and_blank_lines_yield_nothing() {
        assert!(parse_line(1, "").unwrap().is_empty());
        assert!(parse_line(1, "   ").unwrap().is_empty());
        assert!(parse_line(1, "# key 0 down").unwrap().is_empty());
        assert_eq!(parse_line(1, "tap 1 # B").unwrap().len(), 2);
    }

    #[test]
    fn test_unknown_command_reports_line() {
        let err = parse_line(7, "press 1").unwrap_err();
        assert_eq!(
            err,
            ScriptError::UnknownCommand {
                line: 7,
                command: "press".to_string(),
            }
        );
        assert_eq!(err.line(), 7);
    }

    #[test]
    fn test_wrong_arity_is_rejected() {
        assert!(matches!(
            parse_line(2, "key 1"),
            Err(ScriptError::WrongArity { line: 2, expected: 2, got: 1, .. })
        ));
        assert!(matches!(
            parse_line(2, "click 1 2 3"),
            Err(ScriptError::WrongArity { expected: 6, got: 3, .. })
        ));
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        assert!(matches!(
            parse_line(1, "key 0xZZ down"),
            Err(ScriptError::InvalidValue { what: "native key id", .. })
        ));
        assert!(matches!(
            parse_line(1, "key 1 sideways"),
            Err(ScriptError::InvalidValue { what: "key direction", .. })
        ));
        assert!(matches!(
            parse_line(1, "click NaN 1 640 480 1920 1080"),
            Err(ScriptError::InvalidValue { what: "coordinate", .. })
        ));
        assert!(matches!(
            parse_line(1, "click 1 1 -640 480 1920 1080"),
            Err(ScriptError::InvalidValue { what: "dimension", .. })
        ));
    }

    #[test]
    fn test_parse_script_collects_events_and_stops_at_first_error() {
        // Arrange
        let good = "# shift+a\nkey 0x38 down\ntap 0\n\nkey 0x38 up\n";
        let bad = "tap 0\nbogus\ntap 1\n";

        // Act
        let events = parse_script(good).unwrap();
        let err = parse_script(bad).unwrap_err();

        // Assert
        assert_eq!(events.len(), 4);
        assert_eq!(err.line(), 2);
    }

    #[test]
    fn test_reset_line_parses_without_arguments() {
        assert_eq!(parse_line(1, "reset").unwrap(), vec![InputEvent::Reset]);
        assert!(matches!(
            parse_line(4, "reset now"),
            Err(ScriptError::WrongArity { line: 4, expected: 0, got: 1, .. })
        ));
    }

    /// Reader fed one chunk at a time; blocks until the next chunk arrives
    /// and reports end of input once the feeding side is dropped.
    struct ChunkReader {
        chunks: std_mpsc::Receiver<Vec<u8>>,
        pending: Vec<u8>,
    }

    impl Read for ChunkReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.pending.is_empty() {
                match self.chunks.recv() {
                    Ok(chunk) => self.pending = chunk,
                    Err(_) => return Ok(0),
                }
            }
            let n = buf.len().min(self.pending.len());
            buf[..n].copy_from_slice(&self.pending[..n]);
            self.pending.drain(..n);
            Ok(n)
        }
    }

    fn chunk_reader() -> (std_mpsc::Sender<Vec<u8>>, BufReader<ChunkReader>) {
        let (feed, chunks) = std_mpsc::channel();
        let reader = ChunkReader {
            chunks,
            pending: Vec::new(),
        };
        (feed, BufReader::new(reader))
    }

    #[test]
    fn test_forward_lines_skips_bad_lines() {
        // Arrange
        let script: &[u8] = b"tap 0\nbogus line\nkey 0x38 down\n";
        let (tx, mut rx) = mpsc::channel(16);

        // Act
        let forwarded = forward_lines(script, &tx.downgrade()).unwrap();
        drop(tx);

        // Assert
        assert_eq!(forwarded, 3);
        let mut received = Vec::new();
        while let Some(event) = rx.blocking_recv() {
            received.push(event);
        }
        assert_eq!(received.len(), 3);
        assert_eq!(received[2], InputEvent::Key { native: 0x38, pressed: true });
    }

    #[test]
    fn test_forward_lines_stops_when_receiver_is_gone() {
        let script: &[u8] = b"tap 0\ntap 1\n";
        let (tx, rx) = mpsc::channel(16);
        drop(rx);

        let forwarded = forward_lines(script, &tx.downgrade()).unwrap();

        assert_eq!(forwarded, 0);
    }

    #[tokio::test]
    async fn test_script_reader_reports_count_at_end_of_input() {
        // Arrange
        let script: &'static [u8] = b"tap 0\n# comment\nreset\n";
        let (tx, mut rx) = mpsc::channel(16);

        // Act
        let done = spawn_script_reader(script, tx.downgrade()).unwrap();
        let forwarded = done.await.unwrap().unwrap();

        // Assert
        assert_eq!(forwarded, 3);
        drop(tx);
        let mut received = Vec::new();
        while let Some(event) = rx.recv().await {
            received.push(event);
        }
        assert_eq!(received.last(), Some(&InputEvent::Reset));
    }

    #[tokio::test]
    async fn test_script_reader_does_not_hold_channel_open() {
        // Arrange: input that stays open, like an idle terminal
        let (feed, reader) = chunk_reader();
        let (tx, mut rx) = mpsc::channel(16);
        let done = spawn_script_reader(reader, tx.downgrade()).unwrap();
        feed.send(b"tap 0\n".to_vec()).unwrap();
        assert!(rx.recv().await.is_some());
        assert!(rx.recv().await.is_some());

        // Act: the owner drops its sender while the reader is still blocked
        drop(tx);

        // Assert: the channel closes without waiting for more input
        assert_eq!(rx.recv().await, None);

        // The next line reaches a closed channel and ends the reader.
        feed.send(b"tap 1\n".to_vec()).unwrap();
        assert_eq!(done.await.unwrap().unwrap(), 2);
    }
}
