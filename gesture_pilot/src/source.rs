//! Where frames come from.
//!
//! The public interface is [`SourceEvent`] delivered over an `mpsc`
//! channel.  The session does not care whether events came from a replay
//! file or the simulation window.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::{Duration, Instant};

use landmark_signals::{Frame, LandmarkSet};
use serde::Deserialize;
use tracing::{info, warn};

// ════════════════════════════════════════════════════════════════════════════
// SourceEvent
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, PartialEq)]
pub enum SourceEvent {
    /// One processed video frame.  `at` is its offset from the start of the
    /// source, when the source knows it.
    Frame { frame: Frame, at: Option<Duration> },
    SetEnabled(bool),
    ToggleEnabled,
    AdjustSensitivity(f64),
    Quit,
}

// ════════════════════════════════════════════════════════════════════════════
// FrameSource trait
// ════════════════════════════════════════════════════════════════════════════

pub trait FrameSource: Send + 'static {
    fn run(self: Box<Self>, tx: Sender<SourceEvent>);
}

/// Spawn a frame source on its own thread and return the receiving end.
pub fn spawn_frame_source<S: FrameSource>(source: S) -> Receiver<SourceEvent> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || Box::new(source).run(tx));
    rx
}

// ════════════════════════════════════════════════════════════════════════════
// Replay records
// ════════════════════════════════════════════════════════════════════════════

/// One line of a replay file.
///
/// ```text
/// {"type":"set_enabled","enabled":true}
/// {"type":"frame","t":0.033,"hands":[[{"x":0.5,"y":0.4}, ...]],"face":[...]}
/// {"type":"sensitivity","delta":0.1}
/// {"type":"toggle"}
/// {"type":"quit"}
/// ```
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum Record {
    Frame {
        /// Seconds since the start of the recording.
        #[serde(default)]
        t:     Option<f64>,
        #[serde(default)]
        hands: Vec<LandmarkSet>,
        #[serde(default)]
        face:  Option<LandmarkSet>,
        #[serde(default)]
        pose:  Option<LandmarkSet>,
    },
    SetEnabled { enabled: bool },
    Toggle,
    Sensitivity { delta: f64 },
    Quit,
}

/// Parse one replay line.  Blank lines and `#` comments yield `None`.
pub fn parse_record(line: &str) -> Result<Option<SourceEvent>, serde_json::Error> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }
    let event = match serde_json::from_str::<Record>(line)? {
        Record::Frame { t, hands, face, pose } => SourceEvent::Frame {
            frame: Frame { hands, face, pose },
            at:    t.filter(|s| s.is_finite() && *s >= 0.0).map(Duration::from_secs_f64),
        },
        Record::SetEnabled { enabled } => SourceEvent::SetEnabled(enabled),
        Record::Toggle                 => SourceEvent::ToggleEnabled,
        Record::Sensitivity { delta }  => SourceEvent::AdjustSensitivity(delta),
        Record::Quit                   => SourceEvent::Quit,
    };
    Ok(Some(event))
}

// ════════════════════════════════════════════════════════════════════════════
// ReplaySource
// ════════════════════════════════════════════════════════════════════════════

/// Plays back a JSON-lines recording.  Ends with [`SourceEvent::Quit`].
pub struct ReplaySource {
    reader:   Box<dyn BufRead + Send>,
    /// Sleep between frames so they arrive at their recorded offsets.
    realtime: bool,
}

impl ReplaySource {
    pub fn open(path: impl AsRef<Path>, realtime: bool) -> io::Result<Self> {
        let file = File::open(path)?;
        Ok(Self::from_reader(BufReader::new(file), realtime))
    }

    pub fn from_reader<R: BufRead + Send + 'static>(reader: R, realtime: bool) -> Self {
        ReplaySource { reader: Box::new(reader), realtime }
    }
}

impl FrameSource for ReplaySource {
    fn run(self: Box<Self>, tx: Sender<SourceEvent>) {
        let started = Instant::now();
        let mut sent = 0usize;

        for (n, line) in self.reader.lines().enumerate() {
            let line = match line {
                Ok(l) => l,
                Err(e) => {
                    warn!(line = n + 1, error = %e, "replay read failed, stopping");
                    break;
                }
            };
            let event = match parse_record(&line) {
                Ok(Some(ev)) => ev,
                Ok(None) => continue,
                Err(e) => {
                    warn!(line = n + 1, error = %e, "skipping malformed replay line");
                    continue;
                }
            };
            if self.realtime {
                if let SourceEvent::Frame { at: Some(at), .. } = &event {
                    if let Some(wait) = at.checked_sub(started.elapsed()) {
                        thread::sleep(wait);
                    }
                }
            }
            let quit = event == SourceEvent::Quit;
            if tx.send(event).is_err() || quit {
                return;
            }
            sent += 1;
        }
        info!(events = sent, "replay finished");
        let _ = tx.send(SourceEvent::Quit);
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
