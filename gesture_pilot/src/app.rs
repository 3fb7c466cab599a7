//! Top-level run loop.
//!
//! [`launch`] assembles config, sink, session and frame source from the
//! command-line choices; [`run`] drains source events into the session
//! until the source quits, then shuts the session down.

use std::path::PathBuf;
use std::sync::mpsc::Receiver;
use std::time::Instant;

use actuation::{share, LogSink, SharedSink};
use thiserror::Error;
use tracing::{debug, info};

use crate::config::{ConfigError, ControlConfig};
use crate::session::ControlSession;
use crate::source::{spawn_frame_source, ReplaySource, SourceEvent};

#[derive(Debug, Error)]
pub enum PilotError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("cannot open replay {path}: {source}")]
    Replay { path: PathBuf, source: std::io::Error },
    #[error("this build has no {0} support (rebuild with `--features {0}`)")]
    FeatureMissing(&'static str),
}

// ════════════════════════════════════════════════════════════════════════════
// LaunchOptions
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SourceChoice {
    Replay { path: PathBuf, realtime: bool },
    Sim,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SinkChoice {
    /// Log every action instead of injecting it.
    #[default]
    Log,
    Enigo,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LaunchOptions {
    pub config:  Option<PathBuf>,
    pub source:  SourceChoice,
    pub sink:    SinkChoice,
    /// Start with control enabled.
    pub enabled: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub frames: u64,
    pub events: u64,
    /// Releases the final shutdown sweep had to send.
    pub released_on_shutdown: usize,
}

// ════════════════════════════════════════════════════════════════════════════
// launch / run
// ════════════════════════════════════════════════════════════════════════════

pub fn launch(opts: LaunchOptions) -> Result<RunSummary, PilotError> {
    let cfg = match &opts.config {
        Some(path) => ControlConfig::load(path)?,
        None => ControlConfig::default(),
    };
    let sink = open_sink(opts.sink)?;
    let step = cfg.cursor.sensitivity_step;

    let mut session = ControlSession::new(cfg, sink)?;
    session.set_enabled(opts.enabled);

    let rx = match opts.source {
        SourceChoice::Replay { path, realtime } => {
            let source = ReplaySource::open(&path, realtime)
                .map_err(|source| PilotError::Replay { path: path.clone(), source })?;
            info!(path = %path.display(), realtime, "replaying");
            spawn_frame_source(source)
        }
        SourceChoice::Sim => spawn_sim(step, opts.enabled)?,
    };

    Ok(run(&mut session, rx))
}

/// Feed every event into the session until `Quit` or until the source
/// hangs up.
pub fn run(session: &mut ControlSession, rx: Receiver<SourceEvent>) -> RunSummary {
    let base = Instant::now();
    let mut summary = RunSummary::default();

    for event in rx {
        summary.events += 1;
        match event {
            SourceEvent::Frame { frame, at } => {
                let now = at.map(|d| base + d).unwrap_or_else(Instant::now);
                let report = session.process_frame(&frame, now);
                if report.emitted > 0 {
                    debug!(emitted = report.emitted, locked = report.locked, "frame");
                }
                summary.frames += 1;
            }
            SourceEvent::SetEnabled(on) => {
                session.set_enabled(on);
            }
            SourceEvent::ToggleEnabled => {
                session.toggle();
            }
            SourceEvent::AdjustSensitivity(delta) => {
                session.adjust_sensitivity(delta);
            }
            SourceEvent::Quit => break,
        }
    }

    summary.released_on_shutdown = session.shutdown();
    info!(frames = summary.frames, events = summary.events, "session ended");
    summary
}

fn open_sink(choice: SinkChoice) -> Result<SharedSink, PilotError> {
    match choice {
        SinkChoice::Log => Ok(share(LogSink)),
        #[cfg(feature = "enigo")]
        SinkChoice::Enigo => Ok(share(actuation::EnigoSink::spawn())),
        #[cfg(not(feature = "enigo"))]
        SinkChoice::Enigo => Err(PilotError::FeatureMissing("enigo")),
    }
}

#[cfg(feature = "sim")]
fn spawn_sim(step: f64, enabled: bool) -> Result<Receiver<SourceEvent>, PilotError> {
    Ok(spawn_frame_source(crate::sim::SimWindow::new(step, enabled)))
}

#[cfg(not(feature = "sim"))]
fn spawn_sim(_step: f64, _enabled: bool) -> Result<Receiver<SourceEvent>, PilotError> {
    Err(PilotError::FeatureMissing("sim"))
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
