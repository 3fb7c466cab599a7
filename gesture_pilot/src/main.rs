//! gesture_pilot: command-line entry point.

use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::Parser;
use gesture_pilot::app::{launch, LaunchOptions, SinkChoice, SourceChoice};
use gesture_pilot::config::ControlConfig;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "gesture_pilot", version, about = "Drive keyboard and mouse from hand, face and pose landmarks")]
struct Cli {
    /// JSON tuning file; missing fields keep their defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Replay a JSON-lines landmark recording.
    #[arg(long, conflicts_with = "sim")]
    replay: Option<PathBuf>,

    /// Pace the replay at its recorded timestamps.
    #[arg(long, requires = "replay")]
    realtime: bool,

    /// Open the keyboard and mouse simulation window (feature `sim`).
    #[arg(long)]
    sim: bool,

    /// Inject into the OS instead of logging (feature `enigo`).
    #[arg(long)]
    enigo: bool,

    /// Start with control enabled.
    #[arg(long)]
    enabled: bool,

    /// Print the default configuration as JSON and exit.
    #[arg(long)]
    print_config: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("gesture_pilot=info,actuation=info")),
        )
        .init();

    let cli = Cli::parse();

    if cli.print_config {
        let text = serde_json::to_string_pretty(&ControlConfig::default())
            .context("serializing default config")?;
        println!("{}", text);
        return Ok(());
    }

    let source = match (cli.replay, cli.sim) {
        (Some(path), _) => SourceChoice::Replay { path, realtime: cli.realtime },
        (None, true)    => SourceChoice::Sim,
        (None, false)   => bail!("no frame source: pass --replay <file> or --sim"),
    };

    let opts = LaunchOptions {
        config:  cli.config,
        source,
        sink:    if cli.enigo { SinkChoice::Enigo } else { SinkChoice::Log },
        enabled: cli.enabled,
    };

    let summary = launch(opts).context("gesture pilot failed")?;
    println!(
        "  {} frames, {} events, {} releases on shutdown",
        summary.frames, summary.events, summary.released_on_shutdown
    );
    Ok(())
}
