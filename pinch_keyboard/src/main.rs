//! pinch_keyboard — interactive entry point.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pinch_keyboard::app::{run, SourceKind};
use pinch_keyboard::config::AppConfig;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum SourceArg {
    Detector,
    Stdin,
    Replay,
    Sim,
    #[cfg(feature = "leap")]
    Leap,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Pretty,
    Compact,
    Json,
}

/// Command-line arguments for pinch_keyboard
#[derive(Parser, Debug)]
#[command(name = "pinch_keyboard")]
#[command(version, about = "Hand-gesture on-screen keyboard", long_about = None)]
struct Args {
    /// Configuration file (TOML)
    #[arg(short, long, env = "PINCH_KEYBOARD_CONFIG")]
    config: Option<PathBuf>,

    /// Where hand landmarks come from
    #[arg(short, long, value_enum, default_value_t = SourceArg::Detector)]
    source: SourceArg,

    /// Recorded NDJSON session (with `--source replay`)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Detector executable, overriding `[detector] command`
    #[arg(long, env = "PINCH_DETECTOR_CMD")]
    detector_cmd: Option<String>,

    /// Pinch threshold in normalized image units
    #[arg(long)]
    pinch_threshold: Option<f32>,

    /// Hover dwell reported after this many milliseconds
    #[arg(long)]
    dwell_ms: Option<u64>,

    /// Do not mirror the cursor horizontally
    #[arg(long)]
    no_mirror: bool,

    /// Disable audio cues
    #[arg(long)]
    mute: bool,

    /// Preferred MIDI output port (substring match)
    #[arg(long, env = "PINCH_MIDI_PORT")]
    midi_port: Option<String>,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    dump_config: bool,

    /// Verbose logging (can be specified multiple times)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Log format
    #[arg(long, value_enum, default_value_t = LogFormat::Pretty)]
    log_format: LogFormat,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args);

    let cfg = load_config(&args)?;
    if args.dump_config {
        print!("{}", toml::to_string(&cfg).context("serializing config")?);
        return Ok(());
    }

    let kind = match args.source {
        SourceArg::Detector => SourceKind::Detector,
        SourceArg::Stdin    => SourceKind::Stdin,
        SourceArg::Sim      => SourceKind::Sim,
        SourceArg::Replay   => match &args.input {
            Some(path) => SourceKind::Replay(path.clone()),
            None       => bail!("--source replay needs --input <FILE>"),
        },
        #[cfg(feature = "leap")]
        SourceArg::Leap     => SourceKind::Leap,
    };

    eprintln!();
    eprintln!("╔══════════════════════════════════════════════════════════════╗");
    eprintln!("║          Pinch Keyboard — Hand-Gesture Virtual Keys          ║");
    eprintln!("╚══════════════════════════════════════════════════════════════╝");
    eprintln!();
    match kind {
        SourceKind::Sim => eprintln!("  Mode: Mouse simulation  (left button = pinch, Esc = quit)"),
        _               => eprintln!("  Mode: {:?}  (Esc = quit)", kind),
    }
    eprintln!();

    info!(version = env!("CARGO_PKG_VERSION"), "pinch_keyboard");
    run(cfg, kind).context("pinch_keyboard failed")
}

fn load_config(args: &Args) -> Result<AppConfig> {
    let mut cfg = match &args.config {
        Some(path) => AppConfig::load(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => AppConfig::default(),
    };

    // Override config with CLI args
    if let Some(cmd) = &args.detector_cmd {
        cfg.detector.command = cmd.clone();
    }
    if let Some(t) = args.pinch_threshold {
        cfg.engine.pinch_threshold = t;
    }
    if let Some(ms) = args.dwell_ms {
        cfg.engine.dwell_ms = ms;
    }
    if args.no_mirror {
        cfg.engine.mirror = false;
    }
    if args.mute {
        cfg.audio.enabled = false;
    }
    if let Some(port) = &args.midi_port {
        cfg.audio.port_hint = Some(port.clone());
    }
    cfg.validate().context("invalid command-line override")?;

    if args.config.is_none() {
        warn!("no --config given, using defaults");
    }
    tracing::debug!(?cfg, "configuration");
    Ok(cfg)
}

/// Logs go to stderr; stdout is kept for `--dump-config`.
fn init_logging(args: &Args) {
    let log_level = match args.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!(
            "pinch_keyboard={level},pinch_engine={level},landmark_stream={level},warn",
            level = log_level
        ))
    });

    match args.log_format {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        LogFormat::Compact => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
        LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty().with_writer(std::io::stderr))
                .init();
        }
    }
}
