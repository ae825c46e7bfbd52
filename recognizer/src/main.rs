//! gesture-recognizer - classify a stream of hand landmark frames.
//!
//! Reads one s-expression frame per line and writes one gesture line per
//! frame, plus tracker events when `--events` is given.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::{debug, info, warn};

use gesture_recognizer::sexp;
use gesture_recognizer::{
    FrameError, Gesture, GestureClassifier, GestureTracker, ThresholdConfig, TrackerConfig,
};

/// Pinch distance used when neither a flag nor a config file sets one.
const DEFAULT_CLICK_THRESHOLD_PX: f32 = 30.0;
/// Pointing length used when neither a flag nor a config file sets one.
const DEFAULT_EXTENSION_THRESHOLD_PX: f32 = 80.0;

#[derive(Parser, Debug)]
#[command(
    name = "gesture-recognizer",
    about = "Classify hand landmark frames into control gestures"
)]
struct Cli {
    /// Frame file, one s-expression per line (default: stdin)
    #[arg(long)]
    input: Option<PathBuf>,

    /// Threshold config file: (:click-distance-threshold N :gesture-extension-threshold N)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Pinch distance in pixels below which a click fires
    #[arg(long)]
    click_threshold: Option<f32>,

    /// Pointing length in pixels above which a finger counts as pointing
    #[arg(long)]
    extension_threshold: Option<f32>,

    /// Also emit started/held/released events
    #[arg(long)]
    events: bool,

    /// Time between frames, used by the event tracker
    #[arg(long, default_value_t = 33.3)]
    frame_interval_ms: f64,

    /// Idle time before a new gesture may start
    #[arg(long, default_value_t = 100.0)]
    debounce_ms: f64,

    /// Time before a started gesture is reported as held
    #[arg(long, default_value_t = 300.0)]
    hold_ms: f64,

    /// Show version and exit
    #[arg(long)]
    version: bool,
}

/// Per-run counters reported on exit.
#[derive(Debug, Default)]
struct Summary {
    frames: u64,
    rejected: u64,
    gestures: BTreeMap<Gesture, u64>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.version {
        println!("gesture-recognizer {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gesture_recognizer=info".into()),
        )
        .init();

    info!("gesture-recognizer v{} starting", env!("CARGO_PKG_VERSION"));

    let thresholds = resolve_thresholds(&cli)?;
    info!("thresholds: {}", thresholds.config_sexp());

    let input: Box<dyn BufRead> = match &cli.input {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("failed to open input {}", path.display()))?;
            Box::new(BufReader::new(file))
        }
        None => Box::new(BufReader::new(io::stdin())),
    };

    let stdout = io::stdout();
    let summary = run(&cli, thresholds, input, stdout.lock())?;

    info!(
        frames = summary.frames,
        rejected = summary.rejected,
        "input exhausted"
    );
    for (gesture, count) in &summary.gestures {
        info!("  {:<12} {}", gesture.as_str(), count);
    }
    Ok(())
}

/// Built-in defaults, then the config file, then explicit flags.
fn resolve_thresholds(cli: &Cli) -> anyhow::Result<ThresholdConfig> {
    let mut config =
        ThresholdConfig::new(DEFAULT_CLICK_THRESHOLD_PX, DEFAULT_EXTENSION_THRESHOLD_PX)?;

    if let Some(path) = &cli.config {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        config = config
            .merge_sexp(&text)
            .with_context(|| format!("invalid config {}", path.display()))?;
        debug!("loaded thresholds from {}", path.display());
    }

    ThresholdConfig::new(
        cli.click_threshold.unwrap_or(config.click_distance_threshold),
        cli.extension_threshold
            .unwrap_or(config.gesture_extension_threshold),
    )
    .context("invalid threshold flags")
}

/// Classify every frame line in `input`, writing results to `out`.
///
/// Bad frames are answered with an error line and release any tracked
/// gesture; they never stop the run.
fn run(
    cli: &Cli,
    thresholds: ThresholdConfig,
    input: impl BufRead,
    mut out: impl Write,
) -> anyhow::Result<Summary> {
    let classifier = GestureClassifier::new(thresholds);
    let mut tracker = cli.events.then(|| {
        GestureTracker::new(TrackerConfig {
            debounce_ms: cli.debounce_ms,
            hold_threshold_ms: cli.hold_ms,
        })
    });
    let mut summary = Summary::default();
    // Frame number for lines without `:frame`: one past the last frame seen.
    let mut next_frame = 0u64;

    for line in input.lines() {
        let line = line.context("failed to read input")?;
        let raw = line.trim();
        if raw.is_empty() || raw.starts_with(';') {
            continue;
        }

        summary.frames += 1;

        let (frame, result) = match sexp::parse_frame(raw) {
            Ok(parsed) => (
                parsed.number.unwrap_or(next_frame),
                classifier
                    .classify(&parsed.landmarks)
                    .map_err(FrameError::from),
            ),
            Err(e) => (next_frame, Err(e)),
        };
        next_frame = frame.saturating_add(1);

        let events = match result {
            Ok(classification) => {
                *summary.gestures.entry(classification.gesture).or_insert(0) += 1;
                writeln!(out, "{}", sexp::format_classification(frame, &classification))?;
                tracker
                    .as_mut()
                    .map(|t| t.update(&classification, cli.frame_interval_ms))
            }
            Err(e) => {
                summary.rejected += 1;
                warn!(frame, "rejected frame: {}", e);
                writeln!(out, "{}", sexp::format_error(frame, &e.to_string()))?;
                tracker.as_mut().map(|t| t.reject(cli.frame_interval_ms))
            }
        };
        for event in events.unwrap_or_default() {
            writeln!(out, "{}", sexp::format_event(frame, &event))?;
        }
    }

    out.flush().context("failed to flush output")?;
    Ok(summary)
}
