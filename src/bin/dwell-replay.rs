use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::Parser;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use dwellcount_rs::{
    AssociationKind, Clock, CounterConfig, Detection, IdentityStatus, ManualClock, VisitorCounter,
};

/// Replay recorded per-frame detections through the visitor counter.
///
/// Input is JSON lines, one frame per line:
/// `{"timestamp": 1.5, "width": 640, "height": 480, "detections": [...]}`
#[derive(Parser, Debug)]
#[command(name = "dwell-replay", version, about = "Replay detections and count lingering visitors")]
struct Args {
    /// JSON-lines file of recorded frames
    #[arg(short, long, value_name = "PATH")]
    input: PathBuf,
    /// JSON config file; built-in defaults when omitted
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Where to write per-frame stats (stdout when omitted)
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,
    #[arg(long)]
    max_disappeared: Option<u32>,
    #[arg(long)]
    max_distance: Option<f64>,
    #[arg(long)]
    min_area_ratio: Option<f64>,
    #[arg(long)]
    required_dwell_secs: Option<f64>,
    /// Use min-cost assignment instead of greedy matching
    #[arg(long)]
    min_cost: bool,
    /// Include per-identity dwell status in every output line
    #[arg(long)]
    identities: bool,
}

#[derive(Deserialize)]
struct RecordedFrame {
    /// Seconds since the start of the recording
    timestamp: f64,
    width: u32,
    height: u32,
    #[serde(default)]
    detections: Vec<Detection>,
}

#[derive(Serialize)]
struct FrameLine<'a> {
    frame_index: u64,
    timestamp: f64,
    total_visitors: u64,
    currently_near: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    identities: Option<&'a [IdentityStatus]>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
    let args = Args::parse();
    run(args)
}

fn run(args: Args) -> Result<()> {
    let config = load_config(&args)?;
    info!(?config, "starting replay");

    let input = File::open(&args.input)
        .with_context(|| format!("Failed to open {}", args.input.display()))?;
    let mut writer: Box<dyn Write> = match args.output.as_ref() {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("Failed to create {}", path.display()))?,
        )),
        None => Box::new(BufWriter::new(std::io::stdout().lock())),
    };

    let mut counter = VisitorCounter::new(config);
    let frames = replay(BufReader::new(input), &mut writer, &mut counter, args.identities)?;
    writer.flush()?;

    let stats = counter.stats();
    info!(
        frames,
        total_visitors = stats.total_visitors,
        live_identities = counter.tracker().len(),
        "replay finished"
    );
    Ok(())
}

/// Feed every recorded frame in `reader` through `counter`, writing one stats
/// line per frame. Returns the number of frames replayed.
fn replay<R: BufRead, W: Write>(
    reader: R,
    writer: &mut W,
    counter: &mut VisitorCounter,
    include_identities: bool,
) -> Result<u64> {
    let clock = ManualClock::new();
    let mut frame_index = 0u64;
    let mut last_timestamp = f64::NEG_INFINITY;

    for (line_no, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("Failed to read line {}", line_no + 1))?;
        if line.trim().is_empty() {
            continue;
        }
        let frame: RecordedFrame = serde_json::from_str(&line)
            .with_context(|| format!("Invalid frame on line {}", line_no + 1))?;

        let Ok(offset) = Duration::try_from_secs_f64(frame.timestamp) else {
            bail!("Invalid timestamp {} on line {}", frame.timestamp, line_no + 1);
        };
        if frame.timestamp < last_timestamp {
            warn!(line = line_no + 1, "timestamp goes backwards, dwell clocks may stall");
        }
        last_timestamp = frame.timestamp;
        clock.set(offset);

        let report = counter.observe(&frame.detections, frame.width, frame.height, clock.now());
        let out = FrameLine {
            frame_index,
            timestamp: frame.timestamp,
            total_visitors: report.stats.total_visitors,
            currently_near: report.stats.currently_near,
            identities: include_identities.then_some(report.identities.as_slice()),
        };
        serde_json::to_writer(&mut *writer, &out)?;
        writer.write_all(b"\n")?;
        frame_index += 1;
    }
    Ok(frame_index)
}

fn load_config(args: &Args) -> Result<CounterConfig> {
    let mut config = match args.config.as_deref() {
        Some(path) => read_config(path)?,
        None => CounterConfig::default(),
    };
    if let Some(v) = args.max_disappeared {
        config.tracker.max_disappeared = v;
    }
    if let Some(v) = args.max_distance {
        config.tracker.max_distance = v;
    }
    if let Some(v) = args.min_area_ratio {
        config.dwell.min_area_ratio = v;
    }
    if let Some(v) = args.required_dwell_secs {
        config.dwell.required_dwell_secs = v;
    }
    if args.min_cost {
        config.tracker.association = AssociationKind::MinCost;
    }
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

fn read_config(path: &Path) -> Result<CounterConfig> {
    CounterConfig::from_path(path)
        .with_context(|| format!("Failed to load config {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PERSON: &str =
        r#"{"x": 160, "y": 0, "width": 320, "height": 480, "label": "person"}"#;

    fn frame_line(timestamp: f64) -> String {
        format!(
            r#"{{"timestamp": {timestamp:?}, "width": 640, "height": 480, "detections": [{PERSON}]}}"#
        )
    }

    fn stats_line(frame_index: u64, timestamp: f64, total_visitors: u64) -> serde_json::Value {
        serde_json::json!({
            "frame_index": frame_index,
            "timestamp": timestamp,
            "total_visitors": total_visitors,
            "currently_near": 1,
        })
    }

    fn parse(args: &[&str]) -> Args {
        let mut argv = vec!["dwell-replay", "--input", "frames.jsonl"];
        argv.extend_from_slice(args);
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_replay_writes_one_line_per_frame() {
        let config = load_config(&parse(&["--required-dwell-secs", "1"])).unwrap();
        let mut counter = VisitorCounter::new(config);
        let input = [frame_line(0.0), String::new(), frame_line(0.5), frame_line(1.0)].join("\n");
        let mut out = Vec::new();

        let frames = replay(input.as_bytes(), &mut out, &mut counter, false).unwrap();
        assert_eq!(frames, 3);

        let lines: Vec<serde_json::Value> = String::from_utf8(out)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(
            lines,
            vec![stats_line(0, 0.0, 0), stats_line(1, 0.5, 0), stats_line(2, 1.0, 1)]
        );
    }

    #[test]
    fn test_replay_includes_identities_on_request() {
        let mut counter = VisitorCounter::default();
        let mut out = Vec::new();
        replay(frame_line(0.0).as_bytes(), &mut out, &mut counter, true).unwrap();

        let line: serde_json::Value = serde_json::from_slice(&out).unwrap();
        let identities = line["identities"].as_array().unwrap();
        assert_eq!(identities.len(), 1);
        assert_eq!(identities[0]["id"], 0);
    }

    #[test]
    fn test_negative_timestamp_is_rejected() {
        let mut counter = VisitorCounter::default();
        let input = [frame_line(0.0), frame_line(-1.0)].join("\n");
        let mut out = Vec::new();

        let err = replay(input.as_bytes(), &mut out, &mut counter, false).unwrap_err();
        assert!(err.to_string().contains("Invalid timestamp -1 on line 2"), "{err}");
    }

    #[test]
    fn test_malformed_line_is_rejected() {
        let mut counter = VisitorCounter::default();
        let mut out = Vec::new();
        let err = replay("not json".as_bytes(), &mut out, &mut counter, false).unwrap_err();
        assert!(err.to_string().contains("line 1"), "{err}");
    }

    #[test]
    fn test_flags_override_config_file() {
        let path = std::env::temp_dir()
            .join(format!("dwell-replay-config-{}.json", std::process::id()));
        std::fs::write(
            &path,
            r#"{"tracker": {"max_distance": 40.0, "max_disappeared": 5},
                "dwell": {"required_dwell_secs": 3.0}}"#,
        )
        .unwrap();
        let path_arg = path.to_string_lossy().into_owned();

        let config = load_config(&parse(&[
            "--config",
            &path_arg,
            "--max-distance",
            "120",
            "--min-cost",
        ]))
        .unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(config.tracker.max_distance, 120.0);
        assert_eq!(config.tracker.association, AssociationKind::MinCost);
        // Values without a flag come from the file.
        assert_eq!(config.tracker.max_disappeared, 5);
        assert_eq!(config.dwell.required_dwell_secs, 3.0);
    }

    #[test]
    fn test_invalid_override_is_rejected() {
        let err = load_config(&parse(&["--required-dwell-secs=-2"])).unwrap_err();
        assert!(err.to_string().contains("Invalid configuration"), "{err}");
    }
}
