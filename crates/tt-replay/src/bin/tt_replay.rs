use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use timetool::{
    ClockTime, DetectorEvent, EventFlags, EventOutcome, Image, ReferenceRecorder, TimeToolConfig,
    TimeToolPipeline,
};

#[derive(Parser, Debug)]
#[command(name = "tt_replay")]
#[command(about = "Replay recorded timetool frames through the pipeline")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    #[command(name = "run")]
    Run(RunArgs),
}

#[derive(Args, Debug, Clone)]
struct RunArgs {
    /// Pipeline configuration (JSON). Missing fields take their defaults.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Event manifest (JSON array). Frame paths are relative to its directory.
    #[arg(long, required = true)]
    manifest: PathBuf,
    #[arg(long, default_value = "timetool_results.json")]
    out: PathBuf,
    /// Also write accumulated references as a reference table.
    #[arg(long)]
    record_ref: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
struct ManifestEvent {
    #[serde(default)]
    frame: Option<PathBuf>,
    #[serde(default)]
    seconds: Option<u32>,
    #[serde(default)]
    nanoseconds: Option<u32>,
    #[serde(default)]
    event_codes: Option<Vec<i32>>,
}

impl ManifestEvent {
    fn timestamp(&self) -> Option<ClockTime> {
        Some(ClockTime::new(self.seconds?, self.nanoseconds.unwrap_or(0)))
    }
}

#[derive(Debug, Clone, Serialize)]
struct EventRecord {
    index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    timestamp: Option<ClockTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    flags: Option<FlagsDto>,
    outcome: EventOutcome,
}

#[derive(Debug, Clone, Copy, Serialize)]
struct FlagsDto {
    bykick: bool,
    laser: bool,
}

impl From<EventFlags> for FlagsDto {
    fn from(flags: EventFlags) -> Self {
        Self {
            bykick: flags.bykick,
            laser: flags.laser,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
struct RunSummary {
    events: usize,
    measured: usize,
    reference_updates: usize,
    skipped: usize,
}

#[derive(Debug, Clone, Serialize)]
struct RunReport {
    summary: RunSummary,
    events: Vec<EventRecord>,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.cmd {
        Command::Run(args) => run(args),
    }
}

fn run(args: RunArgs) -> Result<()> {
    let config = match &args.config {
        Some(path) => {
            ensure_file_exists(path, "config")?;
            TimeToolConfig::from_json_file(path)
                .with_context(|| format!("loading config {}", path.display()))?
        }
        None => TimeToolConfig::default(),
    };

    ensure_file_exists(&args.manifest, "manifest")?;
    let manifest: Vec<ManifestEvent> = read_json(&args.manifest)?;
    let frame_dir = args
        .manifest
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default();

    let mut pipeline = TimeToolPipeline::new(&config).context("building pipeline")?;
    let mut recorder = ReferenceRecorder::new(config.roi.columns.lo);
    let mut summary = RunSummary::default();
    let mut records = Vec::with_capacity(manifest.len());

    for (index, entry) in manifest.iter().enumerate() {
        let frame = match &entry.frame {
            Some(rel) => Some(load_frame_u16(&frame_dir.join(rel))?),
            None => None,
        };
        let flags = entry
            .event_codes
            .as_deref()
            .map(|codes| pipeline.decode_trigger(codes));
        let timestamp = entry.timestamp();

        let event = DetectorEvent {
            frame: frame.as_ref().map(Image::as_view),
            flags,
            timestamp,
        };
        let outcome = pipeline
            .process_event(&event)
            .with_context(|| format!("processing event {index}"))?;

        summary.events += 1;
        match &outcome {
            EventOutcome::Measured(_) => summary.measured += 1,
            EventOutcome::Skipped(_) => summary.skipped += 1,
            EventOutcome::ReferenceUpdated { reference } => {
                summary.reference_updates += 1;
                if args.record_ref.is_some() {
                    match timestamp {
                        Some(ts) => recorder.record(ts, reference),
                        None => warn!("event {index}: reference without timestamp not recorded"),
                    }
                }
            }
        }

        records.push(EventRecord {
            index,
            timestamp,
            flags: flags.map(FlagsDto::from),
            outcome,
        });
    }

    info!(
        "{} events: {} measured, {} reference updates, {} skipped",
        summary.events, summary.measured, summary.reference_updates, summary.skipped
    );

    if let Some(path) = &args.record_ref {
        if recorder.is_empty() {
            bail!(
                "no timestamped reference updates to record into {}",
                path.display()
            );
        }
        recorder
            .into_table()
            .and_then(|table| table.save(path))
            .with_context(|| format!("writing reference table {}", path.display()))?;
    }

    if let Some(dir) = args.out.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)
            .with_context(|| format!("creating output directory {}", dir.display()))?;
    }
    write_json(
        &args.out,
        &RunReport {
            summary,
            events: records,
        },
    )
}

fn load_frame_u16(path: &Path) -> Result<Image<u16>> {
    ensure_file_exists(path, "frame")?;
    let dyn_img =
        image::open(path).with_context(|| format!("opening frame {}", path.display()))?;
    let luma = dyn_img.to_luma16();
    let (w, h) = luma.dimensions();
    let data = luma.into_raw();

    Image::from_vec(w as usize, h as usize, data)
        .with_context(|| format!("constructing frame from {}", path.display()))
}

fn write_json(path: &Path, value: &impl Serialize) -> Result<()> {
    let bytes = serde_json::to_vec_pretty(value).context("serializing json")?;
    fs::write(path, bytes).with_context(|| format!("writing json {}", path.display()))
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T> {
    let data = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_slice(&data).with_context(|| format!("parsing json {}", path.display()))
}

fn ensure_file_exists(path: &Path, what: &str) -> Result<()> {
    if !path.exists() {
        bail!("{} file does not exist: {}", what, path.display());
    }
    if !path.is_file() {
        bail!("{} path is not a file: {}", what, path.display());
    }
    Ok(())
}
