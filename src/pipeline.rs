//! Frame-sequence runner using snooker-cv
//!
//! A producer thread decodes still frames from a directory into a bounded
//! queue; a single consumer thread owns the tracking engine and drains it.

use anyhow::{anyhow, Context, Result};
use opencv::core::Mat;
use serde::Serialize;
use snooker_core::{ColourId, Snapshot};
use snooker_cv::{
    traits::TrackerObserver, BallTrackingEngine, EngineStats, FrameOptions, ImageUtils,
    TrackerConfig, TrackerError,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::thread;
use tracing::{debug, error, info, warn};

pub const QUEUE_CAPACITY: usize = 16;

const FRAME_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "bmp"];

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub tracker: TrackerConfig,
    /// Flags for every frame; `detect_table` is only honoured until a boundary is found.
    pub options: FrameOptions,
}

#[derive(Debug, Clone, Serialize)]
pub struct PottedEvent {
    pub frame: String,
    pub colour: ColourId,
    pub count: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub stats: EngineStats,
    pub failed_frames: usize,
    pub potted: Vec<PottedEvent>,
    pub report: String,
}

struct QueuedFrame {
    path: PathBuf,
    frame: Mat,
}

/// Logs count changes as they are pushed by the engine.
struct CountLogger;

impl TrackerObserver for CountLogger {
    fn white_status_changed(&mut self, moving: bool) {
        debug!(moving, "white status changed");
    }

    fn counts_changed(&mut self, snapshot: &Snapshot) {
        let counts: Vec<String> = snapshot
            .counts()
            .into_iter()
            .map(|(colour, count)| format!("{}={}", colour, count))
            .collect();
        debug!(counts = %counts.join(" "), "ball counts changed");
    }
}

/// Frame files in `dir`, sorted by name.
pub fn list_frames<P: AsRef<Path>>(dir: P) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    let mut frames = Vec::new();
    let entries = fs::read_dir(dir)
        .with_context(|| format!("Failed to read frame directory: {:?}", dir))?;
    for entry in entries {
        let path = entry?.path();
        let is_frame = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| FRAME_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()));
        if is_frame {
            frames.push(path);
        }
    }
    frames.sort();
    Ok(frames)
}

pub fn run(config: PipelineConfig) -> Result<RunSummary> {
    let frames = list_frames(&config.input_dir)?;
    if frames.is_empty() {
        warn!("No frames found in {:?}", config.input_dir);
    }
    fs::create_dir_all(&config.output_dir)
        .with_context(|| format!("Failed to create output directory: {:?}", config.output_dir))?;

    let (tx, rx) = mpsc::sync_channel::<QueuedFrame>(QUEUE_CAPACITY);

    let producer = thread::spawn(move || {
        for path in frames {
            match ImageUtils::load_mat_color(&path) {
                Ok(frame) => {
                    if tx.send(QueuedFrame { path, frame }).is_err() {
                        break;
                    }
                }
                Err(err) => warn!("Skipping {:?}: {:#}", path, err),
            }
        }
    });

    let consumer = thread::spawn(move || consume(rx, config));

    producer
        .join()
        .map_err(|_| anyhow!("frame producer panicked"))?;
    consumer
        .join()
        .map_err(|_| anyhow!("tracking consumer panicked"))?
}

fn consume(rx: mpsc::Receiver<QueuedFrame>, config: PipelineConfig) -> Result<RunSummary> {
    let mut engine = BallTrackingEngine::new(config.tracker)?;
    engine.add_observer(Box::new(CountLogger));

    let mut needs_table = config.options.detect_table;
    let mut failed_frames = 0;
    let mut potted = Vec::new();

    for QueuedFrame { path, frame } in rx {
        let options = FrameOptions {
            detect_table: needs_table,
            ..config.options
        };

        let output = match engine.process_frame(&frame, &options) {
            Ok(output) => output,
            Err(err @ (TrackerError::NoContours | TrackerError::MissingMask(_))) => {
                error!("Frame {:?} rejected: {}", path, err);
                failed_frames += 1;
                continue;
            }
            Err(err) => return Err(err).with_context(|| format!("Failed to process {:?}", path)),
        };
        needs_table = false;

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        if let Some(event) = &output.potted {
            info!("{}: {}", name, event);
            potted.push(PottedEvent {
                frame: name.clone(),
                colour: event.colour,
                count: event.count,
            });
        }

        ImageUtils::save_image(&output.frame, config.output_dir.join(&name))?;
    }

    let report = engine.snapshot_report();
    info!("\n{}", report);

    Ok(RunSummary {
        stats: engine.stats().clone(),
        failed_frames,
        potted,
        report,
    })
}

/// Write the run summary as pretty JSON.
pub fn export_json(summary: &RunSummary, output_path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(summary).context("Failed to serialize run summary")?;

    fs::write(output_path, json)
        .with_context(|| format!("Failed to write JSON to: {:?}", output_path))?;

    Ok(())
}
