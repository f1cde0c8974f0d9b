use anyhow::Result;
use snooker_cv::{FrameOptions, TrackerConfig};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod pipeline;

use pipeline::PipelineConfig;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let root = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let mut args = std::env::args().skip(1);
    let input_dir = args.next().map(PathBuf::from).unwrap_or_else(|| root.join("assets/frames"));
    let output_dir = args.next().map(PathBuf::from).unwrap_or_else(|| root.join("assets/outputs"));

    let tracker = match args.next() {
        Some(settings) => TrackerConfig::with_settings_file(settings)?,
        None => TrackerConfig::default(),
    };

    let config = PipelineConfig {
        input_dir,
        output_dir: output_dir.clone(),
        tracker,
        options: FrameOptions {
            detect_table: true,
            crop_frames: true,
            perform_morph: true,
            ..FrameOptions::default()
        },
    };

    let summary = pipeline::run(config)?;
    pipeline::export_json(&summary, &output_dir.join("summary.json"))?;

    info!(
        frames = summary.stats.frames_processed,
        failed = summary.failed_frames,
        potted = summary.potted.len(),
        "Run finished"
    );
    Ok(())
}
