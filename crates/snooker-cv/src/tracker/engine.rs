//! Top-level ball tracking engine

use crate::detection::{BallClassifier, BlobDetector, TrackerConfig};
use crate::error::TrackerError;
use crate::frame::{FrameNormalizer, NormalizedFrame};
use crate::region::ColourRegionExtractor;
use crate::table::{TableBoundary, TableBoundaryDetector};
use crate::traits::TrackerObserver;
use crate::tracker::render::BallRenderer;
use opencv::{
    core::{self, Mat},
    imgproc,
    prelude::*,
};
use serde::Serialize;
use snooker_core::{
    snapshot_report, BallMap, BallMatcher, ColourId, PassReport, PottedBalls, ShotOutcome,
    ShotState, ShotStateMachine, Snapshot, TrackerSettings,
};
use tracing::{debug, info, warn};

/// Per-call flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameOptions {
    /// Return the binary frame instead of the colour frame.
    pub show_threshold: bool,
    /// Re-detect the table boundary from this frame.
    pub detect_table: bool,
    pub crop_frames: bool,
    pub perform_morph: bool,
    /// Colour whose contours are additionally outlined.
    pub detect_colour: Option<ColourId>,
    /// Mask the output to `detect_colour`.
    pub mask_colour: bool,
}

/// Which pass ran for a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PassKind {
    /// Full blob classification, fed to the shot state machine.
    Classification,
    /// Positional matching against the current roster.
    Matching,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EngineStats {
    pub frames_processed: u64,
    pub classification_passes: u64,
    pub matching_passes: u64,
}

/// Result of one `process_frame` call.
#[derive(Debug)]
pub struct FrameOutput {
    /// Annotated frame, or the binary frame when thresholds are shown.
    pub frame: Mat,
    pub binary: Mat,
    pub hsv: Mat,
    /// Single potted event of a finished shot.
    pub potted: Option<PottedBalls>,
    /// Every colour potted by a shot finished on this frame.
    pub outcome: Option<ShotOutcome>,
    pub pass: PassKind,
}

impl FrameOutput {
    pub fn potted_colour(&self) -> Option<ColourId> {
        self.potted.as_ref().map(|p| p.colour)
    }

    pub fn potted_count(&self) -> u32 {
        self.potted.as_ref().map_or(0, |p| p.count)
    }
}

/// Owns all tracking state. Calls must be serialized by the caller.
pub struct BallTrackingEngine {
    config: TrackerConfig,
    normalizer: FrameNormalizer,
    table: TableBoundaryDetector,
    blob_detector: BlobDetector,
    matcher: BallMatcher,
    renderer: BallRenderer,
    shots: ShotStateMachine,
    balls: BallMap,
    frame_counter: u64,
    last_pass: Option<PassKind>,
    stats: EngineStats,
    observers: Vec<Box<dyn TrackerObserver>>,
}

impl BallTrackingEngine {
    pub fn new(config: TrackerConfig) -> Result<Self, TrackerError> {
        let blob_detector = BlobDetector::new(&config.settings.ball_detection_settings)?;
        let colours = config.settings.colour_detection_settings.tracked_colours();

        Ok(Self {
            normalizer: FrameNormalizer::from_config(&config),
            table: TableBoundaryDetector::new(),
            blob_detector,
            matcher: BallMatcher::new(),
            renderer: BallRenderer::new(config.visualization.clone()),
            shots: ShotStateMachine::new(colours.clone()),
            balls: snooker_core::balls::empty_ball_map(colours),
            frame_counter: 0,
            last_pass: None,
            stats: EngineStats::default(),
            observers: Vec::new(),
            config,
        })
    }

    /// Replace the detection settings; applies from the next frame on.
    pub fn reconfigure(&mut self, settings: TrackerSettings) -> Result<(), TrackerError> {
        self.blob_detector
            .reconfigure(&settings.ball_detection_settings)?;
        self.config.settings = settings;
        info!("tracker settings replaced");
        Ok(())
    }

    pub fn add_observer(&mut self, observer: Box<dyn TrackerObserver>) {
        self.observers.push(observer);
    }

    pub fn process_frame(
        &mut self,
        frame: &Mat,
        options: &FrameOptions,
    ) -> Result<FrameOutput, TrackerError> {
        let colours = &self.config.settings.colour_detection_settings;
        let prepared = self
            .normalizer
            .prepare(frame, &colours.colours, options.perform_morph)?;

        if options.detect_table {
            if prepared.table_contours.is_empty() {
                return Err(TrackerError::NoContours);
            }
            let size = prepared.views.frame.size()?;
            self.table.detect(size, &prepared.table_contours)?;
            info!(
                contours = prepared.table_contours.len(),
                "table boundary detected"
            );
        }

        let crop = options.crop_frames.then_some(self.config.crop_mode);
        let views = FrameNormalizer::restrict(prepared.views, &self.table, crop)?;

        let blobs = self.blob_detector.detect(&views.binary)?;
        let pass = if self.frame_counter % self.config.sample_interval.max(1) == 0 {
            PassKind::Classification
        } else {
            PassKind::Matching
        };

        let balls = match pass {
            PassKind::Classification => BallClassifier::classify(&blobs, &views.hsv, colours)?,
            PassKind::Matching => {
                let mut balls = self.balls.clone();
                let moved = self.matcher.update(&mut balls, &blobs);
                debug!(blobs = blobs.len(), moved, "matched blobs to roster");
                balls
            }
        };

        let annotated = self.render(&views, &balls, options)?;

        // Nothing above mutates tracking state except an explicit table detection.
        self.balls = balls;
        let outcome = match pass {
            PassKind::Classification => {
                self.stats.classification_passes += 1;
                self.sample()
            }
            PassKind::Matching => {
                self.stats.matching_passes += 1;
                None
            }
        };
        self.frame_counter += 1;
        self.stats.frames_processed += 1;
        self.last_pass = Some(pass);

        Ok(FrameOutput {
            frame: annotated,
            binary: views.binary,
            hsv: views.hsv,
            potted: outcome.as_ref().and_then(ShotOutcome::last_potted),
            outcome,
            pass,
        })
    }

    fn sample(&mut self) -> Option<ShotOutcome> {
        let previous_counts = self.shots.cur_shot_snapshot().counts();
        let report: PassReport = self.shots.sample(&self.balls);

        if let Some(moving) = report.white_status_changed() {
            for observer in self.observers.iter_mut() {
                observer.white_status_changed(moving);
            }
        }
        if let Some(potted) = report.shot_finished.as_ref().and_then(ShotOutcome::last_potted) {
            for observer in self.observers.iter_mut() {
                observer.ball_potted(&potted);
            }
        }
        let current = self.shots.cur_shot_snapshot();
        if current.counts() != previous_counts {
            for observer in self.observers.iter_mut() {
                observer.counts_changed(current);
            }
        }

        report.shot_finished
    }

    fn render(
        &self,
        views: &NormalizedFrame,
        balls: &BallMap,
        options: &FrameOptions,
    ) -> Result<Mat, TrackerError> {
        let mut output = if options.show_threshold {
            let mut output = Mat::default();
            imgproc::cvt_color_def(&views.binary, &mut output, imgproc::COLOR_GRAY2BGR)?;
            output
        } else {
            let mut output = views.frame.try_clone()?;
            if let Some(boundary) = self.table_boundary().filter(|_| !options.crop_frames) {
                self.renderer.draw_table_boundary(&mut output, boundary)?;
            }
            output
        };

        let mut only = None;
        if let Some(colour) = options.detect_colour {
            let ranges = &self.config.settings.colour_detection_settings.colours;
            match ColourRegionExtractor::extract(&views.hsv, colour, ranges)? {
                Some(mask) => {
                    if options.mask_colour {
                        let mut masked = Mat::default();
                        core::bitwise_and(&output, &output, &mut masked, &mask.mask)?;
                        output = masked;
                        only = colour.is_ball().then_some(colour);
                    }
                    self.renderer
                        .draw_colour_contours(&mut output, &mask.contours)?;
                }
                None => warn!(%colour, "no colour range configured, nothing to highlight"),
            }
        }

        self.renderer.draw_balls(&mut output, balls, only)?;
        Ok(output)
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    pub fn frame_counter(&self) -> u64 {
        self.frame_counter
    }

    pub fn stats(&self) -> &EngineStats {
        &self.stats
    }

    pub fn last_pass(&self) -> Option<PassKind> {
        self.last_pass
    }

    /// Balls as tracked on the last processed frame.
    pub fn balls(&self) -> &BallMap {
        &self.balls
    }

    pub fn table_boundary(&self) -> Option<&TableBoundary> {
        self.table.boundary()
    }

    pub fn shot_state(&self) -> ShotState {
        self.shots.state()
    }

    pub fn last_shot_snapshot(&self) -> &Snapshot {
        self.shots.last_shot_snapshot()
    }

    pub fn cur_shot_snapshot(&self) -> &Snapshot {
        self.shots.cur_shot_snapshot()
    }

    pub fn temp_snapshot(&self) -> &Snapshot {
        self.shots.temp_snapshot()
    }

    pub fn white_is_moving(&self) -> bool {
        self.shots.white_is_moving()
    }

    /// Side-by-side ball counts of the last and current shot snapshots.
    pub fn snapshot_report(&self) -> String {
        snapshot_report(self.last_shot_snapshot(), self.cur_shot_snapshot())
    }
}
