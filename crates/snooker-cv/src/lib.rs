//! Snooker Ball Tracking Vision Library
//!
//! OpenCV side of the tracker: frame normalization, table boundary
//! detection, blob detection and colour classification, composed by
//! [`BallTrackingEngine`] into the per-frame tracking contract.

pub mod detection;
pub mod error;
pub mod frame;
pub mod region;
pub mod table;
pub mod tracker;
pub mod utils;

// Re-export commonly used types
pub use detection::{BallClassifier, BlobDetector, CropMode, TrackerConfig, VisualizationConfig};
pub use error::TrackerError;
pub use frame::{FrameNormalizer, NormalizedFrame};
pub use region::{ColourMask, ColourRegionExtractor, ContourRegion};
pub use table::{TableBoundary, TableBoundaryDetector};
pub use tracker::{BallTrackingEngine, EngineStats, FrameOptions, FrameOutput, PassKind};
pub use utils::ImageUtils;

// Error handling
pub type Result<T> = anyhow::Result<T>;

/// Core traits for the CV system
pub mod traits {
    use snooker_core::{PottedBalls, Snapshot};

    /// Push notifications from the tracking engine. All methods default to no-ops.
    pub trait TrackerObserver {
        /// The cue ball started (`true`) or stopped (`false`) moving.
        fn white_status_changed(&mut self, _moving: bool) {}

        fn ball_potted(&mut self, _potted: &PottedBalls) {}

        /// Per-colour counts of the current shot snapshot changed.
        fn counts_changed(&mut self, _snapshot: &Snapshot) {}
    }
}
