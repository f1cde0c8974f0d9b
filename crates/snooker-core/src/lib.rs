//! Snooker ball tracking domain model
//!
//! OpenCV-free parts of the tracker: balls and colours, snapshots, the shot
//! state machine, positional matching, first-match colour attribution and
//! the persisted settings.

pub mod balls;
pub mod classify;
pub mod matcher;
pub mod settings;
pub mod shot;
pub mod snapshot;

pub use balls::{Ball, BallMap, Blob, ColourId};
pub use classify::{classify_blobs, ColourPriority, ColourRegion, Containment};
pub use matcher::BallMatcher;
pub use settings::{
    BallColourSettings, BallDetectionSettings, ColourDetectionSettings, ColourRange, Hsv,
    TrackerSettings,
};
pub use shot::{PassReport, PottedBalls, ShotOutcome, ShotState, ShotStateMachine};
pub use snapshot::{snapshot_report, Snapshot};
