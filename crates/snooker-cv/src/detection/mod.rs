//! Blob detection, colour classification and tracker configuration

pub mod blob;
pub mod classifier;
pub mod config;

pub use blob::BlobDetector;
pub use classifier::BallClassifier;
pub use config::{CropMode, TrackerConfig, VisualizationConfig};
