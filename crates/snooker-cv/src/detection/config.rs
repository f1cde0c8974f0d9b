//! Tracker configuration

use crate::Result;
use serde::{Deserialize, Serialize};
use snooker_core::TrackerSettings;
use std::path::Path;

/// Main tracker configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackerConfig {
    pub settings: TrackerSettings,
    /// Working width frames are resized to before processing.
    pub frame_width: i32,
    /// Full reclassification runs on every Nth frame.
    pub sample_interval: u64,
    pub morph_kernel_size: i32,
    pub crop_mode: CropMode,
    pub visualization: VisualizationConfig,
}

/// What `crop_frames` does once a table boundary is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CropMode {
    /// Blank everything outside the boundary, keep frame size.
    #[default]
    Fill,
    /// Blank outside the boundary and cut to its bounding box.
    Crop,
}

/// Visualization configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisualizationConfig {
    pub draw_labels: bool,
    pub draw_circles: bool,
    pub draw_table_boundary: bool,
}

impl Default for VisualizationConfig {
    fn default() -> Self {
        Self {
            draw_labels: true,
            draw_circles: true,
            draw_table_boundary: true,
        }
    }
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self::from_settings(TrackerSettings::default())
    }
}

impl TrackerConfig {
    pub fn from_settings(settings: TrackerSettings) -> Self {
        Self {
            settings,
            frame_width: 800,
            sample_interval: 5,
            morph_kernel_size: 7,
            crop_mode: CropMode::Fill,
            visualization: VisualizationConfig::default(),
        }
    }

    /// Default configuration around a settings file.
    pub fn with_settings_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self::from_settings(TrackerSettings::load(path)?))
    }
}
