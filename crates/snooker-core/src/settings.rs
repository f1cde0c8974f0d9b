//! Persisted detection settings
//!
//! JSON layout, key names and defaults follow the settings files used by the
//! desktop tool, so existing files load unchanged.

use crate::balls::ColourId;
use crate::classify::ColourPriority;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::info;

/// HSV triple in OpenCV ranges (H 0..=180, S and V 0..=255).
pub type Hsv = [u8; 3];

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct TrackerSettings {
    pub ball_detection_settings: BallDetectionSettings,
    pub colour_detection_settings: ColourDetectionSettings,
}

/// Blob detector thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct BallDetectionSettings {
    pub filter_by_convexity: bool,
    pub min_convexity: f32,
    pub max_convexity: f32,
    pub filter_by_circularity: bool,
    pub min_circularity: f32,
    pub max_circularity: f32,
    pub filter_by_inertia: bool,
    pub min_inertia: f32,
    pub max_inertia: f32,
    pub filter_by_area: bool,
    pub min_area: f32,
    pub max_area: f32,
    pub filter_by_colour: bool,
    pub blob_colour: u8,
    pub min_dist_between_blobs: f32,
    pub min_threshold: f32,
    pub max_threshold: f32,
}

impl Default for BallDetectionSettings {
    fn default() -> Self {
        Self {
            filter_by_convexity: false,
            min_convexity: 0.5,
            max_convexity: 1.0,
            filter_by_circularity: true,
            min_circularity: 0.3,
            max_circularity: 1.0,
            filter_by_inertia: false,
            min_inertia: 0.2,
            max_inertia: 1.0,
            filter_by_area: true,
            min_area: 200.0,
            max_area: 2000.0,
            filter_by_colour: true,
            blob_colour: 255,
            min_dist_between_blobs: 10.0,
            min_threshold: 0.0,
            max_threshold: 255.0,
        }
    }
}

/// Per-colour classification switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct BallColourSettings {
    pub detect: bool,
    /// Classification priority, lowest first.
    pub order: i32,
    #[serde(default)]
    pub biggest_contour: bool,
}

/// Largest hue OpenCV produces for 8-bit HSV frames.
pub const MAX_HUE: u8 = 180;

/// Inclusive HSV bounds of a colour.
///
/// Deserialization rejects hues above [`MAX_HUE`] and bounds whose lower
/// component exceeds the upper one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", try_from = "RawColourRange")]
pub struct ColourRange {
    pub lower: Hsv,
    pub upper: Hsv,
}

#[derive(Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
struct RawColourRange {
    lower: Hsv,
    upper: Hsv,
}

impl TryFrom<RawColourRange> for ColourRange {
    type Error = String;

    fn try_from(raw: RawColourRange) -> std::result::Result<Self, Self::Error> {
        for bound in [raw.lower, raw.upper] {
            if bound[0] > MAX_HUE {
                return Err(format!("hue {} is above {}", bound[0], MAX_HUE));
            }
        }
        if (0..3).any(|i| raw.lower[i] > raw.upper[i]) {
            return Err(format!(
                "lower bound {:?} exceeds upper bound {:?}",
                raw.lower, raw.upper
            ));
        }
        Ok(Self::new(raw.lower, raw.upper))
    }
}

impl ColourRange {
    pub fn new(lower: Hsv, upper: Hsv) -> Self {
        Self { lower, upper }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct ColourDetectionSettings {
    pub ball_colours: BTreeMap<ColourId, BallColourSettings>,
    pub colours: BTreeMap<ColourId, ColourRange>,
}

impl Default for ColourDetectionSettings {
    fn default() -> Self {
        let ball = |order, biggest_contour| BallColourSettings {
            detect: true,
            order,
            biggest_contour,
        };
        let ball_colours = BTreeMap::from([
            (ColourId::Red, ball(1, false)),
            (ColourId::White, ball(2, false)),
            (ColourId::Yellow, ball(3, true)),
            (ColourId::Green, ball(4, false)),
            (ColourId::Blue, ball(5, true)),
            (ColourId::Pink, ball(6, true)),
            (ColourId::Black, ball(7, false)),
            (ColourId::Brown, ball(8, false)),
        ]);
        let colours = BTreeMap::from([
            (ColourId::Red, ColourRange::new([25, 190, 150], [180, 255, 255])),
            (ColourId::Yellow, ColourRange::new([10, 100, 100], [35, 255, 255])),
            (ColourId::Green, ColourRange::new([55, 50, 50], [100, 255, 255])),
            (ColourId::Brown, ColourRange::new([0, 136, 150], [10, 225, 255])),
            (ColourId::Blue, ColourRange::new([115, 60, 60], [135, 255, 255])),
            (ColourId::Pink, ColourRange::new([160, 60, 240], [180, 120, 255])),
            (ColourId::Black, ColourRange::new([0, 0, 0], [180, 255, 40])),
            (ColourId::White, ColourRange::new([0, 0, 240], [30, 80, 255])),
            (ColourId::Table, ColourRange::new([0, 18, 0], [66, 125, 230])),
        ]);
        Self {
            ball_colours,
            colours,
        }
    }
}

impl ColourDetectionSettings {
    /// Detection-enabled colours in classification priority order.
    ///
    /// Equal `ORDER` values fall back to colour declaration order.
    pub fn detection_order(&self) -> Vec<ColourPriority> {
        let mut enabled: Vec<(&ColourId, &BallColourSettings)> = self
            .ball_colours
            .iter()
            .filter(|(colour, settings)| settings.detect && colour.is_ball())
            .collect();
        enabled.sort_by_key(|(colour, settings)| (settings.order, **colour));
        enabled
            .into_iter()
            .map(|(colour, settings)| ColourPriority {
                colour: *colour,
                biggest_contour: settings.biggest_contour,
            })
            .collect()
    }

    /// Ball colours tracked in snapshots, whether or not detection is on.
    pub fn tracked_colours(&self) -> Vec<ColourId> {
        self.ball_colours
            .keys()
            .copied()
            .filter(ColourId::is_ball)
            .collect()
    }

    /// Enable detection for `colours` only.
    pub fn detect_only(&mut self, colours: &[ColourId]) {
        for (colour, settings) in self.ball_colours.iter_mut() {
            settings.detect = colours.contains(colour);
        }
    }
}

impl TrackerSettings {
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse tracker settings")
    }

    pub fn to_json_string(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize tracker settings")
    }

    /// Load settings from a JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file: {:?}", path))?;
        let settings = Self::from_json_str(&json)
            .with_context(|| format!("Invalid settings file: {:?}", path))?;
        info!("Loaded settings from {:?}", path);
        Ok(settings)
    }

    /// Save settings to a JSON file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let json = self.to_json_string()?;
        fs::write(path, json)
            .with_context(|| format!("Failed to write settings file: {:?}", path))?;
        info!("Saved settings to {:?}", path);
        Ok(())
    }
}
