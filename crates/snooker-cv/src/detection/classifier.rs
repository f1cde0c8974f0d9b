//! Colour attribution of blobs against HSV contour regions

use crate::region::{ColourRegionExtractor, ContourRegion};
use opencv::core::Mat;
use snooker_core::{classify_blobs, BallMap, Blob, ColourDetectionSettings, ColourId};
use std::collections::BTreeMap;
use tracing::warn;

pub struct BallClassifier;

impl BallClassifier {
    /// Assign blobs to colours in configured priority order.
    ///
    /// Detection-enabled colours without a configured range are skipped with a
    /// warning. Every tracked colour gets an entry in the result.
    pub fn classify(
        blobs: &[Blob],
        hsv: &Mat,
        settings: &ColourDetectionSettings,
    ) -> opencv::Result<BallMap> {
        let priorities = settings.detection_order();

        let mut regions: BTreeMap<ColourId, Vec<ContourRegion>> = BTreeMap::new();
        let mut missing = Vec::new();
        for priority in &priorities {
            match ColourRegionExtractor::extract(hsv, priority.colour, &settings.colours)? {
                Some(mask) => {
                    regions.insert(priority.colour, ColourRegionExtractor::regions(&mask)?);
                }
                None => missing.push(priority.colour.name()),
            }
        }
        if !missing.is_empty() {
            warn!(colours = ?missing, "no colour range configured, skipping");
        }

        let mut balls = classify_blobs(blobs, &regions, &priorities)?;
        for colour in settings.tracked_colours() {
            balls.entry(colour).or_default();
        }
        Ok(balls)
    }
}
