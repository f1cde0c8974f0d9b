//! `SimpleBlobDetector` wrapper driven by the ball detection settings

use opencv::{
    core::{self, KeyPoint, Mat, Ptr, Vector},
    features2d::{SimpleBlobDetector, SimpleBlobDetector_Params},
    prelude::*,
};
use snooker_core::{BallDetectionSettings, Blob};
use tracing::debug;

pub struct BlobDetector {
    detector: Ptr<SimpleBlobDetector>,
    settings: BallDetectionSettings,
}

impl BlobDetector {
    pub fn new(settings: &BallDetectionSettings) -> opencv::Result<Self> {
        Ok(Self {
            detector: Self::build(settings)?,
            settings: settings.clone(),
        })
    }

    pub fn settings(&self) -> &BallDetectionSettings {
        &self.settings
    }

    /// Rebuild the detector; on failure the previous one stays in place.
    pub fn reconfigure(&mut self, settings: &BallDetectionSettings) -> opencv::Result<()> {
        let detector = Self::build(settings)?;
        self.detector = detector;
        self.settings = settings.clone();
        debug!("blob detector reconfigured");
        Ok(())
    }

    /// Blob centres and radii found in a binary frame.
    pub fn detect(&mut self, binary: &Mat) -> opencv::Result<Vec<Blob>> {
        let mut keypoints = Vector::<KeyPoint>::new();
        self.detector
            .detect(binary, &mut keypoints, &core::no_array())?;

        Ok(keypoints
            .iter()
            .map(|kp| {
                let pt = kp.pt();
                Blob::new(pt.x as f64, pt.y as f64, kp.size() as f64 / 2.0)
            })
            .collect())
    }

    fn build(settings: &BallDetectionSettings) -> opencv::Result<Ptr<SimpleBlobDetector>> {
        SimpleBlobDetector::create(Self::params(settings)?)
    }

    fn params(settings: &BallDetectionSettings) -> opencv::Result<SimpleBlobDetector_Params> {
        let mut params = SimpleBlobDetector_Params::default()?;

        params.filter_by_convexity = settings.filter_by_convexity;
        params.min_convexity = settings.min_convexity;
        params.max_convexity = settings.max_convexity;

        params.filter_by_circularity = settings.filter_by_circularity;
        params.min_circularity = settings.min_circularity;
        params.max_circularity = settings.max_circularity;

        params.filter_by_inertia = settings.filter_by_inertia;
        params.min_inertia_ratio = settings.min_inertia;
        params.max_inertia_ratio = settings.max_inertia;

        params.filter_by_area = settings.filter_by_area;
        params.min_area = settings.min_area;
        params.max_area = settings.max_area;

        params.filter_by_color = settings.filter_by_colour;
        params.blob_color = settings.blob_colour;

        params.min_dist_between_blobs = settings.min_dist_between_blobs;
        params.min_threshold = settings.min_threshold;
        params.max_threshold = settings.max_threshold;

        Ok(params)
    }
}
