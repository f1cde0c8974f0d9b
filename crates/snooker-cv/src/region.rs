//! HSV colour masks and the contours bounding them

use opencv::{
    core::{self, Mat, Point, Point2f, Scalar, Vector},
    imgproc,
};
use snooker_core::{ColourId, ColourRange, ColourRegion, Containment};
use std::collections::BTreeMap;

/// Binary mask of one colour range plus its external contours.
#[derive(Debug)]
pub struct ColourMask {
    pub mask: Mat,
    pub contours: Vector<Vector<Point>>,
}

/// A single external contour with its area precomputed.
#[derive(Debug, Clone)]
pub struct ContourRegion {
    points: Vector<Point>,
    area: f64,
}

impl ContourRegion {
    pub fn new(points: Vector<Point>) -> opencv::Result<Self> {
        let area = imgproc::contour_area(&points, false)?;
        Ok(Self { points, area })
    }
}

impl ColourRegion for ContourRegion {
    type Error = opencv::Error;

    fn area(&self) -> f64 {
        self.area
    }

    fn test_point(&self, x: f64, y: f64) -> opencv::Result<Containment> {
        let test =
            imgproc::point_polygon_test(&self.points, Point2f::new(x as f32, y as f32), false)?;
        Ok(Containment::from_signed(test))
    }
}

/// Builds colour masks from an HSV frame.
pub struct ColourRegionExtractor;

impl ColourRegionExtractor {
    /// Mask and contours of `colour`, or `None` when no range is configured for it.
    pub fn extract(
        hsv: &Mat,
        colour: ColourId,
        ranges: &BTreeMap<ColourId, ColourRange>,
    ) -> opencv::Result<Option<ColourMask>> {
        match ranges.get(&colour) {
            Some(range) => Self::extract_range(hsv, range).map(Some),
            None => Ok(None),
        }
    }

    /// Inclusive in-range mask with external, uncompressed contours.
    pub fn extract_range(hsv: &Mat, range: &ColourRange) -> opencv::Result<ColourMask> {
        let mut mask = Mat::default();
        core::in_range(hsv, &hsv_scalar(range.lower), &hsv_scalar(range.upper), &mut mask)?;

        let mut contours = Vector::<Vector<Point>>::new();
        imgproc::find_contours(
            &mask,
            &mut contours,
            imgproc::RETR_EXTERNAL,
            imgproc::CHAIN_APPROX_NONE,
            Point::new(0, 0),
        )?;

        Ok(ColourMask { mask, contours })
    }

    pub fn regions(mask: &ColourMask) -> opencv::Result<Vec<ContourRegion>> {
        mask.contours.iter().map(ContourRegion::new).collect()
    }
}

fn hsv_scalar(hsv: [u8; 3]) -> Scalar {
    Scalar::new(hsv[0] as f64, hsv[1] as f64, hsv[2] as f64, 0.0)
}
