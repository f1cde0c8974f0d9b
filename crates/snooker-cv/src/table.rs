//! Table cloth boundary tracking

use opencv::{
    core::{Mat, Point, Rect, Scalar, Size, Vector, CV_8UC1},
    imgproc,
    prelude::*,
};
use tracing::debug;

/// Largest cloth contour together with its filled mask.
#[derive(Debug, Clone)]
pub struct TableBoundary {
    pub contour: Vector<Point>,
    pub mask: Mat,
    pub bounds: Rect,
}

impl TableBoundary {
    pub fn from_contour(frame_size: Size, contour: Vector<Point>) -> opencv::Result<Self> {
        let mut mask = Mat::new_size_with_default(frame_size, CV_8UC1, Scalar::all(0.0))?;
        let mut contours = Vector::<Vector<Point>>::new();
        contours.push(contour.clone());
        imgproc::draw_contours(
            &mut mask,
            &contours,
            -1,
            Scalar::all(255.0),
            imgproc::FILLED,
            imgproc::LINE_8,
            &opencv::core::no_array(),
            i32::MAX,
            Point::new(0, 0),
        )?;
        let bounds = imgproc::bounding_rect(&contour)?;
        Ok(Self {
            contour,
            mask,
            bounds,
        })
    }

    /// Blank everything outside the boundary.
    pub fn fill(&self, frame: &Mat) -> opencv::Result<Mat> {
        let mut out = Mat::new_size_with_default(frame.size()?, frame.typ(), Scalar::all(0.0))?;
        frame.copy_to_masked(&mut out, &self.mask)?;
        Ok(out)
    }

    /// Blank everything outside the boundary, then cut to its bounding box.
    pub fn crop(&self, frame: &Mat) -> opencv::Result<Mat> {
        let filled = self.fill(frame)?;
        let cropped = Mat::roi(&filled, self.bounds)?.try_clone()?;
        Ok(cropped)
    }

    fn fits(&self, frame: &Mat) -> opencv::Result<bool> {
        Ok(self.mask.size()? == frame.size()?)
    }
}

/// Keeps the most recently detected table boundary.
#[derive(Debug, Default)]
pub struct TableBoundaryDetector {
    boundary: Option<TableBoundary>,
}

impl TableBoundaryDetector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn boundary(&self) -> Option<&TableBoundary> {
        self.boundary.as_ref()
    }

    /// Replace the boundary with the largest of `contours`.
    ///
    /// With no contours the previous boundary is cleared.
    pub fn detect(
        &mut self,
        frame_size: Size,
        contours: &Vector<Vector<Point>>,
    ) -> opencv::Result<Option<&TableBoundary>> {
        let mut largest: Option<(f64, Vector<Point>)> = None;
        for contour in contours.iter() {
            let area = imgproc::contour_area(&contour, false)?;
            if largest.as_ref().is_none_or(|(best, _)| area > *best) {
                largest = Some((area, contour));
            }
        }

        self.boundary = match largest {
            Some((area, contour)) => {
                debug!(area, "table boundary updated");
                Some(TableBoundary::from_contour(frame_size, contour)?)
            }
            None => None,
        };
        Ok(self.boundary.as_ref())
    }

    /// Apply the current boundary, or pass the frame through when there is none.
    pub fn apply(&self, frame: &Mat, crop: bool) -> opencv::Result<Mat> {
        match &self.boundary {
            Some(boundary) if boundary.fits(frame)? => {
                if crop {
                    boundary.crop(frame)
                } else {
                    boundary.fill(frame)
                }
            }
            Some(_) => {
                debug!("table boundary does not match frame size, skipping");
                frame.try_clone()
            }
            None => frame.try_clone(),
        }
    }
}
