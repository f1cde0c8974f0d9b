//! Frame normalization: resize, HSV conversion and the ball/cloth threshold

use crate::detection::{CropMode, TrackerConfig};
use crate::error::TrackerError;
use crate::region::ColourRegionExtractor;
use crate::table::TableBoundaryDetector;
use opencv::{
    core::{self, Mat, Point, Size, Vector},
    imgproc,
    prelude::*,
};
use snooker_core::{ColourId, ColourRange};
use std::collections::BTreeMap;

/// Colour, binary and HSV views of one frame.
#[derive(Debug)]
pub struct NormalizedFrame {
    pub frame: Mat,
    /// Balls white, cloth black.
    pub binary: Mat,
    pub hsv: Mat,
}

/// A normalized frame before the table boundary is applied.
#[derive(Debug)]
pub struct PreparedFrame {
    pub views: NormalizedFrame,
    /// External contours of the cloth mask.
    pub table_contours: Vector<Vector<Point>>,
}

#[derive(Debug, Clone)]
pub struct FrameNormalizer {
    width: i32,
    morph_kernel_size: i32,
}

impl FrameNormalizer {
    pub fn new(width: i32, morph_kernel_size: i32) -> Self {
        Self {
            width,
            morph_kernel_size,
        }
    }

    pub fn from_config(config: &TrackerConfig) -> Self {
        Self::new(config.frame_width, config.morph_kernel_size)
    }

    /// Resize to the working width, keeping the aspect ratio.
    pub fn resize(&self, frame: &Mat) -> opencv::Result<Mat> {
        let size = frame.size()?;
        if self.width <= 0 || size.width == self.width {
            return frame.try_clone();
        }

        let scale = self.width as f64 / size.width as f64;
        let height = ((size.height as f64 * scale) as i32).max(1);
        let mut resized = Mat::default();
        imgproc::resize(
            frame,
            &mut resized,
            Size::new(self.width, height),
            0.0,
            0.0,
            imgproc::INTER_AREA,
        )?;
        Ok(resized)
    }

    /// Resize, convert to HSV and threshold against the cloth colour.
    pub fn prepare(
        &self,
        frame: &Mat,
        ranges: &BTreeMap<ColourId, ColourRange>,
        morph: bool,
    ) -> Result<PreparedFrame, TrackerError> {
        if frame.empty() {
            return Err(TrackerError::EmptyFrame);
        }
        let table_range = ranges
            .get(&ColourId::Table)
            .ok_or(TrackerError::MissingMask(ColourId::Table))?;

        let frame = self.resize(frame)?;
        let mut hsv = Mat::default();
        imgproc::cvt_color_def(&frame, &mut hsv, imgproc::COLOR_BGR2HSV)?;

        let cloth = ColourRegionExtractor::extract_range(&hsv, table_range)?;
        let mut binary = Mat::default();
        core::bitwise_not(&cloth.mask, &mut binary, &core::no_array())?;

        if morph {
            binary = self.close(&binary)?;
        }

        Ok(PreparedFrame {
            views: NormalizedFrame { frame, binary, hsv },
            table_contours: cloth.contours,
        })
    }

    /// Restrict all three views to the table boundary, when one is known.
    pub fn restrict(
        views: NormalizedFrame,
        table: &TableBoundaryDetector,
        crop: Option<CropMode>,
    ) -> opencv::Result<NormalizedFrame> {
        let Some(mode) = crop else {
            return Ok(views);
        };
        let cut = mode == CropMode::Crop;
        Ok(NormalizedFrame {
            frame: table.apply(&views.frame, cut)?,
            binary: table.apply(&views.binary, cut)?,
            hsv: table.apply(&views.hsv, cut)?,
        })
    }

    /// `prepare` followed by `restrict` against an already detected boundary.
    pub fn normalize(
        &self,
        frame: &Mat,
        ranges: &BTreeMap<ColourId, ColourRange>,
        table: &TableBoundaryDetector,
        crop: Option<CropMode>,
        morph: bool,
    ) -> Result<NormalizedFrame, TrackerError> {
        let prepared = self.prepare(frame, ranges, morph)?;
        Ok(Self::restrict(prepared.views, table, crop)?)
    }

    fn close(&self, binary: &Mat) -> opencv::Result<Mat> {
        let kernel = imgproc::get_structuring_element(
            imgproc::MORPH_ELLIPSE,
            Size::new(self.morph_kernel_size, self.morph_kernel_size),
            Point::new(-1, -1),
        )?;
        let mut closed = Mat::default();
        imgproc::morphology_ex(
            binary,
            &mut closed,
            imgproc::MORPH_CLOSE,
            &kernel,
            Point::new(-1, -1),
            1,
            core::BORDER_CONSTANT,
            imgproc::morphology_default_border_value()?,
        )?;
        Ok(closed)
    }
}
