//! Image I/O and `image` ↔ `Mat` conversions using opencv-match

use crate::Result;
use anyhow::Context;
use opencv::{
    core::{Mat, Vector},
    imgcodecs::{self, IMREAD_COLOR},
    prelude::*,
};
use opencv_match::prelude::*;
use std::path::Path;

/// Image utility functions
pub struct ImageUtils;

impl ImageUtils {
    /// Load image directly from path as OpenCV Mat (BGR)
    pub fn load_mat_color<P: AsRef<Path>>(path: P) -> Result<Mat> {
        let path_str = path.as_ref().to_string_lossy();

        let mat = imgcodecs::imread(&path_str, IMREAD_COLOR)
            .with_context(|| format!("Failed to load color image: {}", path_str))?;
        anyhow::ensure!(!mat.empty(), "Unreadable image: {}", path_str);
        Ok(mat)
    }

    /// Save Mat as image
    pub fn save_image<P: AsRef<Path>>(mat: &Mat, path: P) -> Result<()> {
        let path_str = path.as_ref().to_string_lossy();

        imgcodecs::imwrite(&path_str, mat, &Vector::new())
            .with_context(|| format!("Failed to save image: {}", path_str))?;

        Ok(())
    }

    /// Convert image::RgbImage to OpenCV Mat using opencv-match
    pub fn rgb_to_mat(rgb_image: &image::RgbImage) -> Result<Mat> {
        rgb_image
            .try_into_cv()
            .context("Failed to convert RGB image to OpenCV Mat")
    }

    /// Convert OpenCV Mat to image::RgbImage using opencv-match
    pub fn mat_to_rgb(mat: &Mat) -> Result<image::RgbImage> {
        mat.try_into_cv()
            .context("Failed to convert OpenCV Mat to RGB image")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use opencv::core::{Scalar, CV_8UC3};

    #[test]
    fn test_image_conversions() -> Result<()> {
        let rgb_img = image::RgbImage::from_pixel(40, 30, image::Rgb([90, 90, 90]));

        let mat = ImageUtils::rgb_to_mat(&rgb_img)?;
        assert_eq!(mat.cols(), 40);
        assert_eq!(mat.rows(), 30);

        let rgb_back = ImageUtils::mat_to_rgb(&mat)?;
        assert_eq!(rgb_img.dimensions(), rgb_back.dimensions());
        assert_eq!(rgb_back.get_pixel(3, 4), &image::Rgb([90, 90, 90]));
        Ok(())
    }

    #[test]
    fn test_save_then_load_keeps_bgr_layout() -> Result<()> {
        let dir = std::env::temp_dir().join(format!("snooker-cv-image-{}", std::process::id()));
        std::fs::create_dir_all(&dir)?;
        let path = dir.join("frame.png");

        let colour = Scalar::new(200.0, 50.0, 10.0, 0.0);
        let bgr = Mat::new_rows_cols_with_default(12, 16, CV_8UC3, colour)?;
        ImageUtils::save_image(&bgr, &path)?;

        let loaded = ImageUtils::load_mat_color(&path)?;
        assert_eq!((loaded.cols(), loaded.rows()), (16, 12));
        let px = *loaded.at_2d::<opencv::core::Vec3b>(5, 5)?;
        assert_eq!([px[0], px[1], px[2]], [200, 50, 10]);

        std::fs::remove_dir_all(&dir)?;
        Ok(())
    }

    #[test]
    fn test_missing_file_is_an_error() {
        assert!(ImageUtils::load_mat_color("/nonexistent/snooker/frame.png").is_err());
    }
}
