//! Utility modules

pub mod image;

pub use image::ImageUtils;
