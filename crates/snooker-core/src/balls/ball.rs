use super::colour::ColourId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Millimetres per pixel, assuming a 1280 px frame spans 40 mm of table.
pub const PIXELS_TO_MM: f64 = 40.0 / 1280.0;

/// Balls grouped by colour.
pub type BallMap = BTreeMap<ColourId, Vec<Ball>>;

/// A circular region detected in the binary frame, not yet given a colour.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Blob {
    pub x: f64,
    pub y: f64,
    pub radius: f64,
}

impl Blob {
    pub fn new(x: f64, y: f64, radius: f64) -> Self {
        Self { x, y, radius }
    }

    pub fn position(&self) -> (f64, f64) {
        (self.x, self.y)
    }

    /// Euclidean distance to `other` in millimetres.
    pub fn distance_mm(&self, other: &Blob) -> f64 {
        let dx = (self.x - other.x) * PIXELS_TO_MM;
        let dy = (self.y - other.y) * PIXELS_TO_MM;
        (dx * dx + dy * dy).sqrt()
    }
}

/// A blob attributed to a ball colour.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ball {
    pub blob: Blob,
    pub colour: ColourId,
    pub is_moving: bool,
}

impl Ball {
    pub fn new(blob: Blob, colour: ColourId) -> Self {
        Self {
            blob,
            colour,
            is_moving: false,
        }
    }

    pub fn distance_mm(&self, other: &Ball) -> f64 {
        self.blob.distance_mm(&other.blob)
    }

    /// Move this ball to `blob`, keeping its colour and movement flag.
    pub fn relocate(&mut self, blob: Blob) {
        self.blob = blob;
    }
}

/// Empty ball lists for each of `colours`.
pub fn empty_ball_map<I: IntoIterator<Item = ColourId>>(colours: I) -> BallMap {
    colours.into_iter().map(|colour| (colour, Vec::new())).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_is_scaled_to_millimetres() {
        let a = Blob::new(0.0, 0.0, 5.0);
        let b = Blob::new(32.0, 0.0, 5.0);
        assert!((a.distance_mm(&b) - 1.0).abs() < 1e-9);
        assert_eq!(a.distance_mm(&a), 0.0);
    }

    #[test]
    fn test_relocate_keeps_colour_and_flag() {
        let mut ball = Ball::new(Blob::new(1.0, 2.0, 3.0), ColourId::Pink);
        ball.is_moving = true;
        ball.relocate(Blob::new(4.0, 5.0, 6.0));
        assert_eq!(ball.colour, ColourId::Pink);
        assert!(ball.is_moving);
        assert_eq!(ball.blob.position(), (4.0, 5.0));
    }
}
