//! Colour attribution of detected blobs
//!
//! Colour regions overlap in HSV space, so attribution is order sensitive:
//! colours are tried in configured priority order and the first region that
//! strictly contains the blob centre wins.

use crate::balls::{empty_ball_map, Ball, BallMap, Blob, ColourId};
use std::collections::BTreeMap;

/// Result of a point-in-region test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Containment {
    Inside,
    OnEdge,
    Outside,
}

impl Containment {
    /// Map a signed polygon test result (positive inside, zero on the edge).
    pub fn from_signed(value: f64) -> Self {
        if value > 0.0 {
            Containment::Inside
        } else if value < 0.0 {
            Containment::Outside
        } else {
            Containment::OnEdge
        }
    }
}

/// A closed area of one colour in the frame.
pub trait ColourRegion {
    type Error;

    /// Enclosed area, used to pick the biggest region of a colour.
    fn area(&self) -> f64;

    fn test_point(&self, x: f64, y: f64) -> Result<Containment, Self::Error>;
}

/// One entry of the classification priority list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColourPriority {
    pub colour: ColourId,
    /// Only test the region of maximum area for this colour.
    pub biggest_contour: bool,
}

/// Attribute each blob to at most one colour.
///
/// Boundary points count as outside: only [`Containment::Inside`] is a match.
/// Blobs that match no colour are discarded. The returned map has an entry
/// for every colour in `priorities`.
pub fn classify_blobs<R: ColourRegion>(
    blobs: &[Blob],
    regions: &BTreeMap<ColourId, Vec<R>>,
    priorities: &[ColourPriority],
) -> Result<BallMap, R::Error> {
    let mut balls = empty_ball_map(priorities.iter().map(|p| p.colour));

    for blob in blobs {
        for priority in priorities {
            let Some(colour_regions) = regions.get(&priority.colour) else {
                continue;
            };
            if blob_in_regions(blob, colour_regions, priority.biggest_contour)? {
                balls
                    .entry(priority.colour)
                    .or_default()
                    .push(Ball::new(*blob, priority.colour));
                break;
            }
        }
    }

    Ok(balls)
}

fn blob_in_regions<R: ColourRegion>(
    blob: &Blob,
    regions: &[R],
    biggest_contour: bool,
) -> Result<bool, R::Error> {
    if biggest_contour && regions.len() > 1 {
        // First region of maximum area, matching a linear max scan.
        let mut biggest = &regions[0];
        for region in &regions[1..] {
            if region.area() > biggest.area() {
                biggest = region;
            }
        }
        return Ok(biggest.test_point(blob.x, blob.y)? == Containment::Inside);
    }

    for region in regions {
        if region.test_point(blob.x, blob.y)? == Containment::Inside {
            return Ok(true);
        }
    }
    Ok(false)
}
