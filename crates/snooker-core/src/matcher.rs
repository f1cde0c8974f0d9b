//! Cheap positional tracking between classification passes

use crate::balls::{BallMap, Blob, ColourId};

/// Maximum distance, in millimetres, for a new blob to be taken as an
/// existing ball.
pub const MATCH_THRESHOLD_MM: f64 = 0.3;

/// Colour scan order when looking for the ball a blob belongs to. White is
/// tried last.
pub const MATCH_ORDER: [ColourId; 8] = [
    ColourId::Red,
    ColourId::Yellow,
    ColourId::Green,
    ColourId::Brown,
    ColourId::Blue,
    ColourId::Pink,
    ColourId::Black,
    ColourId::White,
];

/// Moves already-known balls onto newly detected blobs.
///
/// Matching is first-fit: colours are scanned in [`MATCH_ORDER`] and balls in list
/// order, and the first ball within the threshold takes the blob. Blobs that
/// match nothing are dropped, so the roster never grows here.
#[derive(Debug, Clone, Copy)]
pub struct BallMatcher {
    threshold_mm: f64,
}

impl BallMatcher {
    pub fn new() -> Self {
        Self::with_threshold(MATCH_THRESHOLD_MM)
    }

    pub fn with_threshold(threshold_mm: f64) -> Self {
        Self { threshold_mm }
    }

    /// Update `previous` in place from `detected`. Returns how many blobs
    /// were matched.
    pub fn update(&self, previous: &mut BallMap, detected: &[Blob]) -> usize {
        let mut matched = 0;

        for blob in detected {
            let hit = MATCH_ORDER.iter().find_map(|colour| {
                previous
                    .get(colour)?
                    .iter()
                    .position(|ball| ball.blob.distance_mm(blob) <= self.threshold_mm)
                    .map(|index| (*colour, index))
            });

            let ball = hit.and_then(|(colour, index)| previous.get_mut(&colour)?.get_mut(index));
            if let Some(ball) = ball {
                ball.relocate(*blob);
                matched += 1;
            }
        }

        matched
    }
}

impl Default for BallMatcher {
    fn default() -> Self {
        Self::new()
    }
}
