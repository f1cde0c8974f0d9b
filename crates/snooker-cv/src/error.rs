//! Per-frame failures surfaced to the caller

use snooker_core::ColourId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TrackerError {
    /// No HSV range configured for a colour the frame cannot be processed without.
    #[error("no colour range configured for {0}, cannot build its mask")]
    MissingMask(ColourId),

    /// Table boundary detection was requested but the cloth mask has no contours.
    #[error("no table cloth contours found in frame")]
    NoContours,

    #[error("input frame is empty")]
    EmptyFrame,

    #[error(transparent)]
    OpenCv(#[from] opencv::Error),
}
