//! Ball and colour primitives

pub mod ball;
pub mod colour;

pub use ball::{empty_ball_map, Ball, BallMap, Blob, PIXELS_TO_MM};
pub use colour::{ColourId, UnknownColour};
