//! Per-frame tracking orchestration

pub mod engine;
pub mod render;

pub use engine::{BallTrackingEngine, EngineStats, FrameOptions, FrameOutput, PassKind};
pub use render::BallRenderer;
