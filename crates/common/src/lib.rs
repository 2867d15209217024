//! Shared types for the maze renderer.
//!
//! # Invariants
//! - A `GridMap` is immutable once built.
//! - Configuration is validated before anything consumes it.

pub mod config;
pub mod grid;
pub mod types;

pub use config::{CameraConfig, ConfigError, MazeConfig, StepConfig, StrategyPreference};
pub use grid::{GridError, GridMap};
pub use types::{Axis, Direction, look_at_is_degenerate};

pub fn crate_info() -> &'static str {
    "maze-common v0.1.0"
}
