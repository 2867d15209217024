//! Renderer-agnostic maze pipeline.
//!
//! Everything here talks to the device through the [`Gpu`] trait, so the
//! same code drives a real wgpu surface and the headless [`RecordingGpu`].
//!
//! # Invariants
//! - A frame is: clear, program activation, MVP upload if anything changed,
//!   block draws, axis draw.
//! - `isBlock` is raised only for the duration of the block draws.
//! - GPU call failures are logged and never abort a frame.

pub mod axis;
pub mod block;
pub mod gpu;
pub mod program;
pub mod recording;
pub mod scene;
pub mod vertices;

pub use axis::AxisRenderer;
pub use block::{BlockError, BlockRenderer, DrawStrategy, InstanceDrawer, InstanceOffsets};
pub use gpu::{
    AttribLocation, BufferId, BufferKind, Gpu, GpuError, PRIMITIVE_RESTART, Primitive, ProgramId,
    ShaderId, ShaderStage, StepMode, UniformLocation, VertexArrayId, check_gpu, names,
};
pub use program::{ProgramError, ProgramSource, ShaderProgram};
pub use recording::{GpuCommand, RecordingGpu};
pub use scene::{FrameStats, Scene, SceneError};
pub use vertices::Vertices;

pub fn crate_info() -> &'static str {
    "maze-render v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("render"));
    }
}
