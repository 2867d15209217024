//! wgpu backend for the maze renderer.
//!
//! [`WgpuGpu`] implements the immediate-mode [`maze_render::Gpu`] surface on
//! top of wgpu. Calls made during a frame are recorded and replayed into one
//! render pass by [`WgpuGpu::present`].
//!
//! # Invariants
//! - Attribute slots are fixed: `position` 0, `color` 1, `offset` 2 (per instance).
//! - Every recorded draw gets its own uniform slot, addressed by dynamic offset.

mod gpu;
mod shaders;

pub use gpu::WgpuGpu;
pub use shaders::{MAZE_FRAGMENT, MAZE_VERTEX, program_source};
