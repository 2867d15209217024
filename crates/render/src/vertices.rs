//! Base cube mesh and coordinate axes, sharing one vertex and one index buffer.
//!
//! Vertex buffer layout, each block eight `vec4`s:
//! ```text
//! [cube positions][cube colors][axis positions][axis colors]
//! ```
//! Index buffer layout:
//! ```text
//! [cube strips, separated by PRIMITIVE_RESTART][8 axis line indices]
//! ```
//! The axis renderer draws from [`AXIS_INDEX_BYTE_OFFSET`], the byte length
//! of the cube strips.

use crate::gpu::{
    AttribLocation, BufferId, BufferKind, Gpu, PRIMITIVE_RESTART, StepMode, VertexArrayId,
    check_gpu,
};
use crate::program::{ProgramError, ShaderProgram};

const R: u32 = PRIMITIVE_RESTART;

/// Cube side walls as one strip, then the top and bottom caps.
#[rustfmt::skip]
pub const MESH_INDICES: [u32; 28] = [
    0, 1, 2, 3, 4, 5, 6, 7, 0, 1, R, // sides
    1, 3, 7, 5, R,                   // top
    0, 2, 6, 4,                      // bottom
    0, 1, 2, 3, 4, 5, 6, 7,          // axis lines
];

pub const AXIS_INDEX_COUNT: u32 = 8;
/// Cube strip indices, restart sentinels included.
pub const CUBE_INDEX_COUNT: u32 = MESH_INDICES.len() as u32 - AXIS_INDEX_COUNT;
/// Where the axis indices start in the index buffer.
pub const AXIS_INDEX_BYTE_OFFSET: u64 = CUBE_INDEX_COUNT as u64 * size_of::<u32>() as u64;

const VEC4_BYTES: u64 = size_of::<[f32; 4]>() as u64;
const BLOCK_BYTES: u64 = 8 * VEC4_BYTES;

/// Length of each axis line.
const AXIS_LENGTH: f32 = 5.0;

/// Byte offsets of one position block and its matching color block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexRegion {
    pub positions: u64,
    pub colors: u64,
}

pub const CUBE_REGION: VertexRegion = VertexRegion {
    positions: 0,
    colors: BLOCK_BYTES,
};

pub const AXIS_REGION: VertexRegion = VertexRegion {
    positions: 2 * BLOCK_BYTES,
    colors: 3 * BLOCK_BYTES,
};

/// Cube corners, paired bottom/top around the perimeter.
pub fn cube_positions(half: f32) -> [[f32; 4]; 8] {
    [
        [-half, -half, half, 1.0],
        [-half, half, half, 1.0],
        [half, -half, half, 1.0],
        [half, half, half, 1.0],
        [half, -half, -half, 1.0],
        [half, half, -half, 1.0],
        [-half, -half, -half, 1.0],
        [-half, half, -half, 1.0],
    ]
}

#[rustfmt::skip]
pub const CUBE_COLORS: [[f32; 4]; 8] = [
    [0.20, 0.35, 0.80, 1.0],
    [0.45, 0.65, 1.00, 1.0],
    [0.20, 0.35, 0.80, 1.0],
    [0.45, 0.65, 1.00, 1.0],
    [0.15, 0.25, 0.60, 1.0],
    [0.35, 0.50, 0.90, 1.0],
    [0.15, 0.25, 0.60, 1.0],
    [0.35, 0.50, 0.90, 1.0],
];

/// X, Y and Z from the origin, then a marker pointing down -Z.
pub fn axis_positions() -> [[f32; 4]; 8] {
    let l = AXIS_LENGTH;
    [
        [0.0, 0.0, 0.0, 1.0],
        [l, 0.0, 0.0, 1.0],
        [0.0, 0.0, 0.0, 1.0],
        [0.0, l, 0.0, 1.0],
        [0.0, 0.0, 0.0, 1.0],
        [0.0, 0.0, l, 1.0],
        [0.0, 0.0, 0.0, 1.0],
        [0.0, 0.0, -l, 1.0],
    ]
}

#[rustfmt::skip]
pub const AXIS_COLORS: [[f32; 4]; 8] = [
    [1.0, 0.0, 0.0, 1.0], [1.0, 0.0, 0.0, 1.0],
    [0.0, 1.0, 0.0, 1.0], [0.0, 1.0, 0.0, 1.0],
    [0.0, 0.0, 1.0, 1.0], [0.0, 0.0, 1.0, 1.0],
    [0.6, 0.6, 0.6, 1.0], [0.6, 0.6, 0.6, 1.0],
];

/// The full vertex buffer contents in upload order.
pub fn vertex_data(half: f32) -> Vec<[f32; 4]> {
    let mut data = Vec::with_capacity(32);
    data.extend_from_slice(&cube_positions(half));
    data.extend_from_slice(&CUBE_COLORS);
    data.extend_from_slice(&axis_positions());
    data.extend_from_slice(&AXIS_COLORS);
    data
}

/// Owner of the shared mesh buffers and the two vertex arrays reading them.
#[derive(Debug)]
pub struct Vertices {
    half_extent: f32,
    vertex_buffer: Option<BufferId>,
    index_buffer: Option<BufferId>,
    cube: Option<VertexArrayId>,
    axis: Option<VertexArrayId>,
}

impl Vertices {
    /// `half_extent` is half the cube edge length.
    pub fn new(half_extent: f32) -> Self {
        Self {
            half_extent,
            vertex_buffer: None,
            index_buffer: None,
            cube: None,
            axis: None,
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.cube.is_some()
    }

    /// Upload the mesh and wire `position`/`color` for the cube and the axes.
    pub fn load(&mut self, gpu: &mut dyn Gpu, program: &ShaderProgram) -> Result<(), ProgramError> {
        if !program.is_loaded() {
            return Err(ProgramError::NotReady);
        }
        if self.is_loaded() {
            self.unload(gpu);
        }

        let vertices = vertex_data(self.half_extent);
        let vertex_buffer = gpu.create_buffer(BufferKind::Vertex, bytemuck::cast_slice(&vertices));
        let index_buffer =
            gpu.create_buffer(BufferKind::Index, bytemuck::cast_slice(&MESH_INDICES));
        check_gpu(gpu, "vertices: buffer upload");

        let (position, color) = (program.position_attrib(), program.color_attrib());
        let cube =
            build_vertex_array(gpu, vertex_buffer, index_buffer, CUBE_REGION, position, color);
        let axis =
            build_vertex_array(gpu, vertex_buffer, index_buffer, AXIS_REGION, position, color);

        self.vertex_buffer = Some(vertex_buffer);
        self.index_buffer = Some(index_buffer);
        self.cube = Some(cube);
        self.axis = Some(axis);
        tracing::debug!(
            "mesh uploaded: {} vertices, {} indices",
            vertices.len(),
            MESH_INDICES.len()
        );
        Ok(())
    }

    pub fn bind_cube(&self, gpu: &mut dyn Gpu) {
        gpu.bind_vertex_array(self.cube);
    }

    pub fn bind_axis(&self, gpu: &mut dyn Gpu) {
        gpu.bind_vertex_array(self.axis);
    }

    pub fn unbind(&self, gpu: &mut dyn Gpu) {
        gpu.bind_vertex_array(None);
    }

    pub fn unload(&mut self, gpu: &mut dyn Gpu) {
        for vertex_array in [self.cube.take(), self.axis.take()].into_iter().flatten() {
            gpu.delete_vertex_array(vertex_array);
        }
        for buffer in [self.vertex_buffer.take(), self.index_buffer.take()]
            .into_iter()
            .flatten()
        {
            gpu.delete_buffer(buffer);
        }
    }
}

fn build_vertex_array(
    gpu: &mut dyn Gpu,
    vertex_buffer: BufferId,
    index_buffer: BufferId,
    region: VertexRegion,
    position: Option<AttribLocation>,
    color: Option<AttribLocation>,
) -> VertexArrayId {
    let vertex_array = gpu.create_vertex_array();
    gpu.bind_vertex_array(Some(vertex_array));
    if let Some(location) = position {
        gpu.vertex_attrib(location, vertex_buffer, region.positions, StepMode::PerVertex);
    }
    if let Some(location) = color {
        gpu.vertex_attrib(location, vertex_buffer, region.colors, StepMode::PerVertex);
    }
    gpu.bind_index_buffer(index_buffer);
    gpu.bind_vertex_array(None);
    check_gpu(gpu, "vertices: vertex array setup");
    vertex_array
}
