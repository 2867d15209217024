use glam::{Mat4, Vec4};

/// Handle to a compiled shader object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShaderId(pub u32);

/// Handle to a GPU program. Backends never hand out a zero handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProgramId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BufferId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VertexArrayId(pub u32);

/// Resolved uniform slot. Missing uniforms resolve to `None` instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UniformLocation(pub u32);

/// Resolved vertex attribute slot. Missing attributes resolve to `None` instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AttribLocation(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl std::fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShaderStage::Vertex => f.write_str("vertex"),
            ShaderStage::Fragment => f.write_str("fragment"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferKind {
    Vertex,
    Index,
}

/// How often a vertex attribute advances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepMode {
    PerVertex,
    PerInstance,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    /// Triangle strips; `PRIMITIVE_RESTART` in the index stream starts a new strip.
    TriangleStrip,
    Lines,
}

/// Index value that terminates one strip and begins the next.
pub const PRIMITIVE_RESTART: u32 = 0xFFFF_FFFF;

/// Names shared between the shader sources and the code that binds them.
pub mod names {
    pub const MVP: &str = "mvp";
    pub const OFFSET: &str = "offset";
    pub const IS_BLOCK: &str = "isBlock";
    pub const POSITION: &str = "position";
    pub const COLOR: &str = "color";
}

/// A failed GPU call, detected after the fact.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("GPU call at {site} failed: {message}")]
pub struct GpuError {
    pub site: &'static str,
    pub message: String,
}

/// Immediate-mode GPU device as seen by the maze renderers.
///
/// The surface follows the classic program/uniform/vertex-array model:
/// uniforms belong to the program in use, attribute bindings and the index
/// buffer belong to the bound vertex array, and draws read whatever is
/// current. Calls never fail synchronously; backends queue a diagnostic that
/// [`take_error`](Gpu::take_error) hands out later.
///
/// All vertex attributes are four `f32` components.
pub trait Gpu {
    /// Whether one draw call can replicate a mesh across instances.
    fn supports_instancing(&self) -> bool;

    /// Compile one stage. `Err` carries the compiler log.
    fn compile_shader(&mut self, stage: ShaderStage, source: &str) -> Result<ShaderId, String>;
    fn delete_shader(&mut self, shader: ShaderId);

    /// `None` when the driver refuses to create a program object.
    fn create_program(&mut self) -> Option<ProgramId>;
    /// Link the two stages into `program`. `Err` carries the linker log.
    fn link_program(
        &mut self,
        program: ProgramId,
        vertex: ShaderId,
        fragment: ShaderId,
    ) -> Result<(), String>;
    fn delete_program(&mut self, program: ProgramId);
    fn use_program(&mut self, program: ProgramId);

    fn uniform_location(&mut self, program: ProgramId, name: &str) -> Option<UniformLocation>;
    fn attrib_location(&mut self, program: ProgramId, name: &str) -> Option<AttribLocation>;

    fn set_uniform_mat4(&mut self, location: UniformLocation, value: &Mat4);
    fn set_uniform_vec4(&mut self, location: UniformLocation, value: Vec4);
    fn set_uniform_i32(&mut self, location: UniformLocation, value: i32);

    /// Clear color and depth for the current frame.
    fn clear(&mut self, color: [f32; 4]);

    fn create_buffer(&mut self, kind: BufferKind, data: &[u8]) -> BufferId;
    fn delete_buffer(&mut self, buffer: BufferId);

    fn create_vertex_array(&mut self) -> VertexArrayId;
    fn delete_vertex_array(&mut self, vertex_array: VertexArrayId);
    /// `None` unbinds.
    fn bind_vertex_array(&mut self, vertex_array: Option<VertexArrayId>);
    /// Point `location` of the bound vertex array at `buffer`, starting at `byte_offset`.
    fn vertex_attrib(
        &mut self,
        location: AttribLocation,
        buffer: BufferId,
        byte_offset: u64,
        step: StepMode,
    );
    /// Attach `buffer` as the index buffer of the bound vertex array.
    fn bind_index_buffer(&mut self, buffer: BufferId);

    /// Draw `index_count` `u32` indices starting at `byte_offset` into the index buffer.
    fn draw_elements(&mut self, primitive: Primitive, index_count: u32, byte_offset: u64);
    /// Same as [`draw_elements`](Gpu::draw_elements), replicated `instances` times.
    fn draw_elements_instanced(
        &mut self,
        primitive: Primitive,
        index_count: u32,
        byte_offset: u64,
        instances: u32,
    );

    /// Oldest pending diagnostic, if any.
    fn take_error(&mut self) -> Option<String>;
}

/// Poll for a failure of the preceding call and log it against `site`.
///
/// Failures are diagnostic only; the caller carries on either way.
pub fn check_gpu(gpu: &mut dyn Gpu, site: &'static str) -> Option<GpuError> {
    let message = gpu.take_error()?;
    let err = GpuError { site, message };
    tracing::warn!("{err}");
    Some(err)
}
