use crate::gpu::{
    AttribLocation, Gpu, ProgramId, ShaderId, ShaderStage, UniformLocation, check_gpu, names,
};
use glam::Mat4;
use maze_scene::TransformStore;
use std::borrow::Cow;

/// Errors from the shader program lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProgramError {
    #[error("program is already loaded")]
    AlreadyLoaded,
    #[error("failed to compile {stage} shader: {log}")]
    Compile { stage: ShaderStage, log: String },
    #[error("driver refused to create a program object")]
    Create,
    #[error("failed to link program: {0}")]
    Link(String),
    #[error("program is not loaded")]
    NotReady,
}

/// Vertex and fragment source text for one program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramSource {
    pub vertex: Cow<'static, str>,
    pub fragment: Cow<'static, str>,
}

impl ProgramSource {
    pub fn new(
        vertex: impl Into<Cow<'static, str>>,
        fragment: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self {
            vertex: vertex.into(),
            fragment: fragment.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ProgramState {
    Unloaded,
    Linked(ProgramId),
}

/// Owns the maze shader program and the MVP uniform.
///
/// The combined `projection * view * model` matrix is only recomputed and
/// uploaded by [`apply_mvp`](Self::apply_mvp) when the transform store
/// reports a change; the cached product is what
/// [`upload_mvp`](Self::upload_mvp) re-sends for individual draws.
#[derive(Debug)]
pub struct ShaderProgram {
    source: ProgramSource,
    state: ProgramState,
    clear_color: [f32; 4],
    mvp_location: Option<UniformLocation>,
    position: Option<AttribLocation>,
    color: Option<AttribLocation>,
    mvp: Mat4,
    mvp_uploads: u64,
}

impl ShaderProgram {
    pub fn new(source: ProgramSource) -> Self {
        Self {
            source,
            state: ProgramState::Unloaded,
            clear_color: [0.0, 0.0, 0.0, 1.0],
            mvp_location: None,
            position: None,
            color: None,
            mvp: Mat4::IDENTITY,
            mvp_uploads: 0,
        }
    }

    pub fn with_clear_color(mut self, color: [f32; 4]) -> Self {
        self.clear_color = color;
        self
    }

    pub fn id(&self) -> Option<ProgramId> {
        match self.state {
            ProgramState::Linked(id) => Some(id),
            ProgramState::Unloaded => None,
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.id().is_some()
    }

    /// Compile both stages and link them.
    ///
    /// Shader objects are always released once linking has been attempted.
    pub fn load(&mut self, gpu: &mut dyn Gpu) -> Result<(), ProgramError> {
        if self.is_loaded() {
            tracing::warn!("program is already created");
            return Err(ProgramError::AlreadyLoaded);
        }

        let vertex = compile(gpu, ShaderStage::Vertex, &self.source.vertex)?;
        let fragment = match compile(gpu, ShaderStage::Fragment, &self.source.fragment) {
            Ok(shader) => shader,
            Err(e) => {
                gpu.delete_shader(vertex);
                return Err(e);
            }
        };

        let Some(program) = gpu.create_program() else {
            gpu.delete_shader(vertex);
            gpu.delete_shader(fragment);
            tracing::error!("failed to create program object");
            return Err(ProgramError::Create);
        };

        let linked = gpu.link_program(program, vertex, fragment);
        gpu.delete_shader(vertex);
        gpu.delete_shader(fragment);

        if let Err(log) = linked {
            tracing::error!("failed to link program: {log}");
            gpu.delete_program(program);
            return Err(ProgramError::Link(log));
        }

        self.state = ProgramState::Linked(program);
        tracing::info!("program {} linked", program.0);
        Ok(())
    }

    /// Resolve the `mvp` uniform and the per-vertex attributes.
    pub fn map(&mut self, gpu: &mut dyn Gpu) -> Result<(), ProgramError> {
        let program = self.id().ok_or(ProgramError::NotReady)?;
        self.mvp_location = gpu.uniform_location(program, names::MVP);
        self.position = gpu.attrib_location(program, names::POSITION);
        self.color = gpu.attrib_location(program, names::COLOR);
        tracing::info!(
            "mvp index: {:?}, position index: {:?}, color index: {:?}",
            self.mvp_location.map(|l| l.0),
            self.position.map(|l| l.0),
            self.color.map(|l| l.0),
        );
        if self.mvp_location.is_none() {
            tracing::warn!("shader does not use the mvp uniform");
        }
        Ok(())
    }

    /// Look up any uniform of the linked program.
    pub fn uniform(
        &self,
        gpu: &mut dyn Gpu,
        name: &str,
    ) -> Result<Option<UniformLocation>, ProgramError> {
        let program = self.id().ok_or(ProgramError::NotReady)?;
        Ok(gpu.uniform_location(program, name))
    }

    /// Look up any vertex attribute of the linked program.
    pub fn attrib(
        &self,
        gpu: &mut dyn Gpu,
        name: &str,
    ) -> Result<Option<AttribLocation>, ProgramError> {
        let program = self.id().ok_or(ProgramError::NotReady)?;
        Ok(gpu.attrib_location(program, name))
    }

    pub fn position_attrib(&self) -> Option<AttribLocation> {
        self.position
    }

    pub fn color_attrib(&self) -> Option<AttribLocation> {
        self.color
    }

    /// Start a frame: clear, activate the program, and upload the combined
    /// matrix if any transform changed since the last upload.
    ///
    /// Returns whether an upload happened.
    pub fn apply_mvp(
        &mut self,
        gpu: &mut dyn Gpu,
        transforms: &mut TransformStore,
    ) -> Result<bool, ProgramError> {
        let program = self.id().ok_or(ProgramError::NotReady)?;

        gpu.clear(self.clear_color);
        gpu.use_program(program);
        check_gpu(gpu, "program: use");

        if !transforms.updated() {
            return Ok(false);
        }

        // Order of multiplication is projection * view * model.
        self.mvp = transforms.combined();
        if let Some(location) = self.mvp_location {
            gpu.set_uniform_mat4(location, &self.mvp);
            check_gpu(gpu, "program: mvp upload");
        }
        self.mvp_uploads += 1;
        tracing::debug!("update MVP ({} uploads)", self.mvp_uploads);
        Ok(true)
    }

    /// Re-send the cached combined matrix.
    pub fn upload_mvp(&self, gpu: &mut dyn Gpu) {
        if let Some(location) = self.mvp_location {
            gpu.set_uniform_mat4(location, &self.mvp);
        }
    }

    /// Combined matrix as of the last [`apply_mvp`](Self::apply_mvp) upload.
    pub fn mvp(&self) -> Mat4 {
        self.mvp
    }

    /// How many times `apply_mvp` recomputed and uploaded the matrix.
    pub fn mvp_uploads(&self) -> u64 {
        self.mvp_uploads
    }

    /// Delete the program. Safe to call repeatedly.
    pub fn unload(&mut self, gpu: &mut dyn Gpu) {
        if let ProgramState::Linked(program) = self.state {
            gpu.delete_program(program);
            tracing::debug!("program {} deleted", program.0);
        }
        self.state = ProgramState::Unloaded;
        self.mvp_location = None;
        self.position = None;
        self.color = None;
    }
}

fn compile(gpu: &mut dyn Gpu, stage: ShaderStage, source: &str) -> Result<ShaderId, ProgramError> {
    gpu.compile_shader(stage, source).map_err(|log| {
        tracing::error!("failed to compile {stage} shader: {log}");
        ProgramError::Compile { stage, log }
    })
}
