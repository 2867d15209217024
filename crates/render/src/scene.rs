use crate::axis::AxisRenderer;
use crate::block::{BlockError, BlockRenderer, DrawStrategy};
use crate::gpu::Gpu;
use crate::program::{ProgramError, ProgramSource, ShaderProgram};
use crate::vertices::Vertices;
use maze_common::{GridError, MazeConfig};
use maze_scene::TransformStore;

#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    #[error(transparent)]
    Grid(#[from] GridError),
    #[error(transparent)]
    Program(#[from] ProgramError),
    #[error(transparent)]
    Block(#[from] BlockError),
}

/// What one call to [`Scene::frame`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameStats {
    pub mvp_uploaded: bool,
    pub instances_drawn: u32,
}

/// The render context: a GPU backend and everything living on it.
///
/// GPU resources are released in [`teardown`](Self::teardown), which `Drop`
/// also runs, so they always go before the backend itself.
#[derive(Debug)]
pub struct Scene<G: Gpu> {
    transforms: TransformStore,
    program: ShaderProgram,
    vertices: Vertices,
    blocks: BlockRenderer,
    axes: AxisRenderer,
    torn_down: bool,
    gpu: G,
}

impl<G: Gpu> Scene<G> {
    /// Load the program, the shared mesh and the blocks, in that order.
    ///
    /// On failure everything loaded so far is released again.
    pub fn new(
        mut gpu: G,
        config: &MazeConfig,
        aspect: f32,
        source: ProgramSource,
    ) -> Result<Self, SceneError> {
        let grid = config.grid_map()?;
        let strategy = DrawStrategy::resolve(config.strategy, gpu.supports_instancing());
        tracing::info!(
            "maze {}x{}, {} walls, drawing {strategy}",
            grid.width(),
            grid.height(),
            grid.occupied_count()
        );
        let mut blocks = BlockRenderer::new(&grid, config.cell_width, strategy)?;

        let mut program = ShaderProgram::new(source).with_clear_color(config.clear_color);
        program.load(&mut gpu)?;

        let mut vertices = Vertices::new(config.cell_width);
        let loaded = program
            .map(&mut gpu)
            .and_then(|()| vertices.load(&mut gpu, &program))
            .and_then(|()| blocks.load(&mut gpu, &program, &vertices));
        if let Err(e) = loaded {
            tracing::error!("scene setup failed: {e}");
            blocks.unload(&mut gpu);
            vertices.unload(&mut gpu);
            program.unload(&mut gpu);
            return Err(e.into());
        }

        Ok(Self {
            transforms: TransformStore::from_camera(&config.camera, aspect),
            program,
            vertices,
            blocks,
            axes: AxisRenderer::new(),
            torn_down: false,
            gpu,
        })
    }

    /// Render one frame: blocks first, then the axes.
    pub fn frame(&mut self) -> Result<FrameStats, ProgramError> {
        if self.torn_down {
            return Err(ProgramError::NotReady);
        }
        let mvp_uploaded = self.program.apply_mvp(&mut self.gpu, &mut self.transforms)?;
        let instances_drawn = self
            .blocks
            .render(&mut self.gpu, &self.program, &self.vertices);
        self.axes.render(&mut self.gpu, &self.program, &self.vertices);
        Ok(FrameStats {
            mvp_uploaded,
            instances_drawn,
        })
    }

    pub fn transforms(&self) -> &TransformStore {
        &self.transforms
    }

    pub fn transforms_mut(&mut self) -> &mut TransformStore {
        &mut self.transforms
    }

    pub fn program(&self) -> &ShaderProgram {
        &self.program
    }

    pub fn blocks(&self) -> &BlockRenderer {
        &self.blocks
    }

    pub fn gpu(&self) -> &G {
        &self.gpu
    }

    pub fn gpu_mut(&mut self) -> &mut G {
        &mut self.gpu
    }

    /// Track a new surface aspect ratio.
    pub fn resize(&mut self, aspect: f32) {
        self.transforms.projection.set_aspect(aspect);
    }

    /// Release blocks, then the mesh, then the program. Safe to call repeatedly.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.blocks.unload(&mut self.gpu);
        self.vertices.unload(&mut self.gpu);
        self.program.unload(&mut self.gpu);
        self.torn_down = true;
        tracing::debug!("scene torn down");
    }
}

impl<G: Gpu> Drop for Scene<G> {
    fn drop(&mut self) {
        self.teardown();
    }
}
