//! Maze wall blocks: one shared cube drawn once per occupied grid cell.
//!
//! The per-cell offsets are computed once from the occupancy grid. Drawing
//! all of them is delegated to an [`InstanceDrawer`]; hardware instancing and
//! a per-instance uniform loop are interchangeable implementations with the
//! same result on screen.

use crate::gpu::{
    AttribLocation, BufferId, BufferKind, Gpu, Primitive, StepMode, UniformLocation, check_gpu,
    names,
};
use crate::program::{ProgramError, ShaderProgram};
use crate::vertices::{CUBE_INDEX_COUNT, Vertices};
use glam::Vec4;
use maze_common::{GridMap, StrategyPreference};
use std::collections::TryReserveError;
use std::fmt;

#[derive(Debug, thiserror::Error)]
pub enum BlockError {
    #[error("failed to allocate {count} instance offsets: {source}")]
    Allocation {
        count: usize,
        source: TryReserveError,
    },
}

/// World-space offsets of every wall block, in row-major grid order.
#[derive(Debug, Clone, PartialEq)]
pub struct InstanceOffsets {
    offsets: Vec<Vec4>,
}

impl InstanceOffsets {
    /// Place one block per occupied cell, centering the maze on the origin.
    ///
    /// Cell `(x, y)` lands at `((x - cx) * 2w, 0, (y - cy) * 2w, 1)` where
    /// `w` is `cell_width` and `(cx, cy)` is [`GridMap::center`].
    pub fn build(grid: &GridMap, cell_width: f32) -> Result<Self, BlockError> {
        let count = grid.occupied_count();
        let mut offsets = Vec::new();
        offsets
            .try_reserve_exact(count)
            .map_err(|source| BlockError::Allocation { count, source })?;

        let (cx, cy) = grid.center();
        let step = cell_width * 2.0;
        offsets.extend(grid.occupied_cells().map(|(x, y)| {
            Vec4::new(
                (x as f32 - cx) * step,
                0.0,
                (y as f32 - cy) * step,
                1.0,
            )
        }));

        debug_assert_eq!(offsets.len(), count);
        tracing::info!("{count} instances are created");
        Ok(Self { offsets })
    }

    pub fn as_slice(&self) -> &[Vec4] {
        &self.offsets
    }

    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }
}

/// Which drawer a block renderer uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DrawStrategy {
    /// One instanced draw reading offsets from a per-instance attribute.
    Instanced,
    /// One draw per block with the offset pushed as a uniform.
    PerInstance,
}

impl DrawStrategy {
    /// Settle a preference against what the device can do.
    pub fn resolve(preference: StrategyPreference, supports_instancing: bool) -> Self {
        match preference {
            StrategyPreference::Auto if supports_instancing => DrawStrategy::Instanced,
            StrategyPreference::Auto => DrawStrategy::PerInstance,
            StrategyPreference::Instanced if supports_instancing => DrawStrategy::Instanced,
            StrategyPreference::Instanced => {
                tracing::warn!("instancing requested but unsupported; drawing per instance");
                DrawStrategy::PerInstance
            }
            StrategyPreference::PerInstance => DrawStrategy::PerInstance,
        }
    }

    fn drawer(self) -> Box<dyn InstanceDrawer> {
        match self {
            DrawStrategy::Instanced => Box::new(HardwareInstancing::default()),
            DrawStrategy::PerInstance => Box::new(UniformLoop::default()),
        }
    }
}

impl fmt::Display for DrawStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DrawStrategy::Instanced => f.write_str("instanced"),
            DrawStrategy::PerInstance => f.write_str("per-instance"),
        }
    }
}

/// Draws the bound cube mesh once per offset.
///
/// Implementations run with the program active and the cube vertex array
/// bound, and report how many instances they drew.
pub trait InstanceDrawer: fmt::Debug {
    fn strategy(&self) -> DrawStrategy;

    /// Resolve locations and upload whatever the strategy needs.
    fn load(
        &mut self,
        gpu: &mut dyn Gpu,
        program: &ShaderProgram,
        vertices: &Vertices,
        offsets: &[Vec4],
    ) -> Result<(), ProgramError>;

    fn draw(&self, gpu: &mut dyn Gpu, offsets: &[Vec4]) -> u32;

    fn unload(&mut self, gpu: &mut dyn Gpu);
}

/// All offsets live in one per-instance vertex buffer.
#[derive(Debug, Default)]
pub struct HardwareInstancing {
    offset: Option<AttribLocation>,
    buffer: Option<BufferId>,
}

impl InstanceDrawer for HardwareInstancing {
    fn strategy(&self) -> DrawStrategy {
        DrawStrategy::Instanced
    }

    fn load(
        &mut self,
        gpu: &mut dyn Gpu,
        program: &ShaderProgram,
        vertices: &Vertices,
        offsets: &[Vec4],
    ) -> Result<(), ProgramError> {
        self.unload(gpu);
        self.offset = program.attrib(gpu, names::OFFSET)?;
        tracing::info!("offset attribute index: {:?}", self.offset.map(|l| l.0));

        let Some(location) = self.offset else {
            tracing::warn!("shader has no offset attribute; blocks will overlap");
            return Ok(());
        };
        if offsets.is_empty() {
            return Ok(());
        }

        let buffer = gpu.create_buffer(BufferKind::Vertex, bytemuck::cast_slice(offsets));
        check_gpu(gpu, "block: offset buffer upload");

        vertices.bind_cube(gpu);
        gpu.vertex_attrib(location, buffer, 0, StepMode::PerInstance);
        check_gpu(gpu, "block: offset attribute");
        vertices.unbind(gpu);

        self.buffer = Some(buffer);
        Ok(())
    }

    fn draw(&self, gpu: &mut dyn Gpu, offsets: &[Vec4]) -> u32 {
        let instances = offsets.len() as u32;
        if instances == 0 {
            return 0;
        }
        gpu.draw_elements_instanced(Primitive::TriangleStrip, CUBE_INDEX_COUNT, 0, instances);
        check_gpu(gpu, "block: instanced draw");
        instances
    }

    fn unload(&mut self, gpu: &mut dyn Gpu) {
        if let Some(buffer) = self.buffer.take() {
            gpu.delete_buffer(buffer);
        }
    }
}

/// Each offset is pushed to the `offset` uniform before its own draw.
#[derive(Debug, Default)]
pub struct UniformLoop {
    offset: Option<UniformLocation>,
}

impl InstanceDrawer for UniformLoop {
    fn strategy(&self) -> DrawStrategy {
        DrawStrategy::PerInstance
    }

    fn load(
        &mut self,
        gpu: &mut dyn Gpu,
        program: &ShaderProgram,
        _vertices: &Vertices,
        _offsets: &[Vec4],
    ) -> Result<(), ProgramError> {
        self.offset = program.uniform(gpu, names::OFFSET)?;
        tracing::info!("offset uniform index: {:?}", self.offset.map(|l| l.0));
        Ok(())
    }

    fn draw(&self, gpu: &mut dyn Gpu, offsets: &[Vec4]) -> u32 {
        for offset in offsets {
            if let Some(location) = self.offset {
                gpu.set_uniform_vec4(location, *offset);
                check_gpu(gpu, "block: offset uniform");
            }
            gpu.draw_elements(Primitive::TriangleStrip, CUBE_INDEX_COUNT, 0);
            check_gpu(gpu, "block: draw");
        }
        if let Some(location) = self.offset {
            gpu.set_uniform_vec4(location, Vec4::ZERO);
        }
        offsets.len() as u32
    }

    fn unload(&mut self, _gpu: &mut dyn Gpu) {
        self.offset = None;
    }
}

/// Renders every wall of the maze.
#[derive(Debug)]
pub struct BlockRenderer {
    offsets: InstanceOffsets,
    drawer: Box<dyn InstanceDrawer>,
    is_block: Option<UniformLocation>,
    loaded: bool,
}

impl BlockRenderer {
    pub fn new(
        grid: &GridMap,
        cell_width: f32,
        strategy: DrawStrategy,
    ) -> Result<Self, BlockError> {
        Ok(Self {
            offsets: InstanceOffsets::build(grid, cell_width)?,
            drawer: strategy.drawer(),
            is_block: None,
            loaded: false,
        })
    }

    pub fn strategy(&self) -> DrawStrategy {
        self.drawer.strategy()
    }

    pub fn offsets(&self) -> &[Vec4] {
        self.offsets.as_slice()
    }

    pub fn instance_count(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Resolve `isBlock` and prepare the drawer against the linked program.
    pub fn load(
        &mut self,
        gpu: &mut dyn Gpu,
        program: &ShaderProgram,
        vertices: &Vertices,
    ) -> Result<(), ProgramError> {
        self.drawer
            .load(gpu, program, vertices, self.offsets.as_slice())?;
        self.is_block = program.uniform(gpu, names::IS_BLOCK)?;
        tracing::info!("isBlock index: {:?}", self.is_block.map(|l| l.0));
        self.loaded = true;
        Ok(())
    }

    /// Draw all blocks with `isBlock` raised for the duration.
    ///
    /// Returns the number of instances drawn.
    pub fn render(&self, gpu: &mut dyn Gpu, program: &ShaderProgram, vertices: &Vertices) -> u32 {
        if !self.loaded {
            tracing::warn!("block renderer used before load");
            return 0;
        }

        program.upload_mvp(gpu);
        check_gpu(gpu, "block: mvp upload");

        if let Some(location) = self.is_block {
            gpu.set_uniform_i32(location, 1);
        }

        vertices.bind_cube(gpu);
        let drawn = self.drawer.draw(gpu, self.offsets.as_slice());
        vertices.unbind(gpu);

        if let Some(location) = self.is_block {
            gpu.set_uniform_i32(location, 0);
        }
        drawn
    }

    pub fn unload(&mut self, gpu: &mut dyn Gpu) {
        self.drawer.unload(gpu);
        self.is_block = None;
        self.loaded = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::program::ProgramSource;
    use crate::recording::{GpuCommand, RecordingGpu};

    const W: f32 = 0.5;

    fn setup(gpu: &mut RecordingGpu) -> (ShaderProgram, Vertices) {
        let mut program = ShaderProgram::new(ProgramSource::new("vs", "fs"));
        program.load(gpu).unwrap();
        program.map(gpu).unwrap();
        let mut vertices = Vertices::new(W);
        vertices.load(gpu, &program).unwrap();
        gpu.use_program(program.id().unwrap());
        (program, vertices)
    }

    fn offset_at(offsets: &InstanceOffsets, grid: &GridMap, cell: (usize, usize)) -> Vec4 {
        let index = grid.occupied_cells().position(|c| c == cell).unwrap();
        offsets.as_slice()[index]
    }

    #[test]
    fn reference_grid_yields_24_offsets() {
        let grid = GridMap::reference();
        let offsets = InstanceOffsets::build(&grid, W).unwrap();
        assert_eq!(offsets.len(), 24);
        assert_eq!(offsets.len(), grid.occupied_count());
        for o in offsets.as_slice() {
            assert_eq!(o.w, 1.0);
            assert_eq!(o.y, 0.0);
        }
    }

    #[test]
    fn corner_and_center_offsets() {
        let grid = GridMap::reference();
        let cell_width = 0.75;
        let offsets = InstanceOffsets::build(&grid, cell_width).unwrap();
        for (gx, gy) in [(0, 0), (6, 0), (0, 6), (6, 6), (3, 3)] {
            let expected = Vec4::new(
                (gx as f32 - 3.0) * cell_width * 2.0,
                0.0,
                (gy as f32 - 3.0) * cell_width * 2.0,
                1.0,
            );
            assert_eq!(offset_at(&offsets, &grid, (gx, gy)), expected, "cell ({gx}, {gy})");
        }
        assert_eq!(offset_at(&offsets, &grid, (3, 3)), Vec4::W);
    }

    #[test]
    fn offsets_follow_row_major_order() {
        let grid = GridMap::from_rows(&["#.#", "...", ".#."]).unwrap();
        let offsets = InstanceOffsets::build(&grid, W).unwrap();
        assert_eq!(
            offsets.as_slice(),
            &[
                Vec4::new(-1.0, 0.0, -1.0, 1.0),
                Vec4::new(1.0, 0.0, -1.0, 1.0),
                Vec4::new(0.0, 0.0, 1.0, 1.0),
            ]
        );
    }

    #[test]
    fn even_grid_is_symmetric_about_origin() {
        let grid = GridMap::from_rows(&["#..#"]).unwrap();
        let offsets = InstanceOffsets::build(&grid, W).unwrap();
        assert_eq!(
            offsets.as_slice(),
            &[Vec4::new(-1.5, 0.0, 0.0, 1.0), Vec4::new(1.5, 0.0, 0.0, 1.0)]
        );
    }

    #[test]
    fn empty_grid_yields_no_offsets() {
        let grid = GridMap::open(7, 7).unwrap();
        let offsets = InstanceOffsets::build(&grid, W).unwrap();
        assert!(offsets.is_empty());
    }

    #[test]
    fn strategy_resolution() {
        use StrategyPreference::*;
        assert_eq!(DrawStrategy::resolve(Auto, true), DrawStrategy::Instanced);
        assert_eq!(DrawStrategy::resolve(Auto, false), DrawStrategy::PerInstance);
        assert_eq!(DrawStrategy::resolve(Instanced, false), DrawStrategy::PerInstance);
        assert_eq!(DrawStrategy::resolve(PerInstance, true), DrawStrategy::PerInstance);
    }

    #[test]
    fn instanced_render_issues_one_draw() {
        let mut gpu = RecordingGpu::new();
        let (program, vertices) = setup(&mut gpu);
        let mut blocks =
            BlockRenderer::new(&GridMap::reference(), W, DrawStrategy::Instanced).unwrap();
        blocks.load(&mut gpu, &program, &vertices).unwrap();

        let offset = gpu.attrib_slot(names::OFFSET).unwrap();
        assert!(gpu.commands().iter().any(|c| matches!(
            c,
            GpuCommand::VertexAttrib { location, step: StepMode::PerInstance, .. }
                if *location == offset
        )));
        assert!(gpu.commands().iter().any(|c| matches!(
            c,
            GpuCommand::CreateBuffer { kind: BufferKind::Vertex, len, .. } if *len == 24 * 16
        )));

        gpu.clear_commands();
        assert_eq!(blocks.render(&mut gpu, &program, &vertices), 24);
        let draws: Vec<_> = gpu.draw_calls().cloned().collect();
        assert_eq!(
            draws,
            vec![GpuCommand::DrawElementsInstanced {
                primitive: Primitive::TriangleStrip,
                index_count: CUBE_INDEX_COUNT,
                byte_offset: 0,
                instances: 24,
            }]
        );
        assert_eq!(gpu.pending_errors(), 0);
    }

    #[test]
    fn per_instance_render_loops_over_offsets() {
        let mut gpu = RecordingGpu::new().with_instancing(false);
        let (program, vertices) = setup(&mut gpu);
        let grid = GridMap::reference();
        let mut blocks = BlockRenderer::new(&grid, W, DrawStrategy::PerInstance).unwrap();
        blocks.load(&mut gpu, &program, &vertices).unwrap();
        assert!(!gpu.commands().iter().any(|c| matches!(
            c,
            GpuCommand::VertexAttrib { step: StepMode::PerInstance, .. }
        )));

        gpu.clear_commands();
        assert_eq!(blocks.render(&mut gpu, &program, &vertices), 24);
        assert_eq!(gpu.draw_calls().count(), 24);

        let uniform = gpu.uniform_slot(names::OFFSET).unwrap();
        let pushed: Vec<Vec4> = gpu
            .commands()
            .iter()
            .filter_map(|c| match c {
                GpuCommand::UniformVec4 { location, value } if *location == uniform => Some(*value),
                _ => None,
            })
            .collect();
        assert_eq!(&pushed[..24], blocks.offsets());
        assert_eq!(pushed[24], Vec4::ZERO);
    }

    #[test]
    fn both_strategies_draw_every_block() {
        let grid = GridMap::reference();
        for strategy in [DrawStrategy::Instanced, DrawStrategy::PerInstance] {
            let mut gpu = RecordingGpu::new();
            let (program, vertices) = setup(&mut gpu);
            let mut blocks = BlockRenderer::new(&grid, W, strategy).unwrap();
            blocks.load(&mut gpu, &program, &vertices).unwrap();
            gpu.clear_commands();
            blocks.render(&mut gpu, &program, &vertices);
            assert_eq!(gpu.instances_drawn(), 24, "{strategy}");
        }
    }

    #[test]
    fn is_block_toggles_around_draws() {
        let mut gpu = RecordingGpu::new();
        let (program, vertices) = setup(&mut gpu);
        let mut blocks =
            BlockRenderer::new(&GridMap::reference(), W, DrawStrategy::Instanced).unwrap();
        blocks.load(&mut gpu, &program, &vertices).unwrap();
        gpu.clear_commands();
        blocks.render(&mut gpu, &program, &vertices);

        let is_block = gpu.uniform_slot(names::IS_BLOCK).unwrap();
        let commands = gpu.commands();
        let raise = commands
            .iter()
            .position(|c| *c == GpuCommand::UniformI32 { location: is_block, value: 1 })
            .unwrap();
        let lower = commands
            .iter()
            .position(|c| *c == GpuCommand::UniformI32 { location: is_block, value: 0 })
            .unwrap();
        let draw = commands.iter().position(GpuCommand::is_draw).unwrap();
        assert!(raise < draw && draw < lower);
        assert_eq!(lower, commands.len() - 1);
    }

    #[test]
    fn empty_grid_draws_nothing() {
        let grid = GridMap::open(7, 7).unwrap();
        for strategy in [DrawStrategy::Instanced, DrawStrategy::PerInstance] {
            let mut gpu = RecordingGpu::new();
            let (program, vertices) = setup(&mut gpu);
            let mut blocks = BlockRenderer::new(&grid, W, strategy).unwrap();
            assert_eq!(blocks.instance_count(), 0);
            blocks.load(&mut gpu, &program, &vertices).unwrap();
            gpu.clear_commands();
            assert_eq!(blocks.render(&mut gpu, &program, &vertices), 0);
            assert_eq!(gpu.draw_calls().count(), 0);
            assert_eq!(gpu.pending_errors(), 0);
        }
    }

    #[test]
    fn render_before_load_is_noop() {
        let mut gpu = RecordingGpu::new();
        let (program, vertices) = setup(&mut gpu);
        let blocks = BlockRenderer::new(&GridMap::reference(), W, DrawStrategy::Instanced).unwrap();
        gpu.clear_commands();
        assert_eq!(blocks.render(&mut gpu, &program, &vertices), 0);
        assert!(gpu.commands().is_empty());
    }

    #[test]
    fn missing_locations_are_skipped() {
        let mut gpu = RecordingGpu::new()
            .without_uniform(names::IS_BLOCK)
            .without_attrib(names::OFFSET);
        let (program, vertices) = setup(&mut gpu);
        let mut blocks =
            BlockRenderer::new(&GridMap::reference(), W, DrawStrategy::Instanced).unwrap();
        blocks.load(&mut gpu, &program, &vertices).unwrap();
        gpu.clear_commands();
        assert_eq!(blocks.render(&mut gpu, &program, &vertices), 24);
        assert!(!gpu
            .commands()
            .iter()
            .any(|c| matches!(c, GpuCommand::UniformI32 { .. })));
        assert_eq!(gpu.pending_errors(), 0);
    }

    #[test]
    fn gpu_failure_does_not_abort_render() {
        let mut gpu = RecordingGpu::new().with_instancing(false);
        let (program, vertices) = setup(&mut gpu);
        let mut blocks =
            BlockRenderer::new(&GridMap::reference(), W, DrawStrategy::PerInstance).unwrap();
        blocks.load(&mut gpu, &program, &vertices).unwrap();
        gpu.clear_commands();
        gpu.inject_error("out of memory");
        assert_eq!(blocks.render(&mut gpu, &program, &vertices), 24);
        assert_eq!(gpu.draw_calls().count(), 24);
        assert_eq!(gpu.pending_errors(), 0);
    }

    #[test]
    fn unload_releases_instance_buffer() {
        let mut gpu = RecordingGpu::new();
        let (program, mut vertices) = setup(&mut gpu);
        let mut blocks =
            BlockRenderer::new(&GridMap::reference(), W, DrawStrategy::Instanced).unwrap();
        blocks.load(&mut gpu, &program, &vertices).unwrap();
        assert_eq!(gpu.live_buffers(), 3);
        blocks.unload(&mut gpu);
        vertices.unload(&mut gpu);
        assert_eq!(gpu.live_buffers(), 0);
        assert!(!blocks.is_loaded());
    }
}
