use crate::gpu::{Gpu, Primitive, check_gpu};
use crate::program::ShaderProgram;
use crate::vertices::{AXIS_INDEX_BYTE_OFFSET, AXIS_INDEX_COUNT, Vertices};

/// Draws the coordinate axes as line segments from the shared mesh.
#[derive(Debug, Default, Clone, Copy)]
pub struct AxisRenderer;

impl AxisRenderer {
    pub fn new() -> Self {
        Self
    }

    pub fn render(&self, gpu: &mut dyn Gpu, program: &ShaderProgram, vertices: &Vertices) {
        if !vertices.is_loaded() {
            tracing::warn!("axis renderer used before the mesh was loaded");
            return;
        }
        program.upload_mvp(gpu);
        vertices.bind_axis(gpu);
        gpu.draw_elements(Primitive::Lines, AXIS_INDEX_COUNT, AXIS_INDEX_BYTE_OFFSET);
        check_gpu(gpu, "axis: draw");
        vertices.unbind(gpu);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpu::names;
    use crate::program::ProgramSource;
    use crate::recording::{GpuCommand, RecordingGpu};

    #[test]
    fn draws_eight_line_indices_after_cube() {
        let mut gpu = RecordingGpu::new();
        let mut program = ShaderProgram::new(ProgramSource::new("vs", "fs"));
        program.load(&mut gpu).unwrap();
        program.map(&mut gpu).unwrap();
        let mut vertices = Vertices::new(0.5);
        vertices.load(&mut gpu, &program).unwrap();
        gpu.use_program(program.id().unwrap());
        gpu.clear_commands();

        AxisRenderer::new().render(&mut gpu, &program, &vertices);

        let draws: Vec<_> = gpu.draw_calls().cloned().collect();
        assert_eq!(
            draws,
            vec![GpuCommand::DrawElements {
                primitive: Primitive::Lines,
                index_count: 8,
                byte_offset: AXIS_INDEX_BYTE_OFFSET,
            }]
        );
        let mvp = gpu.uniform_slot(names::MVP).unwrap();
        assert_eq!(gpu.mat4_uploads(mvp), 1);
        assert_eq!(gpu.commands().last(), Some(&GpuCommand::BindVertexArray(None)));
        assert_eq!(gpu.pending_errors(), 0);
    }

    #[test]
    fn skips_when_mesh_missing() {
        let mut gpu = RecordingGpu::new();
        let program = ShaderProgram::new(ProgramSource::new("vs", "fs"));
        AxisRenderer::new().render(&mut gpu, &program, &Vertices::new(0.5));
        assert!(gpu.commands().is_empty());
    }
}
