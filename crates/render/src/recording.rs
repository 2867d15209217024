use crate::gpu::{
    AttribLocation, BufferId, BufferKind, Gpu, Primitive, ProgramId, ShaderId, ShaderStage,
    StepMode, UniformLocation, VertexArrayId, names,
};
use glam::{Mat4, Vec4};
use std::collections::{BTreeSet, VecDeque};

/// One call made against a [`RecordingGpu`].
#[derive(Debug, Clone, PartialEq)]
pub enum GpuCommand {
    CompileShader { stage: ShaderStage, shader: ShaderId },
    DeleteShader(ShaderId),
    CreateProgram(ProgramId),
    LinkProgram(ProgramId),
    DeleteProgram(ProgramId),
    UseProgram(ProgramId),
    UniformMat4 { location: UniformLocation, value: Mat4 },
    UniformVec4 { location: UniformLocation, value: Vec4 },
    UniformI32 { location: UniformLocation, value: i32 },
    Clear([f32; 4]),
    CreateBuffer { buffer: BufferId, kind: BufferKind, len: usize },
    DeleteBuffer(BufferId),
    CreateVertexArray(VertexArrayId),
    DeleteVertexArray(VertexArrayId),
    BindVertexArray(Option<VertexArrayId>),
    VertexAttrib {
        location: AttribLocation,
        buffer: BufferId,
        byte_offset: u64,
        step: StepMode,
    },
    BindIndexBuffer(BufferId),
    DrawElements {
        primitive: Primitive,
        index_count: u32,
        byte_offset: u64,
    },
    DrawElementsInstanced {
        primitive: Primitive,
        index_count: u32,
        byte_offset: u64,
        instances: u32,
    },
}

impl GpuCommand {
    pub fn is_draw(&self) -> bool {
        matches!(
            self,
            GpuCommand::DrawElements { .. } | GpuCommand::DrawElementsInstanced { .. }
        )
    }
}

const DEFAULT_UNIFORMS: [&str; 3] = [names::MVP, names::OFFSET, names::IS_BLOCK];
const DEFAULT_ATTRIBS: [&str; 3] = [names::POSITION, names::COLOR, names::OFFSET];

/// Headless [`Gpu`] that records every call.
///
/// Used by tests and the CLI to observe exactly what the renderers send to a
/// device. Location lookups resolve against a configurable list of names, so
/// a shader that lacks an input can be simulated. Misuse that a real driver
/// would flag (uniform writes with no program, attributes with no vertex
/// array, draws with nothing bound) queues an error for
/// [`take_error`](Gpu::take_error).
#[derive(Debug, Clone)]
pub struct RecordingGpu {
    commands: Vec<GpuCommand>,
    errors: VecDeque<String>,
    next_id: u32,
    instancing: bool,
    fail_compile: Option<ShaderStage>,
    fail_link: bool,
    fail_create_program: bool,
    uniforms: Vec<String>,
    attribs: Vec<String>,
    current_program: Option<ProgramId>,
    bound_vertex_array: Option<VertexArrayId>,
    live_programs: BTreeSet<ProgramId>,
    live_shaders: BTreeSet<ShaderId>,
    live_buffers: BTreeSet<BufferId>,
    live_vertex_arrays: BTreeSet<VertexArrayId>,
}

impl Default for RecordingGpu {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingGpu {
    /// A device with instancing and every maze shader input available.
    pub fn new() -> Self {
        Self {
            commands: Vec::new(),
            errors: VecDeque::new(),
            next_id: 1,
            instancing: true,
            fail_compile: None,
            fail_link: false,
            fail_create_program: false,
            uniforms: DEFAULT_UNIFORMS.iter().map(|s| s.to_string()).collect(),
            attribs: DEFAULT_ATTRIBS.iter().map(|s| s.to_string()).collect(),
            current_program: None,
            bound_vertex_array: None,
            live_programs: BTreeSet::new(),
            live_shaders: BTreeSet::new(),
            live_buffers: BTreeSet::new(),
            live_vertex_arrays: BTreeSet::new(),
        }
    }

    pub fn with_instancing(mut self, instancing: bool) -> Self {
        self.instancing = instancing;
        self
    }

    /// Make compilation of `stage` fail.
    pub fn failing_compile(mut self, stage: ShaderStage) -> Self {
        self.fail_compile = Some(stage);
        self
    }

    pub fn failing_link(mut self) -> Self {
        self.fail_link = true;
        self
    }

    pub fn failing_create_program(mut self) -> Self {
        self.fail_create_program = true;
        self
    }

    /// Simulate a shader that does not declare uniform `name`.
    pub fn without_uniform(mut self, name: &str) -> Self {
        self.uniforms.retain(|n| n != name);
        self
    }

    /// Simulate a shader that does not declare attribute `name`.
    pub fn without_attrib(mut self, name: &str) -> Self {
        self.attribs.retain(|n| n != name);
        self
    }

    /// Queue a diagnostic as if the last call had failed.
    pub fn inject_error(&mut self, message: impl Into<String>) {
        self.errors.push_back(message.into());
    }

    pub fn commands(&self) -> &[GpuCommand] {
        &self.commands
    }

    /// Forget recorded commands; resource tracking is kept.
    pub fn clear_commands(&mut self) {
        self.commands.clear();
    }

    pub fn draw_calls(&self) -> impl Iterator<Item = &GpuCommand> {
        self.commands.iter().filter(|c| c.is_draw())
    }

    /// Instances drawn across every recorded draw call.
    pub fn instances_drawn(&self) -> u32 {
        self.commands
            .iter()
            .map(|c| match c {
                GpuCommand::DrawElements { .. } => 1,
                GpuCommand::DrawElementsInstanced { instances, .. } => *instances,
                _ => 0,
            })
            .sum()
    }

    /// Matrix uploads to `location`.
    pub fn mat4_uploads(&self, location: UniformLocation) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, GpuCommand::UniformMat4 { location: l, .. } if *l == location))
            .count()
    }

    /// Location the device assigns to uniform `name`.
    pub fn uniform_slot(&self, name: &str) -> Option<UniformLocation> {
        self.uniforms
            .iter()
            .position(|n| n == name)
            .map(|i| UniformLocation(i as u32))
    }

    pub fn attrib_slot(&self, name: &str) -> Option<AttribLocation> {
        self.attribs
            .iter()
            .position(|n| n == name)
            .map(|i| AttribLocation(i as u32))
    }

    pub fn live_programs(&self) -> usize {
        self.live_programs.len()
    }

    pub fn live_shaders(&self) -> usize {
        self.live_shaders.len()
    }

    pub fn live_buffers(&self) -> usize {
        self.live_buffers.len()
    }

    pub fn live_vertex_arrays(&self) -> usize {
        self.live_vertex_arrays.len()
    }

    pub fn pending_errors(&self) -> usize {
        self.errors.len()
    }

    fn next(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn require_program(&mut self, call: &str) -> bool {
        if self.current_program.is_none() {
            self.errors.push_back(format!("{call}: no program in use"));
            return false;
        }
        true
    }

    fn record_draw(&mut self, command: GpuCommand) {
        if !self.require_program("draw") {
            return;
        }
        if self.bound_vertex_array.is_none() {
            self.errors.push_back("draw: no vertex array bound".into());
            return;
        }
        self.commands.push(command);
    }
}

impl Gpu for RecordingGpu {
    fn supports_instancing(&self) -> bool {
        self.instancing
    }

    fn compile_shader(&mut self, stage: ShaderStage, source: &str) -> Result<ShaderId, String> {
        if self.fail_compile == Some(stage) {
            return Err(format!("{stage} shader: syntax error"));
        }
        if source.trim().is_empty() {
            return Err(format!("{stage} shader: empty source"));
        }
        let shader = ShaderId(self.next());
        self.live_shaders.insert(shader);
        self.commands.push(GpuCommand::CompileShader { stage, shader });
        Ok(shader)
    }

    fn delete_shader(&mut self, shader: ShaderId) {
        self.live_shaders.remove(&shader);
        self.commands.push(GpuCommand::DeleteShader(shader));
    }

    fn create_program(&mut self) -> Option<ProgramId> {
        if self.fail_create_program {
            return None;
        }
        let program = ProgramId(self.next());
        self.live_programs.insert(program);
        self.commands.push(GpuCommand::CreateProgram(program));
        Some(program)
    }

    fn link_program(
        &mut self,
        program: ProgramId,
        vertex: ShaderId,
        fragment: ShaderId,
    ) -> Result<(), String> {
        self.commands.push(GpuCommand::LinkProgram(program));
        if self.fail_link {
            return Err("unresolved varying vertexColor".into());
        }
        if !self.live_shaders.contains(&vertex) || !self.live_shaders.contains(&fragment) {
            return Err("attached shader was deleted".into());
        }
        Ok(())
    }

    fn delete_program(&mut self, program: ProgramId) {
        self.live_programs.remove(&program);
        if self.current_program == Some(program) {
            self.current_program = None;
        }
        self.commands.push(GpuCommand::DeleteProgram(program));
    }

    fn use_program(&mut self, program: ProgramId) {
        if !self.live_programs.contains(&program) {
            self.errors.push_back(format!("use_program: unknown program {}", program.0));
            return;
        }
        self.current_program = Some(program);
        self.commands.push(GpuCommand::UseProgram(program));
    }

    fn uniform_location(&mut self, program: ProgramId, name: &str) -> Option<UniformLocation> {
        if !self.live_programs.contains(&program) {
            return None;
        }
        self.uniform_slot(name)
    }

    fn attrib_location(&mut self, program: ProgramId, name: &str) -> Option<AttribLocation> {
        if !self.live_programs.contains(&program) {
            return None;
        }
        self.attrib_slot(name)
    }

    fn set_uniform_mat4(&mut self, location: UniformLocation, value: &Mat4) {
        if self.require_program("set_uniform_mat4") {
            self.commands.push(GpuCommand::UniformMat4 {
                location,
                value: *value,
            });
        }
    }

    fn set_uniform_vec4(&mut self, location: UniformLocation, value: Vec4) {
        if self.require_program("set_uniform_vec4") {
            self.commands
                .push(GpuCommand::UniformVec4 { location, value });
        }
    }

    fn set_uniform_i32(&mut self, location: UniformLocation, value: i32) {
        if self.require_program("set_uniform_i32") {
            self.commands.push(GpuCommand::UniformI32 { location, value });
        }
    }

    fn clear(&mut self, color: [f32; 4]) {
        self.commands.push(GpuCommand::Clear(color));
    }

    fn create_buffer(&mut self, kind: BufferKind, data: &[u8]) -> BufferId {
        let buffer = BufferId(self.next());
        self.live_buffers.insert(buffer);
        self.commands.push(GpuCommand::CreateBuffer {
            buffer,
            kind,
            len: data.len(),
        });
        buffer
    }

    fn delete_buffer(&mut self, buffer: BufferId) {
        self.live_buffers.remove(&buffer);
        self.commands.push(GpuCommand::DeleteBuffer(buffer));
    }

    fn create_vertex_array(&mut self) -> VertexArrayId {
        let vertex_array = VertexArrayId(self.next());
        self.live_vertex_arrays.insert(vertex_array);
        self.commands.push(GpuCommand::CreateVertexArray(vertex_array));
        vertex_array
    }

    fn delete_vertex_array(&mut self, vertex_array: VertexArrayId) {
        self.live_vertex_arrays.remove(&vertex_array);
        if self.bound_vertex_array == Some(vertex_array) {
            self.bound_vertex_array = None;
        }
        self.commands.push(GpuCommand::DeleteVertexArray(vertex_array));
    }

    fn bind_vertex_array(&mut self, vertex_array: Option<VertexArrayId>) {
        if let Some(id) = vertex_array {
            if !self.live_vertex_arrays.contains(&id) {
                self.errors
                    .push_back(format!("bind_vertex_array: unknown vertex array {}", id.0));
                return;
            }
        }
        self.bound_vertex_array = vertex_array;
        self.commands.push(GpuCommand::BindVertexArray(vertex_array));
    }

    fn vertex_attrib(
        &mut self,
        location: AttribLocation,
        buffer: BufferId,
        byte_offset: u64,
        step: StepMode,
    ) {
        if self.bound_vertex_array.is_none() {
            self.errors
                .push_back("vertex_attrib: no vertex array bound".into());
            return;
        }
        self.commands.push(GpuCommand::VertexAttrib {
            location,
            buffer,
            byte_offset,
            step,
        });
    }

    fn bind_index_buffer(&mut self, buffer: BufferId) {
        if self.bound_vertex_array.is_none() {
            self.errors
                .push_back("bind_index_buffer: no vertex array bound".into());
            return;
        }
        self.commands.push(GpuCommand::BindIndexBuffer(buffer));
    }

    fn draw_elements(&mut self, primitive: Primitive, index_count: u32, byte_offset: u64) {
        self.record_draw(GpuCommand::DrawElements {
            primitive,
            index_count,
            byte_offset,
        });
    }

    fn draw_elements_instanced(
        &mut self,
        primitive: Primitive,
        index_count: u32,
        byte_offset: u64,
        instances: u32,
    ) {
        self.record_draw(GpuCommand::DrawElementsInstanced {
            primitive,
            index_count,
            byte_offset,
            instances,
        });
    }

    fn take_error(&mut self) -> Option<String> {
        self.errors.pop_front()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpu::check_gpu;

    #[test]
    fn default_names_resolve() {
        let mut gpu = RecordingGpu::new();
        let program = gpu.create_program().unwrap();
        assert!(gpu.uniform_location(program, names::MVP).is_some());
        assert!(gpu.uniform_location(program, names::IS_BLOCK).is_some());
        assert!(gpu.attrib_location(program, names::OFFSET).is_some());
        assert!(gpu.uniform_location(program, "light_position").is_none());
    }

    #[test]
    fn removed_names_do_not_resolve() {
        let mut gpu = RecordingGpu::new().without_uniform(names::IS_BLOCK);
        let program = gpu.create_program().unwrap();
        assert!(gpu.uniform_location(program, names::IS_BLOCK).is_none());
        assert!(gpu.uniform_location(program, names::MVP).is_some());
    }

    #[test]
    fn uniform_without_program_queues_error() {
        let mut gpu = RecordingGpu::new();
        gpu.set_uniform_i32(UniformLocation(0), 1);
        assert!(gpu.commands().is_empty());
        let err = check_gpu(&mut gpu, "test").unwrap();
        assert_eq!(err.site, "test");
        assert!(err.message.contains("no program"));
        assert!(check_gpu(&mut gpu, "test").is_none());
    }

    #[test]
    fn draw_without_vertex_array_queues_error() {
        let mut gpu = RecordingGpu::new();
        let program = gpu.create_program().unwrap();
        gpu.use_program(program);
        gpu.draw_elements(Primitive::Lines, 8, 0);
        assert_eq!(gpu.draw_calls().count(), 0);
        assert_eq!(gpu.pending_errors(), 1);
    }

    #[test]
    fn resource_tracking() {
        let mut gpu = RecordingGpu::new();
        let a = gpu.create_buffer(BufferKind::Vertex, &[0; 16]);
        let b = gpu.create_buffer(BufferKind::Index, &[0; 4]);
        assert_eq!(gpu.live_buffers(), 2);
        gpu.delete_buffer(a);
        gpu.delete_buffer(b);
        assert_eq!(gpu.live_buffers(), 0);
    }

    #[test]
    fn instances_drawn_sums_draws() {
        let mut gpu = RecordingGpu::new();
        let program = gpu.create_program().unwrap();
        gpu.use_program(program);
        let vao = gpu.create_vertex_array();
        gpu.bind_vertex_array(Some(vao));
        gpu.draw_elements(Primitive::TriangleStrip, 20, 0);
        gpu.draw_elements_instanced(Primitive::TriangleStrip, 20, 0, 5);
        assert_eq!(gpu.instances_drawn(), 6);
    }
}
