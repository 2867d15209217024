use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec4};
use maze_render::{
    AttribLocation, BufferId, BufferKind, Gpu, Primitive, ProgramId, ShaderId, ShaderStage,
    StepMode, UniformLocation, VertexArrayId, names,
};
use std::collections::{BTreeMap, VecDeque};
use std::num::NonZeroU64;
use std::sync::{Arc, Mutex};
use wgpu::util::DeviceExt;

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;
const ATTRIB_SLOTS: usize = 3;
const OFFSET_SLOT: usize = 2;
const VEC4_BYTES: u64 = size_of::<[f32; 4]>() as u64;
const UNIFORM_BYTES: u64 = size_of::<Uniforms>() as u64;
const INITIAL_UNIFORM_SLOTS: u64 = 64;
/// Enough zeros to stand in for an unbound per-vertex attribute of the mesh.
const INITIAL_ZERO_VEC4S: u32 = 64;

const POSITION_ATTRIBUTES: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x4];
const COLOR_ATTRIBUTES: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![1 => Float32x4];
const OFFSET_ATTRIBUTES: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![2 => Float32x4];

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct Uniforms {
    mvp: [[f32; 4]; 4],
    offset: [f32; 4],
    is_block: i32,
    _pad: [i32; 3],
}

impl Default for Uniforms {
    fn default() -> Self {
        Self {
            mvp: Mat4::IDENTITY.to_cols_array_2d(),
            offset: [0.0; 4],
            is_block: 0,
            _pad: [0; 3],
        }
    }
}

struct Pipelines {
    strip: wgpu::RenderPipeline,
    lines: wgpu::RenderPipeline,
}

#[derive(Debug, Clone, Copy)]
struct AttribBinding {
    buffer: BufferId,
    byte_offset: u64,
}

#[derive(Debug, Clone, Copy, Default)]
struct VertexArray {
    attribs: [Option<AttribBinding>; ATTRIB_SLOTS],
    index: Option<BufferId>,
}

/// A draw captured with the state current at the time of the call.
#[derive(Debug, Clone, Copy)]
struct DrawCall {
    program: ProgramId,
    vertex_array: VertexArray,
    primitive: Primitive,
    first_index: u32,
    index_count: u32,
    instances: u32,
    uniform_slot: u32,
}

/// [`Gpu`] over a wgpu device.
///
/// Shader "compilation" creates a WGSL module and "linking" builds one
/// triangle-strip and one line-list pipeline from the pair. Uniform writes
/// update a CPU-side copy that is snapshotted into its own slot per draw.
/// [`clear`](Gpu::clear) starts a new frame; [`present`](Self::present)
/// replays it into a render target.
pub struct WgpuGpu {
    device: wgpu::Device,
    queue: wgpu::Queue,
    surface_format: wgpu::TextureFormat,
    depth_view: wgpu::TextureView,
    bind_group_layout: wgpu::BindGroupLayout,
    pipeline_layout: wgpu::PipelineLayout,
    uniform_stride: u64,
    uniform_slots: u64,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    zero_buffer: wgpu::Buffer,
    zero_vec4s: u32,
    next_id: u32,
    shaders: BTreeMap<ShaderId, (ShaderStage, wgpu::ShaderModule)>,
    programs: BTreeMap<ProgramId, Option<Pipelines>>,
    buffers: BTreeMap<BufferId, wgpu::Buffer>,
    vertex_arrays: BTreeMap<VertexArrayId, VertexArray>,
    current_program: Option<ProgramId>,
    bound_vertex_array: Option<VertexArrayId>,
    uniforms: Uniforms,
    clear_color: [f32; 4],
    staged: Vec<Uniforms>,
    draws: Vec<DrawCall>,
    errors: Arc<Mutex<VecDeque<String>>>,
}

impl WgpuGpu {
    pub fn new(
        device: wgpu::Device,
        queue: wgpu::Queue,
        surface_format: wgpu::TextureFormat,
        width: u32,
        height: u32,
    ) -> Self {
        let errors = Arc::new(Mutex::new(VecDeque::new()));
        let sink = Arc::clone(&errors);
        device.on_uncaptured_error(Box::new(move |err| {
            tracing::error!("wgpu: {err}");
            if let Ok(mut queue) = sink.lock() {
                queue.push_back(err.to_string());
            }
        }));

        let alignment = u64::from(device.limits().min_uniform_buffer_offset_alignment);
        let uniform_stride = UNIFORM_BYTES.div_ceil(alignment) * alignment;

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("maze_uniform_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: NonZeroU64::new(UNIFORM_BYTES),
                },
                count: None,
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("maze_pipeline_layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let (uniform_buffer, uniform_bind_group) =
            create_uniforms(&device, &bind_group_layout, uniform_stride, INITIAL_UNIFORM_SLOTS);
        let zero_buffer = create_zero_buffer(&device, INITIAL_ZERO_VEC4S);
        let depth_view = create_depth_texture(&device, width, height);

        tracing::info!(
            "wgpu backend ready: {surface_format:?}, uniform stride {uniform_stride} bytes"
        );

        Self {
            device,
            queue,
            surface_format,
            depth_view,
            bind_group_layout,
            pipeline_layout,
            uniform_stride,
            uniform_slots: INITIAL_UNIFORM_SLOTS,
            uniform_buffer,
            uniform_bind_group,
            zero_buffer,
            zero_vec4s: INITIAL_ZERO_VEC4S,
            next_id: 1,
            shaders: BTreeMap::new(),
            programs: BTreeMap::new(),
            buffers: BTreeMap::new(),
            vertex_arrays: BTreeMap::new(),
            current_program: None,
            bound_vertex_array: None,
            uniforms: Uniforms::default(),
            clear_color: [0.0, 0.0, 0.0, 1.0],
            staged: Vec::new(),
            draws: Vec::new(),
            errors,
        }
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.depth_view = create_depth_texture(&self.device, width, height);
    }

    /// Replay the current frame into `target`.
    pub fn present(&mut self, target: &wgpu::TextureView) {
        self.reserve_uniform_slots(self.staged.len() as u64);
        let needed = self
            .draws
            .iter()
            .map(|d| d.instances)
            .max()
            .unwrap_or(0)
            .max(INITIAL_ZERO_VEC4S);
        self.reserve_zero_vec4s(needed);

        if !self.staged.is_empty() {
            let stride = self.uniform_stride as usize;
            let mut bytes = vec![0u8; stride * self.staged.len()];
            for (chunk, uniforms) in bytes.chunks_exact_mut(stride).zip(&self.staged) {
                chunk[..UNIFORM_BYTES as usize].copy_from_slice(bytemuck::bytes_of(uniforms));
            }
            self.queue.write_buffer(&self.uniform_buffer, 0, &bytes);
        }

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("maze_encoder"),
            });

        {
            let [r, g, b, a] = self.clear_color.map(f64::from);
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("maze_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color { r, g, b, a }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });

            for draw in &self.draws {
                let Some(Some(pipelines)) = self.programs.get(&draw.program) else {
                    continue;
                };
                let Some(index) = draw.vertex_array.index.and_then(|id| self.buffers.get(&id))
                else {
                    continue;
                };
                pass.set_pipeline(match draw.primitive {
                    Primitive::TriangleStrip => &pipelines.strip,
                    Primitive::Lines => &pipelines.lines,
                });
                let dynamic_offset = (u64::from(draw.uniform_slot) * self.uniform_stride) as u32;
                pass.set_bind_group(0, &self.uniform_bind_group, &[dynamic_offset]);
                for (slot, binding) in draw.vertex_array.attribs.iter().enumerate() {
                    let slice = binding
                        .and_then(|b| {
                            self.buffers
                                .get(&b.buffer)
                                .map(|buffer| buffer.slice(b.byte_offset..))
                        })
                        .unwrap_or_else(|| self.zero_buffer.slice(..));
                    pass.set_vertex_buffer(slot as u32, slice);
                }
                pass.set_index_buffer(index.slice(..), wgpu::IndexFormat::Uint32);
                pass.draw_indexed(
                    draw.first_index..draw.first_index + draw.index_count,
                    0,
                    0..draw.instances,
                );
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
    }

    fn next(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn push_error(&self, message: String) {
        tracing::debug!("queued GPU error: {message}");
        if let Ok(mut queue) = self.errors.lock() {
            queue.push_back(message);
        }
    }

    /// Run `f` inside a validation error scope.
    fn validated<T>(&self, f: impl FnOnce(&wgpu::Device) -> T) -> Result<T, String> {
        self.device.push_error_scope(wgpu::ErrorFilter::Validation);
        let value = f(&self.device);
        match pollster::block_on(self.device.pop_error_scope()) {
            Some(err) => Err(err.to_string()),
            None => Ok(value),
        }
    }

    fn build_pipeline(
        &self,
        label: &str,
        vertex: &wgpu::ShaderModule,
        fragment: &wgpu::ShaderModule,
        primitive: wgpu::PrimitiveState,
    ) -> wgpu::RenderPipeline {
        let buffers = [
            vertex_layout(&POSITION_ATTRIBUTES, wgpu::VertexStepMode::Vertex),
            vertex_layout(&COLOR_ATTRIBUTES, wgpu::VertexStepMode::Vertex),
            vertex_layout(&OFFSET_ATTRIBUTES, wgpu::VertexStepMode::Instance),
        ];
        self.device
            .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(label),
                layout: Some(&self.pipeline_layout),
                vertex: wgpu::VertexState {
                    module: vertex,
                    entry_point: Some("vs_main"),
                    compilation_options: Default::default(),
                    buffers: &buffers,
                },
                fragment: Some(wgpu::FragmentState {
                    module: fragment,
                    entry_point: Some("fs_main"),
                    compilation_options: Default::default(),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: self.surface_format,
                        blend: Some(wgpu::BlendState::REPLACE),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                }),
                primitive,
                depth_stencil: Some(wgpu::DepthStencilState {
                    format: DEPTH_FORMAT,
                    depth_write_enabled: true,
                    depth_compare: wgpu::CompareFunction::Less,
                    stencil: Default::default(),
                    bias: Default::default(),
                }),
                multisample: Default::default(),
                multiview: None,
                cache: None,
            })
    }

    fn reserve_uniform_slots(&mut self, slots: u64) {
        if slots <= self.uniform_slots {
            return;
        }
        let slots = slots.next_power_of_two();
        let (buffer, bind_group) =
            create_uniforms(&self.device, &self.bind_group_layout, self.uniform_stride, slots);
        self.uniform_buffer = buffer;
        self.uniform_bind_group = bind_group;
        self.uniform_slots = slots;
        tracing::debug!("uniform buffer grown to {slots} slots");
    }

    fn reserve_zero_vec4s(&mut self, count: u32) {
        if count <= self.zero_vec4s {
            return;
        }
        let count = count.next_power_of_two();
        self.zero_buffer = create_zero_buffer(&self.device, count);
        self.zero_vec4s = count;
    }

    fn record_draw(
        &mut self,
        primitive: Primitive,
        index_count: u32,
        byte_offset: u64,
        instances: u32,
    ) {
        let Some(program) = self.current_program else {
            self.push_error("draw: no program in use".into());
            return;
        };
        let Some(vertex_array) = self
            .bound_vertex_array
            .and_then(|id| self.vertex_arrays.get(&id))
            .copied()
        else {
            self.push_error("draw: no vertex array bound".into());
            return;
        };
        if vertex_array.index.is_none() {
            self.push_error("draw: vertex array has no index buffer".into());
            return;
        }
        if byte_offset % size_of::<u32>() as u64 != 0 {
            self.push_error(format!("draw: unaligned index offset {byte_offset}"));
            return;
        }

        self.staged.push(self.uniforms);
        self.draws.push(DrawCall {
            program,
            vertex_array,
            primitive,
            first_index: (byte_offset / size_of::<u32>() as u64) as u32,
            index_count,
            instances,
            uniform_slot: (self.staged.len() - 1) as u32,
        });
    }

    fn uniform_target(&mut self, call: &str) -> bool {
        if self.current_program.is_none() {
            self.push_error(format!("{call}: no program in use"));
            return false;
        }
        true
    }
}

impl Gpu for WgpuGpu {
    fn supports_instancing(&self) -> bool {
        true
    }

    fn compile_shader(&mut self, stage: ShaderStage, source: &str) -> Result<ShaderId, String> {
        let label = format!("maze_{stage}_shader");
        let module = self.validated(|device| {
            device.create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(&label),
                source: wgpu::ShaderSource::Wgsl(source.into()),
            })
        })?;
        let shader = ShaderId(self.next());
        self.shaders.insert(shader, (stage, module));
        Ok(shader)
    }

    fn delete_shader(&mut self, shader: ShaderId) {
        self.shaders.remove(&shader);
    }

    fn create_program(&mut self) -> Option<ProgramId> {
        let program = ProgramId(self.next());
        self.programs.insert(program, None);
        Some(program)
    }

    fn link_program(
        &mut self,
        program: ProgramId,
        vertex: ShaderId,
        fragment: ShaderId,
    ) -> Result<(), String> {
        if !self.programs.contains_key(&program) {
            return Err(format!("unknown program {}", program.0));
        }
        let (Some((ShaderStage::Vertex, vs)), Some((ShaderStage::Fragment, fs))) =
            (self.shaders.get(&vertex), self.shaders.get(&fragment))
        else {
            return Err("link needs one vertex and one fragment shader".into());
        };

        let pipelines = self.validated(|_| Pipelines {
            strip: self.build_pipeline(
                "maze_strip_pipeline",
                vs,
                fs,
                wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleStrip,
                    strip_index_format: Some(wgpu::IndexFormat::Uint32),
                    cull_mode: None,
                    ..Default::default()
                },
            ),
            lines: self.build_pipeline(
                "maze_line_pipeline",
                vs,
                fs,
                wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::LineList,
                    ..Default::default()
                },
            ),
        })?;
        self.programs.insert(program, Some(pipelines));
        Ok(())
    }

    fn delete_program(&mut self, program: ProgramId) {
        self.programs.remove(&program);
        if self.current_program == Some(program) {
            self.current_program = None;
        }
    }

    fn use_program(&mut self, program: ProgramId) {
        match self.programs.get(&program) {
            Some(Some(_)) => self.current_program = Some(program),
            Some(None) => {
                self.push_error(format!("use_program: program {} is not linked", program.0))
            }
            None => self.push_error(format!("use_program: unknown program {}", program.0)),
        }
    }

    fn uniform_location(&mut self, program: ProgramId, name: &str) -> Option<UniformLocation> {
        if !self.programs.contains_key(&program) {
            return None;
        }
        match name {
            names::MVP => Some(UniformLocation(0)),
            names::OFFSET => Some(UniformLocation(1)),
            names::IS_BLOCK => Some(UniformLocation(2)),
            _ => None,
        }
    }

    fn attrib_location(&mut self, program: ProgramId, name: &str) -> Option<AttribLocation> {
        if !self.programs.contains_key(&program) {
            return None;
        }
        match name {
            names::POSITION => Some(AttribLocation(0)),
            names::COLOR => Some(AttribLocation(1)),
            names::OFFSET => Some(AttribLocation(OFFSET_SLOT as u32)),
            _ => None,
        }
    }

    fn set_uniform_mat4(&mut self, location: UniformLocation, value: &Mat4) {
        if !self.uniform_target("set_uniform_mat4") {
            return;
        }
        match location.0 {
            0 => self.uniforms.mvp = value.to_cols_array_2d(),
            n => self.push_error(format!("set_uniform_mat4: location {n} is not a mat4")),
        }
    }

    fn set_uniform_vec4(&mut self, location: UniformLocation, value: Vec4) {
        if !self.uniform_target("set_uniform_vec4") {
            return;
        }
        match location.0 {
            1 => self.uniforms.offset = value.to_array(),
            n => self.push_error(format!("set_uniform_vec4: location {n} is not a vec4")),
        }
    }

    fn set_uniform_i32(&mut self, location: UniformLocation, value: i32) {
        if !self.uniform_target("set_uniform_i32") {
            return;
        }
        match location.0 {
            2 => self.uniforms.is_block = value,
            n => self.push_error(format!("set_uniform_i32: location {n} is not an int")),
        }
    }

    fn clear(&mut self, color: [f32; 4]) {
        self.clear_color = color;
        self.draws.clear();
        self.staged.clear();
    }

    fn create_buffer(&mut self, kind: BufferKind, data: &[u8]) -> BufferId {
        let usage = match kind {
            BufferKind::Vertex => wgpu::BufferUsages::VERTEX,
            BufferKind::Index => wgpu::BufferUsages::INDEX,
        };
        let buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(match kind {
                    BufferKind::Vertex => "maze_vertex_buffer",
                    BufferKind::Index => "maze_index_buffer",
                }),
                contents: data,
                usage: usage | wgpu::BufferUsages::COPY_DST,
            });
        let id = BufferId(self.next());
        self.buffers.insert(id, buffer);
        id
    }

    fn delete_buffer(&mut self, buffer: BufferId) {
        if let Some(buffer) = self.buffers.remove(&buffer) {
            buffer.destroy();
        }
    }

    fn create_vertex_array(&mut self) -> VertexArrayId {
        let id = VertexArrayId(self.next());
        self.vertex_arrays.insert(id, VertexArray::default());
        id
    }

    fn delete_vertex_array(&mut self, vertex_array: VertexArrayId) {
        self.vertex_arrays.remove(&vertex_array);
        if self.bound_vertex_array == Some(vertex_array) {
            self.bound_vertex_array = None;
        }
    }

    fn bind_vertex_array(&mut self, vertex_array: Option<VertexArrayId>) {
        if let Some(id) = vertex_array {
            if !self.vertex_arrays.contains_key(&id) {
                self.push_error(format!("bind_vertex_array: unknown vertex array {}", id.0));
                return;
            }
        }
        self.bound_vertex_array = vertex_array;
    }

    fn vertex_attrib(
        &mut self,
        location: AttribLocation,
        buffer: BufferId,
        byte_offset: u64,
        step: StepMode,
    ) {
        let slot = location.0 as usize;
        if slot >= ATTRIB_SLOTS {
            self.push_error(format!("vertex_attrib: no attribute slot {slot}"));
            return;
        }
        let expected = if slot == OFFSET_SLOT {
            StepMode::PerInstance
        } else {
            StepMode::PerVertex
        };
        if step != expected {
            self.push_error(format!("vertex_attrib: slot {slot} steps {expected:?}"));
            return;
        }
        if !self.buffers.contains_key(&buffer) {
            self.push_error(format!("vertex_attrib: unknown buffer {}", buffer.0));
            return;
        }
        let Some(id) = self.bound_vertex_array else {
            self.push_error("vertex_attrib: no vertex array bound".into());
            return;
        };
        if let Some(vertex_array) = self.vertex_arrays.get_mut(&id) {
            vertex_array.attribs[slot] = Some(AttribBinding {
                buffer,
                byte_offset,
            });
        }
    }

    fn bind_index_buffer(&mut self, buffer: BufferId) {
        if !self.buffers.contains_key(&buffer) {
            self.push_error(format!("bind_index_buffer: unknown buffer {}", buffer.0));
            return;
        }
        let Some(id) = self.bound_vertex_array else {
            self.push_error("bind_index_buffer: no vertex array bound".into());
            return;
        };
        if let Some(vertex_array) = self.vertex_arrays.get_mut(&id) {
            vertex_array.index = Some(buffer);
        }
    }

    fn draw_elements(&mut self, primitive: Primitive, index_count: u32, byte_offset: u64) {
        self.record_draw(primitive, index_count, byte_offset, 1);
    }

    fn draw_elements_instanced(
        &mut self,
        primitive: Primitive,
        index_count: u32,
        byte_offset: u64,
        instances: u32,
    ) {
        self.record_draw(primitive, index_count, byte_offset, instances);
    }

    fn take_error(&mut self) -> Option<String> {
        self.errors.lock().ok()?.pop_front()
    }
}

fn vertex_layout(
    attributes: &[wgpu::VertexAttribute],
    step_mode: wgpu::VertexStepMode,
) -> wgpu::VertexBufferLayout<'_> {
    wgpu::VertexBufferLayout {
        array_stride: VEC4_BYTES,
        step_mode,
        attributes,
    }
}

fn create_uniforms(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    stride: u64,
    slots: u64,
) -> (wgpu::Buffer, wgpu::BindGroup) {
    let buffer = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("maze_uniform_buffer"),
        size: stride * slots,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });
    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("maze_uniform_bind_group"),
        layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                buffer: &buffer,
                offset: 0,
                size: NonZeroU64::new(UNIFORM_BYTES),
            }),
        }],
    });
    (buffer, bind_group)
}

/// New buffers are zero-initialised by wgpu.
fn create_zero_buffer(device: &wgpu::Device, vec4s: u32) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("maze_zero_attribute"),
        size: u64::from(vec4s) * VEC4_BYTES,
        usage: wgpu::BufferUsages::VERTEX,
        mapped_at_creation: false,
    })
}

fn create_depth_texture(device: &wgpu::Device, width: u32, height: u32) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("maze_depth_texture"),
        size: wgpu::Extent3d {
            width: width.max(1),
            height: height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    texture.create_view(&Default::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniforms_match_wgsl_layout() {
        // mat4 + vec4 + i32, rounded up to 16-byte struct alignment.
        assert_eq!(UNIFORM_BYTES, 96);
        assert_eq!(std::mem::offset_of!(Uniforms, offset), 64);
        assert_eq!(std::mem::offset_of!(Uniforms, is_block), 80);
    }

    #[test]
    fn shader_sources_declare_entry_points() {
        let source = crate::program_source();
        assert!(source.vertex.contains("fn vs_main"));
        assert!(source.vertex.contains("is_block: i32"));
        assert!(source.fragment.contains("fn fs_main"));
    }

    #[test]
    fn attribute_layouts_use_fixed_slots() {
        assert_eq!(POSITION_ATTRIBUTES[0].shader_location, 0);
        assert_eq!(COLOR_ATTRIBUTES[0].shader_location, 1);
        assert_eq!(OFFSET_ATTRIBUTES[0].shader_location, OFFSET_SLOT as u32);
        let layout = vertex_layout(&OFFSET_ATTRIBUTES, wgpu::VertexStepMode::Instance);
        assert_eq!(layout.array_stride, VEC4_BYTES);
    }
}
