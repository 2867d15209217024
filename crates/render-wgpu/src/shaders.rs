use maze_render::ProgramSource;

/// Vertex stage of the maze program.
///
/// `Uniforms` must match the host-side struct in `gpu.rs` byte for byte.
pub const MAZE_VERTEX: &str = r#"
struct Uniforms {
    mvp: mat4x4<f32>,
    offset: vec4<f32>,
    is_block: i32,
};

@group(0) @binding(0)
var<uniform> uniforms: Uniforms;

struct VertexInput {
    @location(0) position: vec4<f32>,
    @location(1) color: vec4<f32>,
};

struct InstanceInput {
    @location(2) offset: vec4<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) vertex_color: vec4<f32>,
};

@vertex
fn vs_main(vertex: VertexInput, instance: InstanceInput) -> VertexOutput {
    var world = vertex.position;
    if (uniforms.is_block != 0) {
        world = vec4<f32>(vertex.position.xyz + instance.offset.xyz + uniforms.offset.xyz, 1.0);
    }

    var out: VertexOutput;
    out.clip_position = uniforms.mvp * world;
    out.vertex_color = vertex.color;
    return out;
}
"#;

/// Fragment stage: passes the interpolated vertex color through.
pub const MAZE_FRAGMENT: &str = r#"
@fragment
fn fs_main(@location(0) vertex_color: vec4<f32>) -> @location(0) vec4<f32> {
    return vertex_color;
}
"#;

pub fn program_source() -> ProgramSource {
    ProgramSource::new(MAZE_VERTEX, MAZE_FRAGMENT)
}
