use bytemuck::{Pod, Zeroable};

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct Uniforms {
    /// Surface size in pixels.
    pub viewport: [f32; 2],
    /// Opacity the finished frame is composited with.
    pub opacity: f32,
    pub _padding: f32,
}

/// Pixel-space vertices in, premultiplied color out at full opacity.
pub const SHADER_SOURCE: &str = r#"
struct Uniforms {
    viewport: vec2<f32>,
    opacity: f32,
    padding: f32,
};

@group(0) @binding(0)
var<uniform> uniforms: Uniforms;

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) color: vec4<f32>,
};

@vertex
fn vs_main(
    @location(0) position: vec2<f32>,
    @location(1) color: vec4<f32>,
) -> VertexOutput {
    let ndc = vec2<f32>(
        position.x / uniforms.viewport.x * 2.0 - 1.0,
        1.0 - position.y / uniforms.viewport.y * 2.0,
    );

    var out: VertexOutput;
    out.clip_position = vec4<f32>(ndc, 0.0, 1.0);
    out.color = color;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    return vec4<f32>(in.color.rgb * in.color.a, in.color.a);
}
"#;

/// Fullscreen pass drawing the offscreen frame over the background with the
/// surface opacity applied once.
pub const COMPOSITE_SHADER_SOURCE: &str = r#"
struct Uniforms {
    viewport: vec2<f32>,
    opacity: f32,
    padding: f32,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) uv: vec2<f32>,
};

@group(0) @binding(0)
var scene: texture_2d<f32>;
@group(0) @binding(1)
var scene_sampler: sampler;
@group(0) @binding(2)
var<uniform> uniforms: Uniforms;

@vertex
fn vs_main(@builtin(vertex_index) vertex_index: u32) -> VertexOutput {
    var positions = array<vec2<f32>, 3>(
        vec2<f32>(-1.0, -1.0),
        vec2<f32>(3.0, -1.0),
        vec2<f32>(-1.0, 3.0),
    );
    var uvs = array<vec2<f32>, 3>(
        vec2<f32>(0.0, 1.0),
        vec2<f32>(2.0, 1.0),
        vec2<f32>(0.0, -1.0),
    );

    var out: VertexOutput;
    out.clip_position = vec4<f32>(positions[vertex_index], 0.0, 1.0);
    out.uv = uvs[vertex_index];
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    return textureSample(scene, scene_sampler, in.uv) * uniforms.opacity;
}
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use naga::front::wgsl;
    use naga::valid::{Capabilities, ValidationFlags, Validator};

    fn validate(source: &str) {
        let module = match wgsl::parse_str(source) {
            Ok(module) => module,
            Err(err) => panic!("{}", err.emit_to_string(source)),
        };

        let mut validator = Validator::new(ValidationFlags::all(), Capabilities::all());
        if let Err(err) = validator.validate(&module) {
            panic!("shader validation failed: {}", err);
        }
    }

    #[test]
    fn test_shader_validates() {
        validate(SHADER_SOURCE);
    }

    #[test]
    fn test_composite_shader_validates() {
        validate(COMPOSITE_SHADER_SOURCE);
    }

    #[test]
    fn test_draw_pass_ignores_opacity() {
        assert!(!SHADER_SOURCE.contains("uniforms.opacity"));
        assert!(COMPOSITE_SHADER_SOURCE.contains("* uniforms.opacity"));
    }

    #[test]
    fn test_uniforms_are_16_byte_sized() {
        assert_eq!(std::mem::size_of::<Uniforms>() % 16, 0);
    }
}
