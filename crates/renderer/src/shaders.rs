//! Embedded GLSL sources for the distorted plane, compiled through naga's
//! GLSL frontend at pipeline build time.
//!
//! The uniform block layout must match [`PlaneUniforms`] in
//! `gpu/uniforms.rs` field for field; the shaders are the only other place
//! that layout appears.

use std::borrow::Cow;

use wgpu::naga::ShaderStage;

pub(crate) fn compile_vertex_shader(device: &wgpu::Device) -> wgpu::ShaderModule {
    device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("plane vertex"),
        source: wgpu::ShaderSource::Glsl {
            shader: Cow::Borrowed(VERTEX_SHADER_GLSL),
            stage: ShaderStage::Vertex,
            defines: &[],
        },
    })
}

/// Assembles the fragment shader: shared uniform/texture declarations, the
/// coherent-noise module, then the liquid-distortion body.
pub(crate) fn compile_fragment_shader(device: &wgpu::Device) -> wgpu::ShaderModule {
    let source = fragment_source();
    device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("plane fragment"),
        source: wgpu::ShaderSource::Glsl {
            shader: Cow::Owned(source),
            stage: ShaderStage::Fragment,
            defines: &[],
        },
    })
}

fn fragment_source() -> String {
    format!("{FRAGMENT_HEADER}{SIMPLEX_NOISE_GLSL}{FRAGMENT_BODY}")
}

const VERTEX_SHADER_GLSL: &str = r"#version 450
layout(location = 0) in vec2 position;
layout(location = 1) in vec2 uv;
layout(location = 0) out vec2 v_uv;

layout(std140, set = 0, binding = 0) uniform PlaneParams {
    mat4 mvp;
    vec4 uv_transform;
    float time;
    float aspect;
    float noise_scale;
    float ripple;
    float distortion;
    float has_distortion;
    vec2 _padding;
} ubo;

void main() {
    v_uv = uv;
    gl_Position = ubo.mvp * vec4(position, 0.0, 1.0);
}
";

/// Fragment prologue: varyings, output, uniform block, texture bindings.
const FRAGMENT_HEADER: &str = r"#version 450
layout(location = 0) in vec2 v_uv;
layout(location = 0) out vec4 out_color;

layout(std140, set = 0, binding = 0) uniform PlaneParams {
    mat4 mvp;
    vec4 uv_transform;
    float time;
    float aspect;
    float noise_scale;
    float ripple;
    float distortion;
    float has_distortion;
    vec2 _padding;
} ubo;

layout(set = 1, binding = 0) uniform texture2D base_map;
layout(set = 1, binding = 1) uniform sampler base_sampler;
layout(set = 1, binding = 2) uniform texture2D distortion_map;
layout(set = 1, binding = 3) uniform sampler distortion_sampler;
";

/// Standard Ashima-style 3D simplex noise. Any deterministic coherent noise
/// with this signature would do; this one is the de-facto GLSL reference.
const SIMPLEX_NOISE_GLSL: &str = r"
vec3 mod289(vec3 x) { return x - floor(x * (1.0 / 289.0)) * 289.0; }
vec4 mod289(vec4 x) { return x - floor(x * (1.0 / 289.0)) * 289.0; }
vec4 permute(vec4 x) { return mod289(((x * 34.0) + 10.0) * x); }
vec4 taylorInvSqrt(vec4 r) { return 1.79284291400159 - 0.85373472095314 * r; }

float snoise(vec3 v) {
    const vec2 C = vec2(1.0 / 6.0, 1.0 / 3.0);
    const vec4 D = vec4(0.0, 0.5, 1.0, 2.0);

    vec3 i = floor(v + dot(v, C.yyy));
    vec3 x0 = v - i + dot(i, C.xxx);

    vec3 g = step(x0.yzx, x0.xyz);
    vec3 l = 1.0 - g;
    vec3 i1 = min(g.xyz, l.zxy);
    vec3 i2 = max(g.xyz, l.zxy);

    vec3 x1 = x0 - i1 + C.xxx;
    vec3 x2 = x0 - i2 + C.yyy;
    vec3 x3 = x0 - D.yyy;

    i = mod289(i);
    vec4 p = permute(permute(permute(
            i.z + vec4(0.0, i1.z, i2.z, 1.0))
            + i.y + vec4(0.0, i1.y, i2.y, 1.0))
            + i.x + vec4(0.0, i1.x, i2.x, 1.0));

    float n_ = 0.142857142857;
    vec3 ns = n_ * D.wyz - D.xzx;

    vec4 j = p - 49.0 * floor(p * ns.z * ns.z);

    vec4 x_ = floor(j * ns.z);
    vec4 y_ = floor(j - 7.0 * x_);

    vec4 x = x_ * ns.x + ns.yyyy;
    vec4 y = y_ * ns.x + ns.yyyy;
    vec4 h = 1.0 - abs(x) - abs(y);

    vec4 b0 = vec4(x.xy, y.xy);
    vec4 b1 = vec4(x.zw, y.zw);

    vec4 s0 = floor(b0) * 2.0 + 1.0;
    vec4 s1 = floor(b1) * 2.0 + 1.0;
    vec4 sh = -step(h, vec4(0.0));

    vec4 a0 = b0.xzyw + s0.xzyw * sh.xxyy;
    vec4 a1 = b1.xzyw + s1.xzyw * sh.zzww;

    vec3 p0 = vec3(a0.xy, h.x);
    vec3 p1 = vec3(a0.zw, h.y);
    vec3 p2 = vec3(a1.xy, h.z);
    vec3 p3 = vec3(a1.zw, h.w);

    vec4 norm = taylorInvSqrt(vec4(dot(p0, p0), dot(p1, p1), dot(p2, p2), dot(p3, p3)));
    p0 *= norm.x;
    p1 *= norm.y;
    p2 *= norm.z;
    p3 *= norm.w;

    vec4 m = max(0.5 - vec4(dot(x0, x0), dot(x1, x1), dot(x2, x2), dot(x3, x3)), 0.0);
    m = m * m;
    return 105.0 * dot(m * m, vec4(dot(p0, x0), dot(p1, x1), dot(p2, x2), dot(p3, x3)));
}
";

/// Liquid distortion: the trail map gates a noise-driven UV displacement on
/// top of the cover-fit crop. With no distortion map bound the displacement
/// is exactly zero and the plane shows the undisturbed base map.
const FRAGMENT_BODY: &str = r"
void main() {
    vec2 cover_uv = v_uv * ubo.uv_transform.xy + ubo.uv_transform.zw;

    float trail = texture(sampler2D(distortion_map, distortion_sampler), v_uv).r
        * ubo.has_distortion;

    vec2 noise_pos = vec2(v_uv.x * ubo.aspect, v_uv.y) * ubo.noise_scale;
    float n = snoise(vec3(noise_pos, ubo.time * 0.01));
    float wave = sin(n * ubo.ripple + ubo.time * 0.03);
    vec2 direction = vec2(cos(n * 6.28318530718), sin(n * 6.28318530718));

    vec2 uv = cover_uv + direction * wave * trail * ubo.distortion * 0.05;
    out_color = texture(sampler2D(base_map, base_sampler), uv);
}
";

#[cfg(test)]
mod tests {
    use super::*;

    /// The std140 block as it must appear verbatim in both stages.
    const UNIFORM_BLOCK: &str = r"layout(std140, set = 0, binding = 0) uniform PlaneParams {
    mat4 mvp;
    vec4 uv_transform;
    float time;
    float aspect;
    float noise_scale;
    float ripple;
    float distortion;
    float has_distortion;
    vec2 _padding;
} ubo;";

    #[test]
    fn fragment_assembles_one_entry_point() {
        let source = fragment_source();
        assert_eq!(source.matches("void main()").count(), 1);
        assert!(source.contains("float snoise(vec3 v)"));
        assert!(source.starts_with("#version 450"));
    }

    #[test]
    fn both_stages_declare_the_same_uniform_block() {
        let source = fragment_source();
        assert!(source.contains(UNIFORM_BLOCK.trim()));
        assert!(VERTEX_SHADER_GLSL.contains(UNIFORM_BLOCK.trim()));
    }

    #[test]
    fn fragment_guards_the_distortion_map_behind_the_flag() {
        // An unbound map must read as zero displacement.
        assert!(FRAGMENT_BODY.contains("ubo.has_distortion"));
    }
}
