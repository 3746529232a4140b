use bytemuck::{Pod, Zeroable};

/// std140 uniform block backing the plane shaders.
///
/// Field order and padding must match the `PlaneParams` block declared in
/// `shaders.rs`. The struct is written to the queue whole every frame; at
/// 112 bytes that is cheaper than tracking per-field dirtiness.
#[repr(C, align(16))]
#[derive(Clone, Copy)]
pub(crate) struct PlaneUniforms {
    /// Projection * view * model, column-major.
    pub mvp: [[f32; 4]; 4],
    /// Cover-fit crop: `[scale.x, scale.y, offset.x, offset.y]`.
    pub uv_transform: [f32; 4],
    /// Accumulated animation time in frame-factor units.
    pub time: f32,
    /// Viewport width / height.
    pub aspect: f32,
    pub noise_scale: f32,
    pub ripple: f32,
    pub distortion: f32,
    /// 1.0 once a distortion map is bound, 0.0 for the placeholder.
    pub has_distortion: f32,
    pub _padding: [f32; 2],
}

unsafe impl Zeroable for PlaneUniforms {}
unsafe impl Pod for PlaneUniforms {}

impl PlaneUniforms {
    pub fn new() -> Self {
        Self {
            mvp: glam::Mat4::IDENTITY.to_cols_array_2d(),
            uv_transform: [1.0, 1.0, 0.0, 0.0],
            time: 0.0,
            aspect: 1.0,
            noise_scale: 0.0,
            ripple: 0.0,
            distortion: 0.0,
            has_distortion: 0.0,
            _padding: [0.0; 2],
        }
    }

    pub fn set_mvp(&mut self, mvp: glam::Mat4) {
        self.mvp = mvp.to_cols_array_2d();
    }

    pub fn set_uv_transform(&mut self, transform: [f32; 4]) {
        self.uv_transform = transform;
    }

    /// Advances the time uniform by a normalized frame factor so animation
    /// speed is independent of the display refresh rate.
    pub fn advance_time(&mut self, factor: f32) {
        self.time += factor;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_size_matches_the_shader_declaration() {
        // mat4 (64) + vec4 (16) + six floats (24) + vec2 padding (8).
        assert_eq!(std::mem::size_of::<PlaneUniforms>(), 112);
        assert_eq!(std::mem::align_of::<PlaneUniforms>(), 16);
    }

    #[test]
    fn time_accumulates_frame_factors() {
        let mut uniforms = PlaneUniforms::new();
        uniforms.advance_time(1.0);
        uniforms.advance_time(0.5);
        assert!((uniforms.time - 1.5).abs() < 1e-6);
    }
}
