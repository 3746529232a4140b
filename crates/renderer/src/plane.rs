//! The distorted media plane: a screen-filling quad whose fragment shader
//! displaces a cover-fit base map by trail-gated coherent noise.

use std::ops::RangeInclusive;

use glam::{Mat4, Vec3};

use crate::cover::cover_fit;
use crate::gpu::{MediaTexture, PlanePipeline, PlaneUniforms, TrailTexture};
use crate::stage::Drawable;
use crate::viewport::{ViewportOptions, ViewportState};

pub const NOISE_SCALE_RANGE: RangeInclusive<f32> = 0.5..=5.0;
pub const RIPPLE_RANGE: RangeInclusive<f32> = 1.0..=15.0;
pub const DISTORTION_RANGE: RangeInclusive<f32> = 0.1..=5.0;

/// Tunable distortion parameters, adjustable at runtime.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaneSettings {
    /// Spatial frequency of the noise field.
    pub noise_scale: f32,
    /// Frequency of the sine wave layered on the noise.
    pub ripple: f32,
    /// Overall displacement strength.
    pub distortion: f32,
}

impl Default for PlaneSettings {
    fn default() -> Self {
        Self {
            noise_scale: 2.0,
            ripple: 2.0,
            distortion: 1.0,
        }
    }
}

impl PlaneSettings {
    /// Clamps every parameter into its supported range.
    pub fn clamped(self) -> Self {
        Self {
            noise_scale: clamp_to(self.noise_scale, NOISE_SCALE_RANGE),
            ripple: clamp_to(self.ripple, RIPPLE_RANGE),
            distortion: clamp_to(self.distortion, DISTORTION_RANGE),
        }
    }
}

fn clamp_to(value: f32, range: RangeInclusive<f32>) -> f32 {
    value.clamp(*range.start(), *range.end())
}

/// Per-axis model scale keeping the plane glued to the container edges: the
/// mesh is built at the initial container size and stretched by the ratio of
/// the current size to it.
pub fn mesh_scale(initial: (u32, u32), current: (u32, u32)) -> [f32; 2] {
    let ratio = |init: u32, cur: u32| {
        if init == 0 {
            1.0
        } else {
            cur as f32 / init as f32
        }
    };
    [ratio(initial.0, current.0), ratio(initial.1, current.1)]
}

/// Builds the full transform for the plane quad. The camera sits on the +Z
/// axis at the perspective distance looking at the origin; with the derived
/// field of view, one world unit spans one pixel at the plane's depth.
fn build_mvp(state: &ViewportState, options: &ViewportOptions, initial: (u32, u32)) -> Mat4 {
    let fov = options.fov_y_degrees(state.height).to_radians();
    let projection = Mat4::perspective_rh(fov, state.aspect(), options.near, options.far);
    let view = Mat4::look_at_rh(
        Vec3::new(0.0, 0.0, options.perspective),
        Vec3::ZERO,
        Vec3::Y,
    );
    let scale = mesh_scale(initial, (state.width, state.height));
    let model = Mat4::from_scale(Vec3::new(
        initial.0 as f32 * scale[0],
        initial.1 as f32 * scale[1],
        1.0,
    ));
    projection * view * model
}

/// Decoded base media frame handed to [`Plane::new`].
pub struct BaseImage {
    pub width: u32,
    pub height: u32,
    /// Tightly packed RGBA8, `width * height * 4` bytes.
    pub pixels: Vec<u8>,
}

/// GPU-side plane node. Owns its pipeline, textures, and uniform state; the
/// stage drives it through `frame` and the [`Drawable`] impl.
pub struct Plane {
    pipeline: PlanePipeline,
    base: MediaTexture,
    trail: TrailTexture,
    bind_group: wgpu::BindGroup,
    uniforms: PlaneUniforms,
    settings: PlaneSettings,
    options: ViewportOptions,
    initial_size: (u32, u32),
}

impl Plane {
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        surface_format: wgpu::TextureFormat,
        base: &BaseImage,
        state: ViewportState,
        options: ViewportOptions,
        settings: PlaneSettings,
    ) -> Self {
        let pipeline = PlanePipeline::new(device, surface_format);
        let base = MediaTexture::from_rgba8(device, queue, base.width, base.height, &base.pixels);
        // 1x1 placeholder until a distortion map is attached; the shader
        // multiplies its sample by `has_distortion`, so contents are moot.
        let trail = TrailTexture::new(device, 1, 1);
        let bind_group = pipeline.create_texture_bind_group(
            device,
            &base.view,
            &base.sampler,
            &trail.view,
            &trail.sampler,
        );

        let settings = settings.clamped();
        let initial_size = (state.width.max(1), state.height.max(1));
        let mut uniforms = PlaneUniforms::new();
        uniforms.noise_scale = settings.noise_scale;
        uniforms.ripple = settings.ripple;
        uniforms.distortion = settings.distortion;

        let mut plane = Self {
            pipeline,
            base,
            trail,
            bind_group,
            uniforms,
            settings,
            options,
            initial_size,
        };
        plane.resize(state);
        plane
    }

    pub fn settings(&self) -> PlaneSettings {
        self.settings
    }

    /// Attaches (or re-attaches, after a simulation resize) the trail map.
    pub fn set_distortion_map(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        if self.trail.dimensions() == (width.max(1), height.max(1))
            && self.uniforms.has_distortion == 1.0
        {
            return;
        }
        self.trail = TrailTexture::new(device, width, height);
        self.bind_group = self.pipeline.create_texture_bind_group(
            device,
            &self.base.view,
            &self.base.sampler,
            &self.trail.view,
            &self.trail.sampler,
        );
        self.uniforms.has_distortion = 1.0;
    }

    /// Pushes fresh trail coverage to the GPU. Call only on dirty frames.
    pub fn upload_trail(&mut self, queue: &wgpu::Queue, pixels: &[f32]) {
        self.trail.upload(queue, pixels);
    }

    /// Recomputes the transform and cover-fit crop for new viewport geometry.
    pub fn resize(&mut self, state: ViewportState) {
        self.uniforms.aspect = state.aspect();
        self.uniforms
            .set_mvp(build_mvp(&state, &self.options, self.initial_size));
        self.uniforms.set_uv_transform(
            cover_fit(
                self.base.width as f32,
                self.base.height as f32,
                state.aspect(),
            )
            .to_array(),
        );
    }

    /// Per-frame update: advances animation time and flushes the uniform
    /// block to the GPU.
    pub fn frame(&mut self, queue: &wgpu::Queue, factor: f32) {
        self.uniforms.advance_time(factor);
        queue.write_buffer(
            &self.pipeline.uniform_buffer,
            0,
            bytemuck::bytes_of(&self.uniforms),
        );
    }

    pub fn apply_settings(&mut self, settings: PlaneSettings) {
        let settings = settings.clamped();
        self.settings = settings;
        self.uniforms.noise_scale = settings.noise_scale;
        self.uniforms.ripple = settings.ripple;
        self.uniforms.distortion = settings.distortion;
    }
}

impl Drawable for Plane {
    fn draw(&self, pass: &mut wgpu::RenderPass<'_>) {
        pass.set_pipeline(&self.pipeline.pipeline);
        pass.set_bind_group(0, &self.pipeline.uniform_bind_group, &[]);
        pass.set_bind_group(1, &self.bind_group, &[]);
        pass.set_vertex_buffer(0, self.pipeline.vertex_buffer.slice(..));
        pass.set_index_buffer(
            self.pipeline.index_buffer.slice(..),
            wgpu::IndexFormat::Uint16,
        );
        pass.draw_indexed(0..self.pipeline.index_count, 0, 0..1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mesh_scale_tracks_the_container() {
        assert_eq!(mesh_scale((800, 600), (800, 600)), [1.0, 1.0]);
        assert_eq!(mesh_scale((800, 600), (1600, 600)), [2.0, 1.0]);
        assert_eq!(mesh_scale((800, 600), (400, 300)), [0.5, 0.5]);
    }

    #[test]
    fn mesh_scale_tolerates_a_zero_initial_size() {
        assert_eq!(mesh_scale((0, 0), (1920, 1080)), [1.0, 1.0]);
    }

    #[test]
    fn settings_clamp_into_their_ranges() {
        let clamped = PlaneSettings {
            noise_scale: 100.0,
            ripple: 0.0,
            distortion: -3.0,
        }
        .clamped();
        assert_eq!(clamped.noise_scale, 5.0);
        assert_eq!(clamped.ripple, 1.0);
        assert_eq!(clamped.distortion, 0.1);

        let defaults = PlaneSettings::default();
        assert_eq!(defaults.clamped(), defaults);
    }

    #[test]
    fn mvp_fills_the_viewport_with_the_derived_fov() {
        // With the derived field of view, the quad's top edge at the plane
        // depth must land on the top of the clip volume.
        let state = ViewportState {
            width: 800,
            height: 600,
            pixel_ratio: 1.0,
        };
        let mvp = build_mvp(&state, &ViewportOptions::default(), (800, 600));
        let top_right = mvp * glam::Vec4::new(0.5, 0.5, 0.0, 1.0);
        let ndc = top_right / top_right.w;
        assert!((ndc.x - 1.0).abs() < 1e-4, "ndc.x {}", ndc.x);
        assert!((ndc.y - 1.0).abs() < 1e-4, "ndc.y {}", ndc.y);
    }

    #[test]
    fn mvp_keeps_the_plane_edge_locked_after_a_resize() {
        let grown = ViewportState {
            width: 1600,
            height: 600,
            pixel_ratio: 1.0,
        };
        let mvp = build_mvp(&grown, &ViewportOptions::default(), (800, 600));
        let right = mvp * glam::Vec4::new(0.5, 0.0, 0.0, 1.0);
        let ndc = right / right.w;
        assert!((ndc.x - 1.0).abs() < 1e-4, "ndc.x {}", ndc.x);
    }
}
