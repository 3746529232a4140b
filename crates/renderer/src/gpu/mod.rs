//! GPU plumbing for the stage and plane.
//!
//! - `context` owns wgpu instance/device/surface wiring and knows how to
//!   rebuild swapchain state when the window resizes.
//! - `pipeline` compiles the embedded GLSL into the one render pipeline the
//!   plane needs and owns its quad geometry and uniform buffer.
//! - `texture` uploads the base media frame and mirrors the CPU trail buffer
//!   into a single-channel map.
//! - `uniforms` is the std140 block written through the queue each frame.

mod context;
mod pipeline;
mod texture;
mod uniforms;

pub(crate) use context::GpuContext;
pub(crate) use pipeline::PlanePipeline;
pub(crate) use texture::{MediaTexture, TrailTexture};
pub(crate) use uniforms::PlaneUniforms;
