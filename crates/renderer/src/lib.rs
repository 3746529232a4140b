//! Renderer crate for liquidview.
//!
//! Glues the winit window, `wgpu` pipeline, and the distorted media plane
//! together. The overall flow is:
//!
//! ```text
//!   CLI / liquidview
//!          │ window + media
//!          ▼
//!   Stage ──▶ Viewport (resize/render callbacks, frame clock)
//!     │                │
//!     │                └─▶ Plane::frame() ─▶ GPU UBO
//!     └─▶ render pass ──▶ Plane::draw() ─▶ present
//! ```
//!
//! `Stage` owns all GPU resources (surface, device, scene nodes) while
//! `Viewport` is the GPU-free coordinator that decides when a draw may
//! happen: it reapplies geometry atomically, notifies subscribers in order,
//! and skips presentation whenever the container has no area. The plane's
//! GLSL is embedded and compiled through naga at pipeline build time.

mod callbacks;
mod clock;
mod cover;
mod gpu;
mod plane;
mod shaders;
mod stage;
mod viewport;

pub use wgpu::SurfaceError;

pub use callbacks::{Callbacks, Subscription};
pub use clock::{FrameClock, FrameTick};
pub use cover::{cover_fit, UvTransform};
pub use plane::{
    mesh_scale, BaseImage, Plane, PlaneSettings, DISTORTION_RANGE, NOISE_SCALE_RANGE, RIPPLE_RANGE,
};
pub use stage::{Drawable, NodeId, Stage};
pub use viewport::{PlayState, Viewport, ViewportOptions, ViewportState};
