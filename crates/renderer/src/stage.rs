//! GPU-owning half of the render loop: surface, device, and the scene list.
//! Frame ordering and draw gating are delegated to the [`Viewport`], which
//! keeps those rules testable without a device.

use std::cell::RefCell;
use std::rc::Rc;

use anyhow::Result;
use raw_window_handle::{HasDisplayHandle, HasWindowHandle};
use winit::dpi::PhysicalSize;

use crate::gpu::GpuContext;
use crate::viewport::{Viewport, ViewportOptions, ViewportState};

/// Anything the stage can record into its render pass.
pub trait Drawable {
    fn draw(&self, pass: &mut wgpu::RenderPass<'_>);
}

/// Handle for detaching a node from the scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(u64);

/// Owns the GPU context, the viewport coordinator, and the draw list.
/// Nodes are drawn in insertion order into a single clear-to-black pass.
pub struct Stage {
    gpu: GpuContext,
    viewport: Viewport,
    scene: Vec<(NodeId, Rc<RefCell<dyn Drawable>>)>,
    next_node: u64,
}

impl Stage {
    pub fn new<T>(
        target: &T,
        options: ViewportOptions,
        width: u32,
        height: u32,
        pixel_ratio: f32,
    ) -> Result<Self>
    where
        T: HasDisplayHandle + HasWindowHandle,
    {
        let gpu = GpuContext::new(target, PhysicalSize::new(width, height))?;
        Ok(Self {
            gpu,
            viewport: Viewport::new(options, width, height, pixel_ratio),
            scene: Vec::new(),
            next_node: 0,
        })
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.gpu.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.gpu.queue
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.gpu.surface_format
    }

    pub fn viewport(&mut self) -> &mut Viewport {
        &mut self.viewport
    }

    pub fn state(&self) -> ViewportState {
        self.viewport.state()
    }

    pub fn is_playing(&self) -> bool {
        self.viewport.is_playing()
    }

    pub fn add_node(&mut self, node: Rc<RefCell<dyn Drawable>>) -> NodeId {
        let id = NodeId(self.next_node);
        self.next_node += 1;
        self.scene.push((id, node));
        id
    }

    pub fn remove_node(&mut self, id: NodeId) -> bool {
        let before = self.scene.len();
        self.scene.retain(|(node_id, _)| *node_id != id);
        self.scene.len() != before
    }

    /// Applies new window geometry: reconfigures the swapchain, notifies
    /// resize subscribers, then presents one frame synchronously.
    pub fn resize(
        &mut self,
        width: u32,
        height: u32,
        pixel_ratio: f32,
    ) -> Result<(), wgpu::SurfaceError> {
        self.gpu.resize(PhysicalSize::new(width, height));
        let gpu = &self.gpu;
        let scene = &self.scene;
        let mut result = Ok(());
        self.viewport.resize_to(width, height, pixel_ratio, |_, _| {
            result = draw_frame(gpu, scene);
        });
        result
    }

    /// Runs one frame through the viewport coordinator and presents it.
    /// Returns the surface error untouched; the frame driver decides whether
    /// to reconfigure, retry, or bail.
    pub fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        let gpu = &self.gpu;
        let scene = &self.scene;
        let mut result = Ok(());
        self.viewport.render_with(|_, _| {
            result = draw_frame(gpu, scene);
        });
        result
    }

    /// Rebuilds the swapchain after a lost or outdated surface.
    pub fn recover_surface(&mut self) {
        self.gpu.reconfigure();
    }

    pub fn play(&mut self) {
        self.viewport.play();
    }

    pub fn pause(&mut self) {
        self.viewport.pause();
    }

    /// Terminal teardown: detaches subscribers and drops every scene node.
    pub fn destroy(&mut self) {
        self.viewport.destroy();
        self.scene.clear();
    }
}

fn draw_frame(
    gpu: &GpuContext,
    scene: &[(NodeId, Rc<RefCell<dyn Drawable>>)],
) -> Result<(), wgpu::SurfaceError> {
    let frame = gpu.surface.get_current_texture()?;
    let view = frame
        .texture
        .create_view(&wgpu::TextureViewDescriptor::default());

    let mut encoder = gpu
        .device
        .create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("stage encoder"),
        });
    {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("stage pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &view,
                depth_slice: None,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        for (_, node) in scene {
            node.borrow().draw(&mut pass);
        }
    }

    gpu.queue.submit(std::iter::once(encoder.finish()));
    frame.present();
    Ok(())
}
