//! Window setup and the frame driver.
//!
//! Per-frame ordering matters: the trail simulation steps first (inside the
//! viewport's render notification), its pixels are uploaded while still
//! fresh, the plane's uniforms are flushed, and only then does the stage
//! record the render pass. A redraw is requested again at the end of each
//! loop turn while the viewer is playing.

use std::cell::RefCell;
use std::rc::Rc;

use anyhow::{Context, Result};
use renderer::{Plane, PlaneSettings, Stage, SurfaceError, ViewportOptions};
use tracing_subscriber::EnvFilter;
use trail::TrailSimulator;
use winit::dpi::LogicalSize;
use winit::event::{ElementState, Event, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::WindowBuilder;

use crate::bootstrap::{load_base_image, trail_dimensions};
use crate::cli::Cli;
use crate::controls::DebugControls;

pub fn run(args: Cli) -> Result<()> {
    initialise_tracing();

    let base = load_base_image(args.image.as_deref())?;

    let event_loop = EventLoop::new().context("failed to create event loop")?;
    let (width, height) = args.size;
    let window = WindowBuilder::new()
        .with_title("liquidview")
        .with_inner_size(LogicalSize::new(width, height))
        .build(&event_loop)
        .context("failed to create window")?;

    let size = window.inner_size();
    let pixel_ratio = window.scale_factor() as f32;
    let options = ViewportOptions {
        perspective: args.perspective,
        fov: args.fov,
        ..Default::default()
    };
    let mut stage = Stage::new(&window, options, size.width, size.height, pixel_ratio)?;
    tracing::info!(
        width = size.width,
        height = size.height,
        pixel_ratio,
        "stage ready"
    );

    let settings = PlaneSettings {
        noise_scale: args.noise_scale,
        ripple: args.ripple,
        distortion: args.distortion,
    };
    let plane = Rc::new(RefCell::new(Plane::new(
        stage.device(),
        stage.queue(),
        stage.surface_format(),
        &base,
        stage.state(),
        options,
        settings,
    )));
    stage.add_node(plane.clone());

    let (trail_w, trail_h) = trail_dimensions(size.width, size.height);
    let sim = Rc::new(RefCell::new(TrailSimulator::new(trail_w, trail_h)));

    // The plane tracks viewport geometry through the resize notification.
    {
        let plane = plane.clone();
        stage
            .viewport()
            .on_resize(move |state| plane.borrow_mut().resize(*state));
    }

    // One render subscriber owns the whole per-frame update so the ordering
    // (simulate, upload, flush uniforms) cannot be broken by registration
    // order elsewhere.
    {
        let sim = sim.clone();
        let plane = plane.clone();
        let device = stage.device().clone();
        let queue = stage.queue().clone();
        let mut bound_generation = u64::MAX;
        stage.viewport().on_render(move |tick| {
            let mut sim = sim.borrow_mut();
            sim.render(tick.factor);
            let mut plane = plane.borrow_mut();
            if sim.generation() != bound_generation {
                bound_generation = sim.generation();
                plane.set_distortion_map(&device, sim.width(), sim.height());
            }
            if sim.take_dirty() {
                plane.upload_trail(&queue, sim.pixels());
            }
            plane.frame(&queue, tick.factor);
        });
    }

    let mut controls = DebugControls::new();
    let mut settings = plane.borrow().settings();

    // Present one frame synchronously so the window never shows garbage
    // before the event loop takes over.
    if let Err(err) = stage.resize(size.width, size.height, pixel_ratio) {
        tracing::warn!(?err, "initial frame failed; retrying once the loop runs");
    }
    stage.play();

    event_loop
        .run(move |event, elwt| {
            elwt.set_control_flow(if stage.is_playing() {
                ControlFlow::Poll
            } else {
                ControlFlow::Wait
            });

            match event {
                Event::WindowEvent { event, .. } => match event {
                    WindowEvent::CloseRequested => {
                        stage.destroy();
                        sim.borrow_mut().destroy();
                        elwt.exit();
                    }
                    WindowEvent::Resized(new_size) => {
                        let pixel_ratio = window.scale_factor() as f32;
                        let (trail_w, trail_h) =
                            trail_dimensions(new_size.width, new_size.height);
                        sim.borrow_mut().resize(trail_w, trail_h);
                        if let Err(err) =
                            stage.resize(new_size.width, new_size.height, pixel_ratio)
                        {
                            handle_surface_error(&mut stage, err, elwt);
                        }
                    }
                    WindowEvent::CursorMoved { position, .. } => {
                        let state = stage.state();
                        if state.has_area() {
                            sim.borrow_mut().record_pointer_move(
                                (position.x as f32 / state.width as f32).clamp(0.0, 1.0),
                                (position.y as f32 / state.height as f32).clamp(0.0, 1.0),
                            );
                        }
                    }
                    WindowEvent::Occluded(occluded) => {
                        if occluded {
                            stage.pause();
                        } else {
                            stage.play();
                            window.request_redraw();
                        }
                    }
                    WindowEvent::KeyboardInput { event, .. }
                        if event.state == ElementState::Pressed =>
                    {
                        if let PhysicalKey::Code(code) = event.physical_key {
                            match code {
                                KeyCode::Escape => {
                                    stage.destroy();
                                    sim.borrow_mut().destroy();
                                    elwt.exit();
                                }
                                KeyCode::Space => {
                                    if stage.is_playing() {
                                        stage.pause();
                                    } else {
                                        stage.play();
                                        window.request_redraw();
                                    }
                                }
                                other => {
                                    if controls.handle_key(other, &mut settings) {
                                        plane.borrow_mut().apply_settings(settings);
                                    }
                                }
                            }
                        }
                    }
                    WindowEvent::RedrawRequested => {
                        if let Err(err) = stage.render() {
                            handle_surface_error(&mut stage, err, elwt);
                        }
                    }
                    _ => {}
                },
                Event::AboutToWait => {
                    if stage.is_playing() {
                        window.request_redraw();
                    }
                }
                _ => {}
            }
        })
        .context("event loop terminated abnormally")?;

    Ok(())
}

fn initialise_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// Lost and outdated surfaces are rebuilt and retried on the next frame;
/// running out of memory ends the session; anything else is transient.
fn handle_surface_error(
    stage: &mut Stage,
    err: SurfaceError,
    elwt: &winit::event_loop::EventLoopWindowTarget<()>,
) {
    match err {
        SurfaceError::Lost | SurfaceError::Outdated => {
            tracing::warn!(?err, "surface lost; reconfiguring");
            stage.recover_surface();
        }
        SurfaceError::OutOfMemory => {
            tracing::error!("out of GPU memory; shutting down");
            stage.destroy();
            elwt.exit();
        }
        other => {
            tracing::warn!(?other, "transient surface error; retrying next frame");
        }
    }
}
