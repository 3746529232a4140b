use crate::callbacks::{Callbacks, Subscription};
use crate::clock::{FrameClock, FrameTick};

/// Default camera distance, in pixels, matching a "CSS perspective" of 2000.
const DEFAULT_PERSPECTIVE: f32 = 2000.0;

/// Viewport geometry recomputed atomically on every resize.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportState {
    /// Container width in physical pixels.
    pub width: u32,
    /// Container height in physical pixels.
    pub height: u32,
    /// Device pixel ratio at the time of the last resize.
    pub pixel_ratio: f32,
}

impl ViewportState {
    pub fn aspect(&self) -> f32 {
        if self.height == 0 {
            return 1.0;
        }
        self.width as f32 / self.height as f32
    }

    /// A zero-area viewport is tolerated; rendering just skips the draw.
    pub fn has_area(&self) -> bool {
        self.width > 0 && self.height > 0
    }
}

/// Camera parameters fixed at construction.
#[derive(Debug, Clone, Copy)]
pub struct ViewportOptions {
    /// Camera distance from the plane, in pixels.
    pub perspective: f32,
    /// Explicit vertical field of view in degrees; `None` derives it from
    /// the viewport height so one world unit equals one pixel at the plane.
    pub fov: Option<f32>,
    pub near: f32,
    pub far: f32,
}

impl Default for ViewportOptions {
    fn default() -> Self {
        Self {
            perspective: DEFAULT_PERSPECTIVE,
            fov: None,
            near: 1.0,
            far: 10_000.0,
        }
    }
}

impl ViewportOptions {
    /// Vertical field of view in degrees for the given viewport height:
    /// `2 * atan(height / 2 / perspective)` unless explicitly overridden.
    pub fn fov_y_degrees(&self, height: u32) -> f32 {
        if let Some(fov) = self.fov {
            return fov;
        }
        let half = height as f32 * 0.5 / self.perspective;
        180.0 * (2.0 * half.atan()) / std::f32::consts::PI
    }
}

/// Lifecycle of the coordinator. `Destroyed` is terminal; every call on a
/// destroyed viewport is a silent no-op so nothing ever throws into the
/// frame driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayState {
    Ready,
    Playing,
    Paused,
    Destroyed,
}

/// GPU-free viewport coordinator: owns the state, the frame clock, and the
/// typed `resize`/`render` callback registries, and decides when a draw may
/// actually happen. The GPU-owning [`Stage`](crate::stage::Stage) delegates
/// ordering decisions here, which keeps the coordination rules unit-testable
/// without a device.
pub struct Viewport {
    state: ViewportState,
    options: ViewportOptions,
    clock: FrameClock,
    resize: Callbacks<ViewportState>,
    render: Callbacks<FrameTick>,
    play_state: PlayState,
}

impl Viewport {
    pub fn new(options: ViewportOptions, width: u32, height: u32, pixel_ratio: f32) -> Self {
        Self {
            state: ViewportState {
                width,
                height,
                pixel_ratio,
            },
            options,
            clock: FrameClock::new(),
            resize: Callbacks::new(),
            render: Callbacks::new(),
            play_state: PlayState::Ready,
        }
    }

    pub fn state(&self) -> ViewportState {
        self.state
    }

    pub fn options(&self) -> ViewportOptions {
        self.options
    }

    pub fn play_state(&self) -> PlayState {
        self.play_state
    }

    pub fn on_resize(
        &mut self,
        listener: impl FnMut(&ViewportState) + 'static,
    ) -> Subscription {
        self.resize.on(listener)
    }

    pub fn off_resize(&mut self, subscription: Subscription) -> bool {
        self.resize.off(subscription)
    }

    pub fn on_render(&mut self, listener: impl FnMut(&FrameTick) + 'static) -> Subscription {
        self.render.on(listener)
    }

    pub fn off_render(&mut self, subscription: Subscription) -> bool {
        self.render.off(subscription)
    }

    /// Applies new container geometry, notifies resize subscribers, then
    /// renders once synchronously so no frame is ever presented with stale
    /// transforms.
    pub fn resize_to(
        &mut self,
        width: u32,
        height: u32,
        pixel_ratio: f32,
        draw: impl FnOnce(&ViewportState, &FrameTick),
    ) {
        if self.play_state == PlayState::Destroyed {
            return;
        }
        self.state = ViewportState {
            width,
            height,
            pixel_ratio,
        };
        let state = self.state;
        self.resize.emit(&state);
        self.render_with(draw);
    }

    /// Runs one frame: ticks the clock, notifies render subscribers (they
    /// mutate their own uniforms/state), then invokes `draw` only when the
    /// viewport has positive area.
    pub fn render_with(&mut self, draw: impl FnOnce(&ViewportState, &FrameTick)) {
        if self.play_state == PlayState::Destroyed {
            return;
        }
        let tick = self.clock.tick();
        self.render.emit(&tick);
        if self.state.has_area() {
            draw(&self.state, &tick);
        }
    }

    /// Starts the frame driver; no-op when already playing or destroyed.
    pub fn play(&mut self) {
        match self.play_state {
            PlayState::Ready | PlayState::Paused => {
                self.clock.reset();
                self.play_state = PlayState::Playing;
            }
            PlayState::Playing | PlayState::Destroyed => {}
        }
    }

    /// Stops the frame driver; no-op when not playing.
    pub fn pause(&mut self) {
        if self.play_state == PlayState::Playing {
            self.play_state = PlayState::Paused;
        }
    }

    pub fn is_playing(&self) -> bool {
        self.play_state == PlayState::Playing
    }

    /// Terminal teardown: detaches every subscriber so no later notification
    /// can reach them. Safe to call mid-frame-loop, idempotent.
    pub fn destroy(&mut self) {
        if self.play_state == PlayState::Destroyed {
            return;
        }
        self.resize.clear();
        self.render.clear();
        self.play_state = PlayState::Destroyed;
    }

    #[cfg(test)]
    pub(crate) fn subscriber_count(&self) -> usize {
        self.resize.len() + self.render.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn counting_draw(count: Rc<RefCell<u32>>) -> impl FnOnce(&ViewportState, &FrameTick) {
        move |_, _| *count.borrow_mut() += 1
    }

    #[test]
    fn derived_fov_matches_perspective_formula() {
        let options = ViewportOptions::default();
        // height 600 at perspective 2000 -> 2*atan(0.15) in degrees.
        let expected = 180.0 * (2.0 * (0.15f32).atan()) / std::f32::consts::PI;
        assert!((options.fov_y_degrees(600) - expected).abs() < 1e-4);
    }

    #[test]
    fn explicit_fov_wins() {
        let options = ViewportOptions {
            fov: Some(45.0),
            ..Default::default()
        };
        assert_eq!(options.fov_y_degrees(600), 45.0);
    }

    #[test]
    fn zero_area_viewport_skips_the_draw_but_still_notifies() {
        let mut viewport = Viewport::new(ViewportOptions::default(), 0, 0, 1.0);
        let draws = Rc::new(RefCell::new(0));
        let renders = Rc::new(RefCell::new(0));
        {
            let renders = renders.clone();
            viewport.on_render(move |_| *renders.borrow_mut() += 1);
        }

        viewport.render_with(counting_draw(draws.clone()));
        assert_eq!(*draws.borrow(), 0, "no draw on a 0x0 container");
        assert_eq!(*renders.borrow(), 1, "subscribers still hear the tick");
    }

    #[test]
    fn resize_from_zero_restores_drawing() {
        let mut viewport = Viewport::new(ViewportOptions::default(), 0, 0, 1.0);
        let draws = Rc::new(RefCell::new(0));

        viewport.render_with(counting_draw(draws.clone()));
        assert_eq!(*draws.borrow(), 0);

        // The resize itself renders once synchronously...
        viewport.resize_to(100, 100, 1.0, counting_draw(draws.clone()));
        assert_eq!(*draws.borrow(), 1);

        // ...and the next regular render draws exactly once more.
        viewport.render_with(counting_draw(draws.clone()));
        assert_eq!(*draws.borrow(), 2);
    }

    #[test]
    fn resize_notifies_subscribers_before_the_synchronous_draw() {
        let mut viewport = Viewport::new(ViewportOptions::default(), 800, 600, 1.0);
        let log = Rc::new(RefCell::new(Vec::new()));
        {
            let log = log.clone();
            viewport.on_resize(move |state| {
                log.borrow_mut().push(format!("resize {}x{}", state.width, state.height));
            });
        }
        {
            let log = log.clone();
            viewport.resize_to(1600, 600, 1.0, move |state, _| {
                log.borrow_mut().push(format!("draw {}x{}", state.width, state.height));
            });
        }
        assert_eq!(*log.borrow(), vec!["resize 1600x600", "draw 1600x600"]);
    }

    #[test]
    fn play_pause_are_idempotent() {
        let mut viewport = Viewport::new(ViewportOptions::default(), 800, 600, 1.0);
        assert_eq!(viewport.play_state(), PlayState::Ready);
        viewport.pause();
        assert_eq!(viewport.play_state(), PlayState::Ready);
        viewport.play();
        viewport.play();
        assert!(viewport.is_playing());
        viewport.pause();
        viewport.pause();
        assert_eq!(viewport.play_state(), PlayState::Paused);
    }

    #[test]
    fn destroy_detaches_every_subscriber_and_is_terminal() {
        let mut viewport = Viewport::new(ViewportOptions::default(), 800, 600, 1.0);
        let hits = Rc::new(RefCell::new(0));
        {
            let hits = hits.clone();
            viewport.on_resize(move |_| *hits.borrow_mut() += 1);
        }
        {
            let hits = hits.clone();
            viewport.on_render(move |_| *hits.borrow_mut() += 1);
        }
        assert_eq!(viewport.subscriber_count(), 2);

        viewport.destroy();
        assert_eq!(viewport.subscriber_count(), 0);

        let draws = Rc::new(RefCell::new(0));
        viewport.render_with(counting_draw(draws.clone()));
        viewport.resize_to(100, 100, 1.0, counting_draw(draws.clone()));
        viewport.play();
        assert_eq!(*hits.borrow(), 0, "no notification reaches a destroyed viewport");
        assert_eq!(*draws.borrow(), 0);
        assert_eq!(viewport.play_state(), PlayState::Destroyed);

        viewport.destroy();
        assert_eq!(viewport.play_state(), PlayState::Destroyed);
    }

    #[test]
    fn off_render_detaches_before_destroy() {
        let mut viewport = Viewport::new(ViewportOptions::default(), 800, 600, 1.0);
        let hits = Rc::new(RefCell::new(0));
        let sub = {
            let hits = hits.clone();
            viewport.on_render(move |_| *hits.borrow_mut() += 1)
        };
        assert!(viewport.off_render(sub));
        viewport.render_with(|_, _| {});
        assert_eq!(*hits.borrow(), 0);
    }
}
