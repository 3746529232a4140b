//! CPU-side "liquid" trail simulator.
//!
//! Pointer moves feed a decaying grayscale intensity map built from two
//! off-screen surfaces: each frame a soft blob is painted at the last pointer
//! position into the front surface, the front is copied into the back with a
//! slight zoom (diffusion creep), and the back is drawn over a cleared front
//! at a sub-unit alpha so the trail fades over many frames. The front
//! surface's pixels are exposed as a live texture source for the GPU plane's
//! distortion input.
//!
//! Everything here runs on the render thread; pointer handling only writes a
//! single-slot mailbox plus the activity timer, and the render pass is the
//! sole reader.

mod surface;
mod timer;

use std::time::{Duration, Instant};

pub use surface::Surface;
pub use timer::ActivityTimer;

/// Silence window after which the pointer counts as stopped.
const MOVING_WINDOW: Duration = Duration::from_millis(250);

/// Intensity gain per normalized frame while the pointer is moving.
const INTENSITY_RISE: f32 = 0.05;

/// Intensity loss per normalized frame once movement stops. Roughly 50x
/// slower than the rise, which is what keeps the trail long-lived.
const INTENSITY_DECAY: f32 = -0.001;

/// Blob radius as a fraction of the larger viewport dimension.
const BLOB_RADIUS_FACTOR: f32 = 0.075;

/// Per-frame zoom applied when copying front into back.
const ZOOM_CREEP: f32 = 1.01;

/// Feedback alpha ceiling; below 1.0 so the trail converges to empty.
const FEEDBACK_ALPHA: f32 = 0.98;

/// Normalized pointer position, both axes in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerPoint {
    pub x: f32,
    pub y: f32,
}

/// Feedback-buffer trail simulator.
///
/// At most one pointer point is pending at a time; new moves overwrite the
/// previous one rather than queueing. `render` must be called once per frame
/// with the shared frame factor so intensity stays in sync with the plane's
/// time uniform.
pub struct TrailSimulator {
    front: Surface,
    back: Surface,
    point: Option<PointerPoint>,
    timer: ActivityTimer,
    intensity: f32,
    dirty: bool,
    generation: u64,
    destroyed: bool,
}

impl TrailSimulator {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            front: Surface::new(width, height),
            back: Surface::new(width, height),
            point: None,
            timer: ActivityTimer::new(MOVING_WINDOW),
            intensity: 0.0,
            dirty: false,
            generation: 0,
            destroyed: false,
        }
    }

    pub fn width(&self) -> u32 {
        self.front.width()
    }

    pub fn height(&self) -> u32 {
        self.front.height()
    }

    /// Current trail intensity in `[0, 1]`.
    pub fn intensity(&self) -> f32 {
        self.intensity
    }

    /// Bumped whenever the backing surfaces are reallocated; the GPU texture
    /// handle must be recreated when this changes.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Live view of the front surface, row-major grayscale in `[0, 1]`.
    pub fn pixels(&self) -> &[f32] {
        self.front.pixels()
    }

    /// Consumes the dirty flag set by the last `render`.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::replace(&mut self.dirty, false)
    }

    /// Records a pointer move in normalized coordinates.
    pub fn record_pointer_move(&mut self, x: f32, y: f32) {
        self.record_pointer_move_at(x, y, Instant::now());
    }

    /// As [`record_pointer_move`](Self::record_pointer_move) with an injected
    /// timestamp.
    pub fn record_pointer_move_at(&mut self, x: f32, y: f32, now: Instant) {
        if self.destroyed {
            return;
        }
        self.point = Some(PointerPoint { x, y });
        self.timer.arm(now);
    }

    /// True while the activity window of the last move has not elapsed.
    pub fn is_moving_at(&self, now: Instant) -> bool {
        self.timer.is_active(now)
    }

    /// Runs one simulation step. `delta` is the normalized frame factor from
    /// the shared frame clock.
    pub fn render(&mut self, delta: f32) {
        self.render_at(delta, Instant::now());
    }

    /// As [`render`](Self::render) with an injected timestamp.
    pub fn render_at(&mut self, delta: f32, now: Instant) {
        if self.destroyed {
            return;
        }

        let rate = if self.timer.is_active(now) {
            INTENSITY_RISE
        } else {
            INTENSITY_DECAY
        };
        self.intensity = (self.intensity + delta * rate).clamp(0.0, 1.0);

        self.paint_pending_point();

        // Diffusion: back receives the front zoomed slightly about the center,
        // then the faded back becomes the new front.
        self.back.clear();
        self.back.copy_scaled_from(&self.front, ZOOM_CREEP, 1.0);
        self.front.clear();
        self.front
            .copy_scaled_from(&self.back, 1.0, FEEDBACK_ALPHA * self.intensity);

        self.dirty = true;
    }

    /// Paints at most one blob per frame, consuming the pending point.
    fn paint_pending_point(&mut self) {
        let Some(point) = self.point.take() else {
            return;
        };
        let width = self.front.width() as f32;
        let height = self.front.height() as f32;
        let radius = width.max(height) * BLOB_RADIUS_FACTOR * self.intensity;
        self.front.fill_soft_circle(
            point.x * width,
            point.y * height,
            radius,
            radius * 0.5,
            self.intensity,
        );
    }

    /// Reallocates both surfaces for a new viewport size. The trail content
    /// does not survive the resize; the exposed texture handle must be
    /// recreated by whoever uploads the pixels.
    pub fn resize(&mut self, width: u32, height: u32) {
        if self.destroyed || (width == self.width() && height == self.height()) {
            return;
        }
        tracing::debug!(width, height, "reallocating trail surfaces");
        self.front = Surface::new(width, height);
        self.back = Surface::new(width, height);
        self.generation += 1;
        self.dirty = false;
    }

    /// Tears the simulator down: cancels the activity timer and turns every
    /// later call into a no-op. Idempotent.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.timer.cancel();
        self.point = None;
        self.destroyed = true;
        tracing::debug!("trail simulator destroyed");
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sim() -> TrailSimulator {
        TrailSimulator::new(64, 64)
    }

    fn drive_moving(sim: &mut TrailSimulator, now: Instant, frames: u32) -> Instant {
        let mut t = now;
        for _ in 0..frames {
            sim.record_pointer_move_at(0.5, 0.5, t);
            sim.render_at(1.0, t);
            t += Duration::from_millis(16);
        }
        t
    }

    #[test]
    fn intensity_rises_while_moving_and_never_exceeds_one() {
        let mut sim = sim();
        let mut t = Instant::now();
        let mut last = sim.intensity();
        for _ in 0..60 {
            sim.record_pointer_move_at(0.5, 0.5, t);
            sim.render_at(1.0, t);
            assert!(sim.intensity() >= last);
            assert!(sim.intensity() <= 1.0);
            last = sim.intensity();
            t += Duration::from_millis(16);
        }
        assert!((sim.intensity() - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn intensity_decays_toward_zero_and_never_goes_negative() {
        let mut sim = sim();
        let t = Instant::now();
        let t = drive_moving(&mut sim, t, 10);

        // Past the silence window the intensity only falls.
        let idle = t + Duration::from_millis(300);
        let mut last = sim.intensity();
        for frame in 0..2000 {
            sim.render_at(1.0, idle + Duration::from_millis(16 * frame));
            assert!(sim.intensity() <= last);
            assert!(sim.intensity() >= 0.0);
            last = sim.intensity();
        }
        assert_eq!(sim.intensity(), 0.0);
    }

    #[test]
    fn decay_is_much_slower_than_rise() {
        let mut sim = sim();
        let t = Instant::now();
        sim.record_pointer_move_at(0.5, 0.5, t);
        sim.render_at(1.0, t);
        let after_rise = sim.intensity();

        sim.render_at(1.0, t + Duration::from_secs(1));
        let after_decay_frame = sim.intensity();
        assert!((after_rise - after_decay_frame) < after_rise * 0.1);
    }

    #[test]
    fn later_move_overwrites_pending_point() {
        let mut sim = sim();
        let mut t = Instant::now();
        // Pump intensity on the right side so the blob has a visible radius.
        for _ in 0..20 {
            sim.record_pointer_move_at(0.9, 0.5, t);
            sim.render_at(1.0, t);
            t += Duration::from_millis(16);
        }

        sim.record_pointer_move_at(0.1, 0.5, t);
        sim.record_pointer_move_at(0.9, 0.5, t);
        sim.render_at(1.0, t);

        let width = sim.width() as usize;
        let row = 32 * width;
        // The discarded left point would have landed around x=6.
        let left: f32 = sim.pixels()[row..row + width / 4].iter().sum();
        let right: f32 = sim.pixels()[row + width / 2..row + width].iter().sum();
        assert!(right > 0.0, "latest point must be painted");
        assert!(left < 1e-3, "discarded point must not be painted");
    }

    #[test]
    fn point_is_consumed_by_one_render() {
        let mut sim = sim();
        let t = Instant::now();
        let t = drive_moving(&mut sim, t, 20);

        sim.record_pointer_move_at(0.5, 0.5, t);
        sim.render_at(1.0, t);
        let first: f32 = sim.pixels().iter().sum();

        sim.render_at(1.0, t);
        let second: f32 = sim.pixels().iter().sum();
        // Second frame only fades; no second blob from the same point.
        assert!(second < first);
    }

    #[test]
    fn moves_inside_window_coalesce_into_one_stop() {
        let mut sim = sim();
        let start = Instant::now();
        sim.record_pointer_move_at(0.5, 0.5, start);
        sim.record_pointer_move_at(0.5, 0.5, start + Duration::from_millis(100));
        sim.record_pointer_move_at(0.5, 0.5, start + Duration::from_millis(200));

        // Still moving 250ms after the *first* move...
        assert!(sim.is_moving_at(start + Duration::from_millis(260)));
        // ...stopped 250ms after the *last* one.
        assert!(!sim.is_moving_at(start + Duration::from_millis(450)));
    }

    #[test]
    fn render_marks_texture_dirty_once() {
        let mut sim = sim();
        assert!(!sim.take_dirty());
        sim.render_at(1.0, Instant::now());
        assert!(sim.take_dirty());
        assert!(!sim.take_dirty());
    }

    #[test]
    fn resize_bumps_generation_and_reallocates() {
        let mut sim = sim();
        let gen = sim.generation();
        sim.resize(128, 32);
        assert_eq!(sim.generation(), gen + 1);
        assert_eq!(sim.width(), 128);
        assert_eq!(sim.height(), 32);
        assert_eq!(sim.pixels().len(), 128 * 32);

        // Same size is a no-op.
        sim.resize(128, 32);
        assert_eq!(sim.generation(), gen + 1);
    }

    #[test]
    fn destroy_is_idempotent_and_silences_everything() {
        let mut sim = sim();
        let t = Instant::now();
        drive_moving(&mut sim, t, 5);

        sim.destroy();
        sim.destroy();
        assert!(sim.is_destroyed());

        let before = sim.intensity();
        sim.record_pointer_move_at(0.5, 0.5, t);
        sim.render_at(1.0, t);
        assert_eq!(sim.intensity(), before);
        assert!(!sim.take_dirty());
    }
}
