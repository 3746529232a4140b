use std::time::{Duration, Instant};

/// Reference frame rate the per-frame factor is normalized against.
const REFERENCE_FPS: f32 = 60.0;

/// Per-frame timing snapshot handed to render subscribers.
#[derive(Debug, Clone, Copy)]
pub struct FrameTick {
    /// Seconds since the previous tick, clamped.
    pub dt: f32,
    /// Normalized speed multiplier: 1.0 at the reference rate, 0.5 at
    /// double rate, and so on. Both the trail intensity update and the
    /// plane's time uniform consume this same factor, which is what keeps
    /// the two subsystems synchronized across refresh rates.
    pub factor: f32,
    /// Monotonic frame counter.
    pub frame_index: u64,
}

/// Frame clock producing [`FrameTick`] snapshots.
///
/// Delta time is clamped so a debugger pause or minimized window cannot feed
/// pathological values into the simulation.
#[derive(Debug, Clone)]
pub struct FrameClock {
    last: Option<Instant>,
    frame_index: u64,
    dt_min: Duration,
    dt_max: Duration,
}

impl FrameClock {
    pub fn new() -> Self {
        Self {
            last: None,
            frame_index: 0,
            dt_min: Duration::from_micros(100),
            dt_max: Duration::from_millis(250),
        }
    }

    /// Resets the baseline, e.g. after resuming from a pause.
    pub fn reset(&mut self) {
        self.last = None;
    }

    pub fn tick(&mut self) -> FrameTick {
        self.tick_at(Instant::now())
    }

    /// Advances the clock with an injected timestamp.
    pub fn tick_at(&mut self, now: Instant) -> FrameTick {
        // The very first tick (and the first after a reset) has no previous
        // frame to measure against; assume the reference rate.
        let mut dt = match self.last {
            Some(last) => now.saturating_duration_since(last),
            None => Duration::from_secs_f32(1.0 / REFERENCE_FPS),
        };

        if dt < self.dt_min {
            dt = self.dt_min;
        } else if dt > self.dt_max {
            dt = self.dt_max;
        }

        self.last = Some(now);

        let dt = dt.as_secs_f32();
        let tick = FrameTick {
            dt,
            factor: dt * REFERENCE_FPS,
            frame_index: self.frame_index,
        };
        self.frame_index = self.frame_index.wrapping_add(1);
        tick
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}
