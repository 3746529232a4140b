//! Keyboard parameter editing for the distortion settings.
//!
//! Digits select a parameter, arrow keys nudge it within its supported
//! range. This stands in for the usual tweak-panel during development.

use renderer::{PlaneSettings, DISTORTION_RANGE, NOISE_SCALE_RANGE, RIPPLE_RANGE};
use winit::keyboard::KeyCode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Param {
    NoiseScale,
    Ripple,
    Distortion,
}

impl Param {
    fn label(self) -> &'static str {
        match self {
            Param::NoiseScale => "noise-scale",
            Param::Ripple => "ripple",
            Param::Distortion => "distortion",
        }
    }

    fn step(self) -> f32 {
        match self {
            Param::NoiseScale => 0.05,
            Param::Ripple => 0.5,
            Param::Distortion => 0.1,
        }
    }
}

pub struct DebugControls {
    selected: Param,
}

impl DebugControls {
    pub fn new() -> Self {
        Self {
            selected: Param::NoiseScale,
        }
    }

    /// Applies one key press to the settings. Returns true when the settings
    /// changed and need to be pushed to the plane.
    pub fn handle_key(&mut self, key: KeyCode, settings: &mut PlaneSettings) -> bool {
        match key {
            KeyCode::Digit1 => {
                self.select(Param::NoiseScale);
                false
            }
            KeyCode::Digit2 => {
                self.select(Param::Ripple);
                false
            }
            KeyCode::Digit3 => {
                self.select(Param::Distortion);
                false
            }
            KeyCode::ArrowUp => self.nudge(settings, 1.0),
            KeyCode::ArrowDown => self.nudge(settings, -1.0),
            _ => false,
        }
    }

    fn select(&mut self, param: Param) {
        self.selected = param;
        tracing::info!(param = param.label(), "selected parameter");
    }

    fn nudge(&self, settings: &mut PlaneSettings, direction: f32) -> bool {
        let before = *settings;
        let step = self.selected.step() * direction;
        match self.selected {
            Param::NoiseScale => settings.noise_scale += step,
            Param::Ripple => settings.ripple += step,
            Param::Distortion => settings.distortion += step,
        }
        *settings = settings.clamped();
        let changed = *settings != before;
        if changed {
            tracing::info!(
                param = self.selected.label(),
                noise_scale = settings.noise_scale,
                ripple = settings.ripple,
                distortion = settings.distortion,
                "adjusted parameter"
            );
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arrows_nudge_the_selected_parameter() {
        let mut controls = DebugControls::new();
        let mut settings = PlaneSettings::default();

        assert!(controls.handle_key(KeyCode::ArrowUp, &mut settings));
        assert!((settings.noise_scale - 2.05).abs() < 1e-6);

        assert!(!controls.handle_key(KeyCode::Digit2, &mut settings));
        assert!(controls.handle_key(KeyCode::ArrowDown, &mut settings));
        assert!((settings.ripple - 1.5).abs() < 1e-6);
    }

    #[test]
    fn nudges_clamp_at_the_range_edges() {
        let mut controls = DebugControls::new();
        let mut settings = PlaneSettings {
            noise_scale: *NOISE_SCALE_RANGE.end(),
            ripple: *RIPPLE_RANGE.start(),
            distortion: *DISTORTION_RANGE.end(),
        };

        assert!(!controls.handle_key(KeyCode::ArrowUp, &mut settings));
        assert_eq!(settings.noise_scale, *NOISE_SCALE_RANGE.end());

        controls.handle_key(KeyCode::Digit2, &mut settings);
        assert!(!controls.handle_key(KeyCode::ArrowDown, &mut settings));
        assert_eq!(settings.ripple, *RIPPLE_RANGE.start());
    }

    #[test]
    fn unmapped_keys_change_nothing() {
        let mut controls = DebugControls::new();
        let mut settings = PlaneSettings::default();
        assert!(!controls.handle_key(KeyCode::KeyQ, &mut settings));
        assert_eq!(settings, PlaneSettings::default());
    }
}
