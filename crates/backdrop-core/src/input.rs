//! Input aggregation: pointer and device orientation folded into one
//! continuously-overwritten record.
//!
//! The aggregator is the only writer of [`InputState`]; the frame update only
//! ever sees it through a shared reference.

use crate::camera::Viewport;
use crate::permission::{PermissionGate, PermissionRequirement};
use glam::Vec2;

/// Device orientation in degrees, as reported by the platform.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Orientation {
    pub alpha: f32,
    pub beta: f32,
    pub gamma: f32,
}

impl Orientation {
    /// All three angles or nothing: a sample with any missing or
    /// non-finite angle is rejected whole.
    pub fn from_event(alpha: Option<f64>, beta: Option<f64>, gamma: Option<f64>) -> Option<Self> {
        let finite = |v: Option<f64>| v.filter(|x| x.is_finite()).map(|x| x as f32);
        Some(Self {
            alpha: finite(alpha)?,
            beta: finite(beta)?,
            gamma: finite(gamma)?,
        })
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct InputState {
    /// Normalized device coordinates, both axes in [-1, 1], +Y up.
    pub pointer: Vec2,
    pub orientation: Orientation,
}

/// Map client-space pixels to normalized device coordinates with +Y up.
/// A zero-sized viewport maps everything to the center.
#[inline]
pub fn normalize_pointer(client_x: f32, client_y: f32, width: f32, height: f32) -> Vec2 {
    if width <= 0.0 || height <= 0.0 {
        return Vec2::ZERO;
    }
    let x = (client_x / width) * 2.0 - 1.0;
    let y = -(client_y / height) * 2.0 + 1.0;
    Vec2::new(x.clamp(-1.0, 1.0), y.clamp(-1.0, 1.0))
}

#[derive(Clone, Debug)]
pub struct InputAggregator {
    state: InputState,
    gate: PermissionGate,
}

impl InputAggregator {
    pub fn new(requirement: PermissionRequirement) -> Self {
        Self {
            state: InputState::default(),
            gate: PermissionGate::new(requirement),
        }
    }

    #[inline]
    pub fn state(&self) -> &InputState {
        &self.state
    }

    #[inline]
    pub fn gate(&self) -> &PermissionGate {
        &self.gate
    }

    #[inline]
    pub fn gate_mut(&mut self) -> &mut PermissionGate {
        &mut self.gate
    }

    pub fn on_pointer_move(&mut self, client_x: f32, client_y: f32, viewport: &Viewport) {
        self.state.pointer = normalize_pointer(client_x, client_y, viewport.width, viewport.height);
    }

    /// Returns whether the sample was applied. Samples arriving before the
    /// gate is granted, or with a null angle, are dropped.
    pub fn on_orientation(
        &mut self,
        alpha: Option<f64>,
        beta: Option<f64>,
        gamma: Option<f64>,
    ) -> bool {
        if !self.gate.is_granted() {
            return false;
        }
        match Orientation::from_event(alpha, beta, gamma) {
            Some(o) => {
                self.state.orientation = o;
                true
            }
            None => {
                log::debug!("[input] dropped orientation sample with a null angle");
                false
            }
        }
    }
}
