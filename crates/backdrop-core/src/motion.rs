//! Closed-form motion functions evaluated once per frame.
//!
//! Everything here except [`Parallax::step`] is a pure function of absolute
//! time, so a frame rendered at `t` is the same no matter how many frames
//! (if any) were skipped before it.

use crate::constants::*;
use crate::input::Orientation;
use glam::{Vec2, Vec3};
use serde::Deserialize;

/// Rotation that advances linearly with absolute time from a base pose.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Spin {
    pub base: Vec3,
    pub rates: Vec3, // radians per second around X, Y, Z
}

impl Spin {
    pub const fn new(rates: Vec3) -> Self {
        Self {
            base: Vec3::ZERO,
            rates,
        }
    }

    #[inline]
    pub fn rotation_at(&self, t: f32) -> Vec3 {
        self.base + self.rates * t
    }
}

/// Spring-like pull of a node's offset toward `pointer * multiplier`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Parallax {
    pub multiplier: f32,
    pub influence: f32,
    pub decay: f32,
}

impl Parallax {
    pub const fn new(multiplier: f32) -> Self {
        Self {
            multiplier,
            influence: PARALLAX_INFLUENCE,
            decay: PARALLAX_DECAY,
        }
    }

    /// One exponential-decay step on the XY plane:
    /// `offset += (pointer * multiplier - offset * decay) * influence`.
    /// Z is left untouched.
    #[inline]
    pub fn step(&self, offset: Vec3, pointer: Vec2) -> Vec3 {
        let target = pointer * self.multiplier;
        let xy = offset.truncate();
        let next = xy + (target - xy * self.decay) * self.influence;
        next.extend(offset.z)
    }

    /// Offset the step converges to for a pointer held still.
    #[inline]
    pub fn rest_offset(&self, pointer: Vec2) -> Vec2 {
        if self.decay <= 0.0 {
            return pointer * self.multiplier;
        }
        pointer * self.multiplier / self.decay
    }
}

/// Height field `sin(t·k1 + x·k2) · cos(t·k3 + y·k4) · amplitude`.
#[derive(Copy, Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct WaveParams {
    pub k1: f32,
    pub k2: f32,
    pub k3: f32,
    pub k4: f32,
    pub amplitude: f32,
}

impl Default for WaveParams {
    fn default() -> Self {
        Self {
            k1: FABRIC_K1,
            k2: FABRIC_K2,
            k3: FABRIC_K3,
            k4: FABRIC_K4,
            amplitude: FABRIC_AMPLITUDE,
        }
    }
}

impl WaveParams {
    #[inline]
    pub fn height(&self, x: f32, y: f32, t: f32) -> f32 {
        (t * self.k1 + x * self.k2).sin() * (t * self.k3 + y * self.k4).cos() * self.amplitude
    }

    /// Overwrite the Z of every position with the height at its (x, y).
    pub fn apply(&self, positions: &mut [[f32; 3]], t: f32) {
        for p in positions.iter_mut() {
            p[2] = self.height(p[0], p[1], t);
        }
    }
}

/// Camera rotation for a device orientation: pitch from `beta`, roll from
/// `gamma`, both scaled down so the effect stays subtle.
#[inline]
pub fn camera_tilt(orientation: &Orientation, scale: f32) -> Vec3 {
    Vec3::new(orientation.beta * scale, 0.0, orientation.gamma * scale)
}

/// `amplitude * sin(rate * t + phase)`
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Oscillator {
    pub amplitude: f32,
    pub rate: f32,
    pub phase: f32,
}

impl Oscillator {
    pub const fn sin(amplitude: f32, rate: f32) -> Self {
        Self {
            amplitude,
            rate,
            phase: 0.0,
        }
    }

    pub const fn cos(amplitude: f32, rate: f32) -> Self {
        Self {
            amplitude,
            rate,
            phase: std::f32::consts::FRAC_PI_2,
        }
    }

    #[inline]
    pub fn value(&self, t: f32) -> f32 {
        self.amplitude * (self.rate * t + self.phase).sin()
    }
}

/// Light path: each axis either holds its base coordinate or follows an
/// oscillator.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LightOrbit {
    pub base: Vec3,
    pub axes: [Option<Oscillator>; 3],
}

impl LightOrbit {
    pub fn position_at(&self, t: f32) -> Vec3 {
        let mut p = self.base;
        for (axis, osc) in self.axes.iter().enumerate() {
            if let Some(osc) = osc {
                p[axis] = osc.value(t);
            }
        }
        p
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spin_is_a_function_of_absolute_time() {
        let spin = Spin::new(Vec3::new(0.2, 0.3, 0.0));
        let direct = spin.rotation_at(42.5);
        // evaluating intermediate times first changes nothing
        for t in [1.0, 7.0, 30.0] {
            let _ = spin.rotation_at(t);
        }
        assert_eq!(spin.rotation_at(42.5), direct);
    }

    #[test]
    fn parallax_converges_to_rest_offset() {
        let p = Parallax::new(2.0);
        let pointer = Vec2::new(0.5, -0.25);
        let mut offset = Vec3::new(0.0, 0.0, 3.0);
        for _ in 0..10_000 {
            offset = p.step(offset, pointer);
        }
        let rest = p.rest_offset(pointer);
        assert!((offset.truncate() - rest).length() < 1e-2);
        assert_eq!(offset.z, 3.0);
    }

    #[test]
    fn parallax_moves_gradually() {
        let p = Parallax::new(1.0);
        let next = p.step(Vec3::ZERO, Vec2::new(1.0, 1.0));
        assert!((next.x - p.influence).abs() < 1e-6);
        assert!((next.y - p.influence).abs() < 1e-6);
    }

    #[test]
    fn wave_matches_formula() {
        let w = WaveParams::default();
        let (x, y, t) = (1.5, -2.0, 3.25);
        let expected = (t * 2.0 + x * 0.5_f32).sin() * (t * 1.5 + y * 0.3_f32).cos() * 2.0;
        assert!((w.height(x, y, t) - expected).abs() < 1e-6);
    }

    #[test]
    fn tilt_uses_beta_and_gamma_only() {
        let o = Orientation {
            alpha: 90.0,
            beta: 45.0,
            gamma: -30.0,
        };
        let r = camera_tilt(&o, 0.001);
        assert!((r.x - 0.045).abs() < 1e-6);
        assert_eq!(r.y, 0.0);
        assert!((r.z + 0.030).abs() < 1e-6);
    }

    #[test]
    fn orbit_keeps_base_on_fixed_axes() {
        let orbit = LightOrbit {
            base: Vec3::new(10.0, 10.0, 10.0),
            axes: [Some(Oscillator::sin(15.0, 0.5)), Some(Oscillator::cos(10.0, 0.3)), None],
        };
        let p = orbit.position_at(0.0);
        assert!(p.x.abs() < 1e-6);
        assert!((p.y - 10.0).abs() < 1e-5);
        assert_eq!(p.z, 10.0);
    }
}
