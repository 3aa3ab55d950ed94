//! Endless particle stream backed by a fixed-size buffer.
//!
//! Particles travel along +Z toward the camera at a per-particle constant
//! speed. Once one passes the far threshold it is respawned at a fresh random
//! point inside the near boundary. Nothing is allocated after construction.

use crate::constants::*;
use rand::rngs::StdRng;
use rand::Rng;
use serde::Deserialize;

#[derive(Copy, Clone, Debug, PartialEq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct StreamParams {
    pub count: usize,
    /// Half-extent of the spawn square across the travel axis.
    pub spread: f32,
    /// Spawn range along the travel axis, `[min, max]`.
    pub near_boundary: [f32; 2],
    pub far_threshold: f32,
    /// Per-particle speed range in units per frame.
    pub velocity: [f32; 2],
    pub size: f32,
}

impl Default for StreamParams {
    fn default() -> Self {
        Self {
            count: PARTICLE_COUNT,
            spread: PARTICLE_SPREAD,
            near_boundary: PARTICLE_NEAR_BOUNDARY,
            far_threshold: PARTICLE_FAR_THRESHOLD,
            velocity: PARTICLE_VELOCITY,
            size: PARTICLE_SIZE,
        }
    }
}

fn uniform(rng: &mut StdRng, range: [f32; 2]) -> f32 {
    let (lo, hi) = (range[0].min(range[1]), range[0].max(range[1]));
    if hi > lo {
        rng.gen_range(lo..hi)
    } else {
        lo
    }
}

#[derive(Clone, Debug)]
pub struct ParticleStream {
    params: StreamParams,
    positions: Vec<[f32; 3]>,
    velocities: Vec<f32>,
    rng: StdRng,
}

impl ParticleStream {
    /// Fill the buffer with particles spread over the whole travel range so
    /// the stream looks established from the first frame.
    pub fn new(params: StreamParams, mut rng: StdRng) -> Self {
        let mut positions = Vec::with_capacity(params.count);
        let mut velocities = Vec::with_capacity(params.count);
        let span = [params.near_boundary[0].min(params.near_boundary[1]), params.far_threshold];
        for _ in 0..params.count {
            let s = params.spread.abs();
            positions.push([
                uniform(&mut rng, [-s, s]),
                uniform(&mut rng, [-s, s]),
                uniform(&mut rng, span),
            ]);
            velocities.push(uniform(&mut rng, params.velocity));
        }
        Self {
            params,
            positions,
            velocities,
            rng,
        }
    }

    #[inline]
    pub fn params(&self) -> &StreamParams {
        &self.params
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    #[inline]
    pub fn positions(&self) -> &[[f32; 3]] {
        &self.positions
    }

    #[inline]
    pub fn velocity(&self, i: usize) -> Option<f32> {
        self.velocities.get(i).copied()
    }

    /// Move a single particle; out-of-range indices are ignored.
    pub fn set_position(&mut self, i: usize, p: [f32; 3]) {
        if let Some(slot) = self.positions.get_mut(i) {
            *slot = p;
        }
    }

    /// Advance every particle by its own velocity and recycle those past the
    /// far threshold. Returns how many were recycled this step.
    pub fn step(&mut self) -> usize {
        let mut recycled = 0;
        let s = self.params.spread.abs();
        for (p, v) in self.positions.iter_mut().zip(&self.velocities) {
            p[2] += v;
            if p[2] > self.params.far_threshold {
                *p = [
                    uniform(&mut self.rng, [-s, s]),
                    uniform(&mut self.rng, [-s, s]),
                    uniform(&mut self.rng, self.params.near_boundary),
                ];
                recycled += 1;
            }
        }
        recycled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn stream(count: usize) -> ParticleStream {
        let params = StreamParams {
            count,
            ..StreamParams::default()
        };
        ParticleStream::new(params, StdRng::seed_from_u64(3))
    }

    #[test]
    fn initial_particles_lie_in_travel_range() {
        let s = stream(64);
        for p in s.positions() {
            assert!(p[2] >= PARTICLE_NEAR_BOUNDARY[0] && p[2] <= PARTICLE_FAR_THRESHOLD);
            assert!(p[0].abs() <= PARTICLE_SPREAD && p[1].abs() <= PARTICLE_SPREAD);
        }
    }

    #[test]
    fn steady_state_never_grows_the_buffer() {
        let mut s = stream(32);
        let cap = s.positions.capacity();
        for _ in 0..5_000 {
            s.step();
        }
        assert_eq!(s.len(), 32);
        assert_eq!(s.positions.capacity(), cap);
    }

    #[test]
    fn particles_move_by_their_own_velocity() {
        let mut s = stream(4);
        s.set_position(2, [0.0, 0.0, -30.0]);
        let v = s.velocity(2).unwrap();
        s.step();
        assert!((s.positions()[2][2] - (-30.0 + v)).abs() < 1e-5);
    }

    #[test]
    fn particles_past_the_far_threshold_respawn_near() {
        let mut s = stream(2);
        s.set_position(0, [1.0, 1.0, PARTICLE_FAR_THRESHOLD - 0.001]);
        s.set_position(1, [2.0, -3.0, -30.0]);
        let other_v = s.velocity(1).unwrap();

        assert_eq!(s.step(), 1);
        let respawned = s.positions()[0];
        assert!(respawned[2] >= PARTICLE_NEAR_BOUNDARY[0] && respawned[2] <= PARTICLE_NEAR_BOUNDARY[1]);
        assert!(respawned[0].abs() <= PARTICLE_SPREAD && respawned[1].abs() <= PARTICLE_SPREAD);

        let other = s.positions()[1];
        assert_eq!([other[0], other[1]], [2.0, -3.0]);
        assert!((other[2] - (-30.0 + other_v)).abs() < 1e-5);
        assert_eq!(s.len(), 2);
    }
}
