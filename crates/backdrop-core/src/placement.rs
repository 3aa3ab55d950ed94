//! Bootstrap-time placement of generated objects by rejection sampling.
//!
//! A [`PlacementRegistry`] lives only for the duration of `Scene::build`; it
//! is dropped as soon as the graph is populated.

use crate::constants::*;
use glam::Vec3;
use rand::Rng;
use smallvec::SmallVec;

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Bounds {
    pub min: Vec3,
    pub max: Vec3,
}

impl Default for Bounds {
    fn default() -> Self {
        Self {
            min: Vec3::from(PLACEMENT_MIN),
            max: Vec3::from(PLACEMENT_MAX),
        }
    }
}

impl Bounds {
    /// Swap inverted axes so `min <= max` holds component-wise.
    pub fn normalized(self) -> Self {
        Self {
            min: self.min.min(self.max),
            max: self.min.max(self.max),
        }
    }

    pub fn contains(&self, p: Vec3) -> bool {
        p.cmpge(self.min).all() && p.cmple(self.max).all()
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec3 {
        let axis = |rng: &mut R, lo: f32, hi: f32| {
            if hi > lo {
                rng.gen_range(lo..=hi)
            } else {
                lo
            }
        };
        Vec3::new(
            axis(rng, self.min.x, self.max.x),
            axis(rng, self.min.y, self.max.y),
            axis(rng, self.min.z, self.max.z),
        )
    }
}

/// Outcome of one placement request.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Placement {
    pub center: Vec3,
    /// Candidates drawn, including the accepted one. Never exceeds the
    /// registry's retry budget.
    pub attempts: u32,
    /// `false` when the budget ran out and the last candidate was taken
    /// regardless of overlap.
    pub constrained: bool,
}

#[derive(Clone, Debug)]
pub struct PlacementRegistry {
    bounds: Bounds,
    min_distance: f32,
    max_retries: u32,
    centers: SmallVec<[Vec3; 8]>,
}

impl Default for PlacementRegistry {
    fn default() -> Self {
        Self::new(Bounds::default(), PLACEMENT_MIN_DISTANCE, PLACEMENT_MAX_RETRIES)
    }
}

impl PlacementRegistry {
    pub fn new(bounds: Bounds, min_distance: f32, max_retries: u32) -> Self {
        Self {
            bounds: bounds.normalized(),
            min_distance: min_distance.max(0.0),
            max_retries: max_retries.max(1),
            centers: SmallVec::new(),
        }
    }

    #[inline]
    pub fn centers(&self) -> &[Vec3] {
        &self.centers
    }

    #[inline]
    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    #[inline]
    pub fn min_distance(&self) -> f32 {
        self.min_distance
    }

    /// True when `p` keeps at least the minimum distance to every center
    /// placed so far.
    pub fn is_clear(&self, p: Vec3) -> bool {
        let min_sq = self.min_distance * self.min_distance;
        self.centers.iter().all(|c| c.distance_squared(p) >= min_sq)
    }

    /// Draw candidates until one clears every previous center, or the retry
    /// budget is spent. In the latter case the last candidate is accepted.
    pub fn place<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Placement {
        let mut attempts = 0;
        let mut candidate = self.bounds.sample(rng);
        loop {
            attempts += 1;
            if self.is_clear(candidate) {
                self.centers.push(candidate);
                return Placement {
                    center: candidate,
                    attempts,
                    constrained: true,
                };
            }
            if attempts >= self.max_retries {
                break;
            }
            candidate = self.bounds.sample(rng);
        }
        log::debug!(
            "[placement] retry budget of {} spent, accepting overlap at {:?}",
            self.max_retries,
            candidate
        );
        self.centers.push(candidate);
        Placement {
            center: candidate,
            attempts,
            constrained: false,
        }
    }

    /// Record a center chosen elsewhere so later samples avoid it.
    pub fn reserve(&mut self, center: Vec3) {
        self.centers.push(center);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn samples_stay_inside_bounds() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut reg = PlacementRegistry::default();
        for _ in 0..20 {
            let p = reg.place(&mut rng);
            assert!(Bounds::default().contains(p.center));
        }
    }

    #[test]
    fn impossible_constraint_falls_back_within_budget() {
        let bounds = Bounds {
            min: Vec3::ZERO,
            max: Vec3::splat(0.1),
        };
        let mut rng = StdRng::seed_from_u64(1);
        let mut reg = PlacementRegistry::new(bounds, 10.0, 5);
        assert!(reg.place(&mut rng).constrained);
        let second = reg.place(&mut rng);
        assert!(!second.constrained);
        assert_eq!(second.attempts, 5);
    }

    #[test]
    fn inverted_bounds_are_normalized() {
        let b = Bounds {
            min: Vec3::splat(1.0),
            max: Vec3::splat(-1.0),
        }
        .normalized();
        assert_eq!(b.min, Vec3::splat(-1.0));
        assert_eq!(b.max, Vec3::splat(1.0));
    }
}
