use backdrop_core::placement::{Bounds, PlacementRegistry};
use glam::Vec3;
use rand::rngs::StdRng;
use rand::SeedableRng;

#[test]
fn each_placement_is_clear_or_budget_exhausted() {
    for seed in 0..20 {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut reg = PlacementRegistry::new(Bounds::default(), 6.0, 16);
        for _ in 0..12 {
            let before: Vec<Vec3> = reg.centers().to_vec();
            let p = reg.place(&mut rng);
            assert!(p.attempts <= reg.max_retries());
            let clear = before.iter().all(|c| c.distance(p.center) >= 6.0);
            if p.constrained {
                assert!(clear);
            } else {
                assert_eq!(p.attempts, reg.max_retries());
            }
        }
    }
}

#[test]
fn roomy_region_never_needs_fallback() {
    let bounds = Bounds {
        min: Vec3::splat(-100.0),
        max: Vec3::splat(100.0),
    };
    let mut rng = StdRng::seed_from_u64(99);
    let mut reg = PlacementRegistry::new(bounds, 1.0, 32);
    for _ in 0..4 {
        assert!(reg.place(&mut rng).constrained);
    }
}
