//! Per-mount configuration.
//!
//! Every field has a default from `constants.rs`, so an empty object (or no
//! object at all) yields the stock backdrop. Keys are kebab-case.

use crate::camera::Camera;
use crate::constants::*;
use crate::error::BackdropError;
use crate::geometry::registry::{GeneratorRegistry, DEFAULT_GENERATORS};
use crate::motion::WaveParams;
use crate::particles::StreamParams;
use glam::Vec3;
use serde::Deserialize;

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CameraConfig {
    pub fov_deg: f32,
    pub near: f32,
    pub far: f32,
    pub distance: f32,
    /// Radians of camera tilt per degree of device tilt.
    pub tilt_scale: f32,
}

impl CameraConfig {
    pub fn camera(&self) -> Camera {
        Camera {
            fov_y_deg: self.fov_deg,
            near: self.near,
            far: self.far,
            position: Vec3::new(0.0, 0.0, self.distance),
            ..Camera::default()
        }
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_deg: CAMERA_FOV_DEG,
            near: CAMERA_NEAR,
            far: CAMERA_FAR,
            distance: CAMERA_Z,
            tilt_scale: ORIENTATION_TILT_SCALE,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct PlacementConfig {
    pub min: [f32; 3],
    pub max: [f32; 3],
    pub min_distance: f32,
    pub max_retries: u32,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            min: PLACEMENT_MIN,
            max: PLACEMENT_MAX,
            min_distance: PLACEMENT_MIN_DISTANCE,
            max_retries: PLACEMENT_MAX_RETRIES,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ParallaxConfig {
    pub influence: f32,
    pub decay: f32,
}

impl Default for ParallaxConfig {
    fn default() -> Self {
        Self {
            influence: PARALLAX_INFLUENCE,
            decay: PARALLAX_DECAY,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct BackdropConfig {
    /// Generators to mount, in draw order.
    pub generators: Vec<String>,
    pub segments: u32,
    pub camera: CameraConfig,
    pub placement: PlacementConfig,
    pub parallax: ParallaxConfig,
    pub particles: StreamParams,
    pub fabric: WaveParams,
    /// Fixed seed for placement and particles; entropy when absent.
    pub seed: Option<u64>,
}

impl Default for BackdropConfig {
    fn default() -> Self {
        Self {
            generators: DEFAULT_GENERATORS.iter().map(|s| s.to_string()).collect(),
            segments: SURFACE_SEGMENTS,
            camera: CameraConfig::default(),
            placement: PlacementConfig::default(),
            parallax: ParallaxConfig::default(),
            particles: StreamParams::default(),
            fabric: WaveParams::default(),
            seed: None,
        }
    }
}

fn finite_or(value: f32, fallback: f32) -> f32 {
    if value.is_finite() {
        value
    } else {
        fallback
    }
}

impl BackdropConfig {
    /// Clamp degenerate values and drop generator names `registry` does not
    /// know. Each correction is returned so the caller can log it; none of
    /// them is fatal.
    pub fn sanitize(&mut self, registry: &GeneratorRegistry) -> Vec<BackdropError> {
        let mut notes = Vec::new();

        self.generators.retain(|name| {
            let known = registry.contains(name);
            if !known {
                notes.push(BackdropError::UnknownGenerator(name.clone()));
            }
            known
        });

        if self.segments == 0 {
            notes.push(BackdropError::Config("segments must be at least 1".into()));
            self.segments = 1;
        }
        if self.segments > MAX_SURFACE_SEGMENTS {
            notes.push(BackdropError::Config(format!(
                "segments {} capped at {MAX_SURFACE_SEGMENTS}",
                self.segments
            )));
            self.segments = MAX_SURFACE_SEGMENTS;
        }

        let cam = &mut self.camera;
        let defaults = CameraConfig::default();
        cam.fov_deg = finite_or(cam.fov_deg, defaults.fov_deg);
        if !(1.0..=179.0).contains(&cam.fov_deg) {
            notes.push(BackdropError::Config(format!("fov {} out of range", cam.fov_deg)));
            cam.fov_deg = cam.fov_deg.clamp(1.0, 179.0);
        }
        cam.near = finite_or(cam.near, defaults.near);
        cam.far = finite_or(cam.far, defaults.far);
        if cam.near <= 0.0 || cam.near >= cam.far {
            notes.push(BackdropError::Config(format!(
                "clip planes near={} far={} reset to defaults",
                cam.near, cam.far
            )));
            cam.near = defaults.near;
            cam.far = defaults.far;
        }
        cam.distance = finite_or(cam.distance, defaults.distance);
        cam.tilt_scale = finite_or(cam.tilt_scale, defaults.tilt_scale);

        let placement = &mut self.placement;
        if placement.min_distance.is_nan() || placement.min_distance < 0.0 {
            notes.push(BackdropError::Config("negative placement distance".into()));
            placement.min_distance = 0.0;
        }
        if placement.max_retries == 0 {
            notes.push(BackdropError::Config("placement needs at least one try".into()));
            placement.max_retries = 1;
        }

        let parallax = &mut self.parallax;
        parallax.influence = finite_or(parallax.influence, PARALLAX_INFLUENCE).clamp(0.0, 1.0);
        parallax.decay = finite_or(parallax.decay, PARALLAX_DECAY).max(0.0);

        let stream = &mut self.particles;
        let spawn_edge = stream.near_boundary[0].max(stream.near_boundary[1]);
        if stream.far_threshold.is_nan() || stream.far_threshold <= spawn_edge {
            notes.push(BackdropError::Config(
                "particle far threshold must lie beyond the near boundary".into(),
            ));
            stream.near_boundary = PARTICLE_NEAR_BOUNDARY;
            stream.far_threshold = PARTICLE_FAR_THRESHOLD;
        }
        if stream.velocity.iter().any(|v| v.is_nan() || *v <= 0.0) {
            notes.push(BackdropError::Config("particle velocity must be positive".into()));
            stream.velocity = PARTICLE_VELOCITY;
        }
        stream.spread = finite_or(stream.spread, PARTICLE_SPREAD).abs();
        if stream.count > MAX_PARTICLES {
            notes.push(BackdropError::Config(format!(
                "particle count {} capped at {MAX_PARTICLES}",
                stream.count
            )));
            stream.count = MAX_PARTICLES;
        }

        notes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_gives_defaults() {
        let cfg: BackdropConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg, BackdropConfig::default());
    }

    #[test]
    fn kebab_case_keys_override_fields() {
        let cfg: BackdropConfig = serde_json::from_str(
            r#"{
                "generators": ["funnel"],
                "camera": { "fov-deg": 60.0, "tilt-scale": 0.002 },
                "placement": { "min-distance": 3.0 },
                "particles": { "count": 12, "far-threshold": 4.0 },
                "seed": 9
            }"#,
        )
        .unwrap();
        assert_eq!(cfg.generators, vec!["funnel".to_string()]);
        assert_eq!(cfg.camera.fov_deg, 60.0);
        assert_eq!(cfg.camera.near, CAMERA_NEAR);
        assert_eq!(cfg.camera.tilt_scale, 0.002);
        assert_eq!(cfg.placement.min_distance, 3.0);
        assert_eq!(cfg.particles.count, 12);
        assert_eq!(cfg.particles.far_threshold, 4.0);
        assert_eq!(cfg.seed, Some(9));
    }

    #[test]
    fn sanitize_drops_unknown_generators() {
        let registry = GeneratorRegistry::with_defaults();
        let mut cfg = BackdropConfig {
            generators: vec!["fabric".into(), "hyperboloid".into()],
            ..BackdropConfig::default()
        };
        let notes = cfg.sanitize(&registry);
        assert_eq!(cfg.generators, vec!["fabric".to_string()]);
        assert_eq!(notes, vec![BackdropError::UnknownGenerator("hyperboloid".into())]);
    }

    #[test]
    fn sanitize_repairs_degenerate_values() {
        let registry = GeneratorRegistry::with_defaults();
        let mut cfg = BackdropConfig::default();
        cfg.segments = 0;
        cfg.camera.near = 10.0;
        cfg.camera.far = 1.0;
        cfg.placement.min_distance = -2.0;
        cfg.particles.velocity = [0.0, 0.1];
        let notes = cfg.sanitize(&registry);
        assert_eq!(notes.len(), 4);
        assert_eq!(cfg.segments, 1);
        assert!(cfg.camera.near < cfg.camera.far);
        assert_eq!(cfg.placement.min_distance, 0.0);
        assert_eq!(cfg.particles.velocity, PARTICLE_VELOCITY);
    }

    #[test]
    fn sanitize_caps_oversized_counts() {
        let registry = GeneratorRegistry::with_defaults();
        let mut cfg: BackdropConfig =
            serde_json::from_str(r#"{ "segments": 70000, "particles": { "count": 10000000 } }"#)
                .unwrap();
        let notes = cfg.sanitize(&registry);
        assert_eq!(notes.len(), 2);
        assert!(notes.iter().all(|n| matches!(n, BackdropError::Config(_))));
        assert_eq!(cfg.segments, MAX_SURFACE_SEGMENTS);
        assert_eq!(cfg.particles.count, MAX_PARTICLES);
    }

    #[test]
    fn default_config_is_already_clean() {
        let mut cfg = BackdropConfig::default();
        assert!(cfg.sanitize(&GeneratorRegistry::with_defaults()).is_empty());
    }
}
