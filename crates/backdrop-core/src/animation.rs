//! One frame of the animation loop, minus the draw.
//!
//! [`advance`] reads the clock value and the input record, writes transforms,
//! deformable positions, light positions and the camera tilt. It never
//! touches the input record.

use crate::camera::Camera;
use crate::input::InputState;
use crate::motion::camera_tilt;
use crate::scene::{Deform, NodeId, Scene, SceneNode};

/// Advance `scene` and `camera` to absolute time `t` (seconds).
///
/// Node ids whose vertex positions changed are appended to `dirty`; the
/// caller re-uploads those buffers before drawing.
pub fn advance(
    scene: &mut Scene,
    camera: &mut Camera,
    input: &InputState,
    t: f32,
    tilt_scale: f32,
    dirty: &mut Vec<NodeId>,
) {
    let Scene {
        root,
        lights,
        particles,
        stream_node,
    } = scene;

    root.visit_mut(&mut |node| animate_node(node, input, t, dirty));

    camera.rotation = camera_tilt(&input.orientation, tilt_scale);

    if let (Some(stream), Some(id)) = (particles.as_mut(), *stream_node) {
        stream.step();
        if let Some(mesh) = root.find_mut(id).and_then(|n| n.mesh.as_mut()) {
            if mesh.positions.len() == stream.len() {
                mesh.positions.copy_from_slice(stream.positions());
                dirty.push(id);
            }
        }
    }

    lights.update(t);
}

fn animate_node(node: &mut SceneNode, input: &InputState, t: f32, dirty: &mut Vec<NodeId>) {
    if let Some(spin) = node.spin {
        node.transform.rotation = spin.rotation_at(t);
    }

    if let Some(Deform::Wave(wave)) = node.deform {
        if let Some(mesh) = node.mesh.as_mut() {
            wave.apply(&mut mesh.positions, t);
            dirty.push(node.id);
        }
    }

    if let Some(parallax) = node.parallax {
        node.offset = parallax.step(node.offset, input.pointer);
        node.transform.position = node.anchor + node.offset;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BackdropConfig;
    use crate::geometry::registry::GeneratorRegistry;
    use glam::{Vec2, Vec3};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn setup() -> (Scene, Camera) {
        let mut config = BackdropConfig::default();
        config.segments = 6;
        config.particles.count = 8;
        let scene = Scene::build(
            &config,
            &GeneratorRegistry::with_defaults(),
            &mut StdRng::seed_from_u64(5),
        );
        (scene, config.camera.camera())
    }

    fn named<'a>(scene: &'a Scene, name: &str) -> &'a SceneNode {
        scene.root.children.iter().find(|n| n.name == name).unwrap()
    }

    #[test]
    fn rotation_depends_only_on_absolute_time() {
        let (mut a, mut cam_a) = setup();
        let (mut b, mut cam_b) = setup();
        let input = InputState::default();
        let mut dirty = Vec::new();

        advance(&mut a, &mut cam_a, &input, 12.0, 0.001, &mut dirty);
        // b runs a few frames, pauses, and resumes at the same absolute time
        for t in [0.5, 1.0, 1.5] {
            advance(&mut b, &mut cam_b, &input, t, 0.001, &mut dirty);
        }
        advance(&mut b, &mut cam_b, &input, 12.0, 0.001, &mut dirty);

        for name in ["deformed-sphere", "tesseract", "twisted-annulus"] {
            assert_eq!(named(&a, name).transform.rotation, named(&b, name).transform.rotation);
        }
    }

    #[test]
    fn fabric_positions_follow_the_wave() {
        let (mut scene, mut cam) = setup();
        let mut dirty = Vec::new();
        advance(&mut scene, &mut cam, &InputState::default(), 2.0, 0.001, &mut dirty);
        let fabric = named(&scene, "fabric");
        assert!(dirty.contains(&fabric.id));
        let Some(Deform::Wave(wave)) = fabric.deform else {
            panic!("fabric lost its deform tag");
        };
        for p in &fabric.mesh.as_ref().unwrap().positions {
            assert!((p[2] - wave.height(p[0], p[1], 2.0)).abs() < 1e-6);
        }
    }

    #[test]
    fn parallax_moves_relative_to_anchor() {
        let (mut scene, mut cam) = setup();
        let anchor = named(&scene, "deformed-sphere").anchor;
        let input = InputState {
            pointer: Vec2::new(1.0, 0.0),
            ..InputState::default()
        };
        let mut dirty = Vec::new();
        advance(&mut scene, &mut cam, &input, 0.0, 0.001, &mut dirty);
        let sphere = named(&scene, "deformed-sphere");
        assert!(sphere.transform.position.x > anchor.x);
        assert_eq!(sphere.transform.position.z, anchor.z);
    }

    #[test]
    fn camera_tilts_with_orientation() {
        let (mut scene, mut cam) = setup();
        let mut input = InputState::default();
        input.orientation.beta = 30.0;
        input.orientation.gamma = -10.0;
        advance(&mut scene, &mut cam, &input, 0.0, 0.001, &mut Vec::new());
        assert!((cam.rotation - Vec3::new(0.03, 0.0, -0.01)).length() < 1e-6);
    }

    #[test]
    fn stream_node_mirrors_particles() {
        let (mut scene, mut cam) = setup();
        let mut dirty = Vec::new();
        advance(&mut scene, &mut cam, &InputState::default(), 0.0, 0.001, &mut dirty);
        let id = scene.stream_node.unwrap();
        assert!(dirty.contains(&id));
        let node = scene.find(id).unwrap();
        assert_eq!(
            node.mesh.as_ref().unwrap().positions.as_slice(),
            scene.particles.as_ref().unwrap().positions()
        );
    }
}
