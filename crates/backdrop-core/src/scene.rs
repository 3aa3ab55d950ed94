//! Tree-owned scene graph.
//!
//! Every node is owned by exactly one parent (or by the root group). After
//! bootstrap only transform fields and tagged deformable positions change;
//! the tree's shape is fixed for the life of the mount.

use crate::config::BackdropConfig;
use crate::constants::*;
use crate::geometry::registry::{Anchor, GeneratorParams, GeneratorRegistry};
use crate::geometry::{primitives, Mesh, Topology};
use crate::motion::{LightOrbit, Oscillator, Parallax, Spin, WaveParams};
use crate::particles::ParticleStream;
use crate::placement::{Bounds, PlacementRegistry};
use glam::{EulerRot, Mat4, Quat, Vec3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use smallvec::SmallVec;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    /// XYZ Euler angles in radians.
    pub rotation: Vec3,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    pub fn matrix(&self) -> Mat4 {
        let rotation = Quat::from_euler(
            EulerRot::XYZ,
            self.rotation.x,
            self.rotation.y,
            self.rotation.z,
        );
        Mat4::from_scale_rotation_translation(self.scale, rotation, self.position)
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum MaterialKind {
    /// Lit, filled triangles.
    Surface,
    /// Triangle edges (or native line lists) drawn as lines.
    Wireframe,
    /// One camera-facing square per vertex, `size` world units across.
    Points { size: f32 },
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Material {
    pub kind: MaterialKind,
    pub color: [f32; 3],
    pub opacity: f32,
    pub emissive: f32,
}

impl Material {
    pub const fn wireframe(color: [f32; 3], opacity: f32) -> Self {
        Self {
            kind: MaterialKind::Wireframe,
            color,
            opacity,
            emissive: 0.0,
        }
    }

    pub const fn glow(color: [f32; 3], opacity: f32, emissive: f32) -> Self {
        Self {
            kind: MaterialKind::Surface,
            color,
            opacity,
            emissive,
        }
    }

    pub const fn points(color: [f32; 3], opacity: f32, size: f32) -> Self {
        Self {
            kind: MaterialKind::Points { size },
            color,
            opacity,
            emissive: 0.0,
        }
    }
}

/// Per-frame rewrite of a node's vertex positions.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Deform {
    /// Local Z becomes the wave height at (x, y, t).
    Wave(WaveParams),
    /// Positions mirror the scene's particle stream.
    Stream,
}

#[derive(Clone, Debug)]
pub struct SceneNode {
    pub id: NodeId,
    pub name: &'static str,
    pub mesh: Option<Mesh>,
    pub material: Material,
    pub transform: Transform,
    /// Rest position chosen at bootstrap.
    pub anchor: Vec3,
    /// Parallax displacement from `anchor`, advanced every frame.
    pub offset: Vec3,
    pub spin: Option<Spin>,
    pub parallax: Option<Parallax>,
    pub deform: Option<Deform>,
    pub children: Vec<SceneNode>,
}

impl SceneNode {
    pub fn new(name: &'static str, mesh: Mesh, material: Material) -> Self {
        Self {
            mesh: Some(mesh),
            material,
            ..Self::group(name)
        }
    }

    /// Transform-only node without geometry of its own.
    pub fn group(name: &'static str) -> Self {
        Self {
            id: NodeId(0),
            name,
            mesh: None,
            material: Material::wireframe(INDIGO, 1.0),
            transform: Transform::default(),
            anchor: Vec3::ZERO,
            offset: Vec3::ZERO,
            spin: None,
            parallax: None,
            deform: None,
            children: Vec::new(),
        }
    }

    pub fn with_child(mut self, child: SceneNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_spin(mut self, rates: Vec3) -> Self {
        self.spin = Some(Spin::new(rates));
        self
    }

    pub fn with_parallax(mut self, multiplier: f32) -> Self {
        self.parallax = Some(Parallax::new(multiplier));
        self
    }

    pub fn with_deform(mut self, deform: Deform) -> Self {
        self.deform = Some(deform);
        self
    }

    pub fn with_scale(mut self, scale: f32) -> Self {
        self.transform.scale = Vec3::splat(scale);
        self
    }

    pub fn with_rotation(mut self, rotation: Vec3) -> Self {
        self.transform.rotation = rotation;
        if let Some(spin) = self.spin.as_mut() {
            spin.base = rotation;
        }
        self
    }

    /// Pin the node to `position` and make it the parallax rest point.
    pub fn place_at(&mut self, position: Vec3) {
        self.anchor = position;
        self.offset = Vec3::ZERO;
        self.transform.position = position;
    }

    /// Depth-first, parent before children.
    pub fn visit<F: FnMut(&SceneNode)>(&self, f: &mut F) {
        f(self);
        for child in &self.children {
            child.visit(f);
        }
    }

    pub fn visit_mut<F: FnMut(&mut SceneNode)>(&mut self, f: &mut F) {
        f(self);
        for child in &mut self.children {
            child.visit_mut(f);
        }
    }

    pub fn find(&self, id: NodeId) -> Option<&SceneNode> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(id))
    }

    pub fn find_mut(&mut self, id: NodeId) -> Option<&mut SceneNode> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter_mut().find_map(|c| c.find_mut(id))
    }

    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(SceneNode::node_count).sum::<usize>()
    }

    fn collect(&self, parent: Mat4, out: &mut Vec<DrawItem>) {
        let world = parent * self.transform.matrix();
        if let Some(mesh) = &self.mesh {
            if !mesh.positions.is_empty() {
                out.push(DrawItem {
                    node: self.id,
                    world,
                    material: self.material,
                    topology: mesh.topology,
                });
            }
        }
        for child in &self.children {
            child.collect(world, out);
        }
    }
}

/// One drawable node flattened out of the tree for the current frame.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DrawItem {
    pub node: NodeId,
    pub world: Mat4,
    pub material: Material,
    pub topology: Topology,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct AmbientLight {
    pub color: [f32; 3],
    pub intensity: f32,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PointLight {
    pub color: [f32; 3],
    pub intensity: f32,
    /// Distance at which the contribution reaches zero.
    pub range: f32,
    pub position: Vec3,
    pub orbit: LightOrbit,
}

impl PointLight {
    pub fn new(color: [f32; 3], intensity: f32, range: f32, orbit: LightOrbit) -> Self {
        Self {
            color,
            intensity,
            range,
            position: orbit.base,
            orbit,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct LightRig {
    pub ambient: AmbientLight,
    pub points: SmallVec<[PointLight; 2]>,
}

impl Default for LightRig {
    /// Dim blue ambient plus an indigo and an amber light, each drifting on
    /// its own closed-form orbit.
    fn default() -> Self {
        let indigo = PointLight::new(
            INDIGO,
            1.0,
            100.0,
            LightOrbit {
                base: Vec3::new(10.0, 10.0, 10.0),
                axes: [
                    Some(Oscillator::sin(15.0, 0.5)),
                    Some(Oscillator::cos(10.0, 0.3)),
                    None,
                ],
            },
        );
        let amber = PointLight::new(
            AMBER,
            0.8,
            100.0,
            LightOrbit {
                base: Vec3::new(-10.0, -10.0, 5.0),
                axes: [
                    Some(Oscillator::cos(-12.0, 0.4)),
                    None,
                    Some(Oscillator::sin(8.0, 0.6)),
                ],
            },
        );
        Self {
            ambient: AmbientLight {
                color: AMBIENT_BLUE,
                intensity: 0.3,
            },
            points: SmallVec::from_buf([indigo, amber]),
        }
    }
}

impl LightRig {
    pub fn update(&mut self, t: f32) {
        for light in &mut self.points {
            light.position = light.orbit.position_at(t);
        }
    }
}

#[derive(Clone, Debug)]
pub struct Scene {
    pub root: SceneNode,
    pub lights: LightRig,
    pub particles: Option<ParticleStream>,
    /// Node whose positions mirror `particles`.
    pub stream_node: Option<NodeId>,
}

impl Scene {
    /// Populate the graph from the configured generator list. Names the
    /// registry does not know are skipped with a warning.
    pub fn build(config: &BackdropConfig, registry: &GeneratorRegistry, rng: &mut StdRng) -> Self {
        let params = GeneratorParams {
            segments: config.segments,
            wave: config.fabric,
        };
        let bounds = Bounds {
            min: Vec3::from(config.placement.min),
            max: Vec3::from(config.placement.max),
        };
        let mut placements = PlacementRegistry::new(
            bounds,
            config.placement.min_distance,
            config.placement.max_retries,
        );

        let mut generated = Vec::with_capacity(config.generators.len());
        for name in &config.generators {
            match registry.generate(name, &params) {
                Ok(g) => generated.push(g),
                Err(e) => log::warn!("[mount] {e}; skipping"),
            }
        }
        // fixed anchors first so sampled ones steer clear of them
        for g in &generated {
            if let Anchor::Fixed(p) = g.anchor {
                placements.reserve(p);
            }
        }

        let mut root = SceneNode::group("root");
        for mut g in generated {
            let center = match g.anchor {
                Anchor::Fixed(p) => p,
                Anchor::Sampled => placements.place(rng).center,
            };
            g.node.place_at(center);
            g.node.visit_mut(&mut |n| {
                if let Some(p) = n.parallax.as_mut() {
                    p.influence = config.parallax.influence;
                    p.decay = config.parallax.decay;
                }
            });
            root.children.push(g.node);
        }
        drop(placements);

        let mut particles = None;
        if config.particles.count > 0 {
            let stream = ParticleStream::new(config.particles, StdRng::seed_from_u64(rng.gen()));
            let cloud = primitives::point_cloud(stream.positions());
            let material = Material::points(INDIGO, 0.6, config.particles.size);
            root.children
                .push(SceneNode::new("particles", cloud, material).with_deform(Deform::Stream));
            particles = Some(stream);
        }

        let mut stream_node = None;
        let mut next = 0u32;
        root.visit_mut(&mut |node| {
            node.id = NodeId(next);
            next += 1;
            if node.deform == Some(Deform::Stream) {
                stream_node = Some(node.id);
            }
        });

        Self {
            root,
            lights: LightRig::default(),
            particles,
            stream_node,
        }
    }

    pub fn find(&self, id: NodeId) -> Option<&SceneNode> {
        self.root.find(id)
    }

    /// Flatten the tree into `out` (cleared first) with world matrices
    /// composed parent-first.
    pub fn collect_draws(&self, out: &mut Vec<DrawItem>) {
        out.clear();
        self.root.collect(Mat4::IDENTITY, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scene() -> Scene {
        let registry = GeneratorRegistry::with_defaults();
        let mut config = BackdropConfig::default();
        config.segments = 8;
        config.particles.count = 16;
        let mut rng = StdRng::seed_from_u64(11);
        Scene::build(&config, &registry, &mut rng)
    }

    #[test]
    fn ids_are_unique_and_dense() {
        let s = scene();
        let mut ids = Vec::new();
        s.root.visit(&mut |n| ids.push(n.id.0));
        let count = ids.len();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), count);
        assert_eq!(*ids.last().unwrap() as usize, count - 1);
    }

    #[test]
    fn default_scene_has_tesseract_children_and_particles() {
        let s = scene();
        let tesseract = s.root.children.iter().find(|n| n.name == "tesseract").unwrap();
        assert!(tesseract.mesh.is_none());
        assert_eq!(tesseract.children.len(), 3);
        let stream = s.find(s.stream_node.unwrap()).unwrap();
        assert_eq!(stream.mesh.as_ref().unwrap().vertex_count(), 16);
    }

    #[test]
    fn child_world_matrix_composes_parent() {
        let mut parent = SceneNode::group("p");
        parent.transform.position = Vec3::new(1.0, 2.0, 3.0);
        let child = SceneNode::new("c", primitives::cube(1.0), Material::wireframe(INDIGO, 1.0));
        let parent = parent.with_child(child);
        let mut out = Vec::new();
        parent.collect(Mat4::IDENTITY, &mut out);
        assert_eq!(out.len(), 1);
        let origin = out[0].world.transform_point3(Vec3::ZERO);
        assert!((origin - Vec3::new(1.0, 2.0, 3.0)).length() < 1e-6);
    }

    #[test]
    fn unknown_generator_is_skipped() {
        let registry = GeneratorRegistry::with_defaults();
        let mut config = BackdropConfig::default();
        config.generators = vec!["fabric".into(), "no-such-thing".into()];
        config.particles.count = 0;
        let s = Scene::build(&config, &registry, &mut StdRng::seed_from_u64(0));
        assert_eq!(s.root.children.len(), 1);
        assert!(s.particles.is_none());
    }
}
