//! Named geometry generators selected by configuration.
//!
//! A generator is a plain `fn` from [`GeneratorParams`] to a ready-to-place
//! [`SceneNode`] subtree. Generators never see the render loop, the input
//! state or the clock, so each one can be exercised on its own.

use super::primitives::{cube, radial_spokes};
use super::surfaces::{concentric_shells, engrave, fabric_plane};
use super::surfaces::{DeformedSphere, Funnel, ShellParams, TwistedAnnulus};
use crate::constants::*;
use crate::error::{BackdropError, Result};
use crate::motion::WaveParams;
use crate::scene::{Deform, Material, SceneNode};
use fnv::FnvHashMap;
use glam::Vec3;
use std::f32::consts::FRAC_PI_4;

/// Names mounted when the configuration does not list any.
pub const DEFAULT_GENERATORS: [&str; 4] = ["deformed-sphere", "tesseract", "twisted-annulus", "fabric"];

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct GeneratorParams {
    /// Grid resolution per parametric axis.
    pub segments: u32,
    pub wave: WaveParams,
}

impl Default for GeneratorParams {
    fn default() -> Self {
        Self {
            segments: SURFACE_SEGMENTS,
            wave: WaveParams::default(),
        }
    }
}

/// Where the bootstrapper should put a generated node.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Anchor {
    /// Drawn from the placement region by rejection sampling.
    Sampled,
    /// Always at this position; sampled anchors keep their distance from it.
    Fixed(Vec3),
}

#[derive(Clone, Debug)]
pub struct Generated {
    pub node: SceneNode,
    pub anchor: Anchor,
}

pub type GeneratorFn = fn(&GeneratorParams) -> Generated;

#[derive(Clone, Debug, Default)]
pub struct GeneratorRegistry {
    entries: FnvHashMap<String, GeneratorFn>,
}

impl GeneratorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The four default generators plus the optional extras
    /// (`engraved-annulus`, `shells`, `funnel`).
    pub fn with_defaults() -> Self {
        let mut r = Self::new();
        r.register("deformed-sphere", deformed_sphere);
        r.register("tesseract", tesseract);
        r.register("twisted-annulus", twisted_annulus);
        r.register("fabric", fabric);
        r.register("engraved-annulus", engraved_annulus);
        r.register("shells", shells);
        r.register("funnel", funnel);
        r
    }

    /// Returns the generator previously registered under `name`, if any.
    pub fn register(&mut self, name: &str, generator: GeneratorFn) -> Option<GeneratorFn> {
        self.entries.insert(name.to_owned(), generator)
    }

    #[inline]
    pub fn get(&self, name: &str) -> Option<GeneratorFn> {
        self.entries.get(name).copied()
    }

    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn generate(&self, name: &str, params: &GeneratorParams) -> Result<Generated> {
        let generator = self
            .get(name)
            .ok_or_else(|| BackdropError::UnknownGenerator(name.to_owned()))?;
        Ok(generator(params))
    }
}

fn sampled(node: SceneNode) -> Generated {
    Generated {
        node,
        anchor: Anchor::Sampled,
    }
}

const WIRE: Material = Material::wireframe(INDIGO, 0.3);

pub fn deformed_sphere(params: &GeneratorParams) -> Generated {
    let mesh = DeformedSphere::default().build(params.segments);
    sampled(
        SceneNode::new("deformed-sphere", mesh, WIRE)
            .with_spin(Vec3::new(0.2, 0.3, 0.0))
            .with_parallax(2.0),
    )
}

/// Inner wire cube, outer glowing cube and a ring of spokes between them,
/// all turning together as one group.
pub fn tesseract(_params: &GeneratorParams) -> Generated {
    let group = SceneNode::group("tesseract")
        .with_child(SceneNode::new("tesseract-inner", cube(2.0), WIRE))
        .with_child(SceneNode::new(
            "tesseract-outer",
            cube(3.0),
            Material::glow(AMBER, 0.2, 0.1),
        ))
        .with_child(SceneNode::new(
            "tesseract-spokes",
            radial_spokes(8, 1.5, 2.5),
            Material::wireframe(INDIGO, 0.6),
        ))
        .with_spin(Vec3::new(0.15, 0.25, 0.1))
        .with_parallax(-1.5);
    sampled(group)
}

fn annulus_mesh(params: &GeneratorParams) -> super::Mesh {
    // the sweep needs more samples than the cross-section
    let tube = (params.segments / 4).max(4);
    TwistedAnnulus::default().build(params.segments, tube)
}

pub fn twisted_annulus(params: &GeneratorParams) -> Generated {
    sampled(
        SceneNode::new("twisted-annulus", annulus_mesh(params), WIRE)
            .with_scale(2.0)
            .with_spin(Vec3::new(0.1, 0.0, 0.2))
            .with_parallax(1.0),
    )
}

/// Twisted annulus carrying a glowing inset layer on its surface.
pub fn engraved_annulus(params: &GeneratorParams) -> Generated {
    let surface = annulus_mesh(params);
    let mut node = SceneNode::new("engraved-annulus", surface.clone(), WIRE)
        .with_scale(2.0)
        .with_spin(Vec3::new(0.1, 0.0, 0.2))
        .with_parallax(1.0);
    if let Some(layer) = engrave(&surface, 0.3, 0.05) {
        node = node.with_child(SceneNode::new(
            "engraved-layer",
            layer,
            Material::glow(AMBER, 0.25, 0.1),
        ));
    }
    sampled(node)
}

pub fn shells(params: &GeneratorParams) -> Generated {
    let segments = (params.segments / 2).max(4);
    let mut group = SceneNode::group("shells")
        .with_spin(Vec3::new(0.05, 0.1, 0.0))
        .with_parallax(0.5);
    for shell in concentric_shells(&ShellParams::default(), segments) {
        group = group.with_child(SceneNode::new(
            "shell",
            shell.mesh,
            Material::wireframe(DEEP_INDIGO, 0.3 * shell.intensity),
        ));
    }
    sampled(group)
}

pub fn funnel(params: &GeneratorParams) -> Generated {
    let axial = (params.segments / 2).max(4);
    sampled(
        SceneNode::new("funnel", Funnel::default().build(params.segments, axial), WIRE)
            .with_spin(Vec3::new(0.0, 0.15, 0.05))
            .with_parallax(-0.75),
    )
}

/// Wave-deformed sheet tilted back behind everything else.
pub fn fabric(params: &GeneratorParams) -> Generated {
    let node = SceneNode::new(
        "fabric",
        fabric_plane(FABRIC_SIZE, FABRIC_SEGMENTS),
        Material::wireframe(DEEP_INDIGO, 0.4),
    )
    .with_rotation(Vec3::new(-FRAC_PI_4, 0.0, 0.0))
    .with_deform(Deform::Wave(params.wave));
    Generated {
        node,
        anchor: Anchor::Fixed(Vec3::from(FABRIC_POSITION)),
    }
}
