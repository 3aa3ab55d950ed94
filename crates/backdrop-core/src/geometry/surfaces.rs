//! Named parametric formulas built on [`build_parametric`].
//!
//! The exact shapes are decorative; each function only promises the
//! mechanism described in its doc comment.

use super::{build_parametric, build_parametric_wrapped, Mesh, Topology, Wrap};
use glam::Vec3;
use std::f32::consts::{PI, TAU};

/// Sphere whose radius is modulated by a multi-lobe function of its two
/// angular coordinates: `r * (1 + sin(a·θ) · cos(b·φ) · amplitude)`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DeformedSphere {
    pub radius: f32,
    pub theta_lobes: f32,
    pub phi_lobes: f32,
    pub amplitude: f32,
}

impl Default for DeformedSphere {
    fn default() -> Self {
        Self {
            radius: 3.0,
            theta_lobes: 3.0,
            phi_lobes: 2.0,
            amplitude: 0.5,
        }
    }
}

impl DeformedSphere {
    pub fn point(&self, u: f32, v: f32) -> Vec3 {
        let theta = u * TAU;
        let phi = v * PI;
        let dir = Vec3::new(phi.sin() * theta.cos(), phi.cos(), phi.sin() * theta.sin());
        let deformation = (self.theta_lobes * theta).sin() * (self.phi_lobes * phi).cos() * self.amplitude;
        dir * self.radius * (1.0 + deformation)
    }

    pub fn build(&self, segments: u32) -> Mesh {
        build_parametric_wrapped(|u, v| self.point(u, v), segments, segments, Wrap::Closed)
    }
}

/// Tube swept around a circle whose cross-section rotates by
/// `θ · half_twists / 2` as the sweep angle θ goes around. With one half
/// twist the flattened cross-section comes back upside down, which reads as
/// a Möbius band.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TwistedAnnulus {
    pub radius: f32,
    pub width: f32,
    pub thickness: f32,
    pub half_twists: f32,
}

impl Default for TwistedAnnulus {
    fn default() -> Self {
        Self {
            radius: 2.0,
            width: 0.8,
            thickness: 0.2,
            half_twists: 1.0,
        }
    }
}

impl TwistedAnnulus {
    pub fn point(&self, u: f32, v: f32) -> Vec3 {
        let theta = u * TAU;
        let psi = v * TAU;
        let (a, b) = (self.width * psi.cos(), self.thickness * psi.sin());
        let twist = theta * self.half_twists * 0.5;
        let (s, c) = twist.sin_cos();
        let (a, b) = (a * c - b * s, a * s + b * c);
        let radial = Vec3::new(theta.cos(), theta.sin(), 0.0);
        radial * (self.radius + a) + Vec3::Z * b
    }

    pub fn build(&self, sweep_segments: u32, tube_segments: u32) -> Mesh {
        build_parametric_wrapped(
            |u, v| self.point(u, v),
            sweep_segments,
            tube_segments,
            Wrap::Closed,
        )
    }
}

/// Second layer for a parametric surface: every grid quad is shrunk toward
/// its centroid by `inset` (0..1) and pushed against its face normal by
/// `depth`. Quads are independent (4 vertices each, flat normals).
///
/// Returns `None` for meshes that did not come from the parametric builder.
pub fn engrave(surface: &Mesh, inset: f32, depth: f32) -> Option<Mesh> {
    let grid = surface.grid?;
    let keep = (1.0 - inset).clamp(0.0, 1.0);
    let cells = (grid.u_segments * grid.v_segments) as usize;
    let mut positions = Vec::with_capacity(cells * 4);
    let mut normals = Vec::with_capacity(cells * 4);
    let mut indices = Vec::with_capacity(cells * 6);

    for j in 0..grid.v_segments {
        for i in 0..grid.u_segments {
            let corners = [
                grid.index(i, j),
                grid.index(i + 1, j),
                grid.index(i + 1, j + 1),
                grid.index(i, j + 1),
            ]
            .map(|k| Vec3::from(surface.positions[k as usize]));
            let centroid = (corners[0] + corners[1] + corners[2] + corners[3]) * 0.25;
            let normal = (corners[2] - corners[0])
                .cross(corners[3] - corners[1])
                .normalize_or_zero();
            let offset = -normal * depth;

            let base = positions.len() as u32;
            for c in corners {
                positions.push((centroid + (c - centroid) * keep + offset).to_array());
                normals.push(normal.to_array());
            }
            indices.extend_from_slice(&[base, base + 1, base + 3, base + 1, base + 2, base + 3]);
        }
    }

    Some(Mesh {
        positions,
        normals,
        indices,
        topology: Topology::Triangles,
        grid: None,
    })
}

/// Nested spheres at increasing radii; intensity falls off geometrically
/// from the innermost shell outward.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ShellParams {
    pub count: u32,
    pub base_radius: f32,
    pub spacing: f32,
    pub falloff: f32,
}

impl Default for ShellParams {
    fn default() -> Self {
        Self {
            count: 4,
            base_radius: 1.0,
            spacing: 0.6,
            falloff: 0.6,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Shell {
    pub mesh: Mesh,
    pub radius: f32,
    pub intensity: f32,
}

pub fn concentric_shells(params: &ShellParams, segments: u32) -> Vec<Shell> {
    (0..params.count)
        .map(|k| {
            let radius = params.base_radius + params.spacing * k as f32;
            let sphere = DeformedSphere {
                radius,
                amplitude: 0.0,
                ..DeformedSphere::default()
            };
            Shell {
                mesh: sphere.build(segments),
                radius,
                intensity: params.falloff.powi(k as i32),
            }
        })
        .collect()
}

/// Surface of revolution around Y whose radius grows with axial distance `d`
/// from the throat as `throat + flare · k·d² / (1 + k·d²)`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Funnel {
    pub throat: f32,
    pub flare: f32,
    pub sharpness: f32,
    pub half_length: f32,
}

impl Default for Funnel {
    fn default() -> Self {
        Self {
            throat: 0.4,
            flare: 3.0,
            sharpness: 0.8,
            half_length: 4.0,
        }
    }
}

impl Funnel {
    #[inline]
    pub fn radius_at(&self, d: f32) -> f32 {
        let q = self.sharpness * d * d;
        self.throat + self.flare * q / (1.0 + q)
    }

    pub fn point(&self, u: f32, v: f32) -> Vec3 {
        let theta = u * TAU;
        let y = (v * 2.0 - 1.0) * self.half_length;
        let r = self.radius_at(y);
        Vec3::new(r * theta.cos(), y, r * theta.sin())
    }

    pub fn build(&self, sweep_segments: u32, axial_segments: u32) -> Mesh {
        build_parametric_wrapped(
            |u, v| self.point(u, v),
            sweep_segments,
            axial_segments,
            Wrap::Closed,
        )
    }
}

/// Flat `size`×`size` sheet in the local XY plane, centered on the origin.
/// Local Z is the deformable height attribute.
pub fn fabric_plane(size: f32, segments: u32) -> Mesh {
    build_parametric(
        |u, v| Vec3::new((u - 0.5) * size, (v - 0.5) * size, 0.0),
        segments,
        segments,
    )
}
