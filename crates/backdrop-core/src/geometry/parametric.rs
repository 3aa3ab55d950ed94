use super::{compute_vertex_normals, Mesh, SurfaceGrid, Topology};
use crate::constants::MAX_SURFACE_SEGMENTS;
use fnv::FnvHashMap;
use glam::Vec3;

/// Seam handling for surfaces whose parameter domain wraps around.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum Wrap {
    /// Normals come straight from the triangulated grid.
    #[default]
    Open,
    /// Vertices that land on the same position (seams, poles) share the sum
    /// of their normals, so shading is continuous across the seam. Positions
    /// are matched on a 1e-4 lattice to absorb `cos(TAU) != 1` style error.
    Closed,
}

/// Sample `param_fn` over a regular (u, v) grid on [0,1]² and triangulate it.
///
/// Produces `(u_segments + 1) * (v_segments + 1)` vertices laid out row-major
/// in v, and `2 * u_segments * v_segments` triangles, with both counts
/// clamped to `1..=MAX_SURFACE_SEGMENTS`. Each grid cell is split
/// along the same diagonal, and adjacent cells reference the same vertex
/// indices along their shared edge. A segment count of zero is treated as one.
pub fn build_parametric<F>(param_fn: F, u_segments: u32, v_segments: u32) -> Mesh
where
    F: Fn(f32, f32) -> Vec3,
{
    build_parametric_wrapped(param_fn, u_segments, v_segments, Wrap::Open)
}

pub fn build_parametric_wrapped<F>(param_fn: F, u_segments: u32, v_segments: u32, wrap: Wrap) -> Mesh
where
    F: Fn(f32, f32) -> Vec3,
{
    let grid = SurfaceGrid {
        u_segments: u_segments.clamp(1, MAX_SURFACE_SEGMENTS),
        v_segments: v_segments.clamp(1, MAX_SURFACE_SEGMENTS),
    };
    let (m, n) = (grid.u_segments, grid.v_segments);

    let mut positions = Vec::with_capacity(((m + 1) * (n + 1)) as usize);
    for j in 0..=n {
        let v = j as f32 / n as f32;
        for i in 0..=m {
            let u = i as f32 / m as f32;
            positions.push(param_fn(u, v).to_array());
        }
    }

    let mut indices = Vec::with_capacity((m * n * 6) as usize);
    for j in 0..n {
        for i in 0..m {
            let a = grid.index(i, j);
            let b = grid.index(i + 1, j);
            let c = grid.index(i + 1, j + 1);
            let d = grid.index(i, j + 1);
            indices.extend_from_slice(&[a, b, d, b, c, d]);
        }
    }

    let mut normals = compute_vertex_normals(&positions, &indices);
    if wrap == Wrap::Closed {
        weld_coincident_normals(&positions, &mut normals);
    }

    Mesh {
        positions,
        normals,
        indices,
        topology: Topology::Triangles,
        grid: Some(grid),
    }
}

const WELD_SCALE: f32 = 1.0e4;

fn weld_coincident_normals(positions: &[[f32; 3]], normals: &mut [[f32; 3]]) {
    let key = |p: &[f32; 3]| p.map(|c| (c * WELD_SCALE).round() as i64);
    let mut sums: FnvHashMap<[i64; 3], Vec3> = FnvHashMap::default();
    for (p, n) in positions.iter().zip(normals.iter()) {
        *sums.entry(key(p)).or_insert(Vec3::ZERO) += Vec3::from(*n);
    }
    for (p, n) in positions.iter().zip(normals.iter_mut()) {
        if let Some(sum) = sums.get(&key(p)) {
            *n = sum.normalize_or_zero().to_array();
        }
    }
}
