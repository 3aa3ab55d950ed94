//! Procedural mesh generation.
//!
//! Every generator in this module is a pure function of its parameters: no
//! generator reads time, input or scene state. Meshes are plain CPU-side
//! buffers; the web renderer uploads them once at bootstrap and re-uploads
//! only the positions of deformable meshes every frame.

mod parametric;
pub mod primitives;
pub mod registry;
pub mod surfaces;

pub use parametric::{build_parametric, build_parametric_wrapped, Wrap};
pub use registry::{Generated, GeneratorFn, GeneratorRegistry};

use fnv::FnvHashSet;
use glam::Vec3;

/// How the index buffer is to be interpreted.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Topology {
    Triangles,
    Lines,
    Points,
}

/// Dimensions of the (u, v) grid a parametric mesh was sampled from.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SurfaceGrid {
    pub u_segments: u32,
    pub v_segments: u32,
}

impl SurfaceGrid {
    #[inline]
    pub fn columns(&self) -> u32 {
        self.u_segments + 1
    }

    #[inline]
    pub fn index(&self, i: u32, j: u32) -> u32 {
        j * self.columns() + i
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Mesh {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub indices: Vec<u32>,
    pub topology: Topology,
    /// Present when the mesh came out of the parametric builder.
    pub grid: Option<SurfaceGrid>,
}

impl Mesh {
    pub fn new(positions: Vec<[f32; 3]>, indices: Vec<u32>, topology: Topology) -> Self {
        let normals = vec![[0.0; 3]; positions.len()];
        Self {
            positions,
            normals,
            indices,
            topology,
            grid: None,
        }
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    #[inline]
    pub fn triangle_count(&self) -> usize {
        match self.topology {
            Topology::Triangles => self.indices.len() / 3,
            _ => 0,
        }
    }

    /// Recompute smooth per-vertex normals from the triangle list.
    pub fn compute_vertex_normals(&mut self) {
        if self.topology != Topology::Triangles {
            return;
        }
        self.normals = compute_vertex_normals(&self.positions, &self.indices);
    }

    /// Unique undirected edges of the triangle list, as a line index list.
    ///
    /// Edge order follows first appearance in the index buffer so repeated
    /// calls return identical buffers.
    pub fn wireframe_indices(&self) -> Vec<u32> {
        match self.topology {
            Topology::Lines => return self.indices.clone(),
            Topology::Points => return Vec::new(),
            Topology::Triangles => {}
        }
        let mut seen = FnvHashSet::default();
        let mut out = Vec::with_capacity(self.indices.len());
        for tri in self.indices.chunks_exact(3) {
            for (a, b) in [(tri[0], tri[1]), (tri[1], tri[2]), (tri[2], tri[0])] {
                let key = (a.min(b), a.max(b));
                if seen.insert(key) {
                    out.push(a);
                    out.push(b);
                }
            }
        }
        out
    }

    pub fn translate(&mut self, offset: Vec3) {
        for p in &mut self.positions {
            *p = (Vec3::from(*p) + offset).to_array();
        }
    }
}

pub fn compute_vertex_normals(positions: &[[f32; 3]], indices: &[u32]) -> Vec<[f32; 3]> {
    let mut acc = vec![Vec3::ZERO; positions.len()];
    for tri in indices.chunks_exact(3) {
        let (i0, i1, i2) = (tri[0] as usize, tri[1] as usize, tri[2] as usize);
        if i0 >= positions.len() || i1 >= positions.len() || i2 >= positions.len() {
            continue;
        }
        let p0 = Vec3::from(positions[i0]);
        let n = (Vec3::from(positions[i1]) - p0).cross(Vec3::from(positions[i2]) - p0);
        // area-weighted; degenerate triangles contribute nothing
        if n.length_squared() <= 1.0e-20 {
            continue;
        }
        acc[i0] += n;
        acc[i1] += n;
        acc[i2] += n;
    }
    acc.into_iter()
        .map(|n| n.normalize_or_zero().to_array())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad() -> Mesh {
        let mut m = Mesh::new(
            vec![
                [0.0, 0.0, 0.0],
                [1.0, 0.0, 0.0],
                [1.0, 1.0, 0.0],
                [0.0, 1.0, 0.0],
            ],
            vec![0, 1, 2, 0, 2, 3],
            Topology::Triangles,
        );
        m.compute_vertex_normals();
        m
    }

    #[test]
    fn flat_quad_normals_point_along_z() {
        for n in quad().normals {
            assert!((n[2] - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn wireframe_dedupes_shared_diagonal() {
        // 4 border edges + 1 shared diagonal
        assert_eq!(quad().wireframe_indices().len(), 5 * 2);
    }

    #[test]
    fn degenerate_triangle_leaves_zero_normal() {
        let n = compute_vertex_normals(&[[0.0; 3], [0.0; 3], [0.0; 3]], &[0, 1, 2]);
        assert_eq!(n, vec![[0.0; 3]; 3]);
    }
}
