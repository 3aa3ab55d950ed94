use super::{Mesh, Topology};
use glam::Vec3;
use std::f32::consts::TAU;

/// Axis-aligned cube centered on the origin with per-face vertices, so
/// every face keeps a flat normal.
pub fn cube(size: f32) -> Mesh {
    let h = size * 0.5;
    // (normal, tangent u, tangent v) per face
    let faces = [
        (Vec3::X, Vec3::NEG_Z, Vec3::Y),
        (Vec3::NEG_X, Vec3::Z, Vec3::Y),
        (Vec3::Y, Vec3::X, Vec3::NEG_Z),
        (Vec3::NEG_Y, Vec3::X, Vec3::Z),
        (Vec3::Z, Vec3::X, Vec3::Y),
        (Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y),
    ];
    let mut positions = Vec::with_capacity(24);
    let mut normals = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);
    for (n, tu, tv) in faces {
        let base = positions.len() as u32;
        for (su, sv) in [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)] {
            positions.push(((n + tu * su + tv * sv) * h).to_array());
            normals.push(n.to_array());
        }
        indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }
    Mesh {
        positions,
        normals,
        indices,
        topology: Topology::Triangles,
        grid: None,
    }
}

/// `count` line segments in the XY plane, evenly spaced around the origin,
/// each running from `inner` to `outer` radius.
pub fn radial_spokes(count: u32, inner: f32, outer: f32) -> Mesh {
    let mut positions = Vec::with_capacity(count as usize * 2);
    for k in 0..count {
        let angle = k as f32 / count as f32 * TAU;
        let dir = Vec3::new(angle.cos(), angle.sin(), 0.0);
        positions.push((dir * inner).to_array());
        positions.push((dir * outer).to_array());
    }
    let indices = (0..positions.len() as u32).collect();
    Mesh::new(positions, indices, Topology::Lines)
}

pub fn point_cloud(positions: &[[f32; 3]]) -> Mesh {
    let indices = (0..positions.len() as u32).collect();
    Mesh::new(positions.to_vec(), indices, Topology::Points)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cube_corners_sit_on_half_extent() {
        let m = cube(2.0);
        assert_eq!(m.vertex_count(), 24);
        assert_eq!(m.triangle_count(), 12);
        for p in m.positions {
            assert!(p.iter().all(|c| (c.abs() - 1.0).abs() < 1e-6));
        }
    }

    #[test]
    fn cube_faces_wind_outward() {
        let m = cube(1.0);
        for tri in m.indices.chunks_exact(3) {
            let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| Vec3::from(m.positions[i as usize]));
            let face_n = (b - a).cross(c - a).normalize();
            let stored = Vec3::from(m.normals[tri[0] as usize]);
            assert!(face_n.dot(stored) > 0.99);
        }
    }

    #[test]
    fn spokes_span_inner_to_outer() {
        let m = radial_spokes(8, 1.5, 2.5);
        assert_eq!(m.topology, Topology::Lines);
        assert_eq!(m.indices.len(), 16);
        for pair in m.positions.chunks_exact(2) {
            assert!((Vec3::from(pair[0]).length() - 1.5).abs() < 1e-5);
            assert!((Vec3::from(pair[1]).length() - 2.5).abs() < 1e-5);
        }
    }
}
