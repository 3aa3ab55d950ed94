use backdrop_core::geometry::surfaces::{DeformedSphere, TwistedAnnulus};
use backdrop_core::geometry::{build_parametric, build_parametric_wrapped, Mesh, Wrap};
use glam::Vec3;
use std::collections::HashMap;

fn saddle(u: f32, v: f32) -> Vec3 {
    let (x, y) = (u * 4.0 - 2.0, v * 4.0 - 2.0);
    Vec3::new(x, y, x * x - y * y)
}

fn edge_use(mesh: &Mesh) -> HashMap<(u32, u32), u32> {
    let mut uses = HashMap::new();
    for tri in mesh.indices.chunks_exact(3) {
        for (a, b) in [(tri[0], tri[1]), (tri[1], tri[2]), (tri[2], tri[0])] {
            *uses.entry((a.min(b), a.max(b))).or_insert(0) += 1;
        }
    }
    uses
}

#[test]
fn grid_counts_match_segments() {
    for (m, n) in [(1, 1), (3, 5), (16, 7), (32, 32)] {
        let mesh = build_parametric(saddle, m, n);
        assert_eq!(mesh.vertex_count(), ((m + 1) * (n + 1)) as usize, "{m}x{n}");
        assert_eq!(mesh.triangle_count(), (2 * m * n) as usize, "{m}x{n}");
    }
}

#[test]
fn internal_edges_are_shared_by_two_triangles() {
    let (m, n) = (6, 4);
    let mesh = build_parametric(saddle, m, n);
    let grid = mesh.grid.unwrap();
    let uses = edge_use(&mesh);
    let boundary = |i: u32, j: u32| i == 0 || j == 0 || i == m || j == n;
    for (&(a, b), &count) in &uses {
        let (ia, ja) = (a % grid.columns(), a / grid.columns());
        let (ib, jb) = (b % grid.columns(), b / grid.columns());
        let on_border = (boundary(ia, ja) && boundary(ib, jb)) && (ia == ib || ja == jb);
        if on_border {
            assert_eq!(count, 1, "border edge {a}-{b}");
        } else {
            assert_eq!(count, 2, "internal edge {a}-{b}");
        }
    }
}

#[test]
fn positions_are_deterministic() {
    let sphere = DeformedSphere::default();
    let a = sphere.build(24);
    let b = sphere.build(24);
    assert_eq!(a.positions, b.positions);
    for (na, nb) in a.normals.iter().zip(&b.normals) {
        assert!((Vec3::from(*na) - Vec3::from(*nb)).length() < 1e-5);
    }
}

#[test]
fn samples_are_linear_in_u_and_v() {
    let mesh = build_parametric(|u, v| Vec3::new(u, v, 0.0), 4, 2);
    let grid = mesh.grid.unwrap();
    assert_eq!(mesh.positions[grid.index(0, 0) as usize], [0.0, 0.0, 0.0]);
    assert_eq!(mesh.positions[grid.index(4, 2) as usize], [1.0, 1.0, 0.0]);
    assert_eq!(mesh.positions[grid.index(1, 1) as usize], [0.25, 0.5, 0.0]);
}

#[test]
fn closed_annulus_keeps_grid_counts_and_smooth_normals() {
    let band = TwistedAnnulus::default();
    let mesh = build_parametric_wrapped(|u, v| band.point(u, v), 32, 8, Wrap::Closed);
    assert_eq!(mesh.vertex_count(), 33 * 9);
    assert_eq!(mesh.triangle_count(), 2 * 32 * 8);
    for n in &mesh.normals {
        let len = Vec3::from(*n).length();
        assert!((len - 1.0).abs() < 1e-3, "normal length {len}");
    }
}
