// Host-side tests for the GPU uniform packing.

#![allow(dead_code)]
mod uniforms {
    include!("../src/render/uniforms.rs");
}

use backdrop_core::scene::{DrawItem, LightRig, Material, NodeId};
use backdrop_core::{Camera, DrawFrame, Topology};
use glam::{Mat4, Quat, Vec3};
use uniforms::*;

fn frame<'a>(camera: &Camera, lights: &'a LightRig) -> DrawFrame<'a> {
    DrawFrame {
        view: camera.view_matrix(),
        projection: camera.projection_matrix(),
        camera_position: camera.position,
        lights,
        items: &[],
        time: 0.0,
    }
}

#[test]
fn layouts_match_the_shader_structs() {
    assert_eq!(std::mem::size_of::<GlobalsUniforms>(), 192);
    assert_eq!(std::mem::size_of::<DrawUniforms>(), 160);
}

#[test]
fn globals_carry_camera_and_lights() {
    let camera = Camera::default();
    let lights = LightRig::default();
    let g = GlobalsUniforms::from_frame(&frame(&camera, &lights));

    let expected = camera.projection_matrix() * camera.view_matrix();
    assert_eq!(g.view_proj, expected.to_cols_array_2d());
    assert_eq!(g.camera_pos, [0.0, 0.0, 5.0, 1.0]);
    // an untilted camera faces -Z, so billboards span world X and Y
    assert!((Vec3::from_slice(&g.camera_right[..3]) - Vec3::X).length() < 1e-5);
    assert!((Vec3::from_slice(&g.camera_up[..3]) - Vec3::Y).length() < 1e-5);

    let first = &lights.points[0];
    assert_eq!(g.light_pos[0][3], first.range);
    assert!((g.light_color[0][0] - first.color[0] * first.intensity).abs() < 1e-6);
    assert!((g.ambient[2] - lights.ambient.color[2] * lights.ambient.intensity).abs() < 1e-6);
}

#[test]
fn missing_lights_are_zeroed() {
    let camera = Camera::default();
    let mut lights = LightRig::default();
    lights.points.truncate(1);
    let g = GlobalsUniforms::from_frame(&frame(&camera, &lights));
    assert_eq!(g.light_pos[1], [0.0; 4]);
    assert_eq!(g.light_color[1], [0.0; 4]);
}

#[test]
fn draw_uniforms_pack_material() {
    let item = DrawItem {
        node: NodeId(3),
        world: Mat4::from_scale_rotation_translation(
            Vec3::splat(2.0),
            Quat::from_rotation_y(0.5),
            Vec3::new(1.0, 2.0, 3.0),
        ),
        material: Material::points([0.1, 0.2, 0.3], 1.4, 0.25),
        topology: Topology::Points,
    };
    let d = DrawUniforms::from_item(&item);
    assert_eq!(d.color, [0.1, 0.2, 0.3, 1.0]);
    assert_eq!(d.params[1], 0.25);
    let n = Mat4::from_cols_array_2d(&d.normal_matrix);
    assert!(n.abs_diff_eq(item.world.inverse().transpose(), 1e-5));
}

#[test]
fn degenerate_world_gets_identity_normals() {
    let item = DrawItem {
        node: NodeId(0),
        world: Mat4::from_scale(Vec3::new(0.0, 1.0, 1.0)),
        material: Material::wireframe([1.0; 3], 0.3),
        topology: Topology::Lines,
    };
    let d = DrawUniforms::from_item(&item);
    assert_eq!(d.normal_matrix, Mat4::IDENTITY.to_cols_array_2d());
    assert_eq!(d.params, [0.0; 4]);
}
