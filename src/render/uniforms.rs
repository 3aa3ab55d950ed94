use backdrop_core::scene::MaterialKind;
use backdrop_core::{DrawFrame, DrawItem};
use glam::{Mat4, Vec3};

/// Maximum point lights the shader reads.
pub const MAX_LIGHTS: usize = 2;

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GlobalsUniforms {
    pub view_proj: [[f32; 4]; 4],
    pub camera_pos: [f32; 4],
    pub camera_right: [f32; 4],
    pub camera_up: [f32; 4],
    pub ambient: [f32; 4],
    pub light_pos: [[f32; 4]; MAX_LIGHTS],
    pub light_color: [[f32; 4]; MAX_LIGHTS],
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct DrawUniforms {
    pub model: [[f32; 4]; 4],
    pub normal_matrix: [[f32; 4]; 4],
    pub color: [f32; 4],
    pub params: [f32; 4],
}

fn scaled(color: [f32; 3], intensity: f32) -> [f32; 4] {
    let c = Vec3::from(color) * intensity;
    [c.x, c.y, c.z, 1.0]
}

impl GlobalsUniforms {
    pub fn from_frame(frame: &DrawFrame<'_>) -> Self {
        // billboard axes are the camera's world-space right and up
        let inv_view = frame.view.inverse();
        let right = inv_view.x_axis.truncate();
        let up = inv_view.y_axis.truncate();

        let mut u = Self {
            view_proj: (frame.projection * frame.view).to_cols_array_2d(),
            camera_pos: frame.camera_position.extend(1.0).to_array(),
            camera_right: right.extend(0.0).to_array(),
            camera_up: up.extend(0.0).to_array(),
            ambient: scaled(frame.lights.ambient.color, frame.lights.ambient.intensity),
            light_pos: [[0.0; 4]; MAX_LIGHTS],
            light_color: [[0.0; 4]; MAX_LIGHTS],
        };
        for (i, light) in frame.lights.points.iter().take(MAX_LIGHTS).enumerate() {
            u.light_pos[i] = light.position.extend(light.range).to_array();
            u.light_color[i] = scaled(light.color, light.intensity);
        }
        u
    }
}

impl DrawUniforms {
    pub fn from_item(item: &DrawItem) -> Self {
        let normal = if item.world.determinant().abs() > f32::EPSILON {
            item.world.inverse().transpose()
        } else {
            Mat4::IDENTITY
        };
        let point_size = match item.material.kind {
            MaterialKind::Points { size } => size,
            _ => 0.0,
        };
        let m = &item.material;
        Self {
            model: item.world.to_cols_array_2d(),
            normal_matrix: normal.to_cols_array_2d(),
            color: [m.color[0], m.color[1], m.color[2], m.opacity.clamp(0.0, 1.0)],
            params: [m.emissive, point_size, 0.0, 0.0],
        }
    }
}
