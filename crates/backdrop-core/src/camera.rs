//! Perspective camera and viewport description.
//!
//! Both types avoid platform APIs; the web backend reads the viewport from
//! the window and feeds it through [`Camera::apply_viewport`].

use crate::constants::*;
use glam::{EulerRot, Mat4, Quat, Vec3};

/// CSS-pixel viewport plus the device pixel ratio at the time it was read.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
    pub device_pixel_ratio: f32,
}

impl Viewport {
    pub const fn new(width: f32, height: f32, device_pixel_ratio: f32) -> Self {
        Self {
            width,
            height,
            device_pixel_ratio,
        }
    }

    /// Width over height; a collapsed viewport reports 1.
    #[inline]
    pub fn aspect(&self) -> f32 {
        if self.width <= 0.0 || self.height <= 0.0 {
            return 1.0;
        }
        self.width / self.height
    }

    /// Backing-store size in physical pixels, at least 1×1.
    #[inline]
    pub fn physical_size(&self) -> (u32, u32) {
        let dpr = if self.device_pixel_ratio.is_finite() && self.device_pixel_ratio > 0.0 {
            self.device_pixel_ratio
        } else {
            1.0
        };
        let w = (self.width * dpr).round().max(1.0) as u32;
        let h = (self.height * dpr).round().max(1.0) as u32;
        (w, h)
    }
}

/// Right-handed perspective camera. `rotation` holds XYZ Euler angles in
/// radians and is overwritten every frame by the orientation tilt.
#[derive(Clone, Debug, PartialEq)]
pub struct Camera {
    pub fov_y_deg: f32,
    pub near: f32,
    pub far: f32,
    pub aspect: f32,
    pub position: Vec3,
    pub rotation: Vec3,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            fov_y_deg: CAMERA_FOV_DEG,
            near: CAMERA_NEAR,
            far: CAMERA_FAR,
            aspect: 1.0,
            position: Vec3::new(0.0, 0.0, CAMERA_Z),
            rotation: Vec3::ZERO,
        }
    }
}

impl Camera {
    /// Recompute the aspect ratio from `viewport`. Pure in the viewport:
    /// calling it again with the same dimensions changes nothing.
    pub fn apply_viewport(&mut self, viewport: &Viewport) {
        self.aspect = viewport.aspect();
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y_deg.to_radians(), self.aspect, self.near, self.far)
    }

    /// World to view: the inverse of the camera's own rigid transform.
    pub fn view_matrix(&self) -> Mat4 {
        let orientation = Quat::from_euler(
            EulerRot::XYZ,
            self.rotation.x,
            self.rotation.y,
            self.rotation.z,
        );
        Mat4::from_rotation_translation(orientation, self.position).inverse()
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
}
