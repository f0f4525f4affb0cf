//! Scene camera
//!
//! A [`Camera`] pairs a [`Transform`] with perspective projection
//! properties. The projection matrix is built once during `initialize`; the
//! view matrix is rebuilt every frame from the transform's translation,
//! direction and up vectors, so steering the camera is just mutating its
//! transform.

use cgmath::{Deg, Matrix4, Rad, SquareMatrix};

use crate::gfx::math;
use crate::gfx::transform::Transform;

/// Perspective projection parameters, angles in degrees
#[derive(Debug, Clone, Copy)]
pub struct CameraProperties {
    pub field_of_view_y: f32,
    pub aspect_ratio: f32,
    pub near_plane: f32,
    pub far_plane: f32,
}

impl Default for CameraProperties {
    fn default() -> Self {
        Self {
            field_of_view_y: 45.0,
            aspect_ratio: 16.0 / 9.0,
            near_plane: 0.05,
            far_plane: 1000.0,
        }
    }
}

/// A free camera looking along its transform's direction axis
#[derive(Debug, Clone)]
pub struct Camera {
    properties: CameraProperties,
    transform: Transform,
    view_matrix: Matrix4<f32>,
    projection_matrix: Matrix4<f32>,
}

impl Camera {
    pub fn new(properties: CameraProperties) -> Self {
        Self {
            properties,
            transform: Transform::new(),
            view_matrix: Matrix4::identity(),
            projection_matrix: Matrix4::identity(),
        }
    }

    /// Builds both matrices; call once after construction
    pub fn initialize(&mut self) {
        self.create_view_matrix();
        self.create_projection_matrix();
    }

    /// Rebuilds the view matrix from the current transform
    pub fn update(&mut self) {
        self.create_view_matrix();
    }

    /// Updates the aspect ratio and rebuilds the projection, for resizes
    pub fn set_aspect_ratio(&mut self, aspect_ratio: f32) {
        self.properties.aspect_ratio = aspect_ratio;
        self.create_projection_matrix();
    }

    pub fn view_matrix(&self) -> Matrix4<f32> {
        self.view_matrix
    }

    pub fn projection_matrix(&self) -> Matrix4<f32> {
        self.projection_matrix
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    pub fn transform_mut(&mut self) -> &mut Transform {
        &mut self.transform
    }

    fn create_view_matrix(&mut self) {
        self.view_matrix = math::look_to_lh(
            self.transform.translation(),
            self.transform.direction(),
            self.transform.up(),
        );
    }

    fn create_projection_matrix(&mut self) {
        let fov_y: Rad<f32> = Deg(self.properties.field_of_view_y).into();
        self.projection_matrix = math::perspective_fov_lh(
            fov_y,
            self.properties.aspect_ratio,
            self.properties.near_plane,
            self.properties.far_plane,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{InnerSpace, Vector3, Vector4};

    fn view_transform(v: Vector3<f32>, m: Matrix4<f32>) -> Vector3<f32> {
        use cgmath::Matrix;
        let out = m.transpose() * Vector4::new(v.x, v.y, v.z, 1.0);
        Vector3::new(out.x, out.y, out.z)
    }

    #[test]
    fn test_view_tracks_transform_updates() {
        let mut camera = Camera::new(CameraProperties::default());
        camera.initialize();

        camera.transform_mut().set_translation(0.0, 2.0, -10.0);
        camera.update();

        let eye = view_transform(Vector3::new(0.0, 2.0, -10.0), camera.view_matrix());
        assert!(eye.magnitude() < 1e-5);
    }

    #[test]
    fn test_projection_is_fixed_after_initialize() {
        let mut camera = Camera::new(CameraProperties::default());
        camera.initialize();
        let projection = camera.projection_matrix();

        camera.transform_mut().translate_z_by(3.0);
        camera.update();

        assert_eq!(camera.projection_matrix(), projection);
    }
}
