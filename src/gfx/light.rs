//! Lights and shadow-cube matrices
//!
//! A point light renders its shadow map into a cube: six depth passes, one
//! per axis-aligned face. Each face gets a look-to view matrix from the
//! light's position and a 90 degree perspective projection whose far plane
//! is the light's falloff distance, so the shadow frustum never extends
//! past the range the light can actually illuminate.
//!
//! The falloff distance is derived from the intensity by solving the
//! attenuation quadratic `F = I / (sq*d^2 + lin*d + c)` for the distance at
//! which the attenuated intensity drops below a negligible threshold.

use cgmath::{Matrix4, Rad, Vector3, Vector4};

use crate::gfx::math;
use crate::gfx::transform::Transform;

/// Number of faces in a shadow cube
pub const SHADOW_CUBE_FACES: usize = 6;

/// Attenuation coefficients and cutoff threshold for the falloff solve
const FALLOFF_SQ: f32 = 0.5;
const FALLOFF_LIN: f32 = 0.3;
const FALLOFF_C: f32 = 0.01;
const FALLOFF_THRESHOLD: f32 = 0.001;

/// Look directions and up vectors for the six cube faces, in the order
/// +X, -X, +Y, -Y, +Z, -Z
const FACE_DIRECTIONS: [Vector3<f32>; SHADOW_CUBE_FACES] = [
    Vector3::new(1.0, 0.0, 0.0),
    Vector3::new(-1.0, 0.0, 0.0),
    Vector3::new(0.0, 1.0, 0.0),
    Vector3::new(0.0, -1.0, 0.0),
    Vector3::new(0.0, 0.0, 1.0),
    Vector3::new(0.0, 0.0, -1.0),
];

const FACE_UPS: [Vector3<f32>; SHADOW_CUBE_FACES] = [
    Vector3::new(0.0, 1.0, 0.0),
    Vector3::new(0.0, 1.0, 0.0),
    Vector3::new(0.0, 0.0, -1.0),
    Vector3::new(0.0, 0.0, 1.0),
    Vector3::new(0.0, 1.0, 0.0),
    Vector3::new(0.0, 1.0, 0.0),
];

/// Kind-specific light parameters
///
/// Only point lights are exercised by the demo scene; the other kinds carry
/// their property payloads for completeness.
#[derive(Debug, Clone, Copy)]
pub enum LightKind {
    Directional,
    Point {
        /// Falloff distance, derived from the intensity at construction
        distance: f32,
    },
    Spot {
        distance: f32,
        hot_spot_angle: f32,
        falloff_angle: f32,
    },
}

#[derive(Debug, Clone, Copy)]
pub struct LightProperties {
    pub kind: LightKind,
    pub intensity: f32,
    pub color: Vector4<f32>,
}

impl Default for LightProperties {
    fn default() -> Self {
        Self {
            kind: LightKind::Point { distance: 0.0 },
            intensity: 1.0,
            color: Vector4::new(1.0, 1.0, 1.0, 1.0),
        }
    }
}

/// A light source with per-face shadow view/projection matrices
#[derive(Debug, Clone)]
pub struct Light {
    properties: LightProperties,
    transform: Transform,
}

impl Light {
    /// Creates a light, deriving the point falloff distance from the
    /// intensity
    pub fn new(mut properties: LightProperties) -> Self {
        if let LightKind::Point { distance } = &mut properties.kind {
            *distance = falloff_distance(properties.intensity);
        }
        Self {
            properties,
            transform: Transform::new(),
        }
    }

    pub fn properties(&self) -> &LightProperties {
        &self.properties
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    pub fn transform_mut(&mut self) -> &mut Transform {
        &mut self.transform
    }

    /// The falloff distance bounding this light's shadow frustum
    pub fn falloff_distance(&self) -> f32 {
        match self.properties.kind {
            LightKind::Point { distance } => distance,
            LightKind::Spot { distance, .. } => distance,
            LightKind::Directional => 0.0,
        }
    }

    /// View matrix for one shadow-cube face (0..6: +X, -X, +Y, -Y, +Z, -Z)
    pub fn view_matrix(&self, face: usize) -> Matrix4<f32> {
        math::look_to_lh(
            self.transform.translation(),
            FACE_DIRECTIONS[face],
            FACE_UPS[face],
        )
    }

    /// Projection matrix for one shadow-cube face
    ///
    /// 90 degree field of view at aspect 1 so the six frusta tile the full
    /// sphere; far plane is the falloff distance.
    pub fn projection_matrix(&self, _face: usize) -> Matrix4<f32> {
        math::perspective_fov_lh(
            Rad(std::f32::consts::FRAC_PI_2),
            1.0,
            0.001,
            self.falloff_distance(),
        )
    }
}

/// Solves the attenuation quadratic for the distance at which the
/// attenuated intensity reaches the cutoff threshold
///
/// Picks the positive root and clamps to non-negative, so any positive
/// intensity yields a usable far plane.
pub fn falloff_distance(intensity: f32) -> f32 {
    let c_term = FALLOFF_C - intensity / FALLOFF_THRESHOLD;
    let determinant = (FALLOFF_LIN * FALLOFF_LIN - 4.0 * FALLOFF_SQ * c_term).sqrt();
    let x1 = (-FALLOFF_LIN + determinant) / (2.0 * FALLOFF_SQ);
    let x2 = (-FALLOFF_LIN - determinant) / (2.0 * FALLOFF_SQ);

    let root = if x1 < 0.0 { x2 } else { x1 };
    root.max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{InnerSpace, Matrix};

    #[test]
    fn test_falloff_distance_is_non_negative() {
        for intensity in [0.001, 0.01, 0.5, 1.0, 10.0, 1000.0] {
            let distance = falloff_distance(intensity);
            assert!(
                distance >= 0.0,
                "intensity {} gave negative falloff {}",
                intensity,
                distance
            );
        }
    }

    #[test]
    fn test_falloff_distance_grows_with_intensity() {
        assert!(falloff_distance(10.0) > falloff_distance(1.0));
    }

    #[test]
    fn test_point_light_derives_distance_from_intensity() {
        let light = Light::new(LightProperties {
            intensity: 2.0,
            ..Default::default()
        });
        assert!((light.falloff_distance() - falloff_distance(2.0)).abs() < 1e-6);
    }

    #[test]
    fn test_face_views_translate_light_to_origin() {
        let mut light = Light::new(LightProperties::default());
        light.transform_mut().set_translation(3.0, 4.0, -5.0);

        for face in 0..SHADOW_CUBE_FACES {
            let view = light.view_matrix(face);
            // Row-vector multiply of the light position through the view.
            let out = view.transpose() * Vector4::new(3.0, 4.0, -5.0, 1.0);
            assert!(
                out.truncate().magnitude() < 1e-4,
                "face {} view does not center the light",
                face
            );
        }
    }

    #[test]
    fn test_face_directions_cover_all_axes() {
        for face in 0..SHADOW_CUBE_FACES {
            assert!((FACE_DIRECTIONS[face].magnitude() - 1.0).abs() < 1e-6);
            // Up must never be parallel to the look direction.
            assert!(FACE_DIRECTIONS[face].cross(FACE_UPS[face]).magnitude() > 0.9);
        }
    }

    #[test]
    fn test_projection_far_plane_is_falloff_distance() {
        let light = Light::new(LightProperties::default());
        let far = light.falloff_distance();
        let projection = light.projection_matrix(0);

        // A point at the far plane along +z must land at depth 1.
        let out = projection.transpose() * Vector4::new(0.0, 0.0, far, 1.0);
        assert!((out.z / out.w - 1.0).abs() < 1e-4);
    }
}
