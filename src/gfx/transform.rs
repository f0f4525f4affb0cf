//! Hierarchical scale/rotate/translate transform
//!
//! Every entity that exists in the world (meshes, lights, the camera) embeds
//! a [`Transform`]. Mutations go through setters and accumulators; each one
//! recomputes the cached local matrix as `Scale * Rotation * Translation`
//! and refreshes the direction/up/right basis vectors from the rotation's
//! rows. Composition with a parent happens once per frame during the scene
//! update walk via [`Transform::world_matrix`]; afterwards the composed
//! world matrix is an O(1) read.
//!
//! Rotation is stored as a matrix, not a quaternion. `set_rotation` composes
//! Y-then-X-then-Z; this ordering is part of the engine's Euler semantics
//! and must not change.

use cgmath::{Deg, InnerSpace, Matrix, Matrix4, SquareMatrix, Vector3};

use crate::gfx::math;

/// Scale, rotation and translation with cached local and composed matrices
///
/// All angles entering the API are in degrees.
#[derive(Debug, Clone)]
pub struct Transform {
    scale: Vector3<f32>,
    rotation: Matrix4<f32>,
    translation: Vector3<f32>,

    direction: Vector3<f32>,
    up: Vector3<f32>,
    right: Vector3<f32>,

    local: Matrix4<f32>,
    composed: Matrix4<f32>,
}

impl Default for Transform {
    fn default() -> Self {
        Self::new()
    }
}

impl Transform {
    /// Creates an identity transform
    ///
    /// Direction is +z, up is +y, right is +x.
    pub fn new() -> Self {
        Self {
            scale: Vector3::new(1.0, 1.0, 1.0),
            rotation: Matrix4::identity(),
            translation: Vector3::new(0.0, 0.0, 0.0),
            direction: Vector3::new(0.0, 0.0, 1.0),
            up: Vector3::new(0.0, 1.0, 0.0),
            right: Vector3::new(1.0, 0.0, 0.0),
            local: Matrix4::identity(),
            composed: Matrix4::identity(),
        }
    }

    pub fn direction(&self) -> Vector3<f32> {
        self.direction
    }

    pub fn up(&self) -> Vector3<f32> {
        self.up
    }

    pub fn right(&self) -> Vector3<f32> {
        self.right
    }

    // --- scale ---

    pub fn set_scale_x(&mut self, factor: f32) {
        self.scale.x = factor;
        self.invalidate();
    }

    pub fn set_scale_y(&mut self, factor: f32) {
        self.scale.y = factor;
        self.invalidate();
    }

    pub fn set_scale_z(&mut self, factor: f32) {
        self.scale.z = factor;
        self.invalidate();
    }

    pub fn set_scale(&mut self, x: f32, y: f32, z: f32) {
        self.scale = Vector3::new(x, y, z);
        self.invalidate();
    }

    pub fn scale(&self) -> Vector3<f32> {
        self.scale
    }

    // --- rotation ---

    /// Accumulates a rotation of `angle` degrees around an arbitrary axis
    pub fn rotate_around_axis_by(&mut self, axis: Vector3<f32>, angle: f32) {
        self.rotation = self.rotation * math::rotation_axis(axis, Deg(angle).into());
        self.invalidate();
    }

    pub fn rotate_x_by(&mut self, angle: f32) {
        self.rotate_around_axis_by(Vector3::new(1.0, 0.0, 0.0), angle);
    }

    pub fn rotate_y_by(&mut self, angle: f32) {
        self.rotate_around_axis_by(Vector3::new(0.0, 1.0, 0.0), angle);
    }

    pub fn rotate_z_by(&mut self, angle: f32) {
        self.rotate_around_axis_by(Vector3::new(0.0, 0.0, 1.0), angle);
    }

    /// Rotates around the transform's own direction axis
    pub fn roll_by(&mut self, angle: f32) {
        let axis = self.direction;
        self.rotate_around_axis_by(axis, angle);
    }

    /// Rotates around the transform's own right axis
    pub fn pitch_by(&mut self, angle: f32) {
        let axis = self.right;
        self.rotate_around_axis_by(axis, angle);
    }

    /// Rotates around the transform's own up axis
    pub fn yaw_by(&mut self, angle: f32) {
        let axis = self.up;
        self.rotate_around_axis_by(axis, angle);
    }

    pub fn set_rotation_x(&mut self, angle: f32) {
        self.set_rotation(angle, 0.0, 0.0);
    }

    pub fn set_rotation_y(&mut self, angle: f32) {
        self.set_rotation(0.0, angle, 0.0);
    }

    pub fn set_rotation_z(&mut self, angle: f32) {
        self.set_rotation(0.0, 0.0, angle);
    }

    /// Replaces the rotation with Euler angles in degrees
    ///
    /// Composed Y-then-X-then-Z: `R = Ry * Rx * Rz`.
    pub fn set_rotation(&mut self, x: f32, y: f32, z: f32) {
        self.rotation = math::rotation_y(Deg(y).into())
            * math::rotation_x(Deg(x).into())
            * math::rotation_z(Deg(z).into());
        self.invalidate();
    }

    /// Recovers the Euler angles (degrees) from the rotation matrix
    ///
    /// Inverts the `Ry * Rx * Rz` composition of [`Transform::set_rotation`];
    /// angles accumulated through the `rotate_*_by` family are folded into
    /// the same representation.
    pub fn rotation_euler(&self) -> Vector3<f32> {
        let m = &self.rotation;
        // Entry (row r, col c) of the row-vector matrix lives at m[c][r].
        let m10 = m[0][1];
        let m11 = m[1][1];
        let m12 = m[2][1];
        let m02 = m[2][0];
        let m22 = m[2][2];

        let x = m12.atan2((m10 * m10 + m11 * m11).sqrt());
        let y = (-m02).atan2(m22);
        let z = (-m10).atan2(m11);

        Vector3::new(x.to_degrees(), y.to_degrees(), z.to_degrees())
    }

    // --- translation ---

    pub fn translate_x_by(&mut self, offset: f32) {
        self.translation.x += offset;
        self.invalidate();
    }

    pub fn translate_y_by(&mut self, offset: f32) {
        self.translation.y += offset;
        self.invalidate();
    }

    pub fn translate_z_by(&mut self, offset: f32) {
        self.translation.z += offset;
        self.invalidate();
    }

    /// Moves along the rotated direction axis
    pub fn translate_directional_by(&mut self, offset: f32) {
        self.translation += self.direction * offset;
        self.invalidate();
    }

    /// Moves along the rotated up axis
    pub fn translate_vertical_by(&mut self, offset: f32) {
        self.translation += self.up * offset;
        self.invalidate();
    }

    /// Moves along the rotated right axis
    pub fn translate_lateral_by(&mut self, offset: f32) {
        self.translation += self.right * offset;
        self.invalidate();
    }

    pub fn set_translation_x(&mut self, offset: f32) {
        self.translation.x = offset;
        self.invalidate();
    }

    pub fn set_translation_y(&mut self, offset: f32) {
        self.translation.y = offset;
        self.invalidate();
    }

    pub fn set_translation_z(&mut self, offset: f32) {
        self.translation.z = offset;
        self.invalidate();
    }

    pub fn set_translation(&mut self, x: f32, y: f32, z: f32) {
        self.translation = Vector3::new(x, y, z);
        self.invalidate();
    }

    pub fn translation(&self) -> Vector3<f32> {
        self.translation
    }

    // --- composition ---

    /// Composes the local matrix with the parent's world matrix
    ///
    /// Caches and returns `local * parent`. Called once per node during the
    /// scene update walk; the cached value then feeds the render walk.
    pub fn world_matrix(&mut self, parent: Matrix4<f32>) -> Matrix4<f32> {
        self.composed = self.local * parent;
        self.composed
    }

    /// The composed world matrix from the last [`Transform::world_matrix`]
    /// call. O(1), never recomputes.
    pub fn composed_world_matrix(&self) -> Matrix4<f32> {
        self.composed
    }

    /// Recomputes the local matrix and the rotated basis vectors
    fn invalidate(&mut self) {
        let s = math::scaling(self.scale);
        let r = self.rotation;
        let t = math::translation(self.translation);

        self.local = (s * r) * t;

        self.right = r.row(0).truncate().normalize();
        self.up = r.row(1).truncate().normalize();
        self.direction = r.row(2).truncate().normalize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_mat4_eq(a: Matrix4<f32>, b: Matrix4<f32>) {
        for c in 0..4 {
            for r in 0..4 {
                assert!(
                    (a[c][r] - b[c][r]).abs() < 1e-5,
                    "mismatch at [{}][{}]: {} vs {}",
                    c,
                    r,
                    a[c][r],
                    b[c][r]
                );
            }
        }
    }

    fn assert_vec3_eq(a: Vector3<f32>, b: Vector3<f32>) {
        assert!(
            (a - b).magnitude() < 1e-5,
            "expected {:?}, got {:?}",
            b,
            a
        );
    }

    #[test]
    fn test_composed_equals_srt_times_parent() {
        let mut transform = Transform::new();
        transform.set_scale(2.0, 1.0, 3.0);
        transform.set_rotation(10.0, 20.0, 30.0);
        transform.set_translation(4.0, -5.0, 6.0);

        let mut parent_source = Transform::new();
        parent_source.set_rotation_y(45.0);
        parent_source.translate_x_by(7.0);
        let parent = parent_source.world_matrix(Matrix4::identity());

        let composed = transform.world_matrix(parent);

        let s = math::scaling(Vector3::new(2.0, 1.0, 3.0));
        let r = math::rotation_y(Deg(20.0).into())
            * math::rotation_x(Deg(10.0).into())
            * math::rotation_z(Deg(30.0).into());
        let t = math::translation(Vector3::new(4.0, -5.0, 6.0));
        assert_mat4_eq(composed, ((s * r) * t) * parent);
        assert_mat4_eq(transform.composed_world_matrix(), composed);
    }

    #[test]
    fn test_rotation_reset_restores_identity_basis() {
        let mut transform = Transform::new();
        transform.rotate_x_by(35.0);
        transform.yaw_by(120.0);
        transform.roll_by(-15.0);

        transform.set_rotation(0.0, 0.0, 0.0);

        assert_vec3_eq(transform.direction(), Vector3::new(0.0, 0.0, 1.0));
        assert_vec3_eq(transform.up(), Vector3::new(0.0, 1.0, 0.0));
        assert_vec3_eq(transform.right(), Vector3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_rotation_euler_round_trip() {
        let mut transform = Transform::new();
        transform.set_rotation(25.0, -40.0, 110.0);

        let euler = transform.rotation_euler();
        assert!((euler.x - 25.0).abs() < 1e-3);
        assert!((euler.y + 40.0).abs() < 1e-3);
        assert!((euler.z - 110.0).abs() < 1e-3);
    }

    #[test]
    fn test_directional_translation_follows_rotation() {
        let mut transform = Transform::new();
        // Facing +z, moving forward 5 units lands at z = 5.
        transform.translate_directional_by(5.0);
        assert_vec3_eq(transform.translation(), Vector3::new(0.0, 0.0, 5.0));

        // Turned 90 degrees around y the direction axis becomes +x, so
        // forward motion now accumulates along +x.
        let mut turned = Transform::new();
        turned.set_rotation_y(90.0);
        turned.translate_directional_by(5.0);
        assert_vec3_eq(turned.translation(), Vector3::new(5.0, 0.0, 0.0));
    }

    #[test]
    fn test_world_matrix_with_identity_parent_is_local() {
        let mut transform = Transform::new();
        transform.set_translation(1.0, 2.0, 3.0);

        let world = transform.world_matrix(Matrix4::identity());
        assert_mat4_eq(world, math::translation(Vector3::new(1.0, 2.0, 3.0)));
    }
}
