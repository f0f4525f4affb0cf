//! Row-vector matrix constructors
//!
//! The whole engine composes matrices in row-vector convention: a point is
//! transformed as `v * M`, a local matrix is `Scale * Rotation * Translation`
//! and a composed world matrix is `local * parent`. The shaders multiply the
//! same way (`pos * world * view * projection`), so matrices are uploaded
//! without transposition.
//!
//! `cgmath::Matrix4` is used purely as 4x4 storage here; the constructors
//! below lay the entries out row-vector style (translation in the fourth
//! row, left-handed view/projection with depth mapped to 0..1, which is what
//! wgpu consumes natively). `Matrix4::new` takes column-major arguments, so
//! each source line in a constructor is one column of the matrix.

use cgmath::{InnerSpace, Matrix4, Rad, Vector3};

/// Translation matrix (offsets in the fourth row)
pub fn translation(t: Vector3<f32>) -> Matrix4<f32> {
    #[rustfmt::skip]
    let m = Matrix4::new(
        1.0, 0.0, 0.0, t.x,
        0.0, 1.0, 0.0, t.y,
        0.0, 0.0, 1.0, t.z,
        0.0, 0.0, 0.0, 1.0,
    );
    m
}

/// Non-uniform scaling matrix
pub fn scaling(s: Vector3<f32>) -> Matrix4<f32> {
    #[rustfmt::skip]
    let m = Matrix4::new(
        s.x, 0.0, 0.0, 0.0,
        0.0, s.y, 0.0, 0.0,
        0.0, 0.0, s.z, 0.0,
        0.0, 0.0, 0.0, 1.0,
    );
    m
}

/// Rotation around the x axis
pub fn rotation_x(angle: Rad<f32>) -> Matrix4<f32> {
    let (s, c) = angle.0.sin_cos();
    #[rustfmt::skip]
    let m = Matrix4::new(
        1.0, 0.0, 0.0, 0.0,
        0.0,   c,  -s, 0.0,
        0.0,   s,   c, 0.0,
        0.0, 0.0, 0.0, 1.0,
    );
    m
}

/// Rotation around the y axis
pub fn rotation_y(angle: Rad<f32>) -> Matrix4<f32> {
    let (s, c) = angle.0.sin_cos();
    #[rustfmt::skip]
    let m = Matrix4::new(
          c, 0.0,   s, 0.0,
        0.0, 1.0, 0.0, 0.0,
         -s, 0.0,   c, 0.0,
        0.0, 0.0, 0.0, 1.0,
    );
    m
}

/// Rotation around the z axis
pub fn rotation_z(angle: Rad<f32>) -> Matrix4<f32> {
    let (s, c) = angle.0.sin_cos();
    #[rustfmt::skip]
    let m = Matrix4::new(
          c,  -s, 0.0, 0.0,
          s,   c, 0.0, 0.0,
        0.0, 0.0, 1.0, 0.0,
        0.0, 0.0, 0.0, 1.0,
    );
    m
}

/// Rotation around an arbitrary axis (Rodrigues form, row-vector layout)
pub fn rotation_axis(axis: Vector3<f32>, angle: Rad<f32>) -> Matrix4<f32> {
    let a = axis.normalize();
    let (s, c) = angle.0.sin_cos();
    let t = 1.0 - c;
    #[rustfmt::skip]
    let m = Matrix4::new(
        t * a.x * a.x + c,       t * a.x * a.y - s * a.z, t * a.x * a.z + s * a.y, 0.0,
        t * a.x * a.y + s * a.z, t * a.y * a.y + c,       t * a.y * a.z - s * a.x, 0.0,
        t * a.x * a.z - s * a.y, t * a.y * a.z + s * a.x, t * a.z * a.z + c,       0.0,
        0.0,                     0.0,                     0.0,                     1.0,
    );
    m
}

/// Left-handed view matrix looking along `direction` from `eye`
pub fn look_to_lh(
    eye: Vector3<f32>,
    direction: Vector3<f32>,
    up: Vector3<f32>,
) -> Matrix4<f32> {
    let z = direction.normalize();
    let x = up.cross(z).normalize();
    let y = z.cross(x);
    #[rustfmt::skip]
    let m = Matrix4::new(
        x.x, x.y, x.z, -x.dot(eye),
        y.x, y.y, y.z, -y.dot(eye),
        z.x, z.y, z.z, -z.dot(eye),
        0.0, 0.0, 0.0, 1.0,
    );
    m
}

/// Left-handed perspective projection mapping depth to 0..1
pub fn perspective_fov_lh(
    fov_y: Rad<f32>,
    aspect: f32,
    near: f32,
    far: f32,
) -> Matrix4<f32> {
    let h = 1.0 / (fov_y.0 * 0.5).tan();
    let w = h / aspect;
    let range = far / (far - near);
    #[rustfmt::skip]
    let m = Matrix4::new(
        w,   0.0, 0.0,   0.0,
        0.0, h,   0.0,   0.0,
        0.0, 0.0, range, -near * range,
        0.0, 0.0, 1.0,   0.0,
    );
    m
}

/// Flattens a matrix for uniform upload
pub fn matrix_to_array(matrix: Matrix4<f32>) -> [[f32; 4]; 4] {
    matrix.into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{Deg, Matrix, Vector4};

    fn transform_point(v: Vector3<f32>, m: Matrix4<f32>) -> Vector3<f32> {
        // Row-vector multiply: v * M
        let v = Vector4::new(v.x, v.y, v.z, 1.0);
        let out = m.transpose() * v;
        Vector3::new(out.x, out.y, out.z) / out.w
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
    fn test_translation_offsets_points() {
        let m = translation(Vector3::new(1.0, 2.0, 3.0));
        assert_vec3_eq(
            transform_point(Vector3::new(0.0, 0.0, 0.0), m),
            Vector3::new(1.0, 2.0, 3.0),
        );
    }

    #[test]
    fn test_rotation_y_turns_x_toward_negative_z() {
        // Left-handed: +90 degrees around y sends +x to -z.
        let m = rotation_y(Deg(90.0).into());
        assert_vec3_eq(
            transform_point(Vector3::new(1.0, 0.0, 0.0), m),
            Vector3::new(0.0, 0.0, -1.0),
        );
    }

    #[test]
    fn test_rotation_axis_matches_principal_axis() {
        let general = rotation_axis(Vector3::new(0.0, 1.0, 0.0), Deg(37.0).into());
        let principal = rotation_y(Deg(37.0).into());
        let diff = general - principal;
        for c in 0..4 {
            for r in 0..4 {
                assert!(diff[c][r].abs() < 1e-6);
            }
        }
    }

    #[test]
    fn test_look_to_moves_eye_to_origin() {
        let eye = Vector3::new(3.0, -2.0, 7.5);
        let view = look_to_lh(eye, Vector3::new(0.0, 0.0, 1.0), Vector3::new(0.0, 1.0, 0.0));
        assert_vec3_eq(transform_point(eye, view), Vector3::new(0.0, 0.0, 0.0));
    }

    #[test]
    fn test_perspective_maps_near_and_far_to_unit_depth() {
        let proj = perspective_fov_lh(Deg(90.0).into(), 1.0, 0.1, 100.0);
        let near = transform_point(Vector3::new(0.0, 0.0, 0.1), proj);
        let far = transform_point(Vector3::new(0.0, 0.0, 100.0), proj);
        assert!(near.z.abs() < 1e-5);
        assert!((far.z - 1.0).abs() < 1e-5);
    }
}
