//! Row-major 4x4 matrices with OpenGL-style conventions.
//!
//! `data[row][col]`; vectors are columns and multiply from the right, so a
//! translation lives in the last column. Everything is `Copy`, so every
//! operation can take its own output as input (`m = m * t`).

use std::ops::{Mul, MulAssign};

use glam::{Vec3, Vec4};

use crate::error::{CoreError, CoreResult};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Mat4 {
    pub data: [[f32; 4]; 4],
}

impl Mat4 {
    pub const IDENTITY: Self = Self::from_rows([
        [1.0, 0.0, 0.0, 0.0],
        [0.0, 1.0, 0.0, 0.0],
        [0.0, 0.0, 1.0, 0.0],
        [0.0, 0.0, 0.0, 1.0],
    ]);

    #[inline]
    pub const fn from_rows(data: [[f32; 4]; 4]) -> Self {
        Self { data }
    }

    #[inline]
    pub const fn identity() -> Self {
        Self::IDENTITY
    }

    #[rustfmt::skip]
    pub fn scale(sx: f32, sy: f32, sz: f32) -> Self {
        Self::from_rows([
            [sx, 0.0, 0.0, 0.0],
            [0.0, sy, 0.0, 0.0],
            [0.0, 0.0, sz, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    #[rustfmt::skip]
    pub fn translation(dx: f32, dy: f32, dz: f32) -> Self {
        Self::from_rows([
            [1.0, 0.0, 0.0, dx],
            [0.0, 1.0, 0.0, dy],
            [0.0, 0.0, 1.0, dz],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    #[rustfmt::skip]
    pub fn rotation_x(angle: f32) -> Self {
        let (sin, cos) = angle.sin_cos();
        Self::from_rows([
            [1.0, 0.0, 0.0, 0.0],
            [0.0, cos, -sin, 0.0],
            [0.0, sin, cos, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    #[rustfmt::skip]
    pub fn rotation_y(angle: f32) -> Self {
        let (sin, cos) = angle.sin_cos();
        Self::from_rows([
            [cos, 0.0, sin, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [-sin, 0.0, cos, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    #[rustfmt::skip]
    pub fn rotation_z(angle: f32) -> Self {
        let (sin, cos) = angle.sin_cos();
        Self::from_rows([
            [cos, -sin, 0.0, 0.0],
            [sin, cos, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    /// Off-center perspective frustum (same entries as `glFrustum`).
    ///
    /// The caller must pass `l != r`, `b != t` and `n != f`; degenerate bounds
    /// produce infinities.
    #[rustfmt::skip]
    pub fn perspective(l: f32, r: f32, b: f32, t: f32, n: f32, f: f32) -> Self {
        Self::from_rows([
            [2.0 * n / (r - l), 0.0, (r + l) / (r - l), 0.0],
            [0.0, 2.0 * n / (t - b), (t + b) / (t - b), 0.0],
            [0.0, 0.0, -(f + n) / (f - n), -2.0 * f * n / (f - n)],
            [0.0, 0.0, -1.0, 0.0],
        ])
    }

    /// Row-by-column product `self * rhs`.
    pub fn multiply(&self, rhs: &Self) -> Self {
        let mut out = [[0.0; 4]; 4];
        for (i, row) in out.iter_mut().enumerate() {
            for (j, cell) in row.iter_mut().enumerate() {
                *cell = (0..4).map(|k| self.data[i][k] * rhs.data[k][j]).sum();
            }
        }
        Self::from_rows(out)
    }

    pub fn transpose(&self) -> Self {
        let mut out = [[0.0; 4]; 4];
        for (i, row) in self.data.iter().enumerate() {
            for (j, value) in row.iter().enumerate() {
                out[j][i] = *value;
            }
        }
        Self::from_rows(out)
    }

    /// Inverse via the adjugate divided by the determinant.
    ///
    /// Returns `None` when the determinant is exactly zero.
    pub fn try_inverse(&self) -> Option<Self> {
        let m = self.to_flat();
        let mut inv = [0.0f32; 16];

        inv[0] = m[5] * m[10] * m[15] - m[5] * m[11] * m[14] - m[9] * m[6] * m[15]
            + m[9] * m[7] * m[14]
            + m[13] * m[6] * m[11]
            - m[13] * m[7] * m[10];
        inv[1] = -m[1] * m[10] * m[15] + m[1] * m[11] * m[14] + m[9] * m[2] * m[15]
            - m[9] * m[3] * m[14]
            - m[13] * m[2] * m[11]
            + m[13] * m[3] * m[10];
        inv[2] = m[1] * m[6] * m[15] - m[1] * m[7] * m[14] - m[5] * m[2] * m[15]
            + m[5] * m[3] * m[14]
            + m[13] * m[2] * m[7]
            - m[13] * m[3] * m[6];
        inv[3] = -m[1] * m[6] * m[11] + m[1] * m[7] * m[10] + m[5] * m[2] * m[11]
            - m[5] * m[3] * m[10]
            - m[9] * m[2] * m[7]
            + m[9] * m[3] * m[6];
        inv[4] = -m[4] * m[10] * m[15] + m[4] * m[11] * m[14] + m[8] * m[6] * m[15]
            - m[8] * m[7] * m[14]
            - m[12] * m[6] * m[11]
            + m[12] * m[7] * m[10];
        inv[5] = m[0] * m[10] * m[15] - m[0] * m[11] * m[14] - m[8] * m[2] * m[15]
            + m[8] * m[3] * m[14]
            + m[12] * m[2] * m[11]
            - m[12] * m[3] * m[10];
        inv[6] = -m[0] * m[6] * m[15] + m[0] * m[7] * m[14] + m[4] * m[2] * m[15]
            - m[4] * m[3] * m[14]
            - m[12] * m[2] * m[7]
            + m[12] * m[3] * m[6];
        inv[7] = m[0] * m[6] * m[11] - m[0] * m[7] * m[10] - m[4] * m[2] * m[11]
            + m[4] * m[3] * m[10]
            + m[8] * m[2] * m[7]
            - m[8] * m[3] * m[6];
        inv[8] = m[4] * m[9] * m[15] - m[4] * m[11] * m[13] - m[8] * m[5] * m[15]
            + m[8] * m[7] * m[13]
            + m[12] * m[5] * m[11]
            - m[12] * m[7] * m[9];
        inv[9] = -m[0] * m[9] * m[15] + m[0] * m[11] * m[13] + m[8] * m[1] * m[15]
            - m[8] * m[3] * m[13]
            - m[12] * m[1] * m[11]
            + m[12] * m[3] * m[9];
        inv[10] = m[0] * m[5] * m[15] - m[0] * m[7] * m[13] - m[4] * m[1] * m[15]
            + m[4] * m[3] * m[13]
            + m[12] * m[1] * m[7]
            - m[12] * m[3] * m[5];
        inv[11] = -m[0] * m[5] * m[11] + m[0] * m[7] * m[9] + m[4] * m[1] * m[11]
            - m[4] * m[3] * m[9]
            - m[8] * m[1] * m[7]
            + m[8] * m[3] * m[5];
        inv[12] = -m[4] * m[9] * m[14] + m[4] * m[10] * m[13] + m[8] * m[5] * m[14]
            - m[8] * m[6] * m[13]
            - m[12] * m[5] * m[10]
            + m[12] * m[6] * m[9];
        inv[13] = m[0] * m[9] * m[14] - m[0] * m[10] * m[13] - m[8] * m[1] * m[14]
            + m[8] * m[2] * m[13]
            + m[12] * m[1] * m[10]
            - m[12] * m[2] * m[9];
        inv[14] = -m[0] * m[5] * m[14] + m[0] * m[6] * m[13] + m[4] * m[1] * m[14]
            - m[4] * m[2] * m[13]
            - m[12] * m[1] * m[6]
            + m[12] * m[2] * m[5];
        inv[15] = m[0] * m[5] * m[10] - m[0] * m[6] * m[9] - m[4] * m[1] * m[10]
            + m[4] * m[2] * m[9]
            + m[8] * m[1] * m[6]
            - m[8] * m[2] * m[5];

        let det = m[0] * inv[0] + m[1] * inv[4] + m[2] * inv[8] + m[3] * inv[12];
        if det == 0.0 {
            return None;
        }

        let inv_det = 1.0 / det;
        Some(Self::from_flat(inv.map(|v| v * inv_det)))
    }

    /// Inverse-transpose, the matrix that carries normals through `self`.
    pub fn normal_matrix(&self) -> CoreResult<Self> {
        self.try_inverse()
            .map(|inv| inv.transpose())
            .ok_or(CoreError::SingularMatrix)
    }

    /// `self * v` for a homogeneous column vector.
    pub fn transform(&self, v: [f32; 4]) -> [f32; 4] {
        let mut out = [0.0; 4];
        for (i, cell) in out.iter_mut().enumerate() {
            *cell = (0..4).map(|k| self.data[i][k] * v[k]).sum();
        }
        out
    }

    /// Transform a point (`w = 1`) and divide by the resulting `w`.
    pub fn project_point3(&self, p: Vec3) -> Vec3 {
        let v = Vec4::from(self.transform(p.extend(1.0).to_array()));
        v.truncate() / v.w
    }

    /// Transform a direction (`w = 0`); translation is ignored.
    pub fn transform_vector3(&self, v: Vec3) -> Vec3 {
        Vec4::from(self.transform(v.extend(0.0).to_array())).truncate()
    }

    /// Column-major layout as expected by GPU uniform blocks.
    #[inline]
    pub fn to_cols_array_2d(&self) -> [[f32; 4]; 4] {
        self.transpose().data
    }

    fn to_flat(self) -> [f32; 16] {
        let mut out = [0.0; 16];
        for (i, row) in self.data.iter().enumerate() {
            out[i * 4..i * 4 + 4].copy_from_slice(row);
        }
        out
    }

    fn from_flat(m: [f32; 16]) -> Self {
        let mut data = [[0.0; 4]; 4];
        for (i, row) in data.iter_mut().enumerate() {
            row.copy_from_slice(&m[i * 4..i * 4 + 4]);
        }
        Self::from_rows(data)
    }
}

impl Default for Mat4 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul for Mat4 {
    type Output = Mat4;

    fn mul(self, rhs: Mat4) -> Mat4 {
        self.multiply(&rhs)
    }
}

impl MulAssign for Mat4 {
    fn mul_assign(&mut self, rhs: Mat4) {
        *self = self.multiply(&rhs);
    }
}

impl From<Mat4> for glam::Mat4 {
    fn from(m: Mat4) -> Self {
        glam::Mat4::from_cols_array_2d(&m.to_cols_array_2d())
    }
}

impl From<glam::Mat4> for Mat4 {
    fn from(m: glam::Mat4) -> Self {
        Mat4::from_rows(m.to_cols_array_2d()).transpose()
    }
}

#[cfg(test)]
#[rustfmt::skip]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    fn assert_mat_eq(is: &Mat4, should: &Mat4, epsilon: f32) {
        for i in 0..4 {
            for j in 0..4 {
                assert_abs_diff_eq!(is.data[i][j], should.data[i][j], epsilon = epsilon);
            }
        }
    }

    fn sample() -> Mat4 {
        Mat4::translation(0.5, -2.0, 3.0)
            * Mat4::rotation_y(0.7)
            * Mat4::rotation_x(-1.3)
            * Mat4::scale(2.0, 0.5, 1.5)
    }

    #[test]
    fn points_and_directions() {
        let m = Mat4::translation(1.0, 2.0, 3.0) * Mat4::scale(2.0, 2.0, 2.0);
        assert_eq!(m.project_point3(Vec3::ONE), Vec3::new(3.0, 4.0, 5.0));
        assert_eq!(m.transform_vector3(Vec3::X), Vec3::new(2.0, 0.0, 0.0));

        let p = Mat4::perspective(-1.0, 1.0, -1.0, 1.0, 1.0, 100.0);
        assert_abs_diff_eq!(p.project_point3(Vec3::new(0.0, 0.0, -1.0)).z, -1.0, epsilon = 1e-5);
    }

    #[test]
    fn perspective_entries() {
        let p = Mat4::perspective(-1.0, 1.0, -1.0, 1.0, 1.0, 100.0);
        let should = Mat4::from_rows([
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, -101.0 / 99.0, -200.0 / 99.0],
            [0.0, 0.0, -1.0, 0.0],
        ]);
        assert_mat_eq(&p, &should, 1e-6);
    }

    #[test]
    fn perspective_maps_near_and_far_planes() {
        let (n, f) = (0.5, 40.0);
        let p = Mat4::perspective(-2.0, 1.0, -0.5, 1.5, n, f);

        let near = p.transform([0.0, 0.0, -n, 1.0]);
        // z_clip = (f+n)/(f-n) * n - 2fn/(f-n) = -n, w_clip = n
        assert_abs_diff_eq!(near[2], n * (f + n) / (f - n) - 2.0 * f * n / (f - n), epsilon = 1e-5);
        assert_abs_diff_eq!(near[2], -n, epsilon = 1e-5);
        assert_abs_diff_eq!(near[3], n, epsilon = 1e-6);
        assert_abs_diff_eq!(near[2] / near[3], -1.0, epsilon = 1e-5);

        let far = p.transform([0.0, 0.0, -f, 1.0]);
        assert_abs_diff_eq!(far[2] / far[3], 1.0, epsilon = 1e-4);
    }

    #[test]
    fn perspective_matches_glam_frustum() {
        let ours: glam::Mat4 = Mat4::perspective(-1.0, 1.0, -1.0, 1.0, 1.0, 100.0).into();
        let reference = glam::Mat4::perspective_rh_gl(90f32.to_radians(), 1.0, 1.0, 100.0);
        for (a, b) in ours.to_cols_array().iter().zip(reference.to_cols_array()) {
            assert_abs_diff_eq!(*a, b, epsilon = 1e-5);
        }
    }

    #[test]
    fn translation_moves_points() {
        let p = Mat4::translation(1.0, 2.0, 3.0).transform([1.0, 1.0, 1.0, 1.0]);
        assert_eq!(p, [2.0, 3.0, 4.0, 1.0]);
    }

    #[test]
    fn rotation_z_quarter_turn() {
        let p = Mat4::rotation_z(std::f32::consts::FRAC_PI_2).transform([1.0, 0.0, 0.0, 1.0]);
        assert_abs_diff_eq!(p[0], 0.0, epsilon = 1e-6);
        assert_abs_diff_eq!(p[1], 1.0, epsilon = 1e-6);
    }

    #[test]
    fn multiply_matches_glam() {
        let a = Mat4::rotation_x(0.3) * Mat4::translation(1.0, 2.0, 3.0);
        let b = Mat4::scale(1.0, 2.0, 3.0) * Mat4::rotation_z(-0.4);
        let ours: glam::Mat4 = (a * b).into();
        let reference = glam::Mat4::from(a) * glam::Mat4::from(b);
        for (x, y) in ours.to_cols_array().iter().zip(reference.to_cols_array()) {
            assert_abs_diff_eq!(*x, y, epsilon = 1e-5);
        }
    }

    #[test]
    fn multiply_in_place() {
        let mut m = Mat4::translation(1.0, 0.0, 0.0);
        let expected = m * m;
        m *= m;
        assert_eq!(m, expected);
        assert_eq!(m.data[0][3], 2.0);
    }

    #[test]
    fn transpose_twice_is_identity_operation() {
        let m = sample();
        assert_eq!(m.transpose().transpose(), m);
        assert_eq!(m.transpose().data[3][0], m.data[0][3]);
    }

    #[test]
    fn inverse_times_matrix_is_identity() {
        for m in [sample(), Mat4::perspective(-1.0, 2.0, -0.5, 1.0, 0.1, 50.0)] {
            let inv = m.try_inverse().expect("matrix is invertible");
            assert_mat_eq(&(inv * m), &Mat4::IDENTITY, 1e-4);
            assert_mat_eq(&(m * inv), &Mat4::IDENTITY, 1e-4);
        }
    }

    #[test]
    fn inverse_of_scale() {
        let inv = Mat4::scale(2.0, 4.0, 0.5).try_inverse().unwrap();
        assert_mat_eq(&inv, &Mat4::scale(0.5, 0.25, 2.0), 1e-6);
    }

    #[test]
    fn inverse_of_singular_matrix_fails() {
        let m = Mat4::from_rows([
            [1.0, 2.0, 3.0, 4.0],
            [1.0, 2.0, 3.0, 4.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ]);
        assert_eq!(m.try_inverse(), None);
        assert_eq!(Mat4::scale(1.0, 0.0, 1.0).normal_matrix(), Err(CoreError::SingularMatrix));
    }

    #[test]
    fn normal_matrix_of_rotation_is_rotation() {
        let r = Mat4::rotation_y(1.1);
        assert_mat_eq(&r.normal_matrix().unwrap(), &r, 1e-6);
    }

    #[test]
    fn glam_round_trip_keeps_layout() {
        let m = sample();
        let g: glam::Mat4 = m.into();
        assert_eq!(g.w_axis.x, m.data[0][3]);
        assert_eq!(Mat4::from(g), m);
    }
}
