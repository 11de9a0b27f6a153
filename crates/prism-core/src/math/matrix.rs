// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Defines the `Mat3` and `Mat4` types and associated operations.

use super::Vec3;
use std::ops::Mul;

// --- Mat3 ---

/// A 3x3 column-major matrix, used here for rotations of positions.
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
#[repr(C)]
pub struct Mat3 {
    /// The columns of the matrix. `cols[0]` is the first column, and so on.
    pub cols: [Vec3; 3],
}

impl Mat3 {
    /// The 3x3 identity matrix.
    pub const IDENTITY: Self = Self {
        cols: [Vec3::X, Vec3::Y, Vec3::Z],
    };

    /// Creates a rotation matrix from an axis and an angle.
    ///
    /// # Arguments
    ///
    /// * `axis`: The axis of rotation. It is normalized internally.
    /// * `angle_radians`: The angle of rotation in radians, counter-clockwise
    ///   when looking down the axis towards the origin.
    pub fn from_axis_angle(axis: Vec3, angle_radians: f32) -> Self {
        let Vec3 { x, y, z } = axis.normalize();
        let (s, c) = angle_radians.sin_cos();
        let t = 1.0 - c;

        Self {
            cols: [
                Vec3::new(t * x * x + c, t * x * y + s * z, t * x * z - s * y),
                Vec3::new(t * x * y - s * z, t * y * y + c, t * y * z + s * x),
                Vec3::new(t * x * z + s * y, t * y * z - s * x, t * z * z + c),
            ],
        }
    }
}

impl Mul<Vec3> for Mat3 {
    type Output = Vec3;

    fn mul(self, v: Vec3) -> Vec3 {
        self.cols[0] * v.x + self.cols[1] * v.y + self.cols[2] * v.z
    }
}

// --- Mat4 ---

/// A 4x4 column-major matrix stored as 16 contiguous floats.
///
/// The storage order is exactly what `uniformMatrix4fv` expects with
/// `transpose = false`, so [`Mat4::to_cols_array`] can be uploaded as is.
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
#[repr(C)]
pub struct Mat4 {
    m: [f32; 16],
}

impl Default for Mat4 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mat4 {
    /// The 4x4 identity matrix.
    pub const IDENTITY: Self = Self {
        m: [
            1.0, 0.0, 0.0, 0.0, //
            0.0, 1.0, 0.0, 0.0, //
            0.0, 0.0, 1.0, 0.0, //
            0.0, 0.0, 0.0, 1.0,
        ],
    };

    /// Creates a matrix from 16 floats in column-major order.
    #[inline]
    pub const fn from_cols_array(m: [f32; 16]) -> Self {
        Self { m }
    }

    /// Returns the 16 floats in column-major order.
    #[inline]
    pub const fn to_cols_array(&self) -> [f32; 16] {
        self.m
    }

    /// Returns the element at `row`, `col`.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f32 {
        self.m[col * 4 + row]
    }

    /// Creates a translation matrix.
    pub fn from_translation(t: Vec3) -> Self {
        let mut m = Self::IDENTITY.m;
        m[12] = t.x;
        m[13] = t.y;
        m[14] = t.z;
        Self { m }
    }

    /// Creates a non-uniform scale matrix.
    pub fn from_scale(s: Vec3) -> Self {
        let mut m = Self::IDENTITY.m;
        m[0] = s.x;
        m[5] = s.y;
        m[10] = s.z;
        Self { m }
    }

    /// Creates a right-handed perspective projection with an OpenGL clip
    /// range: view-space `z = -near` maps to NDC `-1`, `z = -far` to `+1`.
    ///
    /// # Arguments
    ///
    /// * `fov_y_radians`: The vertical field of view.
    /// * `aspect_ratio`: Width divided by height.
    /// * `z_near`, `z_far`: Distances to the clipping planes, both positive.
    pub fn perspective_rh_gl(fov_y_radians: f32, aspect_ratio: f32, z_near: f32, z_far: f32) -> Self {
        let f = 1.0 / (fov_y_radians * 0.5).tan();
        let range_inv = 1.0 / (z_near - z_far);

        let mut m = [0.0; 16];
        m[0] = f / aspect_ratio;
        m[5] = f;
        m[10] = (z_near + z_far) * range_inv;
        m[11] = -1.0;
        m[14] = 2.0 * z_near * z_far * range_inv;
        Self { m }
    }

    /// Creates a right-handed view matrix looking from `eye` towards `target`.
    pub fn look_at_rh(eye: Vec3, target: Vec3, up: Vec3) -> Self {
        let f = (target - eye).normalize();
        let s = f.cross(up).normalize();
        let u = s.cross(f);

        Self {
            m: [
                s.x,
                u.x,
                -f.x,
                0.0,
                s.y,
                u.y,
                -f.y,
                0.0,
                s.z,
                u.z,
                -f.z,
                0.0,
                -s.dot(eye),
                -u.dot(eye),
                f.dot(eye),
                1.0,
            ],
        }
    }

    /// Transforms a point (implicit `w = 1`), applying the perspective divide.
    pub fn transform_point(&self, p: Vec3) -> Vec3 {
        let m = &self.m;
        let x = m[0] * p.x + m[4] * p.y + m[8] * p.z + m[12];
        let y = m[1] * p.x + m[5] * p.y + m[9] * p.z + m[13];
        let z = m[2] * p.x + m[6] * p.y + m[10] * p.z + m[14];
        let w = m[3] * p.x + m[7] * p.y + m[11] * p.z + m[15];
        if w != 0.0 && w != 1.0 {
            Vec3::new(x / w, y / w, z / w)
        } else {
            Vec3::new(x, y, z)
        }
    }
}

impl Mul for Mat4 {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        let mut out = [0.0; 16];
        for col in 0..4 {
            for row in 0..4 {
                out[col * 4 + row] = (0..4)
                    .map(|k| self.m[k * 4 + row] * rhs.m[col * 4 + k])
                    .sum();
            }
        }
        Self { m: out }
    }
}
