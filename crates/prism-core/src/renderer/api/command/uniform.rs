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

//! Values carried by `SetRootUniforms`.

use crate::math::Mat4;

/// A uniform value. Whether it is a scalar or an array is part of the value
/// itself; the upload handler checks it against the reflected uniform.
#[derive(Debug, Clone, PartialEq)]
pub enum UniformValue {
    /// A single float.
    Float(f32),
    /// A single integer.
    Int(i32),
    /// A single boolean.
    Bool(bool),
    /// A flat array of floats (vectors, matrices, arrays).
    Floats(Vec<f32>),
    /// A flat array of integers.
    Ints(Vec<i32>),
    /// A flat array of booleans.
    Bools(Vec<bool>),
}

impl UniformValue {
    /// A short name of the value's shape, used in diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            UniformValue::Float(_) => "float",
            UniformValue::Int(_) => "int",
            UniformValue::Bool(_) => "bool",
            UniformValue::Floats(_) => "float array",
            UniformValue::Ints(_) => "int array",
            UniformValue::Bools(_) => "bool array",
        }
    }

    /// Number of scalars held.
    pub fn len(&self) -> usize {
        match self {
            UniformValue::Float(_) | UniformValue::Int(_) | UniformValue::Bool(_) => 1,
            UniformValue::Floats(v) => v.len(),
            UniformValue::Ints(v) => v.len(),
            UniformValue::Bools(v) => v.len(),
        }
    }

    /// Returns `true` for an empty array.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns `true` for single scalars, `false` for arrays (even of length 1).
    pub fn is_scalar(&self) -> bool {
        matches!(
            self,
            UniformValue::Float(_) | UniformValue::Int(_) | UniformValue::Bool(_)
        )
    }
}

impl From<f32> for UniformValue {
    fn from(v: f32) -> Self {
        UniformValue::Float(v)
    }
}

impl From<i32> for UniformValue {
    fn from(v: i32) -> Self {
        UniformValue::Int(v)
    }
}

impl From<bool> for UniformValue {
    fn from(v: bool) -> Self {
        UniformValue::Bool(v)
    }
}

impl From<Vec<f32>> for UniformValue {
    fn from(v: Vec<f32>) -> Self {
        UniformValue::Floats(v)
    }
}

impl<const N: usize> From<[f32; N]> for UniformValue {
    fn from(v: [f32; N]) -> Self {
        UniformValue::Floats(v.to_vec())
    }
}

impl From<Vec<i32>> for UniformValue {
    fn from(v: Vec<i32>) -> Self {
        UniformValue::Ints(v)
    }
}

impl From<Mat4> for UniformValue {
    fn from(m: Mat4) -> Self {
        UniformValue::Floats(m.to_cols_array().to_vec())
    }
}

impl From<&Mat4> for UniformValue {
    fn from(m: &Mat4) -> Self {
        UniformValue::from(*m)
    }
}
