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

//! Program reflection data: the attributes and uniforms a linked program
//! actually exposes.

use crate::renderer::api::resource::UniformLocation;
use std::fmt;

/// The declared type of an active attribute or uniform, as reported by the
/// linked program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderDataType {
    /// `float`
    Float,
    /// `vec2`
    FloatVec2,
    /// `vec3`
    FloatVec3,
    /// `vec4`
    FloatVec4,
    /// `int`
    Int,
    /// `ivec2`
    IntVec2,
    /// `ivec3`
    IntVec3,
    /// `ivec4`
    IntVec4,
    /// `bool`
    Bool,
    /// `bvec2`
    BoolVec2,
    /// `bvec3`
    BoolVec3,
    /// `bvec4`
    BoolVec4,
    /// `mat2`
    FloatMat2,
    /// `mat3`
    FloatMat3,
    /// `mat4`
    FloatMat4,
    /// `sampler2D`
    Sampler2D,
    /// `samplerCube`
    SamplerCube,
    /// `uint`
    UnsignedInt,
    /// `uvec2`
    UnsignedIntVec2,
    /// `uvec3`
    UnsignedIntVec3,
    /// `uvec4`
    UnsignedIntVec4,
    /// `mat2x3`
    FloatMat2x3,
    /// `mat3x4`
    FloatMat3x4,
    /// `mat4x3`
    FloatMat4x3,
    /// A type enum the backend reported but this crate does not name.
    Other(u32),
}

/// The scalar type underlying a uniform value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarType {
    /// 32-bit float.
    Float,
    /// 32-bit signed integer.
    Int,
    /// Boolean, uploaded as an integer.
    Bool,
}

/// The upload category of a reflected uniform.
///
/// This is a closed set: every uniform that can be uploaded falls in exactly
/// one kind, and each kind has exactly one upload handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UniformKind {
    /// A single scalar.
    Scalar(ScalarType),
    /// A vector of 2 to 4 scalars.
    Vector(ScalarType, u8),
    /// A square float matrix of dimension 2 to 4.
    Matrix(u8),
    /// A sampler receiving a texture unit index.
    Sampler,
}

impl UniformKind {
    /// Number of scalar components making up one element of this kind.
    pub const fn components(self) -> usize {
        match self {
            UniformKind::Scalar(_) | UniformKind::Sampler => 1,
            UniformKind::Vector(_, n) => n as usize,
            UniformKind::Matrix(n) => (n as usize) * (n as usize),
        }
    }
}

impl ShaderDataType {
    /// Returns the upload kind for this type, or `None` when no upload
    /// handler exists for it.
    pub fn uniform_kind(self) -> Option<UniformKind> {
        use ScalarType as S;
        use ShaderDataType as T;
        Some(match self {
            T::Float => UniformKind::Scalar(S::Float),
            T::FloatVec2 => UniformKind::Vector(S::Float, 2),
            T::FloatVec3 => UniformKind::Vector(S::Float, 3),
            T::FloatVec4 => UniformKind::Vector(S::Float, 4),
            T::Int => UniformKind::Scalar(S::Int),
            T::IntVec2 => UniformKind::Vector(S::Int, 2),
            T::IntVec3 => UniformKind::Vector(S::Int, 3),
            T::IntVec4 => UniformKind::Vector(S::Int, 4),
            T::Bool => UniformKind::Scalar(S::Bool),
            T::BoolVec2 => UniformKind::Vector(S::Bool, 2),
            T::BoolVec3 => UniformKind::Vector(S::Bool, 3),
            T::BoolVec4 => UniformKind::Vector(S::Bool, 4),
            T::FloatMat2 => UniformKind::Matrix(2),
            T::FloatMat3 => UniformKind::Matrix(3),
            T::FloatMat4 => UniformKind::Matrix(4),
            T::Sampler2D | T::SamplerCube => UniformKind::Sampler,
            T::UnsignedInt
            | T::UnsignedIntVec2
            | T::UnsignedIntVec3
            | T::UnsignedIntVec4
            | T::FloatMat2x3
            | T::FloatMat3x4
            | T::FloatMat4x3
            | T::Other(_) => return None,
        })
    }

    /// Returns `true` for sampler types.
    pub fn is_sampler(self) -> bool {
        matches!(self, ShaderDataType::Sampler2D | ShaderDataType::SamplerCube)
    }

    /// The GLSL keyword for this type, if it has one.
    pub fn glsl_name(self) -> Option<&'static str> {
        use ShaderDataType as T;
        Some(match self {
            T::Float => "float",
            T::FloatVec2 => "vec2",
            T::FloatVec3 => "vec3",
            T::FloatVec4 => "vec4",
            T::Int => "int",
            T::IntVec2 => "ivec2",
            T::IntVec3 => "ivec3",
            T::IntVec4 => "ivec4",
            T::Bool => "bool",
            T::BoolVec2 => "bvec2",
            T::BoolVec3 => "bvec3",
            T::BoolVec4 => "bvec4",
            T::FloatMat2 => "mat2",
            T::FloatMat3 => "mat3",
            T::FloatMat4 => "mat4",
            T::Sampler2D => "sampler2D",
            T::SamplerCube => "samplerCube",
            T::UnsignedInt => "uint",
            T::UnsignedIntVec2 => "uvec2",
            T::UnsignedIntVec3 => "uvec3",
            T::UnsignedIntVec4 => "uvec4",
            T::FloatMat2x3 => "mat2x3",
            T::FloatMat3x4 => "mat3x4",
            T::FloatMat4x3 => "mat4x3",
            T::Other(_) => return None,
        })
    }

    /// Parses a GLSL type keyword.
    pub fn from_glsl_name(name: &str) -> Option<Self> {
        use ShaderDataType as T;
        Some(match name {
            "float" => T::Float,
            "vec2" => T::FloatVec2,
            "vec3" => T::FloatVec3,
            "vec4" => T::FloatVec4,
            "int" => T::Int,
            "ivec2" => T::IntVec2,
            "ivec3" => T::IntVec3,
            "ivec4" => T::IntVec4,
            "bool" => T::Bool,
            "bvec2" => T::BoolVec2,
            "bvec3" => T::BoolVec3,
            "bvec4" => T::BoolVec4,
            "mat2" => T::FloatMat2,
            "mat3" => T::FloatMat3,
            "mat4" => T::FloatMat4,
            "sampler2D" => T::Sampler2D,
            "samplerCube" => T::SamplerCube,
            "uint" => T::UnsignedInt,
            "uvec2" => T::UnsignedIntVec2,
            "uvec3" => T::UnsignedIntVec3,
            "uvec4" => T::UnsignedIntVec4,
            "mat2x3" => T::FloatMat2x3,
            "mat3x4" => T::FloatMat3x4,
            "mat4x3" => T::FloatMat4x3,
            _ => return None,
        })
    }
}

impl fmt::Display for ShaderDataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.glsl_name(), self) {
            (Some(name), _) => f.write_str(name),
            (None, ShaderDataType::Other(code)) => write!(f, "type({code:#06x})"),
            (None, _) => write!(f, "{self:?}"),
        }
    }
}

/// An active vertex attribute of a linked program.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ActiveAttribute {
    /// The attribute name as declared in the vertex shader.
    pub name: String,
    /// Array length of the attribute (1 for non-arrays).
    pub size: u32,
    /// The declared type.
    pub data_type: ShaderDataType,
    /// The binding location.
    pub location: u32,
}

/// An active uniform of a linked program.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ActiveUniform {
    /// The uniform name as the context reports it, `NAME[0]` for arrays.
    /// Built pipelines store it with [`uniform_base_name`] applied.
    pub name: String,
    /// Array length of the uniform (1 for non-arrays).
    pub size: u32,
    /// The declared type.
    pub data_type: ShaderDataType,
    /// The binding location.
    pub location: UniformLocation,
}

/// Strips the `[0]` suffix drivers append to the names of array uniforms.
pub fn uniform_base_name(reported: &str) -> &str {
    reported.strip_suffix("[0]").unwrap_or(reported)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_kinds_cover_supported_types() {
        assert_eq!(
            ShaderDataType::FloatMat4.uniform_kind(),
            Some(UniformKind::Matrix(4))
        );
        assert_eq!(
            ShaderDataType::BoolVec3.uniform_kind(),
            Some(UniformKind::Vector(ScalarType::Bool, 3))
        );
        assert_eq!(
            ShaderDataType::SamplerCube.uniform_kind(),
            Some(UniformKind::Sampler)
        );
        assert_eq!(ShaderDataType::UnsignedIntVec2.uniform_kind(), None);
        assert_eq!(ShaderDataType::Other(0x8B5F).uniform_kind(), None);
    }

    #[test]
    fn test_components_per_element() {
        assert_eq!(UniformKind::Matrix(3).components(), 9);
        assert_eq!(UniformKind::Vector(ScalarType::Int, 2).components(), 2);
        assert_eq!(UniformKind::Sampler.components(), 1);
    }

    #[test]
    fn test_glsl_names_round_trip() {
        for name in ["vec4", "mat3", "sampler2D", "bvec2", "mat4x3"] {
            let ty = ShaderDataType::from_glsl_name(name).unwrap();
            assert_eq!(ty.glsl_name(), Some(name));
        }
        assert_eq!(ShaderDataType::from_glsl_name("sampler3D"), None);
        assert_eq!(ShaderDataType::Other(0x8B5F).to_string(), "type(0x8b5f)");
    }

    #[test]
    fn test_uniform_base_name() {
        assert_eq!(uniform_base_name("WEIGHTS[0]"), "WEIGHTS");
        assert_eq!(uniform_base_name("COLOR"), "COLOR");
    }
}
