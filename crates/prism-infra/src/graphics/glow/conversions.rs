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

use prism_core::renderer::api::pipeline::{
    BlendFactor, Capability, CompareFunction, CullMode, IndexFormat, PrimitiveTopology, ShaderDataType, ShaderStage,
    StencilFace, StencilOperation, VertexComponentType,
};
use prism_core::renderer::{
    BufferTarget, ClearFlags, FilterMode, RenderbufferFormat, TextureTarget, WrapMode,
};

/// A local extension trait to convert our engine's types into GL enums.
/// This avoids Rust's orphan rules while keeping an idiomatic `.into_gl()` syntax.
pub trait IntoGl<T> {
    /// Consumes self and converts it into a GL-compatible value.
    fn into_gl(self) -> T;
}

impl IntoGl<u32> for ShaderStage {
    fn into_gl(self) -> u32 {
        match self {
            ShaderStage::Vertex => glow::VERTEX_SHADER,
            ShaderStage::Fragment => glow::FRAGMENT_SHADER,
        }
    }
}

impl IntoGl<u32> for BufferTarget {
    fn into_gl(self) -> u32 {
        match self {
            BufferTarget::Array => glow::ARRAY_BUFFER,
            BufferTarget::ElementArray => glow::ELEMENT_ARRAY_BUFFER,
        }
    }
}

impl IntoGl<u32> for TextureTarget {
    fn into_gl(self) -> u32 {
        match self {
            TextureTarget::Texture2D => glow::TEXTURE_2D,
            TextureTarget::CubeMap => glow::TEXTURE_CUBE_MAP,
        }
    }
}

impl IntoGl<i32> for FilterMode {
    fn into_gl(self) -> i32 {
        (match self {
            FilterMode::Nearest => glow::NEAREST,
            FilterMode::Linear => glow::LINEAR,
            FilterMode::NearestMipmapNearest => glow::NEAREST_MIPMAP_NEAREST,
            FilterMode::LinearMipmapNearest => glow::LINEAR_MIPMAP_NEAREST,
            FilterMode::NearestMipmapLinear => glow::NEAREST_MIPMAP_LINEAR,
            FilterMode::LinearMipmapLinear => glow::LINEAR_MIPMAP_LINEAR,
        }) as i32
    }
}

impl IntoGl<i32> for WrapMode {
    fn into_gl(self) -> i32 {
        (match self {
            WrapMode::Repeat => glow::REPEAT,
            WrapMode::ClampToEdge => glow::CLAMP_TO_EDGE,
            WrapMode::MirroredRepeat => glow::MIRRORED_REPEAT,
        }) as i32
    }
}

impl IntoGl<u32> for RenderbufferFormat {
    fn into_gl(self) -> u32 {
        match self {
            RenderbufferFormat::Depth16 => glow::DEPTH_COMPONENT16,
            RenderbufferFormat::DepthStencil => glow::DEPTH24_STENCIL8,
        }
    }
}

impl IntoGl<u32> for Capability {
    fn into_gl(self) -> u32 {
        match self {
            Capability::CullFace => glow::CULL_FACE,
            Capability::DepthTest => glow::DEPTH_TEST,
            Capability::StencilTest => glow::STENCIL_TEST,
            Capability::Blend => glow::BLEND,
        }
    }
}

impl IntoGl<u32> for CullMode {
    fn into_gl(self) -> u32 {
        match self {
            CullMode::Front => glow::FRONT,
            CullMode::Back => glow::BACK,
        }
    }
}

impl IntoGl<u32> for StencilFace {
    fn into_gl(self) -> u32 {
        match self {
            StencilFace::Front => glow::FRONT,
            StencilFace::Back => glow::BACK,
        }
    }
}

impl IntoGl<u32> for CompareFunction {
    fn into_gl(self) -> u32 {
        match self {
            CompareFunction::Never => glow::NEVER,
            CompareFunction::Less => glow::LESS,
            CompareFunction::Equal => glow::EQUAL,
            CompareFunction::LessEqual => glow::LEQUAL,
            CompareFunction::Greater => glow::GREATER,
            CompareFunction::NotEqual => glow::NOTEQUAL,
            CompareFunction::GreaterEqual => glow::GEQUAL,
            CompareFunction::Always => glow::ALWAYS,
        }
    }
}

impl IntoGl<u32> for StencilOperation {
    fn into_gl(self) -> u32 {
        match self {
            StencilOperation::Keep => glow::KEEP,
            StencilOperation::Zero => glow::ZERO,
            StencilOperation::Replace => glow::REPLACE,
            StencilOperation::IncrementClamp => glow::INCR,
            StencilOperation::DecrementClamp => glow::DECR,
            StencilOperation::Invert => glow::INVERT,
            StencilOperation::IncrementWrap => glow::INCR_WRAP,
            StencilOperation::DecrementWrap => glow::DECR_WRAP,
        }
    }
}

impl IntoGl<u32> for BlendFactor {
    fn into_gl(self) -> u32 {
        match self {
            BlendFactor::Zero => glow::ZERO,
            BlendFactor::One => glow::ONE,
            BlendFactor::SrcColor => glow::SRC_COLOR,
            BlendFactor::OneMinusSrcColor => glow::ONE_MINUS_SRC_COLOR,
            BlendFactor::SrcAlpha => glow::SRC_ALPHA,
            BlendFactor::OneMinusSrcAlpha => glow::ONE_MINUS_SRC_ALPHA,
            BlendFactor::DstColor => glow::DST_COLOR,
            BlendFactor::OneMinusDstColor => glow::ONE_MINUS_DST_COLOR,
            BlendFactor::DstAlpha => glow::DST_ALPHA,
            BlendFactor::OneMinusDstAlpha => glow::ONE_MINUS_DST_ALPHA,
        }
    }
}

impl IntoGl<u32> for PrimitiveTopology {
    fn into_gl(self) -> u32 {
        match self {
            PrimitiveTopology::PointList => glow::POINTS,
            PrimitiveTopology::LineList => glow::LINES,
            PrimitiveTopology::LineStrip => glow::LINE_STRIP,
            PrimitiveTopology::TriangleList => glow::TRIANGLES,
            PrimitiveTopology::TriangleStrip => glow::TRIANGLE_STRIP,
            PrimitiveTopology::TriangleFan => glow::TRIANGLE_FAN,
        }
    }
}

impl IntoGl<u32> for IndexFormat {
    fn into_gl(self) -> u32 {
        match self {
            IndexFormat::Uint8 => glow::UNSIGNED_BYTE,
            IndexFormat::Uint16 => glow::UNSIGNED_SHORT,
            IndexFormat::Uint32 => glow::UNSIGNED_INT,
        }
    }
}

impl IntoGl<u32> for VertexComponentType {
    fn into_gl(self) -> u32 {
        match self {
            VertexComponentType::Byte => glow::BYTE,
            VertexComponentType::UnsignedByte => glow::UNSIGNED_BYTE,
            VertexComponentType::Short => glow::SHORT,
            VertexComponentType::UnsignedShort => glow::UNSIGNED_SHORT,
            VertexComponentType::Float => glow::FLOAT,
        }
    }
}

impl IntoGl<u32> for ClearFlags {
    fn into_gl(self) -> u32 {
        let mut mask = 0;
        if self.contains(ClearFlags::COLOR) {
            mask |= glow::COLOR_BUFFER_BIT;
        }
        if self.contains(ClearFlags::DEPTH) {
            mask |= glow::DEPTH_BUFFER_BIT;
        }
        if self.contains(ClearFlags::STENCIL) {
            mask |= glow::STENCIL_BUFFER_BIT;
        }
        mask
    }
}

/// Maps a GL type enum reported by `glGetActiveUniform`/`glGetActiveAttrib`.
pub fn shader_data_type_from_gl(gl_type: u32) -> ShaderDataType {
    use ShaderDataType as T;
    match gl_type {
        glow::FLOAT => T::Float,
        glow::FLOAT_VEC2 => T::FloatVec2,
        glow::FLOAT_VEC3 => T::FloatVec3,
        glow::FLOAT_VEC4 => T::FloatVec4,
        glow::INT => T::Int,
        glow::INT_VEC2 => T::IntVec2,
        glow::INT_VEC3 => T::IntVec3,
        glow::INT_VEC4 => T::IntVec4,
        glow::BOOL => T::Bool,
        glow::BOOL_VEC2 => T::BoolVec2,
        glow::BOOL_VEC3 => T::BoolVec3,
        glow::BOOL_VEC4 => T::BoolVec4,
        glow::FLOAT_MAT2 => T::FloatMat2,
        glow::FLOAT_MAT3 => T::FloatMat3,
        glow::FLOAT_MAT4 => T::FloatMat4,
        glow::SAMPLER_2D => T::Sampler2D,
        glow::SAMPLER_CUBE => T::SamplerCube,
        glow::UNSIGNED_INT => T::UnsignedInt,
        glow::UNSIGNED_INT_VEC2 => T::UnsignedIntVec2,
        glow::UNSIGNED_INT_VEC3 => T::UnsignedIntVec3,
        glow::UNSIGNED_INT_VEC4 => T::UnsignedIntVec4,
        glow::FLOAT_MAT2x3 => T::FloatMat2x3,
        glow::FLOAT_MAT3x4 => T::FloatMat3x4,
        glow::FLOAT_MAT4x3 => T::FloatMat4x3,
        other => T::Other(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_enums_round_trip_through_reflection() {
        assert_eq!(shader_data_type_from_gl(0x8B5C), ShaderDataType::FloatMat4);
        assert_eq!(shader_data_type_from_gl(0x8B5E), ShaderDataType::Sampler2D);
        assert_eq!(shader_data_type_from_gl(0x8DC1), ShaderDataType::Other(0x8DC1));
    }

    #[test]
    fn test_clear_mask() {
        let mask: u32 = (ClearFlags::COLOR | ClearFlags::DEPTH).into_gl();
        assert_eq!(mask, glow::COLOR_BUFFER_BIT | glow::DEPTH_BUFFER_BIT);
    }
}
