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

//! Enumerations used to describe pipeline and draw state.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A programmable stage of the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShaderStage {
    /// The vertex shader stage.
    Vertex,
    /// The fragment shader stage.
    Fragment,
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderStage::Vertex => write!(f, "vertex"),
            ShaderStage::Fragment => write!(f, "fragment"),
        }
    }
}

/// A comparison function used for depth and stencil tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CompareFunction {
    /// The test never passes.
    Never,
    /// Passes if the new value is less than the existing value.
    Less,
    /// Passes if the new value is equal to the existing value.
    Equal,
    /// Passes if the new value is less than or equal to the existing value.
    LessEqual,
    /// Passes if the new value is greater than the existing value.
    Greater,
    /// Passes if the new value is not equal to the existing value.
    NotEqual,
    /// Passes if the new value is greater than or equal to the existing value.
    GreaterEqual,
    /// The test always passes.
    Always,
}

/// An operation to perform on a stencil buffer value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StencilOperation {
    /// Keep the current value.
    Keep,
    /// Set the value to 0.
    Zero,
    /// Replace the value with the reference value.
    Replace,
    /// Increment the value, clamping to the maximum.
    IncrementClamp,
    /// Decrement the value, clamping to 0.
    DecrementClamp,
    /// Bitwise invert the value.
    Invert,
    /// Increment the value, wrapping to 0 on overflow.
    IncrementWrap,
    /// Decrement the value, wrapping to the maximum on underflow.
    DecrementWrap,
}

/// Which faces are discarded when culling is enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CullMode {
    /// Cull front-facing primitives.
    Front,
    /// Cull back-facing primitives.
    Back,
}

/// A multiplier applied to a colour in the blend equation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlendFactor {
    /// `0.0`
    Zero,
    /// `1.0`
    One,
    /// The source colour.
    SrcColor,
    /// `1.0 - source colour`.
    OneMinusSrcColor,
    /// The source alpha.
    SrcAlpha,
    /// `1.0 - source alpha`.
    OneMinusSrcAlpha,
    /// The destination colour.
    DstColor,
    /// `1.0 - destination colour`.
    OneMinusDstColor,
    /// The destination alpha.
    DstAlpha,
    /// `1.0 - destination alpha`.
    OneMinusDstAlpha,
}

/// How vertices are assembled into primitives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PrimitiveTopology {
    /// Each vertex is a point.
    PointList,
    /// Each pair of vertices is a line.
    LineList,
    /// Consecutive vertices form a connected line.
    LineStrip,
    /// Each triple of vertices is a triangle.
    TriangleList,
    /// Each vertex after the first two forms a triangle with the previous two.
    TriangleStrip,
    /// Each vertex after the first two forms a triangle with the first one.
    TriangleFan,
}

/// The data type of indices in an index buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IndexFormat {
    /// 8-bit unsigned indices.
    Uint8,
    /// 16-bit unsigned indices.
    Uint16,
    /// 32-bit unsigned indices.
    Uint32,
}

impl IndexFormat {
    /// The size of one index in bytes.
    pub const fn size_in_bytes(self) -> u32 {
        match self {
            IndexFormat::Uint8 => 1,
            IndexFormat::Uint16 => 2,
            IndexFormat::Uint32 => 4,
        }
    }
}

/// The scalar type of each component of a vertex attribute in memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VertexComponentType {
    /// Signed 8-bit integer.
    Byte,
    /// Unsigned 8-bit integer.
    UnsignedByte,
    /// Signed 16-bit integer.
    Short,
    /// Unsigned 16-bit integer.
    UnsignedShort,
    /// 32-bit float.
    Float,
}

/// Selects the front or back face for per-face stencil state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StencilFace {
    /// Front-facing primitives.
    Front,
    /// Back-facing primitives.
    Back,
}

/// A fixed-function feature that can be toggled on the context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Capability {
    /// Face culling.
    CullFace,
    /// Depth testing.
    DepthTest,
    /// Stencil testing.
    StencilTest,
    /// Colour blending.
    Blend,
}
