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
    BlendFactor, Capability, ColorWrites, CompareFunction, CullMode, IndexFormat, PrimitiveTopology, StencilFace,
    StencilOperation,
};
use prism_core::renderer::{
    BufferId, BufferTarget, ClearFlags, FramebufferId, ProgramId, SamplerDescriptor, TextureId, TextureTarget,
    UniformData, UniformLocation, VertexAttribLayout,
};

/// An owned copy of a uniform upload.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedUniform {
    /// `uniform{components}fv`
    Float {
        /// Components per element.
        components: u8,
        /// Flat values.
        values: Vec<f32>,
    },
    /// `uniform{components}iv`
    Int {
        /// Components per element.
        components: u8,
        /// Flat values.
        values: Vec<i32>,
    },
    /// `uniformMatrix{dimension}fv`
    Matrix {
        /// Matrix dimension.
        dimension: u8,
        /// Flat column-major values.
        values: Vec<f32>,
    },
}

impl From<UniformData<'_>> for RecordedUniform {
    fn from(data: UniformData<'_>) -> Self {
        match data {
            UniformData::Float { components, values } => RecordedUniform::Float {
                components,
                values: values.to_vec(),
            },
            UniformData::Int { components, values } => RecordedUniform::Int {
                components,
                values: values.to_vec(),
            },
            UniformData::Matrix { dimension, values } => RecordedUniform::Matrix {
                dimension,
                values: values.to_vec(),
            },
        }
    }
}

/// A state, bind, clear, uniform or draw call received by a
/// [`HeadlessContext`](super::HeadlessContext), in call order.
///
/// Object creation and reflection queries are not recorded.
#[derive(Debug, Clone, PartialEq)]
#[allow(missing_docs)]
pub enum GlCall {
    UseProgram(Option<ProgramId>),
    BindFramebuffer(Option<FramebufferId>),
    BindBuffer(BufferTarget, Option<BufferId>),
    ActiveTexture(u32),
    BindTexture(TextureTarget, Option<TextureId>),
    ApplySampler(TextureTarget, SamplerDescriptor),
    SetCapability(Capability, bool),
    CullFace(CullMode),
    DepthFunc(CompareFunction),
    DepthMask(bool),
    StencilMask(u32),
    StencilFuncSeparate {
        face: StencilFace,
        func: CompareFunction,
        reference: i32,
        read_mask: u32,
    },
    StencilOpSeparate {
        face: StencilFace,
        fail: StencilOperation,
        depth_fail: StencilOperation,
        pass: StencilOperation,
    },
    BlendFunc(BlendFactor, BlendFactor),
    ColorMask(ColorWrites),
    SetClearColor([f32; 4]),
    SetClearDepth(f32),
    SetClearStencil(i32),
    Clear(ClearFlags),
    SetUniform {
        location: UniformLocation,
        value: RecordedUniform,
    },
    VertexAttribPointer {
        location: u32,
        buffer: Option<BufferId>,
        layout: VertexAttribLayout,
    },
    SetVertexAttribArrayEnabled {
        location: u32,
        enabled: bool,
    },
    DrawArrays {
        topology: PrimitiveTopology,
        first: u32,
        count: u32,
    },
    DrawElements {
        topology: PrimitiveTopology,
        count: u32,
        format: IndexFormat,
        byte_offset: u32,
    },
}

impl GlCall {
    /// Returns `true` for `DrawArrays` and `DrawElements`.
    pub fn is_draw(&self) -> bool {
        matches!(self, GlCall::DrawArrays { .. } | GlCall::DrawElements { .. })
    }
}
