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

//! Fixed-function state blocks of a pipeline.
//!
//! Each block exists in two forms: a *descriptor* whose fields are optional,
//! as authored by client code, and a resolved *state* with every field
//! concrete, produced once the descriptor has been normalized.

use super::enums::{BlendFactor, CompareFunction, CullMode, StencilOperation};
use crate::prism_bitflags;
use serde::{Deserialize, Serialize};

// --- Descriptors (authored, partially specified) ---

/// Authored rasterizer state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RasterizerStateDescriptor {
    /// Whether face culling is enabled.
    pub cull_enable: Option<bool>,
    /// Which faces are culled when culling is enabled.
    pub cull_mode: Option<CullMode>,
}

/// Authored stencil state for one face.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StencilFaceDescriptor {
    /// The stencil comparison function.
    pub func: Option<CompareFunction>,
    /// The reference value compared against the stencil buffer.
    pub reference: Option<i32>,
    /// The mask ANDed with both the reference and the stored value before comparing.
    pub read_mask: Option<u32>,
    /// Operation when the stencil test fails.
    pub fail_op: Option<StencilOperation>,
    /// Operation when the stencil test passes but the depth test fails.
    pub depth_fail_op: Option<StencilOperation>,
    /// Operation when both tests pass.
    pub pass_op: Option<StencilOperation>,
}

/// Authored depth and stencil state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DepthStencilStateDescriptor {
    /// Whether the depth test is enabled.
    pub depth_enable: Option<bool>,
    /// The depth comparison function.
    pub depth_func: Option<CompareFunction>,
    /// Whether depth writes are enabled.
    pub depth_mask: Option<bool>,
    /// Whether the stencil test is enabled.
    pub stencil_enable: Option<bool>,
    /// Bits of the stencil buffer that may be written.
    pub stencil_write_mask: Option<u32>,
    /// Stencil state for front-facing primitives.
    pub front_face: StencilFaceDescriptor,
    /// Stencil state for back-facing primitives.
    pub back_face: StencilFaceDescriptor,
}

prism_bitflags! {
    /// A bitmask to enable or disable writes to individual colour channels.
    #[derive(Serialize, Deserialize)]
    pub struct ColorWrites: u8 {
        /// Enable writes to the red channel.
        const R = 0b0001;
        /// Enable writes to the green channel.
        const G = 0b0010;
        /// Enable writes to the blue channel.
        const B = 0b0100;
        /// Enable writes to the alpha channel.
        const A = 0b1000;
        /// Enable writes to all channels.
        const ALL = 0b1111;
    }
}

impl ColorWrites {
    /// Returns the mask as `[red, green, blue, alpha]` booleans.
    pub fn to_rgba(self) -> [bool; 4] {
        [
            self.contains(Self::R),
            self.contains(Self::G),
            self.contains(Self::B),
            self.contains(Self::A),
        ]
    }
}

/// Authored blend state for the single render target.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RenderTargetBlendDescriptor {
    /// Whether blending is enabled.
    pub blend_enable: Option<bool>,
    /// Source blend factor.
    pub src_blend: Option<BlendFactor>,
    /// Destination blend factor.
    pub dst_blend: Option<BlendFactor>,
    /// Channels written to the render target.
    pub write_mask: Option<ColorWrites>,
}

/// Authored blend state, one entry per simultaneously bound render target.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlendStateDescriptor {
    /// Per-render-target blend entries, in target order.
    pub render_targets: Vec<RenderTargetBlendDescriptor>,
}

// --- Resolved state ---

/// Concrete rasterizer state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RasterizerState {
    /// Whether face culling is enabled.
    pub cull_enable: bool,
    /// Which faces are culled.
    pub cull_mode: CullMode,
}

/// Concrete stencil state for one face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StencilFaceState {
    /// The stencil comparison function.
    pub func: CompareFunction,
    /// The reference value.
    pub reference: i32,
    /// The comparison read mask.
    pub read_mask: u32,
    /// Operation when the stencil test fails.
    pub fail_op: StencilOperation,
    /// Operation when the stencil test passes but the depth test fails.
    pub depth_fail_op: StencilOperation,
    /// Operation when both tests pass.
    pub pass_op: StencilOperation,
}

/// Concrete depth and stencil state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DepthStencilState {
    /// Whether the depth test is enabled.
    pub depth_enable: bool,
    /// The depth comparison function.
    pub depth_func: CompareFunction,
    /// Whether depth writes are enabled.
    pub depth_mask: bool,
    /// Whether the stencil test is enabled.
    pub stencil_enable: bool,
    /// Bits of the stencil buffer that may be written.
    pub stencil_write_mask: u32,
    /// Front-face stencil state.
    pub front: StencilFaceState,
    /// Back-face stencil state.
    pub back: StencilFaceState,
}

/// Concrete blend state of the render target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RenderTargetBlendState {
    /// Whether blending is enabled.
    pub blend_enable: bool,
    /// Source blend factor.
    pub src_blend: BlendFactor,
    /// Destination blend factor.
    pub dst_blend: BlendFactor,
    /// Channels written to the render target.
    pub write_mask: ColorWrites,
}

/// All fixed-function state applied when a pipeline is bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FixedFunctionState {
    /// Rasterizer state.
    pub rasterizer: RasterizerState,
    /// Depth and stencil state.
    pub depth_stencil: DepthStencilState,
    /// Blend state of the single render target.
    pub blend: RenderTargetBlendState,
}
