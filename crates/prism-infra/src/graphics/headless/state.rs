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

use super::calls::RecordedUniform;
use prism_core::renderer::api::pipeline::{
    BlendFactor, Capability, ColorWrites, CompareFunction, CullMode, StencilFaceState, StencilOperation,
};
use prism_core::renderer::{
    BufferId, FramebufferId, ProgramId, SamplerDescriptor, TextureId, TextureTarget, UniformLocation,
    VertexAttribLayout,
};
use std::collections::{BTreeMap, BTreeSet};

/// The GL state of a [`HeadlessContext`](super::HeadlessContext), starting
/// from the values a fresh OpenGL ES 2.0 context reports.
#[derive(Debug, Clone, PartialEq)]
pub struct HeadlessState {
    /// The current program.
    pub program: Option<ProgramId>,
    /// The bound framebuffer; `None` is the default framebuffer.
    pub framebuffer: Option<FramebufferId>,
    /// The buffer bound to `ARRAY_BUFFER`.
    pub array_buffer: Option<BufferId>,
    /// The buffer bound to `ELEMENT_ARRAY_BUFFER`.
    pub element_array_buffer: Option<BufferId>,
    /// The active texture unit.
    pub active_texture_unit: u32,
    /// Textures bound per unit and target.
    pub texture_units: BTreeMap<(u32, TextureTarget), TextureId>,
    /// Enabled capabilities.
    pub capabilities: BTreeSet<Capability>,
    /// The culled faces.
    pub cull_mode: CullMode,
    /// The depth comparison function.
    pub depth_func: CompareFunction,
    /// Whether depth writes are enabled.
    pub depth_write: bool,
    /// The stencil write mask.
    pub stencil_write_mask: u32,
    /// Front-face stencil function and operations.
    pub stencil_front: StencilFaceState,
    /// Back-face stencil function and operations.
    pub stencil_back: StencilFaceState,
    /// Source and destination blend factors.
    pub blend_func: (BlendFactor, BlendFactor),
    /// The colour write mask.
    pub color_mask: ColorWrites,
    /// The colour used by colour clears.
    pub clear_color: [f32; 4],
    /// The value used by depth clears.
    pub clear_depth: f32,
    /// The value used by stencil clears.
    pub clear_stencil: i32,
    /// Enabled vertex attribute arrays.
    pub enabled_attributes: BTreeSet<u32>,
    /// Attribute pointers and the array buffer each one captured.
    pub attribute_pointers: BTreeMap<u32, (Option<BufferId>, VertexAttribLayout)>,
    /// Uniform values per program.
    pub uniforms: BTreeMap<(ProgramId, UniformLocation), RecordedUniform>,
    /// Sampler parameters last written per texture.
    pub texture_samplers: BTreeMap<TextureId, SamplerDescriptor>,
}

impl HeadlessState {
    /// Returns `true` if `capability` is enabled.
    pub fn is_enabled(&self, capability: Capability) -> bool {
        self.capabilities.contains(&capability)
    }

    /// The texture bound to `unit` for `target`.
    pub fn bound_texture(&self, unit: u32, target: TextureTarget) -> Option<TextureId> {
        self.texture_units.get(&(unit, target)).copied()
    }

    /// The last value uploaded to `location` of `program`.
    pub fn uniform(&self, program: ProgramId, location: UniformLocation) -> Option<&RecordedUniform> {
        self.uniforms.get(&(program, location))
    }
}

impl Default for HeadlessState {
    fn default() -> Self {
        let stencil = StencilFaceState {
            func: CompareFunction::Always,
            reference: 0,
            read_mask: u32::MAX,
            fail_op: StencilOperation::Keep,
            depth_fail_op: StencilOperation::Keep,
            pass_op: StencilOperation::Keep,
        };
        Self {
            program: None,
            framebuffer: None,
            array_buffer: None,
            element_array_buffer: None,
            active_texture_unit: 0,
            texture_units: BTreeMap::new(),
            capabilities: BTreeSet::new(),
            cull_mode: CullMode::Back,
            depth_func: CompareFunction::Less,
            depth_write: true,
            stencil_write_mask: u32::MAX,
            stencil_front: stencil,
            stencil_back: stencil,
            blend_func: (BlendFactor::One, BlendFactor::Zero),
            color_mask: ColorWrites::ALL,
            clear_color: [0.0; 4],
            clear_depth: 1.0,
            clear_stencil: 0,
            enabled_attributes: BTreeSet::new(),
            attribute_pointers: BTreeMap::new(),
            uniforms: BTreeMap::new(),
            texture_samplers: BTreeMap::new(),
        }
    }
}
