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

use crate::prism_bitflags;
use crate::renderer::api::*;
use crate::renderer::error::ResourceError;
use std::fmt::Debug;

prism_bitflags! {
    /// Buffers cleared by [`GraphicsContext::clear`].
    pub struct ClearFlags: u8 {
        /// The colour buffer.
        const COLOR = 0b001;
        /// The depth buffer.
        const DEPTH = 0b010;
        /// The stencil buffer.
        const STENCIL = 0b100;
    }
}

/// Data for one uniform upload, already shaped for the native call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformData<'a> {
    /// `uniform{components}fv`: `values.len()` is a multiple of `components`.
    Float {
        /// Components per element (1 to 4).
        components: u8,
        /// Flat values.
        values: &'a [f32],
    },
    /// `uniform{components}iv`, also used for booleans and samplers.
    Int {
        /// Components per element (1 to 4).
        components: u8,
        /// Flat values.
        values: &'a [i32],
    },
    /// `uniformMatrix{dimension}fv`, column-major, not transposed.
    Matrix {
        /// Matrix dimension (2 to 4).
        dimension: u8,
        /// Flat column-major values.
        values: &'a [f32],
    },
}

/// An immediate-mode graphics context.
///
/// The pipeline builder uses the compilation, reflection and creation calls;
/// the command interpreter uses the binding, state, uniform and draw calls.
/// Calls that only change state cannot fail: as in the native API, misuse is
/// reported by the backend (logged) rather than returned.
///
/// Implementations are used from a single thread.
pub trait GraphicsContext: Debug {
    // --- Shaders and programs ---

    /// Compiles one shader stage.
    /// ## Errors
    /// * `ResourceError::CompileFailed` - carrying the native compiler log.
    fn compile_shader(&mut self, stage: ShaderStage, source: &str) -> Result<ShaderId, ResourceError>;

    /// Deletes a shader stage.
    fn delete_shader(&mut self, shader: ShaderId);

    /// Links a vertex and a fragment stage into a program.
    /// ## Errors
    /// * `ResourceError::LinkFailed` - carrying the native linker log.
    fn link_program(&mut self, vertex: ShaderId, fragment: ShaderId) -> Result<ProgramId, ResourceError>;

    /// Deletes a program.
    fn delete_program(&mut self, program: ProgramId);

    // --- Reflection ---

    /// Enumerates the active vertex attributes of a linked program.
    fn active_attributes(&self, program: ProgramId) -> Vec<ActiveAttribute>;

    /// Enumerates the active uniforms of a linked program.
    fn active_uniforms(&self, program: ProgramId) -> Vec<ActiveUniform>;

    /// Looks up the location of an active attribute by name.
    fn attribute_location(&self, program: ProgramId, name: &str) -> Option<u32>;

    // --- Resource creation ---

    /// Creates a buffer initialized with `data`.
    fn create_buffer(&mut self, target: BufferTarget, data: &[u8]) -> Result<BufferId, ResourceError>;

    /// Creates a 2D texture.
    fn create_texture(&mut self, descriptor: &TextureDescriptor<'_>) -> Result<TextureId, ResourceError>;

    /// Creates a renderbuffer.
    fn create_renderbuffer(
        &mut self,
        format: RenderbufferFormat,
        width: u32,
        height: u32,
    ) -> Result<RenderbufferId, ResourceError>;

    /// Creates a framebuffer and checks its completeness.
    /// ## Errors
    /// * `ResourceError::IncompleteFramebuffer` - if the attachments do not form a complete framebuffer.
    fn create_framebuffer(&mut self, descriptor: &FramebufferDescriptor) -> Result<FramebufferId, ResourceError>;

    // --- Binding ---

    /// Makes a program current. `None` unbinds.
    fn use_program(&mut self, program: Option<ProgramId>);

    /// Binds a framebuffer. `None` binds the default framebuffer.
    fn bind_framebuffer(&mut self, framebuffer: Option<FramebufferId>);

    /// Binds a buffer to a target.
    fn bind_buffer(&mut self, target: BufferTarget, buffer: Option<BufferId>);

    /// Selects the texture unit affected by `bind_texture` and `apply_sampler`.
    fn active_texture(&mut self, unit: u32);

    /// Binds a texture to the active unit.
    fn bind_texture(&mut self, target: TextureTarget, texture: Option<TextureId>);

    /// Writes filter and wrap parameters onto the texture bound to `target`.
    fn apply_sampler(&mut self, target: TextureTarget, sampler: &SamplerDescriptor);

    // --- Fixed-function state ---

    /// Enables or disables a capability.
    fn set_capability(&mut self, capability: Capability, enabled: bool);

    /// Selects the culled faces.
    fn cull_face(&mut self, mode: CullMode);

    /// Sets the depth comparison function.
    fn depth_func(&mut self, func: CompareFunction);

    /// Enables or disables depth writes.
    fn depth_mask(&mut self, write: bool);

    /// Sets the stencil write mask of both faces.
    fn stencil_mask(&mut self, mask: u32);

    /// Sets the stencil function of one face.
    fn stencil_func_separate(&mut self, face: StencilFace, func: CompareFunction, reference: i32, read_mask: u32);

    /// Sets the stencil operations of one face.
    fn stencil_op_separate(
        &mut self,
        face: StencilFace,
        fail: StencilOperation,
        depth_fail: StencilOperation,
        pass: StencilOperation,
    );

    /// Sets the blend factors.
    fn blend_func(&mut self, src: BlendFactor, dst: BlendFactor);

    /// Sets the colour write mask.
    fn color_mask(&mut self, mask: ColorWrites);

    // --- Clears ---

    /// Sets the colour used by colour clears.
    fn set_clear_color(&mut self, rgba: [f32; 4]);

    /// Sets the value used by depth clears.
    fn set_clear_depth(&mut self, depth: f32);

    /// Sets the value used by stencil clears.
    fn set_clear_stencil(&mut self, stencil: i32);

    /// Clears buffers of the bound framebuffer.
    fn clear(&mut self, buffers: ClearFlags);

    // --- Uniforms ---

    /// Uploads a uniform of the current program.
    fn set_uniform(&mut self, location: UniformLocation, data: UniformData<'_>);

    // --- Vertex input and draws ---

    /// Points an attribute location at the buffer bound to `BufferTarget::Array`.
    fn vertex_attrib_pointer(&mut self, location: u32, layout: &VertexAttribLayout);

    /// Enables or disables the vertex array of an attribute location.
    fn set_vertex_attrib_array_enabled(&mut self, location: u32, enabled: bool);

    /// Draws consecutive vertices.
    fn draw_arrays(&mut self, topology: PrimitiveTopology, first: u32, count: u32);

    /// Draws through the bound index buffer. `byte_offset` is relative to its start.
    fn draw_elements(&mut self, topology: PrimitiveTopology, count: u32, format: IndexFormat, byte_offset: u32);
}
