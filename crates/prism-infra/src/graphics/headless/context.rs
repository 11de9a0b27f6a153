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

use super::calls::{GlCall, RecordedUniform};
use super::glsl::{self, LinkedInterface, StageInterface};
use super::state::HeadlessState;
use log::{debug, warn};
use prism_core::renderer::api::pipeline::{
    ActiveAttribute, ActiveUniform, BlendFactor, Capability, ColorWrites, CompareFunction, CullMode, IndexFormat,
    PrimitiveTopology, ShaderStage, StencilFace, StencilOperation,
};
use prism_core::renderer::{
    Attachment, BufferId, BufferTarget, ClearFlags, FramebufferDescriptor, FramebufferId, GraphicsContext, ProgramId,
    RenderbufferFormat, RenderbufferId, ResourceError, SamplerDescriptor, ShaderId, TextureDescriptor, TextureId,
    TextureTarget, UniformData, UniformLocation, VertexAttribLayout,
};
use std::collections::BTreeMap;

const FRAMEBUFFER_INCOMPLETE_ATTACHMENT: u32 = 0x8CD6;
const FRAMEBUFFER_INCOMPLETE_MISSING_ATTACHMENT: u32 = 0x8CD7;
const FRAMEBUFFER_INCOMPLETE_DIMENSIONS: u32 = 0x8CD9;

#[derive(Debug, Clone, Copy)]
struct BufferObject {
    target: BufferTarget,
    len: usize,
}

#[derive(Debug, Clone, Copy)]
struct SurfaceObject {
    width: u32,
    height: u32,
}

#[derive(Debug, Clone, Copy)]
struct RenderbufferObject {
    format: RenderbufferFormat,
    size: SurfaceObject,
}

/// A [`GraphicsContext`] that needs no GPU.
///
/// Shaders are checked at the declaration level, programs are reflected from
/// their declarations, and every state, bind, uniform and draw call is
/// recorded as a [`GlCall`] while its effect is tracked in a
/// [`HeadlessState`]. Misuse that a driver would report through
/// `glGetError` is logged and kept in [`HeadlessContext::errors`].
#[derive(Debug, Default)]
pub struct HeadlessContext {
    next_handle: u32,
    shaders: BTreeMap<ShaderId, StageInterface>,
    programs: BTreeMap<ProgramId, LinkedInterface>,
    buffers: BTreeMap<BufferId, BufferObject>,
    textures: BTreeMap<TextureId, SurfaceObject>,
    renderbuffers: BTreeMap<RenderbufferId, RenderbufferObject>,
    framebuffers: BTreeMap<FramebufferId, FramebufferDescriptor>,
    calls: Vec<GlCall>,
    state: HeadlessState,
    errors: Vec<String>,
}

impl HeadlessContext {
    /// Creates a context in the initial GL state.
    pub fn new() -> Self {
        Self::default()
    }

    /// The calls recorded so far, in order.
    pub fn calls(&self) -> &[GlCall] {
        &self.calls
    }

    /// Returns the recorded calls and starts a new recording.
    pub fn take_calls(&mut self) -> Vec<GlCall> {
        std::mem::take(&mut self.calls)
    }

    /// Forgets the recorded calls. The tracked state is kept.
    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    /// The recorded draw calls, in order.
    pub fn draw_calls(&self) -> impl Iterator<Item = &GlCall> {
        self.calls.iter().filter(|call| call.is_draw())
    }

    /// The current GL state.
    pub fn state(&self) -> &HeadlessState {
        &self.state
    }

    /// Errors a driver would have reported, in order.
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// Number of shader objects not yet deleted.
    pub fn live_shaders(&self) -> usize {
        self.shaders.len()
    }

    /// Number of program objects not yet deleted.
    pub fn live_programs(&self) -> usize {
        self.programs.len()
    }

    /// Size in bytes of a buffer.
    pub fn buffer_len(&self, buffer: BufferId) -> Option<usize> {
        self.buffers.get(&buffer).map(|b| b.len)
    }

    /// Dimensions of a texture.
    pub fn texture_size(&self, texture: TextureId) -> Option<(u32, u32)> {
        self.textures.get(&texture).map(|t| (t.width, t.height))
    }

    fn allocate(&mut self) -> u32 {
        self.next_handle += 1;
        self.next_handle
    }

    fn gl_error(&mut self, message: String) {
        warn!("Headless GL error: {}", message);
        self.errors.push(message);
    }

    fn record(&mut self, call: GlCall) {
        self.calls.push(call);
    }

    fn attachment_size(&self, attachment: Attachment) -> Result<SurfaceObject, ResourceError> {
        match attachment {
            Attachment::Texture(id) => self.textures.get(&id).copied().ok_or(ResourceError::InvalidHandle {
                kind: "texture",
                id: id.0,
            }),
            Attachment::Renderbuffer(id) => self
                .renderbuffers
                .get(&id)
                .map(|r| r.size)
                .ok_or(ResourceError::InvalidHandle {
                    kind: "renderbuffer",
                    id: id.0,
                }),
        }
    }

    fn renderbuffer_format(&self, attachment: Attachment) -> Option<RenderbufferFormat> {
        match attachment {
            Attachment::Renderbuffer(id) => self.renderbuffers.get(&id).map(|r| r.format),
            Attachment::Texture(_) => None,
        }
    }

    fn framebuffer_status(&self, descriptor: &FramebufferDescriptor) -> Result<Option<u32>, ResourceError> {
        let attachments: Vec<Attachment> = [descriptor.color, descriptor.depth, descriptor.depth_stencil]
            .into_iter()
            .flatten()
            .collect();
        if attachments.is_empty() {
            return Ok(Some(FRAMEBUFFER_INCOMPLETE_MISSING_ATTACHMENT));
        }

        let mut sizes = Vec::with_capacity(attachments.len());
        for attachment in &attachments {
            sizes.push(self.attachment_size(*attachment)?);
        }

        // Renderbuffers here only hold depth or depth-stencil data.
        let color_ok = descriptor
            .color
            .map_or(true, |a| matches!(a, Attachment::Texture(_)));
        let depth_ok = descriptor
            .depth
            .map_or(true, |a| self.renderbuffer_format(a) == Some(RenderbufferFormat::Depth16));
        let depth_stencil_ok = descriptor
            .depth_stencil
            .map_or(true, |a| self.renderbuffer_format(a) == Some(RenderbufferFormat::DepthStencil));
        let exclusive = descriptor.depth.is_none() || descriptor.depth_stencil.is_none();
        if !(color_ok && depth_ok && depth_stencil_ok && exclusive) {
            return Ok(Some(FRAMEBUFFER_INCOMPLETE_ATTACHMENT));
        }

        let first = sizes[0];
        if sizes.iter().any(|s| s.width != first.width || s.height != first.height) {
            return Ok(Some(FRAMEBUFFER_INCOMPLETE_DIMENSIONS));
        }
        Ok(None)
    }
}

impl GraphicsContext for HeadlessContext {
    fn compile_shader(&mut self, stage: ShaderStage, source: &str) -> Result<ShaderId, ResourceError> {
        let interface = glsl::compile(stage, source).map_err(ResourceError::CompileFailed)?;
        let id = ShaderId(self.allocate());
        debug!(
            "Compiled {} shader {} ({} declarations)",
            stage,
            id.0,
            interface.declarations.len()
        );
        self.shaders.insert(id, interface);
        Ok(id)
    }

    fn delete_shader(&mut self, shader: ShaderId) {
        if self.shaders.remove(&shader).is_none() {
            self.gl_error(format!("INVALID_VALUE: delete of unknown shader {}", shader.0));
        }
    }

    fn link_program(&mut self, vertex: ShaderId, fragment: ShaderId) -> Result<ProgramId, ResourceError> {
        let vs = self.shaders.get(&vertex).ok_or(ResourceError::InvalidHandle {
            kind: "shader",
            id: vertex.0,
        })?;
        let fs = self.shaders.get(&fragment).ok_or(ResourceError::InvalidHandle {
            kind: "shader",
            id: fragment.0,
        })?;
        let linked = glsl::link(vs, fs).map_err(ResourceError::LinkFailed)?;
        let id = ProgramId(self.allocate());
        self.programs.insert(id, linked);
        Ok(id)
    }

    fn delete_program(&mut self, program: ProgramId) {
        if self.programs.remove(&program).is_none() {
            self.gl_error(format!("INVALID_VALUE: delete of unknown program {}", program.0));
        }
        self.state.uniforms.retain(|(owner, _), _| *owner != program);
    }

    fn active_attributes(&self, program: ProgramId) -> Vec<ActiveAttribute> {
        self.programs
            .get(&program)
            .map(|p| p.attributes.clone())
            .unwrap_or_default()
    }

    fn active_uniforms(&self, program: ProgramId) -> Vec<ActiveUniform> {
        self.programs
            .get(&program)
            .map(|p| p.uniforms.clone())
            .unwrap_or_default()
    }

    fn attribute_location(&self, program: ProgramId, name: &str) -> Option<u32> {
        self.programs
            .get(&program)?
            .attributes
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.location)
    }

    fn create_buffer(&mut self, target: BufferTarget, data: &[u8]) -> Result<BufferId, ResourceError> {
        let id = BufferId(self.allocate());
        self.buffers.insert(id, BufferObject { target, len: data.len() });
        Ok(id)
    }

    fn create_texture(&mut self, descriptor: &TextureDescriptor<'_>) -> Result<TextureId, ResourceError> {
        if descriptor.width == 0 || descriptor.height == 0 {
            return Err(ResourceError::CreationFailed {
                kind: "texture",
                reason: format!("zero-sized texture {}x{}", descriptor.width, descriptor.height),
            });
        }
        if let Some(data) = descriptor.data {
            let expected =
                descriptor.width as usize * descriptor.height as usize * descriptor.format.bytes_per_pixel() as usize;
            if data.len() != expected {
                return Err(ResourceError::CreationFailed {
                    kind: "texture",
                    reason: format!("expected {} bytes of pixel data, got {}", expected, data.len()),
                });
            }
        }

        let id = TextureId(self.allocate());
        self.textures.insert(
            id,
            SurfaceObject {
                width: descriptor.width,
                height: descriptor.height,
            },
        );
        if let Some(sampler) = descriptor.sampler {
            self.state.texture_samplers.insert(id, sampler);
        }
        debug!(
            "Created texture {} '{}' ({}x{})",
            id.0,
            descriptor.label.unwrap_or_default(),
            descriptor.width,
            descriptor.height
        );
        Ok(id)
    }

    fn create_renderbuffer(
        &mut self,
        format: RenderbufferFormat,
        width: u32,
        height: u32,
    ) -> Result<RenderbufferId, ResourceError> {
        if width == 0 || height == 0 {
            return Err(ResourceError::CreationFailed {
                kind: "renderbuffer",
                reason: format!("zero-sized renderbuffer {width}x{height}"),
            });
        }
        let id = RenderbufferId(self.allocate());
        self.renderbuffers.insert(
            id,
            RenderbufferObject {
                format,
                size: SurfaceObject { width, height },
            },
        );
        Ok(id)
    }

    fn create_framebuffer(&mut self, descriptor: &FramebufferDescriptor) -> Result<FramebufferId, ResourceError> {
        if let Some(status) = self.framebuffer_status(descriptor)? {
            return Err(ResourceError::IncompleteFramebuffer { status });
        }
        let id = FramebufferId(self.allocate());
        self.framebuffers.insert(id, *descriptor);
        Ok(id)
    }

    fn use_program(&mut self, program: Option<ProgramId>) {
        self.record(GlCall::UseProgram(program));
        match program {
            Some(id) if !self.programs.contains_key(&id) => {
                self.gl_error(format!("INVALID_VALUE: use of unknown program {}", id.0));
            }
            _ => self.state.program = program,
        }
    }

    fn bind_framebuffer(&mut self, framebuffer: Option<FramebufferId>) {
        self.record(GlCall::BindFramebuffer(framebuffer));
        match framebuffer {
            Some(id) if !self.framebuffers.contains_key(&id) => {
                self.gl_error(format!("INVALID_OPERATION: bind of unknown framebuffer {}", id.0));
            }
            _ => self.state.framebuffer = framebuffer,
        }
    }

    fn bind_buffer(&mut self, target: BufferTarget, buffer: Option<BufferId>) {
        self.record(GlCall::BindBuffer(target, buffer));
        if let Some(id) = buffer {
            match self.buffers.get(&id) {
                None => {
                    self.gl_error(format!("INVALID_OPERATION: bind of unknown buffer {}", id.0));
                    return;
                }
                Some(object) if object.target != target => {
                    self.gl_error(format!(
                        "INVALID_OPERATION: buffer {} was created for {:?}, bound to {:?}",
                        id.0, object.target, target
                    ));
                    return;
                }
                Some(_) => {}
            }
        }
        match target {
            BufferTarget::Array => self.state.array_buffer = buffer,
            BufferTarget::ElementArray => self.state.element_array_buffer = buffer,
        }
    }

    fn active_texture(&mut self, unit: u32) {
        self.record(GlCall::ActiveTexture(unit));
        self.state.active_texture_unit = unit;
    }

    fn bind_texture(&mut self, target: TextureTarget, texture: Option<TextureId>) {
        self.record(GlCall::BindTexture(target, texture));
        let key = (self.state.active_texture_unit, target);
        match texture {
            Some(id) if !self.textures.contains_key(&id) => {
                self.gl_error(format!("INVALID_OPERATION: bind of unknown texture {}", id.0));
            }
            Some(id) => {
                self.state.texture_units.insert(key, id);
            }
            None => {
                self.state.texture_units.remove(&key);
            }
        }
    }

    fn apply_sampler(&mut self, target: TextureTarget, sampler: &SamplerDescriptor) {
        self.record(GlCall::ApplySampler(target, *sampler));
        match self.state.bound_texture(self.state.active_texture_unit, target) {
            Some(texture) => {
                self.state.texture_samplers.insert(texture, *sampler);
            }
            None => self.gl_error(format!(
                "INVALID_OPERATION: sampler parameters with no texture bound to unit {}",
                self.state.active_texture_unit
            )),
        }
    }

    fn set_capability(&mut self, capability: Capability, enabled: bool) {
        self.record(GlCall::SetCapability(capability, enabled));
        if enabled {
            self.state.capabilities.insert(capability);
        } else {
            self.state.capabilities.remove(&capability);
        }
    }

    fn cull_face(&mut self, mode: CullMode) {
        self.record(GlCall::CullFace(mode));
        self.state.cull_mode = mode;
    }

    fn depth_func(&mut self, func: CompareFunction) {
        self.record(GlCall::DepthFunc(func));
        self.state.depth_func = func;
    }

    fn depth_mask(&mut self, write: bool) {
        self.record(GlCall::DepthMask(write));
        self.state.depth_write = write;
    }

    fn stencil_mask(&mut self, mask: u32) {
        self.record(GlCall::StencilMask(mask));
        self.state.stencil_write_mask = mask;
    }

    fn stencil_func_separate(&mut self, face: StencilFace, func: CompareFunction, reference: i32, read_mask: u32) {
        self.record(GlCall::StencilFuncSeparate {
            face,
            func,
            reference,
            read_mask,
        });
        let state = match face {
            StencilFace::Front => &mut self.state.stencil_front,
            StencilFace::Back => &mut self.state.stencil_back,
        };
        state.func = func;
        state.reference = reference;
        state.read_mask = read_mask;
    }

    fn stencil_op_separate(
        &mut self,
        face: StencilFace,
        fail: StencilOperation,
        depth_fail: StencilOperation,
        pass: StencilOperation,
    ) {
        self.record(GlCall::StencilOpSeparate {
            face,
            fail,
            depth_fail,
            pass,
        });
        let state = match face {
            StencilFace::Front => &mut self.state.stencil_front,
            StencilFace::Back => &mut self.state.stencil_back,
        };
        state.fail_op = fail;
        state.depth_fail_op = depth_fail;
        state.pass_op = pass;
    }

    fn blend_func(&mut self, src: BlendFactor, dst: BlendFactor) {
        self.record(GlCall::BlendFunc(src, dst));
        self.state.blend_func = (src, dst);
    }

    fn color_mask(&mut self, mask: ColorWrites) {
        self.record(GlCall::ColorMask(mask));
        self.state.color_mask = mask;
    }

    fn set_clear_color(&mut self, rgba: [f32; 4]) {
        self.record(GlCall::SetClearColor(rgba));
        self.state.clear_color = rgba;
    }

    fn set_clear_depth(&mut self, depth: f32) {
        self.record(GlCall::SetClearDepth(depth));
        self.state.clear_depth = depth.clamp(0.0, 1.0);
    }

    fn set_clear_stencil(&mut self, stencil: i32) {
        self.record(GlCall::SetClearStencil(stencil));
        self.state.clear_stencil = stencil;
    }

    fn clear(&mut self, buffers: ClearFlags) {
        self.record(GlCall::Clear(buffers));
    }

    fn set_uniform(&mut self, location: UniformLocation, data: UniformData<'_>) {
        let value = RecordedUniform::from(data);
        self.record(GlCall::SetUniform {
            location,
            value: value.clone(),
        });
        match self.state.program {
            Some(program) => {
                self.state.uniforms.insert((program, location), value);
            }
            None => self.gl_error(format!(
                "INVALID_OPERATION: uniform upload to location {} with no current program",
                location.0
            )),
        }
    }

    fn vertex_attrib_pointer(&mut self, location: u32, layout: &VertexAttribLayout) {
        let buffer = self.state.array_buffer;
        self.record(GlCall::VertexAttribPointer {
            location,
            buffer,
            layout: *layout,
        });
        if buffer.is_none() {
            self.gl_error(format!(
                "attribute pointer for location {location} set with no array buffer bound"
            ));
        }
        self.state.attribute_pointers.insert(location, (buffer, *layout));
    }

    fn set_vertex_attrib_array_enabled(&mut self, location: u32, enabled: bool) {
        self.record(GlCall::SetVertexAttribArrayEnabled { location, enabled });
        if enabled {
            self.state.enabled_attributes.insert(location);
        } else {
            self.state.enabled_attributes.remove(&location);
        }
    }

    fn draw_arrays(&mut self, topology: PrimitiveTopology, first: u32, count: u32) {
        self.record(GlCall::DrawArrays { topology, first, count });
        self.validate_draw();
    }

    fn draw_elements(&mut self, topology: PrimitiveTopology, count: u32, format: IndexFormat, byte_offset: u32) {
        self.record(GlCall::DrawElements {
            topology,
            count,
            format,
            byte_offset,
        });
        if self.state.element_array_buffer.is_none() {
            self.gl_error("INVALID_OPERATION: indexed draw with no element array buffer bound".to_owned());
        }
        self.validate_draw();
    }
}

impl HeadlessContext {
    fn validate_draw(&mut self) {
        if self.state.program.is_none() {
            self.gl_error("INVALID_OPERATION: draw with no current program".to_owned());
        }
        let unpointed: Vec<u32> = self
            .state
            .enabled_attributes
            .iter()
            .copied()
            .filter(|location| !self.state.attribute_pointers.contains_key(location))
            .collect();
        for location in unpointed {
            self.gl_error(format!(
                "INVALID_OPERATION: attribute array {location} enabled without a pointer"
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prism_core::renderer::TextureFormat;

    fn texture(width: u32, height: u32) -> TextureDescriptor<'static> {
        TextureDescriptor {
            label: Some("target"),
            width,
            height,
            format: TextureFormat::Rgba8,
            data: None,
            sampler: None,
            generate_mipmaps: false,
        }
    }

    #[test]
    fn test_framebuffer_completeness() {
        let mut ctx = HeadlessContext::new();
        let color = ctx.create_texture(&texture(64, 64)).unwrap();
        let depth = ctx.create_renderbuffer(RenderbufferFormat::Depth16, 64, 64).unwrap();
        let small_depth = ctx.create_renderbuffer(RenderbufferFormat::Depth16, 32, 32).unwrap();
        let depth_stencil = ctx.create_renderbuffer(RenderbufferFormat::DepthStencil, 64, 64).unwrap();

        let complete = FramebufferDescriptor {
            color: Some(Attachment::Texture(color)),
            depth: Some(Attachment::Renderbuffer(depth)),
            depth_stencil: None,
        };
        assert!(ctx.create_framebuffer(&complete).is_ok());

        let shared_color = FramebufferDescriptor {
            color: Some(Attachment::Texture(color)),
            depth: None,
            depth_stencil: Some(Attachment::Renderbuffer(depth_stencil)),
        };
        assert!(ctx.create_framebuffer(&shared_color).is_ok());

        let mismatched = FramebufferDescriptor {
            depth: Some(Attachment::Renderbuffer(small_depth)),
            ..complete
        };
        assert_eq!(
            ctx.create_framebuffer(&mismatched),
            Err(ResourceError::IncompleteFramebuffer {
                status: FRAMEBUFFER_INCOMPLETE_DIMENSIONS
            })
        );

        let wrong_format = FramebufferDescriptor {
            depth: Some(Attachment::Renderbuffer(depth_stencil)),
            ..complete
        };
        assert_eq!(
            ctx.create_framebuffer(&wrong_format),
            Err(ResourceError::IncompleteFramebuffer {
                status: FRAMEBUFFER_INCOMPLETE_ATTACHMENT
            })
        );

        let empty = FramebufferDescriptor {
            color: None,
            depth: None,
            depth_stencil: None,
        };
        assert_eq!(
            ctx.create_framebuffer(&empty),
            Err(ResourceError::IncompleteFramebuffer {
                status: FRAMEBUFFER_INCOMPLETE_MISSING_ATTACHMENT
            })
        );
    }

    #[test]
    fn test_texture_data_must_match_dimensions() {
        let mut ctx = HeadlessContext::new();
        let pixels = [255u8; 2 * 2 * 4];
        let ok = TextureDescriptor {
            data: Some(&pixels),
            ..texture(2, 2)
        };
        let id = ctx.create_texture(&ok).unwrap();
        assert_eq!(ctx.texture_size(id), Some((2, 2)));

        let short = TextureDescriptor {
            data: Some(&pixels[..8]),
            ..texture(2, 2)
        };
        assert!(matches!(
            ctx.create_texture(&short),
            Err(ResourceError::CreationFailed { kind: "texture", .. })
        ));
    }

    #[test]
    fn test_misuse_is_reported_not_fatal() {
        let mut ctx = HeadlessContext::new();
        ctx.use_program(Some(ProgramId(42)));
        ctx.draw_arrays(PrimitiveTopology::TriangleList, 0, 3);

        assert_eq!(ctx.state().program, None);
        assert_eq!(ctx.errors().len(), 2);
        assert_eq!(ctx.draw_calls().count(), 1);
    }

    #[test]
    fn test_state_tracking() {
        let mut ctx = HeadlessContext::new();
        assert!(ctx.state().depth_write);
        assert_eq!(ctx.state().depth_func, CompareFunction::Less);

        ctx.set_capability(Capability::DepthTest, true);
        ctx.depth_func(CompareFunction::LessEqual);
        ctx.stencil_op_separate(
            StencilFace::Front,
            StencilOperation::Keep,
            StencilOperation::Keep,
            StencilOperation::Zero,
        );

        let state = ctx.state();
        assert!(state.is_enabled(Capability::DepthTest));
        assert!(!state.is_enabled(Capability::StencilTest));
        assert_eq!(state.depth_func, CompareFunction::LessEqual);
        assert_eq!(state.stencil_front.pass_op, StencilOperation::Zero);
        assert_eq!(state.stencil_back.pass_op, StencilOperation::Keep);
        assert_eq!(ctx.calls().len(), 3);
    }
}
