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

use super::conversions::{shader_data_type_from_gl, IntoGl};
use glow::HasContext;
use log::{debug, info, warn};
use prism_core::renderer::api::pipeline::{
    ActiveAttribute, ActiveUniform, BlendFactor, Capability, ColorWrites, CompareFunction, CullMode, IndexFormat,
    PrimitiveTopology, ShaderStage, StencilFace, StencilOperation,
};
use prism_core::renderer::{
    Attachment, BufferId, BufferTarget, ClearFlags, FramebufferDescriptor, FramebufferId, GraphicsContext, ProgramId,
    RenderbufferFormat, RenderbufferId, ResourceError, SamplerDescriptor, ShaderId, TextureDescriptor, TextureId,
    TextureTarget, UniformData, UniformLocation, VertexAttribLayout,
};
use std::collections::HashMap;
use std::fmt;

type GlShader = <glow::Context as HasContext>::Shader;
type GlProgram = <glow::Context as HasContext>::Program;
type GlBuffer = <glow::Context as HasContext>::Buffer;
type GlTexture = <glow::Context as HasContext>::Texture;
type GlRenderbuffer = <glow::Context as HasContext>::Renderbuffer;
type GlFramebuffer = <glow::Context as HasContext>::Framebuffer;
type GlUniformLocation = <glow::Context as HasContext>::UniformLocation;

struct LinkedProgram {
    native: GlProgram,
    attributes: Vec<ActiveAttribute>,
    uniforms: Vec<ActiveUniform>,
}

/// A [`GraphicsContext`] over OpenGL (ES 2.0 / WebGL 1 feature level) through `glow`.
///
/// Native objects never leave this type: callers hold opaque ids that are
/// resolved through per-kind handle tables. Uniform locations are ids too;
/// they are resolved against the program that was current when reflected.
pub struct GlowContext {
    gl: glow::Context,
    next_handle: u32,
    shaders: HashMap<ShaderId, GlShader>,
    programs: HashMap<ProgramId, LinkedProgram>,
    buffers: HashMap<BufferId, GlBuffer>,
    textures: HashMap<TextureId, GlTexture>,
    renderbuffers: HashMap<RenderbufferId, GlRenderbuffer>,
    framebuffers: HashMap<FramebufferId, GlFramebuffer>,
    uniform_locations: HashMap<UniformLocation, GlUniformLocation>,
}

impl fmt::Debug for GlowContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GlowContext")
            .field("shaders", &self.shaders.len())
            .field("programs", &self.programs.len())
            .field("buffers", &self.buffers.len())
            .field("textures", &self.textures.len())
            .field("renderbuffers", &self.renderbuffers.len())
            .field("framebuffers", &self.framebuffers.len())
            .finish()
    }
}

impl GlowContext {
    /// Wraps a current GL context.
    pub fn new(gl: glow::Context) -> Self {
        // SAFETY: `get_parameter_string` only reads a static driver string.
        let version = unsafe { gl.get_parameter_string(glow::VERSION) };
        info!("Initializing glow graphics context: {}", version);
        Self {
            gl,
            next_handle: 0,
            shaders: HashMap::new(),
            programs: HashMap::new(),
            buffers: HashMap::new(),
            textures: HashMap::new(),
            renderbuffers: HashMap::new(),
            framebuffers: HashMap::new(),
            uniform_locations: HashMap::new(),
        }
    }

    /// The wrapped GL context.
    pub fn gl(&self) -> &glow::Context {
        &self.gl
    }

    fn allocate(&mut self) -> u32 {
        self.next_handle += 1;
        self.next_handle
    }

    fn reflect(&mut self, program: GlProgram) -> (Vec<ActiveAttribute>, Vec<ActiveUniform>) {
        let mut attributes = Vec::new();
        let mut uniforms = Vec::new();
        unsafe {
            for index in 0..self.gl.get_active_attributes(program) {
                let Some(attribute) = self.gl.get_active_attribute(program, index) else {
                    continue;
                };
                let Some(location) = self.gl.get_attrib_location(program, &attribute.name) else {
                    continue;
                };
                attributes.push(ActiveAttribute {
                    name: attribute.name,
                    size: attribute.size.max(1) as u32,
                    data_type: shader_data_type_from_gl(attribute.atype),
                    location,
                });
            }

            for index in 0..self.gl.get_active_uniforms(program) {
                let Some(uniform) = self.gl.get_active_uniform(program, index) else {
                    continue;
                };
                let Some(native) = self.gl.get_uniform_location(program, &uniform.name) else {
                    continue;
                };
                let location = UniformLocation(self.allocate());
                self.uniform_locations.insert(location, native);
                uniforms.push(ActiveUniform {
                    name: uniform.name,
                    size: uniform.size.max(1) as u32,
                    data_type: shader_data_type_from_gl(uniform.utype),
                    location,
                });
            }
        }
        (attributes, uniforms)
    }

    fn attach(&self, point: u32, attachment: Attachment) -> Result<(), ResourceError> {
        match attachment {
            Attachment::Texture(id) => {
                let texture = self.textures.get(&id).copied().ok_or(ResourceError::InvalidHandle {
                    kind: "texture",
                    id: id.0,
                })?;
                unsafe {
                    self.gl
                        .framebuffer_texture_2d(glow::FRAMEBUFFER, point, glow::TEXTURE_2D, Some(texture), 0);
                }
            }
            Attachment::Renderbuffer(id) => {
                let renderbuffer = self
                    .renderbuffers
                    .get(&id)
                    .copied()
                    .ok_or(ResourceError::InvalidHandle {
                        kind: "renderbuffer",
                        id: id.0,
                    })?;
                unsafe {
                    self.gl
                        .framebuffer_renderbuffer(glow::FRAMEBUFFER, point, glow::RENDERBUFFER, Some(renderbuffer));
                }
            }
        }
        Ok(())
    }

    fn write_sampler(&self, target: u32, sampler: &SamplerDescriptor) {
        unsafe {
            self.gl
                .tex_parameter_i32(target, glow::TEXTURE_MIN_FILTER, sampler.min_filter.into_gl());
            self.gl
                .tex_parameter_i32(target, glow::TEXTURE_MAG_FILTER, sampler.mag_filter.into_gl());
            self.gl.tex_parameter_i32(target, glow::TEXTURE_WRAP_S, sampler.wrap_s.into_gl());
            self.gl.tex_parameter_i32(target, glow::TEXTURE_WRAP_T, sampler.wrap_t.into_gl());
        }
    }
}

impl GraphicsContext for GlowContext {
    fn compile_shader(&mut self, stage: ShaderStage, source: &str) -> Result<ShaderId, ResourceError> {
        let shader = unsafe { self.gl.create_shader(stage.into_gl()) }
            .map_err(|reason| ResourceError::CreationFailed { kind: "shader", reason })?;
        unsafe {
            self.gl.shader_source(shader, source);
            self.gl.compile_shader(shader);
            if !self.gl.get_shader_compile_status(shader) {
                let log = self.gl.get_shader_info_log(shader);
                self.gl.delete_shader(shader);
                return Err(ResourceError::CompileFailed(log));
            }
        }
        let id = ShaderId(self.allocate());
        self.shaders.insert(id, shader);
        debug!("Compiled {} shader {}", stage, id.0);
        Ok(id)
    }

    fn delete_shader(&mut self, shader: ShaderId) {
        if let Some(native) = self.shaders.remove(&shader) {
            unsafe { self.gl.delete_shader(native) };
        }
    }

    fn link_program(&mut self, vertex: ShaderId, fragment: ShaderId) -> Result<ProgramId, ResourceError> {
        let vs = *self.shaders.get(&vertex).ok_or(ResourceError::InvalidHandle {
            kind: "shader",
            id: vertex.0,
        })?;
        let fs = *self.shaders.get(&fragment).ok_or(ResourceError::InvalidHandle {
            kind: "shader",
            id: fragment.0,
        })?;

        let program = unsafe { self.gl.create_program() }
            .map_err(|reason| ResourceError::CreationFailed { kind: "program", reason })?;
        unsafe {
            self.gl.attach_shader(program, vs);
            self.gl.attach_shader(program, fs);
            self.gl.link_program(program);
            self.gl.detach_shader(program, vs);
            self.gl.detach_shader(program, fs);
            if !self.gl.get_program_link_status(program) {
                let log = self.gl.get_program_info_log(program);
                self.gl.delete_program(program);
                return Err(ResourceError::LinkFailed(log));
            }
        }

        let (attributes, uniforms) = self.reflect(program);
        let id = ProgramId(self.allocate());
        self.programs.insert(
            id,
            LinkedProgram {
                native: program,
                attributes,
                uniforms,
            },
        );
        Ok(id)
    }

    fn delete_program(&mut self, program: ProgramId) {
        if let Some(linked) = self.programs.remove(&program) {
            for uniform in &linked.uniforms {
                self.uniform_locations.remove(&uniform.location);
            }
            unsafe { self.gl.delete_program(linked.native) };
        }
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
        let linked = self.programs.get(&program)?;
        unsafe { self.gl.get_attrib_location(linked.native, name) }
    }

    fn create_buffer(&mut self, target: BufferTarget, data: &[u8]) -> Result<BufferId, ResourceError> {
        let buffer = unsafe { self.gl.create_buffer() }
            .map_err(|reason| ResourceError::CreationFailed { kind: "buffer", reason })?;
        let gl_target = target.into_gl();
        unsafe {
            self.gl.bind_buffer(gl_target, Some(buffer));
            self.gl.buffer_data_u8_slice(gl_target, data, glow::STATIC_DRAW);
            self.gl.bind_buffer(gl_target, None);
        }
        let id = BufferId(self.allocate());
        self.buffers.insert(id, buffer);
        Ok(id)
    }

    fn create_texture(&mut self, descriptor: &TextureDescriptor<'_>) -> Result<TextureId, ResourceError> {
        let texture = unsafe { self.gl.create_texture() }
            .map_err(|reason| ResourceError::CreationFailed { kind: "texture", reason })?;
        unsafe {
            self.gl.bind_texture(glow::TEXTURE_2D, Some(texture));
        }
        if let Some(sampler) = &descriptor.sampler {
            self.write_sampler(glow::TEXTURE_2D, sampler);
        }
        unsafe {
            self.gl.tex_image_2d(
                glow::TEXTURE_2D,
                0,
                glow::RGBA as i32,
                descriptor.width as i32,
                descriptor.height as i32,
                0,
                glow::RGBA,
                glow::UNSIGNED_BYTE,
                descriptor.data,
            );
            if descriptor.generate_mipmaps {
                self.gl.generate_mipmap(glow::TEXTURE_2D);
            }
            self.gl.bind_texture(glow::TEXTURE_2D, None);
        }
        let id = TextureId(self.allocate());
        self.textures.insert(id, texture);
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
        let renderbuffer = unsafe { self.gl.create_renderbuffer() }
            .map_err(|reason| ResourceError::CreationFailed { kind: "renderbuffer", reason })?;
        unsafe {
            self.gl.bind_renderbuffer(glow::RENDERBUFFER, Some(renderbuffer));
            self.gl
                .renderbuffer_storage(glow::RENDERBUFFER, format.into_gl(), width as i32, height as i32);
            self.gl.bind_renderbuffer(glow::RENDERBUFFER, None);
        }
        let id = RenderbufferId(self.allocate());
        self.renderbuffers.insert(id, renderbuffer);
        Ok(id)
    }

    fn create_framebuffer(&mut self, descriptor: &FramebufferDescriptor) -> Result<FramebufferId, ResourceError> {
        let framebuffer = unsafe { self.gl.create_framebuffer() }
            .map_err(|reason| ResourceError::CreationFailed { kind: "framebuffer", reason })?;
        unsafe { self.gl.bind_framebuffer(glow::FRAMEBUFFER, Some(framebuffer)) };

        let attachments = [
            (glow::COLOR_ATTACHMENT0, descriptor.color),
            (glow::DEPTH_ATTACHMENT, descriptor.depth),
            (glow::DEPTH_STENCIL_ATTACHMENT, descriptor.depth_stencil),
        ];
        let attached = attachments
            .into_iter()
            .filter_map(|(point, attachment)| attachment.map(|a| (point, a)))
            .try_for_each(|(point, attachment)| self.attach(point, attachment));

        let status = unsafe { self.gl.check_framebuffer_status(glow::FRAMEBUFFER) };
        unsafe { self.gl.bind_framebuffer(glow::FRAMEBUFFER, None) };

        let result = attached.and_then(|()| {
            if status == glow::FRAMEBUFFER_COMPLETE {
                Ok(())
            } else {
                Err(ResourceError::IncompleteFramebuffer { status })
            }
        });
        if let Err(err) = result {
            unsafe { self.gl.delete_framebuffer(framebuffer) };
            return Err(err);
        }

        let id = FramebufferId(self.allocate());
        self.framebuffers.insert(id, framebuffer);
        Ok(id)
    }

    fn use_program(&mut self, program: Option<ProgramId>) {
        let native = match program {
            None => None,
            Some(id) => match self.programs.get(&id) {
                Some(linked) => Some(linked.native),
                None => {
                    warn!("use_program: unknown program {}", id.0);
                    return;
                }
            },
        };
        unsafe { self.gl.use_program(native) };
    }

    fn bind_framebuffer(&mut self, framebuffer: Option<FramebufferId>) {
        let native = match framebuffer {
            None => None,
            Some(id) => match self.framebuffers.get(&id) {
                Some(native) => Some(*native),
                None => {
                    warn!("bind_framebuffer: unknown framebuffer {}", id.0);
                    return;
                }
            },
        };
        unsafe { self.gl.bind_framebuffer(glow::FRAMEBUFFER, native) };
    }

    fn bind_buffer(&mut self, target: BufferTarget, buffer: Option<BufferId>) {
        let native = match buffer {
            None => None,
            Some(id) => match self.buffers.get(&id) {
                Some(native) => Some(*native),
                None => {
                    warn!("bind_buffer: unknown buffer {}", id.0);
                    return;
                }
            },
        };
        unsafe { self.gl.bind_buffer(target.into_gl(), native) };
    }

    fn active_texture(&mut self, unit: u32) {
        unsafe { self.gl.active_texture(glow::TEXTURE0 + unit) };
    }

    fn bind_texture(&mut self, target: TextureTarget, texture: Option<TextureId>) {
        let native = match texture {
            None => None,
            Some(id) => match self.textures.get(&id) {
                Some(native) => Some(*native),
                None => {
                    warn!("bind_texture: unknown texture {}", id.0);
                    return;
                }
            },
        };
        unsafe { self.gl.bind_texture(target.into_gl(), native) };
    }

    fn apply_sampler(&mut self, target: TextureTarget, sampler: &SamplerDescriptor) {
        self.write_sampler(target.into_gl(), sampler);
    }

    fn set_capability(&mut self, capability: Capability, enabled: bool) {
        unsafe {
            if enabled {
                self.gl.enable(capability.into_gl());
            } else {
                self.gl.disable(capability.into_gl());
            }
        }
    }

    fn cull_face(&mut self, mode: CullMode) {
        unsafe { self.gl.cull_face(mode.into_gl()) };
    }

    fn depth_func(&mut self, func: CompareFunction) {
        unsafe { self.gl.depth_func(func.into_gl()) };
    }

    fn depth_mask(&mut self, write: bool) {
        unsafe { self.gl.depth_mask(write) };
    }

    fn stencil_mask(&mut self, mask: u32) {
        unsafe { self.gl.stencil_mask(mask) };
    }

    fn stencil_func_separate(&mut self, face: StencilFace, func: CompareFunction, reference: i32, read_mask: u32) {
        unsafe {
            self.gl
                .stencil_func_separate(face.into_gl(), func.into_gl(), reference, read_mask)
        };
    }

    fn stencil_op_separate(
        &mut self,
        face: StencilFace,
        fail: StencilOperation,
        depth_fail: StencilOperation,
        pass: StencilOperation,
    ) {
        unsafe {
            self.gl
                .stencil_op_separate(face.into_gl(), fail.into_gl(), depth_fail.into_gl(), pass.into_gl())
        };
    }

    fn blend_func(&mut self, src: BlendFactor, dst: BlendFactor) {
        unsafe { self.gl.blend_func(src.into_gl(), dst.into_gl()) };
    }

    fn color_mask(&mut self, mask: ColorWrites) {
        let [r, g, b, a] = mask.to_rgba();
        unsafe { self.gl.color_mask(r, g, b, a) };
    }

    fn set_clear_color(&mut self, rgba: [f32; 4]) {
        let [r, g, b, a] = rgba;
        unsafe { self.gl.clear_color(r, g, b, a) };
    }

    fn set_clear_depth(&mut self, depth: f32) {
        unsafe { self.gl.clear_depth_f32(depth) };
    }

    fn set_clear_stencil(&mut self, stencil: i32) {
        unsafe { self.gl.clear_stencil(stencil) };
    }

    fn clear(&mut self, buffers: ClearFlags) {
        unsafe { self.gl.clear(buffers.into_gl()) };
    }

    fn set_uniform(&mut self, location: UniformLocation, data: UniformData<'_>) {
        let Some(native) = self.uniform_locations.get(&location) else {
            warn!("set_uniform: unknown uniform location {}", location.0);
            return;
        };
        let native = Some(native);
        unsafe {
            match data {
                UniformData::Float { components, values } => match components {
                    1 => self.gl.uniform_1_f32_slice(native, values),
                    2 => self.gl.uniform_2_f32_slice(native, values),
                    3 => self.gl.uniform_3_f32_slice(native, values),
                    4 => self.gl.uniform_4_f32_slice(native, values),
                    n => warn!("set_uniform: unsupported float component count {}", n),
                },
                UniformData::Int { components, values } => match components {
                    1 => self.gl.uniform_1_i32_slice(native, values),
                    2 => self.gl.uniform_2_i32_slice(native, values),
                    3 => self.gl.uniform_3_i32_slice(native, values),
                    4 => self.gl.uniform_4_i32_slice(native, values),
                    n => warn!("set_uniform: unsupported int component count {}", n),
                },
                UniformData::Matrix { dimension, values } => match dimension {
                    2 => self.gl.uniform_matrix_2_f32_slice(native, false, values),
                    3 => self.gl.uniform_matrix_3_f32_slice(native, false, values),
                    4 => self.gl.uniform_matrix_4_f32_slice(native, false, values),
                    n => warn!("set_uniform: unsupported matrix dimension {}", n),
                },
            }
        }
    }

    fn vertex_attrib_pointer(&mut self, location: u32, layout: &VertexAttribLayout) {
        unsafe {
            self.gl.vertex_attrib_pointer_f32(
                location,
                i32::from(layout.size),
                layout.component_type.into_gl(),
                layout.normalized,
                layout.stride as i32,
                layout.offset as i32,
            );
        }
    }

    fn set_vertex_attrib_array_enabled(&mut self, location: u32, enabled: bool) {
        unsafe {
            if enabled {
                self.gl.enable_vertex_attrib_array(location);
            } else {
                self.gl.disable_vertex_attrib_array(location);
            }
        }
    }

    fn draw_arrays(&mut self, topology: PrimitiveTopology, first: u32, count: u32) {
        unsafe { self.gl.draw_arrays(topology.into_gl(), first as i32, count as i32) };
    }

    fn draw_elements(&mut self, topology: PrimitiveTopology, count: u32, format: IndexFormat, byte_offset: u32) {
        unsafe {
            self.gl
                .draw_elements(topology.into_gl(), count as i32, format.into_gl(), byte_offset as i32)
        };
    }
}

impl Drop for GlowContext {
    fn drop(&mut self) {
        unsafe {
            for (_, framebuffer) in self.framebuffers.drain() {
                self.gl.delete_framebuffer(framebuffer);
            }
            for (_, renderbuffer) in self.renderbuffers.drain() {
                self.gl.delete_renderbuffer(renderbuffer);
            }
            for (_, texture) in self.textures.drain() {
                self.gl.delete_texture(texture);
            }
            for (_, buffer) in self.buffers.drain() {
                self.gl.delete_buffer(buffer);
            }
            for (_, linked) in self.programs.drain() {
                self.gl.delete_program(linked.native);
            }
            for (_, shader) in self.shaders.drain() {
                self.gl.delete_shader(shader);
            }
        }
        debug!("glow graphics context released");
    }
}
