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

//! Executes commands against a graphics context.

use super::uniform_dispatch::upload_uniform;
use log::{debug, trace};
use prism_core::renderer::api::command::{Command, Opcode, UniformValue};
use prism_core::renderer::api::node::{DrawArguments, Node};
use prism_core::renderer::api::pipeline::{
    Capability, FixedFunctionState, PipelineStateObject, ResolvedPipeline, RootBinding, RootParameterKind, RootSlot,
    StencilFace,
};
use prism_core::renderer::{
    BufferTarget, ClearFlags, DispatchError, FrameStats, GraphicsContext, TextureBinding, VertexAttribLayout,
};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

/// Interprets commands one at a time, tracking the bound pipeline.
///
/// The interpreter owns the only mutable rendering state besides the context
/// itself: the bound pipeline and the set of enabled vertex attribute
/// locations. Both persist across commands until the next
/// `SetPipelineState` or [`CommandInterpreter::reset`].
#[derive(Debug, Default)]
pub struct CommandInterpreter {
    bound: Option<Arc<ResolvedPipeline>>,
    enabled_attributes: BTreeSet<u32>,
    stats: FrameStats,
}

impl CommandInterpreter {
    /// Creates an interpreter with no pipeline bound.
    pub fn new() -> Self {
        Self::default()
    }

    /// The currently bound pipeline, if any.
    pub fn bound_pipeline(&self) -> Option<&ResolvedPipeline> {
        self.bound.as_deref()
    }

    /// Forgets the bound pipeline. Commands that need one fail until the
    /// next `SetPipelineState`.
    pub fn reset(&mut self) {
        self.bound = None;
    }

    /// Starts a new pass: resets the bound pipeline and counts the pass.
    pub fn begin_pass(&mut self) {
        self.reset();
        self.stats.passes += 1;
    }

    /// Statistics accumulated since the last [`CommandInterpreter::take_stats`].
    pub fn stats(&self) -> FrameStats {
        self.stats
    }

    /// Returns the accumulated statistics and starts counting from zero.
    pub fn take_stats(&mut self) -> FrameStats {
        std::mem::take(&mut self.stats)
    }

    /// Executes one command.
    ///
    /// # Errors
    ///
    /// Returns a [`DispatchError`] when the command cannot be executed with
    /// the current bindings. Context calls issued before the failure are not
    /// rolled back.
    pub fn interpret(&mut self, ctx: &mut dyn GraphicsContext, command: &Command<'_>) -> Result<(), DispatchError> {
        trace!("Interpreting '{}'", command.opcode());
        match command {
            Command::SetFramebuffer(framebuffer) => ctx.bind_framebuffer(*framebuffer),
            Command::ClearColor(rgba) => {
                ctx.set_clear_color(*rgba);
                ctx.clear(ClearFlags::COLOR);
            }
            Command::ClearDepth(depth) => {
                ctx.set_clear_depth(*depth);
                ctx.clear(ClearFlags::DEPTH);
            }
            Command::ClearStencil(stencil) => {
                ctx.set_clear_stencil(*stencil);
                ctx.clear(ClearFlags::STENCIL);
            }
            Command::SetPipelineState(pso) => self.set_pipeline_state(ctx, pso)?,
            Command::SetRootUniforms(values) => self.set_root_uniforms(ctx, values)?,
            Command::SetActiveTextures(bindings) => self.set_active_textures(ctx, bindings)?,
            Command::SetRootSamplers(units) => self.set_root_samplers(ctx, units)?,
            Command::DrawNodes(nodes) => self.draw_nodes(ctx, nodes)?,
        }
        self.stats.commands += 1;
        Ok(())
    }

    fn set_pipeline_state(
        &mut self,
        ctx: &mut dyn GraphicsContext,
        pso: &PipelineStateObject,
    ) -> Result<(), DispatchError> {
        let resolved = pso.resolved().ok_or_else(|| DispatchError::PipelineNotBuilt {
            pipeline: pso.label().to_owned(),
        })?;

        ctx.use_program(Some(resolved.program));
        apply_fixed_function_state(ctx, &resolved.state);

        debug!("Bound pipeline '{}'", resolved.label);
        self.bound = Some(Arc::clone(resolved));
        self.stats.pipeline_binds += 1;
        Ok(())
    }

    fn set_root_uniforms(
        &mut self,
        ctx: &mut dyn GraphicsContext,
        values: &BTreeMap<RootSlot, UniformValue>,
    ) -> Result<(), DispatchError> {
        let pipeline = self.require_bound(Opcode::SetRootUniforms)?;
        for (slot, value) in values {
            let binding = root_binding(&pipeline, slot, RootParameterKind::Uniform)?;
            upload_uniform(ctx, slot, &binding.uniform, value)?;
            self.stats.uniform_uploads += 1;
        }
        Ok(())
    }

    fn set_active_textures(
        &mut self,
        ctx: &mut dyn GraphicsContext,
        bindings: &[TextureBinding],
    ) -> Result<(), DispatchError> {
        self.require_bound(Opcode::SetActiveTextures)?;
        for binding in bindings {
            ctx.active_texture(binding.unit);
            ctx.bind_texture(binding.target, Some(binding.texture));
            if let Some(sampler) = &binding.sampler {
                ctx.apply_sampler(binding.target, sampler);
            }
            self.stats.texture_binds += 1;
        }
        Ok(())
    }

    fn set_root_samplers(
        &mut self,
        ctx: &mut dyn GraphicsContext,
        units: &BTreeMap<RootSlot, u32>,
    ) -> Result<(), DispatchError> {
        let pipeline = self.require_bound(Opcode::SetRootSamplers)?;
        for (slot, unit) in units {
            let binding = root_binding(&pipeline, slot, RootParameterKind::Sampler)?;
            let unit = i32::try_from(*unit).map_err(|_| DispatchError::UniformValueMismatch {
                slot: slot.clone(),
                data_type: binding.uniform.data_type,
                size: binding.uniform.size,
                value_kind: "texture unit",
                value_len: 1,
            })?;
            upload_uniform(ctx, slot, &binding.uniform, &UniformValue::Int(unit))?;
            self.stats.uniform_uploads += 1;
        }
        Ok(())
    }

    fn draw_nodes(&mut self, ctx: &mut dyn GraphicsContext, nodes: &[&Node]) -> Result<(), DispatchError> {
        let pipeline = self.require_bound(Opcode::DrawNodes)?;
        let owned = pipeline.attribute_locations();

        // Locations left enabled by a previous pipeline would read stale buffers.
        let stale: Vec<u32> = self
            .enabled_attributes
            .iter()
            .copied()
            .filter(|location| !owned.contains(location))
            .collect();
        for location in stale {
            ctx.set_vertex_attrib_array_enabled(location, false);
            self.enabled_attributes.remove(&location);
        }

        for node in nodes {
            self.draw_node(ctx, &pipeline, &owned, node)?;
        }
        Ok(())
    }

    fn draw_node(
        &mut self,
        ctx: &mut dyn GraphicsContext,
        pipeline: &ResolvedPipeline,
        owned: &[u32],
        node: &Node,
    ) -> Result<(), DispatchError> {
        // Validate before issuing any call for this node.
        let index_byte_offset = match (node.draw, node.index_buffer) {
            (DrawArguments::Indexed { .. }, None) => return Err(DispatchError::MissingIndexBufferView),
            (DrawArguments::Indexed { start_index, .. }, Some(view)) => Some(
                start_index
                    .checked_mul(view.format.size_in_bytes())
                    .and_then(|bytes| bytes.checked_add(view.offset))
                    .ok_or(DispatchError::IndexOffsetOverflow {
                        start_index,
                        view_offset: view.offset,
                    })?,
            ),
            (DrawArguments::NonIndexed { .. }, _) => None,
        };
        for (slot, locations) in &pipeline.locations_by_slot {
            if !node.vertex_buffers.contains_key(slot) {
                let attribute = locations
                    .first()
                    .and_then(|location| pipeline.elements_by_location.get(location))
                    .map(|(name, _)| name.clone())
                    .unwrap_or_default();
                return Err(DispatchError::MissingVertexBufferView {
                    slot: slot.clone(),
                    attribute,
                });
            }
        }

        // --- Vertex input ---
        for (slot, view) in &node.vertex_buffers {
            let Some(locations) = pipeline.locations_by_slot.get(slot) else {
                continue;
            };
            ctx.bind_buffer(BufferTarget::Array, Some(view.buffer));
            for location in locations {
                let Some((_, element)) = pipeline.elements_by_location.get(location) else {
                    continue;
                };
                let layout = VertexAttribLayout {
                    size: element.size,
                    component_type: element.component_type,
                    normalized: element.normalized,
                    stride: view.stride.unwrap_or(element.stride),
                    offset: element.offset + view.offset.unwrap_or(0),
                };
                ctx.vertex_attrib_pointer(*location, &layout);
            }
        }

        for &location in owned {
            let fed = pipeline.elements_by_location.contains_key(&location);
            let enabled = self.enabled_attributes.contains(&location);
            if fed != enabled {
                ctx.set_vertex_attrib_array_enabled(location, fed);
                if fed {
                    self.enabled_attributes.insert(location);
                } else {
                    self.enabled_attributes.remove(&location);
                }
            }
        }

        if let Some(index_view) = &node.index_buffer {
            ctx.bind_buffer(BufferTarget::ElementArray, Some(index_view.buffer));
        }

        // --- Draw ---
        match node.draw {
            DrawArguments::NonIndexed {
                topology,
                vertex_count,
                start_vertex,
            } => {
                ctx.draw_arrays(topology, start_vertex, vertex_count);
                self.stats.elements_submitted += u64::from(vertex_count);
            }
            DrawArguments::Indexed {
                topology,
                index_count,
                ..
            } => {
                let (Some(index_view), Some(byte_offset)) = (node.index_buffer, index_byte_offset) else {
                    return Err(DispatchError::MissingIndexBufferView);
                };
                ctx.draw_elements(topology, index_count, index_view.format, byte_offset);
                self.stats.elements_submitted += u64::from(index_count);
            }
        }
        self.stats.draw_calls += 1;

        trace!(
            "Drew node '{}' with pipeline '{}'",
            node.label.as_deref().unwrap_or("<unnamed>"),
            pipeline.label
        );
        Ok(())
    }

    fn require_bound(&self, opcode: Opcode) -> Result<Arc<ResolvedPipeline>, DispatchError> {
        self.bound.clone().ok_or(DispatchError::NoPipelineBound {
            opcode: opcode.as_str(),
        })
    }
}

/// Looks up a root slot of the bound pipeline and checks its kind.
fn root_binding<'p>(
    pipeline: &'p ResolvedPipeline,
    slot: &RootSlot,
    requested: RootParameterKind,
) -> Result<&'p RootBinding, DispatchError> {
    let binding = pipeline
        .root_bindings
        .get(slot)
        .ok_or_else(|| DispatchError::UnboundRootParameter {
            pipeline: pipeline.label.clone(),
            slot: slot.clone(),
        })?;
    if binding.kind != requested {
        return Err(DispatchError::RootParameterKindMismatch {
            slot: slot.clone(),
            declared: binding.kind,
            requested,
        });
    }
    Ok(binding)
}

/// Applies every fixed-function field, so nothing leaks from the previously
/// bound pipeline.
fn apply_fixed_function_state(ctx: &mut dyn GraphicsContext, state: &FixedFunctionState) {
    let rasterizer = &state.rasterizer;
    ctx.set_capability(Capability::CullFace, rasterizer.cull_enable);
    ctx.cull_face(rasterizer.cull_mode);

    let depth_stencil = &state.depth_stencil;
    ctx.set_capability(Capability::DepthTest, depth_stencil.depth_enable);
    ctx.depth_func(depth_stencil.depth_func);
    ctx.depth_mask(depth_stencil.depth_mask);
    ctx.set_capability(Capability::StencilTest, depth_stencil.stencil_enable);
    ctx.stencil_mask(depth_stencil.stencil_write_mask);
    for (face, stencil) in [
        (StencilFace::Front, &depth_stencil.front),
        (StencilFace::Back, &depth_stencil.back),
    ] {
        ctx.stencil_func_separate(face, stencil.func, stencil.reference, stencil.read_mask);
        ctx.stencil_op_separate(face, stencil.fail_op, stencil.depth_fail_op, stencil.pass_op);
    }

    let blend = &state.blend;
    ctx.set_capability(Capability::Blend, blend.blend_enable);
    ctx.blend_func(blend.src_blend, blend.dst_blend);
    ctx.color_mask(blend.write_mask);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render_lane::pipeline_builder::build_pipeline_state;
    use prism_core::renderer::api::pipeline::{
        InputElementDescriptor, InputLayout, PipelineStateDescriptor, RootParameter, RootSignature,
    };
    use prism_core::renderer::{BufferId, IndexBufferView, IndexFormat, PrimitiveTopology, VertexBufferView};
    use prism_infra::graphics::headless::{GlCall, HeadlessContext};

    const VS: &str = "\
attribute highp vec3 POSITION;
void main() {
    gl_Position = vec4(POSITION, 1.0);
}
";

    const FS: &str = "\
uniform lowp vec4 COLOR;
void main() {
    gl_FragColor = COLOR;
}
";

    fn built_pipeline(ctx: &mut HeadlessContext) -> PipelineStateObject {
        let desc = PipelineStateDescriptor::new("flat")
            .with_shaders(VS, FS)
            .with_input_layout(
                InputLayout::new().with_element(
                    "POSITION",
                    InputElementDescriptor::float("meshVertices", 3).with_stride_offset(12, 0),
                ),
            )
            .with_root_signature(RootSignature::new().with_parameter("tintColor", RootParameter::uniform("COLOR")));
        let mut pso = PipelineStateObject::new(desc);
        build_pipeline_state(ctx, &mut pso).unwrap();
        pso
    }

    #[test]
    fn test_clear_sets_value_then_clears() {
        let mut ctx = HeadlessContext::new();
        let mut interpreter = CommandInterpreter::new();
        interpreter
            .interpret(&mut ctx, &Command::ClearColor([1.0, 1.0, 1.0, 1.0]))
            .unwrap();
        assert_eq!(
            ctx.calls(),
            &[GlCall::SetClearColor([1.0, 1.0, 1.0, 1.0]), GlCall::Clear(ClearFlags::COLOR)]
        );
        assert_eq!(interpreter.stats().commands, 1);
    }

    #[test]
    fn test_commands_needing_a_pipeline_fail_without_one() {
        let mut ctx = HeadlessContext::new();
        let mut interpreter = CommandInterpreter::new();

        let err = interpreter
            .interpret(&mut ctx, &Command::root_uniforms([("tintColor", vec![1.0f32; 4])]))
            .unwrap_err();
        assert_eq!(err, DispatchError::NoPipelineBound { opcode: "setRootUniforms" });

        let err = interpreter.interpret(&mut ctx, &Command::DrawNodes(Vec::new())).unwrap_err();
        assert_eq!(err, DispatchError::NoPipelineBound { opcode: "drawNodes" });
        assert!(ctx.calls().is_empty());
    }

    #[test]
    fn test_unbuilt_pipeline_cannot_be_bound() {
        let mut ctx = HeadlessContext::new();
        let mut interpreter = CommandInterpreter::new();
        let pso = PipelineStateObject::new(PipelineStateDescriptor::new("raw"));

        let err = interpreter
            .interpret(&mut ctx, &Command::SetPipelineState(&pso))
            .unwrap_err();
        assert_eq!(err, DispatchError::PipelineNotBuilt { pipeline: "raw".into() });
        assert!(interpreter.bound_pipeline().is_none());
    }

    #[test]
    fn test_root_slot_lookup_errors() {
        let mut ctx = HeadlessContext::new();
        let pso = built_pipeline(&mut ctx);
        let mut interpreter = CommandInterpreter::new();
        interpreter.interpret(&mut ctx, &Command::SetPipelineState(&pso)).unwrap();

        let err = interpreter
            .interpret(&mut ctx, &Command::root_uniforms([("missing", 1.0f32)]))
            .unwrap_err();
        assert_eq!(
            err,
            DispatchError::UnboundRootParameter {
                pipeline: "flat".into(),
                slot: "missing".into()
            }
        );

        let err = interpreter
            .interpret(&mut ctx, &Command::root_samplers([("tintColor", 0)]))
            .unwrap_err();
        assert_eq!(
            err,
            DispatchError::RootParameterKindMismatch {
                slot: "tintColor".into(),
                declared: RootParameterKind::Uniform,
                requested: RootParameterKind::Sampler,
            }
        );
    }

    #[test]
    fn test_indexed_draw_offsets_and_missing_views() {
        let mut ctx = HeadlessContext::new();
        let pso = built_pipeline(&mut ctx);
        let mut interpreter = CommandInterpreter::new();
        interpreter.interpret(&mut ctx, &Command::SetPipelineState(&pso)).unwrap();

        let draw = DrawArguments::Indexed {
            topology: PrimitiveTopology::TriangleList,
            index_count: 6,
            start_index: 3,
        };
        let no_indices = Node::new(draw).with_vertex_buffer("meshVertices", VertexBufferView::new(BufferId(1)));
        let err = interpreter
            .interpret(&mut ctx, &Command::DrawNodes(vec![&no_indices]))
            .unwrap_err();
        assert_eq!(err, DispatchError::MissingIndexBufferView);

        let no_vertices = Node::new(draw).with_index_buffer(IndexBufferView {
            buffer: BufferId(2),
            format: IndexFormat::Uint16,
            offset: 4,
        });
        let err = interpreter
            .interpret(&mut ctx, &Command::DrawNodes(vec![&no_vertices]))
            .unwrap_err();
        assert_eq!(
            err,
            DispatchError::MissingVertexBufferView {
                slot: "meshVertices".into(),
                attribute: "POSITION".into()
            }
        );

        let node = no_vertices
            .clone()
            .with_vertex_buffer("meshVertices", VertexBufferView::new(BufferId(1)));
        ctx.clear_calls();
        interpreter.interpret(&mut ctx, &Command::DrawNodes(vec![&node])).unwrap();
        assert_eq!(
            ctx.calls().last(),
            Some(&GlCall::DrawElements {
                topology: PrimitiveTopology::TriangleList,
                count: 6,
                format: IndexFormat::Uint16,
                byte_offset: 4 + 3 * 2,
            })
        );
        assert!(ctx
            .calls()
            .contains(&GlCall::BindBuffer(BufferTarget::ElementArray, Some(BufferId(2)))));

        let stats = interpreter.stats();
        assert_eq!(stats.draw_calls, 1);
        assert_eq!(stats.elements_submitted, 6);
    }

    #[test]
    fn test_index_offset_overflow_is_rejected_before_any_call() {
        let mut ctx = HeadlessContext::new();
        let pso = built_pipeline(&mut ctx);
        let mut interpreter = CommandInterpreter::new();
        interpreter.interpret(&mut ctx, &Command::SetPipelineState(&pso)).unwrap();

        let node = Node::new(DrawArguments::Indexed {
            topology: PrimitiveTopology::TriangleList,
            index_count: 3,
            start_index: 0x4000_0000,
        })
        .with_vertex_buffer("meshVertices", VertexBufferView::new(BufferId(1)))
        .with_index_buffer(IndexBufferView {
            buffer: BufferId(2),
            format: IndexFormat::Uint32,
            offset: 0,
        });
        ctx.clear_calls();
        let err = interpreter
            .interpret(&mut ctx, &Command::DrawNodes(vec![&node]))
            .unwrap_err();
        assert_eq!(
            err,
            DispatchError::IndexOffsetOverflow {
                start_index: 0x4000_0000,
                view_offset: 0
            }
        );
        assert!(ctx.calls().is_empty());
        assert_eq!(interpreter.stats().draw_calls, 0);
    }

    #[test]
    fn test_sampler_unit_out_of_range() {
        let mut ctx = HeadlessContext::new();
        let desc = PipelineStateDescriptor::new("textured")
            .with_shaders(VS, "uniform sampler2D TEX;\nvoid main() {\n    gl_FragColor = texture2D(TEX, vec2(0.0));\n}\n")
            .with_input_layout(
                InputLayout::new().with_element("POSITION", InputElementDescriptor::float("meshVertices", 3)),
            )
            .with_root_signature(RootSignature::new().with_parameter("tex", RootParameter::sampler("TEX")));
        let mut pso = PipelineStateObject::new(desc);
        build_pipeline_state(&mut ctx, &mut pso).unwrap();
        let mut interpreter = CommandInterpreter::new();
        interpreter.interpret(&mut ctx, &Command::SetPipelineState(&pso)).unwrap();

        ctx.clear_calls();
        let err = interpreter
            .interpret(&mut ctx, &Command::root_samplers([("tex", u32::MAX)]))
            .unwrap_err();
        assert!(matches!(
            err,
            DispatchError::UniformValueMismatch {
                value_kind: "texture unit",
                ..
            }
        ));
        assert!(ctx.calls().is_empty());

        interpreter
            .interpret(&mut ctx, &Command::root_samplers([("tex", 1)]))
            .unwrap();
        assert_eq!(interpreter.stats().uniform_uploads, 1);
    }

    #[test]
    fn test_view_stride_and_offset_override_the_layout() {
        let mut ctx = HeadlessContext::new();
        let pso = built_pipeline(&mut ctx);
        let mut interpreter = CommandInterpreter::new();
        interpreter.interpret(&mut ctx, &Command::SetPipelineState(&pso)).unwrap();

        let view = VertexBufferView {
            buffer: BufferId(9),
            stride: Some(24),
            offset: Some(8),
        };
        let node = Node::new(DrawArguments::NonIndexed {
            topology: PrimitiveTopology::TriangleList,
            vertex_count: 3,
            start_vertex: 0,
        })
        .with_vertex_buffer("meshVertices", view);
        interpreter.interpret(&mut ctx, &Command::DrawNodes(vec![&node])).unwrap();

        let location = pso.resolved().unwrap().attributes["POSITION"].location;
        let pointer = ctx.calls().iter().find_map(|call| match call {
            GlCall::VertexAttribPointer { location: l, layout, .. } if *l == location => Some(*layout),
            _ => None,
        });
        let layout = pointer.expect("attribute pointer was set");
        assert_eq!(layout.stride, 24);
        assert_eq!(layout.offset, 8);
        assert_eq!(layout.size, 3);
    }

    #[test]
    fn test_begin_pass_unbinds_and_counts() {
        let mut ctx = HeadlessContext::new();
        let pso = built_pipeline(&mut ctx);
        let mut interpreter = CommandInterpreter::new();
        interpreter.interpret(&mut ctx, &Command::SetPipelineState(&pso)).unwrap();
        assert_eq!(interpreter.bound_pipeline().map(|p| p.label.as_str()), Some("flat"));

        interpreter.begin_pass();
        assert!(interpreter.bound_pipeline().is_none());
        let stats = interpreter.take_stats();
        assert_eq!(stats.passes, 1);
        assert_eq!(stats.pipeline_binds, 1);
        assert_eq!(interpreter.stats(), FrameStats::default());
    }
}
