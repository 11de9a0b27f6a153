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

//! End-to-end frames on the headless backend: pipelines are built, passes
//! are interpreted and the resulting GL state is inspected.

use prism_core::renderer::api::pipeline::{
    Capability, ColorWrites, CompareFunction, DepthStencilStateDescriptor, InputElementDescriptor, InputLayout,
    PipelineStateDescriptor, PipelineStateObject, RootParameter, RootSignature, ShaderDataType,
    StencilFaceDescriptor, StencilOperation,
};
use prism_core::renderer::{
    Attachment, BufferId, BufferTarget, Command, DispatchError, DrawArguments, FramebufferDescriptor,
    GraphicsContext, IndexBufferView, IndexFormat, Node, Pass, PrimitiveTopology, RenderbufferFormat,
    SamplerDescriptor, TextureBinding, TextureDescriptor, TextureFormat, TextureTarget, UniformValue,
    VertexBufferView, FilterMode, WrapMode,
};
use prism_core::math::Mat4;
use prism_infra::graphics::headless::{GlCall, HeadlessContext, RecordedUniform};
use prism_lanes::{build_pipeline_states, run_passes, CommandInterpreter};

const SCENE_VS: &str = r#"
uniform highp mat4 MODELWORLD;
uniform highp mat4 VIEWPROJECTION;
attribute highp vec3 POSITION;
void main() {
    gl_Position = VIEWPROJECTION * MODELWORLD * vec4(POSITION, 1.0);
}
"#;

const SCENE_FS: &str = r#"
uniform lowp vec4 COLOR;
void main() {
    gl_FragColor = COLOR;
}
"#;

const BLIT_VS: &str = r#"
attribute highp vec2 POSITION;
attribute highp vec2 TEXCOORD;
varying highp vec2 vTEXCOORD;
void main() {
    vTEXCOORD = TEXCOORD;
    gl_Position = vec4(POSITION, 0.0, 1.0);
}
"#;

const BLIT_FS: &str = r#"
uniform sampler2D BLITSAMPLER;
varying highp vec2 vTEXCOORD;
void main() {
    gl_FragColor = texture2D(BLITSAMPLER, vTEXCOORD);
}
"#;

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn scene_descriptor() -> PipelineStateDescriptor {
    PipelineStateDescriptor::new("scene")
        .with_shaders(SCENE_VS, SCENE_FS)
        .with_depth_stencil_state(DepthStencilStateDescriptor {
            depth_enable: Some(true),
            depth_func: Some(CompareFunction::LessEqual),
            ..Default::default()
        })
        .with_input_layout(InputLayout::new().with_element("POSITION", InputElementDescriptor::float("meshVertices", 3)))
        .with_root_signature(
            RootSignature::new()
                .with_parameter("modelWorld", RootParameter::uniform("MODELWORLD"))
                .with_parameter("viewProjection", RootParameter::uniform("VIEWPROJECTION"))
                .with_parameter("tintColor", RootParameter::uniform("COLOR")),
        )
}

fn blit_descriptor() -> PipelineStateDescriptor {
    PipelineStateDescriptor::new("blit")
        .with_shaders(BLIT_VS, BLIT_FS)
        .with_input_layout(
            InputLayout::new()
                .with_element(
                    "POSITION",
                    InputElementDescriptor::float("blitVertices", 2).with_stride_offset(16, 0),
                )
                .with_element(
                    "TEXCOORD",
                    InputElementDescriptor::float("blitVertices", 2).with_stride_offset(16, 8),
                ),
        )
        .with_root_signature(RootSignature::new().with_parameter("blitSampler", RootParameter::sampler("BLITSAMPLER")))
}

fn cube(vertices: BufferId, indices: BufferId) -> Node {
    Node::new(DrawArguments::Indexed {
        topology: PrimitiveTopology::TriangleList,
        index_count: 36,
        start_index: 0,
    })
    .with_label("cube")
    .with_vertex_buffer("meshVertices", VertexBufferView::new(vertices))
    .with_index_buffer(IndexBufferView {
        buffer: indices,
        format: IndexFormat::Uint16,
        offset: 0,
    })
}

fn blit_quad(vertices: BufferId) -> Node {
    Node::new(DrawArguments::NonIndexed {
        topology: PrimitiveTopology::TriangleStrip,
        vertex_count: 4,
        start_vertex: 0,
    })
    .with_label("blit")
    .with_vertex_buffer("blitVertices", VertexBufferView::new(vertices))
}

fn position(calls: &[GlCall], wanted: &GlCall) -> usize {
    calls
        .iter()
        .position(|call| call == wanted)
        .unwrap_or_else(|| panic!("{wanted:?} was not issued"))
}

#[test]
fn test_offscreen_scene_then_blit() {
    init();
    let mut ctx = HeadlessContext::new();

    let color = ctx
        .create_texture(&TextureDescriptor {
            label: Some("sceneColor"),
            width: 64,
            height: 64,
            format: TextureFormat::Rgba8,
            data: None,
            sampler: None,
            generate_mipmaps: false,
        })
        .unwrap();
    let depth = ctx.create_renderbuffer(RenderbufferFormat::Depth16, 64, 64).unwrap();
    let target = ctx
        .create_framebuffer(&FramebufferDescriptor {
            color: Some(Attachment::Texture(color)),
            depth: Some(Attachment::Renderbuffer(depth)),
            depth_stencil: None,
        })
        .unwrap();

    let mesh_vertices = ctx.create_buffer(BufferTarget::Array, &[0u8; 8 * 12]).unwrap();
    let mesh_indices = ctx.create_buffer(BufferTarget::ElementArray, &[0u8; 36 * 2]).unwrap();
    let quad_vertices = ctx.create_buffer(BufferTarget::Array, &[0u8; 4 * 16]).unwrap();

    let mut scene = PipelineStateObject::new(scene_descriptor());
    let mut blit = PipelineStateObject::new(blit_descriptor());
    assert_eq!(build_pipeline_states(&mut ctx, [&mut scene, &mut blit]).unwrap(), 2);

    let cube = cube(mesh_vertices, mesh_indices);
    let quad = blit_quad(quad_vertices);
    let sampler = SamplerDescriptor {
        min_filter: FilterMode::Nearest,
        mag_filter: FilterMode::Linear,
        wrap_s: WrapMode::ClampToEdge,
        wrap_t: WrapMode::ClampToEdge,
    };

    let passes = vec![
        Pass::new("scene")
            .with(Command::SetFramebuffer(Some(target)))
            .with(Command::ClearColor([1.0, 1.0, 1.0, 1.0]))
            .with(Command::ClearDepth(1.0))
            .with(Command::SetPipelineState(&scene))
            .with(Command::root_uniforms([
                ("modelWorld", UniformValue::from(cube.transform)),
                ("viewProjection", UniformValue::from(Mat4::IDENTITY)),
                ("tintColor", UniformValue::from([1.0f32, 0.0, 0.0, 1.0])),
            ]))
            .with(Command::DrawNodes(vec![&cube])),
        Pass::new("blit")
            .with(Command::SetFramebuffer(None))
            .with(Command::SetPipelineState(&blit))
            .with(Command::SetActiveTextures(vec![TextureBinding {
                unit: 0,
                target: TextureTarget::Texture2D,
                texture: color,
                sampler: Some(sampler),
            }]))
            .with(Command::root_samplers([("blitSampler", 0)]))
            .with(Command::DrawNodes(vec![&quad])),
    ];

    let mut interpreter = CommandInterpreter::new();
    run_passes(&mut interpreter, &mut ctx, &passes).unwrap();
    assert!(ctx.errors().is_empty(), "GL errors: {:?}", ctx.errors());

    let calls = ctx.calls();
    let offscreen = position(calls, &GlCall::BindFramebuffer(Some(target)));
    let onscreen = position(calls, &GlCall::BindFramebuffer(None));
    let depth_on = position(calls, &GlCall::SetCapability(Capability::DepthTest, true));
    let depth_off = position(calls, &GlCall::SetCapability(Capability::DepthTest, false));
    let draws: Vec<usize> = calls
        .iter()
        .enumerate()
        .filter(|(_, call)| call.is_draw())
        .map(|(index, _)| index)
        .collect();
    assert_eq!(draws.len(), 2);
    assert!(offscreen < depth_on && depth_on < draws[0]);
    assert!(draws[0] < onscreen && onscreen < depth_off && depth_off < draws[1]);

    let state = ctx.state();
    assert_eq!(state.framebuffer, None);
    assert!(!state.is_enabled(Capability::DepthTest));
    assert_eq!(state.bound_texture(0, TextureTarget::Texture2D), Some(color));
    assert_eq!(state.texture_samplers.get(&color), Some(&sampler));

    let blit_resolved = blit.resolved().unwrap();
    let sampler_location = blit_resolved.uniforms["BLITSAMPLER"].location;
    assert_eq!(
        state.uniform(blit_resolved.program, sampler_location),
        Some(&RecordedUniform::Int {
            components: 1,
            values: vec![0],
        })
    );

    let stats = interpreter.stats();
    assert_eq!(stats.passes, 2);
    assert_eq!(stats.pipeline_binds, 2);
    assert_eq!(stats.draw_calls, 2);
    assert_eq!(stats.elements_submitted, 36 + 4);
    assert_eq!(stats.texture_binds, 1);
    assert_eq!(stats.uniform_uploads, 4);
}

#[test]
fn test_switching_pipelines_rebinds_vertex_input() {
    init();
    let mut ctx = HeadlessContext::new();
    let mesh_vertices = ctx.create_buffer(BufferTarget::Array, &[0u8; 8 * 12]).unwrap();
    let quad_vertices = ctx.create_buffer(BufferTarget::Array, &[0u8; 4 * 16]).unwrap();

    let mut scene = PipelineStateObject::new(scene_descriptor());
    let mut blit = PipelineStateObject::new(blit_descriptor());
    build_pipeline_states(&mut ctx, [&mut scene, &mut blit]).unwrap();

    let triangle = Node::new(DrawArguments::NonIndexed {
        topology: PrimitiveTopology::TriangleList,
        vertex_count: 3,
        start_vertex: 0,
    })
    .with_vertex_buffer("meshVertices", VertexBufferView::new(mesh_vertices));
    let quad = blit_quad(quad_vertices);

    let mut interpreter = CommandInterpreter::new();
    for command in [Command::SetPipelineState(&blit), Command::DrawNodes(vec![&quad])] {
        interpreter.interpret(&mut ctx, &command).unwrap();
    }
    assert_eq!(ctx.state().enabled_attributes.len(), 2);
    ctx.clear_calls();

    let frame = [
        Command::SetPipelineState(&scene),
        Command::root_uniforms([("tintColor", [0.5f32, 0.5, 0.5, 1.0])]),
        Command::DrawNodes(vec![&triangle]),
    ];
    for command in &frame {
        interpreter.interpret(&mut ctx, command).unwrap();
    }

    let scene_resolved = scene.resolved().unwrap();
    let program_switches: Vec<&GlCall> = ctx
        .calls()
        .iter()
        .filter(|call| matches!(call, GlCall::UseProgram(_)))
        .collect();
    assert_eq!(program_switches, vec![&GlCall::UseProgram(Some(scene_resolved.program))]);

    let position_location = scene_resolved.attributes["POSITION"].location;
    let enabled: Vec<u32> = ctx.state().enabled_attributes.iter().copied().collect();
    assert_eq!(enabled, vec![position_location]);
    let (buffer, layout) = ctx.state().attribute_pointers[&position_location];
    assert_eq!(buffer, Some(mesh_vertices));
    assert_eq!(layout.size, 3);

    let draws: Vec<&GlCall> = ctx.draw_calls().collect();
    assert_eq!(
        draws,
        vec![&GlCall::DrawArrays {
            topology: PrimitiveTopology::TriangleList,
            first: 0,
            count: 3,
        }]
    );
    assert!(ctx.errors().is_empty());
}

#[test]
fn test_scalar_for_float_array_aborts_the_frame() {
    init();
    const WEIGHTED_FS: &str = r#"
uniform mediump float WEIGHTS[4];
void main() {
    gl_FragColor = vec4(WEIGHTS[0], WEIGHTS[1], WEIGHTS[2], WEIGHTS[3]);
}
"#;
    let mut ctx = HeadlessContext::new();
    let vertices = ctx.create_buffer(BufferTarget::Array, &[0u8; 36]).unwrap();
    let mut weighted = PipelineStateObject::new(
        PipelineStateDescriptor::new("weighted")
            .with_shaders(SCENE_VS, WEIGHTED_FS)
            .with_input_layout(
                InputLayout::new().with_element("POSITION", InputElementDescriptor::float("meshVertices", 3)),
            )
            .with_root_signature(RootSignature::new().with_parameter("weights", RootParameter::uniform("WEIGHTS"))),
    );
    build_pipeline_states(&mut ctx, [&mut weighted]).unwrap();
    assert_eq!(weighted.resolved().unwrap().uniforms["WEIGHTS"].size, 4);

    let triangle = Node::new(DrawArguments::NonIndexed {
        topology: PrimitiveTopology::TriangleList,
        vertex_count: 3,
        start_vertex: 0,
    })
    .with_vertex_buffer("meshVertices", VertexBufferView::new(vertices));

    let passes = [Pass::new("weighted")
        .with(Command::SetPipelineState(&weighted))
        .with(Command::root_uniforms([("weights", 1.0f32)]))
        .with(Command::DrawNodes(vec![&triangle]))];

    let mut interpreter = CommandInterpreter::new();
    let err = run_passes(&mut interpreter, &mut ctx, &passes).unwrap_err();
    assert_eq!(
        err,
        DispatchError::UniformValueMismatch {
            slot: "weights".into(),
            data_type: ShaderDataType::Float,
            size: 4,
            value_kind: "float",
            value_len: 1,
        }
    );
    assert_eq!(ctx.draw_calls().count(), 0);

    // The full array is accepted.
    let passes = [Pass::new("weighted")
        .with(Command::SetPipelineState(&weighted))
        .with(Command::root_uniforms([("weights", vec![0.1f32, 0.2, 0.3, 0.4])]))
        .with(Command::DrawNodes(vec![&triangle]))];
    run_passes(&mut interpreter, &mut ctx, &passes).unwrap();
    assert_eq!(ctx.draw_calls().count(), 1);
}

#[test]
fn test_mirror_variant_overrides_without_aliasing() {
    init();
    let mut ctx = HeadlessContext::new();

    let scene_desc = scene_descriptor();
    let mirror_desc = scene_desc
        .clone()
        .with_label("mirror")
        .with_fragment_shader("void main() {}")
        .with_depth_stencil_state(DepthStencilStateDescriptor {
            depth_enable: Some(true),
            depth_func: Some(CompareFunction::LessEqual),
            stencil_enable: Some(true),
            front_face: StencilFaceDescriptor {
                pass_op: Some(StencilOperation::Zero),
                ..Default::default()
            },
            ..Default::default()
        })
        .with_blend_state(prism_core::renderer::api::pipeline::BlendStateDescriptor {
            render_targets: vec![prism_core::renderer::api::pipeline::RenderTargetBlendDescriptor {
                write_mask: Some(ColorWrites::EMPTY),
                ..Default::default()
            }],
        })
        .with_root_signature(
            RootSignature::new()
                .with_parameter("modelWorld", RootParameter::uniform("MODELWORLD"))
                .with_parameter("viewProjection", RootParameter::uniform("VIEWPROJECTION")),
        );
    assert_eq!(scene_desc.depth_stencil_state.stencil_enable, None);

    let mut scene = PipelineStateObject::new(scene_desc);
    let mut mirror = PipelineStateObject::new(mirror_desc);
    build_pipeline_states(&mut ctx, [&mut scene, &mut mirror]).unwrap();
    assert_ne!(scene.resolved().unwrap().program, mirror.resolved().unwrap().program);

    let mut interpreter = CommandInterpreter::new();
    interpreter
        .interpret(&mut ctx, &Command::SetPipelineState(&mirror))
        .unwrap();
    let state = ctx.state();
    assert!(state.is_enabled(Capability::StencilTest));
    assert_eq!(state.stencil_front.pass_op, StencilOperation::Zero);
    assert_eq!(state.stencil_back.pass_op, StencilOperation::Keep);
    assert_eq!(state.color_mask, ColorWrites::EMPTY);

    interpreter
        .interpret(&mut ctx, &Command::SetPipelineState(&scene))
        .unwrap();
    let state = ctx.state();
    assert!(!state.is_enabled(Capability::StencilTest));
    assert_eq!(state.stencil_front.pass_op, StencilOperation::Keep);
    assert_eq!(state.color_mask, ColorWrites::ALL);

    let err = interpreter
        .interpret(&mut ctx, &Command::SetPipelineState(&mirror))
        .and_then(|()| interpreter.interpret(&mut ctx, &Command::root_uniforms([("tintColor", [1.0f32; 4])])))
        .unwrap_err();
    assert!(matches!(err, DispatchError::UnboundRootParameter { pipeline, .. } if pipeline == "mirror"));
}
