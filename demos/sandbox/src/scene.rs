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

//! The reference scene: a cube on a floor rendered offscreen, an optional
//! stencil pass through the floor, and a blit to the default framebuffer.

use crate::camera::OrbitCamera;
use anyhow::{Context, Result};
use bytemuck::{Pod, Zeroable};
use log::{debug, info, trace};
use prism_core::math::{Mat4, Vec3};
use prism_core::renderer::api::pipeline::{
    BlendStateDescriptor, ColorWrites, CompareFunction, DepthStencilStateDescriptor, InputElementDescriptor,
    InputLayout, PipelineStateDescriptor, PipelineStateObject, RasterizerStateDescriptor,
    RenderTargetBlendDescriptor, RootParameter, RootSignature, StencilFaceDescriptor, StencilOperation,
};
use prism_core::renderer::{
    Attachment, BufferTarget, Command, CullMode, DrawArguments, FilterMode, FramebufferDescriptor, GraphicsContext,
    IndexBufferView, IndexFormat, Node, Pass, PrimitiveTopology, RenderbufferFormat, SamplerDescriptor,
    TextureBinding, TextureDescriptor, TextureFormat, TextureTarget, UniformValue, VertexBufferView, WrapMode,
};
use prism_lanes::build_pipeline_states;
use prism_sdk::{Application, FrameScript, SceneResources, SurfaceConfig};
use std::time::Duration;

const SCENE_VS: &str = r#"
uniform highp mat4 MODELWORLD;
uniform highp mat4 WORLDVIEW;
uniform highp mat4 VIEWPROJECTION;
attribute highp vec3 POSITION;
void main() {
    mat4 modelViewProjection = VIEWPROJECTION * WORLDVIEW * MODELWORLD;
    gl_Position = modelViewProjection * vec4(POSITION, 1.0);
}
"#;

const SCENE_FS: &str = r#"
uniform lowp vec4 COLOR;
void main() {
    gl_FragColor = vec4((gl_FragCoord.z * gl_FragCoord.w * COLOR.rgb), 1.0);
}
"#;

const MIRROR_FS: &str = r#"
void main() {
}
"#;

const BLIT_VS: &str = r#"
attribute lowp vec2 POSITION;
attribute lowp vec2 TEXCOORD;
varying lowp vec2 vTEXCOORD;
void main() {
    gl_Position = vec4(POSITION, 0.0, 1.0);
    vTEXCOORD = TEXCOORD;
}
"#;

const BLIT_FS: &str = r#"
uniform sampler2D BLITSAMPLER;
varying lowp vec2 vTEXCOORD;
void main() {
    gl_FragColor = texture2D(BLITSAMPLER, vTEXCOORD);
}
"#;

const CAMERA_START: [f32; 3] = [4.0, 4.0, 4.0];
const CUBE_TINT: [f32; 4] = [0.0, 0.0, 1.0, 1.0];
const FLOOR_TINT: [f32; 4] = [0.5, 0.5, 0.5, 1.0];

/// Uniform sources kept current for frame scripts.
pub const WORLD_VIEW_SOURCE: &str = "worldView";
pub const VIEW_PROJECTION_SOURCE: &str = "viewProjection";
pub const CUBE_WORLD_SOURCE: &str = "cubeWorld";
pub const FLOOR_WORLD_SOURCE: &str = "floorWorld";

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
struct MeshVertex {
    position: [f32; 3],
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
struct BlitVertex {
    position: [f32; 2],
    tex_coord: [f32; 2],
}

const fn mesh(x: f32, y: f32, z: f32) -> MeshVertex {
    MeshVertex { position: [x, y, z] }
}

const CUBE_VERTICES: [MeshVertex; 8] = [
    mesh(1.0, 1.0, 1.0),
    mesh(1.0, 1.0, -1.0),
    mesh(1.0, -1.0, 1.0),
    mesh(1.0, -1.0, -1.0),
    mesh(-1.0, 1.0, 1.0),
    mesh(-1.0, 1.0, -1.0),
    mesh(-1.0, -1.0, 1.0),
    mesh(-1.0, -1.0, -1.0),
];

#[rustfmt::skip]
const CUBE_INDICES: [u16; 36] = [
    0, 2, 1,  1, 2, 3,
    3, 2, 7,  7, 2, 6,
    6, 2, 4,  4, 2, 0,
    6, 4, 7,  7, 4, 5,
    5, 4, 1,  1, 4, 0,
    1, 3, 5,  5, 3, 7,
];

const FLOOR_VERTICES: [MeshVertex; 6] = [
    mesh(1.0, 1.0, 0.0),
    mesh(-1.0, 1.0, 0.0),
    mesh(1.0, -1.0, 0.0),
    mesh(1.0, -1.0, 0.0),
    mesh(-1.0, 1.0, 0.0),
    mesh(-1.0, -1.0, 0.0),
];

const BLIT_VERTICES: [BlitVertex; 4] = [
    BlitVertex { position: [1.0, 1.0], tex_coord: [1.0, 1.0] },
    BlitVertex { position: [-1.0, 1.0], tex_coord: [0.0, 1.0] },
    BlitVertex { position: [1.0, -1.0], tex_coord: [1.0, 0.0] },
    BlitVertex { position: [-1.0, -1.0], tex_coord: [0.0, 0.0] },
];

#[rustfmt::skip]
const CHECKERBOARD_TEXELS: [u8; 16] = [
    255, 255, 255, 255,   0,   0,   0, 255,
      0,   0,   0, 255, 255, 255, 255, 255,
];

fn blit_sampler() -> SamplerDescriptor {
    SamplerDescriptor {
        min_filter: FilterMode::Nearest,
        mag_filter: FilterMode::Linear,
        wrap_s: WrapMode::ClampToEdge,
        wrap_t: WrapMode::ClampToEdge,
    }
}

fn checkerboard_sampler() -> SamplerDescriptor {
    SamplerDescriptor {
        min_filter: FilterMode::NearestMipmapLinear,
        mag_filter: FilterMode::Nearest,
        wrap_s: WrapMode::Repeat,
        wrap_t: WrapMode::Repeat,
    }
}

fn scene_pipeline() -> PipelineStateDescriptor {
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
                .with_parameter("worldView", RootParameter::uniform("WORLDVIEW"))
                .with_parameter("viewProjection", RootParameter::uniform("VIEWPROJECTION"))
                .with_parameter("tintColor", RootParameter::uniform("COLOR")),
        )
}

/// The scene pipeline with colour writes off, writing zero to the stencil
/// buffer wherever the floor covers it.
fn mirror_pipeline(scene: &PipelineStateDescriptor) -> PipelineStateDescriptor {
    scene
        .clone()
        .with_label("mirror")
        .with_fragment_shader(MIRROR_FS)
        .with_rasterizer_state(RasterizerStateDescriptor {
            cull_enable: Some(false),
            cull_mode: Some(CullMode::Back),
        })
        .with_depth_stencil_state(DepthStencilStateDescriptor {
            stencil_enable: Some(true),
            stencil_write_mask: Some(u32::MAX),
            front_face: StencilFaceDescriptor {
                func: Some(CompareFunction::Always),
                reference: Some(0),
                read_mask: Some(u32::MAX),
                fail_op: Some(StencilOperation::Keep),
                depth_fail_op: Some(StencilOperation::Keep),
                pass_op: Some(StencilOperation::Zero),
            },
            ..Default::default()
        })
        .with_blend_state(BlendStateDescriptor {
            render_targets: vec![RenderTargetBlendDescriptor {
                write_mask: Some(ColorWrites::EMPTY),
                ..Default::default()
            }],
        })
        .with_root_signature(
            RootSignature::new()
                .with_parameter("modelWorld", RootParameter::uniform("MODELWORLD"))
                .with_parameter("worldView", RootParameter::uniform("WORLDVIEW"))
                .with_parameter("viewProjection", RootParameter::uniform("VIEWPROJECTION")),
        )
}

fn blit_pipeline() -> PipelineStateDescriptor {
    PipelineStateDescriptor::new("blit")
        .with_shaders(BLIT_VS, BLIT_FS)
        .with_input_layout(
            InputLayout::new()
                .with_element("POSITION", InputElementDescriptor::float("blitVertices", 2).with_stride_offset(16, 0))
                .with_element("TEXCOORD", InputElementDescriptor::float("blitVertices", 2).with_stride_offset(16, 8)),
        )
        .with_root_signature(RootSignature::new().with_parameter("blitSampler", RootParameter::sampler("BLITSAMPLER")))
}

/// The sandbox application.
///
/// Frames come from a [`FrameScript`] when one is given, otherwise they are
/// assembled in code.
#[derive(Debug)]
pub struct SandboxApp {
    surface: SurfaceConfig,
    mirror: bool,
    script: Option<FrameScript>,
    resources: SceneResources,
    camera: OrbitCamera,
}

impl SandboxApp {
    pub fn new(surface: SurfaceConfig, mirror: bool, script: Option<FrameScript>) -> Self {
        Self {
            camera: OrbitCamera::new(Vec3::from(CAMERA_START), surface.aspect_ratio()),
            surface,
            mirror,
            script,
            resources: SceneResources::new(),
        }
    }

    #[cfg(test)]
    pub fn camera(&self) -> &OrbitCamera {
        &self.camera
    }

    #[cfg(test)]
    pub fn resources(&self) -> &SceneResources {
        &self.resources
    }

    fn create_targets(&mut self, ctx: &mut dyn GraphicsContext) -> Result<()> {
        let SurfaceConfig { width, height } = self.surface;

        let color = ctx.create_texture(&TextureDescriptor {
            label: Some("sceneColor"),
            width,
            height,
            format: TextureFormat::Rgba8,
            data: None,
            sampler: Some(blit_sampler()),
            generate_mipmaps: false,
        })?;
        let depth = ctx.create_renderbuffer(RenderbufferFormat::Depth16, width, height)?;
        let scene = ctx
            .create_framebuffer(&FramebufferDescriptor {
                color: Some(Attachment::Texture(color)),
                depth: Some(Attachment::Renderbuffer(depth)),
                depth_stencil: None,
            })
            .context("Failed to create the scene target")?;
        self.resources.textures.insert("sceneColor".into(), color);
        self.resources.framebuffers.insert("scene".into(), scene);

        if self.mirror {
            let depth_stencil = ctx.create_renderbuffer(RenderbufferFormat::DepthStencil, width, height)?;
            let mirror = ctx
                .create_framebuffer(&FramebufferDescriptor {
                    color: Some(Attachment::Texture(color)),
                    depth: None,
                    depth_stencil: Some(Attachment::Renderbuffer(depth_stencil)),
                })
                .context("Failed to create the mirror target")?;
            self.resources.framebuffers.insert("mirror".into(), mirror);
        }

        debug!("Created {}x{} render targets (mirror: {})", width, height, self.mirror);
        Ok(())
    }

    fn create_textures(&mut self, ctx: &mut dyn GraphicsContext) -> Result<()> {
        let checkerboard = ctx.create_texture(&TextureDescriptor {
            label: Some("checkerboard"),
            width: 2,
            height: 2,
            format: TextureFormat::Rgba8,
            data: Some(&CHECKERBOARD_TEXELS[..]),
            sampler: Some(checkerboard_sampler()),
            generate_mipmaps: true,
        })?;
        self.resources.textures.insert("checkerboard".into(), checkerboard);
        self.resources.samplers.insert("blit".into(), blit_sampler());
        self.resources.samplers.insert("checkerboard".into(), checkerboard_sampler());
        Ok(())
    }

    fn create_nodes(&mut self, ctx: &mut dyn GraphicsContext) -> Result<()> {
        let cube_vertices = ctx.create_buffer(BufferTarget::Array, bytemuck::cast_slice(&CUBE_VERTICES))?;
        let cube_indices = ctx.create_buffer(BufferTarget::ElementArray, bytemuck::cast_slice(&CUBE_INDICES))?;
        let cube = Node::new(DrawArguments::Indexed {
            topology: PrimitiveTopology::TriangleList,
            index_count: CUBE_INDICES.len() as u32,
            start_index: 0,
        })
        .with_label("cube")
        .with_vertex_buffer("meshVertices", VertexBufferView::new(cube_vertices))
        .with_index_buffer(IndexBufferView {
            buffer: cube_indices,
            format: IndexFormat::Uint16,
            offset: 0,
        })
        .with_transform(Mat4::from_translation(Vec3::new(0.0, 0.0, 1.0)));

        let floor_vertices = ctx.create_buffer(BufferTarget::Array, bytemuck::cast_slice(&FLOOR_VERTICES))?;
        let floor = Node::new(DrawArguments::NonIndexed {
            topology: PrimitiveTopology::TriangleList,
            vertex_count: FLOOR_VERTICES.len() as u32,
            start_vertex: 0,
        })
        .with_label("floor")
        .with_vertex_buffer("meshVertices", VertexBufferView::new(floor_vertices))
        .with_transform(Mat4::from_scale(Vec3::new(3.0, 3.0, 1.0)));

        let blit_vertices = ctx.create_buffer(BufferTarget::Array, bytemuck::cast_slice(&BLIT_VERTICES))?;
        let blit = Node::new(DrawArguments::NonIndexed {
            topology: PrimitiveTopology::TriangleStrip,
            vertex_count: BLIT_VERTICES.len() as u32,
            start_vertex: 0,
        })
        .with_label("blit")
        .with_vertex_buffer("blitVertices", VertexBufferView::new(blit_vertices));

        self.resources
            .set_uniform_source(CUBE_WORLD_SOURCE, cube.transform);
        self.resources
            .set_uniform_source(FLOOR_WORLD_SOURCE, floor.transform);
        self.resources.nodes.insert("cube".into(), cube);
        self.resources.nodes.insert("floor".into(), floor);
        self.resources.nodes.insert("blit".into(), blit);
        Ok(())
    }

    fn create_pipelines(&mut self, ctx: &mut dyn GraphicsContext) -> Result<()> {
        let scene = scene_pipeline();
        if self.mirror {
            let mirror = mirror_pipeline(&scene);
            self.resources
                .pipelines
                .insert("mirror".into(), PipelineStateObject::new(mirror));
        }
        self.resources
            .pipelines
            .insert("scene".into(), PipelineStateObject::new(scene));
        self.resources
            .pipelines
            .insert("blit".into(), PipelineStateObject::new(blit_pipeline()));

        let built = build_pipeline_states(ctx, self.resources.pipelines.values_mut())?;
        info!("Built {} pipeline state objects", built);
        Ok(())
    }

    fn publish_camera(&mut self) {
        self.resources
            .set_uniform_source(WORLD_VIEW_SOURCE, self.camera.world_view());
        self.resources
            .set_uniform_source(VIEW_PROJECTION_SOURCE, self.camera.view_projection());
    }

    /// The frame as code: scene, then the optional mirror stencil pass, then
    /// the blit.
    fn coded_passes(&self) -> Result<Vec<Pass<'_>>> {
        let resources = &self.resources;
        let world_view = UniformValue::from(self.camera.world_view());
        let view_projection = UniformValue::from(self.camera.view_projection());
        let cube = resources.node("cube")?;
        let floor = resources.node("floor")?;
        let scene_target = *resources
            .framebuffers
            .get("scene")
            .context("The scene target was not created")?;
        let scene_color = *resources
            .textures
            .get("sceneColor")
            .context("The scene colour texture was not created")?;

        let mut passes = vec![Pass::new("scene")
            .with(Command::SetFramebuffer(Some(scene_target)))
            .with(Command::ClearColor([1.0, 1.0, 1.0, 1.0]))
            .with(Command::ClearDepth(1.0))
            .with(Command::SetPipelineState(resources.pipeline("scene")?))
            .with(Command::root_uniforms([
                ("worldView", world_view.clone()),
                ("viewProjection", view_projection.clone()),
                ("tintColor", UniformValue::from(CUBE_TINT)),
            ]))
            .with(Command::root_uniforms([("modelWorld", &cube.transform)]))
            .with(Command::DrawNodes(vec![cube]))
            .with(Command::root_uniforms([
                ("modelWorld", UniformValue::from(&floor.transform)),
                ("tintColor", UniformValue::from(FLOOR_TINT)),
            ]))
            .with(Command::DrawNodes(vec![floor]))];

        if self.mirror {
            let mirror_target = *resources
                .framebuffers
                .get("mirror")
                .context("The mirror target was not created")?;
            passes.push(
                Pass::new("mirror")
                    .with(Command::SetFramebuffer(Some(mirror_target)))
                    .with(Command::ClearStencil(1))
                    .with(Command::SetPipelineState(resources.pipeline("mirror")?))
                    .with(Command::root_uniforms([
                        ("worldView", world_view),
                        ("viewProjection", view_projection),
                    ]))
                    .with(Command::root_uniforms([("modelWorld", &floor.transform)]))
                    .with(Command::DrawNodes(vec![floor])),
            );
        }

        passes.push(
            Pass::new("blit")
                .with(Command::SetFramebuffer(None))
                .with(Command::SetPipelineState(resources.pipeline("blit")?))
                .with(Command::SetActiveTextures(vec![TextureBinding {
                    unit: 0,
                    target: TextureTarget::Texture2D,
                    texture: scene_color,
                    sampler: Some(blit_sampler()),
                }]))
                .with(Command::root_samplers([("blitSampler", 0)]))
                .with(Command::DrawNodes(vec![resources.node("blit")?])),
        );

        Ok(passes)
    }
}

impl Application for SandboxApp {
    fn setup(&mut self, ctx: &mut dyn GraphicsContext) -> Result<()> {
        self.create_targets(ctx)?;
        self.create_textures(ctx)?;
        self.create_nodes(ctx)?;
        self.create_pipelines(ctx)?;
        self.publish_camera();
        Ok(())
    }

    fn update(&mut self, dt: Duration) {
        self.camera.update(dt);
        trace!("Camera at {:?}", self.camera.position());
        self.publish_camera();
    }

    fn passes(&self) -> Result<Vec<Pass<'_>>> {
        match &self.script {
            Some(script) => Ok(script.resolve(&self.resources)?),
            None => self.coded_passes(),
        }
    }
}
