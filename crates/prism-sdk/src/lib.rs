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

//! The public-facing SDK of Prism.
//!
//! Applications implement [`Application`], describe their frames either in
//! code or as JSON [`FrameScript`]s, and hand themselves to a [`FrameLoop`]
//! configured by an [`EngineConfig`].

#![warn(missing_docs)]

pub mod app;
pub mod config;
pub mod script;

pub use self::app::{Application, FrameLoop};
pub use self::config::{ConfigError, EngineConfig, SurfaceConfig};
pub use self::script::{FrameScript, SceneResources, ScriptError};

/// The types most applications need.
pub mod prelude {
    pub use crate::{Application, EngineConfig, FrameLoop, FrameScript, SceneResources};
    pub use prism_core::math::{Mat4, Vec3};
    pub use prism_core::renderer::api::pipeline::{
        BlendStateDescriptor, ColorWrites, CompareFunction, DepthStencilStateDescriptor, InputElementDescriptor,
        InputLayout, PipelineStateDescriptor, PipelineStateObject, RasterizerStateDescriptor,
        RenderTargetBlendDescriptor, RootParameter, RootSignature, StencilFaceDescriptor, StencilOperation,
    };
    pub use prism_core::renderer::{
        Attachment, BufferId, BufferTarget, Command, DrawArguments, FramebufferDescriptor, GraphicsContext,
        IndexBufferView, IndexFormat, Node, Pass, PrimitiveTopology, RenderbufferFormat, SamplerDescriptor,
        TextureBinding, TextureDescriptor, TextureFormat, TextureTarget, UniformValue, VertexBufferView,
    };
    pub use prism_lanes::build_pipeline_states;
}
