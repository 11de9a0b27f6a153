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

//! The authored description of a pipeline state object.

use super::layout::InputLayout;
use super::root_signature::RootSignature;
use super::state::{BlendStateDescriptor, DepthStencilStateDescriptor, RasterizerStateDescriptor};
use serde::{Deserialize, Serialize};

/// Label used in diagnostics for pipelines created without one.
pub const UNNAMED_PIPELINE: &str = "<unnamed>";

/// Everything client code declares about a pipeline before it is built.
///
/// State blocks may be left partially specified; the normalizer fills the
/// gaps with documented defaults when the pipeline is built.
///
/// Variants are derived by value: clone a base descriptor, then override
/// only the blocks that differ.
///
/// ```
/// use prism_core::renderer::api::pipeline::*;
///
/// let scene = PipelineStateDescriptor::new("scene")
///     .with_shaders("void main() {}", "void main() {}");
/// let mirror = scene
///     .clone()
///     .with_label("mirror")
///     .with_blend_state(BlendStateDescriptor {
///         render_targets: vec![RenderTargetBlendDescriptor {
///             write_mask: Some(ColorWrites::EMPTY),
///             ..Default::default()
///         }],
///     });
///
/// assert!(scene.blend_state.render_targets.is_empty());
/// assert_eq!(mirror.vertex_shader, scene.vertex_shader);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineStateDescriptor {
    /// A label used in logs and error messages.
    pub label: Option<String>,
    /// GLSL source of the vertex stage.
    pub vertex_shader: Option<String>,
    /// GLSL source of the fragment stage.
    pub fragment_shader: Option<String>,
    /// Rasterizer state.
    pub rasterizer_state: RasterizerStateDescriptor,
    /// Depth and stencil state.
    pub depth_stencil_state: DepthStencilStateDescriptor,
    /// Blend state.
    pub blend_state: BlendStateDescriptor,
    /// Which buffer slots feed which vertex attributes.
    pub input_layout: InputLayout,
    /// Which uniforms the root slots stand for.
    pub root_signature: RootSignature,
}

impl PipelineStateDescriptor {
    /// Creates an empty descriptor with a label.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
            ..Default::default()
        }
    }

    /// Returns the label, or a placeholder for unnamed pipelines.
    pub fn label_or_default(&self) -> &str {
        self.label.as_deref().unwrap_or(UNNAMED_PIPELINE)
    }

    /// Replaces the label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Sets both shader sources.
    pub fn with_shaders(mut self, vertex: impl Into<String>, fragment: impl Into<String>) -> Self {
        self.vertex_shader = Some(vertex.into());
        self.fragment_shader = Some(fragment.into());
        self
    }

    /// Replaces the fragment shader source.
    pub fn with_fragment_shader(mut self, fragment: impl Into<String>) -> Self {
        self.fragment_shader = Some(fragment.into());
        self
    }

    /// Replaces the rasterizer state block.
    pub fn with_rasterizer_state(mut self, state: RasterizerStateDescriptor) -> Self {
        self.rasterizer_state = state;
        self
    }

    /// Replaces the depth-stencil state block.
    pub fn with_depth_stencil_state(mut self, state: DepthStencilStateDescriptor) -> Self {
        self.depth_stencil_state = state;
        self
    }

    /// Replaces the blend state block.
    pub fn with_blend_state(mut self, state: BlendStateDescriptor) -> Self {
        self.blend_state = state;
        self
    }

    /// Replaces the input layout.
    pub fn with_input_layout(mut self, layout: InputLayout) -> Self {
        self.input_layout = layout;
        self
    }

    /// Replaces the root signature.
    pub fn with_root_signature(mut self, signature: RootSignature) -> Self {
        self.root_signature = signature;
        self
    }
}
