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

use prism_core::renderer::api::pipeline::{
    normalize_pipeline_state, resolve_fixed_function_state, BlendStateDescriptor, ColorWrites, CompareFunction,
    CullMode, DepthStencilStateDescriptor, PipelineStateDescriptor, RasterizerStateDescriptor,
    RenderTargetBlendDescriptor, StencilOperation,
};
use prism_core::renderer::{BuildError, RenderError};

const AUTHORED: &str = r#"{
    "label": "mirror",
    "rasterizer_state": { "cull_enable": true },
    "depth_stencil_state": {
        "stencil_enable": true,
        "front_face": { "pass_op": "Zero" },
        "back_face": {}
    }
}"#;

#[test]
fn test_authored_descriptor_resolves_like_its_normalized_form() {
    let authored: PipelineStateDescriptor = serde_json::from_str(AUTHORED).unwrap();
    assert_eq!(authored.rasterizer_state.cull_mode, None);
    assert!(authored.blend_state.render_targets.is_empty());

    let mut normalized = authored.clone();
    normalize_pipeline_state(&mut normalized).unwrap();
    assert_eq!(normalized.rasterizer_state.cull_mode, Some(CullMode::Back));
    assert_eq!(normalized.blend_state.render_targets.len(), 1);

    let state = resolve_fixed_function_state(&authored).unwrap();
    assert_eq!(state, resolve_fixed_function_state(&normalized).unwrap());
    assert!(state.rasterizer.cull_enable);
    assert!(state.depth_stencil.stencil_enable);
    assert_eq!(state.depth_stencil.front.pass_op, StencilOperation::Zero);
    assert_eq!(state.depth_stencil.back.pass_op, StencilOperation::Keep);
    assert_eq!(state.blend.write_mask, ColorWrites::ALL);
}

#[test]
fn test_normalized_descriptor_survives_serialization() {
    let mut desc: PipelineStateDescriptor = serde_json::from_str(AUTHORED).unwrap();
    normalize_pipeline_state(&mut desc).unwrap();

    let json = serde_json::to_string(&desc).unwrap();
    let mut reloaded: PipelineStateDescriptor = serde_json::from_str(&json).unwrap();
    assert_eq!(reloaded, desc);

    normalize_pipeline_state(&mut reloaded).unwrap();
    assert_eq!(serde_json::to_string(&reloaded).unwrap(), json);
}

#[test]
fn test_variant_overrides_leave_the_base_untouched() {
    let base = PipelineStateDescriptor::new("scene")
        .with_shaders("void main() {}", "void main() {}")
        .with_depth_stencil_state(DepthStencilStateDescriptor {
            depth_enable: Some(true),
            depth_func: Some(CompareFunction::LessEqual),
            ..Default::default()
        });

    let mut variant = base
        .clone()
        .with_label("wireframe")
        .with_rasterizer_state(RasterizerStateDescriptor {
            cull_enable: Some(false),
            cull_mode: None,
        });
    variant.depth_stencil_state.depth_mask = Some(false);
    normalize_pipeline_state(&mut variant).unwrap();

    assert_eq!(base.label.as_deref(), Some("scene"));
    assert_eq!(base.depth_stencil_state.depth_mask, None);
    assert_eq!(base.rasterizer_state, RasterizerStateDescriptor::default());
    assert!(base.blend_state.render_targets.is_empty());
    assert_eq!(variant.depth_stencil_state.depth_func, Some(CompareFunction::LessEqual));
}

#[test]
fn test_rejected_descriptor_is_left_as_authored() {
    let mut desc = PipelineStateDescriptor::new("mrt").with_blend_state(BlendStateDescriptor {
        render_targets: vec![RenderTargetBlendDescriptor::default(); 2],
    });
    let before = desc.clone();

    let err = normalize_pipeline_state(&mut desc).unwrap_err();
    assert!(matches!(
        err,
        BuildError::TooManyRenderTargets { provided: 2, supported: 1, .. }
    ));
    assert_eq!(desc, before);

    let err: RenderError = err.into();
    assert!(err.to_string().contains("'mrt'"));
}
