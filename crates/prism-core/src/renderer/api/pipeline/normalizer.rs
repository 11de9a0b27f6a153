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

//! Fills unspecified fixed-function state with documented defaults.
//!
//! | Field                                 | Default        |
//! |---------------------------------------|----------------|
//! | `cull_enable` / `cull_mode`           | `false` / `Back` |
//! | `depth_enable` / `depth_func`         | `false` / `Less` |
//! | `depth_mask`                          | `true`         |
//! | `stencil_enable`                      | `false`        |
//! | `stencil_write_mask`                  | all bits       |
//! | per face `func` / `reference`         | `Always` / `0` |
//! | per face `read_mask`                  | all bits       |
//! | per face stencil ops                  | `Keep`         |
//! | blend entries                         | one            |
//! | `blend_enable`                        | `false`        |
//! | `src_blend` / `dst_blend`             | `One` / `Zero` |
//! | `write_mask`                          | all channels   |

use super::descriptor::PipelineStateDescriptor;
use super::enums::{BlendFactor, CompareFunction, CullMode, StencilOperation};
use super::state::{
    ColorWrites, DepthStencilState, FixedFunctionState, RasterizerState, RenderTargetBlendDescriptor,
    RenderTargetBlendState, StencilFaceDescriptor, StencilFaceState,
};
use crate::renderer::error::BuildError;

/// Number of render targets that can be bound at once.
pub const MAX_RENDER_TARGETS: usize = 1;

/// Default for `cull_enable`.
pub const DEFAULT_CULL_ENABLE: bool = false;
/// Default for `cull_mode`.
pub const DEFAULT_CULL_MODE: CullMode = CullMode::Back;
/// Default for `depth_enable`.
pub const DEFAULT_DEPTH_ENABLE: bool = false;
/// Default for `depth_func`.
pub const DEFAULT_DEPTH_FUNC: CompareFunction = CompareFunction::Less;
/// Default for `depth_mask`.
pub const DEFAULT_DEPTH_MASK: bool = true;
/// Default for `stencil_enable`.
pub const DEFAULT_STENCIL_ENABLE: bool = false;
/// Default for `stencil_write_mask` and per-face `read_mask`.
pub const DEFAULT_STENCIL_MASK: u32 = 0xFFFF_FFFF;
/// Default per-face stencil function.
pub const DEFAULT_STENCIL_FUNC: CompareFunction = CompareFunction::Always;
/// Default per-face stencil reference.
pub const DEFAULT_STENCIL_REF: i32 = 0;
/// Default for every stencil operation.
pub const DEFAULT_STENCIL_OP: StencilOperation = StencilOperation::Keep;
/// Default for `blend_enable`.
pub const DEFAULT_BLEND_ENABLE: bool = false;
/// Default source blend factor.
pub const DEFAULT_SRC_BLEND: BlendFactor = BlendFactor::One;
/// Default destination blend factor.
pub const DEFAULT_DST_BLEND: BlendFactor = BlendFactor::Zero;
/// Default colour write mask.
pub const DEFAULT_WRITE_MASK: ColorWrites = ColorWrites::ALL;

/// Fills every omitted state field of `descriptor` in place.
///
/// Applying it to an already normalized descriptor leaves it unchanged.
///
/// # Errors
///
/// Returns [`BuildError::TooManyRenderTargets`] if more than
/// [`MAX_RENDER_TARGETS`] blend entries are declared. The descriptor is not
/// modified in that case.
pub fn normalize_pipeline_state(descriptor: &mut PipelineStateDescriptor) -> Result<(), BuildError> {
    check_render_target_count(descriptor)?;

    let raster = &mut descriptor.rasterizer_state;
    raster.cull_enable.get_or_insert(DEFAULT_CULL_ENABLE);
    raster.cull_mode.get_or_insert(DEFAULT_CULL_MODE);

    let ds = &mut descriptor.depth_stencil_state;
    ds.depth_enable.get_or_insert(DEFAULT_DEPTH_ENABLE);
    ds.depth_func.get_or_insert(DEFAULT_DEPTH_FUNC);
    ds.depth_mask.get_or_insert(DEFAULT_DEPTH_MASK);
    ds.stencil_enable.get_or_insert(DEFAULT_STENCIL_ENABLE);
    ds.stencil_write_mask.get_or_insert(DEFAULT_STENCIL_MASK);
    normalize_stencil_face(&mut ds.front_face);
    normalize_stencil_face(&mut ds.back_face);

    let targets = &mut descriptor.blend_state.render_targets;
    if targets.is_empty() {
        targets.push(RenderTargetBlendDescriptor::default());
    }
    for target in targets.iter_mut() {
        target.blend_enable.get_or_insert(DEFAULT_BLEND_ENABLE);
        target.src_blend.get_or_insert(DEFAULT_SRC_BLEND);
        target.dst_blend.get_or_insert(DEFAULT_DST_BLEND);
        target.write_mask.get_or_insert(DEFAULT_WRITE_MASK);
    }

    Ok(())
}

fn normalize_stencil_face(face: &mut StencilFaceDescriptor) {
    face.func.get_or_insert(DEFAULT_STENCIL_FUNC);
    face.reference.get_or_insert(DEFAULT_STENCIL_REF);
    face.read_mask.get_or_insert(DEFAULT_STENCIL_MASK);
    face.fail_op.get_or_insert(DEFAULT_STENCIL_OP);
    face.depth_fail_op.get_or_insert(DEFAULT_STENCIL_OP);
    face.pass_op.get_or_insert(DEFAULT_STENCIL_OP);
}

fn check_render_target_count(descriptor: &PipelineStateDescriptor) -> Result<(), BuildError> {
    let provided = descriptor.blend_state.render_targets.len();
    if provided > MAX_RENDER_TARGETS {
        return Err(BuildError::TooManyRenderTargets {
            pipeline: descriptor.label_or_default().to_owned(),
            provided,
            supported: MAX_RENDER_TARGETS,
        });
    }
    Ok(())
}

/// Resolves the concrete fixed-function state of `descriptor`.
///
/// Fields still unset resolve to the same defaults the normalizer inserts,
/// so the result equals the state of the normalized descriptor.
pub fn resolve_fixed_function_state(
    descriptor: &PipelineStateDescriptor,
) -> Result<FixedFunctionState, BuildError> {
    check_render_target_count(descriptor)?;

    let raster = &descriptor.rasterizer_state;
    let ds = &descriptor.depth_stencil_state;
    let blend = descriptor
        .blend_state
        .render_targets
        .first()
        .copied()
        .unwrap_or_default();

    Ok(FixedFunctionState {
        rasterizer: RasterizerState {
            cull_enable: raster.cull_enable.unwrap_or(DEFAULT_CULL_ENABLE),
            cull_mode: raster.cull_mode.unwrap_or(DEFAULT_CULL_MODE),
        },
        depth_stencil: DepthStencilState {
            depth_enable: ds.depth_enable.unwrap_or(DEFAULT_DEPTH_ENABLE),
            depth_func: ds.depth_func.unwrap_or(DEFAULT_DEPTH_FUNC),
            depth_mask: ds.depth_mask.unwrap_or(DEFAULT_DEPTH_MASK),
            stencil_enable: ds.stencil_enable.unwrap_or(DEFAULT_STENCIL_ENABLE),
            stencil_write_mask: ds.stencil_write_mask.unwrap_or(DEFAULT_STENCIL_MASK),
            front: resolve_stencil_face(&ds.front_face),
            back: resolve_stencil_face(&ds.back_face),
        },
        blend: RenderTargetBlendState {
            blend_enable: blend.blend_enable.unwrap_or(DEFAULT_BLEND_ENABLE),
            src_blend: blend.src_blend.unwrap_or(DEFAULT_SRC_BLEND),
            dst_blend: blend.dst_blend.unwrap_or(DEFAULT_DST_BLEND),
            write_mask: blend.write_mask.unwrap_or(DEFAULT_WRITE_MASK),
        },
    })
}

fn resolve_stencil_face(face: &StencilFaceDescriptor) -> StencilFaceState {
    StencilFaceState {
        func: face.func.unwrap_or(DEFAULT_STENCIL_FUNC),
        reference: face.reference.unwrap_or(DEFAULT_STENCIL_REF),
        read_mask: face.read_mask.unwrap_or(DEFAULT_STENCIL_MASK),
        fail_op: face.fail_op.unwrap_or(DEFAULT_STENCIL_OP),
        depth_fail_op: face.depth_fail_op.unwrap_or(DEFAULT_STENCIL_OP),
        pass_op: face.pass_op.unwrap_or(DEFAULT_STENCIL_OP),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::api::pipeline::{BlendStateDescriptor, DepthStencilStateDescriptor};

    fn mirror_like() -> PipelineStateDescriptor {
        PipelineStateDescriptor::new("mirror")
            .with_depth_stencil_state(DepthStencilStateDescriptor {
                stencil_enable: Some(true),
                front_face: StencilFaceDescriptor {
                    pass_op: Some(StencilOperation::Zero),
                    ..Default::default()
                },
                ..Default::default()
            })
            .with_blend_state(BlendStateDescriptor {
                render_targets: vec![RenderTargetBlendDescriptor {
                    write_mask: Some(ColorWrites::EMPTY),
                    ..Default::default()
                }],
            })
    }

    #[test]
    fn test_empty_descriptor_gets_every_default() {
        let mut desc = PipelineStateDescriptor::default();
        normalize_pipeline_state(&mut desc).unwrap();

        assert_eq!(desc.rasterizer_state.cull_enable, Some(false));
        assert_eq!(desc.rasterizer_state.cull_mode, Some(CullMode::Back));

        let ds = &desc.depth_stencil_state;
        assert_eq!(ds.depth_enable, Some(false));
        assert_eq!(ds.depth_func, Some(CompareFunction::Less));
        assert_eq!(ds.depth_mask, Some(true));
        assert_eq!(ds.stencil_enable, Some(false));
        assert_eq!(ds.stencil_write_mask, Some(0xFFFF_FFFF));
        for face in [&ds.front_face, &ds.back_face] {
            assert_eq!(face.func, Some(CompareFunction::Always));
            assert_eq!(face.reference, Some(0));
            assert_eq!(face.read_mask, Some(0xFFFF_FFFF));
            assert_eq!(face.fail_op, Some(StencilOperation::Keep));
            assert_eq!(face.depth_fail_op, Some(StencilOperation::Keep));
            assert_eq!(face.pass_op, Some(StencilOperation::Keep));
        }

        assert_eq!(desc.blend_state.render_targets.len(), 1);
        assert_eq!(desc.blend_state.render_targets[0].write_mask, Some(ColorWrites::ALL));
    }

    #[test]
    fn test_explicit_fields_are_kept() {
        let mut desc = mirror_like();
        normalize_pipeline_state(&mut desc).unwrap();

        let ds = &desc.depth_stencil_state;
        assert_eq!(ds.stencil_enable, Some(true));
        assert_eq!(ds.front_face.pass_op, Some(StencilOperation::Zero));
        assert_eq!(ds.back_face.pass_op, Some(StencilOperation::Keep));
        assert_eq!(desc.blend_state.render_targets[0].write_mask, Some(ColorWrites::EMPTY));
        assert_eq!(desc.blend_state.render_targets[0].blend_enable, Some(false));
    }

    #[test]
    fn test_normalization_is_idempotent() {
        let mut once = mirror_like();
        normalize_pipeline_state(&mut once).unwrap();
        let mut twice = once.clone();
        normalize_pipeline_state(&mut twice).unwrap();

        assert_eq!(once, twice);
        assert_eq!(
            serde_json::to_vec(&once).unwrap(),
            serde_json::to_vec(&twice).unwrap()
        );
    }

    #[test]
    fn test_too_many_render_targets() {
        let mut desc = PipelineStateDescriptor::new("mrt").with_blend_state(BlendStateDescriptor {
            render_targets: vec![RenderTargetBlendDescriptor::default(); 2],
        });
        let before = desc.clone();

        let err = normalize_pipeline_state(&mut desc).unwrap_err();
        assert_eq!(
            err,
            BuildError::TooManyRenderTargets {
                pipeline: "mrt".into(),
                provided: 2,
                supported: MAX_RENDER_TARGETS,
            }
        );
        assert_eq!(desc, before);
    }

    #[test]
    fn test_resolution_matches_normalized_descriptor() {
        let raw = mirror_like();
        let mut normalized = raw.clone();
        normalize_pipeline_state(&mut normalized).unwrap();

        let from_raw = resolve_fixed_function_state(&raw).unwrap();
        let from_normalized = resolve_fixed_function_state(&normalized).unwrap();
        assert_eq!(from_raw, from_normalized);
        assert!(from_raw.depth_stencil.stencil_enable);
        assert_eq!(from_raw.depth_stencil.front.pass_op, StencilOperation::Zero);
        assert_eq!(from_raw.blend.write_mask, ColorWrites::EMPTY);
    }
}
