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

//! Builds pipeline state objects against the reflection of their linked program.
//!
//! Building is a one-time step per pipeline. The linked program's active
//! attributes and uniforms are the single source of truth: every input
//! layout entry and every root parameter must name something the program
//! actually exposes. On any failure, the objects created along the way are
//! deleted and the pipeline stays unbuilt.

use log::{debug, info};
use prism_core::renderer::api::pipeline::{
    normalize_pipeline_state, resolve_fixed_function_state, uniform_base_name, ActiveAttribute,
    ActiveUniform, FixedFunctionState, InputSlot, PipelineStateDescriptor, PipelineStateObject,
    ResolvedPipeline, RootBinding, RootParameterKind, ShaderStage,
};
use prism_core::renderer::{BuildError, GraphicsContext, ProgramId, ResourceError};
use std::collections::BTreeMap;

/// Builds every pipeline yielded by `psos`, in iteration order.
///
/// Stops at the first failure; pipelines built before it stay built.
///
/// # Returns
///
/// The number of pipelines built.
pub fn build_pipeline_states<'p, I>(ctx: &mut dyn GraphicsContext, psos: I) -> Result<usize, BuildError>
where
    I: IntoIterator<Item = &'p mut PipelineStateObject>,
{
    let mut built = 0;
    for pso in psos {
        build_pipeline_state(ctx, pso)?;
        built += 1;
    }
    Ok(built)
}

/// Builds a single pipeline state object.
///
/// ## Steps
/// 1. Normalize the fixed-function state (no GPU object is created before this).
/// 2. Compile both stages and link them.
/// 3. Reflect active attributes and uniforms.
/// 4. Resolve the input layout to attribute locations.
/// 5. Resolve the root signature to reflected uniforms.
/// 6. Freeze the resolved tables into the pipeline.
///
/// # Errors
///
/// Any [`BuildError`]. [`BuildError::AlreadyBuilt`] is returned, without
/// touching the context, when the pipeline was built before.
pub fn build_pipeline_state(ctx: &mut dyn GraphicsContext, pso: &mut PipelineStateObject) -> Result<(), BuildError> {
    let label = pso.label().to_owned();
    let descriptor = pso
        .descriptor_mut()
        .ok_or_else(|| BuildError::AlreadyBuilt { pipeline: label.clone() })?;

    normalize_pipeline_state(descriptor)?;

    let descriptor = pso.descriptor();
    let state = resolve_fixed_function_state(descriptor)?;
    let vertex_source = shader_source(descriptor, &label, ShaderStage::Vertex)?;
    let fragment_source = shader_source(descriptor, &label, ShaderStage::Fragment)?;

    let program = compile_and_link(ctx, &label, vertex_source, fragment_source)?;
    let resolved = match resolve_bindings(ctx, &label, program, descriptor, state) {
        Ok(resolved) => resolved,
        Err(err) => {
            ctx.delete_program(program);
            return Err(err);
        }
    };

    info!(
        "Built pipeline '{}': {} attribute(s), {} uniform(s), {} root parameter(s)",
        label,
        resolved.attributes.len(),
        resolved.uniforms.len(),
        resolved.root_bindings.len()
    );
    pso.freeze(resolved)
}

fn shader_source<'d>(
    descriptor: &'d PipelineStateDescriptor,
    label: &str,
    stage: ShaderStage,
) -> Result<&'d str, BuildError> {
    let source = match stage {
        ShaderStage::Vertex => descriptor.vertex_shader.as_deref(),
        ShaderStage::Fragment => descriptor.fragment_shader.as_deref(),
    };
    source
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| BuildError::MissingShaderSource {
            pipeline: label.to_owned(),
            stage,
        })
}

fn compile_and_link(
    ctx: &mut dyn GraphicsContext,
    label: &str,
    vertex_source: &str,
    fragment_source: &str,
) -> Result<ProgramId, BuildError> {
    let vertex = ctx
        .compile_shader(ShaderStage::Vertex, vertex_source)
        .map_err(|e| compile_error(label, ShaderStage::Vertex, e))?;

    let fragment = match ctx.compile_shader(ShaderStage::Fragment, fragment_source) {
        Ok(fragment) => fragment,
        Err(e) => {
            ctx.delete_shader(vertex);
            return Err(compile_error(label, ShaderStage::Fragment, e));
        }
    };

    let linked = ctx.link_program(vertex, fragment);

    // The program keeps what it needs; the stages are no longer referenced.
    ctx.delete_shader(vertex);
    ctx.delete_shader(fragment);

    linked.map_err(|e| match e {
        ResourceError::LinkFailed(log) => BuildError::ProgramLink {
            pipeline: label.to_owned(),
            log,
        },
        other => BuildError::Resource(other),
    })
}

fn compile_error(label: &str, stage: ShaderStage, err: ResourceError) -> BuildError {
    match err {
        ResourceError::CompileFailed(log) => BuildError::ShaderCompile {
            pipeline: label.to_owned(),
            stage,
            log,
        },
        other => BuildError::Resource(other),
    }
}

fn resolve_bindings(
    ctx: &mut dyn GraphicsContext,
    label: &str,
    program: ProgramId,
    descriptor: &PipelineStateDescriptor,
    state: FixedFunctionState,
) -> Result<ResolvedPipeline, BuildError> {
    let attributes: BTreeMap<String, ActiveAttribute> = ctx
        .active_attributes(program)
        .into_iter()
        .map(|attribute| (attribute.name.clone(), attribute))
        .collect();

    let uniforms: BTreeMap<String, ActiveUniform> = ctx
        .active_uniforms(program)
        .into_iter()
        .map(|mut uniform| {
            uniform.name = uniform_base_name(&uniform.name).to_owned();
            (uniform.name.clone(), uniform)
        })
        .collect();

    // --- Input layout ---
    let mut locations_by_slot: BTreeMap<InputSlot, Vec<u32>> = BTreeMap::new();
    let mut elements_by_location = BTreeMap::new();
    for (name, element) in descriptor.input_layout.iter() {
        let location = ctx
            .attribute_location(program, name)
            .filter(|_| attributes.contains_key(name))
            .ok_or_else(|| BuildError::UnmatchedInputAttribute {
                pipeline: label.to_owned(),
                name: name.to_owned(),
            })?;

        debug!(
            "Pipeline '{}': attribute '{}' at location {} reads slot '{}'",
            label, name, location, element.input_slot
        );
        locations_by_slot
            .entry(element.input_slot.clone())
            .or_default()
            .push(location);
        elements_by_location.insert(location, (name.to_owned(), element.clone()));
    }

    // --- Root signature ---
    let mut root_bindings = BTreeMap::new();
    for (slot, parameter) in descriptor.root_signature.iter() {
        let uniform = uniforms
            .get(&parameter.semantic_name)
            .ok_or_else(|| BuildError::UnmatchedRootParameter {
                pipeline: label.to_owned(),
                slot: slot.clone(),
                name: parameter.semantic_name.clone(),
            })?;

        let expects_sampler = parameter.kind == RootParameterKind::Sampler;
        if expects_sampler != uniform.data_type.is_sampler() {
            return Err(BuildError::RootParameterKindMismatch {
                pipeline: label.to_owned(),
                slot: slot.clone(),
                expected: parameter.kind,
                found: uniform.data_type,
            });
        }

        root_bindings.insert(
            slot.clone(),
            RootBinding {
                kind: parameter.kind,
                uniform: uniform.clone(),
            },
        );
    }

    Ok(ResolvedPipeline {
        label: label.to_owned(),
        program,
        attributes,
        uniforms,
        locations_by_slot,
        elements_by_location,
        root_bindings,
        state,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use prism_core::renderer::api::pipeline::{
        InputElementDescriptor, InputLayout, RootParameter, RootSignature, RootSlot, ShaderDataType,
    };
    use prism_infra::graphics::headless::HeadlessContext;

    const VS: &str = "\
uniform highp mat4 WORLDVIEW;
attribute highp vec3 POSITION;
void main() {
    gl_Position = WORLDVIEW * vec4(POSITION, 1.0);
}
";

    const FS: &str = "\
uniform lowp vec4 COLOR;
void main() {
    gl_FragColor = COLOR;
}
";

    fn descriptor() -> PipelineStateDescriptor {
        PipelineStateDescriptor::new("test")
            .with_shaders(VS, FS)
            .with_input_layout(
                InputLayout::new().with_element("POSITION", InputElementDescriptor::float("meshVertices", 3)),
            )
            .with_root_signature(
                RootSignature::new()
                    .with_parameter("worldView", RootParameter::uniform("WORLDVIEW"))
                    .with_parameter("tintColor", RootParameter::uniform("COLOR")),
            )
    }

    #[test]
    fn test_build_resolves_layout_and_root_signature() {
        let mut ctx = HeadlessContext::new();
        let mut pso = PipelineStateObject::new(descriptor());

        build_pipeline_state(&mut ctx, &mut pso).unwrap();

        assert!(pso.is_built());
        let resolved = pso.resolved().unwrap();
        let position = &resolved.attributes["POSITION"];
        assert_eq!(
            ctx.attribute_location(resolved.program, "POSITION"),
            Some(position.location)
        );
        assert_eq!(
            resolved.locations_by_slot[&InputSlot::from("meshVertices")],
            vec![position.location]
        );
        assert_eq!(
            resolved.root_bindings[&RootSlot::from("tintColor")].uniform.data_type,
            ShaderDataType::FloatVec4
        );
        assert_eq!(
            resolved.root_bindings[&RootSlot::from("worldView")].uniform.data_type,
            ShaderDataType::FloatMat4
        );
        // Normalized in place.
        assert_eq!(pso.descriptor().blend_state.render_targets.len(), 1);
        assert!(pso.descriptor_mut().is_none());
    }

    #[test]
    fn test_second_build_fails_with_already_built() {
        let mut ctx = HeadlessContext::new();
        let mut pso = PipelineStateObject::new(descriptor());
        build_pipeline_state(&mut ctx, &mut pso).unwrap();
        let program = pso.resolved().unwrap().program;

        let err = build_pipeline_state(&mut ctx, &mut pso).unwrap_err();
        assert_eq!(err, BuildError::AlreadyBuilt { pipeline: "test".into() });
        assert_eq!(pso.resolved().unwrap().program, program);
        assert_eq!(ctx.live_programs(), 1);
    }

    #[test]
    fn test_unmatched_input_attribute_leaves_pipeline_unbuilt() {
        let mut ctx = HeadlessContext::new();
        let desc = descriptor().with_input_layout(
            InputLayout::new()
                .with_element("POSITION", InputElementDescriptor::float("meshVertices", 3))
                .with_element("NORMAL", InputElementDescriptor::float("meshVertices", 3)),
        );
        let mut pso = PipelineStateObject::new(desc);

        let err = build_pipeline_state(&mut ctx, &mut pso).unwrap_err();
        assert_eq!(
            err,
            BuildError::UnmatchedInputAttribute {
                pipeline: "test".into(),
                name: "NORMAL".into()
            }
        );
        assert!(!pso.is_built());
        assert_eq!(ctx.live_programs(), 0);
        assert_eq!(ctx.live_shaders(), 0);
    }

    #[test]
    fn test_declared_but_unused_attribute_is_not_visible() {
        let vs = "\
attribute highp vec3 POSITION;
attribute highp vec3 NORMAL;
void main() {
    gl_Position = vec4(POSITION, 1.0);
}
";
        let mut ctx = HeadlessContext::new();
        let desc = descriptor().with_shaders(vs, FS).with_root_signature(RootSignature::new()).with_input_layout(
            InputLayout::new().with_element("NORMAL", InputElementDescriptor::float("meshVertices", 3)),
        );
        let mut pso = PipelineStateObject::new(desc);

        let err = build_pipeline_state(&mut ctx, &mut pso).unwrap_err();
        assert!(matches!(err, BuildError::UnmatchedInputAttribute { name, .. } if name == "NORMAL"));
    }

    #[test]
    fn test_unmatched_root_parameter() {
        let mut ctx = HeadlessContext::new();
        let desc = descriptor().with_root_signature(
            RootSignature::new().with_parameter("viewProjection", RootParameter::uniform("VIEWPROJECTION")),
        );
        let mut pso = PipelineStateObject::new(desc);

        let err = build_pipeline_state(&mut ctx, &mut pso).unwrap_err();
        assert_eq!(
            err,
            BuildError::UnmatchedRootParameter {
                pipeline: "test".into(),
                slot: "viewProjection".into(),
                name: "VIEWPROJECTION".into(),
            }
        );
        assert_eq!(ctx.live_programs(), 0);
    }

    #[test]
    fn test_sampler_parameter_must_name_a_sampler() {
        let mut ctx = HeadlessContext::new();
        let desc = descriptor().with_root_signature(
            RootSignature::new().with_parameter("tint", RootParameter::sampler("COLOR")),
        );
        let mut pso = PipelineStateObject::new(desc);

        let err = build_pipeline_state(&mut ctx, &mut pso).unwrap_err();
        assert_eq!(
            err,
            BuildError::RootParameterKindMismatch {
                pipeline: "test".into(),
                slot: "tint".into(),
                expected: RootParameterKind::Sampler,
                found: ShaderDataType::FloatVec4,
            }
        );
    }

    #[test]
    fn test_compile_error_carries_stage_and_log() {
        let mut ctx = HeadlessContext::new();
        let broken = "#error missing colour output\nvoid main() {\n}\n";
        let mut pso = PipelineStateObject::new(descriptor().with_fragment_shader(broken));

        let err = build_pipeline_state(&mut ctx, &mut pso).unwrap_err();
        match err {
            BuildError::ShaderCompile { stage, log, .. } => {
                assert_eq!(stage, ShaderStage::Fragment);
                assert!(log.contains("missing colour output"), "log was: {log}");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(!pso.is_built());
        assert_eq!(ctx.live_shaders(), 0);
    }

    #[test]
    fn test_link_error() {
        let mut ctx = HeadlessContext::new();
        let fs = "\
varying lowp vec2 vTEXCOORD;
void main() {
    gl_FragColor = vec4(vTEXCOORD, 0.0, 1.0);
}
";
        let desc = descriptor().with_fragment_shader(fs).with_root_signature(
            RootSignature::new().with_parameter("worldView", RootParameter::uniform("WORLDVIEW")),
        );
        let mut pso = PipelineStateObject::new(desc);

        let err = build_pipeline_state(&mut ctx, &mut pso).unwrap_err();
        assert!(matches!(err, BuildError::ProgramLink { ref log, .. } if log.contains("vTEXCOORD")));
        assert_eq!(ctx.live_programs(), 0);
        assert_eq!(ctx.live_shaders(), 0);
    }

    #[test]
    fn test_missing_shader_source() {
        let mut ctx = HeadlessContext::new();
        let mut desc = descriptor();
        desc.fragment_shader = None;
        let mut pso = PipelineStateObject::new(desc);

        let err = build_pipeline_state(&mut ctx, &mut pso).unwrap_err();
        assert_eq!(
            err,
            BuildError::MissingShaderSource {
                pipeline: "test".into(),
                stage: ShaderStage::Fragment
            }
        );
        assert_eq!(ctx.live_shaders(), 0);
    }

    #[test]
    fn test_build_all_stops_at_first_failure() {
        let mut ctx = HeadlessContext::new();
        let mut good = PipelineStateObject::new(descriptor().with_label("good"));
        let mut bad = PipelineStateObject::new(descriptor().with_label("bad").with_fragment_shader("void oops() {}"));
        let mut never = PipelineStateObject::new(descriptor().with_label("never"));

        let err = build_pipeline_states(&mut ctx, [&mut good, &mut bad, &mut never]).unwrap_err();
        assert!(matches!(err, BuildError::ShaderCompile { ref pipeline, .. } if pipeline == "bad"));
        assert!(good.is_built());
        assert!(!bad.is_built());
        assert!(!never.is_built());
    }
}
