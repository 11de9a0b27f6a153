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

//! Uniform uploads, dispatched on the reflected uniform kind.
//!
//! Each [`UniformKind`] has exactly one handler in [`UPLOAD_HANDLERS`]. A
//! handler checks the value shape against the reflected uniform before
//! anything reaches the context. Values are never broadcast: a scalar only
//! fits a non-array single-component uniform.

use log::trace;
use prism_core::renderer::api::command::UniformValue;
use prism_core::renderer::api::pipeline::{ActiveUniform, RootSlot, ScalarType, UniformKind};
use prism_core::renderer::{DispatchError, GraphicsContext, UniformData};
use std::borrow::Cow;

type UploadHandler = fn(&mut dyn GraphicsContext, &UploadRequest<'_>) -> Result<(), DispatchError>;

struct UploadRequest<'a> {
    slot: &'a RootSlot,
    uniform: &'a ActiveUniform,
    kind: UniformKind,
    value: &'a UniformValue,
}

/// Indexed by [`handler_index`].
const UPLOAD_HANDLERS: [UploadHandler; 4] = [upload_scalar, upload_vector, upload_matrix, upload_sampler];

const fn handler_index(kind: UniformKind) -> usize {
    match kind {
        UniformKind::Scalar(_) => 0,
        UniformKind::Vector(..) => 1,
        UniformKind::Matrix(_) => 2,
        UniformKind::Sampler => 3,
    }
}

/// Uploads `value` to the reflected `uniform` bound at `slot`.
///
/// # Errors
///
/// * [`DispatchError::UnhandledUniformType`] - no handler exists for the reflected type.
/// * [`DispatchError::UniformValueMismatch`] - the value's type or length does not fit.
pub fn upload_uniform(
    ctx: &mut dyn GraphicsContext,
    slot: &RootSlot,
    uniform: &ActiveUniform,
    value: &UniformValue,
) -> Result<(), DispatchError> {
    let kind = uniform
        .data_type
        .uniform_kind()
        .ok_or_else(|| DispatchError::UnhandledUniformType {
            slot: slot.clone(),
            data_type: uniform.data_type,
        })?;

    trace!(
        "Uploading {} x{} to '{}' ({} at location {})",
        value.kind_name(),
        value.len(),
        slot,
        uniform.data_type,
        uniform.location.0
    );

    let request = UploadRequest {
        slot,
        uniform,
        kind,
        value,
    };
    UPLOAD_HANDLERS[handler_index(kind)](ctx, &request)
}

fn upload_scalar(ctx: &mut dyn GraphicsContext, req: &UploadRequest<'_>) -> Result<(), DispatchError> {
    match req.kind {
        UniformKind::Scalar(scalar) => upload_components(ctx, req, scalar, 1),
        _ => Err(mismatch(req)),
    }
}

fn upload_vector(ctx: &mut dyn GraphicsContext, req: &UploadRequest<'_>) -> Result<(), DispatchError> {
    match req.kind {
        UniformKind::Vector(scalar, n) => upload_components(ctx, req, scalar, n),
        _ => Err(mismatch(req)),
    }
}

fn upload_matrix(ctx: &mut dyn GraphicsContext, req: &UploadRequest<'_>) -> Result<(), DispatchError> {
    let UniformKind::Matrix(dimension) = req.kind else {
        return Err(mismatch(req));
    };
    check_shape(req, req.kind.components())?;
    let values = float_values(req)?;
    ctx.set_uniform(
        req.uniform.location,
        UniformData::Matrix {
            dimension,
            values: &values,
        },
    );
    Ok(())
}

fn upload_sampler(ctx: &mut dyn GraphicsContext, req: &UploadRequest<'_>) -> Result<(), DispatchError> {
    check_shape(req, 1)?;
    let units = int_values(req, false)?;
    ctx.set_uniform(
        req.uniform.location,
        UniformData::Int {
            components: 1,
            values: &units,
        },
    );
    Ok(())
}

fn upload_components(
    ctx: &mut dyn GraphicsContext,
    req: &UploadRequest<'_>,
    scalar: ScalarType,
    components: u8,
) -> Result<(), DispatchError> {
    check_shape(req, components as usize)?;
    match scalar {
        ScalarType::Float => {
            let values = float_values(req)?;
            ctx.set_uniform(
                req.uniform.location,
                UniformData::Float {
                    components,
                    values: &values,
                },
            );
        }
        ScalarType::Int | ScalarType::Bool => {
            let values = int_values(req, scalar == ScalarType::Bool)?;
            ctx.set_uniform(
                req.uniform.location,
                UniformData::Int {
                    components,
                    values: &values,
                },
            );
        }
    }
    Ok(())
}

/// Checks the value length against the uniform's component count and array size.
fn check_shape(req: &UploadRequest<'_>, components: usize) -> Result<(), DispatchError> {
    let size = req.uniform.size.max(1) as usize;
    let len = req.value.len();
    let fits = if req.value.is_scalar() {
        components == 1 && size == 1
    } else {
        len > 0 && len % components == 0 && len / components <= size
    };
    if fits {
        Ok(())
    } else {
        Err(mismatch(req))
    }
}

fn float_values<'v>(req: &UploadRequest<'v>) -> Result<Cow<'v, [f32]>, DispatchError> {
    match req.value {
        UniformValue::Float(v) => Ok(Cow::Borrowed(std::slice::from_ref(v))),
        UniformValue::Floats(v) => Ok(Cow::Borrowed(v.as_slice())),
        _ => Err(mismatch(req)),
    }
}

/// Integer data for int, bool and sampler uniforms. Booleans are only
/// accepted when `accept_bool` is set.
fn int_values<'v>(req: &UploadRequest<'v>, accept_bool: bool) -> Result<Cow<'v, [i32]>, DispatchError> {
    match req.value {
        UniformValue::Int(v) => Ok(Cow::Borrowed(std::slice::from_ref(v))),
        UniformValue::Ints(v) => Ok(Cow::Borrowed(v.as_slice())),
        UniformValue::Bool(b) if accept_bool => Ok(Cow::Owned(vec![i32::from(*b)])),
        UniformValue::Bools(v) if accept_bool => Ok(Cow::Owned(v.iter().map(|&b| i32::from(b)).collect())),
        _ => Err(mismatch(req)),
    }
}

fn mismatch(req: &UploadRequest<'_>) -> DispatchError {
    DispatchError::UniformValueMismatch {
        slot: req.slot.clone(),
        data_type: req.uniform.data_type,
        size: req.uniform.size,
        value_kind: req.value.kind_name(),
        value_len: req.value.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prism_core::math::{Mat4, Vec3};
    use prism_core::renderer::api::pipeline::ShaderDataType;
    use prism_core::renderer::UniformLocation;
    use prism_infra::graphics::headless::{GlCall, HeadlessContext, RecordedUniform};

    fn uniform(data_type: ShaderDataType, size: u32) -> ActiveUniform {
        ActiveUniform {
            name: "U".into(),
            size,
            data_type,
            location: UniformLocation(7),
        }
    }

    fn upload(data_type: ShaderDataType, size: u32, value: UniformValue) -> (HeadlessContext, Result<(), DispatchError>) {
        let mut ctx = HeadlessContext::new();
        let result = upload_uniform(&mut ctx, &RootSlot::from("slot"), &uniform(data_type, size), &value);
        (ctx, result)
    }

    fn last_upload(ctx: &HeadlessContext) -> Option<&RecordedUniform> {
        ctx.calls().iter().rev().find_map(|call| match call {
            GlCall::SetUniform { value, .. } => Some(value),
            _ => None,
        })
    }

    #[test]
    fn test_every_handled_kind_has_a_handler() {
        let kinds = [
            UniformKind::Scalar(ScalarType::Float),
            UniformKind::Vector(ScalarType::Int, 3),
            UniformKind::Matrix(4),
            UniformKind::Sampler,
        ];
        let mut seen: Vec<usize> = kinds.iter().map(|&k| handler_index(k)).collect();
        seen.sort_unstable();
        assert_eq!(seen, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_vec4_upload() {
        let (ctx, result) = upload(ShaderDataType::FloatVec4, 1, vec![1.0f32, 0.5, 0.25, 1.0].into());
        result.unwrap();
        assert_eq!(
            ctx.calls().last(),
            Some(&GlCall::SetUniform {
                location: UniformLocation(7),
                value: RecordedUniform::Float {
                    components: 4,
                    values: vec![1.0, 0.5, 0.25, 1.0]
                },
            })
        );
    }

    #[test]
    fn test_mat4_upload_is_column_major() {
        let m = Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0));
        let (ctx, result) = upload(ShaderDataType::FloatMat4, 1, m.into());
        result.unwrap();
        assert_eq!(
            last_upload(&ctx),
            Some(&RecordedUniform::Matrix {
                dimension: 4,
                values: m.to_cols_array().to_vec()
            })
        );
    }

    #[test]
    fn test_scalar_is_not_broadcast_to_a_vector() {
        let (ctx, result) = upload(ShaderDataType::FloatVec4, 1, 1.0f32.into());
        assert_eq!(
            result.unwrap_err(),
            DispatchError::UniformValueMismatch {
                slot: "slot".into(),
                data_type: ShaderDataType::FloatVec4,
                size: 1,
                value_kind: "float",
                value_len: 1,
            }
        );
        assert!(last_upload(&ctx).is_none());
    }

    #[test]
    fn test_scalar_is_not_broadcast_to_an_array() {
        let (_, result) = upload(ShaderDataType::Float, 4, 1.0f32.into());
        assert!(matches!(result, Err(DispatchError::UniformValueMismatch { .. })));
    }

    #[test]
    fn test_array_uniform_accepts_partial_arrays_only_up_to_its_size() {
        let (ctx, result) = upload(ShaderDataType::Float, 4, vec![1.0f32, 2.0, 3.0].into());
        result.unwrap();
        assert_eq!(
            last_upload(&ctx),
            Some(&RecordedUniform::Float {
                components: 1,
                values: vec![1.0, 2.0, 3.0]
            })
        );

        let (_, result) = upload(ShaderDataType::Float, 4, vec![0.0f32; 5].into());
        assert!(matches!(result, Err(DispatchError::UniformValueMismatch { value_len: 5, .. })));
    }

    #[test]
    fn test_vector_length_must_be_a_multiple_of_components() {
        let (_, result) = upload(ShaderDataType::FloatVec3, 2, vec![0.0f32; 4].into());
        assert!(matches!(result, Err(DispatchError::UniformValueMismatch { .. })));

        let (_, result) = upload(ShaderDataType::FloatVec3, 2, vec![0.0f32; 6].into());
        result.unwrap();
    }

    #[test]
    fn test_empty_array_is_rejected() {
        let (_, result) = upload(ShaderDataType::Float, 1, UniformValue::Floats(Vec::new()));
        assert!(matches!(result, Err(DispatchError::UniformValueMismatch { value_len: 0, .. })));
    }

    #[test]
    fn test_value_type_must_match_scalar_type() {
        let (_, result) = upload(ShaderDataType::Float, 1, 1i32.into());
        assert!(matches!(result, Err(DispatchError::UniformValueMismatch { value_kind: "int", .. })));

        let (_, result) = upload(ShaderDataType::Int, 1, true.into());
        assert!(matches!(result, Err(DispatchError::UniformValueMismatch { value_kind: "bool", .. })));
    }

    #[test]
    fn test_booleans_upload_as_integers() {
        let (ctx, result) = upload(ShaderDataType::BoolVec2, 1, UniformValue::Bools(vec![true, false]));
        result.unwrap();
        assert_eq!(
            last_upload(&ctx),
            Some(&RecordedUniform::Int {
                components: 2,
                values: vec![1, 0]
            })
        );

        let (ctx, result) = upload(ShaderDataType::Bool, 1, 1i32.into());
        result.unwrap();
        assert_eq!(
            last_upload(&ctx),
            Some(&RecordedUniform::Int {
                components: 1,
                values: vec![1]
            })
        );
    }

    #[test]
    fn test_sampler_receives_texture_unit() {
        let (ctx, result) = upload(ShaderDataType::Sampler2D, 1, 3i32.into());
        result.unwrap();
        assert_eq!(
            last_upload(&ctx),
            Some(&RecordedUniform::Int {
                components: 1,
                values: vec![3]
            })
        );

        let (_, result) = upload(ShaderDataType::Sampler2D, 1, 3.0f32.into());
        assert!(matches!(result, Err(DispatchError::UniformValueMismatch { .. })));
    }

    #[test]
    fn test_unhandled_type() {
        let (_, result) = upload(ShaderDataType::UnsignedIntVec2, 1, vec![1i32, 2].into());
        assert_eq!(
            result.unwrap_err(),
            DispatchError::UnhandledUniformType {
                slot: "slot".into(),
                data_type: ShaderDataType::UnsignedIntVec2,
            }
        );

        let (_, result) = upload(ShaderDataType::Other(0x8dc1), 1, 0i32.into());
        assert!(matches!(result, Err(DispatchError::UnhandledUniformType { .. })));
    }
}
