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

//! Defines the hierarchy of error types for the rendering subsystem.
//!
//! - [`BuildError`]: raised once, while turning pipeline descriptors into
//!   built pipeline state objects. Always an authoring mistake.
//! - [`DispatchError`]: raised while interpreting a frame's commands. Aborts
//!   the frame.
//! - [`ResourceError`]: raised by a [`GraphicsContext`] when an object
//!   cannot be created, compiled or linked.
//!
//! [`GraphicsContext`]: crate::renderer::traits::GraphicsContext

use crate::renderer::api::pipeline::{InputSlot, RootParameterKind, RootSlot, ShaderDataType, ShaderStage};
use thiserror::Error;

/// An error reported by a graphics context while creating an object.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResourceError {
    /// A shader stage failed to compile. Carries the native compiler log.
    #[error("Shader compilation failed: {0}")]
    CompileFailed(String),
    /// A program failed to link. Carries the native linker log.
    #[error("Program link failed: {0}")]
    LinkFailed(String),
    /// The context could not allocate an object.
    #[error("Failed to create {kind}: {reason}")]
    CreationFailed {
        /// The kind of object (`"buffer"`, `"texture"`, ...).
        kind: &'static str,
        /// The backend's explanation.
        reason: String,
    },
    /// A framebuffer was created but is not complete.
    #[error("Framebuffer is incomplete (status {status:#06x})")]
    IncompleteFramebuffer {
        /// The native completeness status.
        status: u32,
    },
    /// A handle does not name a live object of this context.
    #[error("Unknown {kind} handle {id}")]
    InvalidHandle {
        /// The kind of object.
        kind: &'static str,
        /// The raw handle value.
        id: u32,
    },
}

/// An error raised while building a pipeline state object.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    /// The pipeline was already built.
    #[error("Pipeline '{pipeline}' is already built")]
    AlreadyBuilt {
        /// The pipeline label.
        pipeline: String,
    },
    /// More blend entries were declared than render targets can be bound.
    #[error("Pipeline '{pipeline}' declares {provided} render target blend states, only {supported} supported")]
    TooManyRenderTargets {
        /// The pipeline label.
        pipeline: String,
        /// Number of entries declared.
        provided: usize,
        /// Number of simultaneously bound render targets supported.
        supported: usize,
    },
    /// A shader stage has no source.
    #[error("Pipeline '{pipeline}' has no {stage} shader source")]
    MissingShaderSource {
        /// The pipeline label.
        pipeline: String,
        /// The stage lacking source.
        stage: ShaderStage,
    },
    /// A shader stage failed to compile.
    #[error("Pipeline '{pipeline}': {stage} shader failed to compile: {log}")]
    ShaderCompile {
        /// The pipeline label.
        pipeline: String,
        /// The failing stage.
        stage: ShaderStage,
        /// The native compiler diagnostic.
        log: String,
    },
    /// The program failed to link.
    #[error("Pipeline '{pipeline}': program failed to link: {log}")]
    ProgramLink {
        /// The pipeline label.
        pipeline: String,
        /// The native linker diagnostic.
        log: String,
    },
    /// An input layout entry names an attribute the vertex shader does not expose.
    #[error("Pipeline '{pipeline}': input attribute '{name}' could not be matched with the program")]
    UnmatchedInputAttribute {
        /// The pipeline label.
        pipeline: String,
        /// The semantic name from the input layout.
        name: String,
    },
    /// A root parameter names a uniform the program does not expose.
    #[error("Pipeline '{pipeline}': root parameter '{slot}' ({name}) could not be matched with the program")]
    UnmatchedRootParameter {
        /// The pipeline label.
        pipeline: String,
        /// The root slot.
        slot: RootSlot,
        /// The semantic name the slot maps to.
        name: String,
    },
    /// A root parameter's kind disagrees with the reflected uniform type.
    #[error("Pipeline '{pipeline}': root parameter '{slot}' is declared as {expected} but the shader declares {found}")]
    RootParameterKindMismatch {
        /// The pipeline label.
        pipeline: String,
        /// The root slot.
        slot: RootSlot,
        /// The declared parameter kind.
        expected: RootParameterKind,
        /// The reflected uniform type.
        found: ShaderDataType,
    },
    /// The context failed to create an object.
    #[error(transparent)]
    Resource(#[from] ResourceError),
}

/// An error raised while interpreting commands.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// A serialized command named an opcode that does not exist.
    #[error("Unknown command '{opcode}'")]
    UnknownCommand {
        /// The unrecognized opcode.
        opcode: String,
    },
    /// The reflected uniform type has no upload handler.
    #[error("Root slot '{slot}' maps to a uniform of unhandled type {data_type}")]
    UnhandledUniformType {
        /// The root slot being set.
        slot: RootSlot,
        /// The reflected type.
        data_type: ShaderDataType,
    },
    /// The value shape does not fit the reflected uniform.
    #[error("Value for root slot '{slot}' ({value_kind} x{value_len}) does not fit uniform {data_type}[{size}]")]
    UniformValueMismatch {
        /// The root slot being set.
        slot: RootSlot,
        /// The reflected type.
        data_type: ShaderDataType,
        /// The reflected array size.
        size: u32,
        /// The kind of value supplied (`"float"`, `"int array"`, ...).
        value_kind: &'static str,
        /// Number of scalars supplied.
        value_len: usize,
    },
    /// The bound pipeline's root signature does not declare the slot.
    #[error("Pipeline '{pipeline}' has no root parameter '{slot}'")]
    UnboundRootParameter {
        /// The bound pipeline.
        pipeline: String,
        /// The requested slot.
        slot: RootSlot,
    },
    /// A uniform slot was set as a sampler, or the reverse.
    #[error("Root slot '{slot}' is a {declared} parameter but was set as a {requested}")]
    RootParameterKindMismatch {
        /// The requested slot.
        slot: RootSlot,
        /// The kind declared by the root signature.
        declared: RootParameterKind,
        /// The kind the command tried to set.
        requested: RootParameterKind,
    },
    /// A command requiring a bound pipeline ran with none bound.
    #[error("Command '{opcode}' requires a bound pipeline state")]
    NoPipelineBound {
        /// The offending command's opcode.
        opcode: &'static str,
    },
    /// `SetPipelineState` was given a pipeline that was never built.
    #[error("Pipeline '{pipeline}' was bound before being built")]
    PipelineNotBuilt {
        /// The pipeline label.
        pipeline: String,
    },
    /// A node lacks the vertex buffer view for a slot the pipeline reads.
    #[error("Node has no vertex buffer view for slot '{slot}' (attribute '{attribute}')")]
    MissingVertexBufferView {
        /// The input slot.
        slot: InputSlot,
        /// The attribute fed by the slot.
        attribute: String,
    },
    /// An indexed draw was requested for a node without an index buffer view.
    #[error("Indexed draw requested for a node without an index buffer view")]
    MissingIndexBufferView,
    /// The byte offset of an indexed draw does not fit in 32 bits.
    #[error("Index byte offset overflows for start index {start_index} (view offset {view_offset})")]
    IndexOffsetOverflow {
        /// The first index to draw.
        start_index: u32,
        /// The byte offset of the index buffer view.
        view_offset: u32,
    },
}

/// Any error of the rendering subsystem.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    /// A pipeline failed to build.
    #[error(transparent)]
    Build(#[from] BuildError),
    /// A command failed to execute.
    #[error(transparent)]
    Dispatch(#[from] DispatchError),
    /// A context object could not be created.
    #[error(transparent)]
    Resource(#[from] ResourceError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_error_display() {
        let err = BuildError::ShaderCompile {
            pipeline: "scene".into(),
            stage: ShaderStage::Fragment,
            log: "ERROR: 0:3: 'gl_FragColour' : undeclared identifier".into(),
        };
        assert_eq!(
            err.to_string(),
            "Pipeline 'scene': fragment shader failed to compile: ERROR: 0:3: 'gl_FragColour' : undeclared identifier"
        );

        let err = BuildError::UnmatchedRootParameter {
            pipeline: "blit".into(),
            slot: "blitSampler".into(),
            name: "BLITSAMPLER".into(),
        };
        assert!(err.to_string().contains("'blitSampler' (BLITSAMPLER)"));
    }

    #[test]
    fn test_dispatch_error_display() {
        let err = DispatchError::UniformValueMismatch {
            slot: "weights".into(),
            data_type: ShaderDataType::Float,
            size: 4,
            value_kind: "float",
            value_len: 1,
        };
        assert_eq!(
            err.to_string(),
            "Value for root slot 'weights' (float x1) does not fit uniform float[4]"
        );
        assert_eq!(
            DispatchError::NoPipelineBound { opcode: "drawNodes" }.to_string(),
            "Command 'drawNodes' requires a bound pipeline state"
        );
    }

    #[test]
    fn test_conversions_into_render_error() {
        let resource = ResourceError::IncompleteFramebuffer { status: 0x8CD6 };
        assert_eq!(resource.to_string(), "Framebuffer is incomplete (status 0x8cd6)");

        let build: BuildError = resource.clone().into();
        let render: RenderError = build.into();
        assert_eq!(render, RenderError::Build(BuildError::Resource(resource)));

        let render: RenderError = DispatchError::MissingIndexBufferView.into();
        assert!(matches!(render, RenderError::Dispatch(_)));
    }
}
