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

//! Frame scripts: command lists authored as JSON.
//!
//! A script names its resources (pipelines, nodes, targets, textures,
//! samplers, uniform sources); [`FrameScript::resolve`] turns it into
//! [`Pass`]es against a [`SceneResources`] registry.
//!
//! ```json
//! { "passes": [ { "label": "blit", "commands": [
//!     { "op": "setFramebuffer", "target": null },
//!     { "op": "setPipelineState", "pipeline": "blit" },
//!     { "op": "setActiveTextures", "textures": [
//!         { "unit": 0, "texture": "sceneColor", "sampler": "blit" } ] },
//!     { "op": "setRootSamplers", "samplers": { "blitSampler": 0 } },
//!     { "op": "drawNodes", "nodes": ["blit"] } ] } ] }
//! ```

use prism_core::renderer::api::pipeline::PipelineStateObject;
use prism_core::renderer::{
    Command, DispatchError, FramebufferId, Node, Opcode, Pass, RootSlot, SamplerDescriptor, TextureBinding,
    TextureId, TextureTarget, UniformValue,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;
use thiserror::Error;

/// An error raised while parsing or resolving a frame script.
#[derive(Debug, Error)]
pub enum ScriptError {
    /// The text is not JSON of the expected shape.
    #[error("Malformed frame script: {0}")]
    Json(#[from] serde_json::Error),
    /// A command has no `op` string.
    #[error("Pass '{pass}', command #{index}: missing 'op'")]
    MissingOpcode {
        /// The pass label.
        pass: String,
        /// Index of the command in its pass.
        index: usize,
    },
    /// A command names an opcode that does not exist.
    #[error(transparent)]
    Dispatch(#[from] DispatchError),
    /// A command's arguments do not match its opcode.
    #[error("Pass '{pass}', command #{index} ('{op}'): {reason}")]
    InvalidArguments {
        /// The pass label.
        pass: String,
        /// Index of the command in its pass.
        index: usize,
        /// The command's opcode.
        op: Opcode,
        /// What is wrong with the arguments.
        reason: String,
    },
    /// A name does not exist in the resource registry.
    #[error("Unknown {kind} '{name}'")]
    UnknownResource {
        /// The registry searched (`"pipeline"`, `"node"`, ...).
        kind: &'static str,
        /// The missing name.
        name: String,
    },
}

/// A uniform value as written in a script.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScriptValue {
    /// `{"float": 1.0}`
    Float(f32),
    /// `{"int": 1}`
    Int(i32),
    /// `{"bool": true}`
    Bool(bool),
    /// `{"floats": [..]}`
    Floats(Vec<f32>),
    /// `{"ints": [..]}`
    Ints(Vec<i32>),
    /// `{"bools": [..]}`
    Bools(Vec<bool>),
    /// `{"source": "name"}`: a value kept up to date in [`SceneResources`].
    Source(String),
}

/// Binding point of a scripted texture binding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ScriptTextureTarget {
    /// `"texture2D"`
    #[default]
    Texture2D,
    /// `"cubeMap"`
    CubeMap,
}

impl From<ScriptTextureTarget> for TextureTarget {
    fn from(target: ScriptTextureTarget) -> Self {
        match target {
            ScriptTextureTarget::Texture2D => TextureTarget::Texture2D,
            ScriptTextureTarget::CubeMap => TextureTarget::CubeMap,
        }
    }
}

/// A texture binding as written in a script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptTextureBinding {
    /// The texture image unit.
    pub unit: u32,
    /// Name of the texture.
    pub texture: String,
    /// Name of the sampler applied to the binding.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sampler: Option<String>,
    /// The binding point.
    #[serde(default)]
    pub target: ScriptTextureTarget,
}

/// One scripted command. The `op` tag uses the opcode names of [`Opcode`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
#[allow(missing_docs)]
pub enum ScriptCommand {
    /// `null` targets the default framebuffer.
    SetFramebuffer { target: Option<String> },
    ClearColor { color: [f32; 4] },
    ClearDepth { depth: f32 },
    ClearStencil { stencil: i32 },
    SetPipelineState { pipeline: String },
    SetRootUniforms { uniforms: BTreeMap<String, ScriptValue> },
    SetActiveTextures { textures: Vec<ScriptTextureBinding> },
    SetRootSamplers { samplers: BTreeMap<String, u32> },
    DrawNodes { nodes: Vec<String> },
}

/// A scripted pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptPass {
    /// The pass label.
    pub label: String,
    /// The commands, in execution order.
    pub commands: Vec<ScriptCommand>,
}

/// A frame described as data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameScript {
    /// The passes, in execution order.
    pub passes: Vec<ScriptPass>,
}

#[derive(Deserialize)]
struct RawPass {
    label: String,
    #[serde(default)]
    commands: Vec<serde_json::Value>,
}

#[derive(Deserialize)]
struct RawScript {
    passes: Vec<RawPass>,
}

impl FrameScript {
    /// Parses a script.
    ///
    /// # Errors
    ///
    /// - [`ScriptError::Dispatch`] with [`DispatchError::UnknownCommand`]
    ///   when a command names an opcode that does not exist.
    /// - [`ScriptError::InvalidArguments`] when a command's fields do not
    ///   match its opcode.
    /// - [`ScriptError::Json`] / [`ScriptError::MissingOpcode`] for
    ///   malformed documents.
    pub fn from_json(text: &str) -> Result<Self, ScriptError> {
        let raw: RawScript = serde_json::from_str(text)?;
        let mut passes = Vec::with_capacity(raw.passes.len());
        for pass in raw.passes {
            let mut commands = Vec::with_capacity(pass.commands.len());
            for (index, value) in pass.commands.into_iter().enumerate() {
                let op = value
                    .get("op")
                    .and_then(serde_json::Value::as_str)
                    .ok_or_else(|| ScriptError::MissingOpcode {
                        pass: pass.label.clone(),
                        index,
                    })?;
                let op = Opcode::from_str(op)?;
                let command = serde_json::from_value(value).map_err(|err| ScriptError::InvalidArguments {
                    pass: pass.label.clone(),
                    index,
                    op,
                    reason: err.to_string(),
                })?;
                commands.push(command);
            }
            passes.push(ScriptPass {
                label: pass.label,
                commands,
            });
        }
        Ok(Self { passes })
    }

    /// Serializes the script as pretty JSON.
    pub fn to_json_pretty(&self) -> Result<String, ScriptError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Resolves every name against `resources`.
    ///
    /// Uniform sources are read at resolution time, so a script resolved
    /// each frame sees the values of that frame.
    ///
    /// # Errors
    ///
    /// [`ScriptError::UnknownResource`] for the first name `resources`
    /// does not hold.
    pub fn resolve<'r>(&self, resources: &'r SceneResources) -> Result<Vec<Pass<'r>>, ScriptError> {
        self.passes
            .iter()
            .map(|pass| {
                let mut resolved = Pass::new(pass.label.clone());
                for command in &pass.commands {
                    resolved.push(resources.resolve_command(command)?);
                }
                Ok::<_, ScriptError>(resolved)
            })
            .collect()
    }
}

/// Named resources frame scripts refer to.
#[derive(Debug, Default)]
pub struct SceneResources {
    /// Pipeline state objects.
    pub pipelines: BTreeMap<String, PipelineStateObject>,
    /// Drawable nodes.
    pub nodes: BTreeMap<String, Node>,
    /// Offscreen render targets.
    pub framebuffers: BTreeMap<String, FramebufferId>,
    /// Textures.
    pub textures: BTreeMap<String, TextureId>,
    /// Sampler parameter sets.
    pub samplers: BTreeMap<String, SamplerDescriptor>,
    /// Values updated by the application, referenced with `{"source": ..}`.
    pub uniform_sources: BTreeMap<String, UniformValue>,
}

impl SceneResources {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores or replaces a named uniform value.
    pub fn set_uniform_source(&mut self, name: impl Into<String>, value: impl Into<UniformValue>) {
        self.uniform_sources.insert(name.into(), value.into());
    }

    /// The pipeline named `name`.
    pub fn pipeline(&self, name: &str) -> Result<&PipelineStateObject, ScriptError> {
        lookup(&self.pipelines, "pipeline", name)
    }

    /// The node named `name`.
    pub fn node(&self, name: &str) -> Result<&Node, ScriptError> {
        lookup(&self.nodes, "node", name)
    }

    /// The node named `name`, for per-frame updates.
    pub fn node_mut(&mut self, name: &str) -> Result<&mut Node, ScriptError> {
        self.nodes.get_mut(name).ok_or_else(|| ScriptError::UnknownResource {
            kind: "node",
            name: name.to_owned(),
        })
    }

    fn uniform_value(&self, value: &ScriptValue) -> Result<UniformValue, ScriptError> {
        Ok(match value {
            ScriptValue::Float(v) => UniformValue::Float(*v),
            ScriptValue::Int(v) => UniformValue::Int(*v),
            ScriptValue::Bool(v) => UniformValue::Bool(*v),
            ScriptValue::Floats(v) => UniformValue::Floats(v.clone()),
            ScriptValue::Ints(v) => UniformValue::Ints(v.clone()),
            ScriptValue::Bools(v) => UniformValue::Bools(v.clone()),
            ScriptValue::Source(name) => lookup(&self.uniform_sources, "uniform source", name)?.clone(),
        })
    }

    fn resolve_command(&self, command: &ScriptCommand) -> Result<Command<'_>, ScriptError> {
        Ok(match command {
            ScriptCommand::SetFramebuffer { target } => Command::SetFramebuffer(
                target
                    .as_deref()
                    .map(|name| lookup(&self.framebuffers, "framebuffer", name).copied())
                    .transpose()?,
            ),
            ScriptCommand::ClearColor { color } => Command::ClearColor(*color),
            ScriptCommand::ClearDepth { depth } => Command::ClearDepth(*depth),
            ScriptCommand::ClearStencil { stencil } => Command::ClearStencil(*stencil),
            ScriptCommand::SetPipelineState { pipeline } => Command::SetPipelineState(self.pipeline(pipeline)?),
            ScriptCommand::SetRootUniforms { uniforms } => Command::SetRootUniforms(
                uniforms
                    .iter()
                    .map(|(slot, value)| {
                        let value = self.uniform_value(value)?;
                        Ok::<_, ScriptError>((RootSlot::from(slot.as_str()), value))
                    })
                    .collect::<Result<_, ScriptError>>()?,
            ),
            ScriptCommand::SetActiveTextures { textures } => Command::SetActiveTextures(
                textures
                    .iter()
                    .map(|binding| {
                        Ok::<_, ScriptError>(TextureBinding {
                            unit: binding.unit,
                            target: binding.target.into(),
                            texture: *lookup(&self.textures, "texture", &binding.texture)?,
                            sampler: binding
                                .sampler
                                .as_deref()
                                .map(|name| lookup(&self.samplers, "sampler", name).copied())
                                .transpose()?,
                        })
                    })
                    .collect::<Result<_, ScriptError>>()?,
            ),
            ScriptCommand::SetRootSamplers { samplers } => Command::SetRootSamplers(
                samplers
                    .iter()
                    .map(|(slot, unit)| (RootSlot::from(slot.as_str()), *unit))
                    .collect(),
            ),
            ScriptCommand::DrawNodes { nodes } => Command::DrawNodes(
                nodes
                    .iter()
                    .map(|name| self.node(name))
                    .collect::<Result<_, ScriptError>>()?,
            ),
        })
    }
}

fn lookup<'m, V>(map: &'m BTreeMap<String, V>, kind: &'static str, name: &str) -> Result<&'m V, ScriptError> {
    map.get(name).ok_or_else(|| ScriptError::UnknownResource {
        kind,
        name: name.to_owned(),
    })
}
