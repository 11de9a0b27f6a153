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

//! Commands and passes: the data a frame is made of.

mod pass;
pub mod uniform;

pub use self::pass::Pass;
pub use self::uniform::UniformValue;

use super::node::Node;
use super::pipeline::{PipelineStateObject, RootSlot};
use super::resource::{FramebufferId, TextureBinding};
use crate::renderer::error::DispatchError;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// A single rendering command. Commands are plain data; the interpreter
/// gives them meaning.
#[derive(Debug, Clone)]
pub enum Command<'a> {
    /// Binds a framebuffer. `None` selects the default framebuffer.
    SetFramebuffer(Option<FramebufferId>),
    /// Clears the colour buffer to an RGBA value.
    ClearColor([f32; 4]),
    /// Clears the depth buffer to a value.
    ClearDepth(f32),
    /// Clears the stencil buffer to a value.
    ClearStencil(i32),
    /// Binds a built pipeline and applies its fixed-function state.
    SetPipelineState(&'a PipelineStateObject),
    /// Uploads uniform values through the bound pipeline's root slots.
    SetRootUniforms(BTreeMap<RootSlot, UniformValue>),
    /// Binds textures to texture units.
    SetActiveTextures(Vec<TextureBinding>),
    /// Points sampler root slots at texture units.
    SetRootSamplers(BTreeMap<RootSlot, u32>),
    /// Draws nodes with the bound pipeline.
    DrawNodes(Vec<&'a Node>),
}

impl<'a> Command<'a> {
    /// The opcode of this command.
    pub fn opcode(&self) -> Opcode {
        match self {
            Command::SetFramebuffer(_) => Opcode::SetFramebuffer,
            Command::ClearColor(_) => Opcode::ClearColor,
            Command::ClearDepth(_) => Opcode::ClearDepth,
            Command::ClearStencil(_) => Opcode::ClearStencil,
            Command::SetPipelineState(_) => Opcode::SetPipelineState,
            Command::SetRootUniforms(_) => Opcode::SetRootUniforms,
            Command::SetActiveTextures(_) => Opcode::SetActiveTextures,
            Command::SetRootSamplers(_) => Opcode::SetRootSamplers,
            Command::DrawNodes(_) => Opcode::DrawNodes,
        }
    }

    /// Builds a `SetRootUniforms` command from `(slot, value)` pairs.
    pub fn root_uniforms<I, S, V>(values: I) -> Self
    where
        I: IntoIterator<Item = (S, V)>,
        S: Into<RootSlot>,
        V: Into<UniformValue>,
    {
        Command::SetRootUniforms(
            values
                .into_iter()
                .map(|(slot, value)| (slot.into(), value.into()))
                .collect(),
        )
    }

    /// Builds a `SetRootSamplers` command from `(slot, texture unit)` pairs.
    pub fn root_samplers<I, S>(units: I) -> Self
    where
        I: IntoIterator<Item = (S, u32)>,
        S: Into<RootSlot>,
    {
        Command::SetRootSamplers(units.into_iter().map(|(slot, unit)| (slot.into(), unit)).collect())
    }
}

/// The name of a command, as used in logs and serialized command lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    /// `setFramebuffer`
    SetFramebuffer,
    /// `clearColor`
    ClearColor,
    /// `clearDepth`
    ClearDepth,
    /// `clearStencil`
    ClearStencil,
    /// `setPipelineState`
    SetPipelineState,
    /// `setRootUniforms`
    SetRootUniforms,
    /// `setActiveTextures`
    SetActiveTextures,
    /// `setRootSamplers`
    SetRootSamplers,
    /// `drawNodes`
    DrawNodes,
}

impl Opcode {
    /// Every opcode, in declaration order.
    pub const ALL: [Opcode; 9] = [
        Opcode::SetFramebuffer,
        Opcode::ClearColor,
        Opcode::ClearDepth,
        Opcode::ClearStencil,
        Opcode::SetPipelineState,
        Opcode::SetRootUniforms,
        Opcode::SetActiveTextures,
        Opcode::SetRootSamplers,
        Opcode::DrawNodes,
    ];

    /// The serialized name of the opcode.
    pub const fn as_str(self) -> &'static str {
        match self {
            Opcode::SetFramebuffer => "setFramebuffer",
            Opcode::ClearColor => "clearColor",
            Opcode::ClearDepth => "clearDepth",
            Opcode::ClearStencil => "clearStencil",
            Opcode::SetPipelineState => "setPipelineState",
            Opcode::SetRootUniforms => "setRootUniforms",
            Opcode::SetActiveTextures => "setActiveTextures",
            Opcode::SetRootSamplers => "setRootSamplers",
            Opcode::DrawNodes => "drawNodes",
        }
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Opcode {
    type Err = DispatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Opcode::ALL
            .into_iter()
            .find(|op| op.as_str() == s)
            .ok_or_else(|| DispatchError::UnknownCommand { opcode: s.to_owned() })
    }
}
