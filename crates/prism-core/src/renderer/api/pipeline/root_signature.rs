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

//! Root signatures: abstract binding slots mapped to shader-visible uniforms.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Names a root parameter slot, such as `"worldView"`.
///
/// Commands address uniforms through slots; the root signature says which
/// shader uniform each slot stands for.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RootSlot(pub String);

impl RootSlot {
    /// Returns the slot name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for RootSlot {
    fn from(name: &str) -> Self {
        Self(name.to_owned())
    }
}

impl From<String> for RootSlot {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl fmt::Display for RootSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The kind of value a root parameter carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RootParameterKind {
    /// A plain uniform value (scalar, vector or matrix), set with `SetRootUniforms`.
    Uniform,
    /// A sampler uniform receiving a texture unit index, set with `SetRootSamplers`.
    Sampler,
}

impl fmt::Display for RootParameterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RootParameterKind::Uniform => write!(f, "uniform"),
            RootParameterKind::Sampler => write!(f, "sampler"),
        }
    }
}

/// One entry of a root signature.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RootParameter {
    /// What the slot carries.
    pub kind: RootParameterKind,
    /// The uniform name declared in the shader source.
    pub semantic_name: String,
}

impl RootParameter {
    /// A uniform-value parameter bound to `semantic_name`.
    pub fn uniform(semantic_name: impl Into<String>) -> Self {
        Self {
            kind: RootParameterKind::Uniform,
            semantic_name: semantic_name.into(),
        }
    }

    /// A sampler parameter bound to `semantic_name`.
    pub fn sampler(semantic_name: impl Into<String>) -> Self {
        Self {
            kind: RootParameterKind::Sampler,
            semantic_name: semantic_name.into(),
        }
    }
}

/// Maps root slots to root parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RootSignature {
    parameters: BTreeMap<RootSlot, RootParameter>,
}

impl RootSignature {
    /// Creates an empty root signature.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces the parameter for `slot`.
    pub fn with_parameter(mut self, slot: impl Into<RootSlot>, parameter: RootParameter) -> Self {
        self.parameters.insert(slot.into(), parameter);
        self
    }

    /// Returns the parameter declared for `slot`.
    pub fn get(&self, slot: &RootSlot) -> Option<&RootParameter> {
        self.parameters.get(slot)
    }

    /// Iterates over the parameters in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (&RootSlot, &RootParameter)> {
        self.parameters.iter()
    }

    /// Number of declared parameters.
    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    /// Returns `true` if no parameter is declared.
    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }
}
