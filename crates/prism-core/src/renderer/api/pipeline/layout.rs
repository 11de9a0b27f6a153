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

//! Input layouts: which buffer slot and memory layout feeds each vertex attribute.

use super::enums::VertexComponentType;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Names a vertex buffer slot, such as `"meshVertices"`.
///
/// Nodes provide one vertex buffer view per slot; input layouts say which
/// attributes each slot feeds.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InputSlot(pub String);

impl InputSlot {
    /// Returns the slot name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for InputSlot {
    fn from(name: &str) -> Self {
        Self(name.to_owned())
    }
}

impl fmt::Display for InputSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Describes how one vertex attribute is read from its input slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InputElementDescriptor {
    /// The buffer slot supplying this attribute.
    pub input_slot: InputSlot,
    /// Number of components per vertex (1 to 4).
    pub size: u8,
    /// Scalar type of each component.
    pub component_type: VertexComponentType,
    /// Whether integer data is normalized to `[0, 1]` or `[-1, 1]`.
    pub normalized: bool,
    /// Byte distance between consecutive vertices. `0` means tightly packed.
    pub stride: u32,
    /// Byte offset of the first component in the buffer.
    pub offset: u32,
}

impl InputElementDescriptor {
    /// A tightly packed, non-normalized float attribute starting at offset 0.
    pub fn float(input_slot: impl Into<InputSlot>, size: u8) -> Self {
        Self {
            input_slot: input_slot.into(),
            size,
            component_type: VertexComponentType::Float,
            normalized: false,
            stride: 0,
            offset: 0,
        }
    }

    /// Returns the descriptor with the given stride and offset.
    pub fn with_stride_offset(mut self, stride: u32, offset: u32) -> Self {
        self.stride = stride;
        self.offset = offset;
        self
    }
}

/// Maps vertex attribute semantic names to the elements that feed them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InputLayout {
    elements: BTreeMap<String, InputElementDescriptor>,
}

impl InputLayout {
    /// Creates an empty layout.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces the element for `semantic_name`.
    pub fn with_element(mut self, semantic_name: impl Into<String>, element: InputElementDescriptor) -> Self {
        self.elements.insert(semantic_name.into(), element);
        self
    }

    /// Returns the element for `semantic_name`, if declared.
    pub fn get(&self, semantic_name: &str) -> Option<&InputElementDescriptor> {
        self.elements.get(semantic_name)
    }

    /// Iterates over `(semantic name, element)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &InputElementDescriptor)> {
        self.elements.iter().map(|(name, element)| (name.as_str(), element))
    }

    /// Number of declared elements.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Returns `true` if no element is declared.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}
