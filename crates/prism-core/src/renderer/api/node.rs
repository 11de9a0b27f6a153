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

//! Drawable nodes: buffer views plus the arguments of a single draw.

use super::pipeline::{IndexFormat, InputSlot, PrimitiveTopology};
use super::resource::BufferId;
use crate::math::Mat4;
use std::collections::BTreeMap;

/// A view of a vertex buffer bound to an input slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VertexBufferView {
    /// The buffer holding vertex data.
    pub buffer: BufferId,
    /// Overrides the stride of every element read from this view.
    pub stride: Option<u32>,
    /// Added to the offset of every element read from this view.
    pub offset: Option<u32>,
}

impl VertexBufferView {
    /// A view of the whole buffer using the input layout's strides and offsets.
    pub fn new(buffer: BufferId) -> Self {
        Self {
            buffer,
            stride: None,
            offset: None,
        }
    }
}

/// A view of an index buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IndexBufferView {
    /// The buffer holding indices.
    pub buffer: BufferId,
    /// The index type.
    pub format: IndexFormat,
    /// Byte offset of the first index.
    pub offset: u32,
}

/// The arguments of a node's draw. A node issues exactly one of the two forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DrawArguments {
    /// Draw consecutive vertices.
    NonIndexed {
        /// How vertices form primitives.
        topology: PrimitiveTopology,
        /// Number of vertices.
        vertex_count: u32,
        /// First vertex.
        start_vertex: u32,
    },
    /// Draw through the node's index buffer view.
    Indexed {
        /// How vertices form primitives.
        topology: PrimitiveTopology,
        /// Number of indices.
        index_count: u32,
        /// First index, relative to the view's offset.
        start_index: u32,
    },
}

/// Something that can be drawn.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// Optional label for logs.
    pub label: Option<String>,
    /// Vertex buffer views keyed by the slot they feed.
    pub vertex_buffers: BTreeMap<InputSlot, VertexBufferView>,
    /// The index buffer view, required for indexed draws.
    pub index_buffer: Option<IndexBufferView>,
    /// The draw to issue.
    pub draw: DrawArguments,
    /// Model-to-world transform, updated by the application each frame.
    pub transform: Mat4,
}

impl Node {
    /// Creates a node without buffers and an identity transform.
    pub fn new(draw: DrawArguments) -> Self {
        Self {
            label: None,
            vertex_buffers: BTreeMap::new(),
            index_buffer: None,
            draw,
            transform: Mat4::IDENTITY,
        }
    }

    /// Sets the label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Adds the vertex buffer view for `slot`.
    pub fn with_vertex_buffer(mut self, slot: impl Into<InputSlot>, view: VertexBufferView) -> Self {
        self.vertex_buffers.insert(slot.into(), view);
        self
    }

    /// Sets the index buffer view.
    pub fn with_index_buffer(mut self, view: IndexBufferView) -> Self {
        self.index_buffer = Some(view);
        self
    }

    /// Sets the model transform.
    pub fn with_transform(mut self, transform: Mat4) -> Self {
        self.transform = transform;
        self
    }
}
