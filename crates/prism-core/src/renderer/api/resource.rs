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

//! Opaque handles to context-owned objects and the descriptors used to create them.

use serde::{Deserialize, Serialize};

/// An opaque handle to a compiled shader stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShaderId(pub u32);

/// An opaque handle to a linked program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProgramId(pub u32);

/// An opaque handle to a GPU buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BufferId(pub u32);

/// An opaque handle to a texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureId(pub u32);

/// An opaque handle to a renderbuffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RenderbufferId(pub u32);

/// An opaque handle to a framebuffer. `None` in binding calls means the
/// default framebuffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FramebufferId(pub u32);

/// An opaque handle to a uniform location within a program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UniformLocation(pub u32);

/// The binding point a buffer is used through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferTarget {
    /// Vertex attribute data.
    Array,
    /// Index data.
    ElementArray,
}

/// The binding point of a texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TextureTarget {
    /// A 2D texture.
    Texture2D,
    /// A cube map.
    CubeMap,
}

/// Texture minification and magnification filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FilterMode {
    /// Nearest texel.
    Nearest,
    /// Bilinear interpolation.
    Linear,
    /// Nearest texel of the nearest mip level (minification only).
    NearestMipmapNearest,
    /// Bilinear within the nearest mip level (minification only).
    LinearMipmapNearest,
    /// Nearest texel, blended between two mip levels (minification only).
    NearestMipmapLinear,
    /// Trilinear filtering (minification only).
    LinearMipmapLinear,
}

/// Texture coordinate wrapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WrapMode {
    /// Tile the texture.
    Repeat,
    /// Clamp coordinates to the edge texels.
    ClampToEdge,
    /// Tile the texture, mirroring every other repetition.
    MirroredRepeat,
}

/// Filtering and wrapping parameters applied to a texture when it is bound.
///
/// Samplers are not standalone objects: their parameters are written onto
/// the texture binding every time the texture is activated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SamplerDescriptor {
    /// Minification filter.
    pub min_filter: FilterMode,
    /// Magnification filter.
    pub mag_filter: FilterMode,
    /// Wrapping along S.
    pub wrap_s: WrapMode,
    /// Wrapping along T.
    pub wrap_t: WrapMode,
}

/// A texture bound to a texture unit by `SetActiveTextures`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureBinding {
    /// The texture image unit.
    pub unit: u32,
    /// The binding point.
    pub target: TextureTarget,
    /// The texture to bind.
    pub texture: TextureId,
    /// Sampler parameters applied to the binding, if any.
    pub sampler: Option<SamplerDescriptor>,
}

/// Pixel formats supported for texture creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureFormat {
    /// 8-bit RGBA, unsigned normalized.
    Rgba8,
}

impl TextureFormat {
    /// Bytes per pixel.
    pub const fn bytes_per_pixel(self) -> u32 {
        match self {
            TextureFormat::Rgba8 => 4,
        }
    }
}

/// Describes a 2D texture to create.
#[derive(Debug, Clone, Copy)]
pub struct TextureDescriptor<'a> {
    /// Optional debug label.
    pub label: Option<&'a str>,
    /// Width in texels.
    pub width: u32,
    /// Height in texels.
    pub height: u32,
    /// Pixel format.
    pub format: TextureFormat,
    /// Initial contents. `None` leaves the texture uninitialized (render targets).
    pub data: Option<&'a [u8]>,
    /// Sampling parameters stored on the texture at creation.
    pub sampler: Option<SamplerDescriptor>,
    /// Whether a full mip chain is generated after upload.
    pub generate_mipmaps: bool,
}

/// Storage formats for renderbuffers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RenderbufferFormat {
    /// 16-bit depth.
    Depth16,
    /// Combined depth and stencil.
    DepthStencil,
}

/// An attachment of a framebuffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Attachment {
    /// Level 0 of a 2D texture.
    Texture(TextureId),
    /// A renderbuffer.
    Renderbuffer(RenderbufferId),
}

/// Describes a framebuffer to create.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FramebufferDescriptor {
    /// The colour attachment.
    pub color: Option<Attachment>,
    /// The depth attachment.
    pub depth: Option<Attachment>,
    /// A combined depth-stencil attachment. Mutually exclusive with `depth`.
    pub depth_stencil: Option<Attachment>,
}

/// The vertex attribute pointer passed to the context for one location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VertexAttribLayout {
    /// Components per vertex.
    pub size: u8,
    /// Scalar type of each component.
    pub component_type: super::pipeline::VertexComponentType,
    /// Whether integer data is normalized.
    pub normalized: bool,
    /// Byte stride between vertices.
    pub stride: u32,
    /// Byte offset of the first element.
    pub offset: u32,
}
