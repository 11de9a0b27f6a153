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

//! Pipeline state objects and the binding tables resolved when they are built.

use super::descriptor::PipelineStateDescriptor;
use super::layout::{InputElementDescriptor, InputSlot};
use super::reflection::{ActiveAttribute, ActiveUniform};
use super::root_signature::{RootParameterKind, RootSlot};
use super::state::FixedFunctionState;
use crate::renderer::api::resource::ProgramId;
use crate::renderer::error::BuildError;
use std::collections::BTreeMap;
use std::sync::Arc;

/// A root slot resolved against program reflection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootBinding {
    /// The kind declared by the root signature.
    pub kind: RootParameterKind,
    /// The reflected uniform the slot maps to.
    pub uniform: ActiveUniform,
}

/// Everything the interpreter needs to bind a built pipeline, derived once
/// from the compiled program and the descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPipeline {
    /// The pipeline label.
    pub label: String,
    /// The linked program.
    pub program: ProgramId,
    /// Active attributes keyed by name.
    pub attributes: BTreeMap<String, ActiveAttribute>,
    /// Active uniforms keyed by base name.
    pub uniforms: BTreeMap<String, ActiveUniform>,
    /// For each input slot, the attribute locations it feeds.
    pub locations_by_slot: BTreeMap<InputSlot, Vec<u32>>,
    /// For each fed attribute location, the element describing its memory layout.
    pub elements_by_location: BTreeMap<u32, (String, InputElementDescriptor)>,
    /// Root slots resolved to reflected uniforms.
    pub root_bindings: BTreeMap<RootSlot, RootBinding>,
    /// Fixed-function state applied on bind.
    pub state: FixedFunctionState,
}

impl ResolvedPipeline {
    /// Attribute locations owned by the program, in ascending order.
    pub fn attribute_locations(&self) -> Vec<u32> {
        let mut locations: Vec<u32> = self.attributes.values().map(|a| a.location).collect();
        locations.sort_unstable();
        locations.dedup();
        locations
    }
}

/// A pipeline state object: an authored descriptor plus, once built, its
/// resolved binding tables.
///
/// The descriptor can only be edited before the pipeline is built. Building
/// happens exactly once.
#[derive(Debug, Clone)]
pub struct PipelineStateObject {
    descriptor: PipelineStateDescriptor,
    resolved: Option<Arc<ResolvedPipeline>>,
}

impl PipelineStateObject {
    /// Wraps a descriptor into an unbuilt pipeline.
    pub fn new(descriptor: PipelineStateDescriptor) -> Self {
        Self {
            descriptor,
            resolved: None,
        }
    }

    /// The authored (and, after build, normalized) descriptor.
    pub fn descriptor(&self) -> &PipelineStateDescriptor {
        &self.descriptor
    }

    /// Mutable access to the descriptor, only while unbuilt.
    pub fn descriptor_mut(&mut self) -> Option<&mut PipelineStateDescriptor> {
        match self.resolved {
            None => Some(&mut self.descriptor),
            Some(_) => None,
        }
    }

    /// The label used in diagnostics.
    pub fn label(&self) -> &str {
        self.descriptor.label_or_default()
    }

    /// Returns `true` once the pipeline has been built.
    pub fn is_built(&self) -> bool {
        self.resolved.is_some()
    }

    /// The resolved binding tables, present once built.
    pub fn resolved(&self) -> Option<&Arc<ResolvedPipeline>> {
        self.resolved.as_ref()
    }

    /// Stores the resolved tables, freezing the pipeline.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::AlreadyBuilt`] if the pipeline is already built;
    /// the existing tables are kept.
    pub fn freeze(&mut self, resolved: ResolvedPipeline) -> Result<(), BuildError> {
        if self.resolved.is_some() {
            return Err(BuildError::AlreadyBuilt {
                pipeline: self.label().to_owned(),
            });
        }
        log::trace!("Pipeline '{}' frozen on program {}", self.label(), resolved.program.0);
        self.resolved = Some(Arc::new(resolved));
        Ok(())
    }
}

impl From<PipelineStateDescriptor> for PipelineStateObject {
    fn from(descriptor: PipelineStateDescriptor) -> Self {
        Self::new(descriptor)
    }
}
