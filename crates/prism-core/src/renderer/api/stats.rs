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

//! Per-frame command statistics.

use std::ops::AddAssign;

/// Counters collected while interpreting one frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Commands interpreted.
    pub commands: u32,
    /// Passes executed.
    pub passes: u32,
    /// `SetPipelineState` commands executed.
    pub pipeline_binds: u32,
    /// Individual uniform uploads, samplers included.
    pub uniform_uploads: u32,
    /// Textures bound.
    pub texture_binds: u32,
    /// Draw calls issued.
    pub draw_calls: u32,
    /// Vertices (non-indexed) or indices (indexed) submitted.
    pub elements_submitted: u64,
}

impl AddAssign for FrameStats {
    fn add_assign(&mut self, rhs: Self) {
        self.commands += rhs.commands;
        self.passes += rhs.passes;
        self.pipeline_binds += rhs.pipeline_binds;
        self.uniform_uploads += rhs.uniform_uploads;
        self.texture_binds += rhs.texture_binds;
        self.draw_calls += rhs.draw_calls;
        self.elements_submitted += rhs.elements_submitted;
    }
}
