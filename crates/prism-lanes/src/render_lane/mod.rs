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

//! Rendering lane: from pipeline descriptors to native calls.
//!
//! - [`build_pipeline_states`] compiles, links and reflects pipelines once.
//! - [`CommandInterpreter`] executes commands against a [`GraphicsContext`].
//! - [`run_passes`] feeds a frame's passes to the interpreter in order.
//!
//! [`GraphicsContext`]: prism_core::renderer::GraphicsContext

mod interpreter;
mod pass_runner;
mod pipeline_builder;
mod uniform_dispatch;

pub use interpreter::CommandInterpreter;
pub use pass_runner::run_passes;
pub use pipeline_builder::{build_pipeline_state, build_pipeline_states};
pub use uniform_dispatch::upload_uniform;
