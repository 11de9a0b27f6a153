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

//! Foundational traits and data structures for the explicit-state renderer.
//!
//! - [`api`] holds the declarative data: pipeline descriptors, reflection
//!   tables, nodes, commands and passes.
//! - [`traits`] holds the [`GraphicsContext`] contract backends implement.
//! - [`error`] holds the build-time and dispatch-time error taxonomy.

pub mod api;
pub mod error;
pub mod traits;

pub use self::api::*;
pub use self::error::{BuildError, DispatchError, RenderError, ResourceError};
pub use self::traits::{ClearFlags, GraphicsContext, UniformData};
