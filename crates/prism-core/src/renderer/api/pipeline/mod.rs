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

//! Pipeline state objects: descriptors, fixed-function state, input layouts,
//! root signatures, reflection data and the state normalizer.

pub mod descriptor;
pub mod enums;
pub mod layout;
pub mod normalizer;
pub mod object;
pub mod reflection;
pub mod root_signature;
pub mod state;

pub use self::descriptor::*;
pub use self::enums::*;
pub use self::layout::*;
pub use self::normalizer::{normalize_pipeline_state, resolve_fixed_function_state, MAX_RENDER_TARGETS};
pub use self::object::*;
pub use self::reflection::*;
pub use self::root_signature::*;
pub use self::state::*;
