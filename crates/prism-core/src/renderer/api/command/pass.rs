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

use super::Command;
use std::borrow::Cow;

/// One coherent rendering phase: an ordered command list.
///
/// A frame is a list of passes executed front to back, each command in
/// declaration order.
#[derive(Debug, Clone, Default)]
pub struct Pass<'a> {
    /// A label used in logs and error reports.
    pub label: Cow<'a, str>,
    /// The commands, in execution order.
    pub commands: Vec<Command<'a>>,
}

impl<'a> Pass<'a> {
    /// Creates an empty pass.
    pub fn new(label: impl Into<Cow<'a, str>>) -> Self {
        Self {
            label: label.into(),
            commands: Vec::new(),
        }
    }

    /// Appends a command.
    pub fn with(mut self, command: Command<'a>) -> Self {
        self.commands.push(command);
        self
    }

    /// Appends a command in place.
    pub fn push(&mut self, command: Command<'a>) {
        self.commands.push(command);
    }
}
