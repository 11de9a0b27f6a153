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

//! Runs the passes of a frame through a command interpreter.

use super::interpreter::CommandInterpreter;
use log::error;
use prism_core::renderer::api::command::Pass;
use prism_core::renderer::{DispatchError, GraphicsContext};

/// Runs a frame's passes in order, each command in order.
///
/// Every pass starts with no pipeline bound, so a pass cannot depend on the
/// bindings of the one before it. The first failing command aborts the
/// frame: the remaining commands and passes are skipped.
///
/// # Errors
///
/// The [`DispatchError`] of the first failing command.
pub fn run_passes(
    interpreter: &mut CommandInterpreter,
    ctx: &mut dyn GraphicsContext,
    passes: &[Pass<'_>],
) -> Result<(), DispatchError> {
    for pass in passes {
        interpreter.begin_pass();
        for (index, command) in pass.commands.iter().enumerate() {
            if let Err(err) = interpreter.interpret(ctx, command) {
                error!(
                    "Pass '{}' aborted at command #{} ('{}'): {}",
                    pass.label,
                    index,
                    command.opcode(),
                    err
                );
                return Err(err);
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use prism_core::renderer::api::command::Command;
    use prism_core::renderer::FramebufferId;
    use prism_infra::graphics::headless::{GlCall, HeadlessContext};

    #[test]
    fn test_passes_run_in_order() {
        let mut ctx = HeadlessContext::new();
        let mut interpreter = CommandInterpreter::new();
        let passes = [
            Pass::new("offscreen")
                .with(Command::SetFramebuffer(Some(FramebufferId(1))))
                .with(Command::ClearDepth(1.0)),
            Pass::new("present").with(Command::SetFramebuffer(None)),
        ];

        run_passes(&mut interpreter, &mut ctx, &passes).unwrap();

        let binds: Vec<_> = ctx
            .calls()
            .iter()
            .filter(|call| matches!(call, GlCall::BindFramebuffer(_)))
            .cloned()
            .collect();
        assert_eq!(
            binds,
            vec![
                GlCall::BindFramebuffer(Some(FramebufferId(1))),
                GlCall::BindFramebuffer(None)
            ]
        );
        let stats = interpreter.stats();
        assert_eq!(stats.passes, 2);
        assert_eq!(stats.commands, 3);
    }

    #[test]
    fn test_first_error_aborts_the_frame() {
        let mut ctx = HeadlessContext::new();
        let mut interpreter = CommandInterpreter::new();
        let passes = [
            Pass::new("broken")
                .with(Command::DrawNodes(Vec::new()))
                .with(Command::ClearColor([0.0; 4])),
            Pass::new("never").with(Command::SetFramebuffer(None)),
        ];

        let err = run_passes(&mut interpreter, &mut ctx, &passes).unwrap_err();
        assert_eq!(err, DispatchError::NoPipelineBound { opcode: "drawNodes" });
        assert!(ctx.calls().is_empty());
        assert_eq!(interpreter.stats().passes, 1);
    }
}
