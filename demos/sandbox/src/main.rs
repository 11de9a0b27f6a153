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

mod camera;
mod scene;

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};
use prism_infra::graphics::headless::HeadlessContext;
use prism_sdk::{EngineConfig, FrameLoop, FrameScript};
use prism_telemetry::init_logging;
use scene::SandboxApp;
use std::path::{Path, PathBuf};

/// Frames rendered when neither the command line nor the configuration
/// bounds the run. The headless backend has no window to close.
const DEFAULT_FRAMES: u64 = 120;

#[derive(Parser, Debug)]
#[command(
    name = "sandbox",
    about = "Render the reference scene (offscreen scene, optional stencil mirror, blit) on the headless backend."
)]
struct Args {
    /// Engine configuration (RON)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Frame script (JSON) replacing the built-in passes
    #[arg(long, value_name = "PATH")]
    script: Option<PathBuf>,

    /// Number of frames to render (overrides the configuration)
    #[arg(long, value_name = "N")]
    frames: Option<u64>,

    /// Create the depth-stencil target and the mirror pipeline, and add the
    /// stencil pass to the built-in frame
    #[arg(long, action = clap::ArgAction::SetTrue)]
    mirror: bool,
}

fn load_script(path: &Path) -> Result<FrameScript> {
    let text = std::fs::read_to_string(path).with_context(|| format!("Failed to read script '{}'", path.display()))?;
    FrameScript::from_json(&text).with_context(|| format!("Failed to parse script '{}'", path.display()))
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    config.max_frames = args.frames.or(config.max_frames).or(Some(DEFAULT_FRAMES));
    config.validate()?;
    init_logging(&config.logging);

    let script = args.script.as_deref().map(load_script).transpose()?;
    if let Some(path) = &args.script {
        info!("Using frame script '{}'", path.display());
    }

    let mut ctx = HeadlessContext::new();
    let mut app = SandboxApp::new(config.surface, args.mirror, script);
    let mut frame_loop = FrameLoop::new(&config);
    let frames = frame_loop.run(&mut app, &mut ctx)?;

    let totals = frame_loop.telemetry().totals();
    info!(
        "Rendered {} frames: {} passes, {} draw calls, {} pipeline binds, {} uniform uploads",
        frames, totals.passes, totals.draw_calls, totals.pipeline_binds, totals.uniform_uploads
    );
    for error in ctx.errors() {
        warn!("Backend reported: {}", error);
    }
    Ok(())
}
