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

//! The application contract and the fixed-rate frame loop driving it.

use crate::config::EngineConfig;
use anyhow::{Context, Result};
use prism_core::renderer::{FrameStats, GraphicsContext, Pass};
use prism_lanes::{run_passes, CommandInterpreter};
use prism_telemetry::TelemetryService;
use std::time::{Duration, Instant};

/// What the frame loop drives.
pub trait Application {
    /// Called once before the first frame to create GPU objects and build
    /// pipelines.
    fn setup(&mut self, ctx: &mut dyn GraphicsContext) -> Result<()>;

    /// Called every frame with the time elapsed since the previous frame.
    fn update(&mut self, dt: Duration);

    /// The passes of the current frame.
    fn passes(&self) -> Result<Vec<Pass<'_>>>;

    /// Stops the loop when `true`.
    fn should_exit(&self) -> bool {
        false
    }
}

/// Runs an [`Application`] at a fixed rate.
///
/// The loop owns the [`CommandInterpreter`] and the [`TelemetryService`].
/// A frame whose commands fail is aborted and ends the loop with the error.
#[derive(Debug)]
pub struct FrameLoop {
    interpreter: CommandInterpreter,
    telemetry: TelemetryService,
    frame_interval: Option<Duration>,
    max_frames: Option<u64>,
    frames: u64,
}

impl FrameLoop {
    /// Creates a loop paced and bounded by `config`.
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            interpreter: CommandInterpreter::new(),
            telemetry: TelemetryService::new(config.telemetry_interval()),
            frame_interval: config.frame_interval(),
            max_frames: config.max_frames,
            frames: 0,
        }
    }

    /// Frames completed so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// The telemetry collected so far.
    pub fn telemetry(&self) -> &TelemetryService {
        &self.telemetry
    }

    /// Sets the application up, then runs frames until `max_frames` is
    /// reached or the application asks to exit. Returns the number of
    /// frames run.
    pub fn run<A: Application>(&mut self, app: &mut A, ctx: &mut dyn GraphicsContext) -> Result<u64> {
        app.setup(ctx).context("Application setup failed")?;
        log::info!(
            "Frame loop started ({})",
            match self.frame_interval {
                Some(interval) => format!("{:.1} ms per frame", interval.as_secs_f64() * 1000.0),
                None => "unthrottled".to_owned(),
            }
        );

        let start = self.frames;
        let mut last_frame = Instant::now();
        while !self.max_frames.is_some_and(|max| self.frames >= max) && !app.should_exit() {
            let frame_start = Instant::now();
            let dt = frame_start.duration_since(last_frame);
            last_frame = frame_start;

            self.frame(app, ctx, dt)?;

            if let Some(interval) = self.frame_interval {
                let elapsed = frame_start.elapsed();
                if elapsed < interval {
                    std::thread::sleep(interval - elapsed);
                }
            }
        }

        let ran = self.frames - start;
        log::info!(
            "Frame loop stopped after {} frames ({} draw calls in total)",
            ran,
            self.telemetry.totals().draw_calls
        );
        Ok(ran)
    }

    /// Runs a single frame: update, collect passes, interpret them.
    pub fn frame<A: Application>(
        &mut self,
        app: &mut A,
        ctx: &mut dyn GraphicsContext,
        dt: Duration,
    ) -> Result<FrameStats> {
        let frame_start = Instant::now();
        app.update(dt);

        let passes = app
            .passes()
            .with_context(|| format!("Failed to assemble frame {}", self.frames))?;
        log::trace!("Frame {}: {} passes", self.frames, passes.len());
        let outcome = run_passes(&mut self.interpreter, ctx, &passes);
        let stats = self.interpreter.take_stats();
        // Counters of an aborted frame are recorded too.
        self.telemetry.record_frame(stats, frame_start.elapsed());
        outcome.with_context(|| format!("Frame {} aborted", self.frames))?;

        self.frames += 1;
        Ok(stats)
    }
}
