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

//! Service aggregating per-frame command statistics.

use prism_core::renderer::FrameStats;
use std::time::{Duration, Instant};

/// Averages over the frames recorded since the previous report.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameReport {
    /// Frames in the window.
    pub frames: u64,
    /// Average draw calls per frame.
    pub draw_calls: f64,
    /// Average pipeline binds per frame.
    pub pipeline_binds: f64,
    /// Average uniform uploads per frame.
    pub uniform_uploads: f64,
    /// Average CPU time spent producing a frame.
    pub frame_time: Duration,
}

#[derive(Debug, Default)]
struct Window {
    frames: u64,
    stats: FrameStats,
    frame_time: Duration,
}

impl Window {
    fn report(&self) -> FrameReport {
        let frames = self.frames.max(1);
        let per_frame = |value: u32| f64::from(value) / frames as f64;
        FrameReport {
            frames: self.frames,
            draw_calls: per_frame(self.stats.draw_calls),
            pipeline_binds: per_frame(self.stats.pipeline_binds),
            uniform_uploads: per_frame(self.stats.uniform_uploads),
            frame_time: self.frame_time / frames as u32,
        }
    }
}

/// Collects the [`FrameStats`] of every frame and logs a summary at a fixed
/// interval.
#[derive(Debug)]
pub struct TelemetryService {
    report_interval: Duration,
    last_report: Instant,
    window: Window,
    totals: FrameStats,
    total_frames: u64,
}

impl TelemetryService {
    /// Creates a service reporting every `report_interval`.
    pub fn new(report_interval: Duration) -> Self {
        Self {
            report_interval,
            last_report: Instant::now(),
            window: Window::default(),
            totals: FrameStats::default(),
            total_frames: 0,
        }
    }

    /// Records one frame. Returns the report when the interval has elapsed.
    pub fn record_frame(&mut self, stats: FrameStats, frame_time: Duration) -> Option<FrameReport> {
        self.record_frame_at(Instant::now(), stats, frame_time)
    }

    fn record_frame_at(&mut self, now: Instant, stats: FrameStats, frame_time: Duration) -> Option<FrameReport> {
        self.window.frames += 1;
        self.window.stats += stats;
        self.window.frame_time += frame_time;
        self.totals += stats;
        self.total_frames += 1;

        if now.duration_since(self.last_report) < self.report_interval {
            return None;
        }

        let report = self.window.report();
        log::info!(
            "{} frames: {:.1} draws, {:.1} pipeline binds, {:.1} uniform uploads per frame, {:.2?} per frame",
            report.frames,
            report.draw_calls,
            report.pipeline_binds,
            report.uniform_uploads,
            report.frame_time
        );
        self.window = Window::default();
        self.last_report = now;
        Some(report)
    }

    /// Statistics summed over every recorded frame.
    pub fn totals(&self) -> FrameStats {
        self.totals
    }

    /// Number of recorded frames.
    pub fn total_frames(&self) -> u64 {
        self.total_frames
    }

    /// The report interval.
    pub fn report_interval(&self) -> Duration {
        self.report_interval
    }
}

impl Default for TelemetryService {
    fn default() -> Self {
        Self::new(Duration::from_secs(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(draw_calls: u32, pipeline_binds: u32) -> FrameStats {
        FrameStats {
            draw_calls,
            pipeline_binds,
            ..Default::default()
        }
    }

    #[test]
    fn test_reports_average_over_the_window() {
        let mut service = TelemetryService::new(Duration::from_secs(1));
        let start = service.last_report;

        let quiet = start + Duration::from_millis(400);
        assert!(service
            .record_frame_at(quiet, frame(2, 1), Duration::from_millis(4))
            .is_none());

        let due = start + Duration::from_millis(1000);
        let report = service
            .record_frame_at(due, frame(4, 3), Duration::from_millis(6))
            .expect("interval elapsed");
        assert_eq!(report.frames, 2);
        assert_eq!(report.draw_calls, 3.0);
        assert_eq!(report.pipeline_binds, 2.0);
        assert_eq!(report.frame_time, Duration::from_millis(5));

        let later = due + Duration::from_millis(10);
        assert!(service.record_frame_at(later, frame(1, 1), Duration::ZERO).is_none());
        assert_eq!(service.total_frames(), 3);
        assert_eq!(service.totals().draw_calls, 7);
    }
}
