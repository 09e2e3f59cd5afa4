//! Per-frame requested vs. applied report

use keel_gfx::{Context, DriverCall, RecordingDriver};
use keel_metrics::RingBuffer;
use std::collections::BTreeMap;

/// What one replayed frame cost.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameReport {
    pub index: usize,
    pub label: Option<String>,
    /// State requests the script made
    pub requested: usize,
    /// Transitions the context let through
    pub applied: usize,
    /// Transitions the context filtered out
    pub skipped: usize,
    /// Driver calls by category
    pub calls: BTreeMap<&'static str, usize>,
}

impl FrameReport {
    /// Collect the frame's driver calls and counters, leaving both empty.
    pub fn take(ctx: &mut Context<RecordingDriver>, index: usize, label: Option<String>, requested: usize) -> Self {
        let mut calls = BTreeMap::new();
        for call in ctx.driver_mut().take_calls() {
            *calls.entry(DriverCall::category(&call)).or_insert(0) += 1;
        }
        let report = Self {
            index,
            label,
            requested,
            applied: ctx.stats().total(".applied"),
            skipped: ctx.stats().total(".skipped"),
            calls,
        };
        ctx.reset_stats();
        report
    }

    pub fn driver_calls(&self) -> usize {
        self.calls.values().sum()
    }
}

/// Rolling and total figures over a replay.
pub struct Reporter {
    per_frame: bool,
    calls: RingBuffer,
    frames: usize,
    requested: usize,
    driver_calls: usize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Summary {
    pub frames: usize,
    pub requested: usize,
    pub driver_calls: usize,
    /// Rolling average of driver calls per frame over the report window
    pub recent_average: f64,
    pub recent_min: f64,
    pub recent_max: f64,
}

impl Summary {
    /// Fraction of requests that never reached the driver.
    pub fn filtered_ratio(&self) -> f64 {
        if self.requested == 0 {
            return 0.0;
        }
        1.0 - self.driver_calls as f64 / self.requested as f64
    }
}

impl Reporter {
    pub fn new(window: usize, per_frame: bool) -> Self {
        Self {
            per_frame,
            calls: RingBuffer::new(window),
            frames: 0,
            requested: 0,
            driver_calls: 0,
        }
    }

    pub fn record(&mut self, report: &FrameReport) {
        let calls = report.driver_calls();
        if self.per_frame {
            tracing::info!(
                frame = report.index,
                label = report.label.as_deref().unwrap_or(""),
                requested = report.requested,
                applied = report.applied,
                skipped = report.skipped,
                calls,
                "frame"
            );
            for (category, count) in &report.calls {
                tracing::debug!(frame = report.index, category, count, "driver calls");
            }
        }
        self.calls.push(calls as f64);
        self.frames += 1;
        self.requested += report.requested;
        self.driver_calls += calls;
    }

    pub fn summary(&self) -> Summary {
        let (recent_min, recent_max) = self.calls.min_max();
        Summary {
            frames: self.frames,
            requested: self.requested,
            driver_calls: self.driver_calls,
            recent_average: self.calls.average(),
            recent_min,
            recent_max,
        }
    }
}
