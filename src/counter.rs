//! Per-frame glue between detections, the centroid tracker and the dwell counter.

use std::time::Instant;

use serde::Serialize;
use tracing::trace;

use crate::config::CounterConfig;
use crate::dwell::{DwellCounter, DwellReport, IdentityStatus, VisitorStats};
use crate::integration::Detection;
use crate::tracker::{CentroidTracker, Rect};

/// Everything one frame produced, ready for rendering or reporting.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FrameReport {
    pub stats: VisitorStats,
    pub identities: Vec<IdentityStatus>,
    /// Clamped target-label boxes that entered tracking.
    pub boxes: Vec<Rect>,
}

/// One camera's tracking and counting state.
///
/// Identity and dwell state share the identity id as lifecycle key: when the
/// tracker deregisters an identity its dwell state is dropped in the same
/// frame.
pub struct VisitorCounter {
    target_label: String,
    tracker: CentroidTracker,
    dwell: DwellCounter,
    stats: VisitorStats,
}

impl VisitorCounter {
    pub fn new(config: CounterConfig) -> Self {
        let CounterConfig {
            target_label,
            tracker,
            dwell,
        } = config;
        Self::with_parts(target_label, CentroidTracker::new(tracker), DwellCounter::new(dwell))
    }

    /// Assemble a counter from preconfigured components.
    pub fn with_parts(
        target_label: impl Into<String>,
        tracker: CentroidTracker,
        dwell: DwellCounter,
    ) -> Self {
        Self {
            target_label: target_label.into(),
            tracker,
            dwell,
            stats: VisitorStats::default(),
        }
    }

    /// Process one frame's detections taken at `now`.
    pub fn observe(
        &mut self,
        detections: &[Detection],
        frame_width: u32,
        frame_height: u32,
        now: Instant,
    ) -> FrameReport {
        let boxes: Vec<Rect> = detections
            .iter()
            .filter(|d| d.label == self.target_label)
            .map(|d| d.to_rect(frame_width, frame_height))
            .filter(|r| !r.is_empty())
            .collect();

        let identities = self.tracker.update(&boxes);
        for id in self.tracker.take_deregistered() {
            self.dwell.forget(id);
        }

        let frame_area = u64::from(frame_width) * u64::from(frame_height);
        let DwellReport { stats, identities } =
            self.dwell.update(&identities, &boxes, frame_area, now);
        self.stats = stats;

        trace!(
            detections = detections.len(),
            boxes = boxes.len(),
            identities = identities.len(),
            total_visitors = stats.total_visitors,
            currently_near = stats.currently_near,
            "frame observed"
        );

        FrameReport {
            stats,
            identities,
            boxes,
        }
    }

    /// Counters as of the last observed frame.
    pub fn stats(&self) -> VisitorStats {
        self.stats
    }

    pub fn tracker(&self) -> &CentroidTracker {
        &self.tracker
    }

    pub fn dwell(&self) -> &DwellCounter {
        &self.dwell
    }
}

impl Default for VisitorCounter {
    fn default() -> Self {
        Self::new(CounterConfig::default())
    }
}
