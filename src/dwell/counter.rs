//! Per-identity dwell counter driving the Far -> Pending -> Counted machine.

use std::collections::{BTreeMap, HashMap};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::dwell::state::{DwellPhase, DwellState};
use crate::tracker::{Centroid, IdentityId, Rect};

/// Configuration for the DwellCounter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DwellConfig {
    /// Box area / frame area above which an identity counts as near.
    pub min_area_ratio: f64,
    /// Uninterrupted proximity needed before an identity is counted.
    pub required_dwell_secs: f64,
    /// Radius (pixels) around a centroid in which a box is attributed to it.
    pub match_radius: f64,
}

impl Default for DwellConfig {
    fn default() -> Self {
        Self {
            min_area_ratio: 0.15,
            required_dwell_secs: 10.0,
            match_radius: 50.0,
        }
    }
}

impl DwellConfig {
    pub fn required_dwell(&self) -> Duration {
        Duration::try_from_secs_f64(self.required_dwell_secs).unwrap_or(Duration::MAX)
    }
}

/// Externally observable counter state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct VisitorStats {
    /// Identities ever counted; never decreases.
    pub total_visitors: u64,
    /// Identities near the camera in the latest frame, pending or counted.
    pub currently_near: u32,
}

/// What a renderer needs to annotate one identity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IdentityStatus {
    pub id: IdentityId,
    pub centroid: Centroid,
    pub phase: DwellPhase,
    pub area_ratio: f64,
    pub max_area_ratio: f64,
    /// Dwell time still required, only while pending.
    pub remaining: Option<Duration>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DwellReport {
    pub stats: VisitorStats,
    pub identities: Vec<IdentityStatus>,
}

pub struct DwellCounter {
    states: HashMap<IdentityId, DwellState>,
    total_visitors: u64,
    config: DwellConfig,
    required: Duration,
}

impl DwellCounter {
    pub fn new(config: DwellConfig) -> Self {
        let required = config.required_dwell();
        Self {
            states: HashMap::new(),
            total_visitors: 0,
            config,
            required,
        }
    }

    pub fn config(&self) -> &DwellConfig {
        &self.config
    }

    pub fn total_visitors(&self) -> u64 {
        self.total_visitors
    }

    pub fn state(&self, id: IdentityId) -> Option<&DwellState> {
        self.states.get(&id)
    }

    /// Number of identities with live dwell state.
    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Drop the state of an identity the tracker has deregistered.
    pub fn forget(&mut self, id: IdentityId) -> Option<DwellState> {
        self.states.remove(&id)
    }

    /// Run one frame of the dwell state machine.
    ///
    /// `identities` is the tracker output for this frame and `boxes` the same
    /// boxes the tracker consumed. `now` is the frame timestamp.
    pub fn update(
        &mut self,
        identities: &BTreeMap<IdentityId, Centroid>,
        boxes: &[Rect],
        frame_area: u64,
        now: Instant,
    ) -> DwellReport {
        let mut currently_near = 0;
        let mut statuses = Vec::with_capacity(identities.len());

        for (&id, &centroid) in identities {
            let area_ratio = self.area_ratio(centroid, boxes, frame_area);
            let state = self.states.entry(id).or_default();
            state.max_area_ratio = state.max_area_ratio.max(area_ratio);

            let near = area_ratio > self.config.min_area_ratio;
            let was_pending = state.enter_time().is_some() && !state.is_counted();
            let (phase, newly_counted) = state.observe(near, now, self.required);

            if newly_counted {
                self.total_visitors += 1;
                info!(id, total_visitors = self.total_visitors, "visitor counted");
            } else if was_pending && phase == DwellPhase::Far {
                debug!(id, area_ratio, "dwell clock reset");
            }
            if near {
                currently_near += 1;
            }

            statuses.push(IdentityStatus {
                id,
                centroid,
                phase,
                area_ratio,
                max_area_ratio: state.max_area_ratio,
                remaining: state.remaining(now, self.required),
            });
        }

        DwellReport {
            stats: VisitorStats {
                total_visitors: self.total_visitors,
                currently_near,
            },
            identities: statuses,
        }
    }

    /// Area ratio of the box attributed to `centroid`.
    ///
    /// Every box whose center lies inside the match radius is considered and
    /// the last one in input order wins, not the closest.
    fn area_ratio(&self, centroid: Centroid, boxes: &[Rect], frame_area: u64) -> f64 {
        if frame_area == 0 {
            return 0.0;
        }
        boxes
            .iter()
            .filter(|b| centroid.distance(&b.center()) < self.config.match_radius)
            .last()
            .map_or(0.0, |b| b.area() as f64 / frame_area as f64)
    }
}

impl Default for DwellCounter {
    fn default() -> Self {
        Self::new(DwellConfig::default())
    }
}
