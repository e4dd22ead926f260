//! Centroid tracker: greedy association of per-frame boxes to persistent identities.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::tracker::identity::{Identity, IdentityId};
use crate::tracker::matching::{self, AssignmentResult, AssociationKind, Associator};
use crate::tracker::rect::{Centroid, Rect};

/// Configuration for the CentroidTracker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Frames an identity may go unmatched before it is deregistered.
    pub max_disappeared: u32,
    /// Largest centroid displacement (pixels) accepted as the same identity.
    pub max_distance: f64,
    pub association: AssociationKind,
    /// When identities outnumber detections, also register the detections
    /// left unmatched instead of dropping them.
    pub register_unmatched_when_crowded: bool,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            max_disappeared: 30,
            max_distance: 80.0,
            association: AssociationKind::Greedy,
            register_unmatched_when_crowded: false,
        }
    }
}

pub struct CentroidTracker {
    identities: BTreeMap<IdentityId, Identity>,
    next_id: IdentityId,
    deregistered: Vec<IdentityId>,
    config: TrackerConfig,
    associator: Box<dyn Associator + Send + Sync>,
}

impl CentroidTracker {
    pub fn new(config: TrackerConfig) -> Self {
        let associator = config.association.build();
        Self::with_associator(config, associator)
    }

    /// Create a tracker with a custom association strategy.
    pub fn with_associator(
        config: TrackerConfig,
        associator: Box<dyn Associator + Send + Sync>,
    ) -> Self {
        Self {
            identities: BTreeMap::new(),
            next_id: 0,
            deregistered: Vec::new(),
            config,
            associator,
        }
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    pub fn len(&self) -> usize {
        self.identities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.identities.is_empty()
    }

    pub fn get(&self, id: IdentityId) -> Option<&Identity> {
        self.identities.get(&id)
    }

    /// Currently tracked identities in id order.
    pub fn identities(&self) -> impl Iterator<Item = &Identity> {
        self.identities.values()
    }

    /// Drain the ids deregistered by the most recent `update`.
    ///
    /// The list is reset at the start of every `update`, so ids not taken
    /// before the next frame are discarded.
    pub fn take_deregistered(&mut self) -> Vec<IdentityId> {
        std::mem::take(&mut self.deregistered)
    }

    /// Associate this frame's boxes and return every live identity's centroid.
    ///
    /// Boxes must already be clamped to the frame.
    pub fn update(&mut self, boxes: &[Rect]) -> BTreeMap<IdentityId, Centroid> {
        self.deregistered.clear();

        if boxes.is_empty() {
            let ids: Vec<IdentityId> = self.identities.keys().copied().collect();
            for id in ids {
                self.mark_missed(id);
            }
            return self.centroids();
        }

        let input: Vec<Centroid> = boxes.iter().map(Rect::center).collect();

        if self.identities.is_empty() {
            for &centroid in &input {
                self.register(centroid);
            }
            return self.centroids();
        }

        let ids: Vec<IdentityId> = self.identities.keys().copied().collect();
        let current: Vec<Centroid> = self.identities.values().map(|t| t.centroid).collect();
        let dists = matching::centroid_distance(&current, &input);

        let AssignmentResult {
            matches,
            unmatched_tracks,
            unmatched_detections,
        } = self.associator.associate(&dists, self.config.max_distance);

        for (row, col) in matches {
            if let Some(identity) = self.identities.get_mut(&ids[row]) {
                identity.update(input[col]);
            }
        }

        if ids.len() >= input.len() {
            for row in unmatched_tracks {
                self.mark_missed(ids[row]);
            }
            if self.config.register_unmatched_when_crowded {
                for col in unmatched_detections {
                    self.register(input[col]);
                }
            } else if !unmatched_detections.is_empty() {
                debug!(
                    dropped = unmatched_detections.len(),
                    "unmatched detections dropped, identities outnumber detections"
                );
            }
        } else {
            for col in unmatched_detections {
                self.register(input[col]);
            }
        }

        self.centroids()
    }

    fn centroids(&self) -> BTreeMap<IdentityId, Centroid> {
        self.identities
            .iter()
            .map(|(&id, identity)| (id, identity.centroid))
            .collect()
    }

    fn register(&mut self, centroid: Centroid) {
        let id = self.next_id;
        self.next_id += 1;
        self.identities.insert(id, Identity::new(id, centroid));
        debug!(id, x = centroid.x, y = centroid.y, "identity registered");
    }

    fn mark_missed(&mut self, id: IdentityId) {
        let Some(identity) = self.identities.get_mut(&id) else {
            return;
        };
        if identity.mark_missed() > self.config.max_disappeared {
            self.identities.remove(&id);
            self.deregistered.push(id);
            debug!(id, "identity deregistered");
        }
    }
}

impl Default for CentroidTracker {
    fn default() -> Self {
        Self::new(TrackerConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(cx: i32, cy: i32) -> Rect {
        Rect::new(cx - 10, cy - 10, cx + 10, cy + 10)
    }

    #[test]
    fn test_first_frame_registers_in_input_order() {
        let mut tracker = CentroidTracker::default();
        let out = tracker.update(&[square(300, 300), square(100, 100)]);
        assert_eq!(out.get(&0), Some(&Centroid::new(300, 300)));
        assert_eq!(out.get(&1), Some(&Centroid::new(100, 100)));
    }

    #[test]
    fn test_crowded_branch_drops_unmatched_detection() {
        let mut tracker = CentroidTracker::default();
        tracker.update(&[square(100, 100)]);

        // One identity, one far detection: no match, no registration.
        let out = tracker.update(&[square(400, 400)]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[&0], Centroid::new(100, 100));
        assert_eq!(tracker.get(0).map(|t| t.disappeared_frames), Some(1));
    }

    #[test]
    fn test_crowded_branch_can_register_when_enabled() {
        let mut tracker = CentroidTracker::new(TrackerConfig {
            register_unmatched_when_crowded: true,
            ..TrackerConfig::default()
        });
        tracker.update(&[square(100, 100)]);
        let out = tracker.update(&[square(400, 400)]);
        assert_eq!(out.len(), 2);
        assert_eq!(out[&1], Centroid::new(400, 400));
    }

    #[test]
    fn test_surplus_detections_register_without_aging_identities() {
        let mut tracker = CentroidTracker::default();
        tracker.update(&[square(100, 100)]);
        let out = tracker.update(&[square(105, 100), square(500, 400), square(20, 400)]);
        assert_eq!(out.len(), 3);
        assert_eq!(out[&0], Centroid::new(105, 100));
        assert_eq!(out[&1], Centroid::new(500, 400));
        assert_eq!(out[&2], Centroid::new(20, 400));
        assert_eq!(tracker.get(0).map(|t| t.disappeared_frames), Some(0));
    }

    #[test]
    fn test_deregistered_ids_are_reported_once() {
        let mut tracker = CentroidTracker::new(TrackerConfig {
            max_disappeared: 1,
            ..TrackerConfig::default()
        });
        tracker.update(&[square(100, 100)]);
        tracker.update(&[]);
        assert!(tracker.take_deregistered().is_empty());
        tracker.update(&[]);
        assert!(tracker.is_empty());
        assert_eq!(tracker.take_deregistered(), vec![0]);
        assert!(tracker.take_deregistered().is_empty());
    }

    #[test]
    fn test_undrained_deregistrations_do_not_accumulate() {
        let mut tracker = CentroidTracker::new(TrackerConfig {
            max_disappeared: 0,
            ..TrackerConfig::default()
        });
        for _ in 0..10_000 {
            tracker.update(&[square(100, 100)]);
            tracker.update(&[]);
        }
        assert!(tracker.is_empty());
        // Only the id dropped by the last empty frame is still held.
        assert_eq!(tracker.take_deregistered(), vec![9_999]);
    }

    #[test]
    fn test_deregistered_list_resets_each_update() {
        let mut tracker = CentroidTracker::new(TrackerConfig {
            max_disappeared: 0,
            ..TrackerConfig::default()
        });
        tracker.update(&[square(100, 100)]);
        tracker.update(&[]);
        tracker.update(&[square(300, 300)]);
        assert!(tracker.take_deregistered().is_empty());
    }

    #[test]
    fn test_ids_are_never_reused() {
        let mut tracker = CentroidTracker::new(TrackerConfig {
            max_disappeared: 0,
            ..TrackerConfig::default()
        });
        tracker.update(&[square(100, 100)]);
        tracker.update(&[]);
        assert!(tracker.is_empty());
        let out = tracker.update(&[square(100, 100)]);
        assert_eq!(out.keys().copied().collect::<Vec<_>>(), vec![1]);
    }
}
