//! Single tracked identity for centroid tracking.

use std::collections::VecDeque;

use crate::tracker::rect::Centroid;

/// Number of past centroids retained per identity.
pub const HISTORY_LEN: usize = 20;

/// Stable identifier handed out by the tracker.
pub type IdentityId = u64;

/// Single tracked identity.
#[derive(Debug, Clone)]
pub struct Identity {
    /// Unique identifier, never reused
    pub id: IdentityId,
    /// Current centroid
    pub centroid: Centroid,
    /// Consecutive frames without a successful association
    pub disappeared_frames: u32,
    history: VecDeque<Centroid>,
}

impl Identity {
    /// Create a new identity seeded with its first centroid.
    pub fn new(id: IdentityId, centroid: Centroid) -> Self {
        let mut history = VecDeque::with_capacity(HISTORY_LEN);
        history.push_back(centroid);
        Self {
            id,
            centroid,
            disappeared_frames: 0,
            history,
        }
    }

    /// Adopt a matched centroid and reset the disappearance counter.
    pub fn update(&mut self, centroid: Centroid) {
        self.centroid = centroid;
        self.disappeared_frames = 0;
        self.history.push_back(centroid);
        if self.history.len() > HISTORY_LEN {
            self.history.pop_front();
        }
    }

    /// Record a frame without association. Returns the new counter value.
    pub fn mark_missed(&mut self) -> u32 {
        self.disappeared_frames += 1;
        self.disappeared_frames
    }

    /// Past centroids, oldest first.
    pub fn history(&self) -> impl Iterator<Item = &Centroid> {
        self.history.iter()
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }
}
