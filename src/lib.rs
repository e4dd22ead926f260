//! Proximity-zone visitor counting.
//!
//! Per-frame person detections are associated into persistent identities by
//! a [`CentroidTracker`]; a [`DwellCounter`] then credits each identity once
//! it has stayed close to the camera (box area ratio above a threshold) for
//! an uninterrupted minimum duration.

pub mod config;
pub mod counter;
pub mod dwell;
pub mod error;
pub mod integration;
pub mod tracker;

pub use config::CounterConfig;
pub use counter::{FrameReport, VisitorCounter};
pub use dwell::{DwellConfig, DwellCounter, DwellPhase, DwellState, IdentityStatus, VisitorStats};
pub use error::ConfigError;
pub use integration::{
    Clock, Detection, DetectionBuilder, DetectionSource, Frame, FrameSource, LatestFrame,
    ManualClock, SystemClock, VisitorPipeline,
};
pub use tracker::{
    AssociationKind, Centroid, CentroidTracker, Identity, IdentityId, Rect, TrackerConfig,
};
