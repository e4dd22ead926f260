//! Integration module for connecting detection backends and frame sources
//! with the visitor counter.
//!
//! This module provides the traits at the boundary of the counting core:
//! where detections come from, where frames come from and where time comes
//! from, plus the pipeline that ties them together.

mod builder;
mod clock;
mod detector;
mod frame;
mod pipeline;

pub use builder::DetectionBuilder;
pub use clock::{Clock, ManualClock, SystemClock};
pub use detector::{Detection, DetectionSource};
pub use frame::{Frame, FrameSource, LatestFrame};
pub use pipeline::VisitorPipeline;
