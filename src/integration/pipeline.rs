//! VisitorPipeline for combining detection with tracking and dwell counting.

use crate::config::CounterConfig;
use crate::counter::{FrameReport, VisitorCounter};
use crate::dwell::VisitorStats;

use super::{Clock, DetectionSource, FrameSource, SystemClock};

/// Bundles a detector, a clock and one camera's counting state.
///
/// Every call takes `&mut self`, so exactly one frame is in flight per
/// pipeline. Run one pipeline per camera.
pub struct VisitorPipeline<D: DetectionSource, C: Clock = SystemClock> {
    detector: D,
    clock: C,
    counter: VisitorCounter,
}

impl<D: DetectionSource> VisitorPipeline<D, SystemClock> {
    /// Create a new pipeline on the system clock with default configuration.
    pub fn with_default_config(detector: D) -> Self {
        Self::new(detector, SystemClock, CounterConfig::default())
    }
}

impl<D: DetectionSource, C: Clock> VisitorPipeline<D, C> {
    pub fn new(detector: D, clock: C, config: CounterConfig) -> Self {
        Self {
            detector,
            clock,
            counter: VisitorCounter::new(config),
        }
    }

    /// Process a single frame.
    ///
    /// Runs detection on the input image, stamps the frame with the clock and
    /// feeds the result through tracking and dwell counting.
    ///
    /// # Arguments
    /// * `input` - Raw image bytes
    /// * `width` - Image width in pixels
    /// * `height` - Image height in pixels
    pub fn process_frame(
        &mut self,
        input: &[u8],
        width: u32,
        height: u32,
    ) -> Result<FrameReport, D::Error> {
        let detections = self.detector.detect(input, width, height)?;
        let now = self.clock.now();
        Ok(self.counter.observe(&detections, width, height, now))
    }

    /// Pull the latest frame from `source` and process it.
    ///
    /// Returns `Ok(None)` when no frame is available yet.
    pub fn poll<F: FrameSource>(
        &mut self,
        source: &mut F,
    ) -> Result<Option<FrameReport>, D::Error> {
        match source.latest_frame() {
            Some(frame) => self
                .process_frame(&frame.data, frame.width, frame.height)
                .map(Some),
            None => Ok(None),
        }
    }

    pub fn stats(&self) -> VisitorStats {
        self.counter.stats()
    }

    /// Get a reference to the underlying detector.
    pub fn detector(&self) -> &D {
        &self.detector
    }

    /// Get a mutable reference to the underlying detector.
    pub fn detector_mut(&mut self) -> &mut D {
        &mut self.detector
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn counter(&self) -> &VisitorCounter {
        &self.counter
    }
}
