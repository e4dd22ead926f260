//! Frame source contract and a single-slot latest-frame holder.

use std::sync::{Arc, Mutex, PoisonError};

/// A decoded frame as handed to the detector.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    /// Raw pixel bytes; layout is whatever the detector expects.
    pub data: Vec<u8>,
}

impl Frame {
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Self {
        Self {
            width,
            height,
            data,
        }
    }
}

/// Supplier of the most recent frame.
///
/// Implementations own their acquisition cadence and reconnection and must
/// not block the processing loop indefinitely.
pub trait FrameSource {
    /// The newest frame not yet handed out, or `None` if there is none.
    fn latest_frame(&mut self) -> Option<Frame>;
}

/// Shared slot written by a capture thread and drained by the processing loop.
///
/// Publishing overwrites any frame that was not consumed yet, so the consumer
/// always sees the newest frame and stale ones are dropped.
#[derive(Debug, Clone, Default)]
pub struct LatestFrame {
    slot: Arc<Mutex<Option<Frame>>>,
}

impl LatestFrame {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the pending frame.
    pub fn publish(&self, frame: Frame) {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        *slot = Some(frame);
    }

    pub fn is_empty(&self) -> bool {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
    }
}

impl FrameSource for LatestFrame {
    fn latest_frame(&mut self) -> Option<Frame> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner).take()
    }
}
