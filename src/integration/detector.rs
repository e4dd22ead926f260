//! Detection type and trait for object detection inference backends.

use serde::{Deserialize, Serialize};

use crate::tracker::Rect;

/// Detection input for the counter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    /// Top-left x in pixels
    pub x: f32,
    /// Top-left y in pixels
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Category name reported by the detector
    pub label: String,
    /// Detection confidence score
    #[serde(default)]
    pub score: f32,
}

impl Detection {
    pub fn new(
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        label: impl Into<String>,
        score: f32,
    ) -> Self {
        Self {
            x,
            y,
            width,
            height,
            label: label.into(),
            score,
        }
    }

    /// Shorthand for a "person" detection with full confidence.
    pub fn person(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self::new(x, y, width, height, "person", 1.0)
    }

    /// Truncate to whole pixels and clamp into the frame.
    pub fn to_rect(&self, frame_width: u32, frame_height: u32) -> Rect {
        Rect::clamped_from_tlwh(
            self.x as i32,
            self.y as i32,
            self.width as i32,
            self.height as i32,
            frame_width,
            frame_height,
        )
    }
}

/// Trait for object detection inference backends.
///
/// Implement this trait to connect any detection model to the counter.
/// Score thresholding and result capping belong to the implementation.
///
/// # Example
///
/// ```ignore
/// use dwellcount_rs::{Detection, DetectionSource};
///
/// struct MyDetector {
///     // Your model here
/// }
///
/// impl DetectionSource for MyDetector {
///     type Error = std::io::Error;
///
///     fn detect(&mut self, input: &[u8], width: u32, height: u32) -> Result<Vec<Detection>, Self::Error> {
///         // Run inference and return detections
///         Ok(vec![])
///     }
/// }
/// ```
pub trait DetectionSource {
    /// Error type for detection failures.
    type Error;

    /// Run inference on raw image data and return detections.
    ///
    /// # Arguments
    /// * `input` - Raw image bytes (format depends on implementation)
    /// * `width` - Image width in pixels
    /// * `height` - Image height in pixels
    fn detect(
        &mut self,
        input: &[u8],
        width: u32,
        height: u32,
    ) -> Result<Vec<Detection>, Self::Error>;
}
