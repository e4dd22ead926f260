//! Builder for creating Detection objects from various input formats.

use crate::integration::Detection;

/// Builder for creating `Detection` objects from various input formats.
#[derive(Debug, Clone)]
pub struct DetectionBuilder {
    x: f32,
    y: f32,
    width: f32,
    height: f32,
    label: String,
    score: f32,
}

impl Default for DetectionBuilder {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: 0.0,
            height: 0.0,
            label: "person".to_string(),
            score: 1.0,
        }
    }
}

impl DetectionBuilder {
    /// Create a new detection builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set bounding box in TLWH format (origin x, origin y, width, height).
    pub fn tlwh(mut self, x: f32, y: f32, w: f32, h: f32) -> Self {
        self.x = x;
        self.y = y;
        self.width = w;
        self.height = h;
        self
    }

    /// Set bounding box in TLBR format (x1, y1, x2, y2).
    pub fn tlbr(self, x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        self.tlwh(x1, y1, x2 - x1, y2 - y1)
    }

    /// Set bounding box in XYWH format (center_x, center_y, width, height).
    pub fn xywh(self, cx: f32, cy: f32, w: f32, h: f32) -> Self {
        self.tlwh(cx - w / 2.0, cy - h / 2.0, w, h)
    }

    /// Set the category label.
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Set the confidence score.
    pub fn score(mut self, score: f32) -> Self {
        self.score = score;
        self
    }

    /// Build the final `Detection`.
    pub fn build(self) -> Detection {
        Detection::new(self.x, self.y, self.width, self.height, self.label, self.score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detection_builder() {
        let det = DetectionBuilder::new()
            .tlbr(10.0, 20.0, 50.0, 80.0)
            .score(0.95)
            .build();

        assert_eq!(det.score, 0.95);
        assert_eq!(det.label, "person");
        assert_eq!((det.x, det.y, det.width, det.height), (10.0, 20.0, 40.0, 60.0));
    }

    #[test]
    fn test_xywh_and_label() {
        let det = DetectionBuilder::new().xywh(50.0, 50.0, 20.0, 40.0).label("chair").build();
        assert_eq!((det.x, det.y), (40.0, 30.0));
        assert_eq!(det.label, "chair");
    }
}
