/// Axis-aligned pixel box stored as corners (TLBR).
///
/// Supports two input formats:
/// - TLWH: Top-Left X, Top-Left Y, Width, Height (what detectors report)
/// - TLBR: Top-Left X, Top-Left Y, Bottom-Right X, Bottom-Right Y
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct Rect {
    /// Top-left x coordinate
    pub x0: i32,
    /// Top-left y coordinate
    pub y0: i32,
    /// Bottom-right x coordinate
    pub x1: i32,
    /// Bottom-right y coordinate
    pub y1: i32,
}

impl Rect {
    /// Create a new Rect from TLBR corners.
    #[inline]
    pub fn new(x0: i32, y0: i32, x1: i32, y1: i32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// Create a Rect from TLWH format (origin x, origin y, width, height).
    #[inline]
    pub fn from_tlwh(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x0: x,
            y0: y,
            x1: x + width,
            y1: y + height,
        }
    }

    /// Clamp a TLWH box into a `frame_width` x `frame_height` frame.
    ///
    /// The origin is clamped to zero first; the far corner is then measured
    /// from the clamped origin and clamped to the frame size.
    pub fn clamped_from_tlwh(
        x: i32,
        y: i32,
        width: i32,
        height: i32,
        frame_width: u32,
        frame_height: u32,
    ) -> Self {
        let fw = i32::try_from(frame_width).unwrap_or(i32::MAX);
        let fh = i32::try_from(frame_height).unwrap_or(i32::MAX);
        let x0 = x.max(0);
        let y0 = y.max(0);
        Self {
            x0,
            y0,
            x1: x0.saturating_add(width).min(fw),
            y1: y0.saturating_add(height).min(fh),
        }
    }

    #[inline]
    pub fn width(&self) -> i64 {
        i64::from(self.x1) - i64::from(self.x0)
    }

    #[inline]
    pub fn height(&self) -> i64 {
        i64::from(self.y1) - i64::from(self.y0)
    }

    /// True when the box encloses no pixels.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.x1 <= self.x0 || self.y1 <= self.y0
    }

    /// Integer center of the box, rounding toward zero.
    ///
    /// Corners are summed in `i64`, so any pair of `i32` corners is valid.
    #[inline]
    pub fn center(&self) -> Centroid {
        let mid = |a: i32, b: i32| ((i64::from(a) + i64::from(b)) / 2) as i32;
        Centroid::new(mid(self.x0, self.x1), mid(self.y0, self.y1))
    }

    /// Area in pixels; zero for empty boxes.
    #[inline]
    pub fn area(&self) -> u64 {
        if self.is_empty() {
            0
        } else {
            self.width() as u64 * self.height() as u64
        }
    }
}

/// Integer pixel position of a tracked object.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, serde::Serialize)]
pub struct Centroid {
    pub x: i32,
    pub y: i32,
}

impl Centroid {
    #[inline]
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn to_point(self) -> nalgebra::Point2<f64> {
        nalgebra::Point2::new(self.x as f64, self.y as f64)
    }

    /// Euclidean distance to another centroid.
    #[inline]
    pub fn distance(&self, other: &Centroid) -> f64 {
        nalgebra::distance(&self.to_point(), &other.to_point())
    }
}
