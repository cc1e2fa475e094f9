/// Result of running detection on a single frame.
#[derive(Clone, Debug, Default)]
pub struct DetectionResult {
    /// Detections above the backend's own confidence cutoff.
    pub detections: Vec<Detection>,
}

impl DetectionResult {
    /// Maximum confidence across all detections, 0.0 for an empty frame.
    pub fn max_confidence(&self) -> f32 {
        self.detections
            .iter()
            .map(|det| det.confidence)
            .fold(0.0, f32::max)
    }
}

/// One detected object.
#[derive(Clone, Debug, PartialEq)]
pub struct Detection {
    /// Class index in model output order.
    pub class_id: i64,
    pub class_name: String,
    /// Confidence in [0, 1]; not validated.
    pub confidence: f32,
    /// Bounding box (normalized 0..1 coordinates), when the backend has one.
    pub bbox: Option<BoundingBox>,
}

impl Detection {
    pub fn new(class_id: i64, class_name: &str, confidence: f32) -> Self {
        Self {
            class_id,
            class_name: class_name.to_string(),
            confidence,
            bbox: None,
        }
    }

    pub fn with_bbox(mut self, bbox: BoundingBox) -> Self {
        self.bbox = Some(bbox);
        self
    }
}

/// Axis-aligned box in normalized 0..1 image coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingBox {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

impl BoundingBox {
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    pub fn area(&self) -> f32 {
        (self.x1 - self.x0).max(0.0) * (self.y1 - self.y0).max(0.0)
    }

    /// Intersection over union with another box.
    pub fn iou(&self, other: &BoundingBox) -> f32 {
        let ix0 = self.x0.max(other.x0);
        let iy0 = self.y0.max(other.y0);
        let ix1 = self.x1.min(other.x1);
        let iy1 = self.y1.min(other.y1);

        let intersection = (ix1 - ix0).max(0.0) * (iy1 - iy0).max(0.0);
        let union = self.area() + other.area() - intersection;
        if union <= 0.0 {
            return 0.0;
        }
        intersection / union
    }
}
