#![cfg(feature = "backend-tract")]

use std::path::Path;

use anyhow::{anyhow, Context, Result};
use tract_onnx::prelude::*;

use crate::detect::backend::DetectorBackend;
use crate::detect::result::{BoundingBox, Detection, DetectionResult};

const DEFAULT_IOU_THRESHOLD: f32 = 0.45;

/// Tract-based backend for ONNX inference.
///
/// Loads a local YOLO-style checkpoint and decodes its output rows
/// `[cx, cy, w, h, class scores...]` into detections. Inference runs
/// entirely in-process; no network I/O.
pub struct TractBackend {
    model: TypedRunnableModel<TypedModel>,
    width: u32,
    height: u32,
    class_names: Vec<String>,
    confidence_threshold: f32,
    iou_threshold: f32,
}

impl TractBackend {
    /// Load an ONNX model from disk and prepare it for inference.
    pub fn new<P: AsRef<Path>>(
        model_path: P,
        width: u32,
        height: u32,
        class_names: Vec<String>,
    ) -> Result<Self> {
        let model_path = model_path.as_ref();
        let model = tract_onnx::onnx()
            .model_for_path(model_path)
            .with_context(|| format!("failed to load ONNX model from {}", model_path.display()))?
            .with_input_fact(
                0,
                InferenceFact::dt_shape(
                    f32::datum_type(),
                    tvec!(1, 3, height as usize, width as usize),
                ),
            )
            .context("failed to set input fact")?
            .into_optimized()
            .context("failed to optimize ONNX model")?
            .into_runnable()
            .context("failed to build runnable ONNX model")?;

        Ok(Self {
            model,
            width,
            height,
            class_names,
            confidence_threshold: 0.5,
            iou_threshold: DEFAULT_IOU_THRESHOLD,
        })
    }

    /// Override the default confidence threshold.
    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.confidence_threshold = threshold;
        self
    }

    /// Override the default NMS IoU threshold.
    pub fn with_iou_threshold(mut self, threshold: f32) -> Self {
        self.iou_threshold = threshold;
        self
    }

    fn build_input(&self, pixels: &[u8], width: u32, height: u32) -> Result<Tensor> {
        if width != self.width || height != self.height {
            return Err(anyhow!(
                "frame size {}x{} does not match model input {}x{}",
                width,
                height,
                self.width,
                self.height
            ));
        }

        let expected_len = (width as usize)
            .checked_mul(height as usize)
            .and_then(|v| v.checked_mul(3))
            .ok_or_else(|| anyhow!("frame dimensions overflow"))?;

        if pixels.len() != expected_len {
            return Err(anyhow!(
                "expected {} RGB bytes, received {}",
                expected_len,
                pixels.len()
            ));
        }

        let width = width as usize;
        let input = tract_ndarray::Array4::from_shape_fn(
            (1, 3, height as usize, width),
            |(_, channel, y, x)| {
                let idx = (y * width + x) * 3 + channel;
                pixels[idx] as f32 / 255.0
            },
        );

        Ok(input.into_tensor())
    }

    /// Decode `[1, 4 + num_classes, num_rows]` YOLO output into detections.
    fn decode(&self, outputs: TVec<TValue>) -> Result<Vec<Detection>> {
        let output = outputs
            .first()
            .ok_or_else(|| anyhow!("model produced no outputs"))?;
        let view = output
            .to_array_view::<f32>()
            .context("model output tensor was not f32")?;
        let shape = view.shape();
        if shape.len() != 3 || shape[0] != 1 {
            return Err(anyhow!(
                "unexpected model output shape {:?}, expected [1, attrs, rows]",
                shape
            ));
        }
        let attrs = shape[1];
        let rows = shape[2];
        if attrs < 5 {
            return Err(anyhow!(
                "model output has {} attributes per row, expected at least 5",
                attrs
            ));
        }
        let num_classes = attrs - 4;

        let mut detections = Vec::new();
        for row in 0..rows {
            let mut best_class = 0usize;
            let mut best_score = 0.0f32;
            for class_idx in 0..num_classes {
                let score = view[[0, 4 + class_idx, row]];
                if score > best_score {
                    best_score = score;
                    best_class = class_idx;
                }
            }
            if best_score < self.confidence_threshold {
                continue;
            }

            let cx = view[[0, 0, row]] / self.width as f32;
            let cy = view[[0, 1, row]] / self.height as f32;
            let w = view[[0, 2, row]] / self.width as f32;
            let h = view[[0, 3, row]] / self.height as f32;
            let bbox = BoundingBox::new(
                (cx - w / 2.0).clamp(0.0, 1.0),
                (cy - h / 2.0).clamp(0.0, 1.0),
                (cx + w / 2.0).clamp(0.0, 1.0),
                (cy + h / 2.0).clamp(0.0, 1.0),
            );

            let class_name = self
                .class_names
                .get(best_class)
                .map(String::as_str)
                .unwrap_or("unknown");
            detections.push(
                Detection::new(best_class as i64, class_name, best_score).with_bbox(bbox),
            );
        }

        let mut detections = nms(detections, self.iou_threshold);
        detections.sort_by(|a, b| {
            b.confidence
                .partial_cmp(&a.confidence)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        Ok(detections)
    }
}

impl DetectorBackend for TractBackend {
    fn name(&self) -> &'static str {
        "tract"
    }

    fn detect(&mut self, pixels: &[u8], width: u32, height: u32) -> Result<DetectionResult> {
        let input = self.build_input(pixels, width, height)?;
        let outputs = self
            .model
            .run(tvec!(input.into()))
            .context("ONNX inference failed")?;
        let detections = self.decode(outputs)?;
        Ok(DetectionResult { detections })
    }
}

/// Greedy per-class non-maximum suppression.
fn nms(detections: Vec<Detection>, iou_threshold: f32) -> Vec<Detection> {
    if detections.is_empty() {
        return detections;
    }

    use std::collections::HashMap;
    let mut class_groups: HashMap<i64, Vec<Detection>> = HashMap::new();
    for detection in detections {
        class_groups
            .entry(detection.class_id)
            .or_default()
            .push(detection);
    }

    let mut kept = Vec::new();
    for (_, mut group) in class_groups {
        group.sort_by(|a, b| {
            b.confidence
                .partial_cmp(&a.confidence)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        let mut suppressed = vec![false; group.len()];
        for i in 0..group.len() {
            if suppressed[i] {
                continue;
            }
            for j in (i + 1)..group.len() {
                if suppressed[j] {
                    continue;
                }
                let overlap = match (&group[i].bbox, &group[j].bbox) {
                    (Some(a), Some(b)) => a.iou(b),
                    _ => 0.0,
                };
                if overlap > iou_threshold {
                    suppressed[j] = true;
                }
            }
            kept.push(group[i].clone());
        }
    }
    kept
}
