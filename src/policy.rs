//! Per-frame decision policy.
//!
//! Reduces one frame's detection list to the three decisions the rest of
//! the system consumes: "is a target class present", "which single class
//! best describes the frame", and "how confident is the frame overall".

use crate::detect::Detection;

/// Sentinel class id meaning "no qualifying detection in this frame".
///
/// Used on the prediction side only; ground truth never carries it.
pub const NO_DETECTION: i64 = -1;

/// A detection qualifies when its class is in the target set and its
/// confidence meets the threshold.
#[derive(Clone, Debug)]
pub struct DecisionPolicy {
    target_classes: Vec<String>,
    confidence_threshold: f32,
}

impl DecisionPolicy {
    pub fn new(target_classes: Vec<String>, confidence_threshold: f32) -> Self {
        Self {
            target_classes,
            confidence_threshold,
        }
    }

    pub fn is_qualifying(&self, detection: &Detection) -> bool {
        detection.confidence >= self.confidence_threshold
            && self
                .target_classes
                .iter()
                .any(|target| target == &detection.class_name)
    }

    /// Any qualifying detection present?
    ///
    /// An empty list and a list where nothing meets the threshold are
    /// indistinguishable: both are false.
    pub fn target_present(&self, detections: &[Detection]) -> bool {
        detections.iter().any(|det| self.is_qualifying(det))
    }

    /// Class id of the strictly highest-confidence qualifying detection.
    ///
    /// Ties resolve to the first detection in input order. No qualifying
    /// detection yields [`NO_DETECTION`].
    pub fn top_class(&self, detections: &[Detection]) -> i64 {
        let mut best: Option<&Detection> = None;
        for det in detections {
            if !self.is_qualifying(det) {
                continue;
            }
            match best {
                Some(current) if det.confidence <= current.confidence => {}
                _ => best = Some(det),
            }
        }
        best.map(|det| det.class_id).unwrap_or(NO_DETECTION)
    }
}

/// Frame-wide maximum confidence across ALL detections, 0.0 when empty.
///
/// This is the ROC score: it deliberately ignores the target-class filter.
pub fn max_score(detections: &[Detection]) -> f64 {
    detections
        .iter()
        .map(|det| det.confidence as f64)
        .fold(0.0, f64::max)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> DecisionPolicy {
        DecisionPolicy::new(
            vec!["Debris".to_string(), "Garbage".to_string()],
            0.5,
        )
    }

    #[test]
    fn empty_and_below_threshold_are_equivalent() {
        let p = policy();
        assert!(!p.target_present(&[]));
        assert!(!p.target_present(&[
            Detection::new(0, "Debris", 0.49),
            Detection::new(1, "Garbage", 0.2),
        ]));
        assert_eq!(p.top_class(&[]), NO_DETECTION);
        assert_eq!(
            p.top_class(&[Detection::new(0, "Debris", 0.49)]),
            NO_DETECTION
        );
    }

    #[test]
    fn non_target_classes_never_qualify() {
        let p = policy();
        assert!(!p.target_present(&[Detection::new(7, "Person", 0.99)]));
    }

    #[test]
    fn top_class_is_strictly_highest_confidence() {
        let p = policy();
        let dets = vec![
            Detection::new(0, "Debris", 0.6),
            Detection::new(1, "Garbage", 0.9),
            Detection::new(0, "Debris", 0.7),
        ];
        assert!(p.target_present(&dets));
        assert_eq!(p.top_class(&dets), 1);
    }

    #[test]
    fn ties_resolve_to_first_in_input_order() {
        let p = policy();
        let dets = vec![
            Detection::new(1, "Garbage", 0.8),
            Detection::new(0, "Debris", 0.8),
        ];
        assert_eq!(p.top_class(&dets), 1);
    }

    #[test]
    fn max_score_ignores_the_target_filter() {
        let dets = vec![
            Detection::new(7, "Person", 0.95),
            Detection::new(0, "Debris", 0.4),
        ];
        assert!((max_score(&dets) - 0.95).abs() < 1e-6);
        assert_eq!(max_score(&[]), 0.0);
    }
}
