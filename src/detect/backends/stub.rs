use anyhow::Result;

use crate::detect::backend::DetectorBackend;
use crate::detect::result::{Detection, DetectionResult};

/// Scripted backend for tests and `stub://` runs.
///
/// Plays back a fixed per-frame script of detections, repeating the last
/// entry once the script is exhausted. An empty script never detects.
pub struct StubBackend {
    script: Vec<Vec<Detection>>,
    cursor: usize,
}

impl StubBackend {
    pub fn new() -> Self {
        Self {
            script: Vec::new(),
            cursor: 0,
        }
    }

    /// One script entry per frame, in playback order.
    pub fn scripted(script: Vec<Vec<Detection>>) -> Self {
        Self { script, cursor: 0 }
    }

    /// The same detections on every frame.
    pub fn constant(detections: Vec<Detection>) -> Self {
        Self::scripted(vec![detections])
    }
}

impl Default for StubBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl DetectorBackend for StubBackend {
    fn name(&self) -> &'static str {
        "stub"
    }

    fn detect(&mut self, _pixels: &[u8], _width: u32, _height: u32) -> Result<DetectionResult> {
        let detections = match self.script.get(self.cursor) {
            Some(entry) => entry.clone(),
            None => self.script.last().cloned().unwrap_or_default(),
        };
        if self.cursor < self.script.len() {
            self.cursor += 1;
        }
        Ok(DetectionResult { detections })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_script_never_detects() {
        let mut backend = StubBackend::new();
        for _ in 0..3 {
            let result = backend.detect(&[], 0, 0).expect("detect");
            assert!(result.detections.is_empty());
        }
    }

    #[test]
    fn script_repeats_final_entry() {
        let mut backend = StubBackend::scripted(vec![
            vec![],
            vec![Detection::new(0, "Debris", 0.9)],
        ]);
        assert!(backend.detect(&[], 0, 0).unwrap().detections.is_empty());
        assert_eq!(backend.detect(&[], 0, 0).unwrap().detections.len(), 1);
        // Exhausted: keeps returning the last entry.
        assert_eq!(backend.detect(&[], 0, 0).unwrap().detections.len(), 1);
    }
}
