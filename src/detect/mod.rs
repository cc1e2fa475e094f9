//! Detector backends.
//!
//! The detection model is an external collaborator: backends load a
//! checkpoint once and return per-frame detections. Nothing in this crate
//! reimplements inference; the stub backend exists for tests and synthetic
//! runs, the tract backend (feature `backend-tract`) wraps an ONNX model.

mod backend;
mod backends;
mod result;

pub use backend::DetectorBackend;
pub use backends::StubBackend;
#[cfg(feature = "backend-tract")]
pub use backends::TractBackend;
pub use result::{BoundingBox, Detection, DetectionResult};

use anyhow::{anyhow, Result};

use crate::config::DetectorSettings;

/// Build the detector backend named by the configuration.
pub fn build_backend(settings: &DetectorSettings) -> Result<Box<dyn DetectorBackend>> {
    match settings.backend.as_str() {
        "stub" => Ok(Box::new(StubBackend::new())),
        #[cfg(feature = "backend-tract")]
        "tract" => {
            let backend = TractBackend::new(
                &settings.model_path,
                settings.input_width,
                settings.input_height,
                settings.class_names.clone(),
            )?
            .with_threshold(settings.confidence_threshold);
            Ok(Box::new(backend))
        }
        #[cfg(not(feature = "backend-tract"))]
        "tract" => Err(anyhow!(
            "backend 'tract' requires the backend-tract feature"
        )),
        other => Err(anyhow!("unknown detector backend '{}'", other)),
    }
}
