//! Debris Sentinel
//!
//! This crate evaluates and operationalizes a pretrained debris/garbage
//! object-detection model over images and video:
//!
//! 1. Ingests frames from a video file (or a synthetic stub source)
//! 2. Runs a detector backend per frame (opaque model behind a trait)
//! 3. Reduces detections to a per-frame decision (target present / absent)
//! 4. Debounces sustained detections into alert episodes
//! 5. Persists episode records and sends alert/reminder/clearance
//!    notifications with an annotated snapshot
//! 6. Compares predictions against sparse ground-truth label files offline
//!    (ROC/AUC and confusion-matrix evaluators)
//!
//! # Module Structure
//!
//! - `detect`: detector backends (stub, tract-onnx) and detection types
//! - `policy`: per-frame decision reduction
//! - `debounce`: the alert episode state machine
//! - `records`: persisted alert episode records
//! - `notify`: notification formatting and transports
//! - `ingest`: frame sources (video files, still images)
//! - `metrics`: ROC/AUC and confusion-matrix evaluation
//! - `pipeline`: the frame-to-notification orchestration

use anyhow::{anyhow, Result};
use std::sync::OnceLock;
use std::time::{SystemTime, UNIX_EPOCH};

pub mod config;
pub mod debounce;
pub mod detect;
pub mod frame;
pub mod ingest;
pub mod labels;
pub mod metrics;
pub mod notify;
pub mod pipeline;
pub mod policy;
pub mod records;
pub mod snapshot;
pub mod ui;

pub use config::{CameraSettings, DetectorSettings, SentinelConfig};
pub use debounce::{AlertAction, AlertMachine, EpisodeState};
pub use detect::{build_backend, Detection, DetectionResult, DetectorBackend, StubBackend};
pub use frame::Frame;
pub use ingest::{FileConfig, FileSource};
pub use notify::{AlertMessage, LogNotifier, MemoryNotifier, Notifier, WebhookNotifier};
pub use pipeline::{FrameReport, SentinelPipeline};
pub use policy::{DecisionPolicy, NO_DETECTION};
pub use records::{AlertRecord, AlertStatus, AlertStore, InMemoryStore, JsonFileStore};

/// Current wall-clock time in whole seconds since the epoch.
pub fn now_s() -> Result<u64> {
    Ok(SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs())
}

/// Validate a camera identifier.
///
/// Camera ids end up in record keys, notification bodies and file names, so
/// we enforce a positive allowlist pattern rather than escaping downstream.
///
/// Allowed: "camera-1", "lot_a", "dock2"
/// Disallowed: anything with whitespace, slashes, or punctuation outside [_-].
pub fn validate_camera_id(camera_id: &str) -> Result<()> {
    // Compile once for hot paths.
    static CAMERA_ID_RE: OnceLock<regex::Regex> = OnceLock::new();
    let re = CAMERA_ID_RE
        .get_or_init(|| regex::Regex::new(r"^[a-z0-9][a-z0-9_-]{0,63}$").unwrap());

    let id = camera_id.to_lowercase();
    if !re.is_match(&id) {
        return Err(anyhow!(
            "camera_id must match ^[a-z0-9][a-z0-9_-]{{0,63}}$"
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_simple_camera_ids() {
        assert!(validate_camera_id("camera-1").is_ok());
        assert!(validate_camera_id("lot_a").is_ok());
        assert!(validate_camera_id("Camera-1").is_ok()); // lowercased before matching
    }

    #[test]
    fn rejects_camera_ids_with_separators() {
        assert!(validate_camera_id("camera 1").is_err());
        assert!(validate_camera_id("cam/1").is_err());
        assert!(validate_camera_id("").is_err());
        assert!(validate_camera_id(&"a".repeat(65)).is_err());
    }
}
