use anyhow::Result;

use crate::detect::result::DetectionResult;

/// Detector backend trait.
///
/// Backends load their checkpoint once at construction and are then driven
/// one frame at a time. Implementations must treat the pixel slice as
/// read-only RGB24 and must not retain it beyond the `detect` call.
pub trait DetectorBackend: Send {
    /// Backend identifier.
    fn name(&self) -> &'static str;

    /// Run detection on a frame.
    fn detect(&mut self, pixels: &[u8], width: u32, height: u32) -> Result<DetectionResult>;

    /// Optional warm-up hook.
    fn warm_up(&mut self) -> Result<()> {
        Ok(())
    }
}
