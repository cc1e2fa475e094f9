//! Alert notifications.
//!
//! One failure contract everywhere: every transport returns `Result`, and
//! the pipeline logs and absorbs errors — a broken mail hop never takes
//! down a detection episode. No retries.

use anyhow::{anyhow, Context, Result};
use base64::{engine::general_purpose::STANDARD as B64, Engine as _};
use chrono::DateTime;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::config::{CameraSettings, NotifySettings};

const WEBHOOK_TIMEOUT: Duration = Duration::from_secs(10);

/// A fully formatted notification, ready for any transport.
#[derive(Clone, Debug, PartialEq)]
pub struct AlertMessage {
    pub subject: String,
    pub body: String,
    pub attachment: Option<PathBuf>,
}

pub trait Notifier: Send + Sync {
    /// Transport identifier.
    fn name(&self) -> &'static str;

    /// Deliver a message. Errors are reported, never retried.
    fn send(&self, message: &AlertMessage) -> Result<()>;
}

impl<N: Notifier + ?Sized> Notifier for Arc<N> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn send(&self, message: &AlertMessage) -> Result<()> {
        (**self).send(message)
    }
}

/// Build the transport named by the configuration.
pub fn build_notifier(settings: &NotifySettings) -> Result<Box<dyn Notifier>> {
    match settings.transport.as_str() {
        "log" => Ok(Box::new(LogNotifier)),
        "webhook" => {
            let endpoint = settings
                .endpoint
                .clone()
                .ok_or_else(|| anyhow!("webhook transport requires an endpoint"))?;
            Ok(Box::new(WebhookNotifier::new(
                endpoint,
                settings.recipients.clone(),
            )))
        }
        other => Err(anyhow!("unknown notify transport '{}'", other)),
    }
}

/// Logs messages instead of delivering them.
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn name(&self) -> &'static str {
        "log"
    }

    fn send(&self, message: &AlertMessage) -> Result<()> {
        log::info!("notification: {}", message.subject);
        for line in message.body.lines() {
            log::info!("  {}", line);
        }
        if let Some(attachment) = &message.attachment {
            log::info!("  attachment: {}", attachment.display());
        }
        Ok(())
    }
}

/// Captures messages for test assertions.
#[derive(Default)]
pub struct MemoryNotifier {
    sent: Mutex<Vec<AlertMessage>>,
}

impl MemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<AlertMessage> {
        self.sent.lock().expect("notifier lock").clone()
    }
}

impl Notifier for MemoryNotifier {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn send(&self, message: &AlertMessage) -> Result<()> {
        self.sent.lock().expect("notifier lock").push(message.clone());
        Ok(())
    }
}

#[derive(Serialize)]
struct WebhookPayload<'a> {
    recipients: &'a [String],
    subject: &'a str,
    body: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    attachment: Option<WebhookAttachment>,
}

#[derive(Serialize)]
struct WebhookAttachment {
    filename: String,
    /// base64 of the attachment bytes.
    content: String,
}

/// Posts messages as JSON to a relay endpoint that owns the actual mail
/// transport.
pub struct WebhookNotifier {
    endpoint: String,
    recipients: Vec<String>,
    timeout: Duration,
}

impl WebhookNotifier {
    pub fn new(endpoint: String, recipients: Vec<String>) -> Self {
        Self {
            endpoint,
            recipients,
            timeout: WEBHOOK_TIMEOUT,
        }
    }

    fn build_payload(&self, message: &AlertMessage) -> Result<String> {
        let attachment = match &message.attachment {
            Some(path) => {
                let bytes = std::fs::read(path)
                    .with_context(|| format!("failed to read attachment {}", path.display()))?;
                let filename = path
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "attachment".to_string());
                Some(WebhookAttachment {
                    filename,
                    content: B64.encode(bytes),
                })
            }
            None => None,
        };
        let payload = WebhookPayload {
            recipients: &self.recipients,
            subject: &message.subject,
            body: &message.body,
            attachment,
        };
        serde_json::to_string(&payload).context("serialize notification payload")
    }
}

impl Notifier for WebhookNotifier {
    fn name(&self) -> &'static str {
        "webhook"
    }

    fn send(&self, message: &AlertMessage) -> Result<()> {
        let payload = self.build_payload(message)?;
        ureq::post(&self.endpoint)
            .timeout(self.timeout)
            .set("Content-Type", "application/json")
            .send_string(&payload)
            .map_err(|e| anyhow!("notification endpoint rejected message: {}", e))?;
        Ok(())
    }
}

// ----------------------------------------------------------------------------
// Message formatting
// ----------------------------------------------------------------------------

/// Camera description block appended to every notification body.
///
/// Includes a maps link when the install site has a GPS position.
pub fn location_block(camera: &CameraSettings) -> String {
    match &camera.gps {
        Some(gps) => format!(
            "Camera: {} ({})\nLocation: {}, {}\nMap: https://www.google.com/maps/search/?api=1&query={},{}",
            camera.id, camera.name, gps.lat, gps.lon, gps.lat, gps.lon
        ),
        None => format!(
            "Camera: {} ({})\nNo GPS. Static camera position.",
            camera.id, camera.name
        ),
    }
}

pub fn alert_message(
    camera: &CameraSettings,
    sustained_for: Duration,
    snapshot: &Path,
) -> AlertMessage {
    AlertMessage {
        subject: format!("Debris detected at {}", camera.id),
        body: format!(
            "Debris has been detected for {} seconds.\n\n{}",
            sustained_for.as_secs(),
            location_block(camera)
        ),
        attachment: Some(snapshot.to_path_buf()),
    }
}

pub fn reminder_message(
    camera: &CameraSettings,
    detected_at: u64,
    snapshot: &Path,
) -> AlertMessage {
    AlertMessage {
        subject: format!("Reminder: debris still not cleared at {}", camera.id),
        body: format!(
            "Debris detected at {} is still pending cleanup.\n\n{}",
            format_timestamp(detected_at),
            location_block(camera)
        ),
        attachment: Some(snapshot.to_path_buf()),
    }
}

pub fn clearance_message(camera: &CameraSettings, detected_at: u64) -> AlertMessage {
    AlertMessage {
        subject: format!("Cleared: debris removed at {}", camera.id),
        body: format!(
            "The debris detected at {} has now been cleared.\n\n{}",
            format_timestamp(detected_at),
            location_block(camera)
        ),
        attachment: None,
    }
}

fn format_timestamp(epoch_s: u64) -> String {
    DateTime::from_timestamp(epoch_s as i64, 0)
        .map(|ts| ts.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| format!("epoch {}", epoch_s))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GpsPosition;

    fn camera() -> CameraSettings {
        CameraSettings {
            id: "camera-1".to_string(),
            name: "Testing Zone".to_string(),
            gps: None,
        }
    }

    #[test]
    fn location_block_without_gps_notes_static_position() {
        let block = location_block(&camera());
        assert!(block.contains("camera-1 (Testing Zone)"));
        assert!(block.contains("No GPS"));
    }

    #[test]
    fn location_block_with_gps_links_to_maps() {
        let mut cam = camera();
        cam.gps = Some(GpsPosition {
            lat: 59.3293,
            lon: 18.0686,
        });
        let block = location_block(&cam);
        assert!(block.contains("59.3293, 18.0686"));
        assert!(block.contains("google.com/maps/search"));
    }

    #[test]
    fn reminder_references_the_original_detection_time() {
        let msg = reminder_message(&camera(), 1_700_000_000, Path::new("snap.jpg"));
        assert!(msg.body.contains("2023-11-14"));
        assert_eq!(msg.attachment.as_deref(), Some(Path::new("snap.jpg")));
    }

    #[test]
    fn clearance_has_no_attachment() {
        let msg = clearance_message(&camera(), 1_700_000_000);
        assert!(msg.attachment.is_none());
        assert!(msg.subject.contains("Cleared"));
    }

    #[test]
    fn memory_notifier_captures_messages() {
        let notifier = MemoryNotifier::new();
        notifier
            .send(&AlertMessage {
                subject: "s".to_string(),
                body: "b".to_string(),
                attachment: None,
            })
            .expect("send");
        assert_eq!(notifier.sent().len(), 1);
    }
}
