//! The detection-to-decision pipeline.
//!
//! One frame at a time: detect, decide, debounce, then carry out whatever
//! side effect the state machine asked for. The pipeline owns the record
//! store (persisted on each confirmed transition) and the notification
//! failure contract: transport errors are logged and absorbed, never
//! propagated into the frame loop.

use anyhow::Result;
use std::path::PathBuf;

use crate::config::{AlertSettings, CameraSettings};
use crate::debounce::{AlertAction, AlertMachine};
use crate::detect::{DetectionResult, DetectorBackend};
use crate::frame::Frame;
use crate::notify::{self, AlertMessage, Notifier};
use crate::policy::DecisionPolicy;
use crate::records::AlertStore;
use crate::snapshot;

/// What one frame produced, for logging and tests.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameReport {
    pub detections: usize,
    pub qualifying: bool,
    pub action: Option<AlertAction>,
}

pub struct SentinelPipeline {
    backend: Box<dyn DetectorBackend>,
    policy: DecisionPolicy,
    machine: AlertMachine,
    store: Box<dyn AlertStore>,
    notifier: Box<dyn Notifier>,
    camera: CameraSettings,
    alerts: AlertSettings,
    snapshot_path: PathBuf,
}

impl SentinelPipeline {
    pub fn new(
        backend: Box<dyn DetectorBackend>,
        policy: DecisionPolicy,
        store: Box<dyn AlertStore>,
        notifier: Box<dyn Notifier>,
        camera: CameraSettings,
        alerts: AlertSettings,
        snapshot_path: PathBuf,
    ) -> Self {
        let machine = AlertMachine::new(alerts.notification_delay, alerts.reminder_interval);
        Self {
            backend,
            policy,
            machine,
            store,
            notifier,
            camera,
            alerts,
            snapshot_path,
        }
    }

    pub fn store(&self) -> &dyn AlertStore {
        self.store.as_ref()
    }

    /// Run one frame through detect -> decide -> debounce -> side effects.
    pub fn process_frame(&mut self, frame: &Frame, now_s: u64) -> Result<FrameReport> {
        let result = match self.backend.detect(frame.pixels(), frame.width(), frame.height()) {
            Ok(result) => result,
            Err(e) => {
                // A failed inference is indistinguishable from an empty frame.
                log::warn!("detection failed on frame {}: {:#}", frame.index(), e);
                DetectionResult::default()
            }
        };

        let qualifying = self.policy.target_present(&result.detections);
        let action = self.machine.step(now_s, qualifying);
        match action {
            Some(AlertAction::Raise) => self.raise(frame, &result, now_s),
            Some(AlertAction::Remind) => self.remind(),
            Some(AlertAction::Clear) => self.clear(now_s),
            None => {}
        }

        Ok(FrameReport {
            detections: result.detections.len(),
            qualifying,
            action,
        })
    }

    /// Release transient state when the stream ends.
    pub fn shutdown(&mut self) -> Result<()> {
        snapshot::discard_snapshot(&self.snapshot_path)
    }

    fn raise(&mut self, frame: &Frame, result: &DetectionResult, now_s: u64) {
        log::info!(
            "alert raised on camera {} after {}s of sustained detection",
            self.camera.id,
            self.alerts.notification_delay.as_secs()
        );

        let mut attachment = Some(self.snapshot_path.clone());
        if let Err(e) = snapshot::write_snapshot(frame, &result.detections, &self.snapshot_path) {
            log::warn!("snapshot failed, notifying without attachment: {:#}", e);
            attachment = None;
        }

        match self.store.insert_pending(&self.camera.id, now_s) {
            Ok(id) => log::info!("opened alert record {}", id),
            Err(e) => log::warn!("could not open alert record: {:#}", e),
        }

        let mut message =
            notify::alert_message(&self.camera, self.alerts.notification_delay, &self.snapshot_path);
        message.attachment = attachment;
        self.deliver(&message);
    }

    fn remind(&mut self) {
        // The deadline fired; the record decides whether a reminder is due.
        let Some(pending) = self.store.pending_for(&self.camera.id) else {
            log::debug!("reminder skipped: no pending record for {}", self.camera.id);
            return;
        };
        let mut message =
            notify::reminder_message(&self.camera, pending.detected_at, &self.snapshot_path);
        if !self.snapshot_path.exists() {
            message.attachment = None;
        }
        self.deliver(&message);
    }

    fn clear(&mut self, now_s: u64) {
        match self.store.complete_pending(&self.camera.id, now_s) {
            Ok(Some(record)) => {
                log::info!(
                    "alert cleared on camera {} ({}s after detection)",
                    self.camera.id,
                    now_s.saturating_sub(record.detected_at)
                );
                let message = notify::clearance_message(&self.camera, record.detected_at);
                self.deliver(&message);
            }
            Ok(None) => {
                log::debug!("clearance skipped: no pending record for {}", self.camera.id);
            }
            Err(e) => log::warn!("could not complete alert record: {:#}", e),
        }
        if let Err(e) = snapshot::discard_snapshot(&self.snapshot_path) {
            log::warn!("{:#}", e);
        }
    }

    fn deliver(&self, message: &AlertMessage) {
        if let Err(e) = self.notifier.send(message) {
            log::warn!(
                "notification via {} failed: {:#} (subject: {})",
                self.notifier.name(),
                e,
                message.subject
            );
        }
    }
}
