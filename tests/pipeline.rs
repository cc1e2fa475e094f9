//! End-to-end episode tests: scripted detector through the full
//! detect -> decide -> debounce -> notify pipeline.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use debris_sentinel::config::{AlertSettings, CameraSettings};
use debris_sentinel::records::AlertStatus;
use debris_sentinel::{
    AlertAction, DecisionPolicy, Detection, Frame, InMemoryStore, MemoryNotifier,
    SentinelPipeline, StubBackend,
};

fn camera() -> CameraSettings {
    CameraSettings {
        id: "camera-1".to_string(),
        name: "Testing Zone".to_string(),
        gps: None,
    }
}

fn alerts(delay_s: u64, reminder_s: u64) -> AlertSettings {
    AlertSettings {
        notification_delay: Duration::from_secs(delay_s),
        reminder_interval: Duration::from_secs(reminder_s),
    }
}

fn frame() -> Frame {
    Frame::new(vec![0u8; 8 * 8 * 3], 8, 8, 0).expect("frame")
}

fn debris(confidence: f32) -> Vec<Detection> {
    vec![Detection::new(0, "Debris", confidence)]
}

fn build_pipeline(
    script: Vec<Vec<Detection>>,
    alerts: AlertSettings,
    snapshot_path: PathBuf,
) -> (SentinelPipeline, Arc<MemoryNotifier>) {
    let notifier = Arc::new(MemoryNotifier::new());
    let pipeline = SentinelPipeline::new(
        Box::new(StubBackend::scripted(script)),
        DecisionPolicy::new(vec!["Debris".to_string(), "Garbage".to_string()], 0.5),
        Box::new(InMemoryStore::new()),
        Box::new(notifier.clone()),
        camera(),
        alerts,
        snapshot_path,
    );
    (pipeline, notifier)
}

#[test]
fn sustained_detection_produces_one_alert_and_one_clearance() {
    let dir = tempfile::tempdir().expect("tempdir");
    let snapshot = dir.path().join("snap.jpg");

    // Qualifying frames at t=0..=10, then one clean frame.
    let script = vec![
        debris(0.9), // t=0: starts accumulating
        debris(0.8), // t=5
        debris(0.9), // t=10: delay reached, alert fires
        debris(0.9), // t=11
        vec![],      // t=12: clears
    ];
    let (mut pipeline, notifier) = build_pipeline(script, alerts(10, 300), snapshot.clone());

    let times = [0u64, 5, 10, 11, 12];
    let mut actions = Vec::new();
    for &now in &times {
        let report = pipeline.process_frame(&frame(), now).expect("frame");
        if let Some(action) = report.action {
            actions.push(action);
        }
    }

    assert_eq!(actions, vec![AlertAction::Raise, AlertAction::Clear]);

    let sent = notifier.sent();
    assert_eq!(sent.len(), 2);
    assert!(sent[0].subject.contains("Debris detected"));
    assert!(sent[0].body.contains("camera-1 (Testing Zone)"));
    assert_eq!(sent[0].attachment.as_deref(), Some(snapshot.as_path()));
    assert!(sent[1].subject.contains("Cleared"));

    // The episode record went Pending -> Completed.
    let records = pipeline.store().records();
    assert_eq!(records.len(), 1);
    let record = records.values().next().expect("record");
    assert_eq!(record.status, AlertStatus::Completed);
    assert_eq!(record.detected_at, 10);
    assert_eq!(record.cleared_at, Some(12));

    // The transient snapshot was removed on clearance.
    assert!(!snapshot.exists());
}

#[test]
fn short_detection_run_stays_silent() {
    let dir = tempfile::tempdir().expect("tempdir");
    let script = vec![debris(0.9), debris(0.9), vec![], vec![]];
    let (mut pipeline, notifier) =
        build_pipeline(script, alerts(10, 300), dir.path().join("snap.jpg"));

    for &now in &[0u64, 4, 9, 10] {
        let report = pipeline.process_frame(&frame(), now).expect("frame");
        assert_eq!(report.action, None);
    }

    assert!(notifier.sent().is_empty());
    assert!(pipeline.store().records().is_empty());
}

#[test]
fn reminder_fires_while_episode_stays_pending() {
    let dir = tempfile::tempdir().expect("tempdir");
    let script = vec![
        debris(0.9), // t=0
        debris(0.9), // t=10: alert, reminder due at 40
        debris(0.9), // t=40: reminder
        vec![],      // t=50: clearance
    ];
    let (mut pipeline, notifier) =
        build_pipeline(script, alerts(10, 30), dir.path().join("snap.jpg"));

    for &now in &[0u64, 10, 40, 50] {
        pipeline.process_frame(&frame(), now).expect("frame");
    }

    let sent = notifier.sent();
    assert_eq!(sent.len(), 3);
    assert!(sent[0].subject.contains("Debris detected"));
    assert!(sent[1].subject.contains("Reminder"));
    // The reminder body references the original detection time, which the
    // clearance repeats.
    assert!(sent[1].body.contains("still pending"));
    assert!(sent[2].subject.contains("Cleared"));
}

#[test]
fn early_clearance_cancels_the_reminder() {
    let dir = tempfile::tempdir().expect("tempdir");
    let script = vec![
        debris(0.9), // t=0
        debris(0.9), // t=10: alert, reminder due at 40
        vec![],      // t=15: clearance
        vec![],      // t=45: past the old deadline, nothing fires
    ];
    let (mut pipeline, notifier) =
        build_pipeline(script, alerts(10, 30), dir.path().join("snap.jpg"));

    for &now in &[0u64, 10, 15, 45] {
        pipeline.process_frame(&frame(), now).expect("frame");
    }

    let sent = notifier.sent();
    assert_eq!(sent.len(), 2);
    assert!(sent[0].subject.contains("Debris detected"));
    assert!(sent[1].subject.contains("Cleared"));
}

#[test]
fn below_threshold_detections_never_alert() {
    let dir = tempfile::tempdir().expect("tempdir");
    let script = vec![debris(0.4), debris(0.45), debris(0.3)];
    let (mut pipeline, notifier) =
        build_pipeline(script, alerts(0, 300), dir.path().join("snap.jpg"));

    for &now in &[0u64, 1, 2] {
        let report = pipeline.process_frame(&frame(), now).expect("frame");
        assert!(!report.qualifying);
    }
    assert!(notifier.sent().is_empty());
}
