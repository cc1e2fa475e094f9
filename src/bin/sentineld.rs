//! sentineld - debris detection watcher
//!
//! This daemon:
//! 1. Ingests frames from a local video file (or a synthetic stub source)
//! 2. Runs the configured detector backend on each frame
//! 3. Debounces sustained detections into alert episodes
//! 4. Persists episode records and sends alert/reminder/clearance
//!    notifications with an annotated snapshot

use anyhow::Result;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use debris_sentinel::{
    build_backend, now_s, DecisionPolicy, FileConfig, FileSource, JsonFileStore, SentinelConfig,
    SentinelPipeline,
};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cfg = SentinelConfig::load()?;
    log::info!(
        "detector backend={} model={} threshold={:.2}",
        cfg.detector.backend,
        cfg.detector.model_path,
        cfg.detector.confidence_threshold
    );
    log::info!(
        "camera {} watching {} (delay {}s, reminder {}s)",
        cfg.camera.id,
        cfg.video.path,
        cfg.alerts.notification_delay.as_secs(),
        cfg.alerts.reminder_interval.as_secs()
    );

    let mut backend = build_backend(&cfg.detector)?;
    backend.warm_up()?;

    let mut source = FileSource::new(FileConfig {
        path: cfg.video.path.clone(),
        target_fps: cfg.video.target_fps,
        max_frames: 0,
    })?;
    source.connect()?;

    let store = JsonFileStore::open(&cfg.records_path)?;
    let notifier = debris_sentinel::notify::build_notifier(&cfg.notify)?;
    let policy = DecisionPolicy::new(
        cfg.detector.target_classes.clone(),
        cfg.detector.confidence_threshold,
    );
    let mut pipeline = SentinelPipeline::new(
        backend,
        policy,
        Box::new(store),
        notifier,
        cfg.camera.clone(),
        cfg.alerts.clone(),
        cfg.snapshot_path.clone().into(),
    );

    let running = Arc::new(AtomicBool::new(true));
    let shutdown_flag = running.clone();
    ctrlc::set_handler(move || {
        shutdown_flag.store(false, Ordering::SeqCst);
    })?;

    let frame_budget = Duration::from_millis(1000 / cfg.video.target_fps.max(1) as u64);
    let mut last_health_log = Instant::now();

    log::info!("sentineld running");
    while running.load(Ordering::SeqCst) {
        let cycle_start = Instant::now();

        let Some(frame) = source.next_frame()? else {
            log::info!("end of stream reached");
            break;
        };

        let report = pipeline.process_frame(&frame, now_s()?)?;
        log::debug!(
            "frame {}: detections={} qualifying={} action={:?}",
            frame.index(),
            report.detections,
            report.qualifying,
            report.action
        );

        if last_health_log.elapsed() >= Duration::from_secs(5) {
            let stats = source.stats();
            log::info!("frames={} path={}", stats.frames_captured, stats.path);
            last_health_log = Instant::now();
        }

        let elapsed = cycle_start.elapsed();
        if elapsed < frame_budget {
            std::thread::sleep(frame_budget - elapsed);
        }
    }

    pipeline.shutdown()?;
    log::info!(
        "sentineld stopped after {} frames",
        source.stats().frames_captured
    );
    Ok(())
}
