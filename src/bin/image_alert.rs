//! image_alert - single-image detection check
//!
//! Runs the detector on one image, prints every detection, and when a
//! target class is present sends one alert notification with the
//! annotated image attached. The attachment is transient and removed
//! after the send.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use debris_sentinel::snapshot;
use debris_sentinel::{
    build_backend, ingest::load_rgb_frame, notify, DecisionPolicy, SentinelConfig,
};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Image to check.
    image: PathBuf,
    /// Skip the notification even when a target class is present.
    #[arg(long)]
    dry_run: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let cfg = SentinelConfig::load()?;
    log::info!(
        "detector backend={} model={}",
        cfg.detector.backend,
        cfg.detector.model_path
    );

    let mut backend = build_backend(&cfg.detector)?;
    backend.warm_up()?;

    let frame = load_rgb_frame(
        &args.image,
        Some((cfg.detector.input_width, cfg.detector.input_height)),
    )?;
    let result = backend.detect(frame.pixels(), frame.width(), frame.height())?;

    for detection in &result.detections {
        println!(
            "Detected: {} | Confidence: {:.2}",
            detection.class_name, detection.confidence
        );
    }

    let policy = DecisionPolicy::new(
        cfg.detector.target_classes.clone(),
        cfg.detector.confidence_threshold,
    );
    if !policy.target_present(&result.detections) {
        println!("No debris or garbage detected in the image.");
        return Ok(());
    }

    println!("Debris or garbage detected in the image.");
    if args.dry_run {
        return Ok(());
    }

    let snapshot_path = PathBuf::from(&cfg.snapshot_path);
    snapshot::write_snapshot(&frame, &result.detections, &snapshot_path)?;

    let notifier = notify::build_notifier(&cfg.notify)?;
    let message = notify::AlertMessage {
        subject: format!("Debris detected at {} (single image)", cfg.camera.id),
        body: format!(
            "Debris has been detected in the provided photo.\n\n{}",
            notify::location_block(&cfg.camera)
        ),
        attachment: Some(snapshot_path.clone()),
    };
    if let Err(e) = notifier.send(&message) {
        log::warn!("notification via {} failed: {:#}", notifier.name(), e);
    }

    snapshot::discard_snapshot(&snapshot_path)?;
    Ok(())
}
