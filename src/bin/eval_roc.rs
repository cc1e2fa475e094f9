//! eval_roc - ROC/AUC evaluation over a labeled image directory
//!
//! Ground truth is binary presence (a non-empty label file), the score is
//! the frame-wide maximum detection confidence. Prints the AUC and
//! renders the curve with the diagonal chance line.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use debris_sentinel::config::DetectorSettings;
use debris_sentinel::ui::Ui;
use debris_sentinel::{build_backend, ingest::load_rgb_frame, labels, metrics, policy};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Test image directory.
    #[arg(long)]
    images: PathBuf,
    /// Label directory (one .txt per image stem).
    #[arg(long)]
    labels: PathBuf,
    /// Detector backend ("stub" or "tract").
    #[arg(long, default_value = "tract")]
    backend: String,
    /// ONNX checkpoint path.
    #[arg(long, default_value = "best.onnx")]
    model: PathBuf,
    /// Model input width.
    #[arg(long, default_value_t = 640)]
    input_width: u32,
    /// Model input height.
    #[arg(long, default_value_t = 640)]
    input_height: u32,
    /// Comma-separated class names in model output order.
    #[arg(long, default_value = "Debris,Garbage", value_delimiter = ',')]
    classes: Vec<String>,
    /// Confidence cutoff applied by the backend.
    #[arg(long, default_value_t = 0.25)]
    threshold: f32,
    /// Output plot path.
    #[arg(long, default_value = "roc_curve.png")]
    out: PathBuf,
    /// Plain progress output.
    #[arg(long)]
    plain: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    let ui = if args.plain { Ui::plain() } else { Ui::auto() };

    let settings = DetectorSettings {
        backend: args.backend.clone(),
        model_path: args.model.display().to_string(),
        input_width: args.input_width,
        input_height: args.input_height,
        class_names: args.classes.clone(),
        target_classes: args.classes.clone(),
        confidence_threshold: args.threshold,
    };

    let mut backend = {
        let _stage = ui.stage("load model");
        let mut backend = build_backend(&settings)?;
        backend.warm_up()?;
        backend
    };

    let images = labels::list_images(&args.images)?;
    log::info!("evaluating {} images", images.len());

    let mut y_true = Vec::with_capacity(images.len());
    let mut y_score = Vec::with_capacity(images.len());
    let mut skipped = 0usize;

    let bar = ui.progress(images.len() as u64, "scoring");
    for image in &images {
        bar.inc(1);
        let truth = labels::presence_label(&labels::label_path_for(image, &args.labels))?;
        let frame = match load_rgb_frame(image, Some((settings.input_width, settings.input_height)))
        {
            Ok(frame) => frame,
            Err(e) => {
                log::warn!("skipping {}: {:#}", image.display(), e);
                skipped += 1;
                continue;
            }
        };
        let result = backend.detect(frame.pixels(), frame.width(), frame.height())?;
        y_true.push(truth);
        y_score.push(policy::max_score(&result.detections));
    }
    bar.finish_and_clear();
    if skipped > 0 {
        log::warn!("skipped {} unreadable images", skipped);
    }

    let curve = metrics::roc_curve(&y_true, &y_score)?;
    {
        let _stage = ui.stage("render plot");
        metrics::render_roc(&curve, &args.out)?;
    }

    println!("Final AUC score: {:.3}", curve.auc);
    println!("ROC curve written to {}", args.out.display());
    Ok(())
}
