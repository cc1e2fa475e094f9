//! eval_confusion - confusion-matrix evaluation over a labeled image directory
//!
//! Ground truth is the class id on the first line of each label file
//! (images without one are skipped); the prediction is the
//! highest-confidence detection above the threshold, or the "no
//! detection" sentinel. Prints the matrix and a classification report,
//! and renders the matrix grid.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use debris_sentinel::config::DetectorSettings;
use debris_sentinel::policy::NO_DETECTION;
use debris_sentinel::ui::Ui;
use debris_sentinel::{build_backend, ingest::load_rgb_frame, labels, metrics, DecisionPolicy};

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
    /// Confidence threshold for a prediction to count.
    #[arg(long, default_value_t = 0.5)]
    threshold: f32,
    /// Output plot path.
    #[arg(long, default_value = "confusion_matrix.png")]
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
    // Every model class counts as a prediction here, not just the alert targets.
    let policy = DecisionPolicy::new(args.classes.clone(), args.threshold);

    let mut backend = {
        let _stage = ui.stage("load model");
        let mut backend = build_backend(&settings)?;
        backend.warm_up()?;
        backend
    };

    let images = labels::list_images(&args.images)?;
    log::info!("evaluating {} images", images.len());

    let mut y_true = Vec::new();
    let mut y_pred = Vec::new();
    let mut skipped = 0usize;

    let bar = ui.progress(images.len() as u64, "classifying");
    for image in &images {
        bar.inc(1);
        let label_path = labels::label_path_for(image, &args.labels);
        let Some(truth) = labels::first_class_label(&label_path)? else {
            skipped += 1;
            continue;
        };
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
        y_pred.push(policy.top_class(&result.detections));
    }
    bar.finish_and_clear();
    if skipped > 0 {
        log::info!("skipped {} images without a usable label or pixel data", skipped);
    }

    let label_set = metrics::evaluation_labels(args.classes.len(), &y_pred);
    let mut display_names = args.classes.clone();
    if label_set.contains(&NO_DETECTION) {
        display_names.push("No Detection".to_string());
    }

    let matrix = metrics::confusion_matrix(&y_true, &y_pred, &label_set);
    {
        let _stage = ui.stage("render plot");
        metrics::render_confusion(&matrix, &display_names, &args.out)?;
    }

    println!("Confusion matrix (rows = true, columns = predicted):");
    print!("{:>16}", "");
    for name in &display_names {
        print!("  {:>14}", name);
    }
    println!();
    for (row, counts) in matrix.counts().iter().enumerate() {
        print!("{:>16}", display_names[row]);
        for count in counts {
            print!("  {:>14}", count);
        }
        println!();
    }
    println!();
    println!(
        "{}",
        metrics::classification_report(&y_true, &y_pred, &label_set, &display_names)
    );
    println!("Matrix plot written to {}", args.out.display());
    Ok(())
}
