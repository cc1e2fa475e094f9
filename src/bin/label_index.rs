//! label_index - snapshot a labels directory into a JSON presence map
//!
//! Writes `{image filename: 0|1}` for every image in the directory, where
//! 1 means the paired label file exists and has content.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use debris_sentinel::labels;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Image directory to index.
    #[arg(long)]
    images: PathBuf,
    /// Label directory (one .txt per image stem).
    #[arg(long)]
    labels: PathBuf,
    /// Output JSON path.
    #[arg(long, default_value = "ground_truth.json")]
    out: PathBuf,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let index = labels::build_presence_index(&args.images, &args.labels)?;
    let positives = index.values().filter(|&&v| v == 1).count();
    labels::write_presence_index(&index, &args.out)?;

    log::info!(
        "indexed {} images ({} positive) into {}",
        index.len(),
        positives,
        args.out.display()
    );
    Ok(())
}
