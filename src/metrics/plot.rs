//! Plot rendering for the offline evaluators.

use anyhow::{anyhow, Context, Result};
use plotters::prelude::*;
use std::path::Path;

use super::confusion::ConfusionMatrix;
use super::roc::RocCurve;

const PLOT_SIZE: (u32, u32) = (800, 600);

/// Render the ROC curve with the diagonal chance line.
pub fn render_roc(curve: &RocCurve, output_path: &Path) -> Result<()> {
    let path = output_path
        .to_str()
        .ok_or_else(|| anyhow!("plot path is not valid UTF-8"))?;
    let root = BitMapBackend::new(path, PLOT_SIZE).into_drawing_area();
    root.fill(&WHITE).context("fill plot background")?;

    let mut chart = ChartBuilder::on(&root)
        .caption("ROC Curve (Debris Detection)", ("sans-serif", 28))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(0.0..1.0, 0.0..1.0)
        .context("build ROC chart")?;

    chart
        .configure_mesh()
        .x_desc("False Positive Rate")
        .y_desc("True Positive Rate")
        .draw()
        .context("draw ROC mesh")?;

    let points: Vec<(f64, f64)> = curve
        .fpr
        .iter()
        .zip(&curve.tpr)
        .map(|(&x, &y)| (x, y))
        .collect();
    chart
        .draw_series(LineSeries::new(points, BLUE.stroke_width(2)))
        .context("draw ROC series")?
        .label(format!("AUC = {:.2}", curve.auc))
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLUE.stroke_width(2)));

    // Chance line.
    chart
        .draw_series(DashedLineSeries::new(
            vec![(0.0, 0.0), (1.0, 1.0)],
            6,
            4,
            BLACK.stroke_width(1),
        ))
        .context("draw chance line")?;

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::LowerRight)
        .border_style(BLACK)
        .background_style(WHITE.mix(0.8))
        .draw()
        .context("draw ROC legend")?;

    root.present().context("write ROC plot")?;
    Ok(())
}

/// Render a confusion matrix as a shaded grid with per-cell counts.
pub fn render_confusion(
    matrix: &ConfusionMatrix,
    display_names: &[String],
    output_path: &Path,
) -> Result<()> {
    let path = output_path
        .to_str()
        .ok_or_else(|| anyhow!("plot path is not valid UTF-8"))?;
    let n = matrix.labels().len() as i32;
    let max_count = matrix.max_count().max(1);

    let root = BitMapBackend::new(path, PLOT_SIZE).into_drawing_area();
    root.fill(&WHITE).context("fill plot background")?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Confusion Matrix", ("sans-serif", 28))
        .margin(10)
        .x_label_area_size(60)
        .y_label_area_size(90)
        .build_cartesian_2d(0..n, n..0)
        .context("build confusion chart")?;

    let names = display_names.to_vec();
    chart
        .configure_mesh()
        .disable_mesh()
        .x_labels(n as usize)
        .y_labels(n as usize)
        .x_label_formatter(&|idx| label_name(&names, *idx))
        .y_label_formatter(&|idx| label_name(&names, *idx))
        .x_desc("Predicted")
        .y_desc("True")
        .draw()
        .context("draw confusion mesh")?;

    for (row, row_counts) in matrix.counts().iter().enumerate() {
        for (col, &count) in row_counts.iter().enumerate() {
            let intensity = count as f64 / max_count as f64;
            let shade = BLUE.mix(0.15 + 0.85 * intensity);
            let (x, y) = (col as i32, row as i32);
            chart
                .draw_series(std::iter::once(Rectangle::new(
                    [(x, y), (x + 1, y + 1)],
                    shade.filled(),
                )))
                .context("draw matrix cell")?;
            let text_color = if intensity > 0.6 { &WHITE } else { &BLACK };
            chart
                .draw_series(std::iter::once(Text::new(
                    count.to_string(),
                    (x, y),
                    ("sans-serif", 22).into_font().color(text_color),
                )))
                .context("draw matrix count")?;
        }
    }

    root.present().context("write confusion plot")?;
    Ok(())
}

fn label_name(names: &[String], idx: i32) -> String {
    names
        .get(idx as usize)
        .cloned()
        .unwrap_or_else(|| idx.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::{confusion_matrix, roc_curve};

    #[test]
    fn roc_plot_writes_a_png() {
        let dir = tempfile::tempdir().expect("tempdir");
        let out = dir.path().join("roc.png");
        let curve = roc_curve(&[1, 1, 0, 0], &[0.9, 0.8, 0.4, 0.1]).expect("roc");
        render_roc(&curve, &out).expect("render");
        assert!(out.metadata().expect("plot file").len() > 0);
    }

    #[test]
    fn confusion_plot_writes_a_png() {
        let dir = tempfile::tempdir().expect("tempdir");
        let out = dir.path().join("confusion.png");
        let matrix = confusion_matrix(&[0, 1, 0], &[0, 1, -1], &[0, 1, -1]);
        let names = vec![
            "Debris".to_string(),
            "Garbage".to_string(),
            "No Detection".to_string(),
        ];
        render_confusion(&matrix, &names, &out).expect("render");
        assert!(out.metadata().expect("plot file").len() > 0);
    }
}
