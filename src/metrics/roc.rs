//! ROC curve and AUC.

use anyhow::{anyhow, Result};

/// An ROC curve with its area.
///
/// `fpr`/`tpr` are parallel, start at (0, 0), end at (1, 1), and contain
/// one point per distinct score threshold.
#[derive(Clone, Debug)]
pub struct RocCurve {
    pub fpr: Vec<f64>,
    pub tpr: Vec<f64>,
    pub thresholds: Vec<f64>,
    pub auc: f64,
}

/// Rank-based ROC computation over binary truth labels and scores.
///
/// Scores are swept in descending order; samples sharing a score move
/// together, so ties produce a single curve point. Requires at least one
/// positive and one negative sample.
pub fn roc_curve(y_true: &[u8], y_score: &[f64]) -> Result<RocCurve> {
    if y_true.len() != y_score.len() {
        return Err(anyhow!(
            "truth and score lengths differ ({} vs {})",
            y_true.len(),
            y_score.len()
        ));
    }
    let positives = y_true.iter().filter(|&&label| label != 0).count();
    let negatives = y_true.len() - positives;
    if positives == 0 || negatives == 0 {
        return Err(anyhow!(
            "ROC requires both classes ({} positive, {} negative)",
            positives,
            negatives
        ));
    }

    let mut order: Vec<usize> = (0..y_true.len()).collect();
    order.sort_by(|&a, &b| {
        y_score[b]
            .partial_cmp(&y_score[a])
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut fpr = vec![0.0];
    let mut tpr = vec![0.0];
    let mut thresholds = vec![f64::INFINITY];

    let mut tp = 0usize;
    let mut fp = 0usize;
    let mut i = 0usize;
    while i < order.len() {
        let threshold = y_score[order[i]];
        // Consume every sample tied at this score before emitting a point.
        while i < order.len() && y_score[order[i]] == threshold {
            if y_true[order[i]] != 0 {
                tp += 1;
            } else {
                fp += 1;
            }
            i += 1;
        }
        fpr.push(fp as f64 / negatives as f64);
        tpr.push(tp as f64 / positives as f64);
        thresholds.push(threshold);
    }

    let auc = trapezoid_area(&fpr, &tpr);
    Ok(RocCurve {
        fpr,
        tpr,
        thresholds,
        auc,
    })
}

fn trapezoid_area(xs: &[f64], ys: &[f64]) -> f64 {
    xs.windows(2)
        .zip(ys.windows(2))
        .map(|(x, y)| (x[1] - x[0]) * (y[0] + y[1]) / 2.0)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn perfect_separator_scores_one() {
        let y_true = [1, 1, 0, 0];
        let y_score = [0.9, 0.8, 0.3, 0.1];
        let curve = roc_curve(&y_true, &y_score).expect("roc");
        assert!((curve.auc - 1.0).abs() < 1e-9);
    }

    #[test]
    fn inverted_separator_scores_zero() {
        let y_true = [0, 0, 1, 1];
        let y_score = [0.9, 0.8, 0.3, 0.1];
        let curve = roc_curve(&y_true, &y_score).expect("roc");
        assert!(curve.auc.abs() < 1e-9);
    }

    #[test]
    fn shuffled_balanced_set_scores_near_half() {
        let y_true = [1, 0, 0, 1, 1, 0, 1, 0, 0, 1];
        let y_score = [0.95, 0.9, 0.8, 0.7, 0.6, 0.5, 0.4, 0.3, 0.2, 0.1];
        let curve = roc_curve(&y_true, &y_score).expect("roc");
        assert!((curve.auc - 0.5).abs() < 0.1);
    }

    #[test]
    fn tied_scores_collapse_into_one_point() {
        let y_true = [1, 0];
        let y_score = [0.5, 0.5];
        let curve = roc_curve(&y_true, &y_score).expect("roc");
        // (0,0) -> single tied sweep -> (1,1)
        assert_eq!(curve.fpr, vec![0.0, 1.0]);
        assert_eq!(curve.tpr, vec![0.0, 1.0]);
        assert!((curve.auc - 0.5).abs() < 1e-9);
    }

    #[test]
    fn single_class_input_is_rejected() {
        assert!(roc_curve(&[1, 1], &[0.5, 0.4]).is_err());
        assert!(roc_curve(&[0, 0], &[0.5, 0.4]).is_err());
        assert!(roc_curve(&[0, 1], &[0.5]).is_err());
    }

    #[test]
    fn curve_spans_the_unit_square() {
        let y_true = [1, 0, 0, 1, 0];
        let y_score = [0.7, 0.6, 0.5, 0.4, 0.2];
        let curve = roc_curve(&y_true, &y_score).expect("roc");
        assert_eq!(*curve.fpr.first().unwrap(), 0.0);
        assert_eq!(*curve.tpr.first().unwrap(), 0.0);
        assert_eq!(*curve.fpr.last().unwrap(), 1.0);
        assert_eq!(*curve.tpr.last().unwrap(), 1.0);
    }
}
