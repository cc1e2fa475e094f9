//! Confusion matrix and classification report.

use std::fmt::Write as _;

use crate::policy::NO_DETECTION;

/// A confusion matrix over an explicit, ordered label set.
///
/// Rows are truth, columns are predictions. Pairs whose truth or
/// prediction falls outside the label set are ignored.
#[derive(Clone, Debug)]
pub struct ConfusionMatrix {
    labels: Vec<i64>,
    counts: Vec<Vec<u64>>,
}

impl ConfusionMatrix {
    pub fn labels(&self) -> &[i64] {
        &self.labels
    }

    pub fn counts(&self) -> &[Vec<u64>] {
        &self.counts
    }

    pub fn count(&self, truth: i64, predicted: i64) -> u64 {
        let Some(row) = self.labels.iter().position(|&l| l == truth) else {
            return 0;
        };
        let Some(col) = self.labels.iter().position(|&l| l == predicted) else {
            return 0;
        };
        self.counts[row][col]
    }

    pub fn max_count(&self) -> u64 {
        self.counts
            .iter()
            .flat_map(|row| row.iter().copied())
            .max()
            .unwrap_or(0)
    }
}

/// The evaluation label set: every model class, plus the "no detection"
/// sentinel only when some prediction actually used it.
pub fn evaluation_labels(class_count: usize, y_pred: &[i64]) -> Vec<i64> {
    let mut labels: Vec<i64> = (0..class_count as i64).collect();
    if y_pred.contains(&NO_DETECTION) {
        labels.push(NO_DETECTION);
    }
    labels
}

pub fn confusion_matrix(y_true: &[i64], y_pred: &[i64], labels: &[i64]) -> ConfusionMatrix {
    let mut counts = vec![vec![0u64; labels.len()]; labels.len()];
    for (&truth, &predicted) in y_true.iter().zip(y_pred) {
        let row = labels.iter().position(|&l| l == truth);
        let col = labels.iter().position(|&l| l == predicted);
        if let (Some(row), Some(col)) = (row, col) {
            counts[row][col] += 1;
        }
    }
    ConfusionMatrix {
        labels: labels.to_vec(),
        counts,
    }
}

/// Per-class precision, recall, F1 and support, plus accuracy and a macro
/// average, formatted as a fixed-width table.
pub fn classification_report(
    y_true: &[i64],
    y_pred: &[i64],
    labels: &[i64],
    display_names: &[String],
) -> String {
    let matrix = confusion_matrix(y_true, y_pred, labels);
    let n = labels.len();

    let mut report = String::new();
    let _ = writeln!(
        report,
        "{:>16}  {:>9}  {:>9}  {:>9}  {:>9}",
        "", "precision", "recall", "f1-score", "support"
    );
    let _ = writeln!(report);

    let mut macro_precision = 0.0;
    let mut macro_recall = 0.0;
    let mut macro_f1 = 0.0;
    let mut total_support = 0u64;
    let mut correct = 0u64;

    for i in 0..n {
        let tp = matrix.counts[i][i];
        let predicted: u64 = (0..n).map(|row| matrix.counts[row][i]).sum();
        let support: u64 = matrix.counts[i].iter().sum();

        let precision = ratio(tp, predicted);
        let recall = ratio(tp, support);
        let f1 = if precision + recall > 0.0 {
            2.0 * precision * recall / (precision + recall)
        } else {
            0.0
        };

        macro_precision += precision;
        macro_recall += recall;
        macro_f1 += f1;
        total_support += support;
        correct += tp;

        let name = display_names
            .get(i)
            .map(String::as_str)
            .unwrap_or("unknown");
        let _ = writeln!(
            report,
            "{:>16}  {:>9.2}  {:>9.2}  {:>9.2}  {:>9}",
            name, precision, recall, f1, support
        );
    }

    let accuracy = ratio(correct, total_support);
    let _ = writeln!(report);
    let _ = writeln!(
        report,
        "{:>16}  {:>9}  {:>9}  {:>9.2}  {:>9}",
        "accuracy", "", "", accuracy, total_support
    );
    let _ = writeln!(
        report,
        "{:>16}  {:>9.2}  {:>9.2}  {:>9.2}  {:>9}",
        "macro avg",
        macro_precision / n as f64,
        macro_recall / n as f64,
        macro_f1 / n as f64,
        total_support
    );
    report
}

fn ratio(numerator: u64, denominator: u64) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinel_column_appears_only_when_predicted() {
        assert_eq!(evaluation_labels(2, &[0, 1, 1]), vec![0, 1]);
        assert_eq!(evaluation_labels(2, &[0, NO_DETECTION]), vec![0, 1, -1]);
    }

    #[test]
    fn known_example_counts_the_missed_detection() {
        // Truth [0, 1, 0], predictions [0, 1, -1]: perfect diagonal for the
        // first two samples, one entry in the sentinel column for the third.
        let y_true = [0, 1, 0];
        let y_pred = [0, 1, NO_DETECTION];
        let labels = evaluation_labels(2, &y_pred);
        let matrix = confusion_matrix(&y_true, &y_pred, &labels);

        assert_eq!(matrix.count(0, 0), 1);
        assert_eq!(matrix.count(1, 1), 1);
        assert_eq!(matrix.count(0, NO_DETECTION), 1);
        let total: u64 = matrix.counts().iter().flatten().sum();
        assert_eq!(total, 3);
    }

    #[test]
    fn pairs_outside_the_label_set_are_ignored() {
        let matrix = confusion_matrix(&[0, 9], &[0, 0], &[0, 1]);
        let total: u64 = matrix.counts().iter().flatten().sum();
        assert_eq!(total, 1);
    }

    #[test]
    fn report_lists_every_display_name() {
        let y_true = [0, 1, 0, 1];
        let y_pred = [0, 1, 1, 1];
        let names = vec!["Debris".to_string(), "Garbage".to_string()];
        let report = classification_report(&y_true, &y_pred, &[0, 1], &names);

        assert!(report.contains("Debris"));
        assert!(report.contains("Garbage"));
        assert!(report.contains("accuracy"));
        assert!(report.contains("macro avg"));
    }

    #[test]
    fn perfect_predictions_have_unit_scores() {
        let y_true = [0, 1];
        let y_pred = [0, 1];
        let names = vec!["Debris".to_string(), "Garbage".to_string()];
        let report = classification_report(&y_true, &y_pred, &[0, 1], &names);
        // Both class rows and the accuracy line read 1.00.
        assert!(report.matches("1.00").count() >= 7);
    }
}
