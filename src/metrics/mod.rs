//! Offline evaluation metrics.
//!
//! Both evaluators consume one (truth, prediction) pair per test image:
//! ROC/AUC over binary presence with the frame's max confidence as the
//! score, and a confusion matrix over class ids with a "no detection"
//! sentinel column.

mod confusion;
mod plot;
mod roc;

pub use confusion::{
    classification_report, confusion_matrix, evaluation_labels, ConfusionMatrix,
};
pub use plot::{render_confusion, render_roc};
pub use roc::{roc_curve, RocCurve};
