//! Classification metrics

use serde::{Deserialize, Serialize};

/// Held-out evaluation results reported by the train endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    pub accuracy: f64,
    pub f1_score: f64,
}

/// Fraction of predictions matching the truth. 0.0 on empty input.
pub fn accuracy(truth: &[usize], predicted: &[usize]) -> f64 {
    if truth.is_empty() {
        return 0.0;
    }
    let correct = truth.iter().zip(predicted).filter(|(t, p)| t == p).count();
    correct as f64 / truth.len() as f64
}

/// Binary F1 with class 1 as the positive class. 0.0 when undefined
/// (no true positives).
pub fn f1_score(truth: &[usize], predicted: &[usize]) -> f64 {
    let mut true_pos = 0usize;
    let mut false_pos = 0usize;
    let mut false_neg = 0usize;

    for (&t, &p) in truth.iter().zip(predicted) {
        match (t, p) {
            (1, 1) => true_pos += 1,
            (0, 1) => false_pos += 1,
            (1, 0) => false_neg += 1,
            _ => {}
        }
    }

    if true_pos == 0 {
        return 0.0;
    }

    let precision = true_pos as f64 / (true_pos + false_pos) as f64;
    let recall = true_pos as f64 / (true_pos + false_neg) as f64;
    2.0 * precision * recall / (precision + recall)
}
