//! Decision tree classifier
//!
//! CART-style binary classifier with gini impurity. Trees grow until leaves
//! are pure or no split reduces impurity (no depth limit), and every
//! tie-break is deterministic, so fitting the same data always produces the
//! same tree.

use ndarray::{Array2, ArrayView1};
use serde::{Deserialize, Serialize};

pub const NUM_CLASSES: usize = 2;

const IMPURITY_EPS: f64 = 1e-12;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TreeNode {
    Leaf {
        probabilities: [f64; NUM_CLASSES],
    },
    Split {
        feature: usize,
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    root: TreeNode,
    n_features: usize,
}

impl DecisionTree {
    /// Fit a tree on the given feature matrix and `{0,1}` labels.
    pub fn fit(features: &Array2<f64>, labels: &[usize]) -> Self {
        debug_assert_eq!(features.nrows(), labels.len());
        let indices: Vec<usize> = (0..labels.len()).collect();
        Self {
            root: build_node(features, labels, &indices),
            n_features: features.ncols(),
        }
    }

    /// Class probabilities at the leaf this row falls into.
    pub fn predict_proba(&self, row: ArrayView1<'_, f64>) -> [f64; NUM_CLASSES] {
        debug_assert_eq!(row.len(), self.n_features);
        let mut node = &self.root;
        loop {
            match node {
                TreeNode::Leaf { probabilities } => return *probabilities,
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    node = if row[*feature] <= *threshold { left } else { right };
                }
            }
        }
    }

    /// Predicted class; ties resolve to class 0.
    pub fn predict(&self, row: ArrayView1<'_, f64>) -> usize {
        let proba = self.predict_proba(row);
        usize::from(proba[1] > proba[0])
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }
}

fn class_counts(labels: &[usize], indices: &[usize]) -> [usize; NUM_CLASSES] {
    let mut counts = [0usize; NUM_CLASSES];
    for &i in indices {
        counts[labels[i]] += 1;
    }
    counts
}

fn gini(counts: &[usize; NUM_CLASSES]) -> f64 {
    let total: usize = counts.iter().sum();
    if total == 0 {
        return 0.0;
    }
    let total = total as f64;
    1.0 - counts
        .iter()
        .map(|&c| {
            let p = c as f64 / total;
            p * p
        })
        .sum::<f64>()
}

fn leaf(counts: [usize; NUM_CLASSES]) -> TreeNode {
    let total = counts.iter().sum::<usize>().max(1) as f64;
    let mut probabilities = [0.0; NUM_CLASSES];
    for (p, &c) in probabilities.iter_mut().zip(&counts) {
        *p = c as f64 / total;
    }
    TreeNode::Leaf { probabilities }
}

fn build_node(features: &Array2<f64>, labels: &[usize], indices: &[usize]) -> TreeNode {
    let counts = class_counts(labels, indices);
    let parent_impurity = gini(&counts);
    if indices.len() < 2 || parent_impurity == 0.0 {
        return leaf(counts);
    }

    // Best split over all features; candidates are midpoints between
    // adjacent distinct values. Features are scanned in order and a new
    // candidate must be strictly better, so tie-breaking is stable.
    let mut best: Option<(f64, usize, f64)> = None;
    let n = indices.len() as f64;

    for feature in 0..features.ncols() {
        let mut ordered: Vec<(f64, usize)> = indices
            .iter()
            .map(|&i| (features[[i, feature]], labels[i]))
            .collect();
        ordered.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

        let mut left = [0usize; NUM_CLASSES];
        let mut right = counts;

        for i in 0..ordered.len() - 1 {
            let (value, label) = ordered[i];
            left[label] += 1;
            right[label] -= 1;

            let next_value = ordered[i + 1].0;
            if next_value <= value {
                continue;
            }

            let n_left = (i + 1) as f64;
            let weighted = (n_left * gini(&left) + (n - n_left) * gini(&right)) / n;
            if best.map_or(true, |(b, _, _)| weighted + IMPURITY_EPS < b) {
                best = Some((weighted, feature, (value + next_value) / 2.0));
            }
        }
    }

    match best {
        Some((weighted, feature, threshold)) if weighted + IMPURITY_EPS < parent_impurity => {
            let (left_idx, right_idx): (Vec<usize>, Vec<usize>) = indices
                .iter()
                .copied()
                .partition(|&i| features[[i, feature]] <= threshold);

            TreeNode::Split {
                feature,
                threshold,
                left: Box::new(build_node(features, labels, &left_idx)),
                right: Box::new(build_node(features, labels, &right_idx)),
            }
        }
        _ => leaf(counts),
    }
}
