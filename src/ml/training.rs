//! Training and the trained-model artifact
//!
//! Splits the uploaded dataset 80/20 with a fixed seed, fits the decision
//! tree on the training partition, and evaluates on the held-out rows.
//! The fixed seed is a determinism contract: training twice on the same
//! data must report identical metrics.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use chrono::{DateTime, Utc};
use ndarray::Axis;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::dataset::{Dataset, DatasetError, FEATURE_COLUMNS};

use super::metrics::{accuracy, f1_score, Metrics};
use super::tree::DecisionTree;

pub const TRAIN_SEED: u64 = 42;
pub const TEST_RATIO: f64 = 0.2;

#[derive(Debug, Error)]
pub enum TrainError {
    #[error("dataset has too few rows to hold out an evaluation split")]
    TooFewRows,

    #[error(transparent)]
    Dataset(#[from] DatasetError),
}

/// The fitted classifier plus the metadata persisted alongside it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainedModel {
    pub tree: DecisionTree,
    pub feature_columns: Vec<String>,
    pub trained_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy)]
pub struct Prediction {
    pub downtime: bool,
    /// Maximum class probability at the reached leaf.
    pub confidence: f64,
}

impl TrainedModel {
    pub fn predict(&self, features: &[f64]) -> Prediction {
        let input = ndarray::arr1(features);
        let proba = self.tree.predict_proba(input.view());
        let class = self.tree.predict(input.view());
        Prediction {
            downtime: class == 1,
            confidence: proba[class],
        }
    }

    /// Overwrite the on-disk model file. The file is write-only state; the
    /// in-memory slot serves predictions.
    pub fn save(&self, path: &Path) -> io::Result<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer(&mut writer, self)?;
        writer.flush()?;
        Ok(())
    }
}

/// Fit a classifier on the dataset and evaluate it on the held-out split.
pub fn train(dataset: &Dataset) -> Result<(TrainedModel, Metrics), TrainError> {
    let (features, labels) = dataset.features_and_labels()?;
    let (train_idx, test_idx) = split_indices(labels.len(), TEST_RATIO, TRAIN_SEED)?;

    let x_train = features.select(Axis(0), &train_idx);
    let y_train: Vec<usize> = train_idx.iter().map(|&i| labels[i]).collect();
    let tree = DecisionTree::fit(&x_train, &y_train);

    let y_test: Vec<usize> = test_idx.iter().map(|&i| labels[i]).collect();
    let y_pred: Vec<usize> = test_idx.iter().map(|&i| tree.predict(features.row(i))).collect();

    let metrics = Metrics {
        accuracy: accuracy(&y_test, &y_pred),
        f1_score: f1_score(&y_test, &y_pred),
    };

    let model = TrainedModel {
        tree,
        feature_columns: FEATURE_COLUMNS.iter().map(|c| c.to_string()).collect(),
        trained_at: Utc::now(),
    };

    Ok((model, metrics))
}

/// Shuffle `0..n` with the fixed seed and carve off the test partition.
fn split_indices(n: usize, test_ratio: f64, seed: u64) -> Result<(Vec<usize>, Vec<usize>), TrainError> {
    let n_test = ((n as f64) * test_ratio).ceil() as usize;
    if n_test == 0 || n_test >= n {
        return Err(TrainError::TooFewRows);
    }

    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let test = indices.split_off(n - n_test);
    Ok((indices, test))
}
