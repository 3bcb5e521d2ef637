//! Shared application state

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::config::Config;
use crate::dataset::Dataset;
use crate::ml::training::TrainedModel;

/// The upload -> train -> predict progression, encoded as a tagged state
/// instead of two independently nullable slots. A single lock guards the
/// whole pipeline so a predict can never observe a half-replaced model.
#[derive(Debug, Default)]
pub enum Pipeline {
    #[default]
    Empty,
    DataLoaded {
        dataset: Dataset,
    },
    ModelTrained {
        dataset: Dataset,
        model: TrainedModel,
    },
}

impl Pipeline {
    pub fn dataset(&self) -> Option<&Dataset> {
        match self {
            Pipeline::Empty => None,
            Pipeline::DataLoaded { dataset } | Pipeline::ModelTrained { dataset, .. } => {
                Some(dataset)
            }
        }
    }

    pub fn model(&self) -> Option<&TrainedModel> {
        match self {
            Pipeline::ModelTrained { model, .. } => Some(model),
            _ => None,
        }
    }

    /// A fresh upload replaces the dataset and discards any model fit on
    /// the previous one.
    pub fn load_dataset(&mut self, dataset: Dataset) {
        *self = Pipeline::DataLoaded { dataset };
    }

    /// Attach a trained model to the current dataset. No-op while no
    /// dataset is loaded; the train handler checks for one first.
    pub fn install_model(&mut self, model: TrainedModel) {
        *self = match std::mem::take(self) {
            Pipeline::Empty => Pipeline::Empty,
            Pipeline::DataLoaded { dataset } | Pipeline::ModelTrained { dataset, .. } => {
                Pipeline::ModelTrained { dataset, model }
            }
        };
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub pipeline: Arc<RwLock<Pipeline>>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            pipeline: Arc::new(RwLock::new(Pipeline::Empty)),
        }
    }
}
