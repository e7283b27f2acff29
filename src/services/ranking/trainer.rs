/// Classifier Lifecycle
///
/// Holds the shared trained/untrained state and applies the threshold-gated
/// retraining policy over the accumulated rating history.
use super::model::{PreferenceModel, FEATURE_VECTOR_SIZE};
use super::{RankingError, Result};
use crate::config::TrainingConfig;
use crate::services::features::VideoFeatures;
use chrono::{DateTime, Utc};
use ndarray::{Array1, Array2};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// One labeled training example: extracted features joined with the rating.
#[derive(Debug, Clone)]
pub struct TrainingRow {
    pub features: VideoFeatures,
    pub liked: bool,
}

/// Shared, lock-guarded classifier state.
///
/// Predictions hold the read half for the duration of a scoring pass and
/// training swaps the model under the write half, so readers never observe
/// a half-updated model.
pub type SharedClassifierState = Arc<RwLock<ClassifierState>>;

/// Trained/untrained classifier state.
///
/// The transition is one-way: once a fit succeeds, the fitted model keeps
/// serving through later skipped or failed retrains.
#[derive(Debug, Default)]
pub struct ClassifierState {
    pub model: Option<PreferenceModel>,
    pub trained_on_count: usize,
    pub trained_at: Option<DateTime<Utc>>,
}

impl ClassifierState {
    pub fn untrained() -> SharedClassifierState {
        Arc::new(RwLock::new(Self::default()))
    }

    pub fn is_trained(&self) -> bool {
        self.model.is_some()
    }
}

/// Applies the retraining policy against a shared classifier state.
pub struct ModelTrainer {
    state: SharedClassifierState,
    config: TrainingConfig,
}

impl ModelTrainer {
    pub fn new(state: SharedClassifierState, config: TrainingConfig) -> Self {
        Self { state, config }
    }

    /// Retrain from scratch when enough rated rows exist.
    ///
    /// Returns whether a fresh model was fitted and installed. Below the
    /// minimum the call is a no-op returning false. A failed fit also
    /// returns false and leaves the prior state untouched.
    pub async fn train_if_ready(&self, rows: &[TrainingRow]) -> bool {
        if rows.len() < self.config.min_ratings {
            debug!(
                row_count = rows.len(),
                min_ratings = self.config.min_ratings,
                "Skipping training, not enough rated videos"
            );
            return false;
        }

        let (features, labels) = match build_training_matrices(rows) {
            Ok(matrices) => matrices,
            Err(e) => {
                warn!(error = %e, "Could not assemble training matrices");
                return false;
            }
        };

        match PreferenceModel::fit(
            &features,
            &labels,
            self.config.learning_rate,
            self.config.epochs,
        ) {
            Ok(model) => {
                let mut state = self.state.write().await;
                state.model = Some(model);
                state.trained_on_count = rows.len();
                state.trained_at = Some(Utc::now());

                info!(row_count = rows.len(), "Preference model trained");
                true
            }
            Err(e) => {
                warn!(error = %e, "Training failed, keeping previously fitted model");
                false
            }
        }
    }
}

fn build_training_matrices(rows: &[TrainingRow]) -> Result<(Array2<f32>, Array1<f32>)> {
    let values: Vec<f32> = rows
        .iter()
        .flat_map(|row| row.features.to_vector())
        .collect();

    let features = Array2::from_shape_vec((rows.len(), FEATURE_VECTOR_SIZE), values)
        .map_err(|e| RankingError::InvalidInput(format!("Failed to build training matrix: {}", e)))?;

    let labels = Array1::from_iter(rows.iter().map(|row| if row.liked { 1.0 } else { 0.0 }));

    Ok((features, labels))
}
