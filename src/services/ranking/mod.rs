/// Preference Ranking Module
///
/// Owns the trained-model lifecycle and the probability ranking of
/// candidate videos.
///
/// # Architecture
/// - **Model layer**: deterministic logistic regression over ndarray
/// - **Lifecycle layer**: threshold-gated retraining behind a shared lock
/// - **Scoring layer**: batch probability ranking with a popularity fallback
pub mod model;
pub mod scorer;
pub mod trainer;

pub use model::{PreferenceModel, FEATURE_VECTOR_SIZE};
pub use scorer::{rank_by_popularity, rank_candidates};
pub use trainer::{ClassifierState, ModelTrainer, SharedClassifierState, TrainingRow};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RankingError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Model training failed: {0}")]
    TrainingError(String),
}

pub type Result<T> = std::result::Result<T, RankingError>;
