/// Preference Model
///
/// Binary logistic regression fitted in-process on the user's rating
/// history. Weights start at zero and descend the full-batch gradient, so
/// refitting on identical rows reproduces the exact same parameters.
use super::{RankingError, Result};
use ndarray::{Array1, Array2};
use tracing::debug;

/// Feature vector size (text metrics + engagement ratios + keyword flags)
/// - Text: 2 features (title_length, description_length)
/// - Engagement: 2 features (view_like_ratio, engagement_score)
/// - Sentiment: 1 feature (title_sentiment)
/// - Keywords: 5 flags (tutorial, time_constraint, beginner, ai, challenge)
pub const FEATURE_VECTOR_SIZE: usize = 10;

/// Fitted classifier mapping feature vectors to like probabilities.
///
/// Standardization moments are captured at fit time and re-applied to every
/// prediction batch.
#[derive(Debug, Clone)]
pub struct PreferenceModel {
    weights: Array1<f32>,
    bias: f32,
    means: Array1<f32>,
    stds: Array1<f32>,
}

impl PreferenceModel {
    /// Fit a fresh model on the full training set.
    ///
    /// `features` is (sample_count x FEATURE_VECTOR_SIZE) and `labels`
    /// holds 0.0 or 1.0 per row.
    pub fn fit(
        features: &Array2<f32>,
        labels: &Array1<f32>,
        learning_rate: f32,
        epochs: usize,
    ) -> Result<Self> {
        let sample_count = features.shape()[0];

        if features.shape()[1] != FEATURE_VECTOR_SIZE {
            return Err(RankingError::InvalidInput(format!(
                "Expected {} features, got {}",
                FEATURE_VECTOR_SIZE,
                features.shape()[1]
            )));
        }

        if labels.len() != sample_count {
            return Err(RankingError::InvalidInput(format!(
                "Expected {} labels, got {}",
                sample_count,
                labels.len()
            )));
        }

        if sample_count == 0 {
            return Err(RankingError::InvalidInput(
                "Training set is empty".to_string(),
            ));
        }

        let (means, stds) = feature_moments(features);
        let standardized = standardize(features, &means, &stds);

        let mut weights = Array1::<f32>::zeros(FEATURE_VECTOR_SIZE);
        let mut bias = 0.0f32;

        for _ in 0..epochs {
            let mut weight_gradient = Array1::<f32>::zeros(FEATURE_VECTOR_SIZE);
            let mut bias_gradient = 0.0f32;

            for i in 0..sample_count {
                let row = standardized.row(i);
                let z = row.dot(&weights) + bias;
                let error = sigmoid(z) - labels[i];

                for j in 0..FEATURE_VECTOR_SIZE {
                    weight_gradient[j] += error * row[j];
                }
                bias_gradient += error;
            }

            let step = learning_rate / sample_count as f32;
            for j in 0..FEATURE_VECTOR_SIZE {
                weights[j] -= step * weight_gradient[j];
            }
            bias -= step * bias_gradient;
        }

        if weights.iter().any(|w| !w.is_finite()) || !bias.is_finite() {
            return Err(RankingError::TrainingError(
                "Gradient descent produced non-finite parameters".to_string(),
            ));
        }

        debug!(sample_count, epochs, "Fitted preference model");

        Ok(Self {
            weights,
            bias,
            means,
            stds,
        })
    }

    /// Predict liked-class probabilities for a batch of feature vectors.
    ///
    /// # Arguments
    /// * `features` - 2D array (batch_size x FEATURE_VECTOR_SIZE)
    pub fn predict_probability(&self, features: &Array2<f32>) -> Result<Array1<f32>> {
        if features.shape()[1] != FEATURE_VECTOR_SIZE {
            return Err(RankingError::InvalidInput(format!(
                "Expected {} features, got {}",
                FEATURE_VECTOR_SIZE,
                features.shape()[1]
            )));
        }

        let standardized = standardize(features, &self.means, &self.stds);
        let batch_size = standardized.shape()[0];
        let mut probabilities = Array1::zeros(batch_size);

        for i in 0..batch_size {
            let z = standardized.row(i).dot(&self.weights) + self.bias;
            probabilities[i] = sigmoid(z);
        }

        Ok(probabilities)
    }
}

/// Per-column mean and standard deviation, accumulated in f64 so squared
/// raw view counts cannot overflow the f32 range.
fn feature_moments(features: &Array2<f32>) -> (Array1<f32>, Array1<f32>) {
    let rows = features.shape()[0];
    let cols = features.shape()[1];
    let mut means = Array1::zeros(cols);
    let mut stds = Array1::zeros(cols);

    for j in 0..cols {
        let mut sum = 0.0f64;
        for i in 0..rows {
            sum += features[[i, j]] as f64;
        }
        let mean = sum / rows as f64;

        let mut variance = 0.0f64;
        for i in 0..rows {
            let delta = features[[i, j]] as f64 - mean;
            variance += delta * delta;
        }
        variance /= rows as f64;

        means[j] = mean as f32;
        // Constant columns fall back to unit scale instead of dividing by zero
        stds[j] = if variance > f64::EPSILON {
            variance.sqrt() as f32
        } else {
            1.0
        };
    }

    (means, stds)
}

fn standardize(features: &Array2<f32>, means: &Array1<f32>, stds: &Array1<f32>) -> Array2<f32> {
    let mut standardized = features.clone();

    for j in 0..features.shape()[1] {
        for i in 0..features.shape()[0] {
            standardized[[i, j]] = (features[[i, j]] - means[j]) / stds[j];
        }
    }

    standardized
}

/// Logistic function with the exponent clamped for numeric stability.
fn sigmoid(z: f32) -> f32 {
    1.0 / (1.0 + (-z.clamp(-30.0, 30.0)).exp())
}
