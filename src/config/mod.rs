use serde::Deserialize;
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub training: TrainingConfig,
    pub recommendation: RecommendationConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TrainingConfig {
    /// Rated videos required before a model is fitted
    pub min_ratings: usize,
    pub learning_rate: f32,
    pub epochs: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecommendationConfig {
    /// Entries returned by the default recommendation surface
    pub default_limit: usize,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            min_ratings: 10,
            learning_rate: 0.1,
            epochs: 300,
        }
    }
}

impl Default for RecommendationConfig {
    fn default() -> Self {
        Self { default_limit: 12 }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            training: TrainingConfig::default(),
            recommendation: RecommendationConfig::default(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();

        Ok(Config {
            training: TrainingConfig {
                min_ratings: env::var("TRAINING_MIN_RATINGS")
                    .unwrap_or_else(|_| "10".to_string())
                    .parse()
                    .expect("TRAINING_MIN_RATINGS must be a valid number"),
                learning_rate: env::var("TRAINING_LEARNING_RATE")
                    .unwrap_or_else(|_| "0.1".to_string())
                    .parse()
                    .expect("TRAINING_LEARNING_RATE must be a valid number"),
                epochs: env::var("TRAINING_EPOCHS")
                    .unwrap_or_else(|_| "300".to_string())
                    .parse()
                    .expect("TRAINING_EPOCHS must be a valid number"),
            },
            recommendation: RecommendationConfig {
                default_limit: env::var("RECOMMENDATION_DEFAULT_LIMIT")
                    .unwrap_or_else(|_| "12".to_string())
                    .parse()
                    .expect("RECOMMENDATION_DEFAULT_LIMIT must be a valid number"),
            },
        })
    }
}
