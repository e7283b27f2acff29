pub mod config;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod utils;

pub use config::Config;
pub use pipeline::{PipelineStatus, RatingOutcome, RecommendationPipeline};
pub use services::{InMemoryRatingStore, RatingStore};
