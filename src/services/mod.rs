pub mod features;
pub mod history;
pub mod personalization;
pub mod ranking;

pub use history::{InMemoryRatingStore, RatingStore};
pub use personalization::ProfileBuilder;
pub use ranking::{ModelTrainer, PreferenceModel};
