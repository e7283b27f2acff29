/// Personalization Enhancement
///
/// Optional re-scoring stages layered on top of the base ranking when
/// richer user signals are available:
/// 1. Content similarity: TF-IDF match between a tag profile and candidate text
/// 2. Engagement patterns: channel, view-bucket and topic boosts from liked history
///
/// Each stage is a pure transform over the scored list. A stage whose
/// inputs are missing is skipped, and a stage that fails logs the reason
/// and passes its input through unchanged; enhancement never aborts the
/// overall ranking.
pub mod content_matcher;
pub mod pattern_booster;
pub mod profile;

pub use content_matcher::enhance_with_content_similarity;
pub use pattern_booster::{apply_engagement_patterns, MAX_PATTERN_BOOST};
pub use profile::{EnhancementLevel, PersonalizationStats, ProfileBuilder, ProfileBuilderConfig};

use crate::models::{PersonalizationTags, ScoredVideo, UserEngagementProfile, Video};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersonalizationError {
    #[error("No candidate metadata available for the scored entries")]
    MissingMetadata,

    #[error("TF-IDF vocabulary is empty after tokenization")]
    EmptyVocabulary,
}

pub type Result<T> = std::result::Result<T, PersonalizationError>;

/// Apply both enhancement stages in order.
///
/// Content matching runs only with a non-empty tag set, pattern boosting
/// only with a profile. `metadata` is the candidate pool the scored
/// entries were drawn from.
pub fn personalize(
    scored: Vec<ScoredVideo>,
    tags: Option<&PersonalizationTags>,
    profile: Option<&UserEngagementProfile>,
    metadata: &[Video],
) -> Vec<ScoredVideo> {
    let scored = match tags {
        Some(tags) if !tags.is_empty() => enhance_with_content_similarity(scored, tags, metadata),
        _ => scored,
    };

    match profile {
        Some(profile) => apply_engagement_patterns(scored, profile),
        None => scored,
    }
}
