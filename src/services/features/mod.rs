/// Video Feature Extraction
///
/// Pure transforms from raw video metadata into the fixed-shape numeric
/// summary consumed by the preference model. Extraction is deterministic
/// and side-effect free.
use crate::models::Video;
use crate::utils::contains_any;
use thiserror::Error;

// ============================================
// Keyword Lists
// ============================================

/// Keyword lists behind the boolean feature flags. All matching is
/// case-insensitive substring containment over the lowercased text.
const TUTORIAL_KEYWORDS: &[&str] = &["tutorial", "learn", "course", "guide", "how to"];
const TIME_CONSTRAINT_KEYWORDS: &[&str] =
    &["24 hours", "1 day", "1 hour", "minutes", "seconds", "crash course"];
const BEGINNER_KEYWORDS: &[&str] =
    &["beginner", "start", "basics", "introduction", "getting started"];
const AI_KEYWORDS: &[&str] = &["ai", "artificial intelligence", "machine learning", "neural network"];
const CHALLENGE_KEYWORDS: &[&str] = &["challenge", "build", "create", "project", "coding"];

/// Word lists for the title sentiment score. Each word counts once per
/// title regardless of repeats.
const POSITIVE_WORDS: &[&str] =
    &["amazing", "best", "awesome", "great", "perfect", "love", "incredible"];
const NEGATIVE_WORDS: &[&str] = &["hard", "difficult", "impossible", "failed", "broke", "wrong"];

#[derive(Debug, Error)]
pub enum FeatureError {
    #[error("video record has a blank id (title: {title:?})")]
    MissingId { title: String },
}

pub type Result<T> = std::result::Result<T, FeatureError>;

/// Fixed-shape feature summary of a single video.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoFeatures {
    pub title_length: usize,
    pub description_length: usize,
    pub view_like_ratio: f32,
    pub engagement_score: f32,
    pub title_sentiment: i32,
    pub has_tutorial_keywords: bool,
    pub has_time_constraint: bool,
    pub has_beginner_keywords: bool,
    pub has_ai_keywords: bool,
    pub has_challenge_keywords: bool,
}

impl VideoFeatures {
    /// Convert to the model input vector.
    ///
    /// Layout: [title_length, description_length, view_like_ratio,
    /// engagement_score, title_sentiment, tutorial, time_constraint,
    /// beginner, ai, challenge]
    pub fn to_vector(&self) -> Vec<f32> {
        vec![
            self.title_length as f32,
            self.description_length as f32,
            self.view_like_ratio,
            self.engagement_score,
            self.title_sentiment as f32,
            flag(self.has_tutorial_keywords),
            flag(self.has_time_constraint),
            flag(self.has_beginner_keywords),
            flag(self.has_ai_keywords),
            flag(self.has_challenge_keywords),
        ]
    }
}

fn flag(value: bool) -> f32 {
    if value {
        1.0
    } else {
        0.0
    }
}

/// Extract the feature summary for one video.
///
/// Empty titles and descriptions are valid inputs and produce zeroed text
/// features. A blank id is an upstream contract violation and fails for
/// this item alone. Zero view counts use a denominator of one so the
/// ratios stay finite.
pub fn extract_features(video: &Video) -> Result<VideoFeatures> {
    if video.id.trim().is_empty() {
        return Err(FeatureError::MissingId {
            title: video.title.clone(),
        });
    }

    let title = video.title.to_lowercase();
    let description = video.description.to_lowercase();
    let view_denominator = video.view_count.max(1) as f64;

    Ok(VideoFeatures {
        title_length: video.title.chars().count(),
        description_length: video.description.chars().count(),
        view_like_ratio: (video.like_count as f64 / view_denominator) as f32,
        // Cast per operand so the counter sum cannot overflow u64
        engagement_score: ((video.like_count as f64 + video.comment_count as f64)
            / view_denominator) as f32,
        title_sentiment: title_sentiment(&title),
        has_tutorial_keywords: contains_any(&title, TUTORIAL_KEYWORDS)
            || contains_any(&description, TUTORIAL_KEYWORDS),
        // Time-constraint and challenge markers only count in the title
        has_time_constraint: contains_any(&title, TIME_CONSTRAINT_KEYWORDS),
        has_beginner_keywords: contains_any(&title, BEGINNER_KEYWORDS)
            || contains_any(&description, BEGINNER_KEYWORDS),
        has_ai_keywords: contains_any(&title, AI_KEYWORDS)
            || contains_any(&description, AI_KEYWORDS),
        has_challenge_keywords: contains_any(&title, CHALLENGE_KEYWORDS),
    })
}

/// Positive-word hits minus negative-word hits over the lowercased title.
fn title_sentiment(title: &str) -> i32 {
    let positive = POSITIVE_WORDS.iter().filter(|word| title.contains(*word)).count() as i32;
    let negative = NEGATIVE_WORDS.iter().filter(|word| title.contains(*word)).count() as i32;
    positive - negative
}
