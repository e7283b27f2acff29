use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

/// Lower-cased keywords derived from a user's liked videos and
/// subscriptions, used as the profile document for content matching.
pub type PersonalizationTags = BTreeSet<String>;

/// Raw video metadata as supplied by the candidate source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Video {
    pub id: String,
    pub title: String,
    pub description: String,
    pub channel_name: String,
    pub view_count: u64,
    pub like_count: u64,
    pub comment_count: u64,
    #[serde(default)]
    pub tags: Vec<String>,
    pub published_at: DateTime<Utc>,
}

impl Video {
    /// Canonical watch URL for this video.
    pub fn watch_url(&self) -> String {
        format!("https://www.youtube.com/watch?v={}", self.id)
    }
}

/// A manual like/dislike rating with the video metadata captured at rating
/// time, so history survives upstream metadata changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RatingRecord {
    pub video: Video,
    pub liked: bool,
    #[serde(default)]
    pub notes: String,
    pub rated_at: DateTime<Utc>,
}

/// One ranked recommendation entry.
///
/// The enhancement fields stay `None` until the corresponding
/// personalization stage has run for this entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredVideo {
    pub id: String,
    pub title: String,
    pub channel_name: String,
    pub view_count: u64,
    pub url: String,
    pub like_probability: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_similarity: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern_boost: Option<f32>,
}

impl ScoredVideo {
    /// Build an entry from candidate metadata and a like probability.
    pub fn from_video(video: &Video, like_probability: f32) -> Self {
        Self {
            id: video.id.clone(),
            title: video.title.clone(),
            channel_name: video.channel_name.clone(),
            view_count: video.view_count,
            url: video.watch_url(),
            like_probability,
            content_similarity: None,
            pattern_boost: None,
        }
    }
}

/// A channel subscription from the user's activity data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subscription {
    pub title: String,
    #[serde(default)]
    pub description: String,
}

/// Externally supplied YouTube activity used to derive personalization
/// inputs. Both collections may be empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserActivityData {
    #[serde(default)]
    pub liked_videos: Vec<Video>,
    #[serde(default)]
    pub subscriptions: Vec<Subscription>,
}

/// View-count preference bucket for engagement matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewBucket {
    Low,
    Moderate,
    High,
}

impl ViewBucket {
    /// Bucket a liked-history median. Boundaries are exclusive on the way
    /// up: a median of exactly 100,000 is still Low.
    pub fn from_median(median_views: f64) -> Self {
        if median_views > 1_000_000.0 {
            ViewBucket::High
        } else if median_views > 100_000.0 {
            ViewBucket::Moderate
        } else {
            ViewBucket::Low
        }
    }

    /// Whether a candidate's view count falls inside this bucket. The
    /// Moderate range is inclusive at both ends.
    pub fn matches(&self, view_count: u64) -> bool {
        match self {
            ViewBucket::Low => view_count < 100_000,
            ViewBucket::Moderate => (100_000..=1_000_000).contains(&view_count),
            ViewBucket::High => view_count > 1_000_000,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ViewBucket::Low => "low",
            ViewBucket::Moderate => "moderate",
            ViewBucket::High => "high",
        }
    }
}

/// Ephemeral engagement profile derived from a user's activity data.
/// Recomputed per request, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserEngagementProfile {
    pub popular_channels: HashSet<String>,
    pub view_count_bucket: ViewBucket,
    pub topic_affinities: HashSet<String>,
}
