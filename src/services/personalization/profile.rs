/// User Profile Builder
///
/// Derives the ephemeral personalization inputs, an engagement profile and
/// a tag set, from externally supplied activity data. Nothing here is
/// persisted; both derivations are recomputed per request.
use crate::models::{
    PersonalizationTags, UserActivityData, UserEngagementProfile, ViewBucket,
};
use crate::utils::{contains_any, median};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use tracing::info;

/// Subscription keywords that map to a topic affinity.
const TECH_AFFINITY_KEYWORDS: &[&str] =
    &["tech", "programming", "coding", "software", "development"];
const TUTORIAL_AFFINITY_KEYWORDS: &[&str] = &["tutorial", "learn", "course", "education"];

#[derive(Debug, Clone)]
pub struct ProfileBuilderConfig {
    /// Liked videos required before a channel counts as popular
    pub min_channel_likes: usize,
    /// Subscription-title words shorter than this are dropped from the tag set
    pub min_tag_length: usize,
}

impl Default for ProfileBuilderConfig {
    fn default() -> Self {
        Self {
            min_channel_likes: 2,
            min_tag_length: 3,
        }
    }
}

/// Builds engagement profiles and tag sets from activity data.
pub struct ProfileBuilder {
    config: ProfileBuilderConfig,
}

impl ProfileBuilder {
    pub fn new(config: ProfileBuilderConfig) -> Self {
        Self { config }
    }

    /// Build the engagement profile from liked videos and subscriptions.
    ///
    /// Empty activity produces an empty channel set, the Moderate bucket
    /// default and no affinities.
    pub fn build_profile(&self, activity: &UserActivityData) -> UserEngagementProfile {
        let mut channel_counts: HashMap<&str, usize> = HashMap::new();
        let mut view_counts: Vec<u64> = Vec::new();

        for video in &activity.liked_videos {
            if !video.channel_name.is_empty() {
                *channel_counts.entry(video.channel_name.as_str()).or_insert(0) += 1;
            }
            if video.view_count > 0 {
                view_counts.push(video.view_count);
            }
        }

        let popular_channels: HashSet<String> = channel_counts
            .into_iter()
            .filter(|(_, count)| *count >= self.config.min_channel_likes)
            .map(|(channel, _)| channel.to_string())
            .collect();

        // The bucket defaults to Moderate until liked history says otherwise
        let view_count_bucket = median(&view_counts)
            .map(ViewBucket::from_median)
            .unwrap_or(ViewBucket::Moderate);

        let mut topic_affinities = HashSet::new();
        for subscription in &activity.subscriptions {
            let title = subscription.title.to_lowercase();
            let description = subscription.description.to_lowercase();

            if contains_any(&title, TECH_AFFINITY_KEYWORDS)
                || contains_any(&description, TECH_AFFINITY_KEYWORDS)
            {
                topic_affinities.insert("tech".to_string());
            }
            if contains_any(&title, TUTORIAL_AFFINITY_KEYWORDS)
                || contains_any(&description, TUTORIAL_AFFINITY_KEYWORDS)
            {
                topic_affinities.insert("tutorial".to_string());
            }
        }

        info!(
            popular_channel_count = popular_channels.len(),
            view_count_bucket = view_count_bucket.as_str(),
            affinity_count = topic_affinities.len(),
            "Built engagement profile"
        );

        UserEngagementProfile {
            popular_channels,
            view_count_bucket,
            topic_affinities,
        }
    }

    /// Collect the lower-cased tag set used as the content-matching profile.
    ///
    /// Video tags are trimmed and lowercased; subscription titles are
    /// split into words with underscores and hyphens treated as spaces.
    pub fn collect_personalization_tags(&self, activity: &UserActivityData) -> PersonalizationTags {
        let mut tags = PersonalizationTags::new();

        for video in &activity.liked_videos {
            for tag in &video.tags {
                let tag = tag.trim();
                if !tag.is_empty() {
                    tags.insert(tag.to_lowercase());
                }
            }
        }

        for subscription in &activity.subscriptions {
            let normalized = subscription.title.to_lowercase().replace(['_', '-'], " ");
            for word in normalized.split_whitespace() {
                if word.len() >= self.config.min_tag_length {
                    tags.insert(word.to_string());
                }
            }
        }

        info!(tag_count = tags.len(), "Collected personalization tags");

        tags
    }

    /// Summarize the personalization inputs available for a user.
    pub fn stats(
        &self,
        activity: &UserActivityData,
        manual_rating_count: usize,
    ) -> PersonalizationStats {
        let profile = self.build_profile(activity);
        let tags = self.collect_personalization_tags(activity);

        let mut topic_affinities: Vec<String> = profile.topic_affinities.into_iter().collect();
        topic_affinities.sort();

        PersonalizationStats {
            liked_video_count: activity.liked_videos.len(),
            subscription_count: activity.subscriptions.len(),
            tag_count: tags.len(),
            popular_channel_count: profile.popular_channels.len(),
            topic_affinities,
            view_count_bucket: profile.view_count_bucket,
            manual_rating_count,
            enhancement_level: EnhancementLevel::from_counts(tags.len(), manual_rating_count),
        }
    }
}

impl Default for ProfileBuilder {
    fn default() -> Self {
        Self::new(ProfileBuilderConfig::default())
    }
}

/// How much signal is available for personalization.
#[derive(Debug, Clone, Serialize)]
pub struct PersonalizationStats {
    pub liked_video_count: usize,
    pub subscription_count: usize,
    pub tag_count: usize,
    pub popular_channel_count: usize,
    pub topic_affinities: Vec<String>,
    pub view_count_bucket: ViewBucket,
    pub manual_rating_count: usize,
    pub enhancement_level: EnhancementLevel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EnhancementLevel {
    Moderate,
    High,
}

impl EnhancementLevel {
    /// High needs both a rich tag set and enough manual ratings.
    pub fn from_counts(tag_count: usize, manual_rating_count: usize) -> Self {
        if tag_count > 20 && manual_rating_count > 10 {
            EnhancementLevel::High
        } else {
            EnhancementLevel::Moderate
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Subscription, Video};
    use chrono::Utc;

    fn liked(channel: &str, view_count: u64, tags: &[&str]) -> Video {
        Video {
            id: format!("{}-{}", channel, view_count),
            title: "a video".to_string(),
            description: String::new(),
            channel_name: channel.to_string(),
            view_count,
            like_count: 0,
            comment_count: 0,
            tags: tags.iter().map(|t| t.to_string()).collect(),
            published_at: Utc::now(),
        }
    }

    fn subscription(title: &str, description: &str) -> Subscription {
        Subscription {
            title: title.to_string(),
            description: description.to_string(),
        }
    }

    #[test]
    fn test_popular_channels_need_two_likes() {
        let activity = UserActivityData {
            liked_videos: vec![
                liked("Repeat", 1_000, &[]),
                liked("Repeat", 2_000, &[]),
                liked("Single", 3_000, &[]),
            ],
            subscriptions: vec![],
        };

        let profile = ProfileBuilder::default().build_profile(&activity);

        assert!(profile.popular_channels.contains("Repeat"));
        assert!(!profile.popular_channels.contains("Single"));
    }

    #[test]
    fn test_view_bucket_uses_median_with_strict_boundaries() {
        let builder = ProfileBuilder::default();

        let exactly_boundary = UserActivityData {
            liked_videos: vec![
                liked("A", 50_000, &[]),
                liked("B", 100_000, &[]),
                liked("C", 150_000, &[]),
            ],
            subscriptions: vec![],
        };
        // Median of exactly 100,000 stays Low
        assert_eq!(
            builder.build_profile(&exactly_boundary).view_count_bucket,
            ViewBucket::Low
        );

        let above_boundary = UserActivityData {
            liked_videos: vec![
                liked("A", 50_000, &[]),
                liked("B", 200_000, &[]),
                liked("C", 900_000, &[]),
            ],
            subscriptions: vec![],
        };
        assert_eq!(
            builder.build_profile(&above_boundary).view_count_bucket,
            ViewBucket::Moderate
        );

        let viral = UserActivityData {
            liked_videos: vec![
                liked("A", 2_000_000, &[]),
                liked("B", 3_000_000, &[]),
                liked("C", 5_000_000, &[]),
            ],
            subscriptions: vec![],
        };
        assert_eq!(
            builder.build_profile(&viral).view_count_bucket,
            ViewBucket::High
        );
    }

    #[test]
    fn test_empty_activity_defaults() {
        let profile = ProfileBuilder::default().build_profile(&UserActivityData::default());

        assert!(profile.popular_channels.is_empty());
        assert_eq!(profile.view_count_bucket, ViewBucket::Moderate);
        assert!(profile.topic_affinities.is_empty());
    }

    #[test]
    fn test_zero_view_likes_are_ignored_for_the_bucket() {
        let activity = UserActivityData {
            liked_videos: vec![
                liked("A", 0, &[]),
                liked("B", 0, &[]),
                liked("C", 2_000_000, &[]),
            ],
            subscriptions: vec![],
        };

        let profile = ProfileBuilder::default().build_profile(&activity);

        assert_eq!(profile.view_count_bucket, ViewBucket::High);
    }

    #[test]
    fn test_affinities_match_title_or_description() {
        let activity = UserActivityData {
            liked_videos: vec![],
            subscriptions: vec![
                subscription("Weekly Wrap", "deep dives into software development"),
                subscription("Learn Everything", ""),
            ],
        };

        let profile = ProfileBuilder::default().build_profile(&activity);

        assert!(profile.topic_affinities.contains("tech"));
        assert!(profile.topic_affinities.contains("tutorial"));
    }

    #[test]
    fn test_tags_are_trimmed_and_lowercased() {
        let activity = UserActivityData {
            liked_videos: vec![liked("A", 100, &["  Rust  ", "WebDev", "", "  "])],
            subscriptions: vec![],
        };

        let tags = ProfileBuilder::default().collect_personalization_tags(&activity);

        assert!(tags.contains("rust"));
        assert!(tags.contains("webdev"));
        assert_eq!(tags.len(), 2);
    }

    #[test]
    fn test_subscription_titles_split_into_words() {
        let activity = UserActivityData {
            liked_videos: vec![],
            subscriptions: vec![subscription("Rust_Weekly-News by GG", "")],
        };

        let tags = ProfileBuilder::default().collect_personalization_tags(&activity);

        assert!(tags.contains("rust"));
        assert!(tags.contains("weekly"));
        assert!(tags.contains("news"));
        // Two-character words fall below the length floor
        assert!(!tags.contains("by"));
        assert!(!tags.contains("gg"));
    }

    #[test]
    fn test_enhancement_level_boundaries() {
        assert_eq!(
            EnhancementLevel::from_counts(20, 11),
            EnhancementLevel::Moderate
        );
        assert_eq!(
            EnhancementLevel::from_counts(21, 10),
            EnhancementLevel::Moderate
        );
        assert_eq!(EnhancementLevel::from_counts(21, 11), EnhancementLevel::High);
    }

    #[test]
    fn test_stats_summarize_activity() {
        let activity = UserActivityData {
            liked_videos: vec![
                liked("Repeat", 500_000, &["rust", "async"]),
                liked("Repeat", 600_000, &["tokio"]),
            ],
            subscriptions: vec![subscription("Tech Programming Weekly", "")],
        };

        let stats = ProfileBuilder::default().stats(&activity, 4);

        assert_eq!(stats.liked_video_count, 2);
        assert_eq!(stats.subscription_count, 1);
        assert_eq!(stats.popular_channel_count, 1);
        assert_eq!(stats.manual_rating_count, 4);
        assert_eq!(stats.topic_affinities, vec!["tech".to_string()]);
        assert_eq!(stats.view_count_bucket, ViewBucket::Moderate);
        assert_eq!(stats.enhancement_level, EnhancementLevel::Moderate);
    }
}
