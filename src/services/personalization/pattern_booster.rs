/// Engagement Pattern Boosting
///
/// Applies multiplicative boosts to like probabilities when a candidate
/// lines up with the user's channel, view-count and topic patterns, then
/// re-sorts the list.
use crate::models::{ScoredVideo, UserEngagementProfile};
use crate::utils::contains_any;
use tracing::debug;

/// Ceiling for the combined multiplicative boost.
pub const MAX_PATTERN_BOOST: f32 = 1.5;

const CHANNEL_BOOST: f32 = 1.2;
const VIEW_BUCKET_BOOST: f32 = 1.1;
const TOPIC_BOOST: f32 = 1.15;

/// Title keywords that pair with the corresponding topic affinity.
const TECH_TITLE_KEYWORDS: &[&str] = &["programming", "coding", "tech", "software"];
const TUTORIAL_TITLE_KEYWORDS: &[&str] = &["tutorial", "learn", "guide", "how to"];

/// Boost and re-sort the scored list against an engagement profile.
///
/// Boosted probabilities are capped at 1.0 and every entry records the
/// boost that was applied to it.
pub fn apply_engagement_patterns(
    scored: Vec<ScoredVideo>,
    profile: &UserEngagementProfile,
) -> Vec<ScoredVideo> {
    if scored.is_empty() {
        return scored;
    }

    let mut boosted = scored;
    for entry in &mut boosted {
        let boost = pattern_boost(entry, profile);
        entry.like_probability = (entry.like_probability * boost).min(1.0);
        entry.pattern_boost = Some(boost);
    }

    boosted.sort_by(|a, b| {
        b.like_probability
            .partial_cmp(&a.like_probability)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    debug!(entry_count = boosted.len(), "Applied engagement pattern boosts");

    boosted
}

/// Multiplicative boost for one candidate, capped at MAX_PATTERN_BOOST.
///
/// Topic boosts are compound: the affinity must be present in the profile
/// and the title must carry a matching keyword.
pub fn pattern_boost(entry: &ScoredVideo, profile: &UserEngagementProfile) -> f32 {
    let mut boost = 1.0f32;

    if profile.popular_channels.contains(&entry.channel_name) {
        boost *= CHANNEL_BOOST;
    }

    if profile.view_count_bucket.matches(entry.view_count) {
        boost *= VIEW_BUCKET_BOOST;
    }

    let title = entry.title.to_lowercase();
    if profile.topic_affinities.contains("tech") && contains_any(&title, TECH_TITLE_KEYWORDS) {
        boost *= TOPIC_BOOST;
    }
    if profile.topic_affinities.contains("tutorial")
        && contains_any(&title, TUTORIAL_TITLE_KEYWORDS)
    {
        boost *= TOPIC_BOOST;
    }

    boost.min(MAX_PATTERN_BOOST)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ViewBucket;
    use std::collections::HashSet;

    fn create_test_profile() -> UserEngagementProfile {
        UserEngagementProfile {
            popular_channels: ["Acme Dev".to_string()].into_iter().collect(),
            view_count_bucket: ViewBucket::Moderate,
            topic_affinities: ["tech".to_string(), "tutorial".to_string()]
                .into_iter()
                .collect(),
        }
    }

    fn entry(channel: &str, title: &str, view_count: u64, like_probability: f32) -> ScoredVideo {
        ScoredVideo {
            id: format!("{}-{}", channel, view_count),
            title: title.to_string(),
            channel_name: channel.to_string(),
            view_count,
            url: String::new(),
            like_probability,
            content_similarity: None,
            pattern_boost: None,
        }
    }

    #[test]
    fn test_combined_boost_is_capped() {
        let profile = create_test_profile();
        // Channel, bucket and tech topic all match: raw product is 1.518
        let candidate = entry("Acme Dev", "Intro to Programming", 500_000, 0.5);

        let boost = pattern_boost(&candidate, &profile);

        assert!((boost - MAX_PATTERN_BOOST).abs() < 1e-6);
    }

    #[test]
    fn test_channel_match_alone() {
        let profile = create_test_profile();
        let candidate = entry("Acme Dev", "quarterly vlog", 5_000_000, 0.5);

        let boost = pattern_boost(&candidate, &profile);

        assert!((boost - 1.2).abs() < 1e-6);
    }

    #[test]
    fn test_view_bucket_match_alone() {
        let profile = create_test_profile();
        let candidate = entry("Other", "quarterly vlog", 500_000, 0.5);

        assert!((pattern_boost(&candidate, &profile) - 1.1).abs() < 1e-6);
    }

    #[test]
    fn test_topic_boost_needs_both_affinity_and_title_keyword() {
        let mut profile = create_test_profile();
        let candidate = entry("Other", "Rust tutorial", 5_000_000, 0.5);

        // Affinity present and keyword present
        assert!((pattern_boost(&candidate, &profile) - 1.15).abs() < 1e-6);

        // Keyword present but affinity removed
        profile.topic_affinities = HashSet::new();
        assert!((pattern_boost(&candidate, &profile) - 1.0).abs() < 1e-6);

        // Affinity present but no keyword in the title
        let profile = create_test_profile();
        let plain = entry("Other", "quarterly vlog", 5_000_000, 0.5);
        assert!((pattern_boost(&plain, &profile) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_both_topic_boosts_stack() {
        let profile = create_test_profile();
        let candidate = entry("Other", "Programming tutorial", 5_000_000, 0.5);

        // 1.15 * 1.15, no channel or bucket match
        assert!((pattern_boost(&candidate, &profile) - 1.3225).abs() < 1e-4);
    }

    #[test]
    fn test_boost_never_exceeds_cap() {
        let profile = create_test_profile();
        let titles = [
            "plain upload",
            "Programming deep dive",
            "Rust tutorial",
            "Programming tutorial for everyone",
        ];
        let channels = ["Acme Dev", "Other"];
        let view_counts = [50_000u64, 500_000, 5_000_000];

        for title in titles {
            for channel in channels {
                for view_count in view_counts {
                    let candidate = entry(channel, title, view_count, 0.9);
                    assert!(pattern_boost(&candidate, &profile) <= MAX_PATTERN_BOOST + 1e-6);
                }
            }
        }
    }

    #[test]
    fn test_boosted_probability_is_capped_at_one() {
        let profile = create_test_profile();
        let candidate = entry("Acme Dev", "Programming tutorial", 500_000, 0.95);

        let boosted = apply_engagement_patterns(vec![candidate], &profile);

        assert!((boosted[0].like_probability - 1.0).abs() < 1e-6);
        assert!((boosted[0].pattern_boost.unwrap() - MAX_PATTERN_BOOST).abs() < 1e-6);
    }

    #[test]
    fn test_boosting_resorts_the_list() {
        let profile = create_test_profile();
        let leader = entry("Other", "plain upload", 5_000_000, 0.6);
        let boosted_entry = entry("Acme Dev", "Programming tutorial", 500_000, 0.55);

        let result = apply_engagement_patterns(vec![leader, boosted_entry], &profile);

        // 0.55 * 1.5 = 0.825 beats the unboosted 0.6
        assert_eq!(result[0].channel_name, "Acme Dev");
        assert!((result[0].like_probability - 0.825).abs() < 1e-5);
        assert!((result[1].pattern_boost.unwrap() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_every_entry_records_its_boost() {
        let profile = create_test_profile();
        let entries = vec![
            entry("Acme Dev", "one", 10, 0.5),
            entry("Other", "two", 20, 0.5),
        ];

        let result = apply_engagement_patterns(entries, &profile);

        assert!(result.iter().all(|e| e.pattern_boost.is_some()));
    }
}
