/// Recommendation Pipeline
///
/// Sequences feature extraction, classifier lifecycle, ranking and
/// personalization, and converts internal stage failures into fallback
/// behavior. External surfaces call this and nothing below it.
use crate::config::Config;
use crate::models::{RatingRecord, ScoredVideo, UserActivityData, Video};
use crate::services::features::extract_features;
use crate::services::history::{RatingStore, StoreError};
use crate::services::personalization::{
    personalize, PersonalizationStats, ProfileBuilder, ProfileBuilderConfig,
};
use crate::services::ranking::{
    rank_by_popularity, rank_candidates, ClassifierState, ModelTrainer, SharedClassifierState,
    TrainingRow,
};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Probability attached to liked-history entries while the model is
/// untrained.
const UNTRAINED_LIKED_PROBABILITY: f32 = 0.8;

/// Base ranking window handed to enhancement, relative to the requested
/// list size.
const ENHANCEMENT_WINDOW_FACTOR: usize = 2;

/// Outcome of a rating mutation.
#[derive(Debug, Clone, Copy)]
pub struct RatingOutcome {
    pub retrained: bool,
    pub total_ratings: usize,
}

/// Snapshot of pipeline state for status surfaces.
#[derive(Debug, Clone)]
pub struct PipelineStatus {
    pub model_trained: bool,
    pub trained_on_count: usize,
    pub trained_at: Option<DateTime<Utc>>,
    pub total_ratings: usize,
}

pub struct RecommendationPipeline {
    store: Arc<dyn RatingStore>,
    state: SharedClassifierState,
    trainer: ModelTrainer,
    profile_builder: ProfileBuilder,
    config: Config,
}

impl RecommendationPipeline {
    pub fn new(store: Arc<dyn RatingStore>, config: Config) -> Self {
        let state = ClassifierState::untrained();
        let trainer = ModelTrainer::new(Arc::clone(&state), config.training.clone());

        Self {
            store,
            state,
            trainer,
            profile_builder: ProfileBuilder::new(ProfileBuilderConfig::default()),
            config,
        }
    }

    /// Replay the stored rating history and train when enough rows exist.
    ///
    /// Called once at process start. Returns whether a model was fitted.
    pub async fn startup(&self) -> bool {
        let rows = self.training_rows().await;
        let trained = self.trainer.train_if_ready(&rows).await;

        info!(
            rated_count = rows.len(),
            model_trained = trained,
            "Pipeline started"
        );

        trained
    }

    /// Record a rating and retrain on the updated history.
    pub async fn record_rating(
        &self,
        video: Video,
        liked: bool,
        notes: impl Into<String>,
    ) -> Result<RatingOutcome, StoreError> {
        let video_id = video.id.clone();

        self.store
            .add_rating(RatingRecord {
                video,
                liked,
                notes: notes.into(),
                rated_at: Utc::now(),
            })
            .await?;

        debug!(video_id = %video_id, liked, "Recorded rating");

        self.retrain_outcome().await
    }

    /// Remove the rating for a video and retrain on the shrunken history.
    ///
    /// Dropping below the training threshold skips the retrain and keeps
    /// the previously fitted model serving.
    pub async fn remove_rating(&self, video_id: &str) -> Result<RatingOutcome, StoreError> {
        let removed = self.store.remove_rating(video_id).await?;
        if !removed {
            debug!(video_id = %video_id, "No rating to remove");
        }

        self.retrain_outcome().await
    }

    async fn retrain_outcome(&self) -> Result<RatingOutcome, StoreError> {
        let rows = self.training_rows().await;
        let retrained = self.trainer.train_if_ready(&rows).await;
        let total_ratings = self.store.rated_count().await?;

        Ok(RatingOutcome {
            retrained,
            total_ratings,
        })
    }

    /// Rank unrated candidates, capped at the configured default limit.
    ///
    /// Model errors degrade to the popularity fallback, so a request
    /// always gets a list.
    pub async fn recommend(&self, candidates: &[Video]) -> Vec<ScoredVideo> {
        self.rank(candidates, self.config.recommendation.default_limit)
            .await
    }

    async fn rank(&self, candidates: &[Video], top_n: usize) -> Vec<ScoredVideo> {
        let request_id = Uuid::new_v4();
        let state = self.state.read().await;

        debug!(
            request_id = %request_id,
            candidate_count = candidates.len(),
            model_trained = state.is_trained(),
            "Ranking candidates"
        );

        match rank_candidates(state.model.as_ref(), candidates, top_n) {
            Ok(scored) => scored,
            Err(e) => {
                warn!(
                    request_id = %request_id,
                    error = %e,
                    "Ranking failed, serving popularity fallback"
                );
                rank_by_popularity(candidates, top_n)
            }
        }
    }

    /// Rank and enhance with whatever personalization inputs are available.
    ///
    /// The base ranking selects a window of twice the requested size;
    /// enhancement re-orders inside that window and the final list is cut
    /// to `top_n`. Without activity data this is plain ranking.
    pub async fn recommend_personalized(
        &self,
        candidates: &[Video],
        activity: Option<&UserActivityData>,
        top_n: usize,
    ) -> Vec<ScoredVideo> {
        let window = top_n.saturating_mul(ENHANCEMENT_WINDOW_FACTOR);
        let scored = self.rank(candidates, window).await;

        let (tags, profile) = match activity {
            Some(activity) => (
                Some(self.profile_builder.collect_personalization_tags(activity)),
                Some(self.profile_builder.build_profile(activity)),
            ),
            None => (None, None),
        };

        let mut enhanced = personalize(scored, tags.as_ref(), profile.as_ref(), candidates);
        enhanced.truncate(top_n);

        debug!(
            candidate_count = candidates.len(),
            entry_count = enhanced.len(),
            personalized = activity.is_some(),
            "Built personalized recommendations"
        );

        enhanced
    }

    /// Liked history with model confidence attached, most confident first.
    ///
    /// While untrained, entries keep view-count order and a flat
    /// confidence. A store failure degrades to an empty list.
    pub async fn liked_videos_ranked(&self) -> Vec<ScoredVideo> {
        let mut liked = match self.store.liked_videos().await {
            Ok(liked) => liked,
            Err(e) => {
                warn!(error = %e, "Could not load liked videos");
                return vec![];
            }
        };

        liked.sort_by(|a, b| b.view_count.cmp(&a.view_count));

        let state = self.state.read().await;
        match state.model.as_ref() {
            Some(model) => match rank_candidates(Some(model), &liked, liked.len()) {
                Ok(scored) => scored,
                Err(e) => {
                    warn!(error = %e, "Could not score liked videos, using flat confidence");
                    flat_confidence(&liked)
                }
            },
            None => flat_confidence(&liked),
        }
    }

    /// Summarize the personalization signal available for a user.
    pub async fn personalization_stats(
        &self,
        activity: &UserActivityData,
    ) -> PersonalizationStats {
        let manual_rating_count = match self.store.rated_count().await {
            Ok(count) => count,
            Err(e) => {
                warn!(error = %e, "Could not count ratings");
                0
            }
        };

        self.profile_builder.stats(activity, manual_rating_count)
    }

    /// Current pipeline state for health and dashboard surfaces.
    pub async fn status(&self) -> PipelineStatus {
        let total_ratings = match self.store.rated_count().await {
            Ok(count) => count,
            Err(e) => {
                warn!(error = %e, "Could not count ratings");
                0
            }
        };

        let state = self.state.read().await;

        PipelineStatus {
            model_trained: state.is_trained(),
            trained_on_count: state.trained_on_count,
            trained_at: state.trained_at,
            total_ratings,
        }
    }

    /// Join ratings with freshly extracted features. Malformed records are
    /// logged and skipped so the rest of the history still trains.
    async fn training_rows(&self) -> Vec<TrainingRow> {
        let ratings = match self.store.list_ratings().await {
            Ok(ratings) => ratings,
            Err(e) => {
                warn!(error = %e, "Could not load rating history");
                return vec![];
            }
        };

        ratings
            .iter()
            .filter_map(|rating| match extract_features(&rating.video) {
                Ok(features) => Some(TrainingRow {
                    features,
                    liked: rating.liked,
                }),
                Err(e) => {
                    warn!(error = %e, "Skipping malformed rated video");
                    None
                }
            })
            .collect()
    }
}

fn flat_confidence(liked: &[Video]) -> Vec<ScoredVideo> {
    liked
        .iter()
        .map(|video| ScoredVideo::from_video(video, UNTRAINED_LIKED_PROBABILITY))
        .collect()
}
