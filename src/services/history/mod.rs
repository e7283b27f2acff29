/// Rating History Store
///
/// Storage abstraction for the user's manual like/dislike ratings. The
/// pipeline only needs a few collection-shaped reads and writes, so
/// persistent backends stay behind this trait; the in-memory
/// implementation backs tests and single-process deployments.
use crate::models::{RatingRecord, Video};
use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::RwLock;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Rating storage unavailable: {0}")]
    Unavailable(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// Access to the rating history.
#[async_trait]
pub trait RatingStore: Send + Sync {
    /// Insert a rating, replacing any existing rating for the same video.
    async fn add_rating(&self, rating: RatingRecord) -> Result<()>;

    /// Remove the rating for a video. Returns whether one was present.
    async fn remove_rating(&self, video_id: &str) -> Result<bool>;

    /// Every rating with its captured video metadata.
    async fn list_ratings(&self) -> Result<Vec<RatingRecord>>;

    /// Number of rated videos.
    async fn rated_count(&self) -> Result<usize>;

    /// Metadata of the videos the user liked.
    async fn liked_videos(&self) -> Result<Vec<Video>>;
}

/// Process-local store keeping ratings in insertion order.
#[derive(Default)]
pub struct InMemoryRatingStore {
    ratings: RwLock<Vec<RatingRecord>>,
}

impl InMemoryRatingStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RatingStore for InMemoryRatingStore {
    async fn add_rating(&self, rating: RatingRecord) -> Result<()> {
        let mut ratings = self.ratings.write().await;
        ratings.retain(|existing| existing.video.id != rating.video.id);
        ratings.push(rating);
        Ok(())
    }

    async fn remove_rating(&self, video_id: &str) -> Result<bool> {
        let mut ratings = self.ratings.write().await;
        let before = ratings.len();
        ratings.retain(|existing| existing.video.id != video_id);
        Ok(ratings.len() != before)
    }

    async fn list_ratings(&self) -> Result<Vec<RatingRecord>> {
        Ok(self.ratings.read().await.clone())
    }

    async fn rated_count(&self) -> Result<usize> {
        Ok(self.ratings.read().await.len())
    }

    async fn liked_videos(&self) -> Result<Vec<Video>> {
        Ok(self
            .ratings
            .read()
            .await
            .iter()
            .filter(|rating| rating.liked)
            .map(|rating| rating.video.clone())
            .collect())
    }
}
