/// Candidate Scoring
///
/// Ranks unrated candidate videos by predicted like probability, with a
/// popularity ordering serving as the untrained fallback.
use super::model::{PreferenceModel, FEATURE_VECTOR_SIZE};
use super::{RankingError, Result};
use crate::models::{ScoredVideo, Video};
use crate::services::features::{extract_features, VideoFeatures};
use ndarray::Array2;
use tracing::{debug, warn};

/// Probability attached to every candidate when no model is available.
const FALLBACK_PROBABILITY: f32 = 0.5;

/// Rank candidates by like probability, highest first.
///
/// With a fitted model the batch is scored and ordered descending; without
/// one, ranking falls back to popularity ordering. Ties keep the
/// candidates' original relative order in both paths, and at most `top_n`
/// entries are returned.
pub fn rank_candidates(
    model: Option<&PreferenceModel>,
    candidates: &[Video],
    top_n: usize,
) -> Result<Vec<ScoredVideo>> {
    match model {
        Some(model) => rank_with_model(model, candidates, top_n),
        None => Ok(rank_by_popularity(candidates, top_n)),
    }
}

fn rank_with_model(
    model: &PreferenceModel,
    candidates: &[Video],
    top_n: usize,
) -> Result<Vec<ScoredVideo>> {
    if candidates.is_empty() {
        return Ok(vec![]);
    }

    // Malformed records are skipped so one bad row cannot sink the batch
    let mut usable: Vec<(&Video, VideoFeatures)> = Vec::with_capacity(candidates.len());
    for video in candidates {
        match extract_features(video) {
            Ok(features) => usable.push((video, features)),
            Err(e) => warn!(error = %e, "Skipping malformed candidate"),
        }
    }

    if usable.is_empty() {
        return Ok(vec![]);
    }

    let values: Vec<f32> = usable
        .iter()
        .flat_map(|(_, features)| features.to_vector())
        .collect();

    let features = Array2::from_shape_vec((usable.len(), FEATURE_VECTOR_SIZE), values)
        .map_err(|e| RankingError::InvalidInput(format!("Failed to build feature matrix: {}", e)))?;

    let probabilities = model.predict_probability(&features)?;

    let mut scored: Vec<ScoredVideo> = usable
        .iter()
        .zip(probabilities.iter())
        .map(|((video, _), &probability)| ScoredVideo::from_video(video, probability))
        .collect();

    // Stable sort: equal probabilities keep their input order
    scored.sort_by(|a, b| {
        b.like_probability
            .partial_cmp(&a.like_probability)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    scored.truncate(top_n);

    debug!(
        candidate_count = candidates.len(),
        scored_count = scored.len(),
        "Ranked candidates with preference model"
    );

    Ok(scored)
}

/// Popularity-ordered fallback used while the model is untrained.
///
/// Every entry carries the same neutral probability.
pub fn rank_by_popularity(candidates: &[Video], top_n: usize) -> Vec<ScoredVideo> {
    let mut scored: Vec<ScoredVideo> = candidates
        .iter()
        .map(|video| ScoredVideo::from_video(video, FALLBACK_PROBABILITY))
        .collect();

    scored.sort_by(|a, b| b.view_count.cmp(&a.view_count));
    scored.truncate(top_n);

    scored
}
