/// Content Similarity Matching
///
/// Builds TF-IDF vectors for the scored candidates and a synthetic profile
/// document assembled from the user's tags, then blends cosine similarity
/// into the like probabilities and re-sorts.
use super::{PersonalizationError, Result};
use crate::models::{PersonalizationTags, ScoredVideo, Video};
use once_cell::sync::Lazy;
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

/// Vocabulary cap for the per-batch TF-IDF fit.
const MAX_FEATURES: usize = 1000;

/// Blend weights between the base probability and the similarity signal.
const PROBABILITY_WEIGHT: f32 = 0.7;
const SIMILARITY_WEIGHT: f32 = 0.3;

static STOP_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "about", "above", "after", "again", "all", "an", "and", "any", "are", "as", "at", "be",
        "because", "been", "before", "being", "below", "between", "both", "but", "by", "can",
        "did", "do", "does", "doing", "down", "during", "each", "few", "for", "from", "further",
        "had", "has", "have", "having", "he", "her", "here", "hers", "him", "his", "how", "if",
        "in", "into", "is", "it", "its", "just", "me", "more", "most", "my", "no", "nor", "not",
        "now", "of", "off", "on", "once", "only", "or", "other", "our", "out", "over", "own",
        "same", "she", "should", "so", "some", "such", "than", "that", "the", "their", "them",
        "then", "there", "these", "they", "this", "those", "through", "to", "too", "under",
        "until", "up", "very", "was", "we", "were", "what", "when", "where", "which", "while",
        "who", "whom", "why", "will", "with", "you", "your",
    ]
    .into_iter()
    .collect()
});

/// Blend content similarity into the scored list and re-sort.
///
/// Entries with no candidate metadata keep a similarity of zero. When the
/// whole batch cannot be vectorized the input is returned unchanged.
pub fn enhance_with_content_similarity(
    scored: Vec<ScoredVideo>,
    tags: &PersonalizationTags,
    metadata: &[Video],
) -> Vec<ScoredVideo> {
    if scored.is_empty() {
        return scored;
    }

    match blend_similarities(&scored, tags, metadata) {
        Ok(blended) => blended,
        Err(e) => {
            warn!(error = %e, "Content similarity unavailable, keeping base ranking");
            scored
        }
    }
}

fn blend_similarities(
    scored: &[ScoredVideo],
    tags: &PersonalizationTags,
    metadata: &[Video],
) -> Result<Vec<ScoredVideo>> {
    let by_id: HashMap<&str, &Video> = metadata.iter().map(|v| (v.id.as_str(), v)).collect();

    // One lowercased document per entry that still has candidate metadata
    let mut document_ids = Vec::new();
    let mut candidate_tokens = Vec::new();
    for entry in scored {
        if let Some(video) = by_id.get(entry.id.as_str()) {
            let document = format!(
                "{} {} {}",
                video.title, video.description, video.channel_name
            )
            .to_lowercase();

            document_ids.push(entry.id.clone());
            candidate_tokens.push(tokenize(&document));
        }
    }

    if document_ids.is_empty() {
        return Err(PersonalizationError::MissingMetadata);
    }

    let profile_document = tags.iter().cloned().collect::<Vec<_>>().join(" ");
    let profile_tokens = tokenize(&profile_document);

    // The profile document joins the candidate corpus for the fit
    let mut corpus: Vec<&[String]> = candidate_tokens.iter().map(|t| t.as_slice()).collect();
    corpus.push(profile_tokens.as_slice());

    let vectorizer = TfidfVectorizer::fit(&corpus, MAX_FEATURES)?;
    let profile_vector = vectorizer.transform(&profile_tokens);

    let mut similarity_by_id = HashMap::with_capacity(document_ids.len());
    for (id, tokens) in document_ids.iter().zip(candidate_tokens.iter()) {
        let candidate_vector = vectorizer.transform(tokens);
        similarity_by_id.insert(
            id.as_str(),
            cosine_similarity(&profile_vector, &candidate_vector),
        );
    }

    let mut blended = scored.to_vec();
    for entry in &mut blended {
        let similarity = similarity_by_id
            .get(entry.id.as_str())
            .copied()
            .unwrap_or(0.0)
            .clamp(0.0, 1.0);

        let similarity_score = (similarity * 2.0).min(1.0);
        entry.like_probability =
            PROBABILITY_WEIGHT * entry.like_probability + SIMILARITY_WEIGHT * similarity_score;
        entry.content_similarity = Some(similarity);
    }

    blended.sort_by(|a, b| {
        b.like_probability
            .partial_cmp(&a.like_probability)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    debug!(
        entry_count = blended.len(),
        vocabulary_size = vectorizer.vocabulary_len(),
        "Blended content similarity into ranking"
    );

    Ok(blended)
}

/// Lowercased alphanumeric runs of at least two characters, stop-words
/// removed. Input text is expected to be lowercased already.
fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|token| token.chars().count() >= 2)
        .filter(|token| !STOP_WORDS.contains(*token))
        .map(str::to_string)
        .collect()
}

/// TF-IDF vectorizer fit jointly over one batch of token documents.
///
/// The vocabulary keeps the most frequent terms up to `max_features`, ties
/// broken lexicographically so the fit is stable across runs. Term
/// frequency is count over document length; inverse document frequency is
/// ln(documents / documents containing the term).
struct TfidfVectorizer {
    vocabulary: HashMap<String, usize>,
    idf: Vec<f32>,
}

impl TfidfVectorizer {
    fn fit(documents: &[&[String]], max_features: usize) -> Result<Self> {
        let mut corpus_frequency: HashMap<&str, usize> = HashMap::new();
        let mut document_frequency: HashMap<&str, usize> = HashMap::new();

        for tokens in documents {
            let mut seen: HashSet<&str> = HashSet::new();
            for token in tokens.iter() {
                *corpus_frequency.entry(token.as_str()).or_insert(0) += 1;
                if seen.insert(token.as_str()) {
                    *document_frequency.entry(token.as_str()).or_insert(0) += 1;
                }
            }
        }

        if corpus_frequency.is_empty() {
            return Err(PersonalizationError::EmptyVocabulary);
        }

        let mut terms: Vec<(&str, usize)> = corpus_frequency.into_iter().collect();
        terms.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        terms.truncate(max_features);

        let total_documents = documents.len() as f32;
        let mut vocabulary = HashMap::with_capacity(terms.len());
        let mut idf = Vec::with_capacity(terms.len());

        for (index, (term, _)) in terms.iter().enumerate() {
            vocabulary.insert((*term).to_string(), index);
            idf.push((total_documents / document_frequency[*term] as f32).ln());
        }

        Ok(Self { vocabulary, idf })
    }

    fn transform(&self, tokens: &[String]) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.vocabulary.len()];
        if tokens.is_empty() {
            return vector;
        }

        for token in tokens {
            if let Some(&index) = self.vocabulary.get(token.as_str()) {
                vector[index] += 1.0;
            }
        }

        let document_length = tokens.len() as f32;
        for (index, value) in vector.iter_mut().enumerate() {
            *value = (*value / document_length) * self.idf[index];
        }

        vector
    }

    fn vocabulary_len(&self) -> usize {
        self.vocabulary.len()
    }
}

/// Cosine similarity with a zero-norm guard.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn create_test_video(id: &str, title: &str, description: &str) -> Video {
        Video {
            id: id.to_string(),
            title: title.to_string(),
            description: description.to_string(),
            channel_name: "Channel".to_string(),
            view_count: 1_000,
            like_count: 10,
            comment_count: 1,
            tags: vec![],
            published_at: Utc::now(),
        }
    }

    fn scored(id: &str, like_probability: f32) -> ScoredVideo {
        ScoredVideo {
            id: id.to_string(),
            title: String::new(),
            channel_name: String::new(),
            view_count: 0,
            url: String::new(),
            like_probability,
            content_similarity: None,
            pattern_boost: None,
        }
    }

    fn tags(words: &[&str]) -> PersonalizationTags {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn test_cosine_similarity_identical_vectors() {
        let v = vec![0.5, 0.3, 0.2];
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_cosine_similarity_orthogonal_vectors() {
        let a = vec![1.0, 0.0];
        let b = vec![0.0, 1.0];
        assert_eq!(cosine_similarity(&a, &b), 0.0);
    }

    #[test]
    fn test_cosine_similarity_zero_norm() {
        let a = vec![0.0, 0.0];
        let b = vec![1.0, 1.0];
        assert_eq!(cosine_similarity(&a, &b), 0.0);
    }

    #[test]
    fn test_tokenize_filters_stop_words_and_short_tokens() {
        let tokens = tokenize("the quick fox and a i go of rust");

        assert_eq!(tokens, vec!["quick", "fox", "go", "rust"]);
    }

    #[test]
    fn test_vocabulary_cap_keeps_most_frequent_terms() {
        let docs = vec![
            tokenize("rust rust rust tokio tokio serde"),
            tokenize("rust tokio hyper"),
        ];
        let corpus: Vec<&[String]> = docs.iter().map(|d| d.as_slice()).collect();

        let vectorizer = TfidfVectorizer::fit(&corpus, 2).unwrap();

        assert_eq!(vectorizer.vocabulary_len(), 2);
        assert!(vectorizer.vocabulary.contains_key("rust"));
        assert!(vectorizer.vocabulary.contains_key("tokio"));
        assert!(!vectorizer.vocabulary.contains_key("serde"));
    }

    #[test]
    fn test_empty_corpus_is_rejected() {
        let docs = vec![tokenize("of the and"), tokenize("")];
        let corpus: Vec<&[String]> = docs.iter().map(|d| d.as_slice()).collect();

        assert!(matches!(
            TfidfVectorizer::fit(&corpus, 10),
            Err(PersonalizationError::EmptyVocabulary)
        ));
    }

    #[test]
    fn test_disjoint_tags_shrink_probability_toward_base_weight() {
        let metadata = vec![
            create_test_video("a", "cooking pasta at home", "weeknight recipes"),
            create_test_video("b", "gardening basics", "soil and compost"),
        ];
        let scored_list = vec![scored("a", 0.5), scored("b", 0.5)];

        let enhanced =
            enhance_with_content_similarity(scored_list, &tags(&["rust", "compiler"]), &metadata);

        for entry in &enhanced {
            assert_eq!(entry.content_similarity, Some(0.0));
            assert!((entry.like_probability - 0.35).abs() < 1e-5);
        }
    }

    #[test]
    fn test_matching_tags_raise_probability_and_resort() {
        let metadata = vec![
            create_test_video("plain", "cooking pasta at home", "weeknight recipes"),
            create_test_video("match", "rust compiler deep dive", "borrow checker internals"),
        ];
        // The matching entry starts strictly below the plain one
        let scored_list = vec![scored("plain", 0.6), scored("match", 0.55)];

        let enhanced = enhance_with_content_similarity(
            scored_list,
            &tags(&["rust", "compiler", "internals"]),
            &metadata,
        );

        assert_eq!(enhanced[0].id, "match");
        assert!(enhanced[0].content_similarity.unwrap() > 0.0);
        assert_eq!(enhanced[1].content_similarity, Some(0.0));
        assert!(enhanced[0].like_probability > enhanced[1].like_probability);
    }

    #[test]
    fn test_missing_metadata_for_all_entries_keeps_input() {
        let scored_list = vec![scored("a", 0.9), scored("b", 0.4)];

        let enhanced =
            enhance_with_content_similarity(scored_list.clone(), &tags(&["rust"]), &[]);

        assert_eq!(enhanced, scored_list);
    }

    #[test]
    fn test_missing_metadata_for_one_entry_scores_zero_similarity() {
        let metadata = vec![create_test_video(
            "known",
            "rust async runtime tour",
            "executors and wakers",
        )];
        let scored_list = vec![scored("known", 0.5), scored("unknown", 0.5)];

        let enhanced =
            enhance_with_content_similarity(scored_list, &tags(&["rust", "async"]), &metadata);

        let unknown = enhanced.iter().find(|e| e.id == "unknown").unwrap();
        assert_eq!(unknown.content_similarity, Some(0.0));
        assert!((unknown.like_probability - 0.35).abs() < 1e-5);
    }

    #[test]
    fn test_empty_scored_list_passes_through() {
        let enhanced = enhance_with_content_similarity(vec![], &tags(&["rust"]), &[]);
        assert!(enhanced.is_empty());
    }
}
