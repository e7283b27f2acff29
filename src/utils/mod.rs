/// Utility functions shared across the recommendation services

/// Substring match of `text` against any of `needles`.
///
/// Matching is exact; callers lowercase both sides beforehand.
pub fn contains_any(text: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| text.contains(needle))
}

/// Median of a sample, averaging the two middle values for even lengths.
///
/// Returns None for an empty sample.
pub fn median(values: &[u64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }

    let mut sorted = values.to_vec();
    sorted.sort_unstable();

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] as f64 + sorted[mid] as f64) / 2.0)
    } else {
        Some(sorted[mid] as f64)
    }
}
