use std::collections::HashSet;

/// Deduplicates terms into a set. Order is not retained.
pub fn to_set<I, S>(terms: I) -> HashSet<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    terms.into_iter().map(Into::into).collect()
}

/// Jaccard overlap `|A ∩ B| / |A ∪ B|`.
/// An empty side means no overlap, so the result is 0.0 rather than NaN.
pub fn jaccard(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let intersection = a.intersection(b).count();
    let union = a.len() + b.len() - intersection;
    intersection as f64 / union as f64
}
