//! Selection of the single best candidate for a repository

use crate::release::types::Candidate;

/// Picks the most recently published candidate.
///
/// Candidates without a publish timestamp are discarded. A formal release and
/// a tag published at the same instant resolve to the formal release.
pub fn select(candidates: Vec<Candidate>) -> Option<Candidate> {
    candidates
        .into_iter()
        .filter(|candidate| candidate.published_at.is_some())
        .max_by_key(|candidate| (candidate.published_at, candidate.kind.tie_break_rank()))
}

/// Stable descending sort by an extracted key
pub fn sort_descending_by<T, K, F>(items: &mut [T], key: F)
where
    K: Ord,
    F: Fn(&T) -> K,
{
    items.sort_by(|a, b| key(b).cmp(&key(a)));
}
