//! Ranking & Capping (RC).
//!
//! Candidates from every generator are concatenated, sorted descending by
//! score with ties broken by insertion order (a stable sort preserves the
//! generators' own relative order, which is itself deterministic given
//! identical simulation state), then truncated to `max_items`.

use crate::suggestion::Suggestion;

pub fn rank_and_cap(mut candidates: Vec<Suggestion>, max_items: usize) -> Vec<Suggestion> {
    candidates.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    candidates.truncate(max_items);
    candidates
}
