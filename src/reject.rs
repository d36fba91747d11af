//! Rejection Filter (RF).
//!
//! Suppression is keyed by the rendered suggestion id and evaluated against
//! the *simulation* clock, never wall time, so a paused or time-warped
//! simulation behaves the way an operator expects.

use std::collections::HashMap;

use crate::clock::SimTime;
use crate::suggestion::{Suggestion, SuggestionId};

#[derive(Debug, Default)]
pub struct RejectionMap {
    suppressed_until: HashMap<String, SimTime>,
}

impl RejectionMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Suppresses `id` until `now + minutes`.
    pub fn reject(&mut self, id: &SuggestionId, now: SimTime, minutes: i64) {
        self.suppressed_until.insert(id.to_string(), now.plus_minutes(minutes));
    }

    /// Whether `id` is currently suppressed at `now`.
    pub fn is_suppressed(&self, id: &SuggestionId, now: SimTime) -> bool {
        self.suppressed_until.get(&id.to_string()).is_some_and(|until| now < *until)
    }

    /// Drops every candidate whose id is still suppressed at `now`.
    pub fn filter(&self, candidates: Vec<Suggestion>, now: SimTime) -> Vec<Suggestion> {
        candidates.into_iter().filter(|c| !self.is_suppressed(&c.id, now)).collect()
    }

    /// Discards all rejection state (used by `ResetEngine`).
    pub fn clear(&mut self) {
        self.suppressed_until.clear();
    }
}
