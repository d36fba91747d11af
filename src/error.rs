//! Accept-path errors and the conflicting-route-id string shim.

use crate::host::{HostError, RouteId, TrainId};

/// Errors returned from [`crate::engine::SuggestionEngine::accept`] and
/// [`crate::engine::SuggestionEngine::reject`]. Unlike candidate-generation
/// skips, which are silent, these are returned to the caller verbatim.
#[derive(Debug, Clone, thiserror::Error)]
pub enum AcceptError {
    #[error("engine not initialized")]
    NotInitialized,
    #[error("malformed suggestion id: {0}")]
    MalformedId(String),
    #[error("unknown route: {0}")]
    UnknownRoute(String),
    #[error("unknown train: {0}")]
    UnknownTrain(TrainId),
    #[error("unknown signal: {0}")]
    UnknownSignal(String),
    #[error(transparent)]
    Host(#[from] HostError),
}

/// Best-effort extraction of a blocking route id from an interlocking veto
/// message of the form "... conflicting route X is active ...".
///
/// Treat this as a compatibility shim over a free-form string message,
/// pending a structured cause on [`crate::host::InterlockingVeto`].
/// Matching is whitespace-tokenized and case-insensitive on the two marker
/// words; the token immediately after "route" is returned verbatim.
pub fn extract_conflicting_route_id(message: &str) -> Option<RouteId> {
    let tokens: Vec<&str> = message.split_whitespace().collect();
    for i in 0..tokens.len().saturating_sub(2) {
        if tokens[i].eq_ignore_ascii_case("conflicting") && tokens[i + 1].eq_ignore_ascii_case("route") {
            return Some(RouteId(tokens[i + 2].trim_matches(|c: char| !c.is_alphanumeric() && c != '_' && c != '-').to_string()));
        }
    }
    None
}
