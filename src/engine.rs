//! Scheduler (SCH) and the top-level `SuggestionEngine`.
//!
//! One engine per loaded simulation. It holds the host's
//! `SimulationHandle`, the rejection map, the last-computed timestamp and a
//! lightweight stats counter, and drives the whole CG → RC → RF → publish
//! pipeline described in data-flow line.

use crate::candidates::{deactivation, departure, override_signal, predictive, proceed};
use crate::clock::SimTime;
use crate::error::AcceptError;
use crate::events::{EventBus, SuggestionSubscriber};
use crate::host::{RouteId, SignalId, SimulationHandle};
use crate::rank::rank_and_cap;
use crate::reader::StateReader;
use crate::reject::RejectionMap;
use crate::suggestion::{SuggestionId, SuggestionsSnapshot};

/// Read-only counters populated during the most recent `recompute_now`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecomputeStats {
    pub departure_candidates: usize,
    pub predictive_candidates: usize,
    pub deactivation_candidates: usize,
    pub proceed_candidates: usize,
    pub override_candidates: usize,
    /// Candidates dropped by the rejection filter after ranking and capping;
    /// does not include candidates dropped purely by the `max_candidates` cap.
    pub rejected_by_filter: usize,
    pub emitted: usize,
}

/// Bound to exactly one simulation at a time; `reset` rebinds it.
pub struct SuggestionEngine<H: SimulationHandle> {
    handle: H,
    last_computed_at: Option<SimTime>,
    rejections: RejectionMap,
    snapshot: SuggestionsSnapshot,
    events: EventBus,
    stats: RecomputeStats,
}

impl<H: SimulationHandle> SuggestionEngine<H> {
    pub fn new(handle: H) -> Self {
        let now = handle.now();
        Self {
            handle,
            last_computed_at: None,
            rejections: RejectionMap::new(),
            snapshot: SuggestionsSnapshot::empty(now),
            events: EventBus::new(),
            stats: RecomputeStats::default(),
        }
    }

    /// Rebinds to a new simulation and discards rejection state, used on simulation restart.
    pub fn reset(&mut self, handle: H) {
        let now = handle.now();
        self.handle = handle;
        self.last_computed_at = None;
        self.rejections.clear();
        self.snapshot = SuggestionsSnapshot::empty(now);
        self.stats = RecomputeStats::default();
    }

    pub fn subscribe(&self) -> SuggestionSubscriber {
        self.events.subscribe()
    }

    /// The bound simulation handle, for hosts (and tests) that need to poke
    /// at the underlying simulation directly rather than through the
    /// engine's own accept/reject/recompute surface.
    pub fn handle(&self) -> &H {
        &self.handle
    }

    pub fn snapshot(&self) -> &SuggestionsSnapshot {
        &self.snapshot
    }

    pub fn stats(&self) -> RecomputeStats {
        self.stats
    }

    /// Called on each simulation tick. Recomputes only if suggestions are
    /// enabled and the configured interval has elapsed since the last
    /// recompute.
    pub fn recompute_if_due(&mut self) {
        let options = self.handle.options();
        if !options.suggestions_enabled {
            return;
        }
        let now = self.handle.now();
        let due = match self.last_computed_at {
            None => true,
            Some(last) => now - last >= options.suggestions_interval_minutes * 60,
        };
        if due {
            self.recompute_now();
        }
    }

    /// Forces immediate recomputation, bypassing the interval check. Still
    /// stamps `last_computed_at` and emits the event. Runs even when
    /// suggestions are disabled, since an explicit recompute is expected to
    /// still produce a snapshot for observability.
    pub fn recompute_now(&mut self) {
        let now = self.handle.now();
        let reader = StateReader::new(&self.handle);

        let departure_candidates = departure::generate(&reader);
        let predictive_candidates = predictive::generate(&reader);
        let deactivation_candidates = deactivation::generate(&reader);
        let proceed_candidates = proceed::generate(&reader);
        let override_candidates = override_signal::generate(&reader);

        let mut stats = RecomputeStats {
            departure_candidates: departure_candidates.len(),
            predictive_candidates: predictive_candidates.len(),
            deactivation_candidates: deactivation_candidates.len(),
            proceed_candidates: proceed_candidates.len(),
            override_candidates: override_candidates.len(),
            ..RecomputeStats::default()
        };

        let mut all = Vec::with_capacity(
            stats.departure_candidates
                + stats.predictive_candidates
                + stats.deactivation_candidates
                + stats.proceed_candidates
                + stats.override_candidates,
        );
        all.extend(departure_candidates);
        all.extend(predictive_candidates);
        all.extend(deactivation_candidates);
        all.extend(proceed_candidates);
        all.extend(override_candidates);

        let ranked = rank_and_cap(all, reader.options().max_candidates);
        let before_reject = ranked.len();
        let filtered = self.rejections.filter(ranked, now);
        stats.rejected_by_filter = before_reject.saturating_sub(filtered.len());
        stats.emitted = filtered.len();

        self.stats = stats;
        self.last_computed_at = Some(now);
        self.snapshot = SuggestionsSnapshot { items: filtered, generated_at: now };
        tracing::info!(
            emitted = self.stats.emitted,
            rejected = self.stats.rejected_by_filter,
            generated_at = %now,
            "recomputed suggestions"
        );
        self.events.publish(&self.snapshot);
    }

    /// Suppresses `id` until `now + minutes` (default
    /// `options.default_rejection_minutes` when `minutes` is `None`).
    pub fn reject(&mut self, id: &str, minutes: Option<i64>) -> Result<(), AcceptError> {
        let parsed: SuggestionId = id.parse().map_err(|_| AcceptError::MalformedId(id.to_string()))?;
        let now = self.handle.now();
        let minutes = minutes.unwrap_or_else(|| self.handle.options().default_rejection_minutes);
        self.rejections.reject(&parsed, now, minutes);
        tracing::info!(id = %parsed, minutes, "suggestion rejected");
        Ok(())
    }

    /// Dispatches the accept path for `id`, then
    /// recomputes immediately so the accepted suggestion disappears from the
    /// next snapshot.
    pub fn accept(&mut self, id: &str) -> Result<(), AcceptError> {
        let parsed: SuggestionId = id.parse().map_err(|_| AcceptError::MalformedId(id.to_string()))?;
        self.dispatch_accept(&parsed)?;
        tracing::info!(id = %parsed, "suggestion accepted");
        self.recompute_now();
        Ok(())
    }

    fn dispatch_accept(&self, id: &SuggestionId) -> Result<(), AcceptError> {
        match id {
            SuggestionId::RouteActivate { route, .. } => {
                self.require_route(route)?;
                self.handle.activate_route(route, false).map_err(AcceptError::from)
            }
            SuggestionId::RouteDeactivate { route } => {
                self.require_route(route)?;
                self.handle.deactivate_route(route).map_err(AcceptError::from)
            }
            SuggestionId::TrainProceedWithCaution { train } => {
                self.handle.train(*train).ok_or(AcceptError::UnknownTrain(*train))?;
                self.handle.proceed_with_caution(*train).map_err(AcceptError::from)
            }
            SuggestionId::SignalOverride { signal, aspect_name } => {
                let view = self.handle.signal(signal).ok_or_else(|| AcceptError::UnknownSignal(signal.0.clone()))?;
                let aspect = self.resolve_aspect_name(&view, aspect_name);
                self.handle.set_signal_override(signal, aspect).map_err(AcceptError::from)
            }
        }
    }

    fn require_route(&self, route: &RouteId) -> Result<(), AcceptError> {
        self.handle.route(route).map(|_| ()).ok_or_else(|| AcceptError::UnknownRoute(route.0.clone()))
    }

    /// Case-insensitive aspect name resolution; "DEFAULT" clears the
    /// override; an unknown name falls back to the signal's most
    /// conservative proceed aspect.
    fn resolve_aspect_name(&self, signal: &crate::host::SignalView, requested: &str) -> Option<String> {
        if requested.eq_ignore_ascii_case("DEFAULT") {
            return None;
        }
        if let Some(found) = signal.available_aspects.iter().find(|a| a.name.eq_ignore_ascii_case(requested)) {
            return Some(found.name.clone());
        }
        signal
            .available_aspects
            .iter()
            .filter(|a| a.means_proceed)
            .min_by(|a, b| {
                let sa = a.representative_speed().unwrap_or(f64::INFINITY);
                let sb = b.representative_speed().unwrap_or(f64::INFINITY);
                sa.partial_cmp(&sb).unwrap_or(std::cmp::Ordering::Equal)
            })
            .map(|a| a.name.clone())
    }
}

/// Which signal a given id refers to, for hosts that want to show the
/// operator where a `SignalOverride` suggestion applies without parsing the
/// id themselves.
pub fn signal_of(id: &SuggestionId) -> Option<&SignalId> {
    match id {
        SuggestionId::SignalOverride { signal, .. } => Some(signal),
        _ => None,
    }
}

/// Hosts typically keep the engine in `Option<SuggestionEngine<H>>` so it
/// can be absent before a simulation loads. These free functions implement
/// "Engine not initialized" policy for that shape: `accept`,
/// `reject` and `recompute` all return `AcceptError::NotInitialized` when
/// called with `None` instead of needing every host to re-derive the check.
pub fn accept<H: SimulationHandle>(engine: Option<&mut SuggestionEngine<H>>, id: &str) -> Result<(), AcceptError> {
    engine.ok_or(AcceptError::NotInitialized)?.accept(id)
}

pub fn reject<H: SimulationHandle>(
    engine: Option<&mut SuggestionEngine<H>>,
    id: &str,
    minutes: Option<i64>,
) -> Result<(), AcceptError> {
    engine.ok_or(AcceptError::NotInitialized)?.reject(id, minutes)
}

pub fn recompute<H: SimulationHandle>(engine: Option<&mut SuggestionEngine<H>>) -> Result<(), AcceptError> {
    engine.ok_or(AcceptError::NotInitialized)?.recompute_now();
    Ok(())
}
