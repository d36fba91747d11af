//! The host contract: read-only snapshots of simulation entities plus the
//! handful of operations the engine is allowed to invoke on the live
//! simulation (`SimulationHandle`) and on the interlocking (`InterlockingVeto`).
//!
//! Everything in this module describes the *external collaborator*. The
//! engine never owns a `Train`, `Route`, `Signal` or `TrackItem` — it asks
//! the host for a fresh, owned snapshot on every query, the same way a
//! matching algorithm is handed positions and returns a decision without
//! owning any ECS component.

use std::fmt;

use crate::clock::SimTime;

/// Stable train identifier, shared with the host's own train table.
pub type TrainId = u64;

/// Stable route identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RouteId(pub String);

/// Stable signal identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SignalId(pub String);

/// Stable track item identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ItemId(pub String);

/// Stable place (station/junction/depot) identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PlaceId(pub String);

macro_rules! display_as_inner {
    ($t:ty) => {
        impl fmt::Display for $t {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}
display_as_inner!(RouteId);
display_as_inner!(SignalId);
display_as_inner!(ItemId);
display_as_inner!(PlaceId);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrainStatus {
    Inactive,
    Running,
    Stopped,
    Waiting,
    Out,
    EndOfService,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteState {
    Deactivated,
    Activated,
    Persistent,
    Destroying,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackItemKind {
    Line,
    InvisibleLink,
    Signal,
    Points,
    PlaceAttached,
    End,
}

/// Direction of travel, used to pick which link `advance` follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Reverse,
}

/// A point along the track graph: an item, an offset into it, and the item
/// the walk arrived from (needed by the host to resolve points/switches).
#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    pub item: ItemId,
    pub offset: f64,
    pub previous_item: Option<ItemId>,
}

/// One target-speed action within a signal aspect.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AspectAction {
    pub target_speed: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SignalAspect {
    pub name: String,
    pub actions: Vec<AspectAction>,
    pub means_proceed: bool,
}

impl SignalAspect {
    /// `actions[0].speed` if any action is defined; the aspect's "representative speed".
    pub fn representative_speed(&self) -> Option<f64> {
        self.actions.first().map(|a| a.target_speed)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServiceLine {
    pub place: PlaceId,
    /// Empty/absent means "no track code constraint".
    pub track_code: Option<String>,
    pub scheduled_arrival: Option<SimTime>,
    pub scheduled_departure: Option<SimTime>,
    pub must_stop: bool,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Service {
    pub lines: Vec<ServiceLine>,
}

/// Owned, point-in-time snapshot of a train. Fetched fresh on every query;
/// never cached across a recomputation.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainView {
    pub id: TrainId,
    pub service_code: String,
    pub status: TrainStatus,
    /// m/s.
    pub speed: f64,
    pub head: Position,
    pub direction: Direction,
    /// seconds.
    pub min_stop_time: f64,
    /// seconds.
    pub stopped_time: f64,
    pub next_place_index: Option<usize>,
    pub service: Service,
    /// meters.
    pub train_length: f64,
    /// The currently applicable braking-target speed (m/s), if strictly
    /// lower than `speed` — `None` when the train isn't decelerating.
    pub applicable_action_speed: Option<f64>,
}

impl TrainView {
    pub fn is_active(&self) -> bool {
        !matches!(
            self.status,
            TrainStatus::Inactive | TrainStatus::Out | TrainStatus::EndOfService
        )
    }

    pub fn current_service_line(&self) -> Option<&ServiceLine> {
        self.next_place_index.and_then(|i| self.service.lines.get(i))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RouteView {
    pub id: RouteId,
    pub begin_signal: SignalId,
    pub end_signal: SignalId,
    /// Position 0 is at the begin signal.
    pub positions: Vec<Position>,
    pub state: RouteState,
}

impl RouteView {
    pub fn is_persistent(&self) -> bool {
        self.state == RouteState::Persistent
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrackItemView {
    pub id: ItemId,
    pub kind: TrackItemKind,
    pub place: Option<PlaceId>,
    pub track_code: Option<String>,
    /// meters; 0 if not applicable.
    pub real_length: f64,
    pub max_speed: f64,
    pub conflict_item: Option<ItemId>,
    pub train_present: bool,
    pub active_route: Option<RouteId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SignalView {
    pub id: SignalId,
    pub active_aspect: SignalAspect,
    pub available_aspects: Vec<SignalAspect>,
}

impl SignalView {
    pub fn means_proceed(&self) -> bool {
        self.active_aspect.means_proceed
    }
}

/// Tunable engine behaviour, entirely host-owned.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Options {
    pub suggestions_enabled: bool,
    pub suggestions_interval_minutes: i64,
    pub max_candidates: usize,
    pub predictive_max_distance_m: f64,
    pub predictive_max_eta_s: f64,
    pub safety_buffer_s: f64,
    pub default_rejection_minutes: i64,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            suggestions_enabled: true,
            suggestions_interval_minutes: 3,
            max_candidates: 50,
            predictive_max_distance_m: 1_000.0,
            predictive_max_eta_s: 60.0,
            safety_buffer_s: 5.0,
            default_rejection_minutes: 5,
        }
    }
}

impl Options {
    pub fn with_suggestions_enabled(mut self, enabled: bool) -> Self {
        self.suggestions_enabled = enabled;
        self
    }

    pub fn with_interval_minutes(mut self, minutes: i64) -> Self {
        self.suggestions_interval_minutes = minutes;
        self
    }

    pub fn with_max_candidates(mut self, max: usize) -> Self {
        self.max_candidates = max;
        self
    }

    pub fn with_predictive_max_distance_m(mut self, meters: f64) -> Self {
        self.predictive_max_distance_m = meters;
        self
    }

    pub fn with_predictive_max_eta_s(mut self, seconds: f64) -> Self {
        self.predictive_max_eta_s = seconds;
        self
    }

    pub fn with_safety_buffer_s(mut self, seconds: f64) -> Self {
        self.safety_buffer_s = seconds;
        self
    }
}

/// A host-supplied veto over route activation. The interlocking owns the
/// actual rule set; the engine only consumes the yes/no (plus, on the
/// error path, a best-effort conflicting-route id — see
/// [`crate::error::extract_conflicting_route_id`]).
pub trait InterlockingVeto {
    fn can_activate(&self, route: &RouteView) -> Result<(), String>;
}

/// The live simulation, as seen by the engine. One implementation is
/// expected per host; `tests::mock` (behind `test-helpers`) provides an
/// in-memory one for tests and benches.
pub trait SimulationHandle {
    fn now(&self) -> SimTime;
    fn options(&self) -> Options;

    fn trains(&self) -> Vec<TrainView>;
    fn routes(&self) -> Vec<RouteView>;
    fn items(&self) -> Vec<TrackItemView>;

    fn item(&self, id: &ItemId) -> Option<TrackItemView>;
    fn signal(&self, id: &SignalId) -> Option<SignalView>;
    fn route(&self, id: &RouteId) -> Option<RouteView>;
    fn train(&self, id: TrainId) -> Option<TrainView>;

    /// The first signal ahead of `train` along its current direction, if any.
    fn find_next_signal(&self, train: &TrainView) -> Option<SignalId>;

    /// The next `ServiceLine` ahead (inclusive of the current one) with
    /// `must_stop = true`, if any remain on the service.
    fn next_must_stop_line(&self, train: &TrainView) -> Option<ServiceLine> {
        let start = train.next_place_index.unwrap_or(usize::MAX);
        train
            .service
            .lines
            .iter()
            .skip(start)
            .find(|l| l.must_stop)
            .cloned()
    }

    /// One step of the item graph walk: given a position and a direction of
    /// travel, the position immediately past the current item — `None` once
    /// the walk runs off the end of the graph ("position becomes out").
    fn advance(&self, pos: &Position, direction: Direction) -> Option<Position>;

    fn vetoes(&self) -> &[Box<dyn InterlockingVeto>];

    fn activate_route(&self, id: &RouteId, persistent: bool) -> Result<(), HostError>;
    fn deactivate_route(&self, id: &RouteId) -> Result<(), HostError>;
    fn proceed_with_caution(&self, train: TrainId) -> Result<(), HostError>;
    /// `aspect = None` clears a manual override.
    fn set_signal_override(&self, signal: &SignalId, aspect: Option<String>) -> Result<(), HostError>;
}

/// A host operation failed. The message is surfaced verbatim to the accept
/// caller.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{0}")]
pub struct HostError(pub String);
