//! In-memory `SimulationHandle` for tests and benches.
//!
//! A small, hand-buildable stand-in for the live host, built fluently
//! (`MockSimulation::new().with_now(..).add_train(..)`) the way a fixture
//! builder assembles a scenario field by field.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use crate::clock::SimTime;
use crate::host::{
    Direction, HostError, InterlockingVeto, ItemId, Options, Position, RouteId, RouteState,
    RouteView, Service, ServiceLine, SignalAspect, SignalId, SignalView, SimulationHandle,
    TrackItemKind, TrackItemView, TrainId, TrainStatus, TrainView,
};

#[derive(Default)]
pub struct MockSimulation {
    now: Cell<SimTime>,
    options: Cell<Options>,
    trains: RefCell<HashMap<TrainId, TrainView>>,
    routes: RefCell<HashMap<RouteId, RouteView>>,
    items: RefCell<HashMap<ItemId, TrackItemView>>,
    item_order: RefCell<Vec<ItemId>>,
    signals: RefCell<HashMap<SignalId, SignalView>>,
    topology_fwd: RefCell<HashMap<ItemId, ItemId>>,
    topology_bwd: RefCell<HashMap<ItemId, ItemId>>,
    next_signal_by_train: RefCell<HashMap<TrainId, SignalId>>,
    must_stop_by_train: RefCell<HashMap<TrainId, ServiceLine>>,
    vetoes: Vec<Box<dyn InterlockingVeto>>,
    pub activate_calls: RefCell<Vec<(RouteId, bool)>>,
    pub deactivate_calls: RefCell<Vec<RouteId>>,
    pub proceed_calls: RefCell<Vec<TrainId>>,
    pub override_calls: RefCell<Vec<(SignalId, Option<String>)>>,
}

impl MockSimulation {
    pub fn new() -> Self {
        let mut s = Self::default();
        s.now = Cell::new(SimTime::ZERO);
        s.options = Cell::new(Options::default());
        s
    }

    pub fn with_now(self, now: SimTime) -> Self {
        self.now.set(now);
        self
    }

    /// Mutates the clock in place, for tests that need to advance time on an
    /// already-constructed (possibly already-owned-by-an-engine) simulation.
    pub fn set_now(&self, now: SimTime) {
        self.now.set(now);
    }

    pub fn with_options(self, options: Options) -> Self {
        self.options.set(options);
        self
    }

    pub fn add_train(self, train: TrainView) -> Self {
        self.trains.borrow_mut().insert(train.id, train);
        self
    }

    pub fn add_route(self, route: RouteView) -> Self {
        self.routes.borrow_mut().insert(route.id.clone(), route);
        self
    }

    pub fn add_item(self, item: TrackItemView) -> Self {
        self.item_order.borrow_mut().push(item.id.clone());
        self.items.borrow_mut().insert(item.id.clone(), item);
        self
    }

    pub fn add_signal(self, signal: SignalView) -> Self {
        self.signals.borrow_mut().insert(signal.id.clone(), signal);
        self
    }

    /// Links each consecutive pair forward (and implicitly backward).
    pub fn chain(self, ids: &[&str]) -> Self {
        for pair in ids.windows(2) {
            self.topology_fwd.borrow_mut().insert(ItemId(pair[0].into()), ItemId(pair[1].into()));
            self.topology_bwd.borrow_mut().insert(ItemId(pair[1].into()), ItemId(pair[0].into()));
        }
        self
    }

    pub fn with_next_signal(self, train: TrainId, signal: &str) -> Self {
        self.next_signal_by_train.borrow_mut().insert(train, SignalId(signal.into()));
        self
    }

    pub fn with_must_stop_line(self, train: TrainId, line: ServiceLine) -> Self {
        self.must_stop_by_train.borrow_mut().insert(train, line);
        self
    }

    pub fn with_veto(mut self, veto: Box<dyn InterlockingVeto>) -> Self {
        self.vetoes.push(veto);
        self
    }

    pub fn set_item_occupied(&self, id: &str, occupied: bool) {
        if let Some(item) = self.items.borrow_mut().get_mut(&ItemId(id.into())) {
            item.train_present = occupied;
        }
    }

    pub fn set_route_state(&self, id: &str, state: RouteState) {
        if let Some(route) = self.routes.borrow_mut().get_mut(&RouteId(id.into())) {
            route.state = state;
        }
    }
}

impl SimulationHandle for MockSimulation {
    fn now(&self) -> SimTime {
        self.now.get()
    }

    fn options(&self) -> Options {
        self.options.get()
    }

    fn trains(&self) -> Vec<TrainView> {
        self.trains.borrow().values().cloned().collect()
    }

    fn routes(&self) -> Vec<RouteView> {
        self.routes.borrow().values().cloned().collect()
    }

    fn items(&self) -> Vec<TrackItemView> {
        let items = self.items.borrow();
        self.item_order.borrow().iter().filter_map(|id| items.get(id).cloned()).collect()
    }

    fn item(&self, id: &ItemId) -> Option<TrackItemView> {
        self.items.borrow().get(id).cloned()
    }

    fn signal(&self, id: &SignalId) -> Option<SignalView> {
        self.signals.borrow().get(id).cloned()
    }

    fn route(&self, id: &RouteId) -> Option<RouteView> {
        self.routes.borrow().get(id).cloned()
    }

    fn train(&self, id: TrainId) -> Option<TrainView> {
        self.trains.borrow().get(&id).cloned()
    }

    fn find_next_signal(&self, train: &TrainView) -> Option<SignalId> {
        self.next_signal_by_train.borrow().get(&train.id).cloned()
    }

    fn next_must_stop_line(&self, train: &TrainView) -> Option<ServiceLine> {
        self.must_stop_by_train.borrow().get(&train.id).cloned()
    }

    fn advance(&self, pos: &Position, direction: Direction) -> Option<Position> {
        let map = match direction {
            Direction::Forward => self.topology_fwd.borrow(),
            Direction::Reverse => self.topology_bwd.borrow(),
        };
        map.get(&pos.item).map(|next| Position {
            item: next.clone(),
            offset: 0.0,
            previous_item: Some(pos.item.clone()),
        })
    }

    fn vetoes(&self) -> &[Box<dyn InterlockingVeto>] {
        &self.vetoes
    }

    fn activate_route(&self, id: &RouteId, persistent: bool) -> Result<(), HostError> {
        let mut routes = self.routes.borrow_mut();
        let route = routes.get_mut(id).ok_or_else(|| HostError(format!("unknown route {id}")))?;
        route.state = if persistent { RouteState::Persistent } else { RouteState::Activated };
        self.activate_calls.borrow_mut().push((id.clone(), persistent));
        Ok(())
    }

    fn deactivate_route(&self, id: &RouteId) -> Result<(), HostError> {
        let mut routes = self.routes.borrow_mut();
        let route = routes.get_mut(id).ok_or_else(|| HostError(format!("unknown route {id}")))?;
        route.state = RouteState::Deactivated;
        self.deactivate_calls.borrow_mut().push(id.clone());
        Ok(())
    }

    fn proceed_with_caution(&self, train: TrainId) -> Result<(), HostError> {
        if !self.trains.borrow().contains_key(&train) {
            return Err(HostError(format!("unknown train {train}")));
        }
        self.proceed_calls.borrow_mut().push(train);
        Ok(())
    }

    fn set_signal_override(&self, signal: &SignalId, aspect: Option<String>) -> Result<(), HostError> {
        if !self.signals.borrow().contains_key(signal) {
            return Err(HostError(format!("unknown signal {signal}")));
        }
        self.override_calls.borrow_mut().push((signal.clone(), aspect));
        Ok(())
    }
}

/// An always-accepting veto, for tests that don't exercise interlocking.
pub struct AllowAll;
impl InterlockingVeto for AllowAll {
    fn can_activate(&self, _route: &RouteView) -> Result<(), String> {
        Ok(())
    }
}

/// A veto that rejects activation of one named route, citing a conflicting
/// persistent route (exercises the blocking-route string-parsing path).
pub struct BlockedBy {
    pub blocked_route: RouteId,
    pub conflicting_route: RouteId,
}
impl InterlockingVeto for BlockedBy {
    fn can_activate(&self, route: &RouteView) -> Result<(), String> {
        if route.id == self.blocked_route {
            Err(format!("conflicting route {} is active", self.conflicting_route))
        } else {
            Ok(())
        }
    }
}

pub fn item_line(id: &str) -> TrackItemView {
    TrackItemView {
        id: ItemId(id.into()),
        kind: TrackItemKind::Line,
        place: None,
        track_code: None,
        real_length: 100.0,
        max_speed: 20.0,
        conflict_item: None,
        train_present: false,
        active_route: None,
    }
}

pub fn item_signal(id: &str) -> TrackItemView {
    TrackItemView { kind: TrackItemKind::Signal, real_length: 0.0, ..item_line(id) }
}

pub fn item_points(id: &str) -> TrackItemView {
    TrackItemView { kind: TrackItemKind::Points, real_length: 0.0, ..item_line(id) }
}

pub fn aspect_proceed(name: &str, speed: f64) -> SignalAspect {
    SignalAspect {
        name: name.to_string(),
        actions: vec![crate::host::AspectAction { target_speed: speed }],
        means_proceed: true,
    }
}

pub fn aspect_stop(name: &str) -> SignalAspect {
    SignalAspect { name: name.to_string(), actions: vec![], means_proceed: false }
}

pub fn signal(id: &str, active: SignalAspect, available: Vec<SignalAspect>) -> SignalView {
    SignalView { id: SignalId(id.into()), active_aspect: active, available_aspects: available }
}

pub fn stopped_train(id: TrainId, head_item: &str) -> TrainView {
    TrainView {
        id,
        service_code: format!("S{id}"),
        status: TrainStatus::Stopped,
        speed: 0.0,
        head: Position { item: ItemId(head_item.into()), offset: 0.0, previous_item: None },
        direction: Direction::Forward,
        min_stop_time: 30.0,
        stopped_time: 30.0,
        next_place_index: Some(0),
        service: Service { lines: vec![] },
        train_length: 50.0,
        applicable_action_speed: None,
    }
}

pub fn running_train(id: TrainId, head_item: &str, speed: f64) -> TrainView {
    TrainView { status: TrainStatus::Running, speed, ..stopped_train(id, head_item) }
}

pub fn service_line(place: &str, track_code: Option<&str>, departure: Option<SimTime>, must_stop: bool) -> ServiceLine {
    ServiceLine {
        place: crate::host::PlaceId(place.into()),
        track_code: track_code.map(str::to_string),
        scheduled_arrival: None,
        scheduled_departure: departure,
        must_stop,
    }
}

pub fn route(id: &str, begin: &str, end: &str, positions: Vec<&str>) -> RouteView {
    RouteView {
        id: RouteId(id.into()),
        begin_signal: SignalId(begin.into()),
        end_signal: SignalId(end.into()),
        positions: positions
            .into_iter()
            .map(|item| Position { item: ItemId(item.into()), offset: 0.0, previous_item: None })
            .collect(),
        state: RouteState::Deactivated,
    }
}
