//! Simulation State Reader (SSR).
//!
//! A thin, read-only view built fresh for each recomputation. It never
//! mutates the host and never survives past one `recompute_now` call; the
//! only thing it caches is the routes-by-begin-signal index, so candidate
//! generation is `O(#trains × routes-per-signal)` instead of
//! `O(#trains × #routes)`.

use std::collections::HashMap;

use crate::clock::SimTime;
use crate::host::{
    Direction, InterlockingVeto, ItemId, Options, Position, RouteId, RouteView, ServiceLine,
    SignalId, SignalView, SimulationHandle, TrackItemKind, TrackItemView, TrainId, TrainView,
};

pub struct StateReader<'a> {
    handle: &'a dyn SimulationHandle,
    routes_by_begin_signal: HashMap<SignalId, Vec<RouteView>>,
    items: Vec<TrackItemView>,
}

impl<'a> StateReader<'a> {
    pub fn new(handle: &'a dyn SimulationHandle) -> Self {
        let mut routes_by_begin_signal: HashMap<SignalId, Vec<RouteView>> = HashMap::new();
        for route in handle.routes() {
            routes_by_begin_signal
                .entry(route.begin_signal.clone())
                .or_default()
                .push(route);
        }
        let items = handle.items();
        Self { handle, routes_by_begin_signal, items }
    }

    pub fn now(&self) -> SimTime {
        self.handle.now()
    }

    pub fn options(&self) -> Options {
        self.handle.options()
    }

    pub fn trains(&self) -> Vec<TrainView> {
        self.handle.trains()
    }

    /// Routes beginning at `signal`, in host iteration order.
    pub fn routes_from(&self, signal: &SignalId) -> &[RouteView] {
        self.routes_by_begin_signal
            .get(signal)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn item(&self, id: &ItemId) -> Option<TrackItemView> {
        self.handle.item(id)
    }

    pub fn signal(&self, id: &SignalId) -> Option<SignalView> {
        self.handle.signal(id)
    }

    pub fn route(&self, id: &RouteId) -> Option<RouteView> {
        self.handle.route(id)
    }

    pub fn train(&self, id: TrainId) -> Option<TrainView> {
        self.handle.train(id)
    }

    pub fn find_next_signal(&self, train: &TrainView) -> Option<SignalId> {
        self.handle.find_next_signal(train)
    }

    pub fn next_must_stop_line(&self, train: &TrainView) -> Option<ServiceLine> {
        self.handle.next_must_stop_line(train)
    }

    pub fn advance(&self, pos: &Position, direction: Direction) -> Option<Position> {
        self.handle.advance(pos, direction)
    }

    pub fn vetoes(&self) -> &[Box<dyn InterlockingVeto>] {
        self.handle.vetoes()
    }

    /// Percentage of occupied items among {Line, InvisibleLink, Signal, Points}.
    pub fn utilization(&self) -> f64 {
        let relevant: Vec<&TrackItemView> = self
            .items
            .iter()
            .filter(|i| {
                matches!(
                    i.kind,
                    TrackItemKind::Line | TrackItemKind::InvisibleLink | TrackItemKind::Signal | TrackItemKind::Points
                )
            })
            .collect();
        if relevant.is_empty() {
            return 0.0;
        }
        let occupied = relevant.iter().filter(|i| i.train_present).count();
        100.0 * occupied as f64 / relevant.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use crate::testing::{item_line, MockSimulation};

    use super::*;

    #[test]
    fn utilization_counts_only_relevant_kinds_and_ignores_place_attached() {
        let sim = MockSimulation::new()
            .add_item(TrackItemView { train_present: true, ..item_line("i1") })
            .add_item(item_line("i2"));
        let reader = StateReader::new(&sim);
        assert_eq!(reader.utilization(), 50.0);
    }

    #[test]
    fn routes_from_indexes_by_begin_signal() {
        let sim = MockSimulation::new();
        let reader = StateReader::new(&sim);
        assert!(reader.routes_from(&SignalId("nope".into())).is_empty());
    }
}
