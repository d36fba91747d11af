//! Persistent Route Deactivation (targeted).
//!
//! Only proposes deactivating a persistent route when doing so would unblock
//! a ready departure: find routes the interlocking blames by name in its
//! veto message, then deactivate the blamed route if it is itself idle.

use std::collections::BTreeMap;

use crate::candidates::util::{ready_departures, route_has_usable_positions};
use crate::error::extract_conflicting_route_id;
use crate::host::{RouteId, RouteState};
use crate::reader::StateReader;
use crate::reason::Reason;
use crate::suggestion::{Action, ActionObject, ActionVerb, Suggestion, SuggestionId};

const TOP_N: usize = 5;

pub fn generate(reader: &StateReader) -> Vec<Suggestion> {
    let util = reader.utilization();
    let mut blocked_by: BTreeMap<RouteId, Vec<u64>> = BTreeMap::new();

    for ready in ready_departures(reader) {
        for route in reader.routes_from(&ready.next_signal) {
            if !route_has_usable_positions(route.positions.len()) {
                continue;
            }
            let occupied_by_other = route
                .positions
                .iter()
                .skip(1)
                .filter(|p| p.item != ready.train.head.item)
                .filter_map(|p| reader.item(&p.item))
                .any(|item| item.train_present);
            if occupied_by_other {
                continue;
            }
            if let Some(blocking) = reader.vetoes().iter().find_map(|veto| match veto.can_activate(route) {
                Ok(()) => None,
                Err(message) => extract_conflicting_route_id(&message),
            }) {
                blocked_by.entry(blocking).or_default().push(ready.train.id);
                break;
            }
        }
    }

    let mut candidates: Vec<(RouteId, usize)> = Vec::new();
    for (route_id, mut blocked_trains) in blocked_by {
        let Some(route) = reader.route(&route_id) else { continue };
        if route.state != RouteState::Persistent {
            continue;
        }
        let occupied = route.positions.iter().filter_map(|p| reader.item(&p.item)).any(|item| item.train_present);
        if occupied {
            continue;
        }
        blocked_trains.sort_unstable();
        blocked_trains.dedup();
        candidates.push((route_id, blocked_trains.len()));
    }

    candidates.sort_by(|a, b| b.1.cmp(&a.1));
    candidates.truncate(TOP_N);

    candidates
        .into_iter()
        .map(|(route_id, blocked_count)| {
            let score = 8.0 + 3.0 * blocked_count as f64 + (util - 50.0).max(0.0) / 8.0;
            let reason = Reason::BlocksReadyDepartures { count: blocked_count };
            let id = SuggestionId::RouteDeactivate { route: route_id.clone() };
            let action = Action::new(ActionObject::Route, ActionVerb::Deactivate).with_param("routeId", route_id.0.clone());
            Suggestion::new(id, format!("Deactivate route {route_id}"), reason, score, vec![action])
        })
        .collect()
}
