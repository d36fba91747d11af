//! Departure Route Activation.

use crate::candidates::util::{head_track_code_matches, ready_departures, route_has_usable_positions, track_code_adheres};
use crate::reason::Reason;
use crate::safety::{block_clear, path_conflict_free, path_on_route};
use crate::suggestion::{Action, ActionObject, ActionVerb, Suggestion, SuggestionId};
use crate::reader::StateReader;

pub fn generate(reader: &StateReader) -> Vec<Suggestion> {
    let options = reader.options();
    let util = reader.utilization();
    let mut out = Vec::new();

    for ready in ready_departures(reader) {
        let Some(head_item) = reader.item(&ready.train.head.item) else { continue };

        for route in reader.routes_from(&ready.next_signal) {
            if !route_has_usable_positions(route.positions.len()) {
                continue;
            }
            if reader.vetoes().iter().any(|veto| veto.can_activate(route).is_err()) {
                tracing::debug!(train = ready.train.id, route = %route.id, "departure vetoed by interlocking");
                continue;
            }
            let path = path_on_route(reader, route, &ready.train);
            if !block_clear(&path) {
                continue;
            }
            if path_conflict_free(reader, &ready.train, &path, options.safety_buffer_s).is_err() {
                continue;
            }
            if !track_code_adheres(&path, &ready.line) {
                continue;
            }

            let departure = ready.line.scheduled_departure.expect("ready_departures guarantees Some");
            let delay_minutes = ((reader.now() - departure) as f64 / 60.0).max(0.0);
            let head_bonus = if head_track_code_matches(&head_item, &ready.line) { 2.0 } else { 0.0 };
            let score = 1.0 + 10.0 * delay_minutes + head_bonus + (50.0 - util).max(0.0) / 10.0;

            let reason = Reason::DepartureReady { scheduled: departure };
            let id = SuggestionId::RouteActivate { train: ready.train.id, route: route.id.clone(), predictive: false };
            let action = Action::new(ActionObject::Route, ActionVerb::Activate)
                .with_param("routeId", route.id.0.clone())
                .with_param("trainId", ready.train.id)
                .with_param("persistent", false);
            out.push(Suggestion::new(id, format!("Activate route {}", route.id), reason, score, vec![action]));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::SimTime;
    use crate::host::{Options, PlaceId, RouteState, TrainStatus};
    use crate::testing::{item_line, item_signal, route, service_line, stopped_train, AllowAll, MockSimulation};

    fn base_sim() -> MockSimulation {
        MockSimulation::new()
            .with_now(SimTime(6 * 3600 + 5 * 60 + 10))
            .add_item(crate::host::TrackItemView { place: Some(PlaceId("STA".into())), track_code: Some("1".into()), ..item_line("platform") })
            .add_item(item_signal("sig"))
            .add_item(item_line("beyond"))
            .chain(&["platform", "sig", "beyond"])
            .add_route(route("R1", "sig", "end", vec!["sig", "beyond"]))
            .with_next_signal(0, "sig")
            .with_veto(Box::new(AllowAll))
    }

    fn stopped_with_line(now: SimTime) -> crate::host::TrainView {
        let mut train = stopped_train(0, "platform");
        train.status = TrainStatus::Stopped;
        train.stopped_time = 30.0;
        train.min_stop_time = 30.0;
        train.service = crate::host::Service {
            lines: vec![service_line("STA", Some("1"), Some(now.plus_seconds(-10)), false)],
        };
        train
    }

    #[test]
    fn on_time_departure_scores_at_least_three() {
        let now = SimTime(6 * 3600 + 5 * 60 + 10);
        let train = stopped_with_line(now);
        let sim = base_sim().add_train(train);
        let reader = StateReader::new(&sim);
        let out = generate(&reader);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].id.to_string(), "ROUTE_ACTIVATE:0:R1");
        assert!(out[0].score >= 3.0, "score was {}", out[0].score);
    }

    #[test]
    fn delayed_departure_with_low_utilization_scores_exactly() {
        // S2: now = 06:07:00, departure 06:05:00, utilization 30%.
        let departure = SimTime(6 * 3600 + 5 * 60);
        let now = SimTime(6 * 3600 + 7 * 60);
        let mut train = stopped_with_line(now);
        train.service.lines = vec![service_line("STA", Some("1"), Some(departure), false)];

        let mut sim = MockSimulation::new()
            .with_now(now)
            .with_veto(Box::new(AllowAll))
            .with_next_signal(0, "sig")
            .add_item(crate::host::TrackItemView { place: Some(PlaceId("STA".into())), track_code: Some("1".into()), ..item_line("platform") })
            .add_item(item_signal("sig"))
            .add_item(item_line("beyond"))
            .chain(&["platform", "sig", "beyond"])
            .add_route(route("R1", "sig", "end", vec!["sig", "beyond"]))
            .add_train(train);
        // 10 relevant items total (platform, sig, beyond + 7 filler), 3 occupied => 30%.
        for i in 0..7 {
            sim = sim.add_item(item_line(&format!("filler{i}")));
        }
        for i in 0..3 {
            sim = sim.add_item(crate::host::TrackItemView { train_present: true, ..item_line(&format!("occ{i}")) });
        }

        let reader = StateReader::new(&sim);
        assert_eq!(reader.utilization(), 30.0);
        let out = generate(&reader);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].score, 25.0);
    }

    #[test]
    fn route_with_no_positions_beyond_begin_signal_is_skipped() {
        let now = SimTime(6 * 3600 + 5 * 60 + 10);
        let sim = base_sim()
            .add_train(stopped_with_line(now))
            .add_route(route("R_empty", "sig", "end", vec!["sig"]));
        let reader = StateReader::new(&sim);
        let out = generate(&reader);
        assert!(out.iter().all(|s| s.id.to_string() != "ROUTE_ACTIVATE:0:R_empty"));
    }

    #[test]
    fn scheduled_departure_equal_to_now_requires_min_stop() {
        let now = SimTime(6 * 3600 + 5 * 60);
        let mut train = stopped_with_line(now);
        train.service.lines = vec![service_line("STA", Some("1"), Some(now), false)];
        train.stopped_time = 10.0;
        train.min_stop_time = 30.0;
        let sim = base_sim().with_now(now).add_train(train);
        let reader = StateReader::new(&sim);
        assert!(generate(&reader).is_empty());
    }

    #[test]
    fn unoccupied_persistent_route_state_does_not_block_activation() {
        let now = SimTime(6 * 3600 + 5 * 60 + 10);
        let sim = base_sim().add_train(stopped_with_line(now));
        sim.set_route_state("R1", RouteState::Deactivated);
        let reader = StateReader::new(&sim);
        assert_eq!(generate(&reader).len(), 1);
        let _ = Options::default();
    }
}
