//! Predictive Route Activation.

use crate::candidates::util::{route_has_usable_positions, track_code_adheres};
use crate::geometry::{distance_to_signal, estimate_eta};
use crate::host::TrainStatus;
use crate::reader::StateReader;
use crate::reason::Reason;
use crate::safety::{block_clear, path_conflict_free, path_on_route};
use crate::suggestion::{Action, ActionObject, ActionVerb, Suggestion, SuggestionId};

/// At most one predictive suggestion per train: the first route whose checks all pass wins, in the
/// reader's iteration order.
pub fn generate(reader: &StateReader) -> Vec<Suggestion> {
    let options = reader.options();
    let util = reader.utilization();
    let mut out = Vec::new();

    for train in reader.trains() {
        if !train.is_active() || train.status != TrainStatus::Running {
            continue;
        }
        let Some(next_signal) = reader.find_next_signal(&train) else { continue };
        let Some(signal) = reader.signal(&next_signal) else { continue };
        if signal.means_proceed() {
            continue;
        }

        let distance = distance_to_signal(reader, &train, &next_signal);
        if distance > options.predictive_max_distance_m {
            continue;
        }
        let eta = estimate_eta(&train, distance);
        if eta > options.predictive_max_eta_s {
            continue;
        }

        let must_stop_line = reader.next_must_stop_line(&train);

        for route in reader.routes_from(&next_signal) {
            if !route_has_usable_positions(route.positions.len()) {
                continue;
            }
            if reader.vetoes().iter().any(|veto| veto.can_activate(route).is_err()) {
                tracing::debug!(train = train.id, route = %route.id, "predictive activation vetoed by interlocking");
                continue;
            }
            let path = path_on_route(reader, route, &train);
            if !block_clear(&path) {
                continue;
            }
            if path_conflict_free(reader, &train, &path, options.safety_buffer_s).is_err() {
                continue;
            }
            if let Some(line) = &must_stop_line {
                let touches_place = path.iter().any(|item| item.place.as_ref() == Some(&line.place));
                if touches_place && !track_code_adheres(&path, line) {
                    continue;
                }
            }

            let score = 15.0 + (options.predictive_max_eta_s - eta) / 10.0;
            let reason = Reason::PredictiveApproach { distance_m: distance, eta_s: eta };
            let id = SuggestionId::RouteActivate { train: train.id, route: route.id.clone(), predictive: true };
            let action = Action::new(ActionObject::Route, ActionVerb::Activate)
                .with_param("routeId", route.id.0.clone())
                .with_param("trainId", train.id)
                .with_param("persistent", false);
            out.push(Suggestion::new(id, format!("Pre-activate route {}", route.id), reason, score, vec![action]));
            break;
        }
    }
    out
}
