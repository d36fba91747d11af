//! Conservative Signal Override.
//!
//! Same preconditions as [`crate::candidates::proceed`], but proposes
//! setting a manual aspect on the signal itself rather than issuing a
//! proceed command to the train: the *most cautious* proceed aspect among
//! those the signal can display.

use crate::reader::StateReader;
use crate::reason::Reason;
use crate::safety::{block_clear, path_conflict_free, path_to_position};
use crate::suggestion::{Action, ActionObject, ActionVerb, Suggestion, SuggestionId};

/// Maps an aspect name to the host's colour vocabulary.
/// Anything other than the two well-known names passes through
/// upper-cased, for the host's own aspect-name-to-colour library to resolve.
fn aspect_color(name: &str) -> String {
    let upper = name.to_uppercase();
    match upper.as_str() {
        "CLEAR" => "GREEN".to_string(),
        "CAUTION" => "YELLOW".to_string(),
        other => other.to_string(),
    }
}

pub fn generate(reader: &StateReader) -> Vec<Suggestion> {
    let options = reader.options();
    let util = reader.utilization();
    let mut out = Vec::new();

    for train in reader.trains() {
        if !train.is_active() || train.speed != 0.0 {
            continue;
        }
        let Some(next_signal_id) = reader.find_next_signal(&train) else { continue };
        let Some(signal) = reader.signal(&next_signal_id) else { continue };
        if signal.means_proceed() {
            continue;
        }
        let until = crate::host::Position { item: crate::host::ItemId(next_signal_id.0.clone()), offset: 0.0, previous_item: None };
        let path = path_to_position(reader, &train, &until);
        if !block_clear(&path) {
            continue;
        }
        if path_conflict_free(reader, &train, &path, options.safety_buffer_s).is_err() {
            continue;
        }

        let cautious_aspect = signal
            .available_aspects
            .iter()
            .filter(|a| a.means_proceed)
            .min_by(|a, b| {
                let sa = a.representative_speed().unwrap_or(f64::INFINITY);
                let sb = b.representative_speed().unwrap_or(f64::INFINITY);
                sa.partial_cmp(&sb).unwrap_or(std::cmp::Ordering::Equal)
            });
        let Some(aspect) = cautious_aspect else { continue };

        let score = 7.0 + (util - 60.0).max(0.0) / 8.0;
        let reason = Reason::OverrideAspect { aspect_name: aspect.name.clone() };
        let id = SuggestionId::SignalOverride { signal: next_signal_id.clone(), aspect_name: aspect.name.clone() };
        let action = Action::new(ActionObject::Signal, ActionVerb::Status)
            .with_param("signalId", next_signal_id.0.clone())
            .with_param("color", aspect_color(&aspect.name));
        out.push(Suggestion::new(id, format!("Override signal {next_signal_id}"), reason, score, vec![action]));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{aspect_proceed, aspect_stop, item_line, item_signal, signal, stopped_train, MockSimulation};

    #[test]
    fn prefers_lowest_speed_proceed_aspect() {
        let sim = MockSimulation::new()
            .add_item(item_line("a"))
            .add_item(item_signal("sig"))
            .chain(&["a", "sig"])
            .add_signal(signal(
                "sig",
                aspect_stop("STOP"),
                vec![aspect_proceed("CLEAR", 20.0), aspect_proceed("CAUTION", 10.0)],
            ))
            .with_next_signal(5, "sig")
            .add_train(stopped_train(5, "a"));
        let reader = StateReader::new(&sim);
        let out = generate(&reader);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].id.to_string(), "SIGNAL_OVERRIDE:sig:CAUTION");
    }

    #[test]
    fn maps_known_aspect_names_to_colors() {
        assert_eq!(aspect_color("CLEAR"), "GREEN");
        assert_eq!(aspect_color("caution"), "YELLOW");
        assert_eq!(aspect_color("WARNING"), "WARNING");
    }

    #[test]
    fn no_suggestion_when_no_proceed_aspect_available() {
        let sim = MockSimulation::new()
            .add_item(item_line("a"))
            .add_item(item_signal("sig"))
            .chain(&["a", "sig"])
            .add_signal(signal("sig", aspect_stop("STOP"), vec![]))
            .with_next_signal(5, "sig")
            .add_train(stopped_train(5, "a"));
        let reader = StateReader::new(&sim);
        assert!(generate(&reader).is_empty());
    }
}
