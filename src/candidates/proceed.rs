//! Proceed With Caution.

use crate::candidates::util::delay_minutes_at_current_line;
use crate::reader::StateReader;
use crate::reason::Reason;
use crate::safety::{block_clear, path_conflict_free, path_to_position};
use crate::suggestion::{Action, ActionObject, ActionVerb, Suggestion, SuggestionId};

pub fn generate(reader: &StateReader) -> Vec<Suggestion> {
    let options = reader.options();
    let util = reader.utilization();
    let mut out = Vec::new();

    for train in reader.trains() {
        if !train.is_active() || train.speed != 0.0 {
            continue;
        }
        let Some(next_signal) = reader.find_next_signal(&train) else { continue };
        let Some(signal) = reader.signal(&next_signal) else { continue };
        if signal.means_proceed() {
            continue;
        }
        let until = crate::host::Position { item: crate::host::ItemId(next_signal.0.clone()), offset: 0.0, previous_item: None };
        let path = path_to_position(reader, &train, &until);
        if !block_clear(&path) {
            continue;
        }
        if path_conflict_free(reader, &train, &path, options.safety_buffer_s).is_err() {
            continue;
        }

        let delay_minutes = delay_minutes_at_current_line(reader, &train).max(0.0);
        let score = 5.0 + delay_minutes + (util - 60.0).max(0.0) / 12.0;
        let reason = Reason::ProceedPathClear;
        let id = SuggestionId::TrainProceedWithCaution { train: train.id };
        let action = Action::new(ActionObject::Train, ActionVerb::Proceed).with_param("trainId", train.id);
        out.push(Suggestion::new(id, "Proceed with caution", reason, score, vec![action]));
    }
    out
}
