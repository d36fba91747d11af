//! Helpers shared across candidate generators: the "ready to depart"
//! precondition set (used by both departure activation and route
//! deactivation) and track-code adherence (used by departure and
//! predictive activation).

use crate::host::{ServiceLine, SignalId, TrackItemView, TrainStatus, TrainView};
use crate::reader::StateReader;

/// A train that has met every departure precondition short of the
/// per-route safety/veto checks: Stopped, head at a Place, past its
/// scheduled departure, minimum stop satisfied.
pub struct ReadyDeparture {
    pub train: TrainView,
    pub line: ServiceLine,
    pub next_signal: SignalId,
}

pub fn ready_departures(reader: &StateReader) -> Vec<ReadyDeparture> {
    let now = reader.now();
    reader
        .trains()
        .into_iter()
        .filter(|t| t.is_active() && t.status == TrainStatus::Stopped)
        .filter_map(|train| {
            let head_item = reader.item(&train.head.item)?;
            head_item.place.as_ref()?;
            let line = train.current_service_line()?.clone();
            let departure = line.scheduled_departure.filter(|t| t.0 != 0)?;
            if now < departure {
                return None;
            }
            if train.stopped_time < train.min_stop_time {
                return None;
            }
            let next_signal = reader.find_next_signal(&train)?;
            Some(ReadyDeparture { train, line, next_signal })
        })
        .collect()
}

/// Every item on `path` that belongs to `line.place` must either carry no
/// track code or match `line.track_code` — "track-code adherence within place".
/// Vacuously true when the line has no track code constraint.
pub fn track_code_adheres(path: &[TrackItemView], line: &ServiceLine) -> bool {
    let Some(required) = line.track_code.as_deref().filter(|c| !c.is_empty()) else {
        return true;
    };
    path.iter()
        .filter(|item| item.place == Some(line.place.clone()))
        .all(|item| match item.track_code.as_deref() {
            None => true,
            Some(c) if c.is_empty() => true,
            Some(c) => c == required,
        })
}

/// Whether the train's head item's track code matches the scheduled one
/// (the departure score's +2 bonus term).
pub fn head_track_code_matches(head_item: &TrackItemView, line: &ServiceLine) -> bool {
    match (line.track_code.as_deref(), head_item.track_code.as_deref()) {
        (Some(required), Some(actual)) if !required.is_empty() => actual == required,
        _ => false,
    }
}

/// Minutes of delay relative to the train's current service line's
/// scheduled time (departure preferred, falling back to arrival); 0 when
/// neither is specified.
pub fn delay_minutes_at_current_line(reader: &StateReader, train: &TrainView) -> f64 {
    let Some(line) = train.current_service_line() else { return 0.0 };
    let scheduled = line
        .scheduled_departure
        .filter(|t| t.0 != 0)
        .or_else(|| line.scheduled_arrival.filter(|t| t.0 != 0));
    match scheduled {
        Some(sched) => (reader.now() - sched) as f64 / 60.0,
        None => 0.0,
    }
}

/// A route with no positions beyond the begin signal carries nothing to
/// activate and is always skipped.
pub fn route_has_usable_positions(positions_len: usize) -> bool {
    positions_len > 1
}
