//! Geometry & Kinematics Helper (GKH).
//!
//! Pure distance/ETA arithmetic over the host's position graph. Never
//! mutates, never caches across calls; every call re-walks from the train's
//! current head through [`StateReader::advance`].

use crate::host::{ItemId, SignalId, TrainView};
use crate::reader::StateReader;

/// ETA sentinel for a stationary train ("far") — one simulation hour.
pub const FAR_ETA_SECONDS: f64 = 3600.0;

/// Floor on the averaging speed used for ETA, so a train creeping toward a
/// full stop still produces a finite, conservative ETA.
const MIN_AVG_SPEED_MPS: f64 = 0.5;

fn walk_until<F>(reader: &StateReader, train: &TrainView, mut is_target: F) -> f64
where
    F: FnMut(&crate::host::TrackItemView) -> bool,
{
    let mut total = 0.0;
    let mut pos = train.head.clone();
    loop {
        let item = match reader.item(&pos.item) {
            Some(item) => item,
            None => return f64::INFINITY,
        };
        if is_target(&item) {
            return total;
        }
        total += (item.real_length - pos.offset).max(0.0);
        pos = match reader.advance(&pos, train.direction) {
            Some(next) => next,
            None => return f64::INFINITY,
        };
    }
}

/// Forward distance (meters) from `train`'s head to `signal`, or `+∞` if the
/// walk runs off the graph first.
pub fn distance_to_signal(reader: &StateReader, train: &TrainView, signal: &SignalId) -> f64 {
    walk_until(reader, train, |item| {
        item.kind == crate::host::TrackItemKind::Signal && item.id.0 == signal.0
    })
}

/// Forward distance (meters) from `train`'s head to the start of `item`.
pub fn distance_to_item_start(reader: &StateReader, train: &TrainView, item: &ItemId) -> f64 {
    walk_until(reader, train, |candidate| candidate.id == *item)
}

/// Time-to-arrival given current speed and the braking target, floored at
/// [`MIN_AVG_SPEED_MPS`]. A stationary train returns [`FAR_ETA_SECONDS`]
/// rather than dividing by zero.
pub fn estimate_eta(train: &TrainView, distance_m: f64) -> f64 {
    if train.speed <= 0.0 {
        return FAR_ETA_SECONDS;
    }
    let braking_target = train.applicable_action_speed.filter(|&s| s < train.speed);
    let avg_speed = match braking_target {
        Some(target) => (train.speed + target) / 2.0,
        None => train.speed,
    }
    .max(MIN_AVG_SPEED_MPS);
    distance_m / avg_speed
}

/// The speed a "clearance duration" calculation should use: the braking
/// target if the train is decelerating, otherwise its current speed.
pub fn braking_target_speed(train: &TrainView) -> f64 {
    train.applicable_action_speed.filter(|&s| s < train.speed).unwrap_or(train.speed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::Position;
    use crate::testing::{item_line, item_signal, running_train, stopped_train, MockSimulation};

    #[test]
    fn distance_to_signal_sums_remaining_and_full_item_lengths() {
        let sim = MockSimulation::new()
            .add_item(item_line("a"))
            .add_item(item_line("b"))
            .add_item(item_signal("sig"))
            .chain(&["a", "b", "sig"]);
        let reader = StateReader::new(&sim);
        let mut train = stopped_train(1, "a");
        train.head = Position { item: crate::host::ItemId("a".into()), offset: 40.0, previous_item: None };
        let dist = distance_to_signal(&reader, &train, &crate::host::SignalId("sig".into()));
        assert_eq!(dist, (100.0 - 40.0) + 100.0);
    }

    #[test]
    fn distance_to_signal_is_infinite_when_walk_runs_off_graph() {
        let sim = MockSimulation::new().add_item(item_line("a"));
        let reader = StateReader::new(&sim);
        let train = stopped_train(1, "a");
        let dist = distance_to_signal(&reader, &train, &crate::host::SignalId("nowhere".into()));
        assert!(dist.is_infinite());
    }

    #[test]
    fn eta_is_far_when_stationary() {
        let train = stopped_train(1, "a");
        assert_eq!(estimate_eta(&train, 500.0), FAR_ETA_SECONDS);
    }

    #[test]
    fn eta_averages_current_and_braking_speed() {
        let mut train = running_train(1, "a", 20.0);
        train.applicable_action_speed = Some(10.0);
        // avg = 15, distance 300 -> 20s
        assert_eq!(estimate_eta(&train, 300.0), 20.0);
    }

    #[test]
    fn eta_ignores_braking_target_when_not_lower_than_current() {
        let mut train = running_train(1, "a", 20.0);
        train.applicable_action_speed = Some(25.0);
        assert_eq!(estimate_eta(&train, 200.0), 10.0);
    }

    #[test]
    fn eta_floors_average_speed() {
        let mut train = running_train(1, "a", 0.2);
        train.applicable_action_speed = None;
        // avg would be 0.2, floored to 0.5 -> 100/0.5 = 200
        assert_eq!(estimate_eta(&train, 100.0), 200.0);
    }
}
