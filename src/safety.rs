//! Safety Predicates (SP).
//!
//! Every predicate here is conservative: an unknown link, a missing item, or
//! an inconclusive comparison all resolve to "do not suggest" (an `Err`),
//! never to a pass. Candidate generators treat any `Err` as a silent skip.

use crate::geometry::{braking_target_speed, distance_to_item_start, estimate_eta};
use crate::host::{ItemId, Position, RouteView, TrackItemView, TrainView};
use crate::reader::StateReader;

/// Items strictly between `train`'s head and `until`, excluding the head's
/// own item, in walk order.
pub fn path_to_position(reader: &StateReader, train: &TrainView, until: &Position) -> Vec<TrackItemView> {
    let mut items = Vec::new();
    let mut pos = train.head.clone();
    loop {
        let next = match reader.advance(&pos, train.direction) {
            Some(next) => next,
            None => break,
        };
        if next.item == until.item {
            break;
        }
        match reader.item(&next.item) {
            Some(item) => items.push(item),
            None => break,
        }
        pos = next;
    }
    items
}

/// Items on `route` from position 1 onward, excluding `train`'s own head item.
pub fn path_on_route(reader: &StateReader, route: &RouteView, train: &TrainView) -> Vec<TrackItemView> {
    route
        .positions
        .iter()
        .skip(1)
        .filter(|p| p.item != train.head.item)
        .filter_map(|p| reader.item(&p.item))
        .collect()
}

/// No train present on any item in `path`.
pub fn block_clear(path: &[TrackItemView]) -> bool {
    path.iter().all(|item| !item.train_present)
}

fn intervals_overlap(a: (f64, f64), b: (f64, f64)) -> bool {
    a.0 <= b.1 && b.0 <= a.1
}

/// Finds the other active train with the smallest finite forward distance to
/// the start of `target`, if any.
fn closest_approaching_train(reader: &StateReader, exclude: u64, target: &ItemId) -> Option<(TrainView, f64)> {
    let mut best: Option<(TrainView, f64)> = None;
    for other in reader.trains() {
        if other.id == exclude || !other.is_active() {
            continue;
        }
        let dist = distance_to_item_start(reader, &other, target);
        if !dist.is_finite() {
            continue;
        }
        if best.as_ref().map_or(true, |(_, best_dist)| dist < *best_dist) {
            best = Some((other, dist));
        }
    }
    best
}

/// Shared ETA-window comparison used by both crossing and head-on
/// prediction: does `train`'s clearance window around `my_target` overlap
/// the closest approaching train's window around `other_target`?
fn eta_window_conflict(
    reader: &StateReader,
    train: &TrainView,
    my_target: &ItemId,
    other_target: &ItemId,
    clearance_item: &TrackItemView,
    safety_buffer_s: f64,
) -> Result<(), String> {
    let (other, other_dist) = match closest_approaching_train(reader, train.id, other_target) {
        Some(found) => found,
        None => return Ok(()),
    };
    let my_eta = estimate_eta(train, distance_to_item_start(reader, train, my_target));
    let other_eta = estimate_eta(&other, other_dist);
    let my_clear = (train.train_length + clearance_item.real_length) / braking_target_speed(train).max(0.5);
    let other_clear = (other.train_length + clearance_item.real_length) / braking_target_speed(&other).max(0.5);
    let my_window = (my_eta, my_eta + my_clear + safety_buffer_s);
    let other_window = (other_eta, other_eta + other_clear + safety_buffer_s);
    if intervals_overlap(my_window, other_window) {
        Err(format!(
            "eta windows overlap near {} with train {}",
            clearance_item.id, other.service_code
        ))
    } else {
        Ok(())
    }
}

/// Crossing prediction for item `item`: fails if `item`'s
/// conflict item is occupied, or if the closest train approaching the
/// conflict item's ETA window overlaps this train's ETA window to `item`.
pub fn crossing_ok(reader: &StateReader, train: &TrainView, item: &TrackItemView, safety_buffer_s: f64) -> Result<(), String> {
    let conflict_id = match &item.conflict_item {
        Some(id) => id.clone(),
        None => return Ok(()),
    };
    let conflict_item = match reader.item(&conflict_id) {
        Some(item) => item,
        None => return Err(format!("unknown conflict item {conflict_id}")),
    };
    if conflict_item.train_present {
        return Err(format!("conflict item {conflict_id} occupied"));
    }
    eta_window_conflict(reader, train, &item.id, &conflict_id, &conflict_item, safety_buffer_s)
}

/// Head-on prediction for item `item`: same item is the
/// target for both trains' ETA windows.
pub fn head_on_ok(reader: &StateReader, train: &TrainView, item: &TrackItemView, safety_buffer_s: f64) -> Result<(), String> {
    eta_window_conflict(reader, train, &item.id, &item.id, item, safety_buffer_s)
}

/// Crossing and head-on predicates hold for every item in `path`.
pub fn path_conflict_free(reader: &StateReader, train: &TrainView, path: &[TrackItemView], safety_buffer_s: f64) -> Result<(), String> {
    for item in path {
        crossing_ok(reader, train, item, safety_buffer_s)?;
        head_on_ok(reader, train, item, safety_buffer_s)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{Direction, ItemId};
    use crate::testing::{item_line, running_train, stopped_train, MockSimulation};

    #[test]
    fn block_clear_fails_when_any_item_occupied() {
        let occupied = crate::host::TrackItemView { train_present: true, ..item_line("b") };
        assert!(!block_clear(&[item_line("a"), occupied]));
    }

    #[test]
    fn block_clear_holds_on_empty_path() {
        assert!(block_clear(&[]));
    }

    #[test]
    fn path_to_position_excludes_head_item() {
        let sim = MockSimulation::new()
            .add_item(item_line("a"))
            .add_item(item_line("b"))
            .add_item(item_line("c"))
            .chain(&["a", "b", "c"]);
        let reader = StateReader::new(&sim);
        let train = stopped_train(1, "a");
        let until = crate::host::Position { item: ItemId("c".into()), offset: 0.0, previous_item: None };
        let path = path_to_position(&reader, &train, &until);
        let ids: Vec<_> = path.iter().map(|i| i.id.0.clone()).collect();
        assert_eq!(ids, vec!["b".to_string()]);
    }

    #[test]
    fn crossing_ok_passes_when_no_conflict_item() {
        let sim = MockSimulation::new().add_item(item_line("a"));
        let reader = StateReader::new(&sim);
        let train = stopped_train(1, "a");
        let item = reader.item(&ItemId("a".into())).unwrap();
        assert!(crossing_ok(&reader, &train, &item, 5.0).is_ok());
    }

    #[test]
    fn crossing_fails_when_conflict_item_occupied() {
        let conflict = crate::host::TrackItemView { train_present: true, ..item_line("x2") };
        let item = crate::host::TrackItemView { conflict_item: Some(ItemId("x2".into())), ..item_line("x1") };
        let sim = MockSimulation::new().add_item(item.clone()).add_item(conflict);
        let reader = StateReader::new(&sim);
        let train = stopped_train(1, "x1");
        assert!(crossing_ok(&reader, &train, &item, 5.0).is_err());
    }

    #[test]
    fn crossing_fails_when_eta_windows_overlap() {
        // T1 approaching x1 (conflict: x2); T2 approaching x2 at an overlapping time.
        let x1 = crate::host::TrackItemView {
            conflict_item: Some(ItemId("x2".into())),
            real_length: 10.0,
            ..item_line("x1")
        };
        let x2 = crate::host::TrackItemView { real_length: 10.0, ..item_line("x2") };
        let sim = MockSimulation::new()
            .add_item(item_line("approach1"))
            .add_item(x1.clone())
            .add_item(item_line("approach2"))
            .add_item(x2)
            .chain(&["approach1", "x1"])
            .chain(&["approach2", "x2"])
            .add_train(running_train(2, "approach2", 10.0));
        let mut train1 = running_train(1, "approach1", 10.0);
        train1.head = crate::host::Position { item: ItemId("approach1".into()), offset: 90.0, previous_item: None };
        let reader = StateReader::new(&sim);
        assert!(crossing_ok(&reader, &train1, &x1, 5.0).is_err());
    }

    #[test]
    fn head_on_passes_when_no_other_train_approaching() {
        let sim = MockSimulation::new().add_item(item_line("a"));
        let reader = StateReader::new(&sim);
        let train = stopped_train(1, "a");
        let item = reader.item(&ItemId("a".into())).unwrap();
        assert!(head_on_ok(&reader, &train, &item, 5.0).is_ok());
    }

    #[test]
    fn direction_reverse_is_respected_by_path_walk() {
        let sim = MockSimulation::new()
            .add_item(item_line("a"))
            .add_item(item_line("b"))
            .chain(&["a", "b"]);
        let reader = StateReader::new(&sim);
        let mut train = stopped_train(1, "b");
        train.direction = Direction::Reverse;
        let until = crate::host::Position { item: ItemId("a".into()), offset: 0.0, previous_item: None };
        // Reverse from b should reach a directly; path excludes both endpoints' special cases.
        let path = path_to_position(&reader, &train, &until);
        assert!(path.is_empty());
    }
}
