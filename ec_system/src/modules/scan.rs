//! ----- SCAN MODULE -----
//! Stateless next-stop and cost calculations over an elevator's pending
//! stops. The car keeps sweeping in its current direction while there are
//! stops ahead of it and only reverses once that side is exhausted.

use std::collections::BTreeSet;
use std::ops::Bound::{Excluded, Unbounded};

use shared_resources::direction::Direction;
use shared_resources::elevator_state::ElevatorState;
use shared_resources::FloorIndex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextState {
    Idle,
    OpenDoors,
    Move {
        direction: Direction,
        next_stop: FloorIndex,
    },
}

pub fn nearest_below(pending: &BTreeSet<FloorIndex>, floor: FloorIndex) -> Option<FloorIndex> {
    pending.range(..floor).next_back().copied()
}

pub fn nearest_above(pending: &BTreeSet<FloorIndex>, floor: FloorIndex) -> Option<FloorIndex> {
    pending.range((Excluded(floor), Unbounded)).next().copied()
}

pub fn next_state(
    pending: &BTreeSet<FloorIndex>,
    floor: FloorIndex,
    direction: Direction,
) -> NextState {
    if pending.contains(&floor) {
        return NextState::OpenDoors;
    }
    let down_next = nearest_below(pending, floor);
    let up_next = nearest_above(pending, floor);
    let (ahead, behind) = match direction {
        Direction::Up => (up_next, down_next),
        Direction::Down => (down_next, up_next),
    };
    match (ahead, behind) {
        (Some(next_stop), _) => NextState::Move { direction, next_stop },
        (None, Some(next_stop)) => NextState::Move { direction: direction.opposite(), next_stop },
        (None, None) => NextState::Idle,
    }
}

/// Distance to `requested`, plus twice the remaining sweep when a moving car
/// would first have to finish travelling away from it.
pub fn estimate_cost(
    state: ElevatorState,
    direction: Direction,
    floor: FloorIndex,
    pending: &BTreeSet<FloorIndex>,
    requested: FloorIndex,
) -> u32 {
    let mut cost = floor.abs_diff(requested) as u32;
    if state == ElevatorState::Moving {
        let furthest = match direction {
            Direction::Up if requested < floor => pending.last(),
            Direction::Down if requested > floor => pending.first(),
            _ => None,
        };
        if let Some(&furthest) = furthest {
            cost += 2 * floor.abs_diff(furthest) as u32;
        }
    }
    cost
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stops(floors: &[FloorIndex]) -> BTreeSet<FloorIndex> {
        floors.iter().copied().collect()
    }

    #[test]
    fn nothing_pending_is_idle() {
        assert_eq!(next_state(&stops(&[]), 4, Direction::Up), NextState::Idle);
    }

    #[test]
    fn current_floor_opens_doors_regardless_of_direction() {
        let pending = stops(&[1, 4, 8]);
        assert_eq!(next_state(&pending, 4, Direction::Up), NextState::OpenDoors);
        assert_eq!(next_state(&pending, 4, Direction::Down), NextState::OpenDoors);
    }

    #[test]
    fn keeps_sweeping_up_past_a_nearer_stop_below() {
        let pending = stops(&[3, 9]);
        assert_eq!(
            next_state(&pending, 4, Direction::Up),
            NextState::Move { direction: Direction::Up, next_stop: 9 },
        );
    }

    #[test]
    fn keeps_sweeping_down_to_the_nearest_stop_below() {
        let pending = stops(&[0, 2, 5]);
        assert_eq!(
            next_state(&pending, 4, Direction::Down),
            NextState::Move { direction: Direction::Down, next_stop: 2 },
        );
    }

    #[test]
    fn reverses_when_nothing_is_ahead() {
        let pending = stops(&[1, 2]);
        assert_eq!(
            next_state(&pending, 4, Direction::Up),
            NextState::Move { direction: Direction::Down, next_stop: 2 },
        );
        let pending = stops(&[6, 9]);
        assert_eq!(
            next_state(&pending, 4, Direction::Down),
            NextState::Move { direction: Direction::Up, next_stop: 6 },
        );
    }

    #[test]
    fn nearest_lookups_exclude_the_current_floor() {
        let pending = stops(&[2, 5, 7]);
        assert_eq!(nearest_below(&pending, 5), Some(2));
        assert_eq!(nearest_above(&pending, 5), Some(7));
        assert_eq!(nearest_below(&pending, 2), None);
        assert_eq!(nearest_above(&pending, FloorIndex::MAX), None);
    }

    #[test]
    fn idle_cost_is_plain_distance() {
        let cost = estimate_cost(ElevatorState::Idle, Direction::Up, 0, &stops(&[]), 5);
        assert_eq!(cost, 5);
    }

    #[test]
    fn moving_up_away_from_request_pays_for_the_sweep() {
        let cost = estimate_cost(ElevatorState::Moving, Direction::Up, 3, &stops(&[8]), 1);
        assert_eq!(cost, 2 + 10);
    }

    #[test]
    fn moving_up_towards_request_has_no_penalty() {
        let cost = estimate_cost(ElevatorState::Moving, Direction::Up, 3, &stops(&[8]), 6);
        assert_eq!(cost, 3);
    }

    #[test]
    fn moving_down_away_from_request_pays_for_the_sweep() {
        let cost = estimate_cost(ElevatorState::Moving, Direction::Down, 6, &stops(&[2, 4]), 8);
        assert_eq!(cost, 2 + 8);
    }

    #[test]
    fn doors_open_means_no_directional_penalty() {
        let cost = estimate_cost(ElevatorState::DoorOpen, Direction::Up, 3, &stops(&[8]), 1);
        assert_eq!(cost, 2);
    }
}
