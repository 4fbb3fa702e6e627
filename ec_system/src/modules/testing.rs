use std::collections::BTreeSet;
use std::ops::RangeInclusive;

use parking_lot::Mutex;

use shared_resources::direction::Direction;
use shared_resources::elevator_state::ElevatorState;
use shared_resources::error::ElevatorError;
use shared_resources::{ElevatorId, FloorIndex};

use super::elevator::ElevatorControl;

/// An elevator that quotes a fixed cost and only records what it is asked to do.
pub struct FixedCostElevator {
    id: ElevatorId,
    cost: u32,
    floors: RangeInclusive<FloorIndex>,
    state: ElevatorState,
    requests: Mutex<Vec<FloorIndex>>,
}

impl FixedCostElevator {
    pub fn new(id: ElevatorId, cost: u32) -> Self {
        FixedCostElevator {
            id,
            cost,
            floors: 0..=9,
            state: ElevatorState::Idle,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn serving(mut self, floors: RangeInclusive<FloorIndex>) -> Self {
        self.floors = floors;
        self
    }

    pub fn in_state(mut self, state: ElevatorState) -> Self {
        self.state = state;
        self
    }

    pub fn requests(&self) -> Vec<FloorIndex> {
        self.requests.lock().clone()
    }
}

impl ElevatorControl for FixedCostElevator {
    fn id(&self) -> ElevatorId {
        self.id
    }

    fn allowed_floors(&self) -> RangeInclusive<FloorIndex> {
        self.floors.clone()
    }

    fn state(&self) -> ElevatorState {
        self.state
    }

    fn direction(&self) -> Direction {
        Direction::Up
    }

    fn current_floor(&self) -> FloorIndex {
        *self.floors.start()
    }

    fn estimated_cost(&self, floor: FloorIndex) -> Result<u32, ElevatorError> {
        if !self.floors.contains(&floor) {
            return Err(ElevatorError::InvalidFloorIndex {
                elevator: self.id,
                floor,
                min_floor: *self.floors.start(),
                max_floor: *self.floors.end(),
            });
        }
        Ok(self.cost)
    }

    fn add_floor_request(&self, floor: FloorIndex) -> Result<(), ElevatorError> {
        self.estimated_cost(floor)?;
        self.requests.lock().push(floor);
        Ok(())
    }

    fn pending_requests(&self) -> BTreeSet<FloorIndex> {
        self.requests.lock().iter().copied().collect()
    }

    fn request_door_open(&self) -> bool {
        true
    }

    fn request_door_close(&self) -> bool {
        true
    }
}
