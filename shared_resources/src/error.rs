use thiserror::Error;

use crate::{ElevatorId, FloorIndex};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ElevatorError {
    /// The floor lies outside the elevator's serviceable range.
    #[error("invalid floor index {floor} for elevator {elevator} (serves {min_floor}..={max_floor})")]
    InvalidFloorIndex {
        elevator: ElevatorId,
        floor: FloorIndex,
        min_floor: FloorIndex,
        max_floor: FloorIndex,
    },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    /// No registered elevator could take the request; the floor button was reset.
    #[error("no elevator is available to serve floor {0}")]
    NoElevatorAvailable(FloorIndex),

    #[error(transparent)]
    Elevator(#[from] ElevatorError),
}
