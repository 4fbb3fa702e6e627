pub mod config;
pub mod direction;
pub mod elevator_state;
pub mod error;
pub mod floor_event;

/// Index of a floor in the building, `0` is the lowest floor.
pub type FloorIndex = u8;

/// Stable identity of an elevator, assigned in registration order.
pub type ElevatorId = u8;
