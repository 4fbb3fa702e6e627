use crate::FloorIndex;

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FloorEventKind {
    ButtonPressed,
    ButtonOff,
    ElevatorArrived,
    ElevatorLeft,
}

/// Published by a floor station to every subscriber whenever its button or
/// docking state changes.
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchEvent {
    pub floor: FloorIndex,
    pub kind: FloorEventKind,
}

impl DispatchEvent {
    pub fn new(floor: FloorIndex, kind: FloorEventKind) -> Self {
        DispatchEvent { floor, kind }
    }
}
