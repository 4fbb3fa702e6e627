#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum ElevatorState {
    Idle,
    Moving,
    DoorOpening,
    DoorOpen,
    DoorClosing,
    OutOfOrder,
}

impl ElevatorState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ElevatorState::Idle => "idle",
            ElevatorState::Moving => "moving",
            ElevatorState::DoorOpening => "doorOpening",
            ElevatorState::DoorOpen => "doorOpen",
            ElevatorState::DoorClosing => "doorClosing",
            ElevatorState::OutOfOrder => "outOfOrder",
        }
    }

    /// True while the doors are anywhere between closed and fully open.
    pub fn doors_active(&self) -> bool {
        matches!(
            self,
            ElevatorState::DoorOpening | ElevatorState::DoorOpen | ElevatorState::DoorClosing
        )
    }
}

impl std::fmt::Display for ElevatorState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
