use std::collections::BTreeSet;

use shared_resources::direction::Direction;
use shared_resources::elevator_state::ElevatorState;
use shared_resources::{ElevatorId, FloorIndex};

#[derive(serde::Serialize, serde::Deserialize, PartialEq, Eq, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ElevatorStatus {
    pub id: ElevatorId,
    pub min_floor: FloorIndex,
    pub max_floor: FloorIndex,
    pub state: ElevatorState,
    pub floor: FloorIndex,
    pub direction: Direction,
    pub next_stop: Option<FloorIndex>,
    pub pending_requests: BTreeSet<FloorIndex>,
}

impl ElevatorStatus {
    pub fn serves(&self, floor: FloorIndex) -> bool {
        (self.min_floor..=self.max_floor).contains(&floor)
    }
}

#[derive(serde::Serialize, serde::Deserialize, PartialEq, Eq, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct FloorStatus {
    pub floor: FloorIndex,
    pub requested: bool,
    pub docked_elevator: Option<ElevatorId>,
}

/// Snapshot of the whole building, for the status table and `J` in the console.
#[derive(serde::Serialize, serde::Deserialize, PartialEq, Eq, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct SystemStatus {
    pub floors: Vec<FloorStatus>,
    pub elevators: Vec<ElevatorStatus>,
}

impl SystemStatus {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_camel_case_keys() {
        let status = SystemStatus {
            floors: vec![FloorStatus { floor: 0, requested: true, docked_elevator: None }],
            elevators: vec![ElevatorStatus {
                id: 0,
                min_floor: 0,
                max_floor: 3,
                state: ElevatorState::DoorOpen,
                floor: 2,
                direction: Direction::Down,
                next_stop: None,
                pending_requests: BTreeSet::from([0]),
            }],
        };

        let json: serde_json::Value = serde_json::from_str(&status.to_json().unwrap()).unwrap();
        assert_eq!(json["floors"][0]["dockedElevator"], serde_json::Value::Null);
        assert_eq!(json["elevators"][0]["pendingRequests"], serde_json::json!([0]));
        assert_eq!(json["elevators"][0]["state"], "doorOpen");
        assert!(status.elevators[0].serves(3));
        assert!(!status.elevators[0].serves(4));
    }
}
