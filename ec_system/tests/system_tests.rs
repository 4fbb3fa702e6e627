use std::time::{Duration, Instant};

use crossbeam_channel::Receiver;

use ec_system::modules::elevator::ElevatorControl;
use ec_system::modules::system::{ElevatorSystem, SystemError};
use ec_system::utilities::console::{Console, Location, Reply};
use shared_resources::config::{ActuatorKind, ElevatorConfig, SystemConfig, TimingConfig};
use shared_resources::elevator_state::ElevatorState;
use shared_resources::error::DispatchError;
use shared_resources::floor_event::{DispatchEvent, FloorEventKind};
use shared_resources::FloorIndex;

const WAIT: Duration = Duration::from_secs(10);

fn building(floor_count: u8, ranges: &[(FloorIndex, FloorIndex)]) -> ElevatorSystem {
    let config = SystemConfig {
        floor_count,
        elevators: ranges
            .iter()
            .map(|&(min_floor, max_floor)| ElevatorConfig { min_floor, max_floor, actuator: ActuatorKind::Simulated })
            .collect(),
        timing: TimingConfig {
            floor_travel_ms: 5,
            door_open_ms: 2,
            door_hold_ms: 10,
            door_close_ms: 2,
        },
        ..SystemConfig::default()
    };
    ElevatorSystem::assemble(&config).unwrap()
}

fn wait_for_arrival(events_rx: &Receiver<DispatchEvent>, floor: FloorIndex) {
    let deadline = Instant::now() + WAIT;
    loop {
        let event = events_rx
            .recv_deadline(deadline)
            .unwrap_or_else(|_| panic!("no elevator arrived at floor {floor}"));
        if event == DispatchEvent::new(floor, FloorEventKind::ElevatorArrived) {
            return;
        }
    }
}

fn wait_until_settled(system: &ElevatorSystem) {
    let deadline = Instant::now() + WAIT;
    loop {
        let status = system.status();
        let settled = status.floors.iter().all(|floor| !floor.requested)
            && status
                .elevators
                .iter()
                .all(|elevator| elevator.state == ElevatorState::Idle && elevator.pending_requests.is_empty());
        if settled {
            return;
        }
        assert!(Instant::now() < deadline, "system did not settle: {status:?}");
        std::thread::sleep(Duration::from_millis(5));
    }
}

#[test]
fn nearest_of_two_idle_elevators_serves_the_call() {
    let system = building(10, &[(0, 9), (0, 9)]);
    let events_rx = system.subscribe();

    system.request_elevator_to_floor(5).unwrap();
    wait_for_arrival(&events_rx, 5);

    let floor = system.floor(5).unwrap();
    assert!(!floor.is_requested());
    assert_eq!(floor.docked_elevator_id(), Some(0));
    assert_eq!(system.elevators()[0].current_floor(), 5);
    assert_eq!(system.elevators()[1].current_floor(), 0);
}

#[test]
fn every_call_is_eventually_served() {
    let system = building(10, &[(0, 9), (0, 9), (3, 7)]);
    for floor in [9, 2, 6, 0, 4, 8, 1] {
        system.request_elevator_to_floor(floor).unwrap();
    }
    wait_until_settled(&system);

    let status = system.status();
    for elevator in &status.elevators {
        assert!(elevator.serves(elevator.floor));
    }
    assert!(system.dispatch_failures().try_recv().is_err());
}

#[test]
fn calls_go_to_the_elevator_that_can_reach_them() {
    let system = building(10, &[(0, 4), (5, 9)]);
    let events_rx = system.subscribe();

    system.request_elevator_to_floor(7).unwrap();
    wait_for_arrival(&events_rx, 7);
    assert_eq!(system.floor(7).unwrap().docked_elevator_id(), Some(1));
    assert_eq!(system.elevators()[0].current_floor(), 0);
}

#[test]
fn unknown_floor_is_rejected() {
    let system = building(4, &[(0, 3)]);
    let result = system.request_elevator_to_floor(4);
    assert!(matches!(result, Err(SystemError::InvalidFloor { floor: 4, floor_count: 4 })));
}

#[test]
fn building_without_elevators_reports_every_call() {
    let system = building(3, &[]);
    system.request_elevator_to_floor(1).unwrap();

    let failure = system.dispatch_failures().recv_timeout(WAIT).unwrap();
    assert_eq!(failure, DispatchError::NoElevatorAvailable(1));
    assert!(!system.floor(1).unwrap().is_requested());
}

#[test]
fn out_of_service_elevator_is_passed_over() {
    let system = building(10, &[(0, 9), (0, 9)]);
    let events_rx = system.subscribe();
    system.elevators()[0].take_out_of_service();

    system.request_elevator_to_floor(3).unwrap();
    wait_for_arrival(&events_rx, 3);
    assert_eq!(system.floor(3).unwrap().docked_elevator_id(), Some(1));
    assert_eq!(system.elevators()[0].state(), ElevatorState::OutOfOrder);
}

#[test]
fn passenger_rides_from_ground_floor_to_seventh() {
    let system = building(10, &[(0, 9)]);
    let events_rx = system.subscribe();
    let mut console = Console::new(&system);

    console.execute_line("P").unwrap();
    wait_for_arrival(&events_rx, 0);

    let reply = console.execute_line("I").unwrap();
    assert_eq!(reply, Reply::Message(String::from("Hopped in elevator 0 at floor 0.")));
    assert!(matches!(console.location(), Location::InElevator(_)));

    console.execute_line("7").unwrap();
    wait_for_arrival(&events_rx, 7);

    let reply = console.execute_line("O").unwrap();
    assert_eq!(reply, Reply::Message(String::from("Hopped out at floor 7.")));
    assert!(matches!(console.location(), Location::Floor(7)));
}
