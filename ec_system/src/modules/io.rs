//! ----- I/O MODULE -----
//! Drives one physical elevator through the elevator server: the motor, the
//! door light and the floor indicator. Floor sensor and obstruction switch
//! are polled on their own threads and turned into `MotionEvent`s for the
//! elevator's thread.

use std::io;
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{after, never, select, unbounded, Receiver, Sender};
use driver_rust::elevio::{elev, poll};
use tracing::{debug, info, warn};

use shared_resources::config::TimingConfig;
use shared_resources::direction::Direction;
use shared_resources::{ElevatorId, FloorIndex};

use super::actuator::{MotionActuator, MotionCommand, MotionEvent};

const POLL_PERIOD: Duration = Duration::from_millis(25);

pub fn motor_constant(direction: Option<Direction>) -> u8 {
    match direction {
        Some(Direction::Up) => elev::DIRN_UP,
        Some(Direction::Down) => elev::DIRN_DOWN,
        None => elev::DIRN_STOP,
    }
}

pub struct HardwareActuator {
    id: ElevatorId,
    commands_tx: Sender<MotionCommand>,
}

impl HardwareActuator {
    /// Connects to the elevator server at `address` and brings the car to
    /// `min_floor` before any command is carried out.
    pub fn spawn(
        id: ElevatorId,
        address: &str,
        floor_count: u8,
        min_floor: FloorIndex,
        timing: TimingConfig,
        motion_events_tx: Sender<MotionEvent>,
    ) -> io::Result<Self> {
        let elevator = elev::Elevator::init(address, floor_count)?;
        info!(elevator = id, address, "connected to elevator server");

        let (floor_sensor_tx, floor_sensor_rx) = unbounded();
        {
            let elevator = elevator.clone();
            thread::Builder::new()
                .name(format!("elevator_{id}_floor_sensor"))
                .spawn(move || poll::floor_sensor(elevator, floor_sensor_tx, POLL_PERIOD))?;
        }

        let (obstruction_tx, obstruction_rx) = unbounded();
        {
            let elevator = elevator.clone();
            thread::Builder::new()
                .name(format!("elevator_{id}_obstruction"))
                .spawn(move || poll::obstruction(elevator, obstruction_tx, POLL_PERIOD))?;
        }

        let (commands_tx, commands_rx) = unbounded();
        let hardware = Hardware {
            id,
            elevator,
            timing,
            floor: None,
            moving: false,
            obstructed: false,
            pending: None,
        };
        thread::Builder::new()
            .name(format!("elevator_{id}_io"))
            .spawn(move || main(hardware, min_floor, commands_rx, floor_sensor_rx, obstruction_rx, motion_events_tx))?;

        Ok(HardwareActuator { id, commands_tx })
    }

    fn send(&self, command: MotionCommand) {
        if self.commands_tx.send(command).is_err() {
            warn!(elevator = self.id, ?command, "io thread is gone");
        }
    }
}

impl MotionActuator for HardwareActuator {
    fn start_moving(&mut self, direction: Direction) {
        self.send(MotionCommand::StartMoving(direction));
    }

    fn stop_moving(&mut self) {
        self.send(MotionCommand::StopMoving);
    }

    fn start_door_opening(&mut self) {
        self.send(MotionCommand::StartDoorOpening);
    }

    fn start_door_closing(&mut self) {
        self.send(MotionCommand::StartDoorClosing);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DoorTimer {
    Opening,
    Hold,
    Closing,
}

struct Hardware {
    id: ElevatorId,
    elevator: elev::Elevator,
    timing: TimingConfig,
    floor: Option<FloorIndex>,
    moving: bool,
    obstructed: bool,
    pending: Option<(DoorTimer, Instant)>,
}

impl Hardware {
    fn motor(&mut self, direction: Option<Direction>) {
        self.moving = direction.is_some();
        self.elevator.motor_direction(motor_constant(direction));
    }

    fn command(&mut self, command: MotionCommand) {
        let now = Instant::now();
        match command {
            MotionCommand::StartMoving(direction) => {
                self.pending = None;
                self.motor(Some(direction));
            },
            MotionCommand::StopMoving => self.motor(None),
            MotionCommand::StartDoorOpening => {
                self.motor(None);
                self.elevator.door_light(true);
                self.pending = Some((DoorTimer::Opening, now + self.timing.door_open()));
            },
            MotionCommand::StartDoorClosing => {
                self.pending = Some((DoorTimer::Closing, now + self.timing.door_close()));
            },
        }
    }

    fn timer_expired(&mut self) -> Option<MotionEvent> {
        let (timer, _) = self.pending.take()?;
        let now = Instant::now();
        match timer {
            DoorTimer::Opening => {
                self.pending = Some((DoorTimer::Hold, now + self.timing.door_hold()));
                Some(MotionEvent::DoorOpened)
            },
            DoorTimer::Hold if self.obstructed => {
                // keep the doors open while the obstruction switch is on
                self.pending = Some((DoorTimer::Hold, now + self.timing.door_hold()));
                None
            },
            DoorTimer::Hold => Some(MotionEvent::DoorHoldExpired),
            DoorTimer::Closing => {
                self.elevator.door_light(false);
                Some(MotionEvent::DoorClosed)
            },
        }
    }

    fn floor_reached(&mut self, floor: FloorIndex) -> Option<MotionEvent> {
        self.elevator.floor_indicator(floor);
        let changed = self.floor != Some(floor);
        self.floor = Some(floor);
        (self.moving && changed).then_some(MotionEvent::ArrivedAtNextFloor)
    }

    /// Drives the car to `min_floor`, going down when its position is unknown.
    fn calibrate(&mut self, min_floor: FloorIndex, floor_sensor_rx: &Receiver<u8>) {
        self.elevator.door_light(false);
        loop {
            let floor = self.elevator.floor_sensor();
            let direction = match floor {
                Some(floor) if floor == min_floor => break,
                Some(floor) if floor < min_floor => Direction::Up,
                _ => Direction::Down,
            };
            self.motor(Some(direction));
            match floor_sensor_rx.recv() {
                Ok(floor) => self.elevator.floor_indicator(floor),
                Err(_) => break,
            }
        }
        self.motor(None);
        self.floor = Some(min_floor);
        self.elevator.floor_indicator(min_floor);
        info!(elevator = self.id, floor = min_floor, "car calibrated");
    }
}

fn main(
    mut hardware: Hardware,
    min_floor: FloorIndex,
    commands_rx: Receiver<MotionCommand>,
    floor_sensor_rx: Receiver<u8>,
    obstruction_rx: Receiver<bool>,
    motion_events_tx: Sender<MotionEvent>,
) {
    hardware.calibrate(min_floor, &floor_sensor_rx);

    loop {
        let timeout = match hardware.pending {
            Some((_, deadline)) => after(deadline.saturating_duration_since(Instant::now())),
            None => never(),
        };

        let event = select! {
            recv(commands_rx) -> msg => {
                let Ok(command) = msg else { break };
                hardware.command(command);
                None
            },
            recv(floor_sensor_rx) -> msg => {
                let Ok(floor) = msg else { break };
                hardware.floor_reached(floor)
            },
            recv(obstruction_rx) -> msg => {
                let Ok(obstructed) = msg else { break };
                debug!(elevator = hardware.id, obstructed, "obstruction switch");
                hardware.obstructed = obstructed;
                None
            },
            recv(timeout) -> _ => hardware.timer_expired(),
        };

        if let Some(event) = event {
            if motion_events_tx.send(event).is_err() {
                break;
            }
        }
    }
    hardware.motor(None);
    debug!(elevator = hardware.id, "io thread exiting");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn motor_constants_follow_direction() {
        assert_eq!(motor_constant(Some(Direction::Up)), elev::DIRN_UP);
        assert_eq!(motor_constant(Some(Direction::Down)), elev::DIRN_DOWN);
        assert_eq!(motor_constant(None), elev::DIRN_STOP);
    }
}
