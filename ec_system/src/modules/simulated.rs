//! ----- SIMULATED ACTUATOR MODULE -----
//! Stands in for the motor and the doors of one elevator. Every command
//! replaces the single running timer; when the timer runs out the matching
//! `MotionEvent` is reported back to the elevator's thread.

use std::io;
use std::thread;
use std::time::Instant;

use crossbeam_channel::{after, never, select, unbounded, Receiver, Sender};
use tracing::{debug, trace, warn};

use shared_resources::config::TimingConfig;
use shared_resources::direction::Direction;
use shared_resources::ElevatorId;

use super::actuator::{MotionActuator, MotionCommand, MotionEvent};

pub struct SimulatedActuator {
    id: ElevatorId,
    commands_tx: Sender<MotionCommand>,
}

impl SimulatedActuator {
    pub fn spawn(
        id: ElevatorId,
        timing: TimingConfig,
        motion_events_tx: Sender<MotionEvent>,
    ) -> io::Result<Self> {
        let (commands_tx, commands_rx) = unbounded();
        thread::Builder::new()
            .name(format!("elevator_{id}_motion"))
            .spawn(move || main(id, timing, commands_rx, motion_events_tx))?;
        Ok(SimulatedActuator { id, commands_tx })
    }

    fn send(&self, command: MotionCommand) {
        if self.commands_tx.send(command).is_err() {
            warn!(elevator = self.id, ?command, "motion thread is gone");
        }
    }
}

impl MotionActuator for SimulatedActuator {
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
enum Timer {
    Travel,
    DoorOpening,
    DoorHold,
    DoorClosing,
}

fn main(
    id: ElevatorId,
    timing: TimingConfig,
    commands_rx: Receiver<MotionCommand>,
    motion_events_tx: Sender<MotionEvent>,
) {
    let mut pending: Option<(Timer, Instant)> = None;

    loop {
        let timeout = match pending {
            Some((_, deadline)) => after(deadline.saturating_duration_since(Instant::now())),
            None => never(),
        };

        select! {
            recv(commands_rx) -> msg => {
                let Ok(command) = msg else { break };
                trace!(elevator = id, ?command, "motion command");
                let now = Instant::now();
                pending = match (command, pending) {
                    // a direction change keeps the car's progress towards the next floor
                    (MotionCommand::StartMoving(_), Some((Timer::Travel, deadline))) => Some((Timer::Travel, deadline)),
                    (MotionCommand::StartMoving(_), _) => Some((Timer::Travel, now + timing.floor_travel())),
                    (MotionCommand::StopMoving, _) => None,
                    (MotionCommand::StartDoorOpening, _) => Some((Timer::DoorOpening, now + timing.door_open())),
                    (MotionCommand::StartDoorClosing, _) => Some((Timer::DoorClosing, now + timing.door_close())),
                };
            },
            recv(timeout) -> _ => {
                let Some((timer, deadline)) = pending.take() else { continue };
                let event = match timer {
                    Timer::Travel => {
                        pending = Some((Timer::Travel, deadline + timing.floor_travel()));
                        MotionEvent::ArrivedAtNextFloor
                    },
                    Timer::DoorOpening => {
                        pending = Some((Timer::DoorHold, deadline + timing.door_hold()));
                        MotionEvent::DoorOpened
                    },
                    Timer::DoorHold => MotionEvent::DoorHoldExpired,
                    Timer::DoorClosing => MotionEvent::DoorClosed,
                };
                if motion_events_tx.send(event).is_err() {
                    break;
                }
            },
        }
    }
    debug!(elevator = id, "motion thread exiting");
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    const WAIT: Duration = Duration::from_secs(5);

    fn fast_timing() -> TimingConfig {
        TimingConfig {
            floor_travel_ms: 10,
            door_open_ms: 5,
            door_hold_ms: 20,
            door_close_ms: 5,
        }
    }

    #[test]
    fn moving_reports_every_floor_until_stopped() {
        let (events_tx, events_rx) = unbounded();
        let mut actuator = SimulatedActuator::spawn(0, fast_timing(), events_tx).unwrap();

        actuator.start_moving(Direction::Up);
        assert_eq!(events_rx.recv_timeout(WAIT), Ok(MotionEvent::ArrivedAtNextFloor));
        assert_eq!(events_rx.recv_timeout(WAIT), Ok(MotionEvent::ArrivedAtNextFloor));

        actuator.stop_moving();
        // drain an arrival that may have raced the stop
        let _ = events_rx.recv_timeout(Duration::from_millis(15));
        assert!(events_rx.recv_timeout(Duration::from_millis(50)).is_err());
    }

    #[test]
    fn door_cycle_reports_in_order() {
        let (events_tx, events_rx) = unbounded();
        let mut actuator = SimulatedActuator::spawn(1, fast_timing(), events_tx).unwrap();

        actuator.start_door_opening();
        assert_eq!(events_rx.recv_timeout(WAIT), Ok(MotionEvent::DoorOpened));
        assert_eq!(events_rx.recv_timeout(WAIT), Ok(MotionEvent::DoorHoldExpired));

        actuator.start_door_closing();
        assert_eq!(events_rx.recv_timeout(WAIT), Ok(MotionEvent::DoorClosed));
    }

    #[test]
    fn opening_doors_cancels_a_close() {
        let timing = TimingConfig { door_close_ms: 200, ..fast_timing() };
        let (events_tx, events_rx) = unbounded();
        let mut actuator = SimulatedActuator::spawn(2, timing, events_tx).unwrap();

        actuator.start_door_closing();
        actuator.start_door_opening();
        assert_eq!(events_rx.recv_timeout(WAIT), Ok(MotionEvent::DoorOpened));
        assert_eq!(events_rx.recv_timeout(WAIT), Ok(MotionEvent::DoorHoldExpired));
        assert!(events_rx.recv_timeout(Duration::from_millis(300)).is_err());
    }

    #[test]
    fn thread_exits_when_the_elevator_hangs_up() {
        let (events_tx, events_rx) = unbounded();
        let mut actuator = SimulatedActuator::spawn(3, fast_timing(), events_tx).unwrap();
        drop(events_rx);

        actuator.start_moving(Direction::Down);
        thread::sleep(Duration::from_millis(50));
        // the command channel is closed once the thread is gone
        assert!(actuator.commands_tx.send(MotionCommand::StopMoving).is_err());
    }
}
