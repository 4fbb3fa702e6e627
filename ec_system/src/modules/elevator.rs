//! ----- ELEVATOR MODULE -----
//! The state machine of a single elevator. Requests and door commands arrive
//! from any thread and are serialized through the controller's own lock;
//! completion events from the actuator are fed in by the elevator's thread
//! (see `ElevatorController::spawn`). Floor stations are told about
//! departures and arrivals only after the lock has been released.

use std::collections::BTreeSet;
use std::io;
use std::ops::RangeInclusive;
use std::sync::{Arc, Weak};
use std::thread::{self, JoinHandle};

use crossbeam_channel::Receiver;
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use shared_resources::direction::Direction;
use shared_resources::elevator_state::ElevatorState;
use shared_resources::error::ElevatorError;
use shared_resources::{ElevatorId, FloorIndex};

use crate::utilities::elevator_status::ElevatorStatus;

use super::actuator::{MotionActuator, MotionEvent};
use super::floor::FloorStation;
use super::scan::{self, NextState};

/// What the dispatcher and user interfaces may do with an elevator.
pub trait ElevatorControl: Send + Sync {
    fn id(&self) -> ElevatorId;

    fn allowed_floors(&self) -> RangeInclusive<FloorIndex>;

    fn state(&self) -> ElevatorState;

    fn direction(&self) -> Direction;

    fn current_floor(&self) -> FloorIndex;

    /// Heuristic cost of serving `floor`, only meaningful relative to other
    /// elevators' estimates.
    fn estimated_cost(&self, floor: FloorIndex) -> Result<u32, ElevatorError>;

    fn add_floor_request(&self, floor: FloorIndex) -> Result<(), ElevatorError>;

    fn pending_requests(&self) -> BTreeSet<FloorIndex>;

    /// Returns `false` when the elevator is in no state to open its doors;
    /// the caller may retry.
    fn request_door_open(&self) -> bool;

    fn request_door_close(&self) -> bool;
}

enum FloorNotice {
    Arrived(FloorIndex),
    Left(FloorIndex),
}

struct Motion {
    state: ElevatorState,
    floor: FloorIndex,
    direction: Direction,
    pending: BTreeSet<FloorIndex>,
    next_stop: Option<FloorIndex>,
    // a stop was added while moving; rescan at the next floor
    rescan: bool,
    actuator: Box<dyn MotionActuator>,
}

impl Motion {
    fn calculate_next_state(&mut self, id: ElevatorId, notices: &mut Vec<FloorNotice>) {
        if self.state != ElevatorState::Idle {
            warn!(elevator = id, state = %self.state, "scan requested while not idle");
            return;
        }
        let next_state = scan::next_state(&self.pending, self.floor, self.direction);
        debug!(elevator = id, floor = self.floor, direction = %self.direction, pending = ?self.pending, ?next_state, "scan");
        match next_state {
            NextState::Idle => self.next_stop = None,
            NextState::OpenDoors => self.open_doors_for_stop(id, notices),
            NextState::Move { direction, next_stop } => {
                self.direction = direction;
                self.next_stop = Some(next_stop);
                self.rescan = false;
                self.state = ElevatorState::Moving;
                self.actuator.start_moving(direction);
            },
        }
    }

    fn open_doors_for_stop(&mut self, id: ElevatorId, notices: &mut Vec<FloorNotice>) {
        info!(elevator = id, floor = self.floor, "stopping, doors opening");
        self.pending.remove(&self.floor);
        self.next_stop = None;
        self.rescan = false;
        self.state = ElevatorState::DoorOpening;
        self.actuator.start_door_opening();
        notices.push(FloorNotice::Arrived(self.floor));
    }
}

pub struct ElevatorController {
    id: ElevatorId,
    min_floor: FloorIndex,
    max_floor: FloorIndex,
    floors: Vec<Arc<FloorStation>>,
    me: Weak<ElevatorController>,
    motion: Mutex<Motion>,
}

impl ElevatorController {
    /// The car starts idle at `min_floor`, facing up. `floors` is indexed by
    /// floor index and must cover the serviceable range.
    pub fn new(
        id: ElevatorId,
        min_floor: FloorIndex,
        max_floor: FloorIndex,
        floors: Vec<Arc<FloorStation>>,
        actuator: Box<dyn MotionActuator>,
    ) -> Arc<Self> {
        Arc::new_cyclic(|me| ElevatorController {
            id,
            min_floor,
            max_floor,
            floors,
            me: me.clone(),
            motion: Mutex::new(Motion {
                state: ElevatorState::Idle,
                floor: min_floor,
                direction: Direction::Up,
                pending: BTreeSet::new(),
                next_stop: None,
                rescan: false,
                actuator,
            }),
        })
    }

    /// Starts the elevator's thread, which applies the actuator's completion
    /// events in the order they were reported.
    pub fn spawn(self: &Arc<Self>, motion_events_rx: Receiver<MotionEvent>) -> io::Result<JoinHandle<()>> {
        let controller = Arc::clone(self);
        thread::Builder::new()
            .name(format!("elevator_{}", self.id))
            .spawn(move || main(controller, motion_events_rx))
    }

    pub fn handle_motion_event(&self, event: MotionEvent) {
        match event {
            MotionEvent::ArrivedAtNextFloor => self.arrived_at_next_floor(),
            MotionEvent::DoorOpened => self.door_opened(),
            MotionEvent::DoorHoldExpired => {
                self.request_door_close();
            },
            MotionEvent::DoorClosed => self.door_closed(),
        }
    }

    pub fn arrived_at_next_floor(&self) {
        let (id, shaft) = (self.id, self.min_floor..=self.max_floor);
        self.update(|motion, notices| {
            if motion.state != ElevatorState::Moving {
                warn!(elevator = id, state = %motion.state, "ignoring arrival, not moving");
                return;
            }
            let next_floor = match motion.direction.step(motion.floor) {
                Some(floor) if shaft.contains(&floor) => floor,
                _ => {
                    warn!(elevator = id, floor = motion.floor, direction = %motion.direction, "arrival would leave the shaft, stopping");
                    motion.actuator.stop_moving();
                    motion.state = ElevatorState::Idle;
                    motion.next_stop = None;
                    motion.calculate_next_state(id, notices);
                    return;
                },
            };
            notices.push(FloorNotice::Left(motion.floor));
            motion.floor = next_floor;
            info!(elevator = id, floor = motion.floor, direction = %motion.direction, "reached floor");

            if motion.rescan {
                motion.rescan = false;
                match scan::next_state(&motion.pending, motion.floor, motion.direction) {
                    NextState::OpenDoors => {
                        motion.open_doors_for_stop(id, notices);
                        return;
                    },
                    NextState::Move { direction, next_stop } => {
                        motion.next_stop = Some(next_stop);
                        if direction != motion.direction {
                            motion.direction = direction;
                            motion.actuator.start_moving(direction);
                        }
                    },
                    NextState::Idle => motion.next_stop = None,
                }
            }

            match motion.next_stop {
                Some(stop) if stop == motion.floor => motion.open_doors_for_stop(id, notices),
                Some(_) => (),
                None => {
                    motion.actuator.stop_moving();
                    motion.state = ElevatorState::Idle;
                },
            }
        });
    }

    pub fn door_opened(&self) {
        let id = self.id;
        self.update(|motion, _| {
            if motion.state != ElevatorState::DoorOpening {
                warn!(elevator = id, state = %motion.state, "ignoring door opened");
                return;
            }
            info!(elevator = id, floor = motion.floor, "doors open");
            motion.state = ElevatorState::DoorOpen;
        });
    }

    /// A close that was superseded by a reopen is ignored here.
    pub fn door_closed(&self) {
        let id = self.id;
        self.update(|motion, notices| {
            if motion.state != ElevatorState::DoorClosing {
                warn!(elevator = id, state = %motion.state, "ignoring door closed");
                return;
            }
            info!(elevator = id, floor = motion.floor, "doors closed");
            motion.state = ElevatorState::Idle;
            motion.calculate_next_state(id, notices);
        });
    }

    /// Parks the elevator in `OutOfOrder`; every later actuator event is
    /// ignored and the dispatcher no longer assigns it requests.
    pub fn take_out_of_service(&self) {
        let id = self.id;
        self.update(|motion, _| {
            warn!(elevator = id, floor = motion.floor, "taken out of service");
            motion.actuator.stop_moving();
            motion.state = ElevatorState::OutOfOrder;
            motion.next_stop = None;
            motion.rescan = false;
        });
    }

    pub fn next_stop(&self) -> Option<FloorIndex> {
        self.motion.lock().next_stop
    }

    pub fn status(&self) -> ElevatorStatus {
        let motion = self.motion.lock();
        ElevatorStatus {
            id: self.id,
            min_floor: self.min_floor,
            max_floor: self.max_floor,
            state: motion.state,
            floor: motion.floor,
            direction: motion.direction,
            next_stop: motion.next_stop,
            pending_requests: motion.pending.clone(),
        }
    }

    fn check_floor(&self, floor: FloorIndex) -> Result<(), ElevatorError> {
        if (self.min_floor..=self.max_floor).contains(&floor) {
            Ok(())
        } else {
            Err(ElevatorError::InvalidFloorIndex {
                elevator: self.id,
                floor,
                min_floor: self.min_floor,
                max_floor: self.max_floor,
            })
        }
    }

    fn update<R>(&self, f: impl FnOnce(&mut Motion, &mut Vec<FloorNotice>) -> R) -> R {
        let mut notices = Vec::new();
        let result = {
            let mut motion = self.motion.lock();
            f(&mut motion, &mut notices)
        };
        self.notify(notices);
        result
    }

    fn notify(&self, notices: Vec<FloorNotice>) {
        if notices.is_empty() {
            return;
        }
        let Some(me) = self.me.upgrade() else { return };
        let me: Arc<dyn ElevatorControl> = me;
        for notice in notices {
            match notice {
                FloorNotice::Arrived(floor) => {
                    if let Some(station) = self.floors.get(floor as usize) {
                        station.elevator_arrived(&me);
                    }
                },
                FloorNotice::Left(floor) => {
                    if let Some(station) = self.floors.get(floor as usize) {
                        station.elevator_left(self.id);
                    }
                },
            }
        }
    }
}

impl ElevatorControl for ElevatorController {
    fn id(&self) -> ElevatorId {
        self.id
    }

    fn allowed_floors(&self) -> RangeInclusive<FloorIndex> {
        self.min_floor..=self.max_floor
    }

    fn state(&self) -> ElevatorState {
        self.motion.lock().state
    }

    fn direction(&self) -> Direction {
        self.motion.lock().direction
    }

    fn current_floor(&self) -> FloorIndex {
        self.motion.lock().floor
    }

    fn estimated_cost(&self, floor: FloorIndex) -> Result<u32, ElevatorError> {
        self.check_floor(floor)?;
        let motion = self.motion.lock();
        let cost = scan::estimate_cost(motion.state, motion.direction, motion.floor, &motion.pending, floor);
        debug!(elevator = self.id, requested = floor, floor = motion.floor, direction = %motion.direction, cost, "estimated cost");
        Ok(cost)
    }

    fn add_floor_request(&self, floor: FloorIndex) -> Result<(), ElevatorError> {
        if let Err(error) = self.check_floor(floor) {
            warn!(elevator = self.id, %error, "rejected floor request");
            return Err(error);
        }
        let id = self.id;
        self.update(|motion, notices| {
            if floor == motion.floor {
                match motion.state {
                    ElevatorState::DoorOpening | ElevatorState::DoorOpen => {
                        // already standing here with the doors open
                        notices.push(FloorNotice::Arrived(floor));
                        return;
                    },
                    ElevatorState::DoorClosing => {
                        info!(elevator = id, floor, "reopening doors for request");
                        motion.state = ElevatorState::DoorOpening;
                        motion.actuator.start_door_opening();
                        notices.push(FloorNotice::Arrived(floor));
                        return;
                    },
                    _ => (),
                }
            }
            if !motion.pending.insert(floor) {
                debug!(elevator = id, floor, "floor already requested");
                return;
            }
            debug!(elevator = id, floor, pending = ?motion.pending, "floor requested");
            match motion.state {
                ElevatorState::Idle => motion.calculate_next_state(id, notices),
                ElevatorState::Moving => motion.rescan = true,
                _ => (),
            }
        });
        Ok(())
    }

    fn pending_requests(&self) -> BTreeSet<FloorIndex> {
        self.motion.lock().pending.clone()
    }

    fn request_door_open(&self) -> bool {
        let id = self.id;
        self.update(|motion, _| match motion.state {
            ElevatorState::Idle | ElevatorState::DoorClosing => {
                info!(elevator = id, floor = motion.floor, "door open request accepted");
                motion.state = ElevatorState::DoorOpening;
                motion.actuator.start_door_opening();
                true
            },
            ElevatorState::DoorOpening | ElevatorState::DoorOpen => true,
            ElevatorState::Moving | ElevatorState::OutOfOrder => {
                info!(elevator = id, state = %motion.state, "door open request denied");
                false
            },
        })
    }

    fn request_door_close(&self) -> bool {
        let id = self.id;
        self.update(|motion, _| {
            if motion.state != ElevatorState::DoorOpen {
                debug!(elevator = id, state = %motion.state, "door close request denied");
                return false;
            }
            info!(elevator = id, floor = motion.floor, "doors closing");
            motion.state = ElevatorState::DoorClosing;
            motion.actuator.start_door_closing();
            true
        })
    }
}

fn main(controller: Arc<ElevatorController>, motion_events_rx: Receiver<MotionEvent>) {
    for event in motion_events_rx.iter() {
        controller.handle_motion_event(event);
    }
    debug!(elevator = controller.id, "actuator disconnected, elevator thread exiting");
}
