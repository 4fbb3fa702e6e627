//! ----- SYSTEM MODULE -----
//! Builds a running building from a `SystemConfig`: one floor station per
//! floor, one controller with its own actuator per configured elevator, and
//! the dispatcher subscribed to every floor.

use std::io;
use std::sync::Arc;

use crossbeam_channel::{unbounded, Receiver};
use thiserror::Error;
use tracing::info;

use shared_resources::config::{ActuatorKind, ConfigError, SystemConfig};
use shared_resources::error::DispatchError;
use shared_resources::floor_event::DispatchEvent;
use shared_resources::{ElevatorId, FloorIndex};

use crate::utilities::elevator_status::{FloorStatus, SystemStatus};

use super::actuator::MotionActuator;
use super::dispatcher::Dispatcher;
use super::elevator::{ElevatorControl, ElevatorController};
use super::floor::FloorStation;
use super::io::HardwareActuator;
use super::simulated::SimulatedActuator;

#[derive(Error, Debug)]
pub enum SystemError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("invalid floor {floor}, the building has {floor_count} floors")]
    InvalidFloor { floor: FloorIndex, floor_count: u8 },

    #[error("could not connect elevator {elevator} to {address}: {source}")]
    Hardware {
        elevator: ElevatorId,
        address: String,
        #[source]
        source: io::Error,
    },

    #[error("could not start thread: {0}")]
    Thread(#[from] io::Error),
}

pub struct ElevatorSystem {
    floors: Vec<Arc<FloorStation>>,
    elevators: Vec<Arc<ElevatorController>>,
    dispatch_failures_rx: Receiver<DispatchError>,
}

impl ElevatorSystem {
    pub fn assemble(config: &SystemConfig) -> Result<Self, SystemError> {
        config.validate()?;

        let floors: Vec<Arc<FloorStation>> = (0..config.floor_count)
            .map(|floor| Arc::new(FloorStation::new(floor)))
            .collect();
        let (dispatch_events_tx, dispatch_events_rx) = unbounded();
        for floor in &floors {
            floor.subscribe(dispatch_events_tx.clone());
        }

        let mut elevators = Vec::with_capacity(config.elevators.len());
        for (index, elevator_config) in config.elevators.iter().enumerate() {
            let id = ElevatorId::try_from(index)
                .map_err(|_| ConfigError::TooManyElevators(config.elevators.len()))?;
            let (motion_events_tx, motion_events_rx) = unbounded();
            let actuator: Box<dyn MotionActuator> = match elevator_config.actuator {
                ActuatorKind::Simulated => Box::new(SimulatedActuator::spawn(id, config.timing.clone(), motion_events_tx)?),
                ActuatorKind::Hardware => {
                    let address = config.server.address(id);
                    let actuator = HardwareActuator::spawn(
                        id,
                        &address,
                        config.floor_count,
                        elevator_config.min_floor,
                        config.timing.clone(),
                        motion_events_tx,
                    )
                    .map_err(|source| SystemError::Hardware { elevator: id, address, source })?;
                    Box::new(actuator)
                },
            };

            let controller = ElevatorController::new(
                id,
                elevator_config.min_floor,
                elevator_config.max_floor,
                floors.clone(),
                actuator,
            );
            controller.spawn(motion_events_rx)?;
            info!(
                elevator = id,
                min_floor = elevator_config.min_floor,
                max_floor = elevator_config.max_floor,
                actuator = ?elevator_config.actuator,
                "elevator registered"
            );
            elevators.push(controller);
        }

        let registered: Vec<Arc<dyn ElevatorControl>> = elevators
            .iter()
            .map(|elevator| Arc::clone(elevator) as Arc<dyn ElevatorControl>)
            .collect();
        let (dispatch_failures_tx, dispatch_failures_rx) = unbounded();
        Dispatcher::new(registered, floors.clone()).spawn(dispatch_events_rx, dispatch_failures_tx)?;

        info!(floors = floors.len(), elevators = elevators.len(), "elevator system assembled");
        Ok(ElevatorSystem { floors, elevators, dispatch_failures_rx })
    }

    pub fn floor_count(&self) -> u8 {
        self.floors.len() as u8
    }

    pub fn floor(&self, floor: FloorIndex) -> Result<&Arc<FloorStation>, SystemError> {
        self.floors.get(floor as usize).ok_or(SystemError::InvalidFloor {
            floor,
            floor_count: self.floor_count(),
        })
    }

    pub fn elevator(&self, id: ElevatorId) -> Option<&Arc<ElevatorController>> {
        self.elevators.get(id as usize)
    }

    pub fn elevators(&self) -> &[Arc<ElevatorController>] {
        &self.elevators
    }

    /// Presses the call button at `floor`, as a passenger waiting there would.
    pub fn request_elevator_to_floor(&self, floor: FloorIndex) -> Result<(), SystemError> {
        self.floor(floor)?.set_requested(true);
        Ok(())
    }

    /// A new channel receiving every event of every floor from now on.
    pub fn subscribe(&self) -> Receiver<DispatchEvent> {
        let (events_tx, events_rx) = unbounded();
        for floor in &self.floors {
            floor.subscribe(events_tx.clone());
        }
        events_rx
    }

    /// Requests the dispatcher could not place, after their buttons were reset.
    pub fn dispatch_failures(&self) -> &Receiver<DispatchError> {
        &self.dispatch_failures_rx
    }

    pub fn status(&self) -> SystemStatus {
        SystemStatus {
            floors: self
                .floors
                .iter()
                .map(|floor| FloorStatus {
                    floor: floor.id(),
                    requested: floor.is_requested(),
                    docked_elevator: floor.docked_elevator_id(),
                })
                .collect(),
            elevators: self.elevators.iter().map(|elevator| elevator.status()).collect(),
        }
    }
}
