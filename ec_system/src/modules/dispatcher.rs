//! ----- DISPATCHER MODULE -----
//! Listens to the events of every floor station and hands each pressed call
//! button to the elevator quoting the lowest cost. Reading the costs and
//! assigning is not atomic across elevators; the costs are estimates only.

use std::io;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver, Sender};
use tracing::{debug, error, info};

use shared_resources::elevator_state::ElevatorState;
use shared_resources::error::DispatchError;
use shared_resources::floor_event::{DispatchEvent, FloorEventKind};
use shared_resources::{ElevatorId, FloorIndex};

use super::elevator::ElevatorControl;
use super::floor::FloorStation;

pub struct Dispatcher {
    elevators: Vec<Arc<dyn ElevatorControl>>,
    floors: Vec<Arc<FloorStation>>,
}

impl Dispatcher {
    /// Ties between equal costs go to the elevator registered first.
    pub fn new(elevators: Vec<Arc<dyn ElevatorControl>>, floors: Vec<Arc<FloorStation>>) -> Self {
        Dispatcher { elevators, floors }
    }

    /// Returns the elevator a pressed button was assigned to, `None` for the
    /// events the dispatcher does not act on.
    pub fn handle_event(&self, event: DispatchEvent) -> Result<Option<ElevatorId>, DispatchError> {
        match event.kind {
            FloorEventKind::ButtonPressed => self.assign(event.floor).map(Some),
            FloorEventKind::ButtonOff | FloorEventKind::ElevatorArrived | FloorEventKind::ElevatorLeft => Ok(None),
        }
    }

    pub fn assign(&self, floor: FloorIndex) -> Result<ElevatorId, DispatchError> {
        let mut selected: Option<(u32, &Arc<dyn ElevatorControl>)> = None;
        for elevator in &self.elevators {
            if elevator.state() == ElevatorState::OutOfOrder {
                continue;
            }
            let cost = match elevator.estimated_cost(floor) {
                Ok(cost) => cost,
                Err(error) => {
                    debug!(elevator = elevator.id(), %error, "skipping elevator");
                    continue;
                },
            };
            if selected.map_or(true, |(lowest, _)| cost < lowest) {
                selected = Some((cost, elevator));
            }
        }

        let result = match selected {
            Some((cost, elevator)) => {
                info!(floor, elevator = elevator.id(), cost, "assigning request");
                elevator
                    .add_floor_request(floor)
                    .map(|_| elevator.id())
                    .map_err(DispatchError::from)
            },
            None => Err(DispatchError::NoElevatorAvailable(floor)),
        };
        if let Err(error) = &result {
            error!(floor, %error, "could not dispatch request");
            if let Some(station) = self.floors.get(floor as usize) {
                station.set_requested(false);
            }
        }
        result
    }

    pub fn spawn(
        self,
        events_rx: Receiver<DispatchEvent>,
        failures_tx: Sender<DispatchError>,
    ) -> io::Result<JoinHandle<()>> {
        thread::Builder::new()
            .name("dispatcher".to_string())
            .spawn(move || main(self, events_rx, failures_tx))
    }
}

fn main(dispatcher: Dispatcher, events_rx: Receiver<DispatchEvent>, failures_tx: Sender<DispatchError>) {
    for event in events_rx.iter() {
        if let Err(error) = dispatcher.handle_event(event) {
            // nobody listening for failures is fine, they are logged already
            let _ = failures_tx.send(error);
        }
    }
    debug!("all floor stations disconnected, dispatcher exiting");
}
