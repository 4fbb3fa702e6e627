//! ----- FLOOR MODULE -----
//! One floor's call button and the elevator currently docked there. Every
//! change is published as a `DispatchEvent` to the subscribed channels; the
//! dispatcher is one such subscriber, user interfaces may add their own.

use std::sync::{Arc, Weak};

use crossbeam_channel::Sender;
use parking_lot::Mutex;
use tracing::debug;

use shared_resources::floor_event::{DispatchEvent, FloorEventKind};
use shared_resources::{ElevatorId, FloorIndex};

use super::elevator::ElevatorControl;

struct Docked {
    elevator: ElevatorId,
    control: Weak<dyn ElevatorControl>,
}

struct FloorInner {
    requested: bool,
    docked: Option<Docked>,
    subscribers: Vec<Sender<DispatchEvent>>,
}

impl FloorInner {
    fn publish(&mut self, event: DispatchEvent) {
        // subscribers that hung up are dropped
        self.subscribers.retain(|subscriber| subscriber.send(event).is_ok());
    }
}

pub struct FloorStation {
    id: FloorIndex,
    inner: Mutex<FloorInner>,
}

impl FloorStation {
    pub fn new(id: FloorIndex) -> Self {
        FloorStation {
            id,
            inner: Mutex::new(FloorInner {
                requested: false,
                docked: None,
                subscribers: Vec::new(),
            }),
        }
    }

    pub fn id(&self) -> FloorIndex {
        self.id
    }

    pub fn subscribe(&self, subscriber: Sender<DispatchEvent>) {
        self.inner.lock().subscribers.push(subscriber);
    }

    /// Presses (`true`) or resets (`false`) the call button. Only an actual
    /// change is published.
    pub fn set_requested(&self, requested: bool) {
        let mut inner = self.inner.lock();
        if inner.requested == requested {
            return;
        }
        inner.requested = requested;
        let kind = if requested { FloorEventKind::ButtonPressed } else { FloorEventKind::ButtonOff };
        debug!(floor = self.id, ?kind, "call button changed");
        inner.publish(DispatchEvent::new(self.id, kind));
    }

    pub fn is_requested(&self) -> bool {
        self.inner.lock().requested
    }

    pub fn docked_elevator(&self) -> Option<Arc<dyn ElevatorControl>> {
        self.inner
            .lock()
            .docked
            .as_ref()
            .and_then(|docked| docked.control.upgrade())
    }

    pub fn docked_elevator_id(&self) -> Option<ElevatorId> {
        self.inner.lock().docked.as_ref().map(|docked| docked.elevator)
    }

    pub fn elevator_arrived(&self, elevator: &Arc<dyn ElevatorControl>) {
        let mut inner = self.inner.lock();
        inner.requested = false;
        inner.docked = Some(Docked {
            elevator: elevator.id(),
            control: Arc::downgrade(elevator),
        });
        inner.publish(DispatchEvent::new(self.id, FloorEventKind::ElevatorArrived));
    }

    /// Clears the docking record, unless a different elevator has docked
    /// since `elevator` arrived.
    pub fn elevator_left(&self, elevator: ElevatorId) {
        let mut inner = self.inner.lock();
        match &inner.docked {
            Some(docked) if docked.elevator == elevator => {
                inner.docked = None;
                inner.publish(DispatchEvent::new(self.id, FloorEventKind::ElevatorLeft));
            },
            _ => (),
        }
    }
}
