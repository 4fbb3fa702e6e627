//! ----- ACTUATOR MODULE -----
//! The seam between an elevator's state machine and whatever physically
//! moves the car and its doors. The controller calls the hooks while it holds
//! its own lock; the actuator reports completion asynchronously as
//! `MotionEvent`s on the channel it was created with.

use shared_resources::direction::Direction;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionEvent {
    /// The car has travelled one floor in the direction it was started in.
    ArrivedAtNextFloor,
    DoorOpened,
    /// The doors have been open for the actuator's hold time.
    DoorHoldExpired,
    DoorClosed,
}

pub trait MotionActuator: Send {
    /// Start (or keep) the car moving; one `ArrivedAtNextFloor` is reported
    /// per floor passed until the motion is stopped or the doors are opened.
    fn start_moving(&mut self, direction: Direction);

    fn stop_moving(&mut self);

    /// Stops any motion and cancels a pending door close.
    fn start_door_opening(&mut self);

    fn start_door_closing(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionCommand {
    StartMoving(Direction),
    StopMoving,
    StartDoorOpening,
    StartDoorClosing,
}

#[cfg(test)]
pub(crate) mod recording {
    use std::sync::Arc;

    use parking_lot::Mutex;

    use super::*;

    /// Records every hook call so tests can step the state machine by hand.
    #[derive(Clone, Default)]
    pub struct RecordingActuator {
        commands: Arc<Mutex<Vec<MotionCommand>>>,
    }

    impl RecordingActuator {
        pub fn take(&self) -> Vec<MotionCommand> {
            std::mem::take(&mut *self.commands.lock())
        }
    }

    impl MotionActuator for RecordingActuator {
        fn start_moving(&mut self, direction: Direction) {
            self.commands.lock().push(MotionCommand::StartMoving(direction));
        }

        fn stop_moving(&mut self) {
            self.commands.lock().push(MotionCommand::StopMoving);
        }

        fn start_door_opening(&mut self) {
            self.commands.lock().push(MotionCommand::StartDoorOpening);
        }

        fn start_door_closing(&mut self) {
            self.commands.lock().push(MotionCommand::StartDoorClosing);
        }
    }
}
