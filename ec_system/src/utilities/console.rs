//! ----- CONSOLE MODULE -----
//! The interactive passenger: stands at a floor or rides in an elevator and
//! turns typed commands into calls on the running system.

use std::str::FromStr;
use std::sync::Arc;

use thiserror::Error;

use shared_resources::error::ElevatorError;
use shared_resources::FloorIndex;

use crate::modules::elevator::ElevatorControl;
use crate::modules::system::{ElevatorSystem, SystemError};

#[derive(Error, Debug)]
pub enum ConsoleError {
    #[error("please select a command from the menu")]
    Empty,

    #[error("unknown command: {0}")]
    Unknown(String),

    #[error("not a floor index: {0}")]
    NotAFloor(String),

    #[error("you are not standing at a floor")]
    NotAtFloor,

    #[error("you are not inside an elevator")]
    NotInElevator,

    #[error("no elevator is docked at floor {0}")]
    NoElevatorDocked(FloorIndex),

    #[error("the elevator refused to {0} its doors, try again")]
    DoorRefused(&'static str),

    #[error(transparent)]
    Elevator(#[from] ElevatorError),

    #[error(transparent)]
    System(#[from] SystemError),

    #[error("could not serialize status: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// `R <floor>`
    Request(FloorIndex),
    /// `G <floor>`
    GoTo(FloorIndex),
    Press,
    HopIn,
    /// A bare floor index, pressed inside the elevator.
    Destination(FloorIndex),
    OpenAndHopOut,
    CloseDoor,
    Status,
    Json,
    Quit,
}

fn parse_floor(text: &str) -> Result<FloorIndex, ConsoleError> {
    text.parse().map_err(|_| ConsoleError::NotAFloor(text.to_string()))
}

impl FromStr for Command {
    type Err = ConsoleError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let Some(first) = words.next() else {
            return Err(ConsoleError::Empty);
        };
        let argument = words.next();
        if words.next().is_some() {
            return Err(ConsoleError::Unknown(line.trim().to_string()));
        }

        match (first.to_ascii_uppercase().as_str(), argument) {
            ("R", Some(floor)) => Ok(Command::Request(parse_floor(floor)?)),
            ("G", Some(floor)) => Ok(Command::GoTo(parse_floor(floor)?)),
            ("P", None) => Ok(Command::Press),
            ("I", None) => Ok(Command::HopIn),
            ("O", None) => Ok(Command::OpenAndHopOut),
            ("C", None) => Ok(Command::CloseDoor),
            ("S", None) => Ok(Command::Status),
            ("J", None) => Ok(Command::Json),
            ("X", None) => Ok(Command::Quit),
            (word, None) if word.chars().all(|c| c.is_ascii_digit()) => Ok(Command::Destination(parse_floor(word)?)),
            _ => Err(ConsoleError::Unknown(line.trim().to_string())),
        }
    }
}

pub enum Location {
    Floor(FloorIndex),
    InElevator(Arc<dyn ElevatorControl>),
}

/// What the caller should do after a command ran.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Message(String),
    ShowStatus,
    Quit,
}

pub struct Console<'a> {
    system: &'a ElevatorSystem,
    location: Location,
}

impl<'a> Console<'a> {
    /// The passenger starts at the ground floor.
    pub fn new(system: &'a ElevatorSystem) -> Self {
        Console {
            system,
            location: Location::Floor(0),
        }
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    pub fn execute_line(&mut self, line: &str) -> Result<Reply, ConsoleError> {
        let command = line.parse()?;
        self.execute(command)
    }

    pub fn execute(&mut self, command: Command) -> Result<Reply, ConsoleError> {
        match command {
            Command::Request(floor) => {
                self.system.request_elevator_to_floor(floor)?;
                Ok(Reply::Message(format!("Pressed button at floor {floor}.")))
            },
            Command::GoTo(floor) => {
                self.system.floor(floor)?;
                self.location = Location::Floor(floor);
                Ok(Reply::Message(format!("You appeared at floor {floor}.")))
            },
            Command::Press => {
                let floor = self.current_floor()?;
                self.system.request_elevator_to_floor(floor)?;
                Ok(Reply::Message(String::from("Pressed request button.")))
            },
            Command::HopIn => {
                let floor = self.current_floor()?;
                let elevator = self
                    .system
                    .floor(floor)?
                    .docked_elevator()
                    .ok_or(ConsoleError::NoElevatorDocked(floor))?;
                let message = format!("Hopped in elevator {} at floor {floor}.", elevator.id());
                self.location = Location::InElevator(elevator);
                Ok(Reply::Message(message))
            },
            Command::Destination(floor) => {
                let elevator = self.current_elevator()?;
                elevator.add_floor_request(floor)?;
                Ok(Reply::Message(format!("Pressed {floor}.")))
            },
            Command::OpenAndHopOut => {
                let elevator = self.current_elevator()?;
                if !elevator.request_door_open() {
                    return Err(ConsoleError::DoorRefused("open"));
                }
                let floor = elevator.current_floor();
                self.location = Location::Floor(floor);
                Ok(Reply::Message(format!("Hopped out at floor {floor}.")))
            },
            Command::CloseDoor => {
                if !self.current_elevator()?.request_door_close() {
                    return Err(ConsoleError::DoorRefused("close"));
                }
                Ok(Reply::Message(String::from("Closing the doors.")))
            },
            Command::Status => Ok(Reply::ShowStatus),
            Command::Json => {
                Ok(Reply::Message(self.system.status().to_json()?))
            },
            Command::Quit => Ok(Reply::Quit),
        }
    }

    pub fn menu(&self) -> String {
        let mut menu = String::from("Menu:\n");
        match &self.location {
            Location::Floor(floor) => {
                menu.push_str(&format!("At floor {floor}\n"));
                menu.push_str("P - Call an elevator to your floor\n");
                let docked = self.system.floor(*floor).ok().and_then(|station| station.docked_elevator_id());
                if let Some(elevator) = docked {
                    menu.push_str(&format!("I - Hop in elevator {elevator}\n"));
                }
            },
            Location::InElevator(elevator) => {
                let floors: Vec<String> = elevator.allowed_floors().map(|floor| floor.to_string()).collect();
                menu.push_str(&format!(
                    "In elevator {} at floor {} ({})\n",
                    elevator.id(),
                    elevator.current_floor(),
                    elevator.state(),
                ));
                menu.push_str(&format!("<floor> - Choose a floor: {}\n", floors.join(",")));
                menu.push_str("O - Open the doors and hop out\n");
                menu.push_str("C - Close the doors\n");
            },
        }
        menu.push_str("R <floor> - Press the call button at <floor>\n");
        menu.push_str("G <floor> - Appear at <floor>\n");
        menu.push_str("S - Show the status table\n");
        menu.push_str("J - Print the status as JSON\n");
        menu.push_str("X - Quit the program\n");
        menu
    }

    fn current_floor(&self) -> Result<FloorIndex, ConsoleError> {
        match &self.location {
            Location::Floor(floor) => Ok(*floor),
            Location::InElevator(_) => Err(ConsoleError::NotAtFloor),
        }
    }

    fn current_elevator(&self) -> Result<Arc<dyn ElevatorControl>, ConsoleError> {
        match &self.location {
            Location::InElevator(elevator) => Ok(Arc::clone(elevator)),
            Location::Floor(_) => Err(ConsoleError::NotInElevator),
        }
    }
}
