use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

use crate::{ElevatorId, FloorIndex};

const CONFIG_FILE: &str = "config.json";
const FALLBACK_CONFIG_FILE: &str = "_config.json";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("could not read configuration file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed configuration: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("the building needs at least one floor")]
    NoFloors,

    #[error("too many elevators configured: {0}")]
    TooManyElevators(usize),

    #[error("elevator {elevator} serves {min_floor}..={max_floor}, which does not fit a building with {floor_count} floors")]
    InvalidElevatorRange {
        elevator: usize,
        min_floor: FloorIndex,
        max_floor: FloorIndex,
        floor_count: u8,
    },
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ActuatorKind {
    #[default]
    Simulated,
    Hardware,
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ElevatorConfig {
    pub min_floor: FloorIndex,
    pub max_floor: FloorIndex,
    #[serde(default)]
    pub actuator: ActuatorKind,
}

/// How long the simulated (and, for the doors, the hardware) actuator takes
/// for each physical action.
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct TimingConfig {
    pub floor_travel_ms: u64,
    pub door_open_ms: u64,
    pub door_hold_ms: u64,
    pub door_close_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        TimingConfig {
            floor_travel_ms: 2000,
            door_open_ms: 1000,
            door_hold_ms: 3000,
            door_close_ms: 1500,
        }
    }
}

impl TimingConfig {
    pub fn floor_travel(&self) -> Duration {
        Duration::from_millis(self.floor_travel_ms)
    }

    pub fn door_open(&self) -> Duration {
        Duration::from_millis(self.door_open_ms)
    }

    pub fn door_hold(&self) -> Duration {
        Duration::from_millis(self.door_hold_ms)
    }

    pub fn door_close(&self) -> Duration {
        Duration::from_millis(self.door_close_ms)
    }
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            host: String::from("localhost"),
            port: 15657,
        }
    }
}

impl ServerConfig {
    /// Address of the elevator server driving hardware elevator `elevator`.
    /// Consecutive hardware elevators use consecutive ports.
    pub fn address(&self, elevator: ElevatorId) -> String {
        format!("{}:{}", self.host, self.port.saturating_add(elevator as u16))
    }
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct LoggingConfig {
    pub filter: String,
    pub directory: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            filter: String::from("info"),
            directory: None,
        }
    }
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SystemConfig {
    pub floor_count: u8,
    #[serde(default)]
    pub elevators: Vec<ElevatorConfig>,
    #[serde(default)]
    pub timing: TimingConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for SystemConfig {
    fn default() -> Self {
        SystemConfig {
            floor_count: 10,
            elevators: vec![
                ElevatorConfig { min_floor: 0, max_floor: 9, actuator: ActuatorKind::Simulated },
                ElevatorConfig { min_floor: 0, max_floor: 9, actuator: ActuatorKind::Simulated },
            ],
            timing: TimingConfig::default(),
            server: ServerConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl SystemConfig {
    /// Reads the configuration named on the command line, or `config.json`
    /// with `_config.json` as fallback.
    pub fn get() -> Result<Self, ConfigError> {
        let args: Vec<String> = env::args().collect();
        let command_line = CommandLine::parse(&args);
        let mut config = SystemConfig::load(command_line.config_path.as_deref())?;
        if let Some(directory) = command_line.log_dir {
            config.logging.directory = Some(directory);
        }
        Ok(config)
    }

    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let contents = match path {
            Some(path) => read(path)?,
            None => match fs::read_to_string(CONFIG_FILE) {
                Ok(content) => content,
                Err(_) => {
                    println!("No configuration file provided, using default settings...");
                    read(Path::new(FALLBACK_CONFIG_FILE))?
                },
            },
        };
        SystemConfig::from_json(&contents)
    }

    pub fn from_json(contents: &str) -> Result<Self, ConfigError> {
        let config: SystemConfig = serde_json::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.floor_count == 0 {
            return Err(ConfigError::NoFloors);
        }
        if self.elevators.len() > ElevatorId::MAX as usize + 1 {
            return Err(ConfigError::TooManyElevators(self.elevators.len()));
        }
        for (index, elevator) in self.elevators.iter().enumerate() {
            if elevator.min_floor > elevator.max_floor || elevator.max_floor >= self.floor_count {
                return Err(ConfigError::InvalidElevatorRange {
                    elevator: index,
                    min_floor: elevator.min_floor,
                    max_floor: elevator.max_floor,
                    floor_count: self.floor_count,
                });
            }
        }
        Ok(())
    }

    pub fn top_floor(&self) -> FloorIndex {
        self.floor_count - 1
    }
}

fn read(path: &Path) -> Result<String, ConfigError> {
    fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandLine {
    pub config_path: Option<PathBuf>,
    pub log_dir: Option<PathBuf>,
}

impl CommandLine {
    pub fn parse(args: &[String]) -> Self {
        let mut command_line = CommandLine::default();
        for arg_pair in args.rchunks_exact(2) {
            match arg_pair[0].as_str() {
                "--config" => command_line.config_path = Some(PathBuf::from(&arg_pair[1])),
                "--log-dir" => command_line.log_dir = Some(PathBuf::from(&arg_pair[1])),
                _ => {println!("illegal argument {}, skipping...", arg_pair[0]);},
            }
        }
        command_line
    }
}
