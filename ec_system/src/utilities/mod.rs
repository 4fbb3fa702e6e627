pub mod console;
pub mod debug;
pub mod elevator_status;
pub mod logging;
