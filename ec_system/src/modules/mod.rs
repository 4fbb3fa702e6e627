pub mod actuator;
pub mod dispatcher;
pub mod elevator;
pub mod floor;
pub mod io;
pub mod scan;
pub mod simulated;
pub mod system;

#[cfg(test)]
pub mod testing;
