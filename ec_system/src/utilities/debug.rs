use std::io::{self, stdout, Stdout, Write};

use crossterm::{cursor, terminal, ExecutableCommand, Result};

use super::elevator_status::SystemStatus;

/// Redraws the building status in place, overwriting the previous table.
pub struct Debug {
    stdout: Stdout,
    height: u16,
}

impl Debug {
    pub fn new() -> Self {
        Debug {
            stdout: stdout(),
            height: 0,
        }
    }

    pub fn printstatus(&mut self, status: &SystemStatus) -> Result<()> {
        if self.height > 0 {
            self.stdout.execute(cursor::MoveUp(self.height))?;
        }
        self.stdout.execute(terminal::Clear(terminal::ClearType::FromCursorDown))?;
        self.height = render(&mut self.stdout, status)?;
        self.stdout.flush()?;
        Ok(())
    }

    /// Forgets the last table so the next one is printed below whatever was
    /// written since, instead of over it.
    pub fn detach(&mut self) {
        self.height = 0;
    }
}

impl Default for Debug {
    fn default() -> Self {
        Debug::new()
    }
}

/// Writes the status tables and returns how many lines they took.
pub fn render(out: &mut impl Write, status: &SystemStatus) -> io::Result<u16> {
    let mut lines: u16 = 0;
    let mut line = |out: &mut dyn Write, text: String| -> io::Result<()> {
        lines += 1;
        writeln!(out, "{text}")
    };

    line(out, "+--------------------------------------+".to_string())?;
    line(out, "| FLOORS                               |".to_string())?;
    line(out, "+------------+------------+------------+".to_string())?;
    line(out, format!("| {0:<10} | {1:<10} | {2:<10} |", "FLOOR", "REQUESTED", "DOCKED"))?;
    for floor in status.floors.iter().rev() {
        let docked = floor.docked_elevator.map_or(String::from("-"), |id| id.to_string());
        line(out, "+------------+------------+------------+".to_string())?;
        line(out, format!("| {0:<10} | {1:<10} | {2:<10} |", floor.floor, floor.requested, docked))?;
    }
    line(out, "+------------+------------+------------+".to_string())?;
    line(out, String::new())?;

    line(out, "+-------------------------------------------------------------------------------------+".to_string())?;
    line(out, "| ELEVATORS                                                                           |".to_string())?;
    line(out, "+------+------------+--------------+------------+------------+------------+------------+".to_string())?;
    line(out, format!(
        "| {0:<4} | {1:<10} | {2:<12} | {3:<10} | {4:<10} | {5:<10} | {6:<10} |",
        "ID", "FLOORS", "STATE", "FLOOR", "DIRECTION", "NEXT STOP", "PENDING",
    ))?;
    line(out, "+------+------------+--------------+------------+------------+------------+------------+".to_string())?;
    for elevator in &status.elevators {
        let range = format!("{}..={}", elevator.min_floor, elevator.max_floor);
        let next_stop = elevator.next_stop.map_or(String::from("-"), |floor| floor.to_string());
        let pending: Vec<String> = elevator.pending_requests.iter().map(|floor| floor.to_string()).collect();
        line(out, format!(
            "| {0:<4} | {1:<10} | {2:<12} | {3:<10} | {4:<10} | {5:<10} | {6:<10} |",
            elevator.id,
            range,
            elevator.state.as_str(),
            elevator.floor,
            elevator.direction.as_str(),
            next_stop,
            pending.join(","),
        ))?;
        line(out, "+------+------------+--------------+------------+------------+------------+------------+".to_string())?;
    }

    Ok(lines)
}
