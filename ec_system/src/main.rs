use std::io::{self, BufRead, Write};
use std::thread;

use anyhow::{Context, Result};
use crossbeam_channel::{select, unbounded};

use ec_system::modules::system::ElevatorSystem;
use ec_system::utilities::console::{Console, Reply};
use ec_system::utilities::debug::Debug;
use ec_system::utilities::logging;
use shared_resources::config::SystemConfig;

fn prompt(console: &Console) -> io::Result<()> {
    let mut stdout = io::stdout();
    write!(stdout, "{}> ", console.menu())?;
    stdout.flush()
}

fn main() -> Result<()> {
    // READ CONFIGURATION
    let config = SystemConfig::get().context("could not load configuration")?;

    // INITIALIZE LOGGING
    let _log_guard = logging::init_logger(&config.logging)?;

    // ASSEMBLE ELEVATORS, FLOORS AND DISPATCHER
    let system = ElevatorSystem::assemble(&config).context("could not start the elevator system")?;
    let floor_events_rx = system.subscribe();

    // INITIALIZE THREAD FOR CONSOLE INPUT
    let (line_tx, line_rx) = unbounded();
    thread::Builder::new().name("stdin".to_string()).spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if line_tx.send(line).is_err() {
                break;
            }
        }
    })?;

    let mut console = Console::new(&system);
    let mut debug = Debug::new();
    // redraw the status table on every floor event until the next command
    let mut watching = false;
    prompt(&console)?;

    loop {
        select! {
            recv(line_rx) -> msg => {
                let Ok(line) = msg else {
                    println!("Good bye.");
                    return Ok(());
                };
                watching = false;
                debug.detach();
                match console.execute_line(&line) {
                    Ok(Reply::Message(message)) => println!("{message}"),
                    Ok(Reply::ShowStatus) => {
                        debug.printstatus(&system.status())?;
                        watching = true;
                        continue;
                    },
                    Ok(Reply::Quit) => {
                        println!("Good bye.");
                        return Ok(());
                    },
                    Err(error) => eprintln!("{error}"),
                }
                prompt(&console)?;
            },
            recv(floor_events_rx) -> _ => {
                if watching {
                    debug.printstatus(&system.status())?;
                }
            },
            recv(system.dispatch_failures()) -> msg => {
                if let Ok(error) = msg {
                    eprintln!("{error}");
                }
            },
        }
    }
}
