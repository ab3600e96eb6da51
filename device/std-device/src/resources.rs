use std::thread::JoinHandle;
use std::time::Duration;

use common::errors::SimError;
use quad_sim::{Sim, SimHandle, SimSettings};

use crate::ticker::Ticker;

pub fn setup_logging() -> Result<(), Box<dyn std::error::Error>> {
    // RUST_LOG directives take precedence over the default level
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .format_timestamp_nanos()
        .try_init()?;

    Ok(())
}

/// Options for how the simulation thread runs and reports.
#[derive(Debug, Clone, Copy)]
pub struct RunnerOptions {
    /// Print the state every this many iterations, zero disables it
    pub print_every: u64,
    /// Pace the steps to the wall clock
    pub realtime: bool,
}

/// Spawn a thread stepping the simulation `settings.steps()` times with its current control input.
pub(crate) fn simulation_runner(
    sim: SimHandle,
    settings: SimSettings,
    options: RunnerOptions,
) -> JoinHandle<Result<(), SimError>> {
    std::thread::spawn(move || {
        let steps = settings.steps();
        let mut ticker = options
            .realtime
            .then(|| Ticker::every(Duration::from_secs_f64(settings.dt)));

        log::info!("Running {steps} steps");

        for _ in 0..steps {
            if let Err(error) = sim.step(settings.dt) {
                log::error!("Simulation stopped: {error}");
                return Err(error);
            }

            let iteration = sim.vehicle_state().iteration;
            if options.print_every > 0 && iteration % options.print_every == 0 {
                println!("{}\n", sim.dump());
            }

            if let Some(ticker) = ticker.as_mut() {
                ticker.next();
            }
        }

        log::info!("Simulation finished");
        Ok(())
    })
}
