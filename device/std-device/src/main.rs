use clap::Parser;
use quad_sim::{config, Configuration};
use resources::RunnerOptions;

mod resources;
mod ticker;

#[derive(clap::Parser)]
struct Args {
    /// Path to the configuration file for the simulation, defaults are used if omitted
    #[clap(short, long)]
    config: Option<String>,

    /// Override the integration time step [s]
    #[clap(long)]
    dt: Option<f64>,

    /// Override the simulated duration [s]
    #[clap(long)]
    duration: Option<f64>,

    /// Print the vehicle state every N iterations
    #[clap(short, long, default_value_t = 0)]
    print_every: u64,

    /// Run the simulation in real time instead of as fast as possible
    #[clap(short, long)]
    realtime: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    resources::setup_logging()?;

    // Load configuration
    let mut config = match &args.config {
        Some(path) => config::load_from_file_path(path)?,
        None => Configuration::default(),
    };

    if let Some(dt) = args.dt {
        config.simulation.dt = dt;
    }
    if let Some(duration) = args.duration {
        config.simulation.duration = duration;
    }

    let sim = quad_sim::initialize(&config)?;
    println!("{}\n", sim.dump());

    // Launch the simulation thread and wait for it to finish
    let options = RunnerOptions {
        print_every: args.print_every,
        realtime: args.realtime,
    };
    let runner = resources::simulation_runner(sim.clone(), config.simulation, options);
    let result = runner.join().map_err(|_| "The simulation thread panicked")?;

    println!("{}", sim.dump());
    Ok(result?)
}
