//! `factory-sim` -- load a factory, edit it from the shell, and run it.
//!
//! Usage: `factory-sim [-f STRUCTURE] [-c CONFIG] [-m N] [-i N | -t A,B,..] [--batch]`

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::error;

use factory_sim::config::{ReportTiming, SimulationConfig, load_config};
use factory_sim::controller::Controller;
use factory_sim::error::CliError;
use factory_sim_core::id::Ticks;

#[derive(Parser, Debug)]
#[command(name = "factory-sim", version)]
#[command(about = "Simulate a network of loading ramps, workers and storehouses")]
struct Args {
    /// Structure file to load, also the default target of `save`
    #[arg(short = 'f', long = "file")]
    file: Option<PathBuf>,

    /// Run configuration (.toml, .ron or .json)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of ticks to simulate
    #[arg(short, long)]
    max_iterations: Option<Ticks>,

    /// Write a state report every N ticks (0 disables reports)
    #[arg(short = 'i', long, conflicts_with = "report_timings")]
    report_interval: Option<Ticks>,

    /// Write state reports at exactly these ticks
    #[arg(short = 't', long, value_delimiter = ',', num_args = 1..)]
    report_timings: Option<Vec<Ticks>>,

    /// Write run output to this file instead of stdout
    #[arg(short, long)]
    report_file: Option<PathBuf>,

    /// Seed for routing draws
    #[arg(long)]
    seed: Option<u64>,

    /// Skip the shell and run straight away
    #[arg(long)]
    batch: bool,

    /// Print the structure after every shell change
    #[arg(short, long)]
    show_structure: bool,
}

impl Args {
    /// Flags win over whatever the config file says.
    fn apply(self, mut config: SimulationConfig) -> SimulationConfig {
        if let Some(file) = self.file {
            config.structure_file = Some(file);
        }
        if let Some(n) = self.max_iterations {
            config.max_iterations = n;
        }
        if let Some(n) = self.report_interval {
            config.report = ReportTiming::Interval(n);
        }
        if let Some(times) = self.report_timings {
            config.report = ReportTiming::At(times);
        }
        if let Some(path) = self.report_file {
            config.report_file = Some(path);
        }
        if let Some(seed) = self.seed {
            config.seed = Some(seed);
        }
        config
    }
}

fn session(args: Args) -> Result<(), CliError> {
    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => SimulationConfig::default(),
    };
    let batch = args.batch;
    let show_structure = args.show_structure;
    let config = args.apply(config);

    let mut controller =
        Controller::from_config(config, io::stdin().lock(), io::stdout().lock(), io::stderr())?
            .show_structure(show_structure);
    if batch {
        controller.run_batch()
    } else {
        controller.run()
    }
}

fn main() -> ExitCode {
    factory_sim::init_logging();

    let args = Args::parse();
    match session(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report_failure(&e, &mut io::stderr());
            ExitCode::FAILURE
        }
    }
}

/// Fatal errors are printed whatever the log filter says.
fn report_failure(e: &CliError, out: &mut impl Write) {
    error!("{e}");
    let _ = writeln!(out, "error: {e}");
}
