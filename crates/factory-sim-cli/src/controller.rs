//! Session driver: loads the topology, runs the shell, then the simulation.

use crate::config::SimulationConfig;
use crate::error::CliError;
use crate::shell::{self, NewElement, RemoveCommand, ShellCommand};
use clap::error::ErrorKind;
use factory_sim_core::factory::Factory;
use factory_sim_core::id::{LinkId, StationId};
use factory_sim_core::report::ReportSchedule;
use factory_sim_core::structure::{read_structure, write_structure};
use std::fs::File;
use std::io::{BufRead, BufWriter, Write};
use std::path::Path;
use tracing::{debug, info};

pub const BANNER: &str =
    " ============================ FACTORY SIMULATOR v 0.1 ============================ ";
pub const STARTING: &str =
    " ============================== STARTING SIMULATION ============================== ";
pub const ENDED: &str =
    " ================================ SIMULATION ENDED =============================== ";
pub const PROMPT: &str = ">> ";

/// What the shell loop does after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Run,
    Quit,
}

/// One simulator session over arbitrary input and output streams.
///
/// Reports and shell responses go to `output`; command errors go to
/// `errors` and never end the session.
pub struct Controller<R, W, E> {
    config: SimulationConfig,
    schedule: ReportSchedule,
    factory: Factory,
    input: R,
    output: W,
    errors: E,
    show_structure: bool,
}

impl<R: BufRead, W: Write, E: Write> Controller<R, W, E> {
    /// Build the factory from `config`, reading its structure file if set.
    pub fn from_config(config: SimulationConfig, input: R, output: W, errors: E) -> Result<Self, CliError> {
        let schedule = config.report.schedule()?;
        let seed = config.seed.unwrap_or_else(rand::random);
        info!(seed, "routing seed");

        let mut factory = Factory::with_seed(seed);
        if let Some(path) = &config.structure_file {
            load_structure(&mut factory, path)?;
        }

        Ok(Self {
            config,
            schedule,
            factory,
            input,
            output,
            errors,
            show_structure: false,
        })
    }

    /// Print the structure report after every shell mutation.
    pub fn show_structure(mut self, show: bool) -> Self {
        self.show_structure = show;
        self
    }

    pub fn factory(&self) -> &Factory {
        &self.factory
    }

    pub fn into_output(self) -> W {
        self.output
    }

    /// Interactive session. Returns without simulating when input ends or
    /// on `exit`.
    pub fn run(&mut self) -> Result<(), CliError> {
        writeln!(self.output, "{BANNER}")?;
        if self.factory.is_empty() {
            writeln!(
                self.output,
                ">> factory structure is empty, add elements with `add` (type `help` for commands) <<"
            )?;
        }

        let mut line = String::new();
        loop {
            write!(self.output, "{PROMPT}")?;
            self.output.flush()?;

            line.clear();
            if self.input.read_line(&mut line)? == 0 {
                info!("input closed, leaving without a run");
                return Ok(());
            }
            match self.execute(&line) {
                Ok(Flow::Continue) => {}
                Ok(Flow::Run) => break,
                Ok(Flow::Quit) => return Ok(()),
                Err(e) => writeln!(self.errors, "{e}")?,
            }
        }
        self.simulate()
    }

    /// Non-interactive session: validate and simulate straight away.
    pub fn run_batch(&mut self) -> Result<(), CliError> {
        writeln!(self.output, "{BANNER}")?;
        self.factory.validate()?;
        self.simulate()
    }

    /// Run the configured number of ticks, writing reports to the report
    /// file if one is set.
    pub fn simulate(&mut self) -> Result<(), CliError> {
        writeln!(self.output, "{STARTING}")?;
        let max_iterations = self.config.max_iterations;
        match &self.config.report_file {
            Some(path) => {
                let mut file = BufWriter::new(File::create(path)?);
                self.factory.run(max_iterations, &mut file, &mut self.schedule)?;
            }
            None => self.factory.run(max_iterations, &mut self.output, &mut self.schedule)?,
        }
        writeln!(self.output, "{ENDED}")?;
        Ok(())
    }

    fn execute(&mut self, line: &str) -> Result<Flow, CliError> {
        let command = match shell::parse_line(line) {
            Ok(Some(command)) => command,
            Ok(None) => return Ok(Flow::Continue),
            Err(e) => {
                match e.kind() {
                    ErrorKind::DisplayHelp | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
                        write!(self.output, "{}", e.render())?
                    }
                    _ => write!(self.errors, "{}", e.render())?,
                }
                return Ok(Flow::Continue);
            }
        };
        debug!(?command, "shell command");

        match command {
            ShellCommand::Add { element } => {
                self.add(element.into())?;
                self.echo_structure()?;
            }
            ShellCommand::Remove { element } => {
                self.remove(element)?;
                self.echo_structure()?;
            }
            ShellCommand::Print => write!(self.output, "{}", self.factory.structure_report())?,
            ShellCommand::Save { path } => self.save(path.as_deref())?,
            ShellCommand::Validate => {
                self.factory.validate()?;
                writeln!(self.output, "factory structure is valid")?;
            }
            ShellCommand::Run => {
                self.factory.validate()?;
                return Ok(Flow::Run);
            }
            ShellCommand::Exit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }

    fn add(&mut self, element: NewElement) -> Result<(), CliError> {
        match element {
            NewElement::Ramp(data) => self.factory.add_loading_ramp(data)?,
            NewElement::Worker(data) => self.factory.add_worker(data)?,
            NewElement::Store(data) => self.factory.add_storehouse(data)?,
            NewElement::Link(data) => self.factory.add_link(data)?,
        }
        Ok(())
    }

    fn remove(&mut self, element: RemoveCommand) -> Result<(), CliError> {
        let (removed, what) = match element {
            RemoveCommand::Ramp { id } => (self.factory.remove_loading_ramp(StationId(id)), format!("loading ramp {id}")),
            RemoveCommand::Worker { id } => (self.factory.remove_worker(StationId(id)), format!("worker {id}")),
            RemoveCommand::Store { id } => (self.factory.remove_storehouse(StationId(id)), format!("storehouse {id}")),
            RemoveCommand::Link { id } => (self.factory.remove_link(LinkId(id)), format!("link {id}")),
        };
        if removed {
            Ok(())
        } else {
            Err(CliError::Command(format!("no {what} to remove")))
        }
    }

    fn save(&mut self, path: Option<&Path>) -> Result<(), CliError> {
        let target = path
            .or(self.config.structure_file.as_deref())
            .ok_or(CliError::NoSaveTarget)?;
        std::fs::write(target, write_structure(&self.factory))?;
        info!(path = %target.display(), "structure saved");
        Ok(())
    }

    fn echo_structure(&mut self) -> Result<(), CliError> {
        if self.show_structure {
            write!(self.output, "{}", self.factory.structure_report())?;
        }
        Ok(())
    }
}

fn load_structure(factory: &mut Factory, path: &Path) -> Result<(), CliError> {
    let text = std::fs::read_to_string(path).map_err(|source| CliError::ReadStructure {
        path: path.to_path_buf(),
        source,
    })?;
    read_structure(factory, &text).map_err(|source| CliError::Structure {
        path: path.to_path_buf(),
        source,
    })?;
    info!(
        path = %path.display(),
        ramps = factory.ramp_count(),
        workers = factory.worker_count(),
        stores = factory.store_count(),
        links = factory.link_count(),
        "structure loaded"
    );
    Ok(())
}
