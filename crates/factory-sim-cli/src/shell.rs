//! Line commands accepted by the interactive shell.
//!
//! Each input line is split on whitespace and parsed with clap, so every
//! command gets the usual flag handling and `--help` for free.

use clap::{Parser, Subcommand};
use factory_sim_core::id::{LinkId, QueueType, StationId, StationRef, Ticks};
use factory_sim_core::link::LinkData;
use factory_sim_core::ramp::LoadingRampData;
use factory_sim_core::store::StoreHouseData;
use factory_sim_core::worker::WorkerData;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(no_binary_name = true, disable_version_flag = true)]
pub struct ShellLine {
    #[command(subcommand)]
    pub command: ShellCommand,
}

#[derive(Debug, Subcommand, PartialEq)]
pub enum ShellCommand {
    /// Add a station or link
    Add {
        #[command(subcommand)]
        element: AddCommand,
    },
    /// Remove a station (with its links) or a single link
    Remove {
        #[command(subcommand)]
        element: RemoveCommand,
    },
    /// Print the structure report
    Print,
    /// Write the topology to a structure file
    Save {
        /// Defaults to the structure file the factory was loaded from
        path: Option<PathBuf>,
    },
    /// Check that every station is connected
    Validate,
    /// Validate, leave the shell, and start the simulation
    Run,
    /// Leave without running
    #[command(alias = "quit")]
    Exit,
}

#[derive(Debug, Subcommand, PartialEq)]
pub enum AddCommand {
    Worker {
        #[arg(short = 'i', long)]
        id: u32,
        /// Processing time in ticks
        #[arg(short = 't', long)]
        time: Ticks,
        #[arg(short = 'q', long, default_value = "FIFO")]
        queue: QueueType,
    },
    #[command(alias = "loading_ramp")]
    Ramp {
        #[arg(short = 'i', long)]
        id: u32,
        /// Delivery interval in ticks
        #[arg(short = 't', long)]
        time: Ticks,
    },
    #[command(alias = "storehouse")]
    Store {
        #[arg(short = 'i', long)]
        id: u32,
    },
    Link {
        #[arg(short = 'i', long)]
        id: u32,
        /// Source as kind-id, e.g. ramp-1
        #[arg(short = 's', long)]
        src: StationRef,
        /// Destination as kind-id, e.g. store-2
        #[arg(short = 'd', long)]
        dest: StationRef,
        #[arg(short = 'p', long, allow_negative_numbers = true)]
        probability: f64,
    },
}

#[derive(Debug, Subcommand, PartialEq)]
pub enum RemoveCommand {
    Worker {
        #[arg(short = 'i', long)]
        id: u32,
    },
    #[command(alias = "loading_ramp")]
    Ramp {
        #[arg(short = 'i', long)]
        id: u32,
    },
    #[command(alias = "storehouse")]
    Store {
        #[arg(short = 'i', long)]
        id: u32,
    },
    Link {
        #[arg(short = 'i', long)]
        id: u32,
    },
}

/// An element ready to be added to a factory.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NewElement {
    Ramp(LoadingRampData),
    Worker(WorkerData),
    Store(StoreHouseData),
    Link(LinkData),
}

impl From<AddCommand> for NewElement {
    fn from(cmd: AddCommand) -> Self {
        match cmd {
            AddCommand::Worker { id, time, queue } => NewElement::Worker(WorkerData {
                id: StationId(id),
                processing_time: time,
                queue_type: queue,
            }),
            AddCommand::Ramp { id, time } => NewElement::Ramp(LoadingRampData {
                id: StationId(id),
                delivery_interval: time,
            }),
            AddCommand::Store { id } => NewElement::Store(StoreHouseData { id: StationId(id) }),
            AddCommand::Link {
                id,
                src,
                dest,
                probability,
            } => NewElement::Link(LinkData {
                id: LinkId(id),
                probability,
                source: src,
                destination: dest,
            }),
        }
    }
}

/// Parse one shell line. Returns `Ok(None)` for blank lines.
pub fn parse_line(line: &str) -> Result<Option<ShellCommand>, clap::Error> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.is_empty() {
        return Ok(None);
    }
    ShellLine::try_parse_from(tokens).map(|l| Some(l.command))
}
