#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that drives a persistent city between invocations.

mod render;
mod session;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use city_builder_core::{BuildingTypeId, CellCoord, Command, Event};
use city_builder_world::apply;
use tracing_subscriber::EnvFilter;

use session::Session;

#[derive(Debug, Parser)]
#[command(name = "city-builder", version, about = "Grid-based city builder simulation")]
struct CliArgs {
    /// Save file read before and written after each command.
    #[arg(long, global = true, default_value = session::DEFAULT_SAVE_PATH)]
    save: PathBuf,
    /// TOML file overriding simulation settings.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// TOML building catalog manifest replacing the standard catalog.
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,
    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Debug, Subcommand)]
enum CliCommand {
    /// Start a fresh city, overwriting the save file.
    New,
    /// Print resources and statistics.
    Status,
    /// Print the building grid.
    Map,
    /// List buildings available at the current rank.
    Catalog,
    /// Place a building with its upper-left corner at X, Y.
    Place {
        /// Catalog identifier, for example SOLAR_PANEL.
        kind: String,
        /// Column of the upper-left cell.
        x: u32,
        /// Row of the upper-left cell.
        y: u32,
    },
    /// Demolish the building covering X, Y.
    Remove {
        /// Column of any covered cell.
        x: u32,
        /// Row of any covered cell.
        y: u32,
    },
    /// Advance the simulation.
    Tick {
        /// Number of steps to run.
        #[arg(long, default_value_t = 1)]
        count: u32,
    },
}

/// Entry point for the city builder command-line interface.
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = CliArgs::parse();
    let (config, catalog) = (args.config.as_deref(), args.catalog.as_deref());
    let mut session = match args.command {
        CliCommand::New => Session::fresh(&args.save, config, catalog)?,
        _ => Session::open(&args.save, config, catalog)?,
    };

    match args.command {
        CliCommand::New => {
            session.save()?;
            println!("Started a new city.");
            print!("{}", render::status(session.city()));
        }
        CliCommand::Status => print!("{}", render::status(session.city())),
        CliCommand::Map => print!("{}", render::map(session.city())),
        CliCommand::Catalog => print!("{}", render::catalog(session.city())),
        CliCommand::Place { kind, x, y } => execute(
            &mut session,
            [Command::PlaceBuilding {
                kind: BuildingTypeId::new(kind),
                origin: CellCoord::new(x, y),
            }],
        )?,
        CliCommand::Remove { x, y } => execute(
            &mut session,
            [Command::RemoveBuilding {
                cell: CellCoord::new(x, y),
            }],
        )?,
        CliCommand::Tick { count } => {
            execute(&mut session, (0..count).map(|_| Command::Tick))?;
        }
    }
    Ok(())
}

/// Applies commands, reports their events and saves the result.
fn execute(session: &mut Session, commands: impl IntoIterator<Item = Command>) -> Result<()> {
    let mut events = Vec::new();
    for command in commands {
        apply(session.city_mut(), command, &mut events);
    }

    events.retain(|event| !matches!(event, Event::TimeAdvanced { .. }));
    events.dedup();
    for event in &events {
        if let Some(line) = render::event(session.city(), event) {
            println!("{line}");
        }
    }

    session.save()?;
    print!("{}", render::status(session.city()));
    Ok(())
}
