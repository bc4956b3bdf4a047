//! Layerstack CLI
//!
//! Command-line front end for the layerstack assembly store.

use anyhow::Context;
use clap::Parser;
use env_logger::Env;
use log::info;

use layerstack::cli::commands::{self, Session};
use layerstack::cli::{Cli, Commands};
use layerstack::model::ProjectUpdate;
use layerstack::StoreConfig;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_level)).init();

    info!("Layerstack v{}", env!("CARGO_PKG_VERSION"));

    let mut config = match &cli.config {
        Some(path) => StoreConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => StoreConfig::from_env()?,
    };
    if let Some(dir) = cli.dir {
        config.storage_dir = dir;
    }

    let Some(cmd) = cli.command else {
        println!("Layerstack v{}", env!("CARGO_PKG_VERSION"));
        println!("Use --help for available commands");
        return Ok(());
    };

    if let Commands::Materials = cmd {
        return Ok(commands::materials()?);
    }

    let mut session = Session::open(&config)
        .with_context(|| format!("opening session in {}", config.storage_dir.display()))?;
    handle_command(&mut session, cmd)?;
    Ok(())
}

fn handle_command(session: &mut Session, cmd: Commands) -> layerstack::Result<()> {
    match cmd {
        Commands::Show => commands::show(session),
        Commands::Materials => commands::materials(),
        Commands::AddLayer {
            material,
            thickness,
            name,
        } => commands::add_layer(session, &material, thickness, name),
        Commands::UpdateLayer {
            layer,
            thickness,
            name,
            material,
        } => commands::update_layer(session, &layer, thickness, name, material),
        Commands::DeleteLayer { layer } => commands::delete_layer(session, &layer),
        Commands::MoveLayer { from, to } => commands::move_layer(session, from, to),
        Commands::DuplicateLayer { layer } => commands::duplicate_layer(session, &layer),
        Commands::AddMonitor {
            layer,
            position,
            name,
        } => commands::add_monitor(session, &layer, position, &name),
        Commands::DeleteMonitor { id } => commands::delete_monitor(session, &id),
        Commands::SetProject {
            name,
            client,
            number,
            description,
        } => commands::set_project(
            session,
            ProjectUpdate {
                name,
                client,
                project_number: number,
                description,
            },
        ),
        Commands::Replay { script } => commands::replay(session, &script),
        Commands::Reset => commands::reset(session),
    }
}
