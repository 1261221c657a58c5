pub mod args;
pub mod color;
pub mod commands;
pub mod export;
pub mod validate;

use std::path::Path;

use anyhow::Result;
use clap::Parser;
use ecocycle_core::db::{self, migrate, paths::resolve_db_path};
use rusqlite::Connection;

use crate::ui::warning;

pub fn run() -> Result<()> {
    let cli = args::Cli::parse();
    println!();

    match &cli.cmd {
        args::Commands::Db { cmd } => match cmd {
            args::DbCommands::Init { out, force } => {
                let target = out.clone().or_else(|| cli.db.clone());
                commands::db::run_init(target, *force)
            }

            args::DbCommands::Status => commands::db::run_status(cli.db.clone()),

            args::DbCommands::Migrate => {
                let mut con = open_db_for_commands(cli.db.clone(), &cli.cmd)?;
                commands::db::run_migrate(&mut con)
            }

            args::DbCommands::Backup { out } => {
                let con = open_db_for_commands(cli.db.clone(), &cli.cmd)?;
                commands::db::run_backup(&con, out)
            }
        },

        args::Commands::Sellers { material, volume } => {
            let con = open_db_for_commands(cli.db.clone(), &cli.cmd)?;
            commands::sellers::run(&con, material.as_deref(), volume.as_deref())
        }

        args::Commands::Route(route_args) => {
            validate::validate_origin(route_args.lat, route_args.lng)?;
            validate::validate_seller_ids(&route_args.sellers)?;
            validate::validate_cost_per_km(route_args.cost_per_km)?;
            let con = open_db_for_commands(cli.db.clone(), &cli.cmd)?;
            commands::route::run(&con, route_args)
        }

        args::Commands::Leaderboard { limit } => {
            validate::validate_limit(*limit, "leaderboard")?;
            let con = open_db_for_commands(cli.db.clone(), &cli.cmd)?;
            commands::leaderboard::run(&con, *limit)
        }
    }
}

fn open_db_for_commands(db_arg: Option<String>, cmd: &args::Commands) -> Result<Connection> {
    let db_path = resolve_db_path(db_arg)?;
    ensure_db_ready(&db_path)?;

    let mut con = db::open_db(&db_path)?;

    // `db migrate` reports what it does itself.
    let skip_migration = matches!(
        cmd,
        args::Commands::Db {
            cmd: args::DbCommands::Migrate
        }
    );

    if !skip_migration {
        migrate::run(&mut con)?;
    }

    Ok(con)
}

fn ensure_db_ready(db_path: &Path) -> Result<()> {
    if db_path.exists() {
        return Ok(());
    }

    warning(format!(
        "Local database not found at: {}\nInitializing an empty one now...",
        db_path.display()
    ));

    commands::db::run_init(Some(db_path.to_string_lossy().to_string()), false)
}
