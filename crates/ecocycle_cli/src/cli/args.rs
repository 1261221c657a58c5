use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "ecocycle",
    version,
    about = "Operator CLI for the EcoCycle Hub marketplace database (SQLite)"
)]
pub struct Cli {
    /// Path to the SQLite database
    #[arg(long)]
    pub db: Option<String>,

    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Database provisioning and maintenance
    Db {
        #[command(subcommand)]
        cmd: DbCommands,
    },

    /// List sellers with active listings, optionally filtered
    Sellers {
        /// Material name (e.g. "Plastic"), or "all"
        #[arg(long)]
        material: Option<String>,

        /// Volume tier: low, medium, high or all
        #[arg(long)]
        volume: Option<String>,
    },

    /// Plan a collection round over selected sellers (nearest-neighbour)
    Route(RouteArgs),

    /// Show the listing leaderboard
    Leaderboard {
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
}

#[derive(Subcommand)]
pub enum DbCommands {
    /// Create and migrate an empty database
    Init {
        /// Output path (defaults to OS app data dir)
        #[arg(long)]
        out: Option<String>,

        /// Overwrite existing database if present
        #[arg(long, default_value_t = false)]
        force: bool,
    },

    /// Show local database status (path, schema, counts)
    Status,

    /// Apply pending schema migrations
    Migrate,

    /// Copy the live database to another file
    Backup {
        /// Destination file
        out: PathBuf,
    },
}

#[derive(clap::Args)]
pub struct RouteArgs {
    /// Origin latitude (decimal degrees)
    #[arg(long, allow_hyphen_values = true)]
    pub lat: f64,

    /// Origin longitude (decimal degrees)
    #[arg(long, allow_hyphen_values = true)]
    pub lng: f64,

    /// Seller id to visit (repeatable)
    #[arg(long = "seller", required = true)]
    pub sellers: Vec<i64>,

    /// Collection rate per kilometre
    #[arg(long, default_value_t = ecocycle_core::routing::sequencer::COST_PER_KM)]
    pub cost_per_km: f64,

    /// Print the plan as JSON
    #[arg(long)]
    pub json: bool,

    /// Write the JSON plan to a file instead of stdout (implies --json)
    #[arg(long)]
    pub file: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn route_accepts_negative_origin_and_repeated_sellers() {
        let cli = Cli::try_parse_from([
            "ecocycle", "route", "--lat", "-15.786", "--lng", "35.005", "--seller", "3", "--seller",
            "7", "--json",
        ])
        .unwrap();

        let Commands::Route(args) = cli.cmd else {
            panic!("expected route command");
        };
        assert_eq!(args.lat, -15.786);
        assert_eq!(args.sellers, vec![3, 7]);
        assert_eq!(args.cost_per_km, 150.0);
        assert!(args.json);
    }

    #[test]
    fn route_needs_a_seller() {
        assert!(Cli::try_parse_from(["ecocycle", "route", "--lat", "0", "--lng", "0"]).is_err());
    }

    #[test]
    fn db_subcommands() {
        let cli = Cli::try_parse_from(["ecocycle", "--db", "/tmp/x.sqlite", "db", "migrate"]).unwrap();
        assert_eq!(cli.db.as_deref(), Some("/tmp/x.sqlite"));
        assert!(matches!(
            cli.cmd,
            Commands::Db {
                cmd: DbCommands::Migrate
            }
        ));
    }
}
