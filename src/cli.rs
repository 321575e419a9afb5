use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::{ConnectionConfig, DEFAULT_HOST, DEFAULT_PORT, DEFAULT_SCHEMA};

#[derive(Parser, Debug)]
#[command(name = "movies-db-loader")]
#[command(version, about = "Rebuild the movies PostgreSQL schema from CSV files")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Where the target database lives
#[derive(Args, Debug, Clone)]
pub struct ConnectionArgs {
    /// Full connection URL; overrides the individual settings
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    #[arg(short, long, env = "MOVIES_DB_USER")]
    pub user: Option<String>,

    #[arg(long, env = "MOVIES_DB_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    #[arg(long, env = "MOVIES_DB_HOST", default_value = DEFAULT_HOST)]
    pub host: String,

    #[arg(long, env = "MOVIES_DB_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Database name (defaults to the user name)
    #[arg(long, env = "MOVIES_DB_NAME")]
    pub dbname: Option<String>,
}

impl From<ConnectionArgs> for ConnectionConfig {
    fn from(args: ConnectionArgs) -> Self {
        Self {
            url: args.database_url,
            user: args.user,
            password: args.password,
            host: args.host,
            port: args.port,
            dbname: args.dbname,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Drop and recreate the schema, then load every CSV
    Rebuild {
        /// Directory of CSV files, or a zip archive of them
        input: PathBuf,

        #[command(flatten)]
        connection: ConnectionArgs,

        /// Target schema
        #[arg(short, long, default_value = DEFAULT_SCHEMA)]
        schema: String,

        /// JSON file with extra date overrides
        #[arg(short, long)]
        overrides: Option<PathBuf>,

        /// Write the run summary as JSON
        #[arg(short, long)]
        report: Option<PathBuf>,

        /// Custom cache directory for extracted archives
        #[arg(short, long)]
        cache_dir: Option<PathBuf>,

        /// Re-extract the archive even if cached
        #[arg(short, long)]
        force: bool,

        /// Full-screen progress display
        #[arg(long)]
        tui: bool,

        /// Print per-table progress lines
        #[arg(short, long)]
        verbose: bool,
    },

    /// Run the whole load without a database and show what would happen
    Plan {
        /// Directory of CSV files, or a zip archive of them
        input: PathBuf,

        #[arg(short, long, default_value = DEFAULT_SCHEMA)]
        schema: String,

        #[arg(short, long)]
        overrides: Option<PathBuf>,

        /// Print every SQL statement
        #[arg(long)]
        sql: bool,

        #[arg(short, long)]
        cache_dir: Option<PathBuf>,

        #[arg(short, long)]
        verbose: bool,
    },

    /// Check a loaded schema against its CSV files
    Verify {
        /// Directory of CSV files, or a zip archive of them
        input: PathBuf,

        #[command(flatten)]
        connection: ConnectionArgs,

        #[arg(short, long, default_value = DEFAULT_SCHEMA)]
        schema: String,

        #[arg(short, long)]
        overrides: Option<PathBuf>,

        #[arg(short, long)]
        cache_dir: Option<PathBuf>,
    },

    /// List tables in load order with their keys
    ListTables,

    /// Show the date corrections that will be applied
    Overrides {
        #[arg(short, long)]
        overrides: Option<PathBuf>,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
