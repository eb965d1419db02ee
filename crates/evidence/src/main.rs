//! Evidence MCP launcher
//!
//! - `serve` (default): JSON-RPC MCP server on stdin/stdout
//! - `sources`: print what discovery found
//! - `query`: run one SQL statement against the project data

use anyhow::Result;
use clap::{Parser, Subcommand};
use evidence_logging::{init_logging, LogConfig};
use std::path::PathBuf;
use std::process::ExitCode;

mod cli;

#[derive(Parser, Debug)]
#[command(
    name = "mcp-evidence",
    version,
    about = "MCP server for querying Evidence.dev project data"
)]
struct Cli {
    /// Path to the Evidence project
    #[arg(long, env = "EVIDENCE_PROJECT_PATH", global = true)]
    project_path: Option<PathBuf>,

    /// Data directory, overriding the project's rendered data
    #[arg(long, env = "EVIDENCE_DATA_PATH", global = true)]
    data_path: Option<PathBuf>,

    /// Row limit for table resources
    #[arg(
        long,
        env = "EVIDENCE_RESULT_LIMIT",
        default_value_t = evidence_db::DEFAULT_PREVIEW_LIMIT,
        global = true
    )]
    default_result_limit: usize,

    /// Largest tool result returned to the client, in bytes
    #[arg(
        long,
        default_value_t = evidence_mcp::security::DEFAULT_MAX_RESPONSE_BYTES,
        global = true
    )]
    max_response_bytes: usize,

    /// Enable debug logging on stderr
    #[arg(short = 'v', long = "debug", alias = "verbose", global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the MCP server over stdio (default)
    Serve,

    /// List discovered sources and tables
    Sources {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Run a SQL query against the project data
    Query {
        /// SQL text; tables are views named "<source>_<table>"
        sql: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn run_command(cli: Cli) -> Result<()> {
    let project = cli::ProjectArgs {
        project_path: cli.project_path,
        data_path: cli.data_path,
    };

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => cli::serve::run(
            &project,
            cli::serve::ServeArgs {
                default_result_limit: cli.default_result_limit,
                max_response_bytes: cli.max_response_bytes,
            },
        ),
        Commands::Sources { json } => cli::sources::run(&project, json),
        Commands::Query { sql, json } => cli::query::run(&project, &sql, json),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let _log_guard = match init_logging(LogConfig {
        app_name: "mcp-evidence",
        verbose: cli.debug,
    }) {
        Ok(guard) => Some(guard),
        Err(err) => {
            eprintln!("Warning: failed to initialize logging: {:#}", err);
            None
        }
    };

    match run_command(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{:#}", err);
            eprintln!("{}", cli::error::render(&err));
            ExitCode::from(1)
        }
    }
}
