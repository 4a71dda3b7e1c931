mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "titon")]
#[command(version, about = "Titon CLI - inspect and exercise a route table", long_about = None)]
struct Cli {
    /// Configuration file
    #[arg(short, long, global = true, default_value = "titon.toml")]
    config: PathBuf,

    /// Log routing decisions (debug level)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List registered routes in matching order
    Routes {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Match a request against the route table
    Match {
        /// HTTP method (GET, POST, ...)
        method: String,

        /// Request path, including the base path
        url: String,

        /// Treat the connection as TLS
        #[arg(short, long)]
        secure: bool,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Build a URL from a route key, shorthand or literal
    Build {
        /// Route key, `Controller@action` shorthand or URL
        target: String,

        /// Params as key=value
        params: Vec<String>,
    },
}

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    let mut config = titon::Config::load(&cli.config)?;
    if cli.verbose {
        config.logging.level = "debug".to_string();
    }
    titon::telemetry::init(&config.logging);

    // Execute command
    match cli.command {
        Commands::Routes { json } => {
            commands::routes::execute(&config, json)?;
        }
        Commands::Match {
            method,
            url,
            secure,
            json,
        } => {
            commands::match_url::execute(&config, &method, &url, secure, json)?;
        }
        Commands::Build { target, params } => {
            commands::build::execute(&config, &target, &params)?;
        }
    }

    Ok(())
}
