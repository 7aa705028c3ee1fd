//! Campus CLI - run request scripts against a freshly deployed campus
//!
//! Each invocation deploys a new campus under the configured owner, so a
//! script is a complete, reproducible session:
//! - `run` executes a script and prints every outcome
//! - `role` resolves an account's role, optionally after a script
//! - `config` prints the effective configuration

use std::path::PathBuf;
use std::process::ExitCode;

use campus_runtime::{Campus, CampusConfig};
use campus_types::AccountId;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod error;
mod output;
mod script;

use error::CliResult;
use output::OutputFormat;

/// Campus CLI application
#[derive(Parser)]
#[command(name = "campus")]
#[command(about = "Campus - role-gated academic registry", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "CAMPUS_CONFIG")]
    config: Option<PathBuf>,

    /// Owner account of the deployed modules (overrides the config file)
    #[arg(long, env = "CAMPUS_OWNER")]
    owner: Option<AccountId>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    output: OutputFormat,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand)]
enum Commands {
    /// Execute a JSON request script
    Run {
        /// Script file
        script: PathBuf,

        /// Stop at the first failed request
        #[arg(long)]
        fail_fast: bool,

        /// Print the event journal after the script
        #[arg(long)]
        journal: bool,
    },

    /// Print the role of an account
    Role {
        account: AccountId,

        /// Script to run before resolving the role
        #[arg(long)]
        script: Option<PathBuf>,
    },

    /// Show configuration
    Config,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match execute(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Returns whether every request succeeded.
fn execute(cli: Cli) -> CliResult<bool> {
    let mut config = CampusConfig::load(cli.config.as_deref())?;
    if let Some(owner) = cli.owner {
        config = config.with_owner(owner);
    }

    // Initialize tracing
    let filter = if cli.verbose {
        "debug".to_string()
    } else {
        config.logging.filter.clone()
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| filter.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .without_time(),
        )
        .init();

    match cli.command {
        Commands::Run {
            script: path,
            fail_fast,
            journal,
        } => {
            let steps = script::load(&path)?;
            let campus = Campus::deploy(config)?;
            let owner = deployed_owner(&campus);
            info!(steps = steps.len(), script = %path.display(), "Running script");

            let outcomes = script::run(&campus, &steps, owner, fail_fast);
            for outcome in &outcomes {
                output::print_outcome(outcome, cli.output);
            }
            if journal {
                output::print_journal(&campus.journal().entries(), cli.output);
            }
            Ok(outcomes.iter().all(script::Outcome::is_ok))
        }
        Commands::Role {
            account,
            script: path,
        } => {
            let campus = Campus::deploy(config)?;
            let mut clean = true;
            if let Some(path) = path {
                let steps = script::load(&path)?;
                let owner = deployed_owner(&campus);
                clean = script::run(&campus, &steps, owner, false)
                    .iter()
                    .all(script::Outcome::is_ok);
            }
            let role = campus.role_of(&account);
            match cli.output {
                OutputFormat::Text => println!("{role}"),
                OutputFormat::Json => println!(
                    "{}",
                    serde_json::json!({ "account": account, "role": role.to_string(), "code": role.code() })
                ),
            }
            Ok(clean)
        }
        Commands::Config => {
            match cli.output {
                OutputFormat::Text => print!("{}", config.to_toml()?),
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&config)?),
            }
            Ok(true)
        }
    }
}

fn deployed_owner(campus: &Campus) -> AccountId {
    campus.config().owner.unwrap_or(AccountId::ZERO)
}
