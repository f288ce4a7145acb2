//! Revgate - CI gate for classroom code review requests.

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use revgate::context::ActionContext;
use revgate::stages;

/// CI gate for classroom code review requests
#[derive(Parser)]
#[command(name = "revgate")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Stage to run
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Verify the release and review gates and clone the project (pre stage)
    Setup {
        /// Forge API token
        #[arg(long, env = "INPUT_TOKEN", hide_env_values = true)]
        token: String,

        /// Release reference to validate (defaults to the triggering ref)
        #[arg(long, env = "INPUT_RELEASE")]
        release: Option<String>,
    },

    /// Check the build and request the review (main stage)
    Request,

    /// Save the dependency cache (post stage)
    Cleanup,
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "revgate=debug" } else { "revgate=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).without_time())
        .with(filter)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let code = match cli.command {
        Commands::Setup { token, release } => {
            stages::run_stage("setup", "\"Pre Request Review\"", "Setup failed.", |stage| {
                let ctx = ActionContext::from_env()?;
                stages::setup::run(&ctx, &token, release.as_deref(), stage)
            })
        }
        Commands::Request => stages::run_stage(
            "request",
            "\"Request Review\"",
            "Code review request failed.",
            stages::request::run,
        ),
        Commands::Cleanup => stages::run_stage(
            "cleanup",
            "\"Post Request Review\"",
            "Cleanup failed.",
            stages::cleanup::run,
        ),
    };

    std::process::exit(code);
}
