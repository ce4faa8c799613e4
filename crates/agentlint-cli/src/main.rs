mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::{analyze::AnalyzeArgs, config::ConfigSubcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "agentlint",
    about = "Cross-file consistency checks for agent and skill markdown definitions",
    version,
    propagate_version = true
)]
struct Cli {
    /// Corpus root containing plugins/ (default: auto-detect from plugins/ or .git/)
    #[arg(long, global = true, env = "AGENTLINT_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze agents and skills and report findings
    Analyze(AnalyzeArgs),

    /// List the pattern checks, or describe one
    Checks {
        /// Check id, e.g. tool_not_in_allowed_list
        id: Option<String>,
    },

    /// Show the platform and known-tools list analysis would use
    Tools {
        /// Platform to show (default: auto-detect)
        #[arg(long, env = cmd::PLATFORM_ENV)]
        platform: Option<String>,
    },

    /// Inspect the .agentlint.yaml configuration
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = match &cli.command {
        Commands::Analyze(args) if args.verbose => tracing::Level::DEBUG,
        _ => tracing::Level::WARN,
    };

    // RUST_LOG, when set, replaces the default level entirely.
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level.to_string()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let root = root::resolve_root(cli.root.as_deref());

    let result = match cli.command {
        Commands::Analyze(args) => cmd::analyze::run(&root, args, cli.json),
        Commands::Checks { id } => cmd::checks::run(id.as_deref(), cli.json),
        Commands::Tools { platform } => cmd::tools::run(&root, platform.as_deref(), cli.json),
        Commands::Config { subcommand } => cmd::config::run(&root, subcommand, cli.json),
    };

    match result {
        Ok(code) => {
            if code != 0 {
                std::process::exit(code);
            }
        }
        Err(e) => {
            // Print the full error chain (anyhow's alternate Display)
            eprintln!("error: {e:#}");
            std::process::exit(1);
        }
    }
}
