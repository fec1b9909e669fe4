use clap::{Parser, Subcommand};
use sqlboot::BootConfig;
use tracing::Level;

mod commands;

use commands::backup::BackupArgs;
use commands::capabilities::CapabilitiesArgs;
use commands::prepare::PrepareArgs;
use commands::split::SplitArgs;
use commands::OutputFormat;

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
#[clap(propagate_version = true)]
struct Cli {
    /// configuration file path, by default $HOME/.sqlboot/sqlboot.toml is used
    #[clap(short, long)]
    config: Option<String>,

    /// Print debug information
    #[clap(long)]
    debug: bool,

    /// Output as JSON
    #[clap(long, global = true)]
    json: bool,

    /// Pretty-print JSON output (implies --json)
    #[clap(long, global = true)]
    pretty: bool,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the database schema if missing and apply install scripts
    Prepare(PrepareArgs),

    /// Split a GO-delimited script into statements
    Split(SplitArgs),

    /// Show backend capabilities
    Capabilities(CapabilitiesArgs),

    /// Backup the database to a destination file
    Backup(BackupArgs),

    /// Show the active configuration
    Config,
}

fn main() {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    if cli.debug {
        tracing_subscriber::fmt()
            // filter spans/events with level DEBUG or higher.
            .with_max_level(Level::DEBUG)
            .init();
    }

    let output_format = OutputFormat::from_flags(cli.json, cli.pretty);

    let config = match BootConfig::new(&cli.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("ERROR: {}", e);
            std::process::exit(1);
        }
    };

    match cli.command {
        Commands::Prepare(args) => commands::prepare::run(&config, args, output_format),
        Commands::Split(args) => commands::split::run(args, output_format),
        Commands::Capabilities(args) => {
            commands::capabilities::run(&config, args, output_format)
        }
        Commands::Backup(args) => commands::backup::run(&config, args, output_format),
        Commands::Config => commands::config::run(&config, output_format),
    }
}
