//! binpick CLI: pick release versions and assets from the command line.

mod commands;
mod tables;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use tables::Tables;

#[derive(Parser)]
#[command(name = "binpick", version, about = "Release version and target selection")]
struct Cli {
    /// Extra release asset terms (.terms.toml file, or a directory of overlays)
    #[arg(long, global = true)]
    terms: Option<PathBuf>,
    /// Extra user agent terms (.terms.toml file)
    #[arg(long, global = true)]
    agent_terms: Option<PathBuf>,
    /// Extra waterfall entries (.waterfall.toml file)
    #[arg(long, global = true)]
    waterfall: Option<PathBuf>,
    /// More logging (-v debug, -vv trace). RUST_LOG takes precedence.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the lexical key of each version
    Lexver {
        /// Versions to encode
        #[arg(required = true)]
        versions: Vec<String>,
        /// Encode as version prefixes (no padding)
        #[arg(long)]
        prefix: bool,
    },
    /// Select versions matching a prefix
    Select {
        /// Version prefix (e.g., v1.991)
        #[arg(long)]
        prefix: String,
        /// Candidate versions, in any order
        #[arg(required = true)]
        versions: Vec<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Classify release assets and resolve their target triplets
    Triplet {
        /// Project name
        #[arg(long)]
        name: String,
        /// Other spellings of the project name in asset names
        #[arg(long = "alias")]
        aliases: Vec<String>,
        /// Release version of the assets
        #[arg(long)]
        version: String,
        /// Asset file names or download URLs
        #[arg(required = true)]
        downloads: Vec<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Resolve a user agent string to a host target
    Host {
        /// User agent (e.g., "curl/8.4.0 Linux/6.2.0 x86_64 GNU/Linux")
        user_agent: String,
    },
    /// Show what else runs on a platform
    Waterfall {
        /// Host os
        #[arg(long)]
        os: String,
        /// Host arch
        #[arg(long)]
        arch: String,
        /// Host libc
        #[arg(long, default_value = "none")]
        libc: String,
        /// Host vendor
        #[arg(long, default_value = "unknown")]
        vendor: String,
    },
    /// Encode and select over a file of versions, one per line
    LintVersions {
        /// Versions file
        file: PathBuf,
        /// Version prefix to select (default: report tags only)
        #[arg(long)]
        prefix: Option<String>,
    },
    /// Resolve a file of user agents, one per line
    LintHosts {
        /// User agents file
        file: PathBuf,
    },
    /// Validate built-in and overlay tables
    Validate,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = run(cli);
    if let Err(e) = result {
        eprintln!("error: {e:#}");
        process::exit(1);
    }
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let tables = || {
        Tables::load(
            cli.terms.as_deref(),
            cli.agent_terms.as_deref(),
            cli.waterfall.as_deref(),
        )
    };

    match cli.command {
        Commands::Lexver { versions, prefix } => commands::lexver::run(&versions, prefix),

        Commands::Select {
            prefix,
            versions,
            json,
        } => commands::select::run(&prefix, &versions, json),

        Commands::Triplet {
            name,
            aliases,
            version,
            downloads,
            json,
        } => commands::triplet::run(&tables()?, &name, &aliases, &version, &downloads, json),

        Commands::Host { user_agent } => commands::host::run(&tables()?, &user_agent),

        Commands::Waterfall {
            os,
            arch,
            libc,
            vendor,
        } => commands::waterfall::run(&tables()?, &os, &arch, &vendor, &libc),

        Commands::LintVersions { file, prefix } => {
            commands::lint::versions(&file, prefix.as_deref())
        }

        Commands::LintHosts { file } => commands::lint::hosts(&tables()?, &file),

        Commands::Validate => tables()?.validate(),
    }
}
