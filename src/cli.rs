// src/cli.rs
use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "commitah",
    version,
    about = "AI-generated commit messages for your staged changes\n\nWith no flags, reads the staged diff, asks the configured provider for candidates and commits the one you pick.",
    after_help = "EXAMPLES:
    git add --all && commitah       # Pick a message and commit
    commitah --show                 # Pick a message and print it only
    commitah --config               # Show the stored settings
    commitah --config-update        # Choose provider, key and model

ENVIRONMENT:
    RUST_LOG          Log filter (overrides --verbose)
    COMMITAH_PROXY    HTTP(S) proxy for provider requests"
)]
pub struct Cli {
    /// Print the stored configuration and exit
    #[arg(long)]
    pub config: bool,

    /// Open the provider settings form
    #[arg(long = "config-update", visible_alias = "configUpdate")]
    pub config_update: bool,

    /// Print the chosen message instead of committing
    #[arg(long)]
    pub show: bool,

    /// Check crates.io for a newer release
    #[arg(long = "check-update")]
    pub check_update: bool,

    /// Debug logging on stderr
    #[arg(short, long)]
    pub verbose: bool,
}
