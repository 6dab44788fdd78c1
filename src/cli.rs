use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "rankboard",
    version,
    about = "Row-locked rating board: place items into scale buckets and rank them per question"
)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a starter rankboard.toml
    Init(InitCommand),
    /// Print the board with its current ranks
    Show(ShowCommand),
    /// Move one item within a question's row and save the result
    Move(MoveCommand),
    /// Replace the saved state with records from a file
    Restore(RestoreCommand),
    /// Check the board configuration
    Validate(ValidateCommand),
}

#[derive(Args)]
pub struct InitCommand {
    pub path: PathBuf,
    #[arg(long)]
    pub dry_run: bool,
    #[arg(long)]
    pub no_overwrite: bool,
}

#[derive(Args)]
pub struct ShowCommand {
    pub path: PathBuf,
    #[arg(short, long, value_enum, default_value = "md")]
    pub format: ReportFormat,
}

#[derive(Args)]
pub struct MoveCommand {
    pub path: PathBuf,
    /// Question key or text
    #[arg(long)]
    pub question: String,
    /// Item key or name
    #[arg(long)]
    pub item: String,
    /// Scale label, or "unsorted"
    #[arg(long)]
    pub bucket: String,
    /// Zero-based position in the target bucket; appends when omitted
    #[arg(long)]
    pub position: Option<usize>,
    #[arg(short, long, value_enum, default_value = "md")]
    pub format: ReportFormat,
}

#[derive(Args)]
pub struct RestoreCommand {
    pub path: PathBuf,
    /// JSON file holding a snapshot or a bare record array
    #[arg(long)]
    pub from: PathBuf,
}

#[derive(Args)]
pub struct ValidateCommand {
    pub path: PathBuf,
}

#[derive(Clone, ValueEnum)]
pub enum ReportFormat {
    Json,
    Md,
    Compact,
}
