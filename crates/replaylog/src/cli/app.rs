use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use super::commands::{batch::BatchArgs, extract::ExtractArgs, validate::ValidateArgs};

#[derive(Debug, Parser)]
#[command(
    name = "replaylog",
    version,
    about = "Extract chat messages from livestream replay logs"
)]
pub struct Cli {
    #[command(flatten)]
    pub runtime: RuntimeArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Args)]
pub struct RuntimeArgs {
    #[arg(long, global = true, value_name = "PATH")]
    pub home_dir: Option<PathBuf>,

    #[arg(long, global = true, value_name = "PATH")]
    pub cwd: Option<PathBuf>,

    #[arg(long, global = true, value_name = "PATH")]
    pub out_dir: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Extract one replay log into an artifact directory.
    Extract(ExtractArgs),
    /// Extract every replay log found in the download directory.
    Batch(BatchArgs),
    /// Check a messages.jsonl artifact against the record invariants.
    Validate(ValidateArgs),
}
