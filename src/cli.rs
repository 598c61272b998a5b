use std::path::PathBuf;

use clap::Parser;

use crate::cmd::Commands;

/// Personal task tracker with list and board views.
/// Storage defaults to the user data directory or a path passed via --db.
#[derive(Parser)]
#[command(name = "tb", version, about = "Personal task tracker")]
pub struct Cli {
    /// Path to the JSON task snapshot.
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Log more (repeat for trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Commands>,
}
