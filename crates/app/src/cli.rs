use std::path::PathBuf;

use clap::{Parser, Subcommand};

use save::SavePaths;
use track::ParseMode;

#[derive(Parser, Debug)]
#[command(
    name = "trackedit",
    about = "Edit a tile track with plain-language commands",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Persisted plan file.
    #[arg(long, global = true, default_value = "track.plan")]
    pub plan: PathBuf,

    /// Append-only log of synthesized seeds (JSON lines).
    #[arg(long = "seed-log", global = true, default_value = "track.seeds.jsonl")]
    pub seed_log: PathBuf,

    /// Rule repository JSON. The built-in rules are used when omitted.
    #[arg(long, global = true)]
    pub rules: Option<PathBuf>,

    /// Write a compressed grid snapshot here after the command.
    #[arg(long, global = true)]
    pub snapshot: Option<PathBuf>,

    /// Reject the persisted plan if any line fails to parse.
    #[arg(long, global = true)]
    pub strict: bool,

    /// Print results as JSON.
    #[arg(long, global = true)]
    pub json: bool,

    /// Log pipeline stages at debug level.
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Apply one edit request to the persisted plan and execute it.
    Edit {
        /// The request, e.g. "build 80 by 3 with 5 jump gaps".
        text: String,
    },
    /// Print the persisted plan.
    Show,
    /// Re-execute the persisted plan without changing it.
    Replay,
}

impl Cli {
    pub fn save_paths(&self) -> SavePaths {
        SavePaths {
            plan: self.plan.clone(),
            seed_log: self.seed_log.clone(),
            rules: self.rules.clone(),
            snapshot: self.snapshot.clone(),
        }
    }

    pub fn parse_mode(&self) -> ParseMode {
        if self.strict {
            ParseMode::Strict
        } else {
            ParseMode::Lenient
        }
    }
}
