use clap::{Parser, Subcommand};

use draftline::workflow::WorkflowStatus;

pub mod commands;

#[derive(Parser)]
#[command(name = "draftline")]
#[command(about = "Editorial workflow for Git-backed content")]
#[command(long_about = "Draftline moves content entries through a draft, review and ready workflow \
                       before publishing them. Get started with 'draftline board' to see the \
                       entries waiting for review.")]
pub struct Cli {
    /// Show debug logging
    #[arg(long, short = 'v', global = true, help = "Enable debug logging")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show unpublished entries grouped by workflow status
    Board,
    /// Show one entry, unpublished or published
    Show {
        collection: String,
        slug: String,
    },
    /// Save an entry into the editorial workflow
    Save {
        collection: String,
        slug: String,
        /// Field values as key=value
        #[arg(long = "field", short = 'f', value_parser = parse_field, help = "Field value as key=value (repeatable)")]
        fields: Vec<(String, String)>,
        /// Field values as a JSON object
        #[arg(long, help = "JSON object merged into the entry data")]
        data: Option<String>,
        /// Media files to upload with the entry
        #[arg(long, help = "Media file to store with the entry (repeatable)")]
        media: Vec<std::path::PathBuf>,
    },
    /// Move an entry to another workflow status
    Move {
        collection: String,
        slug: String,
        /// Target status: draft, review or ready
        status: WorkflowStatus,
    },
    /// Publish an entry that is ready
    Publish {
        collection: String,
        slug: String,
        #[arg(short = 'y', long, help = "Skip the confirmation prompt")]
        yes: bool,
    },
    /// Discard an unpublished entry
    Delete {
        collection: String,
        slug: String,
        #[arg(short = 'y', long, help = "Skip the confirmation prompt")]
        yes: bool,
    },
    /// Log in with a token from the environment
    Login {
        /// Page host used to build the authenticator config
        #[arg(long, default_value = "localhost", help = "Host the login page is served from")]
        host: String,
    },
}

fn parse_field(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(key, value)| (key.trim().to_string(), value.to_string()))
        .filter(|(key, _)| !key.is_empty())
        .ok_or_else(|| format!("expected key=value, got '{raw}'"))
}
