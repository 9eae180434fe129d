use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "learning-style")]
#[command(about = "Learning-style assessment and study recommendations", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// SQLite database for profiles, results and drafts
    #[arg(long, global = true, env = "STYLE_DB_URL")]
    pub db: Option<String>,

    /// Second SQLite database used for results when the main one fails
    #[arg(long, global = true, env = "STYLE_FALLBACK_DB_URL")]
    pub fallback_db: Option<String>,

    /// JSON question bank to use instead of the standard assessment
    #[arg(long, global = true, env = "STYLE_QUESTION_BANK")]
    pub bank: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Take the assessment interactively, resuming any saved progress
    Quiz {
        #[arg(short, long)]
        user: u64,
    },

    /// Classify four raw scores without storing anything
    Classify(ClassifyArgs),

    /// Show past quiz results, newest first
    History {
        #[arg(short, long)]
        user: u64,

        #[arg(short, long, default_value = "10")]
        limit: u32,

        #[arg(long)]
        json: bool,
    },

    /// Manage learner profiles
    Profile {
        #[command(subcommand)]
        action: ProfileAction,
    },

    /// Suggest study techniques and key topics from study material
    Recommend {
        #[arg(short, long)]
        user: u64,

        /// Text files to pull keywords from
        #[arg(short, long = "file", required = true)]
        files: Vec<PathBuf>,

        #[arg(short, long, default_value = "10")]
        limit: usize,

        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Args)]
pub struct ClassifyArgs {
    #[arg(allow_negative_numbers = true)]
    pub visual: i64,

    #[arg(allow_negative_numbers = true)]
    pub auditory: i64,

    #[arg(allow_negative_numbers = true)]
    pub reading_writing: i64,

    #[arg(allow_negative_numbers = true)]
    pub kinesthetic: i64,

    /// Learner age, to also report the quiz level
    #[arg(long)]
    pub age: Option<i64>,

    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Subcommand)]
pub enum ProfileAction {
    Create {
        #[arg(short, long)]
        user: u64,

        #[arg(short, long)]
        name: String,

        #[arg(short, long)]
        age: u32,
    },
    Show {
        #[arg(short, long)]
        user: u64,

        #[arg(long)]
        json: bool,
    },
    /// Change the display name
    Rename {
        #[arg(short, long)]
        user: u64,

        #[arg(short, long)]
        name: String,
    },
    SetAge {
        #[arg(short, long)]
        user: u64,

        #[arg(short, long)]
        age: u32,
    },
    /// Copy the newest stored result onto the profile
    Sync {
        #[arg(short, long)]
        user: u64,
    },
}
