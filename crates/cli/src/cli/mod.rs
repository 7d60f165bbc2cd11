// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

mod args;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

pub use args::{CredentialArgs, LessonFilterArgs};

/// Parse a string that must not be empty or whitespace-only.
fn non_empty_string(s: &str) -> Result<String, String> {
    if s.trim().is_empty() {
        Err("cannot be empty".to_string())
    } else {
        Ok(s.to_string())
    }
}

/// Output format for commands supporting structured output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Parser)]
#[command(name = "satchel")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Offline-first lessons, quizzes, and progress tracking")]
#[command(
    long_about = "Offline-first lessons, quizzes, and progress tracking.\n\n\
    Everything is stored locally first and synced to a remote server when one is configured."
)]
pub struct Cli {
    /// Data directory (defaults to the platform data directory)
    #[arg(long, global = true, env = "SATCHEL_DIR", value_name = "path")]
    pub data_dir: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create the data directory, config, and local store
    Init {
        /// WebSocket URL of the sync server (ws:// or wss://)
        #[arg(long, short)]
        remote: Option<String>,
    },

    /// Create a local account and sign in
    Signup {
        /// Display name
        #[arg(long, short, value_parser = non_empty_string)]
        name: String,

        #[command(flatten)]
        credentials: CredentialArgs,

        /// Account role (student, teacher, admin)
        #[arg(long, default_value = "student")]
        role: String,

        /// Preferred language (en, hi, pa)
        #[arg(long, short, default_value = "en")]
        language: String,
    },

    /// Sign in to an existing local account
    Login {
        #[command(flatten)]
        credentials: CredentialArgs,
    },

    /// Sign out
    Logout,

    /// Show the signed-in user
    Whoami {
        #[arg(long = "output", short = 'o', value_enum, default_value = "text")]
        output: OutputFormat,
    },

    /// Manage cached lessons
    #[command(subcommand)]
    Lesson(LessonCommand),

    /// Record and review lesson progress
    #[command(subcommand)]
    Progress(ProgressCommand),

    /// Inspect and drain the sync queue
    #[command(subcommand)]
    Sync(SyncCommand),

    /// Show or set the interface language
    Language {
        /// Language code to switch to (en, hi, pa)
        code: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum LessonCommand {
    /// Import lessons and quizzes from a JSON file
    Import {
        /// File holding a lesson array or a {"lessons", "quizzes"} bundle
        file: PathBuf,
    },

    /// List cached lessons
    List {
        #[command(flatten)]
        filter: LessonFilterArgs,

        #[arg(long = "output", short = 'o', value_enum, default_value = "text")]
        output: OutputFormat,
    },
}

#[derive(Subcommand)]
pub enum ProgressCommand {
    /// Record progress on a lesson for the signed-in user
    Save {
        /// Lesson id
        #[arg(value_parser = non_empty_string)]
        lesson: String,

        /// New status (not_started, in_progress, completed)
        #[arg(long, short)]
        status: Option<String>,

        /// Score, 0-100 (with --status completed)
        #[arg(long, value_parser = clap::value_parser!(u8).range(0..=100))]
        score: Option<u8>,

        /// Quiz answers as option indexes; grades the lesson's quiz and
        /// completes the lesson with the resulting score
        #[arg(long, value_delimiter = ',', conflicts_with_all = ["score", "status"])]
        answers: Option<Vec<usize>>,

        /// Seconds spent in this session
        #[arg(long, short, default_value_t = 0)]
        time: u64,
    },

    /// List the signed-in user's progress
    List {
        #[arg(long = "output", short = 'o', value_enum, default_value = "text")]
        output: OutputFormat,
    },
}

#[derive(Subcommand)]
pub enum SyncCommand {
    /// Show queued changes and the last sync time
    Status {
        #[arg(long = "output", short = 'o', value_enum, default_value = "text")]
        output: OutputFormat,
    },

    /// Drain the queue to the configured remote now
    Run,
}
