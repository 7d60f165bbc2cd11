// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! satchel_cli - command-line client for the satchel offline learning store.
//!
//! All commands work against a data directory holding `config.toml` and the
//! local store. Writes that must reach the server are queued locally and
//! sent by `satchel sync run`.
//!
//! # Main Components
//!
//! - [`Config`] - client id and `[sync]` settings
//! - [`WebSocketRemote`] - the sync endpoint client
//! - [`Error`] - error type for all commands

mod cli;
mod commands;

pub mod config;
pub mod error;
pub mod remote;

pub use cli::{
    Cli, Command, CredentialArgs, LessonCommand, LessonFilterArgs, OutputFormat, ProgressCommand,
    SyncCommand,
};
pub use config::Config;
pub use error::{Error, Result};
pub use remote::WebSocketRemote;

use std::path::PathBuf;

/// Runs one command against the data directory chosen by `data_dir`
/// (see [`config::resolve_data_dir`]).
pub fn run(data_dir: Option<PathBuf>, command: Command) -> Result<()> {
    let dir = config::resolve_data_dir(data_dir)?;
    match command {
        Command::Init { remote } => commands::init::run(&dir, remote),
        Command::Signup {
            name,
            credentials,
            role,
            language,
        } => commands::account::signup(&dir, name, credentials, &role, &language),
        Command::Login { credentials } => commands::account::login(&dir, credentials),
        Command::Logout => commands::account::logout(&dir),
        Command::Whoami { output } => commands::account::whoami(&dir, output),
        Command::Lesson(cmd) => match cmd {
            LessonCommand::Import { file } => commands::lesson::import(&dir, &file),
            LessonCommand::List { filter, output } => commands::lesson::list(&dir, filter, output),
        },
        Command::Progress(cmd) => match cmd {
            ProgressCommand::Save {
                lesson,
                status,
                score,
                answers,
                time,
            } => commands::progress::save(&dir, &lesson, status, score, answers, time),
            ProgressCommand::List { output } => commands::progress::list(&dir, output),
        },
        Command::Sync(cmd) => match cmd {
            SyncCommand::Status { output } => commands::sync::status(&dir, output),
            SyncCommand::Run => commands::sync::run(&dir),
        },
        Command::Language { code } => commands::language::run(&dir, code),
    }
}
