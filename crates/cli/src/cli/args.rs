// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Shared argument structs for CLI commands.

use clap::Args;

/// Email and password, shared by `signup` and `login`.
#[derive(Args, Clone, Debug)]
pub struct CredentialArgs {
    /// Account email
    #[arg(long, short)]
    pub email: String,

    /// Account password
    #[arg(long, short, env = "SATCHEL_PASSWORD", hide_env_values = true)]
    pub password: String,
}

/// Filters for lesson listings.
#[derive(Args, Clone, Debug, Default)]
pub struct LessonFilterArgs {
    /// Only lessons in this language (en, hi, pa)
    #[arg(long, short)]
    pub language: Option<String>,

    /// Only lessons in this category
    #[arg(long, short)]
    pub category: Option<String>,
}
