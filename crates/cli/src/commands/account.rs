// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::path::Path;

use satchel_core::{Language, Role, SignupData, User};

use super::Context;
use crate::cli::{CredentialArgs, OutputFormat};
use crate::error::Result;

pub fn signup(
    data_dir: &Path,
    name: String,
    credentials: CredentialArgs,
    role: &str,
    language: &str,
) -> Result<()> {
    let role: Role = role.parse()?;
    let language: Language = language.parse()?;
    let ctx = Context::open(data_dir)?;

    let user = ctx.auth()?.signup(SignupData {
        name,
        email: credentials.email,
        password: credentials.password,
        role,
        language_preference: language,
    })?;
    ctx.store.set_selected_language(user.language_preference)?;

    println!("Created account {} ({})", user.email, user.role);
    println!("Signed in as {}", user.name);
    Ok(())
}

pub fn login(data_dir: &Path, credentials: CredentialArgs) -> Result<()> {
    let ctx = Context::open(data_dir)?;
    let user = ctx
        .auth()?
        .login(&credentials.email, &credentials.password)?;
    println!("Signed in as {}", user.name);
    Ok(())
}

pub fn logout(data_dir: &Path) -> Result<()> {
    let ctx = Context::open(data_dir)?;
    let auth = ctx.auth()?;
    match auth.current_user() {
        Some(user) => {
            auth.logout()?;
            println!("Signed out {}", user.email);
        }
        None => println!("Not signed in"),
    }
    Ok(())
}

pub fn whoami(data_dir: &Path, output: OutputFormat) -> Result<()> {
    let ctx = Context::open(data_dir)?;
    let user = ctx.require_user()?;
    match output {
        OutputFormat::Text => print_user(&user),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&user)?),
    }
    Ok(())
}

fn print_user(user: &User) {
    println!("{} <{}>", user.name, user.email);
    println!("Id: {}", user.id);
    println!("Role: {}", user.role);
    println!(
        "Language: {} ({})",
        user.language_preference,
        user.language_preference.native_name()
    );
    if let Some(summary) = &user.progress_data {
        println!(
            "Completed: {} lessons, {}s studied",
            summary.completed_lessons.len(),
            summary.total_time_spent
        );
    }
}
