// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::path::Path;

use satchel_core::{Language, ProfileUpdate};

use super::Context;
use crate::error::Result;

/// Shows the interface language, or switches it when `code` is given.
///
/// Switching also updates a signed-in user's preference.
pub fn run(data_dir: &Path, code: Option<String>) -> Result<()> {
    let ctx = Context::open(data_dir)?;
    let Some(code) = code else {
        let current = ctx.store.selected_language()?;
        for language in Language::ALL {
            let marker = if language == current { "*" } else { " " };
            println!("{} {} {}", marker, language, language.native_name());
        }
        return Ok(());
    };

    let language: Language = code.parse()?;
    ctx.store.set_selected_language(language)?;

    let auth = ctx.auth()?;
    if auth.is_authenticated() {
        auth.update_profile(ProfileUpdate {
            language_preference: Some(language),
            ..ProfileUpdate::default()
        })?;
    }
    println!("Language set to {} ({})", language, language.native_name());
    Ok(())
}
