// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::path::Path;

use satchel_core::LocalStore;

use crate::config::{db_path, init_data_dir};
use crate::error::Result;

pub fn run(data_dir: &Path, remote: Option<String>) -> Result<()> {
    let config = init_data_dir(data_dir, remote)?;
    LocalStore::open(db_path(data_dir))?;

    println!("Initialized satchel at {}", data_dir.display());
    println!("Client: {}", config.client_id);
    match config.remote_url() {
        Some(url) => println!("Remote: {}", url),
        None => println!("Remote: none (local only)"),
    }
    Ok(())
}
