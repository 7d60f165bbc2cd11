// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

pub mod account;
pub mod init;
pub mod language;
pub mod lesson;
pub mod progress;
pub mod sync;

use std::path::{Path, PathBuf};

use satchel_core::{AuthService, LocalStore, User};

use crate::config::{db_path, Config};
use crate::error::Result;

/// An opened data directory: config plus local store.
pub struct Context {
    pub data_dir: PathBuf,
    pub config: Config,
    pub store: LocalStore,
}

impl Context {
    /// Opens an initialized data directory.
    pub fn open(data_dir: &Path) -> Result<Self> {
        let config = Config::load(data_dir)?;
        let store = LocalStore::open(db_path(data_dir))?;
        Ok(Context {
            data_dir: data_dir.to_path_buf(),
            config,
            store,
        })
    }

    pub fn auth(&self) -> Result<AuthService> {
        Ok(AuthService::new(self.store.clone())?)
    }

    /// The signed-in user, or `NotAuthenticated`.
    pub fn require_user(&self) -> Result<User> {
        self.auth()?
            .current_user()
            .ok_or_else(|| satchel_core::Error::NotAuthenticated.into())
    }
}
