// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Local account sign-up and sign-in.
//!
//! Accounts live in the `users` collection. The signed-in user is kept as a
//! password-free snapshot in the scalar area so it survives restarts.

use chrono::Utc;
use std::sync::Mutex;
use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::queue::SyncKind;
use crate::schema::Collection;
use crate::store::{keys, LocalStore};
use crate::user::{normalize_email, Language, ProgressSummary, Role, User};

/// Fields collected at sign-up.
#[derive(Debug, Clone)]
pub struct SignupData {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
    pub language_preference: Language,
}

/// Partial profile change. `None` leaves a field as it is.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub language_preference: Option<Language>,
    pub progress_data: Option<ProgressSummary>,
}

pub struct AuthService {
    store: LocalStore,
    current: Mutex<Option<User>>,
}

impl AuthService {
    /// Creates the service and restores any persisted session.
    pub fn new(store: LocalStore) -> Result<Self> {
        let service = AuthService {
            store,
            current: Mutex::new(None),
        };
        service.restore()?;
        Ok(service)
    }

    /// Reloads the session snapshot. A snapshot that no longer parses is
    /// discarded.
    pub fn restore(&self) -> Result<Option<User>> {
        let user = match self.store.get_value(keys::CURRENT_USER)? {
            None => None,
            Some(raw) => match serde_json::from_str::<User>(&raw) {
                Ok(user) => Some(user),
                Err(e) => {
                    warn!("discarding unreadable session snapshot: {e}");
                    self.store.remove_value(keys::CURRENT_USER)?;
                    None
                }
            },
        };
        *self.lock()? = user.clone();
        Ok(user)
    }

    pub fn signup(&self, data: SignupData) -> Result<User> {
        let email = normalize_email(&data.email);
        if self.store.find_user_by_email(&email)?.is_some() {
            return Err(Error::EmailTaken(email));
        }

        let user = User {
            id: self.next_user_id()?,
            name: data.name,
            email: email.clone(),
            role: data.role,
            language_preference: data.language_preference,
            password: Some(data.password),
            progress_data: None,
        };
        let public = user.without_password();
        self.store
            .put_and_enqueue(
                Collection::Users,
                &serde_json::to_value(&user)?,
                SyncKind::User,
                &serde_json::to_value(&public)?,
            )
            .map_err(|e| match e {
                Error::Constraint(_) => Error::EmailTaken(email),
                other => other,
            })?;

        info!("created account {} ({})", public.id, public.role);
        self.set_current(Some(public.clone()))?;
        Ok(public)
    }

    /// Signs in. Unknown email and wrong password fail the same way and
    /// leave the current session untouched.
    pub fn login(&self, email: &str, password: &str) -> Result<User> {
        let email = normalize_email(email);
        let user = self
            .store
            .find_user_by_email(&email)?
            .ok_or(Error::InvalidCredentials)?;
        if user.password.as_deref() != Some(password) {
            return Err(Error::InvalidCredentials);
        }

        let public = user.without_password();
        info!("signed in as {}", public.id);
        self.set_current(Some(public.clone()))?;
        Ok(public)
    }

    pub fn logout(&self) -> Result<()> {
        self.set_current(None)
    }

    pub fn current_user(&self) -> Option<User> {
        self.current.lock().ok().and_then(|guard| guard.clone())
    }

    pub fn is_authenticated(&self) -> bool {
        self.current_user().is_some()
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.current_user().is_some_and(|u| u.role == role)
    }

    /// Applies `update` to the signed-in user and queues it for sync.
    pub fn update_profile(&self, update: ProfileUpdate) -> Result<User> {
        let current = self.current_user().ok_or(Error::NotAuthenticated)?;
        let mut user = self
            .store
            .get_user(&current.id)?
            .ok_or(Error::NotAuthenticated)?;

        if let Some(name) = update.name {
            user.name = name;
        }
        if let Some(language) = update.language_preference {
            user.language_preference = language;
        }
        if let Some(progress) = update.progress_data {
            user.progress_data = Some(progress);
        }

        let public = user.without_password();
        self.store.put_and_enqueue(
            Collection::Users,
            &serde_json::to_value(&user)?,
            SyncKind::User,
            &serde_json::to_value(&public)?,
        )?;
        self.set_current(Some(public.clone()))?;
        Ok(public)
    }

    fn set_current(&self, user: Option<User>) -> Result<()> {
        match &user {
            Some(u) => self
                .store
                .set_value(keys::CURRENT_USER, &serde_json::to_string(u)?)?,
            None => {
                self.store.remove_value(keys::CURRENT_USER)?;
            }
        }
        *self.lock()? = user;
        Ok(())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Option<User>>> {
        self.current.lock().map_err(|_| Error::LockPoisoned)
    }

    /// `user-<millis>`, bumped until it does not collide.
    fn next_user_id(&self) -> Result<String> {
        let mut millis = Utc::now().timestamp_millis();
        loop {
            let id = format!("user-{millis}");
            if self.store.get_user(&id)?.is_none() {
                return Ok(id);
            }
            millis += 1;
        }
    }
}

#[cfg(test)]
#[path = "auth_tests.rs"]
mod tests;
