// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Learner and staff accounts.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::schema::Collection;
use crate::store::{keys, LocalStore, Record};

/// Account role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Student,
    Teacher,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Teacher => "teacher",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Role {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "student" => Ok(Role::Student),
            "teacher" => Ok(Role::Teacher),
            "admin" => Ok(Role::Admin),
            _ => Err(Error::InvalidValue {
                kind: "role",
                value: s.to_string(),
                valid: "student, teacher, admin",
            }),
        }
    }
}

/// Supported content and interface languages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Language {
    #[default]
    En,
    Hi,
    Pa,
}

impl Language {
    pub const ALL: [Language; 3] = [Language::En, Language::Hi, Language::Pa];

    pub fn as_str(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Hi => "hi",
            Language::Pa => "pa",
        }
    }

    /// Name of the language in its own script.
    pub fn native_name(&self) -> &'static str {
        match self {
            Language::En => "English",
            Language::Hi => "हिन्दी",
            Language::Pa => "ਪੰਜਾਬੀ",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Language {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "en" | "english" => Ok(Language::En),
            "hi" | "hindi" => Ok(Language::Hi),
            "pa" | "punjabi" => Ok(Language::Pa),
            _ => Err(Error::InvalidValue {
                kind: "language",
                value: s.to_string(),
                valid: "en, hi, pa",
            }),
        }
    }
}

/// Aggregate learning stats embedded in the user record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressSummary {
    #[serde(default)]
    pub completed_lessons: Vec<String>,
    /// Seconds.
    #[serde(default)]
    pub total_time_spent: u64,
    #[serde(default)]
    pub current_streak: u32,
    #[serde(default)]
    pub achievements: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub language_preference: Language,
    /// Stored locally in plain form; never part of a session snapshot.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress_data: Option<ProgressSummary>,
}

impl User {
    /// Copy of the user with the password removed.
    pub fn without_password(&self) -> User {
        User {
            password: None,
            ..self.clone()
        }
    }
}

impl Record for User {
    const COLLECTION: Collection = Collection::Users;
}

/// Canonical form emails are stored and looked up in.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

impl LocalStore {
    /// Stores the user with its email normalized.
    pub fn save_user(&self, user: &User) -> Result<()> {
        let user = User {
            email: normalize_email(&user.email),
            ..user.clone()
        };
        self.put_record(&user).map(|_| ())
    }

    pub fn get_user(&self, id: &str) -> Result<Option<User>> {
        self.get_record(id)
    }

    /// Looks a user up through the unique email index.
    pub fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        Ok(self
            .get_records_by_index::<User>("email", &normalize_email(email))?
            .into_iter()
            .next())
    }

    /// Interface language, defaulting to English when unset or unreadable.
    pub fn selected_language(&self) -> Result<Language> {
        Ok(self
            .get_value(keys::UI_LANGUAGE)?
            .and_then(|s| s.parse().ok())
            .unwrap_or_default())
    }

    pub fn set_selected_language(&self, language: Language) -> Result<()> {
        self.set_value(keys::UI_LANGUAGE, language.as_str())
    }
}

#[cfg(test)]
#[path = "user_tests.rs"]
mod tests;
