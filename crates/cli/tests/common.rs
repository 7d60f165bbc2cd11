// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

// Test helpers are shared across multiple test binaries, and not every test
// file uses every helper.
#![allow(dead_code)]
#![allow(unused_imports)]

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use std::path::PathBuf;

pub use predicates::prelude::*;
pub use tempfile::TempDir;

/// `satchel` pointed at `temp` as its data directory.
pub fn satchel(temp: &TempDir) -> Command {
    let mut cmd = cargo_bin_cmd!("satchel");
    cmd.arg("--data-dir")
        .arg(temp.path())
        .env_remove("SATCHEL_DIR")
        .env_remove("SATCHEL_PASSWORD")
        .env_remove("SATCHEL_LOG");
    cmd
}

/// An initialized, local-only data directory.
pub fn init_temp() -> TempDir {
    let temp = TempDir::new().unwrap();
    satchel(&temp).arg("init").assert().success();
    temp
}

/// An initialized data directory with a signed-in student.
pub fn init_signed_in() -> TempDir {
    let temp = init_temp();
    signup(&temp, "Asha", "asha@example.com", "secret");
    temp
}

pub fn signup(temp: &TempDir, name: &str, email: &str, password: &str) {
    satchel(temp)
        .args(["signup", "--name", name, "--email", email, "--password", password])
        .assert()
        .success();
}

pub const LESSONS: &str = r#"{
  "lessons": [
    {
      "id": "l-math-1",
      "title": { "en": "Fractions", "hi": "भिन्न" },
      "description": { "en": "Halves and quarters" },
      "type": "video",
      "duration": 12,
      "language": "en",
      "filePath": "lessons/fractions.mp4",
      "size": 1048576,
      "category": "math",
      "difficulty": "beginner"
    },
    {
      "id": "l-sci-1",
      "title": { "en": "Plants" },
      "description": { "en": "How plants grow" },
      "type": "epub",
      "pages": 20,
      "language": "hi",
      "filePath": "lessons/plants.epub",
      "size": 2048,
      "category": "science",
      "difficulty": "intermediate"
    }
  ],
  "quizzes": [
    {
      "id": "q-math-1",
      "lessonId": "l-math-1",
      "passingScore": 50,
      "questions": [
        { "id": "q1", "question": { "en": "1/2 + 1/2?" }, "options": { "en": ["1", "2"] }, "correctAnswer": 0 },
        { "id": "q2", "question": { "en": "1/4 + 1/4?" }, "options": { "en": ["1/2", "1"] }, "correctAnswer": 0 }
      ]
    }
  ]
}"#;

/// Writes [`LESSONS`] into `temp` and imports it.
pub fn import_lessons(temp: &TempDir) {
    let file = write_file(temp, "lessons.json", LESSONS);
    satchel(temp)
        .args(["lesson", "import"])
        .arg(&file)
        .assert()
        .success();
}

pub fn write_file(temp: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = temp.path().join(name);
    std::fs::write(&path, content).unwrap();
    path
}
