// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

mod common;
use common::*;

#[test]
fn import_then_list() {
    let temp = init_temp();
    let file = write_file(&temp, "lessons.json", LESSONS);

    satchel(&temp)
        .args(["lesson", "import"])
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("Imported 2 lessons and 1 quizzes"));

    satchel(&temp)
        .args(["lesson", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("l-math-1  Fractions [video, math, beginner, 12m]"))
        .stdout(predicate::str::contains("l-sci-1  Plants [epub, science, intermediate]"));
}

#[test]
fn plain_lesson_array_is_accepted() {
    let temp = init_temp();
    let bundle: serde_json::Value = serde_json::from_str(LESSONS).unwrap();
    let file = write_file(&temp, "array.json", &bundle["lessons"].to_string());

    satchel(&temp)
        .args(["lesson", "import"])
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("Imported 2 lessons and 0 quizzes"));
}

#[test]
fn list_filters_by_language_and_category() {
    let temp = init_temp();
    import_lessons(&temp);

    satchel(&temp)
        .args(["lesson", "list", "--language", "hi"])
        .assert()
        .success()
        .stdout(predicate::str::contains("l-sci-1"))
        .stdout(predicate::str::contains("l-math-1").not());

    satchel(&temp)
        .args(["lesson", "list", "--category", "math"])
        .assert()
        .success()
        .stdout(predicate::str::contains("l-math-1"))
        .stdout(predicate::str::contains("l-sci-1").not());

    satchel(&temp)
        .args(["lesson", "list", "--category", "math", "--language", "hi"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No lessons"));
}

#[test]
fn titles_follow_interface_language() {
    let temp = init_temp();
    import_lessons(&temp);
    satchel(&temp).args(["language", "hi"]).assert().success();

    satchel(&temp)
        .args(["lesson", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("भिन्न"))
        // no Hindi title, falls back to English
        .stdout(predicate::str::contains("Plants"));
}

#[test]
fn list_json_round_trips_lessons() {
    let temp = init_temp();
    import_lessons(&temp);

    let output = satchel(&temp)
        .args(["lesson", "list", "-o", "json"])
        .output()
        .unwrap();
    let lessons: Vec<serde_json::Value> = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(lessons.len(), 2);
    assert_eq!(lessons[0]["type"], "video");
    assert_eq!(lessons[0]["duration"], 12);
}

#[test]
fn reimport_replaces_lessons() {
    let temp = init_temp();
    import_lessons(&temp);
    import_lessons(&temp);

    let output = satchel(&temp)
        .args(["lesson", "list", "-o", "json"])
        .output()
        .unwrap();
    let lessons: Vec<serde_json::Value> = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(lessons.len(), 2);
}

#[test]
fn quiz_for_unknown_lesson_is_refused() {
    let temp = init_temp();
    let file = write_file(
        &temp,
        "orphan.json",
        r#"{ "lessons": [], "quizzes": [ { "id": "q", "lessonId": "missing", "passingScore": 1, "questions": [] } ] }"#,
    );

    satchel(&temp)
        .args(["lesson", "import"])
        .arg(&file)
        .assert()
        .failure()
        .stderr(predicate::str::contains("lesson not found: missing"));
}

#[test]
fn malformed_file_is_reported() {
    let temp = init_temp();
    let file = write_file(&temp, "bad.json", "{ not json");

    satchel(&temp)
        .args(["lesson", "import"])
        .arg(&file)
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid import file"));
}
