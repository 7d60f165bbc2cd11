// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use serde_json::json;
use yare::parameterized;

fn water_cycle() -> Lesson {
    Lesson {
        id: "lesson-4".into(),
        title: Localized {
            en: "Science - Water Cycle".into(),
            hi: Some("विज्ञान - जल चक्र".into()),
            pa: None,
        },
        description: Localized::new("Understanding the water cycle process".into()),
        content: LessonContent::Video { duration: 18 },
        language: Language::En,
        file_path: "/lessons/water-cycle.mp4".into(),
        size: 30_000_000,
        category: "Science".into(),
        difficulty: Difficulty::Intermediate,
        cached: true,
    }
}

fn question(correct: usize) -> QuizQuestion {
    QuizQuestion {
        id: format!("q{correct}"),
        question: Localized::new("Pick one".into()),
        options: Localized::new(vec!["a".into(), "b".into(), "c".into()]),
        correct_answer: correct,
        explanation: None,
    }
}

fn quiz(passing_score: u8) -> Quiz {
    Quiz {
        id: "quiz-1".into(),
        lesson_id: "lesson-3".into(),
        questions: vec![question(0), question(1), question(2), question(1)],
        passing_score,
    }
}

#[parameterized(
    english = { Language::En, "Science - Water Cycle" },
    hindi = { Language::Hi, "विज्ञान - जल चक्र" },
    punjabi_falls_back = { Language::Pa, "Science - Water Cycle" },
)]
fn localized_falls_back_to_english(lang: Language, expected: &str) {
    assert_eq!(water_cycle().title.get(lang), expected);
}

#[test]
fn lesson_record_is_flat_with_type_tag() {
    let value = serde_json::to_value(water_cycle()).unwrap();
    assert_eq!(value["type"], "video");
    assert_eq!(value["duration"], 18);
    assert_eq!(value["filePath"], "/lessons/water-cycle.mp4");
    assert_eq!(value["language"], "en");
}

#[test]
fn lesson_content_kinds_parse() {
    let epub: Lesson = serde_json::from_value(json!({
        "id": "l9",
        "title": { "en": "Reader" },
        "description": { "en": "A book" },
        "type": "epub",
        "language": "pa",
        "filePath": "/lessons/reader.epub",
        "size": 1200,
        "category": "Language",
        "difficulty": "beginner",
    }))
    .unwrap();

    assert_eq!(epub.content, LessonContent::Epub { pages: None });
    assert_eq!(epub.content.kind(), "epub");
    assert_eq!(epub.content.duration_minutes(), None);
    assert!(!epub.cached);
}

#[parameterized(
    all_right = { vec![0, 1, 2, 1], 4, 100, true },
    three_of_four = { vec![0, 1, 2, 0], 3, 75, true },
    half = { vec![0, 1, 0, 0], 2, 50, false },
    missing_answers_are_wrong = { vec![0], 1, 25, false },
)]
fn quiz_grading(answers: Vec<usize>, correct: usize, score: u8, passed: bool) {
    let result = quiz(70).grade(&answers);
    assert_eq!(result.correct, correct);
    assert_eq!(result.total, 4);
    assert_eq!(result.score, score);
    assert_eq!(result.passed, passed);
}

#[test]
fn empty_quiz_scores_zero() {
    let empty = Quiz {
        questions: Vec::new(),
        ..quiz(50)
    };
    let result = empty.grade(&[1, 2]);
    assert_eq!(result.score, 0);
    assert!(!result.passed);
}

#[test]
fn lessons_filter_by_language_and_category() {
    let store = LocalStore::open_in_memory().unwrap();
    let hindi = Lesson {
        id: "lesson-5".into(),
        language: Language::Hi,
        category: "Mathematics".into(),
        ..water_cycle()
    };
    store.save_lessons(&[water_cycle(), hindi.clone()]).unwrap();

    assert_eq!(store.get_lessons(None).unwrap().len(), 2);
    assert_eq!(store.get_lessons(Some(Language::Hi)).unwrap(), vec![hindi]);
    assert_eq!(
        store.get_lessons_by_category("Science").unwrap(),
        vec![water_cycle()]
    );
}

#[test]
fn quizzes_are_found_by_lesson() {
    let store = LocalStore::open_in_memory().unwrap();
    store.save_quiz(&quiz(60)).unwrap();

    let found = store.get_quizzes_for_lesson("lesson-3").unwrap();
    assert_eq!(found, vec![quiz(60)]);
    assert!(store.get_quizzes_for_lesson("lesson-4").unwrap().is_empty());
}
