// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use serde::Deserialize;
use std::fs;
use std::path::Path;

use satchel_core::{Language, Lesson, Quiz};

use super::Context;
use crate::cli::{LessonFilterArgs, OutputFormat};
use crate::error::{Error, Result};

/// Accepted import file shapes.
#[derive(Deserialize)]
#[serde(untagged)]
enum ImportFile {
    Bundle {
        lessons: Vec<Lesson>,
        #[serde(default)]
        quizzes: Vec<Quiz>,
    },
    Lessons(Vec<Lesson>),
}

pub fn import(data_dir: &Path, file: &Path) -> Result<()> {
    let ctx = Context::open(data_dir)?;
    let content = fs::read_to_string(file)?;
    let (lessons, quizzes) = match serde_json::from_str::<ImportFile>(&content) {
        Ok(ImportFile::Bundle { lessons, quizzes }) => (lessons, quizzes),
        Ok(ImportFile::Lessons(lessons)) => (lessons, Vec::new()),
        Err(e) => return Err(Error::InvalidImport(format!("{}: {}", file.display(), e))),
    };

    for quiz in &quizzes {
        let known = lessons.iter().any(|l| l.id == quiz.lesson_id)
            || ctx.store.get_record::<Lesson>(quiz.lesson_id.as_str())?.is_some();
        if !known {
            return Err(Error::LessonNotFound(quiz.lesson_id.clone()));
        }
    }

    ctx.store.save_lessons(&lessons)?;
    for quiz in &quizzes {
        ctx.store.save_quiz(quiz)?;
    }
    println!(
        "Imported {} lessons and {} quizzes",
        lessons.len(),
        quizzes.len()
    );
    Ok(())
}

pub fn list(data_dir: &Path, filter: LessonFilterArgs, output: OutputFormat) -> Result<()> {
    let ctx = Context::open(data_dir)?;
    let language = filter
        .language
        .as_deref()
        .map(str::parse::<Language>)
        .transpose()?;

    let mut lessons = match &filter.category {
        Some(category) => ctx.store.get_lessons_by_category(category)?,
        None => ctx.store.get_lessons(language)?,
    };
    if let (Some(_), Some(language)) = (&filter.category, language) {
        lessons.retain(|l| l.language == language);
    }

    if output == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&lessons)?);
        return Ok(());
    }
    if lessons.is_empty() {
        println!("No lessons");
        return Ok(());
    }

    let display = ctx.store.selected_language()?;
    for lesson in &lessons {
        let duration = lesson
            .content
            .duration_minutes()
            .map(|m| format!(", {}m", m))
            .unwrap_or_default();
        println!(
            "{}  {} [{}, {}, {}{}]",
            lesson.id,
            lesson.title.get(display),
            lesson.content.kind(),
            lesson.category,
            lesson.difficulty,
            duration
        );
    }
    Ok(())
}
