// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::path::Path;

use satchel_core::{CompletionStatus, Lesson, ProfileUpdate, Progress};

use super::Context;
use crate::cli::OutputFormat;
use crate::error::{Error, Result};

pub fn save(
    data_dir: &Path,
    lesson_id: &str,
    status: Option<String>,
    score: Option<u8>,
    answers: Option<Vec<usize>>,
    time: u64,
) -> Result<()> {
    let ctx = Context::open(data_dir)?;
    let user = ctx.require_user()?;
    if ctx.store.get_record::<Lesson>(lesson_id)?.is_none() {
        return Err(Error::LessonNotFound(lesson_id.to_string()));
    }

    let mut status = status
        .as_deref()
        .map(str::parse::<CompletionStatus>)
        .transpose()?;
    let mut score = score;
    if let Some(answers) = &answers {
        let quiz = ctx
            .store
            .get_quizzes_for_lesson(lesson_id)?
            .into_iter()
            .next()
            .ok_or_else(|| Error::NoQuiz(lesson_id.to_string()))?;
        let result = quiz.grade(answers);
        println!(
            "Quiz: {}/{} correct, {}% ({})",
            result.correct,
            result.total,
            result.score,
            if result.passed { "passed" } else { "not passed" }
        );
        score = Some(result.score);
        status = Some(CompletionStatus::Completed);
    }

    let mut progress = ctx
        .store
        .get_lesson_progress(&user.id, lesson_id)?
        .unwrap_or_else(|| Progress::new(user.id.as_str(), lesson_id));
    let was_completed = progress.completion_status == CompletionStatus::Completed;

    match status {
        None | Some(CompletionStatus::InProgress) => progress.start(),
        Some(CompletionStatus::Completed) => {
            if progress.completion_status == CompletionStatus::NotStarted {
                progress.start();
            }
            progress.complete(score);
        }
        Some(CompletionStatus::NotStarted) => {
            progress.completion_status = CompletionStatus::NotStarted;
        }
    }
    if time > 0 {
        progress.record_session(time);
    }

    let seq = ctx.store.save_progress(&progress)?;
    println!(
        "Saved {} for {}: {} (queued #{})",
        lesson_id, user.name, progress.completion_status, seq
    );

    let newly_completed =
        !was_completed && progress.completion_status == CompletionStatus::Completed;
    if newly_completed || time > 0 {
        update_summary(&ctx, lesson_id, newly_completed, time)?;
    }
    Ok(())
}

/// Folds a session into the signed-in user's progress summary.
fn update_summary(ctx: &Context, lesson_id: &str, completed: bool, time: u64) -> Result<()> {
    let auth = ctx.auth()?;
    let user = ctx
        .store
        .get_user(&ctx.require_user()?.id)?
        .ok_or(satchel_core::Error::NotAuthenticated)?;

    let mut summary = user.progress_data.unwrap_or_default();
    if completed && !summary.completed_lessons.iter().any(|l| l == lesson_id) {
        summary.completed_lessons.push(lesson_id.to_string());
    }
    summary.total_time_spent = summary.total_time_spent.saturating_add(time);
    auth.update_profile(ProfileUpdate {
        progress_data: Some(summary),
        ..ProfileUpdate::default()
    })?;
    Ok(())
}

pub fn list(data_dir: &Path, output: OutputFormat) -> Result<()> {
    let ctx = Context::open(data_dir)?;
    let user = ctx.require_user()?;
    let records = ctx.store.get_progress(&user.id)?;

    if output == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }
    if records.is_empty() {
        println!("No progress recorded");
        return Ok(());
    }
    for p in &records {
        let score = p.score.map(|s| format!(" score {}%", s)).unwrap_or_default();
        println!(
            "{}  {}{}  {}s over {} attempts  (last {})",
            p.lesson_id,
            p.completion_status,
            score,
            p.time_spent,
            p.attempts,
            p.last_accessed.format("%Y-%m-%d %H:%M")
        );
    }
    Ok(())
}
