// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Lessons, quizzes, and quiz grading.
//!
//! Learner-facing text is [`Localized`]: English is always present and the
//! Hindi and Punjabi variants fall back to it when missing.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::schema::Collection;
use crate::store::{LocalStore, Record};
use crate::user::Language;

/// A value with an English original and optional translations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Localized<T> {
    pub en: T,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hi: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pa: Option<T>,
}

impl<T> Localized<T> {
    pub fn new(en: T) -> Self {
        Localized {
            en,
            hi: None,
            pa: None,
        }
    }

    /// The variant for `language`, or English when it is missing.
    pub fn get(&self, language: Language) -> &T {
        let translated = match language {
            Language::En => None,
            Language::Hi => self.hi.as_ref(),
            Language::Pa => self.pa.as_ref(),
        };
        translated.unwrap_or(&self.en)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Beginner => "beginner",
            Difficulty::Intermediate => "intermediate",
            Difficulty::Advanced => "advanced",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "beginner" => Ok(Difficulty::Beginner),
            "intermediate" => Ok(Difficulty::Intermediate),
            "advanced" => Ok(Difficulty::Advanced),
            _ => Err(Error::InvalidValue {
                kind: "difficulty",
                value: s.to_string(),
                valid: "beginner, intermediate, advanced",
            }),
        }
    }
}

/// Kind-specific lesson data, tagged by `type` in the stored record.
///
/// Durations are minutes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LessonContent {
    Video {
        duration: u32,
    },
    Quiz {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        duration: Option<u32>,
    },
    Epub {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pages: Option<u32>,
    },
    Interactive {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        duration: Option<u32>,
    },
}

impl LessonContent {
    pub fn kind(&self) -> &'static str {
        match self {
            LessonContent::Video { .. } => "video",
            LessonContent::Quiz { .. } => "quiz",
            LessonContent::Epub { .. } => "epub",
            LessonContent::Interactive { .. } => "interactive",
        }
    }

    pub fn duration_minutes(&self) -> Option<u32> {
        match self {
            LessonContent::Video { duration } => Some(*duration),
            LessonContent::Quiz { duration } | LessonContent::Interactive { duration } => {
                *duration
            }
            LessonContent::Epub { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lesson {
    pub id: String,
    pub title: Localized<String>,
    pub description: Localized<String>,
    #[serde(flatten)]
    pub content: LessonContent,
    /// Language the content itself is recorded in.
    pub language: Language,
    pub file_path: String,
    /// Bytes.
    pub size: u64,
    pub category: String,
    pub difficulty: Difficulty,
    /// True once the file is available offline.
    #[serde(default)]
    pub cached: bool,
}

impl Record for Lesson {
    const COLLECTION: Collection = Collection::Lessons;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestion {
    pub id: String,
    pub question: Localized<String>,
    pub options: Localized<Vec<String>>,
    /// Index into `options`.
    pub correct_answer: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<Localized<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quiz {
    pub id: String,
    pub lesson_id: String,
    pub questions: Vec<QuizQuestion>,
    /// Percent needed to pass.
    pub passing_score: u8,
}

impl Record for Quiz {
    const COLLECTION: Collection = Collection::Quizzes;
}

/// Outcome of grading one attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QuizResult {
    pub correct: usize,
    pub total: usize,
    /// Percent, rounded down.
    pub score: u8,
    pub passed: bool,
}

impl Quiz {
    /// Grades `answers` positionally. Missing answers count as wrong.
    pub fn grade(&self, answers: &[usize]) -> QuizResult {
        let total = self.questions.len();
        let correct = self
            .questions
            .iter()
            .zip(answers)
            .filter(|(q, a)| q.correct_answer == **a)
            .count();
        let score = if total == 0 {
            0
        } else {
            u8::try_from(correct * 100 / total).unwrap_or(100)
        };
        QuizResult {
            correct,
            total,
            score,
            passed: score >= self.passing_score,
        }
    }
}

impl LocalStore {
    /// Stores a batch of lessons in one transaction.
    pub fn save_lessons(&self, lessons: &[Lesson]) -> Result<()> {
        let values = lessons
            .iter()
            .map(serde_json::to_value)
            .collect::<std::result::Result<Vec<_>, _>>()?;
        self.with_conn(|conn| {
            let tx = conn.transaction()?;
            for value in &values {
                crate::store::put_row(&tx, Collection::Lessons, value)?;
            }
            tx.commit()?;
            Ok(())
        })
    }

    /// All lessons, or only those recorded in `language`.
    pub fn get_lessons(&self, language: Option<Language>) -> Result<Vec<Lesson>> {
        match language {
            Some(lang) => self.get_records_by_index("language", lang.as_str()),
            None => self.get_all_records(),
        }
    }

    pub fn get_lessons_by_category(&self, category: &str) -> Result<Vec<Lesson>> {
        self.get_records_by_index("category", category)
    }

    pub fn save_quiz(&self, quiz: &Quiz) -> Result<()> {
        self.put_record(quiz).map(|_| ())
    }

    pub fn get_quizzes_for_lesson(&self, lesson_id: &str) -> Result<Vec<Quiz>> {
        self.get_records_by_index("lessonId", lesson_id)
    }
}

#[cfg(test)]
#[path = "lesson_tests.rs"]
mod tests;
