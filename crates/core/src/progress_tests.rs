// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use yare::parameterized;

#[parameterized(
    not_started = { "not_started", CompletionStatus::NotStarted },
    dashed = { "in-progress", CompletionStatus::InProgress },
    completed = { "Completed", CompletionStatus::Completed },
)]
fn status_parses(input: &str, expected: CompletionStatus) {
    assert_eq!(input.parse::<CompletionStatus>().unwrap(), expected);
}

#[test]
fn start_opens_attempts_without_reopening_completed() {
    let mut p = Progress::new("u1", "l1");
    p.start();
    assert_eq!(p.completion_status, CompletionStatus::InProgress);
    assert_eq!(p.attempts, 1);

    p.complete(Some(80));
    p.start();
    assert_eq!(p.completion_status, CompletionStatus::Completed);
    assert_eq!(p.attempts, 2);
}

#[test]
fn complete_keeps_best_score() {
    let mut p = Progress::new("u1", "l1");
    p.complete(Some(60));
    p.complete(Some(40));
    assert_eq!(p.score, Some(60));
    p.complete(None);
    assert_eq!(p.score, Some(60));
    p.complete(Some(95));
    assert_eq!(p.score, Some(95));
}

#[test]
fn sessions_accumulate_time() {
    let mut p = Progress::new("u1", "l1");
    p.record_session(120);
    p.record_session(45);
    assert_eq!(p.time_spent, 165);
}

#[test]
fn save_progress_queues_a_sync_entry() {
    let store = LocalStore::open_in_memory().unwrap();
    let mut p = Progress::new("u1", "l1");
    p.start();
    let seq = store.save_progress(&p).unwrap();

    let queue = store.sync_queue().unwrap();
    assert_eq!(queue.len(), 1);
    assert_eq!(queue[0].seq, seq);
    assert_eq!(queue[0].kind, SyncKind::Progress);
    assert_eq!(queue[0].payload["lessonId"], "l1");
}

#[test]
fn saving_twice_keeps_one_row_and_two_entries() {
    let store = LocalStore::open_in_memory().unwrap();
    let mut p = Progress::new("u1", "l1");
    store.save_progress(&p).unwrap();
    p.record_session(300);
    store.save_progress(&p).unwrap();

    let rows = store.get_progress("u1").unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].time_spent, 300);
    assert_eq!(store.pending_count().unwrap(), 2);
}

#[test]
fn lesson_progress_lookup() {
    let store = LocalStore::open_in_memory().unwrap();
    store.save_progress(&Progress::new("u1", "l1")).unwrap();
    store.save_progress(&Progress::new("u2", "l1")).unwrap();

    assert!(store.get_lesson_progress("u1", "l1").unwrap().is_some());
    assert!(store.get_lesson_progress("u1", "l2").unwrap().is_none());
    assert_eq!(store.get_progress("u2").unwrap().len(), 1);
}

#[test]
fn counters_saturate_instead_of_overflowing() {
    let mut p = Progress::new("u1", "l1");
    p.record_session(u64::MAX);
    p.record_session(u64::MAX);
    assert_eq!(p.time_spent, u64::MAX);

    p.attempts = u32::MAX;
    p.start();
    assert_eq!(p.attempts, u32::MAX);
}
