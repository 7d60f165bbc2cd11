// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

mod common;
use common::*;

use futures_util::{SinkExt, StreamExt};
use satchel_core::protocol::{ClientMessage, ServerMessage};
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;
use tokio_tungstenite::tungstenite::Message;

/// Acks every submit and records the submitted seqs.
async fn ack_server() -> (String, Arc<Mutex<Vec<i64>>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("ws://{}", listener.local_addr().unwrap());
    let seen = Arc::new(Mutex::new(Vec::new()));
    let log = seen.clone();
    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            let log = log.clone();
            tokio::spawn(async move {
                let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();
                while let Some(Ok(Message::Text(text))) = ws.next().await {
                    if let Ok(ClientMessage::Submit { entry, .. }) = ClientMessage::from_json(&text) {
                        log.lock().unwrap().push(entry.seq);
                        let ack = ServerMessage::ack(entry.seq).to_json().unwrap();
                        ws.send(Message::Text(ack.into())).await.unwrap();
                    }
                }
            });
        }
    });
    (url, seen)
}

fn init_with_remote(url: &str) -> TempDir {
    let temp = TempDir::new().unwrap();
    satchel(&temp).args(["init", "--remote", url]).assert().success();
    signup(&temp, "Asha", "asha@example.com", "secret");
    import_lessons(&temp);
    temp
}

#[test]
fn status_on_fresh_store() {
    let temp = init_temp();

    satchel(&temp)
        .args(["sync", "status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Pending changes: 0"))
        .stdout(predicate::str::contains("Last sync: never"));
}

#[test]
fn run_without_remote_fails_with_hint() {
    let temp = init_signed_in();

    satchel(&temp)
        .args(["sync", "run"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no remote configured"))
        .stderr(predicate::str::contains("config.toml"));
}

#[test]
fn unreachable_remote_keeps_the_queue() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let url = format!("ws://{}", listener.local_addr().unwrap());
    drop(listener);
    let temp = init_with_remote(&url);

    satchel(&temp)
        .args(["sync", "run"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("queue was left intact"));

    satchel(&temp)
        .args(["sync", "status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Pending changes: 1"))
        .stdout(predicate::str::contains("Last sync: never"));
}

#[tokio::test(flavor = "multi_thread")]
async fn run_drains_in_order() {
    let (url, seen) = ack_server().await;
    let temp = init_with_remote(&url);
    satchel(&temp)
        .args(["progress", "save", "l-math-1", "--time", "30"])
        .assert()
        .success();

    let dir = temp.path().to_path_buf();
    let output = tokio::task::spawn_blocking(move || {
        assert_cmd::cargo::cargo_bin_cmd!("satchel")
            .arg("--data-dir")
            .arg(&dir)
            .args(["sync", "run"])
            .output()
            .unwrap()
    })
    .await
    .unwrap();
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert!(String::from_utf8_lossy(&output.stdout).contains("Synced 3 changes"));

    let submitted = seen.lock().unwrap().clone();
    assert_eq!(submitted.len(), 3);
    assert!(submitted.windows(2).all(|w| w[0] < w[1]));

    satchel(&temp)
        .args(["sync", "status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Pending changes: 0"))
        .stdout(predicate::str::contains("Last sync: never").not());
}

#[tokio::test(flavor = "multi_thread")]
async fn run_with_empty_queue_still_records_sync() {
    let (url, _) = ack_server().await;
    let temp = TempDir::new().unwrap();
    satchel(&temp).args(["init", "--remote", &url]).assert().success();

    let dir = temp.path().to_path_buf();
    let output = tokio::task::spawn_blocking(move || {
        assert_cmd::cargo::cargo_bin_cmd!("satchel")
            .arg("--data-dir")
            .arg(&dir)
            .args(["sync", "run"])
            .output()
            .unwrap()
    })
    .await
    .unwrap();
    assert!(String::from_utf8_lossy(&output.stdout).contains("Nothing to sync"));

    satchel(&temp)
        .args(["sync", "status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Last sync: never").not());
}
