// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use serde_json::json;
use std::path::Path;
use tracing::debug;

use satchel_core::store::keys;
use satchel_core::SyncService;

use super::Context;
use crate::cli::OutputFormat;
use crate::config::config_path;
use crate::error::{Error, Result};
use crate::remote::WebSocketRemote;

pub fn status(data_dir: &Path, output: OutputFormat) -> Result<()> {
    let ctx = Context::open(data_dir)?;
    let queue = ctx.store.sync_queue()?;
    let last_sync = ctx.store.get_value(keys::LAST_SYNC)?;

    if output == OutputFormat::Json {
        let value = json!({
            "remoteUrl": ctx.config.remote_url(),
            "pendingChanges": queue.len(),
            "lastSyncTime": last_sync,
            "queue": queue,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!("Remote: {}", ctx.config.remote_url().unwrap_or("none (local only)"));
    println!("Pending changes: {}", queue.len());
    println!("Last sync: {}", last_sync.as_deref().unwrap_or("never"));
    for entry in &queue {
        println!(
            "  #{} {} {}",
            entry.seq,
            entry.kind,
            entry.enqueued_at.format("%Y-%m-%d %H:%M:%S")
        );
    }
    Ok(())
}

/// Drains the queue to the configured remote, blocking until done.
pub fn run(data_dir: &Path) -> Result<()> {
    let ctx = Context::open(data_dir)?;
    let url = ctx
        .config
        .remote_url()
        .ok_or_else(|| Error::NoRemote(config_path(data_dir).display().to_string()))?
        .to_string();

    let remote = WebSocketRemote::new(url.as_str(), ctx.config.client_id.as_str(), ctx.config.ack_timeout());
    let service = SyncService::new(ctx.store.clone(), remote, ctx.config.sync_config());
    service.subscribe(|status| debug!("sync state: {:?}, {} pending", status.state(), status.pending_changes));

    let rt = tokio::runtime::Runtime::new()?;
    let report = rt.block_on(service.start(true))?;

    match report {
        Some(report) if report.submitted == 0 => println!("Nothing to sync"),
        Some(report) => {
            println!("Synced {} changes to {}", report.submitted, url);
            if report.remaining > 0 {
                println!("{} changes queued during sync remain", report.remaining);
            }
        }
        None => println!("Offline, nothing sent"),
    }
    Ok(())
}
