//! LockGate Host Bridge
//!
//! The browser shell speaks one JSON object per line on stdin and gets
//! one reply per line on stdout. Requests run concurrently so a slow
//! login never holds up navigation decisions; replies carry the
//! request's `id` when one was given.
//!
//! - The shell reports events and forwards user input
//! - Rust owns all session state

mod commands;
mod protocol;
mod state;

use anyhow::Context;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinSet;

use protocol::{send_reply, Envelope, Response};
use state::AppState;

pub async fn run() -> anyhow::Result<()> {
    // Initialize logging
    lockgate_core::init_logging();

    let state = Arc::new(AppState::new().context("failed to initialize gatekeeper")?);

    let (tx, mut rx) = mpsc::unbounded_channel::<Response>();

    let writer = tokio::spawn(async move {
        let mut stdout = tokio::io::stdout();
        while let Some(response) = rx.recv().await {
            let mut line = match serde_json::to_vec(&response) {
                Ok(line) => line,
                Err(e) => {
                    tracing::error!("Failed to encode reply: {}", e);
                    continue;
                }
            };
            line.push(b'\n');
            stdout.write_all(&line).await?;
            stdout.flush().await?;
        }
        Ok::<_, std::io::Error>(())
    });

    tracing::info!("LockGate host started");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut in_flight = JoinSet::new();

    while let Some(line) = lines.next_line().await.context("failed to read request")? {
        // Replies can no longer be delivered; stop taking requests
        if tx.is_closed() {
            tracing::warn!("Reply writer closed, no longer reading requests");
            break;
        }
        if line.trim().is_empty() {
            continue;
        }

        let envelope = match Envelope::parse(&line) {
            Ok(envelope) => envelope,
            Err(response) => {
                if !send_reply(&tx, response) {
                    break;
                }
                continue;
            }
        };

        let state = Arc::clone(&state);
        let tx = tx.clone();
        in_flight.spawn(async move {
            let result = commands::dispatch(&state, envelope.request).await;
            send_reply(
                &tx,
                Response {
                    id: envelope.id,
                    result,
                },
            );
        });
    }

    while in_flight.join_next().await.is_some() {}
    drop(tx);

    writer
        .await
        .context("reply writer panicked")?
        .context("failed to write reply")?;

    tracing::info!("LockGate host stopped");

    Ok(())
}
