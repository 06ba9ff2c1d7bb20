//! JSON-lines driver
//!
//! Backend events and user commands are read one JSON object per line; view
//! events, reveal progress, forwarded user messages and saved-response lists
//! are written one JSON object per line. Input lines are applied strictly in
//! order. End of input shuts the runtime down and flushes every pending line.

use crate::runtime::{
    ChannelBackend, ControllerError, KeyValueStore, ViewEvent, ViewHandle, ViewRuntime,
};
use crate::saved::SavedResponse;
use crate::stream::{Direction, ViewContext};
use crate::typewriter::RevealSettings;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::{broadcast, mpsc, watch};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;

const OUTBOUND_BUFFER: usize = 32;

/// One input line
#[derive(Debug, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum Input {
    Status { text: String },
    Response { text: String },
    Navigate { direction: Direction },
    Send { message: String },
    Save,
    Delete { index: usize },
    List,
}

/// Driver output that is not a view event
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum Output {
    RevealProgress { revealed_length: usize },
    Sent { message: String },
    Saved { responses: Vec<SavedResponse> },
}

#[derive(Debug, Error)]
pub enum DriverError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Driver task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Run a view session over `input`/`output` until `input` ends.
/// Returns the writer once everything has been flushed to it.
pub async fn serve<R, W, K>(
    input: R,
    output: W,
    context: ViewContext,
    kv: K,
    reveal: RevealSettings,
) -> Result<W, DriverError>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
    K: KeyValueStore + 'static,
{
    let (backend, outbound_rx) = ChannelBackend::new(OUTBOUND_BUFFER);
    let backend = Arc::new(backend);
    let (handle, runtime_task) = ViewRuntime::spawn(context, Arc::clone(&backend), kv, reveal);

    // Single writer so lines from different sources never interleave
    let (line_tx, line_rx) = mpsc::unbounded_channel();
    let writer = tokio::spawn(write_lines(output, line_rx));
    let forwarders = [
        tokio::spawn(forward_view_events(handle.subscribe(), line_tx.clone())),
        tokio::spawn(forward_reveal_progress(handle.watch_reveal(), line_tx.clone())),
        tokio::spawn(forward_sent(outbound_rx, line_tx.clone())),
    ];

    let read = read_input(input, &backend, &handle, &line_tx).await;

    tracing::info!("Input closed, shutting down");
    handle.shutdown().await;
    runtime_task.await?;

    // The runtime has exited; dropping our ends closes every forwarder source
    drop(handle);
    drop(backend);
    for forwarder in forwarders {
        forwarder.await?;
    }
    drop(line_tx);
    let output = writer.await??;

    read?;
    Ok(output)
}

async fn read_input<R: AsyncRead + Unpin>(
    input: R,
    backend: &ChannelBackend,
    handle: &ViewHandle,
    out: &mpsc::UnboundedSender<String>,
) -> std::io::Result<()> {
    let mut lines = BufReader::new(input).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let input: Input = match serde_json::from_str(line) {
            Ok(input) => input,
            Err(e) => {
                tracing::warn!(error = %e, "Skipping malformed input line");
                continue;
            }
        };
        if let Err(e) = dispatch(input, backend, handle, out).await {
            tracing::warn!(error = %e, "Command failed");
        }
    }
    Ok(())
}

async fn dispatch(
    input: Input,
    backend: &ChannelBackend,
    handle: &ViewHandle,
    out: &mpsc::UnboundedSender<String>,
) -> Result<(), ControllerError> {
    match input {
        Input::Status { text } => backend.status(text).await,
        Input::Response { text } => backend.response(text).await,
        Input::Navigate { direction } => handle.navigate(direction).await?,
        Input::Send { message } => handle.send_text(&message).await?,
        Input::Save => {
            if handle.save().await?.is_none() {
                tracing::info!("Nothing new to save");
            }
            emit_saved(handle, out).await?;
        }
        Input::Delete { index } => {
            handle.delete(index).await?;
            emit_saved(handle, out).await?;
        }
        Input::List => emit_saved(handle, out).await?,
    }
    Ok(())
}

async fn emit_saved(
    handle: &ViewHandle,
    out: &mpsc::UnboundedSender<String>,
) -> Result<(), ControllerError> {
    let responses = handle.saved().await?;
    emit(out, &Output::Saved { responses });
    Ok(())
}

async fn forward_view_events(
    events: broadcast::Receiver<ViewEvent>,
    out: mpsc::UnboundedSender<String>,
) {
    let mut events = BroadcastStream::new(events);
    while let Some(event) = events.next().await {
        match event {
            Ok(event) => emit(&out, &event),
            Err(e) => tracing::warn!(error = %e, "View event stream lagged"),
        }
    }
}

async fn forward_reveal_progress(
    mut progress: watch::Receiver<usize>,
    out: mpsc::UnboundedSender<String>,
) {
    while progress.changed().await.is_ok() {
        let revealed_length = *progress.borrow_and_update();
        emit(&out, &Output::RevealProgress { revealed_length });
    }
}

async fn forward_sent(mut sent: mpsc::Receiver<String>, out: mpsc::UnboundedSender<String>) {
    while let Some(message) = sent.recv().await {
        emit(&out, &Output::Sent { message });
    }
}

async fn write_lines<W: AsyncWrite + Unpin>(
    mut output: W,
    mut lines: mpsc::UnboundedReceiver<String>,
) -> std::io::Result<W> {
    while let Some(line) = lines.recv().await {
        output.write_all(line.as_bytes()).await?;
        output.write_all(b"\n").await?;
        output.flush().await?;
    }
    Ok(output)
}

fn emit<T: Serialize>(out: &mpsc::UnboundedSender<String>, value: &T) {
    match serde_json::to_string(value) {
        Ok(line) => {
            // The writer only goes away after every sender is dropped
            let _ = out.send(line);
        }
        Err(e) => tracing::warn!(error = %e, "Failed to encode output"),
    }
}
