//! Stdin/stdout JSON host for a [`Metasearch`] instance.
//!
//! Reads newline-delimited JSON [`Request`]s, answers each with exactly one
//! [`Response`] line, and stops at EOF or after a `shutdown` command.
//!
//! Stdout is exclusively reserved for the JSON protocol; all diagnostic
//! output (tracing, logs) must be routed to stderr.

use sift_search::{Metasearch, RequestOptions};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, BufWriter};

use crate::error::{Result, SiftError};
use crate::host::contract::{Command, PARSE_ERROR_ID, Request, Response};

/// Serve the process's stdin/stdout until EOF or `shutdown`.
///
/// # Errors
///
/// Returns [`SiftError::Protocol`] if stdin or stdout fails.
pub async fn run_stdio_host(sift: &Metasearch) -> Result<()> {
    let reader = BufReader::new(tokio::io::stdin());
    let writer = BufWriter::new(tokio::io::stdout());
    serve(sift, reader, writer).await
}

/// Serve requests from `reader`, writing responses to `writer`.
///
/// # Errors
///
/// Returns [`SiftError::Protocol`] if reading or writing fails.
pub async fn serve<R, W>(sift: &Metasearch, mut reader: R, mut writer: W) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut line = String::new();

    loop {
        line.clear();
        let bytes_read = reader
            .read_line(&mut line)
            .await
            .map_err(|e| SiftError::Protocol(format!("failed to read request: {e}")))?;

        if bytes_read == 0 {
            tracing::info!("stdin closed (EOF); shutting down");
            break;
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let (response, stop) = handle_line(sift, trimmed).await;
        let json = serde_json::to_string(&response)
            .map_err(|e| SiftError::Protocol(format!("failed to serialize response: {e}")))?;
        write_line(&mut writer, &json).await?;

        if stop {
            tracing::info!("shutdown received; stopping host");
            break;
        }
    }

    Ok(())
}

/// Answer one request line. The flag is `true` when the host should stop.
pub async fn handle_line(sift: &Metasearch, line: &str) -> (Response, bool) {
    let request: Request = match serde_json::from_str(line) {
        Ok(request) => request,
        Err(e) => {
            tracing::warn!(error = %e, "failed to parse request");
            return (
                Response::error(PARSE_ERROR_ID, format!("failed to parse request: {e}")),
                false,
            );
        }
    };

    let id = request.id;
    match request.command {
        Command::Search { query, debug } => {
            let output = sift.search(&query, RequestOptions { debug }).await;
            (to_payload(id, &output), false)
        }
        Command::Autocomplete { query } => {
            let completions = sift.autocomplete(&query).await;
            (to_payload(id, &completions), false)
        }
        Command::Plugin { name, options } => match sift.invoke_plugin(&name, options).await {
            Ok(value) => (Response::ok(id, value), false),
            Err(e) => {
                tracing::debug!(plugin = %name, error = %e, "plugin invocation failed");
                (Response::error(id, e.to_string()), false)
            }
        },
        Command::Shutdown => (Response::ok(id, serde_json::Value::Null), true),
    }
}

fn to_payload<T: serde::Serialize>(id: String, value: &T) -> Response {
    match serde_json::to_value(value) {
        Ok(payload) => Response::ok(id, payload),
        Err(e) => Response::error(id, format!("failed to serialize payload: {e}")),
    }
}

/// Write a single JSON line and flush.
async fn write_line<W: AsyncWrite + Unpin>(writer: &mut W, json: &str) -> Result<()> {
    writer
        .write_all(json.as_bytes())
        .await
        .map_err(|e| SiftError::Protocol(format!("failed to write response: {e}")))?;
    writer
        .write_all(b"\n")
        .await
        .map_err(|e| SiftError::Protocol(format!("failed to write newline: {e}")))?;
    writer
        .flush()
        .await
        .map_err(|e| SiftError::Protocol(format!("failed to flush output: {e}")))?;
    Ok(())
}
