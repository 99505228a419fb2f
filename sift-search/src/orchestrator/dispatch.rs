//! Concurrent fan-out to every capable engine.
//!
//! Each connector call runs under its own timeout and panic guard, so a
//! slow, failing or crashing provider only loses its own contribution.
//! Replies come back in registry order regardless of completion order.

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::FutureExt;

use crate::engine::Engine;
use crate::error::SearchError;
use crate::registry::EngineRegistry;
use crate::types::{EngineResponse, RequestOptions};

/// The outcome of one connector call.
#[derive(Debug)]
pub struct EngineReply<T> {
    /// The engine that was called.
    pub engine: Arc<Engine>,
    /// What it returned, or why it produced nothing.
    pub outcome: Result<T, SearchError>,
    /// Call duration, measured only when timing was requested.
    pub elapsed_ms: Option<u64>,
}

/// Query every search-capable engine concurrently.
///
/// Never fails as a whole: each engine's failure or timeout is captured in
/// its own [`EngineReply::outcome`]. In debug mode every call is timed and
/// the duration is attached to the successful response as well.
pub async fn dispatch_search(
    registry: &EngineRegistry,
    query: &str,
    options: RequestOptions,
    timeout: Duration,
) -> Vec<EngineReply<EngineResponse>> {
    tracing::trace!(query, "dispatching search");

    let calls = registry
        .all()
        .iter()
        .filter(|engine| engine.capabilities().search)
        .map(|engine| async move {
            let started = options.debug.then(Instant::now);
            let outcome =
                call_isolated(engine, timeout, engine.connector().search(query, options)).await;
            let elapsed_ms = started.map(elapsed_millis);

            if let Some(ms) = elapsed_ms {
                tracing::debug!(engine = engine.name(), elapsed_ms = ms, "engine timing");
            }

            let outcome = outcome.map(|mut response| {
                response.engine = engine.name().to_string();
                response.elapsed_ms = elapsed_ms;
                response
            });

            EngineReply {
                engine: Arc::clone(engine),
                outcome,
                elapsed_ms,
            }
        });

    futures::future::join_all(calls).await
}

/// Query every autocomplete-capable engine concurrently.
///
/// A blank `partial_query` returns immediately without calling any engine.
pub async fn dispatch_autocomplete(
    registry: &EngineRegistry,
    partial_query: &str,
    timeout: Duration,
) -> Vec<EngineReply<Vec<String>>> {
    if partial_query.trim().is_empty() {
        return Vec::new();
    }
    tracing::trace!(partial_query, "dispatching autocomplete");

    let calls = registry
        .all()
        .iter()
        .filter(|engine| engine.capabilities().autocomplete)
        .map(|engine| async move {
            let outcome = call_isolated(
                engine,
                timeout,
                engine.connector().autocomplete(partial_query),
            )
            .await;
            EngineReply {
                engine: Arc::clone(engine),
                outcome,
                elapsed_ms: None,
            }
        });

    futures::future::join_all(calls).await
}

/// Await one connector call, converting timeouts and panics into errors.
async fn call_isolated<T, F>(engine: &Engine, timeout: Duration, call: F) -> Result<T, SearchError>
where
    F: Future<Output = Result<T, SearchError>>,
{
    let outcome = match tokio::time::timeout(timeout, AssertUnwindSafe(call).catch_unwind()).await
    {
        Ok(Ok(result)) => result,
        Ok(Err(panic)) => Err(SearchError::Engine {
            engine: engine.name().to_string(),
            message: format!("connector panicked: {}", panic_message(panic.as_ref())),
        }),
        Err(_) => Err(SearchError::Timeout(format!(
            "{} exceeded {}ms",
            engine.name(),
            timeout.as_millis()
        ))),
    };

    if let Err(ref err) = outcome {
        tracing::warn!(engine = engine.name(), error = %err, "engine query failed");
    }
    outcome
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

fn elapsed_millis(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}
