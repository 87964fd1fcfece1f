//! Structured observability hooks for orchestration calls.
//!
//! This module provides:
//! - Operation-scoped tracing spans via `traced`
//! - Emission functions for operation start/success/failure and batch outcomes
//!
//! Events are emitted at `info!` level, failures at `warn!`/`error!`.
//! For JSON output, initialise tracing with `init_tracing(true, ..)`.

use std::future::Future;

use tracing::{error, info, warn, Instrument, Span};

use crate::error::Result;

/// Span tagged with the operation and its target.
pub fn op_span(operation: &str, target: &str) -> Span {
    tracing::info_span!("lakeops.op", operation = %operation, target = %target)
}

/// Run `operation` inside its span, emitting start and outcome events.
pub async fn traced<T, Fut>(operation: &str, target: &str, fut: Fut) -> Result<T>
where
    Fut: Future<Output = Result<T>>,
{
    emit_op_started(operation, target);
    let outcome = fut.instrument(op_span(operation, target)).await;
    match &outcome {
        Ok(_) => emit_op_succeeded(operation, target),
        Err(err) => emit_op_failed(operation, target, err),
    }
    outcome
}

/// Log label for the targets of a call: the ID itself, or a count.
pub fn target_label(ids: &[String]) -> String {
    match ids {
        [single] => single.clone(),
        many => format!("{} documents", many.len()),
    }
}

/// Emit event: operation started against a target.
pub fn emit_op_started(operation: &str, target: &str) {
    info!(event = "op.started", operation = %operation, target = %target);
}

/// Emit event: operation finished.
pub fn emit_op_succeeded(operation: &str, target: &str) {
    info!(event = "op.succeeded", operation = %operation, target = %target);
}

/// Emit event: operation failed.
pub fn emit_op_failed(operation: &str, target: &str, error: &dyn std::fmt::Display) {
    error!(event = "op.failed", operation = %operation, target = %target, error = %error);
}

/// Emit event: one best-effort item failed and was skipped.
pub fn emit_batch_item_failed(operation: &str, id: &str, error: &dyn std::fmt::Display) {
    warn!(event = "batch.item_failed", operation = %operation, id = %id, error = %error);
}

/// Emit event: best-effort batch finished with some items skipped.
pub fn emit_batch_partial(operation: &str, succeeded: usize, reasons: &[String]) {
    warn!(
        event = "batch.partial",
        operation = %operation,
        succeeded = succeeded,
        failed = reasons.len(),
        reasons = ?reasons,
    );
}

/// Emit event: release publish refused because it holds too many versions.
pub fn emit_release_limit_exceeded(release_id: &str, count: usize, limit: usize) {
    warn!(
        event = "release.limit_exceeded",
        release_id = %release_id,
        count = count,
        limit = limit,
    );
}
