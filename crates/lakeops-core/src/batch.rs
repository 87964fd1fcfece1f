//! Batch orchestration
//!
//! Two failure policies for applying one logical operation to many IDs:
//!
//! - All-or-nothing (`prepare_all`, `try_all`): every item is prepared first
//!   and the first failure aborts the call before anything is committed. The
//!   prepared items are then committed together, so the backend's atomicity
//!   covers the rest.
//! - Best-effort (`best_effort`): items are processed independently, failures
//!   are logged and collected per item, and the caller dispatches whatever
//!   succeeded in one combined call.

use std::future::Future;

use futures::future::{join_all, try_join_all};

use crate::error::{OpsError, Result};
use crate::obs;

/// One item a best-effort batch could not process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemFailure {
    pub id: String,
    pub reason: String,
}

impl std::fmt::Display for ItemFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Document ID {}: {}", self.id, self.reason)
    }
}

/// Outcome of a best-effort batch, both lists in input order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchReport<T> {
    pub processed: Vec<T>,
    pub failures: Vec<ItemFailure>,
}

impl<T> BatchReport<T> {
    pub fn succeeded(&self) -> usize {
        self.processed.len()
    }

    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    pub fn is_partial(&self) -> bool {
        !self.processed.is_empty() && !self.failures.is_empty()
    }

    /// Per-item failure messages.
    pub fn reasons(&self) -> Vec<String> {
        self.failures.iter().map(ToString::to_string).collect()
    }

    /// Fail with every item's reason when nothing was processed.
    pub fn require_any(self, summary: &str) -> Result<Self> {
        if self.processed.is_empty() {
            return Err(OpsError::BatchFailed {
                summary: summary.to_string(),
                reasons: self.reasons(),
            });
        }
        Ok(self)
    }

    /// Warning annotation for a partially failed batch.
    pub fn warning(&self, verb: &str) -> Option<String> {
        if self.failures.is_empty() {
            return None;
        }
        Some(format!(
            "Warning: {} document(s) could not be {}",
            self.failures.len(),
            verb
        ))
    }

    /// `message`, with the warning appended when some items failed.
    pub fn annotate(&self, message: String, verb: &str) -> String {
        match self.warning(verb) {
            Some(warning) => format!("{}. {}", message, warning),
            None => message,
        }
    }
}

/// Process every ID independently; failures never abort the batch.
///
/// Items run concurrently but results keep input order, so messages are
/// deterministic.
pub async fn best_effort<T, F, Fut>(operation: &str, ids: &[String], process: F) -> BatchReport<T>
where
    F: Fn(String) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let outcomes = join_all(ids.iter().map(|id| {
        let pending = process(id.clone());
        async move { (id.clone(), pending.await) }
    }))
    .await;

    let mut report = BatchReport {
        processed: Vec::with_capacity(outcomes.len()),
        failures: Vec::new(),
    };
    for (id, outcome) in outcomes {
        match outcome {
            Ok(item) => report.processed.push(item),
            Err(err) => {
                obs::emit_batch_item_failed(operation, &id, &err);
                report.failures.push(ItemFailure {
                    id,
                    reason: err.to_string(),
                });
            }
        }
    }

    if report.is_partial() {
        obs::emit_batch_partial(operation, report.succeeded(), &report.reasons());
    }
    report
}

/// Prepare every item; the first failure aborts.
pub fn prepare_all<I, T, F>(items: I, prepare: F) -> Result<Vec<T>>
where
    I: IntoIterator,
    F: FnMut(I::Item) -> Result<T>,
{
    items.into_iter().map(prepare).collect()
}

/// Async preparation of every ID; the first failure aborts.
pub async fn try_all<T, F, Fut>(ids: &[String], prepare: F) -> Result<Vec<T>>
where
    F: Fn(String) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    try_join_all(ids.iter().cloned().map(prepare)).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;

    fn ids(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    async fn fail_on_b(id: String) -> Result<String> {
        if id == "b" {
            Err(OpsError::ReleaseNotFound(id))
        } else {
            Ok(id.to_uppercase())
        }
    }

    #[tokio::test]
    async fn best_effort_keeps_successes_in_order() {
        let report = best_effort("test", &ids(&["a", "b", "c"]), fail_on_b).await;

        assert_eq!(report.processed, vec!["A", "C"]);
        assert_eq!(report.failed(), 1);
        assert_eq!(
            report.reasons(),
            vec!["Document ID b: Release with ID b not found"]
        );
        assert_eq!(
            report.annotate("2 done".to_string(), "added"),
            "2 done. Warning: 1 document(s) could not be added"
        );
    }

    #[tokio::test]
    async fn total_failure_joins_every_reason() {
        let report: BatchReport<()> = best_effort("test", &ids(&["x", "y"]), |id| async move {
            Err(OpsError::ReleaseNotFound(id))
        })
        .await;

        let err = report.require_any("Nothing worked").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Nothing worked: Document ID x: Release with ID x not found; \
             Document ID y: Release with ID y not found"
        );
    }

    #[test]
    fn prepare_all_stops_at_first_failure() {
        let mut seen = Vec::new();
        let result: Result<Vec<&str>> = prepare_all(["ok", "bad", "never"], |item| {
            seen.push(item);
            if item == "bad" {
                Err(ValidationError::MissingType.into())
            } else {
                Ok(item)
            }
        });

        assert!(result.is_err());
        assert_eq!(seen, vec!["ok", "bad"]);
    }

    #[tokio::test]
    async fn try_all_fails_when_any_item_fails() {
        let result = try_all(&ids(&["a", "b"]), fail_on_b).await;
        assert!(matches!(result, Err(OpsError::ReleaseNotFound(_))));

        let result = try_all(&ids(&["a", "c"]), fail_on_b).await.unwrap();
        assert_eq!(result, vec!["A", "C"]);
    }
}
