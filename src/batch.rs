//! Ordered batch execution with partial-failure semantics.
//!
//! The executor applies one remote write per input item, strictly in index
//! order. Sequencing is deliberate: later items may depend on state created
//! by earlier ones (a folder referenced by subsequent test cases, for
//! example), so nothing here reorders or overlaps the calls. One item's
//! failure is an `Err` outcome for that index, never a fault that escapes
//! the loop.

use std::future::Future;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::clients::RemoteError;

/// Outcome of one batch item, tagged with its input position.
///
/// `index` always matches the item's position in the input array.
#[derive(Debug, Clone, Serialize)]
pub struct BatchItemResult {
    pub index: usize,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BatchItemResult {
    fn ok(index: usize, data: Value) -> Self {
        Self {
            index,
            success: true,
            data: Some(data),
            error: None,
        }
    }

    fn err(index: usize, message: String) -> Self {
        Self {
            index,
            success: false,
            data: None,
            error: Some(message),
        }
    }
}

/// Counts derived from a result list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
}

/// Per-item results of a batch run.
///
/// The summary is always recomputed from the result list so the two can
/// never drift apart.
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub results: Vec<BatchItemResult>,
}

impl BatchReport {
    pub fn summary(&self) -> BatchSummary {
        let successful = self.results.iter().filter(|r| r.success).count();
        BatchSummary {
            total: self.results.len(),
            successful,
            failed: self.results.len() - successful,
        }
    }
}

/// Runs `write` over `items` in index order.
///
/// With `continue_on_error` every item is attempted and the report covers
/// the full input. Without it, execution stops at the first failure and the
/// report covers only the attempted prefix; the summary's `total` is then
/// the attempted count, not the input length.
pub async fn execute_batch<T, F, Fut>(
    items: Vec<T>,
    continue_on_error: bool,
    mut write: F,
) -> BatchReport
where
    F: FnMut(T) -> Fut,
    Fut: Future<Output = Result<Value, RemoteError>>,
{
    let mut results = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        match write(item).await {
            Ok(entity) => {
                debug!(index, "batch item succeeded");
                results.push(BatchItemResult::ok(index, entity));
            }
            Err(err) => {
                warn!(index, error = %err, "batch item failed");
                results.push(BatchItemResult::err(index, err.to_string()));
                if !continue_on_error {
                    break;
                }
            }
        }
    }
    BatchReport { results }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn write_fn(item: i32) -> impl Future<Output = Result<Value, RemoteError>> {
        async move {
            if item < 0 {
                Err(RemoteError::Api {
                    service: "zephyr",
                    status: Some(400),
                    message: format!("rejected item {item}"),
                })
            } else {
                Ok(json!({"id": item}))
            }
        }
    }

    #[tokio::test]
    async fn continue_on_error_covers_full_input() {
        let report = execute_batch(vec![1, -2, 3], true, write_fn).await;

        assert_eq!(report.results.len(), 3);
        assert!(report.results[0].success);
        assert!(!report.results[1].success);
        assert!(report.results[2].success);
        for (position, result) in report.results.iter().enumerate() {
            assert_eq!(result.index, position);
        }
        assert_eq!(
            report.summary(),
            BatchSummary {
                total: 3,
                successful: 2,
                failed: 1
            }
        );
    }

    #[tokio::test]
    async fn abort_on_first_failure_skips_the_rest() {
        let report = execute_batch(vec![1, -2, 3], false, write_fn).await;

        // Item 2 was never attempted; only the attempted prefix appears.
        assert_eq!(report.results.len(), 2);
        assert!(report.results[0].success);
        assert!(!report.results[1].success);
        assert_eq!(
            report.summary(),
            BatchSummary {
                total: 2,
                successful: 1,
                failed: 1
            }
        );
    }

    #[tokio::test]
    async fn failure_carries_upstream_message() {
        let report = execute_batch(vec![-7], true, write_fn).await;
        let error = report.results[0].error.as_deref().unwrap();
        assert!(error.contains("rejected item -7"), "got: {error}");
    }

    #[tokio::test]
    async fn empty_input_yields_empty_report() {
        let report = execute_batch(Vec::<i32>::new(), true, write_fn).await;
        assert!(report.results.is_empty());
        assert_eq!(report.summary().total, 0);
    }
}
