//! Typed results for hub synchronization operations
//!
//! Every push path resolves to these values; rejected filters, lock
//! timeouts, and disabled features are outcomes rather than errors. The
//! same algebra covers single pushes and bulk operations: a bulk result
//! is the ordered item list plus a derived aggregate outcome.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Terminal outcome of one push (or of a whole batch)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PushOutcome {
    /// Written to the hub
    Success,
    /// Accepted for later delivery (Enqueue mode)
    Enqueued,
    /// Nothing was eligible to do
    NoOperation,
    /// Rejected by local policy
    Filtered,
    /// Conversion failed or the hub rejected the write
    Error,
    /// The exclusive gate could not be acquired in time
    LockTimeout,
    /// The feature is administratively disabled
    AdminDown,
}

/// Result of pushing one entity
#[derive(Debug, Clone, Serialize)]
pub struct SingleItemResult {
    pub outcome: PushOutcome,
    pub warnings: Vec<String>,
    pub error: Option<String>,
    pub elapsed: Duration,
}

impl SingleItemResult {
    fn bare(outcome: PushOutcome, elapsed: Duration) -> Self {
        Self {
            outcome,
            warnings: Vec::new(),
            error: None,
            elapsed,
        }
    }

    pub fn success(elapsed: Duration) -> Self {
        Self::bare(PushOutcome::Success, elapsed)
    }

    pub fn enqueued(elapsed: Duration) -> Self {
        Self::bare(PushOutcome::Enqueued, elapsed)
    }

    pub fn no_operation(warning: impl Into<String>, elapsed: Duration) -> Self {
        Self::bare(PushOutcome::NoOperation, elapsed).with_warning(warning)
    }

    pub fn filtered(warning: impl Into<String>, elapsed: Duration) -> Self {
        Self::bare(PushOutcome::Filtered, elapsed).with_warning(warning)
    }

    pub fn error(message: impl Into<String>, elapsed: Duration) -> Self {
        Self {
            error: Some(message.into()),
            ..Self::bare(PushOutcome::Error, elapsed)
        }
    }

    pub fn lock_timeout(elapsed: Duration) -> Self {
        Self::bare(PushOutcome::LockTimeout, elapsed)
    }

    pub fn admin_down() -> Self {
        Self::bare(PushOutcome::AdminDown, Duration::ZERO)
    }

    pub fn with_warning(mut self, warning: impl Into<String>) -> Self {
        self.warnings.push(warning.into());
        self
    }

    pub fn with_warnings(mut self, warnings: Vec<String>) -> Self {
        self.warnings.extend(warnings);
        self
    }
}

/// Result of a bulk operation: ordered items plus derived aggregate
#[derive(Debug, Clone, Serialize)]
pub struct BulkResult {
    pub outcome: PushOutcome,
    /// One entry per input entity, input order preserved
    pub items: Vec<SingleItemResult>,
    /// All item warnings, concatenated in item order
    pub warnings: Vec<String>,
    pub elapsed: Duration,
}

impl BulkResult {
    /// Fold per-item results into one bulk result
    pub fn aggregate(items: Vec<SingleItemResult>, elapsed: Duration) -> Self {
        let outcome = aggregate_outcome(&items);
        let warnings = items
            .iter()
            .flat_map(|item| item.warnings.iter().cloned())
            .collect();
        Self {
            outcome,
            items,
            warnings,
            elapsed,
        }
    }

    /// Whole-batch result when the gate could not be acquired
    pub fn lock_timeout(len: usize, elapsed: Duration) -> Self {
        Self {
            outcome: PushOutcome::LockTimeout,
            items: (0..len)
                .map(|_| SingleItemResult::lock_timeout(elapsed))
                .collect(),
            warnings: Vec::new(),
            elapsed,
        }
    }

    /// Whole-batch result when the feature is disabled
    pub fn admin_down(len: usize) -> Self {
        Self {
            outcome: PushOutcome::AdminDown,
            items: (0..len).map(|_| SingleItemResult::admin_down()).collect(),
            warnings: Vec::new(),
            elapsed: Duration::ZERO,
        }
    }
}

/// Derive a batch outcome from its items.
///
/// Any `Error` dominates. A batch where nothing was written (everything
/// filtered or ineligible, or the batch was empty) is `NoOperation`.
/// Anything else counts as `Success`, including batches mixing writes
/// with filtered items.
fn aggregate_outcome(items: &[SingleItemResult]) -> PushOutcome {
    if items.iter().any(|i| i.outcome == PushOutcome::Error) {
        return PushOutcome::Error;
    }
    let all_inert = items
        .iter()
        .all(|i| matches!(i.outcome, PushOutcome::Filtered | PushOutcome::NoOperation));
    if all_inert {
        PushOutcome::NoOperation
    } else {
        PushOutcome::Success
    }
}
