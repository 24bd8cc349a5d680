//! Exclusive-access gate for hub writes
//!
//! The hub offers no optimistic concurrency on this operator's write
//! path, so every mutating operation on one adapter instance funnels
//! through a single permit. The gate is a field of the adapter instance,
//! never process-global: two adapters in one process (two operators)
//! do not serialize against each other.

use std::time::Duration;

use tokio::sync::Semaphore;
use tracing::debug;

/// One non-reentrant permit guarding all hub-mutating operations of an
/// adapter instance.
///
/// Not reentrant: acquiring again from inside `body` deadlocks. Callers
/// must not nest [`SyncGate::with_exclusive`].
pub struct SyncGate {
    permit: Semaphore,
}

impl SyncGate {
    pub fn new() -> Self {
        Self {
            permit: Semaphore::new(1),
        }
    }

    /// Run `body` holding the gate's permit.
    ///
    /// Waits up to `max_wait` for the permit. On acquisition the permit
    /// is held as an RAII guard across `body`, so it is released on every
    /// exit path including panics. Returns `None` without constructing
    /// `body` if the permit did not become free in time; callers map that
    /// to a lock-timeout result.
    pub async fn with_exclusive<T, F, Fut>(&self, max_wait: Duration, body: F) -> Option<T>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = T>,
    {
        let _permit = match tokio::time::timeout(max_wait, self.permit.acquire()).await {
            Ok(Ok(permit)) => permit,
            Ok(Err(_)) | Err(_) => {
                debug!("gate not acquired within {:?}", max_wait);
                return None;
            }
        };

        Some(body().await)
    }
}

impl Default for SyncGate {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn runs_body_and_returns_value() {
        let gate = SyncGate::new();
        let result = gate
            .with_exclusive(Duration::from_secs(1), || async { 7 })
            .await;
        assert_eq!(result, Some(7));
    }

    #[tokio::test(start_paused = true)]
    async fn second_caller_times_out_while_held() {
        let gate = Arc::new(SyncGate::new());

        let holder = {
            let gate = gate.clone();
            tokio::spawn(async move {
                gate.with_exclusive(Duration::from_secs(1), || async {
                    tokio::time::sleep(Duration::from_millis(200)).await;
                })
                .await
            })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;

        let started = tokio::time::Instant::now();
        let denied = gate
            .with_exclusive(Duration::from_millis(100), || async { () })
            .await;
        assert_eq!(denied, None);
        assert_eq!(started.elapsed(), Duration::from_millis(100));

        assert!(holder.await.unwrap().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn permit_frees_after_body_finishes() {
        let gate = Arc::new(SyncGate::new());

        let holder = {
            let gate = gate.clone();
            tokio::spawn(async move {
                gate.with_exclusive(Duration::from_secs(1), || async {
                    tokio::time::sleep(Duration::from_millis(50)).await;
                })
                .await
            })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;

        // Waits out the holder, then gets the permit within its budget.
        let acquired = gate
            .with_exclusive(Duration::from_millis(100), || async { true })
            .await;
        assert_eq!(acquired, Some(true));
        holder.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn releases_permit_when_body_panics() {
        let gate = Arc::new(SyncGate::new());

        let panicking = {
            let gate = gate.clone();
            tokio::spawn(async move {
                gate.with_exclusive(Duration::from_secs(1), || async {
                    panic!("body blew up");
                })
                .await
            })
        };
        assert!(panicking.await.is_err());

        let after = gate
            .with_exclusive(Duration::from_millis(10), || async { () })
            .await;
        assert!(after.is_some());
    }

    #[tokio::test]
    async fn bodies_never_overlap() {
        let gate = Arc::new(SyncGate::new());
        let active = Arc::new(AtomicUsize::new(0));
        let mut tasks = Vec::new();

        for _ in 0..8 {
            let gate = gate.clone();
            let active = active.clone();
            tasks.push(tokio::spawn(async move {
                gate.with_exclusive(Duration::from_secs(5), || async {
                    let now = active.fetch_add(1, Ordering::SeqCst);
                    assert_eq!(now, 0, "two gate bodies ran concurrently");
                    tokio::task::yield_now().await;
                    active.fetch_sub(1, Ordering::SeqCst);
                })
                .await
            }));
        }

        for task in tasks {
            assert!(task.await.unwrap().is_some());
        }
    }
}
