//! Single Flight Module
//!
//! Deduplicates concurrent calls for the same key: one caller runs the work,
//! everyone else arriving while it is in flight waits for and shares its
//! result. Finished calls are forgotten immediately, so this is not a cache.

use std::collections::HashMap;
use std::future::Future;

use parking_lot::Mutex;
use tokio::sync::watch;
use tracing::debug;

// == Flight Group ==
/// Tracks the calls currently in flight, keyed by string.
///
/// The map lock is only held to register, look up or remove a record,
/// never while the work runs.
#[derive(Debug)]
pub struct FlightGroup<T> {
    calls: Mutex<HashMap<String, watch::Receiver<Option<T>>>>,
}

enum Role<T> {
    Leader(watch::Sender<Option<T>>),
    Waiter(watch::Receiver<Option<T>>),
}

/// Removes the in-flight record when the leading call finishes or is dropped.
struct InflightGuard<'a, T> {
    group: &'a FlightGroup<T>,
    key: &'a str,
}

impl<T> Drop for InflightGuard<'_, T> {
    fn drop(&mut self) {
        self.group.calls.lock().remove(self.key);
    }
}

impl<T: Clone> FlightGroup<T> {
    // == Constructor ==
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(HashMap::new()),
        }
    }

    // == Do ==
    /// Runs `work` unless a call for `key` is already in flight, in which case
    /// the caller waits for that call and receives a clone of its result.
    ///
    /// If the leading caller is dropped before finishing, its waiters retry
    /// and one of them runs its own `work`.
    pub async fn run<F, Fut>(&self, key: &str, work: F) -> T
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let tx = loop {
            match self.claim(key) {
                Role::Leader(tx) => break tx,
                Role::Waiter(rx) => {
                    if let Some(value) = Self::wait(rx).await {
                        return value;
                    }
                    debug!(key, "in-flight call abandoned, retrying");
                }
            }
        };

        let guard = InflightGuard { group: self, key };
        let value = work().await;
        tx.send_replace(Some(value.clone()));
        drop(guard);
        value
    }

    /// Number of calls currently in flight.
    pub fn in_flight(&self) -> usize {
        self.calls.lock().len()
    }

    fn claim(&self, key: &str) -> Role<T> {
        let mut calls = self.calls.lock();
        if let Some(rx) = calls.get(key) {
            return Role::Waiter(rx.clone());
        }

        let (tx, rx) = watch::channel(None);
        calls.insert(key.to_string(), rx);
        Role::Leader(tx)
    }

    /// Waits for the leader's result; `None` if it was dropped without one.
    async fn wait(mut rx: watch::Receiver<Option<T>>) -> Option<T> {
        let Ok(value) = rx.wait_for(Option::is_some).await else {
            return None;
        };
        value.clone()
    }
}

impl<T: Clone> Default for FlightGroup<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test]
    async fn test_run_returns_work_result() {
        let group: FlightGroup<String> = FlightGroup::new();
        let value = group.run("key", || async { "bar".to_string() }).await;

        assert_eq!(value, "bar");
        assert_eq!(group.in_flight(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_calls_share_one_execution() {
        let group = Arc::new(FlightGroup::<Result<String, String>>::new());
        let calls = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..10)
            .map(|_| {
                let group = group.clone();
                let calls = calls.clone();
                tokio::spawn(async move {
                    group
                        .run("key", || async move {
                            calls.fetch_add(1, Ordering::SeqCst);
                            tokio::time::sleep(Duration::from_millis(200)).await;
                            Ok("value".to_string())
                        })
                        .await
                })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.await.unwrap(), Ok("value".to_string()));
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(group.in_flight(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_callers_share_error() {
        let group = Arc::new(FlightGroup::<Result<String, String>>::new());

        let handles: Vec<_> = (0..5)
            .map(|_| {
                let group = group.clone();
                tokio::spawn(async move {
                    group
                        .run("bad", || async {
                            tokio::time::sleep(Duration::from_millis(100)).await;
                            Err("not found".to_string())
                        })
                        .await
                })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.await.unwrap(), Err("not found".to_string()));
        }
    }

    #[tokio::test]
    async fn test_completed_call_is_not_reused() {
        let group: FlightGroup<usize> = FlightGroup::new();
        let calls = AtomicUsize::new(0);

        let first = group
            .run("key", || async { calls.fetch_add(1, Ordering::SeqCst) + 1 })
            .await;
        let second = group
            .run("key", || async { calls.fetch_add(1, Ordering::SeqCst) + 1 })
            .await;

        assert_eq!(first, 1);
        assert_eq!(second, 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_distinct_keys_run_independently() {
        let group = Arc::new(FlightGroup::<String>::new());
        let calls = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = ["a", "b", "c"]
            .into_iter()
            .map(|key| {
                let group = group.clone();
                let calls = calls.clone();
                tokio::spawn(async move {
                    group
                        .run(key, || async move {
                            calls.fetch_add(1, Ordering::SeqCst);
                            tokio::time::sleep(Duration::from_millis(50)).await;
                            key.to_uppercase()
                        })
                        .await
                })
            })
            .collect();

        let mut results = Vec::new();
        for handle in handles {
            results.push(handle.await.unwrap());
        }
        assert_eq!(results, vec!["A", "B", "C"]);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_waiter_takes_over_when_leader_dropped() {
        let group = Arc::new(FlightGroup::<String>::new());

        let leader = {
            let group = group.clone();
            tokio::spawn(async move {
                group
                    .run("key", || std::future::pending::<String>())
                    .await
            })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(group.in_flight(), 1);

        let waiter = {
            let group = group.clone();
            tokio::spawn(async move {
                group
                    .run("key", || async { "from waiter".to_string() })
                    .await
            })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;
        leader.abort();

        assert_eq!(waiter.await.unwrap(), "from waiter");
        assert_eq!(group.in_flight(), 0);
    }
}
