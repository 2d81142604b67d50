//! Single-flight coordination for cache populations
//!
//! Concurrent misses on the same key share one extraction and one write.
//! The first caller spawns the population as a tokio task; later callers
//! await the same shared handle. The task clears its own slot when it
//! finishes, even if every caller has gone away, so a failed population is
//! retried by the next request rather than remembered.

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;

use crate::error::{AppError, Result};

use super::key::CacheKey;

type Population = Shared<BoxFuture<'static, Result<String>>>;

type Slots = Arc<Mutex<HashMap<CacheKey, Slot>>>;

/// Whether a caller started the population or joined one already running
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Role {
    Leader,
    Follower,
}

struct Slot {
    id: u64,
    population: Population,
}

/// Removes a population's slot when the task running it ends
struct SlotGuard {
    slots: Slots,
    key: CacheKey,
    id: u64,
}

impl Drop for SlotGuard {
    fn drop(&mut self) {
        let mut slots = self.slots.lock();
        if slots.get(&self.key).is_some_and(|slot| slot.id == self.id) {
            slots.remove(&self.key);
        }
    }
}

#[derive(Default)]
pub(crate) struct InFlight {
    slots: Slots,
    next_id: AtomicU64,
}

impl InFlight {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Number of populations currently running
    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.slots.lock().len()
    }

    #[cfg(test)]
    pub(crate) fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Run `populate` for `key`, or join the run already in progress
    ///
    /// `populate` is only called by the leader. The population keeps running
    /// if the caller is dropped.
    pub(crate) async fn run<F, Fut>(&self, key: &CacheKey, populate: F) -> (Result<String>, Role)
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<String>> + Send + 'static,
    {
        let (population, role) = {
            let mut slots = self.slots.lock();
            match slots.get(key) {
                Some(existing) => (existing.population.clone(), Role::Follower),
                None => {
                    let id = self.next_id.fetch_add(1, Ordering::Relaxed);
                    let guard = SlotGuard {
                        slots: self.slots.clone(),
                        key: key.clone(),
                        id,
                    };
                    let work = populate();
                    // The slot is inserted below while the lock is still held,
                    // so the guard cannot run before it exists
                    let handle = tokio::spawn(async move {
                        let _guard = guard;
                        work.await
                    });
                    let population = async move {
                        handle.await.unwrap_or_else(|e| {
                            Err(AppError::Internal(format!("cache population task failed: {}", e)))
                        })
                    }
                    .boxed()
                    .shared();
                    slots.insert(
                        key.clone(),
                        Slot {
                            id,
                            population: population.clone(),
                        },
                    );
                    (population, Role::Leader)
                }
            }
        };

        (population.await, role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;
    use tokio::sync::{oneshot, Notify};

    /// Wait until every spawned population has cleared its slot
    async fn drained(flight: &InFlight) {
        tokio::time::timeout(Duration::from_secs(5), async {
            while !flight.is_empty() {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("populations did not finish");
    }

    #[tokio::test]
    async fn test_single_caller_leads() {
        let flight = InFlight::new();
        let key = CacheKey::from_bytes(b"doc");

        let (outcome, role) = flight.run(&key, || async { Ok("text".to_string()) }).await;

        assert_eq!(outcome.unwrap(), "text");
        assert_eq!(role, Role::Leader);
        assert!(flight.is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_callers_share_one_population() {
        let flight = InFlight::new();
        let key = CacheKey::from_bytes(b"doc");
        let calls = Arc::new(AtomicUsize::new(0));
        let release = Arc::new(Notify::new());

        let leader = {
            let calls = calls.clone();
            let release = release.clone();
            flight.run(&key, move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                release.notified().await;
                Ok("shared".to_string())
            })
        };
        let follower = {
            let calls = calls.clone();
            flight.run(&key, move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok("should not run".to_string())
            })
        };
        // notify_one stores a permit, so the release is not lost if the
        // population has not reached `notified()` yet
        let releaser = async {
            release.notify_one();
        };

        let ((leader_outcome, leader_role), (follower_outcome, follower_role), ()) =
            futures::join!(leader, follower, releaser);

        assert_eq!(leader_outcome.unwrap(), "shared");
        assert_eq!(follower_outcome.unwrap(), "shared");
        assert_eq!(leader_role, Role::Leader);
        assert_eq!(follower_role, Role::Follower);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(flight.is_empty());
    }

    #[tokio::test]
    async fn test_failure_is_not_remembered() {
        let flight = InFlight::new();
        let key = CacheKey::from_bytes(b"doc");

        let (first, _) = flight
            .run(&key, || async { Err(AppError::Internal("boom".into())) })
            .await;
        assert!(first.is_err());
        assert!(flight.is_empty());

        let (second, role) = flight.run(&key, || async { Ok("ok".to_string()) }).await;
        assert_eq!(second.unwrap(), "ok");
        assert_eq!(role, Role::Leader);
    }

    #[tokio::test]
    async fn test_distinct_keys_do_not_share() {
        let flight = InFlight::new();
        let a = CacheKey::from_bytes(b"a");
        let b = CacheKey::from_bytes(b"b");

        let (ra, role_a) = flight.run(&a, || async { Ok("a".to_string()) }).await;
        let (rb, role_b) = flight.run(&b, || async { Ok("b".to_string()) }).await;

        assert_eq!(ra.unwrap(), "a");
        assert_eq!(rb.unwrap(), "b");
        assert_eq!(role_a, Role::Leader);
        assert_eq!(role_b, Role::Leader);
    }

    #[tokio::test]
    async fn test_abandoned_population_clears_its_slot() {
        let flight = InFlight::new();
        let key = CacheKey::from_bytes(b"doc");
        let (release, released) = oneshot::channel::<()>();

        let abandoned = tokio::time::timeout(
            Duration::from_millis(10),
            flight.run(&key, move || async move {
                let _ = released.await;
                Ok("late".to_string())
            }),
        )
        .await;
        assert!(abandoned.is_err());
        assert_eq!(flight.len(), 1);

        release.send(()).unwrap();
        drained(&flight).await;
    }

    #[tokio::test]
    async fn test_abandoned_failure_is_retried() {
        let flight = InFlight::new();
        let key = CacheKey::from_bytes(b"doc");
        let (release, released) = oneshot::channel::<()>();

        let abandoned = tokio::time::timeout(
            Duration::from_millis(10),
            flight.run(&key, move || async move {
                let _ = released.await;
                Err(AppError::Internal("transient write failure".into()))
            }),
        )
        .await;
        assert!(abandoned.is_err());

        release.send(()).unwrap();
        drained(&flight).await;

        let calls = Arc::new(AtomicUsize::new(0));
        let counted = calls.clone();
        let (outcome, role) = flight
            .run(&key, move || async move {
                counted.fetch_add(1, Ordering::SeqCst);
                Ok("fresh".to_string())
            })
            .await;

        assert_eq!(outcome.unwrap(), "fresh");
        assert_eq!(role, Role::Leader);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
