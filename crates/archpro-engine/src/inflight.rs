//! Per-key in-flight generation handles
//!
//! The first caller for a key becomes the leader: it registers a shared
//! cell and runs the generation. Callers arriving while the leader is
//! running await the same cell instead of generating again. The marker is
//! removed once the cell holds a value, whatever the outcome. If the leader
//! is dropped mid-flight the marker stays, and the next caller on that cell
//! (waiting or newly arrived) takes over the generation.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::OnceCell;

use crate::cache::CacheKey;

type Markers<T> = Mutex<HashMap<CacheKey, Arc<OnceCell<T>>>>;

pub(crate) struct InFlight<T> {
    markers: Markers<T>,
}

/// Result of [`InFlight::run`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Flight<T> {
    pub value: T,
    /// `true` if another caller produced `value`
    pub joined: bool,
}

impl<T: Clone> InFlight<T> {
    pub fn new() -> Self {
        Self {
            markers: Mutex::new(HashMap::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<CacheKey, Arc<OnceCell<T>>>> {
        self.markers.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[cfg(test)]
    pub fn is_in_flight(&self, key: &CacheKey) -> bool {
        self.lock().contains_key(key)
    }

    pub async fn run<F, Fut>(&self, key: &CacheKey, generate: F) -> Flight<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let cell = {
            let mut markers = self.lock();
            Arc::clone(
                markers
                    .entry(key.clone())
                    .or_insert_with(|| Arc::new(OnceCell::new())),
            )
        };

        let _marker = MarkerGuard {
            markers: &self.markers,
            key,
            cell: &cell,
        };
        let mut ran = false;
        let value = cell
            .get_or_init(|| {
                ran = true;
                generate()
            })
            .await
            .clone();
        Flight { value, joined: !ran }
    }
}

struct MarkerGuard<'a, T> {
    markers: &'a Markers<T>,
    key: &'a CacheKey,
    cell: &'a Arc<OnceCell<T>>,
}

impl<T> Drop for MarkerGuard<'_, T> {
    fn drop(&mut self) {
        if !self.cell.initialized() {
            return;
        }
        let mut markers = self.markers.lock().unwrap_or_else(PoisonError::into_inner);
        if markers
            .get(self.key)
            .is_some_and(|current| Arc::ptr_eq(current, self.cell))
        {
            markers.remove(self.key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Notify;

    #[tokio::test]
    async fn test_concurrent_callers_share_one_generation() {
        let flights = InFlight::<u32>::new();
        let key = CacheKey::topic("uber");
        let calls = AtomicUsize::new(0);
        let release = Notify::new();

        let leader = flights.run(&key, || async {
            calls.fetch_add(1, Ordering::SeqCst);
            release.notified().await;
            7
        });
        let follower = async {
            tokio::task::yield_now().await;
            assert!(flights.is_in_flight(&key));
            release.notify_one();
            flights
                .run(&key, || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    99
                })
                .await
        };

        let (a, b) = tokio::join!(leader, follower);
        assert_eq!(a, Flight { value: 7, joined: false });
        assert_eq!(b, Flight { value: 7, joined: true });
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(!flights.is_in_flight(&key));
    }

    #[tokio::test]
    async fn test_marker_removed_after_completion() {
        let flights = InFlight::<&'static str>::new();
        let key = CacheKey::topic("zomato");

        let first = flights.run(&key, || async { "first" }).await;
        assert!(!first.joined);
        assert!(!flights.is_in_flight(&key));

        // A later caller is a new leader, not a joiner.
        let second = flights.run(&key, || async { "second" }).await;
        assert_eq!(second, Flight { value: "second", joined: false });
    }

    #[tokio::test]
    async fn test_dropped_leader_keeps_marker_for_next_caller() {
        let flights = InFlight::<u8>::new();
        let key = CacheKey::topic("paytm");

        {
            let pending = flights.run(&key, || std::future::pending::<u8>());
            tokio::pin!(pending);
            let poll = futures_poll_once(pending.as_mut()).await;
            assert!(poll.is_none());
            assert!(flights.is_in_flight(&key));
        }
        assert!(flights.is_in_flight(&key));

        let next = flights.run(&key, || async { 3 }).await;
        assert_eq!(next, Flight { value: 3, joined: false });
        assert!(!flights.is_in_flight(&key));
    }

    #[tokio::test]
    async fn test_caller_after_takeover_joins_instead_of_generating() {
        let flights = InFlight::<u8>::new();
        let key = CacheKey::topic("ticketmaster");
        let calls = AtomicUsize::new(0);
        let release = Notify::new();

        {
            let abandoned = flights.run(&key, || std::future::pending::<u8>());
            tokio::pin!(abandoned);
            assert!(futures_poll_once(abandoned.as_mut()).await.is_none());
        }

        let successor = flights.run(&key, || async {
            calls.fetch_add(1, Ordering::SeqCst);
            release.notified().await;
            5
        });
        let late = async {
            tokio::task::yield_now().await;
            assert!(flights.is_in_flight(&key));
            release.notify_one();
            flights
                .run(&key, || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    9
                })
                .await
        };

        let (a, b) = tokio::join!(successor, late);
        assert_eq!(a, Flight { value: 5, joined: false });
        assert_eq!(b, Flight { value: 5, joined: true });
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(!flights.is_in_flight(&key));
    }

    async fn futures_poll_once<F: Future + Unpin>(fut: F) -> Option<F::Output> {
        tokio::select! {
            biased;
            out = fut => Some(out),
            () = std::future::ready(()) => None,
        }
    }
}
