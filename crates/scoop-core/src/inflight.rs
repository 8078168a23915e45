//! Per-key table of in-flight fetches.
//!
//! A second request for a key that is already being fetched attaches to the
//! pending future instead of issuing another network call. Entries remove
//! themselves when their future completes, unless a newer fetch has replaced
//! them in the meantime.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::rc::Rc;

use futures::future::{FutureExt, LocalBoxFuture, Shared};

use crate::error::DriveError;

/// A fetch that any number of callers can await.
pub(crate) type SharedFetch<T> = Shared<LocalBoxFuture<'static, Result<T, DriveError>>>;

struct Pending<T> {
    ticket: u64,
    fetch: SharedFetch<T>,
}

pub(crate) struct InFlight<K, T> {
    pending: Rc<RefCell<HashMap<K, Pending<T>>>>,
    tickets: Rc<Cell<u64>>,
}

impl<K, T> Clone for InFlight<K, T> {
    fn clone(&self) -> Self {
        Self {
            pending: Rc::clone(&self.pending),
            tickets: Rc::clone(&self.tickets),
        }
    }
}

impl<K, T> InFlight<K, T>
where
    K: Eq + Hash + Clone + 'static,
    T: Clone + 'static,
{
    pub fn new() -> Self {
        Self {
            pending: Rc::new(RefCell::new(HashMap::new())),
            tickets: Rc::new(Cell::new(0)),
        }
    }

    /// The pending fetch for `key`, if any.
    pub fn get(&self, key: &K) -> Option<SharedFetch<T>> {
        self.pending.borrow().get(key).map(|p| p.fetch.clone())
    }

    #[cfg(test)]
    pub fn is_pending(&self, key: &K) -> bool {
        self.pending.borrow().contains_key(key)
    }

    /// Attach to the pending fetch for `key`, or start one with `start`.
    pub fn join_or_start<F, Fut>(&self, key: K, start: F) -> SharedFetch<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, DriveError>> + 'static,
    {
        if let Some(fetch) = self.get(&key) {
            return fetch;
        }
        self.start(key, start())
    }

    /// Register `fetch` as the current request for `key`, replacing any
    /// pending one. Callers already awaiting the old fetch keep it.
    pub fn start<Fut>(&self, key: K, fetch: Fut) -> SharedFetch<T>
    where
        Fut: Future<Output = Result<T, DriveError>> + 'static,
    {
        let ticket = self.tickets.get() + 1;
        self.tickets.set(ticket);

        let table = Rc::downgrade(&self.pending);
        let own_key = key.clone();
        let shared = async move {
            let result = fetch.await;
            if let Some(table) = table.upgrade() {
                let mut table = table.borrow_mut();
                if table.get(&own_key).is_some_and(|p| p.ticket == ticket) {
                    table.remove(&own_key);
                }
            }
            result
        }
        .boxed_local()
        .shared();

        self.pending.borrow_mut().insert(
            key,
            Pending {
                ticket,
                fetch: shared.clone(),
            },
        );
        shared
    }

    /// Forget the pending fetch for `key`. Callers already awaiting it keep
    /// it; the next request starts a fresh one.
    pub fn remove(&self, key: &K) {
        self.pending.borrow_mut().remove(key);
    }

    /// Forget every pending fetch. Futures already handed out still run.
    pub fn clear(&self) {
        self.pending.borrow_mut().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::channel::oneshot;

    #[tokio::test]
    async fn test_join_attaches_to_pending_fetch() {
        let table: InFlight<&str, u32> = InFlight::new();
        let starts = Rc::new(Cell::new(0));
        let (tx, rx) = oneshot::channel::<()>();
        let rx = rx.shared();

        let start = |starts: Rc<Cell<u32>>, rx: futures::future::Shared<oneshot::Receiver<()>>| {
            move || {
                starts.set(starts.get() + 1);
                async move {
                    let _ = rx.await;
                    Ok(7)
                }
            }
        };

        let a = table.join_or_start("k", start(starts.clone(), rx.clone()));
        let b = table.join_or_start("k", start(starts.clone(), rx.clone()));
        assert!(table.is_pending(&"k"));

        let release = async move {
            let _ = tx.send(());
        };
        let (a, b, ()) = futures::join!(a, b, release);

        assert_eq!(a, Ok(7));
        assert_eq!(b, Ok(7));
        assert_eq!(starts.get(), 1);
        assert!(!table.is_pending(&"k"));
    }

    #[tokio::test]
    async fn test_superseded_entry_is_not_removed_by_old_fetch() {
        let table: InFlight<&str, u32> = InFlight::new();
        let old = table.start("k", async { Ok(1) });
        let (tx, rx) = oneshot::channel::<()>();
        let newer = table.start("k", async move {
            let _ = rx.await;
            Ok(2)
        });

        assert_eq!(old.await, Ok(1));
        // The newer fetch is still registered
        assert!(table.is_pending(&"k"));

        let _ = tx.send(());
        assert_eq!(newer.await, Ok(2));
        assert!(!table.is_pending(&"k"));
    }

    #[tokio::test]
    async fn test_removed_key_starts_fresh_fetch() {
        let table: InFlight<&str, u32> = InFlight::new();
        let (tx, rx) = oneshot::channel::<()>();
        let old = table.start("k", async move {
            let _ = rx.await;
            Ok(1)
        });

        table.remove(&"k");
        let fresh = table.join_or_start("k", || async { Ok(2) });
        assert!(table.is_pending(&"k"));

        assert_eq!(fresh.await, Ok(2));
        let _ = tx.send(());
        assert_eq!(old.await, Ok(1));
        assert!(!table.is_pending(&"k"));
    }

    #[tokio::test]
    async fn test_clear_forgets_pending() {
        let table: InFlight<u8, ()> = InFlight::new();
        let fetch = table.start(1, async { Ok(()) });
        table.clear();
        assert!(!table.is_pending(&1));
        assert_eq!(fetch.await, Ok(()));
    }
}
