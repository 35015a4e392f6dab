//! Keyed FIFO mutual exclusion.
//!
//! A key is either free (absent from the map) or held, with a queue of
//! waiters. Places in the queue are reserved synchronously by
//! [`ConcurrencyGate::enqueue`], so callers that enqueue in message arrival
//! order are served in message arrival order regardless of when their tasks
//! are first polled.
//!
//! ```text
//! enqueue(k) ──free──→ ticket already granted
//!            └─held──→ ticket queued (oneshot receiver)
//!
//! guard drop ──→ grant to first live waiter, or mark key free
//! ```
//!
//! No reentrancy: acquiring a key already held by the same task deadlocks.

use parking_lot::Mutex;
use std::collections::hash_map::Entry;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::oneshot;
use tracing::trace;

type Waiters = VecDeque<oneshot::Sender<()>>;

/// Process-wide gate; clones share state.
#[derive(Clone, Default)]
pub struct ConcurrencyGate {
    keys: Arc<Mutex<HashMap<String, Waiters>>>,
}

impl ConcurrencyGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve the next place in `key`'s queue without waiting.
    pub fn enqueue(&self, key: &str) -> GateTicket {
        let mut keys = self.keys.lock();
        let grant = match keys.entry(key.to_string()) {
            Entry::Vacant(slot) => {
                slot.insert(VecDeque::new());
                Grant::Held
            }
            Entry::Occupied(mut waiters) => {
                let (tx, rx) = oneshot::channel();
                waiters.get_mut().push_back(tx);
                Grant::Queued(rx)
            }
        };
        trace!(key, queued = matches!(grant, Grant::Queued(_)), "gate ticket issued");

        GateTicket {
            gate: self.clone(),
            key: key.to_string(),
            grant,
        }
    }

    /// Wait for exclusive access to `key`.
    pub async fn acquire(&self, key: &str) -> GateGuard {
        self.enqueue(key).wait().await
    }

    /// Whether some holder currently owns `key`.
    pub fn is_held(&self, key: &str) -> bool {
        self.keys.lock().contains_key(key)
    }

    /// Number of tickets waiting behind the current holder.
    pub fn queued(&self, key: &str) -> usize {
        self.keys.lock().get(key).map_or(0, VecDeque::len)
    }

    /// Hand `key` to the first waiter that is still listening, else free it.
    fn release(&self, key: &str) {
        let mut keys = self.keys.lock();
        let Some(waiters) = keys.get_mut(key) else {
            return;
        };
        while let Some(next) = waiters.pop_front() {
            // Fails only if that ticket was dropped before being granted.
            if next.send(()).is_ok() {
                trace!(key, "gate handed to next waiter");
                return;
            }
        }
        keys.remove(key);
        trace!(key, "gate free");
    }
}

enum Grant {
    /// Key was free at enqueue time.
    Held,
    Queued(oneshot::Receiver<()>),
    /// Moved into a [`GateGuard`].
    Consumed,
}

/// A reserved place in a key's queue.
///
/// Dropping a ticket gives up its place; if the grant already arrived, the
/// key is passed on as if a guard had been dropped.
pub struct GateTicket {
    gate: ConcurrencyGate,
    key: String,
    grant: Grant,
}

impl GateTicket {
    /// Suspend until every earlier ticket for this key has been released.
    pub async fn wait(mut self) -> GateGuard {
        if let Grant::Queued(rx) = &mut self.grant {
            // Senders are only dropped unsent by `release` after a failed
            // send, which cannot happen while this receiver is alive.
            let _ = rx.await;
        }
        self.grant = Grant::Consumed;

        GateGuard {
            gate: self.gate.clone(),
            key: std::mem::take(&mut self.key),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

impl Drop for GateTicket {
    fn drop(&mut self) {
        match std::mem::replace(&mut self.grant, Grant::Consumed) {
            Grant::Consumed => {}
            Grant::Held => self.gate.release(&self.key),
            Grant::Queued(mut rx) => {
                rx.close();
                if rx.try_recv().is_ok() {
                    self.gate.release(&self.key);
                }
            }
        }
    }
}

/// Exclusive hold on a key; released exactly once on drop, including
/// during unwinding.
pub struct GateGuard {
    gate: ConcurrencyGate,
    key: String,
}

impl GateGuard {
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl Drop for GateGuard {
    fn drop(&mut self) {
        self.gate.release(&self.key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    const KEY: &str = "handleBlockConnected";

    #[tokio::test]
    async fn test_free_key_is_granted_immediately() {
        let gate = ConcurrencyGate::new();
        assert!(!gate.is_held(KEY));

        let guard = gate.acquire(KEY).await;
        assert!(gate.is_held(KEY));
        assert_eq!(guard.key(), KEY);

        drop(guard);
        assert!(!gate.is_held(KEY));
    }

    #[tokio::test]
    async fn test_second_acquire_waits_for_release() {
        let gate = ConcurrencyGate::new();
        let first = gate.acquire(KEY).await;

        let ticket = gate.enqueue(KEY);
        assert_eq!(gate.queued(KEY), 1);
        let waiter = tokio::spawn(ticket.wait());

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());

        drop(first);
        let second = waiter.await.unwrap();
        assert!(gate.is_held(KEY));
        drop(second);
        assert!(!gate.is_held(KEY));
    }

    #[tokio::test]
    async fn test_waiters_served_in_enqueue_order() {
        let gate = ConcurrencyGate::new();
        let order = Arc::new(Mutex::new(Vec::new()));
        let holder = gate.acquire(KEY).await;

        let tickets: Vec<_> = (0..5).map(|_| gate.enqueue(KEY)).collect();
        let mut tasks = Vec::new();
        // Spawn in reverse so poll order differs from enqueue order.
        for (i, ticket) in tickets.into_iter().enumerate().rev() {
            let order = Arc::clone(&order);
            tasks.push(tokio::spawn(async move {
                let _guard = ticket.wait().await;
                order.lock().push(i);
                tokio::task::yield_now().await;
            }));
        }

        drop(holder);
        for task in tasks {
            task.await.unwrap();
        }
        assert_eq!(*order.lock(), vec![0, 1, 2, 3, 4]);
        assert!(!gate.is_held(KEY));
    }

    #[tokio::test]
    async fn test_different_keys_do_not_interfere() {
        let gate = ConcurrencyGate::new();
        let _a = gate.acquire("a").await;
        let b = tokio::time::timeout(Duration::from_millis(50), gate.acquire("b")).await;
        assert!(b.is_ok());
    }

    #[tokio::test]
    async fn test_dropped_ticket_gives_up_its_place() {
        let gate = ConcurrencyGate::new();
        let holder = gate.acquire(KEY).await;

        let abandoned = gate.enqueue(KEY);
        let next = gate.enqueue(KEY);
        drop(abandoned);

        drop(holder);
        let guard = tokio::time::timeout(Duration::from_millis(50), next.wait()).await;
        assert!(guard.is_ok());
    }

    #[tokio::test]
    async fn test_unwaited_granted_ticket_releases_on_drop() {
        let gate = ConcurrencyGate::new();
        let holder = gate.acquire(KEY).await;
        let granted_but_unused = gate.enqueue(KEY);
        let next = gate.enqueue(KEY);

        // Grant lands in the first ticket's channel before it is dropped.
        drop(holder);
        drop(granted_but_unused);

        let guard = tokio::time::timeout(Duration::from_millis(50), next.wait()).await;
        assert!(guard.is_ok());
    }

    #[tokio::test]
    async fn test_panic_while_holding_releases() {
        let gate = ConcurrencyGate::new();
        let inner = gate.clone();
        let result = tokio::spawn(async move {
            let _guard = inner.acquire(KEY).await;
            panic!("handler blew up");
        })
        .await;
        assert!(result.is_err());
        assert!(!gate.is_held(KEY));

        let guard = tokio::time::timeout(Duration::from_millis(50), gate.acquire(KEY)).await;
        assert!(guard.is_ok());
    }
}
