//! Fan-out of newly admitted executions to bounded listener buffers.
//!
//! Every listener owns a fixed-size [`RingBuffer`]. Publishing never waits on
//! a consumer: when a listener's buffer is full its oldest unread projection
//! is evicted to make room.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tokio::sync::Notify;

use crate::core::{Execution, QueuedOperation};
use crate::infra::RingBuffer;
use crate::util::Clock;

/// Default per-listener buffer capacity.
pub const DEFAULT_LISTENER_CAPACITY: usize = 100;

struct ListenerShared {
    buffer: Mutex<RingBuffer<QueuedOperation>>,
    notify: Notify,
    dropped: AtomicU64,
    closed: AtomicBool,
}

impl ListenerShared {
    fn push(&self, op: QueuedOperation) {
        let evicted = self.buffer.lock().push(op);
        if evicted.is_some() {
            self.dropped.fetch_add(1, Ordering::Relaxed);
            tracing::trace!(execution = %op.execution.id, "listener full, evicted oldest");
        }
        self.notify.notify_one();
    }
}

/// Consumer side of a registered listener.
///
/// Dropping the listener unregisters it on the next publish.
pub struct QueueListener {
    shared: Arc<ListenerShared>,
}

impl QueueListener {
    /// Take the oldest buffered projection, if any.
    #[must_use]
    pub fn try_recv(&self) -> Option<QueuedOperation> {
        self.shared.buffer.lock().pop()
    }

    /// Take everything buffered, oldest first.
    #[must_use]
    pub fn drain(&self) -> Vec<QueuedOperation> {
        self.shared.buffer.lock().drain()
    }

    /// Wait for the next projection. Returns `None` once the broadcaster is
    /// gone and the buffer is empty.
    pub async fn recv(&self) -> Option<QueuedOperation> {
        loop {
            if let Some(op) = self.try_recv() {
                return Some(op);
            }
            if self.shared.closed.load(Ordering::Acquire) {
                return self.try_recv();
            }
            self.shared.notify.notified().await;
        }
    }

    /// Number of buffered projections.
    #[must_use]
    pub fn len(&self) -> usize {
        self.shared.buffer.lock().len()
    }

    /// True when nothing is buffered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Buffer capacity.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.shared.buffer.lock().capacity()
    }

    /// Projections evicted unread since registration.
    #[must_use]
    pub fn dropped(&self) -> u64 {
        self.shared.dropped.load(Ordering::Relaxed)
    }
}

/// Pushes projections of admitted executions to every live listener.
pub struct QueueBroadcaster {
    listeners: Mutex<Vec<Weak<ListenerShared>>>,
    capacity: usize,
    tickrate: u32,
    clock: Arc<dyn Clock>,
}

impl QueueBroadcaster {
    /// Create a broadcaster whose listeners buffer `capacity` items. `tickrate`
    /// converts remaining ticks into projected fire times.
    #[must_use]
    pub fn new(capacity: usize, tickrate: u32, clock: Arc<dyn Clock>) -> Self {
        Self {
            listeners: Mutex::new(Vec::new()),
            capacity,
            tickrate,
            clock,
        }
    }

    /// Register a new listener with an empty buffer.
    #[must_use]
    pub fn register(&self) -> QueueListener {
        let shared = Arc::new(ListenerShared {
            buffer: Mutex::new(RingBuffer::new(self.capacity)),
            notify: Notify::new(),
            dropped: AtomicU64::new(0),
            closed: AtomicBool::new(false),
        });
        self.listeners.lock().push(Arc::downgrade(&shared));
        tracing::debug!(capacity = self.capacity, "queue listener registered");
        QueueListener { shared }
    }

    /// Live listener count.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners
            .lock()
            .iter()
            .filter(|l| l.strong_count() > 0)
            .count()
    }

    /// Project `admitted` once and push it to every live listener in order.
    pub fn publish(&self, admitted: &[Execution]) {
        let mut listeners = self.listeners.lock();
        listeners.retain(|l| l.strong_count() > 0);
        if admitted.is_empty() || listeners.is_empty() {
            return;
        }

        let now = self.clock.now_ms();
        let ops: Vec<QueuedOperation> = admitted
            .iter()
            .map(|e| e.project(now, self.tickrate))
            .collect();
        for listener in listeners.iter().filter_map(Weak::upgrade) {
            for op in &ops {
                listener.push(*op);
            }
        }
    }
}

impl Drop for QueueBroadcaster {
    fn drop(&mut self) {
        for listener in self.listeners.get_mut().iter().filter_map(Weak::upgrade) {
            listener.closed.store(true, Ordering::Release);
            listener.notify.notify_one();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Profile, Query, ResourceCost};
    use crate::util::ManualClock;

    fn executions(n: usize, delay: i64) -> Vec<Execution> {
        let query = Arc::new(Query::new(Profile::Cpu, ResourceCost::default()));
        (0..n).map(|_| Execution::new(query.clone(), delay)).collect()
    }

    #[test]
    fn test_publish_projects_with_clock() {
        let broadcaster = QueueBroadcaster::new(10, 100, Arc::new(ManualClock::new(10_000)));
        let listener = broadcaster.register();
        let execs = executions(1, 10);
        broadcaster.publish(&execs);
        let op = listener.try_recv().unwrap();
        assert_eq!(op.execution.id, execs[0].id());
        assert_eq!(op.execution.timestamp, 10_100);
        assert!(listener.is_empty());
    }

    #[test]
    fn test_bounded_drop_oldest() {
        let broadcaster = QueueBroadcaster::new(3, 10, Arc::new(ManualClock::new(0)));
        let listener = broadcaster.register();
        let execs = executions(5, 1);
        broadcaster.publish(&execs);
        assert_eq!(listener.len(), 3);
        assert_eq!(listener.dropped(), 2);
        let ids: Vec<_> = listener.drain().into_iter().map(|op| op.execution.id).collect();
        let expected: Vec<_> = execs[2..].iter().map(Execution::id).collect();
        assert_eq!(ids, expected);
    }

    #[test]
    fn test_dropped_listener_pruned() {
        let broadcaster = QueueBroadcaster::new(3, 10, Arc::new(ManualClock::new(0)));
        let keep = broadcaster.register();
        let gone = broadcaster.register();
        assert_eq!(broadcaster.listener_count(), 2);
        drop(gone);
        broadcaster.publish(&executions(1, 1));
        assert_eq!(broadcaster.listener_count(), 1);
        assert_eq!(keep.len(), 1);
    }

    #[tokio::test]
    async fn test_recv_wakes_on_publish() {
        let broadcaster = Arc::new(QueueBroadcaster::new(4, 10, Arc::new(ManualClock::new(0))));
        let listener = broadcaster.register();
        let execs = executions(1, 2);
        let id = execs[0].id();
        let publisher = Arc::clone(&broadcaster);
        tokio::spawn(async move {
            tokio::task::yield_now().await;
            publisher.publish(&execs);
        });
        let op = listener.recv().await.unwrap();
        assert_eq!(op.execution.id, id);
    }

    #[tokio::test]
    async fn test_recv_ends_when_broadcaster_dropped() {
        let broadcaster = QueueBroadcaster::new(4, 10, Arc::new(ManualClock::new(0)));
        let listener = broadcaster.register();
        broadcaster.publish(&executions(1, 2));
        drop(broadcaster);
        assert!(listener.recv().await.is_some());
        assert!(listener.recv().await.is_none());
    }
}
