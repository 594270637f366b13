// ── Notification Queue ──
//
// Agent-reported command failures, each visible for a fixed TTL. Expiry
// is driven by a `DelayQueue`: the owner task polls `next_expired()`
// alongside its message channel, so no timer task outlives the engine.

use std::future::poll_fn;
use std::task::{Context, Poll, ready};
use std::time::Duration;

use chrono::Utc;
use indexmap::IndexMap;
use tokio_util::time::DelayQueue;
use tokio_util::time::delay_queue::Key;

use crate::model::Notification;

pub struct NotificationQueue {
    ttl: Duration,
    next_id: u64,
    /// Live notifications in arrival order, with their expiry handle.
    live: IndexMap<u64, (Notification, Key)>,
    expirations: DelayQueue<u64>,
}

impl NotificationQueue {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            next_id: 1,
            live: IndexMap::new(),
            expirations: DelayQueue::new(),
        }
    }

    /// Queue a message; it is evicted automatically after the TTL.
    ///
    /// Must be called within a Tokio runtime.
    pub fn push(&mut self, message: impl Into<String>) -> u64 {
        let id = self.next_id;
        self.next_id += 1;

        let key = self.expirations.insert(id, self.ttl);
        let notification = Notification {
            id,
            message: message.into(),
            created_at: Utc::now(),
        };
        self.live.insert(id, (notification, key));
        id
    }

    /// Remove a notification now and cancel its pending expiry.
    ///
    /// Returns `false` if it was already gone.
    pub fn dismiss(&mut self, id: u64) -> bool {
        match self.live.shift_remove(&id) {
            Some((_, key)) => {
                self.expirations.remove(&key);
                true
            }
            None => false,
        }
    }

    /// Poll for the next notification whose TTL ran out, evicting it.
    ///
    /// Returns `Ready(None)` when nothing is pending.
    pub fn poll_expired(&mut self, cx: &mut Context<'_>) -> Poll<Option<u64>> {
        loop {
            let Some(expired) = ready!(self.expirations.poll_expired(cx)) else {
                return Poll::Ready(None);
            };
            let id = expired.into_inner();
            if self.live.shift_remove(&id).is_some() {
                return Poll::Ready(Some(id));
            }
        }
    }

    /// Wait for the next expiry. Resolves to `None` immediately when the
    /// queue is empty.
    pub async fn next_expired(&mut self) -> Option<u64> {
        poll_fn(|cx| self.poll_expired(cx)).await
    }

    /// Live notifications in arrival order.
    pub fn iter(&self) -> impl Iterator<Item = &Notification> {
        self.live.values().map(|(n, _)| n)
    }

    pub fn get(&self, id: u64) -> Option<&Notification> {
        self.live.get(&id).map(|(n, _)| n)
    }

    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    /// Drop everything and cancel all pending expiries. Ids keep counting.
    pub fn clear(&mut self) {
        self.live.clear();
        self.expirations.clear();
    }
}

impl std::fmt::Debug for NotificationQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationQueue")
            .field("ttl", &self.ttl)
            .field("next_id", &self.next_id)
            .field("live", &self.live.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use futures_util::FutureExt;
    use tokio::time::{Instant, advance};

    const TTL: Duration = Duration::from_secs(15);

    #[tokio::test(start_paused = true)]
    async fn expires_after_ttl() {
        let mut q = NotificationQueue::new(TTL);
        let t0 = Instant::now();
        let id = q.push("wg-quick up failed");

        advance(Duration::from_millis(14_900)).await;
        assert!(q.next_expired().now_or_never().is_none());
        assert!(q.get(id).is_some());

        let expired = q.next_expired().await;
        assert_eq!(expired, Some(id));
        assert!(t0.elapsed() <= Duration::from_millis(15_100));
        assert!(q.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn dismissal_cancels_expiry() {
        let mut q = NotificationQueue::new(TTL);
        let first = q.push("first");
        let second = q.push("second");

        assert!(q.dismiss(first));
        assert!(!q.dismiss(first));

        // Only the second notification is left to expire.
        assert_eq!(q.next_expired().await, Some(second));
        assert_eq!(q.next_expired().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn ids_increase_and_are_not_reused() {
        let mut q = NotificationQueue::new(TTL);
        let a = q.push("a");
        q.dismiss(a);
        let b = q.push("b");
        q.clear();
        let c = q.push("c");
        assert!(a < b && b < c);
    }

    #[tokio::test(start_paused = true)]
    async fn keeps_arrival_order_without_dedup() {
        let mut q = NotificationQueue::new(TTL);
        q.push("same");
        q.push("other");
        q.push("same");
        let messages: Vec<&str> = q.iter().map(|n| n.message.as_str()).collect();
        assert_eq!(messages, vec!["same", "other", "same"]);
    }

    #[tokio::test(start_paused = true)]
    async fn empty_queue_resolves_none() {
        let mut q = NotificationQueue::new(TTL);
        assert_eq!(q.next_expired().now_or_never(), Some(None));
    }
}
