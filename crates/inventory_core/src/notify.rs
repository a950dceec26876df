//! Change notifications for item writes.
//!
//! # Responsibility
//! - Let list/detail views learn about writes without holding a live cursor.
//! - Stay independent of any UI toolkit; subscribers are plain channels.
//!
//! # Invariants
//! - Only writes that affected at least one row are published.
//! - A subscriber whose receiver was dropped is pruned on the next publish.

use crate::contract::ItemUri;
use log::debug;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Mutex, PoisonError};

/// Kind of write that changed the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Inserted,
    Updated,
    Deleted,
}

/// One committed write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChangeEvent {
    /// Row URI for single-row writes, collection URI for delete-all.
    pub uri: ItemUri,
    pub kind: ChangeKind,
    /// Rows affected by the write.
    pub rows: usize,
}

/// Fan-out of change events to any number of subscribers.
#[derive(Debug, Default)]
pub struct ChangeNotifier {
    subscribers: Mutex<Vec<Sender<ChangeEvent>>>,
}

impl ChangeNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new subscriber. Dropping the receiver unsubscribes.
    pub fn subscribe(&self) -> Receiver<ChangeEvent> {
        let (tx, rx) = mpsc::channel();
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(tx);
        rx
    }

    /// Delivers `event` to live subscribers and returns how many received it.
    pub fn publish(&self, event: ChangeEvent) -> usize {
        let mut subscribers = self
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let before = subscribers.len();
        subscribers.retain(|tx| tx.send(event).is_ok());

        let pruned = before - subscribers.len();
        if pruned > 0 {
            debug!("event=notify_prune module=notify status=ok pruned={pruned}");
        }
        subscribers.len()
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

#[cfg(test)]
mod tests {
    use super::{ChangeEvent, ChangeKind, ChangeNotifier};
    use crate::contract::ItemUri;

    fn event(id: i64) -> ChangeEvent {
        ChangeEvent {
            uri: ItemUri::Row(id),
            kind: ChangeKind::Updated,
            rows: 1,
        }
    }

    #[test]
    fn publish_reaches_every_subscriber() {
        let notifier = ChangeNotifier::new();
        let first = notifier.subscribe();
        let second = notifier.subscribe();

        assert_eq!(notifier.publish(event(7)), 2);
        assert_eq!(first.try_recv().unwrap(), event(7));
        assert_eq!(second.try_recv().unwrap(), event(7));
    }

    #[test]
    fn dropped_receivers_are_pruned() {
        let notifier = ChangeNotifier::new();
        let kept = notifier.subscribe();
        drop(notifier.subscribe());
        assert_eq!(notifier.subscriber_count(), 2);

        assert_eq!(notifier.publish(event(1)), 1);
        assert_eq!(notifier.subscriber_count(), 1);
        assert!(kept.try_recv().is_ok());
    }

    #[test]
    fn publish_without_subscribers_is_a_no_op() {
        let notifier = ChangeNotifier::new();
        assert_eq!(notifier.publish(event(1)), 0);
    }
}
