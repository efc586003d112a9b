use std::{
    fmt,
    sync::{Arc, Weak},
};

use futures::Stream;

use crate::{
    FlowError,
    cell::Shared,
    registry::{Slot, SubscriberId},
};

/// One observer of a [`FlowCell`](crate::FlowCell).
///
/// Values arrive in write order. Dropping the subscriber unsubscribes it, so
/// cancelling the task that consumes it is enough to leave the cell.
pub struct Subscriber<T> {
    slot: Arc<Slot<T>>,
    cell: Weak<Shared<T>>,
}

impl<T> Subscriber<T> {
    pub(crate) fn new(slot: Arc<Slot<T>>, cell: Weak<Shared<T>>) -> Self {
        Self { slot, cell }
    }

    pub fn id(&self) -> SubscriberId {
        self.slot.id()
    }

    /// Cell version at the moment this subscriber joined; its first item is
    /// the value written by that version.
    pub fn joined_at_version(&self) -> u64 {
        self.slot.joined_at_version()
    }

    pub fn capacity(&self) -> usize {
        self.slot.capacity()
    }

    /// Number of delivered values not consumed yet.
    pub fn pending(&self) -> usize {
        self.slot.len()
    }

    pub fn is_closed(&self) -> bool {
        self.slot.is_closed()
    }

    /// Waits for the next value.
    ///
    /// Returns [`FlowError::AlreadyClosed`] after [`close`](Self::close), or
    /// once the cell is dropped and the queue is drained.
    pub async fn next_value(&mut self) -> Result<T, FlowError> {
        self.slot.take().await
    }

    /// Returns the next value if one is already queued.
    pub fn try_next_value(&mut self) -> Result<Option<T>, FlowError> {
        self.slot.try_take()
    }

    /// Unsubscribes and drops anything still queued. Calling it again is a
    /// no-op.
    pub fn close(&mut self) {
        if !self.slot.close() {
            return;
        }
        if let Some(cell) = self.cell.upgrade() {
            cell.unsubscribe(self.slot.id());
        }
    }

    /// The subscriber as a lazy, non-restartable sequence of values. The
    /// stream ends when the subscriber is closed; dropping it unsubscribes.
    pub fn into_stream(self) -> impl Stream<Item = T> {
        futures::stream::unfold(self, |mut subscriber| async move {
            let value = subscriber.next_value().await.ok()?;
            Some((value, subscriber))
        })
    }
}

impl<T> Drop for Subscriber<T> {
    fn drop(&mut self) {
        self.close();
    }
}

impl<T> fmt::Debug for Subscriber<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscriber")
            .field("id", &self.id())
            .field("joined_at_version", &self.joined_at_version())
            .field("capacity", &self.capacity())
            .field("closed", &self.is_closed())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use futures::StreamExt;

    use crate::FlowCell;

    use super::*;

    #[tokio::test]
    async fn close_twice_is_a_no_op() {
        let cell = FlowCell::new(1);
        let mut subscriber = cell.subscribe(1).expect("subscribe");
        assert_eq!(cell.subscriber_count(), 1);

        subscriber.close();
        subscriber.close();

        assert!(subscriber.is_closed());
        assert_eq!(cell.subscriber_count(), 0);
        assert_eq!(
            subscriber.next_value().await,
            Err(FlowError::AlreadyClosed)
        );
        assert_eq!(cell.get(), 1);
    }

    #[tokio::test]
    async fn close_after_cell_drop_discards_queued_values() {
        let cell = FlowCell::new(1);
        let mut subscriber = cell.subscribe(2).expect("subscribe");
        cell.set(2).await;
        drop(cell);
        assert_eq!(subscriber.pending(), 2);

        subscriber.close();

        assert_eq!(subscriber.pending(), 0);
        assert_eq!(
            subscriber.next_value().await,
            Err(FlowError::AlreadyClosed)
        );
        assert_eq!(subscriber.try_next_value(), Err(FlowError::AlreadyClosed));
    }

    #[tokio::test]
    async fn drop_unsubscribes() {
        let cell = FlowCell::new(());
        let subscriber = cell.subscribe(1).expect("subscribe");
        let _other = cell.subscribe(1).expect("subscribe");
        drop(subscriber);
        assert_eq!(cell.subscriber_count(), 1);
    }

    #[tokio::test]
    async fn try_next_value_does_not_wait() {
        let cell = FlowCell::new('x');
        let mut subscriber = cell.subscribe(2).expect("subscribe");
        assert_eq!(subscriber.try_next_value(), Ok(Some('x')));
        assert_eq!(subscriber.try_next_value(), Ok(None));
    }

    #[tokio::test]
    async fn stream_yields_replay_then_updates() {
        let cell = FlowCell::new(0);
        let subscriber = cell.subscribe(4).expect("subscribe");
        cell.set(1).await;
        cell.set(2).await;
        drop(cell);

        let seen: Vec<i32> = subscriber.into_stream().collect().await;
        assert_eq!(seen, vec![0, 1, 2]);
    }

    #[test]
    fn debug_reports_identity() {
        let cell = FlowCell::new(0);
        let subscriber = cell.subscribe(3).expect("subscribe");
        let rendered = format!("{subscriber:?}");
        assert!(rendered.contains("capacity: 3"));
        assert!(rendered.contains("closed: false"));
    }
}
