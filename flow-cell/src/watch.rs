use std::future::Future;

use tokio::task::JoinHandle;
use tracing::debug;

use crate::{FlowCell, FlowError, registry::SubscriberId};

/// A consumption task owned by whoever called [`FlowCell::watch`].
///
/// Dropping the handle aborts the task, which drops its subscriber and
/// unsubscribes it from the cell.
#[derive(Debug)]
pub struct Watch {
    subscriber: SubscriberId,
    task: Option<JoinHandle<()>>,
}

impl Watch {
    pub fn subscriber_id(&self) -> SubscriberId {
        self.subscriber
    }

    pub fn is_finished(&self) -> bool {
        self.task.as_ref().is_none_or(JoinHandle::is_finished)
    }

    /// Stops the task and waits until it is gone. The subscriber is
    /// unsubscribed by the time this returns.
    pub async fn cancel(mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            let _ = task.await;
            debug!(subscriber = self.subscriber, "watch cancelled");
        }
    }

    /// Waits for the task to end on its own, which happens once the cell is
    /// dropped and every queued value has been handled.
    pub async fn finished(mut self) {
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for Watch {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl<T> FlowCell<T>
where
    T: Clone + Send + 'static,
{
    /// Subscribes and spawns a task that runs `action` on the current value
    /// and then on every change, one value at a time.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn watch<F, Fut>(&self, capacity: usize, mut action: F) -> Result<Watch, FlowError>
    where
        F: FnMut(T) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send,
    {
        let mut subscriber = self.subscribe(capacity)?;
        let id = subscriber.id();
        let task = tokio::spawn(async move {
            while let Ok(value) = subscriber.next_value().await {
                action(value).await;
            }
            debug!(subscriber = id, "watched cell closed");
        });

        Ok(Watch {
            subscriber: id,
            task: Some(task),
        })
    }
}
