use std::{convert::Infallible, fmt, sync::Arc};

use futures::future::join_all;
use parking_lot::Mutex;
use tokio::sync::MutexGuard;
use tracing::{debug, trace};

use crate::{
    FlowError,
    registry::{Delivery, Slot, SubscriberRegistry},
    subscriber::Subscriber,
};

/// Queue capacity used when a caller has no reason to pick another one.
pub const DEFAULT_CAPACITY: usize = 1;

/// What a broadcast does when a subscriber's queue is full.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BackpressurePolicy {
    /// The write waits until the subscriber has room.
    #[default]
    Block,
    /// The subscriber's oldest unconsumed value is dropped to make room.
    Conflate,
}

/// A shared value that broadcasts every change to its subscribers.
///
/// Cloning a `FlowCell` clones the handle, not the value; all clones observe
/// and write the same state. When the last handle drops every subscriber is
/// closed after draining what it already holds.
///
/// Writes are serialized: each `set`/`touch` bumps [`version`](Self::version)
/// by one and returns only after every subscriber registered at the moment of
/// the write has accepted the value (or closed).
pub struct FlowCell<T> {
    shared: Arc<Shared<T>>,
}

pub(crate) struct Shared<T> {
    state: Mutex<CellState<T>>,
    write_gate: tokio::sync::Mutex<()>,
    policy: BackpressurePolicy,
}

struct CellState<T> {
    value: T,
    version: u64,
    registry: SubscriberRegistry<T>,
}

impl<T> Shared<T> {
    pub(crate) fn unsubscribe(&self, id: u64) {
        self.state.lock().registry.remove(id);
    }
}

impl<T> Clone for FlowCell<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T: Default> Default for FlowCell<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: fmt::Debug> fmt::Debug for FlowCell<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.shared.state.lock();
        f.debug_struct("FlowCell")
            .field("value", &state.value)
            .field("version", &state.version)
            .field("subscribers", &state.registry.len())
            .field("policy", &self.shared.policy)
            .finish()
    }
}

impl<T> FlowCell<T> {
    /// Creates a cell with the default [`BackpressurePolicy::Block`] policy.
    pub fn new(initial: T) -> Self {
        Self::with_policy(initial, BackpressurePolicy::default())
    }

    pub fn with_policy(initial: T, policy: BackpressurePolicy) -> Self {
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(CellState {
                    value: initial,
                    version: 0,
                    registry: SubscriberRegistry::new(),
                }),
                write_gate: tokio::sync::Mutex::new(()),
                policy,
            }),
        }
    }

    pub fn policy(&self) -> BackpressurePolicy {
        self.shared.policy
    }

    /// Number of completed writes since construction.
    pub fn version(&self) -> u64 {
        self.shared.state.lock().version
    }

    pub fn subscriber_count(&self) -> usize {
        self.shared.state.lock().registry.len()
    }

    /// Borrows the current value without cloning it.
    ///
    /// `f` runs under the cell's lock and must not call back into this cell.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.shared.state.lock().value)
    }

    /// Mutates the value in place without notifying anyone.
    ///
    /// Pair with [`touch`](Self::touch) to publish a batch of in-place edits
    /// as a single broadcast. Like [`with`](Self::with), `f` runs under the
    /// cell's lock and must not call back into this cell.
    pub fn modify<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        f(&mut self.shared.state.lock().value)
    }
}

impl<T: Clone> FlowCell<T> {
    pub fn get(&self) -> T {
        self.shared.state.lock().value.clone()
    }

    /// Registers a subscriber whose first item is the value current right now.
    pub fn subscribe(&self, capacity: usize) -> Result<Subscriber<T>, FlowError> {
        let slot = {
            let mut state = self.shared.state.lock();
            let current = state.value.clone();
            let version = state.version;
            state.registry.register(capacity, version, current)?
        };
        Ok(Subscriber::new(slot, Arc::downgrade(&self.shared)))
    }

    /// Replaces the value and broadcasts it.
    pub async fn set(&self, value: T) {
        self.update(|current| {
            *current = value;
        })
        .await;
    }

    /// Re-broadcasts the current value, e.g. after [`modify`](Self::modify).
    pub async fn touch(&self) {
        self.update(|_| ()).await;
    }

    /// Mutates the value in place and broadcasts the result once.
    pub async fn update<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        let Ok(output) = self.try_update(|value| Ok::<_, Infallible>(f(value))).await;
        output
    }

    /// Mutates the value in place unless `f` refuses. On `Err` the version is
    /// unchanged and nothing is broadcast, so `f` must leave the value as it
    /// found it before failing. `f` must not call back into this cell.
    pub async fn try_update<R, E>(&self, f: impl FnOnce(&mut T) -> Result<R, E>) -> Result<R, E> {
        let gate = self.shared.write_gate.lock().await;
        let (output, (value, version, targets)) = {
            let mut state = self.shared.state.lock();
            let output = f(&mut state.value)?;
            (output, Self::commit(&mut state))
        };
        self.fan_out(gate, value, version, targets).await;
        Ok(output)
    }

    /// Computes the next value from the current one. On `Err` nothing is
    /// stored, the version is unchanged and nothing is broadcast.
    pub async fn set_with<E>(&self, f: impl FnOnce(&T) -> Result<T, E>) -> Result<(), E> {
        self.try_update(|value| {
            let next = f(value)?;
            *value = next;
            Ok(())
        })
        .await
    }

    /// Bumps the version and snapshots the subscribers under the state lock,
    /// so a concurrent `subscribe` lands on one side of this write.
    fn commit(state: &mut CellState<T>) -> (T, u64, Vec<Arc<Slot<T>>>) {
        state.version += 1;
        (
            state.value.clone(),
            state.version,
            state.registry.snapshot(),
        )
    }

    /// Delivers `value` to every target. If the caller stops waiting, the
    /// targets not yet served get the value parked before the gate opens for
    /// the next writer.
    async fn fan_out(
        &self,
        gate: MutexGuard<'_, ()>,
        value: T,
        version: u64,
        targets: Vec<Arc<Slot<T>>>,
    ) {
        let policy = self.shared.policy;
        trace!(version, subscribers = targets.len(), "broadcasting");

        let mut in_flight = InFlight {
            value: &value,
            version,
            targets: &targets,
            done: false,
            _gate: gate,
        };
        let deliveries = targets.iter().map(|slot| {
            let value = value.clone();
            async move { (slot.id(), slot.deliver(value, version, policy).await) }
        });
        let outcomes = join_all(deliveries).await;
        in_flight.done = true;

        for (subscriber, outcome) in outcomes {
            match outcome {
                Delivery::Queued => {}
                Delivery::Conflated => {
                    debug!(subscriber, version, "queue full, dropped oldest value")
                }
                Delivery::Closed => {
                    trace!(subscriber, version, "subscriber closed during broadcast")
                }
            }
        }
    }
}

/// A broadcast between its commit and the last delivery. Holds the write
/// gate; fields drop after `drop` runs, so parking finishes first.
struct InFlight<'a, T: Clone> {
    value: &'a T,
    version: u64,
    targets: &'a [Arc<Slot<T>>],
    done: bool,
    _gate: MutexGuard<'a, ()>,
}

impl<T: Clone> Drop for InFlight<'_, T> {
    fn drop(&mut self) {
        if self.done {
            return;
        }
        for slot in self.targets {
            if slot.park(self.version, || self.value.clone()) {
                debug!(
                    subscriber = slot.id(),
                    version = self.version,
                    "broadcast abandoned, value parked"
                );
            }
        }
    }
}

/// Wraps a plain value in a [`FlowCell`].
pub trait IntoFlowCell: Sized {
    fn into_flow_cell(self) -> FlowCell<Self>;
}

impl<T> IntoFlowCell for T {
    fn into_flow_cell(self) -> FlowCell<Self> {
        FlowCell::new(self)
    }
}
