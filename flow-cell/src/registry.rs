//! Subscriber bookkeeping and the per-subscriber delivery queues.
//!
//! A [`Slot`] is the private, bounded queue of one subscriber. The
//! [`SubscriberRegistry`] owns the set of live slots; it is only ever touched
//! while the cell's state lock is held, so registration, removal and the
//! snapshot a broadcast fans out to are atomic with respect to each other.

use std::{
    collections::{BTreeMap, VecDeque},
    sync::Arc,
};

use parking_lot::Mutex;
use tokio::sync::Notify;
use tracing::debug;

use crate::{BackpressurePolicy, FlowError};

pub type SubscriberId = u64;

/// Outcome of pushing one value into a subscriber's queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Delivery {
    Queued,
    /// The queue was full and its oldest item was dropped.
    Conflated,
    /// The subscriber went away before the value could be queued.
    Closed,
}

struct SlotState<T> {
    items: VecDeque<T>,
    /// Version of the newest value queued here.
    delivered: u64,
    /// Set by the consumer; the queue is released.
    closed: bool,
    /// Set when the cell goes away; the queue stays readable.
    sealed: bool,
}

pub(crate) struct Slot<T> {
    id: SubscriberId,
    capacity: usize,
    joined_at_version: u64,
    state: Mutex<SlotState<T>>,
    readable: Notify,
    writable: Notify,
}

impl<T> Slot<T> {
    fn new(id: SubscriberId, capacity: usize, joined_at_version: u64, current: T) -> Self {
        let mut items = VecDeque::with_capacity(capacity);
        items.push_back(current);
        Self {
            id,
            capacity,
            joined_at_version,
            state: Mutex::new(SlotState {
                items,
                delivered: joined_at_version,
                closed: false,
                sealed: false,
            }),
            readable: Notify::new(),
            writable: Notify::new(),
        }
    }

    pub(crate) fn id(&self) -> SubscriberId {
        self.id
    }

    pub(crate) fn capacity(&self) -> usize {
        self.capacity
    }

    pub(crate) fn joined_at_version(&self) -> u64 {
        self.joined_at_version
    }

    pub(crate) fn is_closed(&self) -> bool {
        let state = self.state.lock();
        state.closed || state.sealed
    }

    pub(crate) fn len(&self) -> usize {
        self.state.lock().items.len()
    }

    /// Queues `value` written at `version`, waiting for room under
    /// [`BackpressurePolicy::Block`]. A version this slot already holds is
    /// not queued twice.
    pub(crate) async fn deliver(
        &self,
        value: T,
        version: u64,
        policy: BackpressurePolicy,
    ) -> Delivery {
        loop {
            {
                let mut state = self.state.lock();
                if state.closed || state.sealed {
                    return Delivery::Closed;
                }
                if state.delivered >= version {
                    return Delivery::Queued;
                }
                if state.items.len() < self.capacity {
                    state.items.push_back(value);
                    state.delivered = version;
                    drop(state);
                    self.readable.notify_one();
                    return Delivery::Queued;
                }
                if policy == BackpressurePolicy::Conflate {
                    state.items.pop_front();
                    state.items.push_back(value);
                    state.delivered = version;
                    drop(state);
                    self.readable.notify_one();
                    return Delivery::Conflated;
                }
            }
            // Only one writer at a time reaches a slot, so a stored permit
            // from `notify_one` cannot be stolen between the check and here.
            self.writable.notified().await;
        }
    }

    /// Queues the value of an abandoned broadcast past capacity. Later
    /// deliveries wait until the queue is back under capacity, so order is
    /// kept. Returns `false` if the slot already holds `version` or is gone.
    pub(crate) fn park(&self, version: u64, value: impl FnOnce() -> T) -> bool {
        let mut state = self.state.lock();
        if state.closed || state.sealed || state.delivered >= version {
            return false;
        }
        state.items.push_back(value());
        state.delivered = version;
        drop(state);
        self.readable.notify_one();
        true
    }

    /// Waits for the next queued value. A sealed slot still drains what it
    /// holds before reporting [`FlowError::AlreadyClosed`].
    pub(crate) async fn take(&self) -> Result<T, FlowError> {
        loop {
            if let Some(item) = self.try_take()? {
                return Ok(item);
            }
            self.readable.notified().await;
        }
    }

    pub(crate) fn try_take(&self) -> Result<Option<T>, FlowError> {
        let mut state = self.state.lock();
        if state.closed {
            return Err(FlowError::AlreadyClosed);
        }
        match state.items.pop_front() {
            Some(item) => {
                drop(state);
                self.writable.notify_one();
                Ok(Some(item))
            }
            None if state.sealed => Err(FlowError::AlreadyClosed),
            None => Ok(None),
        }
    }

    /// Closes the slot from the consumer side and releases its queue, sealed
    /// or not. Returns `false` if it was already closed.
    pub(crate) fn close(&self) -> bool {
        let released = {
            let mut state = self.state.lock();
            if state.closed {
                return false;
            }
            state.closed = true;
            std::mem::take(&mut state.items)
        };
        drop(released);
        self.wake_all();
        true
    }

    /// Marks the slot as outliving its cell; queued items stay readable.
    fn seal(&self) {
        self.state.lock().sealed = true;
        self.wake_all();
    }

    fn wake_all(&self) {
        self.writable.notify_one();
        self.readable.notify_one();
    }
}

/// The live subscribers of one cell.
pub(crate) struct SubscriberRegistry<T> {
    next_id: SubscriberId,
    slots: BTreeMap<SubscriberId, Arc<Slot<T>>>,
}

impl<T> SubscriberRegistry<T> {
    pub(crate) fn new() -> Self {
        Self {
            next_id: 1,
            slots: BTreeMap::new(),
        }
    }

    /// Creates a slot whose first item is `current` and registers it.
    pub(crate) fn register(
        &mut self,
        capacity: usize,
        version: u64,
        current: T,
    ) -> Result<Arc<Slot<T>>, FlowError> {
        if capacity == 0 {
            return Err(FlowError::InvalidCapacity(capacity));
        }
        let id = self.next_id;
        self.next_id += 1;

        let slot = Arc::new(Slot::new(id, capacity, version, current));
        self.slots.insert(id, Arc::clone(&slot));
        debug!(subscriber = id, capacity, version, "subscriber registered");
        Ok(slot)
    }

    pub(crate) fn remove(&mut self, id: SubscriberId) -> Option<Arc<Slot<T>>> {
        let removed = self.slots.remove(&id);
        if removed.is_some() {
            debug!(subscriber = id, "subscriber removed");
        }
        removed
    }

    /// The subscribers a broadcast taken right now must reach.
    pub(crate) fn snapshot(&self) -> Vec<Arc<Slot<T>>> {
        self.slots.values().cloned().collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.slots.len()
    }
}

impl<T> Drop for SubscriberRegistry<T> {
    fn drop(&mut self) {
        for slot in self.slots.values() {
            slot.seal();
        }
    }
}
