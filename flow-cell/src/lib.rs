//! A reactive value cell with replay-on-join broadcast.
//!
//! A [`FlowCell`] holds one value. Any number of [`Subscriber`]s can join at
//! any time: each one first receives the value current at the moment it
//! joined, then every later write, in order, through its own bounded queue.
//!
//! - [`cell`] stores the value, serializes writes and fans them out.
//! - `registry` keeps the live subscribers and their delivery queues.
//! - [`subscriber`] is the consumer side: `next_value`, `close`, streams.
//! - [`ops`] adds numeric, boolean and collection compound updates.
//! - [`watch`] runs an owned consumption task per subscriber.
//!
//! ```no_run
//! use flow_cell::FlowCell;
//!
//! # async fn demo() -> Result<(), flow_cell::FlowError> {
//! let pot = FlowCell::new(0u32);
//! let mut observer = pot.subscribe(4)?;
//!
//! pot.add_assign(25).await;
//!
//! assert_eq!(observer.next_value().await?, 0);
//! assert_eq!(observer.next_value().await?, 25);
//! # Ok(())
//! # }
//! ```

pub mod cell;
pub mod error;
pub mod ops;
mod registry;
pub mod subscriber;
pub mod watch;

pub use cell::{BackpressurePolicy, DEFAULT_CAPACITY, FlowCell, IntoFlowCell};
pub use error::FlowError;
pub use ops::CellNumber;
pub use registry::SubscriberId;
pub use subscriber::Subscriber;
pub use watch::Watch;
