use thiserror::Error;

/// Errors reported by [`FlowCell`](crate::FlowCell) and its subscribers.
///
/// Races between a writer and a closing subscriber are never reported; the
/// delivery quietly becomes a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FlowError {
    /// `subscribe` was called with a capacity of zero.
    #[error("subscriber capacity must be at least 1, got {0}")]
    InvalidCapacity(usize),
    /// Integral division or remainder by zero.
    #[error("division by zero")]
    DivisionByZero,
    /// The subscriber was closed, or the cell behind it was dropped and the
    /// queue is drained.
    #[error("subscriber is closed")]
    AlreadyClosed,
    /// Indexed write past the end of a collection cell.
    #[error("index {index} out of bounds for length {len}")]
    IndexOutOfBounds { index: usize, len: usize },
}
