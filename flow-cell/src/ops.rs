//! Compound updates layered on top of [`FlowCell`]'s primitive operations.
//!
//! Every helper is a single atomic read-modify-write followed by exactly one
//! broadcast, so callers never need to `get` and then `set` by hand.

use crate::{FlowCell, FlowError};

/// Arithmetic for the numeric kinds a cell can hold.
///
/// Integral kinds wrap on overflow and truncate toward zero on division;
/// dividing by zero is an error. Floating kinds follow IEEE 754.
pub trait CellNumber: Copy + Send + Sync + 'static {
    fn plus(self, rhs: Self) -> Self;
    fn minus(self, rhs: Self) -> Self;
    fn times(self, rhs: Self) -> Self;
    fn divided_by(self, rhs: Self) -> Result<Self, FlowError>;
    fn remainder(self, rhs: Self) -> Result<Self, FlowError>;
}

macro_rules! integral_cell_number {
    ($($ty:ty),* $(,)?) => {
        $(
            impl CellNumber for $ty {
                fn plus(self, rhs: Self) -> Self {
                    self.wrapping_add(rhs)
                }

                fn minus(self, rhs: Self) -> Self {
                    self.wrapping_sub(rhs)
                }

                fn times(self, rhs: Self) -> Self {
                    self.wrapping_mul(rhs)
                }

                fn divided_by(self, rhs: Self) -> Result<Self, FlowError> {
                    if rhs == 0 {
                        return Err(FlowError::DivisionByZero);
                    }
                    Ok(self.wrapping_div(rhs))
                }

                fn remainder(self, rhs: Self) -> Result<Self, FlowError> {
                    if rhs == 0 {
                        return Err(FlowError::DivisionByZero);
                    }
                    Ok(self.wrapping_rem(rhs))
                }
            }
        )*
    };
}

macro_rules! floating_cell_number {
    ($($ty:ty),* $(,)?) => {
        $(
            impl CellNumber for $ty {
                fn plus(self, rhs: Self) -> Self {
                    self + rhs
                }

                fn minus(self, rhs: Self) -> Self {
                    self - rhs
                }

                fn times(self, rhs: Self) -> Self {
                    self * rhs
                }

                fn divided_by(self, rhs: Self) -> Result<Self, FlowError> {
                    Ok(self / rhs)
                }

                fn remainder(self, rhs: Self) -> Result<Self, FlowError> {
                    Ok(self % rhs)
                }
            }
        )*
    };
}

integral_cell_number!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);
floating_cell_number!(f32, f64);

impl<N: CellNumber> FlowCell<N> {
    pub async fn add_assign(&self, rhs: N) {
        self.update(|value| *value = value.plus(rhs)).await;
    }

    pub async fn sub_assign(&self, rhs: N) {
        self.update(|value| *value = value.minus(rhs)).await;
    }

    pub async fn mul_assign(&self, rhs: N) {
        self.update(|value| *value = value.times(rhs)).await;
    }

    /// Fails with [`FlowError::DivisionByZero`] on an integral zero divisor,
    /// leaving the value as it was and broadcasting nothing.
    pub async fn div_assign(&self, rhs: N) -> Result<(), FlowError> {
        self.set_with(|value| value.divided_by(rhs)).await
    }

    pub async fn rem_assign(&self, rhs: N) -> Result<(), FlowError> {
        self.set_with(|value| value.remainder(rhs)).await
    }
}

impl FlowCell<bool> {
    pub async fn toggle(&self) {
        self.update(|value| *value = !*value).await;
    }
}

impl<T: Clone> FlowCell<Vec<T>> {
    pub fn len(&self) -> usize {
        self.with(Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.with(Vec::is_empty)
    }

    pub fn get_at(&self, index: usize) -> Option<T> {
        self.with(|items| items.get(index).cloned())
    }

    pub fn contains(&self, item: &T) -> bool
    where
        T: PartialEq,
    {
        self.with(|items| items.contains(item))
    }

    /// Iterates over a snapshot taken now; later writes do not affect it.
    pub fn items(&self) -> std::vec::IntoIter<T> {
        self.get().into_iter()
    }

    pub async fn push(&self, item: T) {
        self.update(|items| items.push(item)).await;
    }

    /// Appends every item and broadcasts once.
    pub async fn extend(&self, items: impl IntoIterator<Item = T>) {
        self.update(|current| current.extend(items)).await;
    }

    /// Replaces the item at `index`. Out-of-range indices are reported and
    /// nothing is broadcast.
    pub async fn set_at(&self, index: usize, item: T) -> Result<(), FlowError> {
        self.try_update(|items| {
            let len = items.len();
            let slot = items
                .get_mut(index)
                .ok_or(FlowError::IndexOutOfBounds { index, len })?;
            *slot = item;
            Ok(())
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn integral_division_truncates() {
        let cell = FlowCell::new(7i32);
        cell.div_assign(2).await.expect("non-zero divisor");
        assert_eq!(cell.get(), 3);

        let negative = FlowCell::new(-7i64);
        negative.div_assign(2).await.expect("non-zero divisor");
        assert_eq!(negative.get(), -3);
        negative.rem_assign(2).await.expect("non-zero divisor");
        assert_eq!(negative.get(), -1);
    }

    #[tokio::test]
    async fn floating_division_keeps_fraction() {
        let cell = FlowCell::new(7.0f64);
        cell.div_assign(2.0).await.expect("floats never fail");
        assert_eq!(cell.get(), 3.5);
    }

    #[tokio::test]
    async fn integral_division_by_zero_is_rejected() {
        let cell = FlowCell::new(9u16);
        let mut subscriber = cell.subscribe(2).expect("subscribe");
        assert_eq!(subscriber.next_value().await, Ok(9));

        assert_eq!(cell.div_assign(0).await, Err(FlowError::DivisionByZero));
        assert_eq!(cell.rem_assign(0).await, Err(FlowError::DivisionByZero));

        assert_eq!(cell.get(), 9);
        assert_eq!(cell.version(), 0);
        assert_eq!(subscriber.try_next_value(), Ok(None));
    }

    #[tokio::test]
    async fn floating_division_by_zero_broadcasts_infinity() {
        let cell = FlowCell::new(1.0f32);
        let mut subscriber = cell.subscribe(2).expect("subscribe");
        cell.div_assign(0.0).await.expect("floats never fail");

        assert_eq!(subscriber.next_value().await, Ok(1.0));
        assert_eq!(subscriber.next_value().await, Ok(f32::INFINITY));

        let nan = FlowCell::new(0.0f64);
        nan.div_assign(0.0).await.expect("floats never fail");
        assert!(nan.get().is_nan());
    }

    #[tokio::test]
    async fn compound_ops_broadcast_once_each() {
        let cell = FlowCell::new(10u8);
        let mut subscriber = cell.subscribe(8).expect("subscribe");

        cell.add_assign(5).await;
        cell.sub_assign(3).await;
        cell.mul_assign(2).await;
        cell.rem_assign(5).await.expect("non-zero divisor");

        let mut seen = Vec::new();
        while let Ok(Some(value)) = subscriber.try_next_value() {
            seen.push(value);
        }
        assert_eq!(seen, vec![10, 15, 12, 24, 4]);
        assert_eq!(cell.version(), 4);
    }

    #[tokio::test]
    async fn integral_overflow_wraps() {
        let cell = FlowCell::new(i8::MAX);
        cell.add_assign(1).await;
        assert_eq!(cell.get(), i8::MIN);
        cell.div_assign(-1).await.expect("non-zero divisor");
        assert_eq!(cell.get(), i8::MIN);
    }

    #[tokio::test]
    async fn toggle_flips_and_broadcasts() {
        let cell = FlowCell::new(false);
        cell.toggle().await;
        assert!(cell.get());
        assert_eq!(cell.version(), 1);
    }

    #[tokio::test]
    async fn collection_reads() {
        let cell = FlowCell::new(vec!["a", "b"]);
        assert_eq!(cell.len(), 2);
        assert!(!cell.is_empty());
        assert!(cell.contains(&"b"));
        assert!(!cell.contains(&"z"));
        assert_eq!(cell.get_at(1), Some("b"));
        assert_eq!(cell.get_at(2), None);
        assert_eq!(cell.items().collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn set_at_replaces_or_reports_bounds() {
        let cell = FlowCell::new(vec![1, 2, 3]);
        cell.set_at(1, 20).await.expect("in range");
        assert_eq!(cell.get(), vec![1, 20, 3]);

        let result = cell.set_at(3, 0).await;
        assert_eq!(
            result,
            Err(FlowError::IndexOutOfBounds { index: 3, len: 3 })
        );
        assert_eq!(cell.version(), 1);
    }

    #[tokio::test]
    async fn extend_is_a_single_broadcast() {
        let cell = FlowCell::new(Vec::<u32>::new());
        let mut subscriber = cell.subscribe(4).expect("subscribe");
        cell.extend([1, 2, 3]).await;

        assert_eq!(subscriber.next_value().await, Ok(vec![]));
        assert_eq!(subscriber.next_value().await, Ok(vec![1, 2, 3]));
        assert_eq!(subscriber.try_next_value(), Ok(None));
    }

    thread_local! {
        static CLONES: std::cell::Cell<usize> = const { std::cell::Cell::new(0) };
    }

    #[derive(Debug, PartialEq)]
    struct Counted(u8);

    impl Clone for Counted {
        fn clone(&self) -> Self {
            CLONES.with(|clones| clones.set(clones.get() + 1));
            Counted(self.0)
        }
    }

    #[tokio::test]
    async fn set_at_edits_in_place() {
        let cell = FlowCell::new(vec![Counted(1), Counted(2), Counted(3)]);
        CLONES.with(|clones| clones.set(0));

        cell.set_at(0, Counted(9)).await.expect("in range");
        // One copy of the list for the broadcast, none for the edit.
        assert_eq!(CLONES.with(std::cell::Cell::get), 3);

        assert!(cell.set_at(7, Counted(0)).await.is_err());
        assert_eq!(CLONES.with(std::cell::Cell::get), 3);
        assert!(cell.with(|items| items[0] == Counted(9)));
    }
}
