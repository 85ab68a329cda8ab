//! The `flat` stage.

use super::{Emit, Stage};
use crate::pipeline::Flow;

/// Forwards every item of an iterable element, one push per item.
///
/// Owned collections are consumed. Borrowed ones (`&Vec<T>`, `&[T]`) are
/// iterated in place and forward `&T` items, so nothing is copied.
#[derive(Debug, Clone, Copy, Default)]
pub struct Flat;

/// Creates a flattening stage.
///
/// # Example
///
/// ```rust
/// use fluxline::prelude::*;
/// use std::cell::Cell;
///
/// let sum = Cell::new(0);
/// let mut pipeline = flat() >> tap(|x: &i32| sum.set(sum.get() + x));
///
/// pipeline.push([1, 14, 0, 33]);
/// assert_eq!(sum.get(), 48);
/// ```
pub fn flat() -> Flat {
    Flat
}

impl Stage for Flat {
    fn name(&self) -> &'static str {
        "flat"
    }
}

impl<X, Next, R> Emit<X, Next, R> for Flat
where
    X: IntoIterator,
    Next: Flow<X::Item, R>,
{
    #[inline]
    fn emit(&mut self, x: X, next: &mut Next) {
        for item in x {
            next.push(item);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::Pipeline;
    use crate::stages::{map, reduce};
    use crate::testing::Recorder;
    use pretty_assertions::assert_eq;
    use std::collections::BTreeSet;

    #[test]
    fn test_flat_preserves_order() {
        let recorder = Recorder::new();
        let mut pipeline = flat() >> recorder.sink();

        pipeline.push(vec!['x', 'y', 'z']);
        assert_eq!(recorder.values(), vec!['x', 'y', 'z']);
    }

    #[test]
    fn test_flat_borrowed_collection() {
        let recorder = Recorder::new();
        let external = vec![10, 20, 30, -8];
        let mut pipeline = flat() >> map(|x: &i32| *x) >> recorder.sink();

        pipeline.push(&external);
        assert_eq!(recorder.values().iter().sum::<i32>(), 52);
        assert_eq!(external.len(), 4);
    }

    #[test]
    fn test_flat_slice_into_reduce() {
        let recorder = Recorder::new();
        let data = [4_u64, 5, 6];
        let mut pipeline = flat()
            >> reduce(0_u64, |acc: &mut u64, x: &u64| {
                *acc += x;
                Some(*acc)
            })
            >> recorder.sink();

        pipeline.push(&data[..]);
        assert_eq!(recorder.values(), vec![4, 9, 15]);
    }

    #[test]
    fn test_flat_as_last_stage_consumes() {
        let mut pipeline = Pipeline::new(flat());
        pipeline.push(BTreeSet::from([3, 1, 2]));
        pipeline.push(Vec::<String>::new());
    }

    #[test]
    fn test_flat_empty_forwards_nothing() {
        let recorder: Recorder<i32> = Recorder::new();
        let mut pipeline = flat() >> recorder.sink();

        pipeline.push(Vec::<i32>::new());
        assert!(recorder.is_empty());
    }
}
