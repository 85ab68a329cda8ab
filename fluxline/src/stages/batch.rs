//! Stateful stages: `collect_n` and `reduce`.
//!
//! These are the only static stages that keep state between elements. The
//! state is owned by the stage and mutated through the `&mut` a push already
//! holds, so no interior mutability is involved.

use std::fmt;
use std::marker::PhantomData;

use super::{Emit, Stage};
use crate::pipeline::Flow;

// ============================================================================
// CollectN
// ============================================================================

/// Buffers `N` elements and forwards them as one `[T; N]`.
pub struct CollectN<T, const N: usize> {
    buffer: Vec<T>,
}

/// Creates a batching stage for `N` elements of type `T`.
///
/// Elements of any type convertible into `T` are accepted. `N` must be
/// non-zero; `collect_n::<T, 0>()` does not build.
///
/// # Example
///
/// ```rust
/// use fluxline::prelude::*;
/// use std::cell::RefCell;
///
/// let batches = RefCell::new(Vec::new());
/// let mut pipeline = collect_n::<i64, 2>() >> tap(|b: &[i64; 2]| batches.borrow_mut().push(*b));
///
/// for x in [1_i32, 2, 3] {
///     pipeline.push(x);
/// }
/// assert_eq!(*batches.borrow(), vec![[1, 2]]);
/// ```
///
/// ```rust,compile_fail
/// use fluxline::prelude::*;
///
/// let _ = collect_n::<i32, 0>();
/// ```
pub fn collect_n<T, const N: usize>() -> CollectN<T, N> {
    const { assert!(N > 0, "collect_n needs a non-zero batch size") };
    CollectN {
        buffer: Vec::with_capacity(N),
    }
}

impl<T, const N: usize> CollectN<T, N> {
    /// Returns the elements buffered since the last forwarded batch.
    pub fn pending(&self) -> &[T] {
        &self.buffer
    }

    /// Drops the buffered elements without forwarding them.
    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}

impl<T, const N: usize> Stage for CollectN<T, N> {
    fn name(&self) -> &'static str {
        "collect_n"
    }
}

impl<X, T, Next, R, const N: usize> Emit<X, Next, R> for CollectN<T, N>
where
    X: Into<T>,
    Next: Flow<[T; N], R>,
{
    fn emit(&mut self, x: X, next: &mut Next) {
        self.buffer.push(x.into());
        if self.buffer.len() < N {
            return;
        }

        let full = std::mem::replace(&mut self.buffer, Vec::with_capacity(N));
        let Ok(batch) = <[T; N]>::try_from(full) else {
            unreachable!("collect_n forwards only once {N} elements are buffered");
        };
        next.push(batch);
    }
}

impl<T, const N: usize> fmt::Debug for CollectN<T, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CollectN")
            .field("size", &N)
            .field("pending", &self.buffer.len())
            .finish()
    }
}

// ============================================================================
// Reduce
// ============================================================================

/// Folds elements into an accumulator and forwards whatever the fold yields.
pub struct Reduce<A, F, Y> {
    acc: A,
    fold: F,
    _output: PhantomData<fn() -> Y>,
}

/// Creates a folding stage.
///
/// `fold` receives the accumulator and the element. Returning `Some(y)`
/// forwards `y`; returning `None` forwards nothing.
///
/// # Example
///
/// ```rust
/// use fluxline::prelude::*;
/// use std::cell::Cell;
///
/// let longest = Cell::new(0);
/// let mut pipeline = reduce(0_usize, |best: &mut usize, word: &str| {
///     (word.len() > *best).then(|| {
///         *best = word.len();
///         *best
///     })
/// }) >> tap(|n: &usize| longest.set(*n));
///
/// for word in ["a", "abc", "ab"] {
///     pipeline.push(word);
/// }
/// assert_eq!(longest.get(), 3);
/// ```
pub fn reduce<A, F, X, Y>(init: A, fold: F) -> Reduce<A, F, Y>
where
    F: FnMut(&mut A, X) -> Option<Y>,
{
    Reduce {
        acc: init,
        fold,
        _output: PhantomData,
    }
}

impl<A, F, Y> Reduce<A, F, Y> {
    /// Returns the current accumulator.
    pub fn accumulator(&self) -> &A {
        &self.acc
    }

    /// Replaces the accumulator and returns the previous one.
    pub fn reset(&mut self, init: A) -> A {
        std::mem::replace(&mut self.acc, init)
    }
}

impl<A, F, Y> Stage for Reduce<A, F, Y> {
    fn name(&self) -> &'static str {
        "reduce"
    }
}

impl<X, A, F, Y, Next, R> Emit<X, Next, R> for Reduce<A, F, Y>
where
    F: FnMut(&mut A, X) -> Option<Y>,
    Next: Flow<Y, R>,
{
    #[inline]
    fn emit(&mut self, x: X, next: &mut Next) {
        if let Some(y) = (self.fold)(&mut self.acc, x) {
            next.push(y);
        }
    }
}

impl<A: fmt::Debug, F, Y> fmt::Debug for Reduce<A, F, Y> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reduce")
            .field("acc", &self.acc)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::Pipeline;
    use crate::routing::I0;
    use crate::testing::Recorder;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_collect_n_forwards_full_batches() {
        let recorder = Recorder::new();
        let mut pipeline = collect_n::<i32, 3>() >> recorder.sink();

        for x in [-5_i32, 102, 33, 7, 8] {
            pipeline.push(x);
        }
        assert_eq!(recorder.values(), vec![[-5, 102, 33]]);
        assert_eq!(pipeline.stage::<I0>().pending(), &[7, 8]);
    }

    #[test]
    fn test_collect_n_partial_batch_forwards_nothing() {
        let recorder = Recorder::new();
        let mut pipeline = collect_n::<i32, 3>() >> recorder.sink();

        pipeline.push(1_i32);
        pipeline.push(2_i32);
        assert!(recorder.is_empty());
    }

    #[test]
    fn test_collect_n_converts_elements() {
        let recorder = Recorder::new();
        let mut pipeline = collect_n::<f64, 2>() >> recorder.sink();

        pipeline.push(1_u8);
        pipeline.push(2.5_f32);
        assert_eq!(recorder.values(), vec![[1.0, 2.5]]);
    }

    #[test]
    fn test_collect_n_forwards_every_element_once() {
        let recorder = Recorder::new();
        let mut pipeline = collect_n::<String, 2>() >> recorder.sink();

        for word in ["a", "b", "c", "d", "e", "f"] {
            pipeline.push(word);
        }
        assert_eq!(
            recorder.values(),
            vec![
                ["a".to_string(), "b".to_string()],
                ["c".to_string(), "d".to_string()],
                ["e".to_string(), "f".to_string()],
            ]
        );
        assert!(pipeline.stage::<I0>().pending().is_empty());
    }

    #[test]
    fn test_collect_n_clear() {
        let recorder = Recorder::new();
        let mut pipeline = collect_n::<u32, 2>() >> recorder.sink();

        pipeline.push(1_u32);
        pipeline.stage_mut::<I0>().clear();
        pipeline.push(2_u32);
        pipeline.push(3_u32);
        assert_eq!(recorder.values(), vec![[2, 3]]);
    }

    #[test]
    fn test_reduce_emits_once_threshold_crossed() {
        let recorder = Recorder::new();
        let mut pipeline = reduce(0, |acc: &mut i32, x: i32| {
            *acc += x;
            (*acc > 6).then_some(*acc)
        }) >> recorder.sink();

        for x in [3, 2, 7] {
            pipeline.push(x);
        }
        assert_eq!(recorder.values(), vec![12]);
        assert_eq!(*pipeline.stage::<I0>().accumulator(), 12);
    }

    #[test]
    fn test_reduce_reset() {
        let mut pipeline = Pipeline::new(reduce(Vec::new(), |seen: &mut Vec<char>, c: char| {
            seen.push(c);
            None::<()>
        }));

        pipeline.push('a');
        pipeline.push('b');
        let previous = pipeline.stage_mut::<I0>().reset(Vec::new());
        assert_eq!(previous, vec!['a', 'b']);
        assert!(pipeline.stage::<I0>().accumulator().is_empty());
    }
}
