//! The propagation contract.

use super::{End, Pipeline};
use crate::stages::Emit;

/// Route marker: the element reached [`End`] and is dropped.
#[derive(Debug, Clone, Copy, Default)]
pub struct Halt;

/// Route marker: the head stage accepts the element and continues along `R`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Via<R>(std::marker::PhantomData<R>);

/// Route marker: a `()` output that no following stage accepts is dropped.
#[derive(Debug, Clone, Copy, Default)]
pub struct Discard;

/// Something an element of type `X` can be pushed into.
///
/// `R` is the route the element takes. It is never written by hand: the
/// compiler infers it, and the impl only exists if every hop along the way is
/// accepted by the stage that receives it.
#[diagnostic::on_unimplemented(
    message = "`{Self}` cannot accept elements of type `{X}`",
    label = "no stage here accepts `{X}`",
    note = "closures passed to stages need annotated parameter types, e.g. `map(|x: i32| x + 1)`"
)]
pub trait Flow<X, R> {
    /// Propagates `x` through the remaining stages.
    fn push(&mut self, x: X);
}

impl<X> Flow<X, Halt> for End {
    #[inline]
    fn push(&mut self, _x: X) {}
}

impl<X, S, Rest, R> Flow<X, Via<R>> for Pipeline<S, Rest>
where
    S: Emit<X, Rest, R>,
{
    #[inline]
    fn push(&mut self, x: X) {
        self.stage.emit(x, &mut self.rest);
    }
}

impl<S, Rest> Flow<(), Discard> for Pipeline<S, Rest> {
    #[inline]
    fn push(&mut self, (): ()) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stages::{map, tap};
    use std::cell::Cell;

    fn drive<P: Flow<i32, R>, R>(pipeline: &mut P, x: i32) {
        pipeline.push(x);
    }

    #[test]
    fn test_end_drops_anything() {
        let mut end = End;
        Flow::<_, Halt>::push(&mut end, "ignored");
        Flow::<_, Halt>::push(&mut end, vec![1, 2, 3]);
    }

    #[test]
    fn test_generic_flow_bound() {
        let seen = Cell::new(0);
        let mut pipeline = map(|x: i32| x - 1) >> tap(|x: &i32| seen.set(*x));
        drive(&mut pipeline, 10);
        assert_eq!(seen.get(), 9);
    }

    #[test]
    fn test_unit_output_is_discarded() {
        let count = Cell::new(0);
        let reached = Cell::new(false);
        let mut pipeline =
            map(|_: i32| count.set(count.get() + 1)) >> tap(|_: &i32| reached.set(true));

        pipeline.push(1);
        pipeline.push(2);
        assert_eq!(count.get(), 2);
        assert!(!reached.get());
    }
}
