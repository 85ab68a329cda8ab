//! Build-time routing.
//!
//! Positions and routes are types. The compiler resolves them while checking
//! a `push`, so a routed element costs exactly one direct call per stage it
//! visits and nothing for the stages it skips.
//!
//! # Build-time failures
//!
//! A stage that cannot take what the previous one forwards:
//!
//! ```rust,compile_fail
//! use fluxline::prelude::*;
//!
//! let mut pipeline = map(|x: i32| x) >> tap(|s: &String| drop(s.len()));
//! pipeline.push(1);
//! ```
//!
//! A `seek` with no stage ahead able to accept the element:
//!
//! ```rust,compile_fail
//! use fluxline::prelude::*;
//!
//! let mut pipeline = seek() >> map(|x: i32| x + 1) >> map(|x: i32| x * 2);
//! pipeline.push("text");
//! ```
//!
//! # Ties
//!
//! The destination of a search is the closest stage accepting the element.
//! The trait solver has no notion of "closest": it sees one candidate route
//! per accepting stage and cannot prefer one of them, since that would need
//! to prove the stages in between do not accept. A search with two
//! candidates is therefore rejected as ambiguous:
//!
//! ```rust,compile_fail
//! use fluxline::prelude::*;
//!
//! let mut pipeline = seek() >> filter(|x: &i32| *x > 0) >> map(|x: i32| x * 2);
//! pipeline.push(5_i32);
//! ```
//!
//! The position is then written out. [`seek_to`] routes to a fixed stage,
//! and the searches take the route as their last parameter: `Here<_>` for
//! the first stage searched, `There<Here<_>>` for the one after it, and so
//! on. The compiler still checks that the named stage accepts the element.
//!
//! ```rust
//! use fluxline::prelude::*;
//! use fluxline::routing::Here;
//! use std::cell::Cell;
//!
//! let doubled = Cell::new(0);
//! let mut pipeline = seek_to::<I0>()
//!     >> filter(|x: &i32| *x > 0)
//!     >> map(|x: i32| doubled.set(x * 2));
//!
//! pipeline.push(5_i32);
//! pipeline.push(-5_i32);
//! assert_eq!(doubled.get(), 10);
//! assert_eq!(pipeline.find_next::<I0, i32, Here<_>>(), 1);
//! ```

use std::fmt;
use std::marker::PhantomData;

use crate::pipeline::{End, Halt, Pipeline, Suffix};
use crate::stages::{Emit, Stage};

// ============================================================================
// Positions
// ============================================================================

/// Type-level zero.
#[derive(Debug, Clone, Copy, Default)]
pub struct Zero;

/// Type-level successor.
#[derive(Debug, Clone, Copy, Default)]
pub struct Succ<N>(PhantomData<N>);

/// A type-level natural number.
pub trait Nat {
    /// The number as a value.
    const VALUE: usize;
}

impl Nat for Zero {
    const VALUE: usize = 0;
}

impl<N: Nat> Nat for Succ<N> {
    const VALUE: usize = N::VALUE + 1;
}

/// Position 0.
pub type I0 = Zero;
/// Position 1.
pub type I1 = Succ<I0>;
/// Position 2.
pub type I2 = Succ<I1>;
/// Position 3.
pub type I3 = Succ<I2>;
/// Position 4.
pub type I4 = Succ<I3>;
/// Position 5.
pub type I5 = Succ<I4>;
/// Position 6.
pub type I6 = Succ<I5>;
/// Position 7.
pub type I7 = Succ<I6>;

// ============================================================================
// Routes
// ============================================================================

/// Route: the current stage takes the element and continues along `R`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Here<R>(PhantomData<R>);

/// Route: skip the current stage and search along `R`.
#[derive(Debug, Clone, Copy, Default)]
pub struct There<R>(PhantomData<R>);

/// Offset of the stage a search route ends on.
pub trait Position {
    /// Distance from where the search started.
    const INDEX: usize;
}

impl<R> Position for Here<R> {
    const INDEX: usize = 0;
}

impl<R: Position> Position for There<R> {
    const INDEX: usize = 1 + R::INDEX;
}

/// Forward search: delivers `X` to the first stage of this pipeline able to
/// accept it.
///
/// There is no impl for [`End`], so a search that runs off the end of the
/// pipeline does not compile.
#[diagnostic::on_unimplemented(
    message = "no stage in `{Self}` can accept `{X}`",
    label = "`seek` found no destination for `{X}`",
    note = "add a stage taking `{X}` after the `seek`"
)]
pub trait Locate<X, R> {
    /// Delivers `x` to the located stage.
    fn deliver(&mut self, x: X);
}

impl<X, S, Rest, R> Locate<X, Here<R>> for Pipeline<S, Rest>
where
    S: Emit<X, Rest, R>,
{
    #[inline]
    fn deliver(&mut self, x: X) {
        self.stage.emit(x, &mut self.rest);
    }
}

impl<X, S, Rest, R> Locate<X, There<R>> for Pipeline<S, Rest>
where
    Rest: Locate<X, R>,
{
    #[inline]
    fn deliver(&mut self, x: X) {
        self.rest.deliver(x);
    }
}

/// Backward search: finds a stage before position `N` able to accept `X`.
#[diagnostic::on_unimplemented(
    message = "no stage of `{Self}` before the given position can accept `{X}`"
)]
pub trait LocateBefore<X, N, R> {}

impl<X, N, S, Rest, R> LocateBefore<X, Succ<N>, Here<R>> for Pipeline<S, Rest> where
    S: Emit<X, Rest, R>
{
}

impl<X, N, S, Rest, R> LocateBefore<X, Succ<N>, There<R>> for Pipeline<S, Rest> where
    Rest: LocateBefore<X, N, R>
{
}

impl<S, Rest> Pipeline<S, Rest> {
    /// Returns the position of the stage after `I` that accepts `X`.
    ///
    /// `R` is counted from position `I + 1`; pin it as described in the
    /// module docs when more than one stage qualifies.
    ///
    /// # Example
    ///
    /// ```rust
    /// use fluxline::prelude::*;
    ///
    /// let pipeline = seek() >> map(|x: i32| x.to_string()) >> map(|s: String| s.len());
    /// assert_eq!(pipeline.find_next::<I0, String, _>(), 2);
    /// assert_eq!(pipeline.find_next::<I0, i32, _>(), 1);
    /// ```
    pub fn find_next<I, X, R>(&self) -> usize
    where
        I: Nat,
        R: Position,
        Self: Suffix<Succ<I>>,
        <Self as Suffix<Succ<I>>>::Tail: Locate<X, R>,
    {
        I::VALUE + 1 + R::INDEX
    }

    /// Returns the position of the stage before `I` that accepts `X`.
    ///
    /// `R` is counted from position 0. With several candidates, pin the
    /// closest one, e.g. `There<Here<_>>` for position 1.
    pub fn find_prev<I, X, R>(&self) -> usize
    where
        R: Position,
        Self: LocateBefore<X, I, R>,
    {
        R::INDEX
    }
}

// ============================================================================
// Seek
// ============================================================================

/// Pure router: hands the element straight to the next stage able to accept
/// it. The stages in between never see it.
///
/// As the last stage of a pipeline, `seek` is terminal. When several stages
/// ahead accept the element, use [`seek_to`] instead.
#[derive(Debug, Clone, Copy, Default)]
pub struct Seek;

/// Creates a seek stage.
///
/// # Example
///
/// ```rust
/// use fluxline::prelude::*;
/// use std::cell::Cell;
///
/// let numbers = Cell::new(0);
/// let words = Cell::new(0);
/// let mut pipeline = seek()
///     >> map(|x: i32| numbers.set(numbers.get() + x))
///     >> map(|s: &str| words.set(words.get() + s.len()));
///
/// pipeline.push(5);
/// pipeline.push("four");
/// assert_eq!(numbers.get(), 5);
/// assert_eq!(words.get(), 4);
/// ```
pub fn seek() -> Seek {
    Seek
}

impl Stage for Seek {
    fn name(&self) -> &'static str {
        "seek"
    }
}

impl<X> Emit<X, End, Halt> for Seek {
    #[inline]
    fn emit(&mut self, _x: X, _next: &mut End) {}
}

impl<X, S, Rest, R> Emit<X, Pipeline<S, Rest>, R> for Seek
where
    Pipeline<S, Rest>: Locate<X, R>,
{
    #[inline]
    fn emit(&mut self, x: X, next: &mut Pipeline<S, Rest>) {
        next.deliver(x);
    }
}

composable!([] Seek);

impl fmt::Display for Seek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Router with a fixed destination: the stage `I` positions after it, `I0`
/// being the next one.
pub struct SeekTo<I> {
    _offset: PhantomData<fn() -> I>,
}

/// Creates a router to the stage at offset `I`.
///
/// The destination must accept the element, so a misplaced offset does not
/// build:
///
/// ```rust,compile_fail
/// use fluxline::prelude::*;
///
/// let mut pipeline = seek_to::<I1>() >> map(|x: i32| x) >> map(|s: String| s);
/// pipeline.push(1_i32);
/// ```
pub fn seek_to<I>() -> SeekTo<I> {
    SeekTo {
        _offset: PhantomData,
    }
}

impl<I> Stage for SeekTo<I> {
    fn name(&self) -> &'static str {
        "seek_to"
    }
}

impl<X, I, Next, R> Emit<X, Next, R> for SeekTo<I>
where
    Next: Suffix<I>,
    <Next as Suffix<I>>::Tail: Locate<X, Here<R>>,
{
    #[inline]
    fn emit(&mut self, x: X, next: &mut Next) {
        next.suffix_mut().deliver(x);
    }
}

composable!([I,] SeekTo<I>);

impl<I: Nat> fmt::Debug for SeekTo<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SeekTo").field("offset", &I::VALUE).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stages::{filter, map};
    use crate::testing::Recorder;
    use pretty_assertions::assert_eq;

    #[derive(Debug, Clone, PartialEq)]
    struct Point {
        x: i32,
        y: i32,
    }

    #[test]
    fn test_nat_values() {
        assert_eq!(I0::VALUE, 0);
        assert_eq!(I3::VALUE, 3);
        assert_eq!(I7::VALUE, 7);
    }

    #[test]
    fn test_seek_skips_intermediate_stages() {
        let skipped = Recorder::<i32>::new();
        let target = Recorder::<i32>::new();
        let mut pipeline = seek() >> skipped.sink() >> map(|p: Point| p.x + p.y) >> target.sink();

        pipeline.push(Point { x: 2, y: 3 });
        assert!(skipped.is_empty());
        assert_eq!(target.values(), vec![5]);
    }

    #[test]
    fn test_seek_routes_each_type_separately() {
        let floats = Recorder::new();
        let points = Recorder::new();
        let f = floats.clone();
        let p = points.clone();
        let mut pipeline = seek()
            >> map(move |d: f64| f.record(d))
            >> map(move |pt: Point| p.record(pt));

        pipeline.push(1.5);
        pipeline.push(Point { x: 1, y: -1 });
        pipeline.push(2.5);
        assert_eq!(floats.values(), vec![1.5, 2.5]);
        assert_eq!(points.values(), vec![Point { x: 1, y: -1 }]);
    }

    #[test]
    fn test_seek_as_last_stage_is_terminal() {
        let before = Recorder::new();
        let mut pipeline = before.sink() >> seek();

        pipeline.push('q');
        assert_eq!(before.values(), vec!['q']);
    }

    #[test]
    fn test_find_next_positions() {
        let pipeline = map(|x: u8| x)
            >> seek()
            >> map(|_: String| ())
            >> map(|_: Point| ())
            >> map(|_: u8| ());

        assert_eq!(pipeline.find_next::<I1, Point, _>(), 3);
        assert_eq!(pipeline.find_next::<I1, String, _>(), 2);
        assert_eq!(pipeline.find_next::<I1, u8, _>(), 4);
        assert_eq!(pipeline.find_next::<I2, u8, _>(), 4);
    }

    #[test]
    fn test_find_prev_positions() {
        let pipeline = map(|_: String| ())
            >> map(|_: Point| ())
            >> seek()
            >> map(|_: u8| ());

        assert_eq!(pipeline.find_prev::<I3, String, _>(), 0);
        assert_eq!(pipeline.find_prev::<I3, Point, _>(), 1);
        assert_eq!(pipeline.find_prev::<I2, Point, _>(), 1);
    }

    #[test]
    fn test_seek_to_picks_the_named_stage() {
        let gated = Recorder::new();
        let direct = Recorder::new();
        let (g, d) = (gated.clone(), direct.clone());
        let mut closest = seek_to::<I0>()
            >> filter(|x: &i32| x % 2 == 0)
            >> map(move |x: i32| g.record(x));
        let mut skipping = seek_to::<I1>()
            >> filter(|x: &i32| x % 2 == 0)
            >> map(move |x: i32| d.record(x));

        for x in [4, 5] {
            closest.push(x);
            skipping.push(x);
        }
        assert_eq!(gated.values(), vec![4]);
        assert_eq!(direct.values(), vec![4, 5]);
        assert_eq!(closest.names(), vec!["seek_to", "filter", "map"]);
        assert_eq!(format!("{:?}", closest.head()), "SeekTo { offset: 0 }");
    }

    #[test]
    fn test_pinned_search_returns_the_closest_position() {
        let after = seek() >> filter(|x: &i32| *x > 0) >> map(|_: i32| ());
        assert_eq!(after.find_next::<I0, i32, Here<_>>(), 1);
        assert_eq!(after.find_next::<I0, i32, There<Here<_>>>(), 2);

        let before = map(|_: i32| ())
            >> map(|_: i32| ())
            >> seek()
            >> map(|_: u8| ());
        assert_eq!(before.find_prev::<I3, i32, There<Here<_>>>(), 1);
        assert_eq!(before.find_prev::<I3, i32, Here<_>>(), 0);
    }

    #[test]
    fn test_seek_display() {
        assert_eq!(seek().to_string(), "seek");
    }
}
