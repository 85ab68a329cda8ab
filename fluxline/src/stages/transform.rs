//! Element-wise stages: `filter`, `map`, `static_map` and `tap`.

use std::fmt;
use std::marker::PhantomData;

use super::{Emit, Stage};
use crate::pipeline::Flow;

// ============================================================================
// Filter
// ============================================================================

/// Forwards the element unchanged when the predicate holds.
///
/// # Example
///
/// ```rust
/// use fluxline::prelude::*;
/// use std::cell::Cell;
///
/// let hits = Cell::new(0);
/// let mut pipeline = filter(|x: &i32| *x % 2 == 0) >> tap(|_: &i32| hits.set(hits.get() + 1));
/// for x in 0..10 {
///     pipeline.push(x);
/// }
/// assert_eq!(hits.get(), 5);
/// ```
pub struct Filter<F> {
    predicate: F,
}

/// Creates a filter stage.
pub fn filter<F>(predicate: F) -> Filter<F> {
    Filter { predicate }
}

impl<F> Stage for Filter<F> {
    fn name(&self) -> &'static str {
        "filter"
    }
}

impl<X, F, Next, R> Emit<X, Next, R> for Filter<F>
where
    F: FnMut(&X) -> bool,
    Next: Flow<X, R>,
{
    #[inline]
    fn emit(&mut self, x: X, next: &mut Next) {
        if (self.predicate)(&x) {
            next.push(x);
        }
    }
}

impl<F> fmt::Debug for Filter<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Filter").finish_non_exhaustive()
    }
}

// ============================================================================
// Map
// ============================================================================

/// Forwards the result of a function applied to the element.
///
/// A function returning `()` produces no output and the `()` is dropped.
/// Branch stages never take a `()`, so `part` and `join` may follow. A next
/// stage whose own closure takes `()` leaves two routes open and the push is
/// rejected as ambiguous:
///
/// ```rust,compile_fail
/// use fluxline::prelude::*;
///
/// let mut pipeline = map(|_: i32| ()) >> tap(|_: &()| {});
/// pipeline.push(1);
/// ```
pub struct Map<F> {
    f: F,
}

/// Creates a map stage.
pub fn map<F>(f: F) -> Map<F> {
    Map { f }
}

impl<F> Stage for Map<F> {
    fn name(&self) -> &'static str {
        "map"
    }
}

impl<X, Y, F, Next, R> Emit<X, Next, R> for Map<F>
where
    F: FnMut(X) -> Y,
    Next: Flow<Y, R>,
{
    #[inline]
    fn emit(&mut self, x: X, next: &mut Next) {
        next.push((self.f)(x));
    }
}

impl<F> fmt::Debug for Map<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Map").finish_non_exhaustive()
    }
}

// ============================================================================
// StaticMap
// ============================================================================

/// Converts the element with `Into` and forwards the converted value.
///
/// Unlike the closure stages, the accepted type is declared up front.
pub struct StaticMap<X, Y> {
    _types: PhantomData<fn(X) -> Y>,
}

/// Creates a conversion stage from `X` to `Y`.
///
/// # Example
///
/// ```rust
/// use fluxline::prelude::*;
/// use std::cell::Cell;
///
/// let seen = Cell::new(0_i64);
/// let mut pipeline = static_map::<i32, i64>() >> tap(|x: &i64| seen.set(*x));
/// pipeline.push(-7_i32);
/// assert_eq!(seen.get(), -7);
/// ```
pub fn static_map<X, Y>() -> StaticMap<X, Y>
where
    X: Into<Y>,
{
    StaticMap {
        _types: PhantomData,
    }
}

impl<X, Y> Stage for StaticMap<X, Y> {
    fn name(&self) -> &'static str {
        "static_map"
    }
}

impl<X, Y, Next, R> Emit<X, Next, R> for StaticMap<X, Y>
where
    X: Into<Y>,
    Next: Flow<Y, R>,
{
    #[inline]
    fn emit(&mut self, x: X, next: &mut Next) {
        next.push(x.into());
    }
}

impl<X, Y> fmt::Debug for StaticMap<X, Y> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticMap")
            .field("from", &std::any::type_name::<X>())
            .field("to", &std::any::type_name::<Y>())
            .finish()
    }
}

// ============================================================================
// Tap
// ============================================================================

/// Runs a side effect on the element, then forwards it unchanged.
pub struct Tap<F> {
    f: F,
}

/// Creates a tap stage.
pub fn tap<F>(f: F) -> Tap<F> {
    Tap { f }
}

impl<F> Stage for Tap<F> {
    fn name(&self) -> &'static str {
        "tap"
    }
}

impl<X, F, Next, R> Emit<X, Next, R> for Tap<F>
where
    F: FnMut(&X),
    Next: Flow<X, R>,
{
    #[inline]
    fn emit(&mut self, x: X, next: &mut Next) {
        (self.f)(&x);
        next.push(x);
    }
}

impl<F> fmt::Debug for Tap<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tap").finish_non_exhaustive()
    }
}
