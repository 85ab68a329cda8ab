//! Branch stages: `part` tees into a sub-pipeline, `join` merges one back.

use std::fmt;

use super::{Emit, Stage};
use crate::pipeline::{Append, End, Flow, IntoPipeline, Last, Via};

// ============================================================================
// Part
// ============================================================================

/// Tee with discard.
///
/// The sub-pipeline receives a clone of every element. Whatever it computes
/// stays inside it; the original element continues on the main path.
///
/// The sub-pipeline's head must take the element itself. A `()` handed to a
/// branch is never swallowed by the sub-pipeline, so a unit-returning `map`
/// followed by a branch simply drops its output.
pub struct Part<P> {
    sub: P,
}

/// Creates a tee into `sub`, which may be a single stage or a pipeline.
///
/// # Example
///
/// ```rust
/// use fluxline::prelude::*;
/// use std::cell::Cell;
///
/// let branch = Cell::new(0);
/// let main = Cell::new(0);
/// let mut pipeline = part(map(|x: i32| x * 100) >> tap(|x: &i32| branch.set(*x)))
///     >> tap(|x: &i32| main.set(*x));
///
/// pipeline.push(3);
/// assert_eq!(branch.get(), 300);
/// assert_eq!(main.get(), 3);
/// ```
pub fn part<P: IntoPipeline>(sub: P) -> Part<P::Pipeline> {
    Part {
        sub: sub.into_pipeline(),
    }
}

impl<P> Part<P> {
    /// Returns the embedded sub-pipeline.
    pub fn sub(&self) -> &P {
        &self.sub
    }
}

impl<P> Stage for Part<P> {
    fn name(&self) -> &'static str {
        "part"
    }
}

impl<X, P, Next, RS, R> Emit<X, Next, (RS, R)> for Part<P>
where
    X: Clone,
    P: Flow<X, Via<RS>>,
    Next: Flow<X, R>,
{
    #[inline]
    fn emit(&mut self, x: X, next: &mut Next) {
        self.sub.push(x.clone());
        next.push(x);
    }
}

impl<P> fmt::Debug for Part<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Part").finish_non_exhaustive()
    }
}

// ============================================================================
// Capture
// ============================================================================

/// Terminal stage appended to a joined sub-pipeline.
///
/// Buffers every value the sub-pipeline produces until the owning [`Join`]
/// forwards them.
pub struct Capture<Y> {
    items: Vec<Y>,
}

impl<Y> Capture<Y> {
    fn new() -> Self {
        Self { items: Vec::new() }
    }
}

impl<Y> Stage for Capture<Y> {
    fn name(&self) -> &'static str {
        "capture"
    }
}

impl<Y> Emit<Y, End, ()> for Capture<Y> {
    #[inline]
    fn emit(&mut self, y: Y, _next: &mut End) {
        self.items.push(y);
    }
}

impl<Y> fmt::Debug for Capture<Y> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Capture")
            .field("pending", &self.items.len())
            .finish()
    }
}

// ============================================================================
// Join
// ============================================================================

/// Tee with merge.
///
/// The element goes into the sub-pipeline, and every value the sub-pipeline
/// emits continues into the main pipeline, in order. An input may produce no
/// value (the sub-pipeline filtered it), one, or several (the sub-pipeline
/// flattened or batched it).
///
/// The values of one input are forwarded after its sub-pipeline returns. An
/// input that unwinds out of the sub-pipeline forwards nothing, and what it
/// produced before unwinding is discarded with the next input.
pub struct Join<P, Y> {
    sub: P,
    _output: std::marker::PhantomData<fn() -> Y>,
}

/// Creates a merge through `sub`, whose output replaces the element on the
/// main path.
///
/// # Example
///
/// ```rust
/// use fluxline::prelude::*;
/// use std::cell::RefCell;
///
/// let out = RefCell::new(Vec::new());
/// let mut pipeline = join(filter(|x: &i32| *x > 0) >> map(|x: i32| x.to_string()))
///     >> tap(|s: &String| out.borrow_mut().push(s.clone()));
///
/// pipeline.push(-1);
/// pipeline.push(42);
/// assert_eq!(*out.borrow(), vec!["42".to_string()]);
/// ```
pub fn join<P, Y>(sub: P) -> Join<<P::Pipeline as Append<Capture<Y>>>::Output, Y>
where
    P: IntoPipeline,
    P::Pipeline: Append<Capture<Y>>,
{
    Join {
        sub: sub.into_pipeline().append(Capture::new()),
        _output: std::marker::PhantomData,
    }
}

impl<P, Y> Join<P, Y> {
    /// Returns the embedded sub-pipeline, including its capture stage.
    pub fn sub(&self) -> &P {
        &self.sub
    }
}

impl<P, Y> Stage for Join<P, Y> {
    fn name(&self) -> &'static str {
        "join"
    }
}

impl<X, Y, P, Next, RS, R> Emit<X, Next, (RS, R)> for Join<P, Y>
where
    P: Flow<X, Via<RS>> + Last<Stage = Capture<Y>>,
    Next: Flow<Y, R>,
{
    fn emit(&mut self, x: X, next: &mut Next) {
        // Left over when the previous input unwound out of the sub-pipeline.
        self.sub.last_mut().items.clear();
        self.sub.push(x);
        for y in self.sub.last_mut().items.drain(..) {
            next.push(y);
        }
    }
}

impl<P, Y> fmt::Debug for Join<P, Y> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Join").finish_non_exhaustive()
    }
}
