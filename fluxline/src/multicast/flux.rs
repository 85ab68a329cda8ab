//! The runtime-mutable multicast entry point.
//!
//! A `Flux<(X1, .., Xn)>` holds one [`Burst`] per declared type, laid out as
//! a typed lane list, plus a `Burst<Failure>` for exception handlers. The
//! lane an emitted value goes to is picked by the compiler.

use std::any::type_name;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use tracing::{debug, warn};

use super::{Burst, BoundEntry, Failure, FluxConfig, IntoBound, Token, UnhandledFailure};
use crate::errors::FluxError;
use crate::pipeline::{Flow, IntoPipeline};
use crate::routing::{Succ, Zero};

// ============================================================================
// Lanes
// ============================================================================

/// Terminator of a lane list.
#[derive(Debug, Default)]
pub struct LaneEnd;

/// One declared type's burst, followed by the remaining lanes.
pub struct Lane<T, Rest> {
    burst: Burst<T>,
    rest: Rest,
}

impl<T, Rest: Default> Default for Lane<T, Rest> {
    fn default() -> Self {
        Self {
            burst: Burst::new(),
            rest: Rest::default(),
        }
    }
}

impl<T, Rest: fmt::Debug> fmt::Debug for Lane<T, Rest> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lane")
            .field("burst", &self.burst)
            .field("rest", &self.rest)
            .finish()
    }
}

/// Operations shared by every lane list.
pub trait LaneSet: Default {
    /// Removes every entry carrying `token` from every lane.
    fn detach(&mut self, token: Token) -> bool;

    /// Returns whether any lane holds an entry carrying `token`.
    fn contains(&self, token: Token) -> bool;

    /// Appends the entry count of every lane.
    fn counts(&self, out: &mut Vec<(&'static str, usize)>);
}

impl LaneSet for LaneEnd {
    fn detach(&mut self, _token: Token) -> bool {
        false
    }

    fn contains(&self, _token: Token) -> bool {
        false
    }

    fn counts(&self, _out: &mut Vec<(&'static str, usize)>) {}
}

impl<T, Rest: LaneSet> LaneSet for Lane<T, Rest> {
    fn detach(&mut self, token: Token) -> bool {
        let here = self.burst.detach(token);
        let later = self.rest.detach(token);
        here || later
    }

    fn contains(&self, token: Token) -> bool {
        self.burst.contains(token) || self.rest.contains(token)
    }

    fn counts(&self, out: &mut Vec<(&'static str, usize)>) {
        out.push((type_name::<T>(), self.burst.len()));
        self.rest.counts(out);
    }
}

/// Maps a tuple of declared types to its lane list.
pub trait Lanes {
    /// The lane list.
    type Set: LaneSet;
}

macro_rules! lanes {
    ($($t:ident),+) => {
        impl<$($t),+> Lanes for ($($t,)+) {
            type Set = lanes!(@set $($t),+);
        }
    };
    (@set $head:ident $(, $tail:ident)*) => {
        Lane<$head, lanes!(@set $($tail),*)>
    };
    (@set) => {
        LaneEnd
    };
}

lanes!(A);
lanes!(A, B);
lanes!(A, B, C);
lanes!(A, B, C, D);
lanes!(A, B, C, D, E);
lanes!(A, B, C, D, E, F);
lanes!(A, B, C, D, E, F, G);
lanes!(A, B, C, D, E, F, G, H);

/// Picks the lane at position `I` for a value of type `V`.
///
/// With `I` inferred, this is implemented only when exactly one declared type
/// can be built from `V`.
#[diagnostic::on_unimplemented(
    message = "this flux has no lane accepting `{V}`",
    label = "`{V}` does not convert into any declared type"
)]
pub trait Dispatch<V, I> {
    /// Fans `value` out on the selected lane, collecting failures.
    fn dispatch(&mut self, value: V, failures: &mut Vec<Failure>);
}

impl<V, T, Rest> Dispatch<V, Zero> for Lane<T, Rest>
where
    V: Into<T>,
    T: Clone,
{
    fn dispatch(&mut self, value: V, failures: &mut Vec<Failure>) {
        self.burst.fan_out_guarded(&value.into(), failures);
    }
}

impl<V, T, Rest, I> Dispatch<V, Succ<I>> for Lane<T, Rest>
where
    Rest: Dispatch<V, I>,
{
    fn dispatch(&mut self, value: V, failures: &mut Vec<Failure>) {
        self.rest.dispatch(value, failures);
    }
}

/// Binds one shared pipeline into every lane of a list.
#[diagnostic::on_unimplemented(
    message = "the pipeline cannot accept every type of this flux",
    note = "start the pipeline with `seek()` to route each type, or attach it to a single lane with `lane()`"
)]
pub trait Attach<P, R> {
    /// Appends an entry for `pipeline` under `token` to every lane.
    fn attach(&mut self, pipeline: &Rc<RefCell<P>>, token: Token);
}

impl<P> Attach<P, ()> for LaneEnd {
    fn attach(&mut self, _pipeline: &Rc<RefCell<P>>, _token: Token) {}
}

impl<P, T, Rest, R, RR> Attach<P, (R, RR)> for Lane<T, Rest>
where
    P: Flow<T, R> + 'static,
    Rest: Attach<P, RR>,
{
    fn attach(&mut self, pipeline: &Rc<RefCell<P>>, token: Token) {
        let shared = Rc::clone(pipeline);
        self.burst.attach_entry(BoundEntry::with_token(
            move |x: T| shared.borrow_mut().push(x),
            token,
        ));
        self.rest.attach(pipeline, token);
    }
}

/// Borrows the burst of declared type `T`.
pub trait Select<T, I> {
    /// Returns the burst.
    fn select(&mut self) -> &mut Burst<T>;
}

impl<T, Rest> Select<T, Zero> for Lane<T, Rest> {
    fn select(&mut self) -> &mut Burst<T> {
        &mut self.burst
    }
}

impl<T, U, Rest, I> Select<T, Succ<I>> for Lane<U, Rest>
where
    Rest: Select<T, I>,
{
    fn select(&mut self) -> &mut Burst<T> {
        self.rest.select()
    }
}

// ============================================================================
// Flux
// ============================================================================

/// Runtime-mutable multicast root over the declared types `L`.
///
/// Pipelines are attached and detached while the program runs. `emit` sends a
/// value to every pipeline attached to its type. A panic in one of them is
/// caught, turned into a [`Failure`] and handed to the exception handlers; the
/// other pipelines still run and `emit` itself never panics.
///
/// # Example
///
/// ```rust
/// use fluxline::prelude::*;
/// use std::cell::Cell;
/// use std::rc::Rc;
///
/// let seen = Rc::new(Cell::new(0.0));
/// let sink = Rc::clone(&seen);
///
/// let mut flux: Flux<(f64,)> = Flux::new();
/// let token = flux.attach(tap(move |x: &f64| sink.set(sink.get() + x)));
///
/// flux.emit(1.5).emit(2_i32);
/// assert_eq!(seen.get(), 3.5);
///
/// flux.detach(token).unwrap();
/// flux.emit(100.0);
/// assert_eq!(seen.get(), 3.5);
/// ```
pub struct Flux<L: Lanes> {
    lanes: L::Set,
    except: Burst<Failure>,
    config: FluxConfig,
}

impl<L: Lanes> Flux<L> {
    /// Creates a flux with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(FluxConfig::default())
    }

    /// Creates a flux with the given configuration.
    #[must_use]
    pub fn with_config(config: FluxConfig) -> Self {
        Self {
            lanes: L::Set::default(),
            except: Burst::new(),
            config,
        }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &FluxConfig {
        &self.config
    }

    /// Attaches a pipeline under every declared type and returns its token.
    ///
    /// One pipeline value is shared by all lanes, so stateful stages see every
    /// type's elements.
    ///
    /// The head must accept each declared type. Whether a closure takes a
    /// type cannot be asked as a yes-or-no question at build time, so a head
    /// accepting only some of the types is rejected rather than bound to the
    /// types it takes. Attach it per type through [`Flux::lane`], or start it
    /// with `seek()` so every type finds its own stage:
    ///
    /// ```rust,compile_fail
    /// use fluxline::prelude::*;
    ///
    /// let mut flux: Flux<(i32, String)> = Flux::new();
    /// flux.attach(tap(|_: &i32| {}));
    /// ```
    ///
    /// ```rust
    /// use fluxline::prelude::*;
    ///
    /// let mut flux: Flux<(i32, String)> = Flux::new();
    /// flux.lane::<i32, _>().attach(tap(|_: &i32| {}));
    /// assert_eq!(flux.lane_counts()[0].1, 1);
    /// ```
    pub fn attach<P, R>(&mut self, pipeline: P) -> Token
    where
        P: IntoPipeline,
        L::Set: Attach<P::Pipeline, R>,
    {
        let token = Token::new();
        let shared = Rc::new(RefCell::new(pipeline.into_pipeline()));
        self.lanes.attach(&shared, token);
        debug!(flux = %self.config.name, %token, "attached pipeline");
        token
    }

    /// Returns the burst of declared type `T`, for pipelines that accept only
    /// some of the types.
    ///
    /// Entries attached here are removed by [`Flux::detach`] like any other.
    pub fn lane<T, I>(&mut self) -> &mut Burst<T>
    where
        L::Set: Select<T, I>,
    {
        self.lanes.select()
    }

    /// Attaches an exception handler and returns its token.
    pub fn except<P, R>(&mut self, pipeline: P) -> Token
    where
        P: IntoBound<Failure, R>,
    {
        let token = self.except.attach(pipeline);
        debug!(flux = %self.config.name, %token, "attached exception handler");
        token
    }

    /// Detaches whatever is attached under `token`: the pipeline from every
    /// lane, or the exception handler.
    pub fn detach(&mut self, token: Token) -> Result<(), FluxError> {
        if self.lanes.detach(token) {
            debug!(flux = %self.config.name, %token, "detached pipeline");
            Ok(())
        } else if self.except.detach(token) {
            debug!(flux = %self.config.name, %token, "detached exception handler");
            Ok(())
        } else {
            Err(FluxError::unknown_token(token, "flux"))
        }
    }

    /// Detaches the exception handler attached under `token`, leaving the
    /// lanes alone.
    pub fn detach_except(&mut self, token: Token) -> Result<(), FluxError> {
        if self.except.detach(token) {
            debug!(flux = %self.config.name, %token, "detached exception handler");
            Ok(())
        } else {
            Err(FluxError::unknown_token(token, "except"))
        }
    }

    /// Returns whether `token` is attached to a lane or as an exception handler.
    pub fn is_attached(&self, token: Token) -> bool {
        self.lanes.contains(token) || self.except.contains(token)
    }

    /// Returns the declared type name and entry count of every lane.
    pub fn lane_counts(&self) -> Vec<(&'static str, usize)> {
        let mut out = Vec::new();
        self.lanes.counts(&mut out);
        out
    }

    /// Returns the number of exception handlers.
    pub fn except_len(&self) -> usize {
        self.except.len()
    }

    /// Sends `value` to every pipeline attached to the declared type it
    /// converts into.
    ///
    /// A value that converts into none of the declared types does not build:
    ///
    /// ```rust,compile_fail
    /// use fluxline::prelude::*;
    ///
    /// let mut flux: Flux<(i32,)> = Flux::new();
    /// flux.emit("text");
    /// ```
    ///
    /// The lane should be the first declared type the value converts into,
    /// but the compiler cannot rank candidate lanes, so a value converting
    /// into several of them is rejected as ambiguous. Name the lane with
    /// [`Flux::emit_to`] then:
    ///
    /// ```rust,compile_fail
    /// use fluxline::prelude::*;
    ///
    /// let mut flux: Flux<(i64, f64)> = Flux::new();
    /// flux.emit(1_i32);
    /// ```
    pub fn emit<V, I>(&mut self, value: V) -> &mut Self
    where
        L::Set: Dispatch<V, I>,
    {
        self.emit_to::<I, V>(value)
    }

    /// Sends `value`, converted into the declared type at position `I`, to
    /// every pipeline attached to that lane.
    ///
    /// # Example
    ///
    /// ```rust
    /// use fluxline::prelude::*;
    /// use std::cell::Cell;
    /// use std::rc::Rc;
    ///
    /// let wide = Rc::new(Cell::new(0_i64));
    /// let sink = Rc::clone(&wide);
    /// let mut flux: Flux<(i64, f64)> = Flux::new();
    /// flux.lane::<i64, _>().attach(tap(move |x: &i64| sink.set(*x)));
    ///
    /// flux.emit_to::<I0, _>(7_i32);
    /// assert_eq!(wide.get(), 7);
    /// ```
    pub fn emit_to<I, V>(&mut self, value: V) -> &mut Self
    where
        L::Set: Dispatch<V, I>,
    {
        let mut failures = Vec::new();
        self.lanes.dispatch(value, &mut failures);
        for failure in failures {
            self.redirect(failure);
        }
        self
    }

    fn redirect(&mut self, failure: Failure) {
        if self.except.is_empty() {
            if self.config.unhandled == UnhandledFailure::Log {
                warn!(flux = %self.config.name, lane = ?failure.lane(), %failure, "unhandled failure");
            }
            return;
        }

        let mut nested = Vec::new();
        self.except.fan_out_guarded(&failure, &mut nested);
        for handler_failure in nested {
            warn!(
                flux = %self.config.name,
                token = ?handler_failure.token(),
                failure = %handler_failure,
                "exception handler panicked"
            );
        }
    }
}

impl<L: Lanes> Default for Flux<L> {
    fn default() -> Self {
        Self::new()
    }
}

impl<L: Lanes> fmt::Debug for Flux<L>
where
    L::Set: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Flux")
            .field("config", &self.config)
            .field("lanes", &self.lanes)
            .field("except", &self.except)
            .finish()
    }
}
