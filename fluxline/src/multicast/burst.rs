//! Bound entries, removal tokens and the `burst` fan-out list.

use std::any::type_name;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Failure;
use crate::pipeline::Flow;
use crate::stages::{Emit, Stage};

/// Opaque removal handle returned when a pipeline is attached.
///
/// Tokens are random v4 UUIDs, so a token is never reused, not even across
/// different fluxes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Token(Uuid);

impl Token {
    /// Creates a fresh token.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for Token {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A type-erased pipeline head taking elements of type `X`, tagged with the
/// token used to remove it.
pub struct BoundEntry<X> {
    entry: Box<dyn FnMut(X)>,
    token: Token,
}

impl<X> BoundEntry<X> {
    /// Wraps a callable under a fresh token.
    pub fn new<F>(entry: F) -> Self
    where
        F: FnMut(X) + 'static,
    {
        Self::with_token(entry, Token::new())
    }

    /// Wraps a callable under an existing token.
    pub fn with_token<F>(entry: F, token: Token) -> Self
    where
        F: FnMut(X) + 'static,
    {
        Self {
            entry: Box::new(entry),
            token,
        }
    }

    /// Returns the removal token.
    pub fn token(&self) -> Token {
        self.token
    }

    /// Invokes the entry.
    pub fn call(&mut self, x: X) {
        (self.entry)(x);
    }
}

impl<X> fmt::Debug for BoundEntry<X> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundEntry")
            .field("token", &self.token)
            .finish_non_exhaustive()
    }
}

/// Binds a pipeline's head as an entry point for `X`.
///
/// # Example
///
/// ```rust
/// use fluxline::prelude::*;
/// use std::cell::Cell;
/// use std::rc::Rc;
///
/// let total = Rc::new(Cell::new(0));
/// let sink = Rc::clone(&total);
/// let mut entry: BoundEntry<i32> = bind(map(|x: i32| x * 2) >> tap(move |x: &i32| sink.set(sink.get() + x)));
///
/// entry.call(4);
/// assert_eq!(total.get(), 8);
/// ```
pub fn bind<P, X, R>(pipeline: P) -> BoundEntry<X>
where
    P: IntoBound<X, R>,
{
    pipeline.into_bound(Token::new())
}

/// Conversion of a stage or pipeline into a [`BoundEntry`].
pub trait IntoBound<X, R> {
    /// Boxes `self` as an entry under `token`.
    fn into_bound(self, token: Token) -> BoundEntry<X>;
}

impl<P, X, R> IntoBound<X, R> for P
where
    P: crate::pipeline::IntoPipeline,
    P::Pipeline: Flow<X, R> + 'static,
{
    fn into_bound(self, token: Token) -> BoundEntry<X> {
        let mut pipeline = self.into_pipeline();
        BoundEntry::with_token(move |x| pipeline.push(x), token)
    }
}

/// An ordered list of entries sharing one element type.
///
/// Entries run in attachment order; detaching keeps the order of the rest.
/// A burst is also a stage: it converts the element into `Y`, hands it to
/// every entry, then forwards the original element.
pub struct Burst<Y> {
    entries: Vec<BoundEntry<Y>>,
}

impl<Y> Burst<Y> {
    /// Creates an empty burst.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Attaches a pipeline and returns the burst, discarding the token.
    #[must_use]
    pub fn with<P, R>(mut self, pipeline: P) -> Self
    where
        P: IntoBound<Y, R>,
    {
        self.attach(pipeline);
        self
    }

    /// Attaches a stage or pipeline at the end of the list.
    pub fn attach<P, R>(&mut self, pipeline: P) -> Token
    where
        P: IntoBound<Y, R>,
    {
        self.attach_entry(pipeline.into_bound(Token::new()))
    }

    /// Attaches an already bound entry, keeping its token.
    pub fn attach_entry(&mut self, entry: BoundEntry<Y>) -> Token {
        let token = entry.token();
        self.entries.push(entry);
        token
    }

    /// Removes every entry carrying `token`. Returns whether any was removed.
    pub fn detach(&mut self, token: Token) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.token != token);
        self.entries.len() != before
    }

    /// Returns whether an entry carries `token`.
    pub fn contains(&self, token: Token) -> bool {
        self.entries.iter().any(|entry| entry.token == token)
    }

    /// Returns the tokens of all entries, in invocation order.
    pub fn tokens(&self) -> Vec<Token> {
        self.entries.iter().map(BoundEntry::token).collect()
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether there are no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<Y: Clone> Burst<Y> {
    /// Invokes every entry with a clone of `value`.
    ///
    /// A panicking entry unwinds through this call and the entries after it
    /// do not run.
    pub fn fan_out(&mut self, value: &Y) {
        for entry in &mut self.entries {
            entry.call(value.clone());
        }
    }

    /// Invokes every entry with a clone of `value`, turning each panic into a
    /// [`Failure`] so the remaining entries still run.
    pub(crate) fn fan_out_guarded(&mut self, value: &Y, failures: &mut Vec<Failure>) {
        for entry in &mut self.entries {
            let token = entry.token;
            let result = catch_unwind(AssertUnwindSafe(|| entry.call(value.clone())));
            if let Err(payload) = result {
                failures.push(
                    Failure::from_panic(payload)
                        .with_token(token)
                        .with_lane(type_name::<Y>()),
                );
            }
        }
    }
}

impl<Y> Default for Burst<Y> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Y> fmt::Debug for Burst<Y> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Burst")
            .field("type", &type_name::<Y>())
            .field("entries", &self.entries)
            .finish()
    }
}

impl<Y> Stage for Burst<Y> {
    fn name(&self) -> &'static str {
        "burst"
    }
}

impl<X, Y, Next, R> Emit<X, Next, R> for Burst<Y>
where
    X: Clone + Into<Y>,
    Y: Clone,
    Next: Flow<X, R>,
{
    fn emit(&mut self, x: X, next: &mut Next) {
        self.fan_out(&x.clone().into());
        next.push(x);
    }
}

composable!([Y,] Burst<Y>);
