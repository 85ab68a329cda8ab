//! Failure handles for the exception channel.

use std::any::Any;
use std::error::Error as StdError;
use std::fmt;
use std::rc::Rc;

use thiserror::Error;

use super::Token;

/// Panic payload carrying a typed error, produced by [`raise`].
#[derive(Debug)]
pub struct Raised {
    error: Box<dyn StdError + Send + Sync>,
}

impl Raised {
    /// Returns the wrapped error.
    pub fn error(&self) -> &(dyn StdError + Send + Sync + 'static) {
        self.error.as_ref()
    }
}

/// Aborts the current element with a typed error.
///
/// Inside a pipeline attached to a [`Flux`], the error reaches the exception
/// handlers as a [`Failure`] from which it can be recovered with
/// [`Failure::error`]. On the static path it unwinds to the caller like any
/// other panic.
///
/// The unwind starts without running the panic hook, so a raised error that a
/// flux absorbs leaves no trace on stderr.
///
/// [`Flux`]: super::Flux
pub fn raise<E>(error: E) -> !
where
    E: StdError + Send + Sync + 'static,
{
    std::panic::resume_unwind(Box::new(Raised {
        error: Box::new(error),
    }))
}

/// An opaque, inspectable handle to a failure caught by a flux.
///
/// Cloning is cheap; every exception handler receives its own clone of the
/// same payload.
#[derive(Clone, Error)]
#[error("{message}")]
pub struct Failure {
    message: String,
    payload: Rc<dyn Any + Send>,
    token: Option<Token>,
    lane: Option<&'static str>,
}

impl Failure {
    /// Builds a failure from a caught panic payload.
    #[must_use]
    pub fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let message = panic_message(payload.as_ref());
        Self {
            message,
            payload: Rc::from(payload),
            token: None,
            lane: None,
        }
    }

    /// Builds a failure carrying `error`, as if it had been raised.
    #[must_use]
    pub fn from_error<E>(error: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self::from_panic(Box::new(Raised {
            error: Box::new(error),
        }))
    }

    /// Sets the token of the entry that failed.
    #[must_use]
    pub fn with_token(mut self, token: Token) -> Self {
        self.token = Some(token);
        self
    }

    /// Sets the element type of the lane the failure happened on.
    #[must_use]
    pub fn with_lane(mut self, lane: &'static str) -> Self {
        self.lane = Some(lane);
        self
    }

    /// Returns the failure message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the token of the entry that failed, if known.
    pub fn token(&self) -> Option<Token> {
        self.token
    }

    /// Returns the element type of the lane the failure happened on, if known.
    pub fn lane(&self) -> Option<&'static str> {
        self.lane
    }

    /// Returns the error passed to [`raise`], if it has type `E`.
    pub fn error<E>(&self) -> Option<&E>
    where
        E: StdError + 'static,
    {
        self.payload
            .downcast_ref::<Raised>()
            .and_then(|raised| raised.error.downcast_ref::<E>())
    }

    /// Returns the raw panic payload, if it has type `T`.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.payload.downcast_ref::<T>()
    }
}

impl fmt::Debug for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Failure")
            .field("message", &self.message)
            .field("token", &self.token)
            .field("lane", &self.lane)
            .finish_non_exhaustive()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(raised) = payload.downcast_ref::<Raised>() {
        raised.error.to_string()
    } else if let Some(s) = payload.downcast_ref::<&'static str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "panic with a non-string payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::cell::Cell;
    use std::panic::{self, catch_unwind};

    #[derive(Debug, Error, PartialEq)]
    #[error("sensor {0} offline")]
    struct Offline(u32);

    fn caught(f: impl FnOnce() + std::panic::UnwindSafe) -> Failure {
        match catch_unwind(f) {
            Ok(()) => panic!("expected a panic"),
            Err(payload) => Failure::from_panic(payload),
        }
    }

    #[test]
    fn test_raised_error_is_recoverable() {
        let failure = caught(|| raise(Offline(7)));

        assert_eq!(failure.message(), "sensor 7 offline");
        assert_eq!(failure.error::<Offline>(), Some(&Offline(7)));
        assert!(failure.error::<std::fmt::Error>().is_none());
    }

    thread_local! {
        static HOOK_CALLS: Cell<usize> = const { Cell::new(0) };
    }

    #[test]
    fn test_raise_skips_panic_hook() {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(|_| HOOK_CALLS.with(|c| c.set(c.get() + 1))));

        let raised = caught(|| raise(Offline(3)));
        let panicked = caught(|| panic!("loud"));
        panic::set_hook(previous);

        assert_eq!(raised.message(), "sensor 3 offline");
        assert_eq!(panicked.message(), "loud");
        assert_eq!(HOOK_CALLS.with(Cell::get), 1);
    }

    #[test]
    fn test_str_panic_message() {
        let failure = caught(|| panic!("plain"));
        assert_eq!(failure.message(), "plain");
        assert_eq!(failure.downcast_ref::<&str>(), Some(&"plain"));
        assert!(failure.error::<Offline>().is_none());
    }

    #[test]
    fn test_formatted_panic_message() {
        let code = 42;
        let failure = caught(move || panic!("code {code}"));
        assert_eq!(failure.message(), "code 42");
        assert_eq!(failure.to_string(), "code 42");
    }

    #[test]
    fn test_opaque_payload() {
        let failure = caught(|| std::panic::panic_any(17_u64));
        assert_eq!(failure.message(), "panic with a non-string payload");
        assert_eq!(failure.downcast_ref::<u64>(), Some(&17));
    }

    #[test]
    fn test_from_error_and_context() {
        let token = Token::new();
        let failure = Failure::from_error(Offline(1))
            .with_token(token)
            .with_lane("f64");

        assert_eq!(failure.token(), Some(token));
        assert_eq!(failure.lane(), Some("f64"));
        assert_eq!(failure.error::<Offline>(), Some(&Offline(1)));

        let copy = failure.clone();
        assert_eq!(copy.message(), failure.message());
    }
}
