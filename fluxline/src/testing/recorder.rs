//! Recording probe.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::pipeline::Flow;
use crate::stages::{Emit, Stage};

/// Shared log of the elements that reached a [`Record`] stage.
///
/// Cloning a recorder shares the log, so one handle can stay in the test
/// while another is moved into a pipeline.
pub struct Recorder<T> {
    values: Rc<RefCell<Vec<T>>>,
}

impl<T> Recorder<T> {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            values: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// Returns a stage that records every element it receives, then forwards it.
    #[must_use]
    pub fn sink(&self) -> Record<T> {
        Record {
            recorder: self.clone(),
        }
    }

    /// Appends a value directly.
    pub fn record(&self, value: T) {
        self.values.borrow_mut().push(value);
    }

    /// Returns the number of recorded values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.borrow().len()
    }

    /// Returns whether nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.borrow().is_empty()
    }

    /// Forgets every recorded value.
    pub fn clear(&self) {
        self.values.borrow_mut().clear();
    }

    /// Runs `f` over the recorded values without cloning them.
    pub fn with_values<U>(&self, f: impl FnOnce(&[T]) -> U) -> U {
        f(self.values.borrow().as_slice())
    }
}

impl<T: Clone> Recorder<T> {
    /// Returns a copy of the recorded values, in arrival order.
    #[must_use]
    pub fn values(&self) -> Vec<T> {
        self.values.borrow().clone()
    }

    /// Returns the most recent value.
    #[must_use]
    pub fn last(&self) -> Option<T> {
        self.values.borrow().last().cloned()
    }
}

impl<T> Default for Recorder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for Recorder<T> {
    fn clone(&self) -> Self {
        Self {
            values: Rc::clone(&self.values),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Recorder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Recorder")
            .field("values", &self.values.borrow())
            .finish()
    }
}

/// Probe stage created by [`Recorder::sink`].
pub struct Record<T> {
    recorder: Recorder<T>,
}

impl<T> Stage for Record<T> {
    fn name(&self) -> &'static str {
        "record"
    }
}

impl<T, Next, R> Emit<T, Next, R> for Record<T>
where
    T: Clone,
    Next: Flow<T, R>,
{
    fn emit(&mut self, x: T, next: &mut Next) {
        self.recorder.record(x.clone());
        next.push(x);
    }
}

impl<T: fmt::Debug> fmt::Debug for Record<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Record")
            .field("recorder", &self.recorder)
            .finish()
    }
}

composable!([T,] Record<T>);
