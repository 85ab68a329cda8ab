//! Stage traits and built-in stages.
//!
//! Stages are the units a [`Pipeline`] is built from. Each one decides, at
//! build time, which element types it accepts and what it forwards.
//!
//! [`Pipeline`]: crate::pipeline::Pipeline

mod batch;
mod branch;
mod flat;
mod transform;

pub use batch::{collect_n, reduce, CollectN, Reduce};
pub use branch::{join, part, Capture, Join, Part};
pub use flat::{flat, Flat};
pub use transform::{filter, map, static_map, tap, Filter, Map, StaticMap, Tap};

/// Trait for pipeline stages.
///
/// Every stage carries a name for diagnostics. What it accepts is described
/// separately by [`Emit`].
pub trait Stage {
    /// Returns the name of the stage.
    fn name(&self) -> &'static str;
}

/// The capability and propagation contract of a stage.
///
/// `Emit<X, Next, R>` is implemented exactly when the stage can take an `X`
/// and forward whatever it produces into `Next`, the pipeline that follows
/// it, along route `R`. The check lives entirely in the trait solver:
/// a pipeline that would hand a stage an element it cannot consume does not
/// compile.
///
/// # Arguments
///
/// * `x` - The element, moved into the stage
/// * `next` - The remaining pipeline
#[diagnostic::on_unimplemented(
    message = "stage `{Self}` cannot accept `{X}` here",
    label = "this stage does not accept `{X}` or cannot forward its output",
    note = "the stage's closure must take `{X}` and its output must be accepted by the next stage"
)]
pub trait Emit<X, Next, R>: Stage {
    /// Consumes `x` and propagates the result into `next`.
    fn emit(&mut self, x: X, next: &mut Next);
}

composable!([F,] Filter<F>);
composable!([F,] Map<F>);
composable!([X, Y,] StaticMap<X, Y>);
composable!([F,] Tap<F>);
composable!([P,] Part<P>);
composable!([P, Y,] Join<P, Y>);
composable!([T, const N: usize,] CollectN<T, N>);
composable!([A, F, Y,] Reduce<A, F, Y>);
composable!([] Flat);
