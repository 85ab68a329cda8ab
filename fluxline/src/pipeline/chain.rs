//! The heterogeneous, fixed-length stage sequence.
//!
//! A pipeline is built as `Pipeline<First, Pipeline<Second, End>>` and owns
//! every stage by value. Appending consumes the pipeline and returns a longer
//! one; nothing is shared between stages.

use super::Flow;
use crate::routing::{Succ, Zero};
use crate::stages::Stage;

/// Terminator of every pipeline.
///
/// `End` accepts any element and drops it, so the last stage of a pipeline
/// never forwards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct End;

/// An ordered sequence of stages: a head stage and the rest of the pipeline.
#[derive(Debug, Clone)]
pub struct Pipeline<S, Rest = End> {
    pub(crate) stage: S,
    pub(crate) rest: Rest,
}

impl<S> Pipeline<S, End> {
    /// Creates a single-stage pipeline.
    pub fn new(stage: S) -> Self {
        Self { stage, rest: End }
    }
}

impl<S, Rest> Pipeline<S, Rest> {
    /// Creates a pipeline from a head stage and the pipeline that follows it.
    pub fn from_parts(stage: S, rest: Rest) -> Self {
        Self { stage, rest }
    }

    /// Appends a stage to the end of the pipeline.
    pub fn then<N>(self, next: N) -> <Self as Append<N>>::Output
    where
        N: Stage,
        Self: Append<N>,
    {
        self.append(next)
    }

    /// Composes this pipeline with another one, which runs after the last stage.
    pub fn chain<P>(self, other: P) -> <Self as Concat<P>>::Output
    where
        Self: Concat<P>,
    {
        self.concat(other)
    }

    /// Pushes an element into the head of the pipeline.
    ///
    /// The route `R` is inferred; it only exists when every hop the element
    /// can take is accepted by the stage receiving it.
    pub fn push<X, R>(&mut self, x: X)
    where
        Self: Flow<X, R>,
    {
        Flow::<X, R>::push(self, x);
    }

    /// Pushes an element into the stage at position `I`, bypassing the stages
    /// before it.
    pub fn push_at<I, X, R>(&mut self, x: X)
    where
        Self: Suffix<I>,
        <Self as Suffix<I>>::Tail: Flow<X, R>,
    {
        Flow::<X, R>::push(self.suffix_mut(), x);
    }

    /// Returns the stage at position `I`.
    pub fn stage<I>(&self) -> &<Self as At<I>>::Stage
    where
        Self: At<I>,
    {
        self.at()
    }

    /// Returns the stage at position `I` mutably.
    pub fn stage_mut<I>(&mut self) -> &mut <Self as At<I>>::Stage
    where
        Self: At<I>,
    {
        self.at_mut()
    }

    /// Returns the head stage.
    pub fn head(&self) -> &S {
        &self.stage
    }

    /// Returns the pipeline following the head stage.
    pub fn rest(&self) -> &Rest {
        &self.rest
    }

    /// Returns the number of stages.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize
    where
        Self: Length,
    {
        <Self as Length>::LEN
    }

    /// Returns the diagnostic names of every stage, in order.
    pub fn names(&self) -> Vec<&'static str>
    where
        Self: Describe,
    {
        let mut names = Vec::with_capacity(8);
        self.describe(&mut names);
        names
    }
}

impl<S, Rest, N> std::ops::Shr<N> for Pipeline<S, Rest>
where
    N: Stage,
    Self: Append<N>,
{
    type Output = <Self as Append<N>>::Output;

    fn shr(self, next: N) -> Self::Output {
        self.append(next)
    }
}

/// Trait for appending a stage after the last one.
pub trait Append<N>: Sized {
    /// The resulting pipeline type.
    type Output;

    /// Appends the stage.
    fn append(self, next: N) -> Self::Output;
}

impl<N> Append<N> for End {
    type Output = Pipeline<N, End>;

    fn append(self, next: N) -> Self::Output {
        Pipeline::new(next)
    }
}

impl<S, Rest, N> Append<N> for Pipeline<S, Rest>
where
    Rest: Append<N>,
{
    type Output = Pipeline<S, Rest::Output>;

    fn append(self, next: N) -> Self::Output {
        Pipeline {
            stage: self.stage,
            rest: self.rest.append(next),
        }
    }
}

/// Trait for composing two pipelines end to start.
pub trait Concat<P>: Sized {
    /// The resulting pipeline type.
    type Output;

    /// Places `other` after the last stage.
    fn concat(self, other: P) -> Self::Output;
}

impl<P> Concat<P> for End {
    type Output = P;

    fn concat(self, other: P) -> P {
        other
    }
}

impl<S, Rest, P> Concat<P> for Pipeline<S, Rest>
where
    Rest: Concat<P>,
{
    type Output = Pipeline<S, Rest::Output>;

    fn concat(self, other: P) -> Self::Output {
        Pipeline {
            stage: self.stage,
            rest: self.rest.concat(other),
        }
    }
}

/// Conversion of a single stage or a whole pipeline into a pipeline.
///
/// Branch stages take `impl IntoPipeline` so that `part(filter(..))` and
/// `part(filter(..) >> map(..))` both work.
pub trait IntoPipeline {
    /// The pipeline type produced.
    type Pipeline;

    /// Performs the conversion.
    fn into_pipeline(self) -> Self::Pipeline;
}

impl<S, Rest> IntoPipeline for Pipeline<S, Rest> {
    type Pipeline = Self;

    fn into_pipeline(self) -> Self {
        self
    }
}

/// Position-indexed stage access.
pub trait At<I> {
    /// The stage type at position `I`.
    type Stage;

    /// Returns the stage.
    fn at(&self) -> &Self::Stage;

    /// Returns the stage mutably.
    fn at_mut(&mut self) -> &mut Self::Stage;
}

impl<S, Rest> At<Zero> for Pipeline<S, Rest> {
    type Stage = S;

    fn at(&self) -> &S {
        &self.stage
    }

    fn at_mut(&mut self) -> &mut S {
        &mut self.stage
    }
}

impl<S, Rest, N> At<Succ<N>> for Pipeline<S, Rest>
where
    Rest: At<N>,
{
    type Stage = Rest::Stage;

    fn at(&self) -> &Self::Stage {
        self.rest.at()
    }

    fn at_mut(&mut self) -> &mut Self::Stage {
        self.rest.at_mut()
    }
}

/// The pipeline remaining from position `I` onwards.
///
/// `Suffix<Zero>` is the pipeline itself; the suffix past the last stage is
/// [`End`].
pub trait Suffix<I> {
    /// The remaining pipeline type.
    type Tail;

    /// Returns the remaining pipeline.
    fn suffix(&self) -> &Self::Tail;

    /// Returns the remaining pipeline mutably.
    fn suffix_mut(&mut self) -> &mut Self::Tail;
}

impl<T> Suffix<Zero> for T {
    type Tail = T;

    fn suffix(&self) -> &T {
        self
    }

    fn suffix_mut(&mut self) -> &mut T {
        self
    }
}

impl<S, T, N> Suffix<Succ<N>> for Pipeline<S, T>
where
    T: Suffix<N>,
{
    type Tail = T::Tail;

    fn suffix(&self) -> &Self::Tail {
        self.rest.suffix()
    }

    fn suffix_mut(&mut self) -> &mut Self::Tail {
        self.rest.suffix_mut()
    }
}

/// Access to the last stage of a pipeline.
pub trait Last {
    /// The last stage type.
    type Stage;

    /// Returns the last stage.
    fn last(&self) -> &Self::Stage;

    /// Returns the last stage mutably.
    fn last_mut(&mut self) -> &mut Self::Stage;
}

impl<S> Last for Pipeline<S, End> {
    type Stage = S;

    fn last(&self) -> &S {
        &self.stage
    }

    fn last_mut(&mut self) -> &mut S {
        &mut self.stage
    }
}

impl<S, A, B> Last for Pipeline<S, Pipeline<A, B>>
where
    Pipeline<A, B>: Last,
{
    type Stage = <Pipeline<A, B> as Last>::Stage;

    fn last(&self) -> &Self::Stage {
        self.rest.last()
    }

    fn last_mut(&mut self) -> &mut Self::Stage {
        self.rest.last_mut()
    }
}

/// Static pipeline length.
pub trait Length {
    /// Number of stages.
    const LEN: usize;
}

impl Length for End {
    const LEN: usize = 0;
}

impl<S, Rest: Length> Length for Pipeline<S, Rest> {
    const LEN: usize = 1 + Rest::LEN;
}

/// Collects stage names for diagnostics.
pub trait Describe {
    /// Appends the name of every stage to `names`.
    fn describe(&self, names: &mut Vec<&'static str>);
}

impl Describe for End {
    fn describe(&self, _names: &mut Vec<&'static str>) {}
}

impl<S: Stage, Rest: Describe> Describe for Pipeline<S, Rest> {
    fn describe(&self, names: &mut Vec<&'static str>) {
        names.push(self.stage.name());
        self.rest.describe(names);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::{seek, I0, I1, I2, I3};
    use crate::stages::{filter, map, tap};
    use pretty_assertions::assert_eq;
    use std::cell::Cell;

    #[test]
    fn test_single_stage_pipeline() {
        let pipeline = Pipeline::new(map(|x: i32| x + 1));
        assert_eq!(pipeline.len(), 1);
        assert_eq!(pipeline.names(), vec!["map"]);
    }

    #[test]
    fn test_then_appends_in_order() {
        let pipeline = Pipeline::new(map(|x: i32| x + 1))
            .then(filter(|x: &i32| *x > 0))
            .then(tap(|_: &i32| {}));

        assert_eq!(pipeline.len(), 3);
        assert_eq!(pipeline.names(), vec!["map", "filter", "tap"]);
    }

    #[test]
    fn test_shr_operator_chained() {
        let pipeline = map(|x: i32| x * 2) >> seek() >> filter(|x: &i32| *x > 4) >> tap(|_: &i32| {});

        assert_eq!(pipeline.len(), 4);
        assert_eq!(pipeline.names(), vec!["map", "seek", "filter", "tap"]);
    }

    #[test]
    fn test_chain_composes_pipelines() {
        let seen = Cell::new(0);
        let front = map(|x: i32| x + 1) >> map(|x: i32| x * 10);
        let back = Pipeline::new(tap(|x: &i32| seen.set(*x)));

        let mut pipeline = front.chain(back);
        assert_eq!(pipeline.len(), 3);

        pipeline.push(4);
        assert_eq!(seen.get(), 50);
    }

    #[test]
    fn test_positional_access() {
        let mut pipeline = map(|x: i32| x + 1) >> seek() >> tap(|_: &i32| {});

        assert_eq!(pipeline.stage::<I0>().name(), "map");
        assert_eq!(pipeline.stage::<I1>().name(), "seek");
        assert_eq!(pipeline.stage_mut::<I2>().name(), "tap");
        assert_eq!(pipeline.head().name(), "map");
        assert_eq!(pipeline.rest().len(), 2);
    }

    #[test]
    fn test_push_at_bypasses_earlier_stages() {
        let first = Cell::new(0);
        let last = Cell::new(0);
        let mut pipeline = tap(|x: &i32| first.set(*x))
            >> map(|x: i32| x * 3)
            >> tap(|x: &i32| last.set(*x));

        pipeline.push_at::<I1, _, _>(5);
        assert_eq!(first.get(), 0);
        assert_eq!(last.get(), 15);

        // Past the last stage the element lands on `End` and is dropped.
        pipeline.push_at::<I3, _, _>(7);
        assert_eq!(last.get(), 15);
    }

    #[test]
    fn test_last_stage_access() {
        let pipeline = map(|x: i32| x) >> seek();
        assert_eq!(pipeline.last().name(), "seek");
    }

    #[test]
    fn test_suffix_of_end_is_end() {
        let pipeline = Pipeline::new(map(|x: i32| x));
        let rest: &End = Suffix::<crate::routing::I1>::suffix(&pipeline);
        assert_eq!(*rest, End);
    }
}
