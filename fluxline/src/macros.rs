//! Composition operators shared by every built-in stage.

/// Implements `stage >> stage` and [`IntoPipeline`] for a stage type.
///
/// The bracketed list holds the impl generics, each followed by a comma.
///
/// [`IntoPipeline`]: crate::pipeline::IntoPipeline
macro_rules! composable {
    ([$($generics:tt)*] $stage:ty) => {
        impl<$($generics)* Next: $crate::stages::Stage> ::std::ops::Shr<Next> for $stage {
            type Output = $crate::pipeline::Pipeline<
                Self,
                $crate::pipeline::Pipeline<Next, $crate::pipeline::End>,
            >;

            fn shr(self, next: Next) -> Self::Output {
                $crate::pipeline::Pipeline::from_parts(self, $crate::pipeline::Pipeline::new(next))
            }
        }

        impl<$($generics)*> $crate::pipeline::IntoPipeline for $stage {
            type Pipeline = $crate::pipeline::Pipeline<Self, $crate::pipeline::End>;

            fn into_pipeline(self) -> Self::Pipeline {
                $crate::pipeline::Pipeline::new(self)
            }
        }
    };
}
