//! Dynamic multicast.
//!
//! This module provides:
//! - [`BoundEntry`] and [`bind`]: type-erased pipeline heads
//! - [`Burst`]: an ordered fan-out list, usable as a stage
//! - [`Flux`]: the runtime-mutable entry point with exception redirection
//! - [`Failure`] and [`raise`]: the run-time failure channel
//!
//! Nothing here is `Send`. A flux and the pipelines attached to it belong to
//! one thread; callers wanting more keep one flux per thread.

mod burst;
mod config;
mod failure;
mod flux;

pub use burst::{bind, BoundEntry, Burst, IntoBound, Token};
pub use config::{FluxConfig, UnhandledFailure};
pub use failure::{raise, Failure, Raised};
pub use flux::{Attach, Dispatch, Flux, Lane, LaneEnd, LaneSet, Lanes, Select};
