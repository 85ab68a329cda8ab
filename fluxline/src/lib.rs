//! # Fluxline
//!
//! Statically composed data pipelines whose routing is resolved by the type
//! system.
//!
//! Fluxline provides:
//!
//! - **Typed stages**: filters, maps, taps, batching, folding and flattening,
//!   each accepting exactly the element types its logic can take
//! - **Build-time routing**: every hop in a [`Pipeline`] is checked by the
//!   compiler, and [`seek`] jumps to the next stage able to accept an element
//! - **Branches**: [`part`] tees an element into a sub-pipeline, [`join`]
//!   merges a sub-pipeline's output back into the main path
//! - **Dynamic multicast**: [`Flux`] fans elements out to pipelines attached and
//!   detached at run time, redirecting panics to exception handlers
//!
//! ## Quick Start
//!
//! ```rust
//! use fluxline::prelude::*;
//! use std::cell::Cell;
//!
//! let total = Cell::new(0.0);
//! let mut pipeline = map(|x: f64| x / 2.0)
//!     >> filter(|x: &f64| *x > 1.0)
//!     >> tap(|x: &f64| total.set(total.get() + x));
//!
//! pipeline.push(1.0);
//! pipeline.push(8.0);
//! assert_eq!(total.get(), 4.0);
//! ```
//!
//! [`Pipeline`]: crate::pipeline::Pipeline
//! [`seek`]: crate::routing::seek
//! [`part`]: crate::stages::part
//! [`join`]: crate::stages::join
//! [`Flux`]: crate::multicast::Flux

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

#[macro_use]
mod macros;

pub mod errors;
pub mod multicast;
pub mod pipeline;
pub mod routing;
pub mod stages;
pub mod testing;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::errors::FluxError;
    pub use crate::multicast::{
        bind, raise, BoundEntry, Burst, Failure, Flux, FluxConfig, Token,
        UnhandledFailure,
    };
    pub use crate::pipeline::{End, Flow, Pipeline};
    pub use crate::routing::{seek, seek_to, Seek, SeekTo, I0, I1, I2, I3, I4, I5, I6, I7};
    pub use crate::stages::{
        collect_n, filter, flat, join, map, part, reduce, static_map, tap, Emit,
        Stage,
    };
}
