//! Pipeline composition and propagation.
//!
//! This module provides:
//! - The [`Pipeline`] cons-list and its [`End`] terminator
//! - Append and compose operations (`then`, `chain`, `>>`)
//! - The [`Flow`] propagation contract
//! - Position-indexed access and introspection

mod chain;
mod flow;

pub use chain::{
    Append, At, Concat, Describe, End, IntoPipeline, Last, Length, Pipeline, Suffix,
};
pub use flow::{Discard, Flow, Halt, Via};
