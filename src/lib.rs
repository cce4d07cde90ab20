#![allow(clippy::too_many_arguments, clippy::type_complexity)]

//! A domain-level reaction enumerator for nucleic-acid strand-displacement
//! systems: given a set of starting complexes and a pluggable set of
//! reaction generators, discovers every reachable complex and reaction,
//! segments fast-reaction neighborhoods into resting/transient macrostates
//! (via an iterative Tarjan SCC pass), and condenses the result into a
//! macrostate-level, stationary-distribution-weighted CRN.
//!
//! Start with [`driver::Enumerator`]; [`prelude`] re-exports the types most
//! callers need.

pub mod complex;
pub mod condensation;
pub mod config;
pub mod domain;
pub mod driver;
pub mod error;
pub mod generator;
pub mod prelude;
pub mod rates;
pub mod reaction;
pub mod registry;
pub mod segmentation;
pub mod tracking;

// re-exports of crates whose types appear in this crate's public API, so
// downstream users can match versions without a second direct dependency.
pub use eyre;
pub use ron;
pub use serde;
