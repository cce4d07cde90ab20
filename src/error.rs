//! The enumeration core's structured error type.
//!
//! Shape follows the teacher's `state::registry::error::StateError`: one
//! `thiserror` enum with a variant per distinguishable failure, rather than
//! a single opaque string. Internal, non-public-contract helpers (config
//! builders, test harnesses) are free to use `eyre::Result` for ergonomic
//! context chaining; anything that crosses the `Enumerator` boundary comes
//! back as an `EnumeratorError`.

use thiserror::Error;

use crate::complex::ComplexId;

/// The four error kinds `spec.md` §7 names.
#[derive(Debug, Error)]
pub enum EnumeratorError {
    /// The caller violated a precondition: accessing results before
    /// enumeration, invalid configuration, a disconnected initial complex,
    /// or a duplicate-complex instantiation. Never swallowed.
    #[error("usage error: {0}")]
    UsageError(#[from] UsageError),

    /// A complex- or reaction-count budget was exceeded during enumeration.
    /// Caught internally by the driver when `interruptible` is set; a
    /// `finish(premature = true)` pass follows.
    #[error("polymerization overflow: {0}")]
    PolymerizationOverflow(String),

    /// A cooperative cancellation token was observed at a pool-pop point.
    /// Behaves exactly like `PolymerizationOverflow` in its `finish` path.
    #[error("enumeration cancelled")]
    Cancellation,

    /// An external reaction generator failed. Enumeration is not resumable
    /// after this; the underlying report is preserved.
    #[error("reaction generator failed: {0}")]
    GeneratorFailure(#[source] eyre::Report),
}

/// The specific usage-error conditions `spec.md` §6/§7 enumerate.
#[derive(Debug, Error)]
pub enum UsageError {
    #[error("accessed enumeration results before calling enumerate() or dry_run()")]
    ResultsNotAvailable,

    #[error("k_fast ({k_fast}) must not be smaller than k_slow ({k_slow})")]
    InvalidRateThresholds { k_slow: f64, k_fast: f64 },

    #[error(
        "max_complex_size ({max_complex_size}) must be at least the largest initial complex ({largest})"
    )]
    MaxComplexSizeTooSmall { max_complex_size: usize, largest: usize },

    #[error("max_complex_count ({value}) must be at least the number of initial complexes ({initial})")]
    MaxComplexCountTooSmall { value: usize, initial: usize },

    #[error("max_reaction_count ({value}) must be at least the number of initial reactions ({initial})")]
    MaxReactionCountTooSmall { value: usize, initial: usize },

    #[error("initial complex is not connected: {0:?}")]
    DisconnectedInitialComplex(ComplexId),

    #[error("release_cutoff is ambiguous: release_cutoff_1_1 ({release_11}) != release_cutoff_1_2 ({release_12})")]
    AmbiguousReleaseCutoff { release_11: u32, release_12: u32 },

    #[error("a complex with this canonical form already exists")]
    AlreadyExists,
}

pub type Result<T> = std::result::Result<T, EnumeratorError>;
