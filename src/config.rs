//! Enumerator configuration: the options table from `spec.md` §6, plus a
//! validating builder in the shape of the teacher's
//! `framework::configuration::ConfigurationBuilder`.

use serde::{Deserialize, Serialize};

use crate::error::{EnumeratorError, Result, UsageError};

/// A callback invoked synchronously after every classified reaction batch,
/// the in-scope descendant of the original's `interactive` pause-for-debug
/// flag (SPEC_FULL.md "Reaction interactive/debug callback").
pub type ReactionBatchCallback = std::sync::Arc<dyn Fn(&crate::tracking::LogEntry) + Send + Sync>;

/// The full set of options `spec.md` §6 names.
#[derive(Clone, Serialize, Deserialize)]
pub struct EnumeratorConfig {
    /// Unimolecular reactions below this rate are dropped entirely.
    pub k_slow: f64,
    /// Unimolecular reactions at or above this rate drive fast-reaction
    /// segmentation.
    pub k_fast: f64,
    /// Upper bound on a complex's size (strand count), `spec.md` §6.
    pub max_complex_size: usize,
    /// Upper bound on the number of distinct complexes ever interned.
    /// `None` resolves to `spec.md` §6's data-dependent default,
    /// `max(200, |initial_complexes|)`, at [`crate::driver::Enumerator::new`]
    /// time — see [`EnumeratorConfig::resolve_max_complex_count`].
    pub max_complex_count: Option<usize>,
    /// Upper bound on the number of reactions ever generated. `None`
    /// resolves to `max(1000, |initial_reactions|)`, mirroring
    /// `max_complex_count`.
    pub max_reaction_count: Option<usize>,
    /// Whether enumeration may be interrupted early (budget overflow or
    /// cooperative cancellation) and still produce a usable, marked-premature
    /// result, versus treating overflow as a hard error.
    pub interruptible: bool,
    /// The release cutoff for unimolecular 1-1 (bind11/open) reactions, in
    /// toehold length.
    pub release_cutoff_1_1: u32,
    /// The release cutoff for unimolecular 1-2 (branch migration) reactions.
    pub release_cutoff_1_2: u32,
    /// Coalesce a run of consecutive helix-extending bind moves into a
    /// single reaction rather than one reaction per base pair.
    pub max_helix: bool,
    /// Reject branch-migration reactions whose invading toehold is not
    /// adjacent to the displacement site.
    pub reject_remote: bool,
    /// Per-base-pair free energy (kcal/mol) fed to [`crate::rates::opening_rate`].
    pub dg_bp: f64,
    /// Pop order for the outer worklist of resting complexes awaiting
    /// cross-reaction generation: `true` is DFS (LIFO, from the end),
    /// `false` is BFS (FIFO, from the front). `spec.md` §5: the discovered
    /// complex/reaction sets are insensitive to this choice; only
    /// macrostate-naming order differs.
    pub dfs: bool,
    #[serde(skip)]
    pub on_reaction_batch: Option<ReactionBatchCallback>,
}

impl std::fmt::Debug for EnumeratorConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnumeratorConfig")
            .field("k_slow", &self.k_slow)
            .field("k_fast", &self.k_fast)
            .field("max_complex_size", &self.max_complex_size)
            .field("max_complex_count", &self.max_complex_count)
            .field("max_reaction_count", &self.max_reaction_count)
            .field("interruptible", &self.interruptible)
            .field("release_cutoff_1_1", &self.release_cutoff_1_1)
            .field("release_cutoff_1_2", &self.release_cutoff_1_2)
            .field("max_helix", &self.max_helix)
            .field("reject_remote", &self.reject_remote)
            .field("dg_bp", &self.dg_bp)
            .field("dfs", &self.dfs)
            .field("on_reaction_batch", &self.on_reaction_batch.is_some())
            .finish()
    }
}

impl Default for EnumeratorConfig {
    fn default() -> Self {
        EnumeratorConfig {
            k_slow: 0.0,
            k_fast: 0.0,
            max_complex_size: 6,
            max_complex_count: None,
            max_reaction_count: None,
            interruptible: false,
            release_cutoff_1_1: 7,
            release_cutoff_1_2: 7,
            max_helix: true,
            reject_remote: false,
            dg_bp: -1.7,
            dfs: true,
            on_reaction_batch: None,
        }
    }
}

impl EnumeratorConfig {
    pub fn builder() -> EnumeratorConfigBuilder {
        EnumeratorConfigBuilder::default()
    }

    /// The original's convenience `release_cutoff` getter, which only makes
    /// sense when both per-arity cutoffs agree (SPEC_FULL.md point 5).
    pub fn release_cutoff(&self) -> Result<u32> {
        if self.release_cutoff_1_1 != self.release_cutoff_1_2 {
            return Err(EnumeratorError::UsageError(UsageError::AmbiguousReleaseCutoff {
                release_11: self.release_cutoff_1_1,
                release_12: self.release_cutoff_1_2,
            }));
        }
        Ok(self.release_cutoff_1_1)
    }

    /// Resolves `max_complex_count` against `spec.md` §6's data-dependent
    /// default, `max(200, |initial_complexes|)`, when no explicit override
    /// was configured.
    pub fn resolve_max_complex_count(&self, initial_complex_count: usize) -> usize {
        self.max_complex_count.unwrap_or_else(|| initial_complex_count.max(200))
    }

    /// Resolves `max_reaction_count` against `max(1000, |initial_reactions|)`,
    /// mirroring [`EnumeratorConfig::resolve_max_complex_count`].
    pub fn resolve_max_reaction_count(&self, initial_reaction_count: usize) -> usize {
        self.max_reaction_count.unwrap_or_else(|| initial_reaction_count.max(1000))
    }

    /// Validates the thresholds and budgets against the initial complex/
    /// reaction counts supplied at construction time (`spec.md` §7). An
    /// auto-resolved budget (no explicit override) can never be too small,
    /// since it is computed from these same counts; only an explicit
    /// override smaller than the initial set is an error.
    pub fn validate(&self, initial_complex_count: usize, initial_reaction_count: usize, largest_initial: usize) -> Result<()> {
        if self.k_fast < self.k_slow {
            return Err(EnumeratorError::UsageError(UsageError::InvalidRateThresholds {
                k_slow: self.k_slow,
                k_fast: self.k_fast,
            }));
        }
        if self.max_complex_size < largest_initial {
            return Err(EnumeratorError::UsageError(UsageError::MaxComplexSizeTooSmall {
                max_complex_size: self.max_complex_size,
                largest: largest_initial,
            }));
        }
        if let Some(value) = self.max_complex_count {
            if value < initial_complex_count {
                return Err(EnumeratorError::UsageError(UsageError::MaxComplexCountTooSmall {
                    value,
                    initial: initial_complex_count,
                }));
            }
        }
        if let Some(value) = self.max_reaction_count {
            if value < initial_reaction_count {
                return Err(EnumeratorError::UsageError(UsageError::MaxReactionCountTooSmall {
                    value,
                    initial: initial_reaction_count,
                }));
            }
        }
        Ok(())
    }
}

/// A validating builder over [`EnumeratorConfig`], mirroring the teacher's
/// `ConfigurationBuilder` fluent-setter shape.
#[derive(Default)]
pub struct EnumeratorConfigBuilder {
    config: EnumeratorConfig,
}

impl EnumeratorConfigBuilder {
    pub fn k_slow(mut self, value: f64) -> Self {
        self.config.k_slow = value;
        self
    }

    pub fn k_fast(mut self, value: f64) -> Self {
        self.config.k_fast = value;
        self
    }

    pub fn max_complex_size(mut self, value: usize) -> Self {
        self.config.max_complex_size = value;
        self
    }

    pub fn max_complex_count(mut self, value: usize) -> Self {
        self.config.max_complex_count = Some(value);
        self
    }

    pub fn max_reaction_count(mut self, value: usize) -> Self {
        self.config.max_reaction_count = Some(value);
        self
    }

    pub fn interruptible(mut self, value: bool) -> Self {
        self.config.interruptible = value;
        self
    }

    pub fn max_helix(mut self, value: bool) -> Self {
        self.config.max_helix = value;
        self
    }

    pub fn reject_remote(mut self, value: bool) -> Self {
        self.config.reject_remote = value;
        self
    }

    pub fn dg_bp(mut self, value: f64) -> Self {
        self.config.dg_bp = value;
        self
    }

    pub fn dfs(mut self, value: bool) -> Self {
        self.config.dfs = value;
        self
    }

    pub fn release_cutoff(mut self, value: u32) -> Self {
        self.config.release_cutoff_1_1 = value;
        self.config.release_cutoff_1_2 = value;
        self
    }

    pub fn release_cutoff_1_1(mut self, value: u32) -> Self {
        self.config.release_cutoff_1_1 = value;
        self
    }

    pub fn release_cutoff_1_2(mut self, value: u32) -> Self {
        self.config.release_cutoff_1_2 = value;
        self
    }

    pub fn on_reaction_batch(mut self, callback: ReactionBatchCallback) -> Self {
        self.config.on_reaction_batch = Some(callback);
        self
    }

    pub fn build(self) -> EnumeratorConfig {
        self.config
    }
}
