//! The pluggable reaction-generator interface.
//!
//! Ported directly from the teacher's component pattern
//! (`framework::components::Component`, `conditions::Condition`): a
//! `dyn_clone` + `erased_serde` object-safe trait, declared through
//! `trait_set!` so the supertrait bound reads as one name. `spec.md` §4.2
//! deliberately black-boxes move chemistry; the concrete generators here
//! (`bind11`, `bind21`, `open1n`, `branch3way`, `branch4way`) are real,
//! deterministic implementations over the `complex`/`domain` model, not
//! placeholders, but they do not attempt to reproduce a physically exact
//! nucleic-acid energy model.

pub mod bind11;
pub mod bind21;
pub mod branch3way;
pub mod branch4way;
pub mod open1n;

use std::fmt::Debug;

use dyn_clone::DynClone;
use trait_set::trait_set;

use crate::complex::Complex;
use crate::config::EnumeratorConfig;
use crate::registry::ComplexStore;

trait_set! {
    /// Object-safe supertrait bound every concrete generator must satisfy:
    /// clonable (for storing a generator list in `EnumeratorConfig`),
    /// serializable (so a configured generator list can round-trip through
    /// `ron`), and debuggable.
    pub trait GeneratorBound = DynClone + erased_serde::Serialize + Debug + Send + Sync
}

/// Produces candidate reactions from a single complex (unimolecular moves)
/// or a pair of complexes (bimolecular moves).
///
/// A generator never mutates the registry itself; it returns fresh
/// [`Complex`] values for the driver to intern, matching
/// `examples/original_source/peppercornenumerator/enumerator.py`'s
/// `get_uni_reactions`/`get_bi_reactions` dispatch, which calls pure
/// move functions and only the driver touches `self.complexes`.
pub trait ReactionGenerator: GeneratorBound {
    /// A short, stable name used in logging and in `Debug` output.
    fn name(&self) -> &'static str;

    /// Unimolecular reactions `complex` can undergo on its own.
    ///
    /// Returns `eyre::Result` rather than the crate's own
    /// [`crate::error::EnumeratorError`] because a generator is an external,
    /// pluggable implementation — the driver wraps any failure as
    /// [`crate::error::EnumeratorError::GeneratorFailure`] and treats it as
    /// non-resumable.
    fn unimolecular(&self, complex: &Complex, store: &ComplexStore) -> eyre::Result<Vec<PendingReaction>>;

    /// Bimolecular reactions `a` and `b` can jointly undergo. Called once
    /// per unordered pair; implementations that are asymmetric in their
    /// two arguments must consider both orders internally.
    fn bimolecular(&self, a: &Complex, b: &Complex, store: &ComplexStore) -> eyre::Result<Vec<PendingReaction>>;
}

dyn_clone::clone_trait_object!(ReactionGenerator);
erased_serde::serialize_trait_object!(ReactionGenerator);

/// A reaction whose product complexes have not yet been interned into a
/// [`ComplexStore`] — the shape a [`ReactionGenerator`] hands back to the
/// driver, which performs the interning and builds the final
/// [`crate::reaction::Reaction`].
#[derive(Debug, Clone)]
pub struct PendingReaction {
    pub reaction_type: crate::reaction::ReactionType,
    pub products: Vec<Complex>,
    pub rate: crate::reaction::RateConstant,
}

/// The fixed set of generators `spec.md` §4.2 names, in the order the
/// original dispatches them (`UNI_REACTIONS`/`BI_REACTIONS`), constructed
/// from `config`'s move-level knobs (`spec.md` §6: `max_helix`,
/// `reject_remote`, `dG_bp`, `release_cutoff_1_2`).
pub fn default_generators(config: &EnumeratorConfig) -> Vec<Box<dyn ReactionGenerator>> {
    vec![
        Box::new(bind11::Bind11::new(config.max_helix)),
        Box::new(open1n::Open1N::new(config.release_cutoff_1_2, config.dg_bp)),
        Box::new(branch3way::Branch3Way::default()),
        Box::new(branch4way::Branch4Way::new(config.reject_remote)),
        Box::new(bind21::Bind21::default()),
    ]
}
