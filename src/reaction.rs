//! Reactions between complexes, and their classified rate.

use derive_more::{Deref, DerefMut};
use serde::{Deserialize, Serialize};

use crate::complex::ComplexId;

/// The mechanism that produced a reaction. `Condensed` marks a reaction
/// synthesized by [`crate::condensation::Condensation`] rather than a
/// [`crate::generator::ReactionGenerator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReactionType {
    Bind11,
    Bind21,
    Open1N,
    Branch3Way,
    Branch4Way,
    Condensed,
}

impl ReactionType {
    /// Whether this reaction consumes two reactants. Only `Bind21` is
    /// bimolecular; every other move is unimolecular, and unimolecular
    /// reactions are the only ones eligible for fast-reaction
    /// classification (`spec.md` §4.3).
    pub fn is_bimolecular(self) -> bool {
        matches!(self, ReactionType::Bind21)
    }
}

/// A reaction's rate constant, in the appropriate units for its arity
/// (`s^-1` for unimolecular, `M^-1 s^-1` for bimolecular).
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize, Deref, DerefMut)]
pub struct RateConstant(pub f64);

impl RateConstant {
    pub fn value(self) -> f64 {
        self.0
    }
}

/// A single reaction: a set of reactant complexes producing a set of
/// product complexes at a given rate.
///
/// Reverse-reaction linkage (e.g. a `Bind21`'s corresponding `Open1N`) is
/// tracked by the driver as a side index over reaction identity, not as a
/// field mutated in place here — `Reaction` stays a plain immutable value
/// once constructed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reaction {
    reaction_type: ReactionType,
    reactants: Vec<ComplexId>,
    products: Vec<ComplexId>,
    rate: RateConstant,
}

impl Reaction {
    pub fn new(
        reaction_type: ReactionType,
        reactants: Vec<ComplexId>,
        products: Vec<ComplexId>,
        rate: RateConstant,
    ) -> Self {
        assert!(!reactants.is_empty(), "a reaction must have at least one reactant");
        Reaction {
            reaction_type,
            reactants,
            products,
            rate,
        }
    }

    pub fn reaction_type(&self) -> ReactionType {
        self.reaction_type
    }

    pub fn reactants(&self) -> &[ComplexId] {
        &self.reactants
    }

    pub fn products(&self) -> &[ComplexId] {
        &self.products
    }

    pub fn rate(&self) -> RateConstant {
        self.rate
    }

    pub fn is_unimolecular(&self) -> bool {
        self.reactants.len() == 1
    }

    /// Whether every product is also a reactant and vice versa (a "trivial"
    /// reaction with no net structural change, e.g. a reaction generator
    /// that produces the same canonical complex it consumed).
    pub fn is_trivial(&self) -> bool {
        let mut reactants = self.reactants.clone();
        let mut products = self.products.clone();
        reactants.sort();
        products.sort();
        reactants == products
    }
}
