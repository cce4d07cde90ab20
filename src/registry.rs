//! The complex registry: a canonical-form interning store.
//!
//! Mirrors the teacher's `StateRegistry` shape — a single owned store keyed
//! by lookup, with explicit handling of "this already exists" rather than
//! silently deduplicating or silently allowing aliases. Pools and reactions
//! elsewhere in the crate hold only [`ComplexId`]s into this store, so they
//! never entangle with `Complex`'s own lifetime.

use std::collections::HashMap;

use contracts::requires;

use crate::complex::{Complex, ComplexId};
use crate::error::{EnumeratorError, Result, UsageError};

/// Owns every [`Complex`] discovered during an enumeration, keyed by
/// canonical form so structurally identical complexes are never duplicated.
#[derive(Debug, Default)]
pub struct ComplexStore {
    complexes: Vec<Complex>,
    by_canonical_key: HashMap<String, ComplexId>,
}

impl ComplexStore {
    pub fn new() -> Self {
        ComplexStore::default()
    }

    /// Interns `complex`, returning its existing [`ComplexId`] if a
    /// structurally equivalent complex is already present.
    #[requires(!complex.canonical_key().is_empty(), "a complex must have at least one domain")]
    pub fn intern(&mut self, complex: Complex) -> ComplexId {
        let key = complex.canonical_key();
        if let Some(&id) = self.by_canonical_key.get(&key) {
            return id;
        }
        let id = ComplexId(self.complexes.len());
        self.by_canonical_key.insert(key, id);
        self.complexes.push(complex);
        id
    }

    /// Interns `complex` as a *new* entity, failing if a structurally
    /// equivalent complex is already registered. Used when a caller
    /// explicitly instantiates a named initial complex and a silent
    /// dedup against prior state would be a caller bug, not routine
    /// product discovery.
    pub fn insert_unique(&mut self, complex: Complex) -> Result<ComplexId> {
        let key = complex.canonical_key();
        if self.by_canonical_key.contains_key(&key) {
            return Err(EnumeratorError::UsageError(UsageError::AlreadyExists));
        }
        let id = ComplexId(self.complexes.len());
        self.by_canonical_key.insert(key, id);
        self.complexes.push(complex);
        Ok(id)
    }

    pub fn get(&self, id: ComplexId) -> &Complex {
        &self.complexes[id.0]
    }

    pub fn len(&self) -> usize {
        self.complexes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.complexes.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = ComplexId> + '_ {
        (0..self.complexes.len()).map(ComplexId)
    }

    /// Looks up an existing complex's id by canonical form, without interning.
    pub fn find(&self, complex: &Complex) -> Option<ComplexId> {
        self.by_canonical_key.get(&complex.canonical_key()).copied()
    }
}
