//! Complexes: connected secondary structures over one or more [`Strand`]s.
//!
//! The internal representation here is intentionally simplified — `spec.md`
//! §1 black-boxes "the complex/domain data model's internal representation
//! (sequence, dot-paren structure, canonical form and hashing)". What matters
//! to the rest of the crate is that two structurally equivalent complexes
//! produce the same [`Complex::canonical_key`], and that [`Complex::new`]
//! rejects anything that isn't a single connected structure.

use std::collections::VecDeque;
use std::fmt;

use derive_more::{Deref, DerefMut};
use serde::{Deserialize, Serialize};

use crate::domain::Domain;
use crate::error::{EnumeratorError, Result, UsageError};

/// An ordered sequence of domains, 5' to 3'.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Deref, DerefMut)]
pub struct Strand(Vec<Domain>);

impl Strand {
    pub fn new(domains: Vec<Domain>) -> Self {
        Strand(domains)
    }

    pub fn domains(&self) -> &[Domain] {
        &self.0
    }
}

/// Opaque handle into a [`crate::registry::ComplexStore`].
///
/// Never constructed outside the registry; equality and ordering are by
/// assigned index, not by structure — use [`Complex::canonical_key`] to
/// compare structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ComplexId(pub(crate) usize);

impl fmt::Display for ComplexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "complex#{}", self.0)
    }
}

/// A position within a complex: the index of a strand and the index of a
/// domain within that strand.
pub type Position = (usize, usize);

/// A connected secondary structure: one or more strands plus a symmetric
/// pairing between domain positions.
///
/// `pairing[s][d] == Some((s2, d2))` means the domain at `(s, d)` is paired
/// to the domain at `(s2, d2)`; the reverse entry must also be present.
/// Unpaired positions are `None`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Complex {
    strands: Vec<Strand>,
    pairing: Vec<Vec<Option<Position>>>,
}

impl Complex {
    /// Builds a new complex, validating pairing symmetry, base-pair
    /// complementarity, and connectivity.
    ///
    /// Returns [`UsageError::DisconnectedInitialComplex`] if the given
    /// strands and pairing do not form a single connected structure (the
    /// only connectivity failure this crate's error model distinguishes).
    pub fn new(strands: Vec<Strand>, pairing: Vec<Vec<Option<Position>>>) -> Result<Self> {
        assert_eq!(strands.len(), pairing.len(), "pairing must have one row per strand");
        for (s, strand) in strands.iter().enumerate() {
            assert_eq!(
                strand.domains().len(),
                pairing[s].len(),
                "pairing row {s} must have one entry per domain"
            );
        }

        for s in 0..strands.len() {
            for d in 0..strands[s].domains().len() {
                if let Some((s2, d2)) = pairing[s][d] {
                    let back = pairing
                        .get(s2)
                        .and_then(|row| row.get(d2))
                        .copied()
                        .flatten();
                    if back != Some((s, d)) {
                        return Err(EnumeratorError::UsageError(UsageError::DisconnectedInitialComplex(
                            ComplexId(usize::MAX),
                        )));
                    }
                    if (s, d) == (s2, d2) {
                        return Err(EnumeratorError::UsageError(UsageError::DisconnectedInitialComplex(
                            ComplexId(usize::MAX),
                        )));
                    }
                    let a = &strands[s].domains()[d];
                    let b = &strands[s2].domains()[d2];
                    if !a.pairs_with(b) {
                        return Err(EnumeratorError::UsageError(UsageError::DisconnectedInitialComplex(
                            ComplexId(usize::MAX),
                        )));
                    }
                }
            }
        }

        let complex = Complex { strands, pairing };
        if !complex.is_connected() {
            return Err(EnumeratorError::UsageError(UsageError::DisconnectedInitialComplex(
                ComplexId(usize::MAX),
            )));
        }
        Ok(complex)
    }

    pub fn strands(&self) -> &[Strand] {
        &self.strands
    }

    pub fn domains(&self) -> impl Iterator<Item = &Domain> {
        self.strands.iter().flat_map(|s| s.domains().iter())
    }

    pub fn partner(&self, pos: Position) -> Option<Position> {
        self.pairing[pos.0][pos.1]
    }

    /// A clone of the full pairing table, for generators that build a
    /// modified complex from this one.
    pub fn pairing_matrix(&self) -> Vec<Vec<Option<Position>>> {
        self.pairing.clone()
    }

    /// The complex's size, counted in strands — the quantity
    /// `max_complex_size` in `spec.md` §6 bounds.
    pub fn size(&self) -> usize {
        self.strands.len()
    }

    /// Whether every position is reachable from every other, via either
    /// strand backbone adjacency or a base pair.
    pub fn is_connected(&self) -> bool {
        let total: usize = self.strands.iter().map(|s| s.domains().len()).sum();
        if total == 0 {
            return false;
        }

        let mut visited: Vec<Vec<bool>> = self
            .strands
            .iter()
            .map(|s| vec![false; s.domains().len()])
            .collect();

        let start = (0usize, 0usize);
        let mut queue = VecDeque::new();
        queue.push_back(start);
        visited[start.0][start.1] = true;
        let mut count = 1;

        while let Some((s, d)) = queue.pop_front() {
            let mut neighbors = Vec::new();
            if d + 1 < self.strands[s].domains().len() {
                neighbors.push((s, d + 1));
            }
            if d > 0 {
                neighbors.push((s, d - 1));
            }
            if let Some(partner) = self.pairing[s][d] {
                neighbors.push(partner);
            }
            for (ns, nd) in neighbors {
                if !visited[ns][nd] {
                    visited[ns][nd] = true;
                    count += 1;
                    queue.push_back((ns, nd));
                }
            }
        }

        count == total
    }

    /// A deterministic, human-readable rendering of this complex's
    /// structure, used as the basis for [`Complex::canonical_key`].
    ///
    /// Strands are joined by `" + "`; within a strand, domains are
    /// space-separated, with a `^k` suffix on paired domains (`k` shared by
    /// both partners, assigned in traversal order). This is a crate-local
    /// notation, not the real kernel-string grammar.
    pub fn kernel_string(&self) -> String {
        self.kernel_string_for_order(&(0..self.strands.len()).collect::<Vec<_>>())
    }

    fn kernel_string_for_order(&self, order: &[usize]) -> String {
        let mut pair_ids: Vec<Vec<Option<usize>>> = self
            .strands
            .iter()
            .map(|s| vec![None; s.domains().len()])
            .collect();
        let mut next_id = 0usize;

        for &s in order {
            for d in 0..self.strands[s].domains().len() {
                if pair_ids[s][d].is_some() {
                    continue;
                }
                if let Some((s2, d2)) = self.pairing[s][d] {
                    pair_ids[s][d] = Some(next_id);
                    pair_ids[s2][d2] = Some(next_id);
                    next_id += 1;
                }
            }
        }

        order
            .iter()
            .map(|&s| {
                self.strands[s]
                    .domains()
                    .iter()
                    .enumerate()
                    .map(|(d, dom)| match pair_ids[s][d] {
                        Some(id) => format!("{dom}^{id}"),
                        None => dom.to_string(),
                    })
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .collect::<Vec<_>>()
            .join(" + ")
    }

    /// The canonical key used for structural equivalence and interning in
    /// [`crate::registry::ComplexStore`].
    ///
    /// Complexes formed from the same strands under a cyclic rotation of
    /// strand order are considered the same complex (matching practical
    /// multistrand/peppercorn semantics, which treat a complex as a
    /// circular arrangement of its constituent strands rather than fixing
    /// one strand as index zero). Full graph isomorphism is not attempted.
    pub fn canonical_key(&self) -> String {
        let n = self.strands.len();
        (0..n)
            .map(|rotation| {
                let order: Vec<usize> = (0..n).map(|i| (i + rotation) % n).collect();
                self.kernel_string_for_order(&order)
            })
            .min()
            .unwrap_or_default()
    }
}

impl PartialEq for Complex {
    fn eq(&self, other: &Self) -> bool {
        self.canonical_key() == other.canonical_key()
    }
}
impl Eq for Complex {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Length;

    fn domain(name: &str) -> Domain {
        Domain::new(name, Length::Long)
    }

    #[test]
    fn single_strand_is_connected() {
        let strand = Strand::new(vec![domain("a"), domain("b"), domain("c")]);
        let pairing = vec![vec![None, None, None]];
        let c = Complex::new(vec![strand], pairing).unwrap();
        assert!(c.is_connected());
        assert_eq!(c.size(), 1);
    }

    #[test]
    fn unpaired_duplex_candidate_without_pairing_is_still_connected_by_backbone() {
        let top = Strand::new(vec![domain("a"), domain("b")]);
        let bottom = Strand::new(vec![domain("b").complement(), domain("a").complement()]);
        let pairing = vec![
            vec![Some((1, 1)), Some((1, 0))],
            vec![Some((0, 1)), Some((0, 0))],
        ];
        let c = Complex::new(vec![top, bottom], pairing).unwrap();
        assert!(c.is_connected());
        assert_eq!(c.size(), 2);
    }

    #[test]
    fn disconnected_strands_are_rejected() {
        let a = Strand::new(vec![domain("a")]);
        let b = Strand::new(vec![domain("b")]);
        let pairing = vec![vec![None], vec![None]];
        assert!(Complex::new(vec![a, b], pairing).is_err());
    }

    #[test]
    fn asymmetric_pairing_is_rejected() {
        let a = Strand::new(vec![domain("a")]);
        let b = Strand::new(vec![domain("a").complement()]);
        // only one direction recorded
        let pairing = vec![vec![Some((1, 0))], vec![None]];
        assert!(Complex::new(vec![a, b], pairing).is_err());
    }

    #[test]
    fn noncomplementary_pairing_is_rejected() {
        let a = Strand::new(vec![domain("a")]);
        let b = Strand::new(vec![domain("b")]);
        let pairing = vec![vec![Some((1, 0))], vec![Some((0, 0))]];
        assert!(Complex::new(vec![a, b], pairing).is_err());
    }

    #[test]
    fn canonical_key_is_invariant_under_cyclic_rotation() {
        // A 3-strand ring: each strand's second domain pairs with the next
        // strand's first domain, wrapping around. Connected regardless of
        // which strand is listed first.
        let s1 = Strand::new(vec![domain("a"), domain("x").complement()]);
        let s2 = Strand::new(vec![domain("x"), domain("b").complement()]);
        let s3 = Strand::new(vec![domain("b"), domain("a").complement()]);

        let original = Complex::new(
            vec![s1.clone(), s2.clone(), s3.clone()],
            vec![
                vec![None, Some((1, 0))],
                vec![Some((0, 1)), Some((2, 0))],
                vec![Some((1, 1)), Some((0, 0))],
            ],
        )
        .unwrap();

        let rotated = Complex::new(
            vec![s3, s1, s2],
            vec![
                vec![Some((2, 1)), Some((1, 0))],
                vec![Some((0, 1)), Some((2, 0))],
                vec![Some((1, 1)), Some((0, 0))],
            ],
        )
        .unwrap();

        assert_eq!(original.canonical_key(), rotated.canonical_key());
    }
}
