//! Unimolecular dissociation: breaking an existing base pair, either
//! leaving the complex intact (an internal pair opens but the structure
//! stays connected through another path) or splitting it into two
//! independent complexes (the reverse of a [`crate::generator::bind21`] or
//! [`crate::generator::bind11`] move).
//!
//! `release_cutoff_1_1` (the cutoff for a pair opening that does *not*
//! disconnect the complex) has no effect here: that internal-breathing
//! case is already out of scope (see the `products.len() == 1` guard
//! below), so there is nothing for the 1-1 cutoff to gate.

use eyre::Result;
use serde::{Deserialize, Serialize};

use crate::complex::{Complex, Position, Strand};
use crate::generator::{PendingReaction, ReactionGenerator};
use crate::rates::opening_rate;
use crate::reaction::{RateConstant, ReactionType};
use crate::registry::ComplexStore;

/// The unimolecular rate prefactor fed to [`opening_rate`], matching the
/// diffusion-limited zippering constant [`crate::rates`]'s own tests use.
const K_UNI: f64 = 7.5e7;
/// Free energy of association (kcal/mol), `spec.md` §6's `dG_assoc`.
const DG_ASSOC: f64 = 1.96;
/// Standard temperature (K) the opening-rate model is evaluated at.
const KELVIN: f64 = 298.15;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Open1N {
    /// `spec.md` §6 `release_cutoff_1_2`: a dissociation whose helix is
    /// longer than this is rejected outright (too stable to dissociate at
    /// an observable rate).
    release_cutoff_1_2: u32,
    /// `spec.md` §6 `dG_bp`, fed to [`opening_rate`].
    dg_bp: f64,
}

impl Default for Open1N {
    fn default() -> Self {
        Open1N { release_cutoff_1_2: 7, dg_bp: -1.7 }
    }
}

impl Open1N {
    pub fn new(release_cutoff_1_2: u32, dg_bp: f64) -> Self {
        Open1N { release_cutoff_1_2, dg_bp }
    }
}

/// `true` if `(p, q)` is the outermost pair of its helix: there is no pair
/// one domain further out (`p.1 - 1` bound to `q.1 + 1`), following the
/// same antiparallel convention `branch3way` and `bind11` use.
fn is_outer_pair(complex: &Complex, p: Position, q: Position) -> bool {
    if p.1 == 0 || q.1 + 1 >= complex.strands()[q.0].domains().len() {
        return true;
    }
    let prev_p = (p.0, p.1 - 1);
    let next_q = (q.0, q.1 + 1);
    if prev_p.0 == next_q.0 && prev_p.1 >= next_q.1 {
        return true;
    }
    complex.partner(prev_p) != Some(next_q)
}

/// Collects the full contiguous helix starting at its outer pair `(p, q)`,
/// extending inward through positions actually paired to each other.
fn collect_helix(complex: &Complex, p: Position, q: Position) -> Vec<(Position, Position)> {
    let mut run = vec![(p, q)];
    let (mut pi, mut qi) = (p, q);
    loop {
        let next_p = (pi.0, pi.1 + 1);
        if next_p.1 >= complex.strands()[pi.0].domains().len() || qi.1 == 0 {
            break;
        }
        let next_q = (qi.0, qi.1 - 1);
        if next_p.0 == next_q.0 && next_p.1 >= next_q.1 {
            break;
        }
        if complex.partner(next_p) != Some(next_q) {
            break;
        }
        run.push((next_p, next_q));
        pi = next_p;
        qi = next_q;
    }
    run
}

impl ReactionGenerator for Open1N {
    fn name(&self) -> &'static str {
        "open1n"
    }

    /// Dissociates one full helix at a time: the whole contiguous run of
    /// base pairs opens atomically, not one pair at a time, so a multi-pair
    /// duplex between exactly two strands can still fall apart (opening
    /// only its outermost pair would leave the rest still bridging them).
    fn unimolecular(&self, complex: &Complex, _store: &ComplexStore) -> Result<Vec<PendingReaction>> {
        let mut out = Vec::new();
        let n_strands = complex.strands().len();

        for s in 0..n_strands {
            for d in 0..complex.strands()[s].domains().len() {
                let p = (s, d);
                let Some(q) = complex.partner(p) else { continue };
                if p > q || !is_outer_pair(complex, p, q) {
                    continue;
                }

                let run = collect_helix(complex, p, q);
                let length = run.len() as u32;
                if length > self.release_cutoff_1_2 {
                    continue;
                }

                let mut pairing = complex.pairing_matrix();
                for &(rp, rq) in &run {
                    pairing[rp.0][rp.1] = None;
                    pairing[rq.0][rq.1] = None;
                }

                let products = split_into_components(complex.strands().to_vec(), pairing);
                if products.len() == 1 {
                    // This generator models dissociation opens only: a helix
                    // whose removal doesn't disconnect the complex is an
                    // internal "breathing" event and out of scope here.
                    continue;
                }
                let rate = opening_rate(length, self.dg_bp, DG_ASSOC, KELVIN, K_UNI);
                out.push(PendingReaction {
                    reaction_type: ReactionType::Open1N,
                    products,
                    rate: RateConstant(rate),
                });
            }
        }
        Ok(out)
    }

    fn bimolecular(&self, _a: &Complex, _b: &Complex, _store: &ComplexStore) -> Result<Vec<PendingReaction>> {
        Ok(Vec::new())
    }
}

/// Splits `strands`/`pairing` into one [`Complex`] per connected group of
/// strands. A strand's own backbone keeps all of its domains in one
/// component, so components are found at strand granularity: two strands
/// are in the same component iff some pairing edge links them.
fn split_into_components(strands: Vec<Strand>, pairing: Vec<Vec<Option<Position>>>) -> Vec<Complex> {
    let n = strands.len();
    let mut parent: Vec<usize> = (0..n).collect();
    fn find(parent: &mut [usize], x: usize) -> usize {
        if parent[x] != x {
            parent[x] = find(parent, parent[x]);
        }
        parent[x]
    }

    for (s, row) in pairing.iter().enumerate() {
        for entry in row {
            if let Some((s2, _)) = entry {
                let ra = find(&mut parent, s);
                let rb = find(&mut parent, *s2);
                if ra != rb {
                    parent[ra] = rb;
                }
            }
        }
    }

    let mut groups: Vec<Vec<usize>> = vec![Vec::new(); n];
    for s in 0..n {
        let root = find(&mut parent, s);
        groups[root].push(s);
    }

    groups
        .into_iter()
        .filter(|g| !g.is_empty())
        .map(|group| {
            let mut remap = vec![usize::MAX; n];
            for (new_idx, &old_idx) in group.iter().enumerate() {
                remap[old_idx] = new_idx;
            }
            let new_strands = group.iter().map(|&old| strands[old].clone()).collect();
            let new_pairing = group
                .iter()
                .map(|&old| {
                    pairing[old]
                        .iter()
                        .map(|entry| entry.map(|(s2, d2)| (remap[s2], d2)))
                        .collect()
                })
                .collect();
            Complex::new(new_strands, new_pairing).expect("component split preserves validity")
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Domain, Length};

    #[test]
    fn opening_the_only_pair_between_two_strands_splits_the_complex() {
        let sa = Strand::new(vec![Domain::new("a", Length::Long)]);
        let sb = Strand::new(vec![Domain::new("a", Length::Long).complement()]);
        let complex = Complex::new(
            vec![sa, sb],
            vec![vec![Some((1, 0))], vec![Some((0, 0))]],
        )
        .unwrap();

        let gen = Open1N::default();
        let store = ComplexStore::new();
        let reactions = gen.unimolecular(&complex, &store).unwrap();
        assert_eq!(reactions.len(), 1);
        assert_eq!(reactions[0].products.len(), 2);
        assert!(reactions[0].products.iter().all(|p| p.size() == 1));
    }

    #[test]
    fn release_cutoff_1_2_rejects_helices_longer_than_the_cutoff() {
        let sa = Strand::new(vec![Domain::new("a", Length::Long), Domain::new("b", Length::Long)]);
        let sb = Strand::new(vec![
            Domain::new("b", Length::Long).complement(),
            Domain::new("a", Length::Long).complement(),
        ]);
        let complex = Complex::new(
            vec![sa, sb],
            vec![vec![Some((1, 1)), Some((1, 0))], vec![Some((0, 1)), Some((0, 0))]],
        )
        .unwrap();

        let gen = Open1N::new(1, -1.7);
        let store = ComplexStore::new();
        assert!(gen.unimolecular(&complex, &store).unwrap().is_empty());

        let gen = Open1N::new(2, -1.7);
        let reactions = gen.unimolecular(&complex, &store).unwrap();
        assert_eq!(reactions.len(), 1);
    }

    #[test]
    fn a_longer_helix_opens_more_slowly() {
        let short = Open1N::default();
        let sa = Strand::new(vec![Domain::new("a", Length::Long)]);
        let sb = Strand::new(vec![Domain::new("a", Length::Long).complement()]);
        let short_complex = Complex::new(vec![sa, sb], vec![vec![Some((1, 0))], vec![Some((0, 0))]]).unwrap();
        let store = ComplexStore::new();
        let short_rate = short.unimolecular(&short_complex, &store).unwrap()[0].rate.value();

        let long = Open1N::default();
        let ta = Strand::new(vec![Domain::new("a", Length::Long), Domain::new("b", Length::Long)]);
        let tb = Strand::new(vec![
            Domain::new("b", Length::Long).complement(),
            Domain::new("a", Length::Long).complement(),
        ]);
        let long_complex = Complex::new(
            vec![ta, tb],
            vec![vec![Some((1, 1)), Some((1, 0))], vec![Some((0, 1)), Some((0, 0))]],
        )
        .unwrap();
        let long_rate = long.unimolecular(&long_complex, &store).unwrap()[0].rate.value();

        assert!(long_rate < short_rate);
    }

    #[test]
    fn opening_a_pair_with_an_alternate_path_keeps_it_connected() {
        // A 3-strand ring: opening one of the three pairs still leaves the
        // complex connected through the other two.
        let s1 = Strand::new(vec![Domain::new("a", Length::Long), Domain::new("x", Length::Long).complement()]);
        let s2 = Strand::new(vec![Domain::new("x", Length::Long), Domain::new("b", Length::Long).complement()]);
        let s3 = Strand::new(vec![Domain::new("b", Length::Long), Domain::new("a", Length::Long).complement()]);
        let complex = Complex::new(
            vec![s1, s2, s3],
            vec![
                vec![None, Some((1, 0))],
                vec![Some((0, 1)), Some((2, 0))],
                vec![Some((1, 1)), Some((0, 0))],
            ],
        )
        .unwrap();

        let gen = Open1N::default();
        let store = ComplexStore::new();
        // Every pair opening keeps the ring connected via backbones, so no
        // reaction should be reported as a structural split.
        assert!(gen.unimolecular(&complex, &store).unwrap().is_empty());
    }
}
