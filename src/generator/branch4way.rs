//! Four-way branch migration, modeled as a partner exchange between two
//! independently paired occurrences of the same domain types.
//!
//! A real four-way (Holliday) junction requires two duplexes sharing a
//! homologous sequence at the crossover point; `spec.md` §1 black-boxes the
//! exact chemistry, so this generator models the same symmetry at the
//! domain level: if a complex contains two separately-paired occurrences of
//! domain `X` (at `p1` and `p2`) each bound to an occurrence of `X*` (at
//! `q1` and `q2` respectively), the junction can isomerize by swapping which
//! `X` binds which `X*` — `p1` moves to `q2` and `p2` moves to `q1`.

use eyre::Result;
use serde::{Deserialize, Serialize};

use crate::complex::{Complex, Position};
use crate::generator::{PendingReaction, ReactionGenerator};
use crate::reaction::{RateConstant, ReactionType};
use crate::registry::ComplexStore;

const BRANCH4WAY_RATE: f64 = 1.0e3;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Branch4Way {
    rate: f64,
    /// `spec.md` §6 `reject_remote`: when true, only allow a swap between
    /// two occurrences of `X` that sit on the same strand (the crossover
    /// partner is local, not a remote toehold reached through the rest of
    /// the complex).
    reject_remote: bool,
}

impl Default for Branch4Way {
    fn default() -> Self {
        Branch4Way { rate: BRANCH4WAY_RATE, reject_remote: false }
    }
}

impl Branch4Way {
    pub fn new(reject_remote: bool) -> Self {
        Branch4Way { rate: BRANCH4WAY_RATE, reject_remote }
    }
}

impl ReactionGenerator for Branch4Way {
    fn name(&self) -> &'static str {
        "branch-4way"
    }

    fn unimolecular(&self, complex: &Complex, _store: &ComplexStore) -> Result<Vec<PendingReaction>> {
        let mut out = Vec::new();

        let paired_positions: Vec<(Position, Position)> = complex
            .strands()
            .iter()
            .enumerate()
            .flat_map(|(s, strand)| (0..strand.domains().len()).map(move |d| (s, d)))
            .filter_map(|p| complex.partner(p).filter(|&q| p < q).map(|q| (p, q)))
            .collect();

        for i in 0..paired_positions.len() {
            for j in (i + 1)..paired_positions.len() {
                let (p1, q1) = paired_positions[i];
                let (p2, q2) = paired_positions[j];

                let dom_p1 = &complex.strands()[p1.0].domains()[p1.1];
                let dom_p2 = &complex.strands()[p2.0].domains()[p2.1];
                let dom_q1 = &complex.strands()[q1.0].domains()[q1.1];
                let dom_q2 = &complex.strands()[q2.0].domains()[q2.1];

                if dom_p1 != dom_p2 || dom_q1 != dom_q2 {
                    continue;
                }
                if self.reject_remote && (p1.0 != p2.0 || q1.0 != q2.0) {
                    continue;
                }

                let mut pairing = complex.pairing_matrix();
                pairing[p1.0][p1.1] = Some(q2);
                pairing[q2.0][q2.1] = Some(p1);
                pairing[p2.0][p2.1] = Some(q1);
                pairing[q1.0][q1.1] = Some(p2);

                if let Ok(product) = Complex::new(complex.strands().to_vec(), pairing) {
                    out.push(PendingReaction {
                        reaction_type: ReactionType::Branch4Way,
                        products: vec![product],
                        rate: RateConstant(self.rate),
                    });
                }
            }
        }
        Ok(out)
    }

    fn bimolecular(&self, _a: &Complex, _b: &Complex, _store: &ComplexStore) -> Result<Vec<PendingReaction>> {
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::complex::Strand;
    use crate::domain::{Domain, Length};

    #[test]
    fn two_independent_pairs_of_the_same_domain_types_can_swap() {
        // Two separate strand pairs, each an X/X* duplex, sitting in one
        // complex (joined by an unrelated third strand so the whole thing
        // is connected).
        let s1 = Strand::new(vec![Domain::new("x", Length::Long), Domain::new("link", Length::Long)]);
        let s2 = Strand::new(vec![Domain::new("x", Length::Long).complement()]);
        let s3 = Strand::new(vec![
            Domain::new("link", Length::Long).complement(),
            Domain::new("x", Length::Long),
        ]);
        let s4 = Strand::new(vec![Domain::new("x", Length::Long).complement()]);

        let complex = Complex::new(
            vec![s1, s2, s3, s4],
            vec![
                vec![Some((1, 0)), Some((2, 0))],
                vec![Some((0, 0))],
                vec![Some((0, 1)), Some((3, 0))],
                vec![Some((2, 1))],
            ],
        )
        .unwrap();

        let gen = Branch4Way::default();
        let store = ComplexStore::new();
        let reactions = gen.unimolecular(&complex, &store).unwrap();
        assert_eq!(reactions.len(), 1);
        let product = &reactions[0].products[0];
        assert_eq!(product.partner((0, 0)), Some((3, 0)));
        assert_eq!(product.partner((2, 1)), Some((1, 0)));
    }

    #[test]
    fn reject_remote_rejects_a_swap_between_different_strands() {
        let s1 = Strand::new(vec![Domain::new("x", Length::Long), Domain::new("link", Length::Long)]);
        let s2 = Strand::new(vec![Domain::new("x", Length::Long).complement()]);
        let s3 = Strand::new(vec![
            Domain::new("link", Length::Long).complement(),
            Domain::new("x", Length::Long),
        ]);
        let s4 = Strand::new(vec![Domain::new("x", Length::Long).complement()]);

        let complex = Complex::new(
            vec![s1, s2, s3, s4],
            vec![
                vec![Some((1, 0)), Some((2, 0))],
                vec![Some((0, 0))],
                vec![Some((0, 1)), Some((3, 0))],
                vec![Some((2, 1))],
            ],
        )
        .unwrap();

        let gen = Branch4Way::new(true);
        let store = ComplexStore::new();
        assert!(gen.unimolecular(&complex, &store).unwrap().is_empty());
    }

    #[test]
    fn a_lone_pair_has_nothing_to_swap_with() {
        let s1 = Strand::new(vec![Domain::new("x", Length::Long)]);
        let s2 = Strand::new(vec![Domain::new("x", Length::Long).complement()]);
        let complex = Complex::new(vec![s1, s2], vec![vec![Some((1, 0))], vec![Some((0, 0))]]).unwrap();
        let gen = Branch4Way::default();
        let store = ComplexStore::new();
        assert!(gen.unimolecular(&complex, &store).unwrap().is_empty());
    }
}
