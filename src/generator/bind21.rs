//! Intermolecular binding: an unpaired, complementary domain pair between
//! two distinct complexes merges them into one.

use eyre::Result;
use serde::{Deserialize, Serialize};

use crate::complex::Complex;
use crate::generator::{PendingReaction, ReactionGenerator};
use crate::reaction::{RateConstant, ReactionType};
use crate::registry::ComplexStore;

/// A commonly used diffusion-limited association rate constant
/// (`M^-1 s^-1`), matching the original's default `bimolecular_rate`.
const BIND21_RATE: f64 = 3.3e6;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bind21 {
    rate: f64,
}

impl Default for Bind21 {
    fn default() -> Self {
        Bind21 { rate: BIND21_RATE }
    }
}

impl ReactionGenerator for Bind21 {
    fn name(&self) -> &'static str {
        "bind21"
    }

    fn unimolecular(&self, _complex: &Complex, _store: &ComplexStore) -> Result<Vec<PendingReaction>> {
        Ok(Vec::new())
    }

    fn bimolecular(&self, a: &Complex, b: &Complex, _store: &ComplexStore) -> Result<Vec<PendingReaction>> {
        let mut out = Vec::new();
        let a_strand_count = a.strands().len();

        let a_positions: Vec<(usize, usize)> = a
            .strands()
            .iter()
            .enumerate()
            .flat_map(|(s, strand)| (0..strand.domains().len()).map(move |d| (s, d)))
            .filter(|&p| a.partner(p).is_none())
            .collect();
        let b_positions: Vec<(usize, usize)> = b
            .strands()
            .iter()
            .enumerate()
            .flat_map(|(s, strand)| (0..strand.domains().len()).map(move |d| (s, d)))
            .filter(|&p| b.partner(p).is_none())
            .collect();

        for &pa in &a_positions {
            let da = &a.strands()[pa.0].domains()[pa.1];
            for &pb in &b_positions {
                let db = &b.strands()[pb.0].domains()[pb.1];
                if !da.pairs_with(db) {
                    continue;
                }

                let mut strands = a.strands().to_vec();
                strands.extend(b.strands().iter().cloned());

                let mut pairing = a.pairing_matrix();
                for row in b.pairing_matrix() {
                    pairing.push(
                        row.into_iter()
                            .map(|entry| entry.map(|(s, d)| (s + a_strand_count, d)))
                            .collect(),
                    );
                }

                let merged_pa = pa;
                let merged_pb = (pb.0 + a_strand_count, pb.1);
                pairing[merged_pa.0][merged_pa.1] = Some(merged_pb);
                pairing[merged_pb.0][merged_pb.1] = Some(merged_pa);

                if let Ok(product) = Complex::new(strands, pairing) {
                    out.push(PendingReaction {
                        reaction_type: ReactionType::Bind21,
                        products: vec![product],
                        rate: RateConstant(self.rate),
                    });
                }
            }
        }
        Ok(out)
    }
}
