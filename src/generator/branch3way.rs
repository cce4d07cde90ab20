//! Three-way branch migration: an invading domain adjacent to an existing
//! duplex displaces one strand of that duplex, one domain step at a time.

use eyre::Result;
use serde::{Deserialize, Serialize};

use crate::complex::Complex;
use crate::generator::{PendingReaction, ReactionGenerator};
use crate::reaction::{RateConstant, ReactionType};
use crate::registry::ComplexStore;

/// A single branch-migration step rate, matching the original's per-step
/// `DEFAULT_MIGRATION_RATE`.
const BRANCH3WAY_RATE: f64 = 1.5e6;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Branch3Way {
    rate: f64,
}

impl Default for Branch3Way {
    fn default() -> Self {
        Branch3Way { rate: BRANCH3WAY_RATE }
    }
}

impl ReactionGenerator for Branch3Way {
    fn name(&self) -> &'static str {
        "branch-3way"
    }

    /// A branch migration step is found wherever a paired domain at `(s, d)`
    /// has an unpaired, complementary neighbor at `(s, d+1)` whose current
    /// partner's neighbor at `(s2, d2-1)` is unpaired too: the invader at
    /// `(s, d+1)` can displace the incumbent at `(s, d)`, sliding the
    /// duplex boundary one domain along both strands.
    fn unimolecular(&self, complex: &Complex, _store: &ComplexStore) -> Result<Vec<PendingReaction>> {
        let mut out = Vec::new();

        for s in 0..complex.strands().len() {
            let len = complex.strands()[s].domains().len();
            for d in 0..len {
                let incumbent_partner = match complex.partner((s, d)) {
                    Some(p) => p,
                    None => continue,
                };
                let invader_pos = (s, d + 1);
                if d + 1 >= len || complex.partner(invader_pos).is_some() {
                    continue;
                }
                if incumbent_partner.1 == 0 {
                    continue;
                }
                let target_pos = (incumbent_partner.0, incumbent_partner.1 - 1);
                if complex.partner(target_pos).is_some() {
                    continue;
                }

                let invader = &complex.strands()[invader_pos.0].domains()[invader_pos.1];
                let target = &complex.strands()[target_pos.0].domains()[target_pos.1];
                if !invader.pairs_with(target) {
                    continue;
                }

                let mut pairing = complex.pairing_matrix();
                pairing[s][d] = None;
                pairing[incumbent_partner.0][incumbent_partner.1] = None;
                pairing[invader_pos.0][invader_pos.1] = Some(target_pos);
                pairing[target_pos.0][target_pos.1] = Some(invader_pos);

                if let Ok(product) = Complex::new(complex.strands().to_vec(), pairing) {
                    out.push(PendingReaction {
                        reaction_type: ReactionType::Branch3Way,
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
