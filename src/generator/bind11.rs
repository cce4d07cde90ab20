//! Intramolecular binding: two unpaired, complementary domains within the
//! same complex form a new base pair.

use eyre::Result;
use serde::{Deserialize, Serialize};

use crate::complex::{Complex, Position};
use crate::generator::{PendingReaction, ReactionGenerator};
use crate::reaction::{RateConstant, ReactionType};
use crate::registry::ComplexStore;

/// Rate constant applied to every discovered intramolecular binding, in the
/// absence of a sequence-specific energy model (`spec.md` §1 black-boxes
/// this detail).
const BIND11_RATE: f64 = 7.5e7;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bind11 {
    rate: f64,
    /// `spec.md` §6 `max_helix`: coalesce a contiguous run of complementary
    /// base pairs into one reaction instead of one reaction per pair.
    max_helix: bool,
}

impl Default for Bind11 {
    fn default() -> Self {
        Bind11 { rate: BIND11_RATE, max_helix: true }
    }
}

impl Bind11 {
    pub fn new(max_helix: bool) -> Self {
        Bind11 { rate: BIND11_RATE, max_helix }
    }

    /// `true` if `(p, q)` is not the outermost pair of its helix: the pair
    /// one domain further out (`p.1 - 1` paired with `q.1 + 1`) is also
    /// unpaired and complementary, so the run will be captured starting
    /// from there instead.
    fn extends_outward(&self, complex: &Complex, p: Position, q: Position) -> bool {
        if p.1 == 0 || q.1 + 1 >= complex.strands()[q.0].domains().len() {
            return false;
        }
        let prev_p = (p.0, p.1 - 1);
        let next_q = (q.0, q.1 + 1);
        if prev_p.0 == next_q.0 && prev_p.1 >= next_q.1 {
            return false;
        }
        if complex.partner(prev_p).is_some() || complex.partner(next_q).is_some() {
            return false;
        }
        let dp = &complex.strands()[prev_p.0].domains()[prev_p.1];
        let dq = &complex.strands()[next_q.0].domains()[next_q.1];
        dp.pairs_with(dq)
    }

    /// Extends `(p, q)` inward through consecutive unpaired, complementary
    /// positions, following the antiparallel-helix convention already used
    /// by `branch3way` (`(s, d)` partners `(s2, d2)`; its neighbor `(s,
    /// d+1)` partners `(s2, d2-1)`).
    fn collect_run(&self, complex: &Complex, p: Position, q: Position) -> Vec<(Position, Position)> {
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
            if complex.partner(next_p).is_some() || complex.partner(next_q).is_some() {
                break;
            }
            let dp = &complex.strands()[next_p.0].domains()[next_p.1];
            let dq = &complex.strands()[next_q.0].domains()[next_q.1];
            if !dp.pairs_with(dq) {
                break;
            }
            run.push((next_p, next_q));
            pi = next_p;
            qi = next_q;
        }
        run
    }
}

impl ReactionGenerator for Bind11 {
    fn name(&self) -> &'static str {
        "bind11"
    }

    fn unimolecular(&self, complex: &Complex, _store: &ComplexStore) -> Result<Vec<PendingReaction>> {
        let mut out = Vec::new();
        let positions: Vec<(usize, usize)> = complex
            .strands()
            .iter()
            .enumerate()
            .flat_map(|(s, strand)| (0..strand.domains().len()).map(move |d| (s, d)))
            .collect();

        for (i, &p) in positions.iter().enumerate() {
            if complex.partner(p).is_some() {
                continue;
            }
            for &q in &positions[i + 1..] {
                if complex.partner(q).is_some() {
                    continue;
                }
                let dp = &complex.strands()[p.0].domains()[p.1];
                let dq = &complex.strands()[q.0].domains()[q.1];
                if !dp.pairs_with(dq) {
                    continue;
                }
                if self.max_helix && self.extends_outward(complex, p, q) {
                    continue;
                }
                let run = if self.max_helix { self.collect_run(complex, p, q) } else { vec![(p, q)] };

                let mut pairing = complex.pairing_matrix();
                for &(rp, rq) in &run {
                    pairing[rp.0][rp.1] = Some(rq);
                    pairing[rq.0][rq.1] = Some(rp);
                }
                if let Ok(product) = Complex::new(complex.strands().to_vec(), pairing) {
                    out.push(PendingReaction {
                        reaction_type: ReactionType::Bind11,
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
