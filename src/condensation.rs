//! Condensation: folding a resting-macrostate network into a macrostate-level
//! CRN, weighting outgoing rates by each source macrostate's stationary
//! distribution under its internal fast reactions.

use std::collections::HashMap;

use itertools::Itertools;

use crate::complex::ComplexId;
use crate::reaction::{RateConstant, Reaction, ReactionType};
use crate::segmentation::{Macrostate, MacrostateId, MacrostateKind, MacrostateRegistry};

/// The stationary distribution of a resting macrostate's internal
/// fast-reaction Markov chain, normalized to sum to one.
///
/// Solves `πQ = 0` over the closed chain restricted to the macrostate's own
/// members and internal fast transitions (`spec.md` §9 Open Question: no
/// self-loop or absorbing-boundary special casing — see DESIGN.md).
pub fn stationary_distribution(
    macrostate: &Macrostate,
    fast_reactions: &[Reaction],
) -> HashMap<ComplexId, f64> {
    let members = macrostate.members();
    let n = members.len();
    if n == 1 {
        let mut dist = HashMap::new();
        dist.insert(members[0], 1.0);
        return dist;
    }

    let index: HashMap<ComplexId, usize> = members.iter().enumerate().map(|(i, &c)| (c, i)).collect();

    // Generator matrix Q: off-diagonal Q[i][j] = total rate i -> j, diagonal
    // Q[i][i] = -sum of outgoing rates from i.
    let mut q = vec![vec![0.0f64; n]; n];
    for reaction in fast_reactions {
        if !reaction.is_unimolecular() {
            continue;
        }
        let Some(&i) = index.get(&reaction.reactants()[0]) else { continue };
        for &product in reaction.products() {
            if let Some(&j) = index.get(&product) {
                if i != j {
                    q[i][j] += reaction.rate().value();
                }
            }
        }
    }
    for i in 0..n {
        let out: f64 = (0..n).filter(|&j| j != i).map(|j| q[i][j]).sum();
        q[i][i] = -out;
    }

    let pi = solve_stationary(&q);
    members.iter().enumerate().map(|(i, &c)| (c, pi[i])).collect()
}

/// Solves `πQ = 0`, `sum(π) = 1` by replacing one equation of `Q^T π = 0`
/// with the normalization constraint and running Gaussian elimination.
/// `n` is always small (a single fast-reaction neighborhood), so no
/// iterative solver is warranted.
fn solve_stationary(q: &[Vec<f64>]) -> Vec<f64> {
    let n = q.len();
    if n == 1 {
        return vec![1.0];
    }

    // Build A = Q^T with the last row replaced by all-ones, b = [0,...,0,1].
    let mut a = vec![vec![0.0f64; n]; n];
    for i in 0..n {
        for j in 0..n {
            a[i][j] = q[j][i];
        }
    }
    for j in 0..n {
        a[n - 1][j] = 1.0;
    }
    let mut b = vec![0.0f64; n];
    b[n - 1] = 1.0;

    gaussian_eliminate(&mut a, &mut b);
    b
}

fn gaussian_eliminate(a: &mut [Vec<f64>], b: &mut [f64]) {
    let n = a.len();
    for col in 0..n {
        let pivot_row = (col..n)
            .max_by(|&r1, &r2| a[r1][col].abs().partial_cmp(&a[r2][col].abs()).unwrap())
            .unwrap();
        if a[pivot_row][col].abs() < 1e-14 {
            continue;
        }
        a.swap(col, pivot_row);
        b.swap(col, pivot_row);

        let pivot = a[col][col];
        for j in 0..n {
            a[col][j] /= pivot;
        }
        b[col] /= pivot;

        for row in 0..n {
            if row == col {
                continue;
            }
            let factor = a[row][col];
            if factor == 0.0 {
                continue;
            }
            for j in 0..n {
                a[row][j] -= factor * a[col][j];
            }
            b[row] -= factor * b[col];
        }
    }
}

/// The distribution over resting-macrostate "fates" reachable from
/// `macrostate_id` (`spec.md` §4.6 step 3): if `macrostate_id` is already
/// resting, its only fate is itself with probability 1. Otherwise, it
/// recurses through each fast-reaction exit out of the transient SCC,
/// weighting by the exit's share of the macrostate's internal stationary
/// occupancy and recursing into each exit's products. The macrostate
/// reachability graph is acyclic — any cycle between macrostates would have
/// been merged into one SCC by `segment_neighborhood`'s Tarjan pass — so
/// this recursion always terminates, and memoizing by `macrostate_id` alone
/// is safe.
fn fate_distribution(
    macrostate_id: MacrostateId,
    macrostates: &MacrostateRegistry,
    fast_reactions_by_macrostate: &HashMap<MacrostateId, Vec<Reaction>>,
    exit_reactions_by_macrostate: &HashMap<MacrostateId, Vec<Reaction>>,
    memo: &mut HashMap<MacrostateId, HashMap<Vec<MacrostateId>, f64>>,
) -> HashMap<Vec<MacrostateId>, f64> {
    if let Some(cached) = memo.get(&macrostate_id) {
        return cached.clone();
    }

    let macrostate = macrostates.get(macrostate_id);
    if macrostate.kind() == MacrostateKind::Resting {
        let result = HashMap::from([(vec![macrostate_id], 1.0)]);
        memo.insert(macrostate_id, result.clone());
        return result;
    }

    let fast = fast_reactions_by_macrostate.get(&macrostate_id).cloned().unwrap_or_default();
    let occupancy = stationary_distribution(macrostate, &fast);
    let exits = exit_reactions_by_macrostate.get(&macrostate_id).cloned().unwrap_or_default();

    let mut exit_rate_by_member: HashMap<ComplexId, f64> = HashMap::new();
    for reaction in &exits {
        if let Some(reactant) = reaction.reactants().first().copied() {
            *exit_rate_by_member.entry(reactant).or_insert(0.0) += reaction.rate().value();
        }
    }

    let normalizer: f64 =
        occupancy.iter().filter(|(c, _)| exit_rate_by_member.contains_key(c)).map(|(_, w)| w).sum();

    let mut result: HashMap<Vec<MacrostateId>, f64> = HashMap::new();
    if normalizer > 0.0 {
        for reaction in &exits {
            let Some(reactant) = reaction.reactants().first().copied() else { continue };
            let occ = occupancy.get(&reactant).copied().unwrap_or(0.0);
            if occ == 0.0 {
                continue;
            }
            let total_exit_rate = exit_rate_by_member[&reactant];
            let share = (occ / normalizer) * (reaction.rate().value() / total_exit_rate);

            let owners: Option<Vec<MacrostateId>> =
                reaction.products().iter().map(|&p| macrostates.owner_of(p)).collect();
            let Some(owners) = owners else { continue };

            let mut product_dists = Vec::with_capacity(owners.len());
            for owner in owners {
                product_dists.push(fate_distribution(
                    owner,
                    macrostates,
                    fast_reactions_by_macrostate,
                    exit_reactions_by_macrostate,
                    memo,
                ));
            }

            for (fate, prob) in combine_fates(&product_dists) {
                *result.entry(fate).or_insert(0.0) += share * prob;
            }
        }
    }

    memo.insert(macrostate_id, result.clone());
    result
}

/// Cartesian-combines per-product fate distributions into whole-reaction
/// fates: one entry per choice of one fate per product, with the
/// corresponding macrostate-id vectors concatenated and probabilities
/// multiplied.
fn combine_fates(dists: &[HashMap<Vec<MacrostateId>, f64>]) -> Vec<(Vec<MacrostateId>, f64)> {
    if dists.is_empty() {
        return vec![(Vec::new(), 1.0)];
    }
    dists
        .iter()
        .map(|d| d.iter().map(|(fate, prob)| (fate.clone(), *prob)).collect::<Vec<_>>())
        .multi_cartesian_product()
        .map(|combo| {
            let mut fate = Vec::new();
            let mut prob = 1.0;
            for (f, p) in combo {
                fate.extend(f);
                prob *= p;
            }
            (fate, prob)
        })
        .collect()
}

/// A condensed reaction between resting macrostates, and the pipeline that
/// produces the full set from a resting-macrostate network's slow
/// reactions.
#[derive(Debug, Default)]
pub struct Condensation {
    reactions: Vec<Reaction>,
}

impl Condensation {
    pub fn new() -> Self {
        Condensation::default()
    }

    pub fn reactions(&self) -> &[Reaction] {
        &self.reactions
    }

    /// Condenses `slow_reactions` (reactions among detailed complexes) into
    /// reactions among resting macrostates.
    ///
    /// For each detailed slow reaction `r`, every "fate" — a tuple of
    /// resting macrostates, one per product complex, reachable via a
    /// recursive, memoized traversal through transient SCCs (`spec.md` §4.6
    /// step 3, [`fate_distribution`]) — is enumerated via the Cartesian
    /// product over each product's fate distribution
    /// (`itertools::Itertools::multi_cartesian_product` inside
    /// [`combine_fates`], mirroring the original's `cartesian_product`/
    /// `cartesian_sum` test utilities). The condensed rate from a source
    /// macrostate to a fate is the sum, over every detailed reactant in the
    /// source, of that reactant's stationary weight times the detailed
    /// reaction's rate times the probability of reaching that fate.
    pub fn condense(
        &mut self,
        slow_reactions: &[Reaction],
        macrostates: &MacrostateRegistry,
        fast_reactions_by_macrostate: &HashMap<MacrostateId, Vec<Reaction>>,
        exit_reactions_by_macrostate: &HashMap<MacrostateId, Vec<Reaction>>,
    ) {
        let mut fate_memo: HashMap<MacrostateId, HashMap<Vec<MacrostateId>, f64>> = HashMap::new();
        // Group slow reactions by the tuple of source resting macrostates.
        let mut by_source: HashMap<Vec<MacrostateId>, Vec<&Reaction>> = HashMap::new();
        for reaction in slow_reactions {
            let sources: Option<Vec<MacrostateId>> =
                reaction.reactants().iter().map(|&c| macrostates.owner_of(c)).collect();
            if let Some(sources) = sources {
                by_source.entry(sources).or_default().push(reaction);
            }
        }

        for (source_ids, reactions) in by_source {
            let stationary: Vec<HashMap<ComplexId, f64>> = source_ids
                .iter()
                .map(|&id| {
                    let m = macrostates.get(id);
                    let fast = fast_reactions_by_macrostate.get(&id).cloned().unwrap_or_default();
                    stationary_distribution(m, &fast)
                })
                .collect();

            let mut rate_by_fate: HashMap<Vec<MacrostateId>, f64> = HashMap::new();

            for reaction in &reactions {
                // Weight this detailed reaction by the probability its
                // specific reactant complexes are the ones occupied, under
                // each source macrostate's stationary distribution.
                let weight: f64 = reaction
                    .reactants()
                    .iter()
                    .zip(&stationary)
                    .map(|(c, dist)| dist.get(c).copied().unwrap_or(0.0))
                    .product();
                if weight == 0.0 {
                    continue;
                }

                let owners: Option<Vec<MacrostateId>> =
                    reaction.products().iter().map(|&p| macrostates.owner_of(p)).collect();
                let Some(owners) = owners else { continue };

                let product_dists: Vec<HashMap<Vec<MacrostateId>, f64>> = owners
                    .into_iter()
                    .map(|owner| {
                        fate_distribution(
                            owner,
                            macrostates,
                            fast_reactions_by_macrostate,
                            exit_reactions_by_macrostate,
                            &mut fate_memo,
                        )
                    })
                    .collect();

                for (fate, probability) in combine_fates(&product_dists) {
                    if probability == 0.0 {
                        continue;
                    }
                    *rate_by_fate.entry(fate).or_insert(0.0) += weight * reaction.rate().value() * probability;
                }
            }

            for (fate, rate) in rate_by_fate {
                let reactants: Vec<ComplexId> = source_ids.iter().map(|&id| macrostates.get(id).representative()).collect();
                let products: Vec<ComplexId> = fate.iter().map(|&id| macrostates.get(id).representative()).collect();
                self.reactions.push(Reaction::new(
                    ReactionType::Condensed,
                    reactants,
                    products,
                    RateConstant(rate),
                ));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::complex::{Complex, Strand};
    use crate::domain::{Domain, Length};
    use crate::reaction::ReactionType;
    use crate::segmentation::{segment_neighborhood, MacrostateKind};
    use float_eq::assert_float_eq;

    fn single_domain_complex(name: &str) -> Complex {
        let strand = Strand::new(vec![Domain::new(name, Length::Long)]);
        Complex::new(vec![strand], vec![vec![None]]).unwrap()
    }

    #[test]
    fn stationary_distribution_of_a_singleton_is_one() {
        let mut registry = crate::registry::ComplexStore::new();
        let a = registry.intern(single_domain_complex("a"));
        let macrostates = segment_neighborhood(&[a], &[], &registry, &[]);
        assert_eq!(macrostates[0].kind(), MacrostateKind::Resting);
        let dist = stationary_distribution(&macrostates[0], &[]);
        assert_float_eq!(dist[&a], 1.0, abs <= 1e-9);
    }

    #[test]
    fn stationary_distribution_of_a_symmetric_two_cycle_is_uniform() {
        let mut registry = crate::registry::ComplexStore::new();
        let a = registry.intern(single_domain_complex("a"));
        let b = registry.intern(single_domain_complex("b"));
        let fast = vec![
            Reaction::new(ReactionType::Bind11, vec![a], vec![b], RateConstant(10.0)),
            Reaction::new(ReactionType::Bind11, vec![b], vec![a], RateConstant(10.0)),
        ];
        let macrostates = segment_neighborhood(&[a, b], &fast, &registry, &[]);
        let dist = stationary_distribution(&macrostates[0], &fast);
        assert_float_eq!(dist[&a], 0.5, abs <= 1e-9);
        assert_float_eq!(dist[&b], 0.5, abs <= 1e-9);
        assert_float_eq!(dist.values().sum::<f64>(), 1.0, abs <= 1e-9);
    }

    #[test]
    fn stationary_distribution_favors_the_slower_outgoing_side() {
        let mut registry = crate::registry::ComplexStore::new();
        let a = registry.intern(single_domain_complex("a"));
        let b = registry.intern(single_domain_complex("b"));
        // a -> b fast at rate 30, b -> a fast at rate 10: at equilibrium,
        // flux balance gives pi_a * 30 = pi_b * 10, i.e. pi_b = 3 * pi_a.
        let fast = vec![
            Reaction::new(ReactionType::Bind11, vec![a], vec![b], RateConstant(30.0)),
            Reaction::new(ReactionType::Bind11, vec![b], vec![a], RateConstant(10.0)),
        ];
        let macrostates = segment_neighborhood(&[a, b], &fast, &registry, &[]);
        let dist = stationary_distribution(&macrostates[0], &fast);
        assert_float_eq!(dist[&b] / dist[&a], 3.0, abs <= 1e-6);
    }

    #[test]
    fn condensing_two_singleton_macrostates_keeps_the_slow_rate() {
        let mut registry = crate::registry::ComplexStore::new();
        let a = registry.intern(single_domain_complex("a"));
        let b = registry.intern(single_domain_complex("b"));

        let mut macrostates = MacrostateRegistry::new();
        let a_state = macrostates.insert(segment_neighborhood(&[a], &[], &registry, &[]).remove(0));
        let b_state = macrostates.insert(segment_neighborhood(&[b], &[], &registry, &[]).remove(0));

        let slow = vec![Reaction::new(ReactionType::Bind11, vec![a], vec![b], RateConstant(0.5))];
        let fast_by_macrostate = HashMap::from([(a_state, vec![]), (b_state, vec![])]);

        let mut condensation = Condensation::new();
        condensation.condense(&slow, &macrostates, &fast_by_macrostate, &HashMap::new());

        assert_eq!(condensation.reactions().len(), 1);
        let r = &condensation.reactions()[0];
        assert_eq!(r.reaction_type(), ReactionType::Condensed);
        assert_float_eq!(r.rate().value(), 0.5, abs <= 1e-9);
        assert_eq!(r.reactants(), &[a]);
        assert_eq!(r.products(), &[b]);
    }

    #[test]
    fn condensation_resolves_a_transient_fate_to_its_resting_products() {
        // a + b slow-binds into transient c, which fast-opens to resting d, e.
        // The condensed reaction must name {d, e} as the fate, never the
        // transient c itself.
        let mut registry = crate::registry::ComplexStore::new();
        let a = registry.intern(single_domain_complex("a"));
        let b = registry.intern(single_domain_complex("b"));
        let c = registry.intern(single_domain_complex("c"));
        let d = registry.intern(single_domain_complex("d"));
        let e = registry.intern(single_domain_complex("e"));

        let exit_reaction = Reaction::new(ReactionType::Open1N, vec![c], vec![d, e], RateConstant(100.0));

        let mut macrostates = MacrostateRegistry::new();
        let a_state = macrostates.insert(segment_neighborhood(&[a], &[], &registry, &[]).remove(0));
        let b_state = macrostates.insert(segment_neighborhood(&[b], &[], &registry, &[]).remove(0));
        let c_state =
            macrostates.insert(segment_neighborhood(&[c], std::slice::from_ref(&exit_reaction), &registry, &[]).remove(0));
        let d_state = macrostates.insert(segment_neighborhood(&[d], &[], &registry, &[]).remove(0));
        let e_state = macrostates.insert(segment_neighborhood(&[e], &[], &registry, &[]).remove(0));
        assert_eq!(macrostates.get(c_state).kind(), MacrostateKind::Transient);

        let slow = vec![Reaction::new(ReactionType::Bind21, vec![a, b], vec![c], RateConstant(0.5))];
        let fast_by_macrostate = HashMap::from([
            (a_state, vec![]),
            (b_state, vec![]),
            (c_state, vec![]),
            (d_state, vec![]),
            (e_state, vec![]),
        ]);
        let exit_by_macrostate = HashMap::from([(c_state, vec![exit_reaction])]);

        let mut condensation = Condensation::new();
        condensation.condense(&slow, &macrostates, &fast_by_macrostate, &exit_by_macrostate);

        assert_eq!(condensation.reactions().len(), 1);
        let r = &condensation.reactions()[0];
        assert_eq!(r.reaction_type(), ReactionType::Condensed);
        assert_eq!(r.reactants(), &[a, b]);
        assert_eq!(r.products(), &[d, e]);
        assert_float_eq!(r.rate().value(), 0.5, abs <= 1e-9);
    }
}
