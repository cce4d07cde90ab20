//! The enumeration driver: the two-level worklist that discovers complexes
//! and reactions, segments fast-reaction neighborhoods into macrostates,
//! and (optionally) condenses the result into a macrostate-level CRN.
//!
//! Six disjoint complex pools track a complex's progress through discovery,
//! named after `spec.md` §3's `B`/`N`/`F`/`E`/`S`/`T`:
//!
//! - `b_bimolecular_pending` (**S**): resting complexes awaiting cross-
//!   reaction generation (slow-unimolecular plus bimolecular) against every
//!   complex already in `e_crossed`.
//! - `n_new` (**N**): complexes just produced by a reaction, not yet
//!   absorbed into a fast-reaction neighborhood.
//! - `f_fast_pending` (**F**): complexes in the neighborhood currently being
//!   segmented whose fast unimolecular reactions have not yet been
//!   generated.
//! - `e_explored` (**N**, post-closure): complexes whose fast unimolecular
//!   reactions have been fully generated, awaiting segmentation into
//!   macrostates.
//! - `e_crossed` (**E**): resting complexes whose cross-reactions against
//!   every other member of `e_crossed` have been generated.
//! - `t_transient` (**T**): complexes assigned to a finished transient
//!   macrostate.
//!
//! A complex is in exactly one pool at a time; `spec.md` §4.5's invariant
//! that the pools partition the known complex set is maintained by
//! construction — every transition removes from the old pool before
//! inserting into the new one, see [`Enumerator::assert_pools_disjoint`].

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::complex::{Complex, ComplexId};
use crate::condensation::Condensation;
use crate::config::EnumeratorConfig;
use crate::error::{EnumeratorError, Result};
use crate::generator::ReactionGenerator;
use crate::rates::{classify, classify_rate, RateClass};
use crate::reaction::Reaction;
use crate::registry::ComplexStore;
use crate::segmentation::{segment_neighborhood, Macrostate, MacrostateId, MacrostateRegistry};
use crate::tracking::{EnumerationLog, LogEntry};

/// The enumeration driver.
pub struct Enumerator {
    config: EnumeratorConfig,
    generators: Vec<Box<dyn ReactionGenerator>>,
    complexes: ComplexStore,
    macrostates: MacrostateRegistry,
    reactions: Vec<Reaction>,
    fast_reactions_by_macrostate: HashMap<MacrostateId, Vec<Reaction>>,
    exit_reactions_by_macrostate: HashMap<MacrostateId, Vec<Reaction>>,
    representatives: Vec<ComplexId>,
    max_complex_count: usize,
    max_reaction_count: usize,

    b_bimolecular_pending: Vec<ComplexId>,
    n_new: Vec<ComplexId>,
    f_fast_pending: Vec<ComplexId>,
    e_explored: Vec<ComplexId>,
    e_crossed: Vec<ComplexId>,
    t_transient: Vec<ComplexId>,

    log: EnumerationLog,
    cancellation: Arc<AtomicBool>,
    premature: bool,
    enumerated: bool,
    condensation: Option<Condensation>,
}

impl Enumerator {
    /// Builds a new enumerator. `initial_reactions` is merged into the
    /// result and is visible to segmentation immediately, without any
    /// generator call (SPEC_FULL.md point 1) — this is how
    /// `dry_run`/literal-network tests construct a network directly.
    /// `named_complexes` joins `initial_complexes` to form the
    /// representative-prioritization set (SPEC_FULL.md point 2).
    pub fn new(
        config: EnumeratorConfig,
        generators: Vec<Box<dyn ReactionGenerator>>,
        initial_complexes: Vec<Complex>,
        initial_reactions: Vec<Reaction>,
        named_complexes: Vec<Complex>,
    ) -> Result<Self> {
        let mut complexes = ComplexStore::new();
        let mut initial_ids = Vec::with_capacity(initial_complexes.len());
        let mut largest = 0;
        for complex in initial_complexes {
            largest = largest.max(complex.size());
            initial_ids.push(complexes.intern(complex));
        }
        let mut representatives = initial_ids.clone();
        for complex in named_complexes {
            representatives.push(complexes.intern(complex));
        }
        representatives.sort();
        representatives.dedup();

        config.validate(initial_ids.len(), initial_reactions.len(), largest)?;
        let max_complex_count = config.resolve_max_complex_count(initial_ids.len());
        let max_reaction_count = config.resolve_max_reaction_count(initial_reactions.len());

        Ok(Enumerator {
            config,
            generators,
            complexes,
            macrostates: MacrostateRegistry::new(),
            reactions: initial_reactions,
            fast_reactions_by_macrostate: HashMap::new(),
            exit_reactions_by_macrostate: HashMap::new(),
            representatives,
            max_complex_count,
            max_reaction_count,
            b_bimolecular_pending: Vec::new(),
            n_new: Vec::new(),
            f_fast_pending: initial_ids,
            e_explored: Vec::new(),
            e_crossed: Vec::new(),
            t_transient: Vec::new(),
            log: EnumerationLog::default(),
            cancellation: Arc::new(AtomicBool::new(false)),
            premature: false,
            enumerated: false,
            condensation: None,
        })
    }

    /// A cooperative cancellation handle: setting it causes the next
    /// pool-pop point inside [`Enumerator::enumerate`] to stop with
    /// [`EnumeratorError::Cancellation`] and finish prematurely.
    pub fn cancellation_handle(&self) -> Arc<AtomicBool> {
        self.cancellation.clone()
    }

    /// Each initial complex becomes its own singleton resting macrostate;
    /// no reactions are generated and no generator is ever invoked
    /// (SPEC_FULL.md point 3). Mirrors the original's `Enumerator.dry_run`.
    pub fn dry_run(&mut self) -> Result<()> {
        let seeds: Vec<ComplexId> = self
            .f_fast_pending
            .drain(..)
            .chain(self.b_bimolecular_pending.drain(..))
            .collect();
        let mut seen = std::collections::HashSet::new();
        for id in seeds {
            if !seen.insert(id) {
                continue;
            }
            let macrostate = segment_neighborhood(&[id], &[], &self.complexes, &self.representatives).remove(0);
            let macrostate_id = self.macrostates.insert(macrostate);
            self.fast_reactions_by_macrostate.insert(macrostate_id, Vec::new());
            self.exit_reactions_by_macrostate.insert(macrostate_id, Vec::new());
            self.e_crossed.push(id);
        }
        self.enumerated = true;
        self.log.record(LogEntry::Finished { premature: false });
        Ok(())
    }

    /// Runs the full two-level worklist until both `n_new` and
    /// `b_bimolecular_pending` are empty, or a budget/cancellation stop
    /// condition is hit.
    pub fn enumerate(&mut self) -> Result<()> {
        loop {
            if self.cancellation.load(Ordering::Relaxed) {
                return self.finish(true, EnumeratorError::Cancellation);
            }

            if let Some(seed) = self.f_fast_pending.pop().or_else(|| self.n_new.pop()) {
                if let Err(e) = self.explore_unimolecular(seed) {
                    return self.finish(true, e);
                }
                continue;
            }

            // The current fast-reaction neighborhood (whatever landed in
            // `e_explored` since the last segmentation) is fully explored;
            // segment it into macrostates.
            if !self.e_explored.is_empty() {
                if let Err(e) = self.segment_current_neighborhood() {
                    return self.finish(true, e);
                }
                continue;
            }

            if let Some(seed) = self.pop_s_queue() {
                if let Err(e) = self.explore_resting(seed) {
                    return self.finish(true, e);
                }
                continue;
            }

            break;
        }

        self.enumerated = true;
        self.log.record(LogEntry::Finished { premature: false });
        Ok(())
    }

    /// Pops the next member of the `S` queue (`b_bimolecular_pending`),
    /// honoring `spec.md` §6's `DFS` option: LIFO (from the end) when `true`,
    /// FIFO (from the front) when `false`.
    fn pop_s_queue(&mut self) -> Option<ComplexId> {
        if self.config.dfs {
            self.b_bimolecular_pending.pop()
        } else if self.b_bimolecular_pending.is_empty() {
            None
        } else {
            Some(self.b_bimolecular_pending.remove(0))
        }
    }

    /// `get_fast_reactions(e)` (`spec.md` §4.5): generates `seed`'s
    /// unimolecular reactions and admits only the ones that classify `Fast`.
    /// Slow and ignored ones are dropped here — a slow-unimolecular reaction
    /// is only ever generated once `seed` is confirmed resting, in
    /// [`Enumerator::explore_resting`].
    fn explore_unimolecular(&mut self, seed: ComplexId) -> Result<()> {
        let complex = self.complexes.get(seed).clone();
        let k_slow = self.config.k_slow;
        let k_fast = self.config.k_fast;
        for generator in &self.generators {
            let pending = generator
                .unimolecular(&complex, &self.complexes)
                .map_err(EnumeratorError::GeneratorFailure)?;
            for reaction in pending {
                if classify_rate(reaction.reaction_type, reaction.rate.value(), k_slow, k_fast) != RateClass::Fast {
                    continue;
                }
                self.admit_reaction(seed, reaction)?;
            }
        }
        self.e_explored.push(seed);
        Ok(())
    }

    /// `get_slow_reactions(c, against E ∪ {c})` (`spec.md` §4.5): `seed` is a
    /// resting complex popped from the `S` queue. Regenerates its
    /// unimolecular reactions, admitting only the ones that classify `Slow`
    /// (the `Fast` ones were already admitted while `seed` was still in its
    /// fast-reaction neighborhood), and generates bimolecular reactions
    /// against every complex already in `e_crossed` plus `seed` itself —
    /// not the whole resting pool, so each unordered pair is only ever
    /// generated once, from whichever endpoint is popped second.
    fn explore_resting(&mut self, seed: ComplexId) -> Result<()> {
        let complex = self.complexes.get(seed).clone();
        let k_slow = self.config.k_slow;
        let k_fast = self.config.k_fast;

        for generator in &self.generators {
            let pending = generator
                .unimolecular(&complex, &self.complexes)
                .map_err(EnumeratorError::GeneratorFailure)?;
            for reaction in pending {
                if classify_rate(reaction.reaction_type, reaction.rate.value(), k_slow, k_fast) != RateClass::Slow {
                    continue;
                }
                self.admit_reaction(seed, reaction)?;
            }
        }

        let partners: Vec<ComplexId> = self.e_crossed.iter().copied().chain(std::iter::once(seed)).collect();
        for &partner in &partners {
            let other = self.complexes.get(partner).clone();
            for generator in &self.generators {
                let pending = generator
                    .bimolecular(&complex, &other, &self.complexes)
                    .map_err(EnumeratorError::GeneratorFailure)?;
                for reaction in pending {
                    if classify_rate(reaction.reaction_type, reaction.rate.value(), k_slow, k_fast) != RateClass::Slow {
                        continue;
                    }
                    self.admit_bimolecular_reaction(seed, partner, reaction)?;
                }
            }
        }

        self.e_crossed.push(seed);
        Ok(())
    }

    fn admit_reaction(&mut self, reactant: ComplexId, pending: crate::generator::PendingReaction) -> Result<()> {
        let mut product_ids = Vec::with_capacity(pending.products.len());
        for product in pending.products {
            if product.size() > self.config.max_complex_size {
                self.log.record(LogEntry::ComplexRejectedTooLarge {
                    size: product.size(),
                    max_complex_size: self.config.max_complex_size,
                });
                return Ok(());
            }
            let is_new = self.complexes.find(&product).is_none();
            let id = self.complexes.intern(product);
            if self.complexes.len() > self.max_complex_count {
                return Err(EnumeratorError::PolymerizationOverflow(format!(
                    "complex count {} exceeds max_complex_count {}",
                    self.complexes.len(),
                    self.max_complex_count
                )));
            }
            if is_new {
                self.n_new.push(id);
            }
            product_ids.push(id);
        }

        let reaction = Reaction::new(pending.reaction_type, vec![reactant], product_ids, pending.rate);
        if reaction.is_trivial() {
            return Ok(());
        }
        self.reactions.push(reaction);
        if self.reactions.len() > self.max_reaction_count {
            return Err(EnumeratorError::PolymerizationOverflow(format!(
                "reaction count {} exceeds max_reaction_count {}",
                self.reactions.len(),
                self.max_reaction_count
            )));
        }
        Ok(())
    }

    fn admit_bimolecular_reaction(
        &mut self,
        a: ComplexId,
        b: ComplexId,
        pending: crate::generator::PendingReaction,
    ) -> Result<()> {
        let mut product_ids = Vec::with_capacity(pending.products.len());
        for product in pending.products {
            if product.size() > self.config.max_complex_size {
                self.log.record(LogEntry::ComplexRejectedTooLarge {
                    size: product.size(),
                    max_complex_size: self.config.max_complex_size,
                });
                return Ok(());
            }
            let is_new = self.complexes.find(&product).is_none();
            let id = self.complexes.intern(product);
            if self.complexes.len() > self.max_complex_count {
                return Err(EnumeratorError::PolymerizationOverflow(format!(
                    "complex count {} exceeds max_complex_count {}",
                    self.complexes.len(),
                    self.max_complex_count
                )));
            }
            if is_new {
                self.n_new.push(id);
            }
            product_ids.push(id);
        }
        let reaction = Reaction::new(pending.reaction_type, vec![a, b], product_ids, pending.rate);
        self.reactions.push(reaction);
        if self.reactions.len() > self.max_reaction_count {
            return Err(EnumeratorError::PolymerizationOverflow(format!(
                "reaction count {} exceeds max_reaction_count {}",
                self.reactions.len(),
                self.max_reaction_count
            )));
        }
        Ok(())
    }

    fn segment_current_neighborhood(&mut self) -> Result<()> {
        let batch: Vec<ComplexId> = self.e_explored.drain(..).collect();
        let k_slow = self.config.k_slow;
        let k_fast = self.config.k_fast;

        let fast: Vec<Reaction> = self
            .reactions
            .iter()
            .filter(|r| r.reactants().iter().any(|c| batch.contains(c)))
            .filter(|r| classify(r, k_slow, k_fast) == RateClass::Fast)
            .cloned()
            .collect();

        let macrostates = segment_neighborhood(&batch, &fast, &self.complexes, &self.representatives);
        let resting_count = macrostates.iter().filter(|m| m.kind() == crate::segmentation::MacrostateKind::Resting).count();
        let transient_count = macrostates.len() - resting_count;
        self.log.record(LogEntry::NeighborhoodProcessed {
            seed: batch[0],
            resting_count,
            transient_count,
        });

        for macrostate in macrostates {
            let is_resting = macrostate.kind() == crate::segmentation::MacrostateKind::Resting;
            let members = macrostate.members().to_vec();
            let internal_fast: Vec<Reaction> = fast
                .iter()
                .filter(|r| members.contains(&r.reactants()[0]) && r.products().iter().all(|p| members.contains(p)))
                .cloned()
                .collect();
            // The edges a transient macrostate's fate traversal walks during
            // condensation (`spec.md` §4.6 step 3): fast reactions leaving
            // this macrostate's members toward another one already known in
            // this same neighborhood closure.
            let exit_fast: Vec<Reaction> = fast
                .iter()
                .filter(|r| members.contains(&r.reactants()[0]) && !r.products().iter().all(|p| members.contains(p)))
                .cloned()
                .collect();

            let macrostate_id = self.macrostates.insert(macrostate);
            self.fast_reactions_by_macrostate.insert(macrostate_id, internal_fast);
            self.exit_reactions_by_macrostate.insert(macrostate_id, exit_fast);

            for member in members {
                if is_resting {
                    self.b_bimolecular_pending.push(member);
                } else {
                    self.t_transient.push(member);
                }
            }
        }
        Ok(())
    }

    fn finish(&mut self, premature: bool, error: EnumeratorError) -> Result<()> {
        if self.config.interruptible {
            self.premature = premature;
            self.enumerated = true;
            self.log.record(LogEntry::PolymerizationOverflow {
                complex_count: self.complexes.len(),
                reaction_count: self.reactions.len(),
            });
            self.log.record(LogEntry::Finished { premature });
            Ok(())
        } else {
            Err(error)
        }
    }

    /// Condenses the resting-macrostate network discovered so far into a
    /// macrostate-level CRN (`spec.md` §4.6). Requires `enumerate` (or
    /// `dry_run`) to have run.
    pub fn condense(&mut self) -> Result<()> {
        self.require_enumerated()?;
        let slow: Vec<Reaction> = self
            .reactions
            .iter()
            .filter(|r| classify(r, self.config.k_slow, self.config.k_fast) == RateClass::Slow)
            .cloned()
            .collect();
        let mut condensation = Condensation::new();
        condensation.condense(
            &slow,
            &self.macrostates,
            &self.fast_reactions_by_macrostate,
            &self.exit_reactions_by_macrostate,
        );
        self.condensation = Some(condensation);
        Ok(())
    }

    fn require_enumerated(&self) -> Result<()> {
        if !self.enumerated {
            return Err(EnumeratorError::UsageError(crate::error::UsageError::ResultsNotAvailable));
        }
        Ok(())
    }

    pub fn complexes(&self) -> &ComplexStore {
        &self.complexes
    }

    pub fn macrostates(&self) -> &MacrostateRegistry {
        &self.macrostates
    }

    pub fn reactions(&self) -> Result<&[Reaction]> {
        self.require_enumerated()?;
        Ok(&self.reactions)
    }

    pub fn condensed_reactions(&self) -> Option<&[Reaction]> {
        self.condensation.as_ref().map(|c| c.reactions())
    }

    pub fn resting_macrostates(&self) -> Vec<&Macrostate> {
        self.macrostates
            .ids()
            .map(|id| self.macrostates.get(id))
            .filter(|m| m.kind() == crate::segmentation::MacrostateKind::Resting)
            .collect()
    }

    pub fn was_premature(&self) -> bool {
        self.premature
    }

    pub fn log(&self) -> &EnumerationLog {
        &self.log
    }

    #[cfg(test)]
    fn assert_pools_disjoint(&self) {
        let mut all: Vec<ComplexId> = Vec::new();
        all.extend(&self.b_bimolecular_pending);
        all.extend(&self.n_new);
        all.extend(&self.f_fast_pending);
        all.extend(&self.e_explored);
        all.extend(&self.e_crossed);
        all.extend(&self.t_transient);
        let mut sorted = all.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(all.len(), sorted.len(), "complex pools must be pairwise disjoint");
    }
}
