//! Segmentation of a fast-reaction neighborhood into macrostates.
//!
//! `spec.md` §4.4: group complexes connected by fast unimolecular reactions
//! into strongly connected components, then classify each component as
//! `Resting` (no fast reaction leaves it) or `Transient` (at least one
//! does). `spec.md` §9's design note requires the SCC pass itself be
//! iterative, not recursive — this is a direct port of
//! `examples/original_source/peppercornenumerator/enumerator.py`'s
//! `tarjans_scc` (there, recursive) to an explicit-stack form.

use std::collections::HashMap;

use derivative::Derivative;
use serde::{Deserialize, Serialize};

use crate::complex::ComplexId;
use crate::reaction::Reaction;
use crate::registry::ComplexStore;

/// Opaque handle into a [`MacrostateRegistry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MacrostateId(pub(crate) usize);

/// Whether a macrostate is at equilibrium under fast reactions (`Resting`)
/// or still transitioning out via at least one fast reaction (`Transient`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MacrostateKind {
    Resting,
    Transient,
}

/// A strongly connected component of the fast-reaction graph, plus its
/// classification and chosen representative complex.
#[derive(Derivative, Debug, Clone, Serialize, Deserialize)]
#[derivative(PartialEq)]
pub struct Macrostate {
    #[derivative(PartialEq = "ignore")]
    kind: MacrostateKind,
    /// Canonical, sorted so two macrostates with the same member set
    /// compare equal regardless of discovery order. Equality is by member
    /// set alone — `kind` and `representative` are always determined by
    /// the members, so comparing them too would be redundant.
    members: Vec<ComplexId>,
    #[derivative(PartialEq = "ignore")]
    representative: ComplexId,
}

impl Macrostate {
    pub fn kind(&self) -> MacrostateKind {
        self.kind
    }

    pub fn members(&self) -> &[ComplexId] {
        &self.members
    }

    pub fn representative(&self) -> ComplexId {
        self.representative
    }

    pub fn contains(&self, id: ComplexId) -> bool {
        self.members.binary_search(&id).is_ok()
    }
}

/// Owns every macrostate discovered over the course of an enumeration.
#[derive(Debug, Default)]
pub struct MacrostateRegistry {
    macrostates: Vec<Macrostate>,
    owner: HashMap<ComplexId, MacrostateId>,
}

impl MacrostateRegistry {
    pub fn new() -> Self {
        MacrostateRegistry::default()
    }

    pub fn insert(&mut self, macrostate: Macrostate) -> MacrostateId {
        let id = MacrostateId(self.macrostates.len());
        for &member in &macrostate.members {
            self.owner.insert(member, id);
        }
        self.macrostates.push(macrostate);
        id
    }

    pub fn get(&self, id: MacrostateId) -> &Macrostate {
        &self.macrostates[id.0]
    }

    pub fn owner_of(&self, complex: ComplexId) -> Option<MacrostateId> {
        self.owner.get(&complex).copied()
    }

    pub fn len(&self) -> usize {
        self.macrostates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.macrostates.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = MacrostateId> + '_ {
        (0..self.macrostates.len()).map(MacrostateId)
    }
}

/// Segments `complexes` into macrostates, using only the fast unimolecular
/// reactions among them.
///
/// `priority` lists complexes that should be preferred as a macrostate's
/// representative when present among its members (`spec.md` §4.4 step 3,
/// the `named_complexes`/`initial_complexes` prioritization from
/// SPEC_FULL.md point 2); ties within the priority list, or when no member
/// is in it, fall back to the lexicographically smallest kernel string.
pub fn segment_neighborhood(
    complexes: &[ComplexId],
    fast_reactions: &[Reaction],
    store: &ComplexStore,
    priority: &[ComplexId],
) -> Vec<Macrostate> {
    let mut adjacency: HashMap<ComplexId, Vec<ComplexId>> = HashMap::new();
    for reaction in fast_reactions {
        if reaction.is_unimolecular() {
            let from = reaction.reactants()[0];
            adjacency.entry(from).or_default().extend(reaction.products().iter().copied());
        }
    }

    let sccs = tarjan_scc(complexes, &adjacency);

    sccs.into_iter()
        .map(|mut members| {
            members.sort();
            let has_external_edge = members.iter().any(|m| {
                adjacency
                    .get(m)
                    .map(|outs| outs.iter().any(|o| members.binary_search(o).is_err()))
                    .unwrap_or(false)
            });
            let kind = if has_external_edge {
                MacrostateKind::Transient
            } else {
                MacrostateKind::Resting
            };
            let representative = choose_representative(&members, store, priority);
            Macrostate {
                kind,
                members,
                representative,
            }
        })
        .collect()
}

fn choose_representative(members: &[ComplexId], store: &ComplexStore, priority: &[ComplexId]) -> ComplexId {
    if let Some(&preferred) = priority.iter().find(|p| members.contains(p)) {
        return preferred;
    }
    *members
        .iter()
        .min_by_key(|&&id| store.get(id).canonical_key())
        .expect("a macrostate always has at least one member")
}

/// Iterative (explicit-stack) Tarjan's strongly connected components
/// algorithm, run over the subgraph of `adjacency` induced by `nodes`.
fn tarjan_scc(nodes: &[ComplexId], adjacency: &HashMap<ComplexId, Vec<ComplexId>>) -> Vec<Vec<ComplexId>> {
    let mut index_counter = 0usize;
    let mut indices: HashMap<ComplexId, usize> = HashMap::new();
    let mut lowlink: HashMap<ComplexId, usize> = HashMap::new();
    let mut on_stack: HashMap<ComplexId, bool> = HashMap::new();
    let mut stack: Vec<ComplexId> = Vec::new();
    let mut sccs: Vec<Vec<ComplexId>> = Vec::new();
    let empty: Vec<ComplexId> = Vec::new();

    for &start in nodes {
        if indices.contains_key(&start) {
            continue;
        }

        // `work` simulates the call stack of the textbook recursive
        // algorithm: each frame is (node, index of the next neighbor to visit).
        let mut work: Vec<(ComplexId, usize)> = vec![(start, 0)];
        indices.insert(start, index_counter);
        lowlink.insert(start, index_counter);
        index_counter += 1;
        stack.push(start);
        on_stack.insert(start, true);

        while let Some(&mut (node, ref mut pos)) = work.last_mut() {
            let neighbors = adjacency.get(&node).unwrap_or(&empty);
            if *pos < neighbors.len() {
                let next = neighbors[*pos];
                *pos += 1;
                if !indices.contains_key(&next) {
                    indices.insert(next, index_counter);
                    lowlink.insert(next, index_counter);
                    index_counter += 1;
                    stack.push(next);
                    on_stack.insert(next, true);
                    work.push((next, 0));
                } else if *on_stack.get(&next).unwrap_or(&false) {
                    let next_index = indices[&next];
                    let node_low = lowlink.get_mut(&node).unwrap();
                    *node_low = (*node_low).min(next_index);
                }
            } else {
                work.pop();
                let node_low = lowlink[&node];
                if let Some(&(parent, _)) = work.last() {
                    let parent_low = lowlink.get_mut(&parent).unwrap();
                    *parent_low = (*parent_low).min(node_low);
                }
                if node_low == indices[&node] {
                    let mut scc = Vec::new();
                    loop {
                        let w = stack.pop().unwrap();
                        on_stack.insert(w, false);
                        scc.push(w);
                        if w == node {
                            break;
                        }
                    }
                    sccs.push(scc);
                }
            }
        }
    }

    sccs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::complex::Strand;
    use crate::domain::{Domain, Length};
    use crate::reaction::{RateConstant, ReactionType};

    fn single_domain_complex(store: &mut ComplexStore, name: &str) -> ComplexId {
        let strand = Strand::new(vec![Domain::new(name, Length::Long)]);
        let complex = crate::complex::Complex::new(vec![strand], vec![vec![None]]).unwrap();
        store.intern(complex)
    }

    fn fast(from: ComplexId, to: ComplexId) -> Reaction {
        Reaction::new(ReactionType::Bind11, vec![from], vec![to], RateConstant(100.0))
    }

    #[test]
    fn a_single_complex_with_no_fast_reactions_is_its_own_resting_macrostate() {
        let mut store = ComplexStore::new();
        let a = single_domain_complex(&mut store, "a");
        let macrostates = segment_neighborhood(&[a], &[], &store, &[]);
        assert_eq!(macrostates.len(), 1);
        assert_eq!(macrostates[0].kind(), MacrostateKind::Resting);
        assert_eq!(macrostates[0].members(), &[a]);
    }

    #[test]
    fn a_fast_cycle_becomes_one_resting_macrostate() {
        let mut store = ComplexStore::new();
        let a = single_domain_complex(&mut store, "a");
        let b = single_domain_complex(&mut store, "b");
        let reactions = vec![fast(a, b), fast(b, a)];
        let macrostates = segment_neighborhood(&[a, b], &reactions, &store, &[]);
        assert_eq!(macrostates.len(), 1);
        assert_eq!(macrostates[0].kind(), MacrostateKind::Resting);
        let mut members = macrostates[0].members().to_vec();
        members.sort();
        let mut expected = vec![a, b];
        expected.sort();
        assert_eq!(members, expected);
    }

    #[test]
    fn a_fast_reaction_leaving_a_singleton_makes_it_transient() {
        let mut store = ComplexStore::new();
        let a = single_domain_complex(&mut store, "a");
        let b = single_domain_complex(&mut store, "b");
        let reactions = vec![fast(a, b)];
        let macrostates = segment_neighborhood(&[a, b], &reactions, &store, &[]);
        assert_eq!(macrostates.len(), 2);
        let a_state = macrostates.iter().find(|m| m.contains(a)).unwrap();
        let b_state = macrostates.iter().find(|m| m.contains(b)).unwrap();
        assert_eq!(a_state.kind(), MacrostateKind::Transient);
        assert_eq!(b_state.kind(), MacrostateKind::Resting);
    }

    #[test]
    fn priority_list_picks_the_representative_when_present() {
        let mut store = ComplexStore::new();
        let z = single_domain_complex(&mut store, "z");
        let a = single_domain_complex(&mut store, "a");
        let reactions = vec![fast(a, z), fast(z, a)];
        let macrostates = segment_neighborhood(&[a, z], &reactions, &store, &[z]);
        assert_eq!(macrostates[0].representative(), z);
    }

    #[test]
    fn without_priority_representative_is_lexicographically_smallest() {
        let mut store = ComplexStore::new();
        let z = single_domain_complex(&mut store, "z");
        let a = single_domain_complex(&mut store, "a");
        let reactions = vec![fast(a, z), fast(z, a)];
        let macrostates = segment_neighborhood(&[a, z], &reactions, &store, &[]);
        assert_eq!(macrostates[0].representative(), a);
    }
}
