//! Rate classification and the opening-rate model.
//!
//! `spec.md` §4.3: a unimolecular reaction is classified `Fast` if its rate
//! is at least `k_fast`, `Slow` if at least `k_slow` but below `k_fast`, and
//! `Ignored` if below `k_slow`. Bimolecular reactions are always `Slow` —
//! they never participate in fast-reaction segmentation.

use crate::reaction::{Reaction, ReactionType};

/// The outcome of classifying a reaction's rate against a pair of
/// thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateClass {
    /// Below `k_slow`: dropped from the reaction set entirely.
    Ignored,
    /// At or above `k_slow`, below `k_fast` (or bimolecular): retained as a
    /// slow (macrostate-level) reaction.
    Slow,
    /// At or above `k_fast`: drives fast-reaction segmentation.
    Fast,
}

/// Classifies `reaction`'s rate against the two thresholds.
///
/// Bimolecular reactions are always `Slow` unless their rate falls below
/// `k_slow`, in which case they are `Ignored` like any other reaction —
/// `spec.md` only exempts them from ever being classified `Fast`.
pub fn classify(reaction: &Reaction, k_slow: f64, k_fast: f64) -> RateClass {
    classify_rate(reaction.reaction_type(), reaction.rate().value(), k_slow, k_fast)
}

/// The same classification as [`classify`], taken before a [`Reaction`] is
/// built — the driver needs to decide whether to admit a
/// [`crate::generator::PendingReaction`] at all, so it classifies the raw
/// type/rate pair up front rather than constructing a throwaway `Reaction`.
pub fn classify_rate(reaction_type: ReactionType, rate: f64, k_slow: f64, k_fast: f64) -> RateClass {
    if rate < k_slow {
        return RateClass::Ignored;
    }
    if reaction_type.is_bimolecular() {
        return RateClass::Slow;
    }
    if rate >= k_fast {
        RateClass::Fast
    } else {
        RateClass::Slow
    }
}

/// A minimal nearest-neighbor-style opening rate model for an N-nucleotide
/// toehold dissociating at free energy `dg_bp` per base pair, following the
/// original's `opening_rate(length, dG_bp, dG_assoc, kelvin)`:
///
/// `k = k_uni * exp(-(length * dG_bp - dG_assoc) / (R * T))`
///
/// where `k_uni` is the unimolecular rate prefactor. Units follow the
/// original: `dG_bp`/`dG_assoc` in kcal/mol, temperature in Kelvin.
pub fn opening_rate(length: u32, dg_bp: f64, dg_assoc: f64, kelvin: f64, k_uni: f64) -> f64 {
    const GAS_CONSTANT_KCAL: f64 = 0.0019872041; // kcal / (mol * K)
    let delta_g = length as f64 * dg_bp - dg_assoc;
    k_uni * (-delta_g / (GAS_CONSTANT_KCAL * kelvin)).exp()
}

/// Searches for the smallest toehold length whose opening rate falls below
/// `threshold`, following the original's `release_cutoff` setter loop
/// (`rc = 0; loop { rc += 1; if opening_rate(rc, ...) < threshold { break } }`).
///
/// Returns `None` if no length up to `max_length` satisfies the threshold
/// (the search is bounded to avoid looping forever on a degenerate model).
pub fn release_cutoff_search(
    threshold: f64,
    dg_bp: f64,
    dg_assoc: f64,
    kelvin: f64,
    k_uni: f64,
    max_length: u32,
) -> Option<u32> {
    (1..=max_length).find(|&length| opening_rate(length, dg_bp, dg_assoc, kelvin, k_uni) < threshold)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::complex::ComplexId;
    use crate::reaction::RateConstant;
    use test_case::test_case;

    fn reaction(reaction_type: ReactionType, rate: f64) -> Reaction {
        Reaction::new(reaction_type, vec![ComplexId(0)], vec![ComplexId(1)], RateConstant(rate))
    }

    #[test_case(0.0, RateClass::Ignored; "zero rate is ignored")]
    #[test_case(0.999, RateClass::Ignored; "just below k_slow is ignored")]
    #[test_case(1.0, RateClass::Slow; "exactly k_slow is slow")]
    #[test_case(5.0, RateClass::Slow; "between thresholds is slow")]
    #[test_case(9.999, RateClass::Slow; "just below k_fast is slow")]
    #[test_case(10.0, RateClass::Fast; "exactly k_fast is fast")]
    #[test_case(1000.0, RateClass::Fast; "well above k_fast is fast")]
    fn unimolecular_classification_boundaries(rate: f64, expected: RateClass) {
        let r = reaction(ReactionType::Bind11, rate);
        assert_eq!(classify(&r, 1.0, 10.0), expected);
    }

    #[test]
    fn bimolecular_reaction_is_never_fast() {
        let r = reaction(ReactionType::Bind21, 1_000_000.0);
        assert_eq!(classify(&r, 1.0, 10.0), RateClass::Slow);
    }

    #[test]
    fn bimolecular_reaction_below_k_slow_is_still_ignored() {
        let r = reaction(ReactionType::Bind21, 0.0001);
        assert_eq!(classify(&r, 1.0, 10.0), RateClass::Ignored);
    }

    #[test]
    fn k_fast_equal_to_k_slow_makes_every_retained_reaction_fast_or_ignored() {
        let slow_boundary = reaction(ReactionType::Bind11, 1.0);
        assert_eq!(classify(&slow_boundary, 1.0, 1.0), RateClass::Fast);
        let below = reaction(ReactionType::Bind11, 0.5);
        assert_eq!(classify(&below, 1.0, 1.0), RateClass::Ignored);
    }

    #[test]
    fn k_fast_equal_to_infinity_makes_every_unimolecular_reaction_slow_or_ignored() {
        let fast_enough_elsewhere = reaction(ReactionType::Bind11, 1e12);
        assert_eq!(classify(&fast_enough_elsewhere, 0.0, f64::INFINITY), RateClass::Slow);
        let below_k_slow = reaction(ReactionType::Bind11, -1.0);
        assert_eq!(classify(&below_k_slow, 0.0, f64::INFINITY), RateClass::Ignored);
    }

    #[test]
    fn opening_rate_decreases_with_length() {
        let short = opening_rate(5, 1.7, 1.96, 298.15, 7.5e7);
        let long = opening_rate(15, 1.7, 1.96, 298.15, 7.5e7);
        assert!(long < short);
    }

    #[test]
    fn release_cutoff_search_finds_the_first_length_below_threshold() {
        let cutoff = release_cutoff_search(1.0, 1.7, 1.96, 298.15, 7.5e7, 20);
        assert!(cutoff.is_some());
        let rc = cutoff.unwrap();
        assert!(opening_rate(rc, 1.7, 1.96, 298.15, 7.5e7) < 1.0);
        if rc > 1 {
            assert!(opening_rate(rc - 1, 1.7, 1.96, 298.15, 7.5e7) >= 1.0);
        }
    }
}
