//! An in-process, trigger-sampled event log, in the shape of the teacher's
//! `tracking::Log`/`tracking::trigger` — this crate has no use for
//! `log`/`tracing`, since the teacher itself never reaches for them.

use serde::{Deserialize, Serialize};

use crate::complex::ComplexId;
use crate::reaction::ReactionType;

/// One recorded enumeration event. Variants map directly onto the
/// `log.debug(...)` call sites in
/// `examples/original_source/peppercornenumerator/enumerator.py`'s
/// `process_fast_neighborhood`/`get_new_products`/`finish`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum LogEntry {
    /// A fast-reaction neighborhood around `seed` was segmented into
    /// `resting_count` resting and `transient_count` transient macrostates.
    NeighborhoodProcessed {
        seed: ComplexId,
        resting_count: usize,
        transient_count: usize,
    },
    /// A batch of slow reactions of `reaction_type` was classified.
    SlowReactionBatch { reaction_type: ReactionType, count: usize },
    /// A generated complex exceeded `max_complex_size` and was discarded.
    ComplexRejectedTooLarge { size: usize, max_complex_size: usize },
    /// A complex- or reaction-count budget was exceeded.
    PolymerizationOverflow { complex_count: usize, reaction_count: usize },
    /// Enumeration finished; `premature` mirrors the original's
    /// `self.prematurely_reduced` flag.
    Finished { premature: bool },
}

/// Decides which [`LogEntry`] values a [`EnumerationLog`] retains, ported
/// from the teacher's `tracking::trigger::{EvalTrigger, IterTrigger}`
/// sampling-trigger pattern.
pub trait Trigger: std::fmt::Debug {
    fn should_log(&mut self, entry: &LogEntry) -> bool;
}

/// Retains every entry.
#[derive(Debug, Default, Clone)]
pub struct AlwaysTrigger;

impl Trigger for AlwaysTrigger {
    fn should_log(&mut self, _entry: &LogEntry) -> bool {
        true
    }
}

/// Retains only every Nth [`LogEntry::NeighborhoodProcessed`] entry, plus
/// every other entry kind unconditionally — modeled on
/// `tracking::trigger::IterTrigger`'s "every Nth iteration" sampling.
#[derive(Debug, Clone)]
pub struct EveryNthNeighborhood {
    n: usize,
    seen: usize,
}

impl EveryNthNeighborhood {
    pub fn new(n: usize) -> Self {
        assert!(n > 0, "sampling period must be positive");
        EveryNthNeighborhood { n, seen: 0 }
    }
}

impl Trigger for EveryNthNeighborhood {
    fn should_log(&mut self, entry: &LogEntry) -> bool {
        match entry {
            LogEntry::NeighborhoodProcessed { .. } => {
                self.seen += 1;
                self.seen % self.n == 0
            }
            _ => true,
        }
    }
}

/// Retains only overflow and finish events — useful for a caller who only
/// cares whether enumeration completed cleanly.
#[derive(Debug, Default, Clone)]
pub struct OverflowOnlyTrigger;

impl Trigger for OverflowOnlyTrigger {
    fn should_log(&mut self, entry: &LogEntry) -> bool {
        matches!(
            entry,
            LogEntry::PolymerizationOverflow { .. } | LogEntry::Finished { .. }
        )
    }
}

/// Accumulates [`LogEntry`] values that pass a [`Trigger`].
#[derive(Debug)]
pub struct EnumerationLog {
    trigger: Box<dyn Trigger>,
    entries: Vec<LogEntry>,
}

impl Default for EnumerationLog {
    fn default() -> Self {
        EnumerationLog {
            trigger: Box::new(AlwaysTrigger),
            entries: Vec::new(),
        }
    }
}

impl EnumerationLog {
    pub fn new(trigger: Box<dyn Trigger>) -> Self {
        EnumerationLog {
            trigger,
            entries: Vec::new(),
        }
    }

    pub fn record(&mut self, entry: LogEntry) {
        if self.trigger.should_log(&entry) {
            self.entries.push(entry);
        }
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn drain(&mut self) -> Vec<LogEntry> {
        std::mem::take(&mut self.entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn always_trigger_keeps_everything() {
        let mut log = EnumerationLog::default();
        log.record(LogEntry::Finished { premature: false });
        log.record(LogEntry::PolymerizationOverflow {
            complex_count: 10,
            reaction_count: 20,
        });
        assert_eq!(log.entries().len(), 2);
    }

    #[test]
    fn every_nth_neighborhood_drops_most_neighborhood_entries() {
        let mut log = EnumerationLog::new(Box::new(EveryNthNeighborhood::new(3)));
        for i in 0..6 {
            log.record(LogEntry::NeighborhoodProcessed {
                seed: ComplexId(0),
                resting_count: i,
                transient_count: 0,
            });
        }
        assert_eq!(log.entries().len(), 2);
    }

    #[test]
    fn overflow_only_trigger_drops_neighborhood_entries() {
        let mut log = EnumerationLog::new(Box::new(OverflowOnlyTrigger));
        log.record(LogEntry::NeighborhoodProcessed {
            seed: ComplexId(0),
            resting_count: 1,
            transient_count: 0,
        });
        log.record(LogEntry::Finished { premature: true });
        assert_eq!(log.entries().len(), 1);
    }

    #[test]
    fn drain_empties_the_log() {
        let mut log = EnumerationLog::default();
        log.record(LogEntry::Finished { premature: false });
        let drained = log.drain();
        assert_eq!(drained.len(), 1);
        assert!(log.entries().is_empty());
    }
}
