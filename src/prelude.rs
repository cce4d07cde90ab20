//! The most relevant types for configuring and running an enumeration.

pub use crate::{
    complex::{Complex, ComplexId, Strand},
    condensation::Condensation,
    config::{EnumeratorConfig, EnumeratorConfigBuilder},
    domain::{Domain, Length},
    driver::Enumerator,
    error::{EnumeratorError, Result, UsageError},
    generator::{default_generators, PendingReaction, ReactionGenerator},
    rates::RateClass,
    reaction::{RateConstant, Reaction, ReactionType},
    segmentation::{Macrostate, MacrostateId, MacrostateKind},
    tracking::{EnumerationLog, LogEntry},
};
