//! Abstract sequence domains and their complement relation.
//!
//! A [`Domain`] is a named, typed placeholder for a nucleotide sequence. The
//! core never looks at actual bases; it only needs to know a domain's name,
//! whether it is a short toehold or a long recognition domain, and which
//! other domain occurrences it can pair with.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Whether a domain is a short toehold or a long recognition domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Length {
    /// A toehold-length domain, typically a handful of bases.
    Short,
    /// A full recognition domain.
    Long,
}

/// A named, typed sequence placeholder.
///
/// `Domain` is immutable for the lifetime of an enumeration. Two `Domain`
/// values with the same name and the same `complementary` flag denote the
/// same domain occurrence type; [`Domain::complement`] flips the flag, so
/// `d.complement().complement() == d` holds unconditionally.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Domain {
    name: String,
    length: Length,
    complementary: bool,
}

impl Domain {
    /// Creates a new, non-complementary domain with the given name and length.
    pub fn new(name: impl Into<String>, length: Length) -> Self {
        Domain {
            name: name.into(),
            length,
            complementary: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn length(&self) -> Length {
        self.length
    }

    pub fn is_complementary(&self) -> bool {
        self.complementary
    }

    pub fn is_short(&self) -> bool {
        self.length == Length::Short
    }

    pub fn is_long(&self) -> bool {
        self.length == Length::Long
    }

    /// Returns this domain's complement.
    ///
    /// `complement(complement(d)) == d` by construction: complementing only
    /// ever toggles the `complementary` flag.
    pub fn complement(&self) -> Domain {
        Domain {
            name: self.name.clone(),
            length: self.length,
            complementary: !self.complementary,
        }
    }

    /// Whether an occurrence of `self` can base-pair with an occurrence of `other`.
    pub fn pairs_with(&self, other: &Domain) -> bool {
        self.name == other.name && self.complementary != other.complementary
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.name, if self.complementary { "*" } else { "" })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn complement_is_involutive() {
        let d = Domain::new("d1", Length::Long);
        assert_eq!(d.complement().complement(), d);
    }

    #[test]
    fn complement_pairs_with_original() {
        let d = Domain::new("t0", Length::Short);
        let dstar = d.complement();
        assert!(d.pairs_with(&dstar));
        assert!(dstar.pairs_with(&d));
        assert!(!d.pairs_with(&d));
    }

    #[test]
    fn distinct_names_never_pair() {
        let a = Domain::new("a", Length::Long);
        let b = Domain::new("b", Length::Long).complement();
        assert!(!a.pairs_with(&b));
    }

    #[test]
    fn display_marks_complement_with_asterisk() {
        let d = Domain::new("d1", Length::Long).complement();
        assert_eq!(d.to_string(), "d1*");
    }
}
