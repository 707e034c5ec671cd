//! Version constraints as predicates over versions
//!
//! A constraint is kept in disjunctive normal form: a list of alternatives,
//! each a conjunction of comparators. `>=1.2,<2.0 || >=3.0` has two
//! alternatives; `*` is one empty alternative that allows everything.

use super::Version;
use std::fmt;

/// Comparison operator of a single constraint term
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    /// `==1.2.3`, `=1.2.3` or a bare `1.2.3`
    Equal,
    /// `!=1.2.3`
    NotEqual,
    /// `>1.2.3`
    Greater,
    /// `>=1.2.3`
    GreaterOrEqual,
    /// `<1.2.3`
    Less,
    /// `<=1.2.3`
    LessOrEqual,
    /// `1.2.*` or `==1.2.*`
    Wildcard,
    /// `!=1.2.*`
    NotWildcard,
}

/// A single `operator version` term
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comparator {
    pub op: Operator,
    pub version: Version,
}

impl Comparator {
    pub fn new(op: Operator, version: Version) -> Self {
        Self { op, version }
    }

    /// Returns true if `candidate` satisfies this term
    pub fn matches(&self, candidate: &Version) -> bool {
        match self.op {
            Operator::Equal => candidate == &self.version,
            Operator::NotEqual => candidate != &self.version,
            Operator::Greater => candidate > &self.version,
            Operator::GreaterOrEqual => candidate >= &self.version,
            Operator::LessOrEqual => candidate <= &self.version,
            Operator::Less => {
                // `<2.0` must not admit 2.0a1 even though it orders below 2.0
                candidate < &self.version
                    && !(candidate.is_prerelease()
                        && !self.version.is_prerelease()
                        && candidate.base() == self.version.base())
            }
            Operator::Wildcard => self.matches_prefix(candidate),
            Operator::NotWildcard => !self.matches_prefix(candidate),
        }
    }

    fn matches_prefix(&self, candidate: &Version) -> bool {
        candidate.epoch() == self.version.epoch()
            && candidate.release_starts_with(self.version.release())
    }

    /// The inclusive or exclusive lower bound this term imposes, if any
    fn lower_bound(&self) -> Option<&Version> {
        match self.op {
            Operator::Equal
            | Operator::Greater
            | Operator::GreaterOrEqual
            | Operator::Wildcard => Some(&self.version),
            _ => None,
        }
    }
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.op {
            Operator::Equal => write!(f, "=={}", self.version),
            Operator::NotEqual => write!(f, "!={}", self.version),
            Operator::Greater => write!(f, ">{}", self.version),
            Operator::GreaterOrEqual => write!(f, ">={}", self.version),
            Operator::Less => write!(f, "<{}", self.version),
            Operator::LessOrEqual => write!(f, "<={}", self.version),
            Operator::Wildcard => write!(f, "=={}.*", self.version),
            Operator::NotWildcard => write!(f, "!={}.*", self.version),
        }
    }
}

/// A parsed version constraint
///
/// Parsing lives in [`crate::parser::parse_constraint`]; `VersionConstraint::parse`
/// is a shorthand for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionConstraint {
    raw: String,
    alternatives: Vec<Vec<Comparator>>,
}

impl VersionConstraint {
    /// Builds a constraint from its alternatives; an empty list allows nothing
    pub fn new(raw: impl Into<String>, alternatives: Vec<Vec<Comparator>>) -> Self {
        Self {
            raw: raw.into(),
            alternatives,
        }
    }

    /// The constraint that allows every version (`*`)
    pub fn any() -> Self {
        Self::new("*", vec![Vec::new()])
    }

    pub fn parse(text: &str) -> Result<Self, crate::error::ConstraintError> {
        crate::parser::parse_constraint(text)
    }

    /// The text this constraint was parsed from
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn alternatives(&self) -> &[Vec<Comparator>] {
        &self.alternatives
    }

    /// Returns true if no comparator restricts the version at all
    pub fn is_any(&self) -> bool {
        self.alternatives.iter().any(|alt| alt.is_empty())
    }

    /// Returns true if `version` satisfies at least one alternative
    pub fn allows(&self, version: &Version) -> bool {
        self.alternatives
            .iter()
            .any(|alt| alt.iter().all(|c| c.matches(version)))
    }

    /// The lowest version this constraint could ever allow, if determinable
    ///
    /// Only single-alternative constraints have a floor. The floor is the
    /// greatest lower bound among the alternative's terms, whether inclusive
    /// (`>=`, `^`, `~`) or exclusive (`>`).
    pub fn minimum(&self) -> Option<Version> {
        match self.alternatives.as_slice() {
            [single] => single.iter().filter_map(|c| c.lower_bound()).max().cloned(),
            _ => None,
        }
    }
}

impl fmt::Display for VersionConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> Version {
        Version::parse(s).unwrap()
    }

    fn range(lower: &str, upper: &str) -> VersionConstraint {
        VersionConstraint::new(
            format!(">={},<{}", lower, upper),
            vec![vec![
                Comparator::new(Operator::GreaterOrEqual, v(lower)),
                Comparator::new(Operator::Less, v(upper)),
            ]],
        )
    }

    #[test]
    fn test_any_allows_everything() {
        let any = VersionConstraint::any();
        assert!(any.is_any());
        assert!(any.allows(&v("0.0.1")));
        assert!(any.allows(&v("99.0rc1")));
        assert!(any.minimum().is_none());
    }

    #[test]
    fn test_empty_alternatives_allow_nothing() {
        let none = VersionConstraint::new("", Vec::new());
        assert!(!none.allows(&v("1.0")));
        assert!(none.minimum().is_none());
    }

    #[test]
    fn test_range_allows() {
        let c = range("1.2", "2.0");
        assert!(c.allows(&v("1.2.0")));
        assert!(c.allows(&v("1.99")));
        assert!(!c.allows(&v("2.0")));
        assert!(!c.allows(&v("1.1.9")));
    }

    #[test]
    fn test_less_excludes_prereleases_of_bound() {
        let c = range("1.0", "2.0");
        assert!(!c.allows(&v("2.0.0a1")));
        assert!(!c.allows(&v("2.0rc1")));
        assert!(c.allows(&v("1.5rc1")));
    }

    #[test]
    fn test_less_than_prerelease_bound() {
        let c = Comparator::new(Operator::Less, v("2.0rc1"));
        assert!(c.matches(&v("2.0a1")));
        assert!(!c.matches(&v("2.0rc1")));
    }

    #[test]
    fn test_wildcard_terms() {
        let eq = Comparator::new(Operator::Wildcard, v("3.0"));
        assert!(eq.matches(&v("3.0.5")));
        assert!(!eq.matches(&v("3.1")));

        let ne = Comparator::new(Operator::NotWildcard, v("3.0"));
        assert!(!ne.matches(&v("3.0.5")));
        assert!(ne.matches(&v("3.1")));
    }

    #[test]
    fn test_minimum_of_single_alternative() {
        assert_eq!(range("1.2.3", "2.0").minimum(), Some(v("1.2.3")));

        let tightened = VersionConstraint::new(
            ">=1.0,>1.5",
            vec![vec![
                Comparator::new(Operator::GreaterOrEqual, v("1.0")),
                Comparator::new(Operator::Greater, v("1.5")),
            ]],
        );
        assert_eq!(tightened.minimum(), Some(v("1.5")));
    }

    #[test]
    fn test_minimum_without_lower_bound() {
        let upper_only = VersionConstraint::new(
            "<2.0",
            vec![vec![Comparator::new(Operator::Less, v("2.0"))]],
        );
        assert!(upper_only.minimum().is_none());
    }

    #[test]
    fn test_minimum_of_union_is_none() {
        let union = VersionConstraint::new(
            "==1.0 || ==2.0",
            vec![
                vec![Comparator::new(Operator::Equal, v("1.0"))],
                vec![Comparator::new(Operator::Equal, v("2.0"))],
            ],
        );
        assert!(union.allows(&v("2.0.0")));
        assert!(union.minimum().is_none());
    }

    #[test]
    fn test_allows_is_deterministic() {
        let c = range("3.6", "4.0");
        let target = v("3.8");
        let first = c.allows(&target);
        for _ in 0..10 {
            assert_eq!(c.allows(&target), first);
        }
    }

    #[test]
    fn test_display_uses_raw_text() {
        assert_eq!(range("1.0", "2.0").to_string(), ">=1.0,<2.0");
        assert_eq!(
            Comparator::new(Operator::NotWildcard, v("3.1")).to_string(),
            "!=3.1.*"
        );
    }
}
